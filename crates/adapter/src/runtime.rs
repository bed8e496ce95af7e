//! Adapter runtime integration.
//!
//! A single game task owns the `GameState` and applies commands one at a time
//! in arrival order; the TCP server only parses, authorizes and forwards.

use std::net::SocketAddr;

use arrayvec::ArrayVec;
use tokio::sync::{mpsc, oneshot};

use crate::core::{GameState, PuzzleConfig};
use crate::protocol::{create_ack, MAX_ACTIONS};
use crate::server::{build_observation, run_server, ServerConfig};
use crate::types::GameAction;

/// Command delivered to the game task.
#[derive(Debug, Clone)]
pub struct InboundCommand {
    pub client_id: usize,
    pub seq: u64,
    pub payload: InboundPayload,
}

#[derive(Debug, Clone)]
pub enum InboundPayload {
    /// Send the current observation to the requesting client only.
    SnapshotRequest,
    Command(ClientCommand),
}

/// Command payload.
#[derive(Debug, Clone)]
pub enum ClientCommand {
    Actions(ArrayVec<GameAction, MAX_ACTIONS>),
    Reset(Box<PuzzleConfig>),
}

/// Outbound message to be delivered by the server.
#[derive(Debug, Clone)]
pub enum OutboundMessage {
    ToClient { client_id: usize, line: String },
    /// Delivered to every client that asked for streamed observations.
    Broadcast { line: String },
}

/// Apply one command to the game
pub fn apply_command(game: &mut GameState, command: &ClientCommand) {
    match command {
        ClientCommand::Actions(actions) => {
            for &action in actions {
                let _ = game.apply_action(action);
            }
        }
        ClientCommand::Reset(config) => game.reset(config),
    }
}

/// Game task: owns the state until the command channel closes
///
/// Every processed command is acknowledged to its sender and followed by a
/// broadcast observation.
pub async fn run_game(
    mut game: GameState,
    mut cmd_rx: mpsc::Receiver<InboundCommand>,
    out_tx: mpsc::UnboundedSender<OutboundMessage>,
) -> GameState {
    while let Some(inbound) = cmd_rx.recv().await {
        match inbound.payload {
            InboundPayload::SnapshotRequest => {
                let obs = build_observation(inbound.seq, &game.snapshot());
                match serde_json::to_string(&obs) {
                    Ok(line) => {
                        let _ = out_tx.send(OutboundMessage::ToClient {
                            client_id: inbound.client_id,
                            line,
                        });
                    }
                    Err(e) => eprintln!("[Adapter] observation encode failed: {}", e),
                }
            }
            InboundPayload::Command(command) => {
                apply_command(&mut game, &command);

                if let Ok(line) = serde_json::to_string(&create_ack(inbound.seq)) {
                    let _ = out_tx.send(OutboundMessage::ToClient {
                        client_id: inbound.client_id,
                        line,
                    });
                }

                let obs = build_observation(inbound.seq, &game.snapshot());
                match serde_json::to_string(&obs) {
                    Ok(line) => {
                        let _ = out_tx.send(OutboundMessage::Broadcast { line });
                    }
                    Err(e) => eprintln!("[Adapter] observation encode failed: {}", e),
                }
            }
        }
    }
    game
}

/// Run the adapter for one puzzle until the listener fails
pub async fn serve(
    config: ServerConfig,
    game: GameState,
    ready_tx: Option<oneshot::Sender<SocketAddr>>,
) -> anyhow::Result<()> {
    let max_pending = config.max_pending_commands.max(1);
    let (cmd_tx, cmd_rx) = mpsc::channel::<InboundCommand>(max_pending);
    let (out_tx, out_rx) = mpsc::unbounded_channel::<OutboundMessage>();

    let game_task = tokio::spawn(run_game(game, cmd_rx, out_tx));
    let result = run_server(config, cmd_tx, out_rx, ready_tx).await;
    game_task.abort();
    result
}
