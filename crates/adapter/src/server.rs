//! TCP side of the adapter
//!
//! Accepts clients, performs the handshake, enforces the controller seat and
//! per-client seq ordering, then forwards commands to the game task. Replies
//! produced by the game task come back through the outbound dispatcher.

use std::hash::Hasher;
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, oneshot, RwLock};

use crate::core::GameSnapshot;
use crate::protocol::*;
use crate::runtime::{ClientCommand, InboundCommand, InboundPayload, OutboundMessage};
use crate::types::{BOARD_HEIGHT, BOARD_WIDTH, HIDDEN_ROWS};

/// 64-bit FNV-1a over explicit little-endian bytes, so `state_hash` does not
/// depend on the platform or on `Hash` impls
#[derive(Debug, Clone)]
struct Fnv1aHasher {
    state: u64,
}

impl Fnv1aHasher {
    const OFFSET_BASIS: u64 = 0xcbf29ce484222325;
    const PRIME: u64 = 0x100000001b3;

    fn new() -> Self {
        Self {
            state: Self::OFFSET_BASIS,
        }
    }
}

impl Hasher for Fnv1aHasher {
    fn finish(&self) -> u64 {
        self.state
    }

    fn write(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.state ^= b as u64;
            self.state = self.state.wrapping_mul(Self::PRIME);
        }
    }
}

/// Pull `"seq": <digits>` out of a line that failed to parse, for the error reply
fn extract_seq_best_effort(s: &str) -> Option<u64> {
    let (_, after_key) = s.split_once("\"seq\"")?;
    let (_, value) = after_key.split_once(':')?;
    let digits: String = value
        .trim_start()
        .chars()
        .take_while(char::is_ascii_digit)
        .collect();
    digits.parse().ok()
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub max_pending_commands: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 7878,
            max_pending_commands: 32,
        }
    }
}

impl ServerConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        use std::env;

        let defaults = Self::default();
        let host = env::var("NAZOTET_HOST").unwrap_or(defaults.host);
        let port = env::var("NAZOTET_PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.port);
        let max_pending_commands = env::var("NAZOTET_MAX_PENDING")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.max_pending_commands);

        Self {
            host,
            port,
            max_pending_commands,
        }
    }

    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid listen address {}:{}", self.host, self.port))
    }
}

/// Shared server state
pub struct ServerState {
    clients: RwLock<Vec<ClientHandle>>,
    controller: RwLock<Option<usize>>,
}

impl ServerState {
    pub fn new() -> Self {
        Self {
            clients: RwLock::new(Vec::new()),
            controller: RwLock::new(None),
        }
    }

    async fn is_handshaken(&self, client_id: usize) -> bool {
        let clients = self.clients.read().await;
        clients
            .iter()
            .find(|c| c.id == client_id)
            .map(|c| c.handshaken)
            .unwrap_or(false)
    }

    async fn is_controller(&self, client_id: usize) -> bool {
        *self.controller.read().await == Some(client_id)
    }

    /// Enforce strictly increasing seq per client
    async fn check_and_update_seq(&self, client_id: usize, seq: u64) -> bool {
        let mut clients = self.clients.write().await;
        let Some(client) = clients.iter_mut().find(|c| c.id == client_id) else {
            return true;
        };
        match client.last_seq {
            Some(prev) if seq <= prev => false,
            _ => {
                client.last_seq = Some(seq);
                true
            }
        }
    }
}

impl Default for ServerState {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle to a connected client
pub struct ClientHandle {
    pub id: usize,
    pub addr: SocketAddr,
    pub stream_observations: bool,
    pub handshaken: bool,
    pub last_seq: Option<u64>,
    /// Channel to the client's writer task
    pub tx: mpsc::UnboundedSender<String>,
}

/// Start the TCP server
pub async fn run_server(
    config: ServerConfig,
    command_tx: mpsc::Sender<InboundCommand>,
    mut out_rx: mpsc::UnboundedReceiver<OutboundMessage>,
    ready_tx: Option<oneshot::Sender<SocketAddr>>,
) -> anyhow::Result<()> {
    let addr = config.socket_addr()?;
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("bind {}", addr))?;
    let bound = listener.local_addr()?;
    println!("[Adapter] TCP server listening on {}", bound);
    if let Some(tx) = ready_tx {
        let _ = tx.send(bound);
    }

    let state = Arc::new(ServerState::new());
    let mut client_id_counter = 0usize;

    // Outbound dispatcher.
    {
        let state = Arc::clone(&state);
        tokio::spawn(async move {
            while let Some(msg) = out_rx.recv().await {
                let clients = state.clients.read().await;
                match msg {
                    OutboundMessage::ToClient { client_id, line } => {
                        if let Some(c) = clients.iter().find(|c| c.id == client_id) {
                            let _ = c.tx.send(line);
                        }
                    }
                    OutboundMessage::Broadcast { line } => {
                        for c in clients.iter().filter(|c| c.stream_observations) {
                            let _ = c.tx.send(line.clone());
                        }
                    }
                }
            }
        });
    }

    // Accept incoming connections
    loop {
        let (socket, addr) = listener.accept().await?;
        client_id_counter += 1;
        let client_id = client_id_counter;

        println!("[Adapter] Client {} connected from {}", client_id, addr);

        let state = Arc::clone(&state);
        let command_tx = command_tx.clone();

        tokio::spawn(async move {
            if let Err(e) = handle_client(socket, addr, client_id, state, command_tx).await {
                eprintln!("[Adapter] Client {} error: {}", client_id, e);
            }
            println!("[Adapter] Client {} disconnected", client_id);
        });
    }
}

/// Queue one JSON line for a client's writer; a message that fails to encode
/// is logged and dropped
fn send_line<T: serde::Serialize>(tx: &mpsc::UnboundedSender<String>, msg: &T) {
    match serde_json::to_string(msg) {
        Ok(line) => {
            let _ = tx.send(line);
        }
        Err(e) => eprintln!("[Adapter] reply encode failed: {}", e),
    }
}

/// Handle a single client connection
async fn handle_client(
    socket: TcpStream,
    addr: SocketAddr,
    client_id: usize,
    state: Arc<ServerState>,
    command_tx: mpsc::Sender<InboundCommand>,
) -> anyhow::Result<()> {
    let (reader, mut writer) = tokio::io::split(socket);
    let mut reader = BufReader::new(reader);

    let (tx, mut rx) = mpsc::unbounded_channel::<String>();

    {
        let mut clients = state.clients.write().await;
        clients.push(ClientHandle {
            id: client_id,
            addr,
            stream_observations: false,
            handshaken: false,
            last_seq: None,
            tx: tx.clone(),
        });
    }

    let write_task = tokio::spawn(async move {
        while let Some(line) = rx.recv().await {
            if writer.write_all(line.as_bytes()).await.is_err()
                || writer.write_all(b"\n").await.is_err()
                || writer.flush().await.is_err()
            {
                break;
            }
        }
    });

    let send_error = |seq: u64, code: ErrorCode, message: &str| {
        send_line(&tx, &create_error(seq, code, message));
    };

    let mut line = String::new();
    let result: anyhow::Result<()> = async {
        loop {
            line.clear();
            if reader.read_line(&mut line).await? == 0 {
                // Client disconnected
                return Ok(());
            }

            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            let parsed = match parse_message(trimmed) {
                Ok(parsed) => parsed,
                Err(e) => {
                    let seq = extract_seq_best_effort(trimmed).unwrap_or(0);
                    send_error(seq, ErrorCode::InvalidCommand, &format!("JSON parse error: {}", e));
                    continue;
                }
            };

            match parsed {
                ParsedMessage::Hello(hello) => {
                    if state.is_handshaken(client_id).await
                        && !state.check_and_update_seq(client_id, hello.seq).await
                    {
                        send_error(hello.seq, ErrorCode::InvalidCommand, "seq must be strictly increasing");
                        continue;
                    }

                    {
                        let mut clients = state.clients.write().await;
                        if let Some(client) = clients.iter_mut().find(|c| c.id == client_id) {
                            client.handshaken = true;
                            client.last_seq = Some(hello.seq);
                            client.stream_observations = hello.stream_observations;
                        }
                    }

                    // First client to hello becomes controller
                    let (role, controller_id) = {
                        let mut controller = state.controller.write().await;
                        if controller.is_none() {
                            *controller = Some(client_id);
                            println!("[Adapter] Client {} is now controller", client_id);
                        }
                        let role = if *controller == Some(client_id) {
                            AssignedRole::Controller
                        } else {
                            AssignedRole::Observer
                        };
                        (role, controller.map(|id| id as u64))
                    };

                    let welcome = create_welcome(hello.seq, client_id as u64, role, controller_id);
                    send_line(&tx, &welcome);

                    if hello.stream_observations {
                        let _ = command_tx.try_send(InboundCommand {
                            client_id,
                            seq: hello.seq,
                            payload: InboundPayload::SnapshotRequest,
                        });
                    }
                }

                ParsedMessage::Command(cmd) => {
                    let command = ClientCommand::Actions(cmd.actions.0);
                    forward_command(&state, &command_tx, client_id, cmd.seq, command, &send_error)
                        .await;
                }

                ParsedMessage::Reset(reset) => {
                    let command = ClientCommand::Reset(Box::new(reset.config));
                    forward_command(&state, &command_tx, client_id, reset.seq, command, &send_error)
                        .await;
                }

                ParsedMessage::Control(ctrl) => {
                    if !state.is_handshaken(client_id).await {
                        send_error(ctrl.seq, ErrorCode::HandshakeRequired, "Send hello before control");
                        continue;
                    }
                    if !state.check_and_update_seq(client_id, ctrl.seq).await {
                        send_error(ctrl.seq, ErrorCode::InvalidCommand, "seq must be strictly increasing");
                        continue;
                    }

                    let mut controller = state.controller.write().await;
                    match ctrl.action {
                        ControlAction::Claim if controller.is_none() => {
                            *controller = Some(client_id);
                            println!("[Adapter] Client {} is now controller", client_id);
                            send_line(&tx, &create_ack(ctrl.seq));
                        }
                        ControlAction::Claim if *controller == Some(client_id) => {
                            send_line(&tx, &create_ack(ctrl.seq));
                        }
                        ControlAction::Claim => {
                            send_error(ctrl.seq, ErrorCode::ControllerActive, "Controller already assigned");
                        }
                        ControlAction::Release if *controller == Some(client_id) => {
                            *controller = None;
                            println!("[Adapter] Controller {} released", client_id);
                            send_line(&tx, &create_ack(ctrl.seq));
                        }
                        ControlAction::Release => {
                            send_error(ctrl.seq, ErrorCode::NotController, "Only controller may release");
                        }
                    }
                }

                ParsedMessage::Unknown(msg) => {
                    send_error(msg.seq, ErrorCode::InvalidCommand, "Unknown message type");
                }
            }
        }
    }
    .await;

    // Clean up: remove client and promote the next controller if needed.
    {
        let mut controller = state.controller.write().await;
        let mut clients = state.clients.write().await;
        clients.retain(|c| c.id != client_id);

        if *controller == Some(client_id) {
            let next_id = clients
                .iter()
                .filter(|c| c.handshaken)
                .map(|c| c.id)
                .min();
            *controller = next_id;
            match next_id {
                Some(new_id) => println!("[Adapter] Controller {} promoted", new_id),
                None => println!("[Adapter] Controller {} released", client_id),
            }
        }
    }

    drop(tx);
    let _ = write_task.await;

    result
}

/// Authorize a game-changing command and queue it for the game task
async fn forward_command(
    state: &ServerState,
    command_tx: &mpsc::Sender<InboundCommand>,
    client_id: usize,
    seq: u64,
    command: ClientCommand,
    send_error: &impl Fn(u64, ErrorCode, &str),
) {
    if !state.is_handshaken(client_id).await {
        send_error(seq, ErrorCode::HandshakeRequired, "Send hello before command");
        return;
    }
    if !state.check_and_update_seq(client_id, seq).await {
        send_error(seq, ErrorCode::InvalidCommand, "seq must be strictly increasing");
        return;
    }
    if !state.is_controller(client_id).await {
        send_error(seq, ErrorCode::NotController, "Only controller may send commands");
        return;
    }

    // Backpressure: bounded queue; the ack comes from the game task.
    let inbound = InboundCommand {
        client_id,
        seq,
        payload: InboundPayload::Command(command),
    };
    if command_tx.try_send(inbound).is_err() {
        send_error(seq, ErrorCode::Backpressure, "Command queue is full");
    }
}

/// Hash of the gameplay state: board, active piece, queue, hold, rule counters,
/// combo and the two end flags
fn state_hash(snapshot: &GameSnapshot) -> StateHash {
    let mut hasher = Fnv1aHasher::new();
    for row in snapshot.board_rows().iter() {
        hasher.write(row);
    }
    match snapshot.active {
        Some(piece) => hasher.write(&[
            1,
            piece.kind.id(),
            piece.rotation.index() as u8,
            piece.x as u8,
            piece.y as u8,
        ]),
        None => hasher.write(&[0]),
    }
    hasher.write(&(snapshot.queue.len() as u32).to_le_bytes());
    for kind in &snapshot.queue {
        hasher.write(&[kind.id()]);
    }
    hasher.write(&[snapshot.hold.map_or(0, |kind| kind.id())]);
    for rule in &snapshot.rules {
        hasher.write(&rule.value.to_le_bytes());
    }
    hasher.write(&snapshot.combo.to_le_bytes());
    hasher.write(&[snapshot.game_over as u8, snapshot.solved as u8]);
    StateHash(hasher.finish())
}

/// Build an observation message from a snapshot
pub fn build_observation(seq: u64, snapshot: &GameSnapshot) -> ObservationMessage {
    let rows = snapshot.board_rows();

    let state_hash = state_hash(snapshot);

    let active = snapshot.active.map(|piece| ActivePieceSnapshot {
        kind: piece.kind.into(),
        rotation: piece.rotation.into(),
        x: piece.x,
        y: piece.y,
        cells: piece.cells().map(|(x, y)| [x, y]).collect(),
    });

    ObservationMessage {
        msg_type: ObservationType::Observation,
        seq,
        ts: current_timestamp_ms(),
        playable: snapshot.playable(),
        game_over: snapshot.game_over,
        solved: snapshot.solved,
        board: BoardSnapshot {
            width: BOARD_WIDTH,
            height: BOARD_HEIGHT,
            hidden_rows: HIDDEN_ROWS,
            cells: rows.iter().map(|row| row.to_vec()).collect(),
        },
        active,
        ghost_y: snapshot.ghost_y,
        next: snapshot.queue.iter().map(|&k| k.into()).collect(),
        hold: snapshot.hold.map(Into::into),
        hold_enabled: snapshot.hold_enabled,
        rules: snapshot
            .tracked_rules()
            .map(|r| RuleStatus {
                label: r.label().to_string(),
                value: r.value,
                goal: r.goal,
            })
            .collect(),
        combo: snapshot.combo,
        can_undo: snapshot.can_undo,
        can_redo: snapshot.can_redo,
        last_event: snapshot.last_event.map(LastEvent::from),
        state_hash,
    }
}
