use std::net::SocketAddr;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot};

use nazotet::adapter::protocol::create_hello;
use nazotet::adapter::runtime::run_game;
use nazotet::adapter::server::{run_server, ServerConfig};
use nazotet::adapter::{InboundCommand, OutboundMessage};
use nazotet::core::{GameState, PuzzleConfig};

type Lines = tokio::io::Lines<BufReader<OwnedReadHalf>>;

async fn read_json(lines: &mut Lines) -> serde_json::Value {
    let line = tokio::time::timeout(Duration::from_secs(2), lines.next_line())
        .await
        .expect("timeout waiting for line")
        .expect("io error")
        .expect("expected line");
    serde_json::from_str(&line).unwrap()
}

async fn send_json(write_half: &mut OwnedWriteHalf, value: &serde_json::Value) {
    write_half
        .write_all(serde_json::to_string(value).unwrap().as_bytes())
        .await
        .unwrap();
    write_half.write_all(b"\n").await.unwrap();
    write_half.flush().await.unwrap();
}

async fn connect(addr: SocketAddr) -> (Lines, OwnedWriteHalf) {
    let stream = TcpStream::connect(addr).await.unwrap();
    let (read_half, write_half) = stream.into_split();
    (BufReader::new(read_half).lines(), write_half)
}

fn test_config(max_pending_commands: usize) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        max_pending_commands,
    }
}

type Handles = (
    SocketAddr,
    tokio::task::JoinHandle<()>,
    tokio::task::JoinHandle<GameState>,
);

async fn start(game: GameState) -> Handles {
    let (cmd_tx, cmd_rx) = mpsc::channel::<InboundCommand>(32);
    let (out_tx, out_rx) = mpsc::unbounded_channel::<OutboundMessage>();
    let (ready_tx, ready_rx) = oneshot::channel();

    let server_handle = tokio::spawn(async move {
        let _ = run_server(test_config(32), cmd_tx, out_rx, Some(ready_tx)).await;
    });
    let game_handle = tokio::spawn(run_game(game, cmd_rx, out_tx));

    let addr = tokio::time::timeout(Duration::from_secs(2), ready_rx)
        .await
        .unwrap()
        .unwrap();
    (addr, server_handle, game_handle)
}

fn quad_puzzle() -> serde_json::Value {
    serde_json::json!({
        "field": "GGGGG.GGGG/GGGGG.GGGG/GGGGG.GGGG/GGGGG.GGGG",
        "next": "IO",
        "rules": [["Quad", 1]]
    })
}

#[tokio::test]
async fn closed_loop_solve_over_tcp() {
    let game = GameState::new(&PuzzleConfig::with_queue("TIO"));
    let (addr, server_handle, game_handle) = start(game).await;

    let (mut lines, mut write_half) = connect(addr).await;
    let hello = serde_json::to_value(create_hello(1, "solver")).unwrap();
    send_json(&mut write_half, &hello).await;

    let welcome = read_json(&mut lines).await;
    assert_eq!(welcome["type"], "welcome");
    assert_eq!(welcome["role"], "controller");
    assert_eq!(welcome["protocol_version"], "1.0.0");

    let obs = read_json(&mut lines).await;
    assert_eq!(obs["type"], "observation");
    assert_eq!(obs["seq"], 1);
    assert_eq!(obs["active"]["kind"], "t");
    assert_eq!(obs["next"], serde_json::json!(["i", "o"]));
    assert_eq!(obs["playable"], true);
    let initial_hash = obs["state_hash"].clone();

    // Load a new puzzle
    send_json(
        &mut write_half,
        &serde_json::json!({"type": "reset", "seq": 2, "config": quad_puzzle()}),
    )
    .await;
    let ack = read_json(&mut lines).await;
    assert_eq!(ack["type"], "ack");
    assert_eq!(ack["seq"], 2);
    let obs = read_json(&mut lines).await;
    assert_eq!(obs["seq"], 2);
    assert_eq!(obs["active"]["kind"], "i");
    assert_eq!(obs["board"]["cells"][22][0], 8);
    assert_eq!(obs["rules"], serde_json::json!([{"label": "Quad", "value": 0, "goal": 1}]));
    assert_ne!(obs["state_hash"], initial_hash);

    // Swap out and back, then a vertical I down the well
    send_json(
        &mut write_half,
        &serde_json::json!({
            "type": "command",
            "seq": 3,
            "actions": ["hold", "hold", "rotateCw", "hardDrop"]
        }),
    )
    .await;
    let ack = read_json(&mut lines).await;
    assert_eq!(ack["type"], "ack");
    assert_eq!(ack["seq"], 3);
    let obs = read_json(&mut lines).await;
    assert_eq!(obs["solved"], true);
    assert_eq!(obs["game_over"], true);
    assert_eq!(obs["playable"], false);
    assert!(obs.get("active").is_none());
    assert_eq!(obs["rules"][0]["value"], 1);
    assert_eq!(obs["last_event"]["lines_cleared"], 4);
    assert_eq!(obs["last_event"]["rule"], "Quad");
    assert_eq!(obs["last_event"]["perfect_clear"], true);

    // The solving lock is not recorded, so undo lands on the first hold
    send_json(
        &mut write_half,
        &serde_json::json!({"type": "command", "seq": 4, "actions": ["undo"]}),
    )
    .await;
    assert_eq!(read_json(&mut lines).await["type"], "ack");
    let obs = read_json(&mut lines).await;
    assert_eq!(obs["solved"], false);
    assert_eq!(obs["playable"], true);
    assert_eq!(obs["active"]["kind"], "o");
    assert_eq!(obs["hold"], "i");
    assert_eq!(obs["can_redo"], true);

    drop(write_half);
    server_handle.abort();
    game_handle.abort();
}

#[tokio::test]
async fn protocol_errors_and_controller_handover() {
    let game = GameState::new(&PuzzleConfig::with_queue("IOTSZJL"));
    let (addr, server_handle, game_handle) = start(game).await;

    // Commands before hello
    let (mut lines_c, mut write_c) = connect(addr).await;
    send_json(
        &mut write_c,
        &serde_json::json!({"type": "command", "seq": 1, "actions": ["hold"]}),
    )
    .await;
    let err = read_json(&mut lines_c).await;
    assert_eq!(err["type"], "error");
    assert_eq!(err["code"], "handshake_required");
    assert_eq!(err["seq"], 1);

    // Controller
    let (mut lines_a, mut write_a) = connect(addr).await;
    send_json(
        &mut write_a,
        &serde_json::json!({"type": "hello", "seq": 1, "client": {"name": "a"}, "stream_observations": false}),
    )
    .await;
    let welcome_a = read_json(&mut lines_a).await;
    assert_eq!(welcome_a["role"], "controller");
    let a_id = welcome_a["client_id"].clone();

    // Observer
    let (mut lines_b, mut write_b) = connect(addr).await;
    send_json(
        &mut write_b,
        &serde_json::json!({"type": "hello", "seq": 1, "client": {"name": "b"}, "stream_observations": false}),
    )
    .await;
    let welcome_b = read_json(&mut lines_b).await;
    assert_eq!(welcome_b["role"], "observer");
    assert_eq!(welcome_b["controller_id"], a_id);

    send_json(
        &mut write_b,
        &serde_json::json!({"type": "command", "seq": 2, "actions": ["hardDrop"]}),
    )
    .await;
    assert_eq!(read_json(&mut lines_b).await["code"], "not_controller");

    send_json(
        &mut write_b,
        &serde_json::json!({"type": "control", "seq": 3, "action": "claim"}),
    )
    .await;
    assert_eq!(read_json(&mut lines_b).await["code"], "controller_active");

    // Bad input from the controller
    send_json(
        &mut write_a,
        &serde_json::json!({"type": "command", "seq": 2, "actions": ["teleport"]}),
    )
    .await;
    let err = read_json(&mut lines_a).await;
    assert_eq!(err["code"], "invalid_command");
    assert_eq!(err["seq"], 2);

    write_a.write_all(b"{not json, \"seq\": 7\n").await.unwrap();
    write_a.flush().await.unwrap();
    let err = read_json(&mut lines_a).await;
    assert_eq!(err["code"], "invalid_command");
    assert_eq!(err["seq"], 7);

    send_json(
        &mut write_a,
        &serde_json::json!({"type": "ping", "seq": 8}),
    )
    .await;
    let err = read_json(&mut lines_a).await;
    assert_eq!(err["code"], "invalid_command");
    assert_eq!(err["seq"], 8);

    // Accepted command, then a stale seq
    send_json(
        &mut write_a,
        &serde_json::json!({"type": "command", "seq": 9, "actions": ["hardDrop"]}),
    )
    .await;
    let ack = read_json(&mut lines_a).await;
    assert_eq!(ack["type"], "ack");
    assert_eq!(ack["seq"], 9);

    send_json(
        &mut write_a,
        &serde_json::json!({"type": "command", "seq": 9, "actions": ["hardDrop"]}),
    )
    .await;
    assert_eq!(read_json(&mut lines_a).await["code"], "invalid_command");

    // Controller leaves; the observer is promoted
    drop(write_a);
    drop(lines_a);

    let mut seq = 10u64;
    let mut promoted = false;
    for _ in 0..50 {
        send_json(
            &mut write_b,
            &serde_json::json!({"type": "command", "seq": seq, "actions": ["hold"]}),
        )
        .await;
        let reply = read_json(&mut lines_b).await;
        if reply["type"] == "ack" {
            assert_eq!(reply["seq"], seq);
            promoted = true;
            break;
        }
        assert_eq!(reply["code"], "not_controller");
        seq += 1;
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert!(promoted);

    // Release and claim again
    seq += 1;
    send_json(
        &mut write_b,
        &serde_json::json!({"type": "control", "seq": seq, "action": "release"}),
    )
    .await;
    assert_eq!(read_json(&mut lines_b).await["type"], "ack");
    seq += 1;
    send_json(
        &mut write_b,
        &serde_json::json!({"type": "command", "seq": seq, "actions": ["hold"]}),
    )
    .await;
    assert_eq!(read_json(&mut lines_b).await["code"], "not_controller");
    seq += 1;
    send_json(
        &mut write_b,
        &serde_json::json!({"type": "control", "seq": seq, "action": "claim"}),
    )
    .await;
    assert_eq!(read_json(&mut lines_b).await["type"], "ack");

    server_handle.abort();
    game_handle.abort();
}

#[tokio::test]
async fn full_command_queue_reports_backpressure() {
    // Nobody drains the command channel
    let (cmd_tx, _cmd_rx) = mpsc::channel::<InboundCommand>(1);
    let (_out_tx, out_rx) = mpsc::unbounded_channel::<OutboundMessage>();
    let (ready_tx, ready_rx) = oneshot::channel();

    let server_handle = tokio::spawn(async move {
        let _ = run_server(test_config(1), cmd_tx, out_rx, Some(ready_tx)).await;
    });
    let addr = tokio::time::timeout(Duration::from_secs(2), ready_rx)
        .await
        .unwrap()
        .unwrap();

    let (mut lines, mut write_half) = connect(addr).await;
    send_json(
        &mut write_half,
        &serde_json::json!({"type": "hello", "seq": 1, "client": {"name": "flood"}, "stream_observations": false}),
    )
    .await;
    assert_eq!(read_json(&mut lines).await["type"], "welcome");

    send_json(
        &mut write_half,
        &serde_json::json!({"type": "command", "seq": 2, "actions": ["hold"]}),
    )
    .await;
    send_json(
        &mut write_half,
        &serde_json::json!({"type": "command", "seq": 3, "actions": ["hold"]}),
    )
    .await;

    let err = read_json(&mut lines).await;
    assert_eq!(err["type"], "error");
    assert_eq!(err["code"], "backpressure");
    assert_eq!(err["seq"], 3);

    server_handle.abort();
}
