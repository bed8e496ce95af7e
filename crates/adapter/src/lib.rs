//! Adapter module - remote puzzle control via TCP socket with JSON protocol
//!
//! External solvers drive a puzzle session through a line-delimited JSON
//! protocol over TCP.
//!
//! # Protocol Overview
//!
//! 1. **Connection**: Client connects to TCP socket (default: 127.0.0.1:7878)
//! 2. **Handshake**: Client sends `hello`, server responds with `welcome`
//! 3. **Controller Assignment**: First client to hello becomes the controller
//! 4. **Commanding**: Controller sends `command` (action list) or `reset` (new puzzle)
//! 5. **Observation Streaming**: Every processed command is acked to its
//!    sender and followed by an `observation` broadcast
//!
//! # Message Types
//!
//! ## Client → Server
//!
//! - **hello**: Handshake with client info; `stream_observations` opts into broadcasts
//! - **command**: Up to 32 actions (moveLeft, rotateCw, hardDrop, hold, undo, ...)
//! - **reset**: Load a puzzle from the same JSON config the CLI reads
//! - **control**: Claim or release controller status
//!
//! ## Server → Client
//!
//! - **welcome**, **ack**, **observation**, **error**
//!
//! Error codes: `handshake_required`, `not_controller`, `controller_active`,
//! `invalid_command`, `backpressure`.
//!
//! # Environment Variables
//!
//! - `NAZOTET_HOST`: Bind address (default: "127.0.0.1")
//! - `NAZOTET_PORT`: Port number (default: 7878)
//! - `NAZOTET_MAX_PENDING`: Command queue depth before `backpressure` (default: 32)
//!
//! # Example Protocol Flow
//!
//! ```text
//! Client -> Server: {"type":"hello","seq":1,"client":{"name":"solver"}}
//! Server -> Client: {"type":"welcome","seq":1,"ts":1234567890,"protocol_version":"1.0.0","client_id":1,"role":"controller",...}
//! Server -> Client: {"type":"observation","seq":1,"ts":1234567890,"playable":true,"board":{...},...}
//! Client -> Server: {"type":"command","seq":2,"actions":["moveLeft","rotateCw","hardDrop"]}
//! Server -> Client: {"type":"ack","seq":2,"ts":1234567892,"status":"ok"}
//! Server -> Client: {"type":"observation","seq":2,...}
//! ```
//!
//! See [`protocol`] for message structures, [`server`] for the TCP server and
//! [`runtime`] for the game task that owns the puzzle state.

pub mod protocol;
pub mod runtime;
pub mod server;

pub use nazotet_core as core;
pub use nazotet_types as types;

// Re-export protocol types for convenience
pub use protocol::*;
pub use runtime::{
    apply_command, run_game, serve, ClientCommand, InboundCommand, InboundPayload,
    OutboundMessage,
};
pub use server::*;
