//! Wire format for the remote-control adapter
//!
//! One JSON object per line. Every message carries `type`, `seq` and `ts`
//! (milliseconds); replies echo the `seq` of the request they answer.

use arrayvec::ArrayVec;
use serde::{Deserialize, Serialize};

use crate::core::PuzzleConfig;
use crate::types::{GameAction, LockEvent, PieceKind, Rotation, TSpinKind};

/// Protocol version reported in `welcome`
pub const PROTOCOL_VERSION: &str = "1.0.0";

/// Most actions a single command may carry
pub const MAX_ACTIONS: usize = 32;

// Inbound: solver -> puzzle

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HelloType {
    #[default]
    Hello,
}

/// Opening message; nothing else is accepted from a client before it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HelloMessage {
    #[serde(rename = "type", default)]
    pub msg_type: HelloType,
    pub seq: u64,
    #[serde(default)]
    pub ts: u64,
    pub client: ClientInfo,
    #[serde(default = "default_protocol_version")]
    pub protocol_version: String,
    /// Receive an observation after every processed command
    #[serde(default = "default_stream")]
    pub stream_observations: bool,
}

fn default_protocol_version() -> String {
    PROTOCOL_VERSION.to_string()
}

fn default_stream() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientInfo {
    pub name: String,
    #[serde(default)]
    pub version: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssignedRole {
    Controller,
    Observer,
}

/// Batch of engine actions, applied in order by the game task
#[derive(Debug, Clone, Deserialize)]
pub struct CommandMessage {
    pub seq: u64,
    #[serde(default)]
    pub ts: u64,
    pub actions: ActionList,
}

/// Action names resolved while decoding, so an unknown name rejects the whole batch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionList(pub ArrayVec<GameAction, MAX_ACTIONS>);

impl<'de> Deserialize<'de> for ActionList {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        use serde::de::Error;

        let names = Vec::<String>::deserialize(deserializer)?;
        if names.len() > MAX_ACTIONS {
            return Err(D::Error::custom(format!(
                "at most {} actions per command, got {}",
                MAX_ACTIONS,
                names.len()
            )));
        }
        names
            .iter()
            .map(|name| {
                GameAction::from_str(name)
                    .ok_or_else(|| D::Error::custom(format!("unknown action: {}", name)))
            })
            .collect::<Result<ArrayVec<_, MAX_ACTIONS>, _>>()
            .map(ActionList)
    }
}

impl Serialize for ActionList {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.0.iter().map(GameAction::as_str))
    }
}

/// Replace the running puzzle
#[derive(Debug, Clone, Deserialize)]
pub struct ResetMessage {
    pub seq: u64,
    #[serde(default)]
    pub ts: u64,
    pub config: PuzzleConfig,
}

/// Claim or give up the controller seat
#[derive(Debug, Clone, Deserialize)]
pub struct ControlMessage {
    pub seq: u64,
    #[serde(default)]
    pub ts: u64,
    pub action: ControlAction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControlAction {
    Claim,
    Release,
}

// Outbound: puzzle -> solver

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WelcomeType {
    Welcome,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AckType {
    Ack,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AckStatus {
    Ok,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorType {
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// Anything but `hello` before the handshake
    HandshakeRequired,
    NotController,
    /// `claim` while another client holds the seat
    ControllerActive,
    /// Malformed JSON, unknown type or action, or a non-increasing seq
    InvalidCommand,
    /// The game task's queue is full; the command was dropped
    Backpressure,
}

/// Reply to `hello`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WelcomeMessage {
    #[serde(rename = "type")]
    pub msg_type: WelcomeType,
    pub seq: u64,
    pub ts: u64,
    pub protocol_version: String,
    pub client_id: u64,
    pub role: AssignedRole,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub controller_id: Option<u64>,
    pub game_id: String,
}

/// Sent to the issuing client once the game task has applied its command
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AckMessage {
    #[serde(rename = "type")]
    pub msg_type: AckType,
    pub seq: u64,
    pub ts: u64,
    pub status: AckStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorMessage {
    #[serde(rename = "type")]
    pub msg_type: ErrorType,
    pub seq: u64,
    pub ts: u64,
    pub code: ErrorCode,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObservationType {
    Observation,
}

/// Full puzzle state after a command
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservationMessage {
    #[serde(rename = "type")]
    pub msg_type: ObservationType,
    pub seq: u64,
    pub ts: u64,
    /// A piece is falling and the puzzle has not ended
    pub playable: bool,
    pub game_over: bool,
    pub solved: bool,
    pub board: BoardSnapshot,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<ActivePieceSnapshot>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ghost_y: Option<i8>,
    pub next: Vec<PieceKindLower>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hold: Option<PieceKindLower>,
    pub hold_enabled: bool,
    /// Tracked goals only, in fixed rule order
    pub rules: Vec<RuleStatus>,
    pub combo: i32,
    pub can_undo: bool,
    pub can_redo: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_event: Option<LastEvent>,
    pub state_hash: StateHash,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardSnapshot {
    pub width: u8,
    pub height: u8,
    pub hidden_rows: u8,
    /// Row-major cell ids: 0 empty, 1-7 pieces, 8 filler, 9 neutral
    pub cells: Vec<Vec<u8>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivePieceSnapshot {
    pub kind: PieceKindLower,
    pub rotation: RotationLower,
    pub x: i8,
    pub y: i8,
    /// Occupied board cells as `[x, y]`
    pub cells: Vec<[i8; 2]>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleStatus {
    pub label: String,
    pub value: u32,
    pub goal: u32,
}

/// Piece letter on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PieceKindLower {
    I,
    L,
    O,
    Z,
    T,
    J,
    S,
}

macro_rules! piece_kind_mapping {
    ($($kind:ident),*) => {
        impl From<PieceKind> for PieceKindLower {
            fn from(kind: PieceKind) -> Self {
                match kind {
                    $(PieceKind::$kind => PieceKindLower::$kind,)*
                }
            }
        }

        impl From<PieceKindLower> for PieceKind {
            fn from(kind: PieceKindLower) -> Self {
                match kind {
                    $(PieceKindLower::$kind => PieceKind::$kind,)*
                }
            }
        }
    };
}

piece_kind_mapping!(I, L, O, Z, T, J, S);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RotationLower {
    North,
    East,
    South,
    West,
}

impl From<Rotation> for RotationLower {
    fn from(rotation: Rotation) -> Self {
        match rotation {
            Rotation::North => RotationLower::North,
            Rotation::East => RotationLower::East,
            Rotation::South => RotationLower::South,
            Rotation::West => RotationLower::West,
        }
    }
}

/// FNV-1a digest of the observable state, 16 lowercase hex digits on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StateHash(pub u64);

impl Serialize for StateHash {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&format_args!("{:016x}", self.0))
    }
}

impl<'de> Deserialize<'de> for StateHash {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let hex = String::deserialize(deserializer)?;
        u64::from_str_radix(hex.trim(), 16)
            .map(StateHash)
            .map_err(serde::de::Error::custom)
    }
}

/// Outcome of the most recent lock
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastEvent {
    pub lines_cleared: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tspin: Option<TSpinLower>,
    /// Goal label credited by this lock, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule: Option<String>,
    pub combo: i32,
    pub perfect_clear: bool,
}

impl From<LockEvent> for LastEvent {
    fn from(event: LockEvent) -> Self {
        let tspin = match event.tspin {
            TSpinKind::None => None,
            TSpinKind::Mini => Some(TSpinLower::Mini),
            TSpinKind::Full => Some(TSpinLower::Full),
        };
        Self {
            lines_cleared: event.lines_cleared,
            tspin,
            rule: event.rule.map(|rule| rule.label().to_string()),
            combo: event.combo,
            perfect_clear: event.perfect_clear,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TSpinLower {
    Mini,
    Full,
}

// Decoding

/// Inbound line after decoding
#[derive(Debug, Clone)]
pub enum ParsedMessage {
    Hello(HelloMessage),
    Command(CommandMessage),
    Reset(Box<ResetMessage>),
    Control(ControlMessage),
    /// Well-formed JSON with a `type` this adapter does not speak
    Unknown(UnknownMessage),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnknownMessage {
    pub seq: u64,
}

const INBOUND_TYPES: [&str; 4] = ["hello", "command", "reset", "control"];

/// Decode one protocol line
///
/// A known `type` with a bad body is an error; an unknown `type` is returned
/// as [`ParsedMessage::Unknown`] so the caller can answer with its seq.
pub fn parse_message(json: &str) -> Result<ParsedMessage, serde_json::Error> {
    #[derive(Deserialize)]
    #[serde(tag = "type", rename_all = "lowercase")]
    enum Inbound {
        Hello(HelloMessage),
        Command(CommandMessage),
        Reset(ResetMessage),
        Control(ControlMessage),
    }

    #[derive(Deserialize)]
    struct Envelope {
        #[serde(rename = "type", default)]
        msg_type: Option<String>,
        #[serde(default)]
        seq: Option<u64>,
    }

    let err = match serde_json::from_str::<Inbound>(json) {
        Ok(Inbound::Hello(m)) => return Ok(ParsedMessage::Hello(m)),
        Ok(Inbound::Command(m)) => return Ok(ParsedMessage::Command(m)),
        Ok(Inbound::Reset(m)) => return Ok(ParsedMessage::Reset(Box::new(m))),
        Ok(Inbound::Control(m)) => return Ok(ParsedMessage::Control(m)),
        Err(err) => err,
    };

    let envelope: Envelope = serde_json::from_str(json)?;
    match envelope.msg_type.as_deref() {
        Some(t) if INBOUND_TYPES.contains(&t) => Err(err),
        _ => Ok(ParsedMessage::Unknown(UnknownMessage {
            seq: envelope.seq.unwrap_or(0),
        })),
    }
}

// Constructors

pub fn create_hello(seq: u64, client_name: &str) -> HelloMessage {
    HelloMessage {
        msg_type: HelloType::Hello,
        seq,
        ts: current_timestamp_ms(),
        client: ClientInfo {
            name: client_name.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
        protocol_version: default_protocol_version(),
        stream_observations: default_stream(),
    }
}

pub fn create_welcome(
    seq: u64,
    client_id: u64,
    role: AssignedRole,
    controller_id: Option<u64>,
) -> WelcomeMessage {
    WelcomeMessage {
        msg_type: WelcomeType::Welcome,
        seq,
        ts: current_timestamp_ms(),
        protocol_version: default_protocol_version(),
        client_id,
        role,
        controller_id,
        game_id: "nazotet".to_string(),
    }
}

pub fn create_ack(seq: u64) -> AckMessage {
    AckMessage {
        msg_type: AckType::Ack,
        seq,
        ts: current_timestamp_ms(),
        status: AckStatus::Ok,
    }
}

pub fn create_error(seq: u64, code: ErrorCode, message: &str) -> ErrorMessage {
    ErrorMessage {
        msg_type: ErrorType::Error,
        seq,
        ts: current_timestamp_ms(),
        code,
        message: message.into(),
    }
}

/// Wall-clock milliseconds since the Unix epoch, 0 if the clock is before it
pub(crate) fn current_timestamp_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
