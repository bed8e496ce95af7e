//! Nazotet (workspace facade crate).
//!
//! Re-exports `nazotet::{core,adapter,types}` while the implementation lives
//! in dedicated crates under `crates/`.

pub mod cli;

pub use nazotet_adapter as adapter;
pub use nazotet_core as core;
pub use nazotet_types as types;
