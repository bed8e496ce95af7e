//! Nazotet runner.
//!
//! `serve` exposes a puzzle over the TCP adapter; `replay` applies a fixed
//! action list and prints the resulting observation.

use anyhow::Result;

use nazotet::adapter::{serve, ServerConfig};
use nazotet::cli::{load_config, parse_args, replay, Command};
use nazotet::core::GameState;

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();

    match parse_args(&args)? {
        Command::Serve { config } => {
            let puzzle = load_config(&config)?;
            let game = GameState::new(&puzzle);
            let server_config = ServerConfig::from_env();
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(serve(server_config, game, None))
        }
        Command::Replay { config, actions } => {
            let puzzle = load_config(&config)?;
            println!("{}", replay(&puzzle, &actions)?);
            Ok(())
        }
    }
}
