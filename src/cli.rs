//! Command-line parsing and the one-shot replay mode.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};

use crate::adapter::build_observation;
use crate::core::{GameState, PuzzleConfig};
use crate::types::GameAction;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Run the TCP adapter on one puzzle
    Serve { config: PathBuf },
    /// Apply actions and print the final observation
    Replay {
        config: PathBuf,
        actions: Vec<GameAction>,
    },
}

pub const USAGE: &str = "usage:\n  nazotet serve --config <path>\n  nazotet replay --config <path> --actions <a,b,c>";

pub fn parse_args(args: &[String]) -> Result<Command> {
    let Some(mode) = args.first() else {
        return Err(anyhow!("missing command\n{}", USAGE));
    };
    if mode != "serve" && mode != "replay" {
        return Err(anyhow!("unknown command: {}\n{}", mode, USAGE));
    }

    let mut config = None;
    let mut actions = None;
    let mut i = 1usize;
    while i < args.len() {
        match args[i].as_str() {
            "--config" => {
                i += 1;
                let v = args
                    .get(i)
                    .ok_or_else(|| anyhow!("{}: missing value for --config", mode))?;
                config = Some(PathBuf::from(v));
            }
            "--actions" if mode == "replay" => {
                i += 1;
                let v = args
                    .get(i)
                    .ok_or_else(|| anyhow!("replay: missing value for --actions"))?;
                actions = Some(parse_actions(v)?);
            }
            other => {
                return Err(anyhow!("{}: unknown argument: {}", mode, other));
            }
        }
        i += 1;
    }

    let config = config.ok_or_else(|| anyhow!("{}: --config is required", mode))?;
    if mode == "serve" {
        Ok(Command::Serve { config })
    } else {
        Ok(Command::Replay {
            config,
            actions: actions.unwrap_or_default(),
        })
    }
}

/// Comma-separated action names; blanks are skipped
pub fn parse_actions(list: &str) -> Result<Vec<GameAction>> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| GameAction::from_str(s).ok_or_else(|| anyhow!("unknown action: {}", s)))
        .collect()
}

pub fn load_config(path: &Path) -> Result<PuzzleConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("read puzzle config {}", path.display()))?;
    PuzzleConfig::from_json(&text).with_context(|| format!("parse puzzle config {}", path.display()))
}

/// Run `actions` against a fresh game and render the result as one observation line
pub fn replay(config: &PuzzleConfig, actions: &[GameAction]) -> Result<String> {
    let mut game = GameState::new(config);
    for &action in actions {
        game.apply_action(action);
    }
    let obs = build_observation(actions.len() as u64, &game.snapshot());
    Ok(serde_json::to_string(&obs)?)
}
