#![warn(clippy::pedantic)]
#![allow(clippy::must_use_candidate)]

pub const DELVE_VERSION: &str = env!("CARGO_PKG_VERSION");

// Core modules
pub mod ability;
pub mod character;
pub mod combat;
pub mod command;
pub mod data_paths;
pub mod dice;
pub mod enemy;
pub mod error;
pub mod flags;
pub mod health;
pub mod helpers;
pub mod item;
pub mod loader;
pub mod prompt;
pub mod repl;
pub mod room;
pub mod script;
pub mod session;
pub mod stat;
pub mod turn;
pub mod view;

// Re-exports for convenience
pub use ability::{Ability, AbilityKind, DamageType, UseOutcome};
pub use character::{AbilityHandle, Character};
pub use dice::{DiceSource, LoadedDice, RandomDice};
pub use enemy::Enemy;
pub use error::EngineError;
pub use item::Item;
pub use loader::load_game;
pub use prompt::{Prompter, ScriptedPrompter};
pub use repl::run_repl;
pub use session::Session;
pub use stat::{Stat, StatKey};
pub use view::{View, ViewItem};
