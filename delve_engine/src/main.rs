#![warn(clippy::pedantic)]
#![allow(clippy::must_use_candidate)]
//! ** Delve **
//! Dice-driven dungeon crawl

use std::path::PathBuf;

use delve_engine::data_paths::data_root;
use delve_engine::prompt::LinePrompter;
use delve_engine::repl::{choose_class, present};
use delve_engine::{Character, DiceSource, RandomDice, Session, View, load_game, run_repl};

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

#[derive(Parser, Debug)]
#[command(author, version, about = "A text adventure of dice and darkness.")]
struct Cli {
    /// Directory holding level.json, items.json, enemies.json and classes.json.
    #[arg(long)]
    data_dir: Option<PathBuf>,
    /// Start as this class instead of choosing interactively.
    #[arg(long)]
    class: Option<String>,
    /// Seed the dice for a reproducible game.
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let data_dir = cli.data_dir.unwrap_or_else(|| data_root().to_path_buf());
    info!("Start: loading game data from '{}'", data_dir.display());
    let game = load_game(&data_dir).context("while loading game data")?;
    info!("Game data loaded successfully.");

    let dice: Box<dyn DiceSource> = match cli.seed {
        Some(seed) => Box::new(RandomDice::seeded(seed)),
        None => Box::new(RandomDice::new()),
    };

    let mut io = LinePrompter::stdio();
    println!("{:^60}\n", "D E L V E");
    let class = match cli.class {
        Some(class) => Some(class),
        None => choose_class(&game, &mut io)?,
    };
    let mut session = match class {
        Some(class) => Session::with_class(game, &class, dice)?,
        None => Session::new(game, Character::new(), dice)?,
    };

    info!("Starting the game!");
    let mut view = View::new();
    session.start(&mut view).context("while entering the start room")?;
    present(&mut view, &mut io)?;
    run_repl(&mut session, &mut io)
}
