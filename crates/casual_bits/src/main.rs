// Runs a single game natively, the settings optionally coming from a RON file

use std::path::PathBuf;

use anyhow::{bail, Context as _};
use bits_helpers::config::load_ron;
use clap::Parser;
use strum::IntoEnumIterator;

mod game;

use game::{Game, GameConfig};

#[derive(Parser, Debug)]
#[command(name = "casual_bits", version, about = "Launcher for the casual games")]
struct Cli {
    /// Game to run (see --list)
    game: Option<Game>,
    /// RON file with a `match3` and/or `merge` section, missing fields keep their defaults
    #[arg(long, short)]
    config: Option<PathBuf>,
    /// List available games and exit
    #[arg(long, short)]
    list: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.list {
        list_games();
        return Ok(());
    }

    let Some(game) = cli.game else {
        list_games();
        bail!("No game selected");
    };

    let config = match &cli.config {
        Some(path) => load_ron::<GameConfig>(path)
            .with_context(|| format!("Could not load settings from {}", path.display()))?,
        None => GameConfig::default(),
    };

    println!("Launching {game}");
    game.run(config);
    Ok(())
}

fn list_games() {
    println!("Available games:");
    for game in Game::iter() {
        println!("  {game:10} - {}", game.description());
    }
}
