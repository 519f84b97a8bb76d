use std::env;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use rand::SeedableRng;
use rand::rngs::StdRng;

mod local;
mod play;
mod search;

use local::run_local;
use play::{PlayArgs, run_play};
use search::run_search;

#[derive(Parser)]
#[command(
    name = "cubepaint",
    version,
    about = "Cube territory-painting bot (simulation, search, game-server client)",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Play a match against the remote game server
    Play {
        /// Game server base URL (also reads GAME_SERVER)
        #[arg(long)]
        server: Option<String>,
        /// Player token (also reads TOKEN)
        #[arg(long)]
        token: Option<String>,
        /// Join this game instead of starting a practice match (also reads GAME_ID)
        #[arg(long)]
        game_id: Option<i32>,
        /// Practice match mode
        #[arg(long, default_value_t = 0)]
        mode: i32,
        /// Practice match start delay
        #[arg(long, default_value_t = 0)]
        delay: i32,
        /// RNG seed for tie-breaks and specials (omit for entropy)
        #[arg(long)]
        seed: Option<u64>,
        /// HTTP timeout in ms
        #[arg(long, default_value_t = 10_000)]
        timeout_ms: u64,
    },
    /// Play a full offline match against an in-process server
    Local {
        /// RNG seed for tie-breaks and specials (omit for entropy)
        #[arg(long)]
        seed: Option<u64>,
        /// Special moves available to every agent
        #[arg(long, default_value_t = 2)]
        charges: i32,
    },
    /// Print the bot's choice for a saved server reply
    Search {
        /// JSON file holding one /api/move reply
        #[arg(long)]
        snapshot: PathBuf,
        /// RNG seed for tie-breaks and specials (omit for entropy)
        #[arg(long)]
        seed: Option<u64>,
    },
}

pub fn run() {
    let cli = Cli::parse();
    if let Err(err) = dispatch(cli.command) {
        eprintln!("error: {:#}", err);
        std::process::exit(1);
    }
}

fn dispatch(command: Command) -> anyhow::Result<()> {
    match command {
        Command::Play {
            server,
            token,
            game_id,
            mode,
            delay,
            seed,
            timeout_ms,
        } => {
            let game_id = match game_id {
                Some(id) => Some(id),
                None => env::var("GAME_ID")
                    .ok()
                    .map(|v| v.parse::<i32>())
                    .transpose()
                    .context("GAME_ID must be an integer")?,
            };
            run_play(PlayArgs {
                server: server.or_else(|| env::var("GAME_SERVER").ok()),
                token: token.or_else(|| env::var("TOKEN").ok()),
                game_id,
                mode,
                delay,
                seed,
                timeout_ms,
            })
        }
        Command::Local { seed, charges } => run_local(seed, charges),
        Command::Search { snapshot, seed } => run_search(&snapshot, seed),
    }
}

fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

fn render_score(score: &[i32]) -> String {
    score
        .iter()
        .enumerate()
        .map(|(player, points)| format!("p{}={}", player, points))
        .collect::<Vec<_>>()
        .join(" ")
}
