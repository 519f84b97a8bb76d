use std::time::Duration;

use anyhow::Context;
use cubepaint::{Bot, DEFAULT_GAME_SERVER, HttpConfig, HttpGameServer};
use tracing::info;

use super::{make_rng, render_score};

const PLACEHOLDER_TOKEN: &str = "YOUR_TOKEN";

pub(super) struct PlayArgs {
    pub server: Option<String>,
    pub token: Option<String>,
    pub game_id: Option<i32>,
    pub mode: i32,
    pub delay: i32,
    pub seed: Option<u64>,
    pub timeout_ms: u64,
}

pub(super) fn run_play(args: PlayArgs) -> anyhow::Result<()> {
    let config = HttpConfig {
        base_url: args
            .server
            .unwrap_or_else(|| DEFAULT_GAME_SERVER.to_string()),
        token: args
            .token
            .unwrap_or_else(|| PLACEHOLDER_TOKEN.to_string()),
        game_id: args.game_id,
        practice_mode: args.mode,
        practice_delay: args.delay,
        timeout: Duration::from_millis(args.timeout_ms),
    };
    info!(server = %config.base_url, game_id = ?config.game_id, "connecting");

    let mut server = HttpGameServer::connect(config).context("joining game")?;
    println!("Playing game {}", server.game_id());

    let mut bot = Bot::new(make_rng(args.seed));
    let summary = bot.run(&mut server).context("playing match")?;

    println!(
        "Finished ({:?}) after {} turn(s); last turn {} | {}",
        summary.final_status,
        summary.turns_played,
        summary.last_turn,
        render_score(&summary.score)
    );
    Ok(())
}
