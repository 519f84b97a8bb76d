use anyhow::Context;
use cubepaint::{Bot, LocalGameServer, PLAYERS, opening};

use super::{make_rng, render_score};

pub(super) fn run_local(seed: Option<u64>, charges: i32) -> anyhow::Result<()> {
    if charges < 0 {
        anyhow::bail!("charges must be >= 0, got {}", charges);
    }

    let mut server = LocalGameServer::new(opening(charges));
    let mut bot = Bot::new(make_rng(seed));
    let summary = bot.run(&mut server).context("sandbox match")?;

    let sim = server.simulation();
    let area: Vec<i32> = (0..PLAYERS).map(|p| sim.area(p)).collect();
    println!(
        "Sandbox match over after {} turn(s) | score {} | area {}",
        summary.turns_played,
        render_score(sim.score()),
        render_score(&area)
    );
    Ok(())
}
