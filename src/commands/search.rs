use std::fs;
use std::path::Path;

use anyhow::Context;
use cubepaint::{Bot, GameSnapshot};

use super::make_rng;

pub(super) fn run_search(path: &Path, seed: Option<u64>) -> anyhow::Result<()> {
    let bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let snapshot: GameSnapshot = serde_json::from_slice(&bytes)
        .with_context(|| format!("parsing {}", path.display()))?;

    let mut bot = Bot::new(make_rng(seed));
    let decision = bot.plan(&snapshot)?;

    println!(
        "turn {} | best coverage {} | headings {:?}",
        snapshot.turn, decision.coverage, decision.headings
    );
    println!(
        "dir0={} ({}) dir5={} ({})",
        decision.directives[0],
        decision.directives[0].label(),
        decision.directives[1],
        decision.directives[1].label()
    );
    Ok(())
}
