use rand::Rng;
use rand::seq::SliceRandom;

use crate::modules::cube::{FACES, N};
use crate::modules::directive::Directive;
use crate::modules::sim::{AGENTS, NO_MOVE, PlayerId, ProgressError, Simulation, owner_of};

/// Agent slots the bot steers; both belong to player 0.
pub const CONTROLLED: [usize; 2] = [0, 5];
/// Chance per controllable agent of swapping its move for a special.
pub const SPECIAL_CHANCE: f64 = 0.1;

/// Result of the exhaustive one-tick lookahead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOutcome {
    /// Cells owned by the bot's player after the best pair.
    pub coverage: usize,
    /// Every heading pair reaching `coverage`, in search order.
    pub best: Vec<[i32; 2]>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    pub coverage: usize,
    pub headings: [i32; 2],
    pub directives: [Directive; 2],
}

fn move_list(h0: i32, h5: i32) -> [i32; AGENTS] {
    let mut moves = [NO_MOVE; AGENTS];
    moves[CONTROLLED[0]] = h0;
    moves[CONTROLLED[1]] = h5;
    moves
}

/// Try all 16 heading pairs for the controllable agents, one tick each, with
/// everyone else standing still.
pub fn search(sim: &Simulation) -> Result<SearchOutcome, ProgressError> {
    let player: PlayerId = owner_of(CONTROLLED[0]);
    let mut coverage = 0;
    let mut best: Vec<[i32; 2]> = Vec::with_capacity(16);
    for h0 in 0..4 {
        for h5 in 0..4 {
            let mut branch = sim.clone();
            branch.progress(&move_list(h0, h5))?;
            let count = branch.evaluate(player);
            if best.is_empty() || count > coverage {
                coverage = count;
                best.clear();
                best.push([h0, h5]);
            } else if count == coverage {
                best.push([h0, h5]);
            }
        }
    }
    Ok(SearchOutcome { coverage, best })
}

/// Random special for an agent that would otherwise step in `heading`: a
/// straight dash or a teleport to a uniformly random cell.
pub fn random_special<R: Rng>(heading: i32, rng: &mut R) -> Directive {
    if rng.gen_bool(0.5) {
        return Directive::Dash(heading);
    }
    Directive::Teleport {
        face: rng.gen_range(0..FACES as i32),
        row: rng.gen_range(0..N),
        col: rng.gen_range(0..N),
    }
}

/// Pick this turn's directives for both controllable agents.
pub fn decide<R: Rng>(sim: &Simulation, rng: &mut R) -> Result<Decision, ProgressError> {
    let outcome = search(sim)?;
    let headings = *outcome.best.choose(rng).unwrap_or(&[0, 0]);

    let mut directives = [Directive::Step(headings[0]), Directive::Step(headings[1])];
    for (slot, agent) in CONTROLLED.iter().enumerate() {
        if sim.special(*agent) > 0 && rng.gen_bool(SPECIAL_CHANCE) {
            directives[slot] = random_special(headings[slot], rng);
        }
    }

    Ok(Decision {
        coverage: outcome.coverage,
        headings,
        directives,
    })
}
