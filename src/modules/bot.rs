use rand::Rng;
use thiserror::Error;
use tracing::{debug, info};

use crate::modules::directive::Directive;
use crate::modules::search::{Decision, decide};
use crate::modules::server::{GameServer, ServerError};
use crate::modules::sim::{PLAYERS, ProgressError};
use crate::modules::snapshot::{DecodeError, GameSnapshot, MoveStatus, decode};

#[derive(Debug, Error)]
pub enum BotError {
    #[error(transparent)]
    Server(#[from] ServerError),
    #[error("bad snapshot: {0}")]
    Decode(#[from] DecodeError),
    #[error("search failed: {0}")]
    Search(#[from] ProgressError),
}

/// How a match ended from the bot's point of view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchSummary {
    /// Turns for which the bot received a board and answered it.
    pub turns_played: u32,
    /// Turn counter of the last board seen.
    pub last_turn: i32,
    pub score: [i32; PLAYERS],
    pub final_status: MoveStatus,
}

/// Greedy coverage bot driving the two controllable agents.
#[derive(Debug)]
pub struct Bot<R> {
    rng: R,
}

impl<R: Rng> Bot<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    /// Choose directives for the board in `snapshot`.
    pub fn plan(&mut self, snapshot: &GameSnapshot) -> Result<Decision, BotError> {
        let sim = decode(snapshot)?;
        Ok(decide(&sim, &mut self.rng)?)
    }

    /// Play until the server reports the match is over.
    pub fn run<S: GameServer + ?Sized>(&mut self, server: &mut S) -> Result<MatchSummary, BotError> {
        let mut next = [
            Directive::Step(self.rng.gen_range(0..4)),
            Directive::Step(self.rng.gen_range(0..4)),
        ];
        let mut summary = MatchSummary {
            turns_played: 0,
            last_turn: 0,
            score: [0; PLAYERS],
            final_status: MoveStatus::Unknown,
        };

        loop {
            let status = server.submit_move(&next[0], &next[1])?;
            debug!(?status, dir0 = %next[0], dir5 = %next[1], "submitted move");
            match status {
                MoveStatus::AlreadyMoved => continue,
                MoveStatus::Ok => {}
                MoveStatus::GameFinished | MoveStatus::Unknown => {
                    summary.final_status = status;
                    break;
                }
            }

            let snapshot = server.fetch_state()?;
            let decision = self.plan(&snapshot)?;
            info!(
                turn = snapshot.turn,
                score = ?snapshot.score,
                coverage = decision.coverage,
                dir0 = %decision.directives[0],
                dir5 = %decision.directives[1],
                "turn planned"
            );

            summary.turns_played += 1;
            summary.last_turn = snapshot.turn;
            summary.score = snapshot.score;
            next = decision.directives;
        }

        info!(
            turns = summary.turns_played,
            score = ?summary.score,
            status = ?summary.final_status,
            "match over"
        );
        Ok(summary)
    }
}
