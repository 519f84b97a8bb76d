use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::modules::cube::{FACES, N_FIELD, Pose, cell_coords};
use crate::modules::sim::{AGENTS, Cell, PLAYERS, Simulation};

/// Outcome of a move submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveStatus {
    Ok,
    AlreadyMoved,
    GameFinished,
    #[serde(other)]
    Unknown,
}

/// Outcome of a practice-match start request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StartStatus {
    Ok,
    Started,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartResponse {
    pub status: StartStatus,
    pub game_id: i32,
    pub start: i64,
}

/// Board as the game server reports it after each move.
///
/// `field[face][row][col]` is `[owner, val]` with owner `-1` for unowned
/// cells; `agent[i]` is `[face, row, col, heading]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub status: MoveStatus,
    #[serde(default)]
    pub now: i64,
    #[serde(default)]
    pub turn: i32,
    #[serde(rename = "move", default)]
    pub moves: [i32; AGENTS],
    #[serde(default)]
    pub score: [i32; PLAYERS],
    #[serde(default)]
    pub field: [[[[i32; 2]; 5]; 5]; FACES],
    #[serde(default)]
    pub agent: [[i32; 4]; AGENTS],
    #[serde(default)]
    pub special: [i32; AGENTS],
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("cell ({face}, {row}, {col}) has owner {owner}; expected -1..={}", PLAYERS - 1)]
    InvalidOwner {
        face: usize,
        row: usize,
        col: usize,
        owner: i32,
    },
    #[error("cell ({face}, {row}, {col}) has paint level {val} for owner {owner}")]
    InvalidPaint {
        face: usize,
        row: usize,
        col: usize,
        owner: i32,
        val: i32,
    },
    #[error("agent {agent} has out-of-range pose {pose:?}")]
    InvalidAgent { agent: usize, pose: [i32; 4] },
    #[error("agent {agent} has negative special charges {charges}")]
    InvalidCharges { agent: usize, charges: i32 },
}

fn decode_cell(face: usize, row: usize, col: usize, raw: [i32; 2]) -> Result<Cell, DecodeError> {
    let [owner, val] = raw;
    match owner {
        -1 if val == 0 => Ok(Cell::EMPTY),
        0..=2 if val == 1 || val == 2 => Ok(Cell {
            owner: Some(owner as usize),
            val: val as u8,
        }),
        -1 | 0..=2 => Err(DecodeError::InvalidPaint {
            face,
            row,
            col,
            owner,
            val,
        }),
        _ => Err(DecodeError::InvalidOwner {
            face,
            row,
            col,
            owner,
        }),
    }
}

/// Build a simulation from a server snapshot, recounting area from the field.
pub fn decode(snapshot: &GameSnapshot) -> Result<Simulation, DecodeError> {
    let mut field = [Cell::EMPTY; N_FIELD];
    for (cell, slot) in field.iter_mut().enumerate() {
        let (face, row, col) = cell_coords(cell);
        let (face, row, col) = (face as usize, row as usize, col as usize);
        *slot = decode_cell(face, row, col, snapshot.field[face][row][col])?;
    }

    let mut agents = [Pose::new(0, 0, 0, 0); AGENTS];
    for (agent, raw) in snapshot.agent.iter().enumerate() {
        let pose = Pose::new(raw[0], raw[1], raw[2], raw[3]);
        if !pose.is_valid() {
            return Err(DecodeError::InvalidAgent { agent, pose: *raw });
        }
        agents[agent] = pose;
    }

    if let Some((agent, charges)) = snapshot
        .special
        .iter()
        .enumerate()
        .find(|(_, charges)| **charges < 0)
    {
        return Err(DecodeError::InvalidCharges {
            agent,
            charges: *charges,
        });
    }

    Ok(Simulation::from_parts(
        field,
        agents,
        snapshot.turn,
        snapshot.moves,
        snapshot.score,
        snapshot.special,
    ))
}

/// Render a simulation in the server's wire shape.
pub fn encode(sim: &Simulation, status: MoveStatus, now: i64) -> GameSnapshot {
    let mut field = [[[[-1, 0]; 5]; 5]; FACES];
    for (cell, state) in sim.field().iter().enumerate() {
        let (face, row, col) = cell_coords(cell);
        field[face as usize][row as usize][col as usize] = [
            state.owner.map(|o| o as i32).unwrap_or(-1),
            state.val as i32,
        ];
    }

    let mut agent = [[0; 4]; AGENTS];
    for (slot, pose) in agent.iter_mut().zip(sim.agents()) {
        *slot = [pose.face, pose.row, pose.col, pose.heading];
    }

    GameSnapshot {
        status,
        now,
        turn: sim.turn(),
        moves: *sim.last_moves(),
        score: *sim.score(),
        field,
        agent,
        special: *sim.specials(),
    }
}
