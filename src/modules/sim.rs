use thiserror::Error;

use crate::modules::cube::{CELLS_PER_FACE, N, N_FIELD, Pose, cell_index, frame_face};

pub type PlayerId = usize;
pub type AgentIndex = usize;

/// Agents on the board; one move code per agent per tick.
pub const AGENTS: usize = 6;
/// Players sharing the board.
pub const PLAYERS: usize = 3;
/// Length of a match in ticks.
pub const TOTAL_TURN: i32 = 294;
/// First tick whose area counts towards the score.
pub const SCORING_START: i32 = TOTAL_TURN / 2;
/// Cells advanced by a dash.
pub const DASH_LENGTH: usize = 5;
/// Move code meaning "stay put".
pub const NO_MOVE: i32 = -1;
/// First dash code.
pub const DASH_BASE: i32 = 4;
/// First teleport code.
pub const TELEPORT_BASE: i32 = 8;
/// Last valid move code.
pub const MAX_MOVE_CODE: i32 = TELEPORT_BASE + N_FIELD as i32 - 1;

/// Player that owns agent slot `agent`. Slots 3..6 mirror slots 2..=0.
pub const fn owner_of(agent: AgentIndex) -> PlayerId {
    if agent < 3 { agent } else { 5 - agent }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProgressError {
    #[error("move list length {len} is not a multiple of {}", AGENTS)]
    InvalidLength { len: usize },
    #[error("agent {agent} received move code {code} outside {}..={}", NO_MOVE, MAX_MOVE_CODE)]
    InvalidMoveCode { agent: AgentIndex, code: i32 },
    #[error("agent {agent} has no special moves left for code {code}")]
    NoSpecialCharges { agent: AgentIndex, code: i32 },
}

/// Decoded per-agent move code.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Move {
    Stay,
    /// Rotate by `turn` quarter turns, then step once.
    Step { turn: i32 },
    /// Rotate by `turn` quarter turns, then advance [`DASH_LENGTH`] cells.
    Dash { turn: i32 },
    /// Jump to `target` (flattened, in the mover's face frame) and sweep its
    /// four neighbours.
    Teleport { target: usize },
}

impl Move {
    pub fn from_code(agent: AgentIndex, code: i32) -> Result<Self, ProgressError> {
        match code {
            NO_MOVE => Ok(Move::Stay),
            0..DASH_BASE => Ok(Move::Step { turn: code }),
            DASH_BASE..TELEPORT_BASE => Ok(Move::Dash {
                turn: code - DASH_BASE,
            }),
            TELEPORT_BASE..=MAX_MOVE_CODE => Ok(Move::Teleport {
                target: (code - TELEPORT_BASE) as usize,
            }),
            _ => Err(ProgressError::InvalidMoveCode { agent, code }),
        }
    }

    pub const fn code(self) -> i32 {
        match self {
            Move::Stay => NO_MOVE,
            Move::Step { turn } => turn,
            Move::Dash { turn } => DASH_BASE + turn,
            Move::Teleport { target } => TELEPORT_BASE + target as i32,
        }
    }

    pub const fn is_special(self) -> bool {
        matches!(self, Move::Dash { .. } | Move::Teleport { .. })
    }
}

/// Paint state of one cell. `owner` is `None` exactly when `val` is 0.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Cell {
    pub owner: Option<PlayerId>,
    pub val: u8,
}

impl Cell {
    pub const EMPTY: Cell = Cell {
        owner: None,
        val: 0,
    };

    pub const fn painted(owner: PlayerId) -> Self {
        Self {
            owner: Some(owner),
            val: 2,
        }
    }
}

/// Normal-move claim on a cell succeeds when the mover is alone, or shares it
/// only with the agent slot numbered like its own player (its teammate).
fn sole_claimant(mask: u8, agent: AgentIndex, player: PlayerId) -> bool {
    mask == 1 << agent || mask == (1 << agent) | (1 << player)
}

/// Player whose bit is the only one set in a special-move mask.
fn exclusive_player(mask: u8) -> Option<PlayerId> {
    match mask {
        1 => Some(0),
        2 => Some(1),
        4 => Some(2),
        _ => None,
    }
}

/// Full game state. Cloned freely by the search; mutated in place by
/// [`Simulation::progress`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Simulation {
    field: [Cell; N_FIELD],
    agents: [Pose; AGENTS],
    turn: i32,
    last_moves: [i32; AGENTS],
    score: [i32; PLAYERS],
    area: [i32; PLAYERS],
    special: [i32; AGENTS],
}

impl Simulation {
    /// Empty board with the given agents and special charges, at turn 0.
    /// Every pose must be on the board.
    pub fn new(agents: [Pose; AGENTS], special: [i32; AGENTS]) -> Self {
        debug_assert!(agents.iter().all(|p| p.is_valid()), "off-board agent in {:?}", agents);
        Self {
            field: [Cell::EMPTY; N_FIELD],
            agents,
            turn: 0,
            last_moves: [NO_MOVE; AGENTS],
            score: [0; PLAYERS],
            area: [0; PLAYERS],
            special,
        }
    }

    /// Rebuild a state from its parts; area is recounted from `field`.
    pub fn from_parts(
        field: [Cell; N_FIELD],
        agents: [Pose; AGENTS],
        turn: i32,
        last_moves: [i32; AGENTS],
        score: [i32; PLAYERS],
        special: [i32; AGENTS],
    ) -> Self {
        let mut area = [0; PLAYERS];
        for cell in field.iter() {
            if let Some(owner) = cell.owner {
                area[owner] += 1;
            }
        }
        Self {
            field,
            agents,
            turn,
            last_moves,
            score,
            area,
            special,
        }
    }

    pub fn turn(&self) -> i32 {
        self.turn
    }

    pub fn set_turn(&mut self, turn: i32) {
        self.turn = turn;
    }

    pub fn is_finished(&self) -> bool {
        self.turn >= TOTAL_TURN
    }

    pub fn cell(&self, cell: usize) -> Cell {
        self.field[cell]
    }

    pub fn cell_at(&self, face: i32, row: i32, col: i32) -> Cell {
        self.field[cell_index(face, row, col)]
    }

    pub fn field(&self) -> &[Cell; N_FIELD] {
        &self.field
    }

    /// Overwrite a cell, keeping the area counters in step. `state.owner`
    /// must be a player id.
    pub fn set_cell(&mut self, cell: usize, state: Cell) {
        debug_assert!(state.owner.is_none_or(|p| p < PLAYERS), "bad owner in {:?}", state);
        if let Some(prev) = self.field[cell].owner {
            self.area[prev] -= 1;
        }
        if let Some(next) = state.owner {
            self.area[next] += 1;
        }
        self.field[cell] = state;
    }

    pub fn agent(&self, agent: AgentIndex) -> Pose {
        self.agents[agent]
    }

    pub fn agents(&self) -> &[Pose; AGENTS] {
        &self.agents
    }

    /// Move codes applied by the most recent tick.
    pub fn last_moves(&self) -> &[i32; AGENTS] {
        &self.last_moves
    }

    pub fn score(&self) -> &[i32; PLAYERS] {
        &self.score
    }

    pub fn area(&self, player: PlayerId) -> i32 {
        self.area[player]
    }

    pub fn special(&self, agent: AgentIndex) -> i32 {
        self.special[agent]
    }

    pub fn specials(&self) -> &[i32; AGENTS] {
        &self.special
    }

    /// Live cells owned by `player`, counted from the board.
    pub fn evaluate(&self, player: PlayerId) -> usize {
        self.field
            .iter()
            .filter(|c| c.owner == Some(player))
            .count()
    }

    /// Advance one tick per six move codes, indexed in member 0's frame.
    pub fn progress(&mut self, moves: &[i32]) -> Result<(), ProgressError> {
        self.progress_as(0, moves)
    }

    /// Advance one tick per six move codes. Slot `frame_face(member, i)` of each
    /// chunk is agent `i`'s code. The whole list is validated before anything
    /// moves; on error the state is untouched.
    pub fn progress_as(&mut self, member: usize, moves: &[i32]) -> Result<(), ProgressError> {
        if moves.len() % AGENTS != 0 {
            return Err(ProgressError::InvalidLength { len: moves.len() });
        }

        let mut ticks = Vec::with_capacity(moves.len() / AGENTS);
        let mut charges = self.special;
        for chunk in moves.chunks(AGENTS) {
            let mut tick = [Move::Stay; AGENTS];
            for (agent, slot) in tick.iter_mut().enumerate() {
                let code = chunk[frame_face(member, agent)];
                let mv = Move::from_code(agent, code)?;
                if mv.is_special() {
                    if charges[agent] <= 0 {
                        return Err(ProgressError::NoSpecialCharges { agent, code });
                    }
                    charges[agent] -= 1;
                }
                *slot = mv;
            }
            ticks.push(tick);
        }

        for tick in ticks {
            self.apply_tick(&tick);
        }
        Ok(())
    }

    fn apply_tick(&mut self, moves: &[Move; AGENTS]) {
        // Normal moves: everyone steps, then claims are resolved against the
        // combined mask of this tick's arrivals.
        let mut claims = [0u8; N_FIELD];
        let mut targets: [Option<usize>; AGENTS] = [None; AGENTS];
        for (agent, mv) in moves.iter().enumerate() {
            if let Move::Step { turn } = *mv {
                let pose = self.agents[agent].rotated(turn).step();
                self.agents[agent] = pose;
                targets[agent] = Some(pose.cell());
                claims[pose.cell()] |= 1 << agent;
            }
        }
        for (agent, target) in targets.iter().enumerate() {
            let Some(cell) = *target else {
                continue;
            };
            let player = owner_of(agent);
            if sole_claimant(claims[cell], agent, player)
                || self.field[cell].owner == Some(player)
            {
                self.paint(player, cell);
            }
        }

        let mut marks = [0u8; N_FIELD];
        let mut marked = Vec::new();
        let mut mark = |cell: usize, player: PlayerId| {
            if marks[cell] == 0 {
                marked.push(cell);
            }
            marks[cell] |= 1 << player;
        };
        for (agent, mv) in moves.iter().enumerate() {
            let player = owner_of(agent);
            match *mv {
                Move::Dash { turn } => {
                    self.special[agent] -= 1;
                    let mut pose = self.agents[agent].rotated(turn);
                    for _ in 0..DASH_LENGTH {
                        pose = pose.step();
                        mark(pose.cell(), player);
                    }
                    self.agents[agent] = pose;
                }
                Move::Teleport { target } => {
                    self.special[agent] -= 1;
                    let face = frame_face(player, target / CELLS_PER_FACE) as i32;
                    let row = target as i32 / N % N;
                    let col = target as i32 % N;
                    let landing = Pose::new(face, row, col, 0);
                    mark(landing.cell(), player);
                    for heading in 0..4 {
                        let neighbour = Pose { heading, ..landing }.step();
                        mark(neighbour.cell(), player);
                    }
                    self.agents[agent] = landing;
                }
                Move::Stay | Move::Step { .. } => {}
            }
        }
        for cell in marked {
            if let Some(player) = exclusive_player(marks[cell]) {
                self.force_paint(player, cell);
            }
        }

        if self.turn >= SCORING_START {
            for player in 0..PLAYERS {
                self.score[player] += self.area[player];
            }
        }
        self.turn += 1;
        for (agent, mv) in moves.iter().enumerate() {
            self.last_moves[agent] = mv.code();
        }
    }

    /// Normal-move paint: claims empty cells, re-affirms own cells and wears
    /// down a rival's cell one level per hit.
    fn paint(&mut self, player: PlayerId, cell: usize) {
        let current = self.field[cell];
        match current.owner {
            None => {
                self.area[player] += 1;
                self.field[cell] = Cell::painted(player);
            }
            Some(owner) if owner == player => {
                self.field[cell].val = 2;
            }
            Some(owner) if current.val == 1 => {
                self.area[owner] -= 1;
                self.field[cell] = Cell::EMPTY;
            }
            Some(_) => {
                self.field[cell].val -= 1;
            }
        }
    }

    /// Special-move paint: the cell becomes fully `player`'s regardless of its
    /// previous state.
    fn force_paint(&mut self, player: PlayerId, cell: usize) {
        let current = self.field[cell].owner;
        if current != Some(player) {
            self.area[player] += 1;
            if let Some(prev) = current {
                self.area[prev] -= 1;
            }
        }
        self.field[cell] = Cell::painted(player);
    }
}
