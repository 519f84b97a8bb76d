pub mod modules;

pub use modules::bot::{Bot, BotError, MatchSummary};
pub use modules::cube::{
    self, Boundary, CELLS_PER_FACE, FACES, N, N_FIELD, Pose, cell_coords, cell_index,
    frame_face, neighbor_face,
};
pub use modules::directive::Directive;
pub use modules::search::{CONTROLLED, Decision, SPECIAL_CHANCE, SearchOutcome, decide, search};
pub use modules::server::{
    DEFAULT_GAME_SERVER, GameServer, HttpConfig, HttpGameServer, LocalGameServer, ServerError,
    opening,
};
pub use modules::sim::{
    AGENTS, AgentIndex, Cell, DASH_BASE, MAX_MOVE_CODE, Move, NO_MOVE, PLAYERS, PlayerId,
    ProgressError, SCORING_START, Simulation, TELEPORT_BASE, TOTAL_TURN, owner_of,
};
pub use modules::snapshot::{
    DecodeError, GameSnapshot, MoveStatus, StartResponse, StartStatus, decode, encode,
};
