use serde::{Deserialize, Serialize};

/// Cells along each edge of a face.
pub const N: i32 = 5;
/// Number of cube faces.
pub const FACES: usize = 6;
/// Cells on one face.
pub const CELLS_PER_FACE: usize = (N * N) as usize;
/// Cells on the whole cube surface.
pub const N_FIELD: usize = FACES * CELLS_PER_FACE;
/// Row delta per heading.
pub const D_ROW: [i32; 4] = [1, 0, -1, 0];
/// Column delta per heading.
pub const D_COL: [i32; 4] = [0, 1, 0, -1];

/// Flattened index of `(face, row, col)`.
pub const fn cell_index(face: i32, row: i32, col: i32) -> usize {
    ((face * N + row) * N + col) as usize
}

/// Inverse of [`cell_index`].
pub const fn cell_coords(cell: usize) -> (i32, i32, i32) {
    let cell = cell as i32;
    (cell / (N * N), cell / N % N, cell % N)
}

/// The edge of a face an agent walks off.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Boundary {
    /// `row` would become `N`.
    RowHigh,
    /// `row` would become `-1`.
    RowLow,
    /// `col` would become `N`.
    ColHigh,
    /// `col` would become `-1`.
    ColLow,
}

impl Boundary {
    pub const ALL: [Boundary; 4] = [
        Boundary::RowHigh,
        Boundary::RowLow,
        Boundary::ColHigh,
        Boundary::ColLow,
    ];

    const fn slot(self) -> usize {
        match self {
            Boundary::RowHigh => 0,
            Boundary::RowLow => 1,
            Boundary::ColHigh => 2,
            Boundary::ColLow => 3,
        }
    }

    /// Position and heading on the destination face, given the row and column
    /// the agent had when it left the source face.
    pub const fn reenter(self, row: i32, col: i32) -> (i32, i32, i32) {
        match self {
            Boundary::RowHigh => (col, N - 1, 3),
            Boundary::RowLow => (0, N - 1 - col, 0),
            Boundary::ColHigh => (N - 1, row, 2),
            Boundary::ColLow => (N - 1 - row, 0, 1),
        }
    }
}

/// Destination face for every `(face, boundary)` pair, columns ordered as
/// [`Boundary::ALL`]. Faces 0..3 and 3..6 form opposite triples; `RowHigh` and
/// `ColHigh` stay inside the triple, the other two edges cross to the
/// opposite one.
const EDGE_FACES: [[i32; 4]; FACES] = [
    [1, 4, 2, 3],
    [2, 3, 0, 5],
    [0, 5, 1, 4],
    [4, 1, 5, 0],
    [5, 0, 3, 2],
    [3, 2, 4, 1],
];

/// Face reached by leaving `face` through `boundary`.
pub const fn neighbor_face(face: i32, boundary: Boundary) -> i32 {
    EDGE_FACES[face as usize][boundary.slot()]
}

/// Face permutation through which `member` sees the cube.
///
/// Member 0 sees the canonical numbering. Move lists passed to
/// [`crate::Simulation::progress_as`] are indexed in this frame and teleport
/// targets are decoded in it.
pub const fn frame_face(member: usize, face: usize) -> usize {
    let (m_half, m_rot) = (member / 3, member % 3);
    let (f_half, f_rot) = (face / 3, face % 3);
    ((f_half + 1) * m_rot + f_rot) % 3 + (m_half + f_half) % 2 * 3
}

/// Location and facing of an agent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pose {
    pub face: i32,
    pub row: i32,
    pub col: i32,
    pub heading: i32,
}

impl Pose {
    pub const fn new(face: i32, row: i32, col: i32, heading: i32) -> Self {
        Self {
            face,
            row,
            col,
            heading,
        }
    }

    pub const fn cell(self) -> usize {
        cell_index(self.face, self.row, self.col)
    }

    pub const fn is_valid(self) -> bool {
        self.face >= 0
            && self.face < FACES as i32
            && self.row >= 0
            && self.row < N
            && self.col >= 0
            && self.col < N
            && self.heading >= 0
            && self.heading < 4
    }

    /// Advance the heading index by `quarter_turns`.
    pub const fn rotated(self, quarter_turns: i32) -> Self {
        Self {
            heading: (self.heading + quarter_turns).rem_euclid(4),
            ..self
        }
    }

    /// Move one cell forward, wrapping onto the adjacent face when needed.
    pub const fn step(self) -> Self {
        let row = self.row + D_ROW[self.heading as usize];
        let col = self.col + D_COL[self.heading as usize];
        let boundary = if row >= N {
            Boundary::RowHigh
        } else if row < 0 {
            Boundary::RowLow
        } else if col >= N {
            Boundary::ColHigh
        } else if col < 0 {
            Boundary::ColLow
        } else {
            return Self { row, col, ..self };
        };
        self.cross(boundary)
    }

    const fn cross(self, boundary: Boundary) -> Self {
        let (row, col, heading) = boundary.reenter(self.row, self.col);
        Self {
            face: neighbor_face(self.face, boundary),
            row,
            col,
            heading,
        }
    }
}
