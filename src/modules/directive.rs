use std::fmt;
use std::str::FromStr;

use crate::modules::cube::{FACES, N, cell_index};
use crate::modules::sim::{DASH_BASE, TELEPORT_BASE};

/// What one controllable agent is told to do this turn, in the form the game
/// server accepts: `"<h>"`, `"<h>s"` or `"<face>-<row>-<col>"`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Directive {
    /// Turn by `h` quarter turns and step once.
    Step(i32),
    /// Turn by `h` quarter turns and dash.
    Dash(i32),
    /// Teleport to a cell in the player's own face frame.
    Teleport { face: i32, row: i32, col: i32 },
}

impl Directive {
    /// Whether every field is on the board: headings `0..4`, teleport
    /// coordinates inside a `FACES` x `N` x `N` grid.
    pub const fn is_valid(self) -> bool {
        match self {
            Directive::Step(h) | Directive::Dash(h) => 0 <= h && h < 4,
            Directive::Teleport { face, row, col } => {
                0 <= face && face < FACES as i32 && 0 <= row && row < N && 0 <= col && col < N
            }
        }
    }

    /// Move code understood by [`crate::Simulation::progress`], or `None` when
    /// a field is off the board.
    pub const fn move_code(self) -> Option<i32> {
        if !self.is_valid() {
            return None;
        }
        Some(match self {
            Directive::Step(h) => h,
            Directive::Dash(h) => DASH_BASE + h,
            Directive::Teleport { face, row, col } => {
                TELEPORT_BASE + cell_index(face, row, col) as i32
            }
        })
    }

    pub const fn is_special(self) -> bool {
        !matches!(self, Directive::Step(_))
    }

    pub const fn label(&self) -> &'static str {
        match self {
            Directive::Step(_) => "step",
            Directive::Dash(_) => "dash",
            Directive::Teleport { .. } => "teleport",
        }
    }
}

impl fmt::Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Directive::Step(h) => write!(f, "{}", h),
            Directive::Dash(h) => write!(f, "{}s", h),
            Directive::Teleport { face, row, col } => write!(f, "{}-{}-{}", face, row, col),
        }
    }
}

fn parse_heading(raw: &str) -> Result<i32, String> {
    let h = raw
        .trim()
        .parse::<i32>()
        .map_err(|_| format!("heading must be an integer, got {:?}", raw))?;
    if !(0..4).contains(&h) {
        return Err(format!("heading must be 0..=3, got {}", h));
    }
    Ok(h)
}

fn parse_coord(raw: &str, name: &str, bound: i32) -> Result<i32, String> {
    let v = raw
        .trim()
        .parse::<i32>()
        .map_err(|_| format!("{} must be an integer", name))?;
    if !(0..bound).contains(&v) {
        return Err(format!("{} must be 0..{}, got {}", name, bound, v));
    }
    Ok(v)
}

impl FromStr for Directive {
    type Err = String;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let trimmed = input.trim();
        if trimmed.contains('-') {
            let parts: Vec<_> = trimmed.split('-').collect();
            if parts.len() != 3 {
                return Err("teleport must be formatted as face-row-col".into());
            }
            let face = parse_coord(parts[0], "face", FACES as i32)?;
            let row = parse_coord(parts[1], "row", N)?;
            let col = parse_coord(parts[2], "col", N)?;
            return Ok(Directive::Teleport { face, row, col });
        }
        if let Some(h) = trimmed.strip_suffix('s') {
            return Ok(Directive::Dash(parse_heading(h)?));
        }
        Ok(Directive::Step(parse_heading(trimmed)?))
    }
}
