use serde::{Deserialize, Serialize};

/// Identifier of a node within a single `Graph`'s arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(pub usize);

/// Identifier of an edge within a single `Graph`'s arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EdgeId(pub usize);

/// Grid position. `pri` is the row, `sec` is the column, matching the
/// `node_id = 32*pri + sec` addressing used by the original engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coordinate {
    pub pri: i16,
    pub sec: i16,
}

impl Coordinate {
    pub fn new(pri: i16, sec: i16) -> Self {
        Coordinate { pri, sec }
    }
}

/// A colour argument. Negative sentinels from the source engine
/// (`BACKGROUND_COLOR`, `MOST_COMMON_COLOR`, `LEAST_COMMON_COLOR`) become
/// explicit variants instead of magic numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Color {
    Literal(u8),
    Background,
    MostCommon,
    LeastCommon,
}

/// A size argument. Negative sentinels (`MAX_SIZE`, `MIN_SIZE`, `ODD_SIZE`)
/// become explicit variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Size {
    Literal(u16),
    Max,
    Min,
    Odd,
}

/// Edge direction between nodes sharing a row or column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EdgeDirection {
    Horizontal,
    Vertical,
}

/// One of the eight compass directions a `move_node`/`extend_node` can use,
/// matching the source engine's `deltas[]` table order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
    UpLeft,
    DownLeft,
    UpRight,
    DownRight,
}

impl Direction {
    pub const ALL: [Direction; 8] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
        Direction::UpLeft,
        Direction::DownLeft,
        Direction::UpRight,
        Direction::DownRight,
    ];

    /// (d_pri, d_sec) step for a single move in this direction.
    pub fn delta(self) -> (i16, i16) {
        match self {
            Direction::Up => (-1, 0),
            Direction::Down => (1, 0),
            Direction::Left => (0, -1),
            Direction::Right => (0, 1),
            Direction::UpLeft => (-1, -1),
            Direction::DownLeft => (1, -1),
            Direction::UpRight => (-1, 1),
            Direction::DownRight => (1, 1),
        }
    }
}

/// The cardinal-only relative position of one node with respect to another,
/// as resolved by `get_relative_pos`. `None` corresponds to `NO_DIRECTION`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CardinalDirection {
    Up,
    Down,
    Left,
    Right,
}

/// Rotation amount for `rotate_node`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rotation {
    ClockWise,
    CounterClockWise,
    DoubleClockWise,
}
