use thiserror::Error;

use crate::grid::Position;

/// Errors raised when a grid is built from bad parameters or a bad layout
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GridError {
    #[error("grid dimensions must be positive, got {width}x{height}")]
    InvalidDimensions { width: i32, height: i32 },

    #[error("wall density must be within [0, 1), got {0}")]
    InvalidDensity(f64),

    #[error("wall {wall} lies outside the {width}x{height} grid")]
    WallOutOfBounds {
        wall: Position,
        width: i32,
        height: i32,
    },

    #[error("invalid layout on line {line}: {reason}")]
    Layout { line: usize, reason: String },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum HuntError {
    #[error(transparent)]
    Grid(#[from] GridError),

    #[error("no path from {from} to the treasure at {treasure}")]
    Unsolvable { from: Position, treasure: Position },

    #[error("no solvable maze found after {0} attempts")]
    NoSolvableMaze(u32),
}
