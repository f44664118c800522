pub mod config;
pub mod error;
pub mod find;
pub mod grid;
pub mod hunt;

pub use error::{GridError, HuntError};
pub use find::{find_path, find_path_with, MapTrait, PathFinder, PathFinderState, PathResult};
pub use grid::{Direction, Grid, Position};
pub use hunt::{Hunter, Tick};
