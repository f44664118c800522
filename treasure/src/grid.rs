use std::collections::HashSet;
use std::{fmt::Display, str::FromStr};

use log::{info, warn};
use rand::{seq::SliceRandom, Rng};

use crate::error::{GridError, HuntError};
use crate::find::{find_path, MapTrait, NodeReference};

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Direction {
    Right,
    Left,
    Down,
    Up,
}

impl Direction {
    /// The order in which neighbors are handed to the path finder
    pub const EXPLORATION_ORDER: [Direction; 4] = [
        Direction::Right,
        Direction::Left,
        Direction::Down,
        Direction::Up,
    ];
}

impl Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Direction::Up => "up",
                Direction::Down => "down",
                Direction::Left => "left",
                Direction::Right => "right",
            }
        )
    }
}

/// A cell coordinate, x grows to the right and y grows downwards.
/// Positions outside of any grid are representable so candidate moves can be built and filtered.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The neighboring position, `None` when it does not fit in an `i32` coordinate
    pub fn step(self, direction: Direction) -> Option<Self> {
        match direction {
            Direction::Right => Some(Self::new(self.x.checked_add(1)?, self.y)),
            Direction::Left => Some(Self::new(self.x.checked_sub(1)?, self.y)),
            Direction::Down => Some(Self::new(self.x, self.y.checked_add(1)?)),
            Direction::Up => Some(Self::new(self.x, self.y.checked_sub(1)?)),
        }
    }

    /// The direction leading from `self` to `other`, if they are adjacent
    pub fn direction_to(self, other: Position) -> Option<Direction> {
        Direction::EXPLORATION_ORDER
            .into_iter()
            .find(|d| self.step(*d) == Some(other))
    }
}

impl Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl NodeReference for Position {}

/// Checks the parameters a random grid is generated from
pub fn check_parameters(width: i32, height: i32, density: f64) -> Result<(), GridError> {
    if width <= 0 || height <= 0 {
        return Err(GridError::InvalidDimensions { width, height });
    }
    // also rejects NaN
    if !(0.0..1.0).contains(&density) {
        return Err(GridError::InvalidDensity(density));
    }
    Ok(())
}

/// The maze: a rectangle of cells with walls, the player, and the treasure in the far corner
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    width: i32,
    height: i32,
    walls: HashSet<Position>,
    player_pos: Position,
    treasure_pos: Position,
    visited: HashSet<Position>,
}

impl Grid {
    /// Creates a grid with a random set of walls covering `density` of the cells.
    ///
    /// The start and treasure cells are cleared after sampling, so the realized density can end up
    /// slightly lower. Nothing guarantees the treasure can be reached, see
    /// [`Grid::generate_solvable`] for that.
    pub fn new<R: Rng + ?Sized>(
        width: i32,
        height: i32,
        density: f64,
        rng: &mut R,
    ) -> Result<Self, GridError> {
        check_parameters(width, height, density)?;

        let cell_count = width as usize * height as usize;
        let wall_count = (cell_count as f64 * density).floor() as usize;

        let mut cells = Vec::with_capacity(cell_count);
        for x in 0..width {
            for y in 0..height {
                cells.push(Position::new(x, y));
            }
        }

        let walls = cells.choose_multiple(rng, wall_count).copied();
        let grid = Self::with_walls(width, height, walls)?;

        info!(
            "generated {}x{} maze with {} walls (requested density {})",
            width,
            height,
            grid.walls.len(),
            density
        );

        Ok(grid)
    }

    /// Generates grids until one has a path from the start to the treasure.
    pub fn generate_solvable<R: Rng + ?Sized>(
        width: i32,
        height: i32,
        density: f64,
        rng: &mut R,
        attempts: u32,
    ) -> Result<Self, HuntError> {
        for attempt in 1..=attempts {
            let grid = Self::new(width, height, density, rng)?;
            if grid.is_solvable() {
                return Ok(grid);
            }
            warn!("maze {}/{} has no path to the treasure, regenerating", attempt, attempts);
        }

        Err(HuntError::NoSolvableMaze(attempts))
    }

    /// Creates a grid with the given walls, the start and treasure cells are always kept open
    pub fn with_walls(
        width: i32,
        height: i32,
        walls: impl IntoIterator<Item = Position>,
    ) -> Result<Self, GridError> {
        if width <= 0 || height <= 0 {
            return Err(GridError::InvalidDimensions { width, height });
        }

        let player_pos = Position::new(0, 0);
        let treasure_pos = Position::new(width - 1, height - 1);

        let mut grid = Self {
            width,
            height,
            walls: HashSet::new(),
            player_pos,
            treasure_pos,
            visited: HashSet::from([player_pos]),
        };

        for wall in walls {
            if !grid.is_in_bounds(wall) {
                return Err(GridError::WallOutOfBounds {
                    wall,
                    width,
                    height,
                });
            }
            grid.walls.insert(wall);
        }

        grid.walls.remove(&player_pos);
        grid.walls.remove(&treasure_pos);

        Ok(grid)
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn walls(&self) -> &HashSet<Position> {
        &self.walls
    }

    /// Every cell the player has stood on, including the start
    pub fn visited(&self) -> &HashSet<Position> {
        &self.visited
    }

    pub fn player_pos(&self) -> Position {
        self.player_pos
    }

    pub fn treasure_pos(&self) -> Position {
        self.treasure_pos
    }

    pub fn is_in_bounds(&self, pos: Position) -> bool {
        (0..self.width).contains(&pos.x) && (0..self.height).contains(&pos.y)
    }

    pub fn is_valid_position(&self, pos: Position) -> bool {
        self.is_in_bounds(pos) && !self.walls.contains(&pos)
    }

    /// The open cells next to `pos`, ordered right, left, down, up
    pub fn get_valid_moves(&self, pos: Position) -> Vec<Position> {
        Direction::EXPLORATION_ORDER
            .into_iter()
            .filter_map(|direction| pos.step(direction))
            .filter(|next| self.is_valid_position(*next))
            .collect()
    }

    /// Moves the player if `new_pos` is an open cell, returns false and leaves the grid untouched
    /// otherwise.
    pub fn move_player(&mut self, new_pos: Position) -> bool {
        if !self.is_valid_position(new_pos) {
            return false;
        }

        self.player_pos = new_pos;
        self.visited.insert(new_pos);
        true
    }

    pub fn is_treasure_found(&self) -> bool {
        self.player_pos == self.treasure_pos
    }

    pub fn is_solvable(&self) -> bool {
        let treasure = self.treasure_pos;
        find_path(self.player_pos, self, |pos| pos == treasure).is_some()
    }
}

impl MapTrait for Grid {
    type Reference = Position;

    fn neighbors_of(&self, node: Self::Reference) -> impl Iterator<Item = Self::Reference> {
        self.get_valid_moves(node).into_iter()
    }
}

impl Display for Grid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for y in 0..self.height {
            for x in 0..self.width {
                let pos = Position::new(x, y);
                let c = if pos == self.player_pos {
                    "@"
                } else if pos == self.treasure_pos {
                    "$"
                } else if self.walls.contains(&pos) {
                    "X"
                } else if self.visited.contains(&pos) {
                    "."
                } else {
                    " "
                };
                write!(f, "{}", c)?;
            }
            writeln!(f)?;
        }

        Ok(())
    }
}

/// Parses a layout where `X` marks a wall and any of ` .@$` an open cell.
/// The player always starts top left and the treasure sits bottom right.
impl FromStr for Grid {
    type Err = GridError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rows: Vec<&str> = s.lines().collect();
        let width = rows.first().map_or(0, |row| row.chars().count());

        let mut walls = Vec::new();
        for (y, row) in rows.iter().enumerate() {
            if row.chars().count() != width {
                return Err(GridError::Layout {
                    line: y + 1,
                    reason: format!("expected {} cells, found {}", width, row.chars().count()),
                });
            }

            for (x, c) in row.chars().enumerate() {
                match c {
                    'X' => walls.push(Position::new(x as i32, y as i32)),
                    ' ' | '.' | '@' | '$' => {}
                    _ => {
                        return Err(GridError::Layout {
                            line: y + 1,
                            reason: format!("unexpected cell {:?}", c),
                        })
                    }
                }
            }
        }

        Self::with_walls(width as i32, rows.len() as i32, walls)
    }
}
