use std::{collections::VecDeque, time::Duration};

use log::{debug, info, warn};

use crate::error::HuntError;
use crate::find::find_path;
use crate::grid::{Grid, Position};

/// Minimum time between two consecutive moves of the player
pub const MOVE_DELAY: Duration = Duration::from_millis(500);

/// What happened during one tick of the hunt
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Tick {
    /// the move delay has not elapsed yet
    Waiting,
    Moved(Position),
    /// the player stepped onto the treasure
    Found(Position),
    /// there is no path from the player to the treasure
    Stuck,
}

/// Walks the player along a depth-first path towards the treasure, one cell per move delay.
///
/// The path is consumed front to back and recomputed from the player position once it runs out.
#[derive(Debug)]
pub struct Hunter {
    grid: Grid,
    path: VecDeque<Position>,
    move_delay: Duration,
    last_move: Duration,
    plans: usize,
}

impl Hunter {
    /// Fails if the treasure cannot be reached from the start at all
    pub fn new(grid: Grid, move_delay: Duration) -> Result<Self, HuntError> {
        let mut hunter = Self {
            grid,
            path: VecDeque::new(),
            move_delay,
            last_move: Duration::ZERO,
            plans: 0,
        };

        if !hunter.replan() {
            return Err(HuntError::Unsolvable {
                from: hunter.grid.player_pos(),
                treasure: hunter.grid.treasure_pos(),
            });
        }

        Ok(hunter)
    }

    fn replan(&mut self) -> bool {
        let from = self.grid.player_pos();
        let treasure = self.grid.treasure_pos();

        match find_path(from, &self.grid, |pos| pos == treasure) {
            Some(path) => {
                debug!("planned {} steps from {}", path.len(), from);
                self.path = path.into();
                self.plans += 1;
                true
            }
            None => {
                self.path.clear();
                false
            }
        }
    }

    /// Advances the hunt. `now` is the time elapsed since the hunt started.
    pub fn tick(&mut self, now: Duration) -> Tick {
        if self.path.is_empty() && !self.replan() {
            return Tick::Stuck;
        }

        if now.saturating_sub(self.last_move) < self.move_delay {
            return Tick::Waiting;
        }

        let Some(next) = self.path.pop_front() else {
            return Tick::Stuck;
        };

        let from = self.grid.player_pos();
        self.last_move = now;

        if self.grid.move_player(next) {
            match from.direction_to(next) {
                Some(direction) => debug!("moved {} to {}", direction, next),
                None => debug!("moved to {}", next),
            }
        } else {
            // the plan no longer matches the grid, start over from where we are
            warn!("rejected step from {} to {}", from, next);
            self.path.clear();
        }

        if self.path.is_empty() {
            // a failure shows up as Stuck on the next tick
            self.replan();
        }

        let pos = self.grid.player_pos();
        if self.grid.is_treasure_found() {
            info!("treasure found at {} after visiting {} cells", pos, self.grid.visited().len());
            Tick::Found(pos)
        } else {
            Tick::Moved(pos)
        }
    }

    pub fn is_finished(&self) -> bool {
        self.grid.is_treasure_found()
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Steps still to be taken, the next one first
    pub fn path(&self) -> &VecDeque<Position> {
        &self.path
    }

    pub fn move_delay(&self) -> Duration {
        self.move_delay
    }

    /// How many times a path has been computed
    pub fn plans(&self) -> usize {
        self.plans
    }
}

#[cfg(test)]
mod test {

    use super::*;

    fn ms(millis: u64) -> Duration {
        Duration::from_millis(millis)
    }

    fn create_open_hunter() -> Hunter {
        Hunter::new(Grid::with_walls(3, 3, []).unwrap(), MOVE_DELAY).unwrap()
    }

    // right, left, down, up on an open 3x3 grid snakes through all nine cells
    fn open_route() -> Vec<Position> {
        vec![
            Position::new(0, 0),
            Position::new(1, 0),
            Position::new(2, 0),
            Position::new(2, 1),
            Position::new(1, 1),
            Position::new(0, 1),
            Position::new(0, 2),
            Position::new(1, 2),
            Position::new(2, 2),
        ]
    }

    #[test]
    fn test_initial_path() {
        let hunter = create_open_hunter();

        assert_eq!(hunter.plans(), 1);
        assert_eq!(
            hunter.path().iter().copied().collect::<Vec<_>>(),
            open_route()
        );
    }

    #[test]
    fn test_walk_to_treasure() {
        let mut hunter = create_open_hunter();
        let route = open_route();

        assert_eq!(hunter.tick(ms(0)), Tick::Waiting);
        assert_eq!(hunter.tick(ms(499)), Tick::Waiting);

        // the first step is the start cell itself
        assert_eq!(hunter.tick(ms(500)), Tick::Moved(route[0]));
        assert_eq!(hunter.tick(ms(999)), Tick::Waiting);
        assert_eq!(hunter.tick(ms(1000)), Tick::Moved(route[1]));
        assert_eq!(hunter.tick(ms(1600)), Tick::Moved(route[2]));
        // the delay counts from the last move, not from a fixed schedule
        assert_eq!(hunter.tick(ms(2000)), Tick::Waiting);
        assert_eq!(hunter.tick(ms(2100)), Tick::Moved(route[3]));

        let mut now = ms(2100);
        for &pos in &route[4..8] {
            now += MOVE_DELAY;
            assert_eq!(hunter.tick(now), Tick::Moved(pos));
            assert!(!hunter.is_finished());
        }

        now += MOVE_DELAY;
        assert_eq!(hunter.tick(now), Tick::Found(route[8]));
        assert!(hunter.is_finished());

        assert_eq!(
            *hunter.grid().visited(),
            route.iter().copied().collect::<std::collections::HashSet<_>>()
        );
    }

    #[test]
    fn test_replan_when_exhausted() {
        let mut hunter = create_open_hunter();

        for i in 1..=8 {
            hunter.tick(MOVE_DELAY * i);
        }
        assert!(!hunter.is_finished());
        assert_eq!(hunter.plans(), 1);

        hunter.tick(MOVE_DELAY * 9);
        assert!(hunter.is_finished());

        // standing on the treasure the new plan is just the current cell
        assert_eq!(hunter.plans(), 2);
        assert_eq!(
            hunter.path().iter().copied().collect::<Vec<_>>(),
            vec![Position::new(2, 2)]
        );
    }

    #[test]
    fn test_unsolvable() {
        let grid: Grid = concat!(
            ".X.\n", //
            "X..\n",
            "...\n",
        )
        .parse()
        .unwrap();

        assert_eq!(
            Hunter::new(grid, MOVE_DELAY).unwrap_err(),
            HuntError::Unsolvable {
                from: Position::new(0, 0),
                treasure: Position::new(2, 2),
            }
        );
    }

    #[test]
    fn test_start_on_treasure() {
        let mut hunter = Hunter::new(Grid::with_walls(1, 1, []).unwrap(), ms(10)).unwrap();

        // finished before the first move delay has elapsed
        assert!(hunter.is_finished());
        assert_eq!(hunter.tick(ms(0)), Tick::Waiting);
        assert!(hunter.is_finished());

        assert_eq!(hunter.tick(ms(10)), Tick::Found(Position::new(0, 0)));
    }
}
