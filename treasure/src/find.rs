use std::{collections::HashSet, fmt::Debug, hash::Hash, marker::PhantomData};

use log::debug;

/// Supertrait that collects all the requirements on the NodeReference values
/// Must be copy, hashable and not references (hence 'static)
pub trait NodeReference: Copy + Eq + Hash + Debug + 'static {}

pub trait MapTrait {
    /// The type that can be used to reference nodes in the map
    type Reference: NodeReference;

    /// Return an iterator over the neighbors of the provided node, in the order they should be
    /// explored
    fn neighbors_of(&self, node: Self::Reference) -> impl Iterator<Item = Self::Reference>;
}

/// A MapTrait implementation backed by a plain neighbor function
pub struct FnMap<R, F> {
    neighbors: F,
    _reference: PhantomData<R>,
}

impl<R, F> FnMap<R, F> {
    pub fn new(neighbors: F) -> Self {
        Self {
            neighbors,
            _reference: PhantomData,
        }
    }
}

impl<R, F, I> MapTrait for FnMap<R, F>
where
    R: NodeReference,
    F: Fn(R) -> I,
    I: IntoIterator<Item = R>,
{
    type Reference = R;

    fn neighbors_of(&self, node: Self::Reference) -> impl Iterator<Item = Self::Reference> {
        (self.neighbors)(node).into_iter()
    }
}

/// One level of the depth-first descent: the node and the neighbors not tried yet
#[derive(Debug)]
struct Frame<R> {
    node: R,
    remaining: std::vec::IntoIter<R>,
}

#[derive(Debug, PartialEq, Clone, Eq)]
pub struct PathResult<R> {
    pub path: Vec<R>,
    pub start: R,
    pub goal: R,
    /// number of nodes that were entered before the goal was reached
    pub expanded: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathFinderState<R> {
    Computing,
    NoPathFound,
    PathFound(PathResult<R>),
}

impl<R> PathFinderState<R> {
    pub fn is_done(&self) -> bool {
        !matches!(self, PathFinderState::Computing)
    }
}

/// Depth-first search driven one expansion at a time.
///
/// Neighbors are tried in the order the map returns them and the first goal that is reached wins,
/// so the path is not necessarily the shortest one. The descent is kept on an explicit stack
/// instead of the call stack, which keeps large open grids from overflowing it.
pub struct PathFinder<R, G> {
    start: R,
    is_goal: G,
    visited: HashSet<R>,
    stack: Vec<Frame<R>>,
    path: Vec<R>,
    next: Option<R>,
    expanded: usize,
    state: PathFinderState<R>,
}

impl<R, G> PathFinder<R, G>
where
    R: NodeReference,
    G: Fn(R) -> bool,
{
    pub fn new(start: R, is_goal: G) -> Self {
        Self {
            start,
            is_goal,
            visited: HashSet::new(),
            stack: Vec::new(),
            path: vec![start],
            next: Some(start),
            expanded: 0,
            state: PathFinderState::Computing,
        }
    }

    pub fn finish<M: MapTrait<Reference = R>>(
        mut self,
        map: &M,
    ) -> (PathFinderState<R>, HashSet<R>) {
        loop {
            match self.step(map) {
                PathFinderState::Computing => {}
                s => return (s, self.visited),
            }
        }
    }

    /// Either enters the node picked by the previous step, picks the next unvisited neighbor of
    /// the deepest node, or backtracks out of a node whose neighbors are exhausted.
    pub fn step<M: MapTrait<Reference = R>>(&mut self, map: &M) -> PathFinderState<R> {
        if self.state.is_done() {
            return self.state.clone();
        }

        if let Some(node) = self.next.take() {
            self.visited.insert(node);
            self.expanded += 1;

            if (self.is_goal)(node) {
                debug!(
                    "reached goal {:?} after expanding {} nodes, path length {}",
                    node,
                    self.expanded,
                    self.path.len()
                );

                self.state = PathFinderState::PathFound(PathResult {
                    path: self.path.clone(),
                    start: self.start,
                    goal: node,
                    expanded: self.expanded,
                });
                return self.state.clone();
            }

            let neighbors: Vec<R> = map.neighbors_of(node).collect();
            self.stack.push(Frame {
                node,
                remaining: neighbors.into_iter(),
            });

            return self.state.clone();
        }

        match self.stack.last_mut() {
            Some(frame) => {
                let visited = &self.visited;
                match frame.remaining.find(|n| !visited.contains(n)) {
                    Some(neighbor) => {
                        self.path.push(neighbor);
                        self.next = Some(neighbor);
                    }
                    None => {
                        // dead end, the node leaves the candidate path
                        self.stack.pop();
                        self.path.pop();
                    }
                }
            }
            None => {
                debug!("no path from {:?}, expanded {} nodes", self.start, self.expanded);
                self.state = PathFinderState::NoPathFound;
            }
        }

        self.state.clone()
    }

    pub fn state(&self) -> &PathFinderState<R> {
        &self.state
    }

    pub fn get_visited(&self) -> &HashSet<R> {
        &self.visited
    }

    /// The candidate path as currently explored, from the start to the deepest node
    pub fn current_path(&self) -> &[R] {
        &self.path
    }

    /// Node currently at the bottom of the descent, if any
    pub fn current(&self) -> Option<R> {
        self.stack.last().map(|frame| frame.node)
    }

    pub fn start(&self) -> R {
        self.start
    }
}

/// Runs a depth-first search from `start` until `is_goal` holds.
///
/// Returns the nodes from `start` to the first goal found, both included, or `None` if no goal is
/// reachable.
pub fn find_path<M, G>(start: M::Reference, map: &M, is_goal: G) -> Option<Vec<M::Reference>>
where
    M: MapTrait,
    G: Fn(M::Reference) -> bool,
{
    match PathFinder::new(start, is_goal).finish(map).0 {
        PathFinderState::PathFound(result) => Some(result.path),
        _ => None,
    }
}

/// Same as [`find_path`] with the neighbors given as a function.
pub fn find_path_with<R, F, I, G>(start: R, neighbors: F, is_goal: G) -> Option<Vec<R>>
where
    R: NodeReference,
    F: Fn(R) -> I,
    I: IntoIterator<Item = R>,
    G: Fn(R) -> bool,
{
    find_path(start, &FnMap::new(neighbors), is_goal)
}

#[cfg(test)]
mod test {

    use super::*;

    impl NodeReference for u8 {}

    // 0 -> 1 -> 3 -> 0 is a dead loop, the goal 4 hangs off 2
    fn create_basic_graph(node: u8) -> Vec<u8> {
        match node {
            0 => vec![1, 2],
            1 => vec![3],
            2 => vec![4],
            3 => vec![0],
            _ => vec![],
        }
    }

    #[test]
    fn test_basic_route() {
        let map = FnMap::<u8, _>::new(create_basic_graph);

        let (state, visited) = PathFinder::new(0u8, |n: u8| n == 4).finish(&map);

        assert_eq!(
            state,
            PathFinderState::PathFound(PathResult {
                path: vec![0, 2, 4],
                start: 0,
                goal: 4,
                expanded: 5,
            })
        );
        assert_eq!(visited, HashSet::from([0, 1, 2, 3, 4]));
    }

    #[test]
    fn test_basic_no_route() {
        let map = FnMap::<u8, _>::new(create_basic_graph);

        let (state, visited) = PathFinder::new(0u8, |n: u8| n == 9).finish(&map);

        assert_eq!(state, PathFinderState::NoPathFound);
        assert_eq!(visited.len(), 5);
    }

    #[test]
    fn test_start_is_goal() {
        assert_eq!(find_path_with(3u8, create_basic_graph, |n| n == 3), Some(vec![3]));
    }

    #[test]
    fn test_first_goal_in_neighbor_order_wins() {
        // both 1 and 2 are goals, 1 comes first
        assert_eq!(
            find_path_with(0u8, create_basic_graph, |n| n == 1 || n == 2),
            Some(vec![0, 1])
        );
        // reversing the neighbor order flips the answer
        let reversed = |n: u8| create_basic_graph(n).into_iter().rev();
        assert_eq!(
            find_path_with(0u8, reversed, |n| n == 1 || n == 2),
            Some(vec![0, 2])
        );
    }

    #[test]
    fn test_step_by_step() {
        let map = FnMap::<u8, _>::new(create_basic_graph);
        let mut finder = PathFinder::new(0u8, |n: u8| n == 4);

        assert_eq!(finder.step(&map), PathFinderState::Computing);
        assert_eq!(finder.current(), Some(0));
        assert_eq!(finder.current_path(), &[0]);

        // pick 1, enter it, pick 3
        finder.step(&map);
        finder.step(&map);
        finder.step(&map);
        assert_eq!(finder.current_path(), &[0, 1, 3]);

        let mut steps = 0;
        while !finder.step(&map).is_done() {
            steps += 1;
            assert!(steps < 100, "search did not terminate");
        }

        assert!(matches!(
            finder.state(),
            PathFinderState::PathFound(PathResult { goal: 4, .. })
        ));
        // finished searches keep reporting their result
        assert_eq!(finder.step(&map), finder.state().clone());
    }

    #[test]
    fn test_calls_are_independent() {
        let first = find_path_with(0u8, create_basic_graph, |n| n == 4);
        let second = find_path_with(0u8, create_basic_graph, |n| n == 4);
        assert_eq!(first, second);
    }
}
