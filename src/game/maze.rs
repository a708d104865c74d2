//! Perfect Maze Generation
//!
//! Randomized depth-first carving over a `width x height` grid. The result
//! is a spanning tree of the grid graph: every cell reachable, no loops,
//! exactly one path between any two cells.

use std::collections::VecDeque;
use std::fmt;

use serde::{Serialize, Deserialize};
use thiserror::Error;
use tracing::debug;

use crate::core::grid::{Cell, Direction};
use crate::core::hash::{StateHash, StateHasher};
use crate::core::rng::DeterministicRng;

/// Maze construction errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MazeError {
    /// Width or height is zero.
    #[error("maze dimensions must be positive, got {width}x{height}")]
    EmptyGrid { width: u32, height: u32 },

    /// Cell count does not fit in memory addressing.
    #[error("maze of {width}x{height} cells is too large")]
    TooLarge { width: u32, height: u32 },
}

/// A closed cell edge, in lattice units.
///
/// Cell `(x, y)` occupies `[x, x+1] x [y, y+1]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WallSegment {
    pub x1: u32,
    pub y1: u32,
    pub x2: u32,
    pub y2: u32,
}

impl WallSegment {
    /// Line endpoints in host pixels, `[x1, y1, x2, y2]`.
    ///
    /// Uses the half-cell offset the host draws its grid with.
    pub fn scaled(&self, cell_size: f32) -> [f32; 4] {
        let s = |v: u32| (v as f32 + 0.5) * cell_size;
        [s(self.x1), s(self.y1), s(self.x2), s(self.y2)]
    }

    fn horizontal(x: u32, y: u32) -> Self {
        Self { x1: x, y1: y, x2: x + 1, y2: y }
    }

    fn vertical(x: u32, y: u32) -> Self {
        Self { x1: x, y1: y, x2: x, y2: y + 1 }
    }
}

/// Grid topology: one byte of open-passage bits per cell.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Maze {
    width: u32,
    height: u32,
    passages: Vec<u8>,
}

impl Maze {
    /// A fully walled grid with no passages.
    pub fn new(width: u32, height: u32) -> Result<Self, MazeError> {
        if width == 0 || height == 0 {
            return Err(MazeError::EmptyGrid { width, height });
        }
        let count = (width as usize)
            .checked_mul(height as usize)
            .ok_or(MazeError::TooLarge { width, height })?;

        Ok(Self {
            width,
            height,
            passages: vec![0; count],
        })
    }

    /// Carve a perfect maze.
    ///
    /// Starts from a random cell, repeatedly opens a passage to an unvisited
    /// neighbor chosen uniformly at random, and backtracks when the current
    /// cell has none left.
    pub fn generate(width: u32, height: u32, rng: &mut DeterministicRng) -> Result<Self, MazeError> {
        let mut maze = Self::new(width, height)?;
        let mut visited = vec![false; maze.cell_count()];

        let start = Cell::new(rng.next_int(width), rng.next_int(height));
        visited[maze.index(start)] = true;

        let mut stack = vec![start];
        let mut candidates: Vec<(Direction, Cell)> = Vec::with_capacity(4);

        while let Some(&current) = stack.last() {
            candidates.clear();
            for dir in Direction::ALL {
                if let Some(next) = maze.neighbor(current, dir) {
                    if !visited[maze.index(next)] {
                        candidates.push((dir, next));
                    }
                }
            }

            match rng.choose(&candidates).copied() {
                Some((dir, next)) => {
                    maze.carve(current, dir);
                    visited[maze.index(next)] = true;
                    stack.push(next);
                }
                None => {
                    stack.pop();
                }
            }
        }

        debug!(width, height, start = %start, "maze generated");
        Ok(maze)
    }

    /// Carve a perfect maze from a seed.
    pub fn generate_seeded(width: u32, height: u32, seed: u64) -> Result<Self, MazeError> {
        Self::generate(width, height, &mut DeterministicRng::new(seed))
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn cell_count(&self) -> usize {
        self.passages.len()
    }

    /// Is the cell inside the grid?
    #[inline]
    pub fn contains(&self, cell: Cell) -> bool {
        cell.x < self.width && cell.y < self.height
    }

    #[inline]
    fn index(&self, cell: Cell) -> usize {
        cell.y as usize * self.width as usize + cell.x as usize
    }

    /// The in-bounds neighbor of `cell` in `direction`, walls ignored.
    pub fn neighbor(&self, cell: Cell, direction: Direction) -> Option<Cell> {
        if !self.contains(cell) {
            return None;
        }
        cell.step(direction).filter(|next| self.contains(*next))
    }

    /// Open the edge between `cell` and its neighbor in `direction`.
    ///
    /// Both sides are updated. Returns false when the neighbor is out of
    /// bounds (the outer boundary cannot be opened).
    pub fn carve(&mut self, cell: Cell, direction: Direction) -> bool {
        let Some(next) = self.neighbor(cell, direction) else {
            return false;
        };
        let (a, b) = (self.index(cell), self.index(next));
        self.passages[a] |= direction.bit();
        self.passages[b] |= direction.opposite().bit();
        true
    }

    /// Can an object at `cell` step one cell in `direction`?
    ///
    /// False for out-of-bounds cells, closed edges, and the outer boundary.
    pub fn can_move(&self, cell: Cell, direction: Direction) -> bool {
        if !self.contains(cell) {
            return false;
        }
        self.passages[self.index(cell)] & direction.bit() != 0
    }

    /// Directions with an open passage out of `cell`.
    pub fn open_directions(&self, cell: Cell) -> impl Iterator<Item = Direction> + '_ {
        Direction::ALL
            .into_iter()
            .filter(move |dir| self.can_move(cell, *dir))
    }

    /// Number of open passages (each counted once).
    pub fn passage_count(&self) -> usize {
        let ends: u32 = self.passages.iter().map(|bits| bits.count_ones()).sum();
        (ends / 2) as usize
    }

    /// Number of cells reachable from `start` through open passages.
    pub fn reachable_from(&self, start: Cell) -> usize {
        if !self.contains(start) {
            return 0;
        }
        let mut seen = vec![false; self.cell_count()];
        let mut queue = VecDeque::from([start]);
        seen[self.index(start)] = true;
        let mut count = 0;

        while let Some(cell) = queue.pop_front() {
            count += 1;
            for dir in self.open_directions(cell) {
                if let Some(next) = self.neighbor(cell, dir) {
                    let i = self.index(next);
                    if !seen[i] {
                        seen[i] = true;
                        queue.push_back(next);
                    }
                }
            }
        }

        count
    }

    /// Shortest sequence of moves from `from` to `to`, if connected.
    pub fn path_between(&self, from: Cell, to: Cell) -> Option<Vec<Direction>> {
        if !self.contains(from) || !self.contains(to) {
            return None;
        }
        let mut prev: Vec<Option<(Cell, Direction)>> = vec![None; self.cell_count()];
        let mut seen = vec![false; self.cell_count()];
        let mut queue = VecDeque::from([from]);
        seen[self.index(from)] = true;

        while let Some(cell) = queue.pop_front() {
            if cell == to {
                break;
            }
            for dir in self.open_directions(cell) {
                if let Some(next) = self.neighbor(cell, dir) {
                    let i = self.index(next);
                    if !seen[i] {
                        seen[i] = true;
                        prev[i] = Some((cell, dir));
                        queue.push_back(next);
                    }
                }
            }
        }

        if !seen[self.index(to)] {
            return None;
        }

        let mut path = Vec::new();
        let mut cur = to;
        while let Some((back, dir)) = prev[self.index(cur)] {
            path.push(dir);
            cur = back;
        }
        path.reverse();
        Some(path)
    }

    /// Every closed edge, each exactly once, outer boundary included.
    pub fn wall_segments(&self) -> Vec<WallSegment> {
        let mut segments = Vec::new();

        for y in 0..self.height {
            for x in 0..self.width {
                let cell = Cell::new(x, y);
                if !self.can_move(cell, Direction::Down) {
                    segments.push(WallSegment::horizontal(x, y));
                }
                if !self.can_move(cell, Direction::Left) {
                    segments.push(WallSegment::vertical(x, y));
                }
                if y + 1 == self.height {
                    segments.push(WallSegment::horizontal(x, y + 1));
                }
                if x + 1 == self.width {
                    segments.push(WallSegment::vertical(x + 1, y));
                }
            }
        }

        segments
    }

    /// All cell coordinates, row-major.
    ///
    /// Callers placing objects pop from this list themselves so no cell is
    /// handed out twice.
    pub fn empty_cells(&self) -> Vec<Cell> {
        (0..self.height)
            .flat_map(|y| (0..self.width).map(move |x| Cell::new(x, y)))
            .collect()
    }

    /// Append this layout to a state hash.
    pub fn hash_into(&self, hasher: &mut StateHasher) {
        hasher.update_u32(self.width);
        hasher.update_u32(self.height);
        hasher.update_bytes(&self.passages);
    }

    /// Fingerprint of the layout alone.
    pub fn fingerprint(&self) -> StateHash {
        let mut hasher = StateHasher::for_maze();
        self.hash_into(&mut hasher);
        hasher.finalize()
    }
}

impl fmt::Display for Maze {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Top row first, y grows upward.
        for y in (0..self.height).rev() {
            f.write_str("+")?;
            for x in 0..self.width {
                let open = self.can_move(Cell::new(x, y), Direction::Up);
                f.write_str(if open { "   +" } else { "---+" })?;
            }
            f.write_str("\n")?;

            for x in 0..self.width {
                let open = self.can_move(Cell::new(x, y), Direction::Left);
                f.write_str(if open { "    " } else { "|   " })?;
            }
            f.write_str("|\n")?;
        }

        f.write_str("+")?;
        for _ in 0..self.width {
            f.write_str("---+")?;
        }
        f.write_str("\n")
    }
}
