use std::fmt;

/// Largest coordinate on either axis of the keymaker board.
pub const BOARD_MAX: i32 = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const ORIGIN: Position = Position { x: 0, y: 0 };

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Position) -> i32 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }

    pub fn neighbors(&self) -> [Position; 4] {
        [
            Position::new(self.x, self.y - 1), // North
            Position::new(self.x + 1, self.y), // East
            Position::new(self.x, self.y + 1), // South
            Position::new(self.x - 1, self.y), // West
        ]
    }

    pub fn is_adjacent(&self, other: &Position) -> bool {
        self.distance(other) == 1
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    pub min_x: i32,
    pub max_x: i32,
    pub min_y: i32,
    pub max_y: i32,
}

impl Bounds {
    pub fn new(min_x: i32, max_x: i32, min_y: i32, max_y: i32) -> Self {
        Self {
            min_x,
            max_x,
            min_y,
            max_y,
        }
    }

    /// The 9x9 board every run is played on.
    pub fn keymaker_grid() -> Self {
        Self::new(0, BOARD_MAX, 0, BOARD_MAX)
    }

    pub fn contains(&self, pos: &Position) -> bool {
        pos.x >= self.min_x && pos.x <= self.max_x && pos.y >= self.min_y && pos.y <= self.max_y
    }

    pub fn width(&self) -> usize {
        (self.max_x - self.min_x + 1).max(0) as usize
    }

    pub fn height(&self) -> usize {
        (self.max_y - self.min_y + 1).max(0) as usize
    }

    /// In-bound axis neighbors of `pos`, north, east, south, west.
    pub fn neighbors(&self, pos: Position) -> impl Iterator<Item = Position> + '_ {
        pos.neighbors().into_iter().filter(move |n| self.contains(n))
    }

    /// All positions, row by row.
    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        (self.min_y..=self.max_y)
            .flat_map(move |y| (self.min_x..=self.max_x).map(move |x| Position::new(x, y)))
    }
}

/// Owned two-dimensional storage addressed by [`Position`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid<T> {
    bounds: Bounds,
    cells: Vec<T>,
}

impl<T: Clone> Grid<T> {
    pub fn new(bounds: Bounds, fill: T) -> Self {
        Self {
            bounds,
            cells: vec![fill; bounds.width() * bounds.height()],
        }
    }
}

impl<T> Grid<T> {
    fn index(&self, pos: &Position) -> Option<usize> {
        if !self.bounds.contains(pos) {
            return None;
        }
        let col = (pos.x - self.bounds.min_x) as usize;
        let row = (pos.y - self.bounds.min_y) as usize;
        Some(row * self.bounds.width() + col)
    }

    pub fn get(&self, pos: &Position) -> Option<&T> {
        self.index(pos).map(|i| &self.cells[i])
    }

    pub fn get_mut(&mut self, pos: &Position) -> Option<&mut T> {
        self.index(pos).map(|i| &mut self.cells[i])
    }

    /// Stores `value` at `pos`; returns false when `pos` is out of bounds.
    pub fn set(&mut self, pos: &Position, value: T) -> bool {
        match self.get_mut(pos) {
            Some(cell) => {
                *cell = value;
                true
            }
            None => false,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Position, &T)> + '_ {
        self.bounds.positions().zip(self.cells.iter())
    }
}
