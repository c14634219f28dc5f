//! Two-dimensional Go board: stones, groups, liberties, and captures.
//!
//! [`Board`] is the mutable grid underneath every [`BoardPosition`]. It knows
//! nothing about history, so ko is enforced one level up.
//!
//! [`BoardPosition`]: crate::position::BoardPosition

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::IllegalMove;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoneColor {
    Black,
    White,
}

impl StoneColor {
    pub fn opponent(self) -> Self {
        match self {
            StoneColor::Black => StoneColor::White,
            StoneColor::White => StoneColor::Black,
        }
    }
}

impl fmt::Display for StoneColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoneColor::Black => f.write_str("Black"),
            StoneColor::White => f.write_str("White"),
        }
    }
}

/// A board intersection. Ordered row-major.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Point {
    pub row: usize,
    pub column: usize,
}

impl Point {
    pub const fn new(row: usize, column: usize) -> Self {
        Self { row, column }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.column)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Move {
    Pass,
    Place(Point),
}

/// A per-color pair of counters.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerColor<T> {
    pub black: T,
    pub white: T,
}

impl<T> PerColor<T> {
    pub fn get(&self, color: StoneColor) -> &T {
        match color {
            StoneColor::Black => &self.black,
            StoneColor::White => &self.white,
        }
    }

    pub fn get_mut(&mut self, color: StoneColor) -> &mut T {
        match color {
            StoneColor::Black => &mut self.black,
            StoneColor::White => &mut self.white,
        }
    }
}

/// Stones removed by a successful placement.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlayOutcome {
    /// Opposing stones captured by the mover.
    pub captured: usize,
    /// Own stones removed by a permitted self-capture.
    pub self_captured: usize,
}

#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Board {
    width: usize,
    height: usize,
    cells: Vec<Option<StoneColor>>,
}

impl Board {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![None; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn contains(&self, pt: Point) -> bool {
        pt.row < self.height && pt.column < self.width
    }

    fn idx(&self, pt: Point) -> usize {
        pt.row * self.width + pt.column
    }

    /// Stone at `pt`, or `None` if empty or off the board.
    pub fn get(&self, pt: Point) -> Option<StoneColor> {
        if !self.contains(pt) {
            return None;
        }
        self.cells[self.idx(pt)]
    }

    /// Overwrite a cell. Out-of-bounds points are ignored.
    pub fn set(&mut self, pt: Point, stone: Option<StoneColor>) {
        if self.contains(pt) {
            let i = self.idx(pt);
            self.cells[i] = stone;
        }
    }

    /// All points, row by row.
    pub fn points(&self) -> impl Iterator<Item = Point> + '_ {
        (0..self.height).flat_map(move |row| (0..self.width).map(move |column| Point::new(row, column)))
    }

    pub fn count(&self, color: StoneColor) -> usize {
        self.cells.iter().filter(|&&c| c == Some(color)).count()
    }

    /// Orthogonal neighbors that lie on the board.
    pub fn neighbors(&self, pt: Point) -> impl Iterator<Item = Point> + use<> {
        let mut v = Vec::with_capacity(4);
        if pt.row > 0 {
            v.push(Point::new(pt.row - 1, pt.column));
        }
        if pt.column + 1 < self.width {
            v.push(Point::new(pt.row, pt.column + 1));
        }
        if pt.row + 1 < self.height {
            v.push(Point::new(pt.row + 1, pt.column));
        }
        if pt.column > 0 {
            v.push(Point::new(pt.row, pt.column - 1));
        }
        v.into_iter()
    }

    /// Diagonal neighbors as `(point, on_board)`; off-board diagonals are reported
    /// so eye detection can tell edges apart from the center.
    fn diagonal_neighbors(&self, pt: Point) -> [(Point, bool); 4] {
        let (r, c) = (pt.row as isize, pt.column as isize);
        [(-1, -1), (-1, 1), (1, 1), (1, -1)].map(|(dr, dc)| {
            let (nr, nc) = (r + dr, c + dc);
            let on_board = nr >= 0 && nc >= 0 && (nr as usize) < self.height && (nc as usize) < self.width;
            let p = Point::new(nr.max(0) as usize, nc.max(0) as usize);
            (p, on_board)
        })
    }

    /// Collect all stones connected to `start` with the same color.
    ///
    /// Appends the stones to `out` and returns how many were added.
    pub fn collect_group(&self, start: Point, out: &mut Vec<Point>) -> usize {
        let Some(color) = self.get(start) else {
            return 0;
        };
        let mut stack = vec![start];
        let mut visited = vec![false; self.cells.len()];
        let mut count = 0;
        while let Some(pt) = stack.pop() {
            let i = self.idx(pt);
            if visited[i] {
                continue;
            }
            visited[i] = true;
            if self.get(pt) == Some(color) {
                out.push(pt);
                count += 1;
                for n in self.neighbors(pt) {
                    if !visited[self.idx(n)] && self.get(n) == Some(color) {
                        stack.push(n);
                    }
                }
            }
        }
        count
    }

    /// Number of distinct empty points adjacent to the group at `start`.
    pub fn group_liberties(&self, start: Point) -> usize {
        let Some(color) = self.get(start) else {
            return 0;
        };
        let mut stack = vec![start];
        let mut visited = vec![false; self.cells.len()];
        let mut liberty_visited = vec![false; self.cells.len()];
        let mut libs = 0;
        while let Some(pt) = stack.pop() {
            let i = self.idx(pt);
            if visited[i] {
                continue;
            }
            visited[i] = true;
            for n in self.neighbors(pt) {
                let ni = self.idx(n);
                match self.get(n) {
                    None => {
                        if !liberty_visited[ni] {
                            liberty_visited[ni] = true;
                            libs += 1;
                        }
                    }
                    Some(c) if c == color && !visited[ni] => stack.push(n),
                    _ => {}
                }
            }
        }
        libs
    }

    /// Remove the group at `start`, returning the number of stones removed.
    fn remove_group(&mut self, start: Point) -> usize {
        let mut group = Vec::new();
        let count = self.collect_group(start, &mut group);
        for pt in group {
            self.set(pt, None);
        }
        count
    }

    /// Place a stone for `color`, resolving captures.
    ///
    /// Opposing groups left without liberties are removed first. If the placed
    /// group then has no liberties it is removed too when `allow_self_capture`
    /// is set, otherwise the board is left untouched and the move is suicide.
    pub fn play(&mut self, pt: Point, color: StoneColor, allow_self_capture: bool) -> Result<PlayOutcome, IllegalMove> {
        if !self.contains(pt) {
            return Err(IllegalMove::OutOfBounds(pt));
        }
        if self.get(pt).is_some() {
            return Err(IllegalMove::Occupied(pt));
        }
        self.set(pt, Some(color));

        let opp = color.opponent();
        let mut captured = 0;
        for n in self.neighbors(pt) {
            if self.get(n) == Some(opp) && self.group_liberties(n) == 0 {
                captured += self.remove_group(n);
            }
        }

        let mut self_captured = 0;
        if captured == 0 && self.group_liberties(pt) == 0 {
            if !allow_self_capture {
                self.set(pt, None);
                return Err(IllegalMove::Suicide(pt));
            }
            self_captured = self.remove_group(pt);
        }
        Ok(PlayOutcome {
            captured,
            self_captured,
        })
    }

    /// If every on-board neighbor of the empty point `pt` is a stone of one
    /// color, return that color. May be a false eye.
    pub fn is_eyeish(&self, pt: Point) -> Option<StoneColor> {
        if self.get(pt).is_some() {
            return None;
        }
        let mut eyecolor = None;
        for n in self.neighbors(pt) {
            let c = self.get(n)?;
            match eyecolor {
                None => eyecolor = Some(c),
                Some(e) if e != c => return None,
                _ => {}
            }
        }
        eyecolor
    }

    /// An eyeish point with at most one opposing diagonal at the edge and none
    /// in the center.
    pub fn is_eye(&self, pt: Point) -> Option<StoneColor> {
        let eyecolor = self.is_eyeish(pt)?;
        let falsecolor = eyecolor.opponent();
        let mut at_edge = false;
        let mut false_count = 0;
        for (d, on_board) in self.diagonal_neighbors(pt) {
            if !on_board {
                at_edge = true;
            } else if self.get(d) == Some(falsecolor) {
                false_count += 1;
            }
        }
        let tolerance = if at_edge { 1 } else { 0 };
        if false_count > tolerance {
            return None;
        }
        Some(eyecolor)
    }
}

impl<T> std::ops::Index<StoneColor> for PerColor<T> {
    type Output = T;

    fn index(&self, color: StoneColor) -> &T {
        self.get(color)
    }
}

impl<T> std::ops::IndexMut<StoneColor> for PerColor<T> {
    fn index_mut(&mut self, color: StoneColor) -> &mut T {
        self.get_mut(color)
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Board {}x{}", self.width, self.height)?;
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..self.height {
            for column in 0..self.width {
                let ch = match self.get(Point::new(row, column)) {
                    Some(StoneColor::Black) => 'X',
                    Some(StoneColor::White) => 'O',
                    None => '.',
                };
                write!(f, "{ch} ")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
