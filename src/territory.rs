//! Territory classification for scoring.
//!
//! Empty points and stones marked as removed are flood-filled into connected
//! regions. A region bordered only by live stones of one color is that color's
//! territory. Anything else is dame.

use std::collections::BTreeSet;

use crate::board::{Point, StoneColor};
use crate::position::BoardPosition;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TerritoryGroup {
    pub points: BTreeSet<Point>,
    /// The only color among the adjacent live stones, if there is exactly one.
    pub territory_color: Option<StoneColor>,
    /// Neutral region: bordered by both colors (or none), or explicitly marked
    /// as dame by including empty points in the removed set.
    pub is_dame: bool,
}

impl TerritoryGroup {
    pub fn is_territory(&self) -> bool {
        self.territory_color.is_some()
    }
}

impl BoardPosition {
    /// A point counts as open if it is empty or holds a removed stone.
    fn is_open(&self, pt: Point) -> bool {
        self.get(pt).is_none() || self.is_removed(pt)
    }

    /// Flood-fill every region of empty-or-removed points and classify it by
    /// the live stones around it.
    pub fn construct_territory_groups(&self) -> Vec<TerritoryGroup> {
        let board = self.board();
        let mut visited = vec![false; board.width() * board.height()];
        let idx = |pt: Point| pt.row * board.width() + pt.column;
        let mut groups = Vec::new();

        for start in board.points() {
            if visited[idx(start)] || !self.is_open(start) {
                continue;
            }
            let mut points = BTreeSet::new();
            let mut borders = BTreeSet::new();
            let mut marked_dame = false;
            let mut stack = vec![start];
            visited[idx(start)] = true;

            while let Some(pt) = stack.pop() {
                points.insert(pt);
                if self.get(pt).is_none() && self.is_removed(pt) {
                    marked_dame = true;
                }
                for n in board.neighbors(pt) {
                    if self.is_open(n) {
                        if !visited[idx(n)] {
                            visited[idx(n)] = true;
                            stack.push(n);
                        }
                    } else if let Some(color) = self.get(n) {
                        borders.insert(color);
                    }
                }
            }

            let territory_color = match (borders.len(), borders.first()) {
                (1, Some(&color)) => Some(color),
                _ => None,
            };
            groups.push(TerritoryGroup {
                points,
                is_dame: territory_color.is_none() || marked_dame,
                territory_color,
            });
        }
        groups
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pt(row: usize, column: usize) -> Point {
        Point::new(row, column)
    }

    /// 5x5 split by a black wall on column 1 and a white wall on column 3.
    fn walls() -> BoardPosition {
        let mut pos = BoardPosition::new(5, 5);
        for row in 0..5 {
            pos.place(pt(row, 1), StoneColor::Black);
            pos.place(pt(row, 3), StoneColor::White);
        }
        pos
    }

    #[test]
    fn test_walls_split_territory() {
        let groups = walls().construct_territory_groups();
        assert_eq!(groups.len(), 3);

        let black: Vec<_> = groups.iter().filter(|g| g.territory_color == Some(StoneColor::Black)).collect();
        let white: Vec<_> = groups.iter().filter(|g| g.territory_color == Some(StoneColor::White)).collect();
        let dame: Vec<_> = groups.iter().filter(|g| g.territory_color.is_none()).collect();
        assert_eq!(black.len(), 1);
        assert_eq!(white.len(), 1);
        assert_eq!(dame.len(), 1);
        assert_eq!(black[0].points.len(), 5);
        assert!(black[0].points.contains(&pt(2, 0)));
        assert!(!black[0].is_dame);
        assert_eq!(white[0].points.len(), 5);
        assert!(dame[0].is_dame);
        assert!(dame[0].points.contains(&pt(0, 2)));
    }

    #[test]
    fn test_removed_stones_join_region() {
        let mut pos = walls();
        // A dead white stone inside black's area
        pos.place(pt(2, 0), StoneColor::White);
        let before = pos.construct_territory_groups();
        assert_eq!(before.len(), 4, "the stone splits black's area in two");

        pos.removed_stones = Some([pt(2, 0)].into_iter().collect());
        let after = pos.construct_territory_groups();
        assert_eq!(after.len(), 3);
        let black = after
            .iter()
            .find(|g| g.territory_color == Some(StoneColor::Black))
            .unwrap();
        assert_eq!(black.points.len(), 5);
        assert!(!black.is_dame);
    }

    #[test]
    fn test_marked_empty_point_makes_dame() {
        let mut pos = walls();
        pos.removed_stones = Some([pt(0, 4)].into_iter().collect());
        let groups = pos.construct_territory_groups();
        let white = groups
            .iter()
            .find(|g| g.territory_color == Some(StoneColor::White))
            .unwrap();
        assert!(white.is_dame);
        assert!(white.is_territory());
    }

    #[test]
    fn test_empty_board_is_one_neutral_region() {
        let groups = BoardPosition::new(9, 9).construct_territory_groups();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].points.len(), 81);
        assert_eq!(groups[0].territory_color, None);
        assert!(groups[0].is_dame);
    }
}
