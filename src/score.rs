//! Score aggregation under the server's ruleset flags.
//!
//! Territory comes from the classifier, stones and prisoners from the board,
//! its removed-stone annotation, and the capture counters.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::board::{Point, StoneColor};
use crate::codec;
use crate::position::BoardPosition;

/// Which components count toward the score.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringRules {
    pub score_stones: bool,
    pub score_territory: bool,
    pub score_prisoners: bool,
    pub score_handicap: bool,
    pub aga_handicap_scoring: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerScore {
    pub handicap: usize,
    pub komi: f64,
    #[serde(with = "codec::position_string")]
    pub scoring_positions: BTreeSet<Point>,
    pub stones: usize,
    pub territory: usize,
    pub prisoners: usize,
    pub total: f64,
}

impl PlayerScore {
    /// `stones + territory + prisoners + komi`, plus handicap if it is scored.
    pub fn compute_total(&mut self, score_handicap: bool) {
        self.total = (self.stones + self.territory + self.prisoners) as f64 + self.komi;
        if score_handicap {
            self.total += self.handicap as f64;
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameScores {
    pub black: PlayerScore,
    pub white: PlayerScore,
    /// Neutral points, highlighted but scored for neither side.
    #[serde(skip)]
    pub dame: BTreeSet<Point>,
}

impl GameScores {
    pub fn player(&self, color: StoneColor) -> &PlayerScore {
        match color {
            StoneColor::Black => &self.black,
            StoneColor::White => &self.white,
        }
    }

    pub fn player_mut(&mut self, color: StoneColor) -> &mut PlayerScore {
        match color {
            StoneColor::Black => &mut self.black,
            StoneColor::White => &mut self.white,
        }
    }

    /// Score `position` using its removed-stone annotation.
    ///
    /// Komi and handicap are credited to White.
    pub fn compute(position: &BoardPosition, rules: &ScoringRules, komi: f64, handicap: usize) -> Self {
        let mut score = GameScores::default();
        score.white.komi = komi;
        score.white.handicap = handicap;
        if rules.aga_handicap_scoring && score.white.handicap > 0 {
            score.white.handicap -= 1;
        }

        if rules.score_territory {
            for group in position.construct_territory_groups() {
                match group.territory_color {
                    Some(color) => {
                        let player = score.player_mut(color);
                        if !group.is_dame {
                            player.territory += group.points.len();
                        }
                        player.scoring_positions.extend(group.points);
                    }
                    None => score.dame.extend(group.points),
                }
            }
        }

        for pt in position.board().points() {
            let Some(color) = position.get(pt) else {
                continue;
            };
            let removed = position.is_removed(pt);
            if !removed && rules.score_stones {
                let player = score.player_mut(color);
                player.stones += 1;
                player.scoring_positions.insert(pt);
            }
            if removed && rules.score_prisoners {
                score.player_mut(color.opponent()).prisoners += 1;
            }
        }

        if rules.score_prisoners {
            for color in [StoneColor::Black, StoneColor::White] {
                score.player_mut(color).prisoners += position.captures(color);
            }
        }

        score.black.compute_total(rules.score_handicap);
        score.white.compute_total(rules.score_handicap);
        score
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pt(row: usize, column: usize) -> Point {
        Point::new(row, column)
    }

    fn all_rules() -> ScoringRules {
        ScoringRules {
            score_stones: true,
            score_territory: true,
            score_prisoners: true,
            score_handicap: true,
            aga_handicap_scoring: false,
        }
    }

    #[test]
    fn test_totals_from_components() {
        let mut black = PlayerScore {
            stones: 3,
            territory: 10,
            ..PlayerScore::default()
        };
        let mut white = PlayerScore {
            stones: 2,
            territory: 8,
            komi: 5.5,
            ..PlayerScore::default()
        };
        black.compute_total(true);
        white.compute_total(true);
        assert_eq!(black.total, 13.0);
        assert_eq!(white.total, 15.5);
    }

    /// Same totals on a real 9x9 board. Three stones fence off at most three
    /// points, so Black holds 8 points with 5 stones and White 6 with 4.
    #[test]
    fn test_nine_by_nine_corner_territories() {
        let mut pos = BoardPosition::new(9, 9);
        for p in [pt(0, 4), pt(1, 3), pt(2, 1), pt(2, 2), pt(3, 0)] {
            pos.place(p, StoneColor::Black);
        }
        for p in [pt(8, 5), pt(7, 6), pt(6, 7), pt(5, 8)] {
            pos.place(p, StoneColor::White);
        }
        let score = GameScores::compute(&pos, &all_rules(), 5.5, 0);
        assert_eq!((score.black.stones, score.black.territory), (5, 8));
        assert_eq!((score.white.stones, score.white.territory), (4, 6));
        assert_eq!(score.black.total, 13.0);
        assert_eq!(score.white.total, 15.5);
        assert_eq!(score.dame.len(), 81 - 5 - 8 - 4 - 6);
        assert!(score.black.scoring_positions.contains(&pt(2, 0)));
        assert!(score.white.scoring_positions.contains(&pt(8, 8)));
    }

    /// 5x5 with a black wall on column 1 and a white wall on column 3.
    fn walls() -> BoardPosition {
        let mut pos = BoardPosition::new(5, 5);
        for row in 0..5 {
            pos.place(pt(row, 1), StoneColor::Black);
            pos.place(pt(row, 3), StoneColor::White);
        }
        pos
    }

    #[test]
    fn test_area_scoring_on_walls() {
        let score = GameScores::compute(&walls(), &all_rules(), 5.5, 0);
        assert_eq!(score.black.stones, 5);
        assert_eq!(score.black.territory, 5);
        assert_eq!(score.white.stones, 5);
        assert_eq!(score.white.territory, 5);
        assert_eq!(score.black.total, 10.0);
        assert_eq!(score.white.total, 15.5);
        assert_eq!(score.dame.len(), 5);
        assert_eq!(score.black.scoring_positions.len(), 10);
        assert!(!score.black.scoring_positions.contains(&pt(0, 2)));
    }

    #[test]
    fn test_removed_stone_counts_as_prisoner_and_territory() {
        let mut pos = walls();
        pos.place(pt(2, 4), StoneColor::Black);
        pos.removed_stones = Some([pt(2, 4)].into_iter().collect());
        let score = GameScores::compute(&pos, &all_rules(), 0.0, 0);
        assert_eq!(score.white.prisoners, 1);
        assert_eq!(score.white.territory, 5);
        assert_eq!(score.black.stones, 5, "removed stone is not counted as a stone");
        assert_eq!(score.white.total, 11.0);
    }

    #[test]
    fn test_flags_gate_components() {
        let rules = ScoringRules {
            score_territory: true,
            ..ScoringRules::default()
        };
        let score = GameScores::compute(&walls(), &rules, 0.5, 0);
        assert_eq!(score.black.stones, 0);
        assert_eq!(score.black.territory, 5);
        assert_eq!(score.black.total, 5.0);
        assert_eq!(score.white.total, 5.5);

        let none = GameScores::compute(&walls(), &ScoringRules::default(), 0.5, 0);
        assert_eq!(none.black.total, 0.0);
        assert!(none.black.scoring_positions.is_empty());
    }

    #[test]
    fn test_handicap_scoring() {
        let mut rules = all_rules();
        let score = GameScores::compute(&walls(), &rules, 0.5, 3);
        assert_eq!(score.white.handicap, 3);
        assert_eq!(score.white.total, 13.5);

        rules.aga_handicap_scoring = true;
        let aga = GameScores::compute(&walls(), &rules, 0.5, 3);
        assert_eq!(aga.white.handicap, 2);
        assert_eq!(aga.white.total, 12.5);

        rules.score_handicap = false;
        let unscored = GameScores::compute(&walls(), &rules, 0.5, 3);
        assert_eq!(unscored.white.total, 10.5);
    }

    #[test]
    fn test_decode_server_score() {
        let json = r#"{"black": {"handicap": 0, "komi": 0, "scoring_positions": "aaab", "stones": 2,
            "territory": 0, "prisoners": 0, "total": 2}, "white": {"komi": 6.5, "total": 6.5}}"#;
        let score: GameScores = serde_json::from_str(json).unwrap();
        assert_eq!(score.black.scoring_positions.len(), 2);
        assert!(score.black.scoring_positions.contains(&pt(1, 0)));
        assert_eq!(score.white.komi, 6.5);
    }
}
