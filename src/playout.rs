//! Monte Carlo ownership estimation.
//!
//! Plays random games from a position until both sides pass and records who
//! ends up owning each point. Averaged over many playouts this gives a rough
//! territory map, used to suggest dead stones and to show a live score estimate.
//!
//! The estimate is a pure function of the position and the configuration, so it
//! can run on a background thread.

use crate::board::{Board, Point, StoneColor};
use crate::constants::{MAX_GAME_LEN_FACTOR, N_PLAYOUTS, OWNERSHIP_THRES};
use crate::position::BoardPosition;

/// Runtime knobs for [`BoardPosition::estimate_territory`].
#[derive(Clone, Debug, PartialEq)]
pub struct EstimatorConfig {
    /// Number of random playouts to average.
    pub playouts: usize,
    /// Minimum share of playouts a color needs to own a point.
    pub threshold: f64,
    /// Fixed seed for reproducible estimates.
    pub seed: Option<u64>,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            playouts: N_PLAYOUTS,
            threshold: OWNERSHIP_THRES,
            seed: None,
        }
    }
}

/// Estimated owner of every point; `None` is neutral or undecided.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ownership {
    width: usize,
    height: usize,
    cells: Vec<Option<StoneColor>>,
}

impl Ownership {
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn get(&self, pt: Point) -> Option<StoneColor> {
        if pt.row >= self.height || pt.column >= self.width {
            return None;
        }
        self.cells[pt.row * self.width + pt.column]
    }

    pub fn count(&self, color: StoneColor) -> usize {
        self.cells.iter().filter(|&&c| c == Some(color)).count()
    }
}

impl BoardPosition {
    /// Estimate final ownership of every point by random playouts.
    pub fn estimate_territory(&self, config: &EstimatorConfig) -> Ownership {
        let board = self.board();
        let area = board.width() * board.height();
        let mut rng = match config.seed {
            Some(seed) => fastrand::Rng::with_seed(seed),
            None => fastrand::Rng::new(),
        };

        let mut black = vec![0usize; area];
        let mut white = vec![0usize; area];
        for _ in 0..config.playouts {
            let mut playout = board.clone();
            mcplayout(&mut playout, self.next_to_move(), &mut rng);
            for (i, pt) in playout.points().enumerate() {
                let owner = playout.get(pt).or_else(|| playout.is_eyeish(pt));
                match owner {
                    Some(StoneColor::Black) => black[i] += 1,
                    Some(StoneColor::White) => white[i] += 1,
                    None => {}
                }
            }
        }

        let cells = (0..area)
            .map(|i| {
                if config.playouts == 0 {
                    return None;
                }
                let total = config.playouts as f64;
                if black[i] as f64 / total >= config.threshold {
                    Some(StoneColor::Black)
                } else if white[i] as f64 / total >= config.threshold {
                    Some(StoneColor::White)
                } else {
                    None
                }
            })
            .collect();

        Ownership {
            width: board.width(),
            height: board.height(),
            cells,
        }
    }
}

/// Play random moves on `board` until two consecutive passes or the length limit.
///
/// Returns the number of moves played (passes included).
pub fn mcplayout(board: &mut Board, mut to_move: StoneColor, rng: &mut fastrand::Rng) -> usize {
    let max_len = MAX_GAME_LEN_FACTOR * board.width() * board.height();
    let mut passes = 0;
    let mut ko: Option<Point> = None;
    let mut n = 0;

    while passes < 2 && n < max_len {
        match choose_random_move(board, to_move, ko, rng) {
            Some((pt, next, new_ko)) => {
                *board = next;
                ko = new_ko;
                passes = 0;
                tracing::trace!(%pt, color = %to_move, "playout move");
            }
            None => {
                ko = None;
                passes += 1;
            }
        }
        to_move = to_move.opponent();
        n += 1;
    }
    n
}

/// Choose a random legal move for `color` that does not fill its own eye.
///
/// Returns the point, the board after the move, and the new ko point.
fn choose_random_move(
    board: &Board,
    color: StoneColor,
    ko: Option<Point>,
    rng: &mut fastrand::Rng,
) -> Option<(Point, Board, Option<Point>)> {
    let mut candidates: Vec<Point> = board
        .points()
        .filter(|&pt| board.get(pt).is_none() && Some(pt) != ko && board.is_eye(pt) != Some(color))
        .collect();
    rng.shuffle(&mut candidates);

    for pt in candidates {
        let in_enemy_eye = board.is_eyeish(pt) == Some(color.opponent());
        let mut next = board.clone();
        let Ok(outcome) = next.play(pt, color, false) else {
            continue;
        };
        // Set ko if exactly one stone was captured by filling an enemy eye
        let new_ko = if outcome.captured == 1 && in_enemy_eye {
            board
                .neighbors(pt)
                .find(|&n| board.get(n) == Some(color.opponent()) && next.get(n).is_none())
        } else {
            None
        };
        return Some((pt, next, new_ko));
    }
    None
}
