//! Constants for board limits, estimator parameters, and wire encodings.
//!
//! Board dimensions are not fixed at compile time: every game snapshot carries
//! its own width and height. The limits here only bound what the position-string
//! alphabet and the estimator can handle.

// =============================================================================
// Board Geometry
// =============================================================================

/// Largest supported board edge. The position-string alphabet has 26 letters,
/// and the server never offers boards above 25x25.
pub const MAX_BOARD_SIZE: usize = 25;

/// Smallest supported board edge.
pub const MIN_BOARD_SIZE: usize = 1;

// =============================================================================
// Wire Encodings
// =============================================================================

/// First letter of the position-string alphabet (coordinate 0).
pub const COORD_ALPHABET_START: u8 = b'a';

/// Column value that marks a pass in the server's `[x, y]` move arrays.
pub const PASS_COORD: i64 = -1;

// =============================================================================
// Territory Estimation (Monte Carlo playouts)
// =============================================================================

/// Default number of random playouts per ownership estimate.
pub const N_PLAYOUTS: usize = 200;

/// Maximum playout length as a multiple of the board area.
pub const MAX_GAME_LEN_FACTOR: usize = 3;

/// Share of playouts a color must own a point in before the estimate
/// assigns the point to that color.
pub const OWNERSHIP_THRES: f64 = 0.6;

// =============================================================================
// Game Rules
// =============================================================================

/// Moves that may be played before a game can no longer be cancelled
/// (excluding extra free-placement handicap stones).
pub const CANCEL_MOVE_LIMIT: usize = 2;

/// Highest numeric rank that still displays as kyu (`30 - rank` kyu).
pub const DAN_RANK_START: f64 = 30.0;

/// Numeric rank at which professional ranks start (`rank - 36` p).
pub const PRO_RANK_START: f64 = 37.0;
