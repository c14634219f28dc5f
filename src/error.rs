//! Error types for move application, snapshot decoding, and game-state operations.

use thiserror::Error;

use crate::board::Point;
use crate::game::GamePhase;

/// A move that the rules do not allow.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IllegalMove {
    #[error("Illegal move: {0} is off the board")]
    OutOfBounds(Point),
    #[error("Illegal move: {0} is not empty")]
    Occupied(Point),
    #[error("Illegal move: {0} retakes ko")]
    Ko(Point),
    #[error("Illegal move: {0} is suicide")]
    Suicide(Point),
    #[error("Illegal move: cannot pass while placing handicap stones")]
    HandicapPass,
}

/// A snapshot or position string that could not be understood.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("malformed snapshot: {0}")]
    Json(#[from] serde_json::Error),
    #[error("clock player {clock_id} does not match roster player {roster_id} for {color}")]
    PlayerIdMismatch {
        color: &'static str,
        clock_id: i64,
        roster_id: i64,
    },
    #[error("position string has odd length {0}")]
    OddPositionString(usize),
    #[error("invalid coordinate character {0:?} in position string")]
    InvalidCoordinate(char),
    #[error("unsupported board size {width}x{height}")]
    BoardSize { width: usize, height: usize },
}

/// An operation that is not valid for the current game state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StateError {
    #[error("no game data has been loaded")]
    NoGameData,
    #[error("operation requires the {expected:?} phase, game is in {actual:?}")]
    WrongPhase {
        expected: GamePhase,
        actual: Option<GamePhase>,
    },
    #[error("it is not this player's turn")]
    NotYourTurn,
    #[error("it is this player's own turn")]
    OwnTurn,
    #[error("an undo request is already pending")]
    UndoPending,
    #[error("no undo request is pending")]
    NoUndoPending,
    #[error("undo was requested for move {requested}, current move is {current}")]
    UndoMoveMismatch { requested: usize, current: usize },
    #[error("not enough moves have been played ({played} <= {minimum})")]
    NotEnoughMoves { played: usize, minimum: usize },
    #[error("the game can no longer be cancelled")]
    NotCancellable,
    #[error("unknown position")]
    UnknownNode,
}

/// Any error the engine surfaces to its host.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    IllegalMove(#[from] IllegalMove),
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error(transparent)]
    State(#[from] StateError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
