//! Authoritative game snapshots as sent by the server.
//!
//! Field names follow the server's snake_case JSON. Point sets arrive as
//! position strings (see [`codec`](crate::codec)); moves arrive as `[x, y, ...]`
//! arrays where `x == -1` is a pass.

use std::collections::BTreeSet;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::board::{Move, PerColor, Point, StoneColor};
use crate::clock::{Clock, ThinkingTime, TimeControlSystem};
use crate::codec;
use crate::constants::{DAN_RANK_START, MAX_BOARD_SIZE, MIN_BOARD_SIZE, PASS_COORD, PRO_RANK_START};
use crate::error::DecodeError;
use crate::game::GamePhase;
use crate::score::{GameScores, ScoringRules};

#[derive(Clone, Debug, Deserialize)]
pub struct GameSnapshot {
    #[serde(default)]
    pub game_id: Option<i64>,
    #[serde(default)]
    pub game_name: Option<String>,
    pub width: usize,
    pub height: usize,
    pub players: Players,
    #[serde(default)]
    pub initial_state: InitialState,
    #[serde(default = "default_initial_player")]
    pub initial_player: StoneColor,
    #[serde(default)]
    pub moves: Vec<SnapshotMove>,
    #[serde(default)]
    pub handicap: usize,
    #[serde(default)]
    pub free_handicap_placement: bool,
    #[serde(default)]
    pub allow_self_capture: bool,
    #[serde(flatten)]
    pub rules: ScoringRules,
    #[serde(default)]
    pub komi: f64,
    #[serde(default, with = "codec::optional_position_string")]
    pub removed: Option<BTreeSet<Point>>,
    #[serde(default)]
    pub clock: Option<ClockPayload>,
    #[serde(default)]
    pub time_control: Option<TimeControlSystem>,
    #[serde(default)]
    pub pause_control: Option<Value>,
    #[serde(default)]
    pub undo_requested: Option<usize>,
    #[serde(default)]
    pub auto_scoring_done: Option<bool>,
    pub phase: GamePhase,
    #[serde(default)]
    pub outcome: Option<String>,
    #[serde(default)]
    pub winner: Option<i64>,
    #[serde(default)]
    pub tournament_id: Option<i64>,
    #[serde(default)]
    pub ladder_id: Option<i64>,
    #[serde(default)]
    pub score: Option<GameScores>,
}

fn default_initial_player() -> StoneColor {
    StoneColor::Black
}

impl GameSnapshot {
    pub fn from_json(json: &str) -> Result<Self, DecodeError> {
        let snapshot: GameSnapshot = serde_json::from_str(json)?;
        snapshot.validate()?;
        Ok(snapshot)
    }

    pub fn from_value(value: Value) -> Result<Self, DecodeError> {
        let snapshot: GameSnapshot = serde_json::from_value(value)?;
        snapshot.validate()?;
        Ok(snapshot)
    }

    fn validate(&self) -> Result<(), DecodeError> {
        let supported = MIN_BOARD_SIZE..=MAX_BOARD_SIZE;
        if !supported.contains(&self.width) || !supported.contains(&self.height) {
            return Err(DecodeError::BoardSize {
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }

    pub fn player(&self, color: StoneColor) -> &Player {
        match color {
            StoneColor::Black => &self.players.black,
            StoneColor::White => &self.players.white,
        }
    }

    /// Color of the player with `id`, if they are in this game.
    pub fn color_of(&self, id: i64) -> Option<StoneColor> {
        if id == self.players.black.id {
            Some(StoneColor::Black)
        } else if id == self.players.white.id {
            Some(StoneColor::White)
        } else {
            None
        }
    }

    /// Decode the clock against the roster.
    pub fn decode_clock(&self) -> Result<Option<Clock>, DecodeError> {
        self.clock.as_ref().map(|c| c.to_clock(&self.players)).transpose()
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct Players {
    pub black: Player,
    pub white: Player,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Player {
    pub username: String,
    pub id: i64,
    #[serde(default)]
    pub rank: Option<f64>,
    #[serde(default)]
    pub professional: bool,
    #[serde(default, with = "codec::optional_position_string")]
    pub accepted_stones: Option<BTreeSet<Point>>,
    #[serde(default)]
    pub icon: Option<String>,
}

impl Player {
    /// Display rank such as `"5k"`, `"2d"` or `"3p"`; `"?"` if unknown.
    pub fn formatted_rank(&self) -> String {
        let Some(rank) = self.rank else {
            return "?".to_string();
        };
        if self.professional && rank >= PRO_RANK_START {
            return format!("{}p", (rank - PRO_RANK_START + 1.0).floor() as i64);
        }
        if rank < DAN_RANK_START {
            format!("{}k", (DAN_RANK_START - rank).ceil() as i64)
        } else {
            format!("{}d", (rank - DAN_RANK_START + 1.0).floor() as i64)
        }
    }

    /// Icon URL rewritten for a `size`-pixel square, or `None` without an icon.
    ///
    /// Handles both `...-64.png` style paths and `s=64` query parameters.
    pub fn icon_url(&self, size: u32) -> Option<String> {
        let icon = self.icon.as_deref()?;
        let resized = replace_digits_between(icon, "-", ".png", &size.to_string());
        Some(replace_digits_between(&resized, "s=", "", &size.to_string()))
    }
}

/// Replace every `{prefix}{digits}{suffix}` in `s` with `{prefix}{value}{suffix}`.
fn replace_digits_between(s: &str, prefix: &str, suffix: &str, value: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find(prefix) {
        let after = &rest[start + prefix.len()..];
        let digits = after.bytes().take_while(u8::is_ascii_digit).count();
        let matched = digits > 0 && after[digits..].starts_with(suffix);
        out.push_str(&rest[..start + prefix.len()]);
        if matched {
            out.push_str(value);
            rest = &after[digits..];
        } else {
            rest = after;
        }
    }
    out.push_str(rest);
    out
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct InitialState {
    #[serde(with = "codec::position_string")]
    pub black: BTreeSet<Point>,
    #[serde(with = "codec::position_string")]
    pub white: BTreeSet<Point>,
}

impl InitialState {
    pub fn is_empty(&self) -> bool {
        self.black.is_empty() && self.white.is_empty()
    }
}

/// A move as the server encodes it: `[x, y]`, `x == -1` for a pass.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Value>", into = "[i64; 2]")]
pub struct SnapshotMove {
    pub x: i64,
    pub y: i64,
}

impl TryFrom<Vec<Value>> for SnapshotMove {
    type Error = String;

    fn try_from(v: Vec<Value>) -> Result<Self, Self::Error> {
        // Entries past the coordinates (move time, flags, metadata) are ignored
        let [x, y, ..] = v.as_slice() else {
            return Err(format!("move needs two coordinates, got {v:?}"));
        };
        let (Some(x), Some(y)) = (x.as_f64(), y.as_f64()) else {
            return Err(format!("move coordinates must be numbers, got [{x}, {y}]"));
        };
        let (x, y) = (x as i64, y as i64);
        if x != PASS_COORD && (x < 0 || y < 0) {
            return Err(format!("invalid move coordinates [{x}, {y}]"));
        }
        Ok(SnapshotMove { x, y })
    }
}

impl From<SnapshotMove> for [i64; 2] {
    fn from(m: SnapshotMove) -> Self {
        [m.x, m.y]
    }
}

impl From<SnapshotMove> for Move {
    fn from(m: SnapshotMove) -> Self {
        if m.x == PASS_COORD {
            Move::Pass
        } else {
            Move::Place(Point::new(m.y as usize, m.x as usize))
        }
    }
}

impl From<Move> for SnapshotMove {
    fn from(mv: Move) -> Self {
        match mv {
            Move::Pass => SnapshotMove { x: PASS_COORD, y: PASS_COORD },
            Move::Place(pt) => SnapshotMove {
                x: pt.column as i64,
                y: pt.row as i64,
            },
        }
    }
}

/// A player's time as sent: either bare main-time seconds or the full structure.
#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub enum TimePayload {
    Seconds(f64),
    Full(ThinkingTime),
}

impl TimePayload {
    fn to_thinking_time(&self) -> ThinkingTime {
        match self {
            TimePayload::Seconds(s) => ThinkingTime::main_time(*s),
            TimePayload::Full(t) => t.clone().reset(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct ClockPayload {
    pub black_time: TimePayload,
    pub white_time: TimePayload,
    #[serde(default)]
    pub black_player_id: Option<i64>,
    #[serde(default)]
    pub white_player_id: Option<i64>,
    pub current_player: i64,
    pub last_move: f64,
    /// Present (with any value) while the clock has not started.
    #[serde(default, deserialize_with = "key_present")]
    pub start_mode: bool,
}

fn key_present<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    serde::de::IgnoredAny::deserialize(deserializer)?;
    Ok(true)
}

impl ClockPayload {
    pub fn to_clock(&self, players: &Players) -> Result<Clock, DecodeError> {
        let black_id = check_id("black", self.black_player_id, players.black.id)?;
        let white_id = check_id("white", self.white_player_id, players.white.id)?;
        let current_player = if self.current_player == black_id {
            StoneColor::Black
        } else if self.current_player == white_id {
            StoneColor::White
        } else {
            return Err(DecodeError::PlayerIdMismatch {
                color: "current",
                clock_id: self.current_player,
                roster_id: black_id,
            });
        };
        Ok(Clock {
            black_time: self.black_time.to_thinking_time(),
            white_time: self.white_time.to_thinking_time(),
            current_player,
            last_move_time: self.last_move,
            started: !self.start_mode,
            auto_resign_time: PerColor::default(),
        })
    }
}

fn check_id(color: &'static str, clock_id: Option<i64>, roster_id: i64) -> Result<i64, DecodeError> {
    match clock_id {
        Some(id) if id != roster_id => Err(DecodeError::PlayerIdMismatch {
            color,
            clock_id: id,
            roster_id,
        }),
        _ => Ok(roster_id),
    }
}
