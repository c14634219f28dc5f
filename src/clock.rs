//! Local, advisory game clock.
//!
//! The server is the timer of record. Between snapshots the client only
//! recomputes what the display should show, starting from the values the last
//! snapshot carried, so recomputing twice with the same `now` gives the same
//! result.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::board::{PerColor, StoneColor};

/// Time control settings of a game, tagged by the server's `system` field.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "system", rename_all = "lowercase")]
pub enum TimeControlSystem {
    #[serde(rename = "byoyomi")]
    ByoYomi {
        main_time: f64,
        periods: u32,
        period_time: f64,
    },
    Canadian {
        main_time: f64,
        period_time: f64,
        stones_per_period: u32,
    },
    Fischer {
        initial_time: f64,
        time_increment: f64,
        max_time: f64,
    },
    Simple {
        per_move: f64,
    },
    Absolute {
        total_time: f64,
    },
    None,
}

/// One player's clock. `*_left` fields are local recomputations of the
/// corresponding snapshot values and never exceed them.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThinkingTime {
    pub thinking_time: Option<f64>,
    pub thinking_time_left: Option<f64>,

    // Byo-yomi
    pub periods: Option<u32>,
    pub periods_left: Option<u32>,
    pub period_time: Option<u32>,
    pub period_time_left: Option<u32>,

    // Canadian
    pub moves_left: Option<u32>,
    pub block_time: Option<f64>,
    pub block_time_left: Option<f64>,
}

impl ThinkingTime {
    /// Only main time is known, as sent by servers for simple clocks.
    pub fn main_time(seconds: f64) -> Self {
        Self {
            thinking_time: Some(seconds),
            ..Self::default()
        }
        .reset()
    }

    /// Set every `*_left` field back to its snapshot value.
    pub fn reset(mut self) -> Self {
        self.thinking_time_left = self.thinking_time;
        self.periods_left = self.periods;
        self.period_time_left = self.period_time;
        self.block_time_left = self.block_time;
        self
    }

    fn base_main_time(&self) -> f64 {
        self.thinking_time.or(self.thinking_time_left).unwrap_or(0.0)
    }
}

/// Advisory state after a recomputation.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TimeStatus {
    /// Main time remains.
    Running,
    /// Main time is used up; byo-yomi periods or a Canadian block are running.
    Overtime,
    /// All time is used up. Only the server may declare the game lost.
    Expired,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Clock {
    pub black_time: ThinkingTime,
    pub white_time: ThinkingTime,
    pub current_player: StoneColor,
    /// Epoch milliseconds of the last move.
    pub last_move_time: f64,
    pub started: bool,
    /// Authoritative auto-resign deadlines, display only.
    pub auto_resign_time: PerColor<Option<f64>>,
}

pub fn now_millis() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64() * 1000.0)
        .unwrap_or(0.0)
}

impl Clock {
    pub fn time(&self, color: StoneColor) -> &ThinkingTime {
        match color {
            StoneColor::Black => &self.black_time,
            StoneColor::White => &self.white_time,
        }
    }

    fn time_mut(&mut self, color: StoneColor) -> &mut ThinkingTime {
        match color {
            StoneColor::Black => &mut self.black_time,
            StoneColor::White => &mut self.white_time,
        }
    }

    /// Recompute the current player's remaining time at `now_ms`.
    ///
    /// Returns `None` when nothing was recomputed: the clock has not started or
    /// no time has passed since the last move.
    pub fn recompute_remaining(&mut self, system: &TimeControlSystem, now_ms: f64) -> Option<TimeStatus> {
        if !self.started {
            return None;
        }
        let elapsed = (now_ms - self.last_move_time) / 1000.0;
        if elapsed <= 0.0 {
            return None;
        }
        let player = self.current_player;
        let time = self.time_mut(player);
        let remaining = time.base_main_time() - elapsed;

        let status = match *system {
            TimeControlSystem::ByoYomi {
                periods, period_time, ..
            } => {
                if remaining >= 0.0 {
                    time.thinking_time_left = Some(remaining);
                    TimeStatus::Running
                } else {
                    time.thinking_time_left = Some(0.0);
                    let period_time = time.period_time.map(f64::from).unwrap_or(period_time);
                    let mut periods_left = time.periods.unwrap_or(periods);
                    // The period in progress is not consumed until it runs out
                    let mut overflow = remaining + period_time;
                    while overflow < 0.0 && periods_left > 0 {
                        overflow += period_time;
                        periods_left -= 1;
                    }
                    time.periods_left = Some(periods_left);
                    if overflow < 0.0 {
                        time.period_time_left = Some(0);
                        TimeStatus::Expired
                    } else {
                        time.period_time_left = Some(overflow.floor() as u32);
                        TimeStatus::Overtime
                    }
                }
            }
            TimeControlSystem::Canadian { period_time, .. } => {
                if remaining >= 0.0 {
                    time.thinking_time_left = Some(remaining);
                    TimeStatus::Running
                } else {
                    time.thinking_time_left = Some(0.0);
                    let block = time.block_time.unwrap_or(period_time);
                    let block_left = block + remaining;
                    if block_left >= 0.0 {
                        time.block_time_left = Some(block_left);
                        TimeStatus::Overtime
                    } else {
                        // Renewal of the block is the server's call
                        time.block_time_left = Some(0.0);
                        TimeStatus::Expired
                    }
                }
            }
            TimeControlSystem::Fischer { .. } | TimeControlSystem::Simple { .. } | TimeControlSystem::Absolute { .. } => {
                time.thinking_time_left = Some(remaining.max(0.0));
                if remaining >= 0.0 {
                    TimeStatus::Running
                } else {
                    TimeStatus::Expired
                }
            }
            TimeControlSystem::None => return None,
        };
        tracing::trace!(?player, elapsed, ?status, "clock recomputed");
        Some(status)
    }

    pub fn recompute_remaining_now(&mut self, system: &TimeControlSystem) -> Option<TimeStatus> {
        self.recompute_remaining(system, now_millis())
    }

    pub fn set_auto_resign(&mut self, color: StoneColor, time: f64) {
        *self.auto_resign_time.get_mut(color) = Some(time);
    }

    pub fn clear_auto_resign(&mut self, color: StoneColor) {
        *self.auto_resign_time.get_mut(color) = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LAST_MOVE: f64 = 1_600_000_000_000.0;

    fn byoyomi() -> TimeControlSystem {
        TimeControlSystem::ByoYomi {
            main_time: 600.0,
            periods: 5,
            period_time: 30.0,
        }
    }

    fn clock(black_time: ThinkingTime) -> Clock {
        Clock {
            black_time,
            white_time: ThinkingTime::main_time(600.0),
            current_player: StoneColor::Black,
            last_move_time: LAST_MOVE,
            started: true,
            auto_resign_time: PerColor::default(),
        }
    }

    fn byoyomi_time(main: f64) -> ThinkingTime {
        ThinkingTime {
            thinking_time: Some(main),
            periods: Some(5),
            period_time: Some(30),
            ..ThinkingTime::default()
        }
        .reset()
    }

    #[test]
    fn test_byoyomi_periods_consumed() {
        let mut clock = clock(byoyomi_time(0.0));
        let status = clock.recompute_remaining(&byoyomi(), LAST_MOVE + 65_000.0);
        assert_eq!(status, Some(TimeStatus::Overtime));
        assert_eq!(clock.black_time.thinking_time_left, Some(0.0));
        assert_eq!(clock.black_time.periods_left, Some(3));
        assert_eq!(clock.black_time.period_time_left, Some(25));
        // White's clock is not running
        assert_eq!(clock.white_time.thinking_time_left, Some(600.0));
    }

    #[test]
    fn test_byoyomi_main_time_only() {
        let mut clock = clock(byoyomi_time(100.0));
        let status = clock.recompute_remaining(&byoyomi(), LAST_MOVE + 40_500.0);
        assert_eq!(status, Some(TimeStatus::Running));
        assert_eq!(clock.black_time.thinking_time_left, Some(59.5));
        assert_eq!(clock.black_time.periods_left, Some(5));
    }

    #[test]
    fn test_byoyomi_expired() {
        let mut clock = clock(byoyomi_time(10.0));
        let status = clock.recompute_remaining(&byoyomi(), LAST_MOVE + 200_000.0);
        assert_eq!(status, Some(TimeStatus::Expired));
        assert_eq!(clock.black_time.periods_left, Some(0));
        assert_eq!(clock.black_time.period_time_left, Some(0));
    }

    #[test]
    fn test_recompute_is_idempotent() {
        let mut clock = clock(byoyomi_time(0.0));
        clock.recompute_remaining(&byoyomi(), LAST_MOVE + 65_000.0);
        let first = clock.clone();
        clock.recompute_remaining(&byoyomi(), LAST_MOVE + 65_000.0);
        assert_eq!(clock, first);
    }

    #[test]
    fn test_not_started_or_no_elapsed_is_noop() {
        let mut clock = clock(byoyomi_time(0.0));
        clock.started = false;
        let before = clock.clone();
        assert_eq!(clock.recompute_remaining(&byoyomi(), LAST_MOVE + 65_000.0), None);
        assert_eq!(clock, before);

        clock.started = true;
        assert_eq!(clock.recompute_remaining(&byoyomi(), LAST_MOVE - 1_000.0), None);
        assert_eq!(clock.recompute_remaining(&byoyomi(), LAST_MOVE), None);
        assert_eq!(clock, before);
    }

    #[test]
    fn test_canadian_block() {
        let system = TimeControlSystem::Canadian {
            main_time: 300.0,
            period_time: 120.0,
            stones_per_period: 10,
        };
        let time = ThinkingTime {
            thinking_time: Some(30.0),
            moves_left: Some(10),
            block_time: Some(120.0),
            ..ThinkingTime::default()
        }
        .reset();

        let mut overtime = clock(time.clone());
        assert_eq!(
            overtime.recompute_remaining(&system, LAST_MOVE + 50_000.0),
            Some(TimeStatus::Overtime)
        );
        assert_eq!(overtime.black_time.thinking_time_left, Some(0.0));
        assert_eq!(overtime.black_time.block_time_left, Some(100.0));
        assert_eq!(overtime.black_time.moves_left, Some(10));

        let mut expired = clock(time);
        assert_eq!(
            expired.recompute_remaining(&system, LAST_MOVE + 151_000.0),
            Some(TimeStatus::Expired)
        );
        assert_eq!(expired.black_time.block_time_left, Some(0.0));
    }

    #[test]
    fn test_absolute_clamps_to_zero() {
        let system = TimeControlSystem::Absolute { total_time: 60.0 };
        let mut clock = clock(ThinkingTime::main_time(20.0));
        assert_eq!(
            clock.recompute_remaining(&system, LAST_MOVE + 25_000.0),
            Some(TimeStatus::Expired)
        );
        assert_eq!(clock.black_time.thinking_time_left, Some(0.0));
    }

    #[test]
    fn test_time_control_decoding() {
        let byo: TimeControlSystem = serde_json::from_str(
            r#"{"system": "byoyomi", "time_control": "byoyomi", "speed": "live",
                "main_time": 600, "periods": 5, "period_time": 30}"#,
        )
        .unwrap();
        assert_eq!(byo, byoyomi());
        let none: TimeControlSystem = serde_json::from_str(r#"{"system": "none"}"#).unwrap();
        assert_eq!(none, TimeControlSystem::None);
    }

    #[test]
    fn test_auto_resign_set_and_clear() {
        let mut clock = clock(ThinkingTime::main_time(20.0));
        clock.set_auto_resign(StoneColor::White, 1234.0);
        assert_eq!(clock.auto_resign_time.white, Some(1234.0));
        clock.clear_auto_resign(StoneColor::White);
        assert_eq!(clock.auto_resign_time.white, None);
    }
}
