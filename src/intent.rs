//! Outbound requests to the server.
//!
//! The engine never applies these itself. The server answers with a new
//! snapshot or event, and that is what changes the game.

use std::collections::BTreeSet;

use crossbeam_channel::Sender;
use serde::Serialize;

use crate::board::{Move, Point};
use crate::codec;
use crate::snapshot::SnapshotMove;

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Intent {
    SubmitMove {
        game_id: Option<i64>,
        #[serde(rename = "move")]
        mv: SnapshotMove,
    },
    SetRemovedStones {
        game_id: Option<i64>,
        #[serde(with = "codec::position_string")]
        stones: BTreeSet<Point>,
        removed: bool,
    },
    AcceptRemovedStones {
        game_id: Option<i64>,
        #[serde(with = "codec::position_string")]
        stones: BTreeSet<Point>,
    },
    RejectRemovedStones {
        game_id: Option<i64>,
    },
    RequestUndo {
        game_id: Option<i64>,
        move_number: usize,
    },
    AcceptUndo {
        game_id: Option<i64>,
        move_number: usize,
    },
    CancelGame {
        game_id: Option<i64>,
    },
}

impl Intent {
    pub fn submit_move(game_id: Option<i64>, mv: Move) -> Self {
        Intent::SubmitMove {
            game_id,
            mv: mv.into(),
        }
    }
}

/// Where a game sends its intents.
pub trait IntentSink {
    fn send(&mut self, intent: Intent);
}

impl IntentSink for Sender<Intent> {
    fn send(&mut self, intent: Intent) {
        if let Err(err) = Sender::send(self, intent) {
            tracing::warn!(intent = ?err.into_inner(), "intent receiver dropped");
        }
    }
}

impl IntentSink for Vec<Intent> {
    fn send(&mut self, intent: Intent) {
        self.push(intent);
    }
}

/// Sink for games that only display: intents are logged and dropped.
#[derive(Debug, Default)]
pub struct DiscardIntents;

impl IntentSink for DiscardIntents {
    fn send(&mut self, intent: Intent) {
        tracing::debug!(?intent, "no intent sink, dropping");
    }
}
