//! The game orchestrator.
//!
//! [`Game`] owns the position arena, the move tree and the clock, and is the
//! only thing that mutates them. State changes come from server snapshots
//! ([`Game::ingest`]) and server events (`undo_to`, `set_removed_stones`, ...).
//! Local actions never change the authoritative state directly. They send an
//! [`Intent`] and wait for the server to answer with a new snapshot.
//!
//! Territory estimation runs on a background thread. Results come back on a
//! channel and are applied by [`Game::poll_background`] on the owner's thread;
//! a result for a superseded request or a position that is no longer current
//! is dropped.

use std::collections::BTreeSet;
use std::fmt;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::board::{Move, PerColor, Point, StoneColor};
use crate::clock::{Clock, TimeStatus};
use crate::codec;
use crate::constants::CANCEL_MOVE_LIMIT;
use crate::error::{DecodeError, IllegalMove, Result, StateError};
use crate::intent::{DiscardIntents, Intent, IntentSink};
use crate::move_tree::MoveTree;
use crate::playout::{EstimatorConfig, Ownership};
use crate::position::{BoardPosition, MoveOptions, NodeId, PositionArena};
use crate::score::GameScores;
use crate::snapshot::{GameSnapshot, Player};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    #[serde(rename = "play")]
    Play,
    #[serde(rename = "stone removal")]
    StoneRemoval,
    #[serde(rename = "finished")]
    Finished,
}

/// Observable parts of a [`Game`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum GameField {
    GameData,
    CurrentPosition,
    Phase,
    Clock,
    UndoRequested,
    RemovedStones,
    RemovedStonesAccepted,
    Scores,
    EstimatedScores,
    MoveTree,
}

/// Host callback for state changes.
pub trait GameObserver {
    fn changed(&mut self, field: GameField);
}

impl<F: FnMut(GameField)> GameObserver for F {
    fn changed(&mut self, field: GameField) {
        self(field)
    }
}

#[derive(Copy, Clone, Debug)]
enum EstimateKind {
    RemovalSuggestion,
    ScoreEstimate,
}

enum EstimateOutcome {
    RemovalSuggestion(BTreeSet<Point>),
    ScoreEstimate(Ownership),
}

struct EstimateResult {
    generation: u64,
    target: NodeId,
    outcome: EstimateOutcome,
}

pub struct Game {
    game_id: Option<i64>,
    data: Option<GameSnapshot>,
    arena: PositionArena,
    current: NodeId,
    move_tree: MoveTree,
    clock: Option<Clock>,
    phase: Option<GamePhase>,
    undo_requested: Option<usize>,
    auto_scoring_done: Option<bool>,
    removed_stones_accepted: PerColor<Option<BTreeSet<Point>>>,
    /// User id of whoever is looking at this game.
    viewer: Option<i64>,
    estimator: EstimatorConfig,
    generation: u64,
    results_tx: Sender<EstimateResult>,
    results_rx: Receiver<EstimateResult>,
    intents: Box<dyn IntentSink>,
    observer: Option<Box<dyn GameObserver>>,
}

impl Game {
    /// An empty game on a `width` x `height` board, before any snapshot.
    pub fn new(width: usize, height: usize) -> Self {
        let arena = PositionArena::new(BoardPosition::new(width, height));
        let current = arena.root();
        let mut move_tree = MoveTree::new();
        move_tree.register(&arena, current);
        let (results_tx, results_rx) = crossbeam_channel::unbounded();
        Self {
            game_id: None,
            data: None,
            arena,
            current,
            move_tree,
            clock: None,
            phase: None,
            undo_requested: None,
            auto_scoring_done: None,
            removed_stones_accepted: PerColor::default(),
            viewer: None,
            estimator: EstimatorConfig::default(),
            generation: 0,
            results_tx,
            results_rx,
            intents: Box::new(DiscardIntents),
            observer: None,
        }
    }

    pub fn from_snapshot(snapshot: GameSnapshot) -> Result<Self> {
        let mut game = Game::new(snapshot.width, snapshot.height);
        game.ingest(snapshot)?;
        Ok(game)
    }

    pub fn with_intent_sink(mut self, sink: impl IntentSink + 'static) -> Self {
        self.intents = Box::new(sink);
        self
    }

    pub fn with_observer(mut self, observer: impl GameObserver + 'static) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    pub fn with_viewer(mut self, user_id: i64) -> Self {
        self.viewer = Some(user_id);
        self
    }

    pub fn with_estimator(mut self, config: EstimatorConfig) -> Self {
        self.estimator = config;
        self
    }

    // ---------------------------------------------------------------------
    // Accessors
    // ---------------------------------------------------------------------

    pub fn game_id(&self) -> Option<i64> {
        self.game_id
    }

    pub fn data(&self) -> Option<&GameSnapshot> {
        self.data.as_ref()
    }

    pub fn arena(&self) -> &PositionArena {
        &self.arena
    }

    pub fn move_tree(&self) -> &MoveTree {
        &self.move_tree
    }

    pub fn current_id(&self) -> NodeId {
        self.current
    }

    pub fn current_position(&self) -> &BoardPosition {
        &self.arena[self.current]
    }

    pub fn initial_id(&self) -> NodeId {
        self.arena.root()
    }

    pub fn initial_position(&self) -> &BoardPosition {
        &self.arena[self.arena.root()]
    }

    pub fn clock(&self) -> Option<&Clock> {
        self.clock.as_ref()
    }

    pub fn phase(&self) -> Option<GamePhase> {
        self.phase
    }

    pub fn undo_requested(&self) -> Option<usize> {
        self.undo_requested
    }

    pub fn auto_scoring_done(&self) -> Option<bool> {
        self.auto_scoring_done
    }

    pub fn removed_stones_accepted(&self, color: StoneColor) -> Option<&BTreeSet<Point>> {
        self.removed_stones_accepted.get(color).as_ref()
    }

    pub fn player(&self, color: StoneColor) -> Option<&Player> {
        self.data.as_ref().map(|d| d.player(color))
    }

    fn notify(&mut self, field: GameField) {
        if let Some(observer) = self.observer.as_mut() {
            observer.changed(field);
        }
    }

    fn send(&mut self, intent: Intent) {
        debug!(?intent, "sending intent");
        self.intents.send(intent);
    }

    // ---------------------------------------------------------------------
    // Snapshot ingestion
    // ---------------------------------------------------------------------

    pub fn ingest_json(&mut self, json: &str) -> Result<()> {
        let snapshot = GameSnapshot::from_json(json)?;
        self.ingest(snapshot)
    }

    /// Replace local state with an authoritative snapshot.
    ///
    /// Positions already in the arena are reused when the initial position is
    /// unchanged, so analysis branches survive. An illegal move in the move
    /// list stops the replay at the last good position.
    #[instrument(skip_all, fields(game_id = ?snapshot.game_id, moves = snapshot.moves.len(), phase = ?snapshot.phase))]
    pub fn ingest(&mut self, snapshot: GameSnapshot) -> Result<()> {
        let clock = snapshot.decode_clock()?;

        let root = root_position(&snapshot);
        if !self.same_root(&root) {
            info!(width = snapshot.width, height = snapshot.height, "initial position changed, rebuilding history");
            self.arena = PositionArena::new(root);
            self.move_tree = MoveTree::new();
            self.generation += 1;
        }

        let current = self.replay(&snapshot);
        self.current = current;
        self.move_tree.register(&self.arena, current);
        if let Some(position) = self.arena.get_mut(current) {
            position.removed_stones = snapshot.removed.clone();
            position.game_scores = snapshot.score.clone();
        }

        self.removed_stones_accepted = PerColor {
            black: snapshot.players.black.accepted_stones.clone(),
            white: snapshot.players.white.accepted_stones.clone(),
        };
        self.clock = clock;
        self.undo_requested = snapshot.undo_requested;
        self.auto_scoring_done = snapshot.auto_scoring_done;
        self.game_id = snapshot.game_id;
        let phase = snapshot.phase;
        self.data = Some(snapshot);
        info!(move_number = self.current_position().last_move_number(), "snapshot ingested");

        for field in [
            GameField::GameData,
            GameField::CurrentPosition,
            GameField::MoveTree,
            GameField::Clock,
            GameField::UndoRequested,
            GameField::RemovedStones,
            GameField::RemovedStonesAccepted,
        ] {
            self.notify(field);
        }

        let previous = self.phase.replace(phase);
        self.enter_phase(previous, phase);
        Ok(())
    }

    fn same_root(&self, root: &BoardPosition) -> bool {
        let existing = self.initial_position();
        existing.same_position_as(root) && existing.next_to_move() == root.next_to_move()
    }

    fn replay(&mut self, snapshot: &GameSnapshot) -> NodeId {
        let options = MoveOptions::with_self_capture(snapshot.allow_self_capture);
        let mut node = self.arena.root();
        for (i, &m) in snapshot.moves.iter().enumerate() {
            let mv = Move::from(m);
            match place(&mut self.arena, snapshot, node, mv, options) {
                Ok(next) => node = next,
                Err(err) => {
                    warn!(move_number = i + 1, ?mv, %err, "server move rejected, replay stopped");
                    break;
                }
            }
        }
        node
    }

    fn enter_phase(&mut self, previous: Option<GamePhase>, phase: GamePhase) {
        let transitioned = previous != Some(phase);
        if transitioned {
            info!(?previous, ?phase, "phase changed");
            self.notify(GameField::Phase);
        }
        match phase {
            GamePhase::StoneRemoval => {
                if self.auto_scoring_done == Some(true) || !transitioned {
                    self.update_scores();
                } else {
                    self.spawn_estimate(EstimateKind::RemovalSuggestion);
                }
            }
            GamePhase::Play if previous == Some(GamePhase::StoneRemoval) => {
                self.auto_scoring_done = None;
                if let Some(position) = self.arena.get_mut(self.current) {
                    position.game_scores = None;
                    position.removed_stones = None;
                }
                self.notify(GameField::Scores);
                self.notify(GameField::RemovedStones);
            }
            GamePhase::Play | GamePhase::Finished => {}
        }
    }

    // ---------------------------------------------------------------------
    // Scoring
    // ---------------------------------------------------------------------

    /// Score of the current position, or `None` before any snapshot.
    pub fn compute_score(&self) -> Option<GameScores> {
        let data = self.data.as_ref()?;
        Some(GameScores::compute(
            self.current_position(),
            &data.rules,
            data.komi,
            data.handicap,
        ))
    }

    fn update_scores(&mut self) {
        let Some(scores) = self.compute_score() else {
            return;
        };
        if let Some(position) = self.arena.get_mut(self.current) {
            position.game_scores = Some(scores);
        }
        self.notify(GameField::Scores);
    }

    /// Start a background ownership estimate of the current position. When it
    /// arrives it is stored as the position's `estimated_scores`.
    pub fn request_score_estimate(&mut self) {
        self.spawn_estimate(EstimateKind::ScoreEstimate);
    }

    fn spawn_estimate(&mut self, kind: EstimateKind) {
        self.generation += 1;
        let generation = self.generation;
        let target = self.current;
        let position = self.arena[target].clone();
        let config = self.estimator.clone();
        let tx = self.results_tx.clone();
        debug!(generation, ?kind, "estimate requested");

        std::thread::spawn(move || {
            let ownership = position.estimate_territory(&config);
            let outcome = match kind {
                EstimateKind::RemovalSuggestion => {
                    EstimateOutcome::RemovalSuggestion(suggest_removed_stones(&position, &ownership))
                }
                EstimateKind::ScoreEstimate => EstimateOutcome::ScoreEstimate(ownership),
            };
            let result = EstimateResult {
                generation,
                target,
                outcome,
            };
            if tx.send(result).is_err() {
                debug!(generation, "game dropped before estimate finished");
            }
        });
    }

    /// Apply every finished background result. Returns how many were applied.
    pub fn poll_background(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(result) = self.results_rx.try_recv() {
            if self.apply_estimate(result) {
                applied += 1;
            }
        }
        applied
    }

    /// Block until a current background result is applied or `timeout` passes.
    pub fn wait_background(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.results_rx.recv_timeout(remaining) {
                Ok(result) => {
                    if self.apply_estimate(result) {
                        return true;
                    }
                }
                Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => return false,
            }
        }
    }

    fn apply_estimate(&mut self, result: EstimateResult) -> bool {
        if result.generation != self.generation || result.target != self.current {
            debug!(
                generation = result.generation,
                current_generation = self.generation,
                "discarding stale estimate"
            );
            return false;
        }
        match result.outcome {
            EstimateOutcome::RemovalSuggestion(stones) => {
                if self.phase != Some(GamePhase::StoneRemoval) {
                    debug!("left stone removal before the suggestion arrived");
                    return false;
                }
                info!(stones = stones.len(), "suggesting removed stones");
                self.send(Intent::SetRemovedStones {
                    game_id: self.game_id,
                    stones,
                    removed: true,
                });
            }
            EstimateOutcome::ScoreEstimate(ownership) => {
                if let Some(position) = self.arena.get_mut(self.current) {
                    position.estimated_scores = Some(ownership);
                }
                self.notify(GameField::EstimatedScores);
            }
        }
        true
    }

    // ---------------------------------------------------------------------
    // Local moves
    // ---------------------------------------------------------------------

    /// Play `mv` on the current position and submit it to the server.
    ///
    /// In a free-handicap game the first `handicap` stones are placements by
    /// the same player, exactly as a snapshot replays them. Each one is still
    /// submitted, since the server records every stone as a move.
    #[instrument(skip(self))]
    pub fn make_move(&mut self, mv: Move) -> Result<NodeId> {
        let data = self.data.as_ref().ok_or(StateError::NoGameData)?;
        if self.phase != Some(GamePhase::Play) {
            return Err(StateError::WrongPhase {
                expected: GamePhase::Play,
                actual: self.phase,
            }
            .into());
        }
        let options = MoveOptions::with_self_capture(data.allow_self_capture);
        let next = place(&mut self.arena, data, self.current, mv, options)?;
        self.current = next;
        self.move_tree.register(&self.arena, next);
        self.notify(GameField::CurrentPosition);
        self.notify(GameField::MoveTree);

        if self.undo_requested.take().is_some() {
            self.notify(GameField::UndoRequested);
        }
        self.send(Intent::submit_move(self.game_id, mv));
        Ok(next)
    }

    /// Explore `mv` from `from` without touching the game. Reuses an existing
    /// child with the same resulting position.
    #[instrument(skip(self))]
    pub fn make_analysis_move(&mut self, from: NodeId, mv: Move) -> Result<NodeId> {
        if !self.arena.contains(from) {
            return Err(StateError::UnknownNode.into());
        }
        let allow_self_capture = self.data.as_ref().is_some_and(|d| d.allow_self_capture);
        let options = MoveOptions::with_self_capture(allow_self_capture);
        let id = self.arena.make_or_reuse_equivalent(from, mv, options)?;
        self.move_tree.register(&self.arena, id);
        self.notify(GameField::MoveTree);
        Ok(id)
    }

    // ---------------------------------------------------------------------
    // Server events
    // ---------------------------------------------------------------------

    /// The server accepted an undo back to before `move_number`.
    #[instrument(skip(self))]
    pub fn undo_to(&mut self, move_number: usize) {
        let mut node = self.current;
        while let Some(previous) = self.arena[node].previous() {
            if self.arena[node].last_move_number() < move_number {
                break;
            }
            node = previous;
        }
        info!(from = self.current_position().last_move_number(), to = self.arena[node].last_move_number(), "undo");
        self.current = node;
        self.undo_requested = None;
        self.notify(GameField::CurrentPosition);
        self.notify(GameField::UndoRequested);
    }

    pub fn set_undo_requested(&mut self, move_number: Option<usize>) {
        self.undo_requested = move_number;
        self.notify(GameField::UndoRequested);
    }

    /// The server's current removed-stone set, as a position string.
    pub fn set_removed_stones(&mut self, removed: &str) -> Result<(), DecodeError> {
        let stones = codec::points_from_position_string(removed)?;
        if let Some(position) = self.arena.get_mut(self.current) {
            position.removed_stones = Some(stones);
        }
        self.notify(GameField::RemovedStones);
        if self.phase == Some(GamePhase::StoneRemoval) {
            self.update_scores();
        }
        Ok(())
    }

    pub fn set_auto_resign(&mut self, player_id: i64, time: f64) {
        let color = self.data.as_ref().and_then(|d| d.color_of(player_id));
        if let (Some(color), Some(clock)) = (color, self.clock.as_mut()) {
            clock.set_auto_resign(color, time);
            self.notify(GameField::Clock);
        }
    }

    pub fn clear_auto_resign(&mut self, player_id: i64) {
        let color = self.data.as_ref().and_then(|d| d.color_of(player_id));
        if let (Some(color), Some(clock)) = (color, self.clock.as_mut()) {
            clock.clear_auto_resign(color);
            self.notify(GameField::Clock);
        }
    }

    /// Recompute the advisory clock at `now_ms` (epoch milliseconds).
    pub fn recompute_clock(&mut self, now_ms: f64) -> Option<TimeStatus> {
        let system = self.data.as_ref()?.time_control.clone()?;
        let status = self.clock.as_mut()?.recompute_remaining(&system, now_ms);
        if status.is_some() {
            self.notify(GameField::Clock);
        }
        status
    }

    // ---------------------------------------------------------------------
    // Turn, undo and cancellation
    // ---------------------------------------------------------------------

    /// Whose turn it is: the clock's view if there is one, else the board's.
    pub fn current_turn(&self) -> StoneColor {
        self.clock
            .as_ref()
            .map(|c| c.current_player)
            .unwrap_or_else(|| self.current_position().next_to_move())
    }

    pub fn viewer_color(&self) -> Option<StoneColor> {
        let viewer = self.viewer?;
        self.data.as_ref()?.color_of(viewer)
    }

    pub fn is_user_playing(&self) -> bool {
        self.viewer_color().is_some()
    }

    pub fn is_user_turn(&self) -> bool {
        self.phase == Some(GamePhase::Play) && self.viewer_color() == Some(self.current_turn())
    }

    fn undo_minimum(data: &GameSnapshot) -> usize {
        if data.free_handicap_placement {
            data.handicap
        } else {
            0
        }
    }

    fn check_undo_request(&self, player: StoneColor) -> Result<usize, StateError> {
        let data = self.data.as_ref().ok_or(StateError::NoGameData)?;
        if self.phase != Some(GamePhase::Play) || data.outcome.is_some() {
            return Err(StateError::WrongPhase {
                expected: GamePhase::Play,
                actual: self.phase,
            });
        }
        if player == self.current_turn() {
            return Err(StateError::OwnTurn);
        }
        if self.undo_requested.is_some() {
            return Err(StateError::UndoPending);
        }
        let played = self.current_position().last_move_number();
        let minimum = Self::undo_minimum(data);
        if played <= minimum {
            return Err(StateError::NotEnoughMoves { played, minimum });
        }
        Ok(played)
    }

    /// Whether `player` may ask to take back their last move.
    pub fn can_request_undo(&self, player: StoneColor) -> bool {
        self.check_undo_request(player).is_ok()
    }

    #[instrument(skip(self))]
    pub fn request_undo(&mut self, player: StoneColor) -> Result<(), StateError> {
        let move_number = self.check_undo_request(player)?;
        self.send(Intent::RequestUndo {
            game_id: self.game_id,
            move_number,
        });
        Ok(())
    }

    fn check_undo_acceptance(&self, player: StoneColor) -> Result<usize, StateError> {
        if self.phase != Some(GamePhase::Play) {
            return Err(StateError::WrongPhase {
                expected: GamePhase::Play,
                actual: self.phase,
            });
        }
        let requested = self.undo_requested.ok_or(StateError::NoUndoPending)?;
        if player != self.current_turn() {
            return Err(StateError::NotYourTurn);
        }
        let current = self.current_position().last_move_number();
        if requested != current {
            return Err(StateError::UndoMoveMismatch { requested, current });
        }
        Ok(requested)
    }

    /// Whether `player` may accept the pending undo request.
    pub fn can_accept_undo(&self, player: StoneColor) -> bool {
        self.check_undo_acceptance(player).is_ok()
    }

    #[instrument(skip(self))]
    pub fn accept_undo(&mut self, player: StoneColor) -> Result<(), StateError> {
        let move_number = self.check_undo_acceptance(player)?;
        self.send(Intent::AcceptUndo {
            game_id: self.game_id,
            move_number,
        });
        Ok(())
    }

    /// [`can_request_undo`](Self::can_request_undo) for the viewer.
    pub fn undoable(&self) -> bool {
        self.viewer_color().is_some_and(|c| self.can_request_undo(c))
    }

    /// [`can_accept_undo`](Self::can_accept_undo) for the viewer.
    pub fn undo_acceptable(&self) -> bool {
        self.viewer_color().is_some_and(|c| self.can_accept_undo(c))
    }

    pub fn can_be_cancelled(&self) -> bool {
        let Some(data) = self.data.as_ref() else {
            return false;
        };
        if self.phase != Some(GamePhase::Play) || data.tournament_id.is_some() || data.ladder_id.is_some() {
            return false;
        }
        let mut limit = CANCEL_MOVE_LIMIT;
        if data.free_handicap_placement {
            limit += data.handicap.saturating_sub(1);
        }
        self.current_position().last_move_number() < limit
    }

    pub fn cancel(&mut self) -> Result<(), StateError> {
        if !self.can_be_cancelled() {
            return Err(StateError::NotCancellable);
        }
        self.send(Intent::CancelGame { game_id: self.game_id });
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Stone removal
    // ---------------------------------------------------------------------

    fn require_stone_removal(&self) -> Result<(), StateError> {
        if self.phase == Some(GamePhase::StoneRemoval) {
            Ok(())
        } else {
            Err(StateError::WrongPhase {
                expected: GamePhase::StoneRemoval,
                actual: self.phase,
            })
        }
    }

    /// Ask the server to mark (`removed`) or unmark `stones` as dead.
    pub fn toggle_removed_stones(&mut self, stones: BTreeSet<Point>, removed: bool) -> Result<(), StateError> {
        self.require_stone_removal()?;
        self.send(Intent::SetRemovedStones {
            game_id: self.game_id,
            stones,
            removed,
        });
        Ok(())
    }

    /// Accept the current removed-stone set.
    pub fn accept_removed_stones(&mut self) -> Result<(), StateError> {
        self.require_stone_removal()?;
        let stones = self.current_position().removed_stones.clone().unwrap_or_default();
        self.send(Intent::AcceptRemovedStones {
            game_id: self.game_id,
            stones,
        });
        Ok(())
    }

    pub fn reject_removed_stones(&mut self) -> Result<(), StateError> {
        self.require_stone_removal()?;
        self.send(Intent::RejectRemovedStones { game_id: self.game_id });
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Status
    // ---------------------------------------------------------------------

    pub fn status(&self) -> GameStatus {
        if let Some(data) = self.data.as_ref() {
            if let Some(outcome) = data.outcome.as_ref() {
                let winner = match data.winner {
                    Some(id) if id == data.players.black.id => StoneColor::Black,
                    _ => StoneColor::White,
                };
                return GameStatus::Finished {
                    winner,
                    outcome: outcome.clone(),
                };
            }
        }

        let position = self.current_position();
        if let Some(estimate) = position.estimated_scores.as_ref() {
            let komi = self.data.as_ref().map_or(0.0, |d| d.komi);
            let black = estimate.count(StoneColor::Black) as f64;
            let white = estimate.count(StoneColor::White) as f64 + komi;
            let difference = white - black;
            return if difference > 0.0 {
                GameStatus::Estimate {
                    leader: StoneColor::White,
                    margin: difference,
                }
            } else {
                GameStatus::Estimate {
                    leader: StoneColor::Black,
                    margin: -difference,
                }
            };
        }

        if self.phase == Some(GamePhase::StoneRemoval) {
            return GameStatus::StoneRemoval;
        }
        if self.undo_requested.is_some() {
            return GameStatus::UndoRequested;
        }
        if self.is_user_playing() {
            return match (self.is_user_turn(), position.last_move()) {
                (true, Some(Move::Pass)) => GameStatus::OpponentPassed,
                (true, _) => GameStatus::YourMove,
                (false, _) => GameStatus::WaitingForOpponent,
            };
        }
        if self.data.is_none() {
            return GameStatus::Unknown;
        }
        GameStatus::ToMove(self.current_turn())
    }
}

/// Root position described by a snapshot's initial state.
fn root_position(snapshot: &GameSnapshot) -> BoardPosition {
    let mut root = BoardPosition::new(snapshot.width, snapshot.height);
    let stones = [
        (StoneColor::Black, &snapshot.initial_state.black),
        (StoneColor::White, &snapshot.initial_state.white),
    ];
    for (color, points) in stones {
        for &pt in points {
            if root.board().contains(pt) {
                root.place(pt, color);
            } else {
                warn!(%pt, %color, "initial stone off the board, skipping");
            }
        }
    }
    if !snapshot.initial_state.is_empty() {
        root.set_next_to_move(snapshot.initial_player);
    }
    root
}

/// Apply the next move of a game to `from`. In a free-handicap game the
/// first `handicap` moves are placements and the last of them hands the turn
/// over; everything after is a regular move.
fn place(
    arena: &mut PositionArena,
    data: &GameSnapshot,
    from: NodeId,
    mv: Move,
    options: MoveOptions,
) -> Result<NodeId, IllegalMove> {
    let index = arena[from].last_move_number();
    if data.free_handicap_placement && index < data.handicap {
        arena.make_or_reuse_handicap_placement(from, mv, index + 1 == data.handicap)
    } else {
        arena.make_or_reuse_move(from, mv, options)
    }
}

/// Points to propose as removed: stones the estimate gives to the other
/// side, and empty points nobody owns.
fn suggest_removed_stones(position: &BoardPosition, ownership: &Ownership) -> BTreeSet<Point> {
    position
        .board()
        .points()
        .filter(|&pt| match (position.get(pt), ownership.get(pt)) {
            (Some(stone), owner) => owner != Some(stone),
            (None, owner) => owner.is_none(),
        })
        .collect()
}

/// One-line summary of a game for display.
#[derive(Clone, Debug, PartialEq)]
pub enum GameStatus {
    Finished { winner: StoneColor, outcome: String },
    Estimate { leader: StoneColor, margin: f64 },
    StoneRemoval,
    UndoRequested,
    OpponentPassed,
    YourMove,
    WaitingForOpponent,
    ToMove(StoneColor),
    Unknown,
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameStatus::Finished { winner, outcome } => write!(f, "{winner} wins by {outcome}"),
            GameStatus::Estimate { leader, margin } => write!(f, "{leader} by {margin:.1}"),
            GameStatus::StoneRemoval => f.write_str("Stone Removal Phase"),
            GameStatus::UndoRequested => f.write_str("Undo requested"),
            GameStatus::OpponentPassed => f.write_str("Opponent passed"),
            GameStatus::YourMove => f.write_str("Your move"),
            GameStatus::WaitingForOpponent => f.write_str("Waiting for opponent"),
            GameStatus::ToMove(color) => write!(f, "{color} to move"),
            GameStatus::Unknown => Ok(()),
        }
    }
}
