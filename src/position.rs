//! Board positions and the arena that holds their branching history.
//!
//! A [`BoardPosition`] is created once, by applying a move to its predecessor,
//! and never changes afterwards except for its annotations (removed stones,
//! scores, ownership estimate). Positions live in a [`PositionArena`] and refer
//! to their predecessor by [`NodeId`], so analysis branches share their common
//! prefix without reference cycles.
//!
//! Ko is the simple rule: a placement may not recreate the board of the
//! position two plies earlier.

use std::collections::BTreeSet;
use std::ops::Index;

use crate::board::{Board, Move, PerColor, Point, StoneColor};
use crate::error::IllegalMove;
use crate::playout::Ownership;
use crate::score::GameScores;

/// Index of a position inside a [`PositionArena`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Rule switches for a single move.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct MoveOptions {
    /// Remove the placing group instead of rejecting a suicide.
    pub allow_self_capture: bool,
    /// Skip the simple-ko check.
    pub ignore_ko: bool,
}

impl MoveOptions {
    pub fn with_self_capture(allow_self_capture: bool) -> Self {
        Self {
            allow_self_capture,
            ignore_ko: false,
        }
    }
}

#[derive(Clone, Debug)]
pub struct BoardPosition {
    board: Board,
    next_to_move: StoneColor,
    last_move: Option<Move>,
    last_move_color: Option<StoneColor>,
    /// Depth from the root, counting every node on the predecessor chain.
    last_move_number: usize,
    /// How many of those nodes were handicap placements.
    handicap_placements: usize,
    previous: Option<NodeId>,
    /// Stones captured by each color.
    captures: PerColor<usize>,
    pub removed_stones: Option<BTreeSet<Point>>,
    pub game_scores: Option<GameScores>,
    pub estimated_scores: Option<Ownership>,
}

impl BoardPosition {
    /// An empty root position with Black to move.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            board: Board::new(width, height),
            next_to_move: StoneColor::Black,
            last_move: None,
            last_move_color: None,
            last_move_number: 0,
            handicap_placements: 0,
            previous: None,
            captures: PerColor::default(),
            removed_stones: None,
            game_scores: None,
            estimated_scores: None,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn width(&self) -> usize {
        self.board.width()
    }

    pub fn height(&self) -> usize {
        self.board.height()
    }

    pub fn get(&self, pt: Point) -> Option<StoneColor> {
        self.board.get(pt)
    }

    pub fn next_to_move(&self) -> StoneColor {
        self.next_to_move
    }

    pub fn last_move(&self) -> Option<Move> {
        self.last_move
    }

    /// Color that made the last move (or handicap placement).
    pub fn last_move_color(&self) -> Option<StoneColor> {
        self.last_move_color
    }

    pub fn last_move_number(&self) -> usize {
        self.last_move_number
    }

    pub fn handicap_placements(&self) -> usize {
        self.handicap_placements
    }

    pub fn previous(&self) -> Option<NodeId> {
        self.previous
    }

    pub fn captures(&self, color: StoneColor) -> usize {
        self.captures[color]
    }

    pub fn is_removed(&self, pt: Point) -> bool {
        self.removed_stones.as_ref().is_some_and(|r| r.contains(&pt))
    }

    /// Unchecked stone placement for setting up initial positions.
    pub fn place(&mut self, pt: Point, color: StoneColor) {
        self.board.set(pt, Some(color));
    }

    pub(crate) fn set_next_to_move(&mut self, color: StoneColor) {
        self.next_to_move = color;
    }

    /// Same stones on the same board, regardless of history.
    pub fn same_position_as(&self, other: &BoardPosition) -> bool {
        self.board == other.board
    }

    fn successor(&self) -> BoardPosition {
        BoardPosition {
            board: self.board.clone(),
            next_to_move: self.next_to_move,
            last_move: self.last_move,
            last_move_color: self.last_move_color,
            last_move_number: self.last_move_number + 1,
            handicap_placements: self.handicap_placements,
            previous: None,
            captures: self.captures,
            removed_stones: None,
            game_scores: None,
            estimated_scores: None,
        }
    }

    /// Apply `mv` for the player to move. `ko_reference` is the board two plies
    /// before the result, i.e. this position's predecessor.
    fn make_move(&self, mv: Move, options: MoveOptions, ko_reference: Option<&Board>) -> Result<BoardPosition, IllegalMove> {
        let mover = self.next_to_move;
        let mut next = self.successor();
        if let Move::Place(pt) = mv {
            let outcome = next.board.play(pt, mover, options.allow_self_capture)?;
            if !options.ignore_ko && ko_reference.is_some_and(|prior| *prior == next.board) {
                return Err(IllegalMove::Ko(pt));
            }
            next.captures[mover] += outcome.captured;
            next.captures[mover.opponent()] += outcome.self_captured;
        }
        next.last_move = Some(mv);
        next.last_move_color = Some(mover);
        next.next_to_move = mover.opponent();
        Ok(next)
    }

    /// Place a handicap stone for the player to move. The turn passes only
    /// when `hands_over` is set, for the last stone of the handicap.
    fn make_handicap_placement(&self, mv: Move, hands_over: bool) -> Result<BoardPosition, IllegalMove> {
        let Move::Place(pt) = mv else {
            return Err(IllegalMove::HandicapPass);
        };
        if !self.board.contains(pt) {
            return Err(IllegalMove::OutOfBounds(pt));
        }
        if self.board.get(pt).is_some() {
            return Err(IllegalMove::Occupied(pt));
        }
        let mut next = self.successor();
        next.board.set(pt, Some(self.next_to_move));
        next.last_move = Some(mv);
        next.last_move_color = Some(self.next_to_move);
        next.handicap_placements += 1;
        if hands_over {
            next.next_to_move = self.next_to_move.opponent();
        }
        Ok(next)
    }
}

/// Owner of every position of a game, indexed by [`NodeId`].
#[derive(Clone, Debug)]
pub struct PositionArena {
    nodes: Vec<BoardPosition>,
    children: Vec<Vec<NodeId>>,
}

impl Index<NodeId> for PositionArena {
    type Output = BoardPosition;

    fn index(&self, id: NodeId) -> &Self::Output {
        &self.nodes[id.0]
    }
}

impl PositionArena {
    /// Start a new history rooted at `root`.
    pub fn new(mut root: BoardPosition) -> Self {
        root.previous = None;
        root.last_move_number = 0;
        Self {
            nodes: vec![root],
            children: vec![Vec::new()],
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        id.0 < self.nodes.len()
    }

    pub fn get(&self, id: NodeId) -> Option<&BoardPosition> {
        self.nodes.get(id.0)
    }

    pub(crate) fn get_mut(&mut self, id: NodeId) -> Option<&mut BoardPosition> {
        self.nodes.get_mut(id.0)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.children[id.0]
    }

    /// `id` followed by each predecessor up to the root.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(Some(id), move |&n| self[n].previous)
    }

    fn push(&mut self, mut position: BoardPosition, previous: NodeId) -> NodeId {
        position.previous = Some(previous);
        let id = NodeId(self.nodes.len());
        self.nodes.push(position);
        self.children.push(Vec::new());
        self.children[previous.0].push(id);
        id
    }

    /// Child of `from` reached by playing `mv`, if it was already created.
    /// Handicap placements on the same point are not matches.
    pub fn find_child(&self, from: NodeId, mv: Move) -> Option<NodeId> {
        let parent_handicaps = self[from].handicap_placements;
        self.children[from.0].iter().copied().find(|&c| {
            let child = &self[c];
            child.last_move == Some(mv) && child.handicap_placements == parent_handicaps
        })
    }

    /// Apply `mv` to the position `from` and store the result.
    pub fn make_move(&mut self, from: NodeId, mv: Move, options: MoveOptions) -> Result<NodeId, IllegalMove> {
        let parent = &self[from];
        let ko_reference = parent.previous.map(|p| &self[p].board);
        let next = parent.make_move(mv, options, ko_reference)?;
        tracing::debug!(?mv, number = next.last_move_number, "move applied");
        Ok(self.push(next, from))
    }

    /// Place a handicap stone on the position `from` and store the result.
    /// `hands_over` marks the last stone, after which the opponent moves.
    pub fn make_handicap_placement(&mut self, from: NodeId, mv: Move, hands_over: bool) -> Result<NodeId, IllegalMove> {
        let next = self[from].make_handicap_placement(mv, hands_over)?;
        tracing::debug!(?mv, number = next.last_move_number, hands_over, "handicap stone placed");
        Ok(self.push(next, from))
    }

    /// Like [`make_move`](Self::make_move), but reuses an existing child that
    /// was reached by the same move.
    pub fn make_or_reuse_move(&mut self, from: NodeId, mv: Move, options: MoveOptions) -> Result<NodeId, IllegalMove> {
        match self.find_child(from, mv) {
            Some(existing) => Ok(existing),
            None => self.make_move(from, mv, options),
        }
    }

    /// Apply `mv` to `from`, but return an existing child that already holds
    /// the same board with the same player to move, whatever move led there.
    pub fn make_or_reuse_equivalent(&mut self, from: NodeId, mv: Move, options: MoveOptions) -> Result<NodeId, IllegalMove> {
        if let Some(existing) = self.find_child(from, mv) {
            return Ok(existing);
        }
        let parent = &self[from];
        let ko_reference = parent.previous.map(|p| &self[p].board);
        let next = parent.make_move(mv, options, ko_reference)?;
        let equivalent = self.children[from.0].iter().copied().find(|&c| {
            let child = &self[c];
            child.same_position_as(&next) && child.next_to_move == next.next_to_move
        });
        match equivalent {
            Some(existing) => Ok(existing),
            None => Ok(self.push(next, from)),
        }
    }

    /// Reuses a placement child only if it hands the turn over the same way.
    pub fn make_or_reuse_handicap_placement(&mut self, from: NodeId, mv: Move, hands_over: bool) -> Result<NodeId, IllegalMove> {
        let placer = self[from].next_to_move;
        let expected = if hands_over { placer.opponent() } else { placer };
        let existing = self.children[from.0].iter().copied().find(|&c| {
            let child = &self[c];
            child.last_move == Some(mv)
                && child.handicap_placements > self[from].handicap_placements
                && child.next_to_move == expected
        });
        match existing {
            Some(existing) => Ok(existing),
            None => self.make_handicap_placement(from, mv, hands_over),
        }
    }
}
