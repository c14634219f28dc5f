//! Move-number / lane index over a [`PositionArena`], for drawing and
//! navigating analysis branches.
//!
//! Every registered position sits in the column of its move number and the
//! row ("level") of its branch. The first child registered under a position
//! continues that position's level. Every other child opens a level that has
//! never been used before, so existing branches never move.

use std::collections::HashMap;
use std::ops::RangeInclusive;

use crate::position::{NodeId, PositionArena};

#[derive(Clone, Debug, Default)]
pub struct MoveTree {
    positions_by_move_number: Vec<Vec<Option<NodeId>>>,
    level_by_node: HashMap<NodeId, usize>,
    next_level: usize,
}

impl MoveTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `id` and any unregistered ancestors. Returns the level of `id`.
    pub fn register(&mut self, arena: &PositionArena, id: NodeId) -> usize {
        let mut pending = Vec::new();
        let mut known = None;
        for ancestor in arena.ancestors(id) {
            if let Some(&level) = self.level_by_node.get(&ancestor) {
                known = Some(level);
                break;
            }
            pending.push(ancestor);
        }

        let mut parent_level = known;
        for node in pending.into_iter().rev() {
            let move_number = arena[node].last_move_number();
            let level = match parent_level {
                Some(l) if self.slot(move_number, l).is_none() => l,
                _ => self.fresh_level(),
            };
            self.set_slot(move_number, level, node);
            self.level_by_node.insert(node, level);
            parent_level = Some(level);
        }
        self.level_by_node[&id]
    }

    fn fresh_level(&mut self) -> usize {
        let level = self.next_level;
        self.next_level += 1;
        level
    }

    fn slot(&self, move_number: usize, level: usize) -> Option<NodeId> {
        self.positions_by_move_number
            .get(move_number)
            .and_then(|slots| slots.get(level).copied().flatten())
    }

    fn set_slot(&mut self, move_number: usize, level: usize, id: NodeId) {
        if self.positions_by_move_number.len() <= move_number {
            self.positions_by_move_number.resize_with(move_number + 1, Vec::new);
        }
        let slots = &mut self.positions_by_move_number[move_number];
        if slots.len() <= level {
            slots.resize(level + 1, None);
        }
        slots[level] = Some(id);
    }

    pub fn level(&self, id: NodeId) -> Option<usize> {
        self.level_by_node.get(&id).copied()
    }

    /// Level of the predecessor of `id`, for drawing the edge back to it.
    pub fn previous_level(&self, arena: &PositionArena, id: NodeId) -> Option<usize> {
        arena.get(id)?.previous().and_then(|p| self.level(p))
    }

    /// Slots at `move_number`, indexed by level. Empty slots keep levels aligned.
    pub fn positions(&self, move_number: usize) -> &[Option<NodeId>] {
        self.positions_by_move_number
            .get(move_number)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// `0..=` the deepest registered move number.
    pub fn move_number_range(&self) -> RangeInclusive<usize> {
        0..=self.positions_by_move_number.len().saturating_sub(1)
    }

    /// Number of levels handed out so far.
    pub fn level_count(&self) -> usize {
        self.next_level
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.level_by_node.contains_key(&id)
    }
}
