//! Integration tests for board positions, history and scoring.
//!
//! Positions are built by playing move lists through a [`PositionArena`], the
//! same way the game replays server snapshots.

use surround::board::{Move, Point, StoneColor};
use surround::codec::points_from_position_string;
use surround::error::IllegalMove;
use surround::position::{BoardPosition, MoveOptions, NodeId, PositionArena};
use surround::score::{GameScores, ScoringRules};

// =============================================================================
// Helper functions for setting up test positions
// =============================================================================

/// Parse `"pass"` or a two-letter position-string coordinate (column, row).
fn parse_move(s: &str) -> Move {
    if s == "pass" {
        return Move::Pass;
    }
    let points = points_from_position_string(s).unwrap();
    assert_eq!(points.len(), 1, "{s:?} is not a single point");
    Move::Place(*points.first().unwrap())
}

/// Play `moves` alternately from an empty `size` x `size` board.
/// Returns the arena and the node of every move, root first.
fn setup_position(size: usize, moves: &[&str], options: MoveOptions) -> (PositionArena, Vec<NodeId>) {
    let mut arena = PositionArena::new(BoardPosition::new(size, size));
    let mut line = vec![arena.root()];
    for mv in moves {
        let last = *line.last().unwrap();
        let next = arena
            .make_move(last, parse_move(mv), options)
            .unwrap_or_else(|e| panic!("{mv}: {e}"));
        line.push(next);
    }
    (arena, line)
}

fn play(arena: &mut PositionArena, from: NodeId, mv: &str, options: MoveOptions) -> Result<NodeId, IllegalMove> {
    arena.make_move(from, parse_move(mv), options)
}

fn pt(row: usize, column: usize) -> Point {
    Point::new(row, column)
}

/// Black wall on column 1, White wall on column 3 of a 5x5 board.
const WALLS: [&str; 10] = ["ba", "da", "bb", "db", "bc", "dc", "bd", "dd", "be", "de"];

/// Ends with Black taking the ko at `cb`; White may not retake at `bb` at once.
const KO: [&str; 9] = ["ba", "ca", "bc", "cc", "ab", "db", "ee", "bb", "cb"];

// =============================================================================
// History
// =============================================================================

#[test]
fn test_chain_length_matches_move_number() {
    let moves = ["dd", "ee", "pass", "cc", "pass", "pass"];
    let (arena, line) = setup_position(9, &moves, MoveOptions::default());
    for (i, &id) in line.iter().enumerate() {
        assert_eq!(arena[id].last_move_number(), i);
        assert_eq!(arena.ancestors(id).count() - 1, i);
    }
    let last = &arena[*line.last().unwrap()];
    assert_eq!(last.last_move(), Some(Move::Pass));
    assert_eq!(last.last_move_color(), Some(StoneColor::White));
    assert_eq!(last.next_to_move(), StoneColor::Black);
}

#[test]
fn test_failed_move_leaves_history_unchanged() {
    let (mut arena, line) = setup_position(9, &["dd"], MoveOptions::default());
    let tip = line[1];
    assert_eq!(
        play(&mut arena, tip, "dd", MoveOptions::default()),
        Err(IllegalMove::Occupied(pt(3, 3)))
    );
    assert_eq!(
        arena.make_move(tip, Move::Place(pt(9, 0)), MoveOptions::default()),
        Err(IllegalMove::OutOfBounds(pt(9, 0)))
    );
    assert_eq!(arena.len(), 2);
    assert!(arena.children(tip).is_empty());
}

#[test]
fn test_equivalent_analysis_moves_share_a_node() {
    let (mut arena, line) = setup_position(9, &["dd", "ee"], MoveOptions::default());
    let a = arena
        .make_or_reuse_equivalent(line[2], parse_move("cc"), MoveOptions::default())
        .unwrap();
    let b = arena
        .make_or_reuse_equivalent(line[2], parse_move("cc"), MoveOptions::default())
        .unwrap();
    assert_eq!(a, b);
    assert_eq!(arena.children(line[2]), &[a]);
}

// =============================================================================
// Captures, suicide and ko
// =============================================================================

#[test]
fn test_corner_capture() {
    let (arena, line) = setup_position(5, &["ba", "aa", "ab"], MoveOptions::default());
    let pos = &arena[line[3]];
    assert_eq!(pos.get(pt(0, 0)), None);
    assert_eq!(pos.captures(StoneColor::Black), 1);
    assert_eq!(pos.captures(StoneColor::White), 0);
    // Earlier positions are untouched
    assert_eq!(arena[line[2]].get(pt(0, 0)), Some(StoneColor::White));
}

#[test]
fn test_suicide_rejected_without_self_capture() {
    let (mut arena, line) = setup_position(5, &["ba", "ee", "ab"], MoveOptions::default());
    assert_eq!(
        play(&mut arena, line[3], "aa", MoveOptions::default()),
        Err(IllegalMove::Suicide(pt(0, 0)))
    );
}

#[test]
fn test_self_capture_when_allowed() {
    let (mut arena, line) = setup_position(5, &["ba", "ee", "ab"], MoveOptions::default());
    let id = play(&mut arena, line[3], "aa", MoveOptions::with_self_capture(true)).unwrap();
    let pos = &arena[id];
    assert_eq!(pos.get(pt(0, 0)), None);
    assert_eq!(pos.last_move_number(), 4);
    assert_eq!(pos.next_to_move(), StoneColor::Black);
    // The self-captured stone is a prisoner for Black
    assert_eq!(pos.captures(StoneColor::Black), 1);
}

#[test]
fn test_ko_retake_rejected() {
    let (mut arena, line) = setup_position(5, &KO, MoveOptions::default());
    let tip = *line.last().unwrap();
    assert_eq!(arena[tip].get(pt(1, 1)), None);
    assert_eq!(arena[tip].captures(StoneColor::Black), 1);
    assert_eq!(
        play(&mut arena, tip, "bb", MoveOptions::default()),
        Err(IllegalMove::Ko(pt(1, 1)))
    );
}

#[test]
fn test_ko_retake_with_override() {
    let (mut arena, line) = setup_position(5, &KO, MoveOptions::default());
    let tip = *line.last().unwrap();
    let options = MoveOptions {
        ignore_ko: true,
        ..MoveOptions::default()
    };
    let id = play(&mut arena, tip, "bb", options).unwrap();
    assert!(arena[id].same_position_as(&arena[line[8]]));
    assert_eq!(arena[id].captures(StoneColor::White), 1);
}

#[test]
fn test_ko_retake_after_exchange_elsewhere() {
    let (mut arena, line) = setup_position(5, &KO, MoveOptions::default());
    let tip = *line.last().unwrap();
    let w = play(&mut arena, tip, "ae", MoveOptions::default()).unwrap();
    let b = play(&mut arena, w, "ea", MoveOptions::default()).unwrap();
    let retake = play(&mut arena, b, "bb", MoveOptions::default()).unwrap();
    assert_eq!(arena[retake].get(pt(1, 2)), None);
}

// =============================================================================
// Territory and scoring
// =============================================================================

#[test]
fn test_territory_groups_on_walls() {
    let (arena, line) = setup_position(5, &WALLS, MoveOptions::default());
    let groups = arena[*line.last().unwrap()].construct_territory_groups();
    assert_eq!(groups.len(), 3);

    let owned_by = |color| {
        groups
            .iter()
            .find(|g| g.territory_color == Some(color))
            .unwrap()
    };
    assert_eq!(owned_by(StoneColor::Black).points.len(), 5);
    assert!(owned_by(StoneColor::Black).points.contains(&pt(2, 0)));
    assert_eq!(owned_by(StoneColor::White).points.len(), 5);
    assert!(owned_by(StoneColor::White).is_territory());

    let dame: Vec<_> = groups.iter().filter(|g| g.is_dame).collect();
    assert_eq!(dame.len(), 1);
    assert!(dame[0].points.iter().all(|p| p.column == 2));
}

#[test]
fn test_japanese_and_chinese_counting() {
    let (arena, line) = setup_position(5, &WALLS, MoveOptions::default());
    let pos = &arena[*line.last().unwrap()];

    let japanese = ScoringRules {
        score_territory: true,
        score_prisoners: true,
        ..ScoringRules::default()
    };
    let score = GameScores::compute(pos, &japanese, 6.5, 0);
    assert_eq!(score.black.total, 5.0);
    assert_eq!(score.white.total, 11.5);

    let chinese = ScoringRules {
        score_stones: true,
        score_territory: true,
        ..ScoringRules::default()
    };
    let score = GameScores::compute(pos, &chinese, 7.5, 0);
    assert_eq!(score.black.total, 10.0);
    assert_eq!(score.white.total, 17.5);
}

#[test]
fn test_removed_stone_changes_ownership() {
    let mut moves = WALLS.to_vec();
    moves.extend(["ee", "ec"]);
    let (arena, line) = setup_position(5, &moves, MoveOptions::default());
    let tip = *line.last().unwrap();
    // Black's ee stone sits inside White's area
    let pos = arena.get(tip).unwrap().clone();
    assert_eq!(pos.get(pt(4, 4)), Some(StoneColor::Black));

    let rules = ScoringRules {
        score_territory: true,
        score_prisoners: true,
        ..ScoringRules::default()
    };
    let before = GameScores::compute(&pos, &rules, 0.0, 0);
    assert_eq!(before.white.territory, 2, "only the corner above White's stone is territory");

    let mut marked = pos;
    marked.removed_stones = Some([pt(4, 4)].into_iter().collect());
    let after = GameScores::compute(&marked, &rules, 0.0, 0);
    assert_eq!(after.white.prisoners, 1);
    assert_eq!(after.white.territory, 4);

    // Annotations on a clone never reach the arena
    assert!(arena.get(tip).unwrap().removed_stones.is_none());
}
