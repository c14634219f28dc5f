//! Surround: Go rules and game state for a client of a remote Go server.
//!
//! The server is the authority on every game. This crate rebuilds the board
//! from its snapshots, keeps analysis branches next to the real game, scores
//! positions under the server's rulesets, estimates territory for dead-stone
//! suggestions, and keeps an advisory clock between updates.
//!
//! ## Modules
//!
//! - [`board`] - Stones, groups, liberties and captures on a 2D grid
//! - [`position`] - Immutable positions and the arena holding their history
//! - [`territory`] - Flood-fill classification of empty regions
//! - [`playout`] - Monte Carlo ownership estimation
//! - [`score`] - Score aggregation under ruleset flags
//! - [`clock`] - Advisory time-control arithmetic
//! - [`move_tree`] - Move-number / branch index for navigation
//! - [`codec`] - Position strings
//! - [`snapshot`] - Inbound server snapshots
//! - [`intent`] - Outbound requests
//! - [`game`] - The orchestrator tying it all together
//!
//! ## Example
//!
//! ```
//! use surround::board::{Move, Point, StoneColor};
//! use surround::game::Game;
//! use surround::snapshot::GameSnapshot;
//!
//! let snapshot = GameSnapshot::from_json(r#"{
//!     "width": 9, "height": 9, "phase": "play",
//!     "players": {"black": {"username": "a", "id": 1}, "white": {"username": "b", "id": 2}},
//!     "moves": [[2, 2], [6, 6]]
//! }"#).unwrap();
//! let mut game = Game::from_snapshot(snapshot).unwrap();
//! assert_eq!(game.current_position().last_move_number(), 2);
//! assert_eq!(game.current_position().get(Point::new(2, 2)), Some(StoneColor::Black));
//!
//! // Explore a variation without touching the game
//! let branch = game.make_analysis_move(game.current_id(), Move::Place(Point::new(4, 4))).unwrap();
//! assert_eq!(game.move_tree().level(branch), Some(0));
//! ```

pub mod board;
pub mod clock;
pub mod codec;
pub mod constants;
pub mod error;
pub mod game;
pub mod intent;
pub mod move_tree;
pub mod playout;
pub mod position;
pub mod score;
pub mod snapshot;
pub mod territory;

pub use error::{Error, Result};
