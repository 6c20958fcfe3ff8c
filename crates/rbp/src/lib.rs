//! Facade crate re-exporting every `rbp-*` member for convenient access
//! from a single dependency, plus the `hosting` server binary.
//!
//! ## Crate organization
//!
//! - [`core`] — dimensional types, table-size constants, process bootstrap
//! - [`cards`] — card primitives and 7-card hand evaluation
//! - [`gameplay`] — betting rounds, pot math, hand-lifecycle rules
//! - [`players`] — bot decision interface and the heuristic bot
//! - [`gameroom`] — the async per-game driver and broadcast sink
//! - [`dto`] — wire-format request, response, and event payloads
//! - [`hosting`] — HTTP/WebSocket surface over [`gameroom`]

pub use rbp_cards as cards;
pub use rbp_core as core;
pub use rbp_dto as dto;
pub use rbp_gameplay as gameplay;
pub use rbp_gameroom as gameroom;
pub use rbp_hosting as hosting;
pub use rbp_players as players;

pub use rbp_core::*;
