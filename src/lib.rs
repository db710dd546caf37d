//! Matchup generation engine for a fantasy horse-racing head-to-head game.
//!
//! Pools of jockeys, trainers, and sires ("connections") are paired into
//! head-to-head sets whose combined scoring is expected to be statistically
//! close to even. The engine models each side's point total as a normal
//! distribution, computes win probabilities between sides, and searches
//! bounded candidate windows for combinations that are simultaneously
//! probability-balanced and salary-balanced.
//!
//! The crate is pure computation: no I/O, no persistence, no network.
//! Callers hand in an already-merged `Vec<Connection>` and receive owned
//! [`Matchup`] values that are safe to hold indefinitely; every matchup
//! freezes its own copies of the participating connections, so later
//! mutation of the live pool never reaches an emitted slate.
//!
//! Coming up short is not an error anywhere in this crate: when the bounded
//! search cannot fill a request, callers get a smaller slate and surface
//! that as an informational state ("try adjusting tolerance").

pub mod config;
pub mod engine;
pub mod model;

pub use config::{BatchConfig, QuickConfig, SearchParams};
pub use engine::batch::{generate_batch, generate_quick};
pub use engine::probability::{three_way_probabilities, win_probability};
pub use engine::scoring::{matchup_winner, settle_round, side_points, MatchupOutcome, RoundResult};
pub use engine::search::{generate_1v1, generate_1v1v1, generate_2v1, generate_2v1v1};
pub use engine::stats::{connection_mu_sigma, set_mu_sigma};
pub use model::{
    ChosenSide, Connection, Matchup, MatchupKind, Role, Round, RoundPick, SetSide, Starter,
};
