pub mod batch;
pub mod probability;
pub mod scoring;
pub mod search;
pub mod stats;

pub use batch::{generate_batch, generate_quick};
pub use scoring::{matchup_winner, settle_round};
