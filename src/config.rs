//! Generation parameter surface.
//!
//! Every knob the matchup search exposes lives here, with validated ranges
//! and the defaults the rest of the crate assumes. The host application owns
//! where the values come from; this crate only checks them.

use serde::{Deserialize, Serialize};

/// Default allowed deviation from the 50/50 split for two-way shapes.
pub const DEFAULT_TWO_WAY_TOLERANCE: f64 = 0.15;

/// Default allowed deviation from the 1/3 split for three-way shapes.
pub const DEFAULT_THREE_WAY_TOLERANCE: f64 = 0.25;

/// Default cap on the absolute salary gap between two sides (dollars).
pub const DEFAULT_MAX_SALARY_DIFF: f64 = 500.0;

/// Default cap on the max-minus-min salary spread across three sides.
pub const DEFAULT_MAX_SALARY_SPREAD: f64 = 800.0;

/// Tolerance and limit knobs for a single shape-generator call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchParams {
    /// Allowed deviation from the fair probability split
    pub tolerance: f64,
    /// Maximum salary gap between sides in dollars. Three-way shapes apply
    /// this to the max-minus-min spread across all sides.
    pub max_salary_diff: f64,
    /// Number of matchups to aim for; fewer is a normal outcome
    pub max_matchups: usize,
}

impl SearchParams {
    pub fn two_way(max_matchups: usize) -> Self {
        SearchParams {
            tolerance: DEFAULT_TWO_WAY_TOLERANCE,
            max_salary_diff: DEFAULT_MAX_SALARY_DIFF,
            max_matchups,
        }
    }

    pub fn three_way(max_matchups: usize) -> Self {
        SearchParams {
            tolerance: DEFAULT_THREE_WAY_TOLERANCE,
            max_salary_diff: DEFAULT_MAX_SALARY_SPREAD,
            max_matchups,
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if !(0.0..=1.0).contains(&self.tolerance) {
            anyhow::bail!("tolerance must be between 0.0 and 1.0");
        }
        if self.max_salary_diff < 0.0 {
            anyhow::bail!("max_salary_diff must be non-negative");
        }
        Ok(())
    }
}

/// Parameters for the mixed-shape batch entry point.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Target slate size after interleaving
    pub target_count: usize,
    pub max_1v1: usize,
    pub max_2v1: usize,
    pub max_1v1v1: usize,
    /// Kept small by default: 2v1v1 is the most expensive search shape
    pub max_2v1v1: usize,
    pub two_way_tolerance: f64,
    pub three_way_tolerance: f64,
    /// Salary gap cap for two-way shapes (dollars)
    pub max_salary_diff: f64,
    /// Salary spread cap for three-way shapes (dollars)
    pub max_salary_spread: f64,
}

impl Default for BatchConfig {
    fn default() -> Self {
        BatchConfig {
            target_count: 10,
            max_1v1: 4,
            max_2v1: 3,
            max_1v1v1: 3,
            max_2v1v1: 3,
            two_way_tolerance: DEFAULT_TWO_WAY_TOLERANCE,
            three_way_tolerance: DEFAULT_THREE_WAY_TOLERANCE,
            max_salary_diff: DEFAULT_MAX_SALARY_DIFF,
            max_salary_spread: DEFAULT_MAX_SALARY_SPREAD,
        }
    }
}

impl BatchConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.target_count == 0 {
            anyhow::bail!("target_count must be positive");
        }
        if !(0.0..=0.5).contains(&self.two_way_tolerance) {
            anyhow::bail!("two_way_tolerance must be between 0.0 and 0.5");
        }
        // 2/3 is the widest possible deviation from an even three-way split.
        if !(0.0..=2.0 / 3.0).contains(&self.three_way_tolerance) {
            anyhow::bail!("three_way_tolerance must be between 0.0 and 2/3");
        }
        if self.max_salary_diff < 0.0 || self.max_salary_spread < 0.0 {
            anyhow::bail!("salary caps must be non-negative");
        }
        Ok(())
    }
}

/// Parameters for the quick regeneration path, used when a player adjusts
/// tolerance interactively and wants a fresh slate immediately.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuickConfig {
    /// Number of matchup slots to try to fill
    pub count: usize,
    /// Absolute dollar tolerance for side-to-side salary matching
    pub salary_tolerance: f64,
    /// Random draws attempted per slot before giving up on it
    pub attempts_per_slot: usize,
    /// Slots built without connection reuse before reuse is allowed
    pub fresh_matchup_limit: usize,
}

impl Default for QuickConfig {
    fn default() -> Self {
        QuickConfig {
            count: 10,
            salary_tolerance: 300.0,
            attempts_per_slot: 25,
            fresh_matchup_limit: 5,
        }
    }
}

impl QuickConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.count == 0 {
            anyhow::bail!("count must be positive");
        }
        if self.salary_tolerance < 0.0 {
            anyhow::bail!("salary_tolerance must be non-negative");
        }
        if self.attempts_per_slot == 0 {
            anyhow::bail!("attempts_per_slot must be positive");
        }
        Ok(())
    }
}
