//! Post-race settlement of generated matchups.
//!
//! Settlement is read-only and works entirely off the connection copies
//! frozen into each matchup at generation time; final points are expected to
//! be baked into those copies before settlement, and nothing is re-fetched.

use crate::model::{ChosenSide, Matchup, Round, SetSide};

/// Realized points for one side: the sum of member `points_sum` totals.
pub fn side_points(side: &SetSide) -> f64 {
    side.connections.iter().map(|c| c.points_sum).sum()
}

/// Outcome of a single pick.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchupOutcome {
    pub won: bool,
    pub chosen_points: f64,
    /// Best total among the opposing sides
    pub opponent_points: f64,
}

/// Settle a matchup for the chosen side.
///
/// The chosen side must strictly outscore every opponent; an exact tie is a
/// loss for the chooser, not a push. Choosing side C of a two-way matchup
/// scores zero and loses.
pub fn matchup_winner(matchup: &Matchup, chosen: ChosenSide) -> MatchupOutcome {
    let a = side_points(&matchup.set_a);
    let b = side_points(&matchup.set_b);
    let c = matchup.set_c.as_ref().map(side_points);

    let (chosen_points, opponents) = match chosen {
        ChosenSide::A => (a, [Some(b), c]),
        ChosenSide::B => (b, [Some(a), c]),
        ChosenSide::C => (c.unwrap_or(0.0), [Some(a), Some(b)]),
    };
    let opponent_points = opponents
        .into_iter()
        .flatten()
        .fold(f64::NEG_INFINITY, f64::max);

    MatchupOutcome {
        won: chosen_points > opponent_points,
        chosen_points,
        opponent_points,
    }
}

/// Result of settling a full round.
#[derive(Debug, Clone, PartialEq)]
pub struct RoundResult {
    pub won: bool,
    pub outcomes: Vec<MatchupOutcome>,
    /// `entry_amount * payout_multiplier` on a win, zero otherwise
    pub payout: f64,
}

/// Settle every pick in a round.
///
/// A round wins only if every pick's chosen side wins outright; any single
/// loss fails the whole round.
pub fn settle_round(round: &Round) -> RoundResult {
    let outcomes: Vec<MatchupOutcome> = round
        .picks
        .iter()
        .map(|pick| matchup_winner(&pick.matchup, pick.chosen))
        .collect();
    let won = !outcomes.is_empty() && outcomes.iter().all(|o| o.won);
    let payout = if won {
        round.entry_amount * round.payout_multiplier
    } else {
        0.0
    };
    RoundResult {
        won,
        outcomes,
        payout,
    }
}
