//! Expected-points model for connections and sides.
//!
//! Every connection's slate score is summarized as a `(mu, sigma)` pair.
//! Connections priced by the upstream odds-bucket model carry explicit
//! values; everything else falls back to an efficiency-based estimate.

use crate::model::Connection;

/// Points-per-start efficiency assumed when a connection carries no
/// avpa metric at all.
pub const DEFAULT_AVPA: f64 = 8.0;

/// Coefficient of variation assumed for estimated distributions.
pub const ESTIMATED_CV: f64 = 0.5;

/// Expected points and standard deviation for a single connection.
///
/// Explicit `mu`/`sigma` win when both are present. The fallback estimate is
/// `avpa_30d`, then `avpa_race`, then [`DEFAULT_AVPA`], scaled by start
/// count, with a 50% coefficient of variation.
pub fn connection_mu_sigma(conn: &Connection) -> (f64, f64) {
    if let (Some(mu), Some(sigma)) = (conn.mu, conn.sigma) {
        return (mu, sigma);
    }
    let avpa = conn.avpa_30d.or(conn.avpa_race).unwrap_or(DEFAULT_AVPA);
    let mu = avpa * conn.apps.max(1) as f64;
    (mu, ESTIMATED_CV * mu)
}

/// Combined `(mu, sigma)` for a set of connections competing as one side.
///
/// Members are treated as independent: expectations add, variances add.
/// Cross-member correlation is deliberately ignored. Returns `(0, 0)` for an
/// empty set.
pub fn set_mu_sigma(connections: &[Connection]) -> (f64, f64) {
    if connections.is_empty() {
        return (0.0, 0.0);
    }
    let mut mu = 0.0;
    let mut variance = 0.0;
    for conn in connections {
        let (m, s) = connection_mu_sigma(conn);
        mu += m;
        variance += s * s;
    }
    (mu, variance.sqrt())
}
