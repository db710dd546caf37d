//! Win-probability models for head-to-head sets.
//!
//! A side's slate score is modeled as `Normal(mu, sigma)`. For two sides the
//! difference `X = ScoreA - ScoreB` is again normal, so
//! `P(A > B) = Φ((mu_a - mu_b) / sqrt(sigma_a² + sigma_b²))`.
//!
//! Three-way probabilities are combined from the three pairwise values with
//! an independence-style heuristic rather than the exact joint distribution;
//! the balance tolerances used by the matchup search were tuned against this
//! specific combination, so it must stay as-is.

/// Fair split for a two-way matchup.
pub const TWO_WAY_FAIR_SPLIT: f64 = 0.5;

/// Fair split for a three-way matchup.
pub const THREE_WAY_FAIR_SPLIT: f64 = 1.0 / 3.0;

// ── Standard normal CDF ──────────────────────────────────────────────────────

/// Abramowitz-Stegun 26.2.17 rational approximation to Φ(x).
///
/// Absolute error below 7.5e-8. Deterministic closed form; no sampling.
fn normal_cdf(x: f64) -> f64 {
    const B0: f64 = 0.231_641_9;
    const B1: f64 = 0.319_381_530;
    const B2: f64 = -0.356_563_782;
    const B3: f64 = 1.781_477_937;
    const B4: f64 = -1.821_255_978;
    const B5: f64 = 1.330_274_429;

    let t = 1.0 / (1.0 + B0 * x.abs());
    let poly = t * (B1 + t * (B2 + t * (B3 + t * (B4 + t * B5))));
    let pdf = (-0.5 * x * x).exp() / (2.0 * std::f64::consts::PI).sqrt();
    let upper_tail = pdf * poly;
    if x >= 0.0 {
        1.0 - upper_tail
    } else {
        upper_tail
    }
}

// ── Pairwise ─────────────────────────────────────────────────────────────────

/// Probability that a side with score model `(mu_a, sigma_a)` outscores a
/// side with `(mu_b, sigma_b)`.
///
/// When both sides are point masses (`sigma_diff == 0`) the result is exact:
/// 1 or 0 by the sign of the mean difference, 0.5 at exact equality.
pub fn win_probability(mu_a: f64, sigma_a: f64, mu_b: f64, sigma_b: f64) -> f64 {
    let mu_diff = mu_a - mu_b;
    let sigma_diff = (sigma_a * sigma_a + sigma_b * sigma_b).sqrt();
    if sigma_diff == 0.0 {
        return if mu_diff > 0.0 {
            1.0
        } else if mu_diff < 0.0 {
            0.0
        } else {
            0.5
        };
    }
    normal_cdf(mu_diff / sigma_diff)
}

// ── Three-way ────────────────────────────────────────────────────────────────

/// Approximate `[P(A wins), P(B wins), P(C wins)]` for a three-sided matchup
/// from `(mu, sigma)` score models.
///
/// Unnormalized scores are built from the pairwise probabilities:
///
/// ```text
/// raw_a = P(A>B) · P(A>C)
/// raw_b = (1 − P(A>B)) · P(B>C)
/// raw_c = (1 − P(A>C)) · (1 − P(B>C))
/// ```
///
/// and divided by their sum. This treats the pairwise events as independent,
/// which they are not; it is a cheap approximation whose error is absorbed by
/// the search tolerances. When the sum collapses to zero (a certainty cycle,
/// e.g. A beats B surely, C beats A surely, B beats C surely) the uniform
/// split is returned so the result always sums to one.
pub fn three_way_probabilities(a: (f64, f64), b: (f64, f64), c: (f64, f64)) -> [f64; 3] {
    let p_ab = win_probability(a.0, a.1, b.0, b.1);
    let p_ac = win_probability(a.0, a.1, c.0, c.1);
    let p_bc = win_probability(b.0, b.1, c.0, c.1);

    let raw_a = p_ab * p_ac;
    let raw_b = (1.0 - p_ab) * p_bc;
    let raw_c = (1.0 - p_ac) * (1.0 - p_bc);

    let total = raw_a + raw_b + raw_c;
    if total <= 0.0 {
        return [THREE_WAY_FAIR_SPLIT; 3];
    }
    [raw_a / total, raw_b / total, raw_c / total]
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn normal_cdf_reference_values() {
        assert_relative_eq!(normal_cdf(0.0), 0.5, epsilon = 1e-7);
        assert_relative_eq!(normal_cdf(1.0), 0.841_344_746, epsilon = 1e-6);
        assert_relative_eq!(normal_cdf(1.96), 0.975_002_1, epsilon = 1e-6);
        assert_relative_eq!(normal_cdf(-1.96), 0.024_997_9, epsilon = 1e-6);
        assert!(normal_cdf(6.0) > 0.999_999);
        assert!(normal_cdf(-6.0) < 1e-6);
    }

    #[test]
    fn degenerate_sigma_is_exact() {
        assert_relative_eq!(win_probability(10.0, 0.0, 5.0, 0.0), 1.0, epsilon = 0.0);
        assert_relative_eq!(win_probability(5.0, 0.0, 10.0, 0.0), 0.0, epsilon = 0.0);
        assert_relative_eq!(win_probability(7.0, 0.0, 7.0, 0.0), 0.5, epsilon = 0.0);
    }

    #[test]
    fn pairwise_symmetry() {
        let cases = [
            (10.0, 3.0, 8.0, 4.0),
            (50.0, 12.0, 55.0, 9.0),
            (1.0, 0.5, 100.0, 20.0),
            (42.0, 0.0, 42.0, 7.0),
        ];
        for (mu_a, sigma_a, mu_b, sigma_b) in cases {
            let p = win_probability(mu_a, sigma_a, mu_b, sigma_b);
            let q = win_probability(mu_b, sigma_b, mu_a, sigma_a);
            assert_relative_eq!(p + q, 1.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn even_sides_split_fifty_fifty() {
        let p = win_probability(30.0, 9.0, 30.0, 9.0);
        assert_relative_eq!(p, 0.5, epsilon = 1e-9);
    }

    #[test]
    fn three_way_sums_to_one() {
        let cases = [
            [(30.0, 9.0), (28.0, 10.0), (33.0, 7.0)],
            [(10.0, 1.0), (50.0, 1.0), (90.0, 1.0)],
            [(20.0, 0.0), (20.0, 5.0), (21.0, 4.0)],
            [(0.0, 0.0), (0.0, 0.0), (0.0, 0.0)],
        ];
        for [a, b, c] in cases {
            let probs = three_way_probabilities(a, b, c);
            let sum: f64 = probs.iter().sum();
            assert_relative_eq!(sum, 1.0, epsilon = 1e-9);
            for p in probs {
                assert!((0.0..=1.0).contains(&p), "probability out of range: {}", p);
            }
        }
    }

    #[test]
    fn identical_sides_split_in_thirds() {
        let side = (25.0, 8.0);
        let probs = three_way_probabilities(side, side, side);
        for p in probs {
            assert_relative_eq!(p, THREE_WAY_FAIR_SPLIT, epsilon = 1e-9);
        }
    }

    #[test]
    fn dominant_side_takes_most_of_the_mass() {
        let probs = three_way_probabilities((60.0, 5.0), (30.0, 5.0), (28.0, 5.0));
        assert!(probs[0] > 0.95, "dominant side got {:.3}", probs[0]);
        assert!(probs[1] > probs[2]);
    }

    #[test]
    fn point_mass_sides_resolve_deterministically() {
        // With zero variance the strongest side takes all the mass.
        let probs = three_way_probabilities((10.0, 0.0), (5.0, 0.0), (20.0, 0.0));
        assert_relative_eq!(probs[2], 1.0, epsilon = 1e-9);
        let sum: f64 = probs.iter().sum();
        assert_relative_eq!(sum, 1.0, epsilon = 1e-9);

        // Tied point masses normalize to the uniform split.
        let tied = three_way_probabilities((7.0, 0.0), (7.0, 0.0), (7.0, 0.0));
        for p in tied {
            assert_relative_eq!(p, THREE_WAY_FAIR_SPLIT, epsilon = 1e-9);
        }
    }
}
