//! Bounded-window matchup search.
//!
//! Full enumeration of side combinations is quadratic for 1v1 and grows to
//! O(n⁴) for 2v1v1, which is infeasible at realistic pool sizes. The search
//! instead ranks the pool by a key that clusters similar candidates (salary
//! for singleton shapes, expected points for anchored shapes), then scans a
//! truncated anchor prefix and a bounded forward window per anchor. Window
//! sizes and cutoffs below are part of the engine's contract: changing them
//! changes the output distribution.
//!
//! "No combination found" is never an error. Generators return however many
//! matchups the bounded scan produced; callers treat a short slate as a
//! normal, informational outcome.

use std::cmp::Ordering;
use std::collections::HashSet;

use chrono::Utc;
use tracing::{debug, info};

use crate::config::SearchParams;
use crate::engine::probability::{
    three_way_probabilities, win_probability, THREE_WAY_FAIR_SPLIT, TWO_WAY_FAIR_SPLIT,
};
use crate::engine::stats::{connection_mu_sigma, set_mu_sigma};
use crate::model::{Connection, Matchup, MatchupKind, SetSide};

// ── Search bounds ────────────────────────────────────────────────────────────

/// Anchors scanned for 1v1 pairs.
pub(crate) const ONE_V_ONE_ANCHOR_LIMIT: usize = 100;
/// Forward partner window per 1v1 anchor.
pub(crate) const ONE_V_ONE_WINDOW: usize = 40;

/// Anchors scanned for the 2v1 single side.
pub(crate) const TWO_V_ONE_ANCHOR_LIMIT: usize = 50;
/// Nested pair-search window for 2v1.
pub(crate) const TWO_V_ONE_WINDOW: usize = 25;

/// Anchors scanned for 1v1v1 triples.
pub(crate) const ONE_V_ONE_V_ONE_ANCHOR_LIMIT: usize = 60;
/// Forward window per 1v1v1 anchor, applied to both inner loops.
pub(crate) const ONE_V_ONE_V_ONE_WINDOW: usize = 20;

/// Anchors scanned for 2v1v1. Four nested loops make this the most expensive
/// shape, so its bounds are the tightest of all.
pub(crate) const TWO_V_ONE_V_ONE_ANCHOR_LIMIT: usize = 25;
/// Forward window per 2v1v1 loop level.
pub(crate) const TWO_V_ONE_V_ONE_WINDOW: usize = 12;

/// Early-exit thresholds: once an anchor finds a combination this close,
/// the rest of its window is skipped.
const GOOD_ENOUGH_PROB_DEV: f64 = 0.05;
const GOOD_ENOUGH_SALARY_GAP: f64 = 100.0;

/// Composite quality weights; lower score is better.
const PROB_WEIGHT: f64 = 0.6;
const SALARY_WEIGHT: f64 = 0.4;

// ── Candidate pool ───────────────────────────────────────────────────────────

/// A pool member with its score model precomputed once per call.
struct Candidate<'a> {
    conn: &'a Connection,
    mu: f64,
    sigma: f64,
}

impl Candidate<'_> {
    fn salary(&self) -> f64 {
        self.conn.salary_sum
    }
}

fn eligible<'a>(pool: &'a [Connection], used: &HashSet<String>) -> Vec<Candidate<'a>> {
    pool.iter()
        .filter(|c| !used.contains(&c.id))
        .map(|c| {
            let (mu, sigma) = connection_mu_sigma(c);
            Candidate { conn: c, mu, sigma }
        })
        .collect()
}

fn sort_salary_desc(cands: &mut [Candidate<'_>]) {
    cands.sort_by(|a, b| b.salary().partial_cmp(&a.salary()).unwrap_or(Ordering::Equal));
}

fn sort_mu_desc(cands: &mut [Candidate<'_>]) {
    cands.sort_by(|a, b| b.mu.partial_cmp(&a.mu).unwrap_or(Ordering::Equal));
}

fn max_pool_salary(cands: &[Candidate<'_>]) -> f64 {
    cands.iter().map(Candidate::salary).fold(0.0, f64::max)
}

// ── Quality scoring ──────────────────────────────────────────────────────────

/// Composite quality of a candidate combination; lower is better.
///
/// The raw salary gap is normalized by the largest salary in the pool so it
/// lands on a scale comparable to the probability deviation. A zero-salary
/// pool contributes nothing to the score.
fn quality(prob_dev: f64, salary_gap: f64, max_salary: f64) -> f64 {
    let salary_dev = if max_salary > 0.0 {
        salary_gap / max_salary
    } else {
        0.0
    };
    PROB_WEIGHT * prob_dev + SALARY_WEIGHT * salary_dev
}

/// Map the worst probability deviation onto the 0-100 balance scale.
/// 100 is a perfectly even matchup.
fn balance_score(max_prob_dev: f64, factor: f64) -> u8 {
    ((1.0 - max_prob_dev * factor) * 100.0).round().clamp(0.0, 100.0) as u8
}

fn max_deviation_from_third(probs: &[f64; 3]) -> f64 {
    probs
        .iter()
        .map(|p| (p - THREE_WAY_FAIR_SPLIT).abs())
        .fold(0.0, f64::max)
}

fn salary_spread(totals: &[f64]) -> f64 {
    let max = totals.iter().fold(f64::NEG_INFINITY, |m, v| m.max(*v));
    let min = totals.iter().fold(f64::INFINITY, |m, v| m.min(*v));
    max - min
}

// ── Emission ─────────────────────────────────────────────────────────────────

/// A combination that passed the filters, pending global selection.
struct PendingMatchup {
    side_a: Vec<usize>,
    side_b: Vec<usize>,
    side_c: Option<Vec<usize>>,
    quality: f64,
}

/// Emit pending combinations best-first until the requested count is reached.
///
/// Combinations are ranked by composite quality across all anchors, so when
/// a single matchup is requested the best pairing in the scanned range wins,
/// not merely the first anchor's. A combination touching an already-consumed
/// connection is dropped; its anchor does not get a second chance, which is
/// acceptable because a short slate is a normal outcome.
fn emit_in_quality_order(
    cands: &[Candidate<'_>],
    mut pending: Vec<PendingMatchup>,
    max_matchups: usize,
    used: &mut HashSet<String>,
) -> Vec<Matchup> {
    pending.sort_by(|a, b| a.quality.partial_cmp(&b.quality).unwrap_or(Ordering::Equal));

    let mut out = Vec::new();
    for p in pending {
        if out.len() >= max_matchups {
            break;
        }
        let members: Vec<usize> = p
            .side_a
            .iter()
            .chain(p.side_b.iter())
            .chain(p.side_c.iter().flatten())
            .copied()
            .collect();
        if members.iter().any(|&ix| used.contains(&cands[ix].conn.id)) {
            continue;
        }
        for &ix in &members {
            used.insert(cands[ix].conn.id.clone());
        }

        let clone_side =
            |ixs: &[usize]| ixs.iter().map(|&ix| cands[ix].conn.clone()).collect::<Vec<_>>();
        let matchup = match &p.side_c {
            None => freeze_two_way(clone_side(&p.side_a), clone_side(&p.side_b)),
            Some(c) => {
                freeze_three_way(clone_side(&p.side_a), clone_side(&p.side_b), clone_side(c))
            }
        };
        out.push(matchup);
    }
    out
}

/// Freeze deep copies of a winning two-way combination into a matchup.
///
/// Sides receive their own clones of every connection, starter lists
/// included, plus mu/sigma/win-probability snapshots computed from the
/// frozen copies. Later mutation of the live pool cannot reach them.
pub(crate) fn freeze_two_way(members_a: Vec<Connection>, members_b: Vec<Connection>) -> Matchup {
    let (mu_a, sigma_a) = set_mu_sigma(&members_a);
    let (mu_b, sigma_b) = set_mu_sigma(&members_b);
    let p_a = win_probability(mu_a, sigma_a, mu_b, sigma_b);

    let kind = MatchupKind::TwoWay {
        a: members_a.len() as u8,
        b: members_b.len() as u8,
    };
    let balance = balance_score((p_a - TWO_WAY_FAIR_SPLIT).abs(), kind.balance_factor());

    let mut set_a = SetSide::new(members_a);
    set_a.mu = Some(mu_a);
    set_a.sigma = Some(sigma_a);
    set_a.win_probability = Some(p_a);

    let mut set_b = SetSide::new(members_b);
    set_b.mu = Some(mu_b);
    set_b.sigma = Some(sigma_b);
    set_b.win_probability = Some(1.0 - p_a);

    Matchup {
        set_a,
        set_b,
        set_c: None,
        kind,
        balance,
        generated_at: Utc::now(),
    }
}

/// Three-way variant of [`freeze_two_way`].
pub(crate) fn freeze_three_way(
    members_a: Vec<Connection>,
    members_b: Vec<Connection>,
    members_c: Vec<Connection>,
) -> Matchup {
    let stats_a = set_mu_sigma(&members_a);
    let stats_b = set_mu_sigma(&members_b);
    let stats_c = set_mu_sigma(&members_c);
    let probs = three_way_probabilities(stats_a, stats_b, stats_c);

    let kind = MatchupKind::ThreeWay {
        a: members_a.len() as u8,
        b: members_b.len() as u8,
        c: members_c.len() as u8,
    };
    let balance = balance_score(max_deviation_from_third(&probs), kind.balance_factor());

    let build = |members: Vec<Connection>, stats: (f64, f64), p: f64| {
        let mut side = SetSide::new(members);
        side.mu = Some(stats.0);
        side.sigma = Some(stats.1);
        side.win_probability = Some(p);
        side
    };

    Matchup {
        set_a: build(members_a, stats_a, probs[0]),
        set_b: build(members_b, stats_b, probs[1]),
        set_c: Some(build(members_c, stats_c, probs[2])),
        kind,
        balance,
        generated_at: Utc::now(),
    }
}

// ── Shape generators ─────────────────────────────────────────────────────────

/// Generate singleton-vs-singleton matchups.
///
/// The pool is ranked salary-descending so similar-cost connections sit near
/// each other; each anchor scans a bounded forward window for the partner
/// bringing the win probability closest to even with the smallest salary
/// gap. Connections in `used` are excluded, and every emitted matchup's
/// members are added to it.
pub fn generate_1v1(
    pool: &[Connection],
    params: &SearchParams,
    used: &mut HashSet<String>,
) -> Vec<Matchup> {
    let mut cands = eligible(pool, used);
    if cands.len() < 2 {
        return Vec::new();
    }
    sort_salary_desc(&mut cands);
    let max_salary = max_pool_salary(&cands);

    let mut pending = Vec::new();
    let anchor_limit = cands.len().min(ONE_V_ONE_ANCHOR_LIMIT);
    for i in 0..anchor_limit {
        let anchor = &cands[i];
        let mut best: Option<(usize, f64)> = None;
        let window_end = cands.len().min(i + 1 + ONE_V_ONE_WINDOW);
        for (j, rival) in cands.iter().enumerate().take(window_end).skip(i + 1) {
            let p = win_probability(anchor.mu, anchor.sigma, rival.mu, rival.sigma);
            let prob_dev = (p - TWO_WAY_FAIR_SPLIT).abs();
            if prob_dev > params.tolerance {
                continue;
            }
            let salary_gap = (anchor.salary() - rival.salary()).abs();
            if salary_gap > params.max_salary_diff {
                continue;
            }
            let score = quality(prob_dev, salary_gap, max_salary);
            if best.map_or(true, |(_, b)| score < b) {
                best = Some((j, score));
            }
            if prob_dev < GOOD_ENOUGH_PROB_DEV && salary_gap < GOOD_ENOUGH_SALARY_GAP {
                break;
            }
        }
        if let Some((j, score)) = best {
            pending.push(PendingMatchup {
                side_a: vec![i],
                side_b: vec![j],
                side_c: None,
                quality: score,
            });
        }
    }

    let out = emit_in_quality_order(&cands, pending, params.max_matchups, used);
    info!(
        "1v1 search emitted {} of {} requested from {} candidates",
        out.len(),
        params.max_matchups,
        cands.len()
    );
    out
}

/// Generate pair-vs-single matchups ("2v1").
///
/// The single side is anchored on the strongest available connections by
/// expected points; the opposing pair is found with a bounded nested window
/// scan over the same ranking. The pair is `set_a`, the single `set_b`.
pub fn generate_2v1(
    pool: &[Connection],
    params: &SearchParams,
    used: &mut HashSet<String>,
) -> Vec<Matchup> {
    let mut cands = eligible(pool, used);
    if cands.len() < 3 {
        return Vec::new();
    }
    sort_mu_desc(&mut cands);
    let max_salary = max_pool_salary(&cands);

    let mut pending = Vec::new();
    let anchor_limit = cands.len().min(TWO_V_ONE_ANCHOR_LIMIT);
    for i in 0..anchor_limit {
        let single = &cands[i];
        let mut best: Option<(usize, usize, f64)> = None;
        let outer_end = cands.len().min(i + 1 + TWO_V_ONE_WINDOW);
        'window: for j in (i + 1)..outer_end {
            let inner_end = cands.len().min(j + 1 + TWO_V_ONE_WINDOW);
            for k in (j + 1)..inner_end {
                let pair_mu = cands[j].mu + cands[k].mu;
                let pair_sigma =
                    (cands[j].sigma * cands[j].sigma + cands[k].sigma * cands[k].sigma).sqrt();
                let p_pair = win_probability(pair_mu, pair_sigma, single.mu, single.sigma);
                let prob_dev = (p_pair - TWO_WAY_FAIR_SPLIT).abs();
                if prob_dev > params.tolerance {
                    continue;
                }
                let pair_salary = cands[j].salary() + cands[k].salary();
                let salary_gap = (pair_salary - single.salary()).abs();
                if salary_gap > params.max_salary_diff {
                    continue;
                }
                let score = quality(prob_dev, salary_gap, max_salary);
                if best.map_or(true, |(_, _, b)| score < b) {
                    best = Some((j, k, score));
                }
                if prob_dev < GOOD_ENOUGH_PROB_DEV && salary_gap < GOOD_ENOUGH_SALARY_GAP {
                    break 'window;
                }
            }
        }
        if let Some((j, k, score)) = best {
            pending.push(PendingMatchup {
                side_a: vec![j, k],
                side_b: vec![i],
                side_c: None,
                quality: score,
            });
        }
    }

    let out = emit_in_quality_order(&cands, pending, params.max_matchups, used);
    info!(
        "2v1 search emitted {} of {} requested from {} candidates",
        out.len(),
        params.max_matchups,
        cands.len()
    );
    out
}

/// Generate three-singleton matchups ("1v1v1").
///
/// Probability balance targets a third per side, with the worst per-side
/// deviation as the metric; the salary constraint caps the max-minus-min
/// spread across all three sides.
pub fn generate_1v1v1(
    pool: &[Connection],
    params: &SearchParams,
    used: &mut HashSet<String>,
) -> Vec<Matchup> {
    let mut cands = eligible(pool, used);
    if cands.len() < 3 {
        return Vec::new();
    }
    sort_salary_desc(&mut cands);
    let max_salary = max_pool_salary(&cands);

    let mut pending = Vec::new();
    let anchor_limit = cands.len().min(ONE_V_ONE_V_ONE_ANCHOR_LIMIT);
    for i in 0..anchor_limit {
        let mut best: Option<(usize, usize, f64)> = None;
        let outer_end = cands.len().min(i + 1 + ONE_V_ONE_V_ONE_WINDOW);
        'window: for j in (i + 1)..outer_end {
            let inner_end = cands.len().min(j + 1 + ONE_V_ONE_V_ONE_WINDOW);
            for k in (j + 1)..inner_end {
                let probs = three_way_probabilities(
                    (cands[i].mu, cands[i].sigma),
                    (cands[j].mu, cands[j].sigma),
                    (cands[k].mu, cands[k].sigma),
                );
                let prob_dev = max_deviation_from_third(&probs);
                if prob_dev > params.tolerance {
                    continue;
                }
                let spread =
                    salary_spread(&[cands[i].salary(), cands[j].salary(), cands[k].salary()]);
                if spread > params.max_salary_diff {
                    continue;
                }
                let score = quality(prob_dev, spread, max_salary);
                if best.map_or(true, |(_, _, b)| score < b) {
                    best = Some((j, k, score));
                }
                if prob_dev < GOOD_ENOUGH_PROB_DEV && spread < GOOD_ENOUGH_SALARY_GAP {
                    break 'window;
                }
            }
        }
        if let Some((j, k, score)) = best {
            pending.push(PendingMatchup {
                side_a: vec![i],
                side_b: vec![j],
                side_c: Some(vec![k]),
                quality: score,
            });
        }
    }

    let out = emit_in_quality_order(&cands, pending, params.max_matchups, used);
    info!(
        "1v1v1 search emitted {} of {} requested from {} candidates",
        out.len(),
        params.max_matchups,
        cands.len()
    );
    out
}

/// Generate pair-vs-single-vs-single matchups ("2v1v1").
///
/// The anchor is the strongest available single by expected points; a second
/// single is drawn from its window and the pair from weaker candidates
/// further down the ranking, where two members can sum to a comparable
/// strength. Four nested scans make this the most expensive shape; the
/// windows are the smallest of any generator and callers should keep
/// `max_matchups` low.
pub fn generate_2v1v1(
    pool: &[Connection],
    params: &SearchParams,
    used: &mut HashSet<String>,
) -> Vec<Matchup> {
    let mut cands = eligible(pool, used);
    if cands.len() < 4 {
        return Vec::new();
    }
    sort_mu_desc(&mut cands);
    let max_salary = max_pool_salary(&cands);

    let mut pending = Vec::new();
    let anchor_limit = cands.len().min(TWO_V_ONE_V_ONE_ANCHOR_LIMIT);
    for i in 0..anchor_limit {
        let first_single = &cands[i];
        let mut best: Option<(usize, usize, usize, f64)> = None;
        let single_end = cands.len().min(i + 1 + TWO_V_ONE_V_ONE_WINDOW);
        'window: for j in (i + 1)..single_end {
            let second_single = &cands[j];

            let pair_outer_end = cands.len().min(j + 1 + TWO_V_ONE_V_ONE_WINDOW);
            for k in (j + 1)..pair_outer_end {
                let pair_inner_end = cands.len().min(k + 1 + TWO_V_ONE_V_ONE_WINDOW);
                for l in (k + 1)..pair_inner_end {
                    let pair_mu = cands[k].mu + cands[l].mu;
                    let pair_sigma =
                        (cands[k].sigma * cands[k].sigma + cands[l].sigma * cands[l].sigma).sqrt();
                    let pair_salary = cands[k].salary() + cands[l].salary();

                    let probs = three_way_probabilities(
                        (pair_mu, pair_sigma),
                        (first_single.mu, first_single.sigma),
                        (second_single.mu, second_single.sigma),
                    );
                    let prob_dev = max_deviation_from_third(&probs);
                    if prob_dev > params.tolerance {
                        continue;
                    }
                    let spread = salary_spread(&[
                        pair_salary,
                        first_single.salary(),
                        second_single.salary(),
                    ]);
                    if spread > params.max_salary_diff {
                        continue;
                    }
                    let score = quality(prob_dev, spread, max_salary);
                    if best.map_or(true, |(_, _, _, b)| score < b) {
                        best = Some((j, k, l, score));
                    }
                    if prob_dev < GOOD_ENOUGH_PROB_DEV && spread < GOOD_ENOUGH_SALARY_GAP {
                        break 'window;
                    }
                }
            }
        }
        if let Some((j, k, l, score)) = best {
            pending.push(PendingMatchup {
                side_a: vec![k, l],
                side_b: vec![i],
                side_c: Some(vec![j]),
                quality: score,
            });
        } else {
            debug!("2v1v1 anchor {} exhausted its window without a fit", i);
        }
    }

    let out = emit_in_quality_order(&cands, pending, params.max_matchups, used);
    info!(
        "2v1v1 search emitted {} of {} requested from {} candidates",
        out.len(),
        params.max_matchups,
        cands.len()
    );
    out
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Role;
    use approx::assert_relative_eq;

    fn conn(name: &str, salary: f64, mu: f64, sigma: f64) -> Connection {
        let mut c = Connection::from_starters(name, Role::Jockey, Vec::new());
        c.salary_sum = salary;
        c.mu = Some(mu);
        c.sigma = Some(sigma);
        c
    }

    fn even_pool(salaries: &[f64]) -> Vec<Connection> {
        salaries
            .iter()
            .enumerate()
            .map(|(i, &s)| conn(&format!("Conn {}", i), s, 100.0, 30.0))
            .collect()
    }

    #[test]
    fn one_v_one_picks_the_smallest_salary_gap() {
        // Near-identical score models, salaries [2000, 2000, 1900, 2100]:
        // the 2000/2000 pairing (gap 0) must win over any anchor-order pick.
        let pool = even_pool(&[2000.0, 2000.0, 1900.0, 2100.0]);
        let mut used = HashSet::new();
        let params = SearchParams {
            tolerance: 0.15,
            max_salary_diff: 200.0,
            max_matchups: 1,
        };
        let out = generate_1v1(&pool, &params, &mut used);

        assert_eq!(out.len(), 1);
        let m = &out[0];
        assert_relative_eq!(m.set_a.salary_total, 2000.0, epsilon = 1e-9);
        assert_relative_eq!(m.set_b.salary_total, 2000.0, epsilon = 1e-9);
        // Exactly two connections consumed, two left for the next shape.
        assert_eq!(used.len(), 2);
    }

    #[test]
    fn one_v_one_respects_salary_cap() {
        let pool = even_pool(&[5000.0, 2000.0]);
        let mut used = HashSet::new();
        let params = SearchParams {
            tolerance: 0.15,
            max_salary_diff: 200.0,
            max_matchups: 3,
        };
        assert!(generate_1v1(&pool, &params, &mut used).is_empty());
        assert!(used.is_empty());
    }

    #[test]
    fn one_v_one_respects_probability_tolerance() {
        // Salaries match but one side is far stronger.
        let pool = vec![
            conn("Strong", 2000.0, 200.0, 10.0),
            conn("Weak", 2000.0, 50.0, 10.0),
        ];
        let mut used = HashSet::new();
        let params = SearchParams {
            tolerance: 0.15,
            max_salary_diff: 500.0,
            max_matchups: 1,
        };
        assert!(generate_1v1(&pool, &params, &mut used).is_empty());
    }

    #[test]
    fn undersized_pool_returns_empty() {
        let pool = even_pool(&[2000.0]);
        let mut used = HashSet::new();
        assert!(generate_1v1(&pool, &SearchParams::two_way(1), &mut used).is_empty());
        assert!(generate_2v1(&pool, &SearchParams::two_way(1), &mut used).is_empty());
        assert!(generate_1v1v1(&pool, &SearchParams::three_way(1), &mut used).is_empty());
        assert!(generate_2v1v1(&pool, &SearchParams::three_way(1), &mut used).is_empty());
    }

    #[test]
    fn exclusion_set_filters_candidates() {
        let pool = even_pool(&[2000.0, 2000.0, 2000.0]);
        let mut used = HashSet::new();
        used.insert(pool[0].id.clone());
        let out = generate_1v1(&pool, &SearchParams::two_way(5), &mut used);
        assert_eq!(out.len(), 1);
        for m in &out {
            assert!(!m.connection_ids().contains(&pool[0].id.as_str()));
        }
    }

    #[test]
    fn no_connection_repeats_within_a_matchup() {
        let pool = even_pool(&[2100.0, 2050.0, 2000.0, 1950.0, 1900.0, 1850.0]);
        let mut used = HashSet::new();
        let out = generate_1v1v1(&pool, &SearchParams::three_way(2), &mut used);
        for m in &out {
            let mut ids = m.connection_ids();
            let total = ids.len();
            ids.sort_unstable();
            ids.dedup();
            assert_eq!(ids.len(), total, "duplicate connection inside a matchup");
        }
    }

    #[test]
    fn one_v_one_v_one_from_four_connections_yields_at_most_one() {
        // Each triple consumes 3 of the 4; a fifth request cannot be met and
        // must not error.
        let pool = even_pool(&[2000.0, 2000.0, 2000.0, 2000.0]);
        let mut used = HashSet::new();
        let params = SearchParams {
            tolerance: 0.25,
            max_salary_diff: 800.0,
            max_matchups: 5,
        };
        let out = generate_1v1v1(&pool, &params, &mut used);
        assert_eq!(out.len(), 1);
        assert_eq!(used.len(), 3);
    }

    #[test]
    fn two_v_one_pairs_against_the_strongest_single() {
        // One standout by expected points, several half-strength partners
        // whose pairs can match it.
        let mut pool = vec![conn("Ace", 3000.0, 120.0, 20.0)];
        for i in 0..4 {
            pool.push(conn(&format!("Half {}", i), 1500.0, 60.0, 14.0));
        }
        let mut used = HashSet::new();
        let params = SearchParams {
            tolerance: 0.15,
            max_salary_diff: 500.0,
            max_matchups: 1,
        };
        let out = generate_2v1(&pool, &params, &mut used);
        assert_eq!(out.len(), 1);
        let m = &out[0];
        assert_eq!(m.kind, MatchupKind::TwoWay { a: 2, b: 1 });
        assert_eq!(m.kind.to_string(), "2v1");
        assert_eq!(m.set_a.size(), 2);
        assert_eq!(m.set_b.size(), 1);
        assert_eq!(m.set_b.connections[0].name, "Ace");
        let p_a = m.set_a.win_probability.unwrap();
        let p_b = m.set_b.win_probability.unwrap();
        assert_relative_eq!(p_a + p_b, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn two_v_one_v_one_emits_pair_plus_two_singles() {
        let mut pool = vec![
            conn("Big A", 2400.0, 110.0, 25.0),
            conn("Big B", 2450.0, 112.0, 25.0),
        ];
        for i in 0..4 {
            pool.push(conn(&format!("Half {}", i), 1200.0, 55.0, 17.0));
        }
        let mut used = HashSet::new();
        let params = SearchParams {
            tolerance: 0.35,
            max_salary_diff: 2000.0,
            max_matchups: 3,
        };
        let out = generate_2v1v1(&pool, &params, &mut used);
        assert!(!out.is_empty());
        let m = &out[0];
        assert!(m.kind.is_three_way());
        assert_eq!(m.set_a.size(), 2);
        assert_eq!(m.set_b.size(), 1);
        assert_eq!(m.set_c.as_ref().unwrap().size(), 1);
        let total: f64 = m.sides().iter().map(|s| s.win_probability.unwrap()).sum();
        assert_relative_eq!(total, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn balance_is_100_when_even_and_0_at_the_maximal_deviation() {
        // Identical sides: probability exactly 0.5, deviation 0.
        let even = freeze_two_way(
            vec![conn("E1", 2000.0, 100.0, 30.0)],
            vec![conn("E2", 2000.0, 100.0, 30.0)],
        );
        assert_eq!(even.balance, 100);

        // Point masses with different means: probability 1.0, deviation 0.5.
        let lopsided = freeze_two_way(
            vec![conn("Sure", 2000.0, 100.0, 0.0)],
            vec![conn("Lost", 2000.0, 50.0, 0.0)],
        );
        assert_eq!(lopsided.balance, 0);

        // Three-way with identical sides sits at the fair third.
        let even3 = freeze_three_way(
            vec![conn("T1", 2000.0, 100.0, 30.0)],
            vec![conn("T2", 2000.0, 100.0, 30.0)],
            vec![conn("T3", 2000.0, 100.0, 30.0)],
        );
        assert_eq!(even3.balance, 100);

        // Three-way certainty: one side takes everything, deviation 2/3.
        let sure3 = freeze_three_way(
            vec![conn("S1", 2000.0, 100.0, 0.0)],
            vec![conn("S2", 2000.0, 50.0, 0.0)],
            vec![conn("S3", 2000.0, 40.0, 0.0)],
        );
        assert_eq!(sure3.balance, 0);
    }

    #[test]
    fn emitted_matchups_are_isolated_from_pool_mutation() {
        let mut pool = even_pool(&[2000.0, 2000.0]);
        let mut used = HashSet::new();
        let out = generate_1v1(&pool, &SearchParams::two_way(1), &mut used);
        assert_eq!(out.len(), 1);

        // Mutating the live pool afterwards must not reach the frozen copy.
        pool[0].points_sum = 999.0;
        pool[0].salary_sum = 0.0;
        for side in out[0].sides() {
            for c in &side.connections {
                assert_relative_eq!(c.points_sum, 0.0, epsilon = 1e-9);
                assert_relative_eq!(c.salary_sum, 2000.0, epsilon = 1e-9);
            }
        }
    }

    #[test]
    fn requesting_two_emits_the_two_best_disjoint_pairs() {
        let pool = even_pool(&[2000.0, 2000.0, 1800.0, 1800.0, 1000.0]);
        let mut used = HashSet::new();
        let params = SearchParams {
            tolerance: 0.15,
            max_salary_diff: 250.0,
            max_matchups: 2,
        };
        let out = generate_1v1(&pool, &params, &mut used);
        assert_eq!(out.len(), 2);
        assert_eq!(used.len(), 4);
        for m in &out {
            let gap = (m.set_a.salary_total - m.set_b.salary_total).abs();
            assert_relative_eq!(gap, 0.0, epsilon = 1e-9);
        }
    }
}
