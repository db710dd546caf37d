//! Mixed-shape batch orchestration.
//!
//! Two generation paths share this module. [`generate_batch`] builds the
//! initial slate: shuffle once, fill the hardest shapes first, interleave.
//! [`generate_quick`] is the interactive regeneration path used when a
//! player adjusts tolerance and wants a fresh slate immediately: random side
//! sizes, greedy salary matching, bounded retries.
//!
//! Randomness comes in through the caller's `Rng` so batches are
//! reproducible under a seeded generator; production callers pass
//! `StdRng::from_entropy()`.

use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, info};

use crate::config::{BatchConfig, QuickConfig, SearchParams};
use crate::engine::search::{
    freeze_two_way, generate_1v1, generate_1v1v1, generate_2v1, generate_2v1v1,
};
use crate::model::{Connection, Matchup};

/// Side sizes the quick path draws from.
const QUICK_SIDE_SIZES: [usize; 3] = [1, 2, 3];

/// Generate a full mixed-shape slate.
///
/// Three-way shapes are generated first, while the whole pool is still
/// available: they are the hardest to fill. One exclusion set is threaded
/// through all four shape calls in that priority order, so every connection
/// is consumed at most once across the entire batch. The two result lists
/// are then interleaved alternately up to `target_count`.
pub fn generate_batch<R: Rng>(
    pool: &[Connection],
    config: &BatchConfig,
    rng: &mut R,
) -> Vec<Matchup> {
    // One full-pool permutation per batch; candidates are re-ranked inside
    // each shape generator, but the shuffle varies tie-breaks and therefore
    // the slate between calls over the same data.
    let mut shuffled: Vec<Connection> = pool.to_vec();
    shuffled.shuffle(rng);

    let mut used: HashSet<String> = HashSet::new();

    let mut three_way = generate_1v1v1(
        &shuffled,
        &SearchParams {
            tolerance: config.three_way_tolerance,
            max_salary_diff: config.max_salary_spread,
            max_matchups: config.max_1v1v1,
        },
        &mut used,
    );
    three_way.extend(generate_2v1v1(
        &shuffled,
        &SearchParams {
            tolerance: config.three_way_tolerance,
            max_salary_diff: config.max_salary_spread,
            max_matchups: config.max_2v1v1,
        },
        &mut used,
    ));

    let mut two_way = generate_1v1(
        &shuffled,
        &SearchParams {
            tolerance: config.two_way_tolerance,
            max_salary_diff: config.max_salary_diff,
            max_matchups: config.max_1v1,
        },
        &mut used,
    );
    two_way.extend(generate_2v1(
        &shuffled,
        &SearchParams {
            tolerance: config.two_way_tolerance,
            max_salary_diff: config.max_salary_diff,
            max_matchups: config.max_2v1,
        },
        &mut used,
    ));

    info!(
        "batch assembled {} three-way and {} two-way matchups from a pool of {}",
        three_way.len(),
        two_way.len(),
        pool.len()
    );

    interleave(three_way, two_way, config.target_count)
}

/// Alternate three-way and two-way entries until the target count; when one
/// list runs dry the remainder of the other is appended.
fn interleave(three_way: Vec<Matchup>, two_way: Vec<Matchup>, target: usize) -> Vec<Matchup> {
    let mut out = Vec::with_capacity(target.min(three_way.len() + two_way.len()));
    let mut threes = three_way.into_iter();
    let mut twos = two_way.into_iter();
    let mut pick_three = true;
    while out.len() < target {
        let next = if pick_three {
            threes.next().or_else(|| twos.next())
        } else {
            twos.next().or_else(|| threes.next())
        };
        match next {
            Some(m) => out.push(m),
            None => break,
        }
        pick_three = !pick_three;
    }
    out
}

/// Quick regeneration: fill `count` slots with randomly-shaped two-way
/// matchups, greedily matching the opposing side's salary.
///
/// Per slot, up to `attempts_per_slot` draws pick random side sizes from
/// {1, 2, 3} and a random first side; the opposing side is then built
/// greedily from the salary-closest available candidates. A slot whose
/// draws all fail is left unfilled. The first `fresh_matchup_limit` slots
/// never reuse a connection; later slots may, so a small pool can still
/// fill a whole batch.
pub fn generate_quick<R: Rng>(
    pool: &[Connection],
    config: &QuickConfig,
    rng: &mut R,
) -> Vec<Matchup> {
    if pool.len() < 2 {
        return Vec::new();
    }

    let mut used: HashSet<String> = HashSet::new();
    let mut out = Vec::new();

    for slot in 0..config.count {
        let allow_reuse = slot >= config.fresh_matchup_limit;
        let mut built = None;
        for _ in 0..config.attempts_per_slot {
            let size_a = *QUICK_SIDE_SIZES.choose(rng).expect("non-empty size set");
            let size_b = *QUICK_SIDE_SIZES.choose(rng).expect("non-empty size set");
            if let Some(m) = try_quick_matchup(
                pool,
                size_a,
                size_b,
                config.salary_tolerance,
                allow_reuse,
                &used,
                rng,
            ) {
                built = Some(m);
                break;
            }
        }
        match built {
            Some(matchup) => {
                for id in matchup.connection_ids() {
                    used.insert(id.to_string());
                }
                out.push(matchup);
            }
            None => debug!(
                "quick slot {} unfilled after {} attempts",
                slot, config.attempts_per_slot
            ),
        }
    }

    info!("quick path filled {} of {} slots", out.len(), config.count);
    out
}

/// One quick-path attempt: draw side A at random, then build side B from the
/// salary-closest remaining candidates. `None` when the pool cannot supply
/// the sizes or the final salary gap exceeds the tolerance.
fn try_quick_matchup<R: Rng>(
    pool: &[Connection],
    size_a: usize,
    size_b: usize,
    salary_tolerance: f64,
    allow_reuse: bool,
    used: &HashSet<String>,
    rng: &mut R,
) -> Option<Matchup> {
    let available: Vec<&Connection> = pool
        .iter()
        .filter(|c| allow_reuse || !used.contains(&c.id))
        .collect();
    if available.len() < size_a + size_b {
        return None;
    }

    let side_a: Vec<&Connection> = available.choose_multiple(rng, size_a).copied().collect();
    let a_ids: HashSet<&str> = side_a.iter().map(|c| c.id.as_str()).collect();
    let a_salary: f64 = side_a.iter().map(|c| c.salary_sum).sum();

    // Greedy fill: each member of side B chases an equal share of side A's
    // salary, so the side totals converge without enumeration.
    let per_member_target = a_salary / size_b as f64;
    let mut remaining: Vec<&Connection> = available
        .into_iter()
        .filter(|c| !a_ids.contains(c.id.as_str()))
        .collect();
    let mut side_b: Vec<&Connection> = Vec::with_capacity(size_b);
    for _ in 0..size_b {
        let (pos, _) = remaining.iter().enumerate().min_by(|(_, x), (_, y)| {
            let dx = (x.salary_sum - per_member_target).abs();
            let dy = (y.salary_sum - per_member_target).abs();
            dx.partial_cmp(&dy).unwrap_or(std::cmp::Ordering::Equal)
        })?;
        side_b.push(remaining.swap_remove(pos));
    }

    let b_salary: f64 = side_b.iter().map(|c| c.salary_sum).sum();
    if (a_salary - b_salary).abs() > salary_tolerance {
        return None;
    }

    Some(freeze_two_way(
        side_a.into_iter().cloned().collect(),
        side_b.into_iter().cloned().collect(),
    ))
}
