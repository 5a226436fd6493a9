//! Round value generation
//!
//! Every round is built around a "solving subset": a random number of
//! segments whose values are cut from the target so they add up to it
//! exactly. The rest of the ring gets distractors. Solvability therefore
//! holds by construction, never by luck.

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::settings::{DistractorMode, Settings};

/// Generator inputs (N, T, C and the distractor rule)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionParams {
    pub segment_count: usize,
    pub target: u32,
    pub max_total: u32,
    pub distractors: DistractorMode,
}

impl From<&Settings> for PartitionParams {
    fn from(settings: &Settings) -> Self {
        Self {
            segment_count: settings.segment_count,
            target: settings.target,
            max_total: settings.max_total,
            distractors: settings.distractors,
        }
    }
}

/// A generated ring: values in segment order plus where the built-in
/// answer ended up after shuffling
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Partition {
    pub values: Vec<i32>,
    /// Segment indices of the solving subset, ascending
    pub solution: Vec<usize>,
}

/// Build the values for one round
pub fn generate<R: Rng + ?Sized>(rng: &mut R, params: &PartitionParams) -> Partition {
    let n = params.segment_count.max(1);
    let target = params.target.max(1);

    // A subset can't have more positive integer parts than the target has units
    let subset_size = rng.random_range(1..=n.min(target as usize));
    let mut parts = split_total(rng, target, subset_size);
    ensure_positive(&mut parts);

    let extra = n - subset_size;
    let mut distractors = Vec::new();
    if extra > 0 {
        for attempt in 1..=DISTRACTOR_ATTEMPTS {
            distractors = draw_distractors(rng, params, extra);
            if !opens_alternate(&parts, &distractors, target as i32) {
                break;
            }
            log::debug!("Distractors {:?} open an alternate solution (attempt {})", distractors, attempt);
        }
    }

    let mut tagged: Vec<(i32, bool)> = parts
        .into_iter()
        .map(|v| (v, true))
        .chain(distractors.into_iter().map(|v| (v, false)))
        .collect();
    tagged.shuffle(rng);

    let solution = tagged
        .iter()
        .enumerate()
        .filter(|(_, (_, solving))| *solving)
        .map(|(i, _)| i)
        .collect();
    let values = tagged.into_iter().map(|(v, _)| v).collect();

    Partition { values, solution }
}

/// Values only, for callers that don't care where the answer is
pub fn generate_values<R: Rng + ?Sized>(rng: &mut R, params: &PartitionParams) -> Vec<i32> {
    generate(rng, params).values
}

/// Cut `total` into `parts` integers that sum to it exactly.
///
/// Interior cut points are uniform reals in [0, total]; the floored gaps
/// lose at most one unit each, and that remainder is handed back one unit
/// at a time over a shuffled index order.
pub fn split_total<R: Rng + ?Sized>(rng: &mut R, total: u32, parts: usize) -> Vec<i32> {
    if parts == 0 {
        return Vec::new();
    }
    if total == 0 {
        return vec![0; parts];
    }

    let end = total as f64;
    let mut cuts = Vec::with_capacity(parts + 1);
    cuts.push(0.0);
    for _ in 1..parts {
        cuts.push(rng.random_range(0.0..=end));
    }
    cuts.push(end);
    cuts.sort_by(|a: &f64, b: &f64| a.total_cmp(b));

    let mut base: Vec<i32> = cuts.windows(2).map(|w| (w[1] - w[0]).floor() as i32).collect();

    let leftover = (total as i32 - base.iter().sum::<i32>()).max(0) as usize;
    let mut order: Vec<usize> = (0..base.len()).collect();
    order.shuffle(rng);
    for i in 0..leftover {
        base[order[i % order.len()]] += 1;
    }

    base
}

/// Move units from the largest part into any zero part
fn ensure_positive(parts: &mut [i32]) {
    while let Some(zero) = parts.iter().position(|&p| p <= 0) {
        let Some((largest, &value)) = parts.iter().enumerate().max_by_key(|(_, p)| **p) else {
            return;
        };
        if value <= 1 {
            return;
        }
        parts[largest] -= 1;
        parts[zero] += 1;
    }
}

fn draw_distractors<R: Rng + ?Sized>(rng: &mut R, params: &PartitionParams, count: usize) -> Vec<i32> {
    match params.distractors {
        DistractorMode::Partition => {
            let budget = params.max_total.saturating_sub(params.target);
            let total = rng.random_range(0..=budget);
            split_total(rng, total, count)
        }
        DistractorMode::Negative => (0..count)
            .map(|_| rng.random_range(NEGATIVE_DISTRACTOR_MIN..=0))
            .collect(),
    }
}

/// Whether some subset using at least one distractor also hits the target
fn opens_alternate(parts: &[i32], distractors: &[i32], target: i32) -> bool {
    let n = parts.len() + distractors.len();
    if n > MAX_CHECKED_SEGMENTS {
        return false;
    }

    let values: Vec<i32> = parts.iter().chain(distractors).copied().collect();
    let distractor_bits = ((1u64 << distractors.len()) - 1) << parts.len();

    (1u64..(1u64 << n))
        .filter(|mask| mask & distractor_bits != 0)
        .any(|mask| subset_sum(&values, mask) == target)
}

fn subset_sum(values: &[i32], mask: u64) -> i32 {
    values
        .iter()
        .enumerate()
        .filter(|(i, _)| mask & (1u64 << i) != 0)
        .map(|(_, v)| *v)
        .sum()
}

/// Brute-force search for a non-empty subset summing to `target`.
///
/// Exponential in the ring size; rings hold a handful of segments.
/// Returns the indices of the first subset found, ascending.
pub fn find_solution(values: &[i32], target: i32) -> Option<Vec<usize>> {
    let n = values.len();
    if n == 0 || n >= 64 {
        return None;
    }

    (1u64..(1u64 << n))
        .find(|&mask| subset_sum(values, mask) == target)
        .map(|mask| (0..n).filter(|i| mask & (1u64 << i) != 0).collect())
}

/// Number of distinct non-empty subsets summing to `target`
pub fn count_solutions(values: &[i32], target: i32) -> usize {
    let n = values.len();
    if n == 0 || n >= 64 {
        return 0;
    }
    (1u64..(1u64 << n))
        .filter(|&mask| subset_sum(values, mask) == target)
        .count()
}
