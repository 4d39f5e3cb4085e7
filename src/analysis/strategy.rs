//! Prediction Strategy Set
//!
//! Four strategies selected by how much history is available, plus the
//! never-failing fallback used when the primary pipeline errors. All
//! randomness comes in through the caller's `Rng` so tests can seed it;
//! production callers pass `rand::thread_rng()`.

use rand::Rng;
use std::collections::BTreeMap;

use crate::domain::{DrawRecord, Prediction, StrategyKind, MAIN_NUMBERS, NUMBER_POOL};
use crate::error::{MarksixError, Result};

/// Training-draw counts at which the selection function switches strategy.
const TREND_MIN: usize = 2;
const FREQUENCY_MIN: usize = 5;
const ENSEMBLE_MIN: usize = 20;

/// Candidate pool width for frequency-ranked selection.
const FREQUENCY_POOL: usize = 12;

/// Recent-draw window for the ensemble's sliding frequency layer.
const ENSEMBLE_WINDOW: usize = 50;

/// Pick the strategy for a training window of the given length.
pub fn select_strategy(training_len: usize) -> StrategyKind {
    if training_len < TREND_MIN {
        StrategyKind::SingleDrawVariation
    } else if training_len < FREQUENCY_MIN {
        StrategyKind::TrendAnalysis
    } else if training_len < ENSEMBLE_MIN {
        StrategyKind::FrequencyAnalysis
    } else {
        StrategyKind::AdvancedPatternEnsemble
    }
}

/// Generate a prediction from a chronologically ascending training window.
///
/// Errors with `Strategy` when the window carries values outside the number
/// pool; the `analyze` entry point converts that into a fallback prediction.
pub fn generate<R: Rng>(training: &[DrawRecord], rng: &mut R) -> Result<Prediction> {
    if training.is_empty() {
        return Err(MarksixError::InsufficientData(
            "strategy needs at least one training draw".to_string(),
        ));
    }
    validate_training(training)?;

    let prediction = match select_strategy(training.len()) {
        StrategyKind::SingleDrawVariation => single_draw_variation(&training[0], rng),
        StrategyKind::TrendAnalysis => trend_analysis(training, rng),
        StrategyKind::FrequencyAnalysis => frequency_analysis(training, rng),
        _ => advanced_pattern_ensemble(training, rng),
    };
    Ok(prediction)
}

fn validate_training(training: &[DrawRecord]) -> Result<()> {
    for record in training {
        if !record.is_complete() {
            return Err(MarksixError::Strategy(format!(
                "training draw {} has {} main numbers",
                record.draw_date,
                record.numbers.len()
            )));
        }
        let in_pool = |n: u8| (1..=NUMBER_POOL).contains(&n);
        if !record.numbers.iter().copied().all(in_pool) || !in_pool(record.extra_number) {
            return Err(MarksixError::Strategy(format!(
                "training draw {} has values outside 1..={}",
                record.draw_date, NUMBER_POOL
            )));
        }
    }
    Ok(())
}

/// Length 1: perturb the sole draw's numbers by [-3, 3] and its extra by
/// [-2, 2], clamped to the pool.
fn single_draw_variation<R: Rng>(draw: &DrawRecord, rng: &mut R) -> Prediction {
    let candidates: Vec<u8> = draw
        .numbers
        .iter()
        .map(|&n| clamp_pool(i32::from(n) + rng.gen_range(-3..=3)))
        .collect();
    let extra = clamp_pool(i32::from(draw.extra_number) + rng.gen_range(-2..=2));

    Prediction {
        numbers: finalize_numbers(candidates, rng),
        extra_number: extra,
        method: StrategyKind::SingleDrawVariation,
    }
}

/// Lengths 2..=4: extrapolate each rank position from its last two observed
/// values; extra is the rounded mean of training extras plus jitter.
fn trend_analysis<R: Rng>(training: &[DrawRecord], rng: &mut R) -> Prediction {
    let mut positions: [Vec<u8>; MAIN_NUMBERS] = std::array::from_fn(|_| Vec::new());
    let mut extras: Vec<u8> = Vec::with_capacity(training.len());
    for draw in training {
        let mut sorted = draw.numbers.clone();
        sorted.sort_unstable();
        for (pos, &num) in sorted.iter().take(MAIN_NUMBERS).enumerate() {
            positions[pos].push(num);
        }
        extras.push(draw.extra_number);
    }

    let candidates: Vec<u8> = positions
        .iter()
        .map(|observed| match observed.as_slice() {
            [] => rng.gen_range(1..=NUMBER_POOL),
            [only] => clamp_pool(i32::from(*only) + rng.gen_range(-3..=3)),
            [.., prev, last] => {
                let trend = i32::from(*last) - i32::from(*prev);
                clamp_pool(i32::from(*last) + trend)
            }
        })
        .collect();

    let mean_extra = extras.iter().map(|&e| f64::from(e)).sum::<f64>() / extras.len() as f64;
    let extra = clamp_pool(mean_extra.round() as i32 + rng.gen_range(-2..=2));

    Prediction {
        numbers: finalize_numbers(candidates, rng),
        extra_number: extra,
        method: StrategyKind::TrendAnalysis,
    }
}

/// Lengths 5..=19: pick the most frequent numbers over the whole window.
/// Ties rank ascending, so an unambiguous tally is fully deterministic.
fn frequency_analysis<R: Rng>(training: &[DrawRecord], rng: &mut R) -> Prediction {
    let tally = main_number_tally(training);
    let candidates: Vec<u8> = top_by_frequency(&tally, FREQUENCY_POOL)
        .into_iter()
        .take(MAIN_NUMBERS)
        .collect();
    let extra = most_frequent_extra(training).unwrap_or_else(|| rng.gen_range(1..=NUMBER_POOL));

    Prediction {
        numbers: finalize_numbers(candidates, rng),
        extra_number: extra,
        method: StrategyKind::FrequencyAnalysis,
    }
}

/// Length >= 20: layered composition of windowed frequency, pair/triplet
/// co-occurrence and overdue numbers, padded randomly if the layers do not
/// fill all six slots.
fn advanced_pattern_ensemble<R: Rng>(training: &[DrawRecord], rng: &mut R) -> Prediction {
    // Layer 1: frequency within the most recent window.
    let window_start = training.len().saturating_sub(ENSEMBLE_WINDOW);
    let window_tally = main_number_tally(&training[window_start..]);
    let top_window = top_by_frequency(&window_tally, 10);

    // Layer 2: pair and triplet co-occurrence across all history.
    let mut pair_counts: BTreeMap<(u8, u8), u32> = BTreeMap::new();
    let mut triplet_counts: BTreeMap<(u8, u8, u8), u32> = BTreeMap::new();
    for draw in training {
        let mut sorted = draw.numbers.clone();
        sorted.sort_unstable();
        for i in 0..sorted.len() {
            for j in i + 1..sorted.len() {
                *pair_counts.entry((sorted[i], sorted[j])).or_insert(0) += 1;
                for k in j + 1..sorted.len() {
                    *triplet_counts
                        .entry((sorted[i], sorted[j], sorted[k]))
                        .or_insert(0) += 1;
                }
            }
        }
    }
    let top_pairs = top_entries(pair_counts, 10);
    let top_triplets = top_entries(triplet_counts, 5);

    // Layer 3: overdue numbers, ranked by index of last occurrence. Numbers
    // never seen rank first.
    let mut last_seen = [-1i64; NUMBER_POOL as usize + 1];
    for (idx, draw) in training.iter().enumerate() {
        for &n in &draw.numbers {
            last_seen[n as usize] = idx as i64;
        }
    }
    let mut overdue: Vec<u8> = (1..=NUMBER_POOL).collect();
    overdue.sort_by_key(|&n| last_seen[n as usize]);
    overdue.truncate(10);

    // Compose: up to 3 from windowed frequency, fill to 5 from pairs, to 6
    // from triplets, then overdue, then random padding.
    let mut selected: Vec<u8> = Vec::with_capacity(MAIN_NUMBERS);
    for &n in &top_window {
        if selected.len() >= 3 {
            break;
        }
        if !selected.contains(&n) {
            selected.push(n);
        }
    }
    'pairs: for &(a, b) in &top_pairs {
        for n in [a, b] {
            if !selected.contains(&n) && selected.len() < 5 {
                selected.push(n);
            }
        }
        if selected.len() >= 5 {
            break 'pairs;
        }
    }
    'triplets: for &(a, b, c) in &top_triplets {
        for n in [a, b, c] {
            if !selected.contains(&n) && selected.len() < MAIN_NUMBERS {
                selected.push(n);
            }
        }
        if selected.len() >= MAIN_NUMBERS {
            break 'triplets;
        }
    }
    for &n in &overdue {
        if selected.len() >= MAIN_NUMBERS {
            break;
        }
        if !selected.contains(&n) {
            selected.push(n);
        }
    }

    let extra = most_frequent_extra(training).unwrap_or_else(|| rng.gen_range(1..=NUMBER_POOL));

    Prediction {
        numbers: finalize_numbers(selected, rng),
        extra_number: extra,
        method: StrategyKind::AdvancedPatternEnsemble,
    }
}

/// Fallback used when the primary pipeline fails: frequency-ranked top
/// numbers with random padding and a random extra. Only counting and random
/// fill, so it cannot itself fail regardless of input quality.
pub fn fallback_prediction<R: Rng>(history: &[DrawRecord], rng: &mut R) -> Prediction {
    let tally = main_number_tally(history);
    let candidates: Vec<u8> = top_by_frequency(&tally, FREQUENCY_POOL)
        .into_iter()
        .take(MAIN_NUMBERS)
        .collect();

    Prediction {
        numbers: finalize_numbers(candidates, rng),
        extra_number: rng.gen_range(1..=NUMBER_POOL),
        method: StrategyKind::FallbackFrequency,
    }
}

fn clamp_pool(value: i32) -> u8 {
    value.clamp(1, i32::from(NUMBER_POOL)) as u8
}

/// Occurrence count per main number, indexed by the number itself.
/// Out-of-pool values are ignored rather than counted, so the tally is safe
/// on unvalidated input (the fallback path relies on this).
fn main_number_tally(draws: &[DrawRecord]) -> [u32; NUMBER_POOL as usize + 1] {
    let mut tally = [0u32; NUMBER_POOL as usize + 1];
    for draw in draws {
        for &n in &draw.numbers {
            if (1..=NUMBER_POOL).contains(&n) {
                tally[n as usize] += 1;
            }
        }
    }
    tally
}

/// Numbers ranked by count descending; the sort is stable over an ascending
/// pool, so ties rank ascending.
fn top_by_frequency(tally: &[u32; NUMBER_POOL as usize + 1], take: usize) -> Vec<u8> {
    let mut ranked: Vec<u8> = (1..=NUMBER_POOL).collect();
    ranked.sort_by(|a, b| tally[*b as usize].cmp(&tally[*a as usize]));
    ranked.truncate(take);
    ranked
}

/// Keys ranked by count descending; `BTreeMap` iteration plus a stable sort
/// breaks ties by ascending key.
fn top_entries<K: Copy + Ord>(counts: BTreeMap<K, u32>, take: usize) -> Vec<K> {
    let mut entries: Vec<(K, u32)> = counts.into_iter().collect();
    entries.sort_by(|a, b| b.1.cmp(&a.1));
    entries.into_iter().take(take).map(|(k, _)| k).collect()
}

/// Most frequent extra across the draws; ties go to the smaller number.
/// `None` when no draw carries an in-pool extra.
fn most_frequent_extra(draws: &[DrawRecord]) -> Option<u8> {
    let mut tally = [0u32; NUMBER_POOL as usize + 1];
    for draw in draws {
        if (1..=NUMBER_POOL).contains(&draw.extra_number) {
            tally[draw.extra_number as usize] += 1;
        }
    }
    let mut best: Option<u8> = None;
    let mut best_count = 0u32;
    for n in 1..=NUMBER_POOL {
        if tally[n as usize] > best_count {
            best = Some(n);
            best_count = tally[n as usize];
        }
    }
    best
}

/// Mandatory post-processing for every strategy: deduplicate, pad to six
/// with random non-duplicates, sort ascending.
fn finalize_numbers<R: Rng>(candidates: Vec<u8>, rng: &mut R) -> Vec<u8> {
    let mut numbers: Vec<u8> = Vec::with_capacity(MAIN_NUMBERS);
    for n in candidates {
        if !numbers.contains(&n) {
            numbers.push(n);
        }
        if numbers.len() == MAIN_NUMBERS {
            break;
        }
    }
    while numbers.len() < MAIN_NUMBERS {
        let n = rng.gen_range(1..=NUMBER_POOL);
        if !numbers.contains(&n) {
            numbers.push(n);
        }
    }
    numbers.sort_unstable();
    numbers
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn record(date: &str, numbers: Vec<u8>, extra: u8) -> DrawRecord {
        DrawRecord {
            draw_date: date.parse().unwrap(),
            numbers,
            extra_number: extra,
            draw_no: String::new(),
        }
    }

    fn identical_history(count: usize) -> Vec<DrawRecord> {
        let base = chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        (0..count)
            .map(|i| {
                record(
                    &(base + chrono::Duration::days(i as i64)).to_string(),
                    vec![1, 7, 15, 21, 35, 42],
                    24,
                )
            })
            .collect()
    }

    fn assert_valid_prediction(p: &Prediction) {
        assert_eq!(p.numbers.len(), MAIN_NUMBERS);
        let mut distinct = p.numbers.clone();
        distinct.dedup();
        assert_eq!(distinct.len(), MAIN_NUMBERS, "duplicates in {:?}", p.numbers);
        assert!(p.numbers.windows(2).all(|w| w[0] < w[1]), "unsorted {:?}", p.numbers);
        assert!(p.numbers.iter().all(|&n| (1..=NUMBER_POOL).contains(&n)));
        assert!((1..=NUMBER_POOL).contains(&p.extra_number));
    }

    #[test]
    fn test_selection_thresholds() {
        assert_eq!(select_strategy(1), StrategyKind::SingleDrawVariation);
        assert_eq!(select_strategy(2), StrategyKind::TrendAnalysis);
        assert_eq!(select_strategy(4), StrategyKind::TrendAnalysis);
        assert_eq!(select_strategy(5), StrategyKind::FrequencyAnalysis);
        assert_eq!(select_strategy(19), StrategyKind::FrequencyAnalysis);
        assert_eq!(select_strategy(20), StrategyKind::AdvancedPatternEnsemble);
        assert_eq!(select_strategy(500), StrategyKind::AdvancedPatternEnsemble);
    }

    #[test]
    fn test_every_strategy_upholds_output_invariants() {
        let mut rng = StdRng::seed_from_u64(7);
        for len in [1usize, 2, 3, 4, 5, 10, 19, 20, 25, 60] {
            let history = identical_history(len);
            for _ in 0..20 {
                let p = generate(&history, &mut rng).unwrap();
                assert_valid_prediction(&p);
                assert_eq!(p.method, select_strategy(len));
            }
        }
    }

    #[test]
    fn test_single_draw_variation_stays_near_seed() {
        let mut rng = StdRng::seed_from_u64(42);
        let history = vec![record("2024-01-02", vec![10, 15, 20, 25, 30, 35], 18)];
        for _ in 0..50 {
            let p = generate(&history, &mut rng).unwrap();
            assert_valid_prediction(&p);
            // The extra only moves by at most 2 before clamping.
            assert!((16..=20).contains(&p.extra_number), "extra {}", p.extra_number);
        }
    }

    #[test]
    fn test_trend_extrapolates_last_two_positions() {
        let mut rng = StdRng::seed_from_u64(1);
        let history = vec![
            record("2024-01-02", vec![1, 2, 3, 4, 5, 6], 10),
            record("2024-01-05", vec![3, 4, 5, 6, 7, 8], 12),
        ];
        let p = generate(&history, &mut rng).unwrap();
        // Each rank position moved by +2, extrapolated to +2 again.
        assert_eq!(p.numbers, vec![5, 6, 7, 8, 9, 10]);
        assert_eq!(p.method, StrategyKind::TrendAnalysis);
        // Extra: mean(10, 12) = 11, jitter within [-2, 2].
        assert!((9..=13).contains(&p.extra_number));
    }

    #[test]
    fn test_trend_clamps_to_pool() {
        let mut rng = StdRng::seed_from_u64(1);
        let history = vec![
            record("2024-01-02", vec![1, 2, 3, 4, 5, 30], 5),
            record("2024-01-05", vec![1, 2, 3, 4, 5, 48], 5),
        ];
        let p = generate(&history, &mut rng).unwrap();
        // Position 5 extrapolates to 48 + 18 = 66, clamped to 49.
        assert!(p.numbers.contains(&49));
        assert_valid_prediction(&p);
    }

    #[test]
    fn test_frequency_is_deterministic_with_clear_leader() {
        // Six identical draws: only six numbers have nonzero frequency, so
        // repeated calls agree regardless of the rng.
        let history = identical_history(6);
        let mut first: Option<Prediction> = None;
        for seed in 0..10u64 {
            let mut rng = StdRng::seed_from_u64(seed);
            let p = generate(&history[..5], &mut rng).unwrap();
            assert_eq!(p.numbers, vec![1, 7, 15, 21, 35, 42]);
            assert_eq!(p.extra_number, 24);
            assert_eq!(p.method, StrategyKind::FrequencyAnalysis);
            if let Some(prev) = &first {
                assert_eq!(prev, &p);
            }
            first = Some(p);
        }
    }

    #[test]
    fn test_frequency_extra_tie_goes_to_smaller_number() {
        let history = vec![
            record("2024-01-02", vec![1, 2, 3, 4, 5, 6], 30),
            record("2024-01-03", vec![1, 2, 3, 4, 5, 6], 12),
            record("2024-01-04", vec![1, 2, 3, 4, 5, 6], 30),
            record("2024-01-05", vec![1, 2, 3, 4, 5, 6], 12),
            record("2024-01-06", vec![1, 2, 3, 4, 5, 6], 44),
        ];
        let mut rng = StdRng::seed_from_u64(3);
        let p = generate(&history, &mut rng).unwrap();
        assert_eq!(p.extra_number, 12);
    }

    #[test]
    fn test_ensemble_composes_layers_deterministically() {
        // Twenty identical draws: window frequency supplies {1, 7, 15},
        // pair fill adds {21, 35}, triplet fill adds {42}.
        let history = identical_history(20);
        let mut rng = StdRng::seed_from_u64(9);
        let p = generate(&history, &mut rng).unwrap();
        assert_eq!(p.numbers, vec![1, 7, 15, 21, 35, 42]);
        assert_eq!(p.extra_number, 24);
        assert_eq!(p.method, StrategyKind::AdvancedPatternEnsemble);
    }

    #[test]
    fn test_ensemble_on_disjoint_draws() {
        // Numbers 1..=48 split into eight disjoint draws, cycled to 25 draws.
        let mut history = Vec::new();
        for i in 0..25u8 {
            let base = (i % 8) * 6;
            let numbers: Vec<u8> = (base + 1..=base + 6).collect();
            history.push(record(
                &format!("2024-02-{:02}", i + 1),
                numbers,
                (i % 49) + 1,
            ));
        }
        let mut rng = StdRng::seed_from_u64(11);
        let p = generate(&history, &mut rng).unwrap();
        assert_valid_prediction(&p);
        assert_eq!(p.method, StrategyKind::AdvancedPatternEnsemble);
    }

    #[test]
    fn test_generate_rejects_out_of_pool_training() {
        let mut rng = StdRng::seed_from_u64(5);
        let history = vec![record("2024-01-02", vec![0, 2, 3, 4, 5, 99], 7)];
        let err = generate(&history, &mut rng).unwrap_err();
        assert!(matches!(err, MarksixError::Strategy(_)));
    }

    #[test]
    fn test_generate_rejects_incomplete_training() {
        let mut rng = StdRng::seed_from_u64(5);
        let history = vec![record("2024-01-02", vec![1, 2, 3], 7)];
        assert!(generate(&history, &mut rng).is_err());
    }

    #[test]
    fn test_fallback_never_fails_on_garbage() {
        let mut rng = StdRng::seed_from_u64(13);
        let garbage = vec![
            record("2024-01-02", vec![0, 200, 99], 0),
            record("2024-01-03", vec![], 255),
        ];
        let p = fallback_prediction(&garbage, &mut rng);
        assert_valid_prediction(&p);
        assert_eq!(p.method, StrategyKind::FallbackFrequency);

        let p = fallback_prediction(&[], &mut rng);
        assert_valid_prediction(&p);
    }

    #[test]
    fn test_finalize_pads_duplicates_to_six_distinct() {
        let mut rng = StdRng::seed_from_u64(17);
        let numbers = finalize_numbers(vec![5, 5, 5, 5], &mut rng);
        assert_eq!(numbers.len(), MAIN_NUMBERS);
        assert!(numbers.contains(&5));
        let mut distinct = numbers.clone();
        distinct.dedup();
        assert_eq!(distinct.len(), MAIN_NUMBERS);
    }
}
