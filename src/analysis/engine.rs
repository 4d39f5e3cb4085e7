//! Progressive Learning Engine
//!
//! Walks the historical draws in chronological order; at each step the
//! draws seen so far predict the next one, and the prediction is scored
//! against what was actually drawn. The ordered case sequence is the
//! engine's sole output.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::analysis::aggregate::{summarize, RunSummary};
use crate::analysis::{scorer, strategy};
use crate::domain::{sort_chronological, DrawRecord, StrategyKind};
use crate::error::Result;
use chrono::NaiveDate;
use tracing::debug;

/// One back-test step: a prediction made from `training_draws` prior draws,
/// scored against the draw that actually followed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseResult {
    pub step: usize,
    pub training_draws: usize,
    pub target_date: NaiveDate,
    pub target_numbers: Vec<u8>,
    pub target_extra: u8,
    pub predicted_numbers: Vec<u8>,
    pub predicted_extra: u8,
    pub correct_numbers: u32,
    pub correct_extra: u32,
    pub accuracy: f64,
    pub method: StrategyKind,
}

/// Options for the detailed report: surface the most recent `limit` cases,
/// or every case when `show_all` is set.
#[derive(Debug, Clone, Copy)]
pub struct DetailedOptions {
    pub limit: usize,
    pub show_all: bool,
}

impl Default for DetailedOptions {
    fn default() -> Self {
        Self {
            limit: 50,
            show_all: false,
        }
    }
}

/// Detailed back-test output: the aggregate summary plus the surfaced tail
/// of the case sequence.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailedReport {
    #[serde(flatten)]
    pub summary: RunSummary,
    pub cases: Vec<CaseResult>,
}

/// Run the back-test over the given history.
///
/// Input order is irrelevant: incomplete records are dropped and the rest
/// re-sorted chronologically ascending before the pass. A history with
/// fewer than two usable records yields an empty sequence, which is a
/// boundary case rather than an error. Strategies randomize internally, so
/// reruns on identical input produce different sequences unless the caller
/// seeds the rng.
pub fn run_progressive_learning<R: Rng>(
    history: &[DrawRecord],
    rng: &mut R,
) -> Result<Vec<CaseResult>> {
    let complete: Vec<DrawRecord> = history
        .iter()
        .filter(|r| r.is_complete())
        .cloned()
        .collect();
    let chronological = sort_chronological(complete);

    if chronological.len() < 2 {
        return Ok(Vec::new());
    }

    let mut results = Vec::with_capacity(chronological.len() - 1);
    for i in 1..chronological.len() {
        let training = &chronological[..i];
        let target = &chronological[i];

        let prediction = strategy::generate(training, rng)?;
        let score = scorer::score(
            &prediction.numbers,
            prediction.extra_number,
            &target.numbers,
            target.extra_number,
        );

        if i % 100 == 0 {
            debug!(
                step = i,
                accuracy = score.percentage,
                method = prediction.method.as_str(),
                "progressive learning step"
            );
        }

        results.push(CaseResult {
            step: i,
            training_draws: training.len(),
            target_date: target.draw_date,
            target_numbers: target.numbers.clone(),
            target_extra: target.extra_number,
            predicted_numbers: prediction.numbers,
            predicted_extra: prediction.extra_number,
            correct_numbers: score.correct_numbers,
            correct_extra: score.correct_extra,
            accuracy: score.percentage,
            method: prediction.method,
        });
    }

    Ok(results)
}

/// Back-test the history and reduce the case sequence to its summary.
pub fn run_backtest<R: Rng>(history: &[DrawRecord], rng: &mut R) -> Result<RunSummary> {
    let cases = run_progressive_learning(history, rng)?;
    Ok(summarize(&cases))
}

/// Back-test the history and keep the surfaced case detail alongside the
/// summary statistics (which always cover every case, not just the tail).
pub fn run_detailed_backtest<R: Rng>(
    history: &[DrawRecord],
    options: DetailedOptions,
    rng: &mut R,
) -> Result<DetailedReport> {
    let cases = run_progressive_learning(history, rng)?;
    let summary = summarize(&cases);
    let total = cases.len();

    let surfaced = if options.show_all || options.limit >= total {
        cases
    } else {
        cases[total - options.limit..].to_vec()
    };

    Ok(DetailedReport {
        summary,
        cases: surfaced,
    })
}
