//! Analysis entry point
//!
//! Two-stage contract: the primary path back-tests the history and predicts
//! the next draw with the strategy set over the full history; any internal
//! failure substitutes the fallback prediction. The outcome is tagged so
//! callers and tests can tell the paths apart.

use rand::Rng;
use serde::Serialize;
use tracing::{info, warn};

use crate::analysis::aggregate::{summarize, RunSummary};
use crate::analysis::engine::run_progressive_learning;
use crate::analysis::strategy;
use crate::domain::{DrawRecord, Prediction};
use crate::error::{MarksixError, Result};

/// Confidence assigned to the fallback path, and the floor for the primary
/// path.
const FALLBACK_CONFIDENCE: u32 = 25;

/// Ceiling for primary-path confidence.
const MAX_CONFIDENCE: u32 = 95;

/// Which path produced the outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisSource {
    Primary,
    Fallback,
}

/// Result of `analyze`: the next-draw prediction, a confidence score, the
/// path that produced it, and the back-test summary behind the confidence
/// (zeroed on the fallback path).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisOutcome {
    pub prediction: Prediction,
    pub confidence: u32,
    pub source: AnalysisSource,
    pub summary: RunSummary,
}

/// Analyze the history: back-test, then predict the next draw.
///
/// Errors only when no usable record exists at all (`DataUnavailable`).
/// Every internal failure past that point is degraded to the fallback
/// prediction, which cannot itself fail.
pub fn analyze<R: Rng>(history: &[DrawRecord], rng: &mut R) -> Result<AnalysisOutcome> {
    let complete: Vec<DrawRecord> = history
        .iter()
        .filter(|r| r.is_complete())
        .cloned()
        .collect();
    if complete.is_empty() {
        return Err(MarksixError::DataUnavailable(
            "no complete historical draws to analyze".to_string(),
        ));
    }

    match primary_analysis(&complete, rng) {
        Ok(outcome) => Ok(outcome),
        Err(e) => {
            warn!(error = %e, "primary analysis failed; using fallback prediction");
            let prediction = strategy::fallback_prediction(&complete, rng);
            Ok(AnalysisOutcome {
                prediction,
                confidence: FALLBACK_CONFIDENCE,
                source: AnalysisSource::Fallback,
                summary: RunSummary::default(),
            })
        }
    }
}

fn primary_analysis<R: Rng>(complete: &[DrawRecord], rng: &mut R) -> Result<AnalysisOutcome> {
    let cases = run_progressive_learning(complete, rng)?;
    let summary = summarize(&cases);

    let chronological = crate::domain::sort_chronological(complete.to_vec());
    let prediction = strategy::generate(&chronological, rng)?;

    let confidence = (summary.overall_accuracy.round() as u32)
        .clamp(FALLBACK_CONFIDENCE, MAX_CONFIDENCE);

    info!(
        learning_steps = summary.total_cases,
        overall_accuracy = summary.overall_accuracy,
        method = prediction.method.as_str(),
        "analysis complete"
    );

    Ok(AnalysisOutcome {
        prediction,
        confidence,
        source: AnalysisSource::Primary,
        summary,
    })
}
