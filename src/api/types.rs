//! Wire types for the prediction API.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::analysis::{AccuracyDistribution, AnalysisSource, CaseResult, MethodPerformance};
use crate::domain::StrategyKind;

// ---------------------------------------------------------------------------
// Query parameters
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictQuery {
    #[serde(default)]
    pub skip_fetch: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseAnalysisQuery {
    #[serde(default)]
    pub limit: Option<usize>,
    #[serde(default)]
    pub show_all: bool,
    #[serde(default)]
    pub skip_fetch: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GannPredictQuery {
    /// Comma-separated seed numbers; defaults to the latest draw.
    #[serde(default)]
    pub seed: Option<String>,
    #[serde(default)]
    pub random: bool,
    #[serde(default)]
    pub skip_fetch: bool,
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub draws: usize,
    pub uptime_secs: i64,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
            message: None,
        }
    }

    pub fn with_message(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
            message: Some(message.into()),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    pub from: Option<String>,
    pub to: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DataProcessInfo {
    pub fetch_attempted: bool,
    pub new_data_fetched: bool,
    pub data_source: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictAnalysisInfo {
    pub total_learning_steps: usize,
    pub overall_accuracy: f64,
    pub average_correct_numbers: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictResponse {
    pub success: bool,
    pub predicted: Vec<u8>,
    pub extra_number: u8,
    pub formatted_prediction: String,
    pub confidence: u32,
    pub method: StrategyKind,
    pub source: AnalysisSource,
    pub analysis: PredictAnalysisInfo,
    pub data_process: DataProcessInfo,
    pub data_used: DataUsedInfo,
    pub timestamp: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DataUsedInfo {
    pub total_draws: usize,
    pub date_range: DateRange,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseAnalysisConfig {
    pub total_historical_draws: usize,
    pub cases_analyzed: usize,
    pub show_all_cases: bool,
    pub data_source: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverallStats {
    pub total_cases: usize,
    pub average_accuracy: String,
    pub average_correct_numbers: String,
    pub best_case: Option<CaseResult>,
    pub worst_case: Option<CaseResult>,
    pub perfect_matches: usize,
    pub zero_matches: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseTargetView {
    pub date: String,
    pub numbers: Vec<u8>,
    pub extra_number: u8,
    pub formatted: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseAccuracyView {
    pub correct_numbers: u32,
    pub correct_extra: u32,
    pub total_correct: u32,
    pub percentage: String,
    pub grade: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseMatchesView {
    pub main_numbers: Vec<u8>,
    pub extra_match: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseView {
    pub case_number: usize,
    pub step: usize,
    pub training_draws: usize,
    pub method: StrategyKind,
    pub target: CaseTargetView,
    pub predicted: CaseTargetView,
    pub accuracy: CaseAccuracyView,
    pub matches: CaseMatchesView,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseAnalysisResponse {
    pub success: bool,
    pub analysis_config: CaseAnalysisConfig,
    pub overall_stats: OverallStats,
    pub accuracy_distribution: AccuracyDistribution,
    pub method_performance: BTreeMap<String, MethodPerformance>,
    pub cases: Vec<CaseView>,
    pub timestamp: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GannPredictResponse {
    pub success: bool,
    pub predicted: Vec<u8>,
    pub seed: Vec<u8>,
    pub method: String,
    pub explanation: String,
    pub number_frequency: BTreeMap<u8, u32>,
    pub random_used: bool,
    pub data_source: String,
    pub timestamp: String,
}

/// Server-local timestamp in the API's display format.
pub fn timestamp_now() -> String {
    chrono::Utc::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

pub fn format_draw(numbers: &[u8], extra: u8) -> String {
    let joined = numbers
        .iter()
        .map(|n| n.to_string())
        .collect::<Vec<_>>()
        .join(", ");
    format!("{joined} + {extra}")
}
