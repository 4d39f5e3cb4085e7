//! Core draw types shared by the store, the learning engine and the API.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Numbers drawn per Mark Six result.
pub const MAIN_NUMBERS: usize = 6;

/// Highest number in the pool (1..=49).
pub const NUMBER_POOL: u8 = 49;

/// Scored slots per case: six main numbers plus the extra number.
pub const SCORED_SLOTS: u32 = 7;

/// One historical Mark Six result.
///
/// `numbers` are kept ascending; `extra_number` may coincide with a main
/// number (the draw machine uses a separate ball set).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawRecord {
    #[serde(rename = "drawDate")]
    pub draw_date: NaiveDate,
    pub numbers: Vec<u8>,
    #[serde(rename = "extraNumber")]
    pub extra_number: u8,
    /// Display label, e.g. "2024/087". Not used in computation.
    #[serde(rename = "drawNo", default)]
    pub draw_no: String,
}

impl DrawRecord {
    /// A record is complete when it carries exactly six main numbers.
    /// Incomplete records must not enter the learning engine.
    pub fn is_complete(&self) -> bool {
        self.numbers.len() == MAIN_NUMBERS
    }
}

/// Sort records chronologically ascending (oldest first).
///
/// Callers hand records in whatever order the snapshot or fetcher produced;
/// the learning engine never assumes input order. The sort is stable, so
/// same-date records keep their relative order.
pub fn sort_chronological(mut records: Vec<DrawRecord>) -> Vec<DrawRecord> {
    records.sort_by_key(|r| r.draw_date);
    records
}

/// Tag identifying which strategy produced a prediction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    SingleDrawVariation,
    TrendAnalysis,
    FrequencyAnalysis,
    AdvancedPatternEnsemble,
    FallbackFrequency,
}

impl StrategyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SingleDrawVariation => "single_draw_variation",
            Self::TrendAnalysis => "trend_analysis",
            Self::FrequencyAnalysis => "frequency_analysis",
            Self::AdvancedPatternEnsemble => "advanced_pattern_ensemble",
            Self::FallbackFrequency => "fallback_frequency",
        }
    }
}

/// Output of a prediction strategy: six distinct ascending numbers plus an
/// extra number, all in 1..=49.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prediction {
    pub numbers: Vec<u8>,
    #[serde(rename = "extraNumber")]
    pub extra_number: u8,
    pub method: StrategyKind,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(date: &str, numbers: Vec<u8>) -> DrawRecord {
        DrawRecord {
            draw_date: date.parse().unwrap(),
            numbers,
            extra_number: 7,
            draw_no: String::new(),
        }
    }

    #[test]
    fn test_completeness() {
        assert!(record("2024-01-02", vec![1, 2, 3, 4, 5, 6]).is_complete());
        assert!(!record("2024-01-02", vec![1, 2, 3]).is_complete());
        assert!(!record("2024-01-02", vec![]).is_complete());
    }

    #[test]
    fn test_sort_chronological() {
        let records = vec![
            record("2024-03-01", vec![1, 2, 3, 4, 5, 6]),
            record("2024-01-01", vec![7, 8, 9, 10, 11, 12]),
            record("2024-02-01", vec![13, 14, 15, 16, 17, 18]),
        ];
        let sorted = sort_chronological(records);
        let dates: Vec<String> = sorted.iter().map(|r| r.draw_date.to_string()).collect();
        assert_eq!(dates, vec!["2024-01-01", "2024-02-01", "2024-03-01"]);
    }

    #[test]
    fn test_snapshot_field_names() {
        let rec = record("2024-01-02", vec![1, 2, 3, 4, 5, 6]);
        let json = serde_json::to_value(&rec).unwrap();
        assert_eq!(json["drawDate"], "2024-01-02");
        assert_eq!(json["extraNumber"], 7);
        assert!(json.get("drawNo").is_some());
    }
}
