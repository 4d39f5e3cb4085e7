//! Case aggregation
//!
//! Pure reduction of a back-test's case sequence into summary statistics.
//! Safe on an empty sequence: means come back zeroed, best/worst absent,
//! every histogram bucket zero.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::analysis::engine::CaseResult;
use crate::domain::MAIN_NUMBERS;

/// Fixed-bucket histogram over case accuracy percentages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AccuracyDistribution {
    #[serde(rename = "90-100%")]
    pub excellent: usize,
    #[serde(rename = "70-89%")]
    pub very_good: usize,
    #[serde(rename = "50-69%")]
    pub good: usize,
    #[serde(rename = "30-49%")]
    pub fair: usize,
    #[serde(rename = "10-29%")]
    pub poor: usize,
    #[serde(rename = "0-9%")]
    pub very_poor: usize,
}

impl AccuracyDistribution {
    fn record(&mut self, percentage: f64) {
        if percentage >= 90.0 {
            self.excellent += 1;
        } else if percentage >= 70.0 {
            self.very_good += 1;
        } else if percentage >= 50.0 {
            self.good += 1;
        } else if percentage >= 30.0 {
            self.fair += 1;
        } else if percentage >= 10.0 {
            self.poor += 1;
        } else {
            self.very_poor += 1;
        }
    }

    pub fn total(&self) -> usize {
        self.excellent + self.very_good + self.good + self.fair + self.poor + self.very_poor
    }
}

/// Per-strategy rollup across the cases that used it.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodPerformance {
    pub cases: usize,
    pub avg_accuracy: f64,
    pub avg_correct_numbers: f64,
}

/// Aggregate over one back-test run.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub total_cases: usize,
    /// Mean case accuracy percentage.
    pub overall_accuracy: f64,
    pub average_correct_numbers: f64,
    pub best_case: Option<CaseResult>,
    pub worst_case: Option<CaseResult>,
    /// Cases where all six main numbers matched.
    pub perfect_matches: usize,
    /// Cases where no main number matched.
    pub zero_matches: usize,
    pub accuracy_distribution: AccuracyDistribution,
    /// Keyed by strategy tag, in tag order.
    pub method_performance: BTreeMap<String, MethodPerformance>,
}

/// Reduce a case sequence to its run summary.
///
/// Best and worst are found by linear scan with strict comparison, so ties
/// resolve to the earliest case encountered.
pub fn summarize(cases: &[CaseResult]) -> RunSummary {
    if cases.is_empty() {
        return RunSummary::default();
    }

    let n = cases.len() as f64;
    let overall_accuracy = cases.iter().map(|c| c.accuracy).sum::<f64>() / n;
    let average_correct_numbers =
        cases.iter().map(|c| f64::from(c.correct_numbers)).sum::<f64>() / n;

    let mut best = &cases[0];
    let mut worst = &cases[0];
    let mut distribution = AccuracyDistribution::default();
    let mut perfect_matches = 0;
    let mut zero_matches = 0;

    struct MethodAccumulator {
        cases: usize,
        total_accuracy: f64,
        total_correct: u32,
    }
    let mut methods: BTreeMap<&'static str, MethodAccumulator> = BTreeMap::new();

    for case in cases {
        if case.accuracy > best.accuracy {
            best = case;
        }
        if case.accuracy < worst.accuracy {
            worst = case;
        }
        distribution.record(case.accuracy);
        if case.correct_numbers as usize == MAIN_NUMBERS {
            perfect_matches += 1;
        }
        if case.correct_numbers == 0 {
            zero_matches += 1;
        }

        let entry = methods
            .entry(case.method.as_str())
            .or_insert(MethodAccumulator {
                cases: 0,
                total_accuracy: 0.0,
                total_correct: 0,
            });
        entry.cases += 1;
        entry.total_accuracy += case.accuracy;
        entry.total_correct += case.correct_numbers;
    }

    let method_performance = methods
        .into_iter()
        .map(|(tag, acc)| {
            let count = acc.cases as f64;
            (
                tag.to_string(),
                MethodPerformance {
                    cases: acc.cases,
                    avg_accuracy: acc.total_accuracy / count,
                    avg_correct_numbers: f64::from(acc.total_correct) / count,
                },
            )
        })
        .collect();

    RunSummary {
        total_cases: cases.len(),
        overall_accuracy,
        average_correct_numbers,
        best_case: Some(best.clone()),
        worst_case: Some(worst.clone()),
        perfect_matches,
        zero_matches,
        accuracy_distribution: distribution,
        method_performance,
    }
}

/// Human-readable grade for a case accuracy percentage.
pub fn accuracy_grade(percentage: f64) -> &'static str {
    if percentage >= 100.0 {
        "Perfect"
    } else if percentage >= 85.0 {
        "Excellent"
    } else if percentage >= 70.0 {
        "Very Good"
    } else if percentage >= 55.0 {
        "Good"
    } else if percentage >= 40.0 {
        "Fair"
    } else if percentage >= 25.0 {
        "Poor"
    } else {
        "Very Poor"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::StrategyKind;

    fn case(step: usize, correct_numbers: u32, correct_extra: u32, method: StrategyKind) -> CaseResult {
        let accuracy = f64::from(correct_numbers + correct_extra) / 7.0 * 100.0;
        CaseResult {
            step,
            training_draws: step,
            target_date: "2024-01-02".parse().unwrap(),
            target_numbers: vec![1, 2, 3, 4, 5, 6],
            target_extra: 7,
            predicted_numbers: vec![1, 2, 3, 4, 5, 6],
            predicted_extra: 7,
            correct_numbers,
            correct_extra,
            accuracy,
            method,
        }
    }

    #[test]
    fn test_empty_sequence_yields_zeroed_summary() {
        let summary = summarize(&[]);
        assert_eq!(summary.total_cases, 0);
        assert_eq!(summary.overall_accuracy, 0.0);
        assert_eq!(summary.average_correct_numbers, 0.0);
        assert!(summary.best_case.is_none());
        assert!(summary.worst_case.is_none());
        assert_eq!(summary.perfect_matches, 0);
        assert_eq!(summary.zero_matches, 0);
        assert_eq!(summary.accuracy_distribution.total(), 0);
        assert!(summary.method_performance.is_empty());
    }

    #[test]
    fn test_means_and_counts() {
        let cases = vec![
            case(1, 6, 1, StrategyKind::SingleDrawVariation), // 100%
            case(2, 0, 0, StrategyKind::TrendAnalysis),       // 0%
            case(3, 3, 1, StrategyKind::TrendAnalysis),       // 57.14%
        ];
        let summary = summarize(&cases);
        assert_eq!(summary.total_cases, 3);
        let expected = (100.0 + 0.0 + 4.0 / 7.0 * 100.0) / 3.0;
        assert!((summary.overall_accuracy - expected).abs() < 1e-9);
        assert!((summary.average_correct_numbers - 3.0).abs() < 1e-9);
        assert_eq!(summary.perfect_matches, 1);
        assert_eq!(summary.zero_matches, 1);
    }

    #[test]
    fn test_ties_resolve_to_first_case_found() {
        let cases = vec![
            case(1, 3, 0, StrategyKind::TrendAnalysis),
            case(2, 3, 0, StrategyKind::TrendAnalysis),
            case(3, 3, 0, StrategyKind::TrendAnalysis),
        ];
        let summary = summarize(&cases);
        assert_eq!(summary.best_case.unwrap().step, 1);
        assert_eq!(summary.worst_case.unwrap().step, 1);
    }

    #[test]
    fn test_best_and_worst_by_accuracy() {
        let cases = vec![
            case(1, 2, 0, StrategyKind::FrequencyAnalysis),
            case(2, 5, 1, StrategyKind::FrequencyAnalysis),
            case(3, 0, 0, StrategyKind::FrequencyAnalysis),
            case(4, 5, 1, StrategyKind::FrequencyAnalysis), // ties with step 2
        ];
        let summary = summarize(&cases);
        assert_eq!(summary.best_case.unwrap().step, 2);
        assert_eq!(summary.worst_case.unwrap().step, 3);
    }

    #[test]
    fn test_histogram_buckets_and_edges() {
        // Accuracy values per correct-slot count: 0 -> 0%, 1 -> 14.3%,
        // 2 -> 28.6%, 3 -> 42.9%, 4 -> 57.1%, 5 -> 71.4%, 6 -> 85.7%, 7 -> 100%.
        let cases: Vec<CaseResult> = (0..=7u32)
            .map(|total| {
                let correct_extra = u32::from(total == 7);
                case(
                    total as usize + 1,
                    total.min(6),
                    correct_extra,
                    StrategyKind::AdvancedPatternEnsemble,
                )
            })
            .collect();
        let summary = summarize(&cases);
        let dist = &summary.accuracy_distribution;
        assert_eq!(dist.very_poor, 1); // 0%
        assert_eq!(dist.poor, 2); // 14.3%, 28.6%
        assert_eq!(dist.fair, 1); // 42.9%
        assert_eq!(dist.good, 1); // 57.1%
        assert_eq!(dist.very_good, 2); // 71.4%, 85.7%
        assert_eq!(dist.excellent, 1); // 100%
        assert_eq!(dist.total(), summary.total_cases);
    }

    #[test]
    fn test_method_performance_group_by() {
        let cases = vec![
            case(1, 6, 1, StrategyKind::SingleDrawVariation),
            case(2, 2, 0, StrategyKind::TrendAnalysis),
            case(3, 4, 0, StrategyKind::TrendAnalysis),
        ];
        let summary = summarize(&cases);
        assert_eq!(summary.method_performance.len(), 2);

        let single = &summary.method_performance["single_draw_variation"];
        assert_eq!(single.cases, 1);
        assert_eq!(single.avg_accuracy, 100.0);

        let trend = &summary.method_performance["trend_analysis"];
        assert_eq!(trend.cases, 2);
        assert!((trend.avg_correct_numbers - 3.0).abs() < 1e-9);
        let expected = (2.0 / 7.0 + 4.0 / 7.0) / 2.0 * 100.0;
        assert!((trend.avg_accuracy - expected).abs() < 1e-9);
    }

    #[test]
    fn test_accuracy_grades() {
        assert_eq!(accuracy_grade(100.0), "Perfect");
        assert_eq!(accuracy_grade(85.7), "Excellent");
        assert_eq!(accuracy_grade(71.4), "Very Good");
        assert_eq!(accuracy_grade(57.1), "Good");
        assert_eq!(accuracy_grade(42.9), "Fair");
        assert_eq!(accuracy_grade(28.6), "Poor");
        assert_eq!(accuracy_grade(0.0), "Very Poor");
    }
}
