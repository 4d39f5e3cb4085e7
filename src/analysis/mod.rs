pub mod aggregate;
pub mod engine;
pub mod predictor;
pub mod scorer;
pub mod strategy;

pub use aggregate::{accuracy_grade, summarize, AccuracyDistribution, MethodPerformance, RunSummary};
pub use engine::{
    run_backtest, run_detailed_backtest, run_progressive_learning, CaseResult, DetailedOptions,
    DetailedReport,
};
pub use predictor::{analyze, AnalysisOutcome, AnalysisSource};
pub use scorer::{score, AccuracyScore};
pub use strategy::{fallback_prediction, generate, select_strategy};
