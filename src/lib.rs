pub mod analysis;
pub mod api;
pub mod cli;
pub mod collector;
pub mod config;
pub mod domain;
pub mod error;
pub mod gann;
pub mod store;

pub use analysis::{
    analyze, run_backtest, run_detailed_backtest, AnalysisOutcome, AnalysisSource, CaseResult,
    DetailedOptions, DetailedReport, RunSummary,
};
pub use collector::HkjcClient;
pub use config::AppConfig;
pub use domain::{DrawRecord, Prediction, StrategyKind};
pub use error::{MarksixError, Result};
pub use store::DrawStore;
