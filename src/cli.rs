use clap::{Parser, Subcommand};
use tabled::{Table, Tabled};
use tracing::info;

use crate::analysis::{self, DetailedOptions};
use crate::collector::HkjcClient;
use crate::config::AppConfig;
use crate::domain::DrawRecord;
use crate::error::{MarksixError, Result};
use crate::gann;
use crate::store::DrawStore;

#[derive(Parser)]
#[command(name = "marksix")]
#[command(version = "0.1.0")]
#[command(about = "Mark Six prediction server with progressive-learning backtests", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Config directory path
    #[arg(short, long, default_value = "config")]
    pub config: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the prediction API server
    Serve {
        /// Port override (default from config)
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Predict the next draw from the stored history
    Predict {
        /// Use the stored snapshot without refreshing from HKJC
        #[arg(long)]
        skip_fetch: bool,
    },
    /// Show the case-by-case back-test report
    Cases {
        /// Number of recent cases to show
        #[arg(short, long)]
        limit: Option<usize>,
        /// Show every case instead of the recent tail
        #[arg(long)]
        show_all: bool,
    },
    /// Fetch the full draw history from HKJC and replace the snapshot
    Fetch,
    /// Expand seed numbers through the Gann square and rank by popularity
    Gann {
        /// Comma-separated seed numbers, e.g. "3,4,17"
        #[arg(short, long)]
        seed: String,
    },
}

#[derive(Tabled)]
struct CaseRow {
    #[tabled(rename = "Step")]
    step: usize,
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Target")]
    target: String,
    #[tabled(rename = "Predicted")]
    predicted: String,
    #[tabled(rename = "Hits")]
    hits: String,
    #[tabled(rename = "Accuracy")]
    accuracy: String,
    #[tabled(rename = "Method")]
    method: &'static str,
}

#[derive(Tabled)]
struct MethodRow {
    #[tabled(rename = "Method")]
    method: String,
    #[tabled(rename = "Cases")]
    cases: usize,
    #[tabled(rename = "Avg accuracy")]
    avg_accuracy: String,
    #[tabled(rename = "Avg hits")]
    avg_hits: String,
}

fn format_numbers(numbers: &[u8], extra: u8) -> String {
    let joined = numbers
        .iter()
        .map(|n| n.to_string())
        .collect::<Vec<_>>()
        .join(",");
    format!("{joined}+{extra}")
}

/// Load the history for a CLI run, optionally refreshing from HKJC first.
async fn load_history(config: &AppConfig, skip_fetch: bool) -> Result<Vec<DrawRecord>> {
    let store = DrawStore::new(&config.data.snapshot_path);

    if !skip_fetch {
        let client = HkjcClient::new(config.hkjc.clone())?;
        match client.fetch_all().await {
            Ok(records) => store.replace(records)?,
            Err(e) => info!(error = %e, "HKJC fetch failed; using stored snapshot"),
        }
    }

    let history = store.history();
    if history.is_empty() {
        return Err(MarksixError::DataUnavailable(
            "no stored draws; run `marksix fetch` first".to_string(),
        ));
    }
    Ok(history)
}

/// `predict` command: analyze the history and print the next-draw pick.
pub async fn run_predict(config: &AppConfig, skip_fetch: bool) -> Result<()> {
    let history = load_history(config, skip_fetch).await?;
    let outcome = analysis::analyze(&history, &mut rand::thread_rng())?;

    println!();
    println!(
        "Prediction: {}",
        format_numbers(&outcome.prediction.numbers, outcome.prediction.extra_number)
    );
    println!(
        "Method: {}  Confidence: {}%  ({:?} path)",
        outcome.prediction.method.as_str(),
        outcome.confidence,
        outcome.source
    );
    println!(
        "Back-test: {} learning steps, {:.2}% mean accuracy, {:.2} mean hits",
        outcome.summary.total_cases,
        outcome.summary.overall_accuracy,
        outcome.summary.average_correct_numbers
    );
    println!();
    Ok(())
}

/// `cases` command: back-test the history and print the detailed report.
pub async fn run_cases(
    config: &AppConfig,
    limit: Option<usize>,
    show_all: bool,
) -> Result<()> {
    let history = load_history(config, true).await?;
    let options = DetailedOptions {
        limit: limit
            .unwrap_or(config.backtest.default_case_limit)
            .min(config.backtest.max_case_limit),
        show_all,
    };
    let report = analysis::run_detailed_backtest(&history, options, &mut rand::thread_rng())?;
    let summary = &report.summary;

    println!();
    println!(
        "Back-test over {} draws: {} cases, {:.2}% mean accuracy, {:.2}/6 mean hits",
        history.len(),
        summary.total_cases,
        summary.overall_accuracy,
        summary.average_correct_numbers
    );
    println!(
        "Perfect matches: {}   Zero matches: {}",
        summary.perfect_matches, summary.zero_matches
    );
    if let (Some(best), Some(worst)) = (&summary.best_case, &summary.worst_case) {
        println!(
            "Best case: step {} ({:.2}%)   Worst case: step {} ({:.2}%)",
            best.step, best.accuracy, worst.step, worst.accuracy
        );
    }

    let method_rows: Vec<MethodRow> = summary
        .method_performance
        .iter()
        .map(|(method, perf)| MethodRow {
            method: method.clone(),
            cases: perf.cases,
            avg_accuracy: format!("{:.2}%", perf.avg_accuracy),
            avg_hits: format!("{:.2}/6", perf.avg_correct_numbers),
        })
        .collect();
    println!();
    println!("{}", Table::new(method_rows));

    let case_rows: Vec<CaseRow> = report
        .cases
        .iter()
        .map(|case| CaseRow {
            step: case.step,
            date: case.target_date.to_string(),
            target: format_numbers(&case.target_numbers, case.target_extra),
            predicted: format_numbers(&case.predicted_numbers, case.predicted_extra),
            hits: format!("{}+{}", case.correct_numbers, case.correct_extra),
            accuracy: format!("{:.1}%", case.accuracy),
            method: case.method.as_str(),
        })
        .collect();
    println!();
    println!("{}", Table::new(case_rows));
    println!();
    Ok(())
}

/// `fetch` command: refresh the snapshot from HKJC.
pub async fn run_fetch(config: &AppConfig) -> Result<()> {
    let client = HkjcClient::new(config.hkjc.clone())?;
    let records = client.fetch_all().await?;
    let count = records.len();
    let store = DrawStore::new(&config.data.snapshot_path);
    store.replace(records)?;
    println!(
        "Fetched {count} draws into {}",
        config.data.snapshot_path
    );
    Ok(())
}

/// `gann` command: expand a seed and rank the expansion by popularity.
pub async fn run_gann(config: &AppConfig, seed_raw: &str) -> Result<()> {
    let seed: Vec<u8> = seed_raw
        .split(',')
        .filter_map(|part| part.trim().parse::<u8>().ok())
        .collect();
    if seed.is_empty() {
        return Err(MarksixError::Validation(format!(
            "no usable seed numbers in {seed_raw:?}"
        )));
    }

    let expanded = gann::lineup_expansion(&seed);
    if expanded.is_empty() {
        println!("Seed numbers share no Gann square row or column; nothing to expand.");
        return Ok(());
    }

    let store = DrawStore::new(&config.data.snapshot_path);
    let history = store.history();
    let ranked = gann::rank_by_popularity(&expanded, &history);

    println!();
    println!("Expansion of {seed:?}: {expanded:?}");
    println!("Ranked by historical popularity:");
    for (number, count) in &ranked {
        println!("  {number:>2}  seen {count} times");
    }
    println!();
    Ok(())
}
