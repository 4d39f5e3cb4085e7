use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use rand::seq::SliceRandom;
use tracing::info;

use crate::analysis::{self, accuracy_grade, DetailedOptions};
use crate::api::state::AppState;
use crate::api::types::*;
use crate::domain::DrawRecord;
use crate::error::MarksixError;
use crate::gann;

type HandlerError = (StatusCode, Json<ErrorResponse>);

fn bad_request(error: &str, message: impl Into<String>) -> HandlerError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse::with_message(error, message)),
    )
}

fn internal_error(error: &str, e: &MarksixError) -> HandlerError {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse::with_message(error, e.to_string())),
    )
}

fn data_source(fetched: bool) -> String {
    if fetched {
        "Fresh HKJC data".to_string()
    } else {
        "Existing JSON data".to_string()
    }
}

fn no_data() -> HandlerError {
    bad_request(
        "No historical data available",
        "Please ensure historical data is available before running prediction.",
    )
}

/// GET /health -- lightweight liveness probe
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        draws: state.store.len(),
        uptime_secs: state.uptime_seconds(),
    })
}

/// GET /api/marksix/enhanced-predict
///
/// Optionally refreshes from HKJC, then runs the progressive-learning
/// analysis and predicts the next draw.
pub async fn enhanced_predict(
    State(state): State<AppState>,
    Query(query): Query<PredictQuery>,
) -> Result<Json<PredictResponse>, HandlerError> {
    let (history, fetched) = state.history_with_refresh(query.skip_fetch).await;
    if history.is_empty() {
        return Err(no_data());
    }

    let outcome = analysis::analyze(&history, &mut rand::thread_rng()).map_err(|e| match e {
        MarksixError::DataUnavailable(_) => no_data(),
        other => internal_error("Progressive learning failed", &other),
    })?;

    info!(
        prediction = %format_draw(&outcome.prediction.numbers, outcome.prediction.extra_number),
        confidence = outcome.confidence,
        "prediction served"
    );

    let from = history.iter().map(|r| r.draw_date).min();
    let to = history.iter().map(|r| r.draw_date).max();

    Ok(Json(PredictResponse {
        success: true,
        formatted_prediction: format_draw(
            &outcome.prediction.numbers,
            outcome.prediction.extra_number,
        ),
        predicted: outcome.prediction.numbers,
        extra_number: outcome.prediction.extra_number,
        confidence: outcome.confidence,
        method: outcome.prediction.method,
        source: outcome.source,
        analysis: PredictAnalysisInfo {
            total_learning_steps: outcome.summary.total_cases,
            overall_accuracy: outcome.summary.overall_accuracy,
            average_correct_numbers: outcome.summary.average_correct_numbers,
        },
        data_process: DataProcessInfo {
            fetch_attempted: !query.skip_fetch,
            new_data_fetched: fetched,
            data_source: data_source(fetched),
        },
        data_used: DataUsedInfo {
            total_draws: history.len(),
            date_range: DateRange {
                from: from.map(|d| d.to_string()),
                to: to.map(|d| d.to_string()),
            },
        },
        timestamp: timestamp_now(),
    }))
}

/// GET /api/marksix/case-analysis
///
/// Detailed case-by-case back-test report.
pub async fn case_analysis(
    State(state): State<AppState>,
    Query(query): Query<CaseAnalysisQuery>,
) -> Result<Json<CaseAnalysisResponse>, HandlerError> {
    let (history, fetched) = state.history_with_refresh(query.skip_fetch).await;
    if history.is_empty() {
        return Err(no_data());
    }

    let limit = query
        .limit
        .unwrap_or(state.backtest.default_case_limit)
        .min(state.backtest.max_case_limit);
    let options = DetailedOptions {
        limit,
        show_all: query.show_all,
    };

    let report = analysis::run_detailed_backtest(&history, options, &mut rand::thread_rng())
        .map_err(|e| internal_error("Case analysis failed", &e))?;

    let total_cases = report.summary.total_cases;
    let surfaced = report.cases.len();
    let cases: Vec<CaseView> = report
        .cases
        .into_iter()
        .enumerate()
        .map(|(idx, case)| {
            let matched: Vec<u8> = case
                .target_numbers
                .iter()
                .copied()
                .filter(|n| case.predicted_numbers.contains(n))
                .collect();
            CaseView {
                case_number: total_cases - surfaced + idx + 1,
                step: case.step,
                training_draws: case.training_draws,
                method: case.method,
                target: CaseTargetView {
                    date: case.target_date.to_string(),
                    formatted: format_draw(&case.target_numbers, case.target_extra),
                    numbers: case.target_numbers.clone(),
                    extra_number: case.target_extra,
                },
                predicted: CaseTargetView {
                    date: String::new(),
                    formatted: format_draw(&case.predicted_numbers, case.predicted_extra),
                    numbers: case.predicted_numbers.clone(),
                    extra_number: case.predicted_extra,
                },
                accuracy: CaseAccuracyView {
                    correct_numbers: case.correct_numbers,
                    correct_extra: case.correct_extra,
                    total_correct: case.correct_numbers + case.correct_extra,
                    percentage: format!("{:.2}%", case.accuracy),
                    grade: accuracy_grade(case.accuracy),
                },
                matches: CaseMatchesView {
                    main_numbers: matched,
                    extra_match: case.correct_extra == 1,
                },
            }
        })
        .collect();

    Ok(Json(CaseAnalysisResponse {
        success: true,
        analysis_config: CaseAnalysisConfig {
            total_historical_draws: history.len(),
            cases_analyzed: cases.len(),
            show_all_cases: query.show_all,
            data_source: data_source(fetched),
        },
        overall_stats: OverallStats {
            total_cases,
            average_accuracy: format!("{:.2}%", report.summary.overall_accuracy),
            average_correct_numbers: format!(
                "{:.1}/6",
                report.summary.average_correct_numbers
            ),
            best_case: report.summary.best_case,
            worst_case: report.summary.worst_case,
            perfect_matches: report.summary.perfect_matches,
            zero_matches: report.summary.zero_matches,
        },
        accuracy_distribution: report.summary.accuracy_distribution,
        method_performance: report.summary.method_performance,
        cases,
        timestamp: timestamp_now(),
    }))
}

/// GET /api/marksix/gann-square-popular-predict
///
/// Expands seed numbers through the Gann Square line-up method and ranks
/// the expansion by historical popularity.
pub async fn gann_square_popular_predict(
    State(state): State<AppState>,
    Query(query): Query<GannPredictQuery>,
) -> Result<Json<GannPredictResponse>, HandlerError> {
    let (history, fetched) = state.history_with_refresh(query.skip_fetch).await;
    if history.is_empty() {
        return Err(no_data());
    }

    let seed = match &query.seed {
        Some(raw) => raw
            .split(',')
            .filter_map(|part| part.trim().parse::<u8>().ok())
            .collect(),
        None => latest_draw_seed(&history),
    };
    if seed.is_empty() {
        return Err(bad_request(
            "Invalid seed",
            "No valid seed numbers provided or found in last draw.",
        ));
    }

    let expanded = gann::lineup_expansion(&seed);
    let ranked = gann::rank_by_popularity(&expanded, &history);
    let ordered: Vec<u8> = ranked.iter().map(|(n, _)| *n).collect();
    let most_popular: Vec<u8> = ordered.iter().copied().take(7).collect();

    // With neither a seed nor an explicit random flag the endpoint samples
    // from the whole expansion instead of reporting the fixed top seven.
    let default_request = !query.random && query.seed.is_none();
    let mut rng = rand::thread_rng();
    let (predicted, random_used, explanation) = if default_request {
        let mut shuffled = ordered.clone();
        shuffled.shuffle(&mut rng);
        shuffled.truncate(7);
        (
            shuffled,
            true,
            "No random or seed parameter provided: returned 7 random numbers from the Gann Square expansion set.".to_string(),
        )
    } else if query.random && most_popular.len() == 7 {
        let mut shuffled = most_popular.clone();
        shuffled.shuffle(&mut rng);
        (
            shuffled,
            true,
            "Expands the seed through the Gann Square method, ranks by historical popularity, and samples the top seven.".to_string(),
        )
    } else {
        (
            most_popular,
            false,
            "Expands the seed through the Gann Square method and returns the 7 most popular numbers by historical frequency.".to_string(),
        )
    };

    let number_frequency = ranked
        .into_iter()
        .filter(|(_, count)| *count > 0)
        .collect();

    Ok(Json(GannPredictResponse {
        success: true,
        predicted,
        seed,
        method: "gann_square_expansion_with_historical_popularity".to_string(),
        explanation,
        number_frequency,
        random_used,
        data_source: data_source(fetched),
        timestamp: timestamp_now(),
    }))
}

/// Seed from the most recent draw: its six numbers plus the extra.
fn latest_draw_seed(history: &[DrawRecord]) -> Vec<u8> {
    history
        .iter()
        .max_by_key(|r| r.draw_date)
        .map(|last| {
            let mut seed = last.numbers.clone();
            seed.push(last.extra_number);
            seed
        })
        .unwrap_or_default()
}
