//! HKJC Mark Six result client
//!
//! Fetches historical draws from the HKJC GraphQL endpoint. The API serves
//! bounded date ranges, so the full history is pulled in 3-month windows
//! from the first recorded draw (January 1993) to today, with a light delay
//! between windows. Individual window failures are logged and skipped; only
//! a completely empty harvest is an error.

use chrono::{Months, NaiveDate, Utc};
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::config::HkjcConfig;
use crate::domain::{DrawRecord, MAIN_NUMBERS};
use crate::error::{MarksixError, Result};

const GRAPHQL_QUERY: &str = r#"fragment lotteryDrawsFragment on LotteryDraw {
  id
  year
  no
  openDate
  closeDate
  drawDate
  status
  snowballCode
  snowballName_en
  snowballName_ch
  lotteryPool {
    sell
    status
    totalInvestment
    jackpot
    unitBet
    estimatedPrize
    derivedFirstPrizeDiv
    lotteryPrizes {
      type
      winningUnit
      dividend
    }
  }
  drawResult {
    drawnNo
    xDrawnNo
  }
}

query marksixResult($lastNDraw: Int, $startDate: String, $endDate: String, $drawType: LotteryDrawType) {
  lotteryDraws(
    lastNDraw: $lastNDraw
    startDate: $startDate
    endDate: $endDate
    drawType: $drawType
  ) {
    ...lotteryDrawsFragment
  }
}"#;

/// HKJC GraphQL API client
pub struct HkjcClient {
    client: reqwest::Client,
    config: HkjcConfig,
}

impl HkjcClient {
    pub fn new(config: HkjcConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { client, config })
    }

    /// Fetch the full draw history, deduplicated and sorted newest first.
    pub async fn fetch_all(&self) -> Result<Vec<DrawRecord>> {
        let start = NaiveDate::parse_from_str(&self.config.start_date, "%Y-%m-%d")
            .map_err(|e| MarksixError::Validation(format!("bad hkjc.start_date: {e}")))?;
        let today = Utc::now().date_naive();
        let windows = three_month_windows(start, today);
        info!(windows = windows.len(), "fetching Mark Six history from HKJC");

        let mut all: Vec<DrawRecord> = Vec::new();
        for (window_start, window_end) in windows {
            match self.fetch_window(window_start, window_end).await {
                Ok(batch) => {
                    if !batch.is_empty() {
                        debug!(
                            start = %window_start,
                            end = %window_end,
                            draws = batch.len(),
                            "fetched window"
                        );
                        all.extend(batch);
                    }
                }
                Err(e) => {
                    warn!(start = %window_start, end = %window_end, error = %e, "window fetch failed; skipping");
                }
            }

            // Be gentle with the endpoint between windows.
            tokio::time::sleep(std::time::Duration::from_millis(self.config.window_delay_ms))
                .await;
        }

        if all.is_empty() {
            return Err(MarksixError::DataUnavailable(
                "HKJC returned no draws for any window".to_string(),
            ));
        }

        let mut unique = dedupe_draws(all);
        unique.sort_by(|a, b| b.draw_date.cmp(&a.draw_date));
        info!(draws = unique.len(), "fetched unique Mark Six draws");
        Ok(unique)
    }

    async fn fetch_window(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<DrawRecord>> {
        let payload = json!({
            "operationName": "marksixResult",
            "query": GRAPHQL_QUERY,
            "variables": {
                "lastNDraw": null,
                "startDate": start.format("%Y%m%d").to_string(),
                "endDate": end.format("%Y%m%d").to_string(),
                "drawType": "All",
            },
        });

        let response = self
            .client
            .post(&self.config.graphql_url)
            .header("Accept", "*/*")
            .header(
                "User-Agent",
                "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36",
            )
            .header("Origin", "https://bet.hkjc.com")
            .header("Referer", "https://bet.hkjc.com/")
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(MarksixError::Internal(format!(
                "HKJC API error: {}",
                response.status()
            )));
        }

        let body: Value = response.json().await?;
        let draws = body
            .get("data")
            .and_then(|d| d.get("lotteryDraws"))
            .and_then(Value::as_array)
            .map(|rows| rows.iter().filter_map(normalize_draw).collect())
            .unwrap_or_default();
        Ok(draws)
    }
}

/// Split [start, end] into consecutive 3-month windows.
fn three_month_windows(start: NaiveDate, end: NaiveDate) -> Vec<(NaiveDate, NaiveDate)> {
    let mut windows = Vec::new();
    let mut current = start;
    while current <= end {
        let next = current + Months::new(3);
        let window_end = std::cmp::min(next.pred_opt().unwrap_or(next), end);
        windows.push((current, window_end));
        current = next;
    }
    windows
}

/// Normalize one raw GraphQL draw. Returns `None` for records without a
/// parseable date, exactly six drawn numbers and an extra number.
fn normalize_draw(raw: &Value) -> Option<DrawRecord> {
    // Dates arrive as "1993-03-30+08:00"; the leading ten characters are the
    // calendar date regardless of the timezone suffix.
    let date_str = raw.get("drawDate")?.as_str()?;
    let draw_date = NaiveDate::parse_from_str(date_str.get(..10)?, "%Y-%m-%d").ok()?;

    let result = raw.get("drawResult")?;
    let mut numbers: Vec<u8> = result
        .get("drawnNo")?
        .as_array()?
        .iter()
        .filter_map(|n| u8::try_from(n.as_u64()?).ok())
        .collect();
    if numbers.len() != MAIN_NUMBERS {
        return None;
    }
    numbers.sort_unstable();

    let extra_number = u8::try_from(result.get("xDrawnNo")?.as_u64()?).ok()?;

    let draw_no = match (field_as_string(raw.get("year")), raw.get("no").and_then(Value::as_u64)) {
        (Some(year), Some(no)) => format!("{year}/{no:03}"),
        _ => String::new(),
    };

    Some(DrawRecord {
        draw_date,
        numbers,
        extra_number,
        draw_no,
    })
}

/// The GraphQL schema serves `year` as either a string or a number.
fn field_as_string(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Drop duplicate records by (date, numbers, extra), keeping the first.
fn dedupe_draws(records: Vec<DrawRecord>) -> Vec<DrawRecord> {
    let mut seen = std::collections::HashSet::new();
    records
        .into_iter()
        .filter(|r| seen.insert((r.draw_date, r.numbers.clone(), r.extra_number)))
        .collect()
}
