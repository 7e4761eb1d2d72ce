#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Temporal analytics over heterogeneous date storage.
//!
//! Buckets every record's creation date into calendar periods — even
//! though dates are stored either as native timestamps or free-text
//! strings — and computes deterministic, time-ordered trend and summary
//! statistics. Per-type fetches run concurrently and fail independently;
//! a broken type or an unparsable date never aborts the rest of the
//! report.

pub mod date;
pub mod period;
pub mod trend;

use chrono::{Duration, Months, NaiveDate};
use futures::future::join_all;
use piste_map_analytics_models::{PeriodInfo, TemporalReport, TemporalRequest, TypeDiagnostics};
use piste_map_database::InfrastructureRepository;
use piste_map_geography::CommuneFilter;
use piste_map_infra_models::{CreatedAt, InfrastructureType};
use std::collections::BTreeMap;

use crate::period::PeriodAccumulator;

/// Resolves the inclusive analysis window for a request as of `today`.
///
/// Precedence: an explicit `date_from`+`date_to` range, then the specific
/// `year`[/`month`[/`day`]] shortcuts, then `days_back` ending today. An
/// unrepresentable shortcut (month 13, Feb 30) falls through to the
/// `days_back` default rather than failing the request.
#[must_use]
pub fn resolve_window(request: &TemporalRequest, today: NaiveDate) -> (NaiveDate, NaiveDate) {
    if let (Some(from), Some(to)) = (request.date_from, request.date_to) {
        return (from, to);
    }

    if let Some(year) = request.year
        && let Some(window) = specific_window(year, request.month, request.day)
    {
        return window;
    }

    (today - Duration::days(request.days_back), today)
}

fn specific_window(
    year: i32,
    month: Option<u32>,
    day: Option<u32>,
) -> Option<(NaiveDate, NaiveDate)> {
    match (month, day) {
        (Some(month), Some(day)) => {
            let date = NaiveDate::from_ymd_opt(year, month, day)?;
            Some((date, date))
        }
        (Some(month), None) => {
            let start = NaiveDate::from_ymd_opt(year, month, 1)?;
            let end = start.checked_add_months(Months::new(1))?.pred_opt()?;
            Some((start, end))
        }
        (None, _) => Some((
            NaiveDate::from_ymd_opt(year, 1, 1)?,
            NaiveDate::from_ymd_opt(year, 12, 31)?,
        )),
    }
}

/// Runs a temporal analysis, with "today" taken from the system clock.
pub async fn analyze(
    repo: &dyn InfrastructureRepository,
    request: &TemporalRequest,
) -> TemporalReport {
    analyze_as_of(repo, request, chrono::Local::now().date_naive()).await
}

/// Runs a temporal analysis with an explicit "today", for determinism.
///
/// Fetches every requested type concurrently (bounded by the 14-type
/// catalog), parses each record's creation date, counts the dates inside
/// the window into period buckets, and summarizes the combined totals.
pub async fn analyze_as_of(
    repo: &dyn InfrastructureRepository,
    request: &TemporalRequest,
    today: NaiveDate,
) -> TemporalReport {
    let (start_date, end_date) = resolve_window(request, today);
    let types = InfrastructureType::resolve_filter(&request.types);

    let fetches = types.iter().map(|infra_type| {
        let infra_type = *infra_type;
        async move { (infra_type, repo.fetch(infra_type, &CommuneFilter::All).await) }
    });
    let fetched = join_all(fetches).await;

    let mut accumulator = PeriodAccumulator::new(request.granularity);
    let mut debug_details: BTreeMap<InfrastructureType, TypeDiagnostics> = BTreeMap::new();

    for (infra_type, result) in fetched {
        let mut diagnostics = TypeDiagnostics::default();
        match result {
            Err(e) => {
                log::error!("temporal fetch failed for {infra_type}: {e}");
                diagnostics.fetch_error = Some(e.to_string());
            }
            Ok(records) => {
                diagnostics.total_records = records.len() as u64;
                for record in &records {
                    match date::parse_created(&record.created) {
                        Some(parsed) => {
                            diagnostics.valid_dates += 1;
                            if (start_date..=end_date).contains(&parsed) {
                                diagnostics.in_range_dates += 1;
                                accumulator.add(infra_type, parsed);
                            }
                        }
                        None => {
                            if !matches!(record.created, CreatedAt::Missing) {
                                diagnostics.error_count += 1;
                            }
                        }
                    }
                }
            }
        }
        debug_details.insert(infra_type, diagnostics);
    }

    let (data, total_by_period) = accumulator.into_parts();
    for (infra_type, buckets) in &data {
        if let Some(diagnostics) = debug_details.get_mut(infra_type) {
            diagnostics.periods_found = buckets.len();
        }
    }

    let counts: Vec<u64> = total_by_period.values().copied().collect();
    let metrics = trend::summarize(&counts);

    log::debug!(
        "temporal analysis: {} types, {} periods, {} records in range",
        data.len(),
        metrics.nb_periodes,
        metrics.total_collectes
    );

    TemporalReport {
        period_info: PeriodInfo {
            granularity: request.granularity,
            start_date,
            end_date,
            total_types: data.len(),
        },
        data,
        total_by_period,
        metrics,
        debug_details,
    }
}
