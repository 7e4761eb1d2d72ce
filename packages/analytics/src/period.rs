//! Calendar period bucketing.
//!
//! Period keys are canonical strings whose plain lexicographic order is
//! chronological order: `YYYY-MM-DD` for days, `YYYY-Www` (ISO week-year,
//! zero-padded ISO week) for weeks, `YYYY-MM` for months, `YYYY` for
//! years. Week keys use the ISO definition throughout — one key per ISO
//! week, Monday start, week-year before week number so cross-year
//! comparisons stay correct.

use std::collections::BTreeMap;

use chrono::{Datelike, Duration, NaiveDate};
use piste_map_analytics_models::{TemporalBucket, TimeGranularity};
use piste_map_infra_models::InfrastructureType;

/// Returns the first calendar day of the period containing `date`.
#[must_use]
pub fn period_start(date: NaiveDate, granularity: TimeGranularity) -> NaiveDate {
    match granularity {
        TimeGranularity::Day => date,
        TimeGranularity::Week => {
            date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
        }
        TimeGranularity::Month => date.with_day(1).unwrap_or(date),
        TimeGranularity::Year => NaiveDate::from_ymd_opt(date.year(), 1, 1).unwrap_or(date),
    }
}

/// Renders the canonical period key for the period containing `date`.
#[must_use]
pub fn period_key(date: NaiveDate, granularity: TimeGranularity) -> String {
    match granularity {
        TimeGranularity::Day => date.format("%Y-%m-%d").to_string(),
        TimeGranularity::Week => {
            let week = date.iso_week();
            format!("{:04}-W{:02}", week.year(), week.week())
        }
        TimeGranularity::Month => date.format("%Y-%m").to_string(),
        TimeGranularity::Year => date.format("%Y").to_string(),
    }
}

/// Request-scoped accumulator of per-period counts.
///
/// Tracks, per type, one count per period ordered ascending by period
/// start, plus a combined map summing every type's contribution per
/// canonical key.
#[derive(Debug)]
pub struct PeriodAccumulator {
    granularity: TimeGranularity,
    per_type: BTreeMap<InfrastructureType, BTreeMap<NaiveDate, u64>>,
    combined: BTreeMap<String, u64>,
}

impl PeriodAccumulator {
    /// Creates an empty accumulator for one granularity.
    #[must_use]
    pub const fn new(granularity: TimeGranularity) -> Self {
        Self {
            granularity,
            per_type: BTreeMap::new(),
            combined: BTreeMap::new(),
        }
    }

    /// Counts one record dated `date` for `infra_type`.
    pub fn add(&mut self, infra_type: InfrastructureType, date: NaiveDate) {
        self.add_count(infra_type, date, 1);
    }

    /// Counts `increment` records dated `date` for `infra_type`.
    pub fn add_count(&mut self, infra_type: InfrastructureType, date: NaiveDate, increment: u64) {
        let start = period_start(date, self.granularity);
        *self
            .per_type
            .entry(infra_type)
            .or_default()
            .entry(start)
            .or_insert(0) += increment;
        *self
            .combined
            .entry(period_key(start, self.granularity))
            .or_insert(0) += increment;
    }

    /// Consumes the accumulator into per-type bucket sequences (ascending,
    /// unique period keys) and the combined per-period totals.
    #[must_use]
    pub fn into_parts(
        self,
    ) -> (
        BTreeMap<InfrastructureType, Vec<TemporalBucket>>,
        BTreeMap<String, u64>,
    ) {
        let granularity = self.granularity;
        let data = self
            .per_type
            .into_iter()
            .map(|(infra_type, periods)| {
                let buckets = periods
                    .into_iter()
                    .map(|(start, count)| TemporalBucket {
                        period: period_key(start, granularity),
                        date: start,
                        count,
                    })
                    .collect();
                (infra_type, buckets)
            })
            .collect();
        (data, self.combined)
    }
}
