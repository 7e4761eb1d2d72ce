#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Temporal analytics request and result types.
//!
//! The report field names (`total_collectes`, `moyenne_periode`, …) are
//! part of the wire contract with the survey dashboard and are kept as-is.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use piste_map_infra_models::InfrastructureType;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Calendar granularity for period bucketing.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TimeGranularity {
    /// One bucket per calendar day.
    Day,
    /// One bucket per ISO week (Monday start).
    Week,
    /// One bucket per calendar month.
    #[default]
    Month,
    /// One bucket per calendar year.
    Year,
}

/// A temporal analytics request, already past query-string decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemporalRequest {
    /// Bucketing granularity.
    pub granularity: TimeGranularity,
    /// Raw type tokens from the client; aliases allowed, unknowns ignored.
    /// Empty means the full catalog.
    pub types: Vec<String>,
    /// Window length ending today, used when no explicit range is given.
    pub days_back: i64,
    /// Explicit window start; only honored together with `date_to`.
    pub date_from: Option<NaiveDate>,
    /// Explicit window end.
    pub date_to: Option<NaiveDate>,
    /// Specific-period shortcut: a year…
    pub year: Option<i32>,
    /// …optionally narrowed to a month…
    pub month: Option<u32>,
    /// …optionally narrowed to a day.
    pub day: Option<u32>,
}

impl Default for TemporalRequest {
    fn default() -> Self {
        Self {
            granularity: TimeGranularity::default(),
            types: Vec::new(),
            days_back: 365,
            date_from: None,
            date_to: None,
            year: None,
            month: None,
            day: None,
        }
    }
}

/// One period's record count for one infrastructure type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemporalBucket {
    /// Canonical, lexicographically-sortable period key.
    pub period: String,
    /// First calendar day of the period, for client-side axes.
    pub date: NaiveDate,
    /// Number of records created in the period.
    pub count: u64,
}

/// Summary metrics over the combined per-period totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemporalMetrics {
    /// Sum of all period counts.
    pub total_collectes: u64,
    /// Mean count per period, one decimal.
    pub moyenne_periode: f64,
    /// Largest period count (0 when there are no periods).
    pub pic_maximum: u64,
    /// Smallest period count (0 when there are no periods).
    pub pic_minimum: u64,
    /// Number of distinct periods.
    pub nb_periodes: usize,
    /// First-half vs second-half percentage trend, one decimal.
    pub tendance: f64,
}

/// Per-type parsing and fetch diagnostics.
///
/// A record whose date fails to parse is excluded from bucketing but still
/// counted here; the counters make "why is this type empty" answerable
/// without a debugger.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TypeDiagnostics {
    /// Records fetched for the type.
    pub total_records: u64,
    /// Records whose creation date parsed to a calendar date.
    pub valid_dates: u64,
    /// Valid dates that fell inside the requested window.
    pub in_range_dates: u64,
    /// Records whose date was unparsable or out of the validity window.
    pub error_count: u64,
    /// Distinct periods found for the type.
    pub periods_found: usize,
    /// Set when the type's fetch itself failed; the type contributed
    /// nothing to the report.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fetch_error: Option<String>,
}

/// Echo of the analyzed window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodInfo {
    /// Granularity used.
    #[serde(rename = "type")]
    pub granularity: TimeGranularity,
    /// Inclusive window start.
    pub start_date: NaiveDate,
    /// Inclusive window end.
    pub end_date: NaiveDate,
    /// Number of types with at least one bucket.
    pub total_types: usize,
}

/// The full temporal analytics report for one request.
///
/// Ephemeral and request-scoped; assembled once and serialized to the
/// client, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemporalReport {
    /// Ascending, unique-keyed bucket sequences per type, in catalog order.
    pub data: BTreeMap<InfrastructureType, Vec<TemporalBucket>>,
    /// Combined counts per period key, summed across all types.
    pub total_by_period: BTreeMap<String, u64>,
    /// Summary metrics over `total_by_period` in chronological order.
    pub metrics: TemporalMetrics,
    /// Echo of the analyzed window.
    pub period_info: PeriodInfo,
    /// Per-type diagnostics, including types that produced no buckets.
    pub debug_details: BTreeMap<InfrastructureType, TypeDiagnostics>,
}
