//! Creation-date parsing over the two storage shapes.
//!
//! Most survey tables stored creation dates as free text written by the
//! field tablets, usually `YYYY/MM/DD HH:MM:SS.mmm` but sometimes
//! `YYYY-MM-DD`, empty, or a literal `"null"`. Only pistes carry a native
//! timestamp. A parse failure is not an error to the caller — it means
//! "exclude this record from bucketing", counted in diagnostics.

use chrono::NaiveDate;
use piste_map_infra_models::CreatedAt;

/// Lower bound of the accepted year range.
///
/// The closed 2020–2030 window is a deliberate domain bound matching the
/// survey project's timeframe, not a general-purpose parser limitation.
/// Years outside it are always invalid.
pub const MIN_VALID_YEAR: i32 = 2020;

/// Upper bound of the accepted year range.
pub const MAX_VALID_YEAR: i32 = 2030;

/// Extracts the calendar date from a stored creation date.
///
/// Native timestamps always succeed with their date component; text values
/// go through [`parse_text`]; missing values yield `None`.
#[must_use]
pub fn parse_created(created: &CreatedAt) -> Option<NaiveDate> {
    match created {
        CreatedAt::Missing => None,
        CreatedAt::Timestamp(dt) => Some(dt.date()),
        CreatedAt::Text(raw) => parse_text(raw),
    }
}

/// Parses a free-text stored date into a calendar date.
///
/// Rules, in order: reject empty/whitespace-only/literal `null`/`none`
/// (case-insensitive); a value containing `/` is `YYYY/MM/DD` with any
/// time-of-day after the first space dropped; otherwise a value containing
/// `-` is `YYYY-MM-DD` with the same split; anything else is `None`. The
/// date must be calendar-valid and inside the 2020–2030 window.
#[must_use]
pub fn parse_text(raw: &str) -> Option<NaiveDate> {
    let cleaned = raw.trim();
    if cleaned.is_empty() || cleaned.eq_ignore_ascii_case("null") || cleaned.eq_ignore_ascii_case("none")
    {
        return None;
    }

    let separator = if cleaned.contains('/') {
        '/'
    } else if cleaned.contains('-') {
        '-'
    } else {
        return None;
    };

    // Date portion only; anything after the first space is time-of-day.
    let date_part = cleaned.split(' ').next().unwrap_or(cleaned);
    let mut parts = date_part.split(separator);
    let year: i32 = parts.next()?.parse().ok()?;
    let month: u32 = parts.next()?.parse().ok()?;
    let day: u32 = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }

    if !(MIN_VALID_YEAR..=MAX_VALID_YEAR).contains(&year) {
        return None;
    }
    NaiveDate::from_ymd_opt(year, month, day)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn slash_format_with_time_of_day() {
        assert_eq!(
            parse_text("2025/02/28 21:49:55.000"),
            Some(date(2025, 2, 28))
        );
        assert_eq!(parse_text("2024/1/5"), Some(date(2024, 1, 5)));
    }

    #[test]
    fn dash_format() {
        assert_eq!(parse_text("2024-03-15"), Some(date(2024, 3, 15)));
        assert_eq!(parse_text("2024-03-15 08:00:00"), Some(date(2024, 3, 15)));
    }

    #[test]
    fn rejects_empty_and_null_markers() {
        for raw in ["", "   ", "null", "NULL", "None", "none"] {
            assert_eq!(parse_text(raw), None, "{raw:?}");
        }
    }

    #[test]
    fn rejects_unknown_shapes() {
        for raw in ["N/A", "15.03.2024", "yesterday", "2024", "2024/01"] {
            assert_eq!(parse_text(raw), None, "{raw:?}");
        }
    }

    #[test]
    fn rejects_invalid_calendar_dates() {
        assert_eq!(parse_text("2025/13/01"), None);
        assert_eq!(parse_text("2025/02/30"), None);
        assert_eq!(parse_text("2025/00/10"), None);
    }

    #[test]
    fn year_window_is_a_closed_domain_bound() {
        // 2020–2030 matches the survey project's timeframe; out-of-range
        // years are always rejected, by design.
        assert_eq!(parse_text("2019/12/31"), None);
        assert_eq!(parse_text("2031/01/01"), None);
        assert_eq!(parse_text("2020/01/01"), Some(date(2020, 1, 1)));
        assert_eq!(parse_text("2030/12/31"), Some(date(2030, 12, 31)));
    }

    #[test]
    fn timestamp_shape_always_yields_its_date() {
        let dt: NaiveDateTime = date(2024, 6, 1).and_hms_opt(23, 59, 59).unwrap();
        assert_eq!(parse_created(&CreatedAt::Timestamp(dt)), Some(date(2024, 6, 1)));
        assert_eq!(parse_created(&CreatedAt::Missing), None);
        assert_eq!(
            parse_created(&CreatedAt::Text("2024/06/01".into())),
            Some(date(2024, 6, 1))
        );
    }

    #[test]
    fn leap_day_validity_depends_on_year() {
        assert_eq!(parse_text("2024/02/29"), Some(date(2024, 2, 29)));
        assert_eq!(parse_text("2025/02/29"), None);
    }
}
