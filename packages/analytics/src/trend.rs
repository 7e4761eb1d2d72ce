//! Summary metrics over a chronologically-ordered count sequence.
//!
//! The trend is a simple two-window comparison — the mean of the second
//! half of the sequence against the mean of the first half, as a
//! percentage — not a regression. Keep it that way: the dashboard's
//! "tendance" figure is defined by this exact computation.

use piste_map_analytics_models::TemporalMetrics;

/// Computes all summary metrics for a sequence of per-period counts in
/// chronological order.
#[must_use]
pub fn summarize(counts: &[u64]) -> TemporalMetrics {
    let total: u64 = counts.iter().sum();
    let periods = counts.len();
    #[allow(clippy::cast_precision_loss)]
    let mean = round1(total as f64 / periods.max(1) as f64);

    TemporalMetrics {
        total_collectes: total,
        moyenne_periode: mean,
        pic_maximum: counts.iter().copied().max().unwrap_or(0),
        pic_minimum: counts.iter().copied().min().unwrap_or(0),
        nb_periodes: periods,
        tendance: trend_percent(counts),
    }
}

/// First-half vs second-half percentage trend.
///
/// Fewer than two periods yield 0. On odd lengths the first half takes the
/// extra element. A zero first-half mean yields 100 when the second half
/// has any activity, else 0.
#[must_use]
pub fn trend_percent(counts: &[u64]) -> f64 {
    if counts.len() < 2 {
        return 0.0;
    }

    let mid = counts.len().div_ceil(2);
    let first_mean = mean(&counts[..mid]);
    let second_mean = mean(&counts[mid..]);

    if first_mean == 0.0 {
        return if second_mean > 0.0 { 100.0 } else { 0.0 };
    }
    round1((second_mean - first_mean) / first_mean * 100.0)
}

#[allow(clippy::cast_precision_loss)]
fn mean(counts: &[u64]) -> f64 {
    if counts.is_empty() {
        return 0.0;
    }
    counts.iter().sum::<u64>() as f64 / counts.len() as f64
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_sequence_is_all_zeros() {
        let metrics = summarize(&[]);
        assert_eq!(metrics.total_collectes, 0);
        assert!((metrics.moyenne_periode - 0.0).abs() < f64::EPSILON);
        assert_eq!(metrics.pic_maximum, 0);
        assert_eq!(metrics.pic_minimum, 0);
        assert_eq!(metrics.nb_periodes, 0);
        assert!((metrics.tendance - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn single_period_has_no_trend() {
        let metrics = summarize(&[7]);
        assert_eq!(metrics.total_collectes, 7);
        assert!((metrics.moyenne_periode - 7.0).abs() < f64::EPSILON);
        assert!((metrics.tendance - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn growing_sequence_has_positive_trend() {
        // Halves [1, 2] and [4, 8]: means 1.5 and 6 → +300%.
        assert!((trend_percent(&[1, 2, 4, 8]) - 300.0).abs() < f64::EPSILON);
    }

    #[test]
    fn shrinking_sequence_has_negative_trend() {
        // Halves [8, 4] and [2, 1]: means 6 and 1.5 → -75%.
        assert!((trend_percent(&[8, 4, 2, 1]) - (-75.0)).abs() < f64::EPSILON);
    }

    #[test]
    fn odd_length_gives_the_extra_element_to_the_first_half() {
        // Halves [2, 2] and [8]: means 2 and 8 → +300%.
        assert!((trend_percent(&[2, 2, 8]) - 300.0).abs() < f64::EPSILON);
    }

    #[test]
    fn zero_first_half_saturates_at_100() {
        assert!((trend_percent(&[0, 0, 5, 5]) - 100.0).abs() < f64::EPSILON);
        assert!((trend_percent(&[0, 0, 0, 0]) - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn results_are_rounded_to_one_decimal() {
        // Halves [3] and [4]: (4 - 3) / 3 × 100 = 33.333… → 33.3.
        assert!((trend_percent(&[3, 4]) - 33.3).abs() < f64::EPSILON);
        let metrics = summarize(&[1, 2]);
        assert!((metrics.moyenne_periode - 1.5).abs() < f64::EPSILON);
    }
}
