use super::interval::WatchedInterval;

/// Percentage at or above which a video counts as completed, shared by the
/// playback tracker and the playlist roll-ups.
pub const COMPLETION_THRESHOLD_PERCENT: f64 = 90.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressMetrics {
    pub total_watched_seconds: u64,
    pub progress_percentage: f64,
}

/// Derives unique watched seconds and a clamped percentage from a merged
/// interval set. A missing or zero duration is floored to one second so the
/// division stays defined.
pub fn calculate_metrics(intervals: &[WatchedInterval], duration_seconds: u64) -> ProgressMetrics {
    let total_watched_seconds: u64 = intervals.iter().map(WatchedInterval::seconds).sum();
    let denominator = duration_seconds.max(1);
    let progress_percentage = (total_watched_seconds as f64 / denominator as f64 * 100.0).min(100.0);
    ProgressMetrics {
        total_watched_seconds,
        progress_percentage,
    }
}

pub fn is_complete(progress_percentage: f64) -> bool {
    progress_percentage >= COMPLETION_THRESHOLD_PERCENT
}

pub fn format_watch_time(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let remaining = seconds % 60;
    if hours > 0 {
        format!("{hours}:{minutes:02}:{remaining:02}")
    } else {
        format!("{minutes}:{remaining:02}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::interval::merge_intervals;

    fn interval(start: u64, end: u64) -> WatchedInterval {
        WatchedInterval::new(start, end).expect("test interval should be valid")
    }

    #[test]
    fn calculates_totals_over_a_merged_set() {
        let metrics = calculate_metrics(&[interval(0, 8), interval(10, 12)], 20);
        assert_eq!(metrics.total_watched_seconds, 10);
        assert_eq!(metrics.progress_percentage, 50.0);
    }

    #[test]
    fn percentage_is_clamped_to_one_hundred() {
        let metrics = calculate_metrics(&[interval(0, 30)], 20);
        assert_eq!(metrics.total_watched_seconds, 30);
        assert_eq!(metrics.progress_percentage, 100.0);
    }

    #[test]
    fn zero_duration_never_divides_by_zero() {
        let metrics = calculate_metrics(&[interval(0, 2)], 0);
        assert_eq!(metrics.total_watched_seconds, 2);
        assert!(metrics.progress_percentage.is_finite());
        assert_eq!(metrics.progress_percentage, 100.0);
    }

    #[test]
    fn empty_set_is_zero_progress() {
        let metrics = calculate_metrics(&[], 120);
        assert_eq!(metrics.total_watched_seconds, 0);
        assert_eq!(metrics.progress_percentage, 0.0);
    }

    #[test]
    fn percentage_stays_in_range_for_arbitrary_merged_sets() {
        let merged = merge_intervals(vec![
            interval(0, 4),
            interval(2, 9),
            interval(40, 90),
            interval(89, 200),
        ]);
        for duration in [1, 7, 50, 500] {
            let metrics = calculate_metrics(&merged, duration);
            assert!((0.0..=100.0).contains(&metrics.progress_percentage));
        }
    }

    #[test]
    fn completion_uses_the_ninety_percent_threshold() {
        assert!(is_complete(90.0));
        assert!(is_complete(97.3));
        assert!(!is_complete(89.99));
    }

    #[test]
    fn formats_watch_time_with_and_without_hours() {
        assert_eq!(format_watch_time(0), "0:00");
        assert_eq!(format_watch_time(59), "0:59");
        assert_eq!(format_watch_time(61), "1:01");
        assert_eq!(format_watch_time(3600), "1:00:00");
        assert_eq!(format_watch_time(3725), "1:02:05");
    }
}
