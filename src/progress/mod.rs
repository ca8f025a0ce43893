pub mod interval;
pub mod metrics;

use serde_json::{Value, json};

pub use self::interval::WatchedInterval;
use self::interval::merge_intervals;
use self::metrics::calculate_metrics;

/// Persisted progress state for one video. `total_watched_seconds` and
/// `progress_percentage` are views over `watched_intervals`; the constructors
/// below are the only places they are computed, so a record can never hold
/// totals that disagree with its interval set.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoProgressRecord {
    pub video_id: String,
    pub watched_intervals: Vec<WatchedInterval>,
    pub total_watched_seconds: u64,
    pub progress_percentage: f64,
    pub last_position: u64,
    pub updated_at: Option<String>,
}

impl VideoProgressRecord {
    pub fn empty(video_id: &str) -> Self {
        Self {
            video_id: video_id.to_string(),
            watched_intervals: Vec::new(),
            total_watched_seconds: 0,
            progress_percentage: 0.0,
            last_position: 0,
            updated_at: None,
        }
    }

    pub fn from_intervals(
        video_id: &str,
        intervals: Vec<WatchedInterval>,
        last_position: u64,
        duration_seconds: u64,
    ) -> Self {
        let merged = merge_intervals(intervals);
        let metrics = calculate_metrics(&merged, duration_seconds);
        Self {
            video_id: video_id.to_string(),
            watched_intervals: merged,
            total_watched_seconds: metrics.total_watched_seconds,
            progress_percentage: metrics.progress_percentage,
            last_position,
            updated_at: None,
        }
    }

    /// Rebuilds a record parsed back from storage. The duration is not
    /// available here, so the stored percentage is kept (clamped), while the
    /// watched total is recomputed from the interval set.
    pub(crate) fn from_stored(
        video_id: &str,
        intervals: Vec<WatchedInterval>,
        progress_percentage: f64,
        last_position: u64,
        updated_at: Option<String>,
    ) -> Self {
        let merged = merge_intervals(intervals);
        let total_watched_seconds = merged.iter().map(WatchedInterval::seconds).sum();
        Self {
            video_id: video_id.to_string(),
            watched_intervals: merged,
            total_watched_seconds,
            progress_percentage: progress_percentage.clamp(0.0, 100.0),
            last_position,
            updated_at,
        }
    }

    /// Offset the player should resume from: the furthest watched position,
    /// falling back to the persisted playback offset.
    pub fn resume_position(&self) -> Option<u64> {
        let furthest = self.watched_intervals.iter().map(|interval| interval.end).max();
        match furthest {
            Some(end) => Some(end),
            None if self.last_position > 0 => Some(self.last_position),
            None => None,
        }
    }

    pub fn is_complete(&self) -> bool {
        metrics::is_complete(self.progress_percentage)
    }
}

pub(crate) fn intervals_to_value(intervals: &[WatchedInterval]) -> Value {
    Value::Array(
        intervals
            .iter()
            .map(|interval| json!({ "start": interval.start, "end": interval.end }))
            .collect(),
    )
}

/// Tolerant interval extraction for stored records: malformed or degenerate
/// entries are dropped rather than failing the whole record.
pub(crate) fn parse_interval_entries(value: Option<&Value>) -> Vec<WatchedInterval> {
    let Some(entries) = value.and_then(Value::as_array) else {
        return Vec::new();
    };

    entries
        .iter()
        .filter_map(|entry| {
            let start = entry.get("start")?.as_u64()?;
            let end = entry.get("end")?.as_u64()?;
            WatchedInterval::new(start, end)
        })
        .collect()
}
