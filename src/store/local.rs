use std::path::Path;

use anyhow::{Context, Result};
use serde_json::{Value, json};

use crate::db::CacheDatabase;
use crate::progress::{VideoProgressRecord, intervals_to_value, parse_interval_entries};

use super::ProgressStore;

/// Per-video fallback cache. Single-user by construction: records are keyed
/// by video alone, under the same namespaced key and JSON shape the hosting
/// app uses for its client-side cache.
pub struct LocalStore {
    db: CacheDatabase,
}

impl LocalStore {
    pub fn open(path: &Path) -> Result<Self> {
        let db = CacheDatabase::open(path)?;
        db.migrate()?;
        Ok(Self { db })
    }

    pub fn open_in_memory() -> Result<Self> {
        let db = CacheDatabase::open_in_memory()?;
        db.migrate()?;
        Ok(Self { db })
    }
}

impl ProgressStore for LocalStore {
    fn load(&self, video_id: &str) -> Result<Option<VideoProgressRecord>> {
        let Some(raw) = self.db.record_json(&cache_key(video_id))? else {
            return Ok(None);
        };
        let value: Value = serde_json::from_str(&raw)
            .with_context(|| format!("malformed cached progress for video {video_id}"))?;
        Ok(record_from_cache_value(&value))
    }

    fn save(&self, record: &VideoProgressRecord) -> Result<()> {
        let payload = record_to_cache_value(record).to_string();
        self.db
            .upsert_record(&cache_key(&record.video_id), &record.video_id, &payload)
    }

    fn name(&self) -> &'static str {
        "local cache"
    }
}

pub(crate) fn cache_key(video_id: &str) -> String {
    format!("video-progress-{video_id}")
}

pub(crate) fn record_to_cache_value(record: &VideoProgressRecord) -> Value {
    json!({
        "videoId": record.video_id,
        "watchedIntervals": intervals_to_value(&record.watched_intervals),
        "totalWatchedSeconds": record.total_watched_seconds,
        "progressPercentage": record.progress_percentage,
        "lastPosition": record.last_position,
        "updatedAt": record.updated_at,
    })
}

pub(crate) fn record_from_cache_value(value: &Value) -> Option<VideoProgressRecord> {
    let video_id = value.get("videoId")?.as_str()?.trim();
    if video_id.is_empty() {
        return None;
    }

    let intervals = parse_interval_entries(value.get("watchedIntervals"));
    let progress_percentage = value
        .get("progressPercentage")
        .and_then(Value::as_f64)
        .unwrap_or(0.0);
    let last_position = value
        .get("lastPosition")
        .and_then(Value::as_u64)
        .unwrap_or(0);
    let updated_at = value
        .get("updatedAt")
        .and_then(Value::as_str)
        .map(str::to_string);

    Some(VideoProgressRecord::from_stored(
        video_id,
        intervals,
        progress_percentage,
        last_position,
        updated_at,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::WatchedInterval;

    fn interval(start: u64, end: u64) -> WatchedInterval {
        WatchedInterval::new(start, end).expect("test interval should be valid")
    }

    #[test]
    fn cache_key_is_namespaced_per_video() {
        assert_eq!(cache_key("abc-123"), "video-progress-abc-123");
    }

    #[test]
    fn save_then_load_round_trips_through_the_cache() {
        let store = LocalStore::open_in_memory().expect("in-memory store should open");
        let mut record = VideoProgressRecord::from_intervals(
            "video-1",
            vec![interval(0, 8), interval(10, 12)],
            12,
            20,
        );
        record.updated_at = Some("2026-08-01T10:00:00+00:00".to_string());

        store.save(&record).expect("save should succeed");
        let loaded = store
            .load("video-1")
            .expect("load should succeed")
            .expect("record should be present");
        assert_eq!(loaded, record);
    }

    #[test]
    fn load_is_absent_for_unknown_video() {
        let store = LocalStore::open_in_memory().expect("in-memory store should open");
        let loaded = store.load("missing").expect("load should succeed");
        assert!(loaded.is_none());
    }

    #[test]
    fn cache_value_uses_the_client_side_field_names() {
        let record = VideoProgressRecord::from_intervals("video-1", vec![interval(3, 5)], 5, 10);
        let value = record_to_cache_value(&record);
        assert_eq!(value.get("videoId").and_then(Value::as_str), Some("video-1"));
        assert_eq!(
            value.pointer("/watchedIntervals/0/start").and_then(Value::as_u64),
            Some(3)
        );
        assert_eq!(
            value.get("totalWatchedSeconds").and_then(Value::as_u64),
            Some(2)
        );
        assert_eq!(value.get("lastPosition").and_then(Value::as_u64), Some(5));
    }

    #[test]
    fn parsed_records_drop_bad_intervals_and_recompute_totals() {
        let value = json!({
            "videoId": "video-1",
            "watchedIntervals": [
                { "start": 0, "end": 4 },
                { "start": 2, "end": 6 },
                { "start": 9, "end": 9 }
            ],
            "totalWatchedSeconds": 999,
            "progressPercentage": 30.0,
            "lastPosition": 6
        });

        let record = record_from_cache_value(&value).expect("record should parse");
        assert_eq!(record.watched_intervals, vec![interval(0, 6)]);
        assert_eq!(record.total_watched_seconds, 6);
        assert_eq!(record.progress_percentage, 30.0);
    }

    #[test]
    fn records_without_a_video_id_are_treated_as_absent() {
        assert!(record_from_cache_value(&json!({ "watchedIntervals": [] })).is_none());
        assert!(record_from_cache_value(&json!({ "videoId": "  " })).is_none());
    }
}
