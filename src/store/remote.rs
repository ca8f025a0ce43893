use std::env;
use std::time::Duration;

use anyhow::{Result, anyhow};
use serde_json::{Value, json};

use crate::auth::Identity;
use crate::http::{get_text_with_retries, post_json_with_retries};
use crate::progress::{VideoProgressRecord, intervals_to_value, parse_interval_entries};

use super::ProgressStore;

#[derive(Debug, Clone)]
pub struct RemoteConfig {
    pub base_url: String,
    pub api_key: String,
    pub connect_timeout: Duration,
    pub read_timeout: Duration,
    pub attempts: usize,
    pub retry_delay: Duration,
}

impl RemoteConfig {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            connect_timeout: Duration::from_secs(3),
            read_timeout: Duration::from_secs(6),
            attempts: 3,
            retry_delay: Duration::from_millis(500),
        }
    }

    pub fn from_env() -> Option<Self> {
        let base_url = env::var("VIEWTRACK_API_URL").ok()?;
        let api_key = env::var("VIEWTRACK_API_KEY").ok()?;
        if base_url.trim().is_empty() || api_key.trim().is_empty() {
            return None;
        }

        let mut config = Self::new(base_url.trim(), api_key.trim());
        if let Ok(raw) = env::var("VIEWTRACK_HTTP_ATTEMPTS")
            && let Ok(attempts) = raw.trim().parse::<usize>()
            && attempts > 0
        {
            config.attempts = attempts;
        }
        Some(config)
    }
}

/// Durable server-side store, keyed by (user, video). Speaks the progress
/// service's PostgREST-style row interface: filtered GETs return a JSON
/// array, writes are upserts on the (user_id, video_id) conflict target.
pub struct RemoteStore {
    config: RemoteConfig,
    identity: Identity,
}

impl RemoteStore {
    pub fn new(config: RemoteConfig, identity: Identity) -> Self {
        Self { config, identity }
    }

    fn table_url(&self) -> String {
        format!("{}/video_progress", self.config.base_url)
    }

    fn auth_headers(&self) -> Vec<(String, String)> {
        vec![
            ("apikey".to_string(), self.config.api_key.clone()),
            (
                "Authorization".to_string(),
                format!("Bearer {}", self.identity.access_token),
            ),
        ]
    }
}

impl ProgressStore for RemoteStore {
    fn load(&self, video_id: &str) -> Result<Option<VideoProgressRecord>> {
        let query = vec![
            ("user_id".to_string(), format!("eq.{}", self.identity.user_id)),
            ("video_id".to_string(), format!("eq.{video_id}")),
            ("select".to_string(), "*".to_string()),
        ];
        let raw = get_text_with_retries(
            &self.table_url(),
            &self.auth_headers(),
            &query,
            self.config.connect_timeout,
            self.config.read_timeout,
            self.config.attempts,
            self.config.retry_delay,
        )
        .map_err(|err| anyhow!("progress service load failed: {err}"))?;

        parse_first_remote_record(&raw)
            .map_err(|detail| anyhow!("progress service load failed: {detail}"))
    }

    fn save(&self, record: &VideoProgressRecord) -> Result<()> {
        let headers = {
            let mut headers = self.auth_headers();
            headers.push((
                "Prefer".to_string(),
                "resolution=merge-duplicates,return=minimal".to_string(),
            ));
            headers
        };
        let query = vec![("on_conflict".to_string(), "user_id,video_id".to_string())];
        let body = record_to_wire_value(record, &self.identity.user_id).to_string();

        post_json_with_retries(
            &self.table_url(),
            &headers,
            &query,
            &body,
            self.config.connect_timeout,
            self.config.read_timeout,
            self.config.attempts,
            self.config.retry_delay,
        )
        .map_err(|err| anyhow!("progress service save failed: {err}"))?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "progress service"
    }
}

pub(crate) fn record_to_wire_value(record: &VideoProgressRecord, user_id: &str) -> Value {
    json!({
        "user_id": user_id,
        "video_id": record.video_id,
        "watched_intervals": intervals_to_value(&record.watched_intervals),
        "total_watched_seconds": record.total_watched_seconds,
        "progress_percentage": record.progress_percentage,
        "last_position": record.last_position,
        "updated_at": record.updated_at,
    })
}

pub(crate) fn record_from_wire_value(value: &Value) -> Option<VideoProgressRecord> {
    let video_id = value.get("video_id")?.as_str()?.trim();
    if video_id.is_empty() {
        return None;
    }

    let intervals = parse_interval_entries(value.get("watched_intervals"));
    let progress_percentage = value
        .get("progress_percentage")
        .and_then(Value::as_f64)
        .unwrap_or(0.0);
    let last_position = value
        .get("last_position")
        .and_then(Value::as_u64)
        .unwrap_or(0);
    let updated_at = value
        .get("updated_at")
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

/// A filtered row query returns an array; an empty array means the record
/// does not exist yet, which is not an error.
pub(crate) fn parse_first_remote_record(
    raw: &str,
) -> Result<Option<VideoProgressRecord>, String> {
    let parsed: Value =
        serde_json::from_str(raw).map_err(|err| format!("malformed JSON response: {err}"))?;
    let rows = parsed
        .as_array()
        .ok_or_else(|| "expected a JSON array response".to_string())?;
    Ok(rows.first().and_then(record_from_wire_value))
}
