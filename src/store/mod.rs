mod local;
mod remote;


pub use local::LocalStore;
pub use remote::{RemoteConfig, RemoteStore};

use std::path::Path;

use anyhow::Result;
use chrono::Utc;

use crate::auth::Identity;
use crate::progress::VideoProgressRecord;

/// One progress backend. Both implementations expose the same semantics:
/// `load` answers "no record yet" with `Ok(None)`, and `save` is an upsert.
pub trait ProgressStore {
    fn load(&self, video_id: &str) -> Result<Option<VideoProgressRecord>>;
    fn save(&self, record: &VideoProgressRecord) -> Result<()>;
    fn name(&self) -> &'static str;
}

#[derive(Debug, Default)]
pub struct LoadOutcome {
    pub record: Option<VideoProgressRecord>,
    pub warnings: Vec<String>,
}

#[derive(Debug, Default)]
pub struct SaveOutcome {
    pub warnings: Vec<String>,
}

impl SaveOutcome {
    pub fn fully_saved(&self) -> bool {
        self.warnings.is_empty()
    }
}

/// Primary backend plus an optional write-through mirror. Load and save never
/// fail; backend trouble degrades silently and comes back as warnings for the
/// host to surface.
pub struct ProgressStores {
    primary: Box<dyn ProgressStore>,
    mirror: Option<Box<dyn ProgressStore>>,
}

impl ProgressStores {
    /// Backend selection policy: with an identity and a reachable service
    /// configuration, the durable store is authoritative and every save is
    /// mirrored into the local cache so resume keeps working offline.
    /// Otherwise everything runs against the local cache alone.
    pub fn select(
        identity: Option<Identity>,
        remote_config: Option<RemoteConfig>,
        cache_path: &Path,
    ) -> Result<Self> {
        let local = LocalStore::open(cache_path)?;
        match (identity, remote_config) {
            (Some(identity), Some(config)) => Ok(Self {
                primary: Box::new(RemoteStore::new(config, identity)),
                mirror: Some(Box::new(local)),
            }),
            _ => Ok(Self {
                primary: Box::new(local),
                mirror: None,
            }),
        }
    }

    pub fn from_backends(
        primary: Box<dyn ProgressStore>,
        mirror: Option<Box<dyn ProgressStore>>,
    ) -> Self {
        Self { primary, mirror }
    }

    pub fn load(&self, video_id: &str) -> LoadOutcome {
        let mut warnings = Vec::new();
        match self.primary.load(video_id) {
            Ok(Some(record)) => {
                return LoadOutcome {
                    record: Some(record),
                    warnings,
                };
            }
            Ok(None) => {}
            Err(err) => warnings.push(format!("{} load failed: {err:#}", self.primary.name())),
        }

        if let Some(mirror) = &self.mirror {
            match mirror.load(video_id) {
                Ok(record) => return LoadOutcome { record, warnings },
                Err(err) => warnings.push(format!("{} load failed: {err:#}", mirror.name())),
            }
        }

        LoadOutcome {
            record: None,
            warnings,
        }
    }

    /// Upserts the record into every configured backend. Derived fields are
    /// rebuilt from the supplied interval set before writing; caller-supplied
    /// totals are never trusted.
    pub fn save(&self, record: &VideoProgressRecord, duration_seconds: u64) -> SaveOutcome {
        let mut canonical = VideoProgressRecord::from_intervals(
            &record.video_id,
            record.watched_intervals.clone(),
            record.last_position,
            duration_seconds,
        );
        canonical.updated_at = Some(Utc::now().to_rfc3339());

        let mut warnings = Vec::new();
        if let Err(err) = self.primary.save(&canonical) {
            warnings.push(format!("{} save failed: {err:#}", self.primary.name()));
        }
        if let Some(mirror) = &self.mirror
            && let Err(err) = mirror.save(&canonical)
        {
            warnings.push(format!("{} save failed: {err:#}", mirror.name()));
        }
        SaveOutcome { warnings }
    }
}
