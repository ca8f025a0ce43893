mod player;


pub use player::{PlayerCommand, PlayerEvent};

use std::time::{Duration, Instant};

use crate::progress::VideoProgressRecord;
use crate::progress::interval::{WatchedInterval, merge_intervals};
use crate::progress::metrics::{calculate_metrics, is_complete};
use crate::store::ProgressStores;

/// Cadence of the presentation refresh while playing.
pub const UI_REFRESH_INTERVAL: Duration = Duration::from_secs(5);

/// Skip-guard: the widest forward step a single position sample may cover.
/// Anything larger is a seek or a scrub, not watching.
pub const MAX_SAMPLE_STEP_SECONDS: u64 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Loading,
    Ready,
    Playing,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProgressSnapshot {
    pub video_id: String,
    pub duration_seconds: u64,
    pub position: u64,
    pub total_watched_seconds: u64,
    pub progress_percentage: f64,
    pub complete: bool,
}

#[derive(Debug, Default)]
pub struct SessionStart {
    pub resume_position: Option<u64>,
    pub warnings: Vec<String>,
}

#[derive(Debug, Default)]
pub struct SessionUpdate {
    pub command: Option<PlayerCommand>,
    pub saved: bool,
    pub warnings: Vec<String>,
}

#[derive(Debug)]
struct RefreshTick {
    next_due: Option<Instant>,
}

impl RefreshTick {
    fn disarmed() -> Self {
        Self { next_due: None }
    }

    fn arm(&mut self, now: Instant) {
        self.next_due = Some(now + UI_REFRESH_INTERVAL);
    }

    fn disarm(&mut self) {
        self.next_due = None;
    }

    fn fired(&mut self, now: Instant) -> bool {
        match self.next_due {
            Some(due) if now >= due => {
                self.next_due = Some(now + UI_REFRESH_INTERVAL);
                true
            }
            _ => false,
        }
    }
}

/// One player session for one video: turns the player's position signal into
/// watched intervals, applies the skip-guard, and drives incremental saves.
/// The interval set is owned exclusively by the session and kept merged at
/// all times.
pub struct PlaybackSession {
    video_id: String,
    duration_seconds: u64,
    state: SessionState,
    buffering: bool,
    last_position: u64,
    intervals: Vec<WatchedInterval>,
    resume_target: Option<u64>,
    tick: RefreshTick,
}

impl PlaybackSession {
    pub fn new(video_id: &str, duration_seconds: u64) -> Self {
        Self {
            video_id: video_id.to_string(),
            duration_seconds,
            state: SessionState::Idle,
            buffering: false,
            last_position: 0,
            intervals: Vec::new(),
            resume_target: None,
            tick: RefreshTick::disarmed(),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_buffering(&self) -> bool {
        self.buffering
    }

    /// Loads persisted progress and readies the session. Load trouble is
    /// reported as warnings, never as a failure: with nothing loadable the
    /// session starts from an empty record.
    pub fn start(&mut self, stores: &ProgressStores) -> SessionStart {
        self.state = SessionState::Loading;
        let outcome = stores.load(&self.video_id);
        let record = outcome
            .record
            .unwrap_or_else(|| VideoProgressRecord::empty(&self.video_id));

        self.intervals = record.watched_intervals.clone();
        self.resume_target = record.resume_position();
        self.last_position = self.resume_target.unwrap_or(0);
        self.buffering = false;
        self.state = SessionState::Ready;

        SessionStart {
            resume_position: self.resume_target,
            warnings: outcome.warnings,
        }
    }

    pub fn on_event(
        &mut self,
        event: PlayerEvent,
        now: Instant,
        stores: &ProgressStores,
    ) -> SessionUpdate {
        let mut update = SessionUpdate::default();
        if matches!(self.state, SessionState::Idle | SessionState::Loading) {
            return update;
        }

        match event {
            PlayerEvent::Ready => {
                // Resuming is a commanded seek; the matching Seek event moves
                // the reference position without counting anything as watched.
                if let Some(target) = self.resume_target.take()
                    && target > 0
                {
                    update.command = Some(PlayerCommand::SeekTo { seconds: target });
                }
            }
            PlayerEvent::Play => {
                self.state = SessionState::Playing;
                self.tick.arm(now);
            }
            PlayerEvent::Pause => {
                self.state = SessionState::Ready;
                self.tick.disarm();
            }
            PlayerEvent::Buffer => self.buffering = true,
            PlayerEvent::BufferEnd => self.buffering = false,
            PlayerEvent::Seek { seconds } => {
                self.last_position = floor_position(seconds);
            }
            PlayerEvent::Progress { played_seconds } => {
                return self.on_sample(played_seconds, stores);
            }
        }
        update
    }

    fn on_sample(&mut self, played_seconds: f64, stores: &ProgressStores) -> SessionUpdate {
        let mut update = SessionUpdate::default();
        if self.state != SessionState::Playing {
            return update;
        }

        let current = floor_position(played_seconds);
        if current == self.last_position {
            return update;
        }

        let candidate = WatchedInterval::new(self.last_position, current);
        self.last_position = current;

        let Some(candidate) = candidate else {
            // Position moved backwards; nothing new was watched.
            return update;
        };
        if candidate.seconds() > MAX_SAMPLE_STEP_SECONDS {
            // Forward discontinuity: skipped, not watched.
            return update;
        }

        let mut intervals = std::mem::take(&mut self.intervals);
        intervals.push(candidate);
        self.intervals = merge_intervals(intervals);

        let record = VideoProgressRecord::from_intervals(
            &self.video_id,
            self.intervals.clone(),
            candidate.end,
            self.duration_seconds,
        );
        let outcome = stores.save(&record, self.duration_seconds);
        update.saved = outcome.fully_saved();
        update.warnings = outcome.warnings;
        update
    }

    /// Presentation tick: reports a fresh snapshot when the refresh interval
    /// has elapsed while playing. Never touches the interval set.
    pub fn poll_refresh(&mut self, now: Instant) -> Option<ProgressSnapshot> {
        self.tick.fired(now).then(|| self.snapshot())
    }

    /// Tears the session down. No further samples are accepted and no further
    /// saves are issued until `start` runs again.
    pub fn stop(&mut self) {
        self.state = SessionState::Idle;
        self.buffering = false;
        self.resume_target = None;
        self.tick.disarm();
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        let metrics = calculate_metrics(&self.intervals, self.duration_seconds);
        ProgressSnapshot {
            video_id: self.video_id.clone(),
            duration_seconds: self.duration_seconds,
            position: self.last_position,
            total_watched_seconds: metrics.total_watched_seconds,
            progress_percentage: metrics.progress_percentage,
            complete: is_complete(metrics.progress_percentage),
        }
    }

    pub fn watched_intervals(&self) -> &[WatchedInterval] {
        &self.intervals
    }
}

fn floor_position(seconds: f64) -> u64 {
    seconds.max(0.0).floor() as u64
}
