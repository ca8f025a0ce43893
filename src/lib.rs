mod auth;
mod db;
mod http;
mod paths;

pub mod progress;
pub mod session;
pub mod store;
pub mod summary;

pub use auth::Identity;
pub use paths::cache_file_path;
pub use progress::VideoProgressRecord;
pub use progress::interval::{WatchedInterval, merge_intervals};
pub use progress::metrics::{
    COMPLETION_THRESHOLD_PERCENT, ProgressMetrics, calculate_metrics, format_watch_time,
    is_complete,
};
pub use session::{
    MAX_SAMPLE_STEP_SECONDS, PlaybackSession, PlayerCommand, PlayerEvent, ProgressSnapshot,
    SessionStart, SessionState, SessionUpdate, UI_REFRESH_INTERVAL,
};
pub use store::{
    LoadOutcome, LocalStore, ProgressStore, ProgressStores, RemoteConfig, RemoteStore, SaveOutcome,
};
pub use summary::{
    CourseProgressSummary, Playlist, PlaylistSummary, PlaylistVideo, VideoSummary,
    summarize_playlists,
};
