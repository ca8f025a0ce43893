use crate::progress::metrics::is_complete;
use crate::store::ProgressStores;

#[derive(Debug, Clone)]
pub struct PlaylistVideo {
    pub id: String,
    pub title: String,
    pub duration_seconds: u64,
}

#[derive(Debug, Clone)]
pub struct Playlist {
    pub id: String,
    pub title: String,
    pub videos: Vec<PlaylistVideo>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VideoSummary {
    pub id: String,
    pub title: String,
    pub duration_seconds: u64,
    pub watched_seconds: u64,
    pub progress_percentage: f64,
    pub complete: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlaylistSummary {
    pub id: String,
    pub title: String,
    pub total_videos: usize,
    pub completed_videos: usize,
    pub total_duration_seconds: u64,
    pub watched_seconds: u64,
    /// Duration-weighted share of the playlist that has been watched.
    pub overall_percentage: f64,
    /// Mean of the recorded per-video percentages; zero when nothing has a
    /// record yet.
    pub average_percentage: f64,
    pub videos: Vec<VideoSummary>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CourseProgressSummary {
    pub playlists: Vec<PlaylistSummary>,
    pub total_videos: usize,
    pub completed_videos: usize,
    pub total_duration_seconds: u64,
    pub watched_seconds: u64,
    pub overall_percentage: f64,
    pub warnings: Vec<String>,
}

/// Rolls persisted progress up into per-playlist and cross-playlist totals.
/// Read-only: videos without a progress record count as zero progress, and
/// backend trouble surfaces as warnings rather than failing the roll-up.
pub fn summarize_playlists(playlists: &[Playlist], stores: &ProgressStores) -> CourseProgressSummary {
    let mut summary = CourseProgressSummary::default();

    for playlist in playlists {
        let mut out = PlaylistSummary {
            id: playlist.id.clone(),
            title: playlist.title.clone(),
            total_videos: playlist.videos.len(),
            completed_videos: 0,
            total_duration_seconds: 0,
            watched_seconds: 0,
            overall_percentage: 0.0,
            average_percentage: 0.0,
            videos: Vec::with_capacity(playlist.videos.len()),
        };
        let mut recorded_videos = 0_usize;
        let mut percentage_sum = 0.0;

        for video in &playlist.videos {
            out.total_duration_seconds += video.duration_seconds;

            let loaded = stores.load(&video.id);
            summary.warnings.extend(loaded.warnings);
            let (watched_seconds, progress_percentage) = match loaded.record {
                Some(record) => {
                    recorded_videos += 1;
                    percentage_sum += record.progress_percentage;
                    (record.total_watched_seconds, record.progress_percentage)
                }
                None => (0, 0.0),
            };

            out.watched_seconds += watched_seconds;
            let complete = is_complete(progress_percentage);
            if complete {
                out.completed_videos += 1;
            }
            out.videos.push(VideoSummary {
                id: video.id.clone(),
                title: video.title.clone(),
                duration_seconds: video.duration_seconds,
                watched_seconds,
                progress_percentage,
                complete,
            });
        }

        out.overall_percentage = percentage_of(out.watched_seconds, out.total_duration_seconds);
        out.average_percentage = if recorded_videos > 0 {
            percentage_sum / recorded_videos as f64
        } else {
            0.0
        };

        summary.total_videos += out.total_videos;
        summary.completed_videos += out.completed_videos;
        summary.total_duration_seconds += out.total_duration_seconds;
        summary.watched_seconds += out.watched_seconds;
        summary.playlists.push(out);
    }

    summary.overall_percentage =
        percentage_of(summary.watched_seconds, summary.total_duration_seconds);
    summary
}

fn percentage_of(watched_seconds: u64, total_seconds: u64) -> f64 {
    if total_seconds == 0 {
        0.0
    } else {
        watched_seconds as f64 / total_seconds as f64 * 100.0
    }
}
