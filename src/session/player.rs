/// Callback surface of the embeddable player, mirrored as plain events. The
/// engine never drives playback itself; it only reacts to what the player
/// reports and occasionally answers with a command.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlayerEvent {
    Ready,
    Play,
    Pause,
    Progress { played_seconds: f64 },
    Seek { seconds: f64 },
    Buffer,
    BufferEnd,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerCommand {
    SeekTo { seconds: u64 },
}
