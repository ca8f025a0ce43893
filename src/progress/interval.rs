/// Half-open range `[start, end)` of playback time confirmed as watched,
/// in whole seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatchedInterval {
    pub start: u64,
    pub end: u64,
}

impl WatchedInterval {
    /// Rejects degenerate and inverted ranges; everything downstream may
    /// assume `end > start`.
    pub fn new(start: u64, end: u64) -> Option<Self> {
        (end > start).then_some(Self { start, end })
    }

    pub fn seconds(&self) -> u64 {
        self.end - self.start
    }
}

/// Normalizes an interval set to its minimal sorted, non-overlapping form.
/// Touching intervals (`a.end == b.start`) are fused as well, so no two
/// entries of the result satisfy `a.end >= b.start`. Idempotent.
pub fn merge_intervals(intervals: Vec<WatchedInterval>) -> Vec<WatchedInterval> {
    if intervals.len() <= 1 {
        return intervals;
    }

    let mut sorted = intervals;
    sorted.sort_by_key(|interval| interval.start);

    let mut merged = Vec::with_capacity(sorted.len());
    let mut current = sorted[0];
    for interval in sorted.into_iter().skip(1) {
        if current.end >= interval.start {
            current.end = current.end.max(interval.end);
        } else {
            merged.push(current);
            current = interval;
        }
    }
    merged.push(current);
    merged
}
