use std::time::{Duration, Instant};

/// Snapshot taken at the top of a loop iteration.
#[derive(Debug, Copy, Clone)]
pub struct FrameTime {
    /// Monotonic timestamp captured at iteration entry. Both pacing waits are
    /// measured from here.
    pub start: Instant,

    /// Full duration of the previous iteration, waits included.
    ///
    /// Zero on the first iteration.
    pub dt: Duration,

    /// Monotonic frame counter.
    pub frame_index: u64,
}

impl FrameTime {
    /// Time elapsed since this iteration began.
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

/// Stamps loop iterations.
///
/// Unlike a simulation clock, `dt` is not clamped: pacing needs the raw period
/// to report what the loop actually did.
#[derive(Debug, Clone, Default)]
pub struct FrameClock {
    last_start: Option<Instant>,
    frame_index: u64,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forgets the previous iteration so the next `dt` reads zero.
    ///
    /// Useful when resuming a loop after it was parked.
    pub fn reset(&mut self) {
        self.last_start = None;
    }

    /// Number of iterations begun so far.
    pub fn frames_begun(&self) -> u64 {
        self.frame_index
    }

    /// Begins an iteration and returns its `FrameTime`.
    pub fn begin(&mut self) -> FrameTime {
        let start = Instant::now();
        let dt = self
            .last_start
            .map(|last| start.saturating_duration_since(last))
            .unwrap_or(Duration::ZERO);

        self.last_start = Some(start);

        let ft = FrameTime {
            start,
            dt,
            frame_index: self.frame_index,
        };

        self.frame_index = self.frame_index.wrapping_add(1);

        ft
    }
}
