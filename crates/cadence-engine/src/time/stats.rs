use std::time::Duration;

/// Number of iterations averaged by [`FrameStats`].
pub const STATS_WINDOW: usize = 60;

/// Rolling frame-duration statistics over the last [`STATS_WINDOW`] iterations.
#[derive(Debug, Clone)]
pub struct FrameStats {
    samples: [Duration; STATS_WINDOW],
    next: usize,
    len: usize,
    sum: Duration,
}

impl FrameStats {
    pub fn new() -> Self {
        Self {
            samples: [Duration::ZERO; STATS_WINDOW],
            next: 0,
            len: 0,
            sum: Duration::ZERO,
        }
    }

    /// Records one iteration's duration, evicting the oldest sample once full.
    pub fn record(&mut self, frame: Duration) {
        if self.len == STATS_WINDOW {
            self.sum -= self.samples[self.next];
        } else {
            self.len += 1;
        }

        self.samples[self.next] = frame;
        self.sum += frame;
        self.next = (self.next + 1) % STATS_WINDOW;
    }

    /// Number of samples currently in the window.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Mean frame duration, or zero when nothing has been recorded.
    pub fn average(&self) -> Duration {
        if self.len == 0 {
            return Duration::ZERO;
        }
        self.sum / self.len as u32
    }

    /// Mean frame duration in milliseconds.
    pub fn average_ms(&self) -> f64 {
        self.average().as_secs_f64() * 1000.0
    }

    /// Frame rate implied by the mean duration. Zero when empty.
    pub fn fps(&self) -> f64 {
        let avg = self.average().as_secs_f64();
        if avg > 0.0 { 1.0 / avg } else { 0.0 }
    }

    pub fn clear(&mut self) {
        *self = Self::new();
    }
}

impl Default for FrameStats {
    fn default() -> Self {
        Self::new()
    }
}
