use crate::config::PacingConfig;
use crate::time::{FrameStats, FrameTime};

/// Per-iteration context passed to `core::App::on_frame`.
pub struct FrameCtx<'a> {
    pub time:   FrameTime,
    /// Rolling statistics up to and including the previous iteration.
    pub stats:  &'a FrameStats,
    /// Pacing targets. The app is the only writer; the runtime reads them once
    /// `on_frame` returns.
    pub pacing: &'a mut PacingConfig,
}

impl<'a> FrameCtx<'a> {
    /// Average ms/frame and FPS, the readout a host usually shows next to the
    /// pacing controls.
    pub fn average(&self) -> (f64, f64) {
        (self.stats.average_ms(), self.stats.fps())
    }
}
