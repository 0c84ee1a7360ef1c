//! Pacing configuration.
//!
//! `PacingConfig` is the value the host UI writes and the runtime reads once per
//! iteration. Setters clamp into the ranges a UI exposes, so anything that reaches
//! the pacer is already valid.

use std::fmt;
use std::num::NonZeroU32;
use std::ops::RangeInclusive;
use std::time::Duration;

use crate::time::{fps_to_frame_duration, ms_to_duration, DEFAULT_SLEEP_MARGIN};

/// Fixed frame time range exposed to users, in milliseconds.
pub const FRAME_TIME_RANGE_MS: RangeInclusive<f32> = 0.0..=150.0;

/// Frame-rate cap range exposed to users.
pub const FPS_CAP_RANGE: RangeInclusive<u32> = 1..=400;

/// Largest accepted coarse-sleep undershoot.
pub const MAX_SLEEP_MARGIN: Duration = Duration::from_secs(1);

const DEFAULT_FPS_CAP: u32 = 60;

/// How the rate cap combines with the fixed frame time when both are enabled.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum CapMode {
    /// The rate cap's period starts where the fixed frame time budget ends, so
    /// an iteration lasts at least `frame_time + 1000 / fps`.
    ///
    /// An overrun only cuts the cap wait short once the body exceeds that sum.
    #[default]
    Sequential,
    /// Both waits are measured from the iteration start; the longer target wins.
    SharedStart,
}

/// Invalid pacing input.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    FrameTimeOutOfRange(f32),
    FpsCapOutOfRange(u32),
    SleepMarginTooLarge(Duration),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::FrameTimeOutOfRange(ms) => write!(
                f,
                "frame time {ms}ms outside {}..={}ms",
                FRAME_TIME_RANGE_MS.start(),
                FRAME_TIME_RANGE_MS.end()
            ),
            ConfigError::FpsCapOutOfRange(fps) => write!(
                f,
                "fps cap {fps} outside {}..={}",
                FPS_CAP_RANGE.start(),
                FPS_CAP_RANGE.end()
            ),
            ConfigError::SleepMarginTooLarge(margin) => {
                write!(f, "sleep margin {margin:?} exceeds one second")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Pacing targets for the loop driver.
///
/// Both targets may be enabled at once; they are applied in a fixed order around
/// present and never merged into a single wait.
#[derive(Debug, Clone, PartialEq)]
pub struct PacingConfig {
    frame_time_enabled: bool,
    frame_time_ms: f32,

    fps_cap_enabled: bool,
    fps_cap: NonZeroU32,

    sleep_margin: Duration,

    pub cap_mode: CapMode,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            frame_time_enabled: false,
            frame_time_ms: 0.0,
            fps_cap_enabled: false,
            fps_cap: NonZeroU32::new(DEFAULT_FPS_CAP).unwrap_or(NonZeroU32::MIN),
            sleep_margin: DEFAULT_SLEEP_MARGIN,
            cap_mode: CapMode::default(),
        }
    }
}

impl PacingConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables the fixed frame time with `ms`, clamped to [`FRAME_TIME_RANGE_MS`].
    pub fn with_frame_time(mut self, ms: f32) -> Self {
        self.set_frame_time_ms(ms);
        self.frame_time_enabled = true;
        self
    }

    /// Enables the rate cap with `fps`, clamped to [`FPS_CAP_RANGE`].
    pub fn with_fps_cap(mut self, fps: u32) -> Self {
        self.set_fps_cap(fps);
        self.fps_cap_enabled = true;
        self
    }

    /// Sets the coarse-sleep undershoot, clamped to [`MAX_SLEEP_MARGIN`].
    pub fn with_sleep_margin(mut self, margin: Duration) -> Self {
        self.set_sleep_margin(margin);
        self
    }

    pub fn with_cap_mode(mut self, mode: CapMode) -> Self {
        self.cap_mode = mode;
        self
    }

    // ── fixed frame time ──────────────────────────────────────────────────

    pub fn frame_time_enabled(&self) -> bool {
        self.frame_time_enabled
    }

    pub fn set_frame_time_enabled(&mut self, enabled: bool) {
        self.frame_time_enabled = enabled;
    }

    /// Stored target, whether or not it is enabled.
    pub fn frame_time_ms(&self) -> f32 {
        self.frame_time_ms
    }

    /// Stores a target clamped to [`FRAME_TIME_RANGE_MS`]. NaN becomes zero.
    pub fn set_frame_time_ms(&mut self, ms: f32) {
        self.frame_time_ms = if ms.is_nan() {
            0.0
        } else {
            ms.clamp(*FRAME_TIME_RANGE_MS.start(), *FRAME_TIME_RANGE_MS.end())
        };
    }

    /// Strict variant of [`set_frame_time_ms`](Self::set_frame_time_ms).
    pub fn try_set_frame_time_ms(&mut self, ms: f32) -> Result<(), ConfigError> {
        if !FRAME_TIME_RANGE_MS.contains(&ms) {
            return Err(ConfigError::FrameTimeOutOfRange(ms));
        }
        self.frame_time_ms = ms;
        Ok(())
    }

    /// Active fixed frame time target, if enabled.
    pub fn frame_time(&self) -> Option<f32> {
        self.frame_time_enabled.then_some(self.frame_time_ms)
    }

    /// Active fixed frame time budget as a `Duration`; zero when disabled.
    pub fn frame_time_budget(&self) -> Duration {
        self.frame_time().map(ms_to_duration).unwrap_or(Duration::ZERO)
    }

    // ── sleep margin ──────────────────────────────────────────────────────

    /// Undershoot of the coarse sleep in the rate-cap wait.
    pub fn sleep_margin(&self) -> Duration {
        self.sleep_margin
    }

    /// Stores a margin clamped to [`MAX_SLEEP_MARGIN`].
    pub fn set_sleep_margin(&mut self, margin: Duration) {
        self.sleep_margin = margin.min(MAX_SLEEP_MARGIN);
    }

    /// Strict variant of [`set_sleep_margin`](Self::set_sleep_margin).
    pub fn try_set_sleep_margin(&mut self, margin: Duration) -> Result<(), ConfigError> {
        if margin > MAX_SLEEP_MARGIN {
            return Err(ConfigError::SleepMarginTooLarge(margin));
        }
        self.sleep_margin = margin;
        Ok(())
    }

    // ── fps cap ───────────────────────────────────────────────────────────

    pub fn fps_cap_enabled(&self) -> bool {
        self.fps_cap_enabled
    }

    pub fn set_fps_cap_enabled(&mut self, enabled: bool) {
        self.fps_cap_enabled = enabled;
    }

    /// Stored cap, whether or not it is enabled.
    pub fn fps_cap_value(&self) -> NonZeroU32 {
        self.fps_cap
    }

    /// Stores a cap clamped to [`FPS_CAP_RANGE`].
    pub fn set_fps_cap(&mut self, fps: u32) {
        let fps = fps.clamp(*FPS_CAP_RANGE.start(), *FPS_CAP_RANGE.end());
        self.fps_cap = NonZeroU32::new(fps).unwrap_or(NonZeroU32::MIN);
    }

    /// Strict variant of [`set_fps_cap`](Self::set_fps_cap).
    pub fn try_set_fps_cap(&mut self, fps: u32) -> Result<(), ConfigError> {
        if !FPS_CAP_RANGE.contains(&fps) {
            return Err(ConfigError::FpsCapOutOfRange(fps));
        }
        self.set_fps_cap(fps);
        Ok(())
    }

    /// Active rate cap, if enabled.
    pub fn fps_cap(&self) -> Option<NonZeroU32> {
        self.fps_cap_enabled.then_some(self.fps_cap)
    }

    /// Frame period of the active rate cap.
    pub fn fps_cap_period(&self) -> Option<Duration> {
        self.fps_cap().map(fps_to_frame_duration)
    }

    /// Lower bound on one iteration's duration under the current settings.
    pub fn min_iteration(&self) -> Duration {
        let fixed = self.frame_time_budget();
        match (self.fps_cap_period(), self.cap_mode) {
            (None, _) => fixed,
            (Some(period), CapMode::Sequential) => fixed + period,
            (Some(period), CapMode::SharedStart) => fixed.max(period),
        }
    }

    /// Rejects values the setters could not have produced.
    ///
    /// Every setter already clamps or rejects, so this only fails if an invariant
    /// was broken elsewhere. Checked once before a run starts.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !FRAME_TIME_RANGE_MS.contains(&self.frame_time_ms) {
            return Err(ConfigError::FrameTimeOutOfRange(self.frame_time_ms));
        }
        if !FPS_CAP_RANGE.contains(&self.fps_cap.get()) {
            return Err(ConfigError::FpsCapOutOfRange(self.fps_cap.get()));
        }
        if self.sleep_margin > MAX_SLEEP_MARGIN {
            return Err(ConfigError::SleepMarginTooLarge(self.sleep_margin));
        }
        Ok(())
    }
}
