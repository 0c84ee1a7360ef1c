use std::time::{Duration, Instant};

use anyhow::{Context, Result};

use crate::config::PacingConfig;
use crate::core::{App, AppControl};
use crate::timer::TimerResolutionGuard;

use super::frame_loop::FrameLoop;

/// Loop runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Initial pacing targets. The app may change them every iteration.
    pub pacing: PacingConfig,

    /// Stop after this many iterations. `None` runs until the app exits.
    pub max_frames: Option<u64>,

    /// Raise the OS timer resolution for the duration of the run.
    pub timer_guard: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            pacing: PacingConfig::default(),
            max_frames: None,
            timer_guard: true,
        }
    }
}

/// What a finished run measured.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub frames: u64,
    /// Wall-clock time from the first iteration's start to the end of the last.
    pub elapsed: Duration,
    /// Mean iteration duration over the whole run.
    pub mean_frame: Duration,
    pub shortest_frame: Duration,
    pub longest_frame: Duration,
    /// Rolling ms/frame over the final stats window.
    pub rolling_ms: f64,
    /// Rolling FPS over the final stats window.
    pub rolling_fps: f64,
}

impl RunSummary {
    fn from_loop(frame_loop: &FrameLoop, elapsed: Duration) -> Self {
        let frames = frame_loop.frames();
        let mean_frame = u32::try_from(frames)
            .ok()
            .filter(|n| *n > 0)
            .map_or(Duration::ZERO, |n| frame_loop.total() / n);

        Self {
            frames,
            elapsed,
            mean_frame,
            shortest_frame: frame_loop.shortest().unwrap_or(Duration::ZERO),
            longest_frame: frame_loop.longest(),
            rolling_ms: frame_loop.stats().average_ms(),
            rolling_fps: frame_loop.stats().fps(),
        }
    }
}

/// Entry point for the loop runtime.
pub struct Runtime;

impl Runtime {
    /// Runs `app` on the calling thread until it returns [`AppControl::Exit`] or
    /// `max_frames` iterations have completed.
    ///
    /// The timer resolution guard, when enabled, is held for the whole run and
    /// released on every exit path.
    pub fn run<A>(config: RuntimeConfig, app: &mut A) -> Result<RunSummary>
    where
        A: App + ?Sized,
    {
        config
            .pacing
            .validate()
            .context("invalid pacing configuration")?;

        let _guard = config.timer_guard.then(TimerResolutionGuard::acquire);

        log::info!(
            "loop starting: frame time {}, fps cap {}, max frames {}",
            describe_frame_time(&config.pacing),
            describe_fps_cap(&config.pacing),
            config
                .max_frames
                .map_or_else(|| "unbounded".to_string(), |n| n.to_string())
        );

        let mut frame_loop = FrameLoop::new(config.pacing);
        let started = Instant::now();

        loop {
            if config.max_frames.is_some_and(|max| frame_loop.frames() >= max) {
                log::debug!("frame limit reached");
                break;
            }

            let (control, _) = frame_loop.step(app);
            if control == AppControl::Exit {
                log::debug!("app requested exit");
                break;
            }
        }

        app.on_exit();

        let summary = RunSummary::from_loop(&frame_loop, started.elapsed());
        log::info!(
            "loop finished: {} frames in {:.1}ms ({:.3} ms/frame, {:.1} FPS)",
            summary.frames,
            summary.elapsed.as_secs_f64() * 1000.0,
            summary.rolling_ms,
            summary.rolling_fps
        );

        Ok(summary)
    }
}

fn describe_frame_time(pacing: &PacingConfig) -> String {
    pacing
        .frame_time()
        .map_or_else(|| "off".to_string(), |ms| format!("{ms}ms"))
}

fn describe_fps_cap(pacing: &PacingConfig) -> String {
    pacing
        .fps_cap()
        .map_or_else(|| "off".to_string(), |fps| fps.to_string())
}
