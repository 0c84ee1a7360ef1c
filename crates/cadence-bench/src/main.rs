use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;

use cadence_engine::config::{CapMode, PacingConfig};
use cadence_engine::core::{App, AppControl, FrameCtx};
use cadence_engine::logging::{init_logging, LoggingConfig};
use cadence_engine::runtime::{RunSummary, Runtime, RuntimeConfig};

#[derive(Parser)]
#[command(name = "cadence-bench", about = "Measure frame pacing against a synthetic workload")]
struct Cli {
    /// Fixed frame time in milliseconds (0..=150), applied before present.
    #[arg(long = "frame-time", value_name = "MS")]
    frame_time: Option<f32>,

    /// Frame-rate cap (1..=400), applied after present.
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u32).range(1..=400))]
    fps: Option<u32>,

    /// Busy work per frame in milliseconds, standing in for update + render.
    #[arg(long, value_name = "MS", default_value_t = 2.0)]
    work: f32,

    /// Number of frames to run.
    #[arg(long, default_value_t = 300)]
    frames: u64,

    /// Coarse-sleep undershoot of the rate cap, in milliseconds.
    #[arg(long = "sleep-margin", value_name = "MS", default_value_t = 1.0)]
    sleep_margin: f32,

    /// Measure the rate cap from the iteration start instead of after the fixed
    /// frame time.
    #[arg(long = "shared-start")]
    shared_start: bool,

    /// Leave the OS timer resolution alone.
    #[arg(long = "no-timer-guard")]
    no_timer_guard: bool,

    /// Log filter, e.g. "debug" or "cadence_engine::runtime=trace".
    #[arg(long = "log")]
    log: Option<String>,
}

impl Cli {
    fn pacing(&self) -> Result<PacingConfig> {
        let mode = if self.shared_start {
            CapMode::SharedStart
        } else {
            CapMode::Sequential
        };
        let mut pacing = PacingConfig::new().with_cap_mode(mode);

        let margin = non_negative_ms(self.sleep_margin).context("--sleep-margin")?;
        pacing.try_set_sleep_margin(margin).context("--sleep-margin")?;

        if let Some(ms) = self.frame_time {
            pacing.try_set_frame_time_ms(ms).context("--frame-time")?;
            pacing.set_frame_time_enabled(true);
        }

        if let Some(fps) = self.fps {
            pacing.try_set_fps_cap(fps).context("--fps")?;
            pacing.set_fps_cap_enabled(true);
        }

        Ok(pacing)
    }
}

fn non_negative_ms(ms: f32) -> Result<Duration> {
    anyhow::ensure!(
        ms.is_finite() && ms >= 0.0,
        "expected a non-negative duration, got {ms}ms"
    );
    Duration::try_from_secs_f64(f64::from(ms) / 1000.0).context("duration too large")
}

/// Spins for a fixed amount of time each frame.
struct Workload {
    work: Duration,
    report_every: u64,
}

impl App for Workload {
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_>) -> AppControl {
        let until = ctx.time.start + self.work;
        while Instant::now() < until {
            std::hint::spin_loop();
        }

        let index = ctx.time.frame_index;
        if self.report_every > 0 && index > 0 && index % self.report_every == 0 {
            let (ms, fps) = ctx.average();
            log::debug!("frame {index}: average {ms:.3} ms/frame ({fps:.1} FPS)");
        }

        AppControl::Continue
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(match &cli.log {
        Some(filter) => LoggingConfig::with_filter(filter.clone()),
        None => LoggingConfig::default(),
    });

    let pacing = cli.pacing()?;
    let expected = pacing.min_iteration();
    let mut app = Workload {
        work: non_negative_ms(cli.work).context("--work")?,
        report_every: 60,
    };

    let config = RuntimeConfig {
        pacing,
        max_frames: Some(cli.frames),
        timer_guard: !cli.no_timer_guard,
    };

    let summary = Runtime::run(config, &mut app)?;
    print_report(&summary, app.work, expected);

    Ok(())
}

fn print_report(summary: &RunSummary, work: Duration, expected: Duration) {
    let ms = |d: Duration| d.as_secs_f64() * 1000.0;

    println!();
    println!("  frames            {}", summary.frames);
    println!("  work per frame    {:.3} ms", ms(work));
    println!("  expected floor    {:.3} ms", ms(expected.max(work)));
    println!("  mean frame        {:.3} ms", ms(summary.mean_frame));
    println!("  shortest frame    {:.3} ms", ms(summary.shortest_frame));
    println!("  longest frame     {:.3} ms", ms(summary.longest_frame));
    println!(
        "  rolling average   {:.3} ms/frame ({:.1} FPS)",
        summary.rolling_ms, summary.rolling_fps
    );
    println!("  total             {:.1} ms", ms(summary.elapsed));
    println!();
}
