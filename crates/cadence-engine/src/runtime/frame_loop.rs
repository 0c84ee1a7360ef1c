use std::time::{Duration, Instant};

use crate::config::{CapMode, PacingConfig};
use crate::core::{App, AppControl, FrameCtx};
use crate::time::{FrameClock, FramePacer, FrameStats};

/// One-iteration-at-a-time driver.
///
/// [`Runtime`](super::Runtime) wraps this in a loop; hosts that own their own
/// event loop can call [`step`](FrameLoop::step) from it directly.
#[derive(Debug, Clone, Default)]
pub struct FrameLoop {
    pacing: PacingConfig,
    clock: FrameClock,
    stats: FrameStats,

    frames: u64,
    total: Duration,
    shortest: Option<Duration>,
    longest: Duration,
}

impl FrameLoop {
    pub fn new(pacing: PacingConfig) -> Self {
        Self {
            pacing,
            ..Self::default()
        }
    }

    pub fn pacing(&self) -> &PacingConfig {
        &self.pacing
    }

    pub fn pacing_mut(&mut self) -> &mut PacingConfig {
        &mut self.pacing
    }

    pub fn stats(&self) -> &FrameStats {
        &self.stats
    }

    /// Completed iterations.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Sum of all completed iteration durations.
    pub fn total(&self) -> Duration {
        self.total
    }

    pub fn shortest(&self) -> Option<Duration> {
        self.shortest
    }

    pub fn longest(&self) -> Duration {
        self.longest
    }

    /// Runs one full iteration: app work, fixed frame time wait, present, rate cap
    /// wait. Returns the app's directive and the measured iteration duration.
    pub fn step<A>(&mut self, app: &mut A) -> (AppControl, Duration)
    where
        A: App + ?Sized,
    {
        let ft = self.clock.begin();

        let control = {
            let mut ctx = FrameCtx {
                time: ft,
                stats: &self.stats,
                pacing: &mut self.pacing,
            };
            app.on_frame(&mut ctx)
        };

        // Targets are read once, after the app had its chance to change them.
        let pacer = FramePacer::with_sleep_margin(self.pacing.sleep_margin());

        if let Some(frame_time_ms) = self.pacing.frame_time() {
            pacer.wait_frame_time(ft.start, frame_time_ms);
        }

        app.present();

        if let Some(fps) = self.pacing.fps_cap() {
            pacer.wait_fps_cap(self.cap_anchor(ft.start), fps);
        }

        let frame = ft.elapsed();
        self.record(frame);

        (control, frame)
    }

    /// Where the rate cap's period starts.
    fn cap_anchor(&self, start: Instant) -> Instant {
        match self.pacing.cap_mode {
            CapMode::SharedStart => start,
            CapMode::Sequential => start
                .checked_add(self.pacing.frame_time_budget())
                .unwrap_or(start),
        }
    }

    fn record(&mut self, frame: Duration) {
        let floor = self.pacing.min_iteration();
        if !floor.is_zero() && frame > floor + floor / 10 {
            log::trace!(
                "frame {} overran pacing target: {:.3}ms > {:.3}ms",
                self.frames,
                frame.as_secs_f64() * 1000.0,
                floor.as_secs_f64() * 1000.0
            );
        }

        self.stats.record(frame);
        self.frames += 1;
        self.total += frame;
        self.longest = self.longest.max(frame);
        self.shortest = Some(self.shortest.map_or(frame, |s| s.min(frame)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SLACK: Duration = Duration::from_millis(40);

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    /// Busy work of a fixed length, plus a record of when present happened.
    #[derive(Default)]
    struct Recorder {
        work: Duration,
        present_at: Vec<Duration>,
        starts: Vec<Instant>,
        frame_indices: Vec<u64>,
    }

    impl App for Recorder {
        fn on_frame(&mut self, ctx: &mut FrameCtx<'_>) -> AppControl {
            self.starts.push(ctx.time.start);
            self.frame_indices.push(ctx.time.frame_index);
            let until = ctx.time.start + self.work;
            while Instant::now() < until {
                std::hint::spin_loop();
            }
            AppControl::Continue
        }

        fn present(&mut self) {
            let start = *self.starts.last().unwrap();
            self.present_at.push(start.elapsed());
        }
    }

    fn busy(work_ms: u64) -> Recorder {
        Recorder {
            work: ms(work_ms),
            ..Recorder::default()
        }
    }

    #[test]
    fn unpaced_iteration_is_just_the_work() {
        let mut fl = FrameLoop::new(PacingConfig::new());
        let mut app = busy(2);
        let (control, frame) = fl.step(&mut app);
        assert_eq!(control, AppControl::Continue);
        assert!(frame >= ms(2));
        assert!(frame < ms(2) + SLACK);
    }

    #[test]
    fn fixed_frame_time_completes_before_present() {
        let mut fl = FrameLoop::new(PacingConfig::new().with_frame_time(15.0));
        let mut app = busy(2);
        let (_, frame) = fl.step(&mut app);
        assert!(app.present_at[0] >= ms(15));
        assert!(frame >= ms(15));
        assert!(frame < ms(15) + SLACK);
    }

    #[test]
    fn fps_cap_runs_after_present() {
        let mut fl = FrameLoop::new(PacingConfig::new().with_fps_cap(50));
        let mut app = busy(2);
        let (_, frame) = fl.step(&mut app);
        assert!(app.present_at[0] < ms(20));
        assert!(frame >= ms(20));
        assert!(frame < ms(20) + SLACK);
    }

    #[test]
    fn sequential_targets_are_additive() {
        let pacing = PacingConfig::new().with_frame_time(20.0).with_fps_cap(30);
        let mut fl = FrameLoop::new(pacing);
        let mut app = busy(1);
        let (_, frame) = fl.step(&mut app);
        let floor = ms(20) + Duration::from_nanos(33_333_333);
        assert!(app.present_at[0] >= ms(20));
        assert!(frame >= floor);
        assert!(frame < floor + SLACK);
    }

    #[test]
    fn shared_start_targets_overlap() {
        let pacing = PacingConfig::new()
            .with_frame_time(20.0)
            .with_fps_cap(30)
            .with_cap_mode(CapMode::SharedStart);
        let mut fl = FrameLoop::new(pacing);
        let mut app = busy(1);
        let (_, frame) = fl.step(&mut app);
        let period = Duration::from_nanos(33_333_333);
        assert!(frame >= period);
        assert!(frame < period + SLACK);
    }

    #[test]
    fn sequential_overrun_is_measured_against_the_sum() {
        // 40ms exceeds both 20ms and 33.3ms on their own, but not their sum.
        let pacing = PacingConfig::new().with_frame_time(20.0).with_fps_cap(30);
        let mut fl = FrameLoop::new(pacing);
        let mut app = busy(40);
        let (_, frame) = fl.step(&mut app);
        let sum = ms(20) + Duration::from_nanos(33_333_333);
        assert!(frame >= sum);
        assert!(frame < sum + SLACK);
    }

    #[test]
    fn sequential_overrun_past_the_sum_returns_immediately() {
        let pacing = PacingConfig::new().with_frame_time(20.0).with_fps_cap(30);
        let mut fl = FrameLoop::new(pacing);
        let mut app = busy(60);
        let (_, frame) = fl.step(&mut app);
        assert!(frame >= ms(60));
        assert!(frame < ms(70));
    }

    #[test]
    fn shared_start_overrun_of_both_returns_immediately() {
        let pacing = PacingConfig::new()
            .with_frame_time(20.0)
            .with_fps_cap(30)
            .with_cap_mode(CapMode::SharedStart);
        let mut fl = FrameLoop::new(pacing);
        let mut app = busy(40);
        let (_, frame) = fl.step(&mut app);
        assert!(frame >= ms(40));
        assert!(frame < ms(50));
    }

    #[test]
    fn overrun_is_not_compensated() {
        let pacing = PacingConfig::new().with_frame_time(5.0).with_fps_cap(400);
        let mut fl = FrameLoop::new(pacing);
        let mut app = busy(15);
        let (_, frame) = fl.step(&mut app);
        assert!(frame >= ms(15));
        assert!(frame < ms(15) + SLACK);

        // The next frame gets its full budget back, no shortening.
        app.work = Duration::ZERO;
        let (_, next) = fl.step(&mut app);
        assert!(next >= ms(5) + Duration::from_micros(2_500));
    }

    #[test]
    fn app_edits_apply_in_the_same_iteration() {
        struct Toggler;
        impl App for Toggler {
            fn on_frame(&mut self, ctx: &mut FrameCtx<'_>) -> AppControl {
                ctx.pacing.set_frame_time_ms(12.0);
                ctx.pacing.set_frame_time_enabled(true);
                AppControl::Exit
            }
        }

        let mut fl = FrameLoop::new(PacingConfig::new());
        let (control, frame) = fl.step(&mut Toggler);
        assert_eq!(control, AppControl::Exit);
        assert!(frame >= ms(12));
        assert_eq!(fl.pacing().frame_time(), Some(12.0));
    }

    #[test]
    fn app_cannot_push_margin_past_limit() {
        struct Greedy;
        impl App for Greedy {
            fn on_frame(&mut self, ctx: &mut FrameCtx<'_>) -> AppControl {
                ctx.pacing.set_sleep_margin(Duration::from_secs(30));
                AppControl::Continue
            }
        }

        let mut fl = FrameLoop::new(PacingConfig::new());
        fl.step(&mut Greedy);
        assert_eq!(fl.pacing().sleep_margin(), crate::config::MAX_SLEEP_MARGIN);
        assert!(fl.pacing().validate().is_ok());
    }

    #[test]
    fn bookkeeping_tracks_frames() {
        let mut fl = FrameLoop::new(PacingConfig::new().with_frame_time(3.0));
        let mut app = busy(0);
        for _ in 0..4 {
            fl.step(&mut app);
        }
        assert_eq!(fl.frames(), 4);
        assert_eq!(fl.stats().len(), 4);
        assert_eq!(app.frame_indices, vec![0, 1, 2, 3]);
        assert!(fl.shortest().unwrap() >= ms(3));
        assert!(fl.longest() >= fl.shortest().unwrap());
        assert!(fl.total() >= ms(12));
    }
}
