use std::num::NonZeroU32;
use std::thread;
use std::time::{Duration, Instant};

/// Default undershoot applied to the coarse sleep of the rate-cap wait.
///
/// Scheduler wake-ups are late far more often than early, so the sleep stops
/// short by this much and the spin covers the rest.
pub const DEFAULT_SLEEP_MARGIN: Duration = Duration::from_millis(1);

/// Converts a millisecond target into a `Duration`.
///
/// Rounded to the nanosecond. Non-positive and NaN targets map to zero; huge ones
/// saturate.
pub fn ms_to_duration(ms: f32) -> Duration {
    if ms.is_nan() || ms <= 0.0 {
        return Duration::ZERO;
    }
    Duration::from_nanos((f64::from(ms) * 1_000_000.0).round() as u64)
}

/// Frame period for a frame-rate target: `1000 / fps` milliseconds, truncated to
/// the nanosecond.
pub fn fps_to_frame_duration(fps: NonZeroU32) -> Duration {
    Duration::from_nanos(1_000_000_000 / u64::from(fps.get()))
}

/// Busy-waits until `target` has elapsed since `start`.
///
/// Never sleeps or yields to the scheduler.
#[inline]
pub fn spin_until(start: Instant, target: Duration) {
    while start.elapsed() < target {
        std::hint::spin_loop();
    }
}

/// Blocks until `frame_time_ms` milliseconds have elapsed since `start`.
///
/// Pure spin. Returns immediately when the target is non-positive or already
/// exceeded.
pub fn wait_frame_time(start: Instant, frame_time_ms: f32) {
    FramePacer::default().wait_frame_time(start, frame_time_ms);
}

/// Blocks until one `1000 / fps` ms frame period has elapsed since `start`.
///
/// Sleeps coarsely for most of the remaining time, then spins. Uses
/// [`DEFAULT_SLEEP_MARGIN`].
pub fn wait_fps_cap(start: Instant, fps: NonZeroU32) {
    FramePacer::default().wait_fps_cap(start, fps);
}

/// Frame pacer.
///
/// Stateless across calls: every wait is measured from the `start` the caller
/// passes in, and an overrun frame is never paid back by a later one.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct FramePacer {
    sleep_margin: Duration,
}

impl FramePacer {
    pub fn new() -> Self {
        Self {
            sleep_margin: DEFAULT_SLEEP_MARGIN,
        }
    }

    /// Creates a pacer with a custom coarse-sleep undershoot.
    ///
    /// A larger margin spins longer but tolerates a noisier scheduler.
    pub fn with_sleep_margin(sleep_margin: Duration) -> Self {
        Self { sleep_margin }
    }

    pub fn sleep_margin(&self) -> Duration {
        self.sleep_margin
    }

    /// See [`wait_frame_time`].
    pub fn wait_frame_time(&self, start: Instant, frame_time_ms: f32) {
        let target = ms_to_duration(frame_time_ms);
        if target.is_zero() {
            return;
        }
        spin_until(start, target);
    }

    /// See [`wait_fps_cap`].
    pub fn wait_fps_cap(&self, start: Instant, fps: NonZeroU32) {
        self.wait_until(start, fps_to_frame_duration(fps));
    }

    /// Hybrid wait: one coarse sleep, then spin until `target` has elapsed since
    /// `start`.
    pub fn wait_until(&self, start: Instant, target: Duration) {
        let Some(remaining) = target.checked_sub(start.elapsed()) else {
            return;
        };
        if remaining.is_zero() {
            return;
        }

        if let Some(coarse) = self.coarse_sleep(remaining) {
            thread::sleep(coarse);
        }

        spin_until(start, target);
    }

    /// Whole milliseconds of `remaining`, less the margin. `None` when nothing is
    /// left to sleep.
    fn coarse_sleep(&self, remaining: Duration) -> Option<Duration> {
        let floored = Duration::from_millis(u64::try_from(remaining.as_millis()).unwrap_or(u64::MAX));
        floored
            .checked_sub(self.sleep_margin)
            .filter(|d| !d.is_zero())
    }
}

impl Default for FramePacer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fps(n: u32) -> NonZeroU32 {
        NonZeroU32::new(n).unwrap()
    }

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    // Upper bounds are loose on purpose: CI machines deschedule freely.
    const SLACK: Duration = Duration::from_millis(40);

    // ── conversions ───────────────────────────────────────────────────────

    #[test]
    fn ms_to_duration_handles_degenerate_inputs() {
        assert_eq!(ms_to_duration(0.0), Duration::ZERO);
        assert_eq!(ms_to_duration(-5.0), Duration::ZERO);
        assert_eq!(ms_to_duration(f32::NAN), Duration::ZERO);
        assert_eq!(ms_to_duration(f32::INFINITY), Duration::from_nanos(u64::MAX));
    }

    #[test]
    fn ms_to_duration_keeps_fractions() {
        assert_eq!(ms_to_duration(2.5), Duration::from_micros(2500));
    }

    #[test]
    fn fps_period() {
        assert_eq!(fps_to_frame_duration(fps(1)), Duration::from_secs(1));
        assert_eq!(fps_to_frame_duration(fps(400)), Duration::from_micros(2500));
        assert_eq!(fps_to_frame_duration(fps(60)), Duration::from_nanos(16_666_666));
    }

    // ── coarse sleep ──────────────────────────────────────────────────────

    #[test]
    fn coarse_sleep_floors_and_undershoots() {
        let pacer = FramePacer::new();
        assert_eq!(pacer.coarse_sleep(Duration::from_micros(16_670)), Some(ms(15)));
        assert_eq!(pacer.coarse_sleep(Duration::from_micros(3_999)), Some(ms(2)));
    }

    #[test]
    fn coarse_sleep_skipped_below_margin() {
        let pacer = FramePacer::new();
        assert_eq!(pacer.coarse_sleep(Duration::from_micros(1_900)), None);
        assert_eq!(pacer.coarse_sleep(Duration::from_micros(500)), None);
    }

    #[test]
    fn coarse_sleep_respects_custom_margin() {
        let pacer = FramePacer::with_sleep_margin(ms(3));
        assert_eq!(pacer.coarse_sleep(ms(10)), Some(ms(7)));
        assert_eq!(pacer.coarse_sleep(ms(3)), None);

        let no_margin = FramePacer::with_sleep_margin(Duration::ZERO);
        assert_eq!(no_margin.coarse_sleep(Duration::from_micros(4_200)), Some(ms(4)));
    }

    // ── fixed frame time ──────────────────────────────────────────────────

    #[test]
    fn frame_time_non_positive_is_noop() {
        for target in [0.0, -1.0, -150.0, f32::NAN] {
            let t = Instant::now();
            wait_frame_time(t, target);
            assert!(t.elapsed() < ms(5), "target {target} blocked");
        }
    }

    #[test]
    fn frame_time_waits_at_least_target() {
        let start = Instant::now();
        wait_frame_time(start, 12.5);
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_micros(12_500));
        assert!(elapsed < Duration::from_micros(12_500) + SLACK);
    }

    #[test]
    fn frame_time_accounts_for_prior_work() {
        let start = Instant::now();
        spin_until(start, ms(8));
        wait_frame_time(start, 20.0);
        let elapsed = start.elapsed();
        assert!(elapsed >= ms(20));
        assert!(elapsed < ms(20) + SLACK);
    }

    #[test]
    fn frame_time_overrun_returns_immediately() {
        let start = Instant::now();
        spin_until(start, ms(10));
        let before = Instant::now();
        wait_frame_time(start, 5.0);
        assert!(before.elapsed() < ms(2));
    }

    // ── fps cap ───────────────────────────────────────────────────────────

    #[test]
    fn fps_cap_waits_at_least_period() {
        let start = Instant::now();
        wait_fps_cap(start, fps(60));
        let elapsed = start.elapsed();
        assert!(elapsed >= fps_to_frame_duration(fps(60)));
        assert!(elapsed < fps_to_frame_duration(fps(60)) + SLACK);
    }

    #[test]
    fn fps_cap_high_rate_lands_after_period() {
        // 400 fps = 2.5ms: floor(2.5) - 1 leaves a single millisecond of sleep.
        let start = Instant::now();
        wait_fps_cap(start, fps(400));
        assert!(start.elapsed() >= Duration::from_micros(2_500));
    }

    #[test]
    fn fps_cap_overrun_returns_immediately() {
        let start = Instant::now();
        spin_until(start, ms(6));
        let before = Instant::now();
        wait_fps_cap(start, fps(400));
        assert!(before.elapsed() < ms(2));
    }

    // ── landing accuracy ──────────────────────────────────────────────────

    /// Median overshoot past `target` over `runs` waits. The median shrugs off
    /// the odd iteration where the test thread gets descheduled.
    fn median_overshoot(runs: usize, target: Duration, wait: impl Fn(Instant)) -> Duration {
        let mut overshoots: Vec<Duration> = (0..runs)
            .map(|_| {
                let start = Instant::now();
                wait(start);
                start.elapsed().saturating_sub(target)
            })
            .collect();
        overshoots.sort();
        overshoots[runs / 2]
    }

    #[test]
    fn frame_time_lands_within_half_a_millisecond() {
        let target = ms(4);
        let median = median_overshoot(15, target, |start| wait_frame_time(start, 4.0));
        assert!(median < Duration::from_micros(500), "median overshoot {median:?}");
    }

    #[test]
    fn fps_cap_lands_within_two_milliseconds() {
        let target = fps_to_frame_duration(fps(200));
        let median = median_overshoot(15, target, |start| wait_fps_cap(start, fps(200)));
        assert!(median < ms(2), "median overshoot {median:?}");
    }

    #[test]
    fn fps_cap_sleep_phase_does_not_oversleep() {
        // 60fps sleeps 15ms of the 16.7ms period; the spin must still land on time.
        let target = fps_to_frame_duration(fps(60));
        let median = median_overshoot(9, target, |start| wait_fps_cap(start, fps(60)));
        assert!(median < ms(2), "median overshoot {median:?}");
    }

    #[test]
    fn wait_until_with_future_anchor() {
        let start = Instant::now() + ms(5);
        FramePacer::new().wait_until(start, ms(5));
        assert!(Instant::now() >= start + ms(5));
    }
}
