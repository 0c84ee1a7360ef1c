use super::backend::TimerResolution;

#[link(name = "winmm")]
unsafe extern "system" {
    fn timeBeginPeriod(u_period: u32) -> u32;
    fn timeEndPeriod(u_period: u32) -> u32;
}

const TIMERR_NOERROR: u32 = 0;
const TARGET_PERIOD_MS: u32 = 1;

/// `timeBeginPeriod(1)` / `timeEndPeriod(1)` from the multimedia timer API.
#[derive(Debug, Copy, Clone, Default)]
pub struct WinmmResolution;

impl TimerResolution for WinmmResolution {
    fn name(&self) -> &'static str {
        "winmm"
    }

    fn begin(&self) -> bool {
        // SAFETY: plain value argument; the call has no memory side effects.
        unsafe { timeBeginPeriod(TARGET_PERIOD_MS) == TIMERR_NOERROR }
    }

    fn end(&self) {
        // SAFETY: only reached after a successful timeBeginPeriod with the same period.
        unsafe {
            timeEndPeriod(TARGET_PERIOD_MS);
        }
    }
}
