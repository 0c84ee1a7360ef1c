//! Process-wide timer resolution.
//!
//! Sleep-based waits are only as precise as the OS scheduler tick. On platforms
//! that let a process ask for a finer tick (or opt out of timer coalescing), this
//! module does so for the lifetime of the process:
//!
//! - `platform_timer_setup()` / `platform_timer_shutdown()` are the lifecycle hooks,
//!   called once each at startup and shutdown
//! - `TimerResolutionGuard` wraps the pair in RAII
//!
//! Failure never surfaces as an error. Pacing keeps working at whatever precision
//! the OS default tick gives.

mod backend;
mod state;

#[cfg(target_os = "macos")]
mod macos;
#[cfg(windows)]
mod windows;

pub use backend::{platform_backend, NoopResolution, TimerResolution};
pub use state::{ResolutionPhase, ResolutionState};

static PROCESS: ResolutionState = ResolutionState::new(platform_backend());

/// Raises the process timer resolution. Subsequent calls are no-ops.
pub fn platform_timer_setup() {
    PROCESS.acquire();
}

/// Restores the process timer resolution. A no-op unless setup ran first.
pub fn platform_timer_shutdown() {
    PROCESS.release();
}

/// Current phase of the process-wide state.
pub fn process_phase() -> ResolutionPhase {
    PROCESS.phase()
}

/// Holds the raised timer resolution until dropped.
///
/// Create one near the top of `main` and keep it alive for the whole program.
/// The process-wide state is never re-entered: only the guard that performed the
/// acquire releases on drop, so a nested guard, or one created after the first was
/// dropped, changes nothing.
#[must_use = "timer resolution is restored as soon as the guard is dropped"]
#[derive(Debug)]
pub struct TimerResolutionGuard {
    state: &'static ResolutionState,
    owns: bool,
}

impl TimerResolutionGuard {
    /// Acquires the process-wide timer resolution.
    pub fn acquire() -> Self {
        Self::acquire_on(&PROCESS)
    }

    /// Acquires `state`, which must outlive the program like the process state.
    pub fn acquire_on(state: &'static ResolutionState) -> Self {
        let owns = state.acquire();
        Self { state, owns }
    }

    /// Whether dropping this guard releases the resolution.
    pub fn owns(&self) -> bool {
        self.owns
    }
}

impl Drop for TimerResolutionGuard {
    fn drop(&mut self) {
        if self.owns {
            self.state.release();
        }
    }
}
