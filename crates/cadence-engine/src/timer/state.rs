use std::sync::atomic::{AtomicU8, Ordering};

use super::backend::TimerResolution;

const INACTIVE: u8 = 0;
const ACTIVE: u8 = 1;
const DEGRADED: u8 = 2;
const RELEASED: u8 = 3;

/// Phase of a [`ResolutionState`].
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ResolutionPhase {
    /// Not acquired yet.
    Inactive,
    /// Acquired; the backend raised the resolution.
    Active,
    /// Acquired, but the backend could not raise the resolution.
    Degraded,
    /// Released. Terminal.
    Released,
}

/// One-shot acquire/release state machine around a [`TimerResolution`] backend.
///
/// Legal transitions are `Inactive -> Active | Degraded` and
/// `Active | Degraded -> Released`. Every other call is ignored.
#[derive(Debug)]
pub struct ResolutionState {
    phase: AtomicU8,
    backend: &'static dyn TimerResolution,
}

impl ResolutionState {
    pub const fn new(backend: &'static dyn TimerResolution) -> Self {
        Self {
            phase: AtomicU8::new(INACTIVE),
            backend,
        }
    }

    pub fn phase(&self) -> ResolutionPhase {
        match self.phase.load(Ordering::Acquire) {
            INACTIVE => ResolutionPhase::Inactive,
            ACTIVE => ResolutionPhase::Active,
            DEGRADED => ResolutionPhase::Degraded,
            _ => ResolutionPhase::Released,
        }
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    /// Performs the `Inactive -> Active | Degraded` transition. Returns `true` only
    /// for the call that did, which then owns the matching [`release`](Self::release).
    pub fn acquire(&self) -> bool {
        if self
            .phase
            .compare_exchange(INACTIVE, ACTIVE, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            log::debug!("timer resolution already acquired or released; ignoring");
            return false;
        }

        if self.backend.begin() {
            log::debug!("timer resolution raised ({})", self.backend.name());
        } else {
            self.phase.store(DEGRADED, Ordering::Release);
            log::debug!(
                "timer resolution unavailable ({}); using default tick",
                self.backend.name()
            );
        }
        true
    }

    pub fn release(&self) {
        match self
            .phase
            .compare_exchange(ACTIVE, RELEASED, Ordering::AcqRel, Ordering::Acquire)
        {
            Ok(_) => {
                self.backend.end();
                log::debug!("timer resolution restored ({})", self.backend.name());
            }
            Err(DEGRADED) => {
                self.phase.store(RELEASED, Ordering::Release);
            }
            Err(_) => {}
        }
    }
}
