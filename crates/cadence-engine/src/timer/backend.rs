use std::fmt;

/// Platform facility that raises the OS timer resolution for this process.
pub trait TimerResolution: Sync + fmt::Debug {
    /// Short identifier for logs.
    fn name(&self) -> &'static str;

    /// Requests the finer resolution. Returns `false` if the OS refused or the
    /// facility is missing.
    fn begin(&self) -> bool;

    /// Undoes a successful [`begin`](Self::begin).
    fn end(&self);
}

/// Backend for platforms without a timer resolution concept.
#[derive(Debug, Copy, Clone, Default)]
pub struct NoopResolution;

impl TimerResolution for NoopResolution {
    fn name(&self) -> &'static str {
        "noop"
    }

    fn begin(&self) -> bool {
        true
    }

    fn end(&self) {}
}

#[cfg(windows)]
const PLATFORM: &dyn TimerResolution = &super::windows::WinmmResolution;

#[cfg(target_os = "macos")]
const PLATFORM: &dyn TimerResolution = &super::macos::ProcessActivity;

#[cfg(not(any(windows, target_os = "macos")))]
const PLATFORM: &dyn TimerResolution = &NoopResolution;

/// Backend for the current build target.
pub const fn platform_backend() -> &'static dyn TimerResolution {
    PLATFORM
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noop_accepts_and_ends_quietly() {
        let backend = NoopResolution;
        assert!(backend.begin());
        backend.end();
        assert_eq!(backend.name(), "noop");
    }

    #[test]
    fn platform_backend_has_a_name() {
        assert!(!platform_backend().name().is_empty());
    }
}
