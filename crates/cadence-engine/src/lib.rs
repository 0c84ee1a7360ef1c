//! Cadence engine crate.
//!
//! Frame pacing for render loops: a busy-wait/sleep hybrid pacer, the process-wide
//! timer resolution guard, and a headless loop driver that applies both pacing
//! targets in order around the host's present call.

pub mod config;
pub mod core;
pub mod runtime;
pub mod time;
pub mod timer;

pub mod logging;
