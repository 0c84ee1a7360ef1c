//! Headless loop driver.
//!
//! Owns the iteration loop and applies the pacing targets around the host's
//! present call. Windowing, input and rendering stay with the host `App`.

mod frame_loop;
mod runner;

pub use frame_loop::FrameLoop;
pub use runner::{RunSummary, Runtime, RuntimeConfig};
