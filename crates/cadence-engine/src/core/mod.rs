//! Core engine-facing contracts.
//!
//! Defines the interface between the loop runtime and the host that owns
//! windows, UI and rendering. The host never sees pacing internals; it only edits
//! a `PacingConfig` through the per-frame context.

mod app;
mod ctx;

pub use app::{App, AppControl};
pub use ctx::FrameCtx;
