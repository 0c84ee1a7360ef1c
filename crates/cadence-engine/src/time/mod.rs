//! Time subsystem.
//!
//! Frame timing and pacing utilities, usable without the runtime:
//! - `FrameClock` stamps the start of each loop iteration
//! - `FramePacer` (or the free `wait_*` functions) blocks until a target is reached
//! - `FrameStats` keeps the rolling ms/frame and FPS readout

mod frame_clock;
mod pacer;
mod stats;

pub use frame_clock::{FrameClock, FrameTime};
pub use pacer::{
    fps_to_frame_duration, ms_to_duration, spin_until, wait_fps_cap, wait_frame_time, FramePacer,
    DEFAULT_SLEEP_MARGIN,
};
pub use stats::{FrameStats, STATS_WINDOW};
