use super::ctx::FrameCtx;

/// Control directive returned by app callbacks.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AppControl {
    Continue,
    Exit,
}

/// Loop-driver contract implemented by the host.
///
/// Each iteration the runtime calls [`on_frame`](App::on_frame), applies the
/// fixed frame time, calls [`present`](App::present), then applies the rate cap.
pub trait App {
    /// Event handling, UI update and render submission for one iteration.
    ///
    /// Pacing targets may be changed through `ctx.pacing`; they take effect in the
    /// same iteration.
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_>) -> AppControl;

    /// Presents the frame. Runs after the fixed frame time wait.
    fn present(&mut self) {}

    /// Called once after the last iteration, before the timer guard is released.
    fn on_exit(&mut self) {}
}
