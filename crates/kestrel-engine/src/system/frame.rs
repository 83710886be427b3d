use crate::stats::FrameStatistics;

/// State captured by `RenderSystem::pause_frame`.
///
/// Single-use: `resume_frame` consumes it. A token is only accepted by the
/// render system that issued it, and only for its latest pause.
#[must_use = "a paused frame has to be resumed with `resume_frame`"]
#[derive(Debug)]
pub struct FrameContext {
    pub(super) token: u64,
    pub(super) statistics: FrameStatistics,
    pub(super) active_target: Option<String>,
}

impl FrameContext {
    /// Statistics of the paused frame at the moment it was paused.
    #[inline]
    pub fn statistics(&self) -> &FrameStatistics {
        &self.statistics
    }

    #[inline]
    pub fn active_target(&self) -> Option<&str> {
        self.active_target.as_deref()
    }
}
