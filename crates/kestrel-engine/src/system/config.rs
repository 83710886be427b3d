use crate::backend::CullingMode;

/// Initial render-state configuration of a [`RenderSystem`](super::RenderSystem).
///
/// Every value can be changed later through the corresponding setter.
#[derive(Debug, Clone)]
pub struct RenderSystemConfig {
    /// Wait for vertical blank when swapping.
    pub vsync: bool,

    /// Number of vertical blanks per swap when vsync is enabled.
    pub vsync_interval: u32,

    /// Use a w-buffer instead of a z-buffer where the backend supports it.
    pub wbuffer: bool,

    /// Culling applied at initialisation.
    ///
    /// Clockwise culling makes counter-clockwise faces front-facing, matching
    /// right-handed conventions.
    pub culling_mode: CullingMode,

    /// Flip the winding used to decide front faces (e.g. for mirrored rendering).
    pub invert_vertex_winding: bool,

    /// Size of the window created by `initialise(true, ..)`.
    pub default_window_size: (u32, u32),
}

impl Default for RenderSystemConfig {
    fn default() -> Self {
        Self {
            vsync: true,
            vsync_interval: 1,
            wbuffer: false,
            culling_mode: CullingMode::Clockwise,
            invert_vertex_winding: false,
            default_window_size: (1280, 720),
        }
    }
}
