/// Bring-up parameters for [`WgpuBackend`](super::WgpuBackend).
///
/// Keep this structure small; add flags only when a platform needs them.
#[derive(Debug, Clone)]
pub struct WgpuBackendInit {
    /// Instance backends wgpu may pick from.
    pub backends: wgpu::Backends,

    pub power_preference: wgpu::PowerPreference,

    /// Accept a software adapter (useful on CI machines without a GPU).
    pub force_fallback_adapter: bool,

    /// Required wgpu features.
    ///
    /// Favor an empty set for portability unless a feature is strictly necessary.
    pub required_features: wgpu::Features,

    /// Limits requested from the adapter/device.
    pub required_limits: wgpu::Limits,

    /// Colour format of render textures.
    pub texture_format: wgpu::TextureFormat,

    /// Colour render textures are cleared to on update.
    pub clear_color: wgpu::Color,
}

impl Default for WgpuBackendInit {
    fn default() -> Self {
        Self {
            backends: wgpu::Backends::all(),
            power_preference: wgpu::PowerPreference::HighPerformance,
            force_fallback_adapter: false,
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
            texture_format: wgpu::TextureFormat::Rgba8UnormSrgb,
            clear_color: wgpu::Color::BLACK,
        }
    }
}
