use crate::core::RenderResult;
use crate::program::{GpuProgram, Plane, ProgramStage};
use crate::resource::ResourceRegistry;
use crate::stats::RenderOperation;
use crate::target::{RenderTarget, RenderTextureDesc, RenderWindowDesc};
use crate::texture::{FilterOptions, FilterType, TextureId, UvwAddressing};

use super::{OcclusionQuery, RenderCapabilities};

/// Face culling mode.
///
/// `Clockwise` culls clockwise faces, so counter-clockwise faces are front.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
pub enum CullingMode {
    None,
    #[default]
    Clockwise,
    CounterClockwise,
}

/// Separate vertex-stage texture samplers.
///
/// Only backends whose vertex units are not shared with the fragment stage
/// provide this.
pub trait VertexTextureSampler {
    fn set_vertex_texture(&mut self, unit: usize, texture: Option<TextureId>);
}

/// API-specific half of the render system.
pub trait RenderBackend {
    /// Short backend name used in logs.
    fn name(&self) -> &str;

    /// Brings up the native device and reports the real capabilities.
    ///
    /// `resources` is the registry every GPU resource of this device must be
    /// tracked in.
    fn initialise(&mut self, resources: &ResourceRegistry) -> RenderResult<RenderCapabilities>;

    /// Releases backend-level state. Targets and queries are already gone.
    fn shutdown(&mut self);

    fn create_render_window(
        &mut self,
        desc: &RenderWindowDesc,
        primary: bool,
    ) -> RenderResult<Box<dyn RenderTarget>>;

    fn create_render_texture(
        &mut self,
        desc: &RenderTextureDesc,
    ) -> RenderResult<Box<dyn RenderTarget>>;

    fn create_occlusion_query(&mut self) -> RenderResult<Box<dyn OcclusionQuery>>;

    fn begin_frame(&mut self) -> RenderResult<()>;

    fn end_frame(&mut self) -> RenderResult<()>;

    /// Submits one draw. Statistics are handled by the caller.
    fn draw(&mut self, op: &RenderOperation) -> RenderResult<()>;

    /// Pushes user clip planes to the device.
    fn set_clip_planes(&mut self, planes: &[Plane]);

    fn set_culling_mode(&mut self, mode: CullingMode);

    fn bind_gpu_program(&mut self, program: &GpuProgram);

    fn unbind_gpu_program(&mut self, stage: ProgramStage);

    /// Re-uploads the pass-iteration parameters of the program bound at `stage`.
    fn bind_pass_iteration_parameters(&mut self, stage: ProgramStage, iteration: u32);

    fn set_texture(&mut self, unit: usize, enabled: bool, texture: Option<TextureId>);

    /// Capability query for separate vertex samplers.
    fn vertex_texture_sampler(&mut self) -> Option<&mut dyn VertexTextureSampler>;

    fn set_texture_unit_filtering(&mut self, unit: usize, ty: FilterType, filter: FilterOptions);

    fn set_texture_anisotropy(&mut self, unit: usize, max_anisotropy: u32);

    fn set_texture_mipmap_bias(&mut self, unit: usize, bias: f32);

    fn set_texture_addressing_mode(&mut self, unit: usize, mode: &UvwAddressing);

    /// Polled at frame boundaries; `true` once the native device reported loss.
    fn is_device_lost(&self) -> bool;

    /// Resets the native device after a loss. Resources are recreated by the caller.
    fn reset_device(&mut self) -> RenderResult<()>;
}
