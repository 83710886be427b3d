use std::collections::HashMap;

use anyhow::{Context, Result};

use crate::backend::{
    Capabilities,
    CullingMode,
    OcclusionQuery,
    RenderBackend,
    RenderCapabilities,
    VertexTextureSampler,
};
use crate::core::{RenderError, RenderResult};
use crate::program::{GpuProgram, Plane, ProgramStage};
use crate::resource::ResourceRegistry;
use crate::stats::RenderOperation;
use crate::target::{RenderTarget, RenderTextureDesc, RenderWindowDesc};
use crate::texture::{
    FilterOptions,
    FilterType,
    TextureAddressingMode,
    TextureId,
    UvwAddressing,
    MAX_TEXTURE_LAYERS,
};

use super::device::{request_device, DeviceSlot};
use super::query::{QuerySetNative, WgpuOcclusionQuery};
use super::target::{TextureNative, WgpuRenderTexture};
use super::WgpuBackendInit;

/// Sampler settings of one texture unit, in wgpu terms.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SamplerState {
    pub min_filter: wgpu::FilterMode,
    pub mag_filter: wgpu::FilterMode,
    pub mip_filter: wgpu::FilterMode,
    pub anisotropy_clamp: u16,
    pub lod_bias: f32,
    pub address_mode: [wgpu::AddressMode; 3],
}

impl Default for SamplerState {
    fn default() -> Self {
        Self {
            min_filter: wgpu::FilterMode::Linear,
            mag_filter: wgpu::FilterMode::Linear,
            mip_filter: wgpu::FilterMode::Nearest,
            anisotropy_clamp: 1,
            lod_bias: 0.0,
            address_mode: [wgpu::AddressMode::Repeat; 3],
        }
    }
}

#[derive(Debug, Copy, Clone, Default, PartialEq)]
struct UnitBinding {
    enabled: bool,
    texture: Option<TextureId>,
    sampler: SamplerState,
}

/// Render state recorded for the pipelines built on top of this backend.
#[derive(Debug, Clone)]
struct PipelineState {
    primitive: wgpu::PrimitiveState,
    clip_planes: Vec<Plane>,
    programs: HashMap<ProgramStage, String>,
    units: [UnitBinding; MAX_TEXTURE_LAYERS],
}

impl Default for PipelineState {
    fn default() -> Self {
        Self {
            primitive: wgpu::PrimitiveState {
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: cull_face(CullingMode::default()),
                ..Default::default()
            },
            clip_planes: Vec::new(),
            programs: HashMap::new(),
            units: [UnitBinding::default(); MAX_TEXTURE_LAYERS],
        }
    }
}

/// Off-screen [`RenderBackend`] over wgpu.
///
/// Draws are counted, not rasterised: pipelines and shaders belong to the
/// layer that owns materials. Render textures and occlusion queries are real
/// wgpu objects tracked in the resource registry.
pub struct WgpuBackend {
    init: WgpuBackendInit,
    adapter: wgpu::Adapter,
    slot: DeviceSlot,
    resources: Option<ResourceRegistry>,
    state: PipelineState,
    frame_draws: u64,
}

impl WgpuBackend {
    /// Acquires an adapter and a logical device.
    pub async fn new(init: WgpuBackendInit) -> Result<Self> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: init.backends,
            ..Default::default()
        });

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: init.power_preference,
                compatible_surface: None,
                force_fallback_adapter: init.force_fallback_adapter,
            })
            .await
            .context("failed to find a suitable GPU adapter")?;

        let info = adapter.get_info();
        log::info!("using adapter `{}` ({:?})", info.name, info.backend);

        let (device, queue) = request_device(&adapter, &init).await?;

        Ok(Self {
            init,
            adapter,
            slot: DeviceSlot::new(device, queue),
            resources: None,
            state: PipelineState::default(),
            frame_draws: 0,
        })
    }

    /// Blocking variant of [`new`](Self::new).
    pub fn new_blocking(init: WgpuBackendInit) -> Result<Self> {
        pollster::block_on(Self::new(init))
    }

    /// Current logical device. Replaced on every device reset.
    pub fn device(&self) -> wgpu::Device {
        self.slot.handles().device
    }

    /// Destroys the current device, as a driver reset would.
    pub fn lose_device(&self) {
        log::warn!("destroying wgpu device on request");
        self.slot.mark_lost();
        self.slot.handles().device.destroy();
    }

    #[inline]
    pub fn primitive_state(&self) -> &wgpu::PrimitiveState {
        &self.state.primitive
    }

    pub fn sampler_state(&self, unit: usize) -> Option<&SamplerState> {
        self.state.units.get(unit).map(|b| &b.sampler)
    }

    /// Texture bound to `unit`, if the unit is enabled.
    pub fn bound_texture(&self, unit: usize) -> Option<TextureId> {
        self.state
            .units
            .get(unit)
            .filter(|b| b.enabled)
            .and_then(|b| b.texture)
    }

    pub fn clip_planes(&self) -> &[Plane] {
        &self.state.clip_planes
    }

    pub fn bound_program(&self, stage: ProgramStage) -> Option<&str> {
        self.state.programs.get(&stage).map(String::as_str)
    }

    /// Draws submitted since the last `begin_frame`.
    #[inline]
    pub fn frame_draws(&self) -> u64 {
        self.frame_draws
    }

    fn registry(&self) -> RenderResult<&ResourceRegistry> {
        self.resources
            .as_ref()
            .ok_or_else(|| RenderError::internal("wgpu backend is not initialised"))
    }

    fn ensure_device_live(&self) -> RenderResult<()> {
        if self.slot.is_lost() {
            return Err(RenderError::DeviceLost);
        }
        Ok(())
    }

    fn unit_mut(&mut self, unit: usize) -> Option<&mut UnitBinding> {
        let binding = self.state.units.get_mut(unit);
        if binding.is_none() {
            log::warn!("texture unit {unit} ignored (max {MAX_TEXTURE_LAYERS})");
        }
        binding
    }
}

impl RenderBackend for WgpuBackend {
    fn name(&self) -> &str {
        "wgpu-headless"
    }

    fn initialise(&mut self, resources: &ResourceRegistry) -> RenderResult<RenderCapabilities> {
        self.resources = Some(resources.clone());
        self.state = PipelineState::default();
        Ok(capabilities_from_limits(&self.adapter.limits()))
    }

    fn shutdown(&mut self) {
        self.resources = None;
        self.state = PipelineState::default();
        log::debug!("wgpu backend shut down");
    }

    fn create_render_window(
        &mut self,
        desc: &RenderWindowDesc,
        _primary: bool,
    ) -> RenderResult<Box<dyn RenderTarget>> {
        Err(RenderError::unsupported(format!(
            "headless wgpu backend cannot create window `{}`; use a render texture",
            desc.name
        )))
    }

    fn create_render_texture(
        &mut self,
        desc: &RenderTextureDesc,
    ) -> RenderResult<Box<dyn RenderTarget>> {
        self.ensure_device_live()?;

        let slot = self.slot.clone();
        let format = self.init.texture_format;
        let resource = self
            .registry()?
            .create_with(desc.name.clone(), || TextureNative::create(slot, desc, format))?;

        Ok(Box::new(WgpuRenderTexture::new(
            desc,
            self.init.clear_color,
            self.slot.clone(),
            resource,
        )))
    }

    fn create_occlusion_query(&mut self) -> RenderResult<Box<dyn OcclusionQuery>> {
        self.ensure_device_live()?;

        let slot = self.slot.clone();
        let resource = self
            .registry()?
            .create_with("occlusion query", || QuerySetNative::create(slot))?;
        Ok(Box::new(WgpuOcclusionQuery::new(resource)))
    }

    fn begin_frame(&mut self) -> RenderResult<()> {
        self.ensure_device_live()?;
        self.frame_draws = 0;
        Ok(())
    }

    fn end_frame(&mut self) -> RenderResult<()> {
        log::trace!("frame ended after {} draw(s)", self.frame_draws);
        Ok(())
    }

    fn draw(&mut self, op: &RenderOperation) -> RenderResult<()> {
        self.ensure_device_live()?;
        log::trace!("draw {:?} ({} elements)", op.topology, op.element_count());
        self.frame_draws += 1;
        Ok(())
    }

    fn set_clip_planes(&mut self, planes: &[Plane]) {
        self.state.clip_planes = planes.to_vec();
    }

    fn set_culling_mode(&mut self, mode: CullingMode) {
        self.state.primitive.cull_mode = cull_face(mode);
    }

    fn bind_gpu_program(&mut self, program: &GpuProgram) {
        self.state.programs.insert(program.stage, program.name.clone());
    }

    fn unbind_gpu_program(&mut self, stage: ProgramStage) {
        self.state.programs.remove(&stage);
    }

    fn bind_pass_iteration_parameters(&mut self, stage: ProgramStage, iteration: u32) {
        log::trace!("pass iteration {iteration} for {stage:?} program");
    }

    fn set_texture(&mut self, unit: usize, enabled: bool, texture: Option<TextureId>) {
        if let Some(binding) = self.unit_mut(unit) {
            binding.enabled = enabled;
            binding.texture = if enabled { texture } else { None };
        }
    }

    // Vertex and fragment stages share bindings under wgpu.
    fn vertex_texture_sampler(&mut self) -> Option<&mut dyn VertexTextureSampler> {
        None
    }

    fn set_texture_unit_filtering(&mut self, unit: usize, ty: FilterType, filter: FilterOptions) {
        let mode = filter_mode(filter);
        if let Some(binding) = self.unit_mut(unit) {
            match ty {
                FilterType::Min => binding.sampler.min_filter = mode,
                FilterType::Mag => binding.sampler.mag_filter = mode,
                FilterType::Mip => binding.sampler.mip_filter = mode,
            }
        }
    }

    fn set_texture_anisotropy(&mut self, unit: usize, max_anisotropy: u32) {
        if let Some(binding) = self.unit_mut(unit) {
            binding.sampler.anisotropy_clamp = anisotropy_clamp(max_anisotropy);
        }
    }

    fn set_texture_mipmap_bias(&mut self, unit: usize, bias: f32) {
        if let Some(binding) = self.unit_mut(unit) {
            binding.sampler.lod_bias = bias;
        }
    }

    fn set_texture_addressing_mode(&mut self, unit: usize, mode: &UvwAddressing) {
        if let Some(binding) = self.unit_mut(unit) {
            binding.sampler.address_mode = [
                address_mode(mode.u),
                address_mode(mode.v),
                address_mode(mode.w),
            ];
        }
    }

    fn is_device_lost(&self) -> bool {
        self.slot.is_lost()
    }

    fn reset_device(&mut self) -> RenderResult<()> {
        let (device, queue) = pollster::block_on(request_device(&self.adapter, &self.init))
            .map_err(|e| RenderError::DeviceResetFailed(format!("{e:#}")))?;
        self.slot.replace(device, queue);
        log::info!("wgpu device recreated");
        Ok(())
    }
}

/// Clockwise culling drops clockwise faces; front faces are counter-clockwise.
fn cull_face(mode: CullingMode) -> Option<wgpu::Face> {
    match mode {
        CullingMode::None => None,
        CullingMode::Clockwise => Some(wgpu::Face::Back),
        CullingMode::CounterClockwise => Some(wgpu::Face::Front),
    }
}

fn filter_mode(filter: FilterOptions) -> wgpu::FilterMode {
    match filter {
        FilterOptions::None | FilterOptions::Point => wgpu::FilterMode::Nearest,
        FilterOptions::Linear | FilterOptions::Anisotropic => wgpu::FilterMode::Linear,
    }
}

fn address_mode(mode: TextureAddressingMode) -> wgpu::AddressMode {
    match mode {
        TextureAddressingMode::Wrap => wgpu::AddressMode::Repeat,
        TextureAddressingMode::Mirror => wgpu::AddressMode::MirrorRepeat,
        TextureAddressingMode::Clamp => wgpu::AddressMode::ClampToEdge,
        TextureAddressingMode::Border => wgpu::AddressMode::ClampToBorder,
    }
}

// wgpu accepts 1..=16.
fn anisotropy_clamp(max_anisotropy: u32) -> u16 {
    max_anisotropy.clamp(1, 16) as u16
}

fn capabilities_from_limits(limits: &wgpu::Limits) -> RenderCapabilities {
    let units = limits
        .max_sampled_textures_per_shader_stage
        .min(MAX_TEXTURE_LAYERS as u32) as u16;

    RenderCapabilities {
        flags: Capabilities::HW_OCCLUSION
            | Capabilities::VERTEX_TEXTURE_FETCH
            | Capabilities::VERTEX_TEXTURE_UNITS_SHARED,
        texture_units: units,
        vertex_texture_units: units,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clockwise_culling_culls_back_faces() {
        assert_eq!(cull_face(CullingMode::Clockwise), Some(wgpu::Face::Back));
        assert_eq!(cull_face(CullingMode::CounterClockwise), Some(wgpu::Face::Front));
        assert_eq!(cull_face(CullingMode::None), None);

        let state = PipelineState::default();
        assert_eq!(state.primitive.front_face, wgpu::FrontFace::Ccw);
        assert_eq!(state.primitive.cull_mode, Some(wgpu::Face::Back));
    }

    #[test]
    fn anisotropic_filtering_maps_to_linear() {
        assert_eq!(filter_mode(FilterOptions::Anisotropic), wgpu::FilterMode::Linear);
        assert_eq!(filter_mode(FilterOptions::None), wgpu::FilterMode::Nearest);
        assert_eq!(anisotropy_clamp(0), 1);
        assert_eq!(anisotropy_clamp(64), 16);
    }

    #[test]
    fn addressing_modes() {
        assert_eq!(address_mode(TextureAddressingMode::Wrap), wgpu::AddressMode::Repeat);
        assert_eq!(address_mode(TextureAddressingMode::Border), wgpu::AddressMode::ClampToBorder);
    }

    #[test]
    fn capabilities_share_vertex_units() {
        let caps = capabilities_from_limits(&wgpu::Limits::default());
        assert!(caps.has(Capabilities::HW_OCCLUSION));
        assert!(!caps.has_separate_vertex_units());
        assert_eq!(caps.texture_units, MAX_TEXTURE_LAYERS as u16);

        let small = wgpu::Limits {
            max_sampled_textures_per_shader_stage: 4,
            ..wgpu::Limits::default()
        };
        assert_eq!(capabilities_from_limits(&small).texture_units, 4);
    }
}
