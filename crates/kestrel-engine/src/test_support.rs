//! Recording doubles shared by the unit tests.

use std::cell::RefCell;
use std::rc::Rc;

use crate::backend::{
    CullingMode,
    OcclusionQuery,
    RenderBackend,
    RenderCapabilities,
    VertexTextureSampler,
};
use crate::core::{EventParams, RenderError, RenderResult, RenderSystemListener};
use crate::program::{GpuProgram, Plane, ProgramStage};
use crate::resource::{NativeResource, ResourceRegistry};
use crate::stats::RenderOperation;
use crate::target::{RenderTarget, RenderTextureDesc, RenderWindowDesc, TargetKind};
use crate::texture::{FilterOptions, FilterType, TextureId, UvwAddressing};

/// Shared append-only log.
#[derive(Debug, Clone, Default)]
pub(crate) struct Journal(Rc<RefCell<Vec<String>>>);

impl Journal {
    pub(crate) fn push(&self, entry: impl Into<String>) {
        self.0.borrow_mut().push(entry.into());
    }

    pub(crate) fn entries(&self) -> Vec<String> {
        self.0.borrow().clone()
    }

    /// Returns and clears the recorded entries.
    pub(crate) fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.0.borrow_mut())
    }
}

fn tex(texture: Option<TextureId>) -> String {
    texture.map_or_else(|| "-".to_owned(), |t| t.0.to_string())
}

// ── targets ───────────────────────────────────────────────────────────────

pub(crate) struct RecordingTarget {
    journal: Journal,
    name: String,
    priority: u8,
    kind: TargetKind,
    active: bool,
    primary: bool,
    size: (u32, u32),
}

impl RecordingTarget {
    pub(crate) fn new(journal: &Journal, name: &str, priority: u8, kind: TargetKind) -> Self {
        Self {
            journal: journal.clone(),
            name: name.to_owned(),
            priority,
            kind,
            active: true,
            primary: false,
            size: (64, 64),
        }
    }

    pub(crate) fn primary(journal: &Journal, name: &str, priority: u8) -> Self {
        let mut target = Self::new(journal, name, priority, TargetKind::Window);
        target.primary = true;
        target
    }
}

impl RenderTarget for RecordingTarget {
    fn name(&self) -> &str {
        &self.name
    }

    fn priority(&self) -> u8 {
        self.priority
    }

    fn kind(&self) -> TargetKind {
        self.kind
    }

    fn size(&self) -> (u32, u32) {
        self.size
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    fn is_primary(&self) -> bool {
        self.primary
    }

    fn update(&mut self) -> RenderResult<()> {
        self.journal.push(format!("update:{}", self.name));
        Ok(())
    }

    fn swap_buffers(&mut self, wait_for_vsync: bool) -> RenderResult<()> {
        self.journal.push(format!("swap:{}:{wait_for_vsync}", self.name));
        Ok(())
    }
}

impl Drop for RecordingTarget {
    fn drop(&mut self) {
        self.journal.push(format!("drop:{}", self.name));
    }
}

// ── resources ─────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub(crate) struct FlakyResource {
    pub(crate) fail_recreate: bool,
    pub(crate) released: u32,
    pub(crate) recreated: u32,
}

impl FlakyResource {
    pub(crate) fn healthy() -> Self {
        Self::default()
    }

    pub(crate) fn failing() -> Self {
        Self {
            fail_recreate: true,
            ..Self::default()
        }
    }
}

impl NativeResource for FlakyResource {
    fn release(&mut self) {
        self.released += 1;
    }

    fn recreate(&mut self) -> RenderResult<()> {
        if self.fail_recreate {
            return Err(RenderError::DeviceResetFailed("out of video memory".into()));
        }
        self.recreated += 1;
        Ok(())
    }
}

// ── queries ───────────────────────────────────────────────────────────────

pub(crate) struct RecordingQuery {
    calls: Journal,
    outstanding: bool,
}

impl OcclusionQuery for RecordingQuery {
    fn begin(&mut self) -> RenderResult<()> {
        self.calls.push("query_begin");
        Ok(())
    }

    fn end(&mut self) -> RenderResult<()> {
        self.calls.push("query_end");
        self.outstanding = true;
        Ok(())
    }

    fn is_still_outstanding(&self) -> bool {
        self.outstanding
    }

    fn last_pixel_count(&self) -> Option<u64> {
        None
    }
}

impl Drop for RecordingQuery {
    fn drop(&mut self) {
        self.calls.push("drop_query");
    }
}

// ── backend ───────────────────────────────────────────────────────────────

pub(crate) struct RecordingSampler {
    calls: Journal,
}

impl VertexTextureSampler for RecordingSampler {
    fn set_vertex_texture(&mut self, unit: usize, texture: Option<TextureId>) {
        self.calls.push(format!("vertex_texture:{unit}:{}", tex(texture)));
    }
}

/// Backend that records every call as a short string.
pub(crate) struct RecordingBackend {
    calls: Journal,
    targets: Journal,
    caps: RenderCapabilities,
    sampler: Option<RecordingSampler>,
    pub(crate) device_lost: bool,
    pub(crate) fail_draw: bool,
    pub(crate) fail_reset: bool,
    pub(crate) refuse_window: Option<String>,
}

impl RecordingBackend {
    pub(crate) fn new() -> Self {
        Self {
            calls: Journal::default(),
            targets: Journal::default(),
            caps: RenderCapabilities::default(),
            sampler: None,
            device_lost: false,
            fail_draw: false,
            fail_reset: false,
            refuse_window: None,
        }
    }

    pub(crate) fn with_vertex_sampler(mut self) -> Self {
        self.sampler = Some(RecordingSampler {
            calls: self.calls.clone(),
        });
        self
    }

    /// Routes target entries into the call journal so cross-kind order is visible.
    pub(crate) fn single_journal(mut self) -> Self {
        self.targets = self.calls.clone();
        self
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.entries()
    }

    pub(crate) fn take_calls(&self) -> Vec<String> {
        self.calls.take()
    }

    /// Journal the created targets write update/swap/drop entries to.
    pub(crate) fn target_journal(&self) -> Journal {
        self.targets.clone()
    }
}

impl RenderBackend for RecordingBackend {
    fn name(&self) -> &str {
        "recording"
    }

    fn initialise(&mut self, _resources: &ResourceRegistry) -> RenderResult<RenderCapabilities> {
        self.calls.push("initialise");
        Ok(self.caps.clone())
    }

    fn shutdown(&mut self) {
        self.calls.push("shutdown");
    }

    fn create_render_window(
        &mut self,
        desc: &RenderWindowDesc,
        primary: bool,
    ) -> RenderResult<Box<dyn RenderTarget>> {
        if self.refuse_window.as_deref() == Some(desc.name.as_str()) {
            return Err(RenderError::internal(format!("native window `{}` refused", desc.name)));
        }
        self.calls.push(format!("create_window:{}", desc.name));
        let mut target = RecordingTarget::new(&self.targets, &desc.name, desc.priority, TargetKind::Window);
        target.primary = primary;
        target.size = (desc.width, desc.height);
        Ok(Box::new(target))
    }

    fn create_render_texture(
        &mut self,
        desc: &RenderTextureDesc,
    ) -> RenderResult<Box<dyn RenderTarget>> {
        self.calls.push(format!("create_texture:{}", desc.name));
        let mut target = RecordingTarget::new(&self.targets, &desc.name, desc.priority, TargetKind::Texture);
        target.size = (desc.width, desc.height);
        Ok(Box::new(target))
    }

    fn create_occlusion_query(&mut self) -> RenderResult<Box<dyn OcclusionQuery>> {
        self.calls.push("create_query");
        Ok(Box::new(RecordingQuery {
            calls: self.calls.clone(),
            outstanding: false,
        }))
    }

    fn begin_frame(&mut self) -> RenderResult<()> {
        self.calls.push("begin_frame");
        Ok(())
    }

    fn end_frame(&mut self) -> RenderResult<()> {
        self.calls.push("end_frame");
        Ok(())
    }

    fn draw(&mut self, _op: &RenderOperation) -> RenderResult<()> {
        if self.fail_draw {
            return Err(RenderError::internal("draw rejected"));
        }
        self.calls.push("draw");
        Ok(())
    }

    fn set_clip_planes(&mut self, planes: &[Plane]) {
        self.calls.push(format!("clip_planes:{}", planes.len()));
    }

    fn set_culling_mode(&mut self, mode: CullingMode) {
        self.calls.push(format!("culling:{mode:?}"));
    }

    fn bind_gpu_program(&mut self, program: &GpuProgram) {
        self.calls.push(format!("bind:{:?}:{}", program.stage, program.name));
    }

    fn unbind_gpu_program(&mut self, stage: ProgramStage) {
        self.calls.push(format!("unbind:{stage:?}"));
    }

    fn bind_pass_iteration_parameters(&mut self, stage: ProgramStage, iteration: u32) {
        self.calls.push(format!("iteration:{stage:?}:{iteration}"));
    }

    fn set_texture(&mut self, unit: usize, enabled: bool, texture: Option<TextureId>) {
        let state = if enabled { "on" } else { "off" };
        self.calls.push(format!("set_texture:{unit}:{state}:{}", tex(texture)));
    }

    fn vertex_texture_sampler(&mut self) -> Option<&mut dyn VertexTextureSampler> {
        self.sampler
            .as_mut()
            .map(|s| s as &mut dyn VertexTextureSampler)
    }

    fn set_texture_unit_filtering(&mut self, unit: usize, ty: FilterType, filter: FilterOptions) {
        self.calls.push(format!("filter:{unit}:{ty:?}:{filter:?}"));
    }

    fn set_texture_anisotropy(&mut self, unit: usize, max_anisotropy: u32) {
        self.calls.push(format!("anisotropy:{unit}:{max_anisotropy}"));
    }

    fn set_texture_mipmap_bias(&mut self, unit: usize, bias: f32) {
        self.calls.push(format!("mip_bias:{unit}:{bias}"));
    }

    fn set_texture_addressing_mode(&mut self, unit: usize, _mode: &UvwAddressing) {
        self.calls.push(format!("addressing:{unit}"));
    }

    fn is_device_lost(&self) -> bool {
        self.device_lost
    }

    fn reset_device(&mut self) -> RenderResult<()> {
        if self.fail_reset {
            return Err(RenderError::DeviceResetFailed("adapter removed".into()));
        }
        self.calls.push("reset_device");
        self.device_lost = false;
        Ok(())
    }
}

// ── listeners ─────────────────────────────────────────────────────────────

/// Records `name[k=v,...]` for each event.
pub(crate) struct RecordingListener(pub(crate) Journal);

impl RenderSystemListener for RecordingListener {
    fn event_occurred(&mut self, name: &str, params: Option<&EventParams>) {
        let entry = match params {
            Some(p) => {
                let pairs: Vec<String> = p.iter().map(|(k, v)| format!("{k}={v}")).collect();
                format!("{name}[{}]", pairs.join(","))
            }
            None => name.to_owned(),
        };
        self.0.push(entry);
    }
}
