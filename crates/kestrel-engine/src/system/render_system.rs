use std::sync::atomic::{AtomicU64, Ordering};

use slotmap::SlotMap;

use crate::backend::{CullingMode, OcclusionQuery, QueryId, RenderBackend, RenderCapabilities};
use crate::core::{EventParams, ListenerId, ListenerList, RenderError, RenderResult, RenderSystemListener};
use crate::program::{ClipPlaneState, GpuProgram, Plane, ProgramBindingState, ProgramStage};
use crate::resource::{RecoveryReport, ResourceRegistry};
use crate::stats::{FrameStatistics, RenderOperation};
use crate::target::{
    RenderTarget,
    RenderTargetRegistry,
    RenderTextureDesc,
    RenderWindowDesc,
    MAX_PRIORITY_GROUPS,
};
use crate::texture::{TextureId, TextureUnitPolicy, TextureUnitState};

use super::{FrameContext, RenderSystemConfig};

/// Fired after every tracked resource released its native handle.
pub const EVENT_DEVICE_LOST: &str = "DeviceLost";
/// Fired after a device reset and the recreation walk.
pub const EVENT_DEVICE_RESTORED: &str = "DeviceRestored";

// Tokens are unique process-wide so a context cannot be resumed on another system.
static NEXT_PAUSE_TOKEN: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum FrameState {
    Idle,
    Open,
}

/// API-agnostic render system driving one backend.
pub struct RenderSystem<B: RenderBackend> {
    backend: B,

    targets: RenderTargetRegistry,
    active_target: Option<String>,

    resources: ResourceRegistry,
    queries: SlotMap<QueryId, Box<dyn OcclusionQuery>>,

    programs: ProgramBindingState,
    clip: ClipPlaneState,
    textures: TextureUnitPolicy,
    stats: FrameStatistics,
    listeners: ListenerList,

    real_caps: Option<RenderCapabilities>,
    custom_caps: Option<RenderCapabilities>,

    frame: FrameState,
    paused: Option<u64>,
    device_lost: bool,
    shut_down: bool,

    vsync: bool,
    vsync_interval: u32,
    wbuffer: bool,
    culling_mode: CullingMode,
    invert_vertex_winding: bool,
    default_window_size: (u32, u32),
    tex_proj_origin: Option<[f32; 3]>,
}

// construction & initialisation
impl<B: RenderBackend> RenderSystem<B> {
    pub fn new(backend: B, config: RenderSystemConfig) -> Self {
        Self {
            backend,
            targets: RenderTargetRegistry::new(),
            active_target: None,
            resources: ResourceRegistry::new(),
            queries: SlotMap::with_key(),
            programs: ProgramBindingState::new(),
            clip: ClipPlaneState::new(),
            textures: TextureUnitPolicy::new(),
            stats: FrameStatistics::new(),
            listeners: ListenerList::new(),
            real_caps: None,
            custom_caps: None,
            frame: FrameState::Idle,
            paused: None,
            device_lost: false,
            shut_down: false,
            vsync: config.vsync,
            vsync_interval: config.vsync_interval,
            wbuffer: config.wbuffer,
            culling_mode: config.culling_mode,
            invert_vertex_winding: config.invert_vertex_winding,
            default_window_size: config.default_window_size,
            tex_proj_origin: None,
        }
    }

    /// Brings up the backend and optionally creates the primary window.
    ///
    /// Returns the name of the auto-created window.
    pub fn initialise(
        &mut self,
        auto_create_window: bool,
        window_title: &str,
    ) -> RenderResult<Option<String>> {
        if self.real_caps.is_some() {
            return Err(RenderError::internal("render system is already initialised"));
        }

        self.programs.reset_bindings();

        let caps = self.backend.initialise(&self.resources)?;
        log::info!(
            "render system initialised on `{}` backend ({:?}, {} texture units)",
            self.backend.name(),
            caps.flags,
            caps.texture_units
        );
        self.real_caps = Some(caps);
        self.shut_down = false;
        self.backend.set_culling_mode(self.culling_mode);

        if !auto_create_window {
            return Ok(None);
        }

        let (width, height) = self.default_window_size;
        let names = self.create_render_windows(&[RenderWindowDesc::new(window_title, width, height)])?;
        Ok(names.into_iter().next())
    }

    #[inline]
    pub fn is_initialised(&self) -> bool {
        self.real_caps.is_some()
    }

    /// Overrides the capabilities reported by the backend.
    ///
    /// Only allowed before `initialise`.
    pub fn use_custom_capabilities(&mut self, caps: RenderCapabilities) -> RenderResult<()> {
        if self.real_caps.is_some() {
            return Err(RenderError::internal(
                "custom render capabilities must be set before the render system is initialised",
            ));
        }
        self.custom_caps = Some(caps);
        Ok(())
    }

    /// Capabilities in effect: custom ones if set, otherwise the backend's.
    pub fn capabilities(&self) -> Option<&RenderCapabilities> {
        self.custom_caps.as_ref().or(self.real_caps.as_ref())
    }

    pub fn real_capabilities(&self) -> Option<&RenderCapabilities> {
        self.real_caps.as_ref()
    }

    #[inline]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    #[inline]
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Registry every GPU resource of this device is tracked in.
    #[inline]
    pub fn resources(&self) -> &ResourceRegistry {
        &self.resources
    }

    fn ensure_initialised(&self) -> RenderResult<()> {
        if self.real_caps.is_none() {
            return Err(RenderError::internal("render system is not initialised"));
        }
        Ok(())
    }

    fn ensure_device_live(&self) -> RenderResult<()> {
        if self.device_lost {
            return Err(RenderError::DeviceLost);
        }
        Ok(())
    }
}

// render targets
impl<B: RenderBackend> RenderSystem<B> {
    /// Creates a batch of windows.
    ///
    /// The whole batch is validated before any native window exists; a backend
    /// failure midway destroys the windows already created for this batch.
    pub fn create_render_windows(&mut self, descs: &[RenderWindowDesc]) -> RenderResult<Vec<String>> {
        self.ensure_initialised()?;
        validate_window_batch(descs, &self.targets)?;

        let mut needs_primary = self.targets.primary().is_none();
        let mut created: Vec<String> = Vec::with_capacity(descs.len());

        for desc in descs {
            let primary = needs_primary;
            let result = self
                .backend
                .create_render_window(desc, primary)
                .and_then(|window| self.targets.attach(window));

            if let Err(e) = result {
                log::error!("failed to create render window `{}`: {e}", desc.name);
                for name in created.drain(..).rev() {
                    self.destroy_render_target(&name);
                }
                return Err(e);
            }

            needs_primary = false;
            log::info!(
                "created render window `{}` ({}x{}, priority {}{})",
                desc.name,
                desc.width,
                desc.height,
                desc.priority,
                if primary { ", primary" } else { "" }
            );
            created.push(desc.name.clone());
        }

        Ok(created)
    }

    pub fn create_render_window(&mut self, desc: RenderWindowDesc) -> RenderResult<String> {
        let mut names = self.create_render_windows(std::slice::from_ref(&desc))?;
        names
            .pop()
            .ok_or_else(|| RenderError::internal("window batch of one created nothing"))
    }

    pub fn create_render_texture(&mut self, desc: &RenderTextureDesc) -> RenderResult<String> {
        self.ensure_initialised()?;
        check_target_name(&desc.name, &self.targets)?;
        check_priority(&desc.name, desc.priority)?;
        check_size(&desc.name, desc.width, desc.height)?;

        let texture = self.backend.create_render_texture(desc)?;
        self.targets.attach(texture)?;
        log::debug!(
            "created render texture `{}` ({}x{}, priority {})",
            desc.name,
            desc.width,
            desc.height,
            desc.priority
        );
        Ok(desc.name.clone())
    }

    /// Hands an externally created target to the registry.
    pub fn attach_render_target(&mut self, target: Box<dyn RenderTarget>) -> RenderResult<()> {
        self.targets.attach(target)
    }

    /// Removes a target without destroying it. Clears the active target if it was this one.
    pub fn detach_render_target(&mut self, name: &str) -> Option<Box<dyn RenderTarget>> {
        let target = self.targets.detach(name)?;
        if self.active_target.as_deref() == Some(name) {
            self.active_target = None;
        }
        Some(target)
    }

    /// Detaches and destroys a target. Unknown names are ignored.
    pub fn destroy_render_target(&mut self, name: &str) {
        match self.detach_render_target(name) {
            Some(target) => {
                log::debug!("destroying render target `{name}`");
                drop(target);
            }
            None => log::debug!("destroy_render_target: no target named `{name}`"),
        }
    }

    pub fn render_target(&self, name: &str) -> Option<&dyn RenderTarget> {
        self.targets.get(name)
    }

    pub fn render_target_mut(&mut self, name: &str) -> Option<&mut (dyn RenderTarget + 'static)> {
        self.targets.get_mut(name)
    }

    #[inline]
    pub fn render_targets(&self) -> &RenderTargetRegistry {
        &self.targets
    }

    pub fn set_active_render_target(&mut self, name: &str) -> RenderResult<()> {
        if !self.targets.contains(name) {
            return Err(RenderError::InvalidParameters(format!(
                "no render target named `{name}`"
            )));
        }
        self.active_target = Some(name.to_owned());
        Ok(())
    }

    pub fn active_render_target(&self) -> Option<&str> {
        self.active_target.as_deref()
    }

    /// Updates all active targets in priority order, optionally swapping each.
    pub fn update_all_render_targets(&mut self, swap_buffers: bool) -> RenderResult<()> {
        self.ensure_device_live()?;
        let result = self.targets.update_all(swap_buffers, self.vsync);
        self.observe_device_error(result)
    }

    /// Swaps all active targets in priority order.
    pub fn swap_all_render_target_buffers(&mut self, wait_for_vsync: bool) -> RenderResult<()> {
        self.ensure_device_live()?;
        let result = self.targets.swap_all(wait_for_vsync);
        self.observe_device_error(result)
    }

    // A single resource left lost by a reset is not a device loss; only the
    // backend decides that.
    fn observe_device_error(&mut self, result: RenderResult<()>) -> RenderResult<()> {
        if let Err(RenderError::DeviceLost) = result {
            if self.backend.is_device_lost() {
                self.notify_device_lost();
            } else {
                log::debug!("`DeviceLost` reported while the `{}` device is live", self.backend.name());
            }
        }
        result
    }
}

// frame lifecycle & statistics
impl<B: RenderBackend> RenderSystem<B> {
    pub fn begin_frame(&mut self) -> RenderResult<()> {
        self.ensure_initialised()?;
        if !self.device_lost && self.backend.is_device_lost() {
            self.notify_device_lost();
        }
        self.ensure_device_live()?;
        if self.frame == FrameState::Open {
            return Err(RenderError::internal("begin_frame called while a frame is open"));
        }

        self.backend.begin_frame()?;
        self.frame = FrameState::Open;
        Ok(())
    }

    pub fn end_frame(&mut self) -> RenderResult<()> {
        if self.frame != FrameState::Open {
            return Err(RenderError::internal("end_frame called without an open frame"));
        }
        self.frame = FrameState::Idle;
        self.backend.end_frame()
    }

    #[inline]
    pub fn is_frame_open(&self) -> bool {
        self.frame == FrameState::Open
    }

    /// Ends the open frame and captures what is needed to continue it later.
    ///
    /// Unrelated frames may be rendered between pause and resume.
    pub fn pause_frame(&mut self) -> RenderResult<FrameContext> {
        if self.paused.is_some() {
            return Err(RenderError::internal("a frame is already paused"));
        }
        self.end_frame()?;

        let token = NEXT_PAUSE_TOKEN.fetch_add(1, Ordering::Relaxed);
        self.paused = Some(token);
        log::debug!("frame paused (token {token})");

        Ok(FrameContext {
            token,
            statistics: self.stats,
            active_target: self.active_target.clone(),
        })
    }

    /// Reopens the frame captured by `context`, restoring its statistics and active target.
    pub fn resume_frame(&mut self, context: FrameContext) -> RenderResult<()> {
        if self.paused != Some(context.token) {
            return Err(RenderError::internal(
                "frame context was not issued by the current pause of this render system",
            ));
        }
        if self.frame == FrameState::Open {
            return Err(RenderError::internal(
                "cannot resume a paused frame while another frame is open",
            ));
        }

        self.backend.begin_frame()?;
        self.frame = FrameState::Open;
        self.paused = None;
        self.stats = context.statistics;
        self.active_target = context
            .active_target
            .filter(|name| self.targets.contains(name));
        log::debug!("frame resumed (token {})", context.token);
        Ok(())
    }

    /// Resets the per-frame counters. Call once per frame before drawing.
    #[inline]
    pub fn begin_geometry_count(&mut self) {
        self.stats.reset();
    }

    #[inline]
    pub fn statistics(&self) -> &FrameStatistics {
        &self.stats
    }

    #[inline]
    pub fn batch_count(&self) -> u64 {
        self.stats.batch_count()
    }

    #[inline]
    pub fn face_count(&self) -> u64 {
        self.stats.face_count()
    }

    #[inline]
    pub fn vertex_count(&self) -> u64 {
        self.stats.vertex_count()
    }

    /// Records statistics, uploads pending clip planes and submits the draw.
    pub fn render(&mut self, op: &RenderOperation) -> RenderResult<()> {
        self.ensure_device_live()?;

        // Uploaded here rather than on mutation: the bound vertex program
        // decides the space the planes are interpreted in.
        if let Some(planes) = self.clip.take_dirty() {
            self.backend.set_clip_planes(planes);
        }

        let result = self.backend.draw(op);

        // Later iterations of a multi-pass draw were counted by the first.
        if result.is_ok() && self.programs.pass_iteration_index() == 0 {
            self.stats.record(op, self.programs.pass_iteration_count());
        }
        self.observe_device_error(result)
    }
}

// programs & pass iteration
impl<B: RenderBackend> RenderSystem<B> {
    pub fn bind_gpu_program(&mut self, program: &GpuProgram) {
        self.mark_clip_planes_for_stage(program.stage, true);
        self.programs.set_bound(program.stage, true);
        self.backend.bind_gpu_program(program);
    }

    pub fn unbind_gpu_program(&mut self, stage: ProgramStage) {
        self.mark_clip_planes_for_stage(stage, false);
        self.programs.set_bound(stage, false);
        self.backend.unbind_gpu_program(stage);
    }

    // Vertex programs can change clip space; only an actual transition counts.
    fn mark_clip_planes_for_stage(&mut self, stage: ProgramStage, bind: bool) {
        if stage == ProgramStage::Vertex
            && self.programs.is_bound(stage) != bind
            && !self.clip.is_empty()
        {
            self.clip.mark_dirty();
        }
    }

    #[inline]
    pub fn is_gpu_program_bound(&self, stage: ProgramStage) -> bool {
        self.programs.is_bound(stage)
    }

    /// Number of times the current pass is rendered; 0 is treated as 1.
    pub fn set_current_pass_iteration_count(&mut self, count: u32) {
        self.programs.set_pass_iteration_count(count);
    }

    #[inline]
    pub fn current_pass_iteration_count(&self) -> u32 {
        self.programs.pass_iteration_count()
    }

    /// Advances to the next pass iteration.
    ///
    /// Re-binds iteration parameters of every bound stage and returns whether
    /// another iteration remains to be rendered.
    pub fn update_pass_iteration_render_state(&mut self) -> bool {
        if !self.programs.advance_iteration() {
            self.programs.restart_iterations();
            return false;
        }

        let iteration = self.programs.pass_iteration_index();
        for stage in self.programs.bound_stages() {
            self.backend.bind_pass_iteration_parameters(stage, iteration);
        }
        true
    }
}

// clip planes
impl<B: RenderBackend> RenderSystem<B> {
    pub fn add_clip_plane(&mut self, plane: Plane) {
        self.clip.add(plane);
    }

    pub fn set_clip_planes(&mut self, planes: &[Plane]) {
        self.clip.set(planes);
    }

    pub fn reset_clip_planes(&mut self) {
        self.clip.reset();
    }

    #[inline]
    pub fn clip_planes(&self) -> &[Plane] {
        self.clip.planes()
    }

    /// `true` while a clip-plane upload is pending for the next draw.
    #[inline]
    pub fn clip_planes_dirty(&self) -> bool {
        self.clip.is_dirty()
    }
}

// texture units
impl<B: RenderBackend> RenderSystem<B> {
    pub fn set_texture_unit_settings(
        &mut self,
        unit: usize,
        texture: Option<TextureId>,
        state: &TextureUnitState,
    ) -> RenderResult<()> {
        let caps = self
            .capabilities()
            .cloned()
            .ok_or_else(|| RenderError::internal("render system is not initialised"))?;
        self.textures.apply(&mut self.backend, &caps, unit, texture, state)
    }

    /// Binds a texture to a separate vertex sampler.
    pub fn set_vertex_texture(&mut self, unit: usize, texture: Option<TextureId>) -> RenderResult<()> {
        let sampler = self.backend.vertex_texture_sampler().ok_or_else(|| {
            RenderError::unsupported(
                "this backend does not support separate vertex texture samplers; \
                 use the texture units shared with the fragment stage",
            )
        })?;
        sampler.set_vertex_texture(unit, texture);
        Ok(())
    }

    pub fn disable_texture_unit(&mut self, unit: usize) -> RenderResult<()> {
        self.textures.disable_unit(&mut self.backend, unit)
    }

    pub fn disable_texture_units_from(&mut self, unit: usize) {
        self.textures.disable_units_from(&mut self.backend, unit);
    }
}

// render-state flags
impl<B: RenderBackend> RenderSystem<B> {
    #[inline]
    pub fn wait_for_vertical_blank(&self) -> bool {
        self.vsync
    }

    pub fn set_wait_for_vertical_blank(&mut self, enabled: bool) {
        self.vsync = enabled;
    }

    #[inline]
    pub fn vsync_interval(&self) -> u32 {
        self.vsync_interval
    }

    pub fn set_vsync_interval(&mut self, interval: u32) {
        self.vsync_interval = interval.max(1);
    }

    #[inline]
    pub fn wbuffer_enabled(&self) -> bool {
        self.wbuffer
    }

    pub fn set_wbuffer_enabled(&mut self, enabled: bool) {
        self.wbuffer = enabled;
    }

    #[inline]
    pub fn culling_mode(&self) -> CullingMode {
        self.culling_mode
    }

    pub fn set_culling_mode(&mut self, mode: CullingMode) {
        self.culling_mode = mode;
        self.backend.set_culling_mode(mode);
    }

    #[inline]
    pub fn invert_vertex_winding(&self) -> bool {
        self.invert_vertex_winding
    }

    pub fn set_invert_vertex_winding(&mut self, invert: bool) {
        self.invert_vertex_winding = invert;
    }

    /// Makes projective texturing relative to `origin` (e.g. the camera position).
    pub fn set_texture_projection_relative_to(&mut self, enabled: bool, origin: [f32; 3]) {
        self.tex_proj_origin = enabled.then_some(origin);
    }

    pub fn texture_projection_relative_origin(&self) -> Option<[f32; 3]> {
        self.tex_proj_origin
    }
}

// listeners
impl<B: RenderBackend> RenderSystem<B> {
    pub fn add_listener(&mut self, listener: Box<dyn RenderSystemListener>) -> ListenerId {
        self.listeners.add(listener)
    }

    pub fn remove_listener(&mut self, id: ListenerId) -> Option<Box<dyn RenderSystemListener>> {
        self.listeners.remove(id)
    }

    pub fn fire_event(&mut self, name: &str, params: Option<&EventParams>) {
        self.listeners.fire(name, params);
    }
}

// occlusion queries
impl<B: RenderBackend> RenderSystem<B> {
    pub fn create_occlusion_query(&mut self) -> RenderResult<QueryId> {
        self.ensure_initialised()?;
        let query = self.backend.create_occlusion_query()?;
        Ok(self.queries.insert(query))
    }

    pub fn occlusion_query_mut(&mut self, id: QueryId) -> Option<&mut (dyn OcclusionQuery + 'static)> {
        self.queries.get_mut(id).map(|q| q.as_mut())
    }

    /// Destroys the query. Returns `false` if it does not exist.
    pub fn destroy_occlusion_query(&mut self, id: QueryId) -> bool {
        self.queries.remove(id).is_some()
    }

    #[inline]
    pub fn occlusion_query_count(&self) -> usize {
        self.queries.len()
    }
}

// device loss
impl<B: RenderBackend> RenderSystem<B> {
    #[inline]
    pub fn is_device_lost(&self) -> bool {
        self.device_lost
    }

    /// Releases every tracked resource after the backend lost its device.
    ///
    /// Target updates and draws fail with `DeviceLost` until `restore_device`.
    pub fn notify_device_lost(&mut self) {
        if self.device_lost {
            return;
        }
        self.device_lost = true;

        let released = self.resources.release_all();
        log::warn!("device lost on `{}` backend; {released} resource(s) released", self.backend.name());

        let params = EventParams::new().with("released", released);
        self.listeners.fire(EVENT_DEVICE_LOST, Some(&params));
    }

    /// Resets the backend device and recreates every lost resource.
    ///
    /// Resources that fail to recreate stay lost and are listed in the report;
    /// rendering resumes regardless.
    pub fn restore_device(&mut self) -> RenderResult<RecoveryReport> {
        if !self.device_lost {
            log::debug!("restore_device: device is not lost");
            return Ok(RecoveryReport::default());
        }

        let report = {
            let _access = self.resources.lock_device();
            self.backend.reset_device().map_err(|e| match e {
                RenderError::DeviceResetFailed(_) => e,
                other => RenderError::DeviceResetFailed(other.to_string()),
            })?;
            self.resources.recreate_all()
        };
        self.device_lost = false;

        if report.is_complete() {
            log::info!("device restored; {} resource(s) recreated", report.recovered);
        } else {
            log::warn!(
                "device restored with {} resource(s) still lost ({} recreated)",
                report.failed.len(),
                report.recovered
            );
        }

        let params = EventParams::new()
            .with("recovered", report.recovered)
            .with("failed", report.failed.len());
        self.listeners.fire(EVENT_DEVICE_RESTORED, Some(&params));

        Ok(report)
    }
}

// shutdown
impl<B: RenderBackend> RenderSystem<B> {
    /// Destroys queries, then targets (primary last), then shuts the backend down.
    ///
    /// Idempotent; also run on drop.
    pub fn shutdown(&mut self) {
        if self.shut_down {
            return;
        }
        self.shut_down = true;

        self.queries.clear();
        self.targets.destroy_all();
        self.active_target = None;
        self.frame = FrameState::Idle;
        self.paused = None;

        if self.real_caps.take().is_some() {
            self.backend.shutdown();
            log::info!("render system on `{}` backend shut down", self.backend.name());
        }
    }
}

impl<B: RenderBackend> Drop for RenderSystem<B> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn check_target_name(name: &str, targets: &RenderTargetRegistry) -> RenderResult<()> {
    if targets.contains(name) {
        return Err(RenderError::configuration(format!(
            "duplicate target name: a render target named `{name}` already exists"
        )));
    }
    Ok(())
}

fn check_priority(name: &str, priority: u8) -> RenderResult<()> {
    if priority >= MAX_PRIORITY_GROUPS {
        return Err(RenderError::configuration(format!(
            "render target `{name}` has priority {priority}, must be below {MAX_PRIORITY_GROUPS}"
        )));
    }
    Ok(())
}

fn check_size(name: &str, width: u32, height: u32) -> RenderResult<()> {
    if width == 0 || height == 0 {
        return Err(RenderError::InvalidParameters(format!(
            "render target `{name}` has zero size ({width}x{height})"
        )));
    }
    Ok(())
}

/// Validates a window batch against the registry and itself.
fn validate_window_batch(descs: &[RenderWindowDesc], targets: &RenderTargetRegistry) -> RenderResult<()> {
    let mut full_screen = 0usize;

    for (i, desc) in descs.iter().enumerate() {
        if desc.full_screen {
            full_screen += 1;
        }

        check_target_name(&desc.name, targets)?;
        if descs[i + 1..].iter().any(|d| d.name == desc.name) {
            return Err(RenderError::configuration(format!(
                "duplicate target name: `{}` is requested more than once in the batch",
                desc.name
            )));
        }
        check_priority(&desc.name, desc.priority)?;
        check_size(&desc.name, desc.width, desc.height)?;
    }

    if full_screen > 0 && full_screen != descs.len() {
        return Err(RenderError::InvalidParameters(
            "cannot create a mix of full screen and windowed render windows".into(),
        ));
    }
    Ok(())
}
