use anyhow::{Context, Result};
use kestrel_engine::backend::headless::{WgpuBackend, WgpuBackendInit};
use kestrel_engine::core::{EventParams, RenderError, RenderSystemListener};
use kestrel_engine::logging::{init_logging, LoggingConfig};
use kestrel_engine::program::{GpuProgram, Plane, ProgramStage};
use kestrel_engine::stats::{RenderOperation, Topology};
use kestrel_engine::target::RenderTextureDesc;
use kestrel_engine::{RenderSystem, RenderSystemConfig};

const FRAMES_PER_PHASE: u32 = 3;

/// Logs every render-system event with its parameters.
struct EventLog;

impl RenderSystemListener for EventLog {
    fn event_occurred(&mut self, name: &str, params: Option<&EventParams>) {
        let params = params
            .map(|p| {
                p.iter()
                    .map(|(k, v)| format!("{k}={v}"))
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .unwrap_or_default();
        log::info!("event `{name}` {params}");
    }
}

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    let init = WgpuBackendInit {
        force_fallback_adapter: std::env::var_os("KESTREL_FALLBACK_ADAPTER").is_some(),
        ..WgpuBackendInit::default()
    };
    let backend = WgpuBackend::new_blocking(init).context("wgpu bring-up failed")?;

    let mut rs = RenderSystem::new(backend, RenderSystemConfig::default());
    rs.initialise(false, "kestrel studio")?;
    rs.add_listener(Box::new(EventLog));

    rs.create_render_texture(&RenderTextureDesc::new("shadow", 1024, 1024).priority(1))?;
    rs.create_render_texture(&RenderTextureDesc::new("reflection", 512, 512))?;
    let query = rs.create_occlusion_query()?;

    rs.bind_gpu_program(&GpuProgram::new("studio.vert", ProgramStage::Vertex));
    rs.bind_gpu_program(&GpuProgram::new("studio.frag", ProgramStage::Fragment));
    rs.add_clip_plane(Plane::new(0.0, 1.0, 0.0, 0.0));

    for frame in 0..FRAMES_PER_PHASE {
        run_frame(&mut rs, frame)?;
    }

    if let Some(q) = rs.occlusion_query_mut(query) {
        q.begin()?;
        q.end()?;
        log::info!("occlusion query pixel count: {:?}", q.last_pixel_count());
    }

    // Simulate a driver reset and recover from it.
    rs.backend().lose_device();
    match rs.begin_frame() {
        Err(RenderError::DeviceLost) => log::warn!("frame refused while the device is lost"),
        other => other.context("expected the lost device to refuse the frame")?,
    }

    let report = rs.restore_device()?;
    for failed in &report.failed {
        log::warn!("`{}` stayed lost: {}", failed.label, failed.error);
    }

    for frame in FRAMES_PER_PHASE..FRAMES_PER_PHASE * 2 {
        run_frame(&mut rs, frame)?;
    }

    rs.shutdown();
    Ok(())
}

fn run_frame(rs: &mut RenderSystem<WgpuBackend>, frame: u32) -> Result<()> {
    rs.begin_frame()?;
    rs.begin_geometry_count();

    rs.render(&RenderOperation::indexed(Topology::TriangleList, 24, 36))?;
    rs.render(&RenderOperation::non_indexed(Topology::TriangleStrip, 4))?;

    // A two-iteration pass, e.g. one draw per light.
    rs.set_current_pass_iteration_count(2);
    let lit = RenderOperation::indexed(Topology::TriangleList, 512, 1500);
    loop {
        rs.render(&lit)?;
        if !rs.update_pass_iteration_render_state() {
            break;
        }
    }

    rs.update_all_render_targets(true)?;
    rs.end_frame()?;

    log::info!(
        "frame {frame}: {} batches, {} faces, {} vertices ({} backend draws)",
        rs.batch_count(),
        rs.face_count(),
        rs.vertex_count(),
        rs.backend().frame_draws()
    );
    Ok(())
}
