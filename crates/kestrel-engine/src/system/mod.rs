//! Render-system orchestrator.
//!
//! [`RenderSystem`] composes the target registry, resource registry, program
//! binding state, clip planes, texture-unit policy and frame statistics on top
//! of one injected [`RenderBackend`](crate::backend::RenderBackend).
//!
//! Per-frame driver contract:
//! `begin_frame → begin_geometry_count → render* (+ pass-iteration loop) →
//! update/swap targets → end_frame`, optionally interrupted by
//! `pause_frame`/`resume_frame`.

mod config;
mod frame;
mod render_system;

pub use config::RenderSystemConfig;
pub use frame::FrameContext;
pub use render_system::{RenderSystem, EVENT_DEVICE_LOST, EVENT_DEVICE_RESTORED};
