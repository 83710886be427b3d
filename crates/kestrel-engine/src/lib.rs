//! Kestrel engine crate.
//!
//! This crate owns the API-agnostic render-system layer: render target
//! ordering, GPU resource tracking across device loss, program binding state
//! and per-frame statistics. Graphics APIs plug in underneath through
//! [`backend::RenderBackend`].

pub mod backend;
pub mod core;
pub mod logging;
pub mod program;
pub mod resource;
pub mod stats;
pub mod system;
pub mod target;
pub mod texture;

#[cfg(test)]
mod test_support;

pub use crate::core::{RenderError, RenderResult};
pub use system::{FrameContext, RenderSystem, RenderSystemConfig};
