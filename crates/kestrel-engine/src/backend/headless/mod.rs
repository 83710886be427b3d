//! Headless wgpu backend.
//!
//! This module is responsible for:
//! - creating the wgpu Instance/Adapter/Device/Queue without a surface
//! - render textures and occlusion queries as tracked GPU resources
//! - observing device loss and requesting a replacement device on reset

mod backend;
mod device;
mod init;
mod query;
mod target;

pub use backend::{SamplerState, WgpuBackend};
pub use init::WgpuBackendInit;
