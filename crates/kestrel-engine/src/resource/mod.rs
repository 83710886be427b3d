//! GPU resource tracking.
//!
//! Every GPU-backed allocation is wrapped in a [`GpuResource`], which
//! registers itself with the device's [`ResourceRegistry`] on creation and
//! deregisters on drop. On device loss the registry walks every live entry to
//! release native handles, and walks again on reset to recreate them, while
//! application-held handles stay valid throughout.
//!
//! A single reentrant device-access lock per registry serialises native device
//! work (possibly from streaming threads) against the recovery walks.

mod handle;
mod registry;

pub use handle::{GpuResource, NativeResource, ResourcePhase};
pub use registry::{DeviceAccess, FailedResource, RecoveryReport, ResourceId, ResourceRegistry};
