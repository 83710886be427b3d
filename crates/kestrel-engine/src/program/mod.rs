//! GPU program binding state and user clip planes.
//!
//! Binding the vertex stage can change the space clip planes are expressed in,
//! so the two are tracked together: stage transitions schedule a clip-plane
//! re-upload that the next draw performs once.

mod binding;
mod clip;

pub use binding::{GpuProgram, ProgramBindingState, ProgramStage};
pub use clip::{ClipPlaneState, Plane};
