//! Per-frame rendering statistics.
//!
//! Counters are reset by `RenderSystem::begin_geometry_count` and only grow
//! until the next reset. The render thread is the single writer.

mod frame;
mod op;

pub use frame::FrameStatistics;
pub use op::{RenderOperation, Topology};
