//! Backend capability set.
//!
//! A backend wraps one native graphics API. The render system owns exactly one
//! backend and drives it; optional features are exposed as capabilities the
//! system queries at runtime rather than methods that fail by default.

mod backend;
mod caps;
mod query;
pub mod headless;

pub use backend::{CullingMode, RenderBackend, VertexTextureSampler};
pub use caps::{Capabilities, RenderCapabilities};
pub use query::{OcclusionQuery, QueryId};
