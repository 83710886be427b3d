//! Render targets and their ordered registry.
//!
//! Responsibilities:
//! - describe windows and off-screen textures in an API-agnostic way
//! - keep targets addressable by unique name
//! - provide a deterministic update/swap order (priority, then insertion order)

mod desc;
mod key;
mod registry;
mod target;

pub use desc::{
    RenderTextureDesc,
    RenderWindowDesc,
    DEFAULT_TEXTURE_PRIORITY,
    DEFAULT_WINDOW_PRIORITY,
    MAX_PRIORITY_GROUPS,
};
pub use key::PriorityKey;
pub use registry::RenderTargetRegistry;
pub use target::{RenderTarget, TargetKind};
