//! Core engine-facing contracts.
//!
//! Error taxonomy shared by every subsystem and the listener protocol used to
//! broadcast render-system events.

mod error;
mod events;

pub use error::{RenderError, RenderResult};
pub use events::{EventParams, ListenerId, ListenerList, RenderSystemListener};
