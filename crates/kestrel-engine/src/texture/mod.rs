//! Texture-unit state and the binding policy applied on top of backends.
//!
//! Texture objects themselves (loading, pixel formats) live elsewhere; this
//! layer only refers to them through opaque [`TextureId`]s.

mod policy;
mod unit;

pub use policy::{TextureUnitPolicy, MAX_TEXTURE_LAYERS};
pub use unit::{
    FilterOptions,
    FilterType,
    TextureAddressingMode,
    TextureBindingType,
    TextureId,
    TextureUnitState,
    UvwAddressing,
};
