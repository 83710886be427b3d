use bitflags::bitflags;

bitflags! {
    /// Optional hardware features a backend may expose.
    #[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
    pub struct Capabilities: u32 {
        /// Vertex programs can sample textures.
        const VERTEX_TEXTURE_FETCH = 1 << 0;
        /// Vertex and fragment stages share the same texture units.
        const VERTEX_TEXTURE_UNITS_SHARED = 1 << 1;
        const HW_OCCLUSION = 1 << 2;
        const USER_CLIP_PLANES = 1 << 3;
        const GEOMETRY_PROGRAM = 1 << 4;
    }
}

/// Capabilities reported by a backend, or forced by the application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderCapabilities {
    pub flags: Capabilities,
    pub texture_units: u16,
    pub vertex_texture_units: u16,
}

impl RenderCapabilities {
    #[inline]
    pub fn has(&self, cap: Capabilities) -> bool {
        self.flags.contains(cap)
    }

    /// Vertex textures bind through units separate from the fragment stage.
    #[inline]
    pub fn has_separate_vertex_units(&self) -> bool {
        self.has(Capabilities::VERTEX_TEXTURE_FETCH)
            && !self.has(Capabilities::VERTEX_TEXTURE_UNITS_SHARED)
    }
}

impl Default for RenderCapabilities {
    fn default() -> Self {
        Self {
            flags: Capabilities::empty(),
            texture_units: 8,
            vertex_texture_units: 0,
        }
    }
}
