/// Primitive topology of a draw.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Topology {
    PointList,
    LineList,
    LineStrip,
    TriangleList,
    TriangleStrip,
    TriangleFan,
}

impl Topology {
    /// Faces produced by `elements` indices (or vertices) of this topology.
    pub fn face_count(self, elements: u64) -> u64 {
        match self {
            Self::TriangleList => elements / 3,
            Self::TriangleStrip | Self::TriangleFan => elements.saturating_sub(2),
            Self::PointList | Self::LineList | Self::LineStrip => 0,
        }
    }
}

/// One draw submission.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct RenderOperation {
    pub topology: Topology,
    pub vertex_count: u32,
    /// `Some` for indexed draws.
    pub index_count: Option<u32>,
}

impl RenderOperation {
    #[inline]
    pub const fn non_indexed(topology: Topology, vertex_count: u32) -> Self {
        Self {
            topology,
            vertex_count,
            index_count: None,
        }
    }

    #[inline]
    pub const fn indexed(topology: Topology, vertex_count: u32, index_count: u32) -> Self {
        Self {
            topology,
            vertex_count,
            index_count: Some(index_count),
        }
    }

    /// Number of elements the topology walks over.
    #[inline]
    pub fn element_count(&self) -> u32 {
        self.index_count.unwrap_or(self.vertex_count)
    }
}
