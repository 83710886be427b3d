use super::RenderOperation;

/// Batch, face and vertex counters for the current frame.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct FrameStatistics {
    batches: u64,
    faces: u64,
    vertices: u64,
}

impl FrameStatistics {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Accounts for `op` rendered `iterations` times.
    ///
    /// The element count is multiplied before the topology arithmetic, so a
    /// strip drawn three times loses two elements once, not three times.
    pub fn record(&mut self, op: &RenderOperation, iterations: u32) {
        let iterations = u64::from(iterations.max(1));
        let elements = u64::from(op.element_count()) * iterations;

        self.faces += op.topology.face_count(elements);
        self.vertices += u64::from(op.vertex_count);
        self.batches += iterations;
    }

    #[inline]
    pub fn batch_count(&self) -> u64 {
        self.batches
    }

    #[inline]
    pub fn face_count(&self) -> u64 {
        self.faces
    }

    #[inline]
    pub fn vertex_count(&self) -> u64 {
        self.vertices
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::Topology;

    fn faces_after(op: RenderOperation, iterations: u32) -> u64 {
        let mut s = FrameStatistics::new();
        s.record(&op, iterations);
        s.face_count()
    }

    // ── face arithmetic ───────────────────────────────────────────────────

    #[test]
    fn triangle_list_divides_by_three() {
        let op = RenderOperation::indexed(Topology::TriangleList, 120, 300);
        assert_eq!(faces_after(op, 1), 100);
    }

    #[test]
    fn strip_and_fan_subtract_two() {
        let strip = RenderOperation::indexed(Topology::TriangleStrip, 50, 50);
        let fan = RenderOperation::non_indexed(Topology::TriangleFan, 10);
        assert_eq!(faces_after(strip, 1), 48);
        assert_eq!(faces_after(fan, 1), 8);
    }

    #[test]
    fn degenerate_strip_contributes_nothing() {
        let op = RenderOperation::non_indexed(Topology::TriangleStrip, 1);
        assert_eq!(faces_after(op, 1), 0);
    }

    #[test]
    fn points_and_lines_have_no_faces() {
        for topology in [Topology::PointList, Topology::LineList, Topology::LineStrip] {
            let op = RenderOperation::indexed(topology, 64, 999);
            assert_eq!(faces_after(op, 1), 0);
        }
    }

    #[test]
    fn iterations_multiply_before_topology() {
        let list = RenderOperation::indexed(Topology::TriangleList, 100, 300);
        let strip = RenderOperation::indexed(Topology::TriangleStrip, 50, 50);
        assert_eq!(faces_after(list, 3), 300);
        assert_eq!(faces_after(strip, 3), 148);
    }

    // ── counters ──────────────────────────────────────────────────────────

    #[test]
    fn vertices_and_batches_accumulate() {
        let mut s = FrameStatistics::new();
        let op = RenderOperation::indexed(Topology::TriangleList, 24, 36);
        s.record(&op, 1);
        s.record(&op, 2);

        assert_eq!(s.vertex_count(), 48);
        assert_eq!(s.batch_count(), 3);
        assert_eq!(s.face_count(), 12 + 24);
    }

    #[test]
    fn reset_zeroes_everything() {
        let mut s = FrameStatistics::new();
        s.record(&RenderOperation::non_indexed(Topology::TriangleList, 3), 1);
        s.reset();
        assert_eq!(s, FrameStatistics::default());
    }
}
