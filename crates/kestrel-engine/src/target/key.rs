use core::cmp::Ordering;

/// Traversal key for registered targets.
///
/// Ordering rules:
/// 1) `priority`: ascending (lower priorities update first)
/// 2) `order`: ascending (attach order within the same priority)
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct PriorityKey {
    pub priority: u8,
    /// Monotonic attach counter, never reused within a registry.
    pub order: u64,
}

impl PriorityKey {
    #[inline]
    pub const fn new(priority: u8, order: u64) -> Self {
        Self { priority, order }
    }
}

impl Ord for PriorityKey {
    #[inline]
    fn cmp(&self, other: &Self) -> Ordering {
        match self.priority.cmp(&other.priority) {
            Ordering::Equal => self.order.cmp(&other.order),
            o => o,
        }
    }
}

impl PartialOrd for PriorityKey {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
