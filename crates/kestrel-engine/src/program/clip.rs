/// Plane `a*x + b*y + c*z + d = 0`.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct Plane {
    pub a: f32,
    pub b: f32,
    pub c: f32,
    pub d: f32,
}

impl Plane {
    #[inline]
    pub const fn new(a: f32, b: f32, c: f32, d: f32) -> Self {
        Self { a, b, c, d }
    }
}

/// User clip planes and their pending-upload flag.
///
/// Pushing planes to the device is expensive; mutations only mark the state
/// dirty and the next draw uploads once via [`take_dirty`](Self::take_dirty).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClipPlaneState {
    planes: Vec<Plane>,
    dirty: bool,
}

impl ClipPlaneState {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn planes(&self) -> &[Plane] {
        &self.planes
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.planes.is_empty()
    }

    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    #[inline]
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn add(&mut self, plane: Plane) {
        self.planes.push(plane);
        self.dirty = true;
    }

    /// Replaces the plane list; only a different list marks the state dirty.
    pub fn set(&mut self, planes: &[Plane]) {
        if self.planes != planes {
            self.planes = planes.to_vec();
            self.dirty = true;
        }
    }

    pub fn reset(&mut self) {
        if !self.planes.is_empty() {
            self.planes.clear();
            self.dirty = true;
        }
    }

    /// Clears the dirty flag, returning the planes if an upload is due.
    pub fn take_dirty(&mut self) -> Option<&[Plane]> {
        if !self.dirty {
            return None;
        }
        self.dirty = false;
        Some(&self.planes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(d: f32) -> Plane {
        Plane::new(0.0, 1.0, 0.0, d)
    }

    #[test]
    fn starts_clean() {
        let mut s = ClipPlaneState::new();
        assert!(!s.is_dirty());
        assert!(s.take_dirty().is_none());
    }

    #[test]
    fn add_marks_dirty_and_take_clears_once() {
        let mut s = ClipPlaneState::new();
        s.add(p(1.0));
        assert_eq!(s.take_dirty().map(<[Plane]>::len), Some(1));
        assert!(s.take_dirty().is_none());
    }

    #[test]
    fn set_with_identical_list_stays_clean() {
        let mut s = ClipPlaneState::new();
        s.set(&[p(1.0), p(2.0)]);
        let _ = s.take_dirty();

        s.set(&[p(1.0), p(2.0)]);
        assert!(!s.is_dirty());

        s.set(&[p(3.0)]);
        assert!(s.is_dirty());
    }

    #[test]
    fn reset_of_empty_list_stays_clean() {
        let mut s = ClipPlaneState::new();
        s.reset();
        assert!(!s.is_dirty());

        s.add(p(0.0));
        let _ = s.take_dirty();
        s.reset();
        assert!(s.is_dirty());
        assert!(s.is_empty());
    }
}
