/// Programmable pipeline stage.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ProgramStage {
    Vertex,
    Geometry,
    Fragment,
}

impl ProgramStage {
    pub const ALL: [ProgramStage; 3] = [Self::Vertex, Self::Geometry, Self::Fragment];

    #[inline]
    const fn index(self) -> usize {
        match self {
            Self::Vertex => 0,
            Self::Geometry => 1,
            Self::Fragment => 2,
        }
    }
}

/// Compiled program reference handed to the backend on bind.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GpuProgram {
    pub name: String,
    pub stage: ProgramStage,
}

impl GpuProgram {
    pub fn new(name: impl Into<String>, stage: ProgramStage) -> Self {
        Self {
            name: name.into(),
            stage,
        }
    }
}

/// Which stages have a program bound, plus pass-iteration bookkeeping.
///
/// The iteration count is the number of times the current pass still has to
/// be rendered; 0 is normalised to 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramBindingState {
    bound: [bool; 3],
    pass_iteration_count: u32,
    pass_iteration_index: u32,
}

impl Default for ProgramBindingState {
    fn default() -> Self {
        Self {
            bound: [false; 3],
            pass_iteration_count: 1,
            pass_iteration_index: 0,
        }
    }
}

impl ProgramBindingState {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn is_bound(&self, stage: ProgramStage) -> bool {
        self.bound[stage.index()]
    }

    /// Sets the flag for `stage`, returning `true` if it changed.
    pub fn set_bound(&mut self, stage: ProgramStage, bound: bool) -> bool {
        let slot = &mut self.bound[stage.index()];
        let changed = *slot != bound;
        *slot = bound;
        changed
    }

    /// Clears every stage flag.
    pub fn reset_bindings(&mut self) {
        self.bound = [false; 3];
    }

    pub fn bound_stages(&self) -> impl Iterator<Item = ProgramStage> + '_ {
        ProgramStage::ALL.into_iter().filter(|s| self.is_bound(*s))
    }

    pub fn set_pass_iteration_count(&mut self, count: u32) {
        if count == 0 {
            log::debug!("pass iteration count 0 normalised to 1");
        }
        self.pass_iteration_count = count.max(1);
        self.pass_iteration_index = 0;
    }

    #[inline]
    pub fn pass_iteration_count(&self) -> u32 {
        self.pass_iteration_count
    }

    #[inline]
    pub fn pass_iteration_index(&self) -> u32 {
        self.pass_iteration_index
    }

    /// Restarts iteration numbering for a new draw.
    #[inline]
    pub fn restart_iterations(&mut self) {
        self.pass_iteration_index = 0;
    }

    /// Consumes one iteration. Returns `false` when none remain.
    pub fn advance_iteration(&mut self) -> bool {
        if self.pass_iteration_count <= 1 {
            return false;
        }
        self.pass_iteration_count -= 1;
        self.pass_iteration_index += 1;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_bound_reports_transitions_only() {
        let mut s = ProgramBindingState::new();
        assert!(s.set_bound(ProgramStage::Vertex, true));
        assert!(!s.set_bound(ProgramStage::Vertex, true));
        assert!(s.set_bound(ProgramStage::Vertex, false));
        assert!(!s.is_bound(ProgramStage::Vertex));
    }

    #[test]
    fn bound_stages_in_pipeline_order() {
        let mut s = ProgramBindingState::new();
        s.set_bound(ProgramStage::Fragment, true);
        s.set_bound(ProgramStage::Vertex, true);
        let stages: Vec<_> = s.bound_stages().collect();
        assert_eq!(stages, vec![ProgramStage::Vertex, ProgramStage::Fragment]);
    }

    #[test]
    fn zero_iterations_normalise_to_one() {
        let mut s = ProgramBindingState::new();
        s.set_pass_iteration_count(0);
        assert_eq!(s.pass_iteration_count(), 1);
        assert!(!s.advance_iteration());
    }

    #[test]
    fn advance_counts_down_to_one() {
        let mut s = ProgramBindingState::new();
        s.set_pass_iteration_count(3);
        assert!(s.advance_iteration());
        assert!(s.advance_iteration());
        assert!(!s.advance_iteration());
        assert_eq!(s.pass_iteration_count(), 1);
        assert_eq!(s.pass_iteration_index(), 2);
    }
}
