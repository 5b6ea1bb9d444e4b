/// A focus transfer waiting for the next runner step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FocusRequest {
    pub row: usize,
    pub column: usize,
    pub stamp: u64,
}

/// Schedules focus transfers that can be superseded.
///
/// Every edit bumps the generation, so a transfer computed from an older
/// edit carries a stale stamp and is dropped when it comes due. Teardown
/// (reset, drop of the session) cancels the same way.
#[derive(Debug, Default)]
pub struct FocusScheduler {
    generation: u64,
    pending: Option<FocusRequest>,
}

impl FocusScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Invalidate whatever is pending and return the stamp for the new edit.
    pub fn begin_edit(&mut self) -> u64 {
        self.generation += 1;
        self.pending = None;
        self.generation
    }

    pub fn schedule(&mut self, row: usize, column: usize, stamp: u64) -> Option<FocusRequest> {
        if stamp != self.generation {
            return None;
        }
        let request = FocusRequest { row, column, stamp };
        self.pending = Some(request);
        Some(request)
    }

    pub fn cancel(&mut self) {
        self.generation += 1;
        self.pending = None;
    }

    /// Take the pending transfer if it still matches the current generation.
    pub fn fire(&mut self) -> Option<FocusRequest> {
        match self.pending.take() {
            Some(request) if request.stamp == self.generation => Some(request),
            _ => None,
        }
    }

    pub fn pending(&self) -> Option<FocusRequest> {
        self.pending
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scheduled_focus_fires_once() {
        let mut focus = FocusScheduler::new();
        let stamp = focus.begin_edit();
        focus.schedule(0, 1, stamp);

        assert_eq!(
            focus.fire(),
            Some(FocusRequest {
                row: 0,
                column: 1,
                stamp
            })
        );
        assert_eq!(focus.fire(), None);
    }

    #[test]
    fn test_newer_edit_supersedes_pending_focus() {
        let mut focus = FocusScheduler::new();
        let first = focus.begin_edit();
        focus.schedule(0, 1, first);

        let second = focus.begin_edit();
        assert!(focus.pending().is_none());
        assert!(focus.schedule(0, 3, first).is_none());

        focus.schedule(0, 2, second);
        assert_eq!(focus.fire().map(|r| r.column), Some(2));
    }

    #[test]
    fn test_cancel_drops_pending_focus() {
        let mut focus = FocusScheduler::new();
        let stamp = focus.begin_edit();
        focus.schedule(2, 4, stamp);

        focus.cancel();

        assert_eq!(focus.fire(), None);
        assert!(focus.generation() > stamp);
    }
}
