use tracing::error;

/// What a single [`LiveRequests::complete`] call observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// Requests are still outstanding somewhere in the hierarchy.
    Pending(usize),
    /// This completion took the count to zero.
    Drained,
    /// A completion arrived with nothing outstanding.
    Unbalanced,
}

/// Counter of listing requests that have been issued but not completed.
///
/// Every request is counted with [`issue`](Self::issue) before it is handed
/// to the disk and uncounted with [`complete`](Self::complete) once its
/// result has been fully processed, so the count only reaches zero when no
/// request is in flight and no result is waiting to spawn more.
#[derive(Debug, Default)]
pub struct LiveRequests {
    outstanding: usize,
    issued: usize,
    peak: usize,
}

impl LiveRequests {
    pub fn issue(&mut self) {
        self.outstanding += 1;
        self.issued += 1;
        self.peak = self.peak.max(self.outstanding);
    }

    pub fn complete(&mut self) -> Completion {
        match self.outstanding {
            0 => {
                error!("Listing completed while no request was outstanding");
                Completion::Unbalanced
            }
            1 => {
                self.outstanding = 0;
                Completion::Drained
            }
            n => {
                self.outstanding = n - 1;
                Completion::Pending(n - 1)
            }
        }
    }

    pub fn outstanding(&self) -> usize {
        self.outstanding
    }

    pub fn issued(&self) -> usize {
        self.issued
    }

    pub fn peak(&self) -> usize {
        self.peak
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_request_drains_on_completion() {
        let mut live = LiveRequests::default();
        live.issue();

        assert_eq!(live.outstanding(), 1);
        assert_eq!(live.complete(), Completion::Drained);
        assert_eq!(live.outstanding(), 0);
    }

    #[test]
    fn nested_issue_before_completion_keeps_count_alive() {
        let mut live = LiveRequests::default();
        live.issue();
        // The root listing discovers two directories before it completes.
        live.issue();
        live.issue();

        assert_eq!(live.complete(), Completion::Pending(2));
        assert_eq!(live.complete(), Completion::Pending(1));
        // The last child discovers one more directory.
        live.issue();
        assert_eq!(live.complete(), Completion::Pending(1));
        assert_eq!(live.complete(), Completion::Drained);

        assert_eq!(live.issued(), 4);
        assert_eq!(live.peak(), 3);
    }

    #[test]
    fn drains_exactly_once_per_balanced_run() {
        let mut live = LiveRequests::default();
        let mut drained = 0;

        live.issue();
        for _ in 0..5 {
            live.issue();
            if live.complete() == Completion::Drained {
                drained += 1;
            }
        }
        if live.complete() == Completion::Drained {
            drained += 1;
        }

        assert_eq!(drained, 1);
        assert_eq!(live.outstanding(), 0);
    }

    #[test]
    fn completion_without_request_is_unbalanced() {
        let mut live = LiveRequests::default();

        assert_eq!(live.complete(), Completion::Unbalanced);
        assert_eq!(live.outstanding(), 0);
    }

    #[test]
    fn counter_can_be_reused_after_draining() {
        let mut live = LiveRequests::default();
        live.issue();
        assert_eq!(live.complete(), Completion::Drained);

        live.issue();
        assert_eq!(live.complete(), Completion::Drained);
        assert_eq!(live.issued(), 2);
        assert_eq!(live.peak(), 1);
    }
}
