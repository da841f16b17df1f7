//! Bounded busy-wait polling.
//!
//! No hardware timer is consulted while the loader runs; elapsed time is
//! approximated by counted poll iterations at a known clock rate. The
//! budget is explicit so the timeout policy is testable without real
//! timing.

/// Iteration budget for one busy-wait.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PollBudget(Option<u32>);

impl PollBudget {
    /// A budget of `count` poll iterations.
    pub const fn iterations(count: u32) -> Self {
        Self(Some(count))
    }

    /// No budget: poll until the condition holds.
    ///
    /// Acceptable only where the host is the sole required actor and no
    /// fault state is reachable.
    pub const fn unbounded() -> Self {
        Self(None)
    }

    /// Polls `f` until it yields a value or the budget is exhausted.
    pub fn poll<T>(self, mut f: impl FnMut() -> Option<T>) -> Option<T> {
        match self.0 {
            Some(limit) => {
                for _ in 0..limit {
                    if let Some(value) = f() {
                        return Some(value);
                    }
                }
                None
            }
            None => loop {
                if let Some(value) = f() {
                    return Some(value);
                }
            },
        }
    }
}
