use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Process-lifetime request counters. Readable while calls are in flight.
#[derive(Debug, Default)]
pub struct CallCounter {
    total: AtomicU64,
    resolved: AtomicU64,
    fulfilled: AtomicU64,
    rejected: AtomicU64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CounterSnapshot {
    pub total: u64,
    pub resolved: u64,
    pub fulfilled: u64,
    pub rejected: u64,
}

impl CounterSnapshot {
    /// Calls attempted but not yet settled.
    pub fn in_flight(&self) -> u64 {
        self.resolved
            .saturating_sub(self.fulfilled.saturating_add(self.rejected))
    }
}

impl CallCounter {
    pub(crate) fn begin(&self) {
        self.total.fetch_add(1, Ordering::SeqCst);
        self.resolved.fetch_add(1, Ordering::SeqCst);
    }

    pub(crate) fn fulfil(&self) {
        self.fulfilled.fetch_add(1, Ordering::SeqCst);
    }

    pub(crate) fn reject(&self) {
        self.rejected.fetch_add(1, Ordering::SeqCst);
    }

    /// Settle one call according to its outcome and hand the outcome back.
    pub(crate) fn settle<T, E>(&self, outcome: Result<T, E>) -> Result<T, E> {
        match &outcome {
            Ok(_) => self.fulfil(),
            Err(_) => self.reject(),
        }
        outcome
    }

    pub fn snapshot(&self) -> CounterSnapshot {
        CounterSnapshot {
            total: self.total.load(Ordering::SeqCst),
            resolved: self.resolved.load(Ordering::SeqCst),
            fulfilled: self.fulfilled.load(Ordering::SeqCst),
            rejected: self.rejected.load(Ordering::SeqCst),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn begun_call_is_in_flight_until_settled() {
        let counter = CallCounter::default();
        counter.begin();
        let snapshot = counter.snapshot();
        assert_eq!(snapshot.total, 1);
        assert_eq!(snapshot.resolved, 1);
        assert_eq!(snapshot.in_flight(), 1);

        let _ = counter.settle::<(), &str>(Err("boom"));
        let snapshot = counter.snapshot();
        assert_eq!(snapshot.rejected, 1);
        assert_eq!(snapshot.in_flight(), 0);
    }

    #[test]
    fn settle_counts_each_outcome_once() {
        let counter = CallCounter::default();
        for outcome in [Ok(1), Err("x"), Ok(2)] {
            counter.begin();
            let _ = counter.settle(outcome);
        }
        assert_eq!(
            counter.snapshot(),
            CounterSnapshot {
                total: 3,
                resolved: 3,
                fulfilled: 2,
                rejected: 1,
            }
        );
    }
}
