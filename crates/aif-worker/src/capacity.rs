//! Concurrency gate: fail-fast admission control over `maxConcurrent`.
//!
//! The check-then-increment is a single compare-exchange loop, so no two
//! concurrent callers can both observe `currentLoad < maxConcurrent` and
//! both proceed past the cap. [`CapacityGuard`] releases its slot on drop,
//! so every exit path — success, error, or panic unwind — decrements
//! `currentLoad` exactly once. This is the mechanism that keeps the
//! "decrement on every exit path" invariant from depending on callers
//! remembering to clean up.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

pub struct CapacityGate {
    current_load: AtomicU32,
    max_concurrent: u32,
}

/// Held for the duration of one admitted request. Dropping it — by any
/// path, including an early `?` return or a panic — releases the slot.
pub struct CapacityGuard {
    gate: Arc<CapacityGate>,
}

impl Drop for CapacityGuard {
    fn drop(&mut self) {
        self.gate.current_load.fetch_sub(1, Ordering::AcqRel);
    }
}

impl CapacityGate {
    pub fn new(max_concurrent: u32) -> Arc<Self> {
        Arc::new(Self {
            current_load: AtomicU32::new(0),
            max_concurrent,
        })
    }

    pub fn max_concurrent(&self) -> u32 {
        self.max_concurrent
    }

    pub fn current_load(&self) -> u32 {
        self.current_load.load(Ordering::Acquire)
    }

    pub fn available(&self) -> u32 {
        self.max_concurrent.saturating_sub(self.current_load())
    }

    /// Attempt to admit one more request. Returns `None` (fail-fast, no
    /// queueing) if the gate is already at capacity.
    pub fn try_acquire(self: &Arc<Self>) -> Option<CapacityGuard> {
        let mut observed = self.current_load.load(Ordering::Acquire);
        loop {
            if observed >= self.max_concurrent {
                return None;
            }
            match self.current_load.compare_exchange_weak(
                observed,
                observed + 1,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => {
                    return Some(CapacityGuard { gate: Arc::clone(self) });
                }
                Err(actual) => observed = actual,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admits_up_to_max_concurrent() {
        let gate = CapacityGate::new(2);
        let g1 = gate.try_acquire().unwrap();
        let g2 = gate.try_acquire().unwrap();
        assert!(gate.try_acquire().is_none());
        drop(g1);
        drop(g2);
    }

    #[test]
    fn decrement_on_failure_frees_the_slot_for_reuse() {
        // "N forced failures with maxConcurrent = N; a subsequent Nth
        // concurrent request must still be admitted."
        let gate = CapacityGate::new(3);
        for _ in 0..3 {
            let guard = gate.try_acquire().expect("should admit under cap");
            drop(guard); // simulates a failing request releasing its slot
        }
        assert!(gate.try_acquire().is_some());
        assert_eq!(gate.current_load(), 1);
    }

    #[test]
    fn rejects_once_saturated() {
        let gate = CapacityGate::new(1);
        let _g = gate.try_acquire().unwrap();
        assert!(gate.try_acquire().is_none());
    }

    #[test]
    fn concurrent_acquisitions_never_exceed_cap() {
        use std::thread;
        let gate = CapacityGate::new(4);
        let admitted = Arc::new(AtomicU32::new(0));
        let handles: Vec<_> = (0..32)
            .map(|_| {
                let gate = Arc::clone(&gate);
                let admitted = Arc::clone(&admitted);
                thread::spawn(move || {
                    if let Some(guard) = gate.try_acquire() {
                        admitted.fetch_add(1, Ordering::Relaxed);
                        std::thread::sleep(std::time::Duration::from_millis(1));
                        drop(guard);
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert!(gate.current_load() <= gate.max_concurrent());
    }
}
