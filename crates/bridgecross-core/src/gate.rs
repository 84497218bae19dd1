//! Passage gate - counting admission control for the corridor.
//!
//! The gate holds the number of free corridor slots. Admission is a
//! compare-and-swap decrement that refuses at zero instead of waiting, so an
//! agent that finds the corridor full keeps its current cell and simply tries
//! again on a later intent.

use log::warn;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Debug)]
pub struct PassageGate {
    capacity: usize,
    available: AtomicUsize,
}

impl PassageGate {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            available: AtomicUsize::new(capacity),
        }
    }

    /// Take one slot if any is free. Never blocks.
    pub fn try_enter(&self) -> bool {
        self.available
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1))
            .is_ok()
    }

    /// Return one slot. A release on a gate that is already fully open is
    /// ignored, so the count never exceeds capacity.
    pub fn leave(&self) {
        let capacity = self.capacity;
        let released = self
            .available
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| {
                (n < capacity).then_some(n + 1)
            });
        if released.is_err() {
            warn!("passage gate released while already open ({capacity} free)");
        }
    }

    /// Free slots right now. Stale as soon as it is read.
    pub fn available(&self) -> usize {
        self.available.load(Ordering::Acquire)
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicIsize;
    use std::sync::Arc;
    use std::thread;
    use std::time::{Duration, Instant};

    #[test]
    fn admits_up_to_capacity() {
        let gate = PassageGate::new(2);
        assert!(gate.try_enter());
        assert!(gate.try_enter());
        assert!(!gate.try_enter());
        assert_eq!(gate.available(), 0);
        gate.leave();
        assert_eq!(gate.available(), 1);
        assert!(gate.try_enter());
    }

    #[test]
    fn leave_saturates_at_capacity() {
        let gate = PassageGate::new(1);
        gate.leave();
        gate.leave();
        assert_eq!(gate.available(), 1);
        assert_eq!(gate.capacity(), 1);
    }

    #[test]
    fn zero_capacity_never_admits() {
        let gate = PassageGate::new(0);
        assert!(!gate.try_enter());
        gate.leave();
        assert_eq!(gate.available(), 0);
    }

    #[test]
    fn denial_returns_immediately() {
        let gate = PassageGate::new(1);
        assert!(gate.try_enter());
        let start = Instant::now();
        for _ in 0..1_000 {
            assert!(!gate.try_enter());
        }
        assert!(start.elapsed() < Duration::from_millis(500));
    }

    #[test]
    fn hammering_never_exceeds_capacity() {
        let gate = Arc::new(PassageGate::new(1));
        let inside = Arc::new(AtomicIsize::new(0));

        let workers: Vec<_> = (0..2)
            .map(|_| {
                let gate = Arc::clone(&gate);
                let inside = Arc::clone(&inside);
                thread::spawn(move || {
                    let mut admitted = 0;
                    for _ in 0..20_000 {
                        if gate.try_enter() {
                            let now = inside.fetch_add(1, Ordering::SeqCst) + 1;
                            assert!((0..=1).contains(&now), "{now} agents inside");
                            inside.fetch_sub(1, Ordering::SeqCst);
                            gate.leave();
                            admitted += 1;
                        }
                    }
                    admitted
                })
            })
            .collect();

        let admitted: usize = workers.into_iter().map(|w| w.join().unwrap()).sum();
        assert!(admitted > 0);
        assert_eq!(gate.available(), 1);
    }
}
