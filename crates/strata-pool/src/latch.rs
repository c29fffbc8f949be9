use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Condvar, Mutex, PoisonError};

/// Countdown of outstanding jobs that wakes waiters when it reaches zero.
///
/// The counter is atomic so jobs can decrement it without taking the lock;
/// only the decrement that reaches zero locks and notifies.
#[derive(Debug)]
pub struct CompletionLatch {
    remaining: AtomicUsize,
    lock: Mutex<()>,
    signal: Condvar,
}

impl CompletionLatch {
    /// Creates a latch expecting `count` completions.
    pub fn new(count: usize) -> Self {
        Self {
            remaining: AtomicUsize::new(count),
            lock: Mutex::new(()),
            signal: Condvar::new(),
        }
    }

    /// Number of completions still outstanding.
    pub fn remaining(&self) -> usize {
        self.remaining.load(Ordering::Acquire)
    }

    /// Records one completion. Extra calls once the latch is open are ignored.
    pub fn count_down(&self) {
        let previous = self
            .remaining
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1));
        if previous == Ok(1) {
            let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
            self.signal.notify_all();
        }
    }

    /// Blocks until every expected completion has been recorded.
    pub fn wait(&self) {
        let mut guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        while self.remaining() > 0 {
            guard = self
                .signal
                .wait(guard)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn zero_count_is_already_open() {
        let latch = CompletionLatch::new(0);
        latch.wait();
        latch.count_down();
        assert_eq!(latch.remaining(), 0);
    }

    #[test]
    fn wait_returns_after_all_threads_count_down() {
        let latch = Arc::new(CompletionLatch::new(8));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let latch = Arc::clone(&latch);
                thread::spawn(move || latch.count_down())
            })
            .collect();
        latch.wait();
        assert_eq!(latch.remaining(), 0);
        for handle in handles {
            handle.join().unwrap();
        }
    }
}
