use std::sync::{Condvar, Mutex, PoisonError};
use std::time::{Duration, Instant};

/// Counting semaphore capping how many charts of one batch run at once.
///
/// [`crate::execution::ExecutionEngine::run`] takes a [`Permit`] before a chart starts and holds
/// it until the chart's finish event has been emitted. The permit goes back on drop, so a
/// panicking transform cannot leak one and stall the rest of the batch.
pub struct Semaphore {
    permits: Mutex<usize>,
    cv: Condvar,
}

/// One chart slot. Released when dropped.
pub struct Permit<'a> {
    sem: &'a Semaphore,
}

impl Drop for Permit<'_> {
    fn drop(&mut self) {
        self.sem.release();
    }
}

impl Semaphore {
    pub fn new(permits: usize) -> Self {
        assert!(permits > 0, "permits must be > 0");
        Self {
            permits: Mutex::new(permits),
            cv: Condvar::new(),
        }
    }

    /// Block until a chart slot is free.
    ///
    /// Also returns how long the caller was throttled (zero if a slot was free).
    pub fn acquire(&self) -> (Permit<'_>, Duration) {
        let start = Instant::now();
        let mut throttled = false;
        let mut free = self.permits.lock().unwrap_or_else(PoisonError::into_inner);
        while *free == 0 {
            throttled = true;
            free = self.cv.wait(free).unwrap_or_else(PoisonError::into_inner);
        }
        *free -= 1;
        let waited = if throttled { start.elapsed() } else { Duration::ZERO };
        (Permit { sem: self }, waited)
    }

    fn release(&self) {
        let mut free = self.permits.lock().unwrap_or_else(PoisonError::into_inner);
        *free += 1;
        self.cv.notify_one();
    }

    #[cfg(test)]
    fn available(&self) -> usize {
        *self.permits.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
