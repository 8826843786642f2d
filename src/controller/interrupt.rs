use std::sync::atomic::{AtomicBool, Ordering};

/// Pending-interrupt latch shared between the interrupt source and the loop
///
/// Created at startup. Only the interrupt source calls [`raise`]; only the
/// control loop calls [`take`], which clears the latch before decoding so an
/// interrupt arriving mid-decode is serviced on the next iteration.
///
/// [`raise`]: InterruptFlag::raise
/// [`take`]: InterruptFlag::take
#[derive(Debug, Default)]
pub struct InterruptFlag {
    pending: AtomicBool,
}

impl InterruptFlag {
    pub const fn new() -> Self {
        Self {
            pending: AtomicBool::new(false),
        }
    }

    /// Mark an interrupt as pending; safe from any context
    pub fn raise(&self) {
        self.pending.store(true, Ordering::Release);
    }

    /// Clear the latch, returning whether it was set
    pub fn take(&self) -> bool {
        self.pending.swap(false, Ordering::AcqRel)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::Acquire)
    }
}
