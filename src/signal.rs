//! Work-pending signal shared between interrupt context and a run loop.
//!
//! The radio driver raises the signal from its interrupt handler whenever
//! the protocol engine has more processing to do. The run loop takes the
//! signal at the end of every iteration: if it was raised the loop runs
//! again immediately, otherwise it yields to the scheduler.
//!
//! # Discipline
//!
//! - The interrupt side only ever sets the flag ([`WorkPendingSignal::raise`]).
//! - The task side only ever clears it, and reads and clears in a single
//!   atomic swap ([`WorkPendingSignal::take`]), so a raise that lands
//!   between the read and the clear cannot be lost.
//!
//! # Example
//!
//! ```
//! use radiowire::signal::WorkPendingSignal;
//!
//! let signal = WorkPendingSignal::new();
//! let irq = signal.clone();
//!
//! irq.raise();
//! assert!(signal.take());
//! assert!(!signal.take());
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Interrupt-to-task "more work pending" flag.
///
/// Cheaply cloneable; all clones observe the same flag.
#[derive(Debug, Clone, Default)]
pub struct WorkPendingSignal {
    flag: Arc<AtomicBool>,
}

impl WorkPendingSignal {
    /// Create a cleared signal.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the flag. Safe to call from interrupt context.
    #[inline]
    pub fn raise(&self) {
        self.flag.store(true, Ordering::Release);
    }

    /// Read and clear the flag in one step.
    ///
    /// Returns `true` if the flag was raised since the last `take`.
    #[inline]
    pub fn take(&self) -> bool {
        self.flag.swap(false, Ordering::AcqRel)
    }

    /// Peek at the flag without clearing it.
    #[inline]
    pub fn is_raised(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_signal_is_clear() {
        let signal = WorkPendingSignal::new();
        assert!(!signal.is_raised());
        assert!(!signal.take());
    }

    #[test]
    fn test_take_clears() {
        let signal = WorkPendingSignal::new();
        signal.raise();
        assert!(signal.is_raised());
        assert!(signal.take());
        assert!(!signal.is_raised());
    }

    #[test]
    fn test_repeated_raise_collapses() {
        let signal = WorkPendingSignal::new();
        signal.raise();
        signal.raise();
        assert!(signal.take());
        assert!(!signal.take());
    }

    #[test]
    fn test_clone_shares_state() {
        let signal = WorkPendingSignal::new();
        let irq = signal.clone();

        irq.raise();
        assert!(signal.is_raised());

        signal.take();
        assert!(!irq.is_raised());
    }

    #[test]
    fn test_raise_from_other_thread() {
        let signal = WorkPendingSignal::new();
        let irq = signal.clone();

        std::thread::spawn(move || irq.raise()).join().unwrap();

        assert!(signal.take());
    }
}
