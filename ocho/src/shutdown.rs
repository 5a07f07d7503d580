//! Cooperative shutdown signal.
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

/// Cancellation token shared between the scheduler loop and the
/// presentation loop. Both poll it at the top of each iteration; nothing
/// is ever interrupted mid-flight.
#[derive(Clone, Default)]
pub struct ShutdownToken(Arc<AtomicBool>);

impl ShutdownToken {
    pub fn new() -> Self {
        Default::default()
    }

    /// Request shutdown. Returns `true` only for the first caller;
    /// repeated triggers are ignored.
    pub fn trigger(&self) -> bool {
        !self.0.swap(true, Ordering::SeqCst)
    }

    pub fn is_triggered(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}
