use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

/// Shared flag polled by long-running operations between chunks of work.
/// Clones observe the same flag, so a token can be handed to another thread
/// and cancelled from there.
#[derive(Clone, Debug, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}
