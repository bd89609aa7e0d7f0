//! Cooperative cancellation token.
//!
//! A shared flag settable from any thread (typically the UI thread) and
//! polled by the pipeline at defined points: pipeline start, before text
//! extraction / normalization / chunking, before each chunk, between
//! streamed response deltas, and at the start of each retry attempt.
//! There is no hard preemption of an in-flight network call.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::{ExtractError, ExtractResult};

#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Takes effect at the next poll point.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Clear the flag. Called at the start of each `process_file` run.
    pub fn reset(&self) {
        self.flag.store(false, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Poll point: returns `ExtractError::Cancelled` if the flag is set.
    pub fn checkpoint(&self) -> ExtractResult<()> {
        if self.is_cancelled() {
            return Err(ExtractError::Cancelled);
        }
        Ok(())
    }
}
