//! Process-wide shutdown flag.
//! Set by the Ctrl-C handler; the rename walker checks it before each directory
//! and before each promote. A promote that has started always runs to completion.
//!
//! Relaxed atomics are sufficient for a one-way "stop" flag, and `request()` is
//! safe to call from signal handlers.

use std::sync::atomic::{AtomicBool, Ordering};

static SHUTDOWN: AtomicBool = AtomicBool::new(false);

/// Request a cooperative shutdown (idempotent).
#[inline]
pub fn request() {
    SHUTDOWN.store(true, Ordering::Relaxed);
}

#[inline]
pub fn is_requested() -> bool {
    SHUTDOWN.load(Ordering::Relaxed)
}

