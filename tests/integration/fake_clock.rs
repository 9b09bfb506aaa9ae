//! Drives `banksched::time`'s process-wide millisecond counter the way a
//! hardware timer ISR would, without needing real hardware.
//!
//! The counter is a crate-global static, so tests in this binary that
//! advance it must not run concurrently with each other. Every scenario
//! test takes [`lock`] for its duration and only ever reasons about time
//! relative to [`now`] captured right after acquiring it.

use std::sync::{Mutex, MutexGuard};

static CLOCK_LOCK: Mutex<()> = Mutex::new(());

pub fn lock() -> MutexGuard<'static, ()> {
    CLOCK_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Simulate the hardware timer ISR firing once, `ms` milliseconds later.
pub fn advance(ms: u32) {
    banksched::time::timer_isr_callback(ms);
}

pub fn now() -> u32 {
    banksched::time::current_time()
}
