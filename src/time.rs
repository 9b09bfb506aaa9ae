//! The monotonic millisecond time source.
//!
//! Mirrors the split used for ISR-touched state elsewhere in this crate's
//! lineage (see `button.rs`'s `BUTTON_ISR_TIMESTAMP`): the counter and the
//! "a tick happened" latch live in independent, lock-free atomics, decoupled
//! from any `&mut self`-owned instance state. That split is what lets
//! [`timer_isr_callback`] be called from real interrupt context — a
//! `&Scheduler` method could never also hand out the `&mut Scheduler`
//! the foreground dispatch loop needs at the same time.

use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

static NOW_MS: AtomicU32 = AtomicU32::new(0);
static TIMER_FIRED: AtomicBool = AtomicBool::new(false);

/// Advance the time source by `isr_period_ms` and set the `timer_fired`
/// latch. Call this, and only this, from the hardware timer ISR.
///
/// `isr_period_ms` is the period the embedding firmware configured the
/// hardware timer for; this module has no opinion on what that value is.
pub fn timer_isr_callback(isr_period_ms: u32) {
    NOW_MS.fetch_add(isr_period_ms, Ordering::Release);
    TIMER_FIRED.store(true, Ordering::Release);
}

/// The current value of the monotonic millisecond counter.
///
/// Wraps at `u32::MAX`, roughly 49.7 days of continuous uptime. Delay and
/// cyclic deadlines computed with `now.wrapping_add(ms)` inherit this
/// wraparound: a deadline set shortly before a wrap fires early once `now`
/// wraps past it. This crate does not guard against it — deployments that
/// run longer than ~49 days without a reset need a wider counter, which is
/// out of scope here.
pub fn current_time() -> u32 {
    NOW_MS.load(Ordering::Acquire)
}

/// Take and clear the `timer_fired` latch. The foreground loop calls this
/// once per idle-phase iteration to decide whether to drain the delay and
/// cyclic tables; never call it from interrupt context.
pub(crate) fn take_timer_fired() -> bool {
    TIMER_FIRED.swap(false, Ordering::AcqRel)
}

/// Reset `now` to zero and clear the `timer_fired` latch. Called by
/// `Scheduler::init`; not for use from interrupt context.
pub(crate) fn reset() {
    NOW_MS.store(0, Ordering::SeqCst);
    TIMER_FIRED.store(false, Ordering::SeqCst);
}

#[cfg(test)]
pub(crate) fn reset_for_test() {
    reset();
}
