//! Ties the event store, delay engine, and cyclic engine together behind
//! one object, and owns the foreground dispatch loop.
//!
//! ```text
//!  run_forever:
//!    ┌─────────────┐   nothing pending    ┌───────────────────┐
//!    │  run_once    │ ───────────────────▶│  idle phase        │
//!    │ (dispatch 1) │◀─────────────────────│  before_sleep      │
//!    └──────┬───────┘    loop restarts     │  sleep             │
//!           │ dispatched                   │  after_wakeup       │
//!           │ a callback                   │  service_timers     │
//!           ▼                              │  (if timer_fired)   │
//!      restart scan                        └───────────────────┘
//! ```
//!
//! `run_once` never holds a critical section while a user callback runs —
//! only the snapshot and the refold around it are protected.

use crate::cyclic::CyclicTable;
use crate::delay::DelayTable;
use crate::event::{most_important_flag, EventStore};
use crate::time;
use crate::types::{Callback, Result};

/// Hooks around the idle-phase low-power sleep: the decoupling seam
/// between this crate's dispatch logic and a platform's power
/// management.
///
/// All three methods default to no-ops, so a host with nothing to do
/// before sleeping (or no sleep primitive at all, as in tests) can use
/// [`NoSleep`] and still run `run_forever` as a busy idle loop.
pub trait SleepHooks {
    /// Called immediately before entering [`SleepHooks::sleep`].
    fn do_before_sleep(&mut self) {}
    /// The platform's low-power sleep primitive. Out of scope for this
    /// crate — implementation-defined, typically a WFI/WFE or an RTOS
    /// tickless-idle call.
    fn sleep(&mut self) {}
    /// Called immediately after waking from [`SleepHooks::sleep`].
    fn do_after_wakeup(&mut self) {}
}

/// No-op [`SleepHooks`] for hosts and tests with no low-power mode.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoSleep;

impl SleepHooks for NoSleep {}

/// The scheduler itself: `P` priority banks, `D` delay timers, `C` cyclic
/// timers. Defaults (4, 32, 32) match the compile-time configuration
/// this crate is descended from.
pub struct Scheduler<const P: usize = 4, const D: usize = 32, const C: usize = 32> {
    events: EventStore<P>,
    delays: DelayTable<D>,
    cyclics: CyclicTable<C>,
}

impl<const P: usize, const D: usize, const C: usize> Default for Scheduler<P, D, C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const P: usize, const D: usize, const C: usize> Scheduler<P, D, C> {
    pub fn new() -> Self {
        Self {
            events: EventStore::new(),
            delays: DelayTable::new(),
            cyclics: CyclicTable::new(),
        }
    }

    /// Reset every event, delay, and cyclic table to empty, and reset the
    /// time source: `now` back to zero, `timer_fired` cleared. Does not
    /// start any hardware timer; that remains the caller's responsibility.
    pub fn init(&mut self) {
        self.events.remove_all_events();
        self.delays.remove_all();
        self.cyclics.remove_all();
        time::reset();
    }

    // ── Event store ──────────────────────────────────────────────

    pub fn add_event(&mut self, cb: Callback, priority: u8, flag: u32) -> Result<()> {
        self.events.add_event(cb, priority, flag)
    }

    pub fn remove_event(&mut self, priority: u8, flag: u32) -> Result<()> {
        self.events.remove_event(priority, flag)
    }

    /// Cancel every armed event across every priority bank.
    pub fn remove_all_events(&mut self) {
        self.events.remove_all_events();
    }

    pub fn is_event(&self, priority: u8, flag: u32) -> bool {
        self.events.is_event(priority, flag)
    }

    pub fn is_any_event(&self) -> bool {
        self.events.is_any_event()
    }

    // ── Delay engine ─────────────────────────────────────────────

    pub fn add_delay(&mut self, cb: Callback, priority: u8, flag: u32, ms: u32) -> Result<()> {
        self.delays
            .add(&mut self.events, cb, priority, flag, time::current_time(), ms)
    }

    pub fn update_delay(&mut self, priority: u8, flag: u32, ms: u32) -> Result<()> {
        self.delays.update(priority, flag, time::current_time(), ms)
    }

    pub fn remove_delay(&mut self, priority: u8, flag: u32) -> Result<()> {
        self.delays.remove(priority, flag)
    }

    /// Cancel every pending delay timer.
    pub fn remove_all_delays(&mut self) {
        self.delays.remove_all();
    }

    pub fn active_delay_count(&self) -> usize {
        self.delays.active_count()
    }

    // ── Cyclic engine ────────────────────────────────────────────

    pub fn add_cyclic(
        &mut self,
        cb: Callback,
        priority: u8,
        flag: u32,
        period_ms: u32,
    ) -> Result<()> {
        self.cyclics.add(
            &mut self.events,
            cb,
            priority,
            flag,
            time::current_time(),
            period_ms,
        )
    }

    pub fn update_cyclic(&mut self, priority: u8, flag: u32, period_ms: u32) -> Result<()> {
        self.cyclics
            .edit(priority, flag, time::current_time(), period_ms)
    }

    pub fn remove_cyclic(&mut self, priority: u8, flag: u32) -> Result<()> {
        self.cyclics.remove(priority, flag)
    }

    /// Stop every running cyclic timer.
    pub fn remove_all_cyclic(&mut self) {
        self.cyclics.remove_all();
    }

    pub fn active_cyclic_count(&self) -> usize {
        self.cyclics.active_count()
    }

    // ── Dispatch ─────────────────────────────────────────────────

    /// Run one dispatch cycle: scan banks from priority 0 upward for the
    /// first with a pending event, select its MSB-most flag, and invoke
    /// the bound callback with the bank's full status snapshot. Returns
    /// `true` if a callback ran.
    ///
    /// If the selected bit has no matching armed slot — an orphan left
    /// behind when a prior callback's return value re-posted a flag whose
    /// slot had already been freed — the bit is cleared without invoking
    /// anything, and the scan retries within the same bank.
    pub fn run_once(&mut self) -> bool {
        for priority in 0..P {
            let priority = priority as u8;
            loop {
                let status = self.events.bank_status(priority);
                if status == 0 {
                    break;
                }
                let flag = most_important_flag(status);
                match self.events.find_slot(priority, flag) {
                    Some(slot) => {
                        let snapshot = self.events.snapshot_and_clear(priority);
                        let cb = self.events.callback_at(priority, slot);
                        let next_status = cb(snapshot);
                        self.events.finish_dispatch(priority, slot, next_status);
                        return true;
                    }
                    None => {
                        log::trace!(
                            "scheduler: clearing orphan status bit {flag:#010x} at priority {priority}"
                        );
                        self.events.clear_orphan_bit(priority, flag);
                    }
                }
            }
        }
        false
    }

    /// Drain every delay and cyclic slot whose deadline has elapsed,
    /// posting their events. Call only after observing the ISR's
    /// `timer_fired` latch, and only from foreground context.
    pub fn service_timers(&mut self) {
        let now = time::current_time();
        self.delays.update_delay_events(now, &mut self.events);
        self.cyclics.update_cyclic_events(now, &mut self.events);
    }

    /// The non-returning foreground loop: dispatch pending events as fast
    /// as they arrive; when nothing is pending, run the idle phase
    /// (`do_before_sleep` → `sleep` → `do_after_wakeup`) and service
    /// expired timers whenever the ISR has ticked since the last pass.
    pub fn run_forever(&mut self, hooks: &mut impl SleepHooks) -> ! {
        loop {
            if self.run_once() {
                continue;
            }
            while !self.is_any_event() {
                hooks.do_before_sleep();
                hooks.sleep();
                hooks.do_after_wakeup();
                if time::take_timer_fired() {
                    self.service_timers();
                }
            }
        }
    }
}
