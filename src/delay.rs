//! One-shot delay timers: arm a flag to fire once, `ms` milliseconds from
//! now.
//!
//! Each slot is keyed by `(priority, flag)`, exactly like an event slot,
//! but carries a `deadline` instead of a callback-bound flag state. The
//! foreground loop drains due slots via [`DelayTable::update_delay_events`]
//! after observing the ISR's `timer_fired` latch (never from the ISR
//! itself — see `time.rs`).

use crate::event::EventStore;
use crate::types::{Callback, Error, Result, NO_EVENT, NO_PRIORITY};

#[derive(Clone, Copy)]
struct DelaySlot {
    priority: u8,
    flag: u32,
    callback: Option<Callback>,
    deadline: u32,
}

impl DelaySlot {
    const FREE: Self = Self {
        priority: NO_PRIORITY,
        flag: NO_EVENT,
        callback: None,
        deadline: 0,
    };

    fn is_free(&self) -> bool {
        self.priority == NO_PRIORITY && self.flag == NO_EVENT
    }
}

/// Up to `D` one-shot delay timers.
pub struct DelayTable<const D: usize = 32> {
    slots: [DelaySlot; D],
}

impl<const D: usize> Default for DelayTable<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const D: usize> DelayTable<D> {
    pub fn new() -> Self {
        Self {
            slots: [DelaySlot::FREE; D],
        }
    }

    fn find(&self, priority: u8, flag: u32) -> Option<usize> {
        self.slots
            .iter()
            .position(|s| !s.is_free() && s.priority == priority && s.flag == flag)
    }

    fn find_free(&self) -> Option<usize> {
        self.slots.iter().position(DelaySlot::is_free)
    }

    /// Arm a one-shot delay for `(priority, flag)`, bound to `cb`.
    ///
    /// `ms == 0` degrades to an immediate post through `events` rather
    /// than consuming a timer slot. A prior pending event for the same
    /// `(priority, flag)` is removed first — redundant re-arms collapse
    /// rather than stacking.
    pub fn add<const P: usize>(
        &mut self,
        events: &mut EventStore<P>,
        cb: Callback,
        priority: u8,
        flag: u32,
        now: u32,
        ms: u32,
    ) -> Result<()> {
        if flag == 0 {
            return Err(Error::WrongParams);
        }
        if (priority as usize) >= P {
            return Err(Error::WrongParams);
        }

        let _ = events.remove_event(priority, flag);

        if ms == 0 {
            return events.add_event(cb, priority, flag);
        }

        let idx = self.find_free().ok_or(Error::NoTimerAvailable)?;
        critical_section::with(|_| {
            self.slots[idx] = DelaySlot {
                priority,
                flag,
                callback: Some(cb),
                deadline: now.wrapping_add(ms),
            };
        });
        log::trace!("delay: armed flag {flag:#010x} at priority {priority}, due in {ms}ms");
        Ok(())
    }

    /// Re-arm an existing delay's deadline to `now + ms` without touching
    /// its callback.
    pub fn update(&mut self, priority: u8, flag: u32, now: u32, ms: u32) -> Result<()> {
        let idx = self.find(priority, flag).ok_or(Error::NoTimerFound)?;
        critical_section::with(|_| {
            self.slots[idx].deadline = now.wrapping_add(ms);
        });
        Ok(())
    }

    /// Cancel a pending delay before it fires.
    pub fn remove(&mut self, priority: u8, flag: u32) -> Result<()> {
        let idx = self.find(priority, flag).ok_or(Error::NoTimerFound)?;
        critical_section::with(|_| {
            self.slots[idx] = DelaySlot::FREE;
        });
        Ok(())
    }

    /// Cancel every pending delay.
    pub fn remove_all(&mut self) {
        critical_section::with(|_| {
            self.slots = [DelaySlot::FREE; D];
        });
    }

    /// Fire every slot whose deadline has elapsed: post its event and free
    /// the slot. Call only from foreground context, after `time::take_timer_fired`
    /// reports a tick occurred.
    pub fn update_delay_events<const P: usize>(&mut self, now: u32, events: &mut EventStore<P>) {
        for idx in 0..D {
            let due = critical_section::with(|_| {
                let slot = self.slots[idx];
                if !slot.is_free() && now >= slot.deadline {
                    self.slots[idx] = DelaySlot::FREE;
                    Some(slot)
                } else {
                    None
                }
            });
            let Some(slot) = due else { continue };
            let Some(cb) = slot.callback else { continue };
            if let Err(e) = events.add_event(cb, slot.priority, slot.flag) {
                log::warn!(
                    "delay: could not post expired flag {:#010x} at priority {}: {e}",
                    slot.flag,
                    slot.priority
                );
            }
        }
    }

    /// Number of currently armed delay timers.
    pub fn active_count(&self) -> usize {
        self.slots.iter().filter(|s| !s.is_free()).count()
    }
}
