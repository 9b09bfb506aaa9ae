//! Periodic cyclic timers: post a flag every `period_ms`, re-arming
//! automatically on each fire.
//!
//! Structurally identical to [`crate::delay::DelayTable`] except slots
//! never free themselves on fire — they recompute `deadline = now +
//! period` and keep running until [`CyclicTable::remove`] or
//! [`CyclicTable::remove_all`] is called.

use crate::event::EventStore;
use crate::types::{Callback, Error, Result, NO_EVENT, NO_PRIORITY};

#[derive(Clone, Copy)]
struct CyclicSlot {
    priority: u8,
    flag: u32,
    callback: Option<Callback>,
    deadline: u32,
    period: u32,
}

impl CyclicSlot {
    const FREE: Self = Self {
        priority: NO_PRIORITY,
        flag: NO_EVENT,
        callback: None,
        deadline: 0,
        period: 0,
    };

    fn is_free(&self) -> bool {
        self.priority == NO_PRIORITY && self.flag == NO_EVENT
    }
}

/// Up to `C` periodic cyclic timers.
pub struct CyclicTable<const C: usize = 32> {
    slots: [CyclicSlot; C],
}

impl<const C: usize> Default for CyclicTable<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const C: usize> CyclicTable<C> {
    pub fn new() -> Self {
        Self {
            slots: [CyclicSlot::FREE; C],
        }
    }

    fn find(&self, priority: u8, flag: u32) -> Option<usize> {
        self.slots
            .iter()
            .position(|s| !s.is_free() && s.priority == priority && s.flag == flag)
    }

    fn find_free(&self) -> Option<usize> {
        self.slots.iter().position(CyclicSlot::is_free)
    }

    /// Arm a periodic timer for `(priority, flag)`. `period_ms == 0` is
    /// rejected — a period-zero cyclic timer would busy-fire every tick,
    /// which is never the caller's intent.
    pub fn add<const P: usize>(
        &mut self,
        events: &mut EventStore<P>,
        cb: Callback,
        priority: u8,
        flag: u32,
        now: u32,
        period_ms: u32,
    ) -> Result<()> {
        if flag == 0 || period_ms == 0 {
            return Err(Error::WrongParams);
        }
        if (priority as usize) >= P {
            return Err(Error::WrongParams);
        }

        let _ = events.remove_event(priority, flag);

        let idx = self.find_free().ok_or(Error::NoTimerAvailable)?;
        critical_section::with(|_| {
            self.slots[idx] = CyclicSlot {
                priority,
                flag,
                callback: Some(cb),
                deadline: now.wrapping_add(period_ms),
                period: period_ms,
            };
        });
        log::trace!(
            "cyclic: armed flag {flag:#010x} at priority {priority}, period {period_ms}ms"
        );
        Ok(())
    }

    /// Change an existing cyclic timer's period, restarting its countdown
    /// from `now`.
    pub fn edit(&mut self, priority: u8, flag: u32, now: u32, period_ms: u32) -> Result<()> {
        if period_ms == 0 {
            return Err(Error::WrongParams);
        }
        let idx = self.find(priority, flag).ok_or(Error::NoTimerFound)?;
        critical_section::with(|_| {
            let slot = &mut self.slots[idx];
            slot.period = period_ms;
            slot.deadline = now.wrapping_add(period_ms);
        });
        Ok(())
    }

    /// Stop a running cyclic timer.
    pub fn remove(&mut self, priority: u8, flag: u32) -> Result<()> {
        let idx = self.find(priority, flag).ok_or(Error::NoTimerFound)?;
        critical_section::with(|_| {
            self.slots[idx] = CyclicSlot::FREE;
        });
        Ok(())
    }

    /// Stop every running cyclic timer.
    pub fn remove_all(&mut self) {
        critical_section::with(|_| {
            self.slots = [CyclicSlot::FREE; C];
        });
    }

    /// Fire every slot whose deadline has elapsed: post its event and
    /// re-arm `deadline = now + period`. Call only from foreground
    /// context.
    pub fn update_cyclic_events<const P: usize>(&mut self, now: u32, events: &mut EventStore<P>) {
        for idx in 0..C {
            let due = critical_section::with(|_| {
                let slot = self.slots[idx];
                if !slot.is_free() && now >= slot.deadline {
                    self.slots[idx].deadline = now.wrapping_add(slot.period);
                    Some(slot)
                } else {
                    None
                }
            });
            let Some(slot) = due else { continue };
            let Some(cb) = slot.callback else { continue };
            if let Err(e) = events.add_event(cb, slot.priority, slot.flag) {
                log::warn!(
                    "cyclic: could not post due flag {:#010x} at priority {}: {e}",
                    slot.flag,
                    slot.priority
                );
            }
        }
    }

    /// Number of currently running cyclic timers.
    pub fn active_count(&self) -> usize {
        self.slots.iter().filter(|s| !s.is_free()).count()
    }
}
