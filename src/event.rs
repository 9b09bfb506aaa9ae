//! The priority-banked event store.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    EventStore<P>                             │
//! │                                                               │
//! │   bank[0]  status=0b...0100   bank[1]  status=0b...0000       │
//! │     slot 2: flag=0x4, cb=foo    (nothing armed)                │
//! │     slot …: free                                               │
//! │                                                               │
//! │  add_event/remove_event mutate a bank under a critical        │
//! │  section; is_event/is_any_event are lock-free word reads.      │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! `status` is always the bitwise OR of every occupied slot's `flag` in
//! that bank — dispatch scans it MSB-first rather than walking slots, so
//! membership tests are O(1) and priority selection is a single
//! `leading_zeros` call.

use crate::types::{Callback, Error, Result, EVENTS_PER_PRIORITY, NO_EVENT};

#[derive(Clone, Copy)]
struct EventSlot {
    flag: u32,
    callback: Option<Callback>,
}

impl EventSlot {
    const FREE: Self = Self {
        flag: NO_EVENT,
        callback: None,
    };

    fn is_free(&self) -> bool {
        self.flag == NO_EVENT
    }
}

struct EventBank {
    slots: [EventSlot; EVENTS_PER_PRIORITY],
    /// Bitwise OR of every occupied slot's `flag`. Zero means nothing
    /// pending in this bank.
    status: u32,
}

impl EventBank {
    const fn new() -> Self {
        Self {
            slots: [EventSlot::FREE; EVENTS_PER_PRIORITY],
            status: 0,
        }
    }

    fn find_slot(&self, flag: u32) -> Option<usize> {
        self.slots
            .iter()
            .position(|s| !s.is_free() && s.flag == flag)
    }

    fn find_free_slot(&self) -> Option<usize> {
        self.slots.iter().position(EventSlot::is_free)
    }
}

/// Select the highest (MSB-first) set bit of a non-zero status word.
///
/// Callers must only pass a non-zero `status`; the priority scan never
/// calls this on an empty bank.
pub(crate) fn most_important_flag(status: u32) -> u32 {
    debug_assert_ne!(status, 0, "most_important_flag called on an empty bank");
    1u32 << (31 - status.leading_zeros())
}

/// `P` priority banks, each holding up to [`EVENTS_PER_PRIORITY`] armed
/// events. Bank 0 is the highest priority.
pub struct EventStore<const P: usize = 4> {
    banks: [EventBank; P],
    /// Set by `add_event`, cleared by [`EventStore::take_new_event_occurred`].
    /// Consulted by nothing in this crate; exposed so an embedding
    /// firmware can use it as an idle/wake heuristic of its own.
    new_event_occurred: bool,
}

impl<const P: usize> Default for EventStore<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const P: usize> EventStore<P> {
    pub fn new() -> Self {
        Self {
            banks: core::array::from_fn(|_| EventBank::new()),
            new_event_occurred: false,
        }
    }

    fn check_priority(priority: u8) -> Result<()> {
        if (priority as usize) < P {
            Ok(())
        } else {
            Err(Error::WrongParams)
        }
    }

    /// Arm `flag` at `priority`, bound to `cb`.
    ///
    /// Fails with [`Error::EventJustSet`] if `flag` is already pending in
    /// that bank, or [`Error::EventBufferFull`] if the bank has no free
    /// slot. Validation happens outside any lock; the actual check
    /// (bank status) and mutation happen together inside one critical
    /// section.
    pub fn add_event(&mut self, cb: Callback, priority: u8, flag: u32) -> Result<()> {
        if flag == 0 {
            return Err(Error::WrongParams);
        }
        Self::check_priority(priority)?;

        let bank = &mut self.banks[priority as usize];
        critical_section::with(|_| {
            if bank.status & flag != 0 {
                return Err(Error::EventJustSet);
            }
            let idx = bank.find_free_slot().ok_or(Error::EventBufferFull)?;
            bank.slots[idx] = EventSlot {
                flag,
                callback: Some(cb),
            };
            bank.status |= flag;
            Ok(())
        })?;

        self.new_event_occurred = true;
        log::trace!("event: armed {flag:#010x} at priority {priority}");
        Ok(())
    }

    /// Remove the armed slot in `priority` whose flag ANDs non-zero with
    /// `flag`, and clear the corresponding bits from `status`.
    pub fn remove_event(&mut self, priority: u8, flag: u32) -> Result<()> {
        if flag == 0 {
            return Err(Error::WrongParams);
        }
        Self::check_priority(priority)?;

        let bank = &mut self.banks[priority as usize];
        critical_section::with(|_| {
            if bank.status & flag == 0 {
                return Err(Error::NoEventFound);
            }
            let idx = bank
                .slots
                .iter()
                .position(|s| !s.is_free() && (s.flag & flag) != 0)
                .ok_or(Error::NoEventFound)?;
            bank.slots[idx] = EventSlot::FREE;
            bank.status &= !flag;
            Ok(())
        })
    }

    /// `true` iff `flag` is currently pending at `priority`. A single
    /// aligned word read — no critical section needed.
    pub fn is_event(&self, priority: u8, flag: u32) -> bool {
        (priority as usize) < P && (self.banks[priority as usize].status & flag) != 0
    }

    /// `true` iff any bank has a non-zero status.
    pub fn is_any_event(&self) -> bool {
        self.banks.iter().any(|b| b.status != 0)
    }

    /// Empty every bank. Called by `Scheduler::init`.
    pub fn remove_all_events(&mut self) {
        critical_section::with(|_| {
            for bank in &mut self.banks {
                bank.status = 0;
                bank.slots = [EventSlot::FREE; EVENTS_PER_PRIORITY];
            }
        });
    }

    /// Take and clear the "an event was armed since this was last
    /// called" latch.
    pub fn take_new_event_occurred(&mut self) -> bool {
        core::mem::replace(&mut self.new_event_occurred, false)
    }

    // ── Dispatch internals (used by `Scheduler::run_once`) ──────────

    pub(crate) fn bank_status(&self, priority: u8) -> u32 {
        self.banks[priority as usize].status
    }

    pub(crate) fn find_slot(&self, priority: u8, flag: u32) -> Option<usize> {
        self.banks[priority as usize].find_slot(flag)
    }

    pub(crate) fn callback_at(&self, priority: u8, slot: usize) -> Callback {
        self.banks[priority as usize].slots[slot]
            .callback
            .expect("dispatch: slot chosen by find_slot always has a callback")
    }

    /// Snapshot and zero a bank's status word in one critical section.
    /// The snapshot is handed to the dispatched callback; the bank's
    /// `status` stays zero until the callback's return value (and any
    /// other `add_event` calls) OR new bits back in.
    pub(crate) fn snapshot_and_clear(&mut self, priority: u8) -> u32 {
        critical_section::with(|_| {
            let bank = &mut self.banks[priority as usize];
            core::mem::take(&mut bank.status)
        })
    }

    /// Free the dispatched slot and OR the callback's returned flags
    /// back into the bank's status.
    pub(crate) fn finish_dispatch(&mut self, priority: u8, slot: usize, next_status: u32) {
        critical_section::with(|_| {
            let bank = &mut self.banks[priority as usize];
            bank.slots[slot] = EventSlot::FREE;
            bank.status |= next_status;
        });
    }

    /// Clear a single status bit with no matching armed slot (spec §9
    /// open question 2), without invoking anything.
    pub(crate) fn clear_orphan_bit(&mut self, priority: u8, flag: u32) {
        critical_section::with(|_| {
            self.banks[priority as usize].status &= !flag;
        });
    }
}
