//! A priority-banked, cooperative, event-driven task scheduler for
//! bare-metal microcontrollers.
//!
//! Events are posted into one of `P` priority banks as a single bit in a
//! `u32` flag; the foreground loop dispatches the highest-priority,
//! highest-bit event pending on each pass, runs its callback to
//! completion, and folds the callback's return value back into the
//! bank's pending state. A one-shot [`delay`] engine and a periodic
//! [`cyclic`] engine both post events this way once their deadlines,
//! driven by a [`time`]-module millisecond counter advanced from a timer
//! ISR, elapse.
//!
//! There is no preemption, no dynamic allocation, and no inter-priority
//! fairness: a busy high-priority bank can starve lower ones, by design.
//!
//! See [`scheduler::Scheduler`] for the entry point.

#![no_std]
#![deny(unused_must_use)]

#[cfg(test)]
extern crate std;

pub mod cyclic;
pub mod delay;
pub mod event;
pub mod scheduler;
pub mod time;
pub mod types;

pub use cyclic::CyclicTable;
pub use delay::DelayTable;
pub use event::EventStore;
pub use scheduler::{NoSleep, Scheduler, SleepHooks};
pub use types::{Callback, Error, Result, EVENTS_PER_PRIORITY, NO_EVENT, NO_PRIORITY};
