//! Property tests for the core tables' bookkeeping invariants.
//!
//! These drive `EventStore`/`DelayTable`/`CyclicTable` directly with
//! proptest-generated operation sequences and a small shadow model,
//! rather than going through `Scheduler::run_once` — dispatch callback
//! semantics are caller-defined, so only the add/remove/query bookkeeping
//! is something a generic property can hold over arbitrary callbacks.

use banksched::{CyclicTable, DelayTable, EventStore};
use proptest::prelude::*;
use std::collections::HashSet;

fn noop(_: u32) -> u32 {
    0
}

const PRIORITIES: u8 = 3;
const FLAGS: [u32; 4] = [0x1, 0x2, 0x4, 0x8];

#[derive(Debug, Clone, Copy)]
enum Op {
    Add(u8, u32),
    Remove(u8, u32),
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..PRIORITIES, proptest::sample::select(&FLAGS[..])).prop_map(|(p, f)| Op::Add(p, f)),
        (0..PRIORITIES, proptest::sample::select(&FLAGS[..])).prop_map(|(p, f)| Op::Remove(p, f)),
    ]
}

proptest! {
    /// `is_event`/`is_any_event` always agree with a plain set model of
    /// which `(priority, flag)` pairs are currently armed, for any
    /// sequence of add/remove calls that never touches dispatch.
    #[test]
    fn event_store_tracks_armed_flags(ops in proptest::collection::vec(arb_op(), 0..64)) {
        let mut store: EventStore<{ PRIORITIES as usize }> = EventStore::new();
        let mut model: HashSet<(u8, u32)> = HashSet::new();

        for op in ops {
            match op {
                Op::Add(p, f) => {
                    let result = store.add_event(noop, p, f);
                    if model.contains(&(p, f)) {
                        prop_assert!(result.is_err());
                    } else {
                        prop_assert!(result.is_ok());
                        model.insert((p, f));
                    }
                }
                Op::Remove(p, f) => {
                    let result = store.remove_event(p, f);
                    if model.contains(&(p, f)) {
                        prop_assert!(result.is_ok());
                        model.remove(&(p, f));
                    } else {
                        prop_assert!(result.is_err());
                    }
                }
            }

            for p in 0..PRIORITIES {
                for &f in &FLAGS {
                    prop_assert_eq!(store.is_event(p, f), model.contains(&(p, f)));
                }
            }
            prop_assert_eq!(store.is_any_event(), !model.is_empty());
        }
    }

    /// A delay timer armed at `now` with period `ms` never reports as due
    /// before `now + ms`, and always reports due at exactly that instant.
    #[test]
    fn delay_deadline_is_exact(now in 0u32..1_000_000, ms in 1u32..100_000) {
        let mut events: EventStore<2> = EventStore::new();
        let mut delays: DelayTable<4> = DelayTable::new();
        delays.add(&mut events, noop, 0, 0x1, now, ms).unwrap();

        let deadline = now.wrapping_add(ms);
        if deadline > now {
            // No wraparound in this sample: anything strictly before the
            // deadline must not fire.
            delays.update_delay_events(deadline - 1, &mut events);
            prop_assert!(!events.is_event(0, 0x1));
        }

        delays.update_delay_events(deadline, &mut events);
        prop_assert!(events.is_event(0, 0x1));
        prop_assert_eq!(delays.active_count(), 0);
    }

    /// A cyclic timer never loses its "active" status across any number
    /// of fires — only an explicit `remove` stops it.
    #[test]
    fn cyclic_timer_stays_active_across_fires(now in 0u32..1_000, period in 1u32..1_000, fires in 0u32..20) {
        let mut events: EventStore<2> = EventStore::new();
        let mut cyclics: CyclicTable<4> = CyclicTable::new();
        cyclics.add(&mut events, noop, 0, 0x1, now, period).unwrap();

        let mut t = now;
        for _ in 0..fires {
            t = t.wrapping_add(period);
            cyclics.update_cyclic_events(t, &mut events);
            prop_assert_eq!(cyclics.active_count(), 1);
            let _ = events.remove_event(0, 0x1);
        }
    }
}
