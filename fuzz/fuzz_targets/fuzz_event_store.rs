//! Fuzz target: `EventStore` under arbitrary add/remove/query sequences.
//!
//! Asserts the store never panics and that `remove_all_events` always
//! returns it to a fully empty state, regardless of what came before.
//!
//! cargo fuzz run fuzz_event_store

#![no_main]

use arbitrary::Arbitrary;
use banksched::EventStore;
use libfuzzer_sys::fuzz_target;

#[derive(Arbitrary, Debug)]
enum Op {
    Add(u8, u32),
    Remove(u8, u32),
    IsEvent(u8, u32),
}

fn noop(_: u32) -> u32 {
    0
}

fuzz_target!(|ops: Vec<Op>| {
    let mut store: EventStore<4> = EventStore::new();

    for op in ops {
        match op {
            Op::Add(priority, flag) => {
                let _ = store.add_event(noop, priority, flag);
            }
            Op::Remove(priority, flag) => {
                let _ = store.remove_event(priority, flag);
            }
            Op::IsEvent(priority, flag) => {
                let _ = store.is_event(priority, flag);
            }
        }
    }

    store.remove_all_events();
    assert!(!store.is_any_event(), "remove_all_events must fully clear state");
    for priority in 0u8..4 {
        assert!(!store.is_event(priority, u32::MAX));
    }
});
