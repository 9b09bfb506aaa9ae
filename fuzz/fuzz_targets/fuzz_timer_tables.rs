//! Fuzz target: `DelayTable`/`CyclicTable` under arbitrary arm/tick
//! sequences with a synthetic clock (no real ISR involved).
//!
//! Asserts neither table ever panics, `active_count` never exceeds its
//! capacity, and `remove_all` always empties the table.
//!
//! cargo fuzz run fuzz_timer_tables

#![no_main]

use arbitrary::Arbitrary;
use banksched::{CyclicTable, DelayTable, EventStore};
use libfuzzer_sys::fuzz_target;

#[derive(Arbitrary, Debug)]
enum Op {
    AddDelay(u8, u32, u32),
    AddCyclic(u8, u32, u32),
    Tick(u32),
    RemoveDelay(u8, u32),
    RemoveCyclic(u8, u32),
}

fn noop(_: u32) -> u32 {
    0
}

fuzz_target!(|ops: Vec<Op>| {
    let mut events: EventStore<4> = EventStore::new();
    let mut delays: DelayTable<8> = DelayTable::new();
    let mut cyclics: CyclicTable<8> = CyclicTable::new();
    let mut now: u32 = 0;

    for op in ops {
        match op {
            Op::AddDelay(priority, flag, ms) => {
                let _ = delays.add(&mut events, noop, priority, flag, now, ms);
            }
            Op::AddCyclic(priority, flag, period) => {
                let _ = cyclics.add(&mut events, noop, priority, flag, now, period);
            }
            Op::Tick(delta) => {
                now = now.wrapping_add(delta % 10_000);
                delays.update_delay_events(now, &mut events);
                cyclics.update_cyclic_events(now, &mut events);
            }
            Op::RemoveDelay(priority, flag) => {
                let _ = delays.remove(priority, flag);
            }
            Op::RemoveCyclic(priority, flag) => {
                let _ = cyclics.remove(priority, flag);
            }
        }
        assert!(delays.active_count() <= 8);
        assert!(cyclics.active_count() <= 8);
    }

    delays.remove_all();
    cyclics.remove_all();
    assert_eq!(delays.active_count(), 0);
    assert_eq!(cyclics.active_count(), 0);
});
