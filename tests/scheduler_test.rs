use flow_tour::{
    clock::{Clock, ManualClock},
    scheduler::Scheduler,
};

use crate::common::test_utils::ms;

mod common;

#[test]
fn due_items_come_out_in_time_order() {
    let mut scheduler = Scheduler::new();
    scheduler.schedule(ms(300), "c");
    scheduler.schedule(ms(100), "a");
    scheduler.schedule(ms(200), "b");
    assert_eq!(scheduler.peek_due(), Some(ms(100)));

    assert!(scheduler.drain_due(ms(99)).is_empty());
    assert_eq!(scheduler.drain_due(ms(200)), vec!["a", "b"]);
    assert_eq!(scheduler.len(), 1);
    assert_eq!(scheduler.drain_due(ms(1000)), vec!["c"]);
    assert!(scheduler.is_empty());
}

#[test]
fn equal_due_times_keep_scheduling_order() {
    let mut scheduler = Scheduler::new();
    scheduler.schedule(ms(50), 1);
    scheduler.schedule(ms(50), 2);
    scheduler.schedule(ms(10), 0);
    scheduler.schedule(ms(50), 3);
    assert_eq!(scheduler.drain_due(ms(50)), vec![0, 1, 2, 3]);
}

#[test]
fn manual_clock_clones_share_time() {
    let clock = ManualClock::new();
    let view = clock.clone();
    assert_eq!(view.now(), ms(0));

    clock.advance(ms(16));
    clock.advance(ms(16));
    assert_eq!(view.now(), ms(32));

    clock.set(ms(5));
    assert_eq!(view.now(), ms(5));
}
