//! Day/night indicator scheduling against the virtual clock.

use core::pin::pin;
use core::time::Duration;

use sensenode::adapters::time::ManualClock;
use sensenode::app::events::NodeEvent;
use sensenode::error::{Error, IndicatorError};
use sensenode::scheduler::{DayNightScheduler, IndicatorState, MS_PER_HOUR, ScheduleOffset};

use crate::mock_hw::{MockIndicator, RecordingEvents, at, day, drive_until, hours};

use IndicatorState::{Off, On};

fn schedule(on_h: u32, off_h: u32) -> DayNightScheduler {
    DayNightScheduler::new(ScheduleOffset::new(on_h * MS_PER_HOUR, off_h * MS_PER_HOUR).unwrap())
}

#[test]
fn normal_window_from_early_morning() {
    let clock = ManualClock::new(at(7, 0, 0, 0));
    let mut indicator = MockIndicator::new(&clock);
    let events = RecordingEvents::default();
    let mut scheduler = schedule(8, 22);

    {
        let fut = pin!(scheduler.run(&clock, &mut indicator, &events));
        let until = day(2).and_hms_opt(12, 0, 0).unwrap();
        assert!(drive_until(&clock, fut, until).is_none());
    }

    assert_eq!(
        indicator.calls,
        vec![
            (at(7, 0, 0, 0), Off),
            (at(8, 0, 0, 0), On),
            (at(22, 0, 0, 0), Off),
            (day(2).and_hms_opt(8, 0, 0).unwrap(), On),
        ]
    );
    assert_eq!(events.toggle_delays(), vec![hours(1), hours(14), hours(10), hours(14)]);
    assert_eq!(scheduler.state(), Some(On));
    assert_eq!(scheduler.next_toggle_at(), Some(day(2).and_hms_opt(22, 0, 0).unwrap()));
}

#[test]
fn starting_inside_the_window_turns_on() {
    let clock = ManualClock::new(at(12, 30, 0, 0));
    let mut indicator = MockIndicator::new(&clock);
    let events = RecordingEvents::default();
    let mut scheduler = schedule(8, 22);

    {
        let fut = pin!(scheduler.run(&clock, &mut indicator, &events));
        assert!(drive_until(&clock, fut, at(12, 30, 0, 0)).is_none());
    }

    assert_eq!(indicator.states(), vec![On]);
    assert_eq!(
        events.all(),
        vec![NodeEvent::IndicatorSwitched {
            state: On,
            next_toggle_in: Duration::from_secs(9 * 3600 + 30 * 60),
        }]
    );
}

#[test]
fn window_across_midnight() {
    let clock = ManualClock::new(at(23, 0, 0, 0));
    let mut indicator = MockIndicator::new(&clock);
    let events = RecordingEvents::default();
    let mut scheduler = schedule(22, 8);

    {
        let fut = pin!(scheduler.run(&clock, &mut indicator, &events));
        let until = day(2).and_hms_opt(23, 0, 0).unwrap();
        assert!(drive_until(&clock, fut, until).is_none());
    }

    assert_eq!(
        indicator.calls,
        vec![
            (at(23, 0, 0, 0), On),
            (day(2).and_hms_opt(8, 0, 0).unwrap(), Off),
            (day(2).and_hms_opt(22, 0, 0).unwrap(), On),
        ]
    );
    assert_eq!(events.toggle_delays(), vec![hours(9), hours(14), hours(10)]);
}

#[test]
fn degenerate_window_stays_on() {
    let clock = ManualClock::new(at(6, 0, 0, 0));
    let mut indicator = MockIndicator::new(&clock);
    let events = RecordingEvents::default();
    let mut scheduler = schedule(12, 12);

    {
        let fut = pin!(scheduler.run(&clock, &mut indicator, &events));
        let until = day(3).and_hms_opt(6, 0, 0).unwrap();
        assert!(drive_until(&clock, fut, until).is_none());
    }

    assert_eq!(indicator.states(), vec![On, On, On]);
    assert_eq!(events.toggle_delays(), vec![hours(24); 3]);
}

#[test]
fn exactly_one_toggle_is_pending() {
    let clock = ManualClock::new(at(7, 0, 0, 0));
    let mut indicator = MockIndicator::new(&clock);
    let events = RecordingEvents::default();
    let mut scheduler = schedule(8, 22);

    let mut fut = pin!(scheduler.run(&clock, &mut indicator, &events));
    for hour in [7, 8, 15, 22, 23] {
        drive_until(&clock, fut.as_mut(), at(hour, 0, 0, 0));
        assert_eq!(clock.pending_timers(), 1, "at {hour}:00");
    }
}

#[test]
fn slow_indicator_keeps_the_deadline() {
    let clock = ManualClock::new(at(7, 0, 0, 0));
    let mut indicator = MockIndicator::new(&clock);
    indicator.io_time = Duration::from_secs(2);
    let events = RecordingEvents::default();
    let mut scheduler = schedule(8, 22);

    {
        let fut = pin!(scheduler.run(&clock, &mut indicator, &events));
        assert!(drive_until(&clock, fut, at(22, 0, 0, 0)).is_none());
    }

    assert_eq!(
        indicator.calls,
        vec![(at(7, 0, 0, 0), Off), (at(8, 0, 0, 0), On), (at(22, 0, 0, 0), Off)]
    );
    assert_eq!(clock.requested_sleeps()[0], hours(1) - Duration::from_secs(2));
}

#[test]
fn indicator_failure_still_rearms() {
    let clock = ManualClock::new(at(7, 0, 0, 0));
    let mut indicator = MockIndicator::failing(&clock);
    let events = RecordingEvents::default();
    let mut scheduler = schedule(8, 22);

    {
        let fut = pin!(scheduler.run(&clock, &mut indicator, &events));
        assert!(drive_until(&clock, fut, at(22, 0, 0, 0)).is_none());
    }

    assert_eq!(indicator.states(), vec![Off, On, Off]);
    assert!(events.toggle_delays().is_empty());
    assert!(events.contains(&NodeEvent::IndicatorFailed {
        state: On,
        error: Error::Indicator(IndicatorError::WriteFailed),
    }));
    assert_eq!(scheduler.next_toggle_at(), Some(day(2).and_hms_opt(8, 0, 0).unwrap()));
}

#[test]
fn late_wake_applies_the_state_due_now() {
    let clock = ManualClock::new(at(7, 0, 0, 0));
    let mut indicator = MockIndicator::new(&clock);
    let events = RecordingEvents::default();
    let mut scheduler = schedule(8, 22);

    {
        let mut fut = pin!(scheduler.run(&clock, &mut indicator, &events));
        drive_until(&clock, fut.as_mut(), at(7, 0, 0, 0));

        // Host suspended through the whole lit window; the 08:00 timer fires at 23:00.
        clock.set(at(23, 0, 0, 0));
        drive_until(&clock, fut.as_mut(), at(23, 0, 0, 0));
    }

    assert_eq!(indicator.calls, vec![(at(7, 0, 0, 0), Off), (at(23, 0, 0, 0), Off)]);
    assert_eq!(events.toggle_delays(), vec![hours(1), hours(9)]);
    assert_eq!(scheduler.next_toggle_at(), Some(day(2).and_hms_opt(8, 0, 0).unwrap()));
}
