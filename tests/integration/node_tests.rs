//! End-to-end node lifecycle: readiness, start modes and fatal errors.

use core::pin::pin;
use core::time::Duration;

use sensenode::adapters::time::ManualClock;
use sensenode::app::events::NodeEvent;
use sensenode::app::ports::ClockPort;
use sensenode::app::service::{IndicatorMode, Node, run};
use sensenode::error::{Error, IndicatorError};
use sensenode::readiness::Subsystem;
use sensenode::scheduler::{IndicatorState, MS_PER_HOUR, ScheduleOffset};

use crate::mock_hw::{MockIndicator, MockSensors, MockSink, RecordingEvents, at, drive_until};

#[test]
fn stalled_subsystem_never_starts() {
    let clock = ManualClock::new(at(10, 0, 0, 0));
    let mut indicator = MockIndicator::new(&clock);
    indicator.never_ready = true;
    let events = RecordingEvents::default();
    let mut node = Node::new(
        IndicatorMode::ForcedOff,
        &clock,
        MockSensors::new(&clock),
        indicator,
        MockSink::default(),
        &events,
    );

    {
        let fut = pin!(run(&mut node));
        assert!(drive_until(&clock, fut, at(11, 0, 0, 0)).is_none());
    }

    assert_eq!(events.all(), vec![NodeEvent::SubsystemReady(Subsystem::Sensors)]);
    assert!(node.gate().is_reported(Subsystem::Sensors));
    assert!(!node.gate().is_ready());
    assert_eq!(clock.pending_timers(), 0);
    assert!(node.indicator().calls.is_empty());
    assert!(node.sensors().reads.is_empty());
}

#[test]
fn forced_off_blanks_once_then_polls() {
    let clock = ManualClock::new(at(10, 15, 42, 250));
    let events = RecordingEvents::default();
    let mut node = Node::new(
        IndicatorMode::ForcedOff,
        &clock,
        MockSensors::new(&clock),
        MockIndicator::new(&clock),
        MockSink::default(),
        &events,
    );

    {
        let fut = pin!(run(&mut node));
        assert!(drive_until(&clock, fut, at(10, 18, 30, 0)).is_none());
    }

    assert_eq!(node.indicator().calls, vec![(at(10, 15, 42, 250), IndicatorState::Off)]);
    assert_eq!(node.poll().stats().attempted, 3);
    assert_eq!(node.sink().posted.len(), 3);
    assert!(node.day_night().is_none());

    let all = events.all();
    let started = all
        .iter()
        .position(|e| *e == NodeEvent::Started { day_night: false })
        .unwrap();
    assert_eq!(all[started - 1], NodeEvent::AllReady);
    assert_eq!(
        all[started + 1],
        NodeEvent::PollArmed {
            delay: Duration::from_millis(17_750)
        }
    );
    assert_eq!(events.count(|e| matches!(e, NodeEvent::SubsystemReady(_))), 2);
}

#[test]
fn failed_blank_is_fatal() {
    let clock = ManualClock::new(at(10, 0, 0, 0));
    let events = RecordingEvents::default();
    let mut node = Node::new(
        IndicatorMode::ForcedOff,
        &clock,
        MockSensors::new(&clock),
        MockIndicator::failing(&clock),
        MockSink::default(),
        &events,
    );

    let result = {
        let fut = pin!(run(&mut node));
        drive_until(&clock, fut, at(11, 0, 0, 0))
    };

    let expected = Error::Indicator(IndicatorError::WriteFailed);
    assert_eq!(result.map(|r| r.err()), Some(Some(expected)));
    assert_eq!(events.all().last(), Some(&NodeEvent::Fatal(expected)));
    assert_eq!(events.count(|e| matches!(e, NodeEvent::PollArmed { .. })), 0);
    assert!(node.sensors().reads.is_empty());
}

#[test]
fn day_night_runs_beside_polling() {
    let clock = ManualClock::new(at(7, 59, 30, 0));
    let events = RecordingEvents::default();
    let offsets = ScheduleOffset::new(8 * MS_PER_HOUR, 22 * MS_PER_HOUR).unwrap();
    let mut node = Node::new(
        IndicatorMode::DayNight(offsets),
        &clock,
        MockSensors::new(&clock),
        MockIndicator::new(&clock),
        MockSink::default(),
        &events,
    );

    {
        let fut = pin!(run(&mut node));
        assert!(drive_until(&clock, fut, at(8, 1, 30, 0)).is_none());
        // Next poll boundary plus the 22:00 turn-off.
        assert_eq!(clock.pending_timers(), 2);
    }

    assert!(events.contains(&NodeEvent::Started { day_night: true }));
    assert_eq!(
        node.indicator().calls,
        vec![(at(7, 59, 30, 0), IndicatorState::Off), (at(8, 0, 0, 0), IndicatorState::On)]
    );
    assert_eq!(node.sensors().reads, vec![at(8, 0, 0, 0), at(8, 1, 0, 0)]);
    assert_eq!(node.clock().now(), at(8, 1, 0, 0));
    let day_night = node.day_night().unwrap();
    assert_eq!(day_night.offsets(), offsets);
    assert_eq!(day_night.state(), Some(IndicatorState::On));
    assert_eq!(day_night.next_toggle_at(), Some(at(22, 0, 0, 0)));
}
