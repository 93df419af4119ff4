//! Minute-aligned polling against the virtual clock.

use core::pin::pin;
use core::time::Duration;

use sensenode::adapters::time::ManualClock;
use sensenode::app::events::{NodeEvent, reading_summary};
use sensenode::error::{Error, SensorError, SinkError};
use sensenode::scheduler::{PollState, SensorPollScheduler};

use crate::mock_hw::{MockSensors, MockSink, RecordingEvents, at, drive_until, sample};

#[test]
fn first_cycle_lands_on_the_next_minute() {
    let clock = ManualClock::new(at(10, 15, 42, 250));
    let mut sensors = MockSensors::new(&clock);
    let mut sink = MockSink::default();
    let events = RecordingEvents::default();
    let mut poll = SensorPollScheduler::new();

    {
        let fut = pin!(poll.run(&clock, &mut sensors, &mut sink, &events));
        assert!(drive_until(&clock, fut, at(10, 20, 0, 0)).is_none());
    }

    assert_eq!(
        sensors.reads,
        vec![
            at(10, 16, 0, 0),
            at(10, 17, 0, 0),
            at(10, 18, 0, 0),
            at(10, 19, 0, 0),
            at(10, 20, 0, 0),
        ]
    );
    assert_eq!(sink.posted.len(), 5);
    assert_eq!(
        events.all()[0],
        NodeEvent::PollArmed {
            delay: Duration::from_millis(17_750)
        }
    );
    assert_eq!(clock.requested_sleeps()[..2], [Duration::from_millis(17_750), Duration::from_secs(60)]);
    assert_eq!(poll.state(), PollState::Scheduled { at: at(10, 21, 0, 0) });
}

#[test]
fn failures_keep_the_schedule() {
    let clock = ManualClock::new(at(9, 59, 30, 0));
    let mut sensors = MockSensors::scripted(
        &clock,
        [
            Err(SensorError::ReadFailed),
            Ok(sample()),
            Err(SensorError::DeviceNotFound),
            Ok(sample()),
        ],
    );
    let mut sink = MockSink::default();
    let events = RecordingEvents::default();
    let mut poll = SensorPollScheduler::new();

    {
        let fut = pin!(poll.run(&clock, &mut sensors, &mut sink, &events));
        assert!(drive_until(&clock, fut, at(10, 3, 0, 0)).is_none());
        // Only the next boundary is armed, never a backlog.
        assert_eq!(clock.pending_timers(), 1);
    }

    assert_eq!(sensors.reads.len(), 4);
    assert_eq!(sensors.reads[3], at(10, 3, 0, 0));
    assert_eq!(sink.posted.len(), 2);
    let stats = poll.stats();
    assert_eq!((stats.attempted, stats.succeeded, stats.failed), (4, 2, 2));
    assert!(events.contains(&NodeEvent::CycleFailed(Error::Sensor(SensorError::ReadFailed))));
}

#[test]
fn sink_outage_does_not_stop_polling() {
    let clock = ManualClock::new(at(12, 0, 0, 1));
    let mut sensors = MockSensors::new(&clock);
    let mut sink = MockSink {
        fail_with: Some(502),
        ..MockSink::default()
    };
    let events = RecordingEvents::default();
    let mut poll = SensorPollScheduler::new();

    {
        let fut = pin!(poll.run(&clock, &mut sensors, &mut sink, &events));
        assert!(drive_until(&clock, fut, at(12, 3, 0, 0)).is_none());
    }

    assert_eq!(sensors.reads.len(), 3);
    assert_eq!(
        events.count(|e| *e == NodeEvent::CycleFailed(Error::Sink(SinkError::Status(502)))),
        3
    );
    assert!(poll.latest().is_none());
}

#[test]
fn slow_cycle_still_aligns_to_boundaries() {
    let clock = ManualClock::new(at(10, 15, 42, 250));
    let mut sensors = MockSensors::slow(&clock, Duration::from_millis(1500));
    let mut sink = MockSink::default();
    let events = RecordingEvents::default();
    let mut poll = SensorPollScheduler::new();

    {
        let fut = pin!(poll.run(&clock, &mut sensors, &mut sink, &events));
        assert!(drive_until(&clock, fut, at(10, 18, 30, 0)).is_none());
    }

    assert_eq!(sensors.reads, vec![at(10, 16, 0, 0), at(10, 17, 0, 0), at(10, 18, 0, 0)]);
    let sleeps = clock.requested_sleeps();
    assert_eq!(sleeps[1], Duration::from_millis(58_500));
    assert_eq!(sleeps[2], Duration::from_millis(58_500));
}

#[test]
fn cycle_longer_than_a_minute_never_overlaps() {
    let clock = ManualClock::new(at(10, 15, 59, 0));
    let mut sensors = MockSensors::slow(&clock, Duration::from_secs(75));
    let mut sink = MockSink::default();
    let events = RecordingEvents::default();
    let mut poll = SensorPollScheduler::new();

    {
        let fut = pin!(poll.run(&clock, &mut sensors, &mut sink, &events));
        assert!(drive_until(&clock, fut, at(10, 20, 30, 0)).is_none());
    }

    // 10:16 ends at 10:17:15, so 10:17 is skipped rather than doubled.
    assert_eq!(sensors.reads, vec![at(10, 16, 0, 0), at(10, 18, 0, 0), at(10, 20, 0, 0)]);
}

#[test]
fn reading_summary_reports_rounded_average() {
    assert_eq!(
        reading_summary(&sample()),
        "Temperature: 21.3\u{00b0}c, pressure: 1009.5hPa, humidity: 48%"
    );
}
