use herring_haptic_core::RecordError;
use herring_haptic_core::record::{SampleRecord, encode_records};

use super::{DroppedRecord, PlaybackScheduler};
use crate::config::engine::{DropReason, StopReason};
use crate::error::HapticError;
use crate::testing::{RecordingSink, SinkCall};

fn records(parts: &[(u8, &[i8])]) -> Vec<u8> {
    let records: Vec<SampleRecord> = parts
        .iter()
        .map(|(actuator, samples)| SampleRecord::new(*actuator, samples.to_vec()))
        .collect();
    encode_records(&records).expect("encode test records")
}

fn scheduler(num_actuators: u8) -> PlaybackScheduler {
    PlaybackScheduler::new(num_actuators, 50, 10)
}

#[test]
fn out_of_range_actuator_is_dropped_without_touching_others() {
    let mut scheduler = scheduler(2);
    scheduler
        .ingest(&records(&[(0, &[7])]))
        .expect("seed actuator 0");
    let before = scheduler.snapshot()[0];

    let report = scheduler
        .ingest(&records(&[(5, &[1, 2]), (1, &[3])]))
        .expect("ingest");
    assert_eq!(report.stored, 1);
    assert_eq!(
        report.dropped,
        vec![DroppedRecord {
            actuator: Some(5),
            reason: DropReason::InvalidActuator,
        }]
    );

    let snapshot = scheduler.snapshot();
    assert_eq!(snapshot.len(), 2);
    assert_eq!(snapshot[0], before);
    assert_eq!(snapshot[1].playing_slot, Some(0));
    assert_eq!(snapshot[1].slot_lens, [1, 0]);
}

#[test]
fn write_into_two_full_slots_is_dropped() {
    let mut scheduler = scheduler(1);
    scheduler.ingest(&records(&[(0, &[1, 2])])).expect("slot 0");
    scheduler.ingest(&records(&[(0, &[3])])).expect("slot 1");
    let before = scheduler.snapshot();

    let err = scheduler
        .ingest(&records(&[(0, &[9, 9, 9])]))
        .expect_err("both slots occupied");
    assert!(matches!(err, HapticError::NoFreeSlot { actuator: 0 }));
    assert_eq!(scheduler.snapshot(), before);
}

#[test]
fn records_before_a_full_actuator_stay_queued() {
    let mut scheduler = scheduler(2);
    scheduler
        .ingest(&records(&[(1, &[1]), (1, &[2])]))
        .expect("fill actuator 1");

    let err = scheduler
        .ingest(&records(&[(0, &[5, 6]), (1, &[3])]))
        .expect_err("actuator 1 is full");
    assert!(matches!(err, HapticError::NoFreeSlot { actuator: 1 }));
    assert_eq!(scheduler.snapshot()[0].slot_lens, [2, 0]);
}

#[test]
fn one_sample_per_tick_and_swap_at_zero_remaining() {
    let mut sink = RecordingSink::default();
    let mut scheduler = scheduler(1);
    scheduler
        .ingest(&records(&[(0, &[10, 20]), (0, &[30])]))
        .expect("ingest");
    assert!(scheduler.is_playing());

    let report = scheduler.tick(&mut sink);
    assert_eq!(report.delivered, 1);
    let snapshot = scheduler.snapshot()[0];
    assert_eq!(snapshot.playing_slot, Some(0));
    assert_eq!(snapshot.remaining, 1);

    scheduler.tick(&mut sink);
    let snapshot = scheduler.snapshot()[0];
    assert_eq!(snapshot.playing_slot, Some(1));
    assert_eq!(snapshot.remaining, 1);
    assert_eq!(snapshot.slot_lens, [0, 1]);

    scheduler.tick(&mut sink);
    let snapshot = scheduler.snapshot()[0];
    assert_eq!(snapshot.playing_slot, None);
    assert_eq!(snapshot.slot_lens, [0, 0]);

    assert_eq!(sink.samples(), vec![(0, 10), (0, 20), (0, 30)]);
}

#[test]
fn actuators_drain_independently_each_tick() {
    let mut sink = RecordingSink::default();
    let mut scheduler = scheduler(2);
    scheduler
        .ingest(&records(&[(0, &[1, 2, 3]), (1, &[-1])]))
        .expect("ingest");

    assert_eq!(scheduler.tick(&mut sink).delivered, 2);
    assert_eq!(scheduler.tick(&mut sink).delivered, 1);
    assert_eq!(sink.samples(), vec![(0, 1), (1, -1), (0, 2)]);
}

#[test]
fn graceful_stop_waits_for_active_slot_to_drain() {
    let mut sink = RecordingSink::default();
    let mut scheduler = scheduler(1);
    scheduler
        .ingest(&records(&[(0, &[1, 2, 3]), (0, &[4])]))
        .expect("ingest");

    scheduler.tick(&mut sink);
    assert!(scheduler.request_stop());

    let report = scheduler.tick(&mut sink);
    assert_eq!(report.stopped, None);
    assert!(scheduler.is_playing());
    assert_eq!(scheduler.snapshot()[0].remaining, 1);

    let report = scheduler.tick(&mut sink);
    assert_eq!(report.stopped, Some(StopReason::Graceful));
    assert!(!scheduler.is_playing());
    assert!(!scheduler.stop_requested());
    assert_eq!(scheduler.snapshot()[0].slot_lens, [0, 0]);

    assert_eq!(sink.samples(), vec![(0, 1), (0, 2), (0, 3)]);
    assert_eq!(sink.calls().last(), Some(&SinkCall::AmpDisable(0)));
}

#[test]
fn graceful_stop_disables_every_amp_once() {
    let mut sink = RecordingSink::default();
    let mut scheduler = scheduler(2);
    scheduler
        .ingest(&records(&[(0, &[1, 2, 3]), (1, &[9])]))
        .expect("ingest");

    scheduler.tick(&mut sink);
    assert!(scheduler.snapshot()[1].playing_slot.is_none());
    assert!(scheduler.request_stop());

    assert_eq!(scheduler.tick(&mut sink).stopped, None);
    assert_eq!(
        scheduler.tick(&mut sink).stopped,
        Some(StopReason::Graceful)
    );

    let disables: Vec<SinkCall> = sink
        .calls()
        .into_iter()
        .filter(|call| matches!(call, SinkCall::AmpDisable(_)))
        .collect();
    assert_eq!(
        disables,
        vec![SinkCall::AmpDisable(0), SinkCall::AmpDisable(1)]
    );
}

#[test]
fn stop_request_is_ignored_while_idle() {
    let mut scheduler = scheduler(1);
    assert!(!scheduler.request_stop());
    assert!(!scheduler.stop_requested());
}

#[test]
fn new_samples_cancel_a_pending_stop() {
    let mut sink = RecordingSink::default();
    let mut scheduler = scheduler(1);
    scheduler.ingest(&records(&[(0, &[1, 2])])).expect("ingest");
    scheduler.request_stop();
    scheduler.ingest(&records(&[(0, &[3])])).expect("ingest more");
    assert!(!scheduler.stop_requested());

    for _ in 0..3 {
        scheduler.tick(&mut sink);
    }
    assert_eq!(sink.samples(), vec![(0, 1), (0, 2), (0, 3)]);
}

#[test]
fn watchdog_silences_actuators_after_idle_budget() {
    let mut sink = RecordingSink::default();
    let mut scheduler = PlaybackScheduler::new(1, 50, 2);
    scheduler.ingest(&records(&[(0, &[5])])).expect("ingest");

    assert_eq!(scheduler.tick(&mut sink).stopped, None);
    assert_eq!(scheduler.tick(&mut sink).stopped, None);
    assert_eq!(scheduler.tick(&mut sink).stopped, None);
    assert_eq!(scheduler.tick(&mut sink).stopped, Some(StopReason::Watchdog));
    assert!(!scheduler.is_playing());

    assert_eq!(
        sink.calls(),
        vec![
            SinkCall::Sample {
                actuator: 0,
                bit_depth: 8,
                sample: 5,
            },
            SinkCall::Sample {
                actuator: 0,
                bit_depth: 8,
                sample: 0,
            },
            SinkCall::AmpDisable(0),
        ]
    );
}

#[test]
fn tick_without_playback_is_a_no_op() {
    let mut sink = RecordingSink::default();
    let mut scheduler = scheduler(1);
    assert_eq!(scheduler.tick(&mut sink).delivered, 0);
    assert!(sink.calls().is_empty());
}

#[test]
fn stop_now_discards_pending_samples() {
    let mut sink = RecordingSink::default();
    let mut scheduler = scheduler(2);
    scheduler
        .ingest(&records(&[(0, &[1, 2]), (0, &[3])]))
        .expect("ingest");

    let (was_playing, faults) = scheduler.stop_now(&mut sink);
    assert!(was_playing);
    assert!(faults.is_empty());
    assert!(!scheduler.is_playing());
    assert!(scheduler.snapshot().iter().all(|a| a.slot_lens == [0, 0]));
    assert_eq!(
        sink.calls(),
        vec![
            SinkCall::Sample {
                actuator: 0,
                bit_depth: 8,
                sample: 0,
            },
            SinkCall::AmpDisable(0),
        ]
    );
}

#[test]
fn sink_faults_are_reported_and_draining_continues() {
    let mut sink = RecordingSink::default();
    sink.nak_samples(true);
    let mut scheduler = scheduler(1);
    scheduler.ingest(&records(&[(0, &[1, 2])])).expect("ingest");

    let report = scheduler.tick(&mut sink);
    assert_eq!(report.faults.len(), 1);
    assert_eq!(scheduler.snapshot()[0].remaining, 1);
}

#[test]
fn write_size_outside_bounds_is_rejected() {
    let mut scheduler = scheduler(1);
    let err = scheduler.ingest(&[0, 8, 0]).expect_err("header only");
    assert!(matches!(
        err,
        HapticError::Record(RecordError::InvalidWriteSize { len: 3, .. })
    ));

    let oversized = vec![0u8; 53];
    assert!(scheduler.ingest(&oversized).is_err());
    assert!(!scheduler.is_playing());
}

#[test]
fn record_larger_than_a_slot_is_dropped() {
    let mut scheduler = scheduler(2);
    let long = [1i8; 60];
    let report = scheduler
        .ingest(&records(&[(0, &long), (1, &[4])]))
        .expect("fits the two-actuator write bound");

    assert_eq!(report.stored, 1);
    assert_eq!(
        report.dropped,
        vec![DroppedRecord {
            actuator: Some(0),
            reason: DropReason::Oversized,
        }]
    );
    let snapshot = scheduler.snapshot();
    assert_eq!(snapshot[0].slot_lens, [0, 0]);
    assert_eq!(snapshot[1].slot_lens, [1, 0]);
}

#[test]
fn odd_bit_depth_is_coerced_to_eight() {
    let mut sink = RecordingSink::default();
    let mut scheduler = scheduler(1);
    scheduler.ingest(&[0, 16, 1, 42]).expect("ingest");
    scheduler.tick(&mut sink);
    assert_eq!(
        sink.calls(),
        vec![SinkCall::Sample {
            actuator: 0,
            bit_depth: 8,
            sample: 42,
        }]
    );
}

#[test]
fn truncated_tail_keeps_leading_records() {
    let mut scheduler = scheduler(1);
    let report = scheduler.ingest(&[0, 8, 1, 9, 0, 8, 9, 1]).expect("ingest");
    assert_eq!(report.stored, 1);
    assert_eq!(
        report.dropped,
        vec![DroppedRecord {
            actuator: None,
            reason: DropReason::Truncated,
        }]
    );
}

#[test]
fn empty_records_do_not_claim_a_slot() {
    let mut scheduler = scheduler(1);
    let report = scheduler
        .ingest(&[0, 8, 0, 0, 8, 1, 4])
        .expect("ingest");
    assert_eq!(report.stored, 1);
    assert_eq!(report.dropped[0].reason, DropReason::Empty);
    assert_eq!(scheduler.snapshot()[0].slot_lens, [1, 0]);
}
