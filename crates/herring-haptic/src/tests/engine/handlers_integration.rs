use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use herring_haptic_core::record::{SampleRecord, encode_records};
use herring_runtime::thread_actor::{ActorRef, spawn_actor_named};
use tokio::sync::broadcast::Receiver;
use tokio::sync::broadcast::error::TryRecvError;

use crate::command::{Command, CommandReply, TSPDRV_MAGIC_NUMBER};
use crate::config::engine::{DropReason, HapticConfig, HapticEvent, SessionId, StopReason};
use crate::engine::actor::ControlActor;
use crate::engine::messages::{
    CommandMessage, GetSnapshotMessage, OpenSessionMessage, ReadDeviceNameMessage,
    ReleaseSessionMessage, ResumeMessage, ShutdownMessage, StepMessage, SuspendMessage,
    TickMessage, WriteMessage,
};
use crate::error::HapticError;
use crate::infra::event_hub::EventHub;
use crate::testing::{RecordingSink, SinkCall};

const TEST_TIMEOUT: Duration = Duration::from_millis(500);

/// Ticks are driven by hand through `StepMessage`; the live timer is parked
/// far in the future.
fn test_config() -> HapticConfig {
    HapticConfig {
        num_actuators: 2,
        tick_period_ms: 60_000,
        watchdog_ticks: 2,
        command_timeout_ms: TEST_TIMEOUT.as_millis() as u64,
        ..HapticConfig::default()
    }
}

struct Harness {
    actor_ref: ActorRef<ControlActor>,
    join: JoinHandle<()>,
    sink: RecordingSink,
    events: Receiver<HapticEvent>,
}

fn spawn_control_actor(config: HapticConfig) -> Harness {
    let sink = RecordingSink::default();
    let hub = Arc::new(EventHub::new(config.event_capacity));
    let events = hub.subscribe();
    let actor = ControlActor::new(Box::new(sink.clone()), hub, config);
    let (actor_ref, join) = spawn_actor_named(actor, "herring-haptic-control-test")
        .expect("failed to spawn control actor");
    Harness {
        actor_ref,
        join,
        sink,
        events,
    }
}

fn shutdown_and_join(harness: Harness) {
    harness
        .actor_ref
        .call(ShutdownMessage, TEST_TIMEOUT)
        .expect("failed to call shutdown");
    drop(harness.actor_ref);
    harness.join.join().expect("failed to join control actor thread");
}

fn drain_events(events: &mut Receiver<HapticEvent>) -> Vec<HapticEvent> {
    let mut out = Vec::new();
    loop {
        match events.try_recv() {
            Ok(event) => out.push(event),
            Err(TryRecvError::Lagged(_)) => continue,
            Err(_) => return out,
        }
    }
}

fn open_session(actor_ref: &ActorRef<ControlActor>) -> SessionId {
    actor_ref
        .call(OpenSessionMessage, TEST_TIMEOUT)
        .expect("failed to open session")
}

fn command(
    actor_ref: &ActorRef<ControlActor>,
    session: SessionId,
    command: Command,
) -> Result<CommandReply, HapticError> {
    actor_ref
        .call(CommandMessage { session, command }, TEST_TIMEOUT)
        .expect("failed to call command")
}

fn authorized_session(actor_ref: &ActorRef<ControlActor>) -> SessionId {
    let session = open_session(actor_ref);
    let reply = command(
        actor_ref,
        session,
        Command::IdentifyCaller {
            magic: TSPDRV_MAGIC_NUMBER,
        },
    )
    .expect("identify");
    assert_eq!(reply, CommandReply::Done);
    session
}

fn write(
    actor_ref: &ActorRef<ControlActor>,
    session: SessionId,
    records: &[(u8, &[i8])],
) -> Result<usize, HapticError> {
    let records: Vec<SampleRecord> = records
        .iter()
        .map(|(actuator, samples)| SampleRecord::new(*actuator, samples.to_vec()))
        .collect();
    let bytes = encode_records(&records).expect("encode records");
    actor_ref
        .call(WriteMessage { session, bytes }, TEST_TIMEOUT)
        .expect("failed to call write")
}

fn step(actor_ref: &ActorRef<ControlActor>, times: usize) {
    for _ in 0..times {
        actor_ref.call(StepMessage, TEST_TIMEOUT).expect("failed to step");
    }
}

#[test]
fn write_before_identify_is_rejected() {
    let mut harness = spawn_control_actor(test_config());
    let session = open_session(&harness.actor_ref);

    let err = write(&harness.actor_ref, session, &[(0, &[1, 2])]).expect_err("not identified");
    assert!(matches!(err, HapticError::Unauthorized { .. }));
    assert_eq!(
        drain_events(&mut harness.events),
        vec![HapticEvent::UnauthorizedWrite { session }]
    );

    let snapshot = harness
        .actor_ref
        .call(GetSnapshotMessage, TEST_TIMEOUT)
        .expect("snapshot");
    assert!(!snapshot.is_playing);
    assert_eq!(snapshot.actuators[0].slot_lens, [0, 0]);
    shutdown_and_join(harness);
}

#[test]
fn identify_authorizes_only_the_calling_session() {
    let harness = spawn_control_actor(test_config());
    let trusted = authorized_session(&harness.actor_ref);
    let other = open_session(&harness.actor_ref);

    let reply = command(&harness.actor_ref, other, Command::IdentifyCaller { magic: 0xdead })
        .expect("identify with wrong magic");
    assert_eq!(reply, CommandReply::Ignored);

    assert!(write(&harness.actor_ref, other, &[(0, &[1])]).is_err());
    assert_eq!(write(&harness.actor_ref, trusted, &[(0, &[1])]).expect("write"), 4);

    let snapshot = harness
        .actor_ref
        .call(GetSnapshotMessage, TEST_TIMEOUT)
        .expect("snapshot");
    assert_eq!(snapshot.open_sessions, 2);
    assert_eq!(snapshot.authorized_sessions, 1);
    shutdown_and_join(harness);
}

#[test]
fn write_starts_playback_and_ticks_drain_samples() {
    let mut harness = spawn_control_actor(test_config());
    let session = authorized_session(&harness.actor_ref);
    drain_events(&mut harness.events);

    write(&harness.actor_ref, session, &[(0, &[10, 20]), (1, &[-5])]).expect("write");
    assert_eq!(
        drain_events(&mut harness.events),
        vec![HapticEvent::PlaybackStarted]
    );

    step(&harness.actor_ref, 2);
    assert_eq!(harness.sink.samples(), vec![(0, 10), (1, -5), (0, 20)]);
    shutdown_and_join(harness);
}

#[test]
fn stop_timer_command_finishes_the_active_slot_first() {
    let mut harness = spawn_control_actor(test_config());
    let session = authorized_session(&harness.actor_ref);
    write(&harness.actor_ref, session, &[(0, &[1, 2, 3]), (0, &[4, 5])]).expect("write");
    step(&harness.actor_ref, 1);
    drain_events(&mut harness.events);

    command(&harness.actor_ref, session, Command::StopKernelTimer).expect("stop");
    step(&harness.actor_ref, 1);
    let snapshot = harness
        .actor_ref
        .call(GetSnapshotMessage, TEST_TIMEOUT)
        .expect("snapshot");
    assert!(snapshot.is_playing);
    assert!(snapshot.stop_requested);

    step(&harness.actor_ref, 1);
    assert_eq!(
        drain_events(&mut harness.events),
        vec![HapticEvent::PlaybackStopped {
            reason: StopReason::Graceful,
        }]
    );
    assert_eq!(harness.sink.samples(), vec![(0, 1), (0, 2), (0, 3)]);
    shutdown_and_join(harness);
}

#[test]
fn idle_timer_is_stopped_by_the_watchdog() {
    let mut harness = spawn_control_actor(test_config());
    let session = authorized_session(&harness.actor_ref);
    write(&harness.actor_ref, session, &[(0, &[9])]).expect("write");
    drain_events(&mut harness.events);

    step(&harness.actor_ref, 4);
    assert_eq!(
        drain_events(&mut harness.events),
        vec![HapticEvent::PlaybackStopped {
            reason: StopReason::Watchdog,
        }]
    );
    assert!(harness.sink.calls().contains(&SinkCall::AmpDisable(1)));
    shutdown_and_join(harness);
}

#[test]
fn releasing_a_session_stops_playback_immediately() {
    let mut harness = spawn_control_actor(test_config());
    let session = authorized_session(&harness.actor_ref);
    write(&harness.actor_ref, session, &[(1, &[7, 7, 7])]).expect("write");
    step(&harness.actor_ref, 1);
    harness.sink.clear();
    drain_events(&mut harness.events);

    harness
        .actor_ref
        .call(ReleaseSessionMessage { session }, TEST_TIMEOUT)
        .expect("release");
    assert_eq!(
        drain_events(&mut harness.events),
        vec![HapticEvent::PlaybackStopped {
            reason: StopReason::Released,
        }]
    );
    assert_eq!(
        harness.sink.calls(),
        vec![
            SinkCall::Sample {
                actuator: 1,
                bit_depth: 8,
                sample: 0,
            },
            SinkCall::AmpDisable(1),
        ]
    );

    let err = write(&harness.actor_ref, session, &[(0, &[1])]).expect_err("session is gone");
    assert!(matches!(err, HapticError::UnknownSession { .. }));
    shutdown_and_join(harness);
}

#[test]
fn full_slots_reject_the_write() {
    let mut harness = spawn_control_actor(test_config());
    let session = authorized_session(&harness.actor_ref);
    write(&harness.actor_ref, session, &[(0, &[1]), (0, &[2])]).expect("fill both slots");
    drain_events(&mut harness.events);

    let err = write(&harness.actor_ref, session, &[(0, &[3])]).expect_err("no free slot");
    assert!(matches!(err, HapticError::NoFreeSlot { actuator: 0 }));
    assert!(matches!(
        drain_events(&mut harness.events).as_slice(),
        [HapticEvent::WriteRejected { .. }]
    ));
    shutdown_and_join(harness);
}

#[test]
fn record_for_unknown_actuator_is_reported() {
    let mut harness = spawn_control_actor(test_config());
    let session = authorized_session(&harness.actor_ref);
    drain_events(&mut harness.events);

    write(&harness.actor_ref, session, &[(9, &[1]), (0, &[2])]).expect("write");
    let events = drain_events(&mut harness.events);
    assert!(events.contains(&HapticEvent::RecordDropped {
        actuator: Some(9),
        reason: DropReason::InvalidActuator,
    }));
    assert!(events.contains(&HapticEvent::PlaybackStarted));
    shutdown_and_join(harness);
}

#[test]
fn suspend_is_refused_while_playing() {
    let harness = spawn_control_actor(test_config());
    let session = authorized_session(&harness.actor_ref);
    write(&harness.actor_ref, session, &[(0, &[1, 2])]).expect("write");

    let result = harness
        .actor_ref
        .call(SuspendMessage, TEST_TIMEOUT)
        .expect("call suspend");
    assert!(matches!(result, Err(HapticError::Busy)));

    harness
        .actor_ref
        .call(ReleaseSessionMessage { session }, TEST_TIMEOUT)
        .expect("release");
    harness
        .actor_ref
        .call(SuspendMessage, TEST_TIMEOUT)
        .expect("call suspend")
        .expect("suspend when idle");
    let snapshot = harness
        .actor_ref
        .call(GetSnapshotMessage, TEST_TIMEOUT)
        .expect("snapshot");
    assert!(snapshot.suspended);

    harness
        .actor_ref
        .call(ResumeMessage, TEST_TIMEOUT)
        .expect("resume");
    let snapshot = harness
        .actor_ref
        .call(GetSnapshotMessage, TEST_TIMEOUT)
        .expect("snapshot");
    assert!(!snapshot.suspended);
    shutdown_and_join(harness);
}

#[test]
fn amp_commands_reach_the_sink_and_check_the_index() {
    let harness = spawn_control_actor(test_config());
    let session = open_session(&harness.actor_ref);

    assert_eq!(
        command(&harness.actor_ref, session, Command::GetNumActuators).expect("count"),
        CommandReply::NumActuators(2)
    );
    command(&harness.actor_ref, session, Command::EnableAmp { actuator: 1 }).expect("enable");
    command(&harness.actor_ref, session, Command::DisableAmp { actuator: 0 }).expect("disable");
    assert_eq!(
        harness.sink.calls(),
        vec![SinkCall::AmpEnable(1), SinkCall::AmpDisable(0)]
    );

    let err = command(&harness.actor_ref, session, Command::EnableAmp { actuator: 2 })
        .expect_err("out of range");
    assert!(matches!(
        err,
        HapticError::InvalidActuator {
            actuator: 2,
            num_actuators: 2,
        }
    ));
    shutdown_and_join(harness);
}

#[test]
fn device_name_read_walks_the_text() {
    let harness = spawn_control_actor(test_config());
    let name = harness
        .actor_ref
        .call(
            ReadDeviceNameMessage {
                offset: 0,
                max: 4096,
            },
            TEST_TIMEOUT,
        )
        .expect("read");
    assert_eq!(
        String::from_utf8(name).expect("utf8"),
        "TestActuator0 v3.3.13.0\nTestActuator1 v3.3.13.0\n"
    );

    let tail = harness
        .actor_ref
        .call(
            ReadDeviceNameMessage {
                offset: 4096,
                max: 16,
            },
            TEST_TIMEOUT,
        )
        .expect("read past end");
    assert!(tail.is_empty());
    shutdown_and_join(harness);
}

#[test]
fn stale_tick_generation_is_ignored() {
    let harness = spawn_control_actor(test_config());
    let session = authorized_session(&harness.actor_ref);
    write(&harness.actor_ref, session, &[(0, &[1, 2])]).expect("write");

    harness
        .actor_ref
        .cast(TickMessage { generation: 0 })
        .expect("cast stale tick");
    let snapshot = harness
        .actor_ref
        .call(GetSnapshotMessage, TEST_TIMEOUT)
        .expect("snapshot");
    assert_eq!(snapshot.actuators[0].remaining, 2);
    assert!(harness.sink.samples().is_empty());
    shutdown_and_join(harness);
}

#[test]
fn shutdown_silences_actuators_and_closes_the_mailbox() {
    let mut harness = spawn_control_actor(test_config());
    let session = authorized_session(&harness.actor_ref);
    write(&harness.actor_ref, session, &[(0, &[1, 2])]).expect("write");
    drain_events(&mut harness.events);

    let actor_ref = harness.actor_ref.clone();
    let sink = harness.sink.clone();
    let mut events = harness.events.resubscribe();
    shutdown_and_join(harness);

    assert!(sink.calls().contains(&SinkCall::AmpDisable(0)));
    assert_eq!(
        drain_events(&mut events),
        vec![HapticEvent::PlaybackStopped {
            reason: StopReason::Shutdown,
        }]
    );
    assert!(actor_ref.call(GetSnapshotMessage, TEST_TIMEOUT).is_err());
}

#[test]
fn live_timer_plays_a_pattern_to_completion() {
    let config = HapticConfig {
        num_actuators: 1,
        tick_period_ms: 1,
        watchdog_ticks: 3,
        command_timeout_ms: TEST_TIMEOUT.as_millis() as u64,
        ..HapticConfig::default()
    };
    let sink = RecordingSink::default();
    let handle = crate::start_haptics_with_config(Box::new(sink.clone()), config)
        .expect("start haptics");

    herring_runtime::block_on(async {
        let mut events = handle.subscribe_events();
        let session = handle.open_session().await.expect("open session");
        session
            .identify(TSPDRV_MAGIC_NUMBER)
            .await
            .expect("identify");
        let bytes = encode_records(&[SampleRecord::new(0, vec![3, 2, 1])]).expect("encode");
        assert_eq!(session.write(&bytes).await.expect("write"), bytes.len());

        let stopped = tokio::time::timeout(Duration::from_secs(2), async {
            loop {
                match events.recv().await {
                    Ok(HapticEvent::PlaybackStopped { reason }) => return reason,
                    Ok(_) => continue,
                    Err(error) => panic!("event stream failed: {error}"),
                }
            }
        })
        .await
        .expect("playback should stop on its own");
        assert_eq!(stopped, StopReason::Watchdog);

        session.release().await.expect("release");
        handle.shutdown().await.expect("shutdown");
    });

    assert_eq!(&sink.samples()[..3], &[(0, 3), (0, 2), (0, 1)]);
}
