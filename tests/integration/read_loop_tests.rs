//! End-to-end tests: scripted telemetry through the read loop, the
//! service and the actuator port.

use std::time::Duration;

use futures_lite::future::block_on;
use tiltdrive::app::commands::AppCommand;
use tiltdrive::app::events::AppEvent;
use tiltdrive::app::service::RoverService;
use tiltdrive::config::RoverConfig;
use tiltdrive::control::drive::{Command, DriveMode};
use tiltdrive::error::{Error, TransportError};
use tiltdrive::pins::{LEFT_DIR_PIN, LEFT_POWER_PIN, RIGHT_POWER_PIN};
use tiltdrive::telemetry::channels::{CancelToken, CommandQueue};
use tiltdrive::telemetry::parser::{Axis, LabeledSample};
use tiltdrive::telemetry::read_loop::{LoopExit, LoopStats, StreamReadLoop};
use tiltdrive::telemetry::transport::{NullTransport, Transport};

use crate::mock_hw::{MockActuator, MockSink, ScriptedTransport, Step};

fn host_config() -> RoverConfig {
    let mut c = RoverConfig::default();
    c.link.idle_backoff_ms = 0;
    c
}

struct Outcome {
    result: tiltdrive::error::Result<LoopExit>,
    service: RoverService,
    actuator: MockActuator,
    sink: MockSink,
    stats: LoopStats,
}

fn run<T: Transport>(config: RoverConfig, transport: &mut T, cancel: &CancelToken, queue: &CommandQueue) -> Outcome {
    let mut service = RoverService::new(config);
    let mut actuator = MockActuator::new();
    let mut sink = MockSink::new();
    let mut read_loop = StreamReadLoop::new(&service, cancel, queue);
    let result = block_on(read_loop.run(transport, &mut service, &mut actuator, &mut sink));
    let stats = read_loop.stats();
    Outcome { result, service, actuator, sink, stats }
}

#[test]
fn pitch_forward_then_back_drives_then_stops() {
    let cancel = CancelToken::new();
    let queue = CommandQueue::new();
    let mut t = ScriptedTransport::text(&[
        "Y: 10\tX: 10\t",
        "X: 31\t", // baseline yaw 10, pitch 10
        "Y: 65\t", // pitch +55, nothing until a yaw sample
        "X: 31\t", // heading held, pitch in band
        "Y: 10\t", // pitch back
    ])
    .cancelling(&cancel);

    let out = run(host_config(), &mut t, &cancel, &queue);

    assert_eq!(out.result, Ok(LoopExit::Cancelled));
    assert_eq!(out.sink.commands(), [Command::DriveForward, Command::Stop]);
    assert_eq!(out.actuator.power(LEFT_POWER_PIN), Some(0));
    assert_eq!(out.actuator.power(RIGHT_POWER_PIN), Some(0));
    assert_eq!(out.service.drive_mode(), DriveMode::Forward);
}

#[test]
fn field_split_across_reads_is_parsed_once() {
    let cancel = CancelToken::new();
    let queue = CommandQueue::new();
    let mut t = ScriptedTransport::text(&["Y: 1", "2\tX: 4", "0.5\n"]).cancelling(&cancel);

    let out = run(host_config(), &mut t, &cancel, &queue);

    let o = out.service.orientation();
    assert_eq!(o.y.current, 12.0);
    assert_eq!(o.x.current, 40.5);
    assert_eq!(out.service.stats().samples, 2);
}

#[test]
fn legacy_parsing_drops_split_fields() {
    let cancel = CancelToken::new();
    let queue = CommandQueue::new();
    let mut cfg = host_config();
    cfg.parser.carry_partial_fields = false;
    let mut t = ScriptedTransport::text(&["Y: 1", "2\tX: 4", "0.5\n"]).cancelling(&cancel);

    let out = run(cfg, &mut t, &cancel, &queue);

    assert_eq!(out.service.stats().samples, 0);
}

#[test]
fn zero_reading_leaves_committed_angle() {
    let cancel = CancelToken::new();
    let queue = CommandQueue::new();
    let mut t = ScriptedTransport::text(&["X: 15\t", "X: 0\t", "X: 0.0\n"]).cancelling(&cancel);

    let out = run(host_config(), &mut t, &cancel, &queue);

    assert_eq!(out.service.orientation().x.current, 15.0);
    assert_eq!(out.service.stats().samples, 1);
}

#[test]
fn malformed_fields_are_skipped_silently() {
    let cancel = CancelToken::new();
    let queue = CommandQueue::new();
    let mut t = ScriptedTransport::new([
        Step::Data(b"garbage\tX: nope\t\xfe\xff\t".to_vec()),
        Step::Idle,
        Step::Data(b"Y: 12\t".to_vec()),
    ])
    .cancelling(&cancel);

    let out = run(host_config(), &mut t, &cancel, &queue);

    assert_eq!(out.result, Ok(LoopExit::Cancelled));
    assert_eq!(out.service.orientation().y.current, 12.0);
    assert_eq!(out.sink.count(|e| matches!(e, AppEvent::TransportFault(_))), 0);
}

#[test]
fn cancel_mid_read_is_clean_and_caller_closes_once() {
    let cancel = CancelToken::new();
    let queue = CommandQueue::new();
    let mut t = ScriptedTransport::text(&["X: 10\t"]).cancelling(&cancel);

    let out = run(host_config(), &mut t, &cancel, &queue);

    assert_eq!(out.result, Ok(LoopExit::Cancelled));
    assert_eq!(t.closes, 0, "the loop never closes the transport");
    t.close();
    assert_eq!(t.closes, 1);
    assert_eq!(out.sink.count(|e| matches!(e, AppEvent::TransportFault(_))), 0);
    assert_eq!(out.sink.events.last(), Some(&AppEvent::Stopped));
}

#[test]
fn cancel_before_start_issues_no_read() {
    let cancel = CancelToken::new();
    let queue = CommandQueue::new();
    cancel.cancel();
    let mut t = ScriptedTransport::text(&["X: 10\t"]);

    let out = run(host_config(), &mut t, &cancel, &queue);

    assert_eq!(out.result, Ok(LoopExit::Cancelled));
    assert_eq!(t.reads, 0);
}

#[test]
fn transport_fault_is_reported_and_returned() {
    let cancel = CancelToken::new();
    let queue = CommandQueue::new();
    let timeout = TransportError::Io(std::io::ErrorKind::TimedOut);
    let mut t = ScriptedTransport::new([
        Step::Data(b"X: 10\t".to_vec()),
        Step::Fail(timeout),
        Step::Data(b"X: 99\t".to_vec()),
    ]);

    let out = run(host_config(), &mut t, &cancel, &queue);

    assert_eq!(out.result, Err(Error::Transport(timeout)));
    assert_eq!(t.reads, 2, "no read after the fault");
    assert_eq!(out.sink.count(|e| *e == AppEvent::TransportFault(timeout)), 1);
    assert_eq!(out.service.orientation().x.current, 10.0);
}

#[test]
fn end_of_stream_is_a_fault() {
    let cancel = CancelToken::new();
    let queue = CommandQueue::new();
    let mut t = ScriptedTransport::text(&["X: 10\t"]);

    let out = run(host_config(), &mut t, &cancel, &queue);

    assert_eq!(out.result, Err(Error::Transport(TransportError::Closed)));
}

#[test]
fn queued_commands_apply_between_reads() {
    let cancel = CancelToken::new();
    let queue = CommandQueue::new();
    let mut t = ScriptedTransport::new([
        Step::Data(b"Y: 10\tX: 10\tX: 31\t".to_vec()),
        Step::Submit(AppCommand::Recalibrate),
        Step::Data(b"X: 40\t".to_vec()),
        Step::Submit(AppCommand::Stop),
    ])
    .with_queue(&queue)
    .cancelling(&cancel);

    let out = run(host_config(), &mut t, &cancel, &queue);

    assert_eq!(out.sink.count(|e| *e == AppEvent::Recalibrated), 1);
    // recalibrated at X=31, so X=40 is only 9 degrees of movement
    assert!(!out.service.is_calibrated());
    assert_eq!(out.service.last_command(), Some(Command::Stop));
    assert!(queue.is_empty());
}

#[test]
fn config_update_reaches_parser() {
    let cancel = CancelToken::new();
    let queue = CommandQueue::new();
    let mut legacy = host_config();
    legacy.parser.carry_partial_fields = false;
    let mut t = ScriptedTransport::new([
        Step::Submit(AppCommand::UpdateConfig(legacy)),
        Step::Data(b"Y: 1".to_vec()),
        Step::Data(b"2\n".to_vec()),
    ])
    .with_queue(&queue)
    .cancelling(&cancel);

    let out = run(host_config(), &mut t, &cancel, &queue);

    assert_eq!(out.sink.count(|e| *e == AppEvent::ConfigUpdated), 1);
    assert!(!out.service.config().parser.carry_partial_fields);
    assert_eq!(out.service.stats().samples, 0);
}

#[test]
fn reverse_sets_direction_pins_high() {
    let cancel = CancelToken::new();
    let queue = CommandQueue::new();
    let mut t = ScriptedTransport::text(&["Y: 10\tX: 10\tX: 31\t", "Y: 100\tX: 31\t"]).cancelling(&cancel);

    let out = run(host_config(), &mut t, &cancel, &queue);

    assert_eq!(out.sink.commands(), [Command::Reverse]);
    assert_eq!(out.service.drive_mode(), DriveMode::Reversing);
    assert_eq!(
        out.actuator.level(LEFT_DIR_PIN),
        Some(embedded_hal::digital::PinState::High)
    );
}

#[test]
fn status_carries_read_text_and_parsed_values() {
    let cancel = CancelToken::new();
    let queue = CommandQueue::new();
    let mut t = ScriptedTransport::new([
        Step::Data(b"X: 10\tY: 2".to_vec()),
        Step::Data(b"5\n".to_vec()),
        Step::Data(b"Z: \xff\n".to_vec()),
    ])
    .cancelling(&cancel);

    let out = run(host_config(), &mut t, &cancel, &queue);

    let frames: Vec<_> = out
        .sink
        .events
        .iter()
        .filter(|e| matches!(e, AppEvent::FrameReceived { .. }))
        .cloned()
        .collect();
    assert_eq!(
        frames,
        [
            AppEvent::frame_received(b"X: 10\tY: 2"),
            AppEvent::frame_received(b"5\n"),
            AppEvent::frame_received(b"Z: \xff\n"),
        ]
    );
    let AppEvent::FrameReceived { bytes, text } = &frames[0] else {
        unreachable!()
    };
    assert_eq!((*bytes, text.as_str()), (11, "X: 10\tY: 2"));

    let samples: Vec<_> = out
        .sink
        .events
        .iter()
        .filter_map(|e| match e {
            AppEvent::SampleParsed(s) => Some(*s),
            _ => None,
        })
        .collect();
    assert_eq!(
        samples,
        [
            LabeledSample { axis: Axis::X, value: 10.0 },
            LabeledSample { axis: Axis::Y, value: 25.0 },
        ]
    );
}

#[test]
fn command_interrupts_a_silent_read() {
    let cancel = CancelToken::new();
    let queue = CommandQueue::new();
    let mut t = ScriptedTransport::new([
        Step::Data(b"Y: 10\tX: 10\tX: 31\t".to_vec()),
        Step::Data(b"Y: 65\tX: 31\t".to_vec()),
        Step::SubmitAndWait(AppCommand::Stop),
    ])
    .with_queue(&queue)
    .cancelling(&cancel);

    let out = run(host_config(), &mut t, &cancel, &queue);

    assert_eq!(out.result, Ok(LoopExit::Cancelled));
    assert_eq!(out.sink.commands(), [Command::DriveForward, Command::Stop]);
    assert_eq!(out.actuator.power(LEFT_POWER_PIN), Some(0));
    assert_eq!(out.actuator.power(RIGHT_POWER_PIN), Some(0));
    assert_eq!(out.stats.interrupted_reads, 1);
    assert!(queue.is_empty());
}

#[test]
fn null_transport_idles_until_cancelled() {
    let cancel = CancelToken::new();
    let queue = CommandQueue::new();
    let mut t = NullTransport::new();

    let out = std::thread::scope(|s| {
        s.spawn(|| {
            std::thread::sleep(Duration::from_millis(20));
            cancel.cancel();
        });
        run(host_config(), &mut t, &cancel, &queue)
    });

    assert_eq!(out.result, Ok(LoopExit::Cancelled));
    assert!(out.stats.idle_reads > 0);
    assert_eq!(out.stats.bytes, 0);
    assert!(out.sink.commands().is_empty());
    assert!(!t.is_closed(), "the loop leaves closing to the caller");
}
