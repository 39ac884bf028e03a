//! Integration tests driving `ChatpadDriver` over the in-memory transport.

use std::cell::RefCell;
use std::rc::Rc;

use chatpad_keyboard::{
    ChatpadDriver, Dispatcher, DriverConfig, DriverError, Key, KeyInjector, Keymap, PlatformSink,
    RawSink, ScanCode, SinkError,
};
use chatpad_transport::protocol::{AWAKE_MESSAGE, INIT_MESSAGE};
use chatpad_transport::{MemoryFeed, MemoryTransport, RawFrame, Transport, WriteLog};

type Calls = Rc<RefCell<Vec<(Vec<ScanCode>, Vec<ScanCode>)>>>;

fn frame(modifiers: u8, key0: u8, key1: u8) -> [u8; 8] {
    RawFrame::new(modifiers, key0, key1).to_bytes()
}

/// Driver with a recording raw sink and no platform sink
fn raw_driver(config: DriverConfig) -> (ChatpadDriver<MemoryTransport>, MemoryFeed, WriteLog, Calls) {
    let transport = MemoryTransport::new(Vec::new());
    let feed = transport.feed();
    let log = transport.write_log();
    let calls: Calls = Rc::default();
    let calls_clone = calls.clone();
    let dispatcher = Dispatcher::new().with_raw(RawSink::new(
        move |pressed: &[ScanCode], released: &[ScanCode]| {
            calls_clone
                .borrow_mut()
                .push((pressed.to_vec(), released.to_vec()));
            Ok(())
        },
    ));
    (
        ChatpadDriver::new(transport, dispatcher, config),
        feed,
        log,
        calls,
    )
}

#[derive(Default, Clone)]
struct RecordingInjector {
    events: Rc<RefCell<Vec<(Key, bool)>>>,
    syncs: Rc<RefCell<usize>>,
}

impl KeyInjector for RecordingInjector {
    fn write_key(&mut self, key: Key, is_down: bool) -> Result<(), SinkError> {
        self.events.borrow_mut().push((key, is_down));
        Ok(())
    }

    fn sync(&mut self) -> Result<(), SinkError> {
        *self.syncs.borrow_mut() += 1;
        Ok(())
    }
}

#[test]
fn start_sends_init_then_awake() {
    let (mut driver, _feed, log, _calls) = raw_driver(DriverConfig::default());
    driver.start().unwrap();

    let mut expected = INIT_MESSAGE.to_vec();
    expected.extend_from_slice(&AWAKE_MESSAGE);
    assert_eq!(log.bytes(), expected);
}

#[test]
fn press_and_release_single_key() {
    let (mut driver, feed, _log, calls) = raw_driver(DriverConfig::default());
    driver.start().unwrap();

    feed.push(&frame(0, 55, 0));
    assert_eq!(driver.poll_once().unwrap(), 1);
    feed.push(&frame(0, 0, 0));
    assert_eq!(driver.poll_once().unwrap(), 1);

    assert_eq!(
        *calls.borrow(),
        vec![(vec![55], vec![]), (vec![], vec![55])]
    );
    assert!(driver.key_state().is_empty());
}

#[test]
fn repeated_frame_dispatches_once() {
    let (mut driver, feed, _log, calls) = raw_driver(DriverConfig::default());

    feed.push(&frame(0x01, 55, 0));
    feed.push(&frame(0x01, 55, 0));
    assert_eq!(driver.drain().unwrap(), 1);

    assert_eq!(*calls.borrow(), vec![(vec![55, 1], vec![])]);
    let stats = driver.stats();
    assert_eq!(stats.frames, 2);
    assert_eq!(stats.duplicates, 1);
    assert_eq!(stats.dispatches, 1);
}

#[test]
fn shift_press_with_keys_unchanged() {
    let (mut driver, feed, _log, calls) = raw_driver(DriverConfig::default());

    feed.push(&frame(0, 55, 0));
    feed.push(&frame(0x01, 55, 0));
    driver.drain().unwrap();

    assert_eq!(calls.borrow()[1], (vec![1], vec![]));
}

#[test]
fn garbage_prefix_is_skipped() {
    let (mut driver, feed, _log, calls) = raw_driver(DriverConfig::default());

    feed.push(&[0x00, 0xFF, 0xC5, 0xB4, 0x12, 0x37, 0x01]);
    feed.push(&frame(0, 70, 0));
    assert_eq!(driver.drain().unwrap(), 1);

    assert_eq!(*calls.borrow(), vec![(vec![70], vec![])]);
    assert_eq!(driver.stats().frames, 1);
    assert_eq!(driver.stats().discarded_bytes, 7);
}

#[test]
fn partial_frame_waits_for_remaining_bytes() {
    let (mut driver, feed, _log, calls) = raw_driver(DriverConfig::default());
    let bytes = frame(0, 55, 0);

    feed.push(&bytes[..5]);
    assert_eq!(driver.poll_once().unwrap(), 0);
    feed.push(&bytes[5..]);
    assert_eq!(driver.poll_once().unwrap(), 1);
    assert_eq!(calls.borrow().len(), 1);
}

#[test]
fn keepalive_after_ten_idle_polls() {
    let (mut driver, _feed, log, _calls) = raw_driver(DriverConfig::default());
    driver.start().unwrap();
    log.clear();

    for _ in 0..9 {
        driver.poll_once().unwrap();
    }
    assert_eq!(log.count(&AWAKE_MESSAGE), 0);
    assert_eq!(driver.keepalive().counter(), 9);

    driver.poll_once().unwrap();
    assert_eq!(log.count(&AWAKE_MESSAGE), 1);
    assert_eq!(driver.keepalive().counter(), 0);
    assert_eq!(driver.stats().keepalives, 2);
}

#[test]
fn stop_request_blocks_dispatch() {
    let (mut driver, feed, _log, calls) = raw_driver(DriverConfig::default());
    feed.push(&frame(0, 55, 0));

    driver.stop_handle().stop();
    assert_eq!(driver.drain().unwrap(), 0);
    assert!(calls.borrow().is_empty());
}

#[test]
fn run_returns_after_stop_and_closes_transport() {
    let (mut driver, feed, log, calls) = raw_driver(DriverConfig::default());
    feed.push(&frame(0, 55, 0));

    // Stop before entering the loop: only the startup messages go out
    driver.stop_handle().stop();
    driver.run().unwrap();

    assert!(!driver.transport().is_open());
    assert!(calls.borrow().is_empty());
    assert_eq!(log.count(&INIT_MESSAGE), 1);
}

#[test]
fn shutdown_releases_held_keys() {
    let (mut driver, feed, _log, calls) = raw_driver(DriverConfig::default());
    feed.push(&frame(0x08, 55, 66));
    driver.drain().unwrap();

    driver.shutdown().unwrap();
    assert_eq!(calls.borrow()[1], (vec![], vec![55, 66, 4]));
    assert!(!driver.transport().is_open());
}

#[test]
fn transport_failure_is_fatal() {
    let (mut driver, _feed, _log, _calls) = raw_driver(DriverConfig::default());
    driver.transport_mut().close().unwrap();
    assert!(matches!(driver.poll_once(), Err(DriverError::Transport(_))));
}

#[test]
fn injection_through_platform_sink() {
    let injector = RecordingInjector::default();
    let events = injector.events.clone();
    let syncs = injector.syncs.clone();

    let transport = MemoryTransport::new(Vec::new());
    let feed = transport.feed();
    let dispatcher =
        Dispatcher::new().with_platform(PlatformSink::injecting(Keymap::builtin(), injector));
    let mut driver = ChatpadDriver::new(transport, dispatcher, DriverConfig::default());

    feed.push(&frame(0x01, 55, 0));
    feed.push(&frame(0x00, 0, 0));
    driver.drain().unwrap();

    assert_eq!(
        *events.borrow(),
        vec![
            (Key::KEY_A, true),
            (Key::KEY_LEFTSHIFT, true),
            (Key::KEY_A, false),
            (Key::KEY_LEFTSHIFT, false),
        ]
    );
    assert_eq!(*syncs.borrow(), 2);
}

#[test]
fn unknown_scan_code_does_not_block_later_keys() {
    let injector = RecordingInjector::default();
    let events = injector.events.clone();
    let syncs = injector.syncs.clone();

    let transport = MemoryTransport::new(Vec::new());
    let feed = transport.feed();
    let dispatcher =
        Dispatcher::new().with_platform(PlatformSink::injecting(Keymap::builtin(), injector));
    let mut driver = ChatpadDriver::new(transport, dispatcher, DriverConfig::default());

    feed.push(&frame(0, 250, 0));
    feed.push(&frame(0, 55, 0));
    feed.push(&frame(0, 0, 0));
    assert_eq!(driver.drain().unwrap(), 3);

    // Only the change pressing 250 fails; A still goes down and up
    assert_eq!(driver.stats().sink_errors, 1);
    assert_eq!(
        *events.borrow(),
        vec![(Key::KEY_A, true), (Key::KEY_A, false)]
    );
    assert_eq!(*syncs.borrow(), 2);
}

#[test]
fn shutdown_closes_transport_when_release_fails() {
    let transport = MemoryTransport::new(Vec::new());
    let feed = transport.feed();
    let fail = Rc::new(RefCell::new(false));
    let fail_clone = fail.clone();
    let dispatcher = Dispatcher::new().with_raw(RawSink::new(
        move |_: &[ScanCode], _: &[ScanCode]| {
            if *fail_clone.borrow() {
                return Err(SinkError::Io(std::io::Error::new(
                    std::io::ErrorKind::BrokenPipe,
                    "stdout closed",
                )));
            }
            Ok(())
        },
    ));
    let config = DriverConfig {
        strict_keymap: true,
        ..DriverConfig::default()
    };
    let mut driver = ChatpadDriver::new(transport, dispatcher, config);

    feed.push(&frame(0, 55, 0));
    driver.drain().unwrap();

    *fail.borrow_mut() = true;
    assert!(matches!(
        driver.shutdown(),
        Err(DriverError::Sink(SinkError::Io(_)))
    ));
    assert!(!driver.transport().is_open());
}

#[test]
fn unknown_scan_code_is_fatal_when_strict() {
    let transport = MemoryTransport::new(Vec::new());
    let feed = transport.feed();
    let dispatcher = Dispatcher::new().with_platform(PlatformSink::injecting(
        Keymap::builtin(),
        RecordingInjector::default(),
    ));
    let config = DriverConfig {
        strict_keymap: true,
        ..DriverConfig::default()
    };
    let mut driver = ChatpadDriver::new(transport, dispatcher, config);

    feed.push(&frame(0, 250, 0));
    assert!(matches!(
        driver.drain(),
        Err(DriverError::Sink(SinkError::UnknownScanCode(250)))
    ));
}

#[test]
fn run_closes_transport_after_fatal_sink_error() {
    let transport = MemoryTransport::new(frame(0, 250, 0).to_vec());
    let dispatcher = Dispatcher::new().with_platform(PlatformSink::injecting(
        Keymap::builtin(),
        RecordingInjector::default(),
    ));
    let config = DriverConfig {
        strict_keymap: true,
        ..DriverConfig::default()
    };
    let mut driver = ChatpadDriver::new(transport, dispatcher, config);

    assert!(matches!(
        driver.run(),
        Err(DriverError::Sink(SinkError::UnknownScanCode(250)))
    ));
    assert!(!driver.transport().is_open());
    assert!(driver.key_state().is_empty());
}

#[test]
fn replay_decodes_capture_without_writing() {
    let mut capture = frame(0, 55, 0).to_vec();
    capture.extend_from_slice(&frame(0, 55, 66));
    let transport = MemoryTransport::new(capture);
    let log = transport.write_log();
    let calls: Calls = Rc::default();
    let calls_clone = calls.clone();
    let dispatcher = Dispatcher::new().with_raw(RawSink::new(
        move |pressed: &[ScanCode], released: &[ScanCode]| {
            calls_clone
                .borrow_mut()
                .push((pressed.to_vec(), released.to_vec()));
            Ok(())
        },
    ));
    let mut driver = ChatpadDriver::new(transport, dispatcher, DriverConfig::default());

    let stats = driver.replay().unwrap();
    assert_eq!(stats.frames, 2);
    assert_eq!(stats.keepalives, 0);
    assert!(log.bytes().is_empty());
    assert_eq!(
        *calls.borrow(),
        vec![
            (vec![55], vec![]),
            (vec![66], vec![]),
            (vec![], vec![55, 66])
        ]
    );
    assert!(!driver.transport().is_open());
}
