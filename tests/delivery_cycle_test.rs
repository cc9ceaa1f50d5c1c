//! 撮影・送信1周期のテスト
//!
//! Mock のカメラ・送信経路・LED・時計を使い、撮影失敗・送信失敗・
//! 再接続を含む各経路でバッファが必ず1回返却されることを確認します。

use std::time::Duration;

use meter_cam_publisher::core::{
    BrokerCredentials, ConnectionManager, CycleOutcome, DeliveryOrchestrator,
};
use meter_cam_publisher::mock::{
    mock_jpeg_frame, ConnectBehavior, ManualClock, MockCamera, MockEvent, MockJournal, MockLed, MockTransport,
    SequenceRandom,
};

const TOPIC: &str = "home/meter/electric/image";

struct Rig {
    journal: MockJournal,
    camera: MockCamera,
    transport: MockTransport,
    led: MockLed,
    clock: ManualClock,
    connection: ConnectionManager<ManualClock, SequenceRandom>,
    orchestrator: DeliveryOrchestrator,
}

impl Rig {
    fn new(connected: bool) -> Self {
        let journal = MockJournal::new();
        let transport = if connected {
            MockTransport::connected(&journal)
        } else {
            MockTransport::new(&journal)
        };
        let clock = ManualClock::new(&journal);
        let connection = ConnectionManager::new(
            clock.clone(),
            SequenceRandom::new(&[0x1a2b, 0x3c4d, 0x5e6f]),
            "ESP32CAM-Electric-",
            BrokerCredentials {
                username: Some("meter".to_string()),
                password: None,
            },
            Duration::from_secs(5),
        );
        Self {
            camera: MockCamera::new(&journal),
            led: MockLed::new(&journal),
            transport,
            clock,
            connection,
            orchestrator: DeliveryOrchestrator::new(TOPIC),
            journal,
        }
    }

    fn run_cycle(&mut self) -> CycleOutcome {
        self.orchestrator.capture_and_send(
            &mut self.camera,
            &mut self.transport,
            &mut self.connection,
            &mut self.led,
        )
    }
}

#[test]
fn test_successful_cycle_publishes_and_releases() {
    let mut rig = Rig::new(true);
    let frame = mock_jpeg_frame(2048);
    rig.camera.queue_frame(frame.clone());

    let outcome = rig.run_cycle();

    assert_eq!(outcome, CycleOutcome::Published { bytes: 2048 });
    assert_eq!(rig.transport.published(), vec![(TOPIC.to_string(), frame)]);
    assert_eq!(rig.camera.acquired(), 1);
    assert_eq!(rig.camera.released(), 1);
    assert!(!rig.led.is_lit());

    assert_eq!(
        rig.journal.events(),
        vec![
            MockEvent::LedOn,
            MockEvent::Acquire { bytes: 2048 },
            MockEvent::Publish {
                topic: TOPIC.to_string(),
                bytes: 2048
            },
            MockEvent::Release { bytes: 2048 },
            MockEvent::LedOff,
        ]
    );
}

#[test]
fn test_capture_failure_skips_publish_and_release() {
    let mut rig = Rig::new(true);
    rig.camera.queue_failure();

    let outcome = rig.run_cycle();

    assert_eq!(outcome, CycleOutcome::CaptureFailed);
    assert!(rig.transport.published().is_empty());
    assert_eq!(rig.camera.released(), 0);
    assert!(!rig.led.is_lit());
    assert_eq!(
        rig.journal.events(),
        vec![MockEvent::LedOn, MockEvent::AcquireFailed, MockEvent::LedOff]
    );
}

#[test]
fn test_capture_failure_is_not_retried_within_cycle() {
    let mut rig = Rig::new(true);
    rig.camera.queue_failure();
    rig.camera.queue_frame(mock_jpeg_frame(64));

    assert_eq!(rig.run_cycle(), CycleOutcome::CaptureFailed);
    assert_eq!(rig.journal.count(|e| matches!(e, MockEvent::AcquireFailed)), 1);
    assert_eq!(rig.camera.acquired(), 0);

    // 次の周期で取り直す
    assert_eq!(rig.run_cycle(), CycleOutcome::Published { bytes: 64 });
}

#[test]
fn test_publish_failure_still_releases_buffer_and_clears_led() {
    let mut rig = Rig::new(true);
    rig.transport.queue_publish_result(false);

    let outcome = rig.run_cycle();

    assert_eq!(outcome, CycleOutcome::PublishFailed { bytes: 1024 });
    assert_eq!(rig.camera.acquired(), 1);
    assert_eq!(rig.camera.released(), 1);
    assert_eq!(rig.camera.outstanding(), 0);
    assert!(!rig.led.is_lit());
    // 送信の再試行はしない
    assert_eq!(
        rig.journal.count(|e| matches!(e, MockEvent::PublishFailed { .. })),
        1
    );
    assert!(rig.clock.sleeps().is_empty());
}

#[test]
fn test_disconnected_transport_is_reconnected_before_publish() {
    let mut rig = Rig::new(false);
    rig.transport.queue_connect_results(&[false, false, true]);

    let outcome = rig.run_cycle();

    assert_eq!(outcome, CycleOutcome::Published { bytes: 1024 });
    assert_eq!(rig.clock.sleeps(), vec![Duration::from_secs(5); 2]);
    assert_eq!(rig.transport.publish_while_disconnected(), 0);

    let events = rig.journal.events();
    let connect_at = events
        .iter()
        .position(|e| matches!(e, MockEvent::Connect { .. }))
        .unwrap();
    let publish_at = events
        .iter()
        .position(|e| matches!(e, MockEvent::Publish { .. }))
        .unwrap();
    let release_at = events
        .iter()
        .position(|e| matches!(e, MockEvent::Release { .. }))
        .unwrap();
    assert!(connect_at < publish_at);
    assert!(publish_at < release_at);
}

#[test]
fn test_connect_that_drops_immediately_never_leads_to_publish_while_disconnected() {
    let mut rig = Rig::new(false);
    rig.transport
        .queue_connect_behaviors(&[ConnectBehavior::AcceptThenDrop; 3]);

    let outcome = rig.run_cycle();

    assert_eq!(outcome, CycleOutcome::Published { bytes: 1024 });
    assert_eq!(rig.transport.publish_while_disconnected(), 0);
    assert_eq!(rig.clock.sleeps(), vec![Duration::from_secs(5); 3]);
    assert_eq!(rig.journal.count(|e| matches!(e, MockEvent::Connect { .. })), 4);
    assert_eq!(rig.camera.released(), 1);
}

#[test]
fn test_empty_frame_is_released_without_publish() {
    let mut rig = Rig::new(true);
    rig.camera.queue_frame(Vec::new());

    let outcome = rig.run_cycle();

    assert_eq!(outcome, CycleOutcome::CaptureFailed);
    assert!(rig.transport.published().is_empty());
    assert_eq!(rig.camera.acquired(), 1);
    assert_eq!(rig.camera.released(), 1);
    assert!(!rig.led.is_lit());
}

#[test]
fn test_led_failure_does_not_abort_cycle() {
    let mut rig = Rig::new(true);
    rig.led.set_failure(true);

    let outcome = rig.run_cycle();

    assert!(outcome.is_published());
    assert_eq!(rig.camera.released(), 1);
}

#[test]
fn test_cycles_never_overlap_buffers() {
    let mut rig = Rig::new(true);
    rig.transport.queue_publish_result(false);
    rig.camera.queue_failure();

    for _ in 0..5 {
        rig.run_cycle();
    }

    assert_eq!(rig.camera.max_outstanding(), 1);
    assert_eq!(rig.camera.outstanding(), 0);
    assert_eq!(rig.camera.acquired(), rig.camera.released());
}
