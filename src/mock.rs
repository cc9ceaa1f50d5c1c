//! テスト用のモック実装
//!
//! 実機のカメラ・MQTT・LED・タイマーを使わずに制御フローを検証します。
//! すべてのモックは `Clone` で状態を共有し、呼び出しを共通の `MockJournal` に記録します。

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::communication::transport::{Transport, TransportError};
use crate::core::clock::{Clock, RandomSource};
use crate::core::config::{AppConfig, BrokerCredentials};
use crate::core::config_validation::FrameSize;
use crate::hardware::camera::{CaptureBuffer, CaptureError, FrameSource};
use crate::hardware::led::{LedError, StatusIndicator};

/// モックが記録するイベント
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockEvent {
    Acquire { bytes: usize },
    AcquireFailed,
    Release { bytes: usize },
    Connect { client_id: String },
    ConnectFailed { client_id: String },
    Publish { topic: String, bytes: usize },
    PublishFailed { topic: String },
    Service,
    LedOn,
    LedOff,
    Sleep(Duration),
}

/// モック間で共有する呼び出し記録
#[derive(Debug, Clone, Default)]
pub struct MockJournal {
    events: Arc<Mutex<Vec<MockEvent>>>,
}

impl MockJournal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, event: MockEvent) {
        self.events.lock().unwrap().push(event);
    }

    pub fn events(&self) -> Vec<MockEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.events.lock().unwrap().clear();
    }

    /// 条件に合うイベントの数
    pub fn count(&self, predicate: impl Fn(&MockEvent) -> bool) -> usize {
        self.events.lock().unwrap().iter().filter(|e| predicate(*e)).count()
    }
}

/// テスト用の最小JPEG風フレーム
pub fn mock_jpeg_frame(len: usize) -> Vec<u8> {
    let len = len.max(4);
    let mut frame = vec![0x42; len];
    frame[..2].copy_from_slice(&[0xFF, 0xD8]);
    frame[len - 2..].copy_from_slice(&[0xFF, 0xD9]);
    frame
}

/// カメラのモック
///
/// キューが空のときは既定フレームを返す。`queue_failure` で撮影失敗を注入できる。
#[derive(Debug, Clone)]
pub struct MockCamera {
    journal: MockJournal,
    results: Arc<Mutex<VecDeque<Option<Vec<u8>>>>>,
    outstanding: Arc<Mutex<usize>>,
    max_outstanding: Arc<Mutex<usize>>,
    acquired: Arc<Mutex<usize>>,
    released: Arc<Mutex<usize>>,
}

impl MockCamera {
    pub fn new(journal: &MockJournal) -> Self {
        Self {
            journal: journal.clone(),
            results: Arc::new(Mutex::new(VecDeque::new())),
            outstanding: Arc::new(Mutex::new(0)),
            max_outstanding: Arc::new(Mutex::new(0)),
            acquired: Arc::new(Mutex::new(0)),
            released: Arc::new(Mutex::new(0)),
        }
    }

    pub fn queue_frame(&self, frame: Vec<u8>) {
        self.results.lock().unwrap().push_back(Some(frame));
    }

    pub fn queue_failure(&self) {
        self.results.lock().unwrap().push_back(None);
    }

    /// 成功した撮影の回数
    pub fn acquired(&self) -> usize {
        *self.acquired.lock().unwrap()
    }

    pub fn released(&self) -> usize {
        *self.released.lock().unwrap()
    }

    /// 未返却バッファ数の最大値
    pub fn max_outstanding(&self) -> usize {
        *self.max_outstanding.lock().unwrap()
    }

    pub fn outstanding(&self) -> usize {
        *self.outstanding.lock().unwrap()
    }
}

impl FrameSource for MockCamera {
    fn acquire(&mut self) -> Result<CaptureBuffer, CaptureError> {
        if *self.outstanding.lock().unwrap() > 0 {
            return Err(CaptureError::SlotBusy);
        }

        let next = self
            .results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Some(mock_jpeg_frame(1024)));

        match next {
            Some(frame) => {
                self.journal.record(MockEvent::Acquire { bytes: frame.len() });
                *self.acquired.lock().unwrap() += 1;
                let mut outstanding = self.outstanding.lock().unwrap();
                *outstanding += 1;
                let mut max = self.max_outstanding.lock().unwrap();
                *max = (*max).max(*outstanding);
                Ok(CaptureBuffer::new(frame))
            }
            None => {
                self.journal.record(MockEvent::AcquireFailed);
                Err(CaptureError::NoFrame)
            }
        }
    }

    fn release(&mut self, buffer: CaptureBuffer) {
        self.journal.record(MockEvent::Release { bytes: buffer.len() });
        *self.released.lock().unwrap() += 1;
        let mut outstanding = self.outstanding.lock().unwrap();
        *outstanding = outstanding.saturating_sub(1);
    }
}

/// `MockTransport::connect` の振る舞い
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectBehavior {
    /// 接続成功
    Accept,
    /// 接続失敗 (エラーを返す)
    Refuse,
    /// `Ok` を返すが直後に切断され、接続状態にならない
    AcceptThenDrop,
}

/// 送信経路のモック
///
/// 接続・送信の結果はキューから取り出し、キューが空なら成功とする。
#[derive(Debug, Clone)]
pub struct MockTransport {
    journal: MockJournal,
    connected: Arc<Mutex<bool>>,
    connect_results: Arc<Mutex<VecDeque<ConnectBehavior>>>,
    publish_results: Arc<Mutex<VecDeque<bool>>>,
    published: Arc<Mutex<Vec<(String, Vec<u8>)>>>,
    connect_credentials: Arc<Mutex<Vec<BrokerCredentials>>>,
    publish_while_disconnected: Arc<Mutex<usize>>,
}

impl MockTransport {
    pub fn new(journal: &MockJournal) -> Self {
        Self {
            journal: journal.clone(),
            connected: Arc::new(Mutex::new(false)),
            connect_results: Arc::new(Mutex::new(VecDeque::new())),
            publish_results: Arc::new(Mutex::new(VecDeque::new())),
            published: Arc::new(Mutex::new(Vec::new())),
            connect_credentials: Arc::new(Mutex::new(Vec::new())),
            publish_while_disconnected: Arc::new(Mutex::new(0)),
        }
    }

    /// 接続済みの状態で作成
    pub fn connected(journal: &MockJournal) -> Self {
        let transport = Self::new(journal);
        transport.set_connected(true);
        transport
    }

    pub fn set_connected(&self, connected: bool) {
        *self.connected.lock().unwrap() = connected;
    }

    /// 次回以降の `connect` の結果を順に追加
    pub fn queue_connect_results(&self, results: &[bool]) {
        self.queue_connect_behaviors(
            &results
                .iter()
                .map(|&ok| if ok { ConnectBehavior::Accept } else { ConnectBehavior::Refuse })
                .collect::<Vec<_>>(),
        );
    }

    pub fn queue_connect_behaviors(&self, behaviors: &[ConnectBehavior]) {
        self.connect_results.lock().unwrap().extend(behaviors.iter().copied());
    }

    pub fn queue_publish_result(&self, success: bool) {
        self.publish_results.lock().unwrap().push_back(success);
    }

    pub fn published(&self) -> Vec<(String, Vec<u8>)> {
        self.published.lock().unwrap().clone()
    }

    pub fn connect_credentials(&self) -> Vec<BrokerCredentials> {
        self.connect_credentials.lock().unwrap().clone()
    }

    /// 切断中に `publish` が呼ばれた回数 (常に 0 であるべき)
    pub fn publish_while_disconnected(&self) -> usize {
        *self.publish_while_disconnected.lock().unwrap()
    }
}

impl Transport for MockTransport {
    fn is_connected(&self) -> bool {
        *self.connected.lock().unwrap()
    }

    fn connect(
        &mut self,
        client_id: &str,
        credentials: &BrokerCredentials,
    ) -> Result<(), TransportError> {
        self.connect_credentials.lock().unwrap().push(credentials.clone());
        let behavior = self
            .connect_results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(ConnectBehavior::Accept);

        match behavior {
            ConnectBehavior::Accept => {
                self.journal.record(MockEvent::Connect {
                    client_id: client_id.to_string(),
                });
                self.set_connected(true);
                Ok(())
            }
            ConnectBehavior::AcceptThenDrop => {
                self.journal.record(MockEvent::Connect {
                    client_id: client_id.to_string(),
                });
                self.set_connected(false);
                Ok(())
            }
            ConnectBehavior::Refuse => {
                self.journal.record(MockEvent::ConnectFailed {
                    client_id: client_id.to_string(),
                });
                Err(TransportError::ConnectFailed("rc=-2".to_string()))
            }
        }
    }

    fn publish(&mut self, topic: &str, payload: &[u8]) -> Result<(), TransportError> {
        if !self.is_connected() {
            *self.publish_while_disconnected.lock().unwrap() += 1;
            self.journal.record(MockEvent::PublishFailed {
                topic: topic.to_string(),
            });
            return Err(TransportError::NotConnected);
        }

        let success = self.publish_results.lock().unwrap().pop_front().unwrap_or(true);
        if success {
            self.journal.record(MockEvent::Publish {
                topic: topic.to_string(),
                bytes: payload.len(),
            });
            self.published
                .lock()
                .unwrap()
                .push((topic.to_string(), payload.to_vec()));
            Ok(())
        } else {
            self.journal.record(MockEvent::PublishFailed {
                topic: topic.to_string(),
            });
            Err(TransportError::PublishFailed("payload too large".to_string()))
        }
    }

    fn service(&mut self) {
        self.journal.record(MockEvent::Service);
    }
}

/// LEDのモック
#[derive(Debug, Clone)]
pub struct MockLed {
    journal: MockJournal,
    lit: Arc<Mutex<bool>>,
    fail: Arc<Mutex<bool>>,
}

impl MockLed {
    pub fn new(journal: &MockJournal) -> Self {
        Self {
            journal: journal.clone(),
            lit: Arc::new(Mutex::new(false)),
            fail: Arc::new(Mutex::new(false)),
        }
    }

    pub fn is_lit(&self) -> bool {
        *self.lit.lock().unwrap()
    }

    /// LED制御エラーをシミュレート
    pub fn set_failure(&self, enable: bool) {
        *self.fail.lock().unwrap() = enable;
    }

    fn set(&mut self, on: bool) -> Result<(), LedError> {
        if *self.fail.lock().unwrap() {
            return Err(LedError::ControlFailed("Simulated LED error".to_string()));
        }
        *self.lit.lock().unwrap() = on;
        self.journal
            .record(if on { MockEvent::LedOn } else { MockEvent::LedOff });
        Ok(())
    }
}

impl StatusIndicator for MockLed {
    fn turn_on(&mut self) -> Result<(), LedError> {
        self.set(true)
    }

    fn turn_off(&mut self) -> Result<(), LedError> {
        self.set(false)
    }
}

/// 手動で進める時計
///
/// `sleep` は実際には待たず、時刻を進めて記録するだけ。
#[derive(Debug, Clone)]
pub struct ManualClock {
    journal: MockJournal,
    now: Arc<Mutex<Duration>>,
    sleeps: Arc<Mutex<Vec<Duration>>>,
}

impl ManualClock {
    pub fn new(journal: &MockJournal) -> Self {
        Self {
            journal: journal.clone(),
            now: Arc::new(Mutex::new(Duration::ZERO)),
            sleeps: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn set(&self, now: Duration) {
        *self.now.lock().unwrap() = now;
    }

    pub fn advance(&self, by: Duration) {
        *self.now.lock().unwrap() += by;
    }

    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().unwrap().clone()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        *self.now.lock().unwrap()
    }

    fn sleep(&self, duration: Duration) {
        self.journal.record(MockEvent::Sleep(duration));
        self.sleeps.lock().unwrap().push(duration);
        self.advance(duration);
    }
}

/// 決まった値を順に返す乱数源 (尽きたら先頭へ戻る)
#[derive(Debug, Clone)]
pub struct SequenceRandom {
    values: Vec<u16>,
    index: usize,
}

impl SequenceRandom {
    pub fn new(values: &[u16]) -> Self {
        Self {
            values: if values.is_empty() { vec![0] } else { values.to_vec() },
            index: 0,
        }
    }
}

impl RandomSource for SequenceRandom {
    fn next_u16(&mut self) -> u16 {
        let value = self.values[self.index % self.values.len()];
        self.index += 1;
        value
    }
}

/// テスト用の設定 (撮影間隔 300秒, 再接続待ち 5秒, アイドル 100ms)
pub fn test_config() -> AppConfig {
    AppConfig {
        wifi_ssid: "test-ap".to_string(),
        wifi_password: "password".to_string(),
        mqtt_host: "127.0.0.1".to_string(),
        mqtt_port: 1883,
        credentials: BrokerCredentials {
            username: Some("meter".to_string()),
            password: Some("secret".to_string()),
        },
        mqtt_topic: "home/meter/electric/image".to_string(),
        device_name: "Electric Meter".to_string(),
        client_id_prefix: "ESP32CAM-Electric-".to_string(),
        capture_interval: Duration::from_millis(300_000),
        reconnect_delay: Duration::from_secs(5),
        loop_idle: Duration::from_millis(100),
        mqtt_buffer_size: 32768,
        mqtt_keep_alive: Duration::from_secs(15),
        mqtt_connect_timeout: Duration::from_secs(15),
        frame_size: FrameSize::Svga,
        jpeg_quality: 10,
        wifi_poll: Duration::from_millis(500),
    }
}
