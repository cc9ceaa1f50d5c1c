use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use embedded_svc::mqtt::client::QoS;
use esp_idf_svc::hal::delay::FreeRtos;
use esp_idf_svc::mqtt::client::{EspMqttClient, EventPayload, MqttClientConfiguration};
use esp_idf_svc::wifi::{BlockingWifi, EspWifi};
use log::{error, info, warn};

use super::network_manager::NetworkManager;
use super::transport::{Transport, TransportError};
use crate::core::config::{AppConfig, BrokerCredentials};

/// CONNACK待ちのポーリング間隔
const CONNECT_POLL_MS: u32 = 100;

/// ESP-IDF の MQTT クライアントによる送信経路
///
/// キープアライブは ESP-IDF 側のタスクが処理するため、接続状態は
/// イベントコールバックから共有フラグで受け取る。
pub struct MqttTransport {
    wifi: BlockingWifi<EspWifi<'static>>,
    client: Option<EspMqttClient<'static>>,
    broker_connected: Arc<AtomicBool>,
    was_connected: bool,
    broker_url: String,
    buffer_size: usize,
    keep_alive: Duration,
    connect_timeout: Duration,
}

impl MqttTransport {
    pub fn new(wifi: BlockingWifi<EspWifi<'static>>, config: &AppConfig) -> Self {
        info!(
            "MQTT送信経路を設定: {} (バッファ {} bytes)",
            config.broker_url(),
            config.mqtt_buffer_size
        );
        Self {
            wifi,
            client: None,
            broker_connected: Arc::new(AtomicBool::new(false)),
            was_connected: false,
            broker_url: config.broker_url(),
            buffer_size: config.mqtt_buffer_size,
            keep_alive: config.mqtt_keep_alive,
            connect_timeout: config.mqtt_connect_timeout,
        }
    }

    fn wifi_connected(&self) -> bool {
        self.wifi.is_connected().unwrap_or(false)
    }

    fn wait_for_connack(&self) -> bool {
        let mut waited = Duration::ZERO;
        let step = Duration::from_millis(u64::from(CONNECT_POLL_MS));
        while waited < self.connect_timeout {
            if self.broker_connected.load(Ordering::Acquire) {
                return true;
            }
            FreeRtos::delay_ms(CONNECT_POLL_MS);
            waited += step;
        }
        self.broker_connected.load(Ordering::Acquire)
    }
}

impl Transport for MqttTransport {
    fn is_connected(&self) -> bool {
        self.client.is_some() && self.broker_connected.load(Ordering::Acquire) && self.wifi_connected()
    }

    fn connect(
        &mut self,
        client_id: &str,
        credentials: &BrokerCredentials,
    ) -> Result<(), TransportError> {
        NetworkManager::reconnect_if_needed(&mut self.wifi)
            .map_err(|e| TransportError::NetworkDown(format!("{:?}", e)))?;

        // 古いクライアントを破棄してから新しいIDで接続し直す
        self.client = None;
        self.broker_connected.store(false, Ordering::Release);

        let conf = MqttClientConfiguration {
            client_id: Some(client_id),
            username: credentials.username.as_deref(),
            password: credentials.password.as_deref(),
            keep_alive_interval: Some(self.keep_alive),
            buffer_size: self.buffer_size,
            out_buffer_size: self.buffer_size,
            ..Default::default()
        };

        let flag = Arc::clone(&self.broker_connected);
        let client = EspMqttClient::new_cb(&self.broker_url, &conf, move |event| {
            match event.payload() {
                EventPayload::Connected(_) => flag.store(true, Ordering::Release),
                EventPayload::Disconnected => flag.store(false, Ordering::Release),
                EventPayload::Error(e) => log::debug!("MQTTイベントエラー: {:?}", e),
                _ => {}
            }
        })
        .map_err(|e| TransportError::ConnectFailed(format!("{:?}", e)))?;

        self.client = Some(client);

        if self.wait_for_connack() {
            self.was_connected = true;
            Ok(())
        } else {
            self.client = None;
            Err(TransportError::ConnectTimeout)
        }
    }

    fn publish(&mut self, topic: &str, payload: &[u8]) -> Result<(), TransportError> {
        if !self.broker_connected.load(Ordering::Acquire) {
            return Err(TransportError::NotConnected);
        }
        let client = self.client.as_mut().ok_or(TransportError::NotConnected)?;

        client
            .publish(topic, QoS::AtMostOnce, false, payload)
            .map(|_| ())
            .map_err(|e| TransportError::PublishFailed(format!("{:?}", e)))
    }

    fn service(&mut self) {
        let connected = self.is_connected();
        if self.was_connected && !connected {
            if self.wifi_connected() {
                warn!("MQTTブローカーとの接続が切れました");
            } else {
                error!("WiFiとの接続が切れました");
            }
        }
        self.was_connected = connected;
    }
}
