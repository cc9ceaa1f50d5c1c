use std::time::Duration;

use crate::core::config_validation::{
    optional_credential, parse_frame_size, parse_jpeg_quality, parse_nonzero_millis,
    validate_mqtt_buffer_size, validate_mqtt_host, validate_mqtt_port, validate_publish_topic,
    validate_wifi_ssid, FrameSize, ValidationError,
};

/// アプリケーション設定
///
/// この構造体はビルド時に`cfg.toml`ファイルから読み込まれた設定を保持します。
#[toml_cfg::toml_config]
pub struct Config {
    #[default("")]
    wifi_ssid: &'static str,

    #[default("")]
    wifi_password: &'static str,

    #[default("")]
    mqtt_host: &'static str,

    #[default(1883)]
    mqtt_port: u16,

    #[default("")]
    mqtt_user: &'static str,

    #[default("")]
    mqtt_password: &'static str,

    #[default("home/meter/electric/image")]
    mqtt_topic: &'static str,

    #[default("Electric Meter")]
    device_name: &'static str,

    #[default("ESP32CAM-Electric-")]
    client_id_prefix: &'static str,

    #[default(300000)] // 5分
    capture_interval_ms: u64,

    #[default(5000)]
    reconnect_delay_ms: u64,

    #[default(100)]
    loop_idle_ms: u64,

    // 画像を1回のPUBLISHに収めるためのバッファサイズ
    #[default(32768)]
    mqtt_buffer_size: u32,

    #[default(15)]
    mqtt_keep_alive_seconds: u16,

    #[default(15000)]
    mqtt_connect_timeout_ms: u64,

    #[default("SVGA")]
    frame_size: &'static str,

    #[default(10)] // OCR向けの高画質設定
    jpeg_quality: u8,

    #[default(500)]
    wifi_poll_ms: u64,
}

/// 設定エラー
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("WiFi SSIDが設定されていません")]
    MissingWifiSsid,
    #[error("MQTTブローカーのホストが設定されていません。cfg.tomlを確認してください。")]
    MissingMqttHost,
    #[error("MQTTポートが無効です: {0}")]
    InvalidMqttPort(u16),
    #[error("送信トピックが無効です: '{0}'")]
    InvalidTopic(String),
    #[error("{0} は 0 にできません")]
    ZeroDuration(&'static str),
    #[error("frame_size の値が無効です: {0}")]
    UnknownFrameSize(String),
    #[error("jpeg_quality の値が無効です (0-63): {0}")]
    InvalidJpegQuality(u8),
    #[error("mqtt_buffer_size が小さすぎます (1024以上): {0}")]
    BufferTooSmall(u32),
}

/// MQTTブローカーへの接続情報
#[derive(Debug, Clone, PartialEq)]
pub struct BrokerCredentials {
    pub username: Option<String>,
    pub password: Option<String>,
}

/// アプリケーション設定を表す構造体
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// WiFi SSID
    pub wifi_ssid: String,

    /// WiFi パスワード (空ならオープンネットワーク)
    pub wifi_password: String,

    /// MQTTブローカーのホスト
    pub mqtt_host: String,

    /// MQTTブローカーのポート
    pub mqtt_port: u16,

    /// ブローカー認証情報
    pub credentials: BrokerCredentials,

    /// 画像の送信先トピック
    pub mqtt_topic: String,

    /// デバイス表示名
    pub device_name: String,

    /// クライアントIDの接頭辞 (接続ごとに乱数を付加)
    pub client_id_prefix: String,

    /// 撮影間隔
    pub capture_interval: Duration,

    /// 再接続失敗時の待機時間
    pub reconnect_delay: Duration,

    /// ループ1回ごとのアイドル時間
    pub loop_idle: Duration,

    /// MQTT送受信バッファサイズ（バイト）
    pub mqtt_buffer_size: usize,

    /// MQTTキープアライブ間隔
    pub mqtt_keep_alive: Duration,

    /// CONNACK待ちのタイムアウト
    pub mqtt_connect_timeout: Duration,

    /// フレームサイズ
    pub frame_size: FrameSize,

    /// JPEG品質 (小さいほど高画質)
    pub jpeg_quality: u8,

    /// WiFi接続待ちのポーリング間隔
    pub wifi_poll: Duration,
}

impl AppConfig {
    /// 設定ファイルから設定をロードします
    pub fn load() -> Result<Self, ConfigError> {
        // toml_cfg によって生成された定数
        Self::from_config(&CONFIG)
    }

    fn from_config(config: &Config) -> Result<Self, ConfigError> {
        validate_wifi_ssid(config.wifi_ssid).map_err(map_validation_error)?;
        // パスワードはオープンネットワークのため空でも良い

        validate_mqtt_host(config.mqtt_host).map_err(map_validation_error)?;
        validate_mqtt_port(config.mqtt_port).map_err(map_validation_error)?;
        validate_publish_topic(config.mqtt_topic).map_err(map_validation_error)?;

        let capture_interval = parse_nonzero_millis("capture_interval_ms", config.capture_interval_ms)
            .map_err(map_validation_error)?;
        let reconnect_delay = parse_nonzero_millis("reconnect_delay_ms", config.reconnect_delay_ms)
            .map_err(map_validation_error)?;
        let loop_idle =
            parse_nonzero_millis("loop_idle_ms", config.loop_idle_ms).map_err(map_validation_error)?;
        let mqtt_connect_timeout =
            parse_nonzero_millis("mqtt_connect_timeout_ms", config.mqtt_connect_timeout_ms)
                .map_err(map_validation_error)?;
        let wifi_poll =
            parse_nonzero_millis("wifi_poll_ms", config.wifi_poll_ms).map_err(map_validation_error)?;

        let mqtt_buffer_size =
            validate_mqtt_buffer_size(config.mqtt_buffer_size).map_err(map_validation_error)?;

        let frame_size = parse_frame_size(config.frame_size).map_err(map_validation_error)?;
        let jpeg_quality = parse_jpeg_quality(config.jpeg_quality).map_err(map_validation_error)?;

        Ok(AppConfig {
            wifi_ssid: config.wifi_ssid.to_string(),
            wifi_password: config.wifi_password.to_string(),
            mqtt_host: config.mqtt_host.trim().to_string(),
            mqtt_port: config.mqtt_port,
            credentials: BrokerCredentials {
                username: optional_credential(config.mqtt_user),
                password: optional_credential(config.mqtt_password),
            },
            mqtt_topic: config.mqtt_topic.to_string(),
            device_name: config.device_name.to_string(),
            client_id_prefix: config.client_id_prefix.to_string(),
            capture_interval,
            reconnect_delay,
            loop_idle,
            mqtt_buffer_size,
            mqtt_keep_alive: Duration::from_secs(u64::from(config.mqtt_keep_alive_seconds)),
            mqtt_connect_timeout,
            frame_size,
            jpeg_quality,
            wifi_poll,
        })
    }

    /// `mqtt://host:port` 形式のブローカーURL
    pub fn broker_url(&self) -> String {
        format!("mqtt://{}:{}", self.mqtt_host, self.mqtt_port)
    }
}

fn map_validation_error(err: ValidationError) -> ConfigError {
    match err {
        ValidationError::MissingWifiSsid => ConfigError::MissingWifiSsid,
        ValidationError::MissingMqttHost => ConfigError::MissingMqttHost,
        ValidationError::InvalidMqttPort(v) => ConfigError::InvalidMqttPort(v),
        ValidationError::InvalidTopic(v) => ConfigError::InvalidTopic(v),
        ValidationError::ZeroDuration(name) => ConfigError::ZeroDuration(name),
        ValidationError::UnknownFrameSize(v) => ConfigError::UnknownFrameSize(v),
        ValidationError::InvalidJpegQuality(v) => ConfigError::InvalidJpegQuality(v),
        ValidationError::BufferTooSmall(v) => ConfigError::BufferTooSmall(v),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> Config {
        Config {
            wifi_ssid: "farm-ap",
            wifi_password: "secret",
            mqtt_host: " 192.168.1.10 ",
            mqtt_port: 1883,
            mqtt_user: "",
            mqtt_password: "",
            mqtt_topic: "home/meter/electric/image",
            device_name: "Electric Meter",
            client_id_prefix: "ESP32CAM-Electric-",
            capture_interval_ms: 300000,
            reconnect_delay_ms: 5000,
            loop_idle_ms: 100,
            mqtt_buffer_size: 32768,
            mqtt_keep_alive_seconds: 15,
            mqtt_connect_timeout_ms: 15000,
            frame_size: "SVGA",
            jpeg_quality: 10,
            wifi_poll_ms: 500,
        }
    }

    #[test]
    fn test_valid_config_is_converted() {
        let app = AppConfig::from_config(&valid_config()).unwrap();
        assert_eq!(app.capture_interval, Duration::from_secs(300));
        assert_eq!(app.reconnect_delay, Duration::from_secs(5));
        assert_eq!(app.loop_idle, Duration::from_millis(100));
        assert_eq!(app.frame_size, FrameSize::Svga);
        assert_eq!(app.mqtt_buffer_size, 32768);
        assert_eq!(app.credentials.username, None);
        assert_eq!(app.broker_url(), "mqtt://192.168.1.10:1883");
    }

    #[test]
    fn test_credentials_are_kept_when_set() {
        let config = Config {
            mqtt_user: "meter",
            mqtt_password: "pw",
            ..valid_config()
        };
        let app = AppConfig::from_config(&config).unwrap();
        assert_eq!(app.credentials.username.as_deref(), Some("meter"));
        assert_eq!(app.credentials.password.as_deref(), Some("pw"));
    }

    #[test]
    fn test_missing_broker_host() {
        let config = Config {
            mqtt_host: "",
            ..valid_config()
        };
        assert!(matches!(
            AppConfig::from_config(&config),
            Err(ConfigError::MissingMqttHost)
        ));
    }

    #[test]
    fn test_zero_reconnect_delay_is_rejected() {
        let config = Config {
            reconnect_delay_ms: 0,
            ..valid_config()
        };
        assert!(matches!(
            AppConfig::from_config(&config),
            Err(ConfigError::ZeroDuration("reconnect_delay_ms"))
        ));
    }

    #[test]
    fn test_wildcard_topic_is_rejected() {
        let config = Config {
            mqtt_topic: "home/meter/#",
            ..valid_config()
        };
        assert!(matches!(
            AppConfig::from_config(&config),
            Err(ConfigError::InvalidTopic(_))
        ));
    }
}
