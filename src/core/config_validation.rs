use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    MissingWifiSsid,
    MissingMqttHost,
    InvalidMqttPort(u16),
    InvalidTopic(String),
    ZeroDuration(&'static str),
    UnknownFrameSize(String),
    InvalidJpegQuality(u8),
    BufferTooSmall(u32),
}

/// 撮影フレームサイズ
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameSize {
    Qvga, // 320x240
    Vga,  // 640x480
    Svga, // 800x600
    Xga,  // 1024x768
    Hd,   // 1280x720
    Sxga, // 1280x1024
    Uxga, // 1600x1200
}

impl FrameSize {
    pub fn dimensions(&self) -> (u16, u16) {
        match self {
            FrameSize::Qvga => (320, 240),
            FrameSize::Vga => (640, 480),
            FrameSize::Svga => (800, 600),
            FrameSize::Xga => (1024, 768),
            FrameSize::Hd => (1280, 720),
            FrameSize::Sxga => (1280, 1024),
            FrameSize::Uxga => (1600, 1200),
        }
    }
}

pub const MAX_JPEG_QUALITY: u8 = 63;
pub const MIN_MQTT_BUFFER_SIZE: u32 = 1024;

pub fn validate_wifi_ssid(ssid: &str) -> Result<(), ValidationError> {
    if ssid.is_empty() {
        Err(ValidationError::MissingWifiSsid)
    } else {
        Ok(())
    }
}

pub fn validate_mqtt_host(host: &str) -> Result<(), ValidationError> {
    if host.trim().is_empty() {
        Err(ValidationError::MissingMqttHost)
    } else {
        Ok(())
    }
}

pub fn validate_mqtt_port(port: u16) -> Result<(), ValidationError> {
    if port == 0 {
        Err(ValidationError::InvalidMqttPort(port))
    } else {
        Ok(())
    }
}

/// 送信用トピックにはワイルドカードを含められない
pub fn validate_publish_topic(topic: &str) -> Result<(), ValidationError> {
    if topic.is_empty() || topic.contains(['+', '#', '\0']) {
        return Err(ValidationError::InvalidTopic(topic.to_string()));
    }
    Ok(())
}

pub fn parse_nonzero_millis(name: &'static str, millis: u64) -> Result<Duration, ValidationError> {
    if millis == 0 {
        Err(ValidationError::ZeroDuration(name))
    } else {
        Ok(Duration::from_millis(millis))
    }
}

pub fn parse_frame_size(value: &str) -> Result<FrameSize, ValidationError> {
    match value.trim().to_ascii_uppercase().as_str() {
        "QVGA" => Ok(FrameSize::Qvga),
        "VGA" => Ok(FrameSize::Vga),
        "SVGA" => Ok(FrameSize::Svga),
        "XGA" => Ok(FrameSize::Xga),
        "HD" => Ok(FrameSize::Hd),
        "SXGA" => Ok(FrameSize::Sxga),
        "UXGA" => Ok(FrameSize::Uxga),
        _ => Err(ValidationError::UnknownFrameSize(value.to_string())),
    }
}

pub fn parse_jpeg_quality(value: u8) -> Result<u8, ValidationError> {
    if value > MAX_JPEG_QUALITY {
        Err(ValidationError::InvalidJpegQuality(value))
    } else {
        Ok(value)
    }
}

pub fn validate_mqtt_buffer_size(size: u32) -> Result<usize, ValidationError> {
    if size < MIN_MQTT_BUFFER_SIZE {
        Err(ValidationError::BufferTooSmall(size))
    } else {
        Ok(size as usize)
    }
}

/// 空文字列は「未設定」として扱う
pub fn optional_credential(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}
