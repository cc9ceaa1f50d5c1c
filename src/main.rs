#[cfg(any(target_arch = "riscv32", target_arch = "xtensa"))]
use std::sync::Arc;

#[cfg(any(target_arch = "riscv32", target_arch = "xtensa"))]
use esp_idf_svc::{
    eventloop::EspSystemEventLoop,
    hal::{peripherals::Peripherals, reset},
    nvs::EspDefaultNvsPartition,
};
#[cfg(any(target_arch = "riscv32", target_arch = "xtensa"))]
use log::{error, info};
#[cfg(any(target_arch = "riscv32", target_arch = "xtensa"))]
use meter_cam_publisher::{
    communication::{MqttTransport, NetworkManager},
    core::{AppConfig, AppController, EspClock, EspRandom},
    hardware::{camera::CameraController, led::StatusLed, CameraPins, StatusIndicator},
    VERSION,
};

/// アプリケーションのメインエントリーポイント
#[cfg(any(target_arch = "riscv32", target_arch = "xtensa"))]
fn main() -> anyhow::Result<()> {
    // ESP-IDFの基本初期化
    esp_idf_svc::sys::link_patches();
    esp_idf_svc::log::EspLogger::initialize_default();

    // 起動時の失敗は回復を試みず、デバイスごと再起動する
    if let Err(e) = start() {
        error!("✗ 起動に失敗しました: {:?}。再起動します", e);
        reset::restart();
    }
    Ok(())
}

#[cfg(any(target_arch = "riscv32", target_arch = "xtensa"))]
fn start() -> anyhow::Result<()> {
    // 設定ファイル読み込み
    let app_config = Arc::new(AppConfig::load().map_err(|e| {
        error!("設定ファイルの読み込みに失敗しました: {}", e);
        anyhow::anyhow!("設定ファイルの読み込みエラー: {}", e)
    })?);

    info!("=================================");
    info!("ESP32-CAM Meter Reader: {} (v{})", app_config.device_name, VERSION);
    info!("=================================");

    // ペリフェラルとシステムリソースの初期化
    let peripherals = Peripherals::take()?;
    let sysloop = EspSystemEventLoop::take()?;
    let nvs_partition = EspDefaultNvsPartition::take()?;
    let pins = peripherals.pins;

    // ステータスLEDの初期化
    let mut led = StatusLed::new(pins.gpio33)?;
    led.turn_off()?;

    // カメラの初期化
    let camera_pins = CameraPins::new(
        pins.gpio32, pins.gpio0,
        pins.gpio5, pins.gpio18, pins.gpio19, pins.gpio21,
        pins.gpio36, pins.gpio39, pins.gpio34, pins.gpio35,
        pins.gpio25, pins.gpio23, pins.gpio22,
        pins.gpio26, pins.gpio27,
    );
    let camera = CameraController::new(camera_pins, app_config.frame_size, app_config.jpeg_quality)
        .map_err(|e| anyhow::anyhow!("カメラ初期化エラー: {:?}", e))?;

    // ネットワーク（WiFi）初期化
    let wifi = NetworkManager::connect_wifi(peripherals.modem, &sysloop, &nvs_partition, &app_config)?;
    let transport = MqttTransport::new(wifi, &app_config);

    let mut controller = AppController::new(&app_config, camera, transport, led, EspClock, EspRandom);
    controller.run()
}

#[cfg(not(any(target_arch = "riscv32", target_arch = "xtensa")))]
fn main() {
    eprintln!("meter_cam_publisher は ESP32 向けにビルドしてください (ホストではテストのみ)");
}
