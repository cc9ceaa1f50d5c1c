/*!
 * # Meter Cam Publisher Library
 *
 * ESP32-CAM でメーターを定期撮影し、MQTT ブローカーへ画像を送信するためのライブラリ
 *
 * ## モジュール構成
 * - `core`: アプリケーションの核となる機能（設定、撮影スケジュール、接続管理、送信制御）
 * - `hardware`: ハードウェア制御（カメラ、LED、ピン設定）
 * - `communication`: 通信機能（送信経路、MQTT、WiFi）
 * - `mock`: ホストテスト用のモック（実機ビルドでは含まれない）
 */

// 公開モジュール
pub mod communication;
pub mod core;
pub mod hardware;

#[cfg(not(any(target_arch = "riscv32", target_arch = "xtensa")))]
pub mod mock;

// 内部で使用する型をまとめてエクスポート
pub use communication::{Transport, TransportError};
pub use self::core::{
    AppConfig, AppController, CaptureScheduler, ConfigError, ConnectionManager, CycleOutcome,
    DeliveryOrchestrator, IterationReport, LinkState,
};
pub use hardware::{CaptureBuffer, CaptureError, FrameSource, LedError, StatusIndicator};

/// ライブラリのバージョン情報
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
