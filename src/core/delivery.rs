use log::{error, info, warn};

use crate::communication::transport::Transport;
use crate::core::clock::{Clock, RandomSource};
use crate::core::connection_manager::ConnectionManager;
use crate::hardware::camera::{frame_digest, FrameSource};
use crate::hardware::led::StatusIndicator;

/// 撮影・送信1周期の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// 送信成功
    Published { bytes: usize },
    /// 撮影失敗 (送信は行っていない)
    CaptureFailed,
    /// 撮影は成功したが送信に失敗 (バッファは返却済み)
    PublishFailed { bytes: usize },
}

impl CycleOutcome {
    pub fn is_published(&self) -> bool {
        matches!(self, CycleOutcome::Published { .. })
    }
}

/// 撮影した画像を1枚ブローカーへ届ける
///
/// 失敗はすべてここで吸収し、ログと `CycleOutcome` に変換する。
/// 撮影・送信ともにこの周期内では再試行しない。
pub struct DeliveryOrchestrator {
    topic: String,
}

impl DeliveryOrchestrator {
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
        }
    }

    pub fn capture_and_send<S, T, L, C, R>(
        &self,
        camera: &mut S,
        transport: &mut T,
        connection: &mut ConnectionManager<C, R>,
        led: &mut L,
    ) -> CycleOutcome
    where
        S: FrameSource,
        T: Transport,
        L: StatusIndicator,
        C: Clock,
        R: RandomSource,
    {
        info!(">>> 画像をキャプチャ中...");
        if let Err(e) = led.turn_on() {
            warn!("LED点灯に失敗: {}", e);
        }

        let buffer = match camera.acquire() {
            Ok(buffer) => buffer,
            Err(e) => {
                error!("✗ カメラキャプチャ失敗: {}", e);
                turn_off_led(led);
                return CycleOutcome::CaptureFailed;
            }
        };

        if buffer.is_empty() {
            error!("✗ 空の画像データを受信しました");
            camera.release(buffer);
            turn_off_led(led);
            return CycleOutcome::CaptureFailed;
        }

        let bytes = buffer.len();
        info!(
            "✓ 画像キャプチャ完了: {} bytes (sha256:{})",
            bytes,
            frame_digest(buffer.as_bytes())
        );

        if !transport.is_connected() {
            connection.ensure_connected(transport);
        }

        let outcome = match transport.publish(&self.topic, buffer.as_bytes()) {
            Ok(()) => {
                info!("✓ 画像をMQTTへ送信しました ({})", self.topic);
                CycleOutcome::Published { bytes }
            }
            Err(e) => {
                error!("✗ 画像の送信に失敗しました: {}", e);
                CycleOutcome::PublishFailed { bytes }
            }
        };

        // 送信結果に関わらず必ず返却する
        camera.release(buffer);
        turn_off_led(led);
        outcome
    }
}

fn turn_off_led<L: StatusIndicator>(led: &mut L) {
    if let Err(e) = led.turn_off() {
        warn!("LED消灯に失敗: {}", e);
    }
}
