/// ステータスLED
#[cfg(any(target_arch = "riscv32", target_arch = "xtensa"))]
pub mod status_led;

#[cfg(any(target_arch = "riscv32", target_arch = "xtensa"))]
pub use status_led::StatusLed;

/// LEDの制御に関するエラー
#[derive(Debug, thiserror::Error)]
pub enum LedError {
    #[error("LEDの初期化に失敗しました: {0}")]
    InitFailed(String),

    #[error("LEDの点灯制御に失敗しました: {0}")]
    ControlFailed(String),
}

/// 撮影中を示す2値のインジケータ
pub trait StatusIndicator {
    fn turn_on(&mut self) -> Result<(), LedError>;
    fn turn_off(&mut self) -> Result<(), LedError>;
}
