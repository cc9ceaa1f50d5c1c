use esp_idf_svc::hal::gpio::{Gpio33, Output, PinDriver};

use super::{LedError, StatusIndicator};

/// ステータスLED制御 (AI-Thinker ESP32-CAM 基板上の GPIO33)
pub struct StatusLed {
    led: PinDriver<'static, Gpio33, Output>,
}

impl StatusLed {
    /// 新しいステータスLEDコントローラーを作成します
    ///
    /// # エラー
    ///
    /// LEDの初期化に失敗した場合にエラーを返します
    pub fn new(pin: Gpio33) -> Result<Self, LedError> {
        let led = PinDriver::output(pin).map_err(|e| LedError::InitFailed(format!("{:?}", e)))?;

        Ok(Self { led })
    }
}

impl StatusIndicator for StatusLed {
    fn turn_on(&mut self) -> Result<(), LedError> {
        self.led
            .set_high()
            .map_err(|e| LedError::ControlFailed(format!("{:?}", e)))
    }

    fn turn_off(&mut self) -> Result<(), LedError> {
        self.led
            .set_low()
            .map_err(|e| LedError::ControlFailed(format!("{:?}", e)))
    }
}
