use std::time::Duration;

/// 単調時計と待機の抽象化
///
/// `now()` は起動からの経過時間を返し、決して減少しません。
pub trait Clock {
    fn now(&self) -> Duration;

    /// 呼び出し元をブロックして指定時間待機する
    fn sleep(&self, duration: Duration);
}

/// クライアントID用の乱数源
pub trait RandomSource {
    fn next_u16(&mut self) -> u16;
}

/// ESP-IDF のタイマーと FreeRTOS ディレイによる実装
#[cfg(any(target_arch = "riscv32", target_arch = "xtensa"))]
#[derive(Debug, Clone, Copy, Default)]
pub struct EspClock;

#[cfg(any(target_arch = "riscv32", target_arch = "xtensa"))]
impl Clock for EspClock {
    fn now(&self) -> Duration {
        let micros = unsafe { esp_idf_svc::sys::esp_timer_get_time() };
        Duration::from_micros(micros.max(0) as u64)
    }

    fn sleep(&self, duration: Duration) {
        let millis = u32::try_from(duration.as_millis()).unwrap_or(u32::MAX);
        esp_idf_svc::hal::delay::FreeRtos::delay_ms(millis);
    }
}

/// ハードウェア乱数生成器 (RF有効時に真の乱数)
#[cfg(any(target_arch = "riscv32", target_arch = "xtensa"))]
#[derive(Debug, Clone, Copy, Default)]
pub struct EspRandom;

#[cfg(any(target_arch = "riscv32", target_arch = "xtensa"))]
impl RandomSource for EspRandom {
    fn next_u16(&mut self) -> u16 {
        (unsafe { esp_idf_svc::sys::esp_random() } & 0xFFFF) as u16
    }
}
