/// ハードウェア制御モジュール
pub mod camera;
pub mod led;
#[cfg(any(target_arch = "riscv32", target_arch = "xtensa"))]
pub mod pins;

pub use camera::{CaptureBuffer, CaptureError, FrameSource};
pub use led::{LedError, StatusIndicator};
#[cfg(any(target_arch = "riscv32", target_arch = "xtensa"))]
pub use pins::CameraPins;
