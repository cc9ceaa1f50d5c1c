use esp_camera_rs::Camera;
use esp_idf_svc::sys::camera;
use esp_idf_svc::sys::EspError;
use log::info;

use super::{CaptureBuffer, CaptureError, FrameSlot, FrameSource};
use crate::core::config_validation::FrameSize;
use crate::hardware::CameraPins;

/// フレームバッファの初期確保量 (SVGA JPEG が収まる程度)
const INITIAL_FRAME_CAPACITY: usize = 32 * 1024;

/// esp32-camera ドライバを包んだ撮影機能
pub struct CameraController {
    camera: Camera<'static>,
    slot: FrameSlot,
}

impl CameraController {
    /// カメラを初期化する
    ///
    /// ここでの失敗は起動時の致命的エラーとして扱われる。
    pub fn new(pins: CameraPins, frame_size: FrameSize, jpeg_quality: u8) -> Result<Self, EspError> {
        let (width, height) = frame_size.dimensions();
        info!("カメラを初期化中... ({}x{}, JPEG品質 {})", width, height, jpeg_quality);

        let camera = Camera::new(
            pins.pwdn,
            pins.clock,
            pins.d0,
            pins.d1,
            pins.d2,
            pins.d3,
            pins.d4,
            pins.d5,
            pins.d6,
            pins.d7,
            pins.vsync,
            pins.href,
            pins.pclk,
            pins.sda,
            pins.scl,
            camera::pixformat_t_PIXFORMAT_JPEG,
            to_driver_frame_size(frame_size),
        )?;

        camera.sensor().set_quality(i32::from(jpeg_quality))?;
        info!("✓ カメラの初期化が完了しました");

        Ok(Self {
            camera,
            slot: FrameSlot::with_capacity(INITIAL_FRAME_CAPACITY),
        })
    }
}

impl FrameSource for CameraController {
    fn acquire(&mut self) -> Result<CaptureBuffer, CaptureError> {
        if self.slot.is_checked_out() {
            return Err(CaptureError::SlotBusy);
        }
        // ドライバのフレームはコピー後すぐに返却される (drop時)
        let frame = self.camera.get_framebuffer().ok_or(CaptureError::NoFrame)?;
        self.slot.check_out(frame.data())
    }

    fn release(&mut self, buffer: CaptureBuffer) {
        self.slot.check_in(buffer);
    }
}

fn to_driver_frame_size(frame_size: FrameSize) -> camera::framesize_t {
    match frame_size {
        FrameSize::Qvga => camera::framesize_t_FRAMESIZE_QVGA,
        FrameSize::Vga => camera::framesize_t_FRAMESIZE_VGA,
        FrameSize::Svga => camera::framesize_t_FRAMESIZE_SVGA,
        FrameSize::Xga => camera::framesize_t_FRAMESIZE_XGA,
        FrameSize::Hd => camera::framesize_t_FRAMESIZE_HD,
        FrameSize::Sxga => camera::framesize_t_FRAMESIZE_SXGA,
        FrameSize::Uxga => camera::framesize_t_FRAMESIZE_UXGA,
    }
}
