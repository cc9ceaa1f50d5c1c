/// カメラ制御モジュール
///
/// - `FrameSource`: 撮影機能の抽象 (実機 / Mock)
/// - `CaptureBuffer`: 1枚分のエンコード済み画像
/// - `FrameSlot`: 使い回すフレームバッファ1枠
#[cfg(any(target_arch = "riscv32", target_arch = "xtensa"))]
pub mod controller;

#[cfg(any(target_arch = "riscv32", target_arch = "xtensa"))]
pub use controller::*;

use sha2::{Digest, Sha256};

/// 撮影のエラー
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CaptureError {
    #[error("カメラからフレームを取得できませんでした")]
    NoFrame,

    #[error("前回のフレームバッファがまだ返却されていません")]
    SlotBusy,

    #[error("空のフレームを受信しました")]
    EmptyFrame,
}

/// 1回の撮影で得られた画像データ
///
/// 所有者は1つだけで、`FrameSource::release` に渡して返却する。
#[derive(Debug, PartialEq, Eq)]
pub struct CaptureBuffer {
    data: Vec<u8>,
}

impl CaptureBuffer {
    pub fn new(data: Vec<u8>) -> Self {
        Self { data }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.data
    }
}

/// 画像を撮影する機能
pub trait FrameSource {
    /// 1枚撮影する
    fn acquire(&mut self) -> Result<CaptureBuffer, CaptureError>;

    /// `acquire` で得たバッファを返却する (成功した `acquire` 毎にちょうど1回)
    fn release(&mut self, buffer: CaptureBuffer);
}

/// 再利用するフレームバッファの枠
///
/// 貸し出し中は次の貸し出しを拒否するため、同時に存在する
/// `CaptureBuffer` は常に1つまでになる。
#[derive(Debug)]
pub struct FrameSlot {
    spare: Option<Vec<u8>>,
}

impl FrameSlot {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            spare: Some(Vec::with_capacity(capacity)),
        }
    }

    pub fn is_checked_out(&self) -> bool {
        self.spare.is_none()
    }

    /// ドライバのフレームを枠にコピーして貸し出す
    pub fn check_out(&mut self, frame: &[u8]) -> Result<CaptureBuffer, CaptureError> {
        if frame.is_empty() {
            return Err(CaptureError::EmptyFrame);
        }
        let mut data = self.spare.take().ok_or(CaptureError::SlotBusy)?;
        data.clear();
        data.extend_from_slice(frame);
        Ok(CaptureBuffer::new(data))
    }

    /// 返却されたバッファの領域を次回用に保持する
    pub fn check_in(&mut self, buffer: CaptureBuffer) {
        if self.spare.is_some() {
            log::warn!("返却先の枠が既に埋まっています。バッファを破棄します");
            return;
        }
        self.spare = Some(buffer.into_inner());
    }
}

/// ログ用の短いSHA-256ダイジェスト (先頭8バイトの16進)
pub fn frame_digest(data: &[u8]) -> String {
    let digest = Sha256::digest(data);
    digest[..8].iter().map(|b| format!("{:02x}", b)).collect()
}
