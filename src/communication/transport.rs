use crate::core::config::BrokerCredentials;

/// 送信経路のエラー
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TransportError {
    #[error("ネットワークに接続されていません: {0}")]
    NetworkDown(String),

    #[error("ブローカーへの接続に失敗しました: {0}")]
    ConnectFailed(String),

    #[error("ブローカーからの応答がタイムアウトしました")]
    ConnectTimeout,

    #[error("ブローカーに接続されていません")]
    NotConnected,

    #[error("PUBLISHに失敗しました: {0}")]
    PublishFailed(String),
}

/// メッセージブローカーへの送信経路
///
/// このトレイトを実装することで、実機用 (ESP-IDF MQTT) とテスト用(Mock)の
/// 実装を切り替えることができます。
pub trait Transport {
    /// ネットワークとブローカーの両方に接続済みか
    fn is_connected(&self) -> bool;

    /// 指定したクライアントIDで接続する
    fn connect(
        &mut self,
        client_id: &str,
        credentials: &BrokerCredentials,
    ) -> Result<(), TransportError>;

    /// ペイロードをそのままトピックへ送信する
    fn publish(&mut self, topic: &str, payload: &[u8]) -> Result<(), TransportError>;

    /// キープアライブ等のバックグラウンド処理 (ループ毎に1回呼ぶ)
    fn service(&mut self);
}
