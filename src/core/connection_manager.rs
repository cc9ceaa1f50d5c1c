use std::time::Duration;

use log::{info, warn};

use crate::communication::transport::Transport;
use crate::core::clock::{Clock, RandomSource};
use crate::core::config::BrokerCredentials;

/// ブローカー接続の状態
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    Disconnected,
    Connecting,
    Connected,
}

/// 送信経路の接続を維持する
///
/// 切断は非同期には通知されず、`Transport::is_connected` を問い合わせたときに
/// 初めて検出される。
pub struct ConnectionManager<C: Clock, R: RandomSource> {
    clock: C,
    random: R,
    client_id_prefix: String,
    credentials: BrokerCredentials,
    retry_delay: Duration,
    state: LinkState,
    client_id: Option<String>,
}

impl<C: Clock, R: RandomSource> ConnectionManager<C, R> {
    pub fn new(
        clock: C,
        random: R,
        client_id_prefix: impl Into<String>,
        credentials: BrokerCredentials,
        retry_delay: Duration,
    ) -> Self {
        Self {
            clock,
            random,
            client_id_prefix: client_id_prefix.into(),
            credentials,
            retry_delay,
            state: LinkState::Disconnected,
            client_id: None,
        }
    }

    pub fn state(&self) -> LinkState {
        self.state
    }

    /// 直近の接続試行で使ったクライアントID
    pub fn client_id(&self) -> Option<&str> {
        self.client_id.as_deref()
    }

    /// 接続されるまでブロックする
    ///
    /// `Transport::is_connected` が `true` を返すまで戻らない。接続に失敗した場合、
    /// または接続要求は成功したが接続状態にならなかった場合は、固定時間待機してから
    /// 新しいクライアントIDで再試行する。
    /// 戻り値は今回行った接続試行の回数 (接続済みなら 0)。
    pub fn ensure_connected<T: Transport>(&mut self, transport: &mut T) -> u32 {
        let mut attempts = 0u32;

        loop {
            if transport.is_connected() {
                self.state = LinkState::Connected;
                return attempts;
            }

            self.state = LinkState::Connecting;
            attempts += 1;

            let client_id = generate_client_id(&self.client_id_prefix, self.random.next_u16());
            info!("MQTTに接続中... (試行{}回目, client_id={})", attempts, client_id);

            let result = transport.connect(&client_id, &self.credentials);
            self.client_id = Some(client_id);

            match result {
                // 接続要求が通っても直後に切断されることがあるため、状態を問い直す
                Ok(()) if transport.is_connected() => {
                    info!("✓ MQTTに接続しました");
                    self.state = LinkState::Connected;
                    return attempts;
                }
                Ok(()) => {
                    self.state = LinkState::Disconnected;
                    warn!(
                        "✗ MQTT接続直後に切断されました。{}秒後に再試行します",
                        self.retry_delay.as_secs_f32()
                    );
                    self.clock.sleep(self.retry_delay);
                }
                Err(e) => {
                    self.state = LinkState::Disconnected;
                    warn!(
                        "✗ MQTT接続失敗: {}。{}秒後に再試行します",
                        e,
                        self.retry_delay.as_secs_f32()
                    );
                    self.clock.sleep(self.retry_delay);
                }
            }
        }
    }
}

/// ブローカー側のID衝突を避けるため、接続毎に乱数付きIDを作る
pub fn generate_client_id(prefix: &str, random: u16) -> String {
    format!("{}{:x}", prefix, random)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_id_uses_lowercase_hex_suffix() {
        assert_eq!(generate_client_id("ESP32CAM-Electric-", 0xBEEF), "ESP32CAM-Electric-beef");
        assert_eq!(generate_client_id("cam-", 0), "cam-0");
    }
}
