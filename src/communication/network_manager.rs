use esp_idf_svc::hal::delay::FreeRtos;
use esp_idf_svc::hal::modem::Modem;
use esp_idf_svc::{
    eventloop::EspSystemEventLoop,
    nvs::EspDefaultNvsPartition,
    wifi::{AuthMethod, BlockingWifi, ClientConfiguration, Configuration, EspWifi},
};
use log::{info, warn};

use crate::core::config::AppConfig;

/// WiFi (STAモード) の初期化と再接続を管理するモジュール
pub struct NetworkManager;

impl NetworkManager {
    /// WiFiをSTAモードで起動し、IPを取得するまでブロックする
    pub fn connect_wifi(
        modem: Modem,
        sysloop: &EspSystemEventLoop,
        nvs_partition: &EspDefaultNvsPartition,
        config: &AppConfig,
    ) -> anyhow::Result<BlockingWifi<EspWifi<'static>>> {
        let mut wifi = BlockingWifi::wrap(
            EspWifi::new(modem, sysloop.clone(), Some(nvs_partition.clone()))?,
            sysloop.clone(),
        )?;

        let auth_method = if config.wifi_password.is_empty() {
            AuthMethod::None
        } else {
            AuthMethod::WPA2Personal
        };

        wifi.set_configuration(&Configuration::Client(ClientConfiguration {
            ssid: config
                .wifi_ssid
                .as_str()
                .try_into()
                .map_err(|_| anyhow::anyhow!("SSIDが長すぎます: {}", config.wifi_ssid))?,
            password: config
                .wifi_password
                .as_str()
                .try_into()
                .map_err(|_| anyhow::anyhow!("WiFiパスワードが長すぎます"))?,
            auth_method,
            ..Default::default()
        }))?;

        wifi.start()?;
        info!("WiFiに接続中 ({})", config.wifi_ssid);

        while let Err(e) = wifi.connect() {
            warn!("WiFi接続待ち: {:?}", e);
            FreeRtos::delay_ms(config.wifi_poll.as_millis() as u32);
        }
        wifi.wait_netif_up()?;

        let ip_info = wifi.wifi().sta_netif().get_ip_info()?;
        info!("✓ WiFi接続完了 IP: {}", ip_info.ip);

        Ok(wifi)
    }

    /// 切断されていれば1回だけ再接続を試みる
    pub fn reconnect_if_needed(wifi: &mut BlockingWifi<EspWifi<'static>>) -> anyhow::Result<()> {
        if wifi.is_connected()? {
            return Ok(());
        }

        warn!("WiFiが切断されています。再接続します");
        wifi.connect()?;
        wifi.wait_netif_up()?;

        let ip_info = wifi.wifi().sta_netif().get_ip_info()?;
        info!("✓ WiFi再接続完了 IP: {}", ip_info.ip);
        Ok(())
    }
}
