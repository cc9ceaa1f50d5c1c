/// 通信機能 (送信経路の抽象、MQTT、WiFi)
pub mod transport;

#[cfg(any(target_arch = "riscv32", target_arch = "xtensa"))]
pub mod mqtt_transport;
#[cfg(any(target_arch = "riscv32", target_arch = "xtensa"))]
pub mod network_manager;

pub use transport::{Transport, TransportError};

#[cfg(any(target_arch = "riscv32", target_arch = "xtensa"))]
pub use mqtt_transport::MqttTransport;
#[cfg(any(target_arch = "riscv32", target_arch = "xtensa"))]
pub use network_manager::NetworkManager;
