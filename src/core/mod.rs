/// コアシステムモジュール
pub mod app_controller;
pub mod clock;
pub mod config;
pub mod config_validation;
pub mod connection_manager;
pub mod delivery;
pub mod scheduler;

pub use app_controller::{AppController, IterationReport};
pub use clock::{Clock, RandomSource};
pub use config::{AppConfig, BrokerCredentials, ConfigError};
pub use config_validation::FrameSize;
pub use connection_manager::{generate_client_id, ConnectionManager, LinkState};
pub use delivery::{CycleOutcome, DeliveryOrchestrator};
pub use scheduler::CaptureScheduler;

#[cfg(any(target_arch = "riscv32", target_arch = "xtensa"))]
pub use clock::{EspClock, EspRandom};
