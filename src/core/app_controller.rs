use std::sync::Arc;

use log::info;

use crate::communication::transport::Transport;
use crate::core::clock::{Clock, RandomSource};
use crate::core::config::AppConfig;
use crate::core::connection_manager::ConnectionManager;
use crate::core::delivery::{CycleOutcome, DeliveryOrchestrator};
use crate::core::scheduler::CaptureScheduler;
use crate::hardware::camera::FrameSource;
use crate::hardware::led::StatusIndicator;

/// 監視ループ1回分の記録
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IterationReport {
    /// ループ先頭での再接続試行回数
    pub reconnect_attempts: u32,
    /// 撮影周期が来た場合の結果
    pub cycle: Option<CycleOutcome>,
}

/// アプリケーションの主要な制御フローを管理する
///
/// すべての状態をこの構造体が持ち、単一スレッドのループから順に呼び出す。
pub struct AppController<S, T, L, C, R>
where
    S: FrameSource,
    T: Transport,
    L: StatusIndicator,
    C: Clock,
    R: RandomSource,
{
    camera: S,
    transport: T,
    led: L,
    clock: C,
    config: Arc<AppConfig>,
    scheduler: CaptureScheduler,
    connection: ConnectionManager<C, R>,
    orchestrator: DeliveryOrchestrator,
}

impl<S, T, L, C, R> AppController<S, T, L, C, R>
where
    S: FrameSource,
    T: Transport,
    L: StatusIndicator,
    C: Clock + Clone,
    R: RandomSource,
{
    pub fn new(
        config: &Arc<AppConfig>,
        camera: S,
        transport: T,
        led: L,
        clock: C,
        random: R,
    ) -> Self {
        let connection = ConnectionManager::new(
            clock.clone(),
            random,
            config.client_id_prefix.clone(),
            config.credentials.clone(),
            config.reconnect_delay,
        );

        Self {
            camera,
            transport,
            led,
            clock,
            config: Arc::clone(config),
            scheduler: CaptureScheduler::new(config.capture_interval),
            connection,
            orchestrator: DeliveryOrchestrator::new(config.mqtt_topic.clone()),
        }
    }

    /// ループ1回分: 接続確認 → バックグラウンド処理 → 周期判定 → 撮影送信 → 待機
    ///
    /// この順序を入れ替えると切断中の送信経路にPUBLISHしてしまう。
    pub fn run_once(&mut self) -> IterationReport {
        let reconnect_attempts = self.connection.ensure_connected(&mut self.transport);
        self.transport.service();

        let cycle = if self.scheduler.tick(self.clock.now()) {
            let outcome = self.orchestrator.capture_and_send(
                &mut self.camera,
                &mut self.transport,
                &mut self.connection,
                &mut self.led,
            );
            info!(
                "次の撮影まで {}秒",
                self.scheduler.time_until_due(self.clock.now()).as_secs()
            );
            Some(outcome)
        } else {
            None
        };

        self.clock.sleep(self.config.loop_idle);

        IterationReport {
            reconnect_attempts,
            cycle,
        }
    }

    /// 監視ループ (戻らない)
    pub fn run(&mut self) -> ! {
        info!(
            "=== {}: 監視ループを開始します (撮影間隔 {}秒) ===",
            self.config.device_name,
            self.scheduler.interval().as_secs()
        );
        loop {
            self.run_once();
        }
    }

    pub fn scheduler(&self) -> &CaptureScheduler {
        &self.scheduler
    }

    pub fn connection(&self) -> &ConnectionManager<C, R> {
        &self.connection
    }
}
