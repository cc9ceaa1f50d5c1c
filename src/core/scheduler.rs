use std::time::Duration;

/// 撮影タイミングを判定するスケジューラ
///
/// 前回の撮影開始時刻だけを保持し、遅れた周期を後から取り戻すことはしない。
#[derive(Debug, Clone)]
pub struct CaptureScheduler {
    interval: Duration,
    last_capture: Option<Duration>,
}

impl CaptureScheduler {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_capture: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// 直近で撮影を開始した時刻 (未撮影なら `None`)
    pub fn last_capture(&self) -> Option<Duration> {
        self.last_capture
    }

    /// 撮影周期に達していれば開始時刻を記録して `true` を返す
    ///
    /// 記録は撮影前に行うため、送信が長引いても連続して再トリガーされない。
    pub fn tick(&mut self, now: Duration) -> bool {
        let due = match self.last_capture {
            None => true,
            Some(last) => now.saturating_sub(last) >= self.interval,
        };

        if due {
            // 時計が巻き戻っても記録は単調増加のまま
            let next = self.last_capture.map_or(now, |last| last.max(now));
            self.last_capture = Some(next);
        }
        due
    }

    /// 次の撮影までの残り時間
    pub fn time_until_due(&self, now: Duration) -> Duration {
        match self.last_capture {
            None => Duration::ZERO,
            Some(last) => (last + self.interval).saturating_sub(now),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INTERVAL: Duration = Duration::from_millis(300_000);

    #[test]
    fn test_first_tick_triggers_immediately() {
        let mut scheduler = CaptureScheduler::new(INTERVAL);
        assert!(scheduler.tick(Duration::ZERO));
        assert_eq!(scheduler.last_capture(), Some(Duration::ZERO));
    }

    #[test]
    fn test_interval_boundary() {
        let mut scheduler = CaptureScheduler::new(INTERVAL);
        assert!(scheduler.tick(Duration::ZERO));
        assert!(!scheduler.tick(Duration::from_millis(299_999)));
        assert_eq!(scheduler.last_capture(), Some(Duration::ZERO));
        assert!(scheduler.tick(Duration::from_millis(300_000)));
        assert_eq!(scheduler.last_capture(), Some(Duration::from_millis(300_000)));
    }

    #[test]
    fn test_overrun_does_not_backfill_missed_cycles() {
        let mut scheduler = CaptureScheduler::new(INTERVAL);
        assert!(scheduler.tick(Duration::ZERO));
        // 3周期分遅れても1回だけ
        assert!(scheduler.tick(Duration::from_millis(1_000_000)));
        assert!(!scheduler.tick(Duration::from_millis(1_000_001)));
        assert_eq!(
            scheduler.time_until_due(Duration::from_millis(1_000_001)),
            Duration::from_millis(299_999)
        );
    }

    #[test]
    fn test_clock_going_backwards_keeps_last_capture_monotonic() {
        let mut scheduler = CaptureScheduler::new(Duration::from_millis(10));
        assert!(scheduler.tick(Duration::from_millis(100)));
        assert!(!scheduler.tick(Duration::from_millis(50)));
        assert_eq!(scheduler.last_capture(), Some(Duration::from_millis(100)));
    }

    #[test]
    fn test_trigger_iff_interval_elapsed() {
        let mut scheduler = CaptureScheduler::new(Duration::from_millis(7));
        let mut last: Option<u64> = None;
        for t in (0..200u64).step_by(3) {
            let expected = last.map_or(true, |l| t - l >= 7);
            assert_eq!(scheduler.tick(Duration::from_millis(t)), expected, "t={}", t);
            if expected {
                last = Some(t);
            }
            assert_eq!(scheduler.last_capture(), last.map(Duration::from_millis));
        }
    }
}
