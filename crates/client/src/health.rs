use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use model::health::HealthStatus;
use serde::Serialize;
use tokio::{
    sync::watch,
    task::JoinHandle,
    time::{self, MissedTickBehavior},
};
use tokio_util::sync::CancellationToken;

use crate::ApiClient;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    pub status: HealthStatus,
    pub error: Option<String>,
    #[serde(with = "utility::serde::option_duration_millis")]
    pub response_time: Option<Duration>,
}

impl HealthReport {
    pub fn up(response_time: Duration) -> Self {
        Self {
            status: HealthStatus::Up,
            error: None,
            response_time: Some(response_time),
        }
    }

    pub fn down<S: Into<String>>(error: S, response_time: Option<Duration>) -> Self {
        Self {
            status: HealthStatus::Down,
            error: Some(error.into()),
            response_time,
        }
    }

    pub fn is_up(&self) -> bool {
        self.status == HealthStatus::Up
    }
}

#[async_trait]
pub trait HealthProbe: Send + Sync + 'static {
    async fn probe(&self) -> HealthReport;
}

#[async_trait]
impl HealthProbe for ApiClient {
    async fn probe(&self) -> HealthReport {
        self.health().await
    }
}

/// Polls a [`HealthProbe`] on a fixed interval in the background.
pub struct HealthMonitor {
    receiver: watch::Receiver<Option<HealthReport>>,
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl HealthMonitor {
    pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(30);

    /// Starts polling immediately, then once per `interval`, until `cancel`
    /// fires or [`HealthMonitor::stop`] is called.
    pub fn spawn<P: HealthProbe>(
        probe: Arc<P>,
        interval: Duration,
        cancel: CancellationToken,
    ) -> Self {
        let (sender, receiver) = watch::channel(None);
        let token = cancel.clone();

        let handle = tokio::spawn(async move {
            let mut ticker = time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => break,
                    _ = ticker.tick() => {
                        let report = probe.probe().await;
                        if !report.is_up() {
                            log::warn!("health check failed: {:?}", report.error);
                        }
                        if sender.send(Some(report)).is_err() {
                            break;
                        }
                    }
                }
            }
            log::debug!("health monitor stopped.");
        });

        Self {
            receiver,
            cancel,
            handle,
        }
    }

    /// The most recent report, `None` until the first poll finished.
    pub fn latest(&self) -> Option<HealthReport> {
        self.receiver.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<HealthReport>> {
        self.receiver.clone()
    }

    pub async fn stop(self) {
        self.cancel.cancel();
        if let Err(why) = self.handle.await {
            log::error!("health monitor task failed: {:?}", why);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    struct CountingProbe {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl HealthProbe for CountingProbe {
        async fn probe(&self) -> HealthReport {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call == 0 {
                HealthReport::up(Duration::from_millis(3))
            } else {
                HealthReport::down("HTTP 503", Some(Duration::from_millis(1)))
            }
        }
    }

    #[tokio::test]
    async fn monitor_publishes_each_poll() {
        let probe = Arc::new(CountingProbe {
            calls: AtomicUsize::new(0),
        });
        let monitor = HealthMonitor::spawn(
            probe.clone(),
            Duration::from_millis(10),
            CancellationToken::new(),
        );
        let mut updates = monitor.subscribe();

        time::timeout(Duration::from_secs(2), updates.changed())
            .await
            .unwrap()
            .unwrap();
        let first = updates.borrow_and_update().clone().unwrap();
        assert!(first.is_up());

        time::timeout(Duration::from_secs(2), updates.changed())
            .await
            .unwrap()
            .unwrap();
        let second = updates.borrow_and_update().clone().unwrap();
        assert_eq!(second.error.as_deref(), Some("HTTP 503"));

        monitor.stop().await;
        assert!(probe.calls.load(Ordering::SeqCst) >= 2);
    }

    #[tokio::test]
    async fn cancelled_monitor_stops_polling() {
        let probe = Arc::new(CountingProbe {
            calls: AtomicUsize::new(0),
        });
        let cancel = CancellationToken::new();
        cancel.cancel();

        let monitor = HealthMonitor::spawn(probe.clone(), Duration::from_millis(5), cancel);
        monitor.stop().await;
        time::sleep(Duration::from_millis(30)).await;

        assert_eq!(probe.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn report_serializes_millis() {
        let report = HealthReport::up(Duration::from_millis(42));
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["status"], "UP");
        assert_eq!(json["responseTime"], 42);
        assert!(json["error"].is_null());
    }
}
