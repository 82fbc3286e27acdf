//! Background expiry sweep
//!
//! A managed task owned by the service lifecycle: started once, sweeps on a
//! fixed interval through [`AccessService::sweep_expired`], and stops on an
//! explicit signal so tests and shutdown paths can end it deterministically.
//! A storage failure during one cycle is logged and retried on the next.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::domain::key::KeyRecordRepository;

use super::service::AccessService;

/// Default sweep interval: 1 hour
pub const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 3_600;

/// Spawner for the background expiry sweep
pub struct Reaper;

impl Reaper {
    /// Spawn the sweep loop; the first sweep runs immediately
    pub fn spawn<R>(service: Arc<AccessService<R>>, interval: Duration) -> ReaperHandle
    where
        R: KeyRecordRepository + 'static,
    {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        match service.sweep_expired().await {
                            Ok(removed) => debug!(removed, "Reaper sweep finished"),
                            Err(e) => {
                                warn!("Reaper sweep failed, retrying next cycle: {}", e);
                            }
                        }
                    }
                    _ = shutdown_rx.changed() => {
                        info!("Reaper stopped");
                        break;
                    }
                }
            }
        });

        ReaperHandle {
            shutdown: shutdown_tx,
            task,
        }
    }
}

/// Handle owning the running sweep task
pub struct ReaperHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl ReaperHandle {
    /// Signal the sweep loop to stop and wait for it to finish
    pub async fn stop(self) {
        let _ = self.shutdown.send(true);
        let _ = self.task.await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::key::{ClientAddr, ExpiryPolicy, KeyRecord, MockKeyRecordRepository};
    use crate::infrastructure::key::repository::InMemoryKeyRecordRepository;
    use chrono::Utc;

    fn addr(s: &str) -> ClientAddr {
        ClientAddr::new(s).unwrap()
    }

    fn expired_record(address: &str) -> KeyRecord {
        KeyRecord::new(addr(address), "aB3dE6gH9k")
            .with_created_at(Utc::now() - chrono::Duration::seconds(120))
    }

    #[tokio::test(start_paused = true)]
    async fn test_reaper_sweeps_expired_records() {
        let repo = Arc::new(InMemoryKeyRecordRepository::new());
        let service = Arc::new(
            AccessService::new(repo.clone()).with_policy(ExpiryPolicy::from_secs(60)),
        );

        repo.upsert(expired_record("10.0.0.1")).await.unwrap();
        repo.upsert(KeyRecord::new(addr("10.0.0.2"), "zY8xW5vU2t"))
            .await
            .unwrap();

        let handle = Reaper::spawn(service.clone(), Duration::from_secs(3_600));

        // Let the immediate first sweep run.
        tokio::time::sleep(Duration::from_millis(10)).await;

        let all = service.list_all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].address().as_str(), "10.0.0.2");

        handle.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_reaper_sweeps_again_after_interval() {
        let repo = Arc::new(InMemoryKeyRecordRepository::new());
        let service = Arc::new(
            AccessService::new(repo.clone()).with_policy(ExpiryPolicy::from_secs(60)),
        );

        let handle = Reaper::spawn(service.clone(), Duration::from_secs(3_600));
        tokio::time::sleep(Duration::from_millis(10)).await;

        // Appears after the first sweep, already expired.
        repo.upsert(expired_record("10.0.0.1")).await.unwrap();
        assert_eq!(service.count().await.unwrap(), 1);

        tokio::time::sleep(Duration::from_secs(3_601)).await;

        assert_eq!(service.count().await.unwrap(), 0);

        handle.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_stopped_reaper_does_not_sweep() {
        let repo = Arc::new(InMemoryKeyRecordRepository::new());
        let service = Arc::new(
            AccessService::new(repo.clone()).with_policy(ExpiryPolicy::from_secs(60)),
        );

        let handle = Reaper::spawn(service.clone(), Duration::from_secs(3_600));
        tokio::time::sleep(Duration::from_millis(10)).await;
        handle.stop().await;

        repo.upsert(expired_record("10.0.0.1")).await.unwrap();
        tokio::time::sleep(Duration::from_secs(7_200)).await;

        assert_eq!(service.count().await.unwrap(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reaper_survives_storage_failure() {
        let repo = Arc::new(MockKeyRecordRepository::new());
        let service = Arc::new(
            AccessService::new(repo.clone()).with_policy(ExpiryPolicy::from_secs(60)),
        );

        repo.set_should_fail(true).await;

        let handle = Reaper::spawn(service.clone(), Duration::from_secs(3_600));
        tokio::time::sleep(Duration::from_millis(10)).await;

        // The failing cycle must not kill the loop; the next one recovers.
        repo.set_should_fail(false).await;
        repo.upsert(expired_record("10.0.0.1")).await.unwrap();

        tokio::time::sleep(Duration::from_secs(3_601)).await;

        assert_eq!(service.count().await.unwrap(), 0);

        handle.stop().await;
    }
}
