//! Periodic release-gap refresh

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::{ReleaseGap, ReleaseGapFinder, RepoHost, Result};

/// Refreshes the release gap on a fixed interval until cancelled
///
/// The first refresh runs immediately. Refreshes never overlap: the next
/// tick is only awaited once the previous refresh has finished, and ticks
/// missed meanwhile are delayed rather than bunched up.
pub struct ReleaseGapWatcher<H: ?Sized> {
    host: Arc<H>,
    finder: ReleaseGapFinder,
    interval: Duration,
}

impl<H> ReleaseGapWatcher<H>
where
    H: RepoHost + ?Sized + 'static,
{
    pub fn new(host: Arc<H>, finder: ReleaseGapFinder, interval: Duration) -> Self {
        Self {
            host,
            finder,
            interval,
        }
    }

    /// Start refreshing in the background
    ///
    /// Every refresh result is sent on the returned channel. The task ends
    /// when `cancel` fires (an in-flight refresh is dropped) or when the
    /// receiver is dropped.
    pub fn spawn(
        self,
        cancel: CancellationToken,
    ) -> (mpsc::Receiver<Result<ReleaseGap>>, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(1);
        let handle = tokio::spawn(self.run(tx, cancel));
        (rx, handle)
    }

    async fn run(mut self, tx: mpsc::Sender<Result<ReleaseGap>>, cancel: CancellationToken) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {}
            }

            let outcome = tokio::select! {
                _ = cancel.cancelled() => {
                    debug!("Dropping in-flight release gap refresh");
                    break;
                }
                outcome = self.finder.find(self.host.as_ref()) => outcome,
            };

            if let Err(e) = &outcome {
                warn!(error = %e, "Failed to refresh release gap");
            }

            tokio::select! {
                _ = cancel.cancelled() => break,
                sent = tx.send(outcome) => {
                    if sent.is_err() {
                        debug!("Release gap receiver dropped");
                        break;
                    }
                }
            }
        }

        debug!(repo = %self.host.repo(), "Release gap watcher stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{commit, comparison, FakeHost};
    use crate::{GapSettings, Tag};
    use qvet_core::Config;

    fn host() -> FakeHost {
        FakeHost::new()
            .with_branch("master", "abc123")
            .with_tags(vec![Tag {
                name: "prod-42".to_string(),
                commit_sha: "def456".to_string(),
            }])
            .with_comparison(
                "def456",
                "abc123",
                comparison(vec![commit("c2", Some("bob")), commit("c1", Some("alice"))]),
            )
    }

    fn watcher(host: Arc<FakeHost>, interval: Duration) -> ReleaseGapWatcher<FakeHost> {
        let finder = ReleaseGapFinder::new(GapSettings::from(&Config::default()));
        ReleaseGapWatcher::new(host, finder, interval)
    }

    #[tokio::test]
    async fn test_first_refresh_is_immediate() {
        let host = Arc::new(host());
        let cancel = CancellationToken::new();
        let (mut rx, handle) = watcher(host, Duration::from_secs(3600)).spawn(cancel.clone());

        let gap = rx.recv().await.unwrap().unwrap();
        assert_eq!(gap.head_sha(), "abc123");

        cancel.cancel();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_refreshes_repeatedly_and_reuses_comparison() {
        let host = Arc::new(host());
        let cancel = CancellationToken::new();
        let (mut rx, handle) =
            watcher(host.clone(), Duration::from_millis(10)).spawn(cancel.clone());

        for _ in 0..3 {
            assert!(rx.recv().await.unwrap().is_ok());
        }
        cancel.cancel();
        handle.await.unwrap();

        assert_eq!(host.compare_calls(), 1);
    }

    #[tokio::test]
    async fn test_errors_are_delivered_and_polling_continues() {
        let host = Arc::new(FakeHost::new().failing());
        let cancel = CancellationToken::new();
        let (mut rx, handle) = watcher(host, Duration::from_millis(10)).spawn(cancel.clone());

        for _ in 0..2 {
            let err = rx.recv().await.unwrap().unwrap_err();
            assert!(err.is_upstream());
        }

        cancel.cancel();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_cancel_closes_channel() {
        let host = Arc::new(host());
        let cancel = CancellationToken::new();
        let (mut rx, handle) = watcher(host, Duration::from_secs(3600)).spawn(cancel.clone());

        rx.recv().await.unwrap().unwrap();
        cancel.cancel();
        handle.await.unwrap();

        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_cancel_drops_in_flight_refresh() {
        let host = Arc::new(host().with_branch_delay(Duration::from_secs(3600)));
        let cancel = CancellationToken::new();
        let (mut rx, handle) =
            watcher(host.clone(), Duration::from_secs(3600)).spawn(cancel.clone());

        // Let the first refresh start and block on the branch lookup
        tokio::time::sleep(Duration::from_millis(50)).await;
        cancel.cancel();

        tokio::time::timeout(Duration::from_secs(2), handle)
            .await
            .expect("watcher did not stop after cancellation")
            .unwrap();
        assert!(rx.recv().await.is_none());
        assert_eq!(host.branch_lookups_finished(), 0);
    }

    #[tokio::test]
    async fn test_stops_when_receiver_dropped() {
        let host = Arc::new(host());
        let (rx, handle) =
            watcher(host, Duration::from_millis(10)).spawn(CancellationToken::new());

        drop(rx);
        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .unwrap()
            .unwrap();
    }
}
