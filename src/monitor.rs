use crate::item::ClosetSnapshot;
use crate::scoring::ClosetReport;
use arc_swap::ArcSwap;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Keeps a closet report in step with the item store's change feed.
///
/// Snapshots that arrive while a report is being computed are coalesced;
/// only the newest one is evaluated.
#[derive(Clone)]
pub struct ClosetMonitor {
    latest: Arc<ArcSwap<ClosetReport>>,
}

impl ClosetMonitor {
    pub fn spawn(snapshots: watch::Receiver<ClosetSnapshot>) -> (Self, JoinHandle<()>) {
        Self::spawn_with(snapshots, |_| {})
    }

    pub fn spawn_with<F>(
        mut snapshots: watch::Receiver<ClosetSnapshot>,
        on_report: F,
    ) -> (Self, JoinHandle<()>)
    where
        F: Fn(&ClosetReport) + Send + 'static,
    {
        let initial = ClosetReport::evaluate(&snapshots.borrow_and_update());
        on_report(&initial);
        let latest = Arc::new(ArcSwap::from_pointee(initial));

        let published = latest.clone();
        let handle = tokio::spawn(async move {
            while snapshots.changed().await.is_ok() {
                let report = ClosetReport::evaluate(&snapshots.borrow_and_update());
                info!(
                    score = report.score,
                    grade = %report.grade,
                    items = report.statistics.item_count,
                    "closet rescored"
                );
                on_report(&report);
                published.store(Arc::new(report));
            }
            debug!("item store closed, monitor stopping");
        });

        (Self { latest }, handle)
    }

    pub fn latest(&self) -> Arc<ClosetReport> {
        self.latest.load_full()
    }
}
