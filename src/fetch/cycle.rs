//! Fetch-cycle sequencing.
//!
//! Every refresh begins a numbered cycle. A cycle may publish its bundle
//! only while it is still the latest one begun, so an older, slower
//! cycle can never overwrite what a newer cycle produced.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use crate::models::ReportBundle;

use super::coordinator::{fetch_bundle, BundleSource};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CycleError {
    #[error("Fetch cycle {cycle} superseded by cycle {latest}")]
    Stale { cycle: u64, latest: u64 },

    #[error("Internal lock error")]
    LockPoisoned,
}

/// Proof that a cycle was begun; carries its sequence number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CycleTicket(u64);

impl CycleTicket {
    pub fn seq(&self) -> u64 {
        self.0
    }
}

/// A bundle together with the cycle that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct PublishedBundle {
    pub cycle: u64,
    pub bundle: ReportBundle,
}

/// Hands out monotonically increasing cycle tickets.
#[derive(Debug, Default)]
pub struct CycleTracker {
    /// Sequence number of the latest cycle begun. 0 = none yet.
    latest: AtomicU64,
}

impl CycleTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new cycle. Any cycle begun earlier becomes stale.
    pub fn begin(&self) -> CycleTicket {
        let seq = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::debug!(cycle = seq, "Fetch cycle begun");
        CycleTicket(seq)
    }

    /// Sequence number of the latest cycle begun.
    pub fn latest(&self) -> u64 {
        self.latest.load(Ordering::SeqCst)
    }

    pub fn is_current(&self, ticket: CycleTicket) -> bool {
        ticket.0 == self.latest()
    }
}

/// Holds the most recent bundle published by a current cycle.
#[derive(Debug, Default)]
pub struct BundleStore {
    tracker: CycleTracker,
    published: Mutex<Option<PublishedBundle>>,
}

impl BundleStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin_cycle(&self) -> CycleTicket {
        self.tracker.begin()
    }

    pub fn latest_cycle(&self) -> u64 {
        self.tracker.latest()
    }

    pub fn is_current(&self, ticket: CycleTicket) -> bool {
        self.tracker.is_current(ticket)
    }

    /// Publish `bundle` for `ticket`'s cycle.
    ///
    /// Fails with [`CycleError::Stale`] when a newer cycle has begun since;
    /// the stored bundle is left untouched in that case.
    pub fn publish(&self, ticket: CycleTicket, bundle: ReportBundle) -> Result<(), CycleError> {
        let mut slot = self.published.lock().map_err(|_| CycleError::LockPoisoned)?;

        let latest = self.latest_cycle();
        let older_than_stored = slot.as_ref().is_some_and(|p| p.cycle > ticket.0);
        if ticket.0 != latest || older_than_stored {
            tracing::debug!(cycle = ticket.0, latest, "Discarding result of stale fetch cycle");
            return Err(CycleError::Stale { cycle: ticket.0, latest });
        }

        tracing::info!(cycle = ticket.0, sections = bundle.len(), "Report bundle published");
        *slot = Some(PublishedBundle { cycle: ticket.0, bundle });
        Ok(())
    }

    /// The last published bundle, if any cycle has published yet.
    pub fn current(&self) -> Result<Option<PublishedBundle>, CycleError> {
        let slot = self.published.lock().map_err(|_| CycleError::LockPoisoned)?;
        Ok(slot.clone())
    }

    /// Fetch and publish under an already-begun cycle.
    pub async fn run_cycle(
        &self,
        ticket: CycleTicket,
        sources: Vec<BundleSource<'_>>,
        deadline: Option<Duration>,
    ) -> Result<ReportBundle, CycleError> {
        let bundle = fetch_bundle(sources, deadline).await;
        self.publish(ticket, bundle.clone())?;
        Ok(bundle)
    }

    /// Begin a cycle, fetch, and publish.
    pub async fn refresh(
        &self,
        sources: Vec<BundleSource<'_>>,
        deadline: Option<Duration>,
    ) -> Result<ReportBundle, CycleError> {
        let ticket = self.begin_cycle();
        self.run_cycle(ticket, sources, deadline).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::SourceError;
    use crate::models::ReportKind;
    use serde_json::{json, Value};
    use std::sync::Arc;

    fn bundle_with(rows: usize) -> ReportBundle {
        let mut bundle = ReportBundle::empty([ReportKind::StockoutTrend]);
        bundle.insert(
            ReportKind::StockoutTrend,
            (0..rows).map(|i| json!({"predicted": i}).into()).collect(),
        );
        bundle
    }

    #[test]
    fn tickets_are_monotonic() {
        let store = BundleStore::new();
        assert_eq!(store.latest_cycle(), 0);
        let a = store.begin_cycle();
        let b = store.begin_cycle();
        assert!(b > a);
        assert_eq!(b.seq(), 2);
        assert!(!store.is_current(a));
        assert!(store.is_current(b));
    }

    #[test]
    fn current_cycle_publishes() {
        let store = BundleStore::new();
        assert!(store.current().unwrap().is_none());
        let ticket = store.begin_cycle();
        store.publish(ticket, bundle_with(2)).unwrap();
        let published = store.current().unwrap().unwrap();
        assert_eq!(published.cycle, 1);
        assert_eq!(published.bundle.rows(ReportKind::StockoutTrend).len(), 2);
    }

    #[test]
    fn stale_cycle_cannot_overwrite_newer_bundle() {
        let store = BundleStore::new();
        let first = store.begin_cycle();
        let second = store.begin_cycle();

        store.publish(second, bundle_with(3)).unwrap();
        let err = store.publish(first, bundle_with(9)).unwrap_err();
        assert_eq!(err, CycleError::Stale { cycle: 1, latest: 2 });

        let published = store.current().unwrap().unwrap();
        assert_eq!(published.cycle, 2);
        assert_eq!(published.bundle.rows(ReportKind::StockoutTrend).len(), 3);
    }

    #[test]
    fn stale_cycle_rejected_even_before_newer_one_publishes() {
        let store = BundleStore::new();
        let first = store.begin_cycle();
        let _second = store.begin_cycle();
        assert!(store.publish(first, bundle_with(1)).is_err());
        assert!(store.current().unwrap().is_none());
    }

    #[tokio::test]
    async fn slow_earlier_refresh_is_discarded() {
        let store = Arc::new(BundleStore::new());
        let (release, gate) = tokio::sync::oneshot::channel::<Value>();

        let first_ticket = store.begin_cycle();
        let slow = {
            let store = Arc::clone(&store);
            tokio::spawn(async move {
                let source = BundleSource::new(ReportKind::StockoutTrend, async move {
                    gate.await.map_err(|_| SourceError::Transport("gate dropped".into()))
                });
                store.run_cycle(first_ticket, vec![source], None).await
            })
        };

        let fresh = store
            .refresh(
                vec![BundleSource::new(ReportKind::StockoutTrend, async {
                    Ok(json!([{"predicted": 1}]))
                })],
                None,
            )
            .await
            .unwrap();
        assert_eq!(fresh.rows(ReportKind::StockoutTrend).len(), 1);

        release.send(json!([{"predicted": 7}, {"predicted": 8}])).unwrap();
        let outcome = slow.await.unwrap();
        assert_eq!(outcome, Err(CycleError::Stale { cycle: 1, latest: 2 }));

        let published = store.current().unwrap().unwrap();
        assert_eq!(published.cycle, 2);
        assert_eq!(published.bundle, fresh);
    }
}
