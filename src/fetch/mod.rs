//! Report fetching: the HTTP client, the concurrent bundle coordinator
//! and fetch-cycle sequencing.

mod client;
mod coordinator;
mod cycle;
mod error;

pub use client::ReportsClient;
pub use coordinator::{fetch_bundle, payload_rows, BundleSource, SourceFuture};
pub use cycle::{BundleStore, CycleError, CycleTicket, CycleTracker, PublishedBundle};
pub use error::SourceError;
