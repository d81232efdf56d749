//! Visibility-crossing observation over the host document.
//!
//! A [`VisibilityMonitor`] watches a set of targets against the visible bounds of a root
//! element. The host calls [`VisibilityMonitor::update`] after layout or scrolling; every
//! target whose visible fraction crossed one of the registered thresholds since the previous
//! update produces a [`CrossingReport`]. Reports are queued in batches and picked up later
//! through the [`ReportStream`], so nothing runs per scroll frame on the consumer side.

#![allow(
    clippy::missing_docs_in_private_items,
    reason = "Internal implementation details don't need public documentation"
)]

mod monitor;
mod report;

pub use monitor::{ObserverError, ObserverOptions, VisibilityMonitor};
pub use report::{CrossingReport, ReportStream};
