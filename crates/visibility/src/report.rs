use dom::{NodeId, Rect};
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::mpsc::error::TryRecvError;

/// One threshold crossing of one target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CrossingReport {
    /// The observed element.
    pub target: NodeId,
    /// Target box relative to the viewport at the time of the crossing.
    pub bounding_client_rect: Rect,
    /// Visible region of the root element.
    pub root_bounds: Rect,
    /// Part of the target inside `root_bounds`; zero-sized when not intersecting.
    pub intersection_rect: Rect,
    /// Visible fraction of the target, `0.0..=1.0`.
    pub intersection_ratio: f32,
    pub is_intersecting: bool,
}

/// Receiving half of a monitor's report queue.
///
/// The queue is unbounded: every [`crate::VisibilityMonitor::update`] that found a crossing adds
/// a batch, so a consumer has to drain after each update. [`ReportStream::pending`] shows the
/// backlog.
#[derive(Debug)]
pub struct ReportStream {
    receiver: UnboundedReceiver<Vec<CrossingReport>>,
}

impl ReportStream {
    pub(crate) const fn new(receiver: UnboundedReceiver<Vec<CrossingReport>>) -> Self {
        Self { receiver }
    }

    /// Drain every pending batch without blocking, oldest first.
    pub fn try_drain(&mut self) -> Vec<CrossingReport> {
        let mut reports = Vec::new();
        loop {
            match self.receiver.try_recv() {
                Ok(batch) => reports.extend(batch),
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => break,
            }
        }
        reports
    }

    /// Number of batches queued and not yet drained.
    pub fn pending(&self) -> usize {
        self.receiver.len()
    }

    /// Wait for the next batch. `None` once the monitor is gone and the queue is empty.
    pub async fn recv(&mut self) -> Option<Vec<CrossingReport>> {
        self.receiver.recv().await
    }
}
