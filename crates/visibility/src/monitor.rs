use crate::report::{CrossingReport, ReportStream};
use core::fmt::{Display, Formatter, Result as FmtResult};
use dom::{Dom, NodeId, Rect};
use log::{debug, warn};
use smallvec::SmallVec;
use std::error::Error;
use tokio::sync::mpsc::{UnboundedSender, unbounded_channel};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ObserverError {
    /// Thresholds must be finite and within `0.0..=1.0`.
    InvalidThreshold(f32),
}

impl Display for ObserverError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::InvalidThreshold(value) => {
                write!(f, "RangeError: threshold {value} is outside 0.0..=1.0")
            }
        }
    }
}

impl Error for ObserverError {}

/// Construction parameters for a [`VisibilityMonitor`].
#[derive(Debug, Clone)]
pub struct ObserverOptions {
    /// Element whose visible bounds targets are measured against.
    pub root: NodeId,
    pub thresholds: Vec<f32>,
}

impl ObserverOptions {
    pub fn new(root: NodeId) -> Self {
        Self {
            root,
            thresholds: vec![0.0],
        }
    }

    #[must_use]
    pub fn with_thresholds(mut self, thresholds: &[f32]) -> Self {
        self.thresholds = thresholds.to_vec();
        self
    }
}

#[derive(Debug)]
struct Observation {
    target: NodeId,
    /// Threshold index and intersecting flag seen at the last report.
    previous: Option<(usize, bool)>,
}

/// Watches targets against a root and queues a report on every threshold crossing.
#[derive(Debug)]
pub struct VisibilityMonitor {
    root: NodeId,
    thresholds: SmallVec<f32, 2>,
    observations: Vec<Observation>,
    sender: UnboundedSender<Vec<CrossingReport>>,
}

impl VisibilityMonitor {
    /// Create a monitor and the stream its reports are delivered on.
    pub fn new(options: ObserverOptions) -> Result<(Self, ReportStream), ObserverError> {
        let mut values = options.thresholds;
        if let Some(bad) = values
            .iter()
            .find(|value| !value.is_finite() || !(0.0..=1.0).contains(*value))
        {
            return Err(ObserverError::InvalidThreshold(*bad));
        }
        if values.is_empty() {
            values.push(0.0);
        }
        values.sort_by(f32::total_cmp);
        values.dedup();
        let thresholds: SmallVec<f32, 2> = values.into_iter().collect();

        let (sender, receiver) = unbounded_channel();
        Ok((
            Self {
                root: options.root,
                thresholds,
                observations: Vec::new(),
                sender,
            },
            ReportStream::new(receiver),
        ))
    }

    #[inline]
    pub const fn root(&self) -> NodeId {
        self.root
    }

    pub fn thresholds(&self) -> &[f32] {
        &self.thresholds
    }

    /// Start watching `target`. Watching twice is a no-op.
    pub fn observe(&mut self, target: NodeId) {
        if self.is_observing(target) {
            return;
        }
        self.observations.push(Observation {
            target,
            previous: None,
        });
    }

    pub fn unobserve(&mut self, target: NodeId) -> bool {
        let before = self.observations.len();
        self.observations.retain(|observation| observation.target != target);
        before != self.observations.len()
    }

    /// Stop watching every target. Already queued reports stay on the stream.
    pub fn disconnect(&mut self) {
        self.observations.clear();
    }

    pub fn is_observing(&self, target: NodeId) -> bool {
        self.observations
            .iter()
            .any(|observation| observation.target == target)
    }

    pub fn observed(&self) -> Vec<NodeId> {
        self.observations
            .iter()
            .map(|observation| observation.target)
            .collect()
    }

    /// Index of the first threshold above `ratio`, or the threshold count.
    fn threshold_index(&self, ratio: f32, is_intersecting: bool) -> usize {
        if !is_intersecting {
            return 0;
        }
        self.thresholds
            .iter()
            .position(|threshold| *threshold > ratio)
            .unwrap_or(self.thresholds.len())
    }

    fn measure(&self, dom: &Dom, target: NodeId, root_bounds: Rect) -> Option<CrossingReport> {
        if !dom.is_inclusive_descendant(target, self.root) {
            return None;
        }
        let bounding_client_rect = dom.bounding_client_rect(target)?;
        let hit = bounding_client_rect.intersection(&root_bounds);
        let target_area = bounding_client_rect.area();
        // Containment is decided on the edges: the area quotient drifts below 1.0 at
        // fractional offsets.
        let intersection_ratio = match hit {
            Some(_) if root_bounds.contains(&bounding_client_rect) => 1.0,
            Some(rect) if target_area > 0.0 => (rect.area() / target_area).clamp(0.0, 1.0),
            Some(_) => 1.0,
            None => 0.0,
        };
        Some(CrossingReport {
            target,
            bounding_client_rect,
            root_bounds,
            intersection_rect: hit.unwrap_or_default(),
            intersection_ratio,
            is_intersecting: hit.is_some(),
        })
    }

    /// Run one observation step against the current layout.
    ///
    /// Returns how many reports were queued. Targets that are detached, not laid out or
    /// outside the root's subtree are skipped without touching their state.
    pub fn update(&mut self, dom: &Dom) -> usize {
        let Some(root_bounds) = dom.bounding_client_rect(self.root) else {
            debug!("visibility root {:?} is not laid out; skipping update", self.root);
            return 0;
        };

        let mut batch = Vec::new();
        for index in 0..self.observations.len() {
            let target = self.observations[index].target;
            let Some(report) = self.measure(dom, target, root_bounds) else {
                debug!("ignoring detached or unmeasured target {target:?}");
                continue;
            };
            let state = (
                self.threshold_index(report.intersection_ratio, report.is_intersecting),
                report.is_intersecting,
            );
            let observation = &mut self.observations[index];
            if observation.previous != Some(state) {
                observation.previous = Some(state);
                batch.push(report);
            }
        }

        let queued = batch.len();
        if queued > 0 && self.sender.send(batch).is_err() {
            warn!("report stream for root {:?} was dropped", self.root);
            return 0;
        }
        queued
    }
}
