//! Turning crossing reports into stuck/unstuck transitions.
//!
//! A sticky element can pin to the top of its container (scrolling down) or to the bottom
//! (scrolling up). Which one happened is only visible by comparing the sentinel's own box
//! with the container's visible bounds, and the two edges use different rules.

use crate::sentinel::Edge;
use dom::NodeId;
use std::collections::HashMap;
use visibility::CrossingReport;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    StartedSticking,
    StoppedSticking,
    NoChange,
}

impl Transition {
    /// The `stuck` value to announce, `None` for [`Transition::NoChange`].
    #[inline]
    pub const fn stuck(self) -> Option<bool> {
        match self {
            Self::StartedSticking => Some(true),
            Self::StoppedSticking => Some(false),
            Self::NoChange => None,
        }
    }
}

/// Classify a single report of an `edge` sentinel.
pub fn classify(report: &CrossingReport, edge: Edge) -> Transition {
    let sentinel = report.bounding_client_rect;
    let root = report.root_bounds;
    match edge {
        Edge::Top => {
            // Scrolled fully past the visible top.
            if sentinel.bottom() < root.top() {
                Transition::StartedSticking
            } else if sentinel.bottom() < root.bottom() {
                Transition::StoppedSticking
            } else {
                Transition::NoChange
            }
        }
        Edge::Bottom => {
            if sentinel.bottom() > root.top() && report.intersection_ratio >= 1.0 {
                Transition::StartedSticking
            } else if sentinel.top() < root.top() && sentinel.bottom() < root.bottom() {
                // Bottom is only bounded above: zero-height sentinels have top == bottom.
                Transition::StoppedSticking
            } else {
                Transition::NoChange
            }
        }
    }
}

/// Suppresses a sentinel repeating the transition it reported last.
///
/// Sentinels are tracked independently; the top and bottom sentinel of one element are not
/// reconciled against each other.
#[derive(Debug, Default)]
pub struct TransitionTracker {
    last: HashMap<NodeId, Transition>,
}

impl TransitionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `transition` for `sentinel`, returning it unless it repeats the previous one.
    ///
    /// A `NoChange` forgets the previous transition: the sentinel left the region where
    /// either rule applies, so the next qualifying crossing is news again.
    pub fn track(&mut self, sentinel: NodeId, transition: Transition) -> Transition {
        if transition == Transition::NoChange {
            self.last.remove(&sentinel);
            return Transition::NoChange;
        }
        if self.last.insert(sentinel, transition) == Some(transition) {
            return Transition::NoChange;
        }
        transition
    }

    pub fn forget(&mut self, sentinel: NodeId) {
        self.last.remove(&sentinel);
    }
}
