use crate::STICKY_CHANGE;
use dom::{Dom, Event, NodeId};
use log::warn;
use serde::{Deserialize, Serialize};

/// Payload of a `sticky-change` event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StickyChange {
    pub stuck: bool,
    pub target: NodeId,
}

impl StickyChange {
    /// Decode the payload carried by a dispatched event.
    pub fn from_event(event: &Event) -> Result<Self, serde_json::Error> {
        Self::deserialize(&event.detail)
    }
}

/// Dispatch `sticky-change` on `target`. Returns how many listeners ran.
pub fn notify(dom: &Dom, stuck: bool, target: NodeId) -> usize {
    let detail = match serde_json::to_value(StickyChange { stuck, target }) {
        Ok(detail) => detail,
        Err(err) => {
            warn!("could not encode sticky-change for {target:?}: {err}");
            return 0;
        }
    };
    dom.dispatch_event(target, Event::custom(STICKY_CHANGE, detail))
}
