//! Custom-event listeners and dispatch.

use crate::tree::Dom;
use core::fmt;
use indextree::NodeId;
use log::trace;
use serde_json::Value;
use smallvec::SmallVec;
use std::collections::HashMap;
use std::rc::Rc;

/// Callback invoked for every matching event.
pub type Listener = Rc<dyn Fn(&Event)>;

/// Handle returned by [`Dom::add_event_listener`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// A dispatched event. `detail` carries the structured payload, as a `CustomEvent` does.
#[derive(Clone, Debug)]
pub struct Event {
    pub kind: String,
    pub bubbles: bool,
    pub detail: Value,
    /// Node the event was dispatched on; set by dispatch.
    pub target: Option<NodeId>,
    /// Node whose listener is currently running; set by dispatch.
    pub current_target: Option<NodeId>,
}

impl Event {
    /// A non-bubbling event carrying `detail`.
    pub fn custom(kind: &str, detail: Value) -> Self {
        Self {
            kind: kind.to_owned(),
            bubbles: false,
            detail,
            target: None,
            current_target: None,
        }
    }

    #[must_use]
    pub const fn with_bubbles(mut self, bubbles: bool) -> Self {
        self.bubbles = bubbles;
        self
    }
}

struct Registered {
    id: ListenerId,
    kind: String,
    listener: Listener,
}

#[derive(Default)]
pub(crate) struct ListenerRegistry {
    next_id: u64,
    by_node: HashMap<NodeId, SmallVec<Registered, 2>>,
}

impl ListenerRegistry {
    pub(crate) fn forget(&mut self, node: NodeId) {
        self.by_node.remove(&node);
    }

    fn matching(&self, node: NodeId, kind: &str) -> Vec<Listener> {
        self.by_node
            .get(&node)
            .map(|entries| {
                entries
                    .iter()
                    .filter(|entry| entry.kind == kind)
                    .map(|entry| Rc::clone(&entry.listener))
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl fmt::Debug for ListenerRegistry {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let total: usize = self.by_node.values().map(SmallVec::len).sum();
        formatter
            .debug_struct("ListenerRegistry")
            .field("nodes", &self.by_node.len())
            .field("listeners", &total)
            .finish()
    }
}

impl Dom {
    pub fn add_event_listener(&mut self, node: NodeId, kind: &str, listener: Listener) -> ListenerId {
        let id = ListenerId(self.listeners.next_id);
        self.listeners.next_id = self.listeners.next_id.wrapping_add(1);
        self.listeners
            .by_node
            .entry(node)
            .or_default()
            .push(Registered {
                id,
                kind: kind.to_owned(),
                listener,
            });
        id
    }

    /// Remove one listener. Returns whether it was registered.
    pub fn remove_event_listener(&mut self, node: NodeId, kind: &str, id: ListenerId) -> bool {
        let Some(entries) = self.listeners.by_node.get_mut(&node) else {
            return false;
        };
        let before = entries.len();
        entries.retain(|entry| !(entry.id == id && entry.kind == kind));
        before != entries.len()
    }

    /// Remove every listener of `kind` on `node`. Returns how many were dropped.
    pub fn remove_event_listeners(&mut self, node: NodeId, kind: &str) -> usize {
        let Some(entries) = self.listeners.by_node.get_mut(&node) else {
            return 0;
        };
        let before = entries.len();
        entries.retain(|entry| entry.kind != kind);
        before - entries.len()
    }

    pub fn listener_count(&self, node: NodeId, kind: &str) -> usize {
        self.listeners.matching(node, kind).len()
    }

    /// Dispatch `event` on `target`, walking the parent chain when it bubbles.
    ///
    /// Returns the number of listeners invoked; zero is a silent no-op.
    pub fn dispatch_event(&self, target: NodeId, mut event: Event) -> usize {
        let path = if event.bubbles {
            self.ancestors(target)
        } else {
            vec![target]
        };
        event.target = Some(target);
        let mut invoked = 0;
        for node in path {
            let listeners = self.listeners.matching(node, &event.kind);
            if listeners.is_empty() {
                continue;
            }
            event.current_target = Some(node);
            for listener in listeners {
                listener(&event);
                invoked += 1;
            }
        }
        trace!("dispatched {} on {target:?} to {invoked} listener(s)", event.kind);
        invoked
    }
}
