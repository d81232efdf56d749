use crate::events::ListenerRegistry;
use crate::geometry::{Rect, ScrollOffset};
use anyhow::{Error, anyhow};
use indextree::{Arena, Node, NodeId};
use smallvec::SmallVec;

#[derive(Debug, Clone, Default)]
pub enum NodeKind {
    #[default]
    Document,
    Element {
        tag: String,
    },
    Text {
        text: String,
    },
}

/// Per-node payload stored in the arena.
#[derive(Debug, Clone, Default)]
pub struct DomNode {
    pub kind: NodeKind,
    pub attrs: SmallVec<(String, String), 4>,
    /// Document-space box produced by layout, if the node has been laid out.
    pub layout: Option<Rect>,
    /// Scroll position when the node is a scroll container.
    pub scroll: ScrollOffset,
}

/// An arena-backed document tree with geometry and event listeners.
pub struct Dom {
    pub(crate) arena: Arena<DomNode>,
    root: NodeId,
    pub(crate) listeners: ListenerRegistry,
}

impl Default for Dom {
    fn default() -> Self {
        Self::new()
    }
}

impl Dom {
    pub fn new() -> Self {
        let mut arena = Arena::new();
        Self {
            root: arena.new_node(DomNode::default()),
            arena,
            listeners: ListenerRegistry::default(),
        }
    }

    /// The document node.
    #[inline]
    pub const fn root(&self) -> NodeId {
        self.root
    }

    fn live(&self, node: NodeId) -> Option<&Node<DomNode>> {
        let entry = self.arena.get(node)?;
        (!node.is_removed(&self.arena)).then_some(entry)
    }

    fn live_mut(&mut self, node: NodeId) -> Result<&mut DomNode, Error> {
        if self.arena.get(node).is_none() || node.is_removed(&self.arena) {
            return Err(anyhow!("{node:?} is not part of this document"));
        }
        self.arena
            .get_mut(node)
            .map(Node::get_mut)
            .ok_or_else(|| anyhow!("{node:?} is not part of this document"))
    }

    /// Node payload, `None` once the node has been removed.
    pub fn node(&self, node: NodeId) -> Option<&DomNode> {
        self.live(node).map(Node::get)
    }

    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.arena.new_node(DomNode {
            kind: NodeKind::Element {
                tag: tag.to_ascii_lowercase(),
            },
            ..DomNode::default()
        })
    }

    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.arena.new_node(DomNode {
            kind: NodeKind::Text {
                text: text.to_owned(),
            },
            ..DomNode::default()
        })
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), Error> {
        parent.checked_append(child, &mut self.arena)?;
        Ok(())
    }

    /// Insert `node` as the previous sibling of `reference`.
    pub fn insert_before(&mut self, reference: NodeId, node: NodeId) -> Result<(), Error> {
        reference.checked_insert_before(node, &mut self.arena)?;
        Ok(())
    }

    /// Insert `node` as the next sibling of `reference`.
    pub fn insert_after(&mut self, reference: NodeId, node: NodeId) -> Result<(), Error> {
        reference.checked_insert_after(node, &mut self.arena)?;
        Ok(())
    }

    /// Unlink `node` from its parent but keep it alive.
    pub fn detach(&mut self, node: NodeId) {
        if self.live(node).is_some() {
            node.detach(&mut self.arena);
        }
    }

    /// Remove `node` and its whole subtree, dropping their listeners.
    pub fn remove(&mut self, node: NodeId) {
        if self.live(node).is_none() {
            return;
        }
        let doomed: Vec<NodeId> = node.descendants(&self.arena).collect();
        for id in doomed {
            self.listeners.forget(id);
        }
        node.remove_subtree(&mut self.arena);
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.live(node)?.parent()
    }

    pub fn children(&self, node: NodeId) -> Vec<NodeId> {
        if self.live(node).is_none() {
            return Vec::new();
        }
        node.children(&self.arena).collect()
    }

    /// Strict descendants of `node` in document order.
    pub fn descendants(&self, node: NodeId) -> Vec<NodeId> {
        if self.live(node).is_none() {
            return Vec::new();
        }
        node.descendants(&self.arena).skip(1).collect()
    }

    /// `node` followed by its ancestors up to the topmost one.
    pub fn ancestors(&self, node: NodeId) -> Vec<NodeId> {
        if self.live(node).is_none() {
            return Vec::new();
        }
        node.ancestors(&self.arena).collect()
    }

    pub fn previous_sibling(&self, node: NodeId) -> Option<NodeId> {
        self.live(node)?.previous_sibling()
    }

    pub fn next_sibling(&self, node: NodeId) -> Option<NodeId> {
        self.live(node)?.next_sibling()
    }

    /// Whether `node` is still reachable from the document root.
    pub fn is_attached(&self, node: NodeId) -> bool {
        self.live(node).is_some() && node.ancestors(&self.arena).last() == Some(self.root)
    }

    /// Whether `node` is `ancestor` or lies inside its subtree.
    pub fn is_inclusive_descendant(&self, node: NodeId, ancestor: NodeId) -> bool {
        self.live(node).is_some() && node.ancestors(&self.arena).any(|id| id == ancestor)
    }

    pub fn tag(&self, node: NodeId) -> Option<&str> {
        match &self.node(node)?.kind {
            NodeKind::Element { tag } => Some(tag),
            NodeKind::Document | NodeKind::Text { .. } => None,
        }
    }

    pub fn is_element(&self, node: NodeId) -> bool {
        self.tag(node).is_some()
    }

    pub fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        self.node(node)?
            .attrs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) -> Result<(), Error> {
        let data = self.live_mut(node)?;
        if let Some(slot) = data.attrs.iter_mut().find(|(key, _)| key == name) {
            value.clone_into(&mut slot.1);
        } else {
            data.attrs.push((name.to_owned(), value.to_owned()));
        }
        Ok(())
    }

    /// Drop `name` from `node`. Returns whether it was present.
    pub fn remove_attribute(&mut self, node: NodeId, name: &str) -> Result<bool, Error> {
        let data = self.live_mut(node)?;
        let before = data.attrs.len();
        data.attrs.retain(|(key, _)| key != name);
        Ok(data.attrs.len() != before)
    }

    pub fn classes(&self, node: NodeId) -> Vec<&str> {
        self.attribute(node, "class")
            .map(|attr| attr.split_whitespace().collect())
            .unwrap_or_default()
    }

    pub fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.classes(node).contains(&class)
    }

    pub fn add_class(&mut self, node: NodeId, class: &str) -> Result<(), Error> {
        self.toggle_class(node, class, true)
    }

    pub fn remove_class(&mut self, node: NodeId, class: &str) -> Result<(), Error> {
        self.toggle_class(node, class, false)
    }

    /// Force the presence (`true`) or absence (`false`) of a class token.
    ///
    /// Removing the last token drops the `class` attribute altogether.
    pub fn toggle_class(&mut self, node: NodeId, class: &str, force: bool) -> Result<(), Error> {
        let mut tokens: Vec<String> = self.classes(node).into_iter().map(str::to_owned).collect();
        let present = tokens.iter().any(|token| token == class);
        if present == force {
            // Still surface unknown nodes to the caller.
            self.live_mut(node)?;
            return Ok(());
        }
        if force {
            tokens.push(class.to_owned());
        } else {
            tokens.retain(|token| token != class);
            if tokens.is_empty() {
                self.remove_attribute(node, "class")?;
                return Ok(());
            }
        }
        self.set_attribute(node, "class", &tokens.join(" "))
    }

    pub fn set_layout_rect(&mut self, node: NodeId, rect: Rect) -> Result<(), Error> {
        self.live_mut(node)?.layout = Some(rect);
        Ok(())
    }

    pub fn layout_rect(&self, node: NodeId) -> Option<Rect> {
        self.node(node)?.layout
    }

    pub fn set_scroll_top(&mut self, node: NodeId, top: f32) -> Result<(), Error> {
        self.live_mut(node)?.scroll.top = top;
        Ok(())
    }

    pub fn scroll_offset(&self, node: NodeId) -> ScrollOffset {
        self.node(node).map(|data| data.scroll).unwrap_or_default()
    }

    /// Viewport-relative box of `node`: its layout rect shifted by every ancestor's scroll.
    ///
    /// `None` when the node is detached or has not been laid out.
    pub fn bounding_client_rect(&self, node: NodeId) -> Option<Rect> {
        if !self.is_attached(node) {
            return None;
        }
        let rect = self.layout_rect(node)?;
        let (dx, dy) = node
            .ancestors(&self.arena)
            .skip(1)
            .filter_map(|id| self.node(id))
            .fold((0.0, 0.0), |(acc_x, acc_y), data| {
                (acc_x - data.scroll.left, acc_y - data.scroll.top)
            });
        Some(rect.translate(dx, dy))
    }
}
