use crate::config::StickyConfig;
use crate::error::StickyError;
use crate::{
    SENTINEL_BOTTOM_CLASS, SENTINEL_CLASS, SENTINEL_DEBUG_CLASS, SENTINEL_TOP_CLASS, STICKY_CLASS,
};
use anyhow::Error;
use dom::{Dom, NodeId};
use log::debug;

/// Container edge a sticky element pins against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Edge {
    Top,
    Bottom,
}

impl Edge {
    pub const ALL: [Self; 2] = [Self::Top, Self::Bottom];

    /// Class identifying sentinels of this edge.
    #[inline]
    pub const fn class(self) -> &'static str {
        match self {
            Self::Top => SENTINEL_TOP_CLASS,
            Self::Bottom => SENTINEL_BOTTOM_CLASS,
        }
    }

    /// Visible fraction at which this edge's monitor reports.
    ///
    /// Top sentinels matter when they leave entirely, bottom ones when they are fully back.
    #[inline]
    pub const fn threshold(self) -> f32 {
        match self {
            Self::Top => 0.0,
            Self::Bottom => 1.0,
        }
    }
}

/// Bookkeeping for one sentinel: which element it belongs to and which edge it watches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SentinelBinding {
    pub sentinel: NodeId,
    pub owner: NodeId,
    pub edge: Edge,
    /// `false` when an existing sentinel was reused instead of inserted.
    pub created: bool,
}

/// The sentinel for `edge` already sitting next to `sticky`, if any.
fn existing_sentinel(dom: &Dom, sticky: NodeId, edge: Edge) -> Option<NodeId> {
    let neighbour = match edge {
        Edge::Top => dom.previous_sibling(sticky),
        Edge::Bottom => dom.next_sibling(sticky),
    }?;
    (dom.has_class(neighbour, SENTINEL_CLASS) && dom.has_class(neighbour, edge.class()))
        .then_some(neighbour)
}

/// Place one `edge` sentinel next to every sticky element inside `container`.
///
/// Top sentinels go immediately before their element, bottom sentinels immediately after.
/// A sentinel already in that slot is reused, so placing twice does not duplicate markers.
/// Bindings come back in document order of the sticky elements.
pub fn place_sentinels(
    dom: &mut Dom,
    container: NodeId,
    edge: Edge,
    config: &StickyConfig,
) -> Result<Vec<SentinelBinding>, Error> {
    let stickies = dom.query_selector_all(container, &format!(".{STICKY_CLASS}"))?;
    let mut bindings = Vec::with_capacity(stickies.len());
    for sticky in stickies {
        if dom.parent(sticky).is_none() {
            return Err(StickyError::MissingContainer { element: sticky }.into());
        }
        let (sentinel, created) = if let Some(found) = existing_sentinel(dom, sticky, edge) {
            (found, false)
        } else {
            let sentinel = dom.create_element("div");
            dom.add_class(sentinel, SENTINEL_CLASS)?;
            dom.add_class(sentinel, edge.class())?;
            match edge {
                Edge::Top => dom.insert_before(sticky, sentinel)?,
                Edge::Bottom => dom.insert_after(sticky, sentinel)?,
            }
            (sentinel, true)
        };
        dom.toggle_class(sentinel, SENTINEL_DEBUG_CLASS, config.debug)?;
        debug!("{edge:?} sentinel {sentinel:?} for {sticky:?} (created: {created})");
        bindings.push(SentinelBinding {
            sentinel,
            owner: sticky,
            edge,
            created,
        });
    }
    Ok(bindings)
}

#[cfg(test)]
mod tests {
    use super::{Edge, place_sentinels};
    use crate::config::StickyConfig;
    use crate::{SENTINEL_DEBUG_CLASS, STICKY_CLASS};
    use dom::Dom;

    fn list_with_stickies(count: usize) -> (Dom, dom::NodeId, Vec<dom::NodeId>) {
        let mut dom = Dom::new();
        let list = dom.create_element("div");
        dom.append_child(dom.root(), list).unwrap();
        let stickies = (0..count)
            .map(|_| {
                let header = dom.create_element("h2");
                dom.add_class(header, STICKY_CLASS).unwrap();
                dom.append_child(list, header).unwrap();
                header
            })
            .collect();
        (dom, list, stickies)
    }

    #[test]
    fn one_sentinel_per_sticky_in_document_order() {
        let (mut dom, list, stickies) = list_with_stickies(3);
        let config = StickyConfig::default();
        let tops = place_sentinels(&mut dom, list, Edge::Top, &config).unwrap();
        let bottoms = place_sentinels(&mut dom, list, Edge::Bottom, &config).unwrap();

        let owners: Vec<_> = tops.iter().map(|binding| binding.owner).collect();
        assert_eq!(owners, stickies);
        for (top, bottom) in tops.iter().zip(&bottoms) {
            assert_eq!(dom.next_sibling(top.sentinel), Some(top.owner));
            assert_eq!(dom.previous_sibling(bottom.sentinel), Some(bottom.owner));
            assert!(!dom.has_class(top.sentinel, SENTINEL_DEBUG_CLASS));
        }
        assert_eq!(dom.children(list).len(), 9);
    }

    #[test]
    fn placing_twice_reuses_sentinels() {
        let (mut dom, list, _) = list_with_stickies(2);
        let first = place_sentinels(&mut dom, list, Edge::Top, &StickyConfig::default()).unwrap();
        let second = place_sentinels(&mut dom, list, Edge::Top, &StickyConfig::new(true)).unwrap();

        assert!(first.iter().all(|binding| binding.created));
        assert!(second.iter().all(|binding| !binding.created));
        assert_eq!(
            first.iter().map(|binding| binding.sentinel).collect::<Vec<_>>(),
            second.iter().map(|binding| binding.sentinel).collect::<Vec<_>>()
        );
        assert!(dom.has_class(second[0].sentinel, SENTINEL_DEBUG_CLASS));
        assert_eq!(dom.children(list).len(), 4);
    }
}
