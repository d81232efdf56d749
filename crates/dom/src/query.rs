//! Element resolution: turning a selector into concrete elements.
//!
//! Only the subset hosts actually pass is understood: comma-separated compound selectors made
//! of an optional tag (or `*`), an optional `#id` and any number of `.class` parts.

use crate::tree::Dom;
use core::fmt::{Display, Formatter, Result as FmtResult};
use indextree::NodeId;
use smallvec::SmallVec;
use std::collections::HashSet;
use std::error::Error;

/// What the caller wants resolved.
#[derive(Clone, Debug)]
pub enum Selector {
    Element(NodeId),
    Elements(Vec<NodeId>),
    Query(String),
}

impl From<NodeId> for Selector {
    fn from(node: NodeId) -> Self {
        Self::Element(node)
    }
}

impl From<Vec<NodeId>> for Selector {
    fn from(nodes: Vec<NodeId>) -> Self {
        Self::Elements(nodes)
    }
}

impl From<&[NodeId]> for Selector {
    fn from(nodes: &[NodeId]) -> Self {
        Self::Elements(nodes.to_vec())
    }
}

impl From<&str> for Selector {
    fn from(query: &str) -> Self {
        Self::Query(query.to_owned())
    }
}

impl From<String> for Selector {
    fn from(query: String) -> Self {
        Self::Query(query)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectorError {
    Empty,
    Unsupported(String),
}

impl Display for SelectorError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Empty => write!(f, "SyntaxError: empty selector"),
            Self::Unsupported(part) => write!(f, "SyntaxError: unsupported selector `{part}`"),
        }
    }
}

impl Error for SelectorError {}

#[derive(Debug, Default, PartialEq, Eq)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: SmallVec<String, 2>,
}

fn is_ident_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '-' || ch == '_'
}

fn parse_compound(source: &str) -> Result<Compound, SelectorError> {
    let part = source.trim();
    if part.is_empty() {
        return Err(SelectorError::Empty);
    }
    let unsupported = || SelectorError::Unsupported(part.to_owned());
    let mut compound = Compound::default();
    let mut rest = part;
    if let Some(stripped) = rest.strip_prefix('*') {
        rest = stripped;
    } else {
        let end = rest.find(|ch: char| !is_ident_char(ch)).unwrap_or(rest.len());
        if end > 0 {
            compound.tag = Some(rest[..end].to_ascii_lowercase());
            rest = &rest[end..];
        }
    }
    while let Some(sigil) = rest.chars().next() {
        let body = &rest[sigil.len_utf8()..];
        let end = body.find(|ch: char| !is_ident_char(ch)).unwrap_or(body.len());
        if end == 0 {
            return Err(unsupported());
        }
        let name = body[..end].to_owned();
        match sigil {
            '#' if compound.id.is_none() => compound.id = Some(name),
            '.' => compound.classes.push(name),
            _ => return Err(unsupported()),
        }
        rest = &body[end..];
    }
    Ok(compound)
}

fn parse_list(query: &str) -> Result<Vec<Compound>, SelectorError> {
    if query.trim().is_empty() {
        return Err(SelectorError::Empty);
    }
    query.split(',').map(parse_compound).collect()
}

impl Dom {
    fn matches(&self, node: NodeId, compound: &Compound) -> bool {
        let Some(tag) = self.tag(node) else {
            return false;
        };
        if compound.tag.as_deref().is_some_and(|wanted| wanted != tag) {
            return false;
        }
        if let Some(id) = &compound.id {
            if self.attribute(node, "id") != Some(id.as_str()) {
                return false;
            }
        }
        let classes = self.classes(node);
        compound
            .classes
            .iter()
            .all(|class| classes.contains(&class.as_str()))
    }

    /// Elements under `scope` (exclusive) matching `query`, in document order.
    pub fn query_selector_all(&self, scope: NodeId, query: &str) -> Result<Vec<NodeId>, SelectorError> {
        let compounds = parse_list(query)?;
        Ok(self
            .descendants(scope)
            .into_iter()
            .filter(|node| compounds.iter().any(|compound| self.matches(*node, compound)))
            .collect())
    }

    /// Resolve a selector to live elements, deduplicated and in the order given
    /// (document order for queries).
    pub fn resolve(&self, selector: &Selector) -> Result<Vec<NodeId>, SelectorError> {
        let candidates = match selector {
            Selector::Element(node) => vec![*node],
            Selector::Elements(nodes) => nodes.clone(),
            Selector::Query(query) => self.query_selector_all(self.root(), query)?,
        };
        let mut seen = HashSet::new();
        Ok(candidates
            .into_iter()
            .filter(|node| self.is_element(*node) && seen.insert(*node))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::{SelectorError, parse_compound};
    use crate::tree::Dom;

    #[test]
    fn compound_parts() {
        let compound = parse_compound("h2#intro.sticky.big").unwrap();
        assert_eq!(compound.tag.as_deref(), Some("h2"));
        assert_eq!(compound.id.as_deref(), Some("intro"));
        assert_eq!(compound.classes.len(), 2);
    }

    #[test]
    fn combinators_are_rejected() {
        assert!(matches!(
            parse_compound("div > .sticky"),
            Err(SelectorError::Unsupported(_))
        ));
        assert_eq!(parse_compound("  ").unwrap_err(), SelectorError::Empty);
    }

    #[test]
    fn query_returns_document_order() {
        let mut dom = Dom::new();
        let list = dom.create_element("div");
        dom.append_child(dom.root(), list).unwrap();
        let mut headers = Vec::new();
        for _ in 0..3 {
            let header = dom.create_element("h2");
            dom.add_class(header, "sticky").unwrap();
            dom.append_child(list, header).unwrap();
            headers.push(header);
        }
        let found = dom.query_selector_all(dom.root(), ".sticky, h2").unwrap();
        assert_eq!(found, headers);
    }
}
