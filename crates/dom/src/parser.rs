//! HTML5 parsing using html5ever.

use crate::tree::Dom;
use anyhow::Error;
use html5ever::tendril::TendrilSink as _;
use html5ever::{ParseOpts, parse_document};
use indextree::NodeId;
use markup5ever_rcdom::{Handle, NodeData as RcNodeData, RcDom};

/// Parse an HTML document into a fresh [`Dom`].
///
/// Whitespace-only text, comments, doctypes and processing instructions are dropped; they
/// carry nothing the sticky machinery looks at.
pub fn parse_html(html: &str) -> Result<Dom, Error> {
    let parsed: RcDom = parse_document(RcDom::default(), ParseOpts::default())
        .from_utf8()
        .read_from(&mut html.as_bytes())?;
    let mut dom = Dom::new();
    let root = dom.root();
    convert_node(&mut dom, &parsed.document, root)?;
    Ok(dom)
}

fn convert_node(dom: &mut Dom, rc_node: &Handle, parent: NodeId) -> Result<(), Error> {
    match &rc_node.data {
        RcNodeData::Document => {
            for child in rc_node.children.borrow().iter() {
                convert_node(dom, child, parent)?;
            }
        }
        RcNodeData::Text { contents } => {
            let text = contents.borrow().to_string();
            if !text.trim().is_empty() {
                let node = dom.create_text(&text);
                dom.append_child(parent, node)?;
            }
        }
        RcNodeData::Element { name, attrs, .. } => {
            let node = dom.create_element(&name.local);
            for attr in attrs.borrow().iter() {
                dom.set_attribute(node, &attr.name.local, &attr.value)?;
            }
            dom.append_child(parent, node)?;
            for child in rc_node.children.borrow().iter() {
                convert_node(dom, child, node)?;
            }
        }
        RcNodeData::Doctype { .. }
        | RcNodeData::Comment { .. }
        | RcNodeData::ProcessingInstruction { .. } => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::parse_html;

    #[test]
    fn keeps_classes_and_structure() {
        let dom = parse_html(
            "<div class='list'><h2 class='sticky'>A</h2><p>body</p></div>",
        )
        .unwrap();
        let stickies = dom.query_selector_all(dom.root(), ".sticky").unwrap();
        assert_eq!(stickies.len(), 1);
        let list = dom.parent(stickies[0]).unwrap();
        assert!(dom.has_class(list, "list"));
        assert_eq!(dom.children(list).len(), 2);
    }
}
