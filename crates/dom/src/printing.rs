use core::fmt;

use crate::tree::{Dom, NodeKind};
use indextree::NodeId;
use serde_json::{Map, Value, json};

fn node_to_json(dom: &Dom, id: NodeId) -> Value {
    let Some(node) = dom.node(id) else {
        return Value::Null;
    };
    let children: Vec<Value> = dom
        .children(id)
        .into_iter()
        .map(|child| node_to_json(dom, child))
        .filter(|value| !value.is_null())
        .collect();
    match &node.kind {
        NodeKind::Document => json!({ "type": "document", "children": children }),
        NodeKind::Element { tag } => {
            // Sorted for determinism
            let mut pairs: Vec<(String, String)> = node.attrs.iter().cloned().collect();
            pairs.sort_by(|left, right| left.0.cmp(&right.0));
            let mut attrs_obj = Map::new();
            for (key, value) in pairs {
                attrs_obj.insert(key, Value::String(value));
            }
            json!({
                "type": "element",
                "tag": tag,
                "attrs": Value::Object(attrs_obj),
                "children": children,
            })
        }
        NodeKind::Text { text } => json!({ "type": "text", "text": text }),
    }
}

impl Dom {
    /// Deterministic JSON snapshot of the tree.
    pub fn to_json(&self) -> Value {
        node_to_json(self, self.root())
    }
}

impl fmt::Debug for Dom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn walk(dom: &Dom, id: NodeId, depth: usize, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            let indent = "  ".repeat(depth);
            match dom.node(id).map(|node| &node.kind) {
                Some(NodeKind::Document) => writeln!(f, "{indent}#document")?,
                Some(NodeKind::Element { tag }) => {
                    let classes = dom.classes(id).join(".");
                    if classes.is_empty() {
                        writeln!(f, "{indent}<{tag}>")?;
                    } else {
                        writeln!(f, "{indent}<{tag}.{classes}>")?;
                    }
                }
                Some(NodeKind::Text { text }) => writeln!(f, "{indent}{:?}", text.trim())?,
                None => return Ok(()),
            }
            for child in dom.children(id) {
                walk(dom, child, depth + 1, f)?;
            }
            Ok(())
        }
        writeln!(f, "DOM")?;
        walk(self, self.root(), 0, f)
    }
}
