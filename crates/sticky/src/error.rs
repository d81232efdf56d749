use core::fmt::{Display, Formatter, Result as FmtResult};
use dom::NodeId;
use std::error::Error;

/// Configuration mistakes detected while wiring sticky elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StickyError {
    /// A sticky element has no parent to act as its container.
    MissingContainer { element: NodeId },
    /// A sticky element's parent is not an element (e.g. the document node).
    NotAnElement { node: NodeId },
}

impl Display for StickyError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::MissingContainer { element } => {
                write!(f, "sticky element {element:?} has no parent container")
            }
            Self::NotAnElement { node } => {
                write!(f, "container {node:?} is not an element")
            }
        }
    }
}

impl Error for StickyError {}
