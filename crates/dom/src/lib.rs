//! Host document model shared by the visibility monitor and the sticky-change core.
//!
//! The tree lives in an `indextree` arena. Alongside the usual element/text data each node
//! carries the geometry a layout pass produced for it (a document-space rectangle and a
//! scroll offset), which is all the visibility monitor needs to compute crossings.

#![allow(
    clippy::missing_docs_in_private_items,
    reason = "Internal implementation details don't need public documentation"
)]
#![allow(
    clippy::missing_inline_in_public_items,
    reason = "Inlining decisions left to compiler for this crate"
)]

mod events;
mod geometry;
mod parser;
mod printing;
mod query;
mod tree;

pub use events::{Event, Listener, ListenerId};
pub use geometry::{Rect, ScrollOffset};
pub use indextree::NodeId;
pub use parser::parse_html;
pub use query::{Selector, SelectorError};
pub use tree::{Dom, DomNode, NodeKind};
