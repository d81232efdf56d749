//! Sticky-change notifications for elements pinned by their scroll container.
//!
//! Every element marked with [`STICKY_CLASS`] gets two zero-size sentinels placed next to it,
//! one per [`Edge`]. A [`visibility::VisibilityMonitor`] per edge and container reports when a
//! sentinel crosses the container's visible bounds; the classifier turns each report into a
//! stuck/unstuck transition and the notifier dispatches [`STICKY_CHANGE`] on the element.
//! Nothing runs per scroll frame: work only happens when a sentinel crosses a threshold.
//!
//! ```no_run
//! use dom::parse_html;
//! use sticky::{ConfigOverrides, StickyEvents, STICKY_CHANGE};
//!
//! # fn main() -> anyhow::Result<()> {
//! let mut dom = parse_html("<div id='list'><h2 class='sticky'>A</h2></div>")?;
//! let mut events = StickyEvents::create(&mut dom, ".sticky", &ConfigOverrides::default())?;
//! events.on(&mut dom, STICKY_CHANGE, |change| log::info!("stuck: {}", change.stuck));
//! // after layout or scrolling:
//! events.tick(&dom);
//! # Ok(())
//! # }
//! ```

#![allow(
    clippy::missing_docs_in_private_items,
    reason = "Internal implementation details don't need public documentation"
)]

mod classify;
mod config;
mod console;
mod error;
mod facade;
mod notify;
mod sentinel;

pub use classify::{Transition, TransitionTracker, classify};
pub use config::{ConfigOverrides, StickyConfig};
pub use console::{ConsoleLogger, HostLogger, LogLevel};
pub use error::StickyError;
pub use facade::{StickyEvents, StickyOptions};
pub use notify::{StickyChange, notify};
pub use sentinel::{Edge, SentinelBinding, place_sentinels};

/// Prefix used on diagnostics.
pub const PACKAGE_NAME: &str = "sticky";
/// Name of the notification dispatched on sticky elements.
pub const STICKY_CHANGE: &str = "sticky-change";

/// Marks an element as a sticky candidate.
pub const STICKY_CLASS: &str = "sticky";
/// Added to every container that holds sticky candidates.
pub const WRAPPER_CLASS: &str = "sticky_sentinel--wrapper";
/// Common class on every sentinel.
pub const SENTINEL_CLASS: &str = "sticky_sentinel";
pub const SENTINEL_TOP_CLASS: &str = "sticky_sentinel--top";
pub const SENTINEL_BOTTOM_CLASS: &str = "sticky_sentinel--bottom";
/// Presentation-only marker added when `debug` is on.
pub const SENTINEL_DEBUG_CLASS: &str = "sticky_sentinel--debug";
