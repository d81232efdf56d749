use crate::classify::{TransitionTracker, classify};
use crate::config::{ConfigOverrides, StickyConfig};
use crate::console::{ConsoleLogger, HostLogger, LogLevel};
use crate::error::StickyError;
use crate::notify::{StickyChange, notify};
use crate::sentinel::{Edge, SentinelBinding, place_sentinels};
use crate::{PACKAGE_NAME, STICKY_CHANGE, WRAPPER_CLASS};
use anyhow::Error;
use dom::{Dom, Event, NodeId, Selector};
use log::{debug, info};
use std::collections::{HashMap, HashSet};
use std::rc::Rc;
use tracing::info_span;
use visibility::{ObserverOptions, ReportStream, VisibilityMonitor};

/// How an instance is built.
pub struct StickyOptions {
    /// Immutable defaults; never modified by the instance.
    pub defaults: StickyConfig,
    pub overrides: ConfigOverrides,
    /// Where misuse of the subscription API is reported.
    pub logger: Rc<dyn HostLogger>,
}

impl Default for StickyOptions {
    fn default() -> Self {
        Self {
            defaults: StickyConfig::default(),
            overrides: ConfigOverrides::default(),
            logger: Rc::new(ConsoleLogger),
        }
    }
}

/// One edge of one container: its monitor, report queue and sentinel bookkeeping.
///
/// Nested containers share sentinels, so each watch tracks transitions against its own root.
struct EdgeWatch {
    monitor: VisibilityMonitor,
    reports: ReportStream,
    bindings: HashMap<NodeId, SentinelBinding>,
    order: Vec<NodeId>,
    tracker: TransitionTracker,
}

impl EdgeWatch {
    fn wire(dom: &mut Dom, container: NodeId, edge: Edge, config: &StickyConfig) -> Result<Self, Error> {
        let (mut monitor, reports) = VisibilityMonitor::new(
            ObserverOptions::new(container).with_thresholds(&[edge.threshold()]),
        )?;
        let placed = place_sentinels(dom, container, edge, config)?;
        let mut bindings = HashMap::with_capacity(placed.len());
        let mut order = Vec::with_capacity(placed.len());
        for binding in placed {
            monitor.observe(binding.sentinel);
            order.push(binding.sentinel);
            bindings.insert(binding.sentinel, binding);
        }
        Ok(Self {
            monitor,
            reports,
            bindings,
            order,
            tracker: TransitionTracker::new(),
        })
    }
}

struct ContainerWatch {
    container: NodeId,
    edges: [EdgeWatch; 2],
}

/// Sticky-change detection for every container of the resolved elements.
///
/// Built once per selector. The host drives it by calling [`StickyEvents::tick`] (or the
/// two halves, [`StickyEvents::update_observations`] and [`StickyEvents::deliver`]) after
/// layout or scrolling; notifications only go out when a sentinel crossed a threshold.
pub struct StickyEvents {
    targets: Vec<NodeId>,
    config: StickyConfig,
    watches: Vec<ContainerWatch>,
    logger: Rc<dyn HostLogger>,
}

impl StickyEvents {
    /// Resolve `selector` and wire every distinct parent container, using default settings
    /// merged with `overrides`.
    pub fn create(
        dom: &mut Dom,
        selector: impl Into<Selector>,
        overrides: &ConfigOverrides,
    ) -> Result<Self, Error> {
        Self::create_with(
            dom,
            selector,
            StickyOptions {
                overrides: *overrides,
                ..StickyOptions::default()
            },
        )
    }

    /// Like [`StickyEvents::create`] with explicit defaults and diagnostics sink.
    ///
    /// # Errors
    /// Fails before touching the document when the selector is malformed or a resolved
    /// element has no element parent to act as its container.
    pub fn create_with(
        dom: &mut Dom,
        selector: impl Into<Selector>,
        options: StickyOptions,
    ) -> Result<Self, Error> {
        let selector = selector.into();
        let targets = dom.resolve(&selector)?;
        let config = options.defaults.merged(&options.overrides);

        let mut containers = Vec::new();
        let mut seen = HashSet::new();
        for target in &targets {
            let container = dom
                .parent(*target)
                .ok_or(StickyError::MissingContainer { element: *target })?;
            if !dom.is_element(container) {
                return Err(StickyError::NotAnElement { node: container }.into());
            }
            if seen.insert(container) {
                containers.push(container);
            }
        }

        let mut watches = Vec::with_capacity(containers.len());
        for container in containers {
            dom.add_class(container, WRAPPER_CLASS)?;
            watches.push(ContainerWatch {
                container,
                edges: [
                    EdgeWatch::wire(dom, container, Edge::Top, &config)?,
                    EdgeWatch::wire(dom, container, Edge::Bottom, &config)?,
                ],
            });
        }
        info!(
            "sticky events wired for {} element(s) in {} container(s)",
            targets.len(),
            watches.len()
        );

        Ok(Self {
            targets,
            config,
            watches,
            logger: options.logger,
        })
    }

    /// Elements the selector resolved to.
    pub fn targets(&self) -> &[NodeId] {
        &self.targets
    }

    pub fn containers(&self) -> Vec<NodeId> {
        self.watches.iter().map(|watch| watch.container).collect()
    }

    pub const fn config(&self) -> &StickyConfig {
        &self.config
    }

    /// Sentinel bindings of `edge` across all containers, in placement order.
    pub fn sentinels(&self, edge: Edge) -> Vec<SentinelBinding> {
        self.watches
            .iter()
            .flat_map(|watch| watch.edges.iter())
            .flat_map(|edge_watch| edge_watch.order.iter().map(move |id| &edge_watch.bindings[id]))
            .filter(|binding| binding.edge == edge)
            .copied()
            .collect()
    }

    /// Subscribe `handler` to `event` on every resolved element.
    ///
    /// Unknown event names are reported through the diagnostics sink and nothing is attached.
    /// Returns whether the subscription happened.
    pub fn on<F>(&self, dom: &mut Dom, event: &str, handler: F) -> bool
    where
        F: Fn(&StickyChange) + 'static,
    {
        if event != STICKY_CHANGE {
            self.logger.log(
                LogLevel::Error,
                &format!("{event} is not an event of {PACKAGE_NAME}"),
            );
            return false;
        }
        let handler: Rc<dyn Fn(&StickyChange)> = Rc::new(handler);
        for target in &self.targets {
            let callback = Rc::clone(&handler);
            let logger = Rc::clone(&self.logger);
            dom.add_event_listener(
                *target,
                event,
                Rc::new(move |dispatched: &Event| match StickyChange::from_event(dispatched) {
                    Ok(change) => callback(&change),
                    Err(err) => logger.log(
                        LogLevel::Warn,
                        &format!("malformed {} payload: {err}", dispatched.kind),
                    ),
                }),
            );
        }
        true
    }

    /// Drop every `event` listener on the resolved elements. Monitors keep running.
    ///
    /// Returns the number of listeners removed.
    pub fn off(&self, dom: &mut Dom, event: &str) -> usize {
        self.targets
            .iter()
            .map(|target| dom.remove_event_listeners(*target, event))
            .sum()
    }

    /// Let every monitor measure the current layout and queue crossing reports.
    ///
    /// Queued reports are kept until [`StickyEvents::deliver`]; hosts that split the step must
    /// deliver after every update or the backlog keeps growing.
    pub fn update_observations(&mut self, dom: &Dom) -> usize {
        self.watches
            .iter_mut()
            .flat_map(|watch| watch.edges.iter_mut())
            .map(|edge_watch| edge_watch.monitor.update(dom))
            .sum()
    }

    /// Classify queued reports and notify the affected elements.
    ///
    /// Returns the notifications sent, in delivery order.
    pub fn deliver(&mut self, dom: &Dom) -> Vec<StickyChange> {
        let _span = info_span!("sticky.deliver").entered();
        let mut sent = Vec::new();
        for watch in &mut self.watches {
            for edge_watch in &mut watch.edges {
                for report in edge_watch.reports.try_drain() {
                    let Some(binding) = edge_watch.bindings.get(&report.target) else {
                        debug!("report for unknown sentinel {:?}", report.target);
                        continue;
                    };
                    if !dom.is_attached(binding.sentinel) {
                        debug!("sentinel {:?} is gone; dropping report", binding.sentinel);
                        continue;
                    }
                    if !dom.is_attached(binding.owner) {
                        debug!("sticky element {:?} is gone; dropping report", binding.owner);
                        continue;
                    }
                    let transition = edge_watch
                        .tracker
                        .track(binding.sentinel, classify(&report, binding.edge));
                    if let Some(stuck) = transition.stuck() {
                        debug!(
                            "{:?} sentinel of {:?}: {transition:?}",
                            binding.edge, binding.owner
                        );
                        notify(dom, stuck, binding.owner);
                        sent.push(StickyChange {
                            stuck,
                            target: binding.owner,
                        });
                    }
                }
            }
        }
        sent
    }

    /// [`StickyEvents::update_observations`] followed by [`StickyEvents::deliver`].
    pub fn tick(&mut self, dom: &Dom) -> Vec<StickyChange> {
        self.update_observations(dom);
        self.deliver(dom)
    }

    /// Stop all monitors, remove the sentinels this instance inserted and unmark containers.
    ///
    /// Listeners attached with [`StickyEvents::on`] stay until [`StickyEvents::off`].
    pub fn dispose(mut self, dom: &mut Dom) {
        for watch in &mut self.watches {
            for edge_watch in &mut watch.edges {
                edge_watch.monitor.disconnect();
                for binding in edge_watch.bindings.values() {
                    edge_watch.tracker.forget(binding.sentinel);
                    if binding.created {
                        dom.remove(binding.sentinel);
                    }
                }
            }
            if let Err(err) = dom.remove_class(watch.container, WRAPPER_CLASS) {
                debug!("container {:?} already gone: {err}", watch.container);
            }
        }
        info!("sticky events disposed for {} container(s)", self.watches.len());
    }
}
