//! Wiring, disposal and diagnostics of `StickyEvents`.

use dom::{Dom, Event, NodeId, parse_html};
use serde_json::json;
use std::cell::RefCell;
use std::rc::Rc;
use sticky::{
    ConfigOverrides, Edge, HostLogger, LogLevel, SENTINEL_CLASS, STICKY_CHANGE, StickyConfig,
    StickyError, StickyEvents, StickyOptions, WRAPPER_CLASS,
};

const TWO_LISTS: &str = r#"
<div id="fruit">
  <h2 class="sticky">Apples</h2><p>Crisp.</p>
  <h2 class="sticky">Pears</h2><p>Soft.</p>
  <h2 class="sticky">Plums</h2><p>Sour.</p>
</div>
<div id="veg"><h2 class="sticky">Leeks</h2><p>Long.</p></div>
"#;

#[derive(Default)]
struct Recorder {
    lines: RefCell<Vec<(LogLevel, String)>>,
}

impl HostLogger for Recorder {
    fn log(&self, level: LogLevel, message: &str) {
        self.lines.borrow_mut().push((level, message.to_owned()));
    }
}

fn by_id(dom: &Dom, id: &str) -> NodeId {
    dom.resolve(&format!("#{id}").into()).unwrap()[0]
}

fn sentinel_count(dom: &Dom, container: NodeId) -> usize {
    dom.query_selector_all(container, &format!(".{SENTINEL_CLASS}"))
        .unwrap()
        .len()
}

#[test]
fn every_sticky_gets_adjacent_top_and_bottom_sentinels() {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut dom = parse_html(TWO_LISTS).unwrap();
    let events = StickyEvents::create(&mut dom, ".sticky", &ConfigOverrides::default()).unwrap();

    let fruit = by_id(&dom, "fruit");
    let veg = by_id(&dom, "veg");
    assert_eq!(events.targets().len(), 4);
    assert_eq!(events.containers(), vec![fruit, veg]);
    assert!(dom.has_class(fruit, WRAPPER_CLASS));
    assert_eq!(sentinel_count(&dom, fruit), 6);
    assert_eq!(sentinel_count(&dom, veg), 2);

    let tops = events.sentinels(Edge::Top);
    let bottoms = events.sentinels(Edge::Bottom);
    assert_eq!(tops.iter().map(|binding| binding.owner).collect::<Vec<_>>(), events.targets());
    for (top, bottom) in tops.iter().zip(&bottoms) {
        assert_eq!(top.owner, bottom.owner);
        assert_eq!(dom.next_sibling(top.sentinel), Some(top.owner));
        assert_eq!(dom.previous_sibling(bottom.sentinel), Some(bottom.owner));
        assert!(top.created && bottom.created);
    }
}

#[test]
fn second_instance_reuses_existing_sentinels() {
    let mut dom = parse_html(TWO_LISTS).unwrap();
    let fruit = by_id(&dom, "fruit");
    let first = StickyEvents::create(&mut dom, ".sticky", &ConfigOverrides::default()).unwrap();
    let children = dom.children(fruit).len();

    let second = StickyEvents::create(&mut dom, ".sticky", &ConfigOverrides::debug(true)).unwrap();
    assert_eq!(dom.children(fruit).len(), children);
    for edge in Edge::ALL {
        let placed = first.sentinels(edge);
        let reused = second.sentinels(edge);
        assert_eq!(placed.len(), reused.len());
        for (old, new) in placed.iter().zip(&reused) {
            assert_eq!(old.sentinel, new.sentinel);
            assert!(old.created && !new.created);
        }
    }
    assert!(!first.config().debug);
    assert!(second.config().debug);
}

#[test]
fn containers_are_wired_once_per_instance() {
    let mut dom = parse_html(TWO_LISTS).unwrap();
    let fruit = by_id(&dom, "fruit");
    let headers = dom.query_selector_all(fruit, "h2").unwrap();
    let events = StickyEvents::create(&mut dom, headers, &ConfigOverrides::default()).unwrap();
    assert_eq!(events.containers(), vec![fruit]);
    assert_eq!(sentinel_count(&dom, fruit), 6);
}

#[test]
fn element_without_parent_is_rejected_before_any_change() {
    let mut dom = parse_html(TWO_LISTS).unwrap();
    let fruit = by_id(&dom, "fruit");
    let mut targets = dom.query_selector_all(fruit, ".sticky").unwrap();
    let orphan = dom.create_element("h2");
    targets.push(orphan);

    let err = StickyEvents::create(&mut dom, targets, &ConfigOverrides::default())
        .err()
        .unwrap();
    assert_eq!(
        err.downcast_ref::<StickyError>(),
        Some(&StickyError::MissingContainer { element: orphan })
    );
    assert!(!dom.has_class(fruit, WRAPPER_CLASS));
    assert_eq!(sentinel_count(&dom, fruit), 0);
}

#[test]
fn document_is_not_a_container() {
    let mut dom = Dom::new();
    let loose = dom.create_element("h2");
    dom.append_child(dom.root(), loose).unwrap();
    let err = StickyEvents::create(&mut dom, loose, &ConfigOverrides::default())
        .err()
        .unwrap();
    assert_eq!(
        err.downcast_ref::<StickyError>(),
        Some(&StickyError::NotAnElement { node: dom.root() })
    );
}

#[test]
fn malformed_selector_is_an_error() {
    let mut dom = parse_html(TWO_LISTS).unwrap();
    assert!(StickyEvents::create(&mut dom, "div > .sticky", &ConfigOverrides::default()).is_err());
    assert!(StickyEvents::create(&mut dom, "  ", &ConfigOverrides::default()).is_err());
}

#[test]
fn unknown_event_is_reported_not_attached() {
    let mut dom = parse_html(TWO_LISTS).unwrap();
    let recorder = Rc::new(Recorder::default());
    let logger: Rc<dyn HostLogger> = recorder.clone();
    let events = StickyEvents::create_with(
        &mut dom,
        ".sticky",
        StickyOptions {
            logger,
            ..StickyOptions::default()
        },
    )
    .unwrap();

    assert!(!events.on(&mut dom, "sticky-chnage", |_| {}));
    let header = events.targets()[0];
    assert_eq!(dom.listener_count(header, "sticky-chnage"), 0);
    let lines = recorder.lines.borrow();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].0, LogLevel::Error);
    assert_eq!(lines[0].1, "sticky-chnage is not an event of sticky");
}

#[test]
fn foreign_payload_is_reported_to_the_logger() {
    let mut dom = parse_html(TWO_LISTS).unwrap();
    let recorder = Rc::new(Recorder::default());
    let logger: Rc<dyn HostLogger> = recorder.clone();
    let events = StickyEvents::create_with(
        &mut dom,
        ".sticky",
        StickyOptions {
            logger,
            ..StickyOptions::default()
        },
    )
    .unwrap();
    let calls = Rc::new(RefCell::new(0_usize));
    let counter = Rc::clone(&calls);
    events.on(&mut dom, STICKY_CHANGE, move |_| *counter.borrow_mut() += 1);

    let header = events.targets()[0];
    let ran = dom.dispatch_event(header, Event::custom(STICKY_CHANGE, json!({ "stuck": "yes" })));
    assert_eq!(ran, 1);
    assert_eq!(*calls.borrow(), 0);
    assert_eq!(recorder.lines.borrow()[0].0, LogLevel::Warn);
}

#[test]
fn notifications_do_not_bubble_to_the_container() {
    let mut dom = parse_html(TWO_LISTS).unwrap();
    let events = StickyEvents::create(&mut dom, ".sticky", &ConfigOverrides::default()).unwrap();
    let fruit = by_id(&dom, "fruit");
    let heard = Rc::new(RefCell::new(false));
    let flag = Rc::clone(&heard);
    dom.add_event_listener(fruit, STICKY_CHANGE, Rc::new(move |_: &Event| *flag.borrow_mut() = true));

    assert_eq!(sticky::notify(&dom, true, events.targets()[0]), 0);
    assert!(!*heard.borrow());
}

#[test]
fn dispose_restores_the_markup() {
    let mut dom = parse_html(TWO_LISTS).unwrap();
    let before = dom.to_json();
    let events = StickyEvents::create(&mut dom, ".sticky", &ConfigOverrides::default()).unwrap();
    assert_ne!(dom.to_json(), before);

    events.dispose(&mut dom);
    assert_eq!(dom.to_json(), before);
}

#[test]
fn dispose_keeps_sentinels_it_did_not_create() {
    let mut dom = parse_html(TWO_LISTS).unwrap();
    let veg = by_id(&dom, "veg");
    let headers = dom.query_selector_all(veg, ".sticky").unwrap();
    let owner = StickyEvents::create(&mut dom, headers.clone(), &ConfigOverrides::default()).unwrap();
    let guest = StickyEvents::create(&mut dom, headers, &ConfigOverrides::default()).unwrap();

    guest.dispose(&mut dom);
    assert_eq!(sentinel_count(&dom, veg), 2);
    owner.dispose(&mut dom);
    assert_eq!(sentinel_count(&dom, veg), 0);
}

#[test]
fn env_defaults_merge_with_json_overrides() {
    let mut dom = parse_html(TWO_LISTS).unwrap();
    let events = StickyEvents::create_with(
        &mut dom,
        ".sticky",
        StickyOptions {
            defaults: StickyConfig::new(true),
            overrides: ConfigOverrides::from_json(r#"{"debug": false}"#).unwrap(),
            ..StickyOptions::default()
        },
    )
    .unwrap();
    assert_eq!(*events.config(), StickyConfig::new(false));
    let fruit = by_id(&dom, "fruit");
    assert!(
        dom.query_selector_all(fruit, ".sticky_sentinel--debug")
            .unwrap()
            .is_empty()
    );
}
