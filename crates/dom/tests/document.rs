use dom::{Dom, Event, Rect, Selector, parse_html};
use serde_json::{Value, json};
use std::cell::RefCell;
use std::rc::Rc;

const PAGE: &str = r#"<!DOCTYPE html>
<html><body>
  <!-- contacts -->
  <div id="list" class="contacts">
    <h2 class="sticky">A</h2>
    <p>Ada</p>
    <h2 class="sticky big">B</h2>
  </div>
</body></html>"#;

fn find(dom: &Dom, query: &str) -> Vec<dom::NodeId> {
    dom.resolve(&Selector::from(query)).unwrap()
}

#[test]
fn parsed_page_snapshot() {
    let _ = env_logger::builder().is_test(true).try_init();
    let dom = parse_html(PAGE).unwrap();
    let list = find(&dom, "#list")[0];
    let snapshot = dom.to_json();

    let body = &snapshot["children"][0]["children"][1];
    assert_eq!(body["tag"], "body");
    assert_eq!(
        body["children"][0],
        json!({
            "type": "element",
            "tag": "div",
            "attrs": { "class": "contacts", "id": "list" },
            "children": [
                {
                    "type": "element",
                    "tag": "h2",
                    "attrs": { "class": "sticky" },
                    "children": [{ "type": "text", "text": "A" }],
                },
                {
                    "type": "element",
                    "tag": "p",
                    "attrs": {},
                    "children": [{ "type": "text", "text": "Ada" }],
                },
                {
                    "type": "element",
                    "tag": "h2",
                    "attrs": { "class": "sticky big" },
                    "children": [{ "type": "text", "text": "B" }],
                },
            ],
        })
    );
    assert_eq!(dom.children(list).len(), 3);
    assert!(format!("{dom:?}").contains("<h2.sticky.big>"));
    assert_ne!(snapshot, Value::Null);
}

#[test]
fn selectors_resolve_in_document_order() {
    let dom = parse_html(PAGE).unwrap();
    let headers = find(&dom, "h2.sticky");
    assert_eq!(headers.len(), 2);
    assert_eq!(find(&dom, ".big"), vec![headers[1]]);
    assert_eq!(find(&dom, "p, .sticky").len(), 3);

    // Explicit lists drop duplicates and non-elements.
    let text = dom.children(headers[0])[0];
    let listed = dom
        .resolve(&Selector::from(vec![headers[1], text, headers[1], headers[0]]))
        .unwrap();
    assert_eq!(listed, vec![headers[1], headers[0]]);
}

#[test]
fn scrolled_container_moves_its_content() {
    let mut dom = parse_html(PAGE).unwrap();
    let list = find(&dom, "#list")[0];
    let first = find(&dom, "h2")[0];
    dom.set_layout_rect(list, Rect::new(0.0, 20.0, 300.0, 200.0)).unwrap();
    dom.set_layout_rect(first, Rect::new(0.0, 60.0, 300.0, 40.0)).unwrap();
    dom.set_scroll_top(list, 50.0).unwrap();

    assert_eq!(dom.bounding_client_rect(list), Some(Rect::new(0.0, 20.0, 300.0, 200.0)));
    assert_eq!(dom.bounding_client_rect(first), Some(Rect::new(0.0, 10.0, 300.0, 40.0)));

    dom.detach(first);
    assert_eq!(dom.bounding_client_rect(first), None);
}

#[test]
fn bubbling_is_opt_in() {
    let mut dom = parse_html(PAGE).unwrap();
    let list = find(&dom, "#list")[0];
    let header = find(&dom, "h2")[0];
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    dom.add_event_listener(
        list,
        "ping",
        Rc::new(move |event: &Event| sink.borrow_mut().push(event.detail.clone())),
    );

    assert_eq!(dom.dispatch_event(header, Event::custom("ping", json!(1))), 0);
    assert_eq!(
        dom.dispatch_event(header, Event::custom("ping", json!(2)).with_bubbles(true)),
        1
    );
    assert_eq!(*seen.borrow(), vec![json!(2)]);

    assert_eq!(dom.remove_event_listeners(list, "ping"), 1);
    assert_eq!(dom.listener_count(list, "ping"), 0);
}
