use anyhow::{Error, anyhow};
use dom::{Dom, NodeId, Rect, parse_html};
use log::{debug, info};
use std::env;
use sticky::{ConfigOverrides, Edge, STICKY_CHANGE, StickyConfig, StickyEvents, StickyOptions};

const PAGE: &str = include_str!("../assets/contacts.html");

const WIDTH: f32 = 320.0;
const VIEWPORT_HEIGHT: f32 = 200.0;
const HEADER_HEIGHT: f32 = 40.0;
const PARAGRAPH_HEIGHT: f32 = 160.0;
const SCROLL_STEP: f32 = 20.0;

/// Stack the children of `container` vertically. Returns the content height.
fn stack(dom: &mut Dom, container: NodeId) -> Result<f32, Error> {
    dom.set_layout_rect(container, Rect::new(0.0, 0.0, WIDTH, VIEWPORT_HEIGHT))?;
    let mut cursor = 0.0;
    for child in dom.children(container) {
        let height = match dom.tag(child) {
            Some("h2") => HEADER_HEIGHT,
            Some("p") => PARAGRAPH_HEIGHT,
            _ => 0.0,
        };
        dom.set_layout_rect(child, Rect::new(0.0, cursor, WIDTH, height))?;
        cursor += height;
    }
    Ok(cursor)
}

/// Move every bottom sentinel to the end of its header's section.
fn stretch_sections(dom: &mut Dom, events: &StickyEvents, content: f32) -> Result<(), Error> {
    let tops = events.sentinels(Edge::Top);
    for (index, bottom) in events.sentinels(Edge::Bottom).iter().enumerate() {
        let end = tops
            .get(index + 1)
            .and_then(|next| dom.layout_rect(next.sentinel))
            .map_or(content, |rect| rect.y);
        dom.set_layout_rect(bottom.sentinel, Rect::new(0.0, end, WIDTH, 0.0))?;
    }
    Ok(())
}

fn scroll_to(dom: &mut Dom, events: &mut StickyEvents, container: NodeId, top: f32) -> Result<(), Error> {
    dom.set_scroll_top(container, top)?;
    let changes = events.tick(dom);
    if !changes.is_empty() {
        debug!("scrollTop {top}: {} notification(s)", changes.len());
    }
    Ok(())
}

pub fn main() -> Result<(), Error> {
    env_logger::init();

    let overrides = match env::args().nth(1) {
        Some(json) => ConfigOverrides::from_json(&json)?,
        None => ConfigOverrides::default(),
    };
    let mut dom = parse_html(PAGE)?;
    let mut events = StickyEvents::create_with(
        &mut dom,
        ".sticky",
        StickyOptions {
            defaults: StickyConfig::from_env(),
            overrides,
            ..StickyOptions::default()
        },
    )?;
    info!("{:?}", events.config());

    events.on(&mut dom, STICKY_CHANGE, |change| {
        let state = if change.stuck { "stuck" } else { "unstuck" };
        info!("header {:?} is now {state}", change.target);
    });

    let container = events
        .containers()
        .first()
        .copied()
        .ok_or_else(|| anyhow!("Page has no sticky headers."))?;
    let content = stack(&mut dom, container)?;
    stretch_sections(&mut dom, &events, content)?;

    let max_scroll = (content - VIEWPORT_HEIGHT).max(0.0);
    let steps = (max_scroll / SCROLL_STEP).ceil() as usize;
    for step in (0..=steps).chain((0..steps).rev()) {
        let top = (step as f32 * SCROLL_STEP).min(max_scroll);
        scroll_to(&mut dom, &mut events, container, top)?;
    }

    debug!("{dom:?}");
    events.dispose(&mut dom);
    Ok(())
}
