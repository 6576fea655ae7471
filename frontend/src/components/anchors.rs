use web_sys::{ScrollBehavior, ScrollIntoViewOptions, ScrollLogicalPosition};

use crate::dom;
use crate::error::Result;
use crate::page::Page;

/// Selector for an in-page `href`, or `None` for a bare `#`.
pub fn anchor_selector(href: &str) -> Option<&str> {
    if href.len() > 1 && href.starts_with('#') {
        Some(href)
    } else {
        None
    }
}

pub fn init(page: &Page) -> Result<()> {
    for anchor in dom::query_all(&page.document, "a[href^=\"#\"]")? {
        let document = page.document.clone();
        let link = anchor.clone();
        dom::listen_active(&anchor, "click", move |event| {
            let href = link.get_attribute("href").unwrap_or_default();
            let Some(selector) = anchor_selector(&href) else {
                return;
            };
            // `#1` and friends are not valid selectors; let the browser jump.
            let Ok(Some(target)) = document.query_selector(selector) else {
                return;
            };
            event.prevent_default();
            let options = ScrollIntoViewOptions::new();
            options.set_behavior(ScrollBehavior::Smooth);
            options.set_block(ScrollLogicalPosition::Start);
            target.scroll_into_view_with_scroll_into_view_options(&options);
        });
    }
    Ok(())
}
