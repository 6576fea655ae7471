use gloo_timers::callback::Timeout;
use log::debug;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::{Element, MouseEvent, Window};

use crate::dom;
use crate::error::Result;
use crate::motion::MotionPreference;
use crate::page::Page;

const WRAPPER_SELECTOR: &str = ".page-wrapper";
const LOADED_CLASS: &str = "is-loaded";
const EXITING_CLASS: &str = "is-exiting";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkKind {
    /// `#section` on the current page.
    Anchor,
    /// Another site, or a `mailto:` / `tel:` handler.
    External,
    /// Another page of this site.
    Page,
    Other,
}

pub fn classify(href: &str) -> LinkKind {
    if href.starts_with('#') {
        LinkKind::Anchor
    } else if href.starts_with("//")
        || href.starts_with("http")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
    {
        LinkKind::External
    } else if href.is_empty() || href == "/" || href.ends_with(".html") {
        LinkKind::Page
    } else {
        LinkKind::Other
    }
}

/// Click details that decide whether the exit animation may take over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkClick<'a> {
    pub href: &'a str,
    pub new_tab: bool,
    pub modified: bool,
}

impl LinkClick<'_> {
    pub fn should_intercept(&self) -> bool {
        !self.new_tab && !self.modified && classify(self.href) == LinkKind::Page
    }
}

/// Exit animations hold navigation back, so they only run with full motion.
pub fn intercepts_links(motion: MotionPreference) -> bool {
    !motion.is_reduced()
}

pub fn init(page: &Page) -> Result<()> {
    let wrapper = page.document.query_selector(WRAPPER_SELECTOR)?;
    if let Some(wrapper) = &wrapper {
        enter(&page.window, wrapper.clone())?;
    }
    if !intercepts_links(page.motion) {
        return Ok(());
    }

    let window = page.window.clone();
    let delay_ms = page.config.transition_delay_ms;
    dom::listen_active(&page.document, "click", move |event| {
        let Some(mouse) = event.dyn_ref::<MouseEvent>() else {
            return;
        };
        let Some(link) = event
            .target()
            .and_then(|target| target.dyn_into::<Element>().ok())
            .and_then(|target| target.closest("a[href]").ok().flatten())
        else {
            return;
        };
        let href = link.get_attribute("href").unwrap_or_default();
        let click = LinkClick {
            href: &href,
            new_tab: link.get_attribute("target").as_deref() == Some("_blank"),
            modified: mouse.button() != 0
                || mouse.ctrl_key()
                || mouse.meta_key()
                || mouse.shift_key()
                || mouse.alt_key(),
        };
        if !click.should_intercept() {
            return;
        }
        event.prevent_default();
        leave(&window, wrapper.as_ref(), href, delay_ms);
    });
    debug!("page transitions enabled");
    Ok(())
}

/// Marks the wrapper loaded on the second frame, after the initial state
/// has been painted.
fn enter(window: &Window, wrapper: Element) -> Result<()> {
    let second = Closure::once_into_js(move || {
        let _ = wrapper.class_list().add_1(LOADED_CLASS);
    });
    let frame_window = window.clone();
    let first = Closure::once_into_js(move || {
        let _ = frame_window.request_animation_frame(second.unchecked_ref());
    });
    window.request_animation_frame(first.unchecked_ref())?;
    Ok(())
}

fn leave(window: &Window, wrapper: Option<&Element>, href: String, delay_ms: u32) {
    let Some(wrapper) = wrapper else {
        let _ = window.location().set_href(&href);
        return;
    };
    let classes = wrapper.class_list();
    let _ = classes.add_1(EXITING_CLASS);
    let _ = classes.remove_1(LOADED_CLASS);
    let window = window.clone();
    Timeout::new(delay_ms, move || {
        let _ = window.location().set_href(&href);
    })
    .forget();
}
