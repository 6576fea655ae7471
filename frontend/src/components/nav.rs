use std::cell::{Cell, RefCell};
use std::rc::Rc;

use gloo_render::{request_animation_frame, AnimationFrame};
use log::debug;
use web_sys::{Element, Window};

use crate::dom;
use crate::error::Result;
use crate::page::Page;
use crate::routes;

const NAV_SELECTOR: &str = ".nav";
const TOGGLE_SELECTOR: &str = ".nav__toggle";
const LINKS_SELECTOR: &str = ".nav__links";
const INNER_SELECTOR: &str = ".nav__inner";
const LOGO_SELECTOR: &str = ".nav__logo";
const LINK_SELECTOR: &str = ".nav__link";

const OPEN_CLASS: &str = "is-open";
const ACTIVE_CLASS: &str = "is-active";
const SCROLLED_CLASS: &str = "is-scrolled";
const MOBILE_CLASS: &str = "nav--mobile";

/// Styles forced on the link row while measuring its single-line width.
const PROBE_STYLES: [(&str, &str); 3] = [
    ("flex-wrap", "nowrap"),
    ("overflow", "hidden"),
    ("white-space", "nowrap"),
];

/// Mobile menu state. Taps that turn into scrolls must not toggle the menu,
/// so a touch move since the last touch start swallows the next click.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MenuState {
    open: bool,
    touch_moved: bool,
}

impl MenuState {
    pub fn is_open(self) -> bool {
        self.open
    }

    pub fn touch_start(&mut self) {
        self.touch_moved = false;
    }

    pub fn touch_move(&mut self) {
        self.touch_moved = true;
    }

    /// Toggle activation. Returns the new open state, or `None` when the
    /// activation was the tail of a scroll gesture.
    pub fn click(&mut self) -> Option<bool> {
        if self.touch_moved {
            self.touch_moved = false;
            return None;
        }
        self.open = !self.open;
        Some(self.open)
    }

    pub fn close(&mut self) -> bool {
        std::mem::replace(&mut self.open, false)
    }
}

/// Whether the link row needs the hamburger layout.
pub fn needs_collapse(inner_width: f64, logo_width: f64, links_width: f64, padding: f64) -> bool {
    links_width > inner_width - logo_width - padding
}

pub fn is_scrolled(scroll_y: f64, threshold: f64) -> bool {
    scroll_y > threshold
}

struct Menu {
    toggle: Element,
    links: Element,
    body: Option<Element>,
    state: RefCell<MenuState>,
}

impl Menu {
    fn render(&self) {
        let open = self.state.borrow().is_open();
        let _ = dom::toggle_class(&self.toggle, OPEN_CLASS, open);
        let _ = dom::toggle_class(&self.links, OPEN_CLASS, open);
        if let Some(body) = &self.body {
            let _ = if open {
                dom::set_style(body, "overflow", "hidden")
            } else {
                dom::clear_style(body, "overflow")
            };
        }
    }
}

pub fn init(page: &Page) -> Result<()> {
    let Some(nav) = page.document.query_selector(NAV_SELECTOR)? else {
        return Ok(());
    };

    wire_scrolled(page, &nav);
    wire_menu(page)?;
    highlight_current(page, &nav)?;

    check_overflow(&nav, page.config.nav_collapse_padding_px)?;
    let padding = page.config.nav_collapse_padding_px;
    let target = nav.clone();
    dom::listen(&page.window, "resize", move |_| {
        let _ = check_overflow(&target, padding);
    });
    Ok(())
}

fn wire_scrolled(page: &Page, nav: &Element) {
    let threshold = page.config.nav_scrolled_offset_px;
    let ticking = Rc::new(Cell::new(false));
    let pending: Rc<RefCell<Option<AnimationFrame>>> = Rc::new(RefCell::new(None));
    let window: Window = page.window.clone();
    let nav = nav.clone();
    dom::listen(&page.window, "scroll", move |_| {
        if ticking.replace(true) {
            return;
        }
        let ticking = ticking.clone();
        let window = window.clone();
        let nav = nav.clone();
        let frame = request_animation_frame(move |_| {
            let scroll_y = window.scroll_y().unwrap_or(0.0);
            let _ = dom::toggle_class(&nav, SCROLLED_CLASS, is_scrolled(scroll_y, threshold));
            ticking.set(false);
        });
        *pending.borrow_mut() = Some(frame);
    });
}

fn wire_menu(page: &Page) -> Result<()> {
    let toggle = page.document.query_selector(TOGGLE_SELECTOR)?;
    let links = page.document.query_selector(LINKS_SELECTOR)?;
    let (Some(toggle), Some(links)) = (toggle, links) else {
        debug!("nav without mobile toggle");
        return Ok(());
    };
    let menu = Rc::new(Menu {
        toggle: toggle.clone(),
        links: links.clone(),
        body: page.document.body().map(Element::from),
        state: RefCell::new(MenuState::default()),
    });

    {
        let menu = menu.clone();
        dom::listen(&toggle, "touchstart", move |_| menu.state.borrow_mut().touch_start());
    }
    {
        let menu = menu.clone();
        dom::listen(&toggle, "touchmove", move |_| menu.state.borrow_mut().touch_move());
    }
    {
        let menu = menu.clone();
        dom::listen(&toggle, "click", move |_| {
            let toggled = menu.state.borrow_mut().click();
            if toggled.is_some() {
                menu.render();
            }
        });
    }
    for link in dom::query_all_in(&links, "a")? {
        let menu = menu.clone();
        dom::listen(&link, "click", move |_| {
            menu.state.borrow_mut().close();
            menu.render();
        });
    }
    debug!("nav menu wired");
    Ok(())
}

fn highlight_current(page: &Page, nav: &Element) -> Result<()> {
    let path = page.window.location().pathname()?;
    for link in dom::query_all_in(nav, LINK_SELECTOR)? {
        let Some(href) = link.get_attribute("href") else {
            continue;
        };
        if routes::is_current(&href, &path) {
            link.class_list().add_1(ACTIVE_CLASS)?;
        }
    }
    Ok(())
}

/// Measures the link row on a single line and switches the nav to its
/// hamburger layout when the row would not fit beside the logo.
fn check_overflow(nav: &Element, padding: f64) -> Result<()> {
    nav.class_list().remove_1(MOBILE_CLASS)?;
    let Some(inner) = dom::query_in(nav, INNER_SELECTOR)? else {
        return Ok(());
    };
    let Some(links) = dom::query_in(nav, LINKS_SELECTOR)? else {
        return Ok(());
    };

    for (property, value) in PROBE_STYLES {
        dom::set_style(&links, property, value)?;
    }
    let logo_width = dom::query_in(nav, LOGO_SELECTOR)?
        .map(|logo| dom::offset_width(&logo))
        .unwrap_or(0.0);
    let links_width = f64::from(links.scroll_width());
    let inner_width = dom::offset_width(&inner);
    for (property, _) in PROBE_STYLES {
        dom::clear_style(&links, property)?;
    }

    if needs_collapse(inner_width, logo_width, links_width, padding) {
        nav.class_list().add_1(MOBILE_CLASS)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn click_toggles_menu() {
        let mut menu = MenuState::default();
        assert_eq!(menu.click(), Some(true));
        assert!(menu.is_open());
        assert_eq!(menu.click(), Some(false));
        assert!(!menu.is_open());
    }

    #[test]
    fn scroll_gesture_does_not_toggle() {
        let mut menu = MenuState::default();
        menu.touch_start();
        menu.touch_move();
        assert_eq!(menu.click(), None);
        assert!(!menu.is_open());
    }

    #[test]
    fn swallowed_click_clears_the_gesture() {
        let mut menu = MenuState::default();
        menu.touch_move();
        menu.click();
        assert_eq!(menu.click(), Some(true));
    }

    #[test]
    fn tap_without_move_toggles() {
        let mut menu = MenuState::default();
        menu.touch_start();
        assert_eq!(menu.click(), Some(true));
    }

    #[test]
    fn new_touch_resets_the_gesture() {
        let mut menu = MenuState::default();
        menu.touch_move();
        menu.touch_start();
        assert_eq!(menu.click(), Some(true));
    }

    #[test]
    fn closing_reports_whether_it_was_open() {
        let mut menu = MenuState::default();
        assert!(!menu.close());
        menu.click();
        assert!(menu.close());
        assert!(!menu.is_open());
    }

    #[test]
    fn collapses_only_when_links_overflow() {
        assert!(!needs_collapse(1200.0, 180.0, 900.0, 40.0));
        assert!(!needs_collapse(1200.0, 180.0, 980.0, 40.0));
        assert!(needs_collapse(1200.0, 180.0, 981.0, 40.0));
        assert!(needs_collapse(360.0, 120.0, 600.0, 40.0));
    }

    #[test]
    fn glass_effect_after_threshold() {
        assert!(!is_scrolled(0.0, 40.0));
        assert!(!is_scrolled(40.0, 40.0));
        assert!(is_scrolled(41.0, 40.0));
    }
}
