use log::debug;

use crate::dom;
use crate::error::Result;
use crate::observer::{self, Visibility};
use crate::page::Page;

const BAR_SELECTOR: &str = ".sticky-bar";
const SECTION_SELECTOR: &str = "#contact-form";
const VISIBLE_CLASS: &str = "is-visible";

/// The call-to-action bar is shown exactly while the booking section is off
/// screen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StickyBar {
    visible: bool,
}

impl StickyBar {
    #[cfg(test)]
    pub fn is_visible(self) -> bool {
        self.visible
    }

    /// Returns the new visibility when it changed.
    pub fn on_section(&mut self, section_in_view: bool) -> Option<bool> {
        let visible = !section_in_view;
        if visible == self.visible {
            return None;
        }
        self.visible = visible;
        Some(visible)
    }
}

pub fn init(page: &Page) -> Result<()> {
    let Some(bar) = page.document.query_selector(BAR_SELECTOR)? else {
        return Ok(());
    };
    let Some(section) = page.document.query_selector(SECTION_SELECTOR)? else {
        return Ok(());
    };
    let mut state = StickyBar::default();
    observer::watch(&[section], Visibility::at(0.0), move |_, in_view, _| {
        if let Some(visible) = state.on_section(in_view) {
            let _ = dom::toggle_class(&bar, VISIBLE_CLASS, visible);
        }
    })?;
    debug!("sticky bar tracking {}", SECTION_SELECTOR);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::StickyBar;

    #[test]
    fn hidden_while_section_in_view() {
        let mut bar = StickyBar::default();
        assert_eq!(bar.on_section(true), None);
        assert!(!bar.is_visible());
    }

    #[test]
    fn follows_section_visibility() {
        let mut bar = StickyBar::default();
        assert_eq!(bar.on_section(false), Some(true));
        assert_eq!(bar.on_section(false), None);
        assert_eq!(bar.on_section(true), Some(false));
        assert_eq!(bar.on_section(false), Some(true));
    }
}
