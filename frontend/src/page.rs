use std::rc::Rc;

use web_sys::{Document, Window};

use crate::config::SiteConfig;
use crate::motion::MotionPreference;

/// Everything a widget needs to wire itself up, resolved once per page load.
#[derive(Debug, Clone)]
pub struct Page {
    pub window: Window,
    pub document: Document,
    pub config: Rc<SiteConfig>,
    pub motion: MotionPreference,
}
