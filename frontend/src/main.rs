use std::rc::Rc;

use log::{info, warn};

mod config;
mod dom;
mod error;
mod motion;
mod observer;
mod page;
mod routes;
mod components {
    pub mod anchors;
    pub mod before_after;
    pub mod booking_form;
    pub mod carousel;
    pub mod counter;
    pub mod faq;
    pub mod nav;
    pub mod pointer_fx;
    pub mod reveal;
    pub mod review_count;
    pub mod review_dots;
    pub mod sticky_bar;
    pub mod transition;
}

use components::{
    anchors, before_after, booking_form, carousel, counter, faq, nav, pointer_fx, reveal,
    review_count, review_dots, sticky_bar, transition,
};
use config::SiteConfig;
use error::{Error, Result};
use motion::MotionPreference;
use page::Page;

type Init = fn(&Page) -> Result<()>;

/// Widgets in start-up order. Each one is independent; a failure in one is
/// logged and the rest still run.
const WIDGETS: [(&str, Init); 13] = [
    ("transition", transition::init),
    ("nav", nav::init),
    ("reveal", reveal::init),
    ("faq", faq::init),
    ("before_after", before_after::init),
    ("pointer_fx", pointer_fx::init),
    ("counter", counter::init),
    ("booking_form", booking_form::init),
    ("anchors", anchors::init),
    ("carousel", carousel::init),
    ("review_dots", review_dots::init),
    ("review_count", review_count::init),
    ("sticky_bar", sticky_bar::init),
];

fn start() -> Result<()> {
    let window = dom::window()?;
    let document = window.document().ok_or(Error::NoDocument)?;

    let config = SiteConfig::from_document(&document).unwrap_or_else(|err| {
        warn!("{}, using defaults", err);
        SiteConfig::default()
    });
    let motion = MotionPreference::detect(&window);
    if motion.is_reduced() {
        info!("Reduced motion requested");
    }

    let page = Page {
        window,
        document,
        config: Rc::new(config),
        motion,
    };
    for (name, init) in WIDGETS {
        if let Err(err) = init(&page) {
            warn!("{} not initialized: {}", name, err);
        }
    }
    Ok(())
}

fn main() {
    // Initialize console error panic hook for better error messages
    console_error_panic_hook::set_once();

    // Initialize logging
    console_log::init_with_level(config::log_level()).expect("error initializing log");

    // The bundle is loaded as a module script, so the document is parsed by now.
    info!("Starting page behaviors");
    if let Err(err) = start() {
        warn!("page behaviors disabled: {}", err);
    }
}
