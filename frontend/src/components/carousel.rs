use std::cell::RefCell;
use std::rc::Rc;

use gloo_timers::callback::{Interval, Timeout};
use log::debug;
use wasm_bindgen::JsCast;
use web_sys::js_sys::Date;
use web_sys::{Element, MouseEvent, ScrollBehavior, ScrollToOptions, Window};

use crate::dom;
use crate::error::Result;
use crate::page::Page;

pub const CAROUSEL_SELECTOR: &str = ".reviews-carousel";
pub const TRACK_SELECTOR: &str = ".reviews-carousel__track";
pub const CARD_SELECTOR: &str = ".review-card";
pub const DRAGGING_CLASS: &str = "is-dragging";

/// Distance from the end of the track that already counts as "at the end".
pub const END_TOLERANCE_PX: f64 = 5.0;

/// Measured layout of a review track.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackGeometry {
    pub card_width: f64,
    pub gap: f64,
    pub scroll_left: f64,
    pub scroll_width: f64,
    pub client_width: f64,
    pub cards: usize,
}

impl TrackGeometry {
    /// One card plus the gap that follows it.
    pub fn step(&self) -> f64 {
        self.card_width + self.gap
    }

    pub fn max_scroll(&self) -> f64 {
        (self.scroll_width - self.client_width).max(0.0)
    }

    pub fn clamp(&self, offset: f64) -> f64 {
        offset.clamp(0.0, self.max_scroll())
    }

    /// Target of one auto-advance tick: one card further, or back to the
    /// start once the end of the track is reached.
    pub fn next_offset(&self) -> f64 {
        if self.scroll_left >= self.max_scroll() - END_TOLERANCE_PX {
            return 0.0;
        }
        self.clamp(self.scroll_left + self.step())
    }

    pub fn offset_for_index(&self, index: usize) -> f64 {
        self.clamp(self.step() * index as f64)
    }

    /// Card nearest to the current scroll position.
    pub fn index_at(&self, offset: f64) -> usize {
        let step = self.step();
        if step <= 0.0 || self.cards == 0 {
            return 0;
        }
        let index = (offset.max(0.0) / step).round() as usize;
        index.min(self.cards - 1)
    }

    /// Card to highlight for the current scroll position. Cards that start
    /// past the end of the scroll range can only be shown with the track
    /// fully scrolled, so that position belongs to the last card.
    pub fn active_index(&self) -> usize {
        let max = self.max_scroll();
        if self.cards > 0 && max > 0.0 && self.scroll_left >= max - END_TOLERANCE_PX {
            return self.cards - 1;
        }
        self.index_at(self.scroll_left)
    }
}

/// Mouse drag in progress on the track.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Drag {
    start_x: f64,
    start_offset: f64,
}

impl Drag {
    pub fn begin(x: f64, offset: f64) -> Self {
        Drag {
            start_x: x,
            start_offset: offset,
        }
    }

    pub fn offset_at(&self, x: f64, geometry: &TrackGeometry) -> f64 {
        geometry.clamp(self.start_offset - (x - self.start_x))
    }
}

/// Auto-advance run state. User interaction pauses it; it may resume only
/// once `resume_after_ms` has passed since the latest interaction.
#[derive(Debug, Clone, PartialEq)]
pub struct AutoAdvance {
    resume_after_ms: f64,
    running: bool,
    last_interaction: Option<f64>,
}

impl AutoAdvance {
    pub fn new(resume_after_ms: f64) -> Self {
        Self {
            resume_after_ms,
            running: false,
            last_interaction: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Returns `true` if this call started it.
    pub fn start(&mut self) -> bool {
        !std::mem::replace(&mut self.running, true)
    }

    pub fn interact(&mut self, now: f64) {
        self.running = false;
        self.last_interaction = Some(now);
    }

    /// Restarts after a quiet period. Returns `true` if it is now running
    /// and was not before.
    pub fn try_resume(&mut self, now: f64) -> bool {
        if self.running {
            return false;
        }
        let quiet = match self.last_interaction {
            Some(at) => now - at >= self.resume_after_ms,
            None => true,
        };
        if quiet {
            self.running = true;
        }
        quiet
    }

    /// Time left in the current quiet window.
    pub fn remaining(&self, now: f64) -> f64 {
        match self.last_interaction {
            Some(at) => (self.resume_after_ms - (now - at)).max(0.0),
            None => 0.0,
        }
    }
}

pub fn measure(window: &Window, track: &Element, first_card: &Element, default_gap: f64) -> TrackGeometry {
    let gap = window
        .get_computed_style(track)
        .ok()
        .flatten()
        .and_then(|style| style.get_property_value("gap").ok())
        .and_then(|value| dom::parse_px(&value))
        .unwrap_or(default_gap);
    let cards = track
        .query_selector_all(CARD_SELECTOR)
        .map(|list| list.length() as usize)
        .unwrap_or(0);
    TrackGeometry {
        card_width: dom::offset_width(first_card),
        gap,
        scroll_left: f64::from(track.scroll_left()),
        scroll_width: f64::from(track.scroll_width()),
        client_width: f64::from(track.client_width()),
        cards,
    }
}

pub fn scroll_track(track: &Element, left: f64, behavior: ScrollBehavior) {
    let options = ScrollToOptions::new();
    options.set_left(left);
    options.set_behavior(behavior);
    track.scroll_to_with_scroll_to_options(&options);
}

struct Carousel {
    window: Window,
    track: Element,
    first_card: Element,
    default_gap: f64,
    interval_ms: u32,
    resume_ms: u32,
    auto: RefCell<AutoAdvance>,
    drag: RefCell<Option<Drag>>,
    ticker: RefCell<Option<Interval>>,
    resume_timer: RefCell<Option<Timeout>>,
}

impl Carousel {
    fn geometry(&self) -> TrackGeometry {
        measure(&self.window, &self.track, &self.first_card, self.default_gap)
    }

    fn start(self: &Rc<Self>) {
        if !self.auto.borrow_mut().start() {
            return;
        }
        self.install_ticker();
    }

    fn install_ticker(self: &Rc<Self>) {
        let carousel = Rc::clone(self);
        let ticker = Interval::new(self.interval_ms, move || {
            let next = carousel.geometry().next_offset();
            scroll_track(&carousel.track, next, ScrollBehavior::Smooth);
        });
        *self.ticker.borrow_mut() = Some(ticker);
    }

    /// Stops auto-advance and re-arms the inactivity timer.
    fn pause(self: &Rc<Self>) {
        self.auto.borrow_mut().interact(Date::now());
        self.ticker.borrow_mut().take();
        self.arm_resume(self.resume_ms);
    }

    fn arm_resume(self: &Rc<Self>, delay_ms: u32) {
        let carousel = Rc::clone(self);
        let timer = Timeout::new(delay_ms, move || {
            let now = Date::now();
            let resumed = carousel.auto.borrow_mut().try_resume(now);
            if resumed {
                carousel.install_ticker();
            } else if !carousel.auto.borrow().is_running() {
                // Fired a little early; wait out the rest of the window.
                let rest = carousel.auto.borrow().remaining(now).ceil().max(1.0) as u32;
                carousel.arm_resume(rest);
            }
        });
        *self.resume_timer.borrow_mut() = Some(timer);
    }

    /// Drag activity. While paused it only moves the quiet window along, since
    /// a pending resume timer waits out whatever remains.
    fn hold(self: &Rc<Self>) {
        let running = self.auto.borrow().is_running();
        if running {
            self.pause();
        } else {
            self.auto.borrow_mut().interact(Date::now());
        }
    }

    fn end_drag(self: &Rc<Self>) {
        if self.drag.borrow_mut().take().is_some() {
            self.hold();
        }
        let _ = self.track.class_list().remove_1(DRAGGING_CLASS);
    }
}

fn page_x(track: &Element, event: &MouseEvent) -> f64 {
    let offset_left = track
        .dyn_ref::<web_sys::HtmlElement>()
        .map(|html| f64::from(html.offset_left()))
        .unwrap_or(0.0);
    f64::from(event.page_x()) - offset_left
}

pub fn init(page: &Page) -> Result<()> {
    for root in dom::query_all(&page.document, CAROUSEL_SELECTOR)? {
        let Some(track) = dom::query_in(&root, TRACK_SELECTOR)? else {
            continue;
        };
        let Some(first_card) = dom::query_in(&track, CARD_SELECTOR)? else {
            continue;
        };
        wire(page, track, first_card);
    }
    Ok(())
}

fn wire(page: &Page, track: Element, first_card: Element) {
    let carousel = Rc::new(Carousel {
        window: page.window.clone(),
        track: track.clone(),
        first_card,
        default_gap: page.config.carousel_default_gap_px,
        interval_ms: page.config.carousel_interval_ms,
        resume_ms: page.config.carousel_resume_ms,
        auto: RefCell::new(AutoAdvance::new(f64::from(page.config.carousel_resume_ms))),
        drag: RefCell::new(None),
        ticker: RefCell::new(None),
        resume_timer: RefCell::new(None),
    });

    {
        let carousel = carousel.clone();
        dom::listen(&track, "mousedown", move |event| {
            let Some(event) = event.dyn_ref::<MouseEvent>() else {
                return;
            };
            let _ = carousel.track.class_list().add_1(DRAGGING_CLASS);
            let offset = f64::from(carousel.track.scroll_left());
            *carousel.drag.borrow_mut() = Some(Drag::begin(page_x(&carousel.track, event), offset));
            carousel.pause();
        });
    }
    {
        let carousel = carousel.clone();
        dom::listen(&track, "mouseleave", move |_| carousel.end_drag());
    }
    {
        let carousel = carousel.clone();
        dom::listen(&track, "mouseup", move |_| carousel.end_drag());
    }
    {
        let carousel = carousel.clone();
        dom::listen_active(&track, "mousemove", move |event| {
            let Some(drag) = *carousel.drag.borrow() else {
                return;
            };
            let Some(event) = event.dyn_ref::<MouseEvent>() else {
                return;
            };
            event.prevent_default();
            carousel.hold();
            let target = drag.offset_at(page_x(&carousel.track, event), &carousel.geometry());
            scroll_track(&carousel.track, target, ScrollBehavior::Auto);
        });
    }
    {
        let carousel = carousel.clone();
        dom::listen(&track, "touchstart", move |_| carousel.pause());
    }

    carousel.start();
    debug!("reviews carousel auto-advancing every {}ms", carousel.interval_ms);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(scroll_left: f64) -> TrackGeometry {
        TrackGeometry {
            card_width: 300.0,
            gap: 20.0,
            scroll_left,
            scroll_width: 1600.0,
            client_width: 640.0,
            cards: 5,
        }
    }

    #[test]
    fn step_includes_gap() {
        assert_eq!(track(0.0).step(), 320.0);
        assert_eq!(track(0.0).max_scroll(), 960.0);
    }

    #[test]
    fn advance_moves_one_card() {
        assert_eq!(track(0.0).next_offset(), 320.0);
        assert_eq!(track(320.0).next_offset(), 640.0);
    }

    #[test]
    fn advance_is_capped_at_the_end() {
        assert_eq!(track(800.0).next_offset(), 960.0);
    }

    #[test]
    fn advance_wraps_from_the_end() {
        assert_eq!(track(960.0).next_offset(), 0.0);
        assert_eq!(track(956.0).next_offset(), 0.0);
    }

    #[test]
    fn short_track_never_scrolls() {
        let geometry = TrackGeometry {
            scroll_width: 500.0,
            ..track(0.0)
        };
        assert_eq!(geometry.max_scroll(), 0.0);
        assert_eq!(geometry.next_offset(), 0.0);
        assert_eq!(geometry.offset_for_index(3), 0.0);
    }

    #[test]
    fn index_offsets_stay_in_bounds() {
        let geometry = track(0.0);
        assert_eq!(geometry.offset_for_index(1), 320.0);
        assert_eq!(geometry.offset_for_index(4), 960.0);
    }

    #[test]
    fn nearest_index_rounds_and_caps() {
        let geometry = track(0.0);
        assert_eq!(geometry.index_at(0.0), 0);
        assert_eq!(geometry.index_at(170.0), 1);
        assert_eq!(geometry.index_at(960.0), 3);
        assert_eq!(geometry.index_at(10_000.0), 4);
        assert_eq!(geometry.index_at(-50.0), 0);
    }

    #[test]
    fn fully_scrolled_track_highlights_the_last_card() {
        assert_eq!(track(0.0).active_index(), 0);
        assert_eq!(track(640.0).active_index(), 2);
        assert_eq!(track(960.0).active_index(), 4);
        assert_eq!(track(956.0).active_index(), 4);
        let clicked = track(0.0).offset_for_index(4);
        assert_eq!(track(clicked).active_index(), 4);
    }

    #[test]
    fn short_track_highlights_the_first_card() {
        let geometry = TrackGeometry {
            scroll_width: 500.0,
            ..track(0.0)
        };
        assert_eq!(geometry.active_index(), 0);
    }

    #[test]
    fn drag_follows_pointer_within_bounds() {
        let geometry = track(320.0);
        let drag = Drag::begin(500.0, 320.0);
        assert_eq!(drag.offset_at(400.0, &geometry), 420.0);
        assert_eq!(drag.offset_at(2000.0, &geometry), 0.0);
        assert_eq!(drag.offset_at(-2000.0, &geometry), 960.0);
    }

    #[test]
    fn auto_advance_starts_once() {
        let mut auto = AutoAdvance::new(8000.0);
        assert!(auto.start());
        assert!(!auto.start());
        assert!(auto.is_running());
    }

    #[test]
    fn interaction_pauses_until_quiet_window_elapses() {
        let mut auto = AutoAdvance::new(8000.0);
        auto.start();
        auto.interact(0.0);
        assert!(!auto.is_running());
        assert!(!auto.try_resume(7999.0));
        assert!(auto.try_resume(8000.0));
        assert!(auto.is_running());
    }

    #[test]
    fn further_interaction_extends_the_pause() {
        let mut auto = AutoAdvance::new(8000.0);
        auto.start();
        auto.interact(0.0);
        auto.interact(5000.0);
        assert!(!auto.try_resume(8000.0));
        assert!(!auto.try_resume(12_999.0));
        assert!(auto.try_resume(13_000.0));
    }

    #[test]
    fn held_drag_keeps_auto_advance_paused() {
        let mut auto = AutoAdvance::new(8000.0);
        auto.start();
        auto.interact(0.0);
        for moved_at in [2000.0, 5000.0, 7900.0] {
            auto.interact(moved_at);
        }
        assert!(!auto.try_resume(8000.0));
        assert_eq!(auto.remaining(8000.0), 7900.0);
        assert!(auto.try_resume(15_900.0));
    }

    #[test]
    fn remaining_counts_down_the_quiet_window() {
        let mut auto = AutoAdvance::new(8000.0);
        assert_eq!(auto.remaining(0.0), 0.0);
        auto.interact(1000.0);
        assert_eq!(auto.remaining(3000.0), 6000.0);
        assert_eq!(auto.remaining(20_000.0), 0.0);
    }
}
