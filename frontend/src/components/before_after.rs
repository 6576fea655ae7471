use std::cell::RefCell;
use std::rc::Rc;

use log::{debug, warn};
use wasm_bindgen::JsCast;
use web_sys::{Element, KeyboardEvent, MouseEvent, TouchEvent};

use crate::dom;
use crate::error::Result;
use crate::page::Page;

pub const MIN_POSITION: f64 = 5.0;
pub const MAX_POSITION: f64 = 95.0;
pub const INITIAL_POSITION: f64 = 50.0;
pub const KEY_STEP: f64 = 2.0;

const ARIA_LABEL: &str = "Before and after comparison";

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SliderInput {
    /// Pointer pressed at `x` inside a container starting at `left` with `width`.
    Press { x: f64, left: f64, width: f64 },
    Move { x: f64, left: f64, width: f64 },
    Release,
    StepLeft,
    StepRight,
}

/// Divider position of one before/after slider, in percent of its width.
#[derive(Debug, Clone, PartialEq)]
pub struct SliderState {
    position: f64,
    dragging: bool,
}

impl Default for SliderState {
    fn default() -> Self {
        Self {
            position: INITIAL_POSITION,
            dragging: false,
        }
    }
}

impl SliderState {
    #[cfg(test)]
    pub fn position(&self) -> f64 {
        self.position
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// Applies one input. Returns `true` when the position changed.
    pub fn apply(&mut self, input: SliderInput) -> bool {
        let before = self.position;
        match input {
            SliderInput::Press { x, left, width } => {
                self.dragging = true;
                self.track_pointer(x, left, width);
            }
            SliderInput::Move { x, left, width } => {
                if self.dragging {
                    self.track_pointer(x, left, width);
                }
            }
            SliderInput::Release => self.dragging = false,
            SliderInput::StepLeft => self.position = clamp(self.position - KEY_STEP),
            SliderInput::StepRight => self.position = clamp(self.position + KEY_STEP),
        }
        self.position != before
    }

    fn track_pointer(&mut self, x: f64, left: f64, width: f64) {
        if width <= 0.0 || !x.is_finite() {
            return;
        }
        self.position = clamp((x - left) / width * 100.0);
    }

    pub fn view(&self) -> SliderView {
        let p = self.position;
        SliderView {
            before_clip: format!("inset(0 {}% 0 0)", 100.0 - p),
            after_clip: format!("inset(0 0 0 {}%)", p),
            divider_left: format!("{}%", p),
            aria_now: p.round() as i32,
        }
    }
}

fn clamp(position: f64) -> f64 {
    position.clamp(MIN_POSITION, MAX_POSITION)
}

/// Presentation of a [`SliderState`].
#[derive(Debug, Clone, PartialEq)]
pub struct SliderView {
    pub before_clip: String,
    pub after_clip: String,
    pub divider_left: String,
    pub aria_now: i32,
}

struct SliderParts {
    root: Element,
    before: Element,
    after: Element,
    line: Element,
    handle: Element,
}

impl SliderParts {
    fn find(root: Element) -> Result<Option<Self>> {
        let before = dom::query_in(&root, ".ba-slider__before")?;
        let after = dom::query_in(&root, ".ba-slider__after")?;
        let line = dom::query_in(&root, ".ba-slider__line")?;
        let handle = dom::query_in(&root, ".ba-slider__handle")?;
        Ok(match (before, after, line, handle) {
            (Some(before), Some(after), Some(line), Some(handle)) => Some(SliderParts {
                root,
                before,
                after,
                line,
                handle,
            }),
            _ => None,
        })
    }

    fn render(&self, view: &SliderView) -> Result<()> {
        dom::set_style(&self.before, "clip-path", &view.before_clip)?;
        dom::set_style(&self.after, "clip-path", &view.after_clip)?;
        dom::set_style(&self.line, "left", &view.divider_left)?;
        dom::set_style(&self.handle, "left", &view.divider_left)?;
        self.root
            .set_attribute("aria-valuenow", &view.aria_now.to_string())?;
        Ok(())
    }

    fn press(&self, x: f64) -> SliderInput {
        let rect = self.root.get_bounding_client_rect();
        SliderInput::Press {
            x,
            left: rect.left(),
            width: rect.width(),
        }
    }

    fn drag_to(&self, x: f64) -> SliderInput {
        let rect = self.root.get_bounding_client_rect();
        SliderInput::Move {
            x,
            left: rect.left(),
            width: rect.width(),
        }
    }
}

struct Slider {
    parts: SliderParts,
    state: RefCell<SliderState>,
}

impl Slider {
    fn feed(&self, input: SliderInput) -> bool {
        let (changed, view) = {
            let mut state = self.state.borrow_mut();
            let changed = state.apply(input);
            (changed, state.view())
        };
        if changed {
            if let Err(err) = self.parts.render(&view) {
                warn!("before/after slider render failed: {}", err);
            }
        }
        changed
    }
}

fn first_touch_x(event: &TouchEvent) -> Option<f64> {
    event.touches().get(0).map(|touch| f64::from(touch.client_x()))
}

pub fn init(page: &Page) -> Result<()> {
    let mut wired = 0;
    for root in dom::query_all(&page.document, ".ba-slider")? {
        let Some(parts) = SliderParts::find(root)? else {
            continue;
        };
        wire(page, parts)?;
        wired += 1;
    }
    if wired > 0 {
        debug!("before/after sliders wired: {}", wired);
    }
    Ok(())
}

fn wire(page: &Page, parts: SliderParts) -> Result<()> {
    let root = parts.root.clone();
    root.set_attribute("tabindex", "0")?;
    root.set_attribute("role", "slider")?;
    root.set_attribute("aria-label", ARIA_LABEL)?;
    root.set_attribute("aria-valuemin", &MIN_POSITION.to_string())?;
    root.set_attribute("aria-valuemax", &MAX_POSITION.to_string())?;

    let slider = Rc::new(Slider {
        parts,
        state: RefCell::new(SliderState::default()),
    });
    slider.parts.render(&slider.state.borrow().view())?;

    {
        let slider = slider.clone();
        dom::listen(&root, "mousedown", move |event| {
            if let Some(event) = event.dyn_ref::<MouseEvent>() {
                let input = slider.parts.press(f64::from(event.client_x()));
                slider.feed(input);
            }
        });
    }
    {
        let slider = slider.clone();
        dom::listen(&page.window, "mousemove", move |event| {
            if !slider.state.borrow().is_dragging() {
                return;
            }
            if let Some(event) = event.dyn_ref::<MouseEvent>() {
                let input = slider.parts.drag_to(f64::from(event.client_x()));
                slider.feed(input);
            }
        });
    }
    {
        let slider = slider.clone();
        dom::listen(&page.window, "mouseup", move |_| {
            slider.feed(SliderInput::Release);
        });
    }
    {
        let slider = slider.clone();
        dom::listen(&root, "touchstart", move |event| {
            if let Some(x) = event.dyn_ref::<TouchEvent>().and_then(first_touch_x) {
                let input = slider.parts.press(x);
                slider.feed(input);
            }
        });
    }
    {
        let slider = slider.clone();
        dom::listen(&page.window, "touchmove", move |event| {
            if !slider.state.borrow().is_dragging() {
                return;
            }
            if let Some(x) = event.dyn_ref::<TouchEvent>().and_then(first_touch_x) {
                let input = slider.parts.drag_to(x);
                slider.feed(input);
            }
        });
    }
    {
        let slider = slider.clone();
        dom::listen(&page.window, "touchend", move |_| {
            slider.feed(SliderInput::Release);
        });
    }

    dom::listen_active(&root, "keydown", move |event| {
        let Some(event) = event.dyn_ref::<KeyboardEvent>() else {
            return;
        };
        let input = match event.key().as_str() {
            "ArrowLeft" => SliderInput::StepLeft,
            "ArrowRight" => SliderInput::StepRight,
            _ => return,
        };
        if slider.feed(input) {
            event.prevent_default();
        }
    });
    Ok(())
}
