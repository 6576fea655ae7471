//! Cosmetic pointer and scroll transforms: magnetic buttons, card tilt and
//! parallax layers. None of them are installed under reduced motion.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use gloo_render::{request_animation_frame, AnimationFrame};
use log::debug;
use wasm_bindgen::JsCast;
use web_sys::{Element, MouseEvent};

use crate::dom;
use crate::error::Result;
use crate::motion::MotionPreference;
use crate::page::Page;

pub const MAGNETIC_STRENGTH: f64 = 0.3;
pub const TILT_DEGREES: f64 = 6.0;
pub const DEFAULT_PARALLAX_SPEED: f64 = 0.1;

pub const MAGNETIC_REST: &str = "translate(0, 0)";
pub const TILT_REST: &str = "perspective(600px) rotateX(0) rotateY(0) translateY(0)";

/// Element box in viewport coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    fn of(element: &Element) -> Self {
        let rect = element.get_bounding_client_rect();
        Bounds {
            left: rect.left(),
            top: rect.top(),
            width: rect.width(),
            height: rect.height(),
        }
    }
}

pub fn magnetic_transform(x: f64, y: f64, bounds: Bounds) -> String {
    let dx = x - bounds.left - bounds.width / 2.0;
    let dy = y - bounds.top - bounds.height / 2.0;
    format!(
        "translate({}px, {}px)",
        dx * MAGNETIC_STRENGTH,
        dy * MAGNETIC_STRENGTH
    )
}

/// `(rotate_x, rotate_y)` in degrees for a pointer at `(x, y)`.
pub fn tilt_angles(x: f64, y: f64, bounds: Bounds) -> (f64, f64) {
    if bounds.width <= 0.0 || bounds.height <= 0.0 {
        return (0.0, 0.0);
    }
    let nx = ((x - bounds.left) / bounds.width - 0.5).clamp(-0.5, 0.5);
    let ny = ((y - bounds.top) / bounds.height - 0.5).clamp(-0.5, 0.5);
    (ny * -TILT_DEGREES, nx * TILT_DEGREES)
}

pub fn tilt_transform(x: f64, y: f64, bounds: Bounds) -> String {
    let (rotate_x, rotate_y) = tilt_angles(x, y, bounds);
    format!(
        "perspective(600px) rotateX({}deg) rotateY({}deg) translateY(-4px)",
        rotate_x, rotate_y
    )
}

/// Speed factor from a `data-parallax` value. Missing, unparsable and zero
/// values all fall back to the default.
pub fn parallax_speed(raw: Option<&str>) -> f64 {
    raw.and_then(|value| value.trim().parse::<f64>().ok())
        .filter(|speed| speed.is_finite() && *speed != 0.0)
        .unwrap_or(DEFAULT_PARALLAX_SPEED)
}

pub fn parallax_offset(scroll_y: f64, top: f64, speed: f64) -> f64 {
    let offset = (top + scroll_y) * speed;
    scroll_y * speed - offset
}

/// Whether any pointer or scroll transform is installed at all.
pub fn enabled(motion: MotionPreference) -> bool {
    !motion.is_reduced()
}

pub fn init(page: &Page) -> Result<()> {
    if !enabled(page.motion) {
        debug!("reduced motion: pointer effects off");
        return Ok(());
    }
    init_magnetic(page)?;
    init_tilt(page)?;
    init_parallax(page)?;
    Ok(())
}

fn init_magnetic(page: &Page) -> Result<()> {
    let buttons = dom::query_all(&page.document, "[data-magnetic]")?;
    for button in &buttons {
        let target = button.clone();
        dom::listen(button, "mousemove", move |event| {
            if let Some(event) = event.dyn_ref::<MouseEvent>() {
                let transform = magnetic_transform(
                    f64::from(event.client_x()),
                    f64::from(event.client_y()),
                    Bounds::of(&target),
                );
                let _ = dom::set_style(&target, "transform", &transform);
            }
        });
        let target = button.clone();
        dom::listen(button, "mouseleave", move |_| {
            let _ = dom::set_style(&target, "transform", MAGNETIC_REST);
        });
    }
    if !buttons.is_empty() {
        debug!("magnetic buttons: {}", buttons.len());
    }
    Ok(())
}

fn init_tilt(page: &Page) -> Result<()> {
    for card in dom::query_all(&page.document, "[data-tilt]")? {
        let target = card.clone();
        dom::listen(&card, "mousemove", move |event| {
            if let Some(event) = event.dyn_ref::<MouseEvent>() {
                let transform = tilt_transform(
                    f64::from(event.client_x()),
                    f64::from(event.client_y()),
                    Bounds::of(&target),
                );
                let _ = dom::set_style(&target, "transform", &transform);
            }
        });
        let target = card.clone();
        dom::listen(&card, "mouseleave", move |_| {
            let _ = dom::set_style(&target, "transform", TILT_REST);
        });
    }
    Ok(())
}

fn init_parallax(page: &Page) -> Result<()> {
    let layers: Vec<(Element, f64)> = dom::query_all(&page.document, "[data-parallax]")?
        .into_iter()
        .map(|el| {
            let speed = parallax_speed(dom::data_attr(&el, "parallax").as_deref());
            (el, speed)
        })
        .collect();
    if layers.is_empty() {
        return Ok(());
    }
    debug!("parallax layers: {}", layers.len());

    let layers = Rc::new(layers);
    let pending: Rc<RefCell<Option<AnimationFrame>>> = Rc::new(RefCell::new(None));
    let ticking = Rc::new(Cell::new(false));
    let window = page.window.clone();
    dom::listen(&page.window, "scroll", move |_| {
        if ticking.replace(true) {
            return;
        }
        let layers = layers.clone();
        let ticking = ticking.clone();
        let window = window.clone();
        let frame = request_animation_frame(move |_| {
            let scroll_y = window.scroll_y().unwrap_or(0.0);
            for (layer, speed) in layers.iter() {
                let top = layer.get_bounding_client_rect().top();
                let shift = parallax_offset(scroll_y, top, *speed);
                let _ = dom::set_style(layer, "transform", &format!("translateY({}px)", shift));
            }
            ticking.set(false);
        });
        *pending.borrow_mut() = Some(frame);
    });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn effects_only_with_full_motion() {
        assert!(enabled(MotionPreference::Full));
        assert!(!enabled(MotionPreference::Reduced));
    }

    const CARD: Bounds = Bounds {
        left: 100.0,
        top: 50.0,
        width: 200.0,
        height: 100.0,
    };

    #[test]
    fn magnetic_pull_is_scaled_offset_from_centre() {
        assert_eq!(magnetic_transform(200.0, 100.0, CARD), "translate(0px, 0px)");
        assert_eq!(magnetic_transform(300.0, 150.0, CARD), "translate(30px, 15px)");
    }

    #[test]
    fn tilt_is_zero_at_centre() {
        assert_eq!(tilt_angles(200.0, 100.0, CARD), (0.0, 0.0));
    }

    #[test]
    fn tilt_stays_within_six_degrees() {
        for (x, y) in [(-1e6, -1e6), (1e6, 1e6), (100.0, 150.0), (300.0, 50.0)] {
            let (rx, ry) = tilt_angles(x, y, CARD);
            assert!(rx.abs() <= TILT_DEGREES, "rotateX {rx}");
            assert!(ry.abs() <= TILT_DEGREES, "rotateY {ry}");
        }
    }

    #[test]
    fn tilt_leans_towards_pointer() {
        let (rx, ry) = tilt_angles(300.0, 50.0, CARD);
        assert_eq!(rx, 3.0);
        assert_eq!(ry, 3.0);
    }

    #[test]
    fn degenerate_card_does_not_tilt() {
        let flat = Bounds {
            width: 0.0,
            ..CARD
        };
        assert_eq!(tilt_angles(10.0, 10.0, flat), (0.0, 0.0));
    }

    #[test]
    fn parallax_speed_falls_back_to_default() {
        assert_eq!(parallax_speed(None), DEFAULT_PARALLAX_SPEED);
        assert_eq!(parallax_speed(Some("fast")), DEFAULT_PARALLAX_SPEED);
        assert_eq!(parallax_speed(Some("0")), DEFAULT_PARALLAX_SPEED);
        assert_eq!(parallax_speed(Some("0.4")), 0.4);
        assert_eq!(parallax_speed(Some("-0.2")), -0.2);
    }

    #[test]
    fn parallax_offset_scales_with_speed() {
        assert_eq!(parallax_offset(300.0, 200.0, 0.5), -100.0);
        assert_eq!(parallax_offset(0.0, 0.0, 0.5), 0.0);
    }
}
