use std::cell::RefCell;
use std::rc::Rc;

use gloo_render::{request_animation_frame, AnimationFrame};
use log::{debug, warn};
use web_sys::js_sys::Number;
use web_sys::Element;

use crate::dom;
use crate::error::Result;
use crate::observer::{self, Visibility};
use crate::page::Page;

pub fn ease_out_cubic(t: f64) -> f64 {
    1.0 - (1.0 - t).powi(3)
}

/// Count-up from zero to `target` over `duration_ms`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CounterAnimation {
    target: i64,
    duration_ms: f64,
}

impl CounterAnimation {
    pub fn new(target: i64, duration_ms: f64) -> Self {
        Self {
            target,
            duration_ms,
        }
    }

    pub fn progress(&self, elapsed_ms: f64) -> f64 {
        if self.duration_ms <= 0.0 {
            return 1.0;
        }
        (elapsed_ms / self.duration_ms).clamp(0.0, 1.0)
    }

    pub fn value_at(&self, elapsed_ms: f64) -> i64 {
        let eased = ease_out_cubic(self.progress(elapsed_ms));
        (eased * self.target as f64).round() as i64
    }

    pub fn is_finished(&self, elapsed_ms: f64) -> bool {
        self.progress(elapsed_ms) >= 1.0
    }
}

/// Data attributes of one `[data-count]` element.
#[derive(Debug, Clone, PartialEq)]
pub struct CounterLabel {
    pub target: i64,
    pub prefix: String,
    pub suffix: String,
}

impl CounterLabel {
    pub fn parse(count: &str, prefix: Option<String>, suffix: Option<String>) -> Option<Self> {
        let target = count.trim().parse().ok()?;
        Some(CounterLabel {
            target,
            prefix: prefix.unwrap_or_default(),
            suffix: suffix.unwrap_or_default(),
        })
    }

    pub fn render(&self, grouped: &str) -> String {
        format!("{}{}{}", self.prefix, grouped, self.suffix)
    }
}

pub fn init(page: &Page) -> Result<()> {
    let counters = dom::query_all(&page.document, "[data-count]")?;
    if counters.is_empty() {
        return Ok(());
    }
    let config = page.config.clone();
    observer::watch(
        &counters,
        Visibility::at(page.config.counter_threshold),
        move |target, intersecting, observer| {
            if !intersecting {
                return;
            }
            observer.unobserve(target);
            let raw = dom::data_attr(target, "count").unwrap_or_default();
            let label = CounterLabel::parse(
                &raw,
                dom::data_attr(target, "prefix"),
                dom::data_attr(target, "suffix"),
            );
            match label {
                Some(label) => {
                    let animation = CounterAnimation::new(label.target, config.counter_duration_ms);
                    run(target.clone(), label, animation, config.locale.clone());
                }
                None => warn!("counter skipped, data-count is not an integer: {:?}", raw),
            }
        },
    )?;
    debug!("counters observing {} elements", counters.len());
    Ok(())
}

struct CounterRun {
    element: Element,
    label: CounterLabel,
    animation: CounterAnimation,
    locale: String,
    started_at: Option<f64>,
    frame: Option<AnimationFrame>,
}

fn run(element: Element, label: CounterLabel, animation: CounterAnimation, locale: String) {
    let state = Rc::new(RefCell::new(CounterRun {
        element,
        label,
        animation,
        locale,
        started_at: None,
        frame: None,
    }));
    schedule(state);
}

fn schedule(state: Rc<RefCell<CounterRun>>) {
    let next = state.clone();
    let frame = request_animation_frame(move |timestamp| step(next, timestamp));
    state.borrow_mut().frame = Some(frame);
}

fn step(state: Rc<RefCell<CounterRun>>, timestamp: f64) {
    let finished = {
        let mut run = state.borrow_mut();
        run.frame.take();
        let started_at = *run.started_at.get_or_insert(timestamp);
        let elapsed = timestamp - started_at;
        let value = run.animation.value_at(elapsed);
        let grouped = Number::from(value as f64).to_locale_string(&run.locale);
        let text = run.label.render(&String::from(grouped));
        run.element.set_text_content(Some(&text));
        run.animation.is_finished(elapsed)
    };
    if !finished {
        schedule(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn easing_hits_endpoints() {
        assert_eq!(ease_out_cubic(0.0), 0.0);
        assert_eq!(ease_out_cubic(1.0), 1.0);
        assert!(ease_out_cubic(0.5) > 0.5);
    }

    #[test]
    fn reaches_target_at_duration() {
        let animation = CounterAnimation::new(120, 1800.0);
        assert_eq!(animation.value_at(0.0), 0);
        assert_eq!(animation.value_at(1800.0), 120);
        assert_eq!(animation.value_at(5000.0), 120);
        assert!(animation.is_finished(1800.0));
        assert!(!animation.is_finished(1799.0));
    }

    #[test]
    fn values_are_monotonic_and_bounded() {
        let animation = CounterAnimation::new(120, 1800.0);
        let mut last = 0;
        for frame in 0..=200 {
            let value = animation.value_at(f64::from(frame) * 16.7);
            assert!(value >= last, "dropped from {last} to {value}");
            assert!(value <= 120);
            last = value;
        }
        assert_eq!(last, 120);
    }

    #[test]
    fn zero_duration_jumps_to_target() {
        let animation = CounterAnimation::new(42, 0.0);
        assert_eq!(animation.value_at(0.0), 42);
        assert!(animation.is_finished(0.0));
    }

    #[test]
    fn label_reads_prefix_and_suffix() {
        let label = CounterLabel::parse(" 2500 ", Some("+".into()), Some(" ασθενείς".into()))
            .expect("numeric target");
        assert_eq!(label.target, 2500);
        assert_eq!(label.render("2.500"), "+2.500 ασθενείς");
    }

    #[test]
    fn label_rejects_non_numeric_target() {
        assert!(CounterLabel::parse("many", None, None).is_none());
        assert!(CounterLabel::parse("", None, None).is_none());
    }
}
