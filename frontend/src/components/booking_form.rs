use std::cell::RefCell;
use std::rc::Rc;

use gloo_events::EventListener;
use gloo_timers::future::TimeoutFuture;
use log::{debug, warn};
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys::{
    Element, HtmlButtonElement, HtmlFormElement, HtmlInputElement, HtmlSelectElement,
    HtmlTextAreaElement,
};

use crate::config::SiteConfig;
use crate::dom;
use crate::error::Result;
use crate::page::Page;

const FORM_SELECTOR: &str = ".booking-form";
const INPUT_SELECTOR: &str = ".form-input";
const GROUP_SELECTOR: &str = ".form-group";
const VALID_GROUP_CLASS: &str = "form-group--valid";
const SUBMIT_SELECTOR: &str = ".btn";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Date,
    Select,
}

impl FieldKind {
    pub fn of(tag_name: &str, input_type: Option<&str>) -> Self {
        if tag_name.eq_ignore_ascii_case("select") {
            FieldKind::Select
        } else if input_type.is_some_and(|ty| ty.eq_ignore_ascii_case("date")) {
            FieldKind::Date
        } else {
            FieldKind::Text
        }
    }

    /// Event that carries a new value for this kind of control.
    pub fn live_event(self) -> &'static str {
        match self {
            FieldKind::Select => "change",
            FieldKind::Text | FieldKind::Date => "input",
        }
    }

    /// Whether the value earns the live "valid" tick.
    pub fn is_filled(self, value: &str) -> bool {
        match self {
            FieldKind::Select | FieldKind::Date => !value.trim().is_empty(),
            FieldKind::Text => value.trim().chars().count() >= 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// An acknowledgement is already on screen.
    Ignored,
    /// Indices of the required fields that are blank.
    Rejected(Vec<usize>),
    Accepted,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SubmitPhase {
    #[default]
    Idle,
    Acknowledging,
}

/// Submission flow of one booking form. Nothing is sent anywhere; an accepted
/// form shows an acknowledgement and is cleared afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookingFlow {
    phase: SubmitPhase,
}

impl BookingFlow {
    #[cfg(test)]
    pub fn phase(&self) -> SubmitPhase {
        self.phase
    }

    pub fn submit<S: AsRef<str>>(&mut self, required: &[S]) -> SubmitOutcome {
        if self.phase == SubmitPhase::Acknowledging {
            return SubmitOutcome::Ignored;
        }
        let blank: Vec<usize> = required
            .iter()
            .enumerate()
            .filter(|(_, value)| value.as_ref().trim().is_empty())
            .map(|(index, _)| index)
            .collect();
        if !blank.is_empty() {
            return SubmitOutcome::Rejected(blank);
        }
        self.phase = SubmitPhase::Acknowledging;
        SubmitOutcome::Accepted
    }

    pub fn finish(&mut self) {
        self.phase = SubmitPhase::Idle;
    }
}

fn field_value(element: &Element) -> String {
    if let Some(input) = element.dyn_ref::<HtmlInputElement>() {
        input.value()
    } else if let Some(select) = element.dyn_ref::<HtmlSelectElement>() {
        select.value()
    } else if let Some(area) = element.dyn_ref::<HtmlTextAreaElement>() {
        area.value()
    } else {
        String::new()
    }
}

fn field_kind(element: &Element) -> FieldKind {
    FieldKind::of(&element.tag_name(), element.get_attribute("type").as_deref())
}

struct BookingForm {
    form: Element,
    config: Rc<SiteConfig>,
    flow: RefCell<BookingFlow>,
    clear_marks: RefCell<Vec<EventListener>>,
}

impl BookingForm {
    fn handle_submit(self: &Rc<Self>) -> Result<()> {
        let required = dom::query_all_in(&self.form, "[required]")?;
        let values: Vec<String> = required.iter().map(field_value).collect();
        let outcome = self.flow.borrow_mut().submit(values.as_slice());
        match outcome {
            SubmitOutcome::Ignored => Ok(()),
            SubmitOutcome::Rejected(blank) => self.mark_invalid(&required, &blank),
            SubmitOutcome::Accepted => self.acknowledge(),
        }
    }

    fn mark_invalid(&self, fields: &[Element], blank: &[usize]) -> Result<()> {
        let mut clear_marks = Vec::with_capacity(blank.len());
        for field in blank.iter().filter_map(|&index| fields.get(index)) {
            dom::set_style(field, "border-color", &self.config.invalid_color)?;
            let target = field.clone();
            clear_marks.push(EventListener::once(field, "input", move |_| {
                let _ = dom::clear_style(&target, "border-color");
            }));
        }
        *self.clear_marks.borrow_mut() = clear_marks;
        debug!("booking form rejected, {} blank fields", blank.len());
        Ok(())
    }

    fn acknowledge(self: &Rc<Self>) -> Result<()> {
        let button = dom::query_in(&self.form, SUBMIT_SELECTOR)?;
        let original = button.as_ref().map(|button| button.inner_html());
        if let Some(button) = &button {
            button.set_text_content(Some(&self.config.success_message));
            dom::set_style(button, "background", &self.config.success_color)?;
            set_disabled(button, true)?;
        }

        let this = Rc::clone(self);
        let delay = self.config.success_reset_ms;
        spawn_local(async move {
            TimeoutFuture::new(delay).await;
            if let (Some(button), Some(original)) = (&button, original) {
                button.set_inner_html(&original);
                let _ = dom::clear_style(button, "background");
                let _ = set_disabled(button, false);
            }
            this.reset();
            this.flow.borrow_mut().finish();
        });
        Ok(())
    }

    fn reset(&self) {
        if let Some(form) = self.form.dyn_ref::<HtmlFormElement>() {
            form.reset();
        }
        if let Ok(groups) = dom::query_all_in(&self.form, &format!(".{}", VALID_GROUP_CLASS)) {
            for group in groups {
                let _ = group.class_list().remove_1(VALID_GROUP_CLASS);
            }
        }
    }
}

fn set_disabled(button: &Element, disabled: bool) -> Result<()> {
    if let Some(button) = button.dyn_ref::<HtmlButtonElement>() {
        button.set_disabled(disabled);
    } else if disabled {
        button.set_attribute("disabled", "")?;
    } else {
        button.remove_attribute("disabled")?;
    }
    Ok(())
}

pub fn init(page: &Page) -> Result<()> {
    for form in dom::query_all(&page.document, FORM_SELECTOR)? {
        wire_live_ticks(&form)?;

        let booking = Rc::new(BookingForm {
            form: form.clone(),
            config: page.config.clone(),
            flow: RefCell::new(BookingFlow::default()),
            clear_marks: RefCell::new(Vec::new()),
        });
        dom::listen_active(&form, "submit", move |event| {
            event.prevent_default();
            if let Err(err) = booking.handle_submit() {
                warn!("booking form submit failed: {}", err);
            }
        });
    }
    Ok(())
}

fn wire_live_ticks(form: &Element) -> Result<()> {
    for input in dom::query_all_in(form, INPUT_SELECTOR)? {
        let kind = field_kind(&input);
        let target = input.clone();
        dom::listen(&input, kind.live_event(), move |_| {
            let Ok(Some(group)) = target.closest(GROUP_SELECTOR) else {
                return;
            };
            let filled = kind.is_filled(&field_value(&target));
            let _ = dom::toggle_class(&group, VALID_GROUP_CLASS, filled);
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_kind_from_markup() {
        assert_eq!(FieldKind::of("SELECT", None), FieldKind::Select);
        assert_eq!(FieldKind::of("INPUT", Some("date")), FieldKind::Date);
        assert_eq!(FieldKind::of("INPUT", Some("tel")), FieldKind::Text);
        assert_eq!(FieldKind::of("TEXTAREA", None), FieldKind::Text);
    }

    #[test]
    fn selects_listen_for_change() {
        assert_eq!(FieldKind::Select.live_event(), "change");
        assert_eq!(FieldKind::Text.live_event(), "input");
        assert_eq!(FieldKind::Date.live_event(), "input");
    }

    #[test]
    fn text_needs_two_characters() {
        assert!(!FieldKind::Text.is_filled(""));
        assert!(!FieldKind::Text.is_filled("  Α  "));
        assert!(FieldKind::Text.is_filled("Αν"));
    }

    #[test]
    fn choices_need_any_selection() {
        assert!(!FieldKind::Select.is_filled(""));
        assert!(FieldKind::Select.is_filled("1"));
        assert!(FieldKind::Date.is_filled("2026-11-02"));
    }

    #[test]
    fn empty_form_is_rejected_field_by_field() {
        let mut flow = BookingFlow::default();
        let outcome = flow.submit(&["", "   ", ""]);
        assert_eq!(outcome, SubmitOutcome::Rejected(vec![0, 1, 2]));
        assert_eq!(flow.phase(), SubmitPhase::Idle);
    }

    #[test]
    fn only_blank_fields_are_flagged() {
        let mut flow = BookingFlow::default();
        let outcome = flow.submit(&["Μαρία", "", "6900000000"]);
        assert_eq!(outcome, SubmitOutcome::Rejected(vec![1]));
    }

    #[test]
    fn filled_form_is_acknowledged_then_cleared() {
        let mut flow = BookingFlow::default();
        assert!(matches!(flow.submit(&["", ""]), SubmitOutcome::Rejected(_)));
        assert_eq!(flow.submit(&["Μαρία", "6900000000"]), SubmitOutcome::Accepted);
        assert_eq!(flow.phase(), SubmitPhase::Acknowledging);
        flow.finish();
        assert_eq!(flow.phase(), SubmitPhase::Idle);
    }

    #[test]
    fn resubmitting_during_acknowledgement_is_ignored() {
        let mut flow = BookingFlow::default();
        flow.submit(&["Μαρία"]);
        assert_eq!(flow.submit(&["Μαρία"]), SubmitOutcome::Ignored);
        assert_eq!(flow.submit(&[""]), SubmitOutcome::Ignored);
    }

    #[test]
    fn form_without_required_fields_is_accepted() {
        let mut flow = BookingFlow::default();
        assert_eq!(flow.submit::<&str>(&[]), SubmitOutcome::Accepted);
    }
}
