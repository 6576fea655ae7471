use std::cell::RefCell;
use std::rc::Rc;

use gloo_events::EventListener;
use gloo_timers::callback::Timeout;
use log::debug;
use web_sys::{Element, MouseEvent, ScrollBehavior};
use yew::prelude::*;

use crate::components::carousel::{self, CAROUSEL_SELECTOR, CARD_SELECTOR, TRACK_SELECTOR};
use crate::dom;
use crate::error::Result;
use crate::page::Page;

const DOTS_SELECTOR: &str = ".reviews-dots";
const SCROLL_SETTLE_MS: u32 = 50;

pub fn dot_label(index: usize) -> String {
    format!("Κριτική {}", index + 1)
}

#[derive(Properties, PartialEq)]
pub struct ReviewDotsProps {
    pub track: Element,
    pub first_card: Element,
    pub count: usize,
    pub default_gap: f64,
}

#[function_component(ReviewDots)]
pub fn review_dots(props: &ReviewDotsProps) -> Html {
    let active = use_state(|| 0usize);

    {
        let active = active.clone();
        let track = props.track.clone();
        let first_card = props.first_card.clone();
        let default_gap = props.default_gap;
        use_effect_with_deps(
            move |track_dep: &Element| {
                let settle: Rc<RefCell<Option<Timeout>>> = Rc::new(RefCell::new(None));
                let listener = EventListener::new(track_dep, "scroll", move |_| {
                    let active = active.clone();
                    let track = track.clone();
                    let first_card = first_card.clone();
                    // Replacing the pending timer cancels it.
                    *settle.borrow_mut() = Some(Timeout::new(SCROLL_SETTLE_MS, move || {
                        let Ok(window) = dom::window() else {
                            return;
                        };
                        let geometry = carousel::measure(&window, &track, &first_card, default_gap);
                        active.set(geometry.active_index());
                    }));
                });
                move || drop(listener)
            },
            props.track.clone(),
        );
    }

    let dots = (0..props.count).map(|index| {
        let onclick = {
            let active = active.clone();
            let track = props.track.clone();
            let first_card = props.first_card.clone();
            let default_gap = props.default_gap;
            Callback::from(move |_: MouseEvent| {
                if let Ok(window) = dom::window() {
                    let geometry = carousel::measure(&window, &track, &first_card, default_gap);
                    carousel::scroll_track(&track, geometry.offset_for_index(index), ScrollBehavior::Smooth);
                }
                active.set(index);
            })
        };
        html! {
            <button
                type="button"
                class={classes!("reviews-dots__dot", (index == *active).then(|| "is-active"))}
                aria-label={dot_label(index)}
                onclick={onclick}
            ></button>
        }
    });

    html! {
        <>
            { for dots }
        </>
    }
}

pub fn init(page: &Page) -> Result<()> {
    let Some(container) = page.document.query_selector(DOTS_SELECTOR)? else {
        return Ok(());
    };
    let Some(root) = page.document.query_selector(CAROUSEL_SELECTOR)? else {
        return Ok(());
    };
    let Some(track) = dom::query_in(&root, TRACK_SELECTOR)? else {
        return Ok(());
    };
    let count = dom::query_all_in(&track, CARD_SELECTOR)?.len();
    let Some(first_card) = dom::query_in(&track, CARD_SELECTOR)? else {
        return Ok(());
    };

    let props = ReviewDotsProps {
        track,
        first_card,
        count,
        default_gap: page.config.carousel_default_gap_px,
    };
    yew::Renderer::<ReviewDots>::with_root_and_props(container, props).render();
    debug!("review dots rendered: {}", count);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::dot_label;

    #[test]
    fn dots_are_labelled_from_one() {
        assert_eq!(dot_label(0), "Κριτική 1");
        assert_eq!(dot_label(4), "Κριτική 5");
    }
}
