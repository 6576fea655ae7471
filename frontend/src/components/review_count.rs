use log::{debug, warn};
use web_sys::{Element, IntersectionObserver};
use yew::prelude::*;

use crate::dom;
use crate::error::Result;
use crate::observer::{self, Visibility};
use crate::page::Page;

const HOST_SELECTOR: &str = ".review-count-rotate";
const SOURCE_SELECTOR: &str = "[data-review-count]";

/// Vertical travel of the reel for `target`, in tenths of an `em`. Each
/// number occupies 1.2em.
pub fn reel_travel_tenths(target: u32) -> u64 {
    u64::from(target) * 12
}

pub fn reel_style(target: u32, rolled: bool) -> Option<String> {
    if !rolled {
        return None;
    }
    let tenths = reel_travel_tenths(target);
    Some(format!("transform: translateY(-{}.{}em)", tenths / 10, tenths % 10))
}

pub fn review_target(raw: Option<&str>, fallback: u32) -> u32 {
    raw.and_then(|value| value.trim().parse().ok())
        .unwrap_or(fallback)
}

#[derive(Properties, PartialEq)]
pub struct ReviewReelProps {
    pub host: Element,
    pub target: u32,
    pub threshold: f64,
}

#[function_component(ReviewReel)]
pub fn review_reel(props: &ReviewReelProps) -> Html {
    let rolled = use_state(|| false);

    {
        let rolled = rolled.clone();
        let threshold = props.threshold;
        use_effect_with_deps(
            move |host: &Element| {
                let watcher: Option<IntersectionObserver> = observer::watch(
                    std::slice::from_ref(host),
                    Visibility::at(threshold),
                    move |_, intersecting, observer| {
                        if intersecting {
                            rolled.set(true);
                            observer.disconnect();
                        }
                    },
                )
                .map_err(|err| warn!("review count reel not observed: {}", err))
                .ok();
                move || {
                    if let Some(watcher) = watcher {
                        watcher.disconnect();
                    }
                }
            },
            props.host.clone(),
        );
    }

    html! {
        <span class="review-count-rotate__reel" style={reel_style(props.target, *rolled)}>
            { for (0..=props.target).map(|n| html! {
                <span class="review-count-rotate__num">{ n.to_string() }</span>
            }) }
        </span>
    }
}

pub fn init(page: &Page) -> Result<()> {
    let hosts = dom::query_all(&page.document, HOST_SELECTOR)?;
    if hosts.is_empty() {
        return Ok(());
    }
    let raw = page
        .document
        .query_selector(SOURCE_SELECTOR)?
        .and_then(|section| dom::data_attr(&section, "review-count"));
    let target = review_target(raw.as_deref(), page.config.review_count_fallback);

    for host in hosts {
        host.set_inner_html("");
        let props = ReviewReelProps {
            host: host.clone(),
            target,
            threshold: page.config.counter_threshold,
        };
        yew::Renderer::<ReviewReel>::with_root_and_props(host, props).render();
    }
    debug!("review count reels rolling to {}", target);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reel_rests_until_rolled() {
        assert_eq!(reel_style(87, false), None);
    }

    #[test]
    fn reel_travels_one_point_two_em_per_number() {
        assert_eq!(reel_style(87, true).as_deref(), Some("transform: translateY(-104.4em)"));
        assert_eq!(reel_style(10, true).as_deref(), Some("transform: translateY(-12.0em)"));
        assert_eq!(reel_style(0, true).as_deref(), Some("transform: translateY(-0.0em)"));
    }

    #[test]
    fn target_falls_back_when_missing_or_invalid() {
        assert_eq!(review_target(None, 87), 87);
        assert_eq!(review_target(Some("lots"), 87), 87);
        assert_eq!(review_target(Some(" 132 "), 87), 132);
    }
}
