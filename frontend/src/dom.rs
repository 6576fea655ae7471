use gloo_events::{EventListener, EventListenerOptions};
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, Event, EventTarget, HtmlElement, NodeList, Window};

use crate::error::{Error, Result};

pub fn window() -> Result<Window> {
    web_sys::window().ok_or(Error::NoWindow)
}

fn elements(list: NodeList) -> Vec<Element> {
    (0..list.length())
        .filter_map(|i| list.item(i))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect()
}

pub fn query_all(document: &Document, selector: &str) -> Result<Vec<Element>> {
    Ok(elements(document.query_selector_all(selector)?))
}

pub fn query_all_in(scope: &Element, selector: &str) -> Result<Vec<Element>> {
    Ok(elements(scope.query_selector_all(selector)?))
}

pub fn query_in(scope: &Element, selector: &str) -> Result<Option<Element>> {
    Ok(scope.query_selector(selector)?)
}

pub fn data_attr(element: &Element, name: &str) -> Option<String> {
    element.get_attribute(&format!("data-{}", name))
}

pub fn set_style(element: &Element, property: &str, value: &str) -> Result<()> {
    if let Some(html) = element.dyn_ref::<HtmlElement>() {
        html.style().set_property(property, value)?;
    }
    Ok(())
}

pub fn clear_style(element: &Element, property: &str) -> Result<()> {
    if let Some(html) = element.dyn_ref::<HtmlElement>() {
        html.style().remove_property(property)?;
    }
    Ok(())
}

pub fn toggle_class(element: &Element, class: &str, on: bool) -> Result<()> {
    element.class_list().toggle_with_force(class, on)?;
    Ok(())
}

pub fn offset_width(element: &Element) -> f64 {
    element
        .dyn_ref::<HtmlElement>()
        .map(|html| f64::from(html.offset_width()))
        .unwrap_or(0.0)
}

/// Attaches a listener for the lifetime of the page.
pub fn listen<F>(target: &EventTarget, event_type: &'static str, callback: F)
where
    F: FnMut(&Event) + 'static,
{
    EventListener::new(target, event_type, callback).forget();
}

/// Like [`listen`] but the callback may call `prevent_default`.
pub fn listen_active<F>(target: &EventTarget, event_type: &'static str, callback: F)
where
    F: FnMut(&Event) + 'static,
{
    EventListener::new_with_options(
        target,
        event_type,
        EventListenerOptions::enable_prevent_default(),
        callback,
    )
    .forget();
}

/// Parses the leading number of a CSS length such as `"24px"`, the way
/// `parseFloat` does. Keywords like `normal` yield `None`.
pub fn parse_px(value: &str) -> Option<f64> {
    let value = value.trim();
    let end = value
        .char_indices()
        .find(|&(i, c)| !(c.is_ascii_digit() || c == '.' || (i == 0 && (c == '-' || c == '+'))))
        .map(|(i, _)| i)
        .unwrap_or(value.len());
    value[..end].parse().ok()
}

#[cfg(test)]
mod tests {
    use super::parse_px;

    #[test]
    fn parses_pixel_lengths() {
        assert_eq!(parse_px("24px"), Some(24.0));
        assert_eq!(parse_px(" 12.5px "), Some(12.5));
        assert_eq!(parse_px("0px"), Some(0.0));
    }

    #[test]
    fn keywords_and_empty_values_are_none() {
        assert_eq!(parse_px("normal"), None);
        assert_eq!(parse_px(""), None);
    }

    #[test]
    fn multi_value_gap_uses_first_length() {
        assert_eq!(parse_px("16px 24px"), Some(16.0));
    }
}
