use log::warn;
use web_sys::Element;

use crate::dom;
use crate::error::Result;
use crate::page::Page;

const ITEM_SELECTOR: &str = ".faq-item";
const TRIGGER_SELECTOR: &str = ".faq-item__trigger";
const CONTENT_SELECTOR: &str = ".faq-item__content";
const OPEN_CLASS: &str = "is-open";

/// New open/closed state for the items of one FAQ list after `clicked` is
/// toggled. Every other open item closes, so at most one stays open.
pub fn toggle(open: &[usize], clicked: usize) -> Vec<(usize, bool)> {
    let was_open = open.contains(&clicked);
    let mut changes: Vec<(usize, bool)> = open
        .iter()
        .filter(|&&index| index != clicked)
        .map(|&index| (index, false))
        .collect();
    changes.push((clicked, !was_open));
    changes
}

fn set_open(item: &Element, open: bool) -> Result<()> {
    dom::toggle_class(item, OPEN_CLASS, open)?;
    let Some(content) = dom::query_in(item, CONTENT_SELECTOR)? else {
        return Ok(());
    };
    let height = if open {
        format!("{}px", content.scroll_height())
    } else {
        "0".to_string()
    };
    dom::set_style(&content, "max-height", &height)
}

fn on_trigger(trigger: &Element) -> Result<()> {
    let Some(item) = trigger.closest(ITEM_SELECTOR)? else {
        return Ok(());
    };
    let Some(list) = item.parent_element() else {
        return Ok(());
    };
    let items = dom::query_all_in(&list, ITEM_SELECTOR)?;
    let Some(clicked) = items.iter().position(|candidate| *candidate == item) else {
        return Ok(());
    };
    let open: Vec<usize> = items
        .iter()
        .enumerate()
        .filter(|(_, candidate)| candidate.class_list().contains(OPEN_CLASS))
        .map(|(index, _)| index)
        .collect();
    for (index, state) in toggle(&open, clicked) {
        set_open(&items[index], state)?;
    }
    Ok(())
}

pub fn init(page: &Page) -> Result<()> {
    for trigger in dom::query_all(&page.document, TRIGGER_SELECTOR)? {
        let target = trigger.clone();
        dom::listen(&trigger, "click", move |_| {
            if let Err(err) = on_trigger(&target) {
                warn!("faq toggle failed: {}", err);
            }
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::toggle;

    fn open_after(open: &[usize], clicked: usize) -> Vec<usize> {
        let mut now: Vec<usize> = open.to_vec();
        for (index, state) in toggle(open, clicked) {
            now.retain(|&i| i != index);
            if state {
                now.push(index);
            }
        }
        now
    }

    #[test]
    fn opening_closes_siblings() {
        assert_eq!(toggle(&[0], 2), vec![(0, false), (2, true)]);
    }

    #[test]
    fn clicking_open_item_closes_it() {
        assert_eq!(toggle(&[1], 1), vec![(1, false)]);
    }

    #[test]
    fn at_most_one_item_stays_open() {
        assert_eq!(open_after(&[0, 3], 1), vec![1]);
        assert_eq!(open_after(&[0, 3], 3), Vec::<usize>::new());
        assert_eq!(open_after(&[], 4), vec![4]);
    }
}
