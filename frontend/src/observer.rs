use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::js_sys::Array;
use web_sys::{Element, IntersectionObserver, IntersectionObserverEntry, IntersectionObserverInit};

use crate::error::Result;

#[derive(Debug, Clone, Copy)]
pub struct Visibility<'a> {
    pub threshold: f64,
    pub root_margin: Option<&'a str>,
}

impl Visibility<'_> {
    pub fn at(threshold: f64) -> Self {
        Visibility {
            threshold,
            root_margin: None,
        }
    }
}

/// Watches `targets` and calls `on_change(target, intersecting, observer)` for
/// every reported entry. The observer lives as long as the page.
pub fn watch<F>(targets: &[Element], options: Visibility<'_>, mut on_change: F) -> Result<IntersectionObserver>
where
    F: FnMut(&Element, bool, &IntersectionObserver) + 'static,
{
    let callback = Closure::wrap(Box::new(move |entries: Array, observer: IntersectionObserver| {
        for entry in entries.iter() {
            let Ok(entry) = entry.dyn_into::<IntersectionObserverEntry>() else {
                continue;
            };
            on_change(&entry.target(), entry.is_intersecting(), &observer);
        }
    }) as Box<dyn FnMut(Array, IntersectionObserver)>);

    let init = IntersectionObserverInit::new();
    init.set_threshold(&JsValue::from_f64(options.threshold));
    if let Some(margin) = options.root_margin {
        init.set_root_margin(margin);
    }
    let observer = IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &init)?;
    callback.forget();

    for target in targets {
        observer.observe(target);
    }
    Ok(observer)
}
