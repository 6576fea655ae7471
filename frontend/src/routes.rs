//! Page addressing shared with the static-site generator.
//!
//! Every content page is published as `/<slug>.html`, except the page named
//! `index` which becomes the site root document.

use std::borrow::Cow;

pub const INDEX_PAGE: &str = "index.html";

pub fn permalink(slug: &str) -> String {
    if slug.is_empty() || slug == "index" {
        return format!("/{}", INDEX_PAGE);
    }
    format!("/{}.html", slug)
}

fn decode(raw: &str) -> Cow<'_, str> {
    urlencoding::decode(raw).unwrap_or(Cow::Borrowed(raw))
}

/// Last segment of a location pathname, percent-decoded.
pub fn current_page(path: &str) -> String {
    let last = path.rsplit('/').next().unwrap_or_default();
    if last.is_empty() {
        return INDEX_PAGE.to_string();
    }
    decode(last).into_owned()
}

/// Whether a navigation `href` points at the page being shown. Both sides
/// are compared percent-decoded.
pub fn is_current(href: &str, path: &str) -> bool {
    let page = current_page(path);
    let decoded = decode(href);
    let href: &str = &decoded;
    if href == format!("/{}", page) || href == page || href == decode(path) {
        return true;
    }
    page == INDEX_PAGE && (href == "/" || href == INDEX_PAGE || href == permalink("index"))
}
