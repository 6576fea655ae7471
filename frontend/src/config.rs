use log::Level;
use serde::Deserialize;
use web_sys::Document;

use crate::error::Result;

/// Id of the optional inline `<script type="application/json">` block that
/// overrides the defaults below.
pub const CONFIG_ELEMENT_ID: &str = "site-config";

#[cfg(debug_assertions)]
pub fn log_level() -> Level {
    Level::Debug
}

#[cfg(not(debug_assertions))]
pub fn log_level() -> Level {
    Level::Info
}

/// Tunables shared by the page widgets. Every field has a default so a page
/// only needs to list the keys it wants to change.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub locale: String,
    pub nav_scrolled_offset_px: f64,
    pub nav_collapse_padding_px: f64,
    pub reveal_threshold: f64,
    pub reveal_root_margin: String,
    pub counter_threshold: f64,
    pub counter_duration_ms: f64,
    pub carousel_interval_ms: u32,
    pub carousel_resume_ms: u32,
    pub carousel_default_gap_px: f64,
    pub transition_delay_ms: u32,
    pub success_reset_ms: u32,
    pub success_message: String,
    pub success_color: String,
    pub invalid_color: String,
    pub review_count_fallback: u32,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            locale: "el-GR".to_string(),
            nav_scrolled_offset_px: 40.0,
            nav_collapse_padding_px: 40.0,
            reveal_threshold: 0.12,
            reveal_root_margin: "0px 0px -40px 0px".to_string(),
            counter_threshold: 0.5,
            counter_duration_ms: 1800.0,
            carousel_interval_ms: 4000,
            carousel_resume_ms: 8000,
            carousel_default_gap_px: 20.0,
            transition_delay_ms: 300,
            success_reset_ms: 3000,
            success_message: "Ευχαριστούμε! Θα σας καλέσουμε σύντομα.".to_string(),
            success_color: "#10B981".to_string(),
            invalid_color: "#EF4444".to_string(),
            review_count_fallback: 87,
        }
    }
}

impl SiteConfig {
    pub fn from_json(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Reads the `#site-config` block if the page has one. An empty block is
    /// treated the same as a missing one.
    pub fn from_document(document: &Document) -> Result<Self> {
        let raw = document
            .get_element_by_id(CONFIG_ELEMENT_ID)
            .and_then(|el| el.text_content())
            .unwrap_or_default();
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        Self::from_json(&raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn partial_block_overrides_only_given_keys() {
        let config = SiteConfig::from_json(r#"{"carousel_interval_ms": 6000, "locale": "en-US"}"#)
            .expect("valid config");
        assert_eq!(config.carousel_interval_ms, 6000);
        assert_eq!(config.locale, "en-US");
        assert_eq!(config.carousel_resume_ms, 8000);
        assert_eq!(config.success_reset_ms, 3000);
    }

    #[test]
    fn empty_object_is_defaults() {
        let config = SiteConfig::from_json("{}").expect("valid config");
        assert_eq!(config, SiteConfig::default());
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let config = SiteConfig::from_json(r#"{"theme": "dark"}"#).expect("valid config");
        assert_eq!(config, SiteConfig::default());
    }

    #[test]
    fn malformed_block_is_an_error() {
        let err = SiteConfig::from_json("{ carousel_interval_ms: ").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn wrong_type_is_an_error() {
        assert!(SiteConfig::from_json(r#"{"transition_delay_ms": "fast"}"#).is_err());
    }
}
