use thiserror::Error;
use wasm_bindgen::JsValue;

#[derive(Debug, Error)]
pub enum Error {
    #[error("no global window")]
    NoWindow,
    #[error("window has no document")]
    NoDocument,
    #[error("javascript exception: {0}")]
    Js(String),
    #[error("invalid site config: {0}")]
    Config(#[from] serde_json::Error),
}

impl From<JsValue> for Error {
    fn from(value: JsValue) -> Self {
        match value.as_string() {
            Some(message) => Error::Js(message),
            None => Error::Js(format!("{:?}", value)),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
