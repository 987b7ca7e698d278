use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("persistent storage is unavailable")]
    Unavailable,
    #[error("failed to read key `{key}`")]
    Read { key: String },
    #[error("failed to write key `{key}`: {reason}")]
    Write { key: String, reason: String },
    #[error("failed to encode value: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("unknown setting `{0}`")]
    UnknownKey(String),
    #[error("invalid value for `{key}`: {reason}")]
    InvalidValue { key: String, reason: String },
    #[error(transparent)]
    Storage(#[from] StorageError),
}

#[derive(Debug, Error)]
pub enum PortalError {
    #[error("missing parameters")]
    MissingParameters,
    #[error("no window")]
    NoWindow,
    #[error("no document")]
    NoDocument,
    #[error("duplicate game id `{0}`")]
    DuplicateGameId(String),
    #[error("missing element #{0}")]
    MissingElement(String),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error("javascript error: {0}")]
    Js(String),
}

impl From<wasm_bindgen::JsValue> for PortalError {
    fn from(value: wasm_bindgen::JsValue) -> Self {
        PortalError::Js(value.as_string().unwrap_or_else(|| format!("{value:?}")))
    }
}

impl From<PortalError> for wasm_bindgen::JsValue {
    fn from(err: PortalError) -> Self {
        wasm_bindgen::JsValue::from_str(&err.to_string())
    }
}
