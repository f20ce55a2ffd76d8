use thiserror::Error;

/// Failure to read a dictionary asset. Individual malformed entries never produce this;
/// they are skipped while loading.
#[derive(Debug, Error)]
pub enum DictionaryError {
    #[error("dictionary is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("dictionary root must be a JSON object")]
    NotAnObject,
    #[error("embedded dictionary asset `{0}` is missing")]
    MissingAsset(String),
}

#[derive(Debug, Error)]
pub enum SchemeError {
    #[error("scheme layout is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("no preset scheme named `{0}`")]
    UnknownPreset(String),
    #[error("embedded scheme asset `{0}` is missing")]
    MissingAsset(String),
}
