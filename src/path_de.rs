//! Decoding with JSON-path context in error messages.
//!
//! The engine reports decode failures with the position (array index,
//! property key) at which the input stopped being well-formed; these helpers
//! produce that via `serde_path_to_error`.

use serde::de::DeserializeOwned;
use thiserror::Error;

/// Decode failure qualified with the JSON path of the failure. Top-level
/// failures carry the root path `.`.
#[derive(Debug, Error)]
#[error("decode at {path}: {source}")]
pub struct DecodeError {
    path: String,
    #[source]
    source: serde_json::Error,
}

impl DecodeError {
    /// The JSON path at which decoding failed, e.g. `foo[2]`.
    pub fn path(&self) -> &str {
        &self.path
    }
}

pub fn from_slice<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, DecodeError> {
    let mut de = serde_json::Deserializer::from_slice(bytes);
    let value = serde_path_to_error::deserialize(&mut de).map_err(track)?;
    // One value per input: trailing tokens are a failure too.
    de.end().map_err(|source| DecodeError {
        path: ".".to_owned(),
        source,
    })?;
    Ok(value)
}

pub fn from_str<T: DeserializeOwned>(src: &str) -> Result<T, DecodeError> {
    from_slice(src.as_bytes())
}

fn track(err: serde_path_to_error::Error<serde_json::Error>) -> DecodeError {
    DecodeError {
        path: err.path().to_string(),
        source: err.into_inner(),
    }
}
