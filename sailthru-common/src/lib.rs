//! Request canonicalization shared by the sailthru client and postback receivers.
//!
//! Payloads are plain [`serde_json::Value`]s. The same leaf-value extraction feeds both the
//! signature of outgoing envelopes and the check of incoming postbacks, so the two can never
//! disagree about what gets signed.

mod error;
pub mod flatten;
pub mod signature;

pub use error::Error;

use serde::Serialize;
use serde_json::{Map, Value};

/// A request payload: string keys mapped to nested json values.
pub type Params = Map<String, Value>;

/// Serialize a request struct (or any map-like value) into [`Params`].
///
/// The value has to serialize to a json object.
pub fn to_params(data: &impl Serialize) -> Result<Params, Error> {
    match serde_json::to_value(data)? {
        Value::Object(map) => Ok(map),
        other => Err(Error::Common(format!(
            "params must serialize to a json object, got: {other}"
        ))),
    }
}
