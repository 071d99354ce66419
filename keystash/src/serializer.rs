//! Value serialization contract
//!
//! A [`Serializer`] turns a [`Value`] into the text an adapter stores and
//! back. The facades never call it directly; they go through [`to_store`]
//! and [`from_store`], which add two rules on top of the codec:
//!
//! - strings bypass the codec entirely, so raw text is stored verbatim
//!   and never double-quoted;
//! - text that fails to parse is handed back as a string value instead of
//!   an error, so values written before a serializer was introduced stay
//!   readable.
//!
//! The price is that a stored string which happens to be valid JSON
//! (`"42"`, `"true"`) reads back as the parsed value.

use serde_json::Value;
use std::borrow::Cow;
use std::error::Error as StdError;

/// Converts values to stored text and back
///
/// Implementations must be stateless: `parse(stringify(v))` should give back
/// a value equal to `v` for everything the serializer supports.
pub trait Serializer: Send + Sync {
    type Error: StdError + Send + Sync + 'static;

    /// Encode a value as text.
    fn stringify(&self, value: &Value) -> Result<String, Self::Error>;

    /// Decode text produced by [`Serializer::stringify`].
    fn parse(&self, raw: &str) -> Result<Value, Self::Error>;

    /// The text this serializer uses for null.
    ///
    /// Stored text equal to this is read back as absent without calling
    /// [`Serializer::parse`].
    fn null_text(&self) -> Cow<'static, str> {
        Cow::Borrowed("null")
    }
}

/// Default codec backed by `serde_json`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JsonSerializer;

impl Serializer for JsonSerializer {
    type Error = serde_json::Error;

    fn stringify(&self, value: &Value) -> Result<String, Self::Error> {
        serde_json::to_string(value)
    }

    fn parse(&self, raw: &str) -> Result<Value, Self::Error> {
        serde_json::from_str(raw)
    }
}

/// Produce the text to store for `value`.
///
/// # Errors
///
/// Returns the serializer's error when it cannot encode the value.
pub fn to_store<S: Serializer>(serializer: &S, value: Option<&Value>) -> Result<String, S::Error> {
    match value {
        None => Ok(serializer.null_text().into_owned()),
        Some(Value::String(text)) => Ok(text.clone()),
        Some(other) => serializer.stringify(other),
    }
}

/// Recover a value from stored text.
///
/// Never fails: absent items and the null encoding give `None`, text the
/// serializer rejects comes back as [`Value::String`].
pub fn from_store<S: Serializer>(serializer: &S, raw: Option<String>) -> Option<Value> {
    let raw = raw?;
    if raw == serializer.null_text() {
        return None;
    }
    match serializer.parse(&raw) {
        Ok(Value::Null) => None,
        Ok(value) => Some(value),
        Err(_) => Some(Value::String(raw)),
    }
}
