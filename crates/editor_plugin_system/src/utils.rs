//! Utility functions and helpers

use crate::engine::EditorState;
use crate::error::PluginHostError;
use serde_json::Value;

/// Build an editor state holding the given plain text
pub fn create_state_with_text<S: EditorState>(text: &str) -> S {
    S::with_text(text)
}

/// Serialize a value into a hook payload
pub fn to_payload<T: serde::Serialize>(value: &T) -> Result<Value, PluginHostError> {
    serde_json::to_value(value).map_err(Into::into)
}

/// Deserialize a hook payload argument
pub fn from_payload<T: for<'de> serde::Deserialize<'de>>(value: &Value) -> Result<T, PluginHostError> {
    serde_json::from_value(value.clone()).map_err(Into::into)
}
