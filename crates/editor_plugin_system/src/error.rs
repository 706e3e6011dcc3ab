//! Error types for the editor plugin system

/// Main error type for the plugin host
///
/// The composition layer itself performs no I/O; the only fallible
/// operations are host misuse (imperative calls before the engine is
/// mounted) and hook payload conversion. A plugin hook that panics is a
/// programming error and propagates uncaught.
#[derive(Debug, thiserror::Error)]
pub enum PluginHostError {
    /// An imperative proxy operation was invoked before `mount`
    #[error("editor engine is not mounted")]
    NotMounted,

    /// `mount` was called on a host that already holds an engine ref
    #[error("editor host is already mounted")]
    AlreadyMounted,

    /// Hook payload serialization or deserialization failed
    #[error("hook payload error: {0}")]
    Payload(String),
}

impl From<serde_json::Error> for PluginHostError {
    fn from(err: serde_json::Error) -> Self {
        PluginHostError::Payload(err.to_string())
    }
}
