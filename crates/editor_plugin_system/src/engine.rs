//! Boundary with the underlying text-editing engine
//!
//! The engine itself (document model, selection handling, rendering,
//! undo/redo) is an external collaborator. This module defines the exact
//! contract the host requires from it: an opaque state value, a minimal
//! block shape for decorators and block-level hooks, an imperative ref,
//! and the configuration bag the host assembles for it on every render.

use crate::decorator::TextDecorator;
use crate::hooks::HookSet;
use crate::props::{AccessibilityProps, BlockRenderMap, StyleMap};
use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt::Debug;
use std::sync::Arc;

/// Opaque editor state owned by the underlying engine
///
/// The host holds exactly one current instance and replaces it atomically
/// on each accepted change. The contract is deliberately small: the host
/// only needs to construct an empty document at mount, preserve the
/// selection across programmatic replacement, and re-attach the composite
/// decorator to a replacement state.
pub trait EditorState: Clone + Send + Sync + 'static {
    /// The engine's selection representation
    type Selection: Clone + PartialEq + Debug + Send + Sync + 'static;

    /// Create a state holding an empty document
    fn empty() -> Self;

    /// Create a state holding the given plain text
    fn with_text(text: &str) -> Self;

    /// Read the current selection
    fn selection(&self) -> Self::Selection;

    /// Return a state with the selection forced to the given position
    fn force_selection(&self, selection: Self::Selection) -> Self;

    /// Return a state with the given decorator attached (or detached)
    fn set_decorator(&self, decorator: Option<Arc<dyn TextDecorator<Self>>>) -> Self;
}

/// The minimal block shape decorators and block-level hooks operate on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentBlock {
    /// Stable block key
    pub key: CompactString,
    /// Block type name (e.g. "unstyled", "header-one")
    #[serde(rename = "type")]
    pub block_type: CompactString,
    /// Plain text content of the block
    pub text: String,
}

impl ContentBlock {
    /// Create a new content block
    pub fn new(key: &str, block_type: &str, text: &str) -> Self {
        Self {
            key: CompactString::new(key),
            block_type: CompactString::new(block_type),
            text: text.to_owned(),
        }
    }

    /// Number of characters in the block text
    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    /// Whether the block holds no text
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Imperative surface of a mounted engine, proxied by the host
pub trait EngineRef: Send + Sync {
    /// Move input focus to the editing surface
    fn focus(&self);

    /// Remove input focus from the editing surface
    fn blur(&self);
}

/// Configuration bag the host assembles for the engine on each render
///
/// Everything in here is derived fresh from the current plugin list, so
/// changing plugin configuration at runtime takes effect immediately.
pub struct EngineConfig<S: EditorState> {
    /// The current editor state, with the composite decorator attached
    pub editor_state: S,
    /// The single change entry point; the engine calls this with every
    /// candidate new state
    pub on_change: Arc<dyn Fn(S) + Send + Sync>,
    /// One synthesized callback per aggregated hook name
    pub hooks: HookSet,
    /// Merged style-name to style-object mapping
    pub custom_style_map: StyleMap,
    /// Merged block-type to render-descriptor mapping
    pub block_render_map: BlockRenderMap,
    /// Merged accessibility attributes
    pub accessibility_props: AccessibilityProps,
    /// True if read-only was explicitly configured or internally toggled
    pub read_only: bool,
    /// Engine-native props passed through without interception
    pub extra: serde_json::Map<String, Value>,
}
