//! Built-in defaults: the key-binding plugin and the block render map

use crate::engine::EditorState;
use crate::hooks::HookRegistration;
use crate::plugin::EditorPlugin;
use crate::props::{BlockRenderDescriptor, BlockRenderMap};
use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A keyboard event as the engine serializes it into hook payloads
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyboardEvent {
    /// Key value, e.g. `"b"`, `"Backspace"`, `"Enter"`
    pub key: String,
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
    pub meta: bool,
}

impl KeyboardEvent {
    /// Plain key press
    pub fn new(key: &str) -> Self {
        Self {
            key: key.to_owned(),
            ..Self::default()
        }
    }

    pub fn with_ctrl(mut self) -> Self {
        self.ctrl = true;
        self
    }

    pub fn with_shift(mut self) -> Self {
        self.shift = true;
        self
    }

    pub fn with_alt(mut self) -> Self {
        self.alt = true;
        self
    }

    pub fn with_meta(mut self) -> Self {
        self.meta = true;
        self
    }

    /// Serialize into a hook payload value
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// Map a keyboard event to the engine's standard editing command
pub fn default_key_binding(event: &KeyboardEvent) -> Option<&'static str> {
    let primary = event.ctrl || event.meta;
    match event.key.as_str() {
        "b" | "B" if primary => Some("bold"),
        "i" | "I" if primary => Some("italic"),
        "u" | "U" if primary => Some("underline"),
        "j" | "J" if primary => Some("code"),
        "z" | "Z" if primary && event.shift => Some("redo"),
        "z" | "Z" if primary => Some("undo"),
        "y" | "Y" if primary => Some("redo"),
        "Backspace" => Some(if primary {
            "backspace-to-start-of-line"
        } else if event.alt {
            "backspace-word"
        } else {
            "backspace"
        }),
        "Delete" => Some(if event.alt { "delete-word" } else { "delete" }),
        "Enter" => Some("split-block"),
        _ => None,
    }
}

/// The built-in key-binding plugin
///
/// Appended to the resolved plugin list when `default_key_bindings` is
/// enabled. It contributes a single first-wins `keyBindingFn` hook, so
/// any application plugin earlier in the list can pre-empt a binding.
pub struct DefaultKeyBindingPlugin;

impl<S: EditorState> EditorPlugin<S> for DefaultKeyBindingPlugin {
    fn name(&self) -> &str {
        "default-key-bindings"
    }

    fn hooks(&self) -> Vec<HookRegistration<S>> {
        vec![HookRegistration::computed("keyBindingFn", |args, _methods| {
            let event: KeyboardEvent = serde_json::from_value(args.first()?.clone()).ok()?;
            default_key_binding(&event).map(Value::from)
        })]
    }
}

/// The block render map the underlying engine ships by default
pub fn default_block_render_map() -> BlockRenderMap {
    let mut map = BlockRenderMap::new();
    let mut insert = |block_type: &str, descriptor: BlockRenderDescriptor| {
        map.insert(CompactString::new(block_type), descriptor);
    };

    insert("unstyled", BlockRenderDescriptor::component("div"));
    insert("paragraph", BlockRenderDescriptor::component("p"));
    insert("header-one", BlockRenderDescriptor::component("h1"));
    insert("header-two", BlockRenderDescriptor::component("h2"));
    insert("header-three", BlockRenderDescriptor::component("h3"));
    insert("header-four", BlockRenderDescriptor::component("h4"));
    insert("header-five", BlockRenderDescriptor::component("h5"));
    insert("header-six", BlockRenderDescriptor::component("h6"));
    insert("blockquote", BlockRenderDescriptor::component("blockquote"));
    insert(
        "code-block",
        BlockRenderDescriptor::component("code").with_wrapper("pre"),
    );
    insert(
        "unordered-list-item",
        BlockRenderDescriptor::component("li").with_wrapper("ul"),
    );
    insert(
        "ordered-list-item",
        BlockRenderDescriptor::component("li").with_wrapper("ol"),
    );
    insert("atomic", BlockRenderDescriptor::component("figure"));

    map
}
