//! # Editor Plugin System
//!
//! A composition layer that turns a plain rich-text editing engine into a
//! pluggable one. Plugins contribute hooks, decorators, style maps and
//! accessibility attributes; the host merges every contribution into one
//! configuration bag the underlying engine consumes.
//!
//! ## Key Features
//!
//! - **Typed Hooks**: Event, handle and computed hooks with explicit
//!   combination policies instead of name-based guessing
//! - **Decorator Composition**: Any number of structural decorators fused
//!   into one chain, with custom decorators shadowing structural ones
//! - **Change Pipeline**: Every state change threads through each plugin's
//!   `on_change` in registration order before it is committed
//! - **First-Class Config**: The top-level configuration participates in
//!   aggregation as an ordinary plugin, ahead of all others
//! - **Engine Agnostic**: The editor state is a trait; any immutable
//!   state model with a selection and a decorator slot plugs in
//!
//! ## Architecture
//!
//! The crate is built around a handful of core pieces:
//!
//! - **EditorHost**: Lifecycle, the single current state and the change
//!   pipeline
//! - **HookSet**: Name-keyed aggregation of plugin hooks into synthesized
//!   engine callbacks
//! - **MultiDecorator**: The fused decorator chain
//! - **PluginMethods**: The capability object handed to every hook
//!
//! ## Usage
//!
//! ```rust
//! use editor_plugin_system::*;
//! use std::sync::Arc;
//!
//! // A minimal plain-text state model
//! #[derive(Clone)]
//! struct PlainState {
//!     text: String,
//!     cursor: usize,
//!     decorator: Option<Arc<dyn TextDecorator<PlainState>>>,
//! }
//!
//! impl EditorState for PlainState {
//!     type Selection = usize;
//!
//!     fn empty() -> Self {
//!         Self { text: String::new(), cursor: 0, decorator: None }
//!     }
//!
//!     fn with_text(text: &str) -> Self {
//!         Self { text: text.to_owned(), cursor: 0, decorator: None }
//!     }
//!
//!     fn selection(&self) -> usize {
//!         self.cursor
//!     }
//!
//!     fn force_selection(&self, cursor: usize) -> Self {
//!         let mut next = self.clone();
//!         next.cursor = cursor;
//!         next
//!     }
//!
//!     fn set_decorator(&self, decorator: Option<Arc<dyn TextDecorator<Self>>>) -> Self {
//!         let mut next = self.clone();
//!         next.decorator = decorator;
//!         next
//!     }
//! }
//!
//! // A plugin contributing one first-wins key binding
//! struct ShortcutPlugin;
//!
//! impl EditorPlugin<PlainState> for ShortcutPlugin {
//!     fn name(&self) -> &str {
//!         "shortcuts"
//!     }
//!
//!     fn hooks(&self) -> Vec<HookRegistration<PlainState>> {
//!         vec![HookRegistration::computed("keyBindingFn", |args, _methods| {
//!             let event: KeyboardEvent =
//!                 serde_json::from_value(args.first()?.clone()).ok()?;
//!             (event.key == "s" && event.ctrl).then(|| "save".into())
//!         })]
//!     }
//! }
//!
//! let config = EditorConfig::<PlainState>::new(|_state| {})
//!     .with_plugin(Arc::new(ShortcutPlugin));
//! let host = EditorHost::new(config);
//!
//! let engine_config = host.engine_config();
//! let binding = engine_config
//!     .hooks
//!     .get("keyBindingFn")
//!     .and_then(|hook| hook.call_computed(&[KeyboardEvent::new("s").with_ctrl().to_value()]))
//!     .flatten();
//! assert_eq!(binding, Some("save".into()));
//! ```

pub mod decorator;
pub mod defaults;
pub mod engine;
pub mod error;
pub mod hooks;
pub mod host;
pub mod methods;
pub mod plugin;
pub mod props;
pub mod utils;

#[cfg(test)]
mod testkit;

// Re-exports for convenience
pub use decorator::{
    ComponentRef, CompositeDecorator, DecorateStrategy, DecorationKey, DecoratorEntry,
    DecoratorSpec, MultiDecorator, TextDecorator,
};
pub use defaults::{default_block_render_map, default_key_binding, DefaultKeyBindingPlugin, KeyboardEvent};
pub use engine::{ContentBlock, EditorState, EngineConfig, EngineRef};
pub use error::PluginHostError;
pub use hooks::{
    CombinePolicy, HandlerOutcome, HookCategory, HookName, HookRegistration, HookSet,
    SynthesizedHook, ON_CHANGE,
};
pub use host::EditorHost;
pub use methods::{PluginMethods, StateHandle};
pub use plugin::{EditorConfig, EditorPlugin};
pub use props::{AccessibilityProps, BlockRenderDescriptor, BlockRenderMap, StyleMap};
pub use utils::{create_state_with_text, from_payload, to_payload};

/// Version information for compatibility checks
pub const EDITOR_PLUGIN_SYSTEM_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Result type used throughout the crate
pub type Result<T> = std::result::Result<T, PluginHostError>;
