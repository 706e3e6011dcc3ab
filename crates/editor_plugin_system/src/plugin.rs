//! Plugin trait definition and the top-level editor configuration
//!
//! A plugin is any object exposing zero or more contributions: lifecycle
//! hooks, a change transformer, typed hook registrations, decorators,
//! style/block maps and accessibility attributes. Every contribution has
//! a default "no contribution" implementation, so plugins implement only
//! what they need.

use crate::decorator::DecoratorEntry;
use crate::defaults::DefaultKeyBindingPlugin;
use crate::engine::EditorState;
use crate::hooks::HookRegistration;
use crate::methods::{PluginMethods, StateHandle};
use crate::props::{AccessibilityProps, BlockRenderMap, StyleMap};
use serde_json::{Map, Value};
use std::sync::Arc;

/// The plugin capability contract
pub trait EditorPlugin<S: EditorState>: Send + Sync {
    /// Plugin name, used for logging and diagnostics
    fn name(&self) -> &str;

    /// Called once when the host is constructed
    fn initialize(&self, _methods: &PluginMethods<S>) {}

    /// Called once at teardown; only state access is still valid
    fn will_unmount(&self, _state: &StateHandle<S>) {}

    /// Transform a candidate state as it moves through the change pipeline
    ///
    /// The default passes the state through unchanged, which is
    /// indistinguishable from having no `onChange` at all.
    fn on_change(&self, state: S, _methods: &PluginMethods<S>) -> S {
        state
    }

    /// Typed hook registrations contributed by this plugin
    fn hooks(&self) -> Vec<HookRegistration<S>> {
        Vec::new()
    }

    /// Decorators contributed by this plugin
    fn decorators(&self) -> Vec<DecoratorEntry<S>> {
        Vec::new()
    }

    /// Style map contributed by this plugin
    fn custom_style_map(&self) -> Option<StyleMap> {
        None
    }

    /// Block render map contributed by this plugin
    fn block_render_map(&self) -> Option<BlockRenderMap> {
        None
    }

    /// Accessibility attributes contributed by this plugin
    fn accessibility_props(&self) -> Option<AccessibilityProps> {
        None
    }
}

/// Top-level configuration supplied by the embedding application
///
/// The config is itself a first-class plugin: it is prepended to the
/// resolved plugin list for hook aggregation, accessibility merging and
/// decorator resolution, instead of being special-cased inside the
/// aggregator.
pub struct EditorConfig<S: EditorState> {
    /// Ordered plugin list; order fixes hook precedence
    pub plugins: Vec<Arc<dyn EditorPlugin<S>>>,
    /// Decorators supplied directly, ahead of all plugin decorators
    pub decorators: Vec<DecoratorEntry<S>>,
    /// Append the built-in key-binding plugin (default true)
    pub default_key_bindings: bool,
    /// Merge the built-in block render map underneath (default true)
    pub default_block_render_map: bool,
    /// Explicit style map, merged on top of all plugin style maps
    pub custom_style_map: StyleMap,
    /// Explicit block render map, merged on top of everything
    pub block_render_map: Option<BlockRenderMap>,
    /// Explicitly configured read-only flag
    pub read_only: bool,
    /// Hook registrations supplied directly by the application
    pub hooks: Vec<HookRegistration<S>>,
    /// Accessibility attributes supplied directly
    pub accessibility_props: Option<AccessibilityProps>,
    /// Engine-native props passed through without interception
    pub extra: Map<String, Value>,
    /// Consumer callback, invoked with every committed editor state
    pub on_state_change: Arc<dyn Fn(&S) + Send + Sync>,
}

impl<S: EditorState> EditorConfig<S> {
    /// Create a configuration with the required consumer callback
    pub fn new<F>(on_state_change: F) -> Self
    where
        F: Fn(&S) + Send + Sync + 'static,
    {
        Self {
            plugins: Vec::new(),
            decorators: Vec::new(),
            default_key_bindings: true,
            default_block_render_map: true,
            custom_style_map: StyleMap::new(),
            block_render_map: None,
            read_only: false,
            hooks: Vec::new(),
            accessibility_props: None,
            extra: Map::new(),
            on_state_change: Arc::new(on_state_change),
        }
    }

    /// Append one plugin
    pub fn with_plugin(mut self, plugin: Arc<dyn EditorPlugin<S>>) -> Self {
        self.plugins.push(plugin);
        self
    }

    /// Append several plugins, preserving their order
    pub fn with_plugins(mut self, plugins: impl IntoIterator<Item = Arc<dyn EditorPlugin<S>>>) -> Self {
        self.plugins.extend(plugins);
        self
    }

    /// Append one directly-supplied decorator
    pub fn with_decorator(mut self, decorator: DecoratorEntry<S>) -> Self {
        self.decorators.push(decorator);
        self
    }

    /// Append one directly-supplied hook registration
    pub fn with_hook(mut self, hook: HookRegistration<S>) -> Self {
        self.hooks.push(hook);
        self
    }

    /// Set the explicit style map
    pub fn with_custom_style_map(mut self, map: StyleMap) -> Self {
        self.custom_style_map = map;
        self
    }

    /// Set the explicit block render map override
    pub fn with_block_render_map(mut self, map: BlockRenderMap) -> Self {
        self.block_render_map = Some(map);
        self
    }

    /// Enable or disable the built-in key-binding plugin
    pub fn with_default_key_bindings(mut self, enabled: bool) -> Self {
        self.default_key_bindings = enabled;
        self
    }

    /// Enable or disable the built-in block render map
    pub fn with_default_block_render_map(mut self, enabled: bool) -> Self {
        self.default_block_render_map = enabled;
        self
    }

    /// Set the explicit read-only flag
    pub fn with_read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    /// Set directly-supplied accessibility attributes
    pub fn with_accessibility_props(mut self, props: AccessibilityProps) -> Self {
        self.accessibility_props = Some(props);
        self
    }

    /// Add one engine-native pass-through prop
    pub fn with_extra(mut self, key: &str, value: Value) -> Self {
        self.extra.insert(key.to_owned(), value);
        self
    }

    /// Resolve the active plugin list
    ///
    /// Derived fresh on every use, so configuration changes take effect
    /// immediately. The built-in key-binding plugin goes last so every
    /// application plugin can pre-empt it.
    pub fn resolve_plugins(&self) -> Vec<Arc<dyn EditorPlugin<S>>> {
        let mut plugins = self.plugins.clone();
        if self.default_key_bindings {
            plugins.push(Arc::new(DefaultKeyBindingPlugin));
        }
        plugins
    }
}

impl<S: EditorState> EditorPlugin<S> for EditorConfig<S> {
    fn name(&self) -> &str {
        "editor-config"
    }

    fn hooks(&self) -> Vec<HookRegistration<S>> {
        self.hooks.clone()
    }

    fn decorators(&self) -> Vec<DecoratorEntry<S>> {
        self.decorators.clone()
    }

    fn custom_style_map(&self) -> Option<StyleMap> {
        if self.custom_style_map.is_empty() {
            None
        } else {
            Some(self.custom_style_map.clone())
        }
    }

    fn block_render_map(&self) -> Option<BlockRenderMap> {
        self.block_render_map.clone()
    }

    fn accessibility_props(&self) -> Option<AccessibilityProps> {
        self.accessibility_props.clone()
    }
}
