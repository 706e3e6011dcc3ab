//! Merging of plugin-contributed style maps, block render maps and
//! accessibility attributes
//!
//! The two map mergers deliberately differ in where the top-level config
//! sits (plugins-then-config for the style map, defaults-under /
//! config-on-top for the block render map); existing consumers rely on
//! that asymmetry, so it is preserved exactly.

use crate::decorator::ComponentRef;
use crate::engine::EditorState;
use crate::plugin::{EditorConfig, EditorPlugin};
use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Style-name to style-object mapping
pub type StyleMap = Map<String, Value>;

/// Accessibility attribute mapping
pub type AccessibilityProps = Map<String, Value>;

/// How one block type is rendered
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BlockRenderDescriptor {
    /// Component reference for the block itself
    #[serde(skip_serializing_if = "Option::is_none")]
    pub component: Option<ComponentRef>,
    /// Extra props handed to the component
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub props: Map<String, Value>,
    /// Component wrapping consecutive blocks of this type
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wrapper: Option<ComponentRef>,
}

impl BlockRenderDescriptor {
    /// Descriptor rendering with the named component
    pub fn component(name: &str) -> Self {
        Self {
            component: Some(CompactString::new(name)),
            ..Self::default()
        }
    }

    /// Attach a wrapper component
    pub fn with_wrapper(mut self, name: &str) -> Self {
        self.wrapper = Some(CompactString::new(name));
        self
    }

    /// Attach one prop
    pub fn with_prop(mut self, key: &str, value: Value) -> Self {
        self.props.insert(key.to_owned(), value);
        self
    }

    /// Field-wise merge: set fields of `other` win, props extend
    pub fn merge_from(&mut self, other: &BlockRenderDescriptor) {
        if other.component.is_some() {
            self.component = other.component.clone();
        }
        if other.wrapper.is_some() {
            self.wrapper = other.wrapper.clone();
        }
        self.props.extend(other.props.clone());
    }
}

/// Block-type name to render-descriptor mapping
pub type BlockRenderMap = BTreeMap<CompactString, BlockRenderDescriptor>;

/// Deep-merge `from` into `into` (descriptor fields merge per key)
pub fn merge_block_render_maps(into: &mut BlockRenderMap, from: &BlockRenderMap) {
    for (block_type, descriptor) in from {
        match into.get_mut(block_type) {
            Some(existing) => existing.merge_from(descriptor),
            None => {
                into.insert(block_type.clone(), descriptor.clone());
            }
        }
    }
}

/// Merge every plugin's style map, then the config's explicit map on top
pub fn resolve_custom_style_map<S: EditorState>(
    plugins: &[Arc<dyn EditorPlugin<S>>],
    config: &EditorConfig<S>,
) -> StyleMap {
    let mut merged = StyleMap::new();
    for plugin in plugins {
        if let Some(map) = plugin.custom_style_map() {
            merged.extend(map);
        }
    }
    merged.extend(config.custom_style_map.clone());
    merged
}

/// Fold plugin block render maps, defaults underneath, config on top
pub fn resolve_block_render_map<S: EditorState>(
    plugins: &[Arc<dyn EditorPlugin<S>>],
    config: &EditorConfig<S>,
    defaults: &BlockRenderMap,
) -> BlockRenderMap {
    let mut merged = BlockRenderMap::new();
    for plugin in plugins {
        if let Some(map) = plugin.block_render_map() {
            merge_block_render_maps(&mut merged, &map);
        }
    }

    if config.default_block_render_map {
        let mut base = defaults.clone();
        merge_block_render_maps(&mut base, &merged);
        merged = base;
    }

    if let Some(overrides) = &config.block_render_map {
        merge_block_render_maps(&mut merged, overrides);
    }

    merged
}

/// The two flags that may only escalate once set
const ESCALATING_KEYS: [&str; 2] = ["ariaHasPopup", "ariaExpanded"];

/// Fold one accessibility contribution into the accumulator
///
/// `ariaHasPopup` and `ariaExpanded` are monotonic: once any earlier
/// contributor set a value, a later one can only escalate it to the
/// literal string `"true"`. Every other key is last-writer-wins.
pub fn merge_accessibility_props(merged: &mut AccessibilityProps, incoming: AccessibilityProps) {
    for (key, value) in incoming {
        if ESCALATING_KEYS.contains(&key.as_str()) {
            if !merged.contains_key(&key) {
                merged.insert(key, value);
            } else if value.as_str() == Some("true") {
                merged.insert(key, value);
            }
        } else {
            merged.insert(key, value);
        }
    }
}

/// Merge accessibility contributions across the ordered plugin list
/// (top-level config first)
pub fn resolve_accessibility_props<S: EditorState>(
    plugins: &[Arc<dyn EditorPlugin<S>>],
) -> AccessibilityProps {
    let mut merged = AccessibilityProps::new();
    for plugin in plugins {
        if let Some(props) = plugin.accessibility_props() {
            merge_accessibility_props(&mut merged, props);
        }
    }
    merged
}
