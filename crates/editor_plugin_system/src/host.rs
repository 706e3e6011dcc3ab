//! The editor host: plugin lifecycle, the change pipeline and the wiring
//! of aggregated hooks into the underlying engine
//!
//! The host owns the single current editor state, resolves the active
//! plugin list, and assembles the engine configuration on every render.
//! It is a two-state machine: *unmounted* until an engine ref is
//! supplied, *mounted* afterwards; teardown returns it to unmounted and
//! no hook dispatch is valid after that.

use crate::decorator::{DecoratorEntry, MultiDecorator, TextDecorator};
use crate::defaults::default_block_render_map;
use crate::engine::{EditorState, EngineConfig, EngineRef};
use crate::error::PluginHostError;
use crate::hooks::HookSet;
use crate::methods::{PluginMethods, StateHandle};
use crate::plugin::{EditorConfig, EditorPlugin};
use crate::props::{resolve_accessibility_props, resolve_block_render_map, resolve_custom_style_map};
use crate::Result;
use arc_swap::{ArcSwap, ArcSwapOption};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, info, warn};

/// State shared between the host, its plugin methods and its closures
pub(crate) struct HostShared<S: EditorState> {
    config: RwLock<Arc<EditorConfig<S>>>,
    state: ArcSwap<S>,
    decorator: ArcSwapOption<MultiDecorator<S>>,
    engine: RwLock<Option<Arc<dyn EngineRef>>>,
    internal_read_only: AtomicBool,
    mounted: AtomicBool,
    torn_down: AtomicBool,
}

impl<S: EditorState> HostShared<S> {
    pub(crate) fn config(&self) -> Arc<EditorConfig<S>> {
        self.config
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub(crate) fn current_state(&self) -> S {
        (**self.state.load()).clone()
    }

    pub(crate) fn resolve_plugins(&self) -> Vec<Arc<dyn EditorPlugin<S>>> {
        self.config().resolve_plugins()
    }

    pub(crate) fn engine_ref(&self) -> Option<Arc<dyn EngineRef>> {
        self.engine
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub(crate) fn effective_read_only(&self) -> bool {
        self.config().read_only || self.internal_read_only.load(Ordering::SeqCst)
    }

    pub(crate) fn set_internal_read_only(&self, read_only: bool) {
        self.internal_read_only.store(read_only, Ordering::SeqCst);
    }

    /// Commit a state and notify the host's consumer
    fn commit_state(&self, state: S) {
        self.state.store(Arc::new(state.clone()));
        (self.config().on_state_change)(&state);
    }

    /// Programmatic replacement: keep the selection, re-attach the
    /// current composite decorator, then commit
    pub(crate) fn set_editor_state(&self, new_state: S) {
        let selection = new_state.selection();
        let decorated = match self.decorator.load_full() {
            Some(decorator) => new_state.set_decorator(Some(decorator as Arc<dyn TextDecorator<S>>)),
            None => new_state,
        };
        self.commit_state(decorated.force_selection(selection));
    }

    /// The change pipeline: thread the candidate state through every
    /// resolved plugin in order, then commit the result
    pub(crate) fn pipeline(shared: &Arc<Self>, candidate: S) {
        if shared.torn_down.load(Ordering::SeqCst) {
            warn!("change dispatched after teardown; ignoring");
            return;
        }
        let methods = PluginMethods::new(shared.clone());
        let mut state = candidate;
        for plugin in shared.resolve_plugins() {
            state = plugin.on_change(state, &methods);
        }
        shared.commit_state(state);
    }
}

/// The editor host
pub struct EditorHost<S: EditorState> {
    shared: Arc<HostShared<S>>,
}

impl<S: EditorState> EditorHost<S> {
    /// Construct a host, initialize every plugin and attach the initial
    /// decorator chain to an empty document
    pub fn new(config: EditorConfig<S>) -> Self {
        let shared = Arc::new(HostShared {
            config: RwLock::new(Arc::new(config)),
            state: ArcSwap::from_pointee(S::empty()),
            decorator: ArcSwapOption::empty(),
            engine: RwLock::new(None),
            internal_read_only: AtomicBool::new(false),
            mounted: AtomicBool::new(false),
            torn_down: AtomicBool::new(false),
        });
        let host = Self { shared };
        host.refresh_decorator();

        let config = host.shared.config();
        let resolved = config.resolve_plugins();
        info!(plugins = resolved.len(), "🔌 initializing editor host");

        // the top-level config participates in initialization first
        let methods = host.plugin_methods();
        EditorPlugin::initialize(config.as_ref(), &methods);
        for plugin in &resolved {
            debug!(plugin = plugin.name(), "initializing plugin");
            plugin.initialize(&methods);
        }

        host
    }

    /// The plugin methods object bound to this host
    pub fn plugin_methods(&self) -> PluginMethods<S> {
        PluginMethods::new(self.shared.clone())
    }

    /// The current configuration
    pub fn config(&self) -> Arc<EditorConfig<S>> {
        self.shared.config()
    }

    /// Replace the configuration; takes effect on the next render
    pub fn update_config(&self, config: EditorConfig<S>) {
        *self
            .shared
            .config
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Arc::new(config);
        self.refresh_decorator();
    }

    /// Attach the engine's imperative ref
    pub fn mount(&self, engine: Arc<dyn EngineRef>) -> Result<()> {
        if self.shared.mounted.swap(true, Ordering::SeqCst) {
            return Err(PluginHostError::AlreadyMounted);
        }
        *self
            .shared
            .engine
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(engine);
        info!("🔗 editor engine mounted");
        Ok(())
    }

    /// Tear the host down
    ///
    /// Every resolved plugin's `will_unmount` runs with a narrowed state
    /// handle; afterwards no hook dispatch is valid.
    pub fn unmount(&self) {
        if self.shared.torn_down.swap(true, Ordering::SeqCst) {
            return;
        }
        let handle = {
            let get = {
                let shared = self.shared.clone();
                move || shared.current_state()
            };
            let set = {
                let shared = self.shared.clone();
                move |state: S| shared.set_editor_state(state)
            };
            StateHandle::new(get, set)
        };
        for plugin in self.shared.resolve_plugins() {
            debug!(plugin = plugin.name(), "unmounting plugin");
            plugin.will_unmount(&handle);
        }
        *self
            .shared
            .engine
            .write()
            .unwrap_or_else(PoisonError::into_inner) = None;
        self.shared.mounted.store(false, Ordering::SeqCst);
        info!("🛑 editor host torn down");
    }

    /// The engine's single change entry point
    pub fn on_change(&self, candidate: S) {
        HostShared::pipeline(&self.shared, candidate);
    }

    /// Read the current editor state
    pub fn editor_state(&self) -> S {
        self.shared.current_state()
    }

    /// Programmatically replace the editor state (selection preserved,
    /// decorator re-attached)
    pub fn set_editor_state(&self, state: S) {
        self.shared.set_editor_state(state);
    }

    /// Effective read-only flag
    pub fn read_only(&self) -> bool {
        self.shared.effective_read_only()
    }

    /// Toggle the internal read-only flag
    pub fn set_read_only(&self, read_only: bool) {
        self.shared.set_internal_read_only(read_only);
    }

    /// Proxy: focus the editing surface
    pub fn focus(&self) -> Result<()> {
        self.shared
            .engine_ref()
            .ok_or(PluginHostError::NotMounted)?
            .focus();
        Ok(())
    }

    /// Proxy: blur the editing surface
    pub fn blur(&self) -> Result<()> {
        self.shared
            .engine_ref()
            .ok_or(PluginHostError::NotMounted)?
            .blur();
        Ok(())
    }

    /// Assemble the configuration bag for the underlying engine
    ///
    /// Everything is re-resolved fresh: the plugin list, the synthesized
    /// hooks, the merged maps and the decorator chain.
    pub fn engine_config(&self) -> EngineConfig<S> {
        self.refresh_decorator();

        let config = self.shared.config();
        let resolved = config.resolve_plugins();

        // the config participates in aggregation ahead of all plugins
        let mut aggregated: Vec<Arc<dyn EditorPlugin<S>>> = Vec::with_capacity(resolved.len() + 1);
        aggregated.push(config.clone() as Arc<dyn EditorPlugin<S>>);
        aggregated.extend(resolved.iter().cloned());

        let hooks = HookSet::aggregate(&aggregated, self.plugin_methods());
        let custom_style_map = resolve_custom_style_map(&resolved, &config);
        let block_render_map =
            resolve_block_render_map(&resolved, &config, &default_block_render_map());
        let accessibility_props = resolve_accessibility_props(&aggregated);

        let on_change = {
            let shared = self.shared.clone();
            Arc::new(move |state: S| HostShared::pipeline(&shared, state))
        };

        EngineConfig {
            editor_state: self.shared.current_state(),
            on_change,
            hooks,
            custom_style_map,
            block_render_map,
            accessibility_props,
            read_only: self.shared.effective_read_only(),
            extra: config.extra.clone(),
        }
    }

    /// Rebuild the decorator chain from the current configuration and
    /// re-attach it to the current state
    fn refresh_decorator(&self) {
        let config = self.shared.config();
        let mut entries: Vec<DecoratorEntry<S>> = config.decorators.clone();
        for plugin in &config.plugins {
            entries.extend(plugin.decorators());
        }

        let handle = {
            let get = {
                let shared = self.shared.clone();
                move || shared.current_state()
            };
            // decoration click-through feeds the full change pipeline
            let set = {
                let shared = self.shared.clone();
                move |state: S| HostShared::pipeline(&shared, state)
            };
            StateHandle::new(get, set)
        };

        let decorator = Arc::new(MultiDecorator::compose(entries, handle));
        self.shared.decorator.store(Some(decorator.clone()));

        let decorated = self
            .shared
            .current_state()
            .set_decorator(Some(decorator as Arc<dyn TextDecorator<S>>));
        self.shared.state.store(Arc::new(decorated));
    }
}
