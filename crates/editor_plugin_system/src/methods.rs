//! The bounded capability object handed to every hook invocation

use crate::engine::{EditorState, EngineRef};
use crate::host::HostShared;
use crate::plugin::EditorPlugin;
use std::sync::Arc;

/// A narrowed state accessor + setter pair
///
/// Handed to `will_unmount` and to the composite decorator, which are not
/// entitled to the full [`PluginMethods`] surface.
#[derive(Clone)]
pub struct StateHandle<S: EditorState> {
    get: Arc<dyn Fn() -> S + Send + Sync>,
    set: Arc<dyn Fn(S) + Send + Sync>,
}

impl<S: EditorState> StateHandle<S> {
    /// Build a handle from a getter and a setter
    pub fn new<G, F>(get: G, set: F) -> Self
    where
        G: Fn() -> S + Send + Sync + 'static,
        F: Fn(S) + Send + Sync + 'static,
    {
        Self {
            get: Arc::new(get),
            set: Arc::new(set),
        }
    }

    /// Read the current editor state
    pub fn get(&self) -> S {
        (self.get)()
    }

    /// Replace the current editor state
    pub fn set(&self, state: S) {
        (self.set)(state)
    }
}

/// Plugin methods: controlled access to the host for plugins and hooks
///
/// Every synthesized hook receives this object as its trailing argument.
/// Cloning is cheap; all clones observe the same host.
pub struct PluginMethods<S: EditorState> {
    shared: Arc<HostShared<S>>,
}

impl<S: EditorState> Clone for PluginMethods<S> {
    fn clone(&self) -> Self {
        Self {
            shared: self.shared.clone(),
        }
    }
}

impl<S: EditorState> PluginMethods<S> {
    pub(crate) fn new(shared: Arc<HostShared<S>>) -> Self {
        Self { shared }
    }

    /// Read the current editor state
    pub fn get_editor_state(&self) -> S {
        self.shared.current_state()
    }

    /// Programmatically replace the editor state
    ///
    /// The current selection is preserved across the replacement and the
    /// current composite decorator is re-attached before the commit.
    pub fn set_editor_state(&self, state: S) {
        self.shared.set_editor_state(state);
    }

    /// Read the resolved plugin list
    pub fn get_plugins(&self) -> Vec<Arc<dyn EditorPlugin<S>>> {
        self.shared.resolve_plugins()
    }

    /// Effective read-only flag (explicitly configured or internally set)
    pub fn get_read_only(&self) -> bool {
        self.shared.effective_read_only()
    }

    /// Toggle the internal read-only flag
    pub fn set_read_only(&self, read_only: bool) {
        self.shared.set_internal_read_only(read_only);
    }

    /// Imperative ref to the underlying engine, `None` before mount
    pub fn get_engine_ref(&self) -> Option<Arc<dyn EngineRef>> {
        self.shared.engine_ref()
    }

    /// Narrow this object down to a state accessor + setter pair
    pub fn state_handle(&self) -> StateHandle<S> {
        let get = {
            let shared = self.shared.clone();
            move || shared.current_state()
        };
        let set = {
            let shared = self.shared.clone();
            move |state: S| shared.set_editor_state(state)
        };
        StateHandle::new(get, set)
    }
}
