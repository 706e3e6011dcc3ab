//! Hook aggregation: one synthesized callback per hook name
//!
//! Plugins contribute hooks as typed registrations. The aggregator walks
//! the ordered plugin list (top-level config first), groups registrations
//! by name, and builds one combined callable per name that the underlying
//! engine invokes exactly like a single handler. The combination rule is
//! fixed by the hook's category (event / handle) or, for computed hooks,
//! by an explicit [`CombinePolicy`] attached at registration time.

use crate::engine::EditorState;
use crate::methods::PluginMethods;
use crate::plugin::EditorPlugin;
use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use smallvec::SmallVec;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Name of a hook, e.g. `"handleKeyCommand"` or `"blockStyleFn"`
pub type HookName = CompactString;

/// The change pipeline is owned by the host and never aggregated
pub const ON_CHANGE: &str = "onChange";

/// Outcome of a handle hook
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HandlerOutcome {
    /// The dispatch was consumed; later plugins are not invoked
    Handled,
    /// The dispatch was not consumed
    NotHandled,
}

impl HandlerOutcome {
    /// True for [`HandlerOutcome::Handled`]
    pub fn is_handled(self) -> bool {
        matches!(self, HandlerOutcome::Handled)
    }
}

/// Side-effecting hook; returning `true` stops propagation
pub type EventHookFn<S> = Arc<dyn Fn(&[Value], &PluginMethods<S>) -> bool + Send + Sync>;

/// First-to-handle hook; `None` means "no opinion"
pub type HandleHookFn<S> =
    Arc<dyn Fn(&[Value], &PluginMethods<S>) -> Option<HandlerOutcome> + Send + Sync>;

/// Value-producing hook; `None` means "no contribution"
pub type ComputedHookFn<S> = Arc<dyn Fn(&[Value], &PluginMethods<S>) -> Option<Value> + Send + Sync>;

/// How the contributions of a computed hook are combined
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CombinePolicy {
    /// First non-`None` contribution wins
    FirstWins,
    /// Every contribution is joined into one space-separated string
    Concatenate,
    /// Contributions fold into one descriptor; `props` members merge,
    /// other members are overwritten by later contributors
    StructMerge,
}

impl CombinePolicy {
    /// The conventional policy for a hook name
    ///
    /// `blockRendererFn` and `blockStyleFn` carry special semantics in the
    /// underlying engine; every other computed hook is first-wins.
    pub fn for_name(name: &str) -> Self {
        match name {
            "blockRendererFn" => CombinePolicy::StructMerge,
            "blockStyleFn" => CombinePolicy::Concatenate,
            _ => CombinePolicy::FirstWins,
        }
    }
}

/// Category a hook name belongs to
///
/// A name belongs to exactly one category; the first registration of a
/// name fixes it, and later registrations under a different category are
/// ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookCategory {
    Event,
    Handle,
    Computed,
}

/// A plugin's typed contribution to a single hook name
#[derive(Clone)]
pub enum HookKind<S: EditorState> {
    Event(EventHookFn<S>),
    Handle(HandleHookFn<S>),
    Computed {
        policy: CombinePolicy,
        f: ComputedHookFn<S>,
    },
}

impl<S: EditorState> HookKind<S> {
    /// The category this contribution belongs to
    pub fn category(&self) -> HookCategory {
        match self {
            HookKind::Event(_) => HookCategory::Event,
            HookKind::Handle(_) => HookCategory::Handle,
            HookKind::Computed { .. } => HookCategory::Computed,
        }
    }
}

/// A named, typed hook registration
///
/// Capability classification happens here, at registration time, instead
/// of by string-matching attribute names on every aggregation pass.
#[derive(Clone)]
pub struct HookRegistration<S: EditorState> {
    pub name: HookName,
    pub hook: HookKind<S>,
}

impl<S: EditorState> HookRegistration<S> {
    /// Register an event hook (e.g. `onFocus`)
    pub fn event<F>(name: impl Into<HookName>, f: F) -> Self
    where
        F: Fn(&[Value], &PluginMethods<S>) -> bool + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            hook: HookKind::Event(Arc::new(f)),
        }
    }

    /// Register a handle hook (e.g. `handleKeyCommand`)
    pub fn handle<F>(name: impl Into<HookName>, f: F) -> Self
    where
        F: Fn(&[Value], &PluginMethods<S>) -> Option<HandlerOutcome> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            hook: HookKind::Handle(Arc::new(f)),
        }
    }

    /// Register a computed hook with the conventional policy for its name
    pub fn computed<F>(name: impl Into<HookName>, f: F) -> Self
    where
        F: Fn(&[Value], &PluginMethods<S>) -> Option<Value> + Send + Sync + 'static,
    {
        let name = name.into();
        let policy = CombinePolicy::for_name(&name);
        Self {
            name,
            hook: HookKind::Computed {
                policy,
                f: Arc::new(f),
            },
        }
    }

    /// Register a computed hook with an explicit combine policy
    pub fn computed_with_policy<F>(name: impl Into<HookName>, policy: CombinePolicy, f: F) -> Self
    where
        F: Fn(&[Value], &PluginMethods<S>) -> Option<Value> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            hook: HookKind::Computed {
                policy,
                f: Arc::new(f),
            },
        }
    }
}

/// One synthesized callback, ready for the engine to invoke
///
/// The plugin methods object is already bound; the engine passes only the
/// arguments it would give a single handler.
#[derive(Clone)]
pub enum SynthesizedHook {
    Event(Arc<dyn Fn(&[Value]) -> bool + Send + Sync>),
    Handle(Arc<dyn Fn(&[Value]) -> HandlerOutcome + Send + Sync>),
    Computed(Arc<dyn Fn(&[Value]) -> Option<Value> + Send + Sync>),
}

impl SynthesizedHook {
    /// The category of the synthesized callback
    pub fn category(&self) -> HookCategory {
        match self {
            SynthesizedHook::Event(_) => HookCategory::Event,
            SynthesizedHook::Handle(_) => HookCategory::Handle,
            SynthesizedHook::Computed(_) => HookCategory::Computed,
        }
    }

    /// Invoke as an event hook; `None` if this is not an event hook
    pub fn call_event(&self, args: &[Value]) -> Option<bool> {
        match self {
            SynthesizedHook::Event(f) => Some(f(args)),
            _ => None,
        }
    }

    /// Invoke as a handle hook; `None` if this is not a handle hook
    pub fn call_handle(&self, args: &[Value]) -> Option<HandlerOutcome> {
        match self {
            SynthesizedHook::Handle(f) => Some(f(args)),
            _ => None,
        }
    }

    /// Invoke as a computed hook; outer `None` if this is not a computed
    /// hook, inner `None` if no plugin contributed a value
    pub fn call_computed(&self, args: &[Value]) -> Option<Option<Value>> {
        match self {
            SynthesizedHook::Computed(f) => Some(f(args)),
            _ => None,
        }
    }
}

/// The full set of synthesized hooks for one render
#[derive(Clone, Default)]
pub struct HookSet {
    hooks: HashMap<HookName, SynthesizedHook>,
}

impl HookSet {
    /// Aggregate every hook registration across the ordered plugin list
    ///
    /// `plugins` must already contain the top-level config as its first
    /// element. Registration order fixes invocation order; `onChange`
    /// registrations are ignored because the host owns that pipeline.
    pub fn aggregate<S: EditorState>(
        plugins: &[Arc<dyn EditorPlugin<S>>],
        methods: PluginMethods<S>,
    ) -> Self {
        let mut order: Vec<HookName> = Vec::new();
        let mut claimed: HashMap<HookName, HookCategory> = HashMap::new();
        let mut event_chains: HashMap<HookName, SmallVec<[EventHookFn<S>; 4]>> = HashMap::new();
        let mut handle_chains: HashMap<HookName, SmallVec<[HandleHookFn<S>; 4]>> = HashMap::new();
        let mut computed_chains: HashMap<HookName, (CombinePolicy, SmallVec<[ComputedHookFn<S>; 4]>)> =
            HashMap::new();

        for plugin in plugins {
            for registration in plugin.hooks() {
                let name = registration.name;
                if name == ON_CHANGE {
                    warn!(plugin = plugin.name(), "onChange is not aggregatable; ignoring registration");
                    continue;
                }

                let category = registration.hook.category();
                match claimed.get(&name).copied() {
                    None => {
                        claimed.insert(name.clone(), category);
                        order.push(name.clone());
                    }
                    Some(existing) if existing != category => {
                        debug!(
                            hook = %name,
                            plugin = plugin.name(),
                            "hook name already claimed by another category; skipping"
                        );
                        continue;
                    }
                    Some(_) => {}
                }

                match registration.hook {
                    HookKind::Event(f) => {
                        event_chains.entry(name).or_default().push(f);
                    }
                    HookKind::Handle(f) => {
                        handle_chains.entry(name).or_default().push(f);
                    }
                    HookKind::Computed { policy, f } => {
                        let entry = computed_chains
                            .entry(name.clone())
                            .or_insert_with(|| (policy, SmallVec::new()));
                        if entry.0 != policy {
                            warn!(
                                hook = %name,
                                plugin = plugin.name(),
                                "conflicting combine policy; keeping the first registration's policy"
                            );
                        }
                        entry.1.push(f);
                    }
                }
            }
        }

        let mut hooks = HashMap::with_capacity(order.len());
        for name in order {
            let synthesized = match claimed.get(&name) {
                Some(HookCategory::Event) => {
                    let chain = event_chains.remove(&name).unwrap_or_default();
                    Self::synthesize_event(chain, methods.clone())
                }
                Some(HookCategory::Handle) => {
                    let chain = handle_chains.remove(&name).unwrap_or_default();
                    Self::synthesize_handle(chain, methods.clone())
                }
                Some(HookCategory::Computed) => {
                    let (policy, chain) = computed_chains
                        .remove(&name)
                        .unwrap_or((CombinePolicy::FirstWins, SmallVec::new()));
                    Self::synthesize_computed(policy, chain, methods.clone())
                }
                None => continue,
            };
            debug!(hook = %name, "synthesized hook");
            hooks.insert(name, synthesized);
        }

        HookSet { hooks }
    }

    fn synthesize_event<S: EditorState>(
        chain: SmallVec<[EventHookFn<S>; 4]>,
        methods: PluginMethods<S>,
    ) -> SynthesizedHook {
        SynthesizedHook::Event(Arc::new(move |args| {
            for f in &chain {
                if f(args, &methods) {
                    return true;
                }
            }
            false
        }))
    }

    fn synthesize_handle<S: EditorState>(
        chain: SmallVec<[HandleHookFn<S>; 4]>,
        methods: PluginMethods<S>,
    ) -> SynthesizedHook {
        SynthesizedHook::Handle(Arc::new(move |args| {
            for f in &chain {
                if f(args, &methods) == Some(HandlerOutcome::Handled) {
                    return HandlerOutcome::Handled;
                }
            }
            HandlerOutcome::NotHandled
        }))
    }

    fn synthesize_computed<S: EditorState>(
        policy: CombinePolicy,
        chain: SmallVec<[ComputedHookFn<S>; 4]>,
        methods: PluginMethods<S>,
    ) -> SynthesizedHook {
        match policy {
            CombinePolicy::FirstWins => SynthesizedHook::Computed(Arc::new(move |args| {
                chain.iter().find_map(|f| f(args, &methods))
            })),
            CombinePolicy::Concatenate => SynthesizedHook::Computed(Arc::new(move |args| {
                let mut styles: Option<String> = None;
                for f in &chain {
                    let Some(value) = f(args, &methods) else { continue };
                    if value.is_null() {
                        continue;
                    }
                    let piece = match value {
                        Value::String(s) => s,
                        other => other.to_string(),
                    };
                    styles = Some(match styles {
                        Some(acc) => format!("{acc} {piece}"),
                        None => piece,
                    });
                }
                styles.map(Value::String)
            })),
            CombinePolicy::StructMerge => SynthesizedHook::Computed(Arc::new(move |args| {
                let mut props: Map<String, Value> = Map::new();
                let mut descriptor: Map<String, Value> = Map::new();
                for f in &chain {
                    let Some(value) = f(args, &methods) else { continue };
                    // tolerate malformed results: non-objects contribute nothing
                    let Value::Object(mut fields) = value else { continue };
                    if let Some(Value::Object(contributed)) = fields.remove("props") {
                        props.extend(contributed);
                    }
                    descriptor.extend(fields);
                }
                if descriptor.contains_key("component") {
                    descriptor.insert("props".to_owned(), Value::Object(props));
                    Some(Value::Object(descriptor))
                } else {
                    None
                }
            })),
        }
    }

    /// Look up a synthesized hook by name
    pub fn get(&self, name: &str) -> Option<&SynthesizedHook> {
        self.hooks.get(name)
    }

    /// Iterate over the synthesized hook names
    pub fn names(&self) -> impl Iterator<Item = &HookName> {
        self.hooks.keys()
    }

    /// Number of synthesized hooks
    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    /// Whether no hook was synthesized
    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::EditorHost;
    use crate::plugin::EditorConfig;
    use crate::testkit::{TestPlugin, TestState};
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn methods() -> PluginMethods<TestState> {
        let host = EditorHost::new(EditorConfig::<TestState>::new(|_| {}));
        host.plugin_methods()
    }

    fn as_plugins(plugins: Vec<TestPlugin>) -> Vec<Arc<dyn EditorPlugin<TestState>>> {
        plugins
            .into_iter()
            .map(|p| Arc::new(p) as Arc<dyn EditorPlugin<TestState>>)
            .collect()
    }

    #[test]
    fn event_hook_short_circuits_on_true() {
        let invoked = Arc::new(AtomicUsize::new(0));
        let mk = |result: bool, invoked: Arc<AtomicUsize>| {
            HookRegistration::event("onFocus", move |_args, _methods| {
                invoked.fetch_add(1, Ordering::SeqCst);
                result
            })
        };
        let plugins = as_plugins(vec![
            TestPlugin::new("a").with_hook(mk(false, invoked.clone())),
            TestPlugin::new("b").with_hook(mk(true, invoked.clone())),
            TestPlugin::new("c").with_hook(mk(true, invoked.clone())),
        ]);

        let hooks = HookSet::aggregate(&plugins, methods());
        let hook = hooks.get("onFocus").expect("synthesized");
        assert_eq!(hook.call_event(&[]), Some(true));
        // the third plugin is never invoked
        assert_eq!(invoked.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn event_hook_reports_false_when_unhandled() {
        let plugins = as_plugins(vec![
            TestPlugin::new("a").with_hook(HookRegistration::event("onBlur", |_, _| false)),
        ]);
        let hooks = HookSet::aggregate(&plugins, methods());
        assert_eq!(hooks.get("onBlur").and_then(|h| h.call_event(&[])), Some(false));
    }

    #[test]
    fn handle_hook_stops_at_first_handled() {
        let invoked = Arc::new(AtomicUsize::new(0));
        let mk = |result: Option<HandlerOutcome>, invoked: Arc<AtomicUsize>| {
            HookRegistration::handle("handleKeyCommand", move |_args, _methods| {
                invoked.fetch_add(1, Ordering::SeqCst);
                result
            })
        };
        let plugins = as_plugins(vec![
            TestPlugin::new("a").with_hook(mk(None, invoked.clone())),
            TestPlugin::new("b").with_hook(mk(Some(HandlerOutcome::NotHandled), invoked.clone())),
            TestPlugin::new("c").with_hook(mk(Some(HandlerOutcome::Handled), invoked.clone())),
            TestPlugin::new("d").with_hook(mk(Some(HandlerOutcome::Handled), invoked.clone())),
        ]);

        let hooks = HookSet::aggregate(&plugins, methods());
        let hook = hooks.get("handleKeyCommand").expect("synthesized");
        assert_eq!(hook.call_handle(&[]), Some(HandlerOutcome::Handled));
        assert_eq!(invoked.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn handle_hook_defaults_to_not_handled() {
        let plugins = as_plugins(vec![
            TestPlugin::new("a").with_hook(HookRegistration::handle("handleReturn", |_, _| None)),
        ]);
        let hooks = HookSet::aggregate(&plugins, methods());
        assert_eq!(
            hooks.get("handleReturn").and_then(|h| h.call_handle(&[])),
            Some(HandlerOutcome::NotHandled)
        );
    }

    #[test]
    fn block_style_fn_concatenates_in_order() {
        let mk = |result: Option<Value>| {
            HookRegistration::computed("blockStyleFn", move |_args, _methods| result.clone())
        };
        let plugins = as_plugins(vec![
            TestPlugin::new("a").with_hook(mk(Some(json!("a")))),
            TestPlugin::new("b").with_hook(mk(None)),
            TestPlugin::new("c").with_hook(mk(Some(json!("b")))),
        ]);

        let hooks = HookSet::aggregate(&plugins, methods());
        let result = hooks
            .get("blockStyleFn")
            .and_then(|h| h.call_computed(&[]))
            .flatten();
        assert_eq!(result, Some(json!("a b")));
    }

    #[test]
    fn block_style_fn_reports_none_without_contributions() {
        let plugins = as_plugins(vec![
            TestPlugin::new("a").with_hook(HookRegistration::computed("blockStyleFn", |_, _| None)),
        ]);
        let hooks = HookSet::aggregate(&plugins, methods());
        assert_eq!(
            hooks.get("blockStyleFn").and_then(|h| h.call_computed(&[])),
            Some(None)
        );
    }

    #[test]
    fn block_renderer_fn_merges_props_and_overwrites_fields() {
        let plugins = as_plugins(vec![
            TestPlugin::new("a").with_hook(HookRegistration::computed(
                "blockRendererFn",
                |_, _| Some(json!({"component": "X", "props": {"foo": 1}})),
            )),
            TestPlugin::new("b").with_hook(HookRegistration::computed(
                "blockRendererFn",
                |_, _| Some(json!({"props": {"bar": 2}})),
            )),
        ]);

        let hooks = HookSet::aggregate(&plugins, methods());
        let result = hooks
            .get("blockRendererFn")
            .and_then(|h| h.call_computed(&[]))
            .flatten();
        assert_eq!(
            result,
            Some(json!({"component": "X", "props": {"foo": 1, "bar": 2}}))
        );
    }

    #[test]
    fn block_renderer_fn_without_component_reports_none() {
        let plugins = as_plugins(vec![
            TestPlugin::new("a").with_hook(HookRegistration::computed(
                "blockRendererFn",
                |_, _| Some(json!({"props": {"foo": 1}})),
            )),
        ]);
        let hooks = HookSet::aggregate(&plugins, methods());
        assert_eq!(
            hooks.get("blockRendererFn").and_then(|h| h.call_computed(&[])),
            Some(None)
        );
    }

    #[test]
    fn block_renderer_fn_tolerates_malformed_results() {
        let plugins = as_plugins(vec![
            TestPlugin::new("a").with_hook(HookRegistration::computed(
                "blockRendererFn",
                |_, _| Some(json!("not an object")),
            )),
            TestPlugin::new("b").with_hook(HookRegistration::computed(
                "blockRendererFn",
                |_, _| Some(json!({"component": "Y"})),
            )),
        ]);
        let hooks = HookSet::aggregate(&plugins, methods());
        let result = hooks
            .get("blockRendererFn")
            .and_then(|h| h.call_computed(&[]))
            .flatten();
        assert_eq!(result, Some(json!({"component": "Y", "props": {}})));
    }

    #[test]
    fn generic_computed_hook_first_result_wins() {
        let mk = |result: Option<Value>| {
            HookRegistration::computed("keyBindingFn", move |_args, _methods| result.clone())
        };
        let plugins = as_plugins(vec![
            TestPlugin::new("a").with_hook(mk(None)),
            TestPlugin::new("b").with_hook(mk(Some(json!("bold")))),
            TestPlugin::new("c").with_hook(mk(Some(json!("italic")))),
        ]);
        let hooks = HookSet::aggregate(&plugins, methods());
        let result = hooks
            .get("keyBindingFn")
            .and_then(|h| h.call_computed(&[]))
            .flatten();
        assert_eq!(result, Some(json!("bold")));
    }

    #[test]
    fn first_category_claims_the_name() {
        let plugins = as_plugins(vec![
            TestPlugin::new("a").with_hook(HookRegistration::event("onTab", |_, _| true)),
            TestPlugin::new("b").with_hook(HookRegistration::computed("onTab", |_, _| {
                Some(json!("never"))
            })),
        ]);
        let hooks = HookSet::aggregate(&plugins, methods());
        let hook = hooks.get("onTab").expect("synthesized");
        assert_eq!(hook.category(), HookCategory::Event);
        assert_eq!(hook.call_event(&[]), Some(true));
        assert_eq!(hook.call_computed(&[]), None);
    }

    #[test]
    fn on_change_is_never_aggregated() {
        let plugins = as_plugins(vec![
            TestPlugin::new("a").with_hook(HookRegistration::event(ON_CHANGE, |_, _| true)),
        ]);
        let hooks = HookSet::aggregate(&plugins, methods());
        assert!(hooks.get(ON_CHANGE).is_none());
        assert!(hooks.is_empty());
    }

    #[test]
    fn aggregation_is_idempotent() {
        let plugins = as_plugins(vec![
            TestPlugin::new("a")
                .with_hook(HookRegistration::event("onFocus", |_, _| true))
                .with_hook(HookRegistration::handle("handleReturn", |_, _| {
                    Some(HandlerOutcome::Handled)
                }))
                .with_hook(HookRegistration::computed("blockStyleFn", |_, _| {
                    Some(json!("wide"))
                })),
        ]);

        let first = HookSet::aggregate(&plugins, methods());
        let second = HookSet::aggregate(&plugins, methods());
        assert_eq!(first.len(), second.len());
        for name in first.names() {
            let a = first.get(name).expect("first");
            let b = second.get(name).expect("second");
            assert_eq!(a.category(), b.category());
        }
        assert_eq!(
            second.get("onFocus").and_then(|h| h.call_event(&[])),
            Some(true)
        );
        assert_eq!(
            second.get("handleReturn").and_then(|h| h.call_handle(&[])),
            Some(HandlerOutcome::Handled)
        );
    }

    #[test]
    fn hook_receives_original_arguments() {
        let plugins = as_plugins(vec![TestPlugin::new("a").with_hook(
            HookRegistration::computed("keyBindingFn", |args, _methods| {
                args.first().cloned()
            }),
        )]);
        let hooks = HookSet::aggregate(&plugins, methods());
        let result = hooks
            .get("keyBindingFn")
            .and_then(|h| h.call_computed(&[json!({"key": "b"})]))
            .flatten();
        assert_eq!(result, Some(json!({"key": "b"})));
    }
}
