//! Shared test support: a minimal editor state, a recording engine ref
//! and a configurable test plugin

use crate::decorator::{DecoratorEntry, TextDecorator};
use crate::engine::{ContentBlock, EditorState, EngineRef};
use crate::hooks::HookRegistration;
use crate::methods::{PluginMethods, StateHandle};
use crate::plugin::EditorPlugin;
use crate::props::{AccessibilityProps, BlockRenderMap, StyleMap};
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Plain-text editor state with a cursor position
#[derive(Clone)]
pub(crate) struct TestState {
    text: String,
    cursor: usize,
    decorator: Option<Arc<dyn TextDecorator<TestState>>>,
}

// not derived: the decorator field is not Debug
impl fmt::Debug for TestState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestState")
            .field("text", &self.text)
            .field("cursor", &self.cursor)
            .field("decorated", &self.decorator.is_some())
            .finish()
    }
}

impl TestState {
    pub(crate) fn at(mut self, cursor: usize) -> Self {
        self.cursor = cursor;
        self
    }

    pub(crate) fn text(&self) -> &str {
        &self.text
    }

    pub(crate) fn map_text(mut self, f: impl FnOnce(&str) -> String) -> Self {
        self.text = f(&self.text);
        self
    }

    pub(crate) fn has_decorator(&self) -> bool {
        self.decorator.is_some()
    }

    pub(crate) fn decorator(&self) -> Option<Arc<dyn TextDecorator<TestState>>> {
        self.decorator.clone()
    }
}

impl EditorState for TestState {
    type Selection = usize;

    fn empty() -> Self {
        Self {
            text: String::new(),
            cursor: 0,
            decorator: None,
        }
    }

    fn with_text(text: &str) -> Self {
        Self {
            text: text.to_owned(),
            cursor: 0,
            decorator: None,
        }
    }

    fn selection(&self) -> usize {
        self.cursor
    }

    fn force_selection(&self, cursor: usize) -> Self {
        let mut state = self.clone();
        state.cursor = cursor;
        state
    }

    fn set_decorator(&self, decorator: Option<Arc<dyn TextDecorator<Self>>>) -> Self {
        let mut state = self.clone();
        state.decorator = decorator;
        state
    }
}

/// Engine ref counting focus/blur calls
#[derive(Default)]
pub(crate) struct TestEngine {
    focus: AtomicUsize,
    blur: AtomicUsize,
}

impl TestEngine {
    pub(crate) fn focus_calls(&self) -> usize {
        self.focus.load(Ordering::SeqCst)
    }

    pub(crate) fn blur_calls(&self) -> usize {
        self.blur.load(Ordering::SeqCst)
    }
}

impl EngineRef for TestEngine {
    fn focus(&self) {
        self.focus.fetch_add(1, Ordering::SeqCst);
    }

    fn blur(&self) {
        self.blur.fetch_add(1, Ordering::SeqCst);
    }
}

/// Strategy matching every occurrence of a substring, by char offsets
pub(crate) fn substring_strategy(
    needle: &str,
) -> impl Fn(&ContentBlock, &mut dyn FnMut(usize, usize)) + Send + Sync + 'static {
    let needle = needle.to_owned();
    move |block: &ContentBlock, ranges: &mut dyn FnMut(usize, usize)| {
        if needle.is_empty() {
            return;
        }
        let needle_chars = needle.chars().count();
        let mut offset = 0;
        let mut rest = block.text.as_str();
        while let Some(byte_index) = rest.find(&needle) {
            let start = offset + rest[..byte_index].chars().count();
            ranges(start, start + needle_chars);
            let consumed = byte_index + needle.len();
            offset = start + needle_chars;
            rest = &rest[consumed..];
        }
    }
}

type OnChangeFn = Arc<dyn Fn(TestState) -> TestState + Send + Sync>;

/// Configurable plugin for exercising the host and the aggregator
pub(crate) struct TestPlugin {
    name: String,
    hooks: Vec<HookRegistration<TestState>>,
    decorators: Vec<DecoratorEntry<TestState>>,
    custom_style_map: Option<StyleMap>,
    block_render_map: Option<BlockRenderMap>,
    accessibility: Option<AccessibilityProps>,
    on_change: Option<OnChangeFn>,
    journal: Option<Arc<Mutex<Vec<String>>>>,
}

impl TestPlugin {
    pub(crate) fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            hooks: Vec::new(),
            decorators: Vec::new(),
            custom_style_map: None,
            block_render_map: None,
            accessibility: None,
            on_change: None,
            journal: None,
        }
    }

    pub(crate) fn with_hook(mut self, hook: HookRegistration<TestState>) -> Self {
        self.hooks.push(hook);
        self
    }

    pub(crate) fn with_decorator(mut self, decorator: DecoratorEntry<TestState>) -> Self {
        self.decorators.push(decorator);
        self
    }

    pub(crate) fn with_custom_style_map(mut self, map: StyleMap) -> Self {
        self.custom_style_map = Some(map);
        self
    }

    pub(crate) fn with_block_render_map(mut self, map: BlockRenderMap) -> Self {
        self.block_render_map = Some(map);
        self
    }

    pub(crate) fn with_accessibility_props(mut self, props: AccessibilityProps) -> Self {
        self.accessibility = Some(props);
        self
    }

    pub(crate) fn with_on_change(
        mut self,
        f: impl Fn(TestState) -> TestState + Send + Sync + 'static,
    ) -> Self {
        self.on_change = Some(Arc::new(f));
        self
    }

    pub(crate) fn with_journal(mut self, journal: Arc<Mutex<Vec<String>>>) -> Self {
        self.journal = Some(journal);
        self
    }

    fn record(&self, entry: &str) {
        if let Some(journal) = &self.journal {
            journal
                .lock()
                .expect("journal lock")
                .push(format!("{}:{entry}", self.name));
        }
    }
}

impl EditorPlugin<TestState> for TestPlugin {
    fn name(&self) -> &str {
        &self.name
    }

    fn initialize(&self, _methods: &PluginMethods<TestState>) {
        self.record("initialize");
    }

    fn will_unmount(&self, _state: &StateHandle<TestState>) {
        self.record("will_unmount");
    }

    fn on_change(&self, state: TestState, _methods: &PluginMethods<TestState>) -> TestState {
        match &self.on_change {
            Some(f) => f(state),
            None => state,
        }
    }

    fn hooks(&self) -> Vec<HookRegistration<TestState>> {
        self.hooks.clone()
    }

    fn decorators(&self) -> Vec<DecoratorEntry<TestState>> {
        self.decorators.clone()
    }

    fn custom_style_map(&self) -> Option<StyleMap> {
        self.custom_style_map.clone()
    }

    fn block_render_map(&self) -> Option<BlockRenderMap> {
        self.block_render_map.clone()
    }

    fn accessibility_props(&self) -> Option<AccessibilityProps> {
        self.accessibility.clone()
    }
}
