//! Decorator composition: structural specs, composite and chained decorators
//!
//! A decorator attaches rendering to ranges of text. Structural decorators
//! are declarative triples (strategy + component + props) that the
//! [`CompositeDecorator`] evaluates left-to-right. Custom decorators
//! implement the full [`TextDecorator`] capability themselves and always
//! shadow the structural composite for the same range.

use crate::engine::{ContentBlock, EditorState};
use crate::methods::StateHandle;
use compact_str::{format_compact, CompactString};
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

/// Key identifying one decorated range within a block
pub type DecorationKey = CompactString;

/// Opaque component reference, resolved by the embedding engine
pub type ComponentRef = CompactString;

/// A strategy scans a block and reports `(start, end)` character ranges
pub type DecorateStrategy = Arc<dyn Fn(&ContentBlock, &mut dyn FnMut(usize, usize)) + Send + Sync>;

/// Declarative structural decorator: strategy + component + props
#[derive(Clone)]
pub struct DecoratorSpec {
    pub strategy: DecorateStrategy,
    pub component: ComponentRef,
    pub props: Value,
}

impl DecoratorSpec {
    /// Create a structural decorator
    pub fn new<F>(strategy: F, component: impl Into<ComponentRef>, props: Value) -> Self
    where
        F: Fn(&ContentBlock, &mut dyn FnMut(usize, usize)) + Send + Sync + 'static,
    {
        Self {
            strategy: Arc::new(strategy),
            component: component.into(),
            props,
        }
    }
}

/// The three-method decorator capability
///
/// `decorations` returns one slot per character of the block: `Some(key)`
/// where the decorator claims the character, `None` where it does not.
pub trait TextDecorator<S: EditorState>: Send + Sync {
    /// Enumerate decoration keys for every character position of a block
    fn decorations(&self, block: &ContentBlock, state: &S) -> Vec<Option<DecorationKey>>;

    /// Resolve the component for a decoration key
    fn component_for_key(&self, key: &DecorationKey) -> Option<ComponentRef>;

    /// Resolve the props for a decoration key
    fn props_for_key(&self, key: &DecorationKey) -> Value;
}

/// A plugin's (or the config's) decorator contribution
#[derive(Clone)]
pub enum DecoratorEntry<S: EditorState> {
    /// Declarative, composed by range into the structural composite
    Structural(DecoratorSpec),
    /// Full implementation of the decorator capability
    Custom(Arc<dyn TextDecorator<S>>),
}

impl<S: EditorState> DecoratorEntry<S> {
    /// Whether this entry carries a custom decorator
    pub fn is_custom(&self) -> bool {
        matches!(self, DecoratorEntry::Custom(_))
    }
}

/// Composite over the ordered structural decorator specs
///
/// Strategies run left-to-right; a later spec never overwrites a character
/// slot an earlier spec already claimed. The composite holds the host's
/// state accessor and setter so interactive decoration components can
/// route a click-through back into the change pipeline.
pub struct CompositeDecorator<S: EditorState> {
    specs: Vec<DecoratorSpec>,
    state: StateHandle<S>,
}

impl<S: EditorState> CompositeDecorator<S> {
    /// Build the composite from ordered specs and the host's state handle
    pub fn new(specs: Vec<DecoratorSpec>, state: StateHandle<S>) -> Self {
        debug!(specs = specs.len(), "built composite decorator");
        Self { specs, state }
    }

    /// The state accessor + setter supplied at construction
    ///
    /// The setter feeds the host's change pipeline, so a decoration
    /// component replacing state behaves exactly like an engine edit.
    pub fn state_handle(&self) -> &StateHandle<S> {
        &self.state
    }

    fn spec_for_key(&self, key: &DecorationKey) -> Option<&DecoratorSpec> {
        let (index, _) = key.split_once('.')?;
        self.specs.get(index.parse::<usize>().ok()?)
    }
}

impl<S: EditorState> TextDecorator<S> for CompositeDecorator<S> {
    fn decorations(&self, block: &ContentBlock, _state: &S) -> Vec<Option<DecorationKey>> {
        let len = block.len();
        let mut slots: Vec<Option<DecorationKey>> = vec![None; len];

        for (index, spec) in self.specs.iter().enumerate() {
            let mut ranges: Vec<(usize, usize)> = Vec::new();
            (spec.strategy)(block, &mut |start, end| ranges.push((start, end)));

            for (start, end) in ranges {
                let end = end.min(len);
                if start >= end {
                    continue;
                }
                // first-match wins: a range touching claimed slots is dropped
                if slots[start..end].iter().any(|slot| slot.is_some()) {
                    continue;
                }
                let key: DecorationKey = format_compact!("{index}.{start}");
                for slot in &mut slots[start..end] {
                    *slot = Some(key.clone());
                }
            }
        }

        slots
    }

    fn component_for_key(&self, key: &DecorationKey) -> Option<ComponentRef> {
        self.spec_for_key(key).map(|spec| spec.component.clone())
    }

    fn props_for_key(&self, key: &DecorationKey) -> Value {
        self.spec_for_key(key)
            .map(|spec| spec.props.clone())
            .unwrap_or(Value::Null)
    }
}

/// Ordered chain of decorators, earlier children shadowing later ones
///
/// Keys are prefixed with the owning child's position so component and
/// props lookups delegate to the right child.
pub struct MultiDecorator<S: EditorState> {
    children: Vec<Arc<dyn TextDecorator<S>>>,
}

impl<S: EditorState> MultiDecorator<S> {
    /// Build a chain from ordered children
    pub fn new(children: Vec<Arc<dyn TextDecorator<S>>>) -> Self {
        Self { children }
    }

    /// Compose the full decorator chain from plugin/config contributions
    ///
    /// Custom decorators keep their original relative order and come
    /// first; the single structural composite comes last, so customs
    /// shadow it for the same text range regardless of how the structural
    /// specs were registered.
    pub fn compose(entries: Vec<DecoratorEntry<S>>, state: StateHandle<S>) -> Self {
        let mut children: Vec<Arc<dyn TextDecorator<S>>> = Vec::new();
        let mut specs: Vec<DecoratorSpec> = Vec::new();

        for entry in entries {
            match entry {
                DecoratorEntry::Custom(decorator) => children.push(decorator),
                DecoratorEntry::Structural(spec) => specs.push(spec),
            }
        }

        debug!(
            custom = children.len(),
            structural = specs.len(),
            "composing decorator chain"
        );
        children.push(Arc::new(CompositeDecorator::new(specs, state)));
        Self { children }
    }

    /// Number of chained decorators
    pub fn len(&self) -> usize {
        self.children.len()
    }

    /// Whether the chain is empty
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    fn child_for_key(&self, key: &DecorationKey) -> Option<(&Arc<dyn TextDecorator<S>>, DecorationKey)> {
        let (index, rest) = key.split_once(':')?;
        let child = self.children.get(index.parse::<usize>().ok()?)?;
        Some((child, CompactString::new(rest)))
    }
}

impl<S: EditorState> TextDecorator<S> for MultiDecorator<S> {
    fn decorations(&self, block: &ContentBlock, state: &S) -> Vec<Option<DecorationKey>> {
        let len = block.len();
        let mut slots: Vec<Option<DecorationKey>> = vec![None; len];

        for (index, child) in self.children.iter().enumerate() {
            let child_slots = child.decorations(block, state);
            for (position, key) in child_slots.into_iter().enumerate().take(len) {
                if let Some(key) = key {
                    if slots[position].is_none() {
                        slots[position] = Some(format_compact!("{index}:{key}"));
                    }
                }
            }
        }

        slots
    }

    fn component_for_key(&self, key: &DecorationKey) -> Option<ComponentRef> {
        let (child, inner) = self.child_for_key(key)?;
        child.component_for_key(&inner)
    }

    fn props_for_key(&self, key: &DecorationKey) -> Value {
        match self.child_for_key(key) {
            Some((child, inner)) => child.props_for_key(&inner),
            None => Value::Null,
        }
    }
}
