//! Context sources - data/logic a tree node contributes to bubbling events

use std::collections::HashMap;
use std::fmt;

use contracts::{ChannelName, Payload};

use crate::resolver::Resolution;

/// Read-only view of the event being resolved, handed to every dynamically
/// evaluated source field.
#[derive(Debug, Clone, Copy)]
pub struct EventView<'a, K> {
    /// Node owning the evaluated field, when the chain knows it.
    pub receiver: Option<&'a K>,
    /// Event sub-key.
    pub key: &'a str,
    /// Payload accumulated so far.
    pub data: &'a Payload,
    /// Channel override in effect, if any.
    pub channels: Option<&'a [ChannelName]>,
}

/// A source field that is either a static value or computed per event.
///
/// Computed fields are invoked lazily with the owning node bound as the
/// view's receiver; static values pass through unchanged.
pub enum Bound<K, T> {
    /// Static value.
    Value(T),
    /// Per-event computation.
    Computed(Box<dyn Fn(&EventView<'_, K>) -> T + Send + Sync>),
}

impl<K, T> Bound<K, T> {
    /// A static field value.
    pub fn value(value: T) -> Self {
        Self::Value(value)
    }

    /// A field computed per event.
    pub fn computed<F>(f: F) -> Self
    where
        F: Fn(&EventView<'_, K>) -> T + Send + Sync + 'static,
    {
        Self::Computed(Box::new(f))
    }

    /// Evaluate the field against one event.
    pub fn eval(&self, view: &EventView<'_, K>) -> T
    where
        T: Clone,
    {
        match self {
            Self::Value(value) => value.clone(),
            Self::Computed(f) => f(view),
        }
    }
}

impl<K, T> From<T> for Bound<K, T> {
    fn from(value: T) -> Self {
        Self::Value(value)
    }
}

impl<K, T: fmt::Debug> fmt::Debug for Bound<K, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(v) => f.debug_tuple("Value").field(v).finish(),
            Self::Computed(_) => write!(f, "Computed(..)"),
        }
    }
}

/// Structured context declaration attached to a tree node.
///
/// All fields are optional; each may be a static value or a per-event
/// computation. Merge precedence during resolution: the event's incoming
/// fields beat the sub-key fragment, which beats [`DeclaredSource::with`].
///
/// # Examples
/// ```
/// use contracts::payload;
/// use resolver::DeclaredSource;
///
/// let source: DeclaredSource<u32> = DeclaredSource::new()
///     .with(payload!({ "module": "cart" }))
///     .fragment("checkout", payload!({ "step": 1 }))
///     .finalize(true);
/// ```
#[derive(Debug)]
pub struct DeclaredSource<K> {
    /// Fields merged into every event bubbling through this node.
    pub with: Option<Bound<K, Payload>>,
    /// Per-sub-key payload fragments.
    pub fragments: HashMap<String, Bound<K, Payload>>,
    /// Fragment for sub-keys without a dedicated entry.
    pub default: Option<Bound<K, Payload>>,
    /// Veto: stop bubbling here and drop the event.
    pub prevented: Option<Bound<K, bool>>,
    /// Finalize: stop bubbling here and emit now.
    pub finalize: Option<Bound<K, bool>>,
    /// Channel list override, applied only if no closer node set one.
    pub channels: Option<Bound<K, Vec<ChannelName>>>,
}

impl<K> DeclaredSource<K> {
    /// Create an empty declaration.
    pub fn new() -> Self {
        Self {
            with: None,
            fragments: HashMap::new(),
            default: None,
            prevented: None,
            finalize: None,
            channels: None,
        }
    }

    /// Merge these fields into every event.
    pub fn with(mut self, with: impl Into<Bound<K, Payload>>) -> Self {
        self.with = Some(with.into());
        self
    }

    /// Contribute a fragment for one sub-key.
    pub fn fragment(mut self, key: impl Into<String>, data: impl Into<Bound<K, Payload>>) -> Self {
        self.fragments.insert(key.into(), data.into());
        self
    }

    /// Contribute a fragment for sub-keys without a dedicated entry.
    pub fn default_fragment(mut self, data: impl Into<Bound<K, Payload>>) -> Self {
        self.default = Some(data.into());
        self
    }

    /// Veto matching events.
    pub fn prevented(mut self, flag: impl Into<Bound<K, bool>>) -> Self {
        self.prevented = Some(flag.into());
        self
    }

    /// Finalize matching events.
    pub fn finalize(mut self, flag: impl Into<Bound<K, bool>>) -> Self {
        self.finalize = Some(flag.into());
        self
    }

    /// Override the channel list.
    pub fn channels(mut self, list: impl Into<Bound<K, Vec<ChannelName>>>) -> Self {
        self.channels = Some(list.into());
        self
    }
}

/// Full-override callable source.
pub type OverrideFn<K> = Box<dyn Fn(&EventView<'_, K>) -> Resolution + Send + Sync>;

/// Context attached to a tree node: either a callable that fully determines
/// the outcome, or a structured declaration.
pub enum ContextSource<K> {
    /// Escape hatch: invoked with the event view, its result terminates
    /// resolution unconditionally.
    Override(OverrideFn<K>),
    /// Structured merge/veto/finalize declaration.
    Declared(DeclaredSource<K>),
}

impl<K> ContextSource<K> {
    /// Create a full-override source.
    pub fn override_with<F>(f: F) -> Self
    where
        F: Fn(&EventView<'_, K>) -> Resolution + Send + Sync + 'static,
    {
        Self::Override(Box::new(f))
    }
}

impl<K> From<DeclaredSource<K>> for ContextSource<K> {
    fn from(source: DeclaredSource<K>) -> Self {
        Self::Declared(source)
    }
}

impl<K> fmt::Debug for ContextSource<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Override(_) => write!(f, "Override(..)"),
            Self::Declared(source) => f.debug_tuple("Declared").field(&source.fragments.len()).finish(),
        }
    }
}
