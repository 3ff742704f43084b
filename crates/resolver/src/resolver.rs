//! Context resolution - merge/veto/finalize policy over one chain walk

use std::sync::Arc;

use contracts::{ChannelName, DispatchContext, Payload, ACTION_BY, PIPE_CHANNEL};
use dispatcher::Dispatcher;
use serde::{Deserialize, Serialize};
use tracing::{instrument, trace};

use crate::chain::{ChainEntry, ChainSource};
use crate::source::{ContextSource, EventView};

/// Outcome of one resolution walk.
#[derive(Debug)]
pub enum Resolution {
    /// A source finalized (or the fallback fired): the event was emitted
    /// through the dispatcher.
    Emitted(Vec<DispatchContext>),
    /// A source vetoed the event; nothing was emitted.
    Prevented,
    /// The chain ran out without a veto or finalizer and fallback emission
    /// is off; nothing was emitted.
    Unresolved,
}

impl Resolution {
    /// Dispatch contexts of the emission, if one happened.
    pub fn contexts(&self) -> Option<&[DispatchContext]> {
        match self {
            Self::Emitted(contexts) => Some(contexts),
            _ => None,
        }
    }

    /// Whether the event was emitted.
    pub fn is_emitted(&self) -> bool {
        matches!(self, Self::Emitted(_))
    }

    fn label(&self) -> &'static str {
        match self {
            Self::Emitted(_) => "emitted",
            Self::Prevented => "prevented",
            Self::Unresolved => "unresolved",
        }
    }
}

/// The `{type, key, data}` record produced by [`Resolver::collect`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectedEvent {
    /// Action the event would have dispatched under.
    #[serde(rename = "type")]
    pub kind: String,
    /// Event sub-key.
    pub key: String,
    /// Fully resolved payload.
    pub data: Payload,
}

/// Applies the context policy over a chain walk and emits through a
/// [`Dispatcher`].
#[derive(Debug, Clone)]
pub struct Resolver {
    dispatcher: Arc<Dispatcher>,
}

impl Resolver {
    /// Create a resolver emitting through `dispatcher`.
    pub fn new(dispatcher: Arc<Dispatcher>) -> Self {
        Self { dispatcher }
    }

    /// The dispatcher used for emissions.
    pub fn dispatcher(&self) -> &Arc<Dispatcher> {
        &self.dispatcher
    }

    /// Resolve one bubbling event over `chain`.
    ///
    /// Walks the chain in order. Declared sources contribute payload
    /// fragments (`with` first, then the sub-key fragment, with the incoming
    /// fields winning over both), may veto, may pin the channel list (the
    /// closest node that sets one wins), and may finalize. An override
    /// source terminates the walk with its own result. When the chain is
    /// exhausted the event is emitted anyway if `fallback_emit` is
    /// configured, otherwise nothing happens.
    ///
    /// An empty chain - resolution invoked outside any node context - is not
    /// an error; it resolves like an exhausted one.
    #[instrument(name = "resolve", skip(self, chain, data, channels))]
    pub fn resolve<'a, K, I>(
        &self,
        chain: I,
        key: &str,
        data: Payload,
        channels: Option<Vec<ChannelName>>,
    ) -> Resolution
    where
        K: Clone + PartialEq + 'a,
        I: IntoIterator<Item = ChainEntry<'a, K>>,
    {
        let mut data = data;
        let mut channels = channels;

        for entry in chain {
            let receiver = entry.receiver;
            match entry.source {
                ChainSource::Declared(ContextSource::Override(action)) => {
                    let view = EventView {
                        receiver: receiver.as_ref(),
                        key,
                        data: &data,
                        channels: channels.as_deref(),
                    };
                    let resolution = action(&view);
                    observability::record_resolution(resolution.label());
                    return resolution;
                }
                ChainSource::Declared(ContextSource::Declared(source)) => {
                    // Contributions are evaluated against the incoming data
                    let view = EventView {
                        receiver: receiver.as_ref(),
                        key,
                        data: &data,
                        channels: channels.as_deref(),
                    };
                    let with = source
                        .with
                        .as_ref()
                        .map(|bound| bound.eval(&view))
                        .unwrap_or_default();
                    let fragment = source
                        .fragments
                        .get(key)
                        .or(source.default.as_ref())
                        .map(|bound| bound.eval(&view))
                        .unwrap_or_default();
                    data = merge(with, fragment, data);

                    // Flags see the merged data
                    let view = EventView {
                        receiver: receiver.as_ref(),
                        key,
                        data: &data,
                        channels: channels.as_deref(),
                    };
                    if source
                        .prevented
                        .as_ref()
                        .is_some_and(|bound| bound.eval(&view))
                    {
                        trace!(key, "resolution vetoed by declared source");
                        observability::record_resolution("prevented");
                        return Resolution::Prevented;
                    }
                    if channels.is_none() {
                        channels = source.channels.as_ref().map(|bound| bound.eval(&view));
                    }
                    let view = EventView {
                        receiver: receiver.as_ref(),
                        key,
                        data: &data,
                        channels: channels.as_deref(),
                    };
                    if source
                        .finalize
                        .as_ref()
                        .is_some_and(|bound| bound.eval(&view))
                    {
                        observability::record_resolution("emitted");
                        return Resolution::Emitted(self.finalize(
                            key,
                            data,
                            channels.as_deref(),
                        ));
                    }
                }
                ChainSource::Bindings(scope) => {
                    if scope.prevented(key) {
                        trace!(key, "resolution vetoed by binding");
                        observability::record_resolution("prevented");
                        return Resolution::Prevented;
                    }
                    data = scope.merge_defaults(key, data);
                }
            }
        }

        if self.dispatcher.config().snapshot().fallback_emit {
            observability::record_resolution("emitted");
            return Resolution::Emitted(self.finalize(key, data, channels.as_deref()));
        }
        observability::record_resolution("unresolved");
        Resolution::Unresolved
    }

    /// Standardized emission for resolved events.
    ///
    /// Routes through the dispatcher under the fixed `by` action, so
    /// channels can tell bubbled events apart from direct dispatch calls.
    pub fn finalize(
        &self,
        key: &str,
        data: Payload,
        channels: Option<&[ChannelName]>,
    ) -> Vec<DispatchContext> {
        self.dispatcher.dispatch_action(ACTION_BY, key, data, channels)
    }

    /// Resolve and hand back the payload instead of delivering it.
    ///
    /// Forces the channel list to the in-memory pipe channel and extracts
    /// the first result. `None` when the event was vetoed, or when no source
    /// finalized and fallback emission is off.
    pub fn collect<'a, K, I>(&self, chain: I, key: &str, data: Payload) -> Option<CollectedEvent>
    where
        K: Clone + PartialEq + 'a,
        I: IntoIterator<Item = ChainEntry<'a, K>>,
    {
        match self.resolve(chain, key, data, Some(vec![PIPE_CHANNEL.into()])) {
            Resolution::Emitted(contexts) => contexts
                .first()
                .and_then(|context| context.result.value())
                .and_then(|value| serde_json::from_value(value.clone()).ok()),
            _ => None,
        }
    }
}

fn merge(with: Payload, fragment: Payload, incoming: Payload) -> Payload {
    let mut merged = with;
    for (field, value) in fragment {
        merged.insert(field, value);
    }
    for (field, value) in incoming {
        merged.insert(field, value);
    }
    merged
}
