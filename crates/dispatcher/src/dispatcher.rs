//! Dispatcher - fan-out of one event to its targeted channels

use std::sync::Arc;

use contracts::{
    ActionOutcome, ChannelName, DispatchContext, DispatchResult, Payload, SharedConfig,
    TrackerConfig, TrackerOptions, ACTION_TRACK, CONSOLE_CHANNEL,
};
use tracing::{instrument, warn};

use crate::metrics::{DispatchMetrics, MetricsSnapshot};
use crate::registry::ChannelRegistry;
use crate::settle::settle;

/// Split an event key into (action, sub-key) on the first occurrence of
/// `sep`. A key without the separator, or with the separator at position 0,
/// carries the canonical `track` action.
pub fn split_event_key<'a>(event_key: &'a str, sep: &str) -> (&'a str, &'a str) {
    match event_key.find(sep) {
        Some(idx) if idx > 0 => (&event_key[..idx], &event_key[idx + sep.len()..]),
        Some(idx) => (ACTION_TRACK, &event_key[idx + sep.len()..]),
        None => (ACTION_TRACK, event_key),
    }
}

/// Builder for creating a Dispatcher
#[derive(Default)]
pub struct DispatcherBuilder {
    registry: ChannelRegistry,
    config: TrackerConfig,
}

impl DispatcherBuilder {
    /// Create a builder with an empty registry and default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from the built-in `console` and `pipe` channels.
    pub fn with_builtins() -> Self {
        Self {
            registry: ChannelRegistry::with_builtins(),
            config: TrackerConfig::default(),
        }
    }

    /// Register a channel.
    pub fn channel<C: contracts::Channel + 'static>(
        self,
        name: impl Into<ChannelName>,
        channel: C,
    ) -> Self {
        self.registry.register(name, channel);
        self
    }

    /// Replace the configuration.
    pub fn config(mut self, config: TrackerConfig) -> Self {
        self.config = config;
        self
    }

    /// Overlay partial options onto the configuration.
    pub fn options(mut self, options: TrackerOptions) -> Self {
        self.config.apply(options);
        self
    }

    /// Build the dispatcher.
    pub fn build(self) -> Dispatcher {
        Dispatcher {
            registry: Arc::new(self.registry),
            config: SharedConfig::new(self.config),
            metrics: Arc::new(DispatchMetrics::new()),
        }
    }
}

/// The main Dispatcher that fans an event out to channels.
///
/// Cheap to share (`Arc` internals); the configuration is re-read on every
/// dispatch, so host mutations apply to the next event.
#[derive(Debug)]
pub struct Dispatcher {
    registry: Arc<ChannelRegistry>,
    config: SharedConfig,
    metrics: Arc<DispatchMetrics>,
}

impl Dispatcher {
    /// Create a dispatcher over an existing registry and configuration.
    pub fn new(registry: Arc<ChannelRegistry>, config: SharedConfig) -> Self {
        Self {
            registry,
            config,
            metrics: Arc::new(DispatchMetrics::new()),
        }
    }

    /// Start building a dispatcher.
    pub fn builder() -> DispatcherBuilder {
        DispatcherBuilder::new()
    }

    /// The channel registry, for late registration.
    pub fn registry(&self) -> &Arc<ChannelRegistry> {
        &self.registry
    }

    /// The shared configuration handle.
    pub fn config(&self) -> &SharedConfig {
        &self.config
    }

    /// Snapshot of the dispatch counters.
    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Dispatch an event to its channels.
    ///
    /// Splits `event_key` on the configured separator, resolves the target
    /// list (`channels`, or the configured defaults) and invokes the matching
    /// action on each channel in order. Returns one [`DispatchContext`] per
    /// targeted channel, in target order, regardless of per-channel success,
    /// failure or absence. Never fails the caller: action failures travel to
    /// the configured error handler.
    #[instrument(name = "dispatch", skip(self, data, channels))]
    pub fn dispatch(
        &self,
        event_key: &str,
        data: Payload,
        channels: Option<&[ChannelName]>,
    ) -> Vec<DispatchContext> {
        let config = self.config.snapshot();
        let (action, key) = split_event_key(event_key, &config.key_sep);
        self.run(action, key, data, channels, &config)
    }

    /// Dispatch with an already-resolved action name.
    ///
    /// Used by context resolution for its standardized emissions, which must
    /// not depend on the configured key separator.
    pub fn dispatch_action(
        &self,
        action: &str,
        key: &str,
        data: Payload,
        channels: Option<&[ChannelName]>,
    ) -> Vec<DispatchContext> {
        let config = self.config.snapshot();
        self.run(action, key, data, channels, &config)
    }

    fn run(
        &self,
        action: &str,
        key: &str,
        data: Payload,
        channels: Option<&[ChannelName]>,
        config: &TrackerConfig,
    ) -> Vec<DispatchContext> {
        let resolved: Vec<ChannelName> = match channels {
            Some(list) => list.to_vec(),
            None => config.default_channels.clone(),
        };

        // Debug mode mirrors every event to the console channel, but on a
        // shadow entry that is dispatched to and then dropped, so debugging
        // never changes the caller-visible result shape.
        let mut shadow: Vec<ChannelName> = Vec::new();
        if config.debug {
            if resolved.is_empty() {
                warn!("no channel specified");
            }
            if !resolved.iter().any(|name| name == CONSOLE_CHANNEL) {
                shadow.push(CONSOLE_CHANNEL.into());
            }
        }

        self.metrics.inc_dispatch_count();
        observability::record_event_dispatched(action, resolved.len());

        let shadow_len = shadow.len();
        let mut contexts: Vec<DispatchContext> = shadow
            .into_iter()
            .chain(resolved)
            .map(|name| self.dispatch_one(action, key, &data, name, config))
            .collect();
        contexts.drain(..shadow_len);
        contexts
    }

    fn dispatch_one(
        &self,
        action: &str,
        key: &str,
        data: &Payload,
        name: ChannelName,
        config: &TrackerConfig,
    ) -> DispatchContext {
        let mut context = DispatchContext::new(action, key, data.clone(), name.clone());

        let target = self.registry.lookup(&name).filter(|c| c.supports(action));
        let Some(channel) = target else {
            if config.debug {
                warn!(channel = %name, action, "unknown action for channel");
            }
            return context;
        };

        if config.disabled.is_disabled(&name) {
            self.metrics.inc_skipped_count();
            return context;
        }

        self.metrics.inc_invoked_count();
        match channel.perform(action, key, data) {
            Ok(ActionOutcome::Done) => context.result = DispatchResult::Done,
            Ok(ActionOutcome::Value(value)) => context.result = DispatchResult::Value(value),
            Ok(ActionOutcome::Pending(outcome)) => {
                context.result = DispatchResult::Pending;
                settle(
                    outcome,
                    context.clone(),
                    config.error_handler.clone(),
                    Arc::clone(&self.metrics),
                );
            }
            Err(error) => {
                // Uniform failure path: a synchronous failure settles exactly
                // like an already-rejected pending outcome.
                context.result = DispatchResult::Pending;
                settle(
                    Box::pin(std::future::ready(Err(error))),
                    context.clone(),
                    config.error_handler.clone(),
                    Arc::clone(&self.metrics),
                );
            }
        }
        context
    }
}
