//! ChannelRegistry - named channel lookup
//!
//! Mapping from channel name to channel implementation. Registering an
//! existing name replaces the previous entry in place (test/mocking use
//! case); names stay unique and keep their original registration position.

use std::sync::{Arc, RwLock};

use contracts::{Channel, ChannelName, CONSOLE_CHANNEL, PIPE_CHANNEL};
use tracing::debug;

use crate::channels::{ConsoleChannel, PipeChannel};

type Entry = (ChannelName, Arc<dyn Channel>);

/// Registry of dispatch channels.
#[derive(Default)]
pub struct ChannelRegistry {
    entries: RwLock<Vec<Entry>>,
}

impl ChannelRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the built-in `console` and `pipe` channels.
    pub fn with_builtins() -> Self {
        let registry = Self::new();
        registry.register(CONSOLE_CHANNEL, ConsoleChannel::new());
        registry.register(PIPE_CHANNEL, PipeChannel::new());
        registry
    }

    /// Register a channel, replacing any previous entry under the same name.
    pub fn register<C: Channel + 'static>(&self, name: impl Into<ChannelName>, channel: C) {
        self.register_shared(name, Arc::new(channel));
    }

    /// Register an already-shared channel.
    pub fn register_shared(&self, name: impl Into<ChannelName>, channel: Arc<dyn Channel>) {
        let name = name.into();
        let mut entries = self
            .entries
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        match entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => {
                debug!(channel = %name, "channel replaced");
                entry.1 = channel;
            }
            None => {
                debug!(channel = %name, "channel registered");
                entries.push((name, channel));
            }
        }
    }

    /// Look up a channel by name.
    pub fn lookup(&self, name: &str) -> Option<Arc<dyn Channel>> {
        let entries = self
            .entries
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, c)| Arc::clone(c))
    }

    /// All registered names in registration order (diagnostics only).
    pub fn list_names(&self) -> Vec<ChannelName> {
        let entries = self
            .entries
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        entries.iter().map(|(n, _)| n.clone()).collect()
    }
}

impl std::fmt::Debug for ChannelRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChannelRegistry")
            .field("channels", &self.list_names())
            .finish()
    }
}
