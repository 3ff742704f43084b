//! Channel trait - Dispatcher output interface
//!
//! A channel is a named set of actions. The dispatcher resolves an event key
//! to an action name and invokes it on every targeted channel.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;

use serde_json::Value;

use crate::{Payload, TrackerError};

/// Canonical action for keys without an explicit action prefix.
pub const ACTION_TRACK: &str = "track";

/// Action for configuration-style events (e.g. `config:user`).
pub const ACTION_CONFIG: &str = "config";

/// Action stamped on emissions produced by context resolution, so channels
/// can tell bubbled events apart from direct dispatch calls.
pub const ACTION_BY: &str = "by";

/// Name of the built-in console mirror channel.
pub const CONSOLE_CHANNEL: &str = "console";

/// Name of the built-in in-memory pipe channel.
pub const PIPE_CHANNEL: &str = "pipe";

/// A pending action outcome settling in the background.
///
/// The dispatcher never awaits these; it spawns them fire-and-forget and
/// forwards rejections to the configured error handler.
pub type PendingOutcome = Pin<Box<dyn Future<Output = Result<(), TrackerError>> + Send>>;

/// What a channel action produced.
pub enum ActionOutcome {
    /// Completed synchronously without a value.
    Done,
    /// Completed synchronously with a value.
    Value(Value),
    /// Still running; settles in the background.
    Pending(PendingOutcome),
}

impl ActionOutcome {
    /// Wrap a future as a pending outcome.
    pub fn pending<F>(future: F) -> Self
    where
        F: Future<Output = Result<(), TrackerError>> + Send + 'static,
    {
        Self::Pending(Box::pin(future))
    }
}

impl std::fmt::Debug for ActionOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Done => write!(f, "Done"),
            Self::Value(v) => f.debug_tuple("Value").field(v).finish(),
            Self::Pending(_) => write!(f, "Pending(..)"),
        }
    }
}

/// A named set of dispatch actions.
///
/// Implementations must not panic; a failing action either returns `Err`
/// (the synchronous failure path) or an [`ActionOutcome::Pending`] that
/// rejects later. Both paths reach the configured error handler with the
/// originating dispatch context attached, never the dispatching caller.
pub trait Channel: Send + Sync {
    /// Whether the channel exposes the named action.
    fn supports(&self, action: &str) -> bool;

    /// Invoke the named action with the event sub-key and payload.
    ///
    /// Callers check [`Channel::supports`] first; invoking an unsupported
    /// action is a contract violation and returns an error.
    ///
    /// # Errors
    /// Returns the synchronous failure of the action, if any.
    fn perform(&self, action: &str, key: &str, data: &Payload)
        -> Result<ActionOutcome, TrackerError>;
}

type ActionFn = Box<dyn Fn(&str, &Payload) -> Result<ActionOutcome, TrackerError> + Send + Sync>;

/// Closure-based channel: named actions registered one by one.
///
/// The building block for ad-hoc and mock channels. Re-registering an
/// action name replaces the previous closure.
///
/// # Examples
/// ```
/// use contracts::{ActionMap, ActionOutcome, Channel};
///
/// let channel = ActionMap::new().action("track", |key, _data| {
///     Ok(ActionOutcome::Value(serde_json::json!({ "echoed": key })))
/// });
/// assert!(channel.supports("track"));
/// assert!(!channel.supports("config"));
/// ```
#[derive(Default)]
pub struct ActionMap {
    actions: HashMap<String, ActionFn>,
}

impl ActionMap {
    /// Create an empty action map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an action under `name`, replacing any previous one.
    pub fn action<F>(mut self, name: impl Into<String>, action: F) -> Self
    where
        F: Fn(&str, &Payload) -> Result<ActionOutcome, TrackerError> + Send + Sync + 'static,
    {
        self.actions.insert(name.into(), Box::new(action));
        self
    }

    /// Names of all registered actions.
    pub fn action_names(&self) -> Vec<&str> {
        self.actions.keys().map(String::as_str).collect()
    }
}

impl Channel for ActionMap {
    fn supports(&self, action: &str) -> bool {
        self.actions.contains_key(action)
    }

    fn perform(
        &self,
        action: &str,
        key: &str,
        data: &Payload,
    ) -> Result<ActionOutcome, TrackerError> {
        match self.actions.get(action) {
            Some(f) => f(key, data),
            None => Err(TrackerError::action(
                "unregistered",
                action,
                "action not registered on this channel",
            )),
        }
    }
}

impl std::fmt::Debug for ActionMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionMap")
            .field("actions", &self.action_names())
            .finish()
    }
}
