//! # Resolver
//!
//! Context bubbling resolution engine.
//!
//! Responsibilities:
//! - Walk the ancestor chain of context sources for one event
//! - Merge contributed payload fragments, closest contributor winning
//! - Honor veto / finalize decisions, fall back per configuration
//! - Hand finalized events to the dispatcher
//!
//! The chain abstraction only requires a parent accessor on the host's node
//! type ([`ContextTree`]); any tree where a node has zero or one parent works.

pub mod adapters;
pub mod bindings;
pub mod chain;
pub mod resolver;
pub mod source;

pub use adapters::MapTree;
pub use bindings::{Binding, BindingId, BindingPattern, BindingRole, BindingScope, BindingSet};
pub use chain::{ChainEntry, ChainSource, ContextChain, ContextTree};
pub use resolver::{CollectedEvent, Resolution, Resolver};
pub use source::{Bound, ContextSource, DeclaredSource, EventView};
