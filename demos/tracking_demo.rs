//! Tracking Demo
//!
//! Demonstrates the full dispatch + bubbling surface against a mock vendor
//! SDK: free-form dispatch, context resolution over a component tree,
//! binding merges/vetoes, and payload collection.
//!
//! Run with: cargo run --bin tracking_demo

use std::sync::Arc;
use std::time::Duration;

use contracts::{payload, Payload, TrackerError, VendorCall, VendorSdk};
use dispatcher::{Dispatcher, VendorChannel};
use resolver::{Binding, BindingSet, ContextChain, DeclaredSource, MapTree, Resolver};

/// Vendor SDK stand-in that logs every delivered call.
struct LoggingSdk;

impl VendorSdk for LoggingSdk {
    async fn deliver(&self, call: VendorCall) -> Result<(), TrackerError> {
        // Simulate a network hop
        tokio::time::sleep(Duration::from_millis(10)).await;
        match call {
            VendorCall::Track { key, data } => {
                tracing::info!(key = %key, data = %serde_json::Value::Object(data), "vendor received event");
            }
            VendorCall::Identify { user_id } => {
                tracing::info!(user = %user_id, "vendor identified user");
            }
        }
        Ok(())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging (no Prometheus exporter for the demo)
    observability::init_with_config(observability::ObservabilityConfig {
        log_format: observability::LogFormat::Pretty,
        metrics_port: None,
        default_log_level: "debug".to_string(),
    })?;

    tracing::info!("Starting Tracking Demo");

    // ==== Stage 1: Use default config or load from file ====
    let dispatcher = if let Some(path) = std::env::args().nth(1) {
        tracing::info!(path = %path, "Loading tracker config");
        let options = config_loader::ConfigLoader::load_from_path(std::path::Path::new(&path))?;
        Dispatcher::builder().options(options)
    } else {
        Dispatcher::builder()
    };

    // ==== Stage 2: Register channels ====
    let dispatcher = Arc::new(
        dispatcher
            .channel("console", dispatcher::ConsoleChannel::new())
            .channel("pipe", dispatcher::PipeChannel::new())
            .channel("gio", VendorChannel::new(LoggingSdk))
            .build(),
    );
    dispatcher
        .config()
        .update(|c| c.default_channels = vec!["gio".into()]);
    tracing::info!(channels = ?dispatcher.registry().list_names(), "Channels registered");

    // ==== Stage 3: Free-form dispatch ====
    dispatcher.dispatch("config:user", payload!({ "id": 42 }), None);
    dispatcher.dispatch("signup", payload!({ "plan": "free" }), None);

    // ==== Stage 4: Context bubbling over a component tree ====
    // page -> section -> button; the section finalizes clicks
    let mut tree = MapTree::new();
    tree.insert("page", None);
    tree.insert("section", Some("page"));
    tree.insert("button", Some("section"));
    tree.declare(
        "button",
        DeclaredSource::new().with(payload!({ "slot": "cta" })).into(),
    );
    tree.declare(
        "section",
        DeclaredSource::new()
            .with(payload!({ "module": "pricing" }))
            .fragment("click", payload!({ "interaction": "tap" }))
            .finalize(true)
            .into(),
    );

    let bindings = BindingSet::new();
    let campaign = bindings.attach(Binding::merge(
        "button",
        Some("click".to_string()),
        payload!({ "campaign": "spring" }),
    ));

    let resolver = Resolver::new(Arc::clone(&dispatcher));
    let resolution = resolver.resolve(
        ContextChain::new(&tree, &bindings, "button"),
        "click",
        payload!({ "pos": 1 }),
        None,
    );
    tracing::info!(emitted = resolution.is_emitted(), "Click resolved");

    // ==== Stage 5: Collect the payload without delivering ====
    let collected = resolver.collect(
        ContextChain::new(&tree, &bindings, "button"),
        "click",
        Payload::new(),
    );
    tracing::info!(collected = ?collected, "Collected payload");

    // ==== Stage 6: Veto binding drops the event ====
    bindings.detach(campaign);
    bindings.attach(Binding::veto("button", Some("click".to_string())));
    let resolution = resolver.resolve(
        ContextChain::new(&tree, &bindings, "button"),
        "click",
        Payload::new(),
        None,
    );
    tracing::info!(emitted = resolution.is_emitted(), "Vetoed click resolved");

    // Let pending vendor deliveries settle before reading the counters
    tokio::time::sleep(Duration::from_millis(50)).await;
    let metrics = dispatcher.metrics();
    tracing::info!(
        dispatches = metrics.dispatch_count,
        invocations = metrics.invoked_count,
        failures = metrics.failure_count,
        "Demo complete"
    );

    Ok(())
}
