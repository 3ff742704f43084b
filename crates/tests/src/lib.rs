//! # Integration Tests
//!
//! Cross-crate and end-to-end tests.
//!
//! Responsibilities:
//! - Dispatch surface contract tests
//! - Bubbling resolution over a real tree
//! - Config file to dispatcher wiring

#[cfg(test)]
mod contract_tests {
    #[test]
    fn test_contracts_compile() {
        let _ = contracts::TrackerConfig::default();
    }
}

#[cfg(test)]
mod dispatch_tests {
    use std::sync::{Arc, Mutex};

    use contracts::{
        payload, ActionMap, ActionOutcome, ChannelName, DispatchResult, Payload, TrackerError,
    };
    use dispatcher::Dispatcher;

    type CallLog = Arc<Mutex<Vec<(String, String, Payload)>>>;

    fn gio_like(calls: CallLog) -> ActionMap {
        let track_calls = Arc::clone(&calls);
        let config_calls = Arc::clone(&calls);
        let by_calls = Arc::clone(&calls);
        ActionMap::new()
            .action("track", move |key, data| {
                track_calls
                    .lock()
                    .unwrap()
                    .push(("track".into(), key.into(), data.clone()));
                Ok(ActionOutcome::Done)
            })
            .action("config", move |key, data| {
                config_calls
                    .lock()
                    .unwrap()
                    .push(("config".into(), key.into(), data.clone()));
                Ok(ActionOutcome::Done)
            })
            .action("by", move |key, data| {
                by_calls
                    .lock()
                    .unwrap()
                    .push(("by".into(), key.into(), data.clone()));
                Ok(ActionOutcome::Done)
            })
    }

    /// End-to-end: key resolution drives the channel action choice.
    #[test]
    fn test_e2e_key_resolution() {
        let calls: CallLog = Arc::new(Mutex::new(Vec::new()));
        let dispatcher = Dispatcher::builder()
            .channel("gio", gio_like(Arc::clone(&calls)))
            .build();
        let gio: Vec<ChannelName> = vec!["gio".into()];

        dispatcher.dispatch("foo", payload!({ "bar": "baz" }), Some(&gio));
        dispatcher.dispatch("config:user", payload!({ "id": 2 }), Some(&gio));

        let calls = calls.lock().unwrap();
        assert_eq!(
            calls[0],
            ("track".into(), "foo".into(), payload!({ "bar": "baz" }))
        );
        assert_eq!(
            calls[1],
            ("config".into(), "user".into(), payload!({ "id": 2 }))
        );
    }

    /// The returned contexts mirror the requested channel list exactly.
    #[test]
    fn test_context_list_shape() {
        let calls: CallLog = Arc::new(Mutex::new(Vec::new()));
        let dispatcher = Dispatcher::builder()
            .channel("gio", gio_like(calls))
            .build();

        let targets: Vec<ChannelName> = vec!["gio".into(), "nope".into()];
        let contexts = dispatcher.dispatch("foo", payload!({ "a": 1 }), Some(&targets));

        assert_eq!(contexts.len(), 2);
        assert_eq!(contexts[0].channel, "gio");
        assert_eq!(contexts[0].action, "track");
        assert_eq!(contexts[0].key, "foo");
        assert_eq!(contexts[0].data, payload!({ "a": 1 }));
        assert_eq!(contexts[0].result, DispatchResult::Done);
        assert_eq!(contexts[1].channel, "nope");
        assert_eq!(contexts[1].result, DispatchResult::Skipped);
    }

    /// A late registration replaces the channel for subsequent dispatches.
    #[test]
    fn test_late_registration_replaces() {
        let dispatcher = Dispatcher::builder()
            .channel(
                "gio",
                ActionMap::new().action("track", |_, _| Ok(ActionOutcome::Value(1.into()))),
            )
            .build();
        let gio: Vec<ChannelName> = vec!["gio".into()];

        let first = dispatcher.dispatch("foo", Payload::new(), Some(&gio));
        dispatcher.registry().register(
            "gio",
            ActionMap::new().action("track", |_, _| Ok(ActionOutcome::Value(2.into()))),
        );
        let second = dispatcher.dispatch("foo", Payload::new(), Some(&gio));

        assert_eq!(first[0].result.value().unwrap(), 1);
        assert_eq!(second[0].result.value().unwrap(), 2);
    }

    /// Failures stay isolated per channel and surface through the handler
    /// with the full originating context.
    #[tokio::test]
    async fn test_e2e_failure_isolation() {
        let failures: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&failures);
        let calls: CallLog = Arc::new(Mutex::new(Vec::new()));

        let dispatcher = Dispatcher::builder()
            .channel(
                "flaky",
                ActionMap::new().action("track", |_, _| {
                    Ok(ActionOutcome::pending(async {
                        Err(TrackerError::vendor("connection reset"))
                    }))
                }),
            )
            .channel("gio", gio_like(Arc::clone(&calls)))
            .build();
        dispatcher.config().update(move |c| {
            c.error_handler = Arc::new(move |failure| {
                sink.lock().unwrap().push(format!(
                    "{}/{}:{}",
                    failure.context.channel, failure.context.action, failure.context.key
                ));
            });
        });

        let targets: Vec<ChannelName> = vec!["flaky".into(), "gio".into()];
        let contexts = dispatcher.dispatch("checkout", payload!({ "step": 3 }), Some(&targets));

        assert_eq!(contexts[0].result, DispatchResult::Pending);
        assert_eq!(contexts[1].result, DispatchResult::Done);
        assert_eq!(calls.lock().unwrap().len(), 1);

        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        assert_eq!(*failures.lock().unwrap(), vec!["flaky/track:checkout".to_string()]);
    }

    /// Metrics reflect the dispatch traffic.
    #[test]
    fn test_metrics_snapshot() {
        let calls: CallLog = Arc::new(Mutex::new(Vec::new()));
        let dispatcher = Dispatcher::builder()
            .channel("gio", gio_like(calls))
            .build();
        let gio: Vec<ChannelName> = vec!["gio".into()];

        dispatcher.dispatch("a", Payload::new(), Some(&gio));
        dispatcher.dispatch("b", Payload::new(), Some(&gio));
        dispatcher
            .config()
            .update(|c| c.disabled = contracts::Disabled::All(true));
        dispatcher.dispatch("c", Payload::new(), Some(&gio));

        let snapshot = dispatcher.metrics();
        assert_eq!(snapshot.dispatch_count, 3);
        assert_eq!(snapshot.invoked_count, 2);
        assert_eq!(snapshot.skipped_count, 1);
    }
}

#[cfg(test)]
mod bubbling_tests {
    use std::sync::{Arc, Mutex};

    use contracts::{payload, Payload, TrackerError, VendorCall, VendorSdk};
    use dispatcher::{Dispatcher, VendorChannel};
    use resolver::{
        Binding, BindingSet, ContextChain, DeclaredSource, MapTree, Resolution, Resolver,
    };

    #[derive(Default)]
    struct RecordingSdk {
        calls: Mutex<Vec<VendorCall>>,
    }

    impl VendorSdk for RecordingSdk {
        async fn deliver(&self, call: VendorCall) -> Result<(), TrackerError> {
            self.calls.lock().unwrap().push(call);
            Ok(())
        }
    }

    fn vendor_resolver() -> (Resolver, Arc<RecordingSdk>) {
        let sdk = Arc::new(RecordingSdk::default());
        let dispatcher = Dispatcher::builder()
            .channel("gio", VendorChannel::from_shared(Arc::clone(&sdk)))
            .build();
        dispatcher
            .config()
            .update(|c| c.default_channels = vec!["gio".into()]);
        (Resolver::new(Arc::new(dispatcher)), sdk)
    }

    /// End-to-end: a three-level chain merges closest-wins and delivers the
    /// finalized event to the vendor SDK under the original sub-key.
    #[tokio::test]
    async fn test_e2e_three_level_bubbling() {
        let (resolver, sdk) = vendor_resolver();
        let bindings = BindingSet::new();
        let mut tree = MapTree::new();
        tree.insert("a", None);
        tree.insert("b", Some("a"));
        tree.insert("c", Some("b"));
        tree.declare("c", DeclaredSource::new().with(payload!({ "bar": "c" })).into());
        tree.declare(
            "b",
            DeclaredSource::new()
                .with(payload!({ "bar": "d", "baz": "e" }))
                .finalize(true)
                .into(),
        );

        let chain = ContextChain::new(&tree, &bindings, "c");
        let resolution = resolver.resolve(chain, "click", payload!({ "foo": "a" }), None);
        assert!(resolution.is_emitted());

        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        let calls = sdk.calls.lock().unwrap();
        assert_eq!(
            *calls,
            vec![VendorCall::Track {
                key: "click".to_string(),
                data: payload!({ "foo": "a", "bar": "c", "baz": "e" }),
            }]
        );
    }

    /// A binding veto suppresses delivery even though an ancestor finalizes.
    #[tokio::test]
    async fn test_e2e_binding_veto_suppresses_delivery() {
        let (resolver, sdk) = vendor_resolver();
        let bindings = BindingSet::new();
        let veto = bindings.attach(Binding::veto("leaf", Some("click".to_string())));

        let mut tree = MapTree::new();
        tree.insert("root", None);
        tree.insert("leaf", Some("root"));
        tree.declare("root", DeclaredSource::new().finalize(true).into());

        let resolution = resolver.resolve(
            ContextChain::new(&tree, &bindings, "leaf"),
            "click",
            Payload::new(),
            None,
        );
        assert!(matches!(resolution, Resolution::Prevented));

        // After detaching, the same event goes through
        bindings.detach(veto);
        let resolution = resolver.resolve(
            ContextChain::new(&tree, &bindings, "leaf"),
            "click",
            Payload::new(),
            None,
        );
        assert!(resolution.is_emitted());

        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        assert_eq!(sdk.calls.lock().unwrap().len(), 1);
    }

    /// A veto observed on one call leaves sibling subtrees untouched.
    #[tokio::test]
    async fn test_veto_is_per_call_only() {
        let (resolver, sdk) = vendor_resolver();
        let bindings = BindingSet::new();
        let mut tree = MapTree::new();
        tree.insert("root", None);
        tree.insert("left", Some("root"));
        tree.insert("right", Some("root"));
        tree.declare("left", DeclaredSource::new().prevented(true).into());
        tree.declare("root", DeclaredSource::new().finalize(true).into());

        let left = resolver.resolve(
            ContextChain::new(&tree, &bindings, "left"),
            "click",
            Payload::new(),
            None,
        );
        assert!(matches!(left, Resolution::Prevented));

        let right = resolver.resolve(
            ContextChain::new(&tree, &bindings, "right"),
            "click",
            Payload::new(),
            None,
        );
        assert!(right.is_emitted());

        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        assert_eq!(sdk.calls.lock().unwrap().len(), 1);
    }

    /// collect never touches the vendor SDK.
    #[tokio::test]
    async fn test_collect_performs_no_delivery() {
        let (resolver, sdk) = vendor_resolver();
        resolver
            .dispatcher()
            .registry()
            .register("pipe", dispatcher::PipeChannel::new());
        let bindings = BindingSet::new();
        let mut tree = MapTree::new();
        tree.declare(
            "node",
            DeclaredSource::new()
                .with(payload!({ "module": "cart" }))
                .finalize(true)
                .into(),
        );

        let collected = resolver
            .collect(
                ContextChain::new(&tree, &bindings, "node"),
                "checkout",
                payload!({ "step": 2 }),
            )
            .unwrap();

        assert_eq!(collected.kind, "track");
        assert_eq!(collected.key, "checkout");
        assert_eq!(collected.data, payload!({ "module": "cart", "step": 2 }));
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        assert!(sdk.calls.lock().unwrap().is_empty());
    }
}

#[cfg(test)]
mod config_tests {
    use std::io::Write;
    use std::sync::{Arc, Mutex};

    use config_loader::ConfigLoader;
    use contracts::{payload, ActionMap, ActionOutcome, DispatchResult, Payload};
    use dispatcher::Dispatcher;

    const TRACKER_TOML: &str = r#"
debug = false
disabled = ["gio"]
default_channels = ["gio", "stats"]
key_sep = "/"
"#;

    /// End-to-end: a config file drives dispatch behavior.
    #[test]
    fn test_e2e_config_file_to_dispatcher() {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .unwrap();
        file.write_all(TRACKER_TOML.as_bytes()).unwrap();
        let options = ConfigLoader::load_from_path(file.path()).unwrap();

        let calls: Arc<Mutex<Vec<(String, String)>>> = Arc::new(Mutex::new(Vec::new()));
        let gio_calls = Arc::clone(&calls);
        let stats_calls = Arc::clone(&calls);
        let dispatcher = Dispatcher::builder()
            .channel(
                "gio",
                ActionMap::new().action("page", move |key, _| {
                    gio_calls.lock().unwrap().push(("gio".into(), key.into()));
                    Ok(ActionOutcome::Done)
                }),
            )
            .channel(
                "stats",
                ActionMap::new().action("page", move |key, _| {
                    stats_calls.lock().unwrap().push(("stats".into(), key.into()));
                    Ok(ActionOutcome::Done)
                }),
            )
            .options(options)
            .build();

        // Custom separator in effect, defaults resolved from the file,
        // "gio" suppressed by the disabled list.
        let contexts = dispatcher.dispatch("page/home", payload!({ "ref": "nav" }), None);

        assert_eq!(contexts.len(), 2);
        assert_eq!(contexts[0].channel, "gio");
        assert_eq!(contexts[0].result, DispatchResult::Skipped);
        assert_eq!(contexts[1].channel, "stats");
        assert_eq!(contexts[1].result, DispatchResult::Done);
        assert_eq!(*calls.lock().unwrap(), vec![("stats".to_string(), "home".to_string())]);
    }

    /// Options applied at runtime affect the next dispatch.
    #[test]
    fn test_runtime_option_overlay() {
        let dispatcher = Dispatcher::builder()
            .channel(
                "gio",
                ActionMap::new().action("track", |_, _| Ok(ActionOutcome::Done)),
            )
            .build();
        dispatcher
            .config()
            .apply(ConfigLoader::load_from_str("default_channels = [\"gio\"]", config_loader::ConfigFormat::Toml).unwrap());

        let contexts = dispatcher.dispatch("foo", Payload::new(), None);
        assert_eq!(contexts.len(), 1);
        assert_eq!(contexts[0].channel, "gio");
    }
}
