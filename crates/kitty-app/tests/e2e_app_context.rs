/// E2E Test: application context over an in-process backend
///
/// Covers:
/// 1. Settings page flow (load base config, switch system proxy, change log level)
/// 2. Rule and subscription management through the typed services
/// 3. Local stores persisted to the settings file and reloaded
/// 4. Subscription auto-update wired to the settings store
use std::sync::{Arc, Mutex};

use kitty_domain::proxy::ProxyKind;
use kitty_domain::rule::{ProxyRule, RuleAction, RuleType};
use kitty_domain::schedule::TaskStatus;
use kitty_domain::setting::{KeyValueStorage, LogLevel};
use kitty_domain::{CallArgs, CallError};
use kitty_infrastructure::{InProcessBridge, JsonFileStorage};
use kitty_lib::AppContext;
use serde_json::{json, Value};

#[derive(Default)]
struct FakeBackend {
    base_config: Value,
    rules: Vec<Value>,
    subscriptions: Vec<Value>,
    refreshed: Vec<Value>,
    log_level: String,
    sysproxy_fails: bool,
}

type Shared = Arc<Mutex<FakeBackend>>;

fn handler(
    state: &Shared,
    f: fn(&mut FakeBackend, CallArgs) -> Result<Value, CallError>,
) -> impl Fn(CallArgs) -> std::future::Ready<Result<Value, CallError>> + Send + Sync + 'static {
    let state = state.clone();
    move |args| {
        let mut backend = state.lock().unwrap();
        std::future::ready(f(&mut backend, args))
    }
}

fn bridge(state: &Shared) -> InProcessBridge {
    InProcessBridge::new()
        .with_handler(
            "query_base_config",
            handler(state, |b, _| {
                Ok(json!({"code": 0, "msg": "", "data": b.base_config.clone()}))
            }),
        )
        .with_handler(
            "update_base_config",
            handler(state, |b, args| {
                b.base_config = args["record"].clone();
                Ok(Value::Null)
            }),
        )
        .with_handler(
            "set_log_level",
            handler(state, |b, args| {
                b.log_level = args["log_level"].as_str().unwrap_or_default().to_string();
                Ok(Value::Null)
            }),
        )
        .with_handler(
            "get_log_level",
            handler(state, |b, _| Ok(json!(b.log_level))),
        )
        .with_handler(
            "set_system_proxy_only",
            handler(state, |b, _| {
                if b.sysproxy_fails {
                    Ok(json!({"code": 500, "msg": "permission denied", "data": null}))
                } else {
                    Ok(Value::Null)
                }
            }),
        )
        .with_handler(
            "get_all_proxies",
            handler(state, |_, _| {
                Ok(json!([
                    {"id": 1, "name": "hk", "proxy_type": "hysteria", "protocol": "hysteria2"},
                    {"id": 2, "name": "jp", "proxy_type": "xray", "protocol": "vless", "port": 443}
                ]))
            }),
        )
        .with_handler(
            "add_rules",
            handler(state, |b, args| {
                let mut records = args["records"].as_array().cloned().unwrap_or_default();
                for record in records.iter_mut() {
                    record["id"] = json!(b.rules.len() + 1);
                    b.rules.push(record.clone());
                }
                Ok(Value::Null)
            }),
        )
        .with_handler(
            "query_rules",
            handler(state, |b, _| Ok(Value::Array(b.rules.clone()))),
        )
        .with_handler(
            "create_subscription",
            handler(state, |b, args| {
                let record = json!({
                    "id": b.subscriptions.len() + 1,
                    "name": args["name"],
                    "url": args["url"],
                    "is_active": b.subscriptions.is_empty(),
                    "node_count": 4,
                    "created_at": "2026-01-30T12:00:00+00:00",
                    "updated_at": "2026-01-30T12:00:00+00:00"
                });
                b.subscriptions.push(record.clone());
                Ok(record)
            }),
        )
        .with_handler(
            "get_all_subscriptions",
            handler(state, |b, _| Ok(Value::Array(b.subscriptions.clone()))),
        )
        .with_handler(
            "batch_get_subscriptions",
            handler(state, |b, _| {
                Ok(Value::Array(
                    b.subscriptions
                        .iter()
                        .map(|s| json!({"id": s["id"], "url": s["url"]}))
                        .collect(),
                ))
            }),
        )
        .with_handler(
            "refresh_xray_subscription",
            handler(state, |b, args| {
                b.refreshed.push(args["record_ids"].clone());
                Ok(Value::Null)
            }),
        )
}

fn setup(dir: &std::path::Path) -> (Shared, AppContext) {
    let state: Shared = Arc::new(Mutex::new(FakeBackend {
        base_config: json!({
            "id": 1,
            "local_ip": "127.0.0.1",
            "http_port": 10086,
            "socks_port": 10087,
            "delay_test_url": "https://gstatic.com/generate_204",
            "sysproxy_flag": false,
            "auto_start": false,
            "language": "en-US",
            "allow_lan": false,
            "mode": "Rules",
            "update_interval": 3,
            "log_level": "info"
        }),
        log_level: "info".to_string(),
        ..FakeBackend::default()
    }));
    let storage = JsonFileStorage::in_dir(dir).expect("Open settings file");
    let ctx = AppContext::new(Arc::new(bridge(&state)), Arc::new(storage))
        .expect("Build application context");
    (state, ctx)
}

#[tokio::test]
async fn e2e_settings_page_flow() {
    let dir = tempfile::tempdir().unwrap();
    let (state, ctx) = setup(dir.path());
    let settings = &ctx.services.settings;

    // ============================================================
    // Step 1: Load the base config
    // ============================================================
    let config = settings.init().await.expect("Load base config");
    assert_eq!(config.language, "en-US");
    assert_eq!(config.log_level, LogLevel::Info);
    println!("✓ Base config loaded");

    // ============================================================
    // Step 2: Switch the system proxy on, then a failing switch
    // ============================================================
    assert!(settings.switch_system_proxy(true).await);
    assert!(settings.base_config().sysproxy_flag);

    state.lock().unwrap().sysproxy_fails = true;
    assert!(!settings.switch_system_proxy(true).await);
    assert!(!settings.base_config().sysproxy_flag);
    assert!(!settings.is_proxy_loading());
    println!("✓ Failed switch left the flag off");

    // ============================================================
    // Step 3: Change the log level; the config is persisted too
    // ============================================================
    settings
        .change_log_level(LogLevel::Warn)
        .await
        .expect("Change log level");
    assert_eq!(settings.get_log_level().await.unwrap(), LogLevel::Warn);
    {
        let backend = state.lock().unwrap();
        assert_eq!(backend.base_config["log_level"], json!("warn"));
        assert_eq!(backend.base_config["delay_test_url"], json!("https://gstatic.com/generate_204"));
    }
    println!("✓ Log level applied and saved");
}

#[tokio::test]
async fn e2e_rules_and_subscriptions() {
    let dir = tempfile::tempdir().unwrap();
    let (state, ctx) = setup(dir.path());

    ctx.services
        .rule_api
        .create_rule(&ProxyRule::new(RuleAction::Direct, RuleType::DomainSuffix, "cn"))
        .await
        .expect("Create rule");
    let rules = ctx.services.rule_api.get_all_rules().await.expect("Query rules");
    assert_eq!(rules.len(), 1);
    assert_eq!(rules[0].id, Some(1));
    assert_eq!(rules[0].pattern, "cn");
    assert_eq!(state.lock().unwrap().rules[0]["rule_action"], json!("direct"));
    println!("✓ Rule stored in backend shape and read back in UI shape");

    let api = &ctx.services.subscription_api;
    api.create_subscription("main", "https://sub.example.com/a")
        .await
        .expect("Create subscription");
    api.create_subscription("backup", "https://sub.example.com/b")
        .await
        .expect("Create subscription");

    let subscriptions = ctx.refresh_subscriptions().await.expect("Load subscriptions");
    assert_eq!(subscriptions.len(), 2);
    assert!(!ctx.stores.subscriptions.is_loading());
    assert_eq!(ctx.stores.subscriptions.active().map(|s| s.id), Some(1));
    println!("✓ Subscription store refreshed");

    let proxies = ctx.refresh_proxies().await.expect("Load proxies");
    assert_eq!(proxies.len(), 2);
    assert_eq!(ctx.stores.proxy.proxies_of_current_kind().len(), 1);
    println!("✓ Proxy cache refreshed");
}

#[tokio::test]
async fn e2e_local_stores_survive_restart() {
    let dir = tempfile::tempdir().unwrap();
    {
        let (_, ctx) = setup(dir.path());
        ctx.stores
            .proxy
            .set_current_proxy(ProxyKind::Xray)
            .expect("Save proxy preference");
        ctx.services
            .auto_update
            .reconfigure(6)
            .await
            .expect("Move refresh hour");
    }

    let storage = JsonFileStorage::in_dir(dir.path()).unwrap();
    assert_eq!(
        storage.load("setting").unwrap(),
        Some(json!({"autoUpdate": 6, "sysproxyFlag": false, "port": 11080}))
    );

    let (_, ctx) = setup(dir.path());
    assert_eq!(ctx.stores.proxy.current_proxy(), ProxyKind::Xray);
    assert_eq!(ctx.stores.settings.auto_update(), 6);
    assert_eq!(ctx.services.auto_update.hour().await, 6);
    println!("✓ Settings reloaded from disk");
}

#[tokio::test]
async fn e2e_auto_update_refreshes_all_subscriptions() {
    let dir = tempfile::tempdir().unwrap();
    let (state, ctx) = setup(dir.path());

    // Nothing to refresh yet: the run succeeds without a refresh call
    ctx.services.auto_update.start().await.expect("Start auto-update");
    assert!(state.lock().unwrap().refreshed.is_empty());
    assert!(ctx.services.auto_update.next_run_at().await.is_some());

    for name in ["a", "b"] {
        ctx.services
            .subscription_api
            .create_subscription(name, &format!("https://sub.example.com/{name}"))
            .await
            .unwrap();
    }

    ctx.services.auto_update.start().await.expect("Restart auto-update");
    assert_eq!(state.lock().unwrap().refreshed, vec![json!([1, 2])]);
    assert_eq!(ctx.services.auto_update.current_status(), TaskStatus::Stopped);

    ctx.shutdown().await;
    assert!(ctx.services.auto_update.next_run_at().await.is_none());
    println!("✓ Auto-update refreshed every subscription");
}
