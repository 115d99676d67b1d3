//! 플러그인 파이프라인 통합 테스트 - 발견부터 비활성화까지
//!
//! `cargo test -p plughost-core --test discovery_lifecycle_test -- --nocapture`

use async_trait::async_trait;
use parking_lot::Mutex;
use plughost_core::{
    BatchResult, EventKind, LifecycleState, Module, ModuleCatalog, Plugin, PluginError,
    PluginManager, PluginRegistry, StaticLocator,
};
use plughost_foundation::{Error, Result};
use std::sync::Arc;

type CallLog = Arc<Mutex<Vec<String>>>;

/// 호출을 기록하는 테스트 플러그인
struct Recorder {
    name: &'static str,
    fail_activate: bool,
    log: CallLog,
}

#[async_trait]
impl Plugin for Recorder {
    fn name(&self) -> &str {
        self.name
    }

    async fn activate(&self) -> Result<()> {
        self.log.lock().push(format!("activate {}", self.name));
        if self.fail_activate {
            return Err(Error::plugin("refusing to start"));
        }
        Ok(())
    }

    async fn deactivate(&self) -> Result<()> {
        self.log.lock().push(format!("deactivate {}", self.name));
        Ok(())
    }
}

fn recorder_module(id: &str, name: &'static str, fail_activate: bool, log: &CallLog) -> Module {
    let log = Arc::clone(log);
    Module::new(id)
        .with_contract()
        .with_factory(name, move || {
            Ok(Arc::new(Recorder {
                name,
                fail_activate,
                log: Arc::clone(&log),
            }) as Arc<dyn Plugin>)
        })
}

/// ext → [logging_ext, broken_ext, security_ext]
fn scenario_manager(log: &CallLog) -> PluginManager {
    let locator =
        StaticLocator::new().with_namespace("ext", ["logging_ext", "broken_ext", "security_ext"]);

    let catalog = ModuleCatalog::new()
        .with_static(recorder_module("logging_ext", "LoggingPlugin", false, log))
        .with_module("broken_ext", || Err("SyntaxError: unexpected indent".to_string()))
        .with_static(recorder_module("security_ext", "SecurityPlugin", false, log));

    PluginManager::new(Arc::new(locator), Arc::new(catalog))
}

fn states(manager: &PluginManager) -> Vec<(String, LifecycleState)> {
    manager
        .all()
        .iter()
        .map(|r| (r.name().to_string(), r.state()))
        .collect()
}

#[tokio::test]
async fn test_extension_scenario() {
    let log = CallLog::default();
    let mut manager = scenario_manager(&log);

    let discovered = manager.discover("ext").await;
    println!("Discover: {}", discovered);

    assert_eq!(discovered.succeeded, vec!["LoggingPlugin", "SecurityPlugin"]);
    assert_eq!(discovered.failed.len(), 1);
    assert_eq!(discovered.failed[0].subject, "broken_ext");
    assert!(matches!(discovered.failed[0].error, PluginError::Load { .. }));

    let activated = manager.activate_all().await.expect("activate_all failed");
    assert!(activated.is_success());
    assert_eq!(
        states(&manager),
        vec![
            ("LoggingPlugin".to_string(), LifecycleState::Active),
            ("SecurityPlugin".to_string(), LifecycleState::Active),
        ]
    );

    let deactivated = manager.deactivate_all().await.expect("deactivate_all failed");
    assert_eq!(deactivated.succeeded, vec!["SecurityPlugin", "LoggingPlugin"]);

    assert_eq!(
        *log.lock(),
        vec![
            "activate LoggingPlugin",
            "activate SecurityPlugin",
            "deactivate SecurityPlugin",
            "deactivate LoggingPlugin",
        ]
    );
}

#[tokio::test]
async fn test_isolation_two_good_one_malformed() {
    let log = CallLog::default();
    let mut manager = scenario_manager(&log);

    let result = manager.discover("ext").await;

    let load_errors = result
        .failed
        .iter()
        .filter(|f| matches!(f.error, PluginError::Load { .. }))
        .count();
    assert_eq!(load_errors, 1);
    assert!(manager.get("LoggingPlugin").is_some());
    assert!(manager.get("SecurityPlugin").is_some());
    assert_eq!(manager.registry().len(), 2);

    let kinds: Vec<_> = manager.event_bus().history().iter().map(|e| e.kind).collect();
    assert_eq!(
        kinds,
        vec![EventKind::Registered, EventKind::ModuleLoadFailed, EventKind::Registered]
    );
}

#[tokio::test]
async fn test_uniqueness_across_rediscovery() {
    let log = CallLog::default();
    let mut manager = scenario_manager(&log);

    manager.discover("ext").await;
    let first = Arc::clone(manager.get("LoggingPlugin").unwrap().instance());

    // 같은 네임스페이스를 다시 스캔하면 교체가 아니라 이름 충돌
    let again = manager.discover("ext").await;
    assert!(again.succeeded.is_empty());

    let duplicates: Vec<_> = again
        .failed
        .iter()
        .filter(|f| matches!(f.error, PluginError::DuplicateName(_)))
        .map(|f| f.subject.as_str())
        .collect();
    assert_eq!(duplicates, vec!["LoggingPlugin", "SecurityPlugin"]);

    assert_eq!(manager.registry().len(), 2);
    assert!(Arc::ptr_eq(manager.get("LoggingPlugin").unwrap().instance(), &first));
}

#[tokio::test]
async fn test_activation_order_and_reverse_teardown() {
    let log = CallLog::default();
    let locator = StaticLocator::new().with_namespace("ordered", ["a_mod", "b_mod", "c_mod"]);
    let catalog = ModuleCatalog::new()
        .with_static(recorder_module("a_mod", "A", false, &log))
        .with_static(recorder_module("b_mod", "B", false, &log))
        .with_static(recorder_module("c_mod", "C", false, &log));

    let mut manager = PluginManager::new(Arc::new(locator), Arc::new(catalog));
    manager.discover("ordered").await;

    manager.activate_all().await.unwrap();
    manager.deactivate_all().await.unwrap();

    assert_eq!(
        *log.lock(),
        vec![
            "activate A",
            "activate B",
            "activate C",
            "deactivate C",
            "deactivate B",
            "deactivate A",
        ]
    );
}

#[tokio::test]
async fn test_failure_containment_at_activation() {
    let log = CallLog::default();
    let locator = StaticLocator::new().with_namespace("ns", ["a_mod", "b_mod", "c_mod"]);
    let catalog = ModuleCatalog::new()
        .with_static(recorder_module("a_mod", "A", false, &log))
        .with_static(recorder_module("b_mod", "B", true, &log))
        .with_static(recorder_module("c_mod", "C", false, &log));

    let mut manager = PluginManager::new(Arc::new(locator), Arc::new(catalog));
    manager.discover("ns").await;

    let result: BatchResult = manager.activate_all().await.unwrap();
    assert_eq!(result.succeeded, vec!["A", "C"]);
    assert_eq!(result.failed_subjects(), vec!["B"]);

    assert_eq!(manager.get("A").unwrap().state(), LifecycleState::Active);
    assert_eq!(manager.get("B").unwrap().state(), LifecycleState::Deactivated);
    assert_eq!(manager.get("C").unwrap().state(), LifecycleState::Active);
}

#[tokio::test]
async fn test_round_trip_leaves_nothing_active() {
    let log = CallLog::default();
    let mut manager = scenario_manager(&log);
    manager.discover("ext").await;

    manager.activate_all().await.unwrap();
    manager.deactivate_all().await.unwrap();

    assert!(manager
        .all()
        .iter()
        .all(|r| r.state() == LifecycleState::Deactivated));
    assert_eq!(manager.summary().active, 0);
}

#[tokio::test]
async fn test_programmer_error_before_discovery() {
    let log = CallLog::default();
    let mut manager = scenario_manager(&log);

    let err = manager.deactivate_all().await.unwrap_err();
    assert!(err.is_programmer_error());
    assert!(log.lock().is_empty());
}

#[test]
fn test_registry_keeps_first_on_conflict() {
    let log = CallLog::default();
    let mut registry = PluginRegistry::new();

    let make = |fail| -> Arc<dyn Plugin> {
        Arc::new(Recorder {
            name: "Same",
            fail_activate: fail,
            log: Arc::clone(&log),
        })
    };

    let first = make(false);
    registry.register(Arc::clone(&first)).unwrap();
    assert!(matches!(registry.register(make(true)), Err(PluginError::DuplicateName(_))));

    assert_eq!(registry.len(), 1);
    assert!(Arc::ptr_eq(registry.get("Same").unwrap().instance(), &first));
}
