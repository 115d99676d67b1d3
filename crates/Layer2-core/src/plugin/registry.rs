//! Plugin Registry - 플러그인 저장소
//!
//! 변경은 모두 `&mut self`를 요구하므로 "단일 writer, 다중 reader" 규칙이
//! 내부 락 없이 빌림 검사기로 보장됩니다. 동시 변경이 필요한 호스트는
//! 레지스트리 전체를 하나의 락으로 감싸면 됩니다.

use super::error::PluginError;
use super::traits::{is_valid_name, LifecycleState, Plugin};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// 등록된 플러그인 정보
pub struct PluginRecord {
    /// 플러그인 이름 (레지스트리 키)
    name: String,

    /// 플러그인 인스턴스
    instance: Arc<dyn Plugin>,

    /// 라이프사이클 상태
    state: LifecycleState,

    /// 로드 순서
    load_order: usize,

    /// 출처 모듈 (호스트가 직접 등록한 경우 None)
    module_id: Option<String>,

    /// 등록 시각
    registered_at: DateTime<Utc>,
}

impl PluginRecord {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn instance(&self) -> &Arc<dyn Plugin> {
        &self.instance
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn load_order(&self) -> usize {
        self.load_order
    }

    pub fn module_id(&self) -> Option<&str> {
        self.module_id.as_deref()
    }

    pub fn registered_at(&self) -> DateTime<Utc> {
        self.registered_at
    }
}

impl std::fmt::Debug for PluginRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginRecord")
            .field("name", &self.name)
            .field("state", &self.state)
            .field("load_order", &self.load_order)
            .field("module_id", &self.module_id)
            .field("registered_at", &self.registered_at)
            .finish()
    }
}

/// 플러그인 레지스트리 - 이름으로 유일하게 식별되는 레코드 모음
#[derive(Default)]
pub struct PluginRegistry {
    /// 플러그인 저장소 (이름 -> PluginRecord)
    plugins: HashMap<String, PluginRecord>,

    /// 로드 카운터
    load_counter: usize,
}

impl PluginRegistry {
    /// 새 레지스트리 생성
    pub fn new() -> Self {
        Self::default()
    }

    /// 플러그인 등록
    ///
    /// 같은 이름이 이미 있으면 `DuplicateName`을 반환하고 기존 레코드는 그대로 둡니다.
    pub fn register(&mut self, plugin: Arc<dyn Plugin>) -> Result<(), PluginError> {
        self.insert(plugin, None)
    }

    /// 출처 모듈과 함께 등록
    pub fn register_from(
        &mut self,
        plugin: Arc<dyn Plugin>,
        module_id: impl Into<String>,
    ) -> Result<(), PluginError> {
        self.insert(plugin, Some(module_id.into()))
    }

    fn insert(&mut self, plugin: Arc<dyn Plugin>, module_id: Option<String>) -> Result<(), PluginError> {
        let name = plugin.name().to_string();

        if !is_valid_name(&name) {
            warn!("Rejected plugin with invalid name {:?}", name);
            return Err(PluginError::InvalidName(name));
        }

        if self.plugins.contains_key(&name) {
            warn!("Plugin {} is already registered", name);
            return Err(PluginError::DuplicateName(name));
        }

        self.load_counter += 1;
        let load_order = self.load_counter;

        info!(
            "Registered plugin: {} (from {})",
            name,
            module_id.as_deref().unwrap_or("host")
        );

        self.plugins.insert(
            name.clone(),
            PluginRecord {
                name,
                instance: plugin,
                state: LifecycleState::Discovered,
                load_order,
                module_id,
                registered_at: Utc::now(),
            },
        );

        Ok(())
    }

    /// 플러그인 조회
    pub fn get(&self, name: &str) -> Option<&PluginRecord> {
        self.plugins.get(name)
    }

    /// 모든 레코드 (등록 순서)
    pub fn all(&self) -> Vec<&PluginRecord> {
        let mut records: Vec<_> = self.plugins.values().collect();
        records.sort_by_key(|record| record.load_order);
        records
    }

    /// 등록 순서대로 정렬된 이름 목록
    pub fn names(&self) -> Vec<String> {
        self.all().into_iter().map(|r| r.name.clone()).collect()
    }

    /// 플러그인 제거 (`Discovered` 또는 `Deactivated` 상태만)
    pub fn remove(&mut self, name: &str) -> Result<PluginRecord, PluginError> {
        let state = self
            .plugins
            .get(name)
            .map(|record| record.state)
            .ok_or_else(|| PluginError::NotFound(name.to_string()))?;

        if !state.is_removable() {
            return Err(PluginError::InvalidState {
                name: name.to_string(),
                state,
                action: "remove",
            });
        }

        let record = self
            .plugins
            .remove(name)
            .ok_or_else(|| PluginError::NotFound(name.to_string()))?;

        info!("Removed plugin: {}", name);
        Ok(record)
    }

    /// 플러그인 존재 여부 확인
    pub fn contains(&self, name: &str) -> bool {
        self.plugins.contains_key(name)
    }

    /// 플러그인 수
    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    /// 비어있는지 확인
    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    /// 모든 플러그인 클리어 (활성/전이 중인 레코드가 있으면 실패)
    pub fn clear(&mut self) -> Result<(), PluginError> {
        if let Some(record) = self.all().into_iter().find(|r| !r.state.is_removable()) {
            return Err(PluginError::InvalidState {
                name: record.name.clone(),
                state: record.state,
                action: "clear",
            });
        }

        self.plugins.clear();
        self.load_counter = 0;
        debug!("Registry cleared");
        Ok(())
    }

    /// 상태 전이 (허용되지 않는 전이는 거부)
    ///
    /// 이전 상태를 반환합니다.
    pub(crate) fn transition(
        &mut self,
        name: &str,
        target: LifecycleState,
    ) -> Result<LifecycleState, PluginError> {
        let record = self
            .plugins
            .get_mut(name)
            .ok_or_else(|| PluginError::NotFound(name.to_string()))?;

        let current = record.state;
        if !current.can_transition_to(target) {
            return Err(PluginError::InvalidState {
                name: name.to_string(),
                state: current,
                action: transition_action(target),
            });
        }

        record.state = target;
        debug!("Plugin {} state: {} -> {}", name, current, target);
        Ok(current)
    }
}

fn transition_action(target: LifecycleState) -> &'static str {
    match target {
        LifecycleState::Discovered => "reset",
        LifecycleState::Activating | LifecycleState::Active => "activate",
        LifecycleState::Deactivating | LifecycleState::Deactivated => "deactivate",
    }
}

impl std::fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginRegistry")
            .field("plugins", &self.all())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use plughost_foundation::Result;

    struct TestPlugin {
        name: String,
    }

    impl TestPlugin {
        fn arc(name: &str) -> Arc<dyn Plugin> {
            Arc::new(Self { name: name.into() })
        }
    }

    #[async_trait]
    impl Plugin for TestPlugin {
        fn name(&self) -> &str {
            &self.name
        }

        async fn activate(&self) -> Result<()> {
            Ok(())
        }

        async fn deactivate(&self) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_register_plugin() {
        let mut registry = PluginRegistry::new();
        registry.register(TestPlugin::arc("A")).unwrap();

        assert_eq!(registry.len(), 1);
        let record = registry.get("A").unwrap();
        assert_eq!(record.state(), LifecycleState::Discovered);
        assert_eq!(record.module_id(), None);
    }

    #[test]
    fn test_duplicate_registration() {
        let mut registry = PluginRegistry::new();
        let first = TestPlugin::arc("A");
        registry.register(Arc::clone(&first)).unwrap();

        let err = registry.register(TestPlugin::arc("A")).unwrap_err();
        assert!(matches!(err, PluginError::DuplicateName(ref n) if n == "A"));

        // 첫 번째 레코드는 그대로
        assert_eq!(registry.len(), 1);
        assert!(Arc::ptr_eq(registry.get("A").unwrap().instance(), &first));
    }

    #[test]
    fn test_uniqueness_over_many_registrations() {
        let mut registry = PluginRegistry::new();
        let names = ["A", "B", "A", "C", "B", "B", "D"];

        let rejected = names
            .iter()
            .filter(|n| registry.register(TestPlugin::arc(n)).is_err())
            .count();

        assert_eq!(rejected, 3);
        assert_eq!(registry.names(), vec!["A", "B", "C", "D"]);
    }

    #[test]
    fn test_invalid_name_rejected() {
        let mut registry = PluginRegistry::new();
        assert!(matches!(
            registry.register(TestPlugin::arc("")),
            Err(PluginError::InvalidName(_))
        ));
        assert!(matches!(
            registry.register(TestPlugin::arc("tab\tname")),
            Err(PluginError::InvalidName(_))
        ));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_insertion_order() {
        let mut registry = PluginRegistry::new();
        for name in ["zeta", "alpha", "mid"] {
            registry.register_from(TestPlugin::arc(name), "ext_mod").unwrap();
        }

        let order: Vec<_> = registry.all().iter().map(|r| r.name().to_string()).collect();
        assert_eq!(order, vec!["zeta", "alpha", "mid"]);
        assert_eq!(registry.get("mid").unwrap().module_id(), Some("ext_mod"));
        assert!(registry.get("zeta").unwrap().load_order() < registry.get("mid").unwrap().load_order());
    }

    #[test]
    fn test_transition_rules() {
        let mut registry = PluginRegistry::new();
        registry.register(TestPlugin::arc("A")).unwrap();

        let err = registry.transition("A", LifecycleState::Active).unwrap_err();
        assert!(matches!(err, PluginError::InvalidState { .. }));

        assert_eq!(
            registry.transition("A", LifecycleState::Activating).unwrap(),
            LifecycleState::Discovered
        );
        registry.transition("A", LifecycleState::Active).unwrap();
        assert_eq!(registry.get("A").unwrap().state(), LifecycleState::Active);

        assert!(matches!(
            registry.transition("ghost", LifecycleState::Activating),
            Err(PluginError::NotFound(_))
        ));
    }

    #[test]
    fn test_remove_is_state_gated() {
        let mut registry = PluginRegistry::new();
        registry.register(TestPlugin::arc("A")).unwrap();
        registry.transition("A", LifecycleState::Activating).unwrap();

        assert!(matches!(
            registry.remove("A"),
            Err(PluginError::InvalidState { action: "remove", .. })
        ));
        assert!(registry.clear().is_err());

        registry.transition("A", LifecycleState::Deactivated).unwrap();
        let record = registry.remove("A").unwrap();
        assert_eq!(record.name(), "A");
        assert!(matches!(registry.remove("A"), Err(PluginError::NotFound(_))));
    }

    #[test]
    fn test_clear_resets() {
        let mut registry = PluginRegistry::new();
        registry.register(TestPlugin::arc("A")).unwrap();
        registry.register(TestPlugin::arc("B")).unwrap();

        registry.clear().unwrap();
        assert!(registry.is_empty());

        registry.register(TestPlugin::arc("A")).unwrap();
        assert_eq!(registry.get("A").unwrap().load_order(), 1);
    }

    #[test]
    fn test_reregister_after_remove() {
        let mut registry = PluginRegistry::new();
        registry.register(TestPlugin::arc("A")).unwrap();
        registry.remove("A").unwrap();

        registry.register(TestPlugin::arc("A")).unwrap();
        assert!(registry.contains("A"));
    }
}
