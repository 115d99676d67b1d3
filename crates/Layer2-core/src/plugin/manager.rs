//! Plugin Manager - 호스트용 플러그인 시스템 진입점
//!
//! 로더, 필터, 레지스트리, 라이프사이클 컨트롤러를 하나로 묶습니다.
//! 모든 항목별 실패는 [`BatchResult`]에 수집되고, 호출 순서 오류만
//! 즉시 `Err`로 반환됩니다.

use super::batch::BatchResult;
use super::error::PluginError;
use super::events::{EventBus, EventKind, PluginEvent};
use super::filter::ContractFilter;
use super::lifecycle::LifecycleController;
use super::loader::{CandidateLoader, ModuleLoader};
use super::locator::PackageLocator;
use super::registry::{PluginRecord, PluginRegistry};
use super::traits::{LifecycleState, Plugin};
use plughost_foundation::{HostConfig, DEFAULT_NAMESPACE};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// 플러그인 매니저 설정
#[derive(Debug, Clone)]
pub struct PluginManagerConfig {
    /// 스캔할 네임스페이스 (순서대로)
    pub namespaces: Vec<String>,

    /// `activate_all`에서 건너뛸 플러그인
    pub disabled_plugins: Vec<String>,

    /// activate/deactivate 호출당 제한 시간
    pub lifecycle_timeout: Option<Duration>,
}

impl Default for PluginManagerConfig {
    fn default() -> Self {
        Self {
            namespaces: vec![DEFAULT_NAMESPACE.to_string()],
            disabled_plugins: vec![],
            lifecycle_timeout: None,
        }
    }
}

impl PluginManagerConfig {
    /// 호스트 설정에서 생성
    pub fn from_host_config(config: &HostConfig) -> Self {
        Self {
            namespaces: config.namespaces.clone(),
            disabled_plugins: config.disabled_plugins.clone(),
            lifecycle_timeout: config.lifecycle_timeout_ms.map(Duration::from_millis),
        }
    }
}

/// 플러그인 매니저 - 전체 플러그인 시스템 관리
pub struct PluginManager {
    /// 후보 로더
    loader: CandidateLoader,

    /// 플러그인 레지스트리
    registry: PluginRegistry,

    /// 라이프사이클 컨트롤러
    lifecycle: LifecycleController,

    /// 이벤트 버스
    event_bus: EventBus,

    /// 설정
    config: PluginManagerConfig,

    /// discover/register가 한 번이라도 호출되었는지
    populated: bool,
}

impl PluginManager {
    /// 새 매니저 생성
    pub fn new(locator: Arc<dyn PackageLocator>, loader: Arc<dyn ModuleLoader>) -> Self {
        Self::with_config(locator, loader, PluginManagerConfig::default())
    }

    /// 설정으로 생성
    pub fn with_config(
        locator: Arc<dyn PackageLocator>,
        loader: Arc<dyn ModuleLoader>,
        config: PluginManagerConfig,
    ) -> Self {
        let event_bus = EventBus::new();
        let lifecycle = LifecycleController::new(event_bus.clone())
            .with_disabled(config.disabled_plugins.iter().cloned())
            .with_timeout(config.lifecycle_timeout);

        Self {
            loader: CandidateLoader::new(locator, loader),
            registry: PluginRegistry::new(),
            lifecycle,
            event_bus,
            config,
            populated: false,
        }
    }

    // ========================================================================
    // 발견/등록
    // ========================================================================

    /// 네임스페이스를 스캔하여 플러그인 등록
    ///
    /// `succeeded`는 등록된 플러그인 이름(발견 순서), `failed`는 모듈 로드 실패,
    /// 인스턴스화 실패, 이름 충돌, 네임스페이스 해석 실패입니다.
    pub async fn discover(&mut self, namespace: &str) -> BatchResult {
        self.populated = true;
        let mut result = BatchResult::new();

        info!("Discovering plugins in namespace: {}", namespace);

        let outcomes = match self.loader.discover(namespace).await {
            Ok(outcomes) => outcomes,
            Err(e) => {
                warn!("Failed to resolve namespace {}: {}", namespace, e);
                self.event_bus.publish(
                    PluginEvent::new(EventKind::ModuleLoadFailed, namespace).with_detail(e.to_string()),
                );
                result.push_failure(namespace, e);
                return result;
            }
        };

        for outcome in outcomes {
            for candidate in ContractFilter::extract(&outcome) {
                match candidate.result {
                    Ok(plugin) => self.register_candidate(plugin, &candidate.module_id, &mut result),
                    Err(e) => {
                        self.event_bus.publish(
                            PluginEvent::new(EventKind::InstantiationFailed, candidate.module_id.as_str())
                                .with_detail(e.to_string()),
                        );
                        result.push_failure(candidate.module_id, e);
                    }
                }
            }

            if let Err(e) = outcome.result {
                self.event_bus.publish(
                    PluginEvent::new(EventKind::ModuleLoadFailed, outcome.module_id.as_str())
                        .with_detail(e.to_string()),
                );
                result.push_failure(outcome.module_id, e);
            }
        }

        info!("Discovery of {} finished: {}", namespace, result);
        result
    }

    /// 여러 네임스페이스를 순서대로 스캔
    pub async fn discover_all<S: AsRef<str>>(&mut self, namespaces: &[S]) -> BatchResult {
        let mut result = BatchResult::new();
        for namespace in namespaces {
            result.merge(self.discover(namespace.as_ref()).await);
        }
        result
    }

    /// 설정된 네임스페이스 전체 스캔
    pub async fn discover_configured(&mut self) -> BatchResult {
        let namespaces = self.config.namespaces.clone();
        self.discover_all(&namespaces[..]).await
    }

    /// 호스트가 직접 만든 플러그인 등록
    pub fn register(&mut self, plugin: Arc<dyn Plugin>) -> Result<(), PluginError> {
        self.populated = true;
        let name = plugin.name().to_string();

        match self.registry.register(plugin) {
            Ok(()) => {
                self.event_bus.publish(PluginEvent::new(EventKind::Registered, name));
                Ok(())
            }
            Err(e) => {
                self.event_bus.publish(
                    PluginEvent::new(EventKind::RegistrationRejected, name).with_detail(e.to_string()),
                );
                Err(e)
            }
        }
    }

    fn register_candidate(&mut self, plugin: Arc<dyn Plugin>, module_id: &str, result: &mut BatchResult) {
        let name = plugin.name().to_string();

        match self.registry.register_from(plugin, module_id) {
            Ok(()) => {
                self.event_bus
                    .publish(PluginEvent::new(EventKind::Registered, name.as_str()).with_detail(module_id));
                result.push_success(name);
            }
            Err(e) => {
                self.event_bus.publish(
                    PluginEvent::new(EventKind::RegistrationRejected, name.as_str())
                        .with_detail(e.to_string()),
                );
                result.push_failure(name, e);
            }
        }
    }

    // ========================================================================
    // 라이프사이클
    // ========================================================================

    /// 등록 순서대로 모두 활성화
    pub async fn activate_all(&mut self) -> Result<BatchResult, PluginError> {
        self.ensure_populated()?;
        Ok(self.lifecycle.activate_all(&mut self.registry).await)
    }

    /// 등록 역순으로 모두 비활성화
    pub async fn deactivate_all(&mut self) -> Result<BatchResult, PluginError> {
        self.ensure_populated()?;
        Ok(self.lifecycle.deactivate_all(&mut self.registry).await)
    }

    /// 플러그인 하나 활성화
    pub async fn activate(&mut self, name: &str) -> Result<(), PluginError> {
        self.lifecycle.activate(&mut self.registry, name).await
    }

    /// 플러그인 하나 비활성화
    pub async fn deactivate(&mut self, name: &str) -> Result<(), PluginError> {
        self.lifecycle.deactivate(&mut self.registry, name).await
    }

    /// 플러그인 제거 (`Discovered`/`Deactivated` 상태만)
    pub fn remove(&mut self, name: &str) -> Result<(), PluginError> {
        self.registry.remove(name)?;
        self.event_bus.publish(PluginEvent::new(EventKind::Removed, name));
        Ok(())
    }

    /// 전부 비활성화 후 레지스트리 비우기
    pub async fn shutdown(&mut self) -> Result<BatchResult, PluginError> {
        if !self.populated {
            return Ok(BatchResult::new());
        }

        let result = self.lifecycle.deactivate_all(&mut self.registry).await;
        self.registry.clear()?;
        self.populated = false;

        info!("Plugin system shut down: {}", result);
        Ok(result)
    }

    fn ensure_populated(&self) -> Result<(), PluginError> {
        if self.populated {
            Ok(())
        } else {
            Err(PluginError::NotDiscovered)
        }
    }

    // ========================================================================
    // 접근자
    // ========================================================================

    pub fn get(&self, name: &str) -> Option<&PluginRecord> {
        self.registry.get(name)
    }

    /// 모든 레코드 (등록 순서)
    pub fn all(&self) -> Vec<&PluginRecord> {
        self.registry.all()
    }

    /// 플러그인 레지스트리 접근
    pub fn registry(&self) -> &PluginRegistry {
        &self.registry
    }

    /// 이벤트 버스 접근
    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    pub fn config(&self) -> &PluginManagerConfig {
        &self.config
    }

    /// 플러그인 요약 정보
    pub fn summary(&self) -> PluginSummary {
        let records = self.registry.all();
        let count = |state: LifecycleState| records.iter().filter(|r| r.state() == state).count();

        PluginSummary {
            total: records.len(),
            discovered: count(LifecycleState::Discovered),
            active: count(LifecycleState::Active),
            deactivated: count(LifecycleState::Deactivated),
        }
    }
}

/// 플러그인 시스템 요약
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PluginSummary {
    pub total: usize,
    pub discovered: usize,
    pub active: usize,
    pub deactivated: usize,
}

impl std::fmt::Display for PluginSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} plugins ({} active, {} deactivated, {} discovered)",
            self.total, self.active, self.deactivated, self.discovered
        )
    }
}
