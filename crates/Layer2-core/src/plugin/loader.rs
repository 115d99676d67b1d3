//! Candidate Loader - 네임스페이스의 모듈을 하나씩 로드
//!
//! 한 모듈의 로드 실패는 해당 [`LoadOutcome`]에만 기록되고
//! 나머지 모듈의 스캔은 계속됩니다.

use super::error::{panic_message, PluginError};
use super::locator::PackageLocator;
use super::module::{Module, ModuleId};
use async_trait::async_trait;
use futures::FutureExt;
use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{debug, info, warn};

// ============================================================================
// ModuleLoader - 모듈 ID → 모듈 객체
// ============================================================================

/// 모듈 하나를 격리된 상태로 로드
#[async_trait]
pub trait ModuleLoader: Send + Sync {
    /// 모듈 로드 (모듈 초기화 코드는 호출당 정확히 한 번 실행)
    async fn load(&self, namespace: &str, module_id: &str) -> Result<Module, PluginError>;
}

/// 모듈 초기화 함수
pub type ModuleInit = Arc<dyn Fn() -> Result<Module, String> + Send + Sync>;

/// 컴파일타임 모듈 테이블
#[derive(Clone, Default)]
pub struct ModuleCatalog {
    modules: HashMap<ModuleId, ModuleInit>,
}

impl ModuleCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// 모듈 초기화 함수 등록
    pub fn with_module<F>(mut self, id: impl Into<ModuleId>, init: F) -> Self
    where
        F: Fn() -> Result<Module, String> + Send + Sync + 'static,
    {
        self.modules.insert(id.into(), Arc::new(init));
        self
    }

    /// 완성된 모듈 등록 (로드마다 복제)
    pub fn with_static(self, module: Module) -> Self {
        let id = module.id.clone();
        self.with_module(id, move || Ok(module.clone()))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.modules.contains_key(id)
    }
}

#[async_trait]
impl ModuleLoader for ModuleCatalog {
    async fn load(&self, _namespace: &str, module_id: &str) -> Result<Module, PluginError> {
        let init = self
            .modules
            .get(module_id)
            .ok_or_else(|| PluginError::load(module_id, "module not found"))?;

        match catch_unwind(AssertUnwindSafe(|| init())) {
            Ok(Ok(mut module)) => {
                module.id = module_id.to_string();
                Ok(module)
            }
            Ok(Err(message)) => Err(PluginError::load(module_id, message)),
            Err(payload) => Err(PluginError::load(module_id, panic_message(payload.as_ref()))),
        }
    }
}

// ============================================================================
// LoadOutcome - 모듈별 로드 결과
// ============================================================================

/// 모듈 하나의 로드 결과 (ContractFilter가 즉시 소비)
#[derive(Debug)]
pub struct LoadOutcome {
    /// 모듈 ID
    pub module_id: ModuleId,

    /// 로드된 모듈 또는 LoadError
    pub result: Result<Module, PluginError>,
}

impl LoadOutcome {
    pub fn module(&self) -> Option<&Module> {
        self.result.as_ref().ok()
    }

    pub fn error(&self) -> Option<&PluginError> {
        self.result.as_ref().err()
    }

    pub fn is_loaded(&self) -> bool {
        self.result.is_ok()
    }
}

// ============================================================================
// CandidateLoader
// ============================================================================

/// 네임스페이스 스캐너
pub struct CandidateLoader {
    /// 네임스페이스 해석기
    locator: Arc<dyn PackageLocator>,

    /// 모듈 로더
    loader: Arc<dyn ModuleLoader>,
}

impl CandidateLoader {
    pub fn new(locator: Arc<dyn PackageLocator>, loader: Arc<dyn ModuleLoader>) -> Self {
        Self { locator, loader }
    }

    /// 네임스페이스의 모든 멤버 모듈 로드
    ///
    /// 모듈 ID마다 정확히 하나의 [`LoadOutcome`]을 로케이터 순서대로 반환합니다.
    /// `Err`는 네임스페이스 자체를 해석하지 못한 경우뿐입니다.
    pub async fn discover(&self, namespace: &str) -> Result<Vec<LoadOutcome>, PluginError> {
        let module_ids = self.locator.enumerate(namespace).await?;
        debug!(
            "Namespace {} resolved to {} modules: {:?}",
            namespace,
            module_ids.len(),
            module_ids
        );

        let mut outcomes = Vec::with_capacity(module_ids.len());

        for module_id in module_ids {
            // 호스트 로더의 패닉도 해당 모듈의 LoadError로 격리
            let result = match AssertUnwindSafe(self.loader.load(namespace, &module_id))
                .catch_unwind()
                .await
            {
                Ok(result) => result,
                Err(payload) => Err(PluginError::load(&module_id, panic_message(payload.as_ref()))),
            };

            match &result {
                Ok(module) => debug!(
                    "Loaded module {} ({} exports)",
                    module_id,
                    module.exports.len()
                ),
                Err(e) => warn!("Skipping module {}: {}", module_id, e),
            }

            outcomes.push(LoadOutcome { module_id, result });
        }

        let loaded = outcomes.iter().filter(|o| o.is_loaded()).count();
        info!(
            "Scanned namespace {}: {}/{} modules loaded",
            namespace,
            loaded,
            outcomes.len()
        );

        Ok(outcomes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugin::locator::StaticLocator;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn loader_for(locator: StaticLocator, catalog: ModuleCatalog) -> CandidateLoader {
        CandidateLoader::new(Arc::new(locator), Arc::new(catalog))
    }

    #[tokio::test]
    async fn test_failure_isolated_per_module() {
        let locator =
            StaticLocator::new().with_namespace("ext", ["logging_ext", "broken_ext", "security_ext"]);
        let catalog = ModuleCatalog::new()
            .with_static(Module::new("logging_ext"))
            .with_module("broken_ext", || Err("definition error".to_string()))
            .with_static(Module::new("security_ext"));

        let outcomes = loader_for(locator, catalog).discover("ext").await.unwrap();

        let ids: Vec<_> = outcomes.iter().map(|o| o.module_id.as_str()).collect();
        assert_eq!(ids, vec!["logging_ext", "broken_ext", "security_ext"]);
        assert!(outcomes[0].is_loaded());
        assert!(matches!(outcomes[1].error(), Some(PluginError::Load { .. })));
        assert!(outcomes[1].module().is_none());
        assert!(outcomes[2].is_loaded());
    }

    #[tokio::test]
    async fn test_missing_module_and_panic() {
        let locator = StaticLocator::new().with_namespace("ext", ["ghost", "explodes", "ok"]);
        let catalog = ModuleCatalog::new()
            .with_module("explodes", || panic!("init blew up"))
            .with_static(Module::new("ok"));

        let outcomes = loader_for(locator, catalog).discover("ext").await.unwrap();

        assert_eq!(outcomes.len(), 3);
        assert!(outcomes[0].error().unwrap().to_string().contains("module not found"));
        assert!(outcomes[1].error().unwrap().to_string().contains("init blew up"));
        assert!(outcomes[2].is_loaded());
    }

    /// 특정 모듈에서 패닉하는 호스트 로더
    struct PanickingLoader {
        inner: ModuleCatalog,
        panic_on: &'static str,
    }

    #[async_trait]
    impl ModuleLoader for PanickingLoader {
        async fn load(&self, namespace: &str, module_id: &str) -> Result<Module, PluginError> {
            if module_id == self.panic_on {
                panic!("loader crashed on {}", module_id);
            }
            self.inner.load(namespace, module_id).await
        }
    }

    #[tokio::test]
    async fn test_loader_panic_isolated() {
        let locator =
            StaticLocator::new().with_namespace("ext", ["logging_ext", "broken_ext", "security_ext"]);
        let loader = PanickingLoader {
            inner: ModuleCatalog::new()
                .with_static(Module::new("logging_ext"))
                .with_static(Module::new("security_ext")),
            panic_on: "broken_ext",
        };

        let outcomes = CandidateLoader::new(Arc::new(locator), Arc::new(loader))
            .discover("ext")
            .await
            .unwrap();

        assert_eq!(outcomes.len(), 3);
        assert!(outcomes[0].is_loaded());
        match outcomes[1].error() {
            Some(PluginError::Load { module_id, message }) => {
                assert_eq!(module_id, "broken_ext");
                assert!(message.contains("loader crashed on broken_ext"));
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert!(outcomes[2].is_loaded());
    }

    #[tokio::test]
    async fn test_init_runs_once_per_load() {
        let counter = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&counter);

        let locator = StaticLocator::new().with_namespace("ext", ["counted"]);
        let catalog = ModuleCatalog::new().with_module("counted", move || {
            seen.fetch_add(1, Ordering::SeqCst);
            Ok(Module::new("counted"))
        });

        loader_for(locator, catalog).discover("ext").await.unwrap();
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_unknown_namespace_is_error() {
        let result = loader_for(StaticLocator::new(), ModuleCatalog::new())
            .discover("missing")
            .await;
        assert!(matches!(result, Err(PluginError::Locator { .. })));
    }

    #[tokio::test]
    async fn test_empty_namespace() {
        let locator = StaticLocator::new().with_namespace("empty", Vec::<String>::new());
        let outcomes = loader_for(locator, ModuleCatalog::new())
            .discover("empty")
            .await
            .unwrap();
        assert!(outcomes.is_empty());
    }
}
