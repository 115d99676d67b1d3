//! plughost-core: Core Runtime for plughost
//!
//! Layer2 - 플러그인 발견, 등록, 라이프사이클 레이어
//!
//! # 주요 모듈
//!
//! - `plugin`: Plugin 계약, 로케이터/로더, 레지스트리, 라이프사이클 컨트롤러
//!
//! # 사용 예시
//!
//! ```ignore
//! use plughost_core::{DirectoryLocator, ManifestLoader, PluginManager, PluginTypeTable};
//!
//! let locator = DirectoryLocator::new("/opt/host/plugins", "json");
//! let types = PluginTypeTable::new().with_type::<LoggingPlugin>("logging");
//! let loader = ManifestLoader::for_locator(&locator, types);
//!
//! let mut plugins = PluginManager::new(Arc::new(locator), Arc::new(loader));
//! let discovered = plugins.discover("extensions").await;
//! for failure in &discovered.failed {
//!     eprintln!("{}: {}", failure.subject, failure.error);
//! }
//! plugins.activate_all().await?;
//! ```

pub mod plugin;

// Re-exports: Plugin
pub use plugin::{
    // Results
    BatchFailure,
    BatchResult,
    // Loader
    CandidateLoader,
    ContractFilter,
    // Locator
    DirectoryLocator,
    // Events
    EventBus,
    EventKind,
    Export,
    LifecycleController,
    LifecycleState,
    LoadOutcome,
    ManifestLoader,
    ModuleManifest,
    Module,
    ModuleCatalog,
    ModuleLoader,
    PackageLocator,
    // Traits
    Plugin,
    PluginError,
    PluginEvent,
    PluginEventHandler,
    // Manager
    PluginManager,
    PluginManagerConfig,
    PluginRecord,
    // Registry
    PluginRegistry,
    PluginSummary,
    PluginTypeTable,
    StaticLocator,
};

// Layer1 re-exports
pub use plughost_foundation::{Error, Result};

/// Layer2 버전
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_plugin_exports() {
        let registry = PluginRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(LifecycleState::Discovered.to_string(), "discovered");
    }
}
