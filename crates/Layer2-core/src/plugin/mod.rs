//! # Plugin System
//!
//! plughost 플러그인 발견 및 라이프사이클 시스템
//!
//! ## 개요
//!
//! 호스트는 플러그인 이름을 미리 알지 못합니다. 네임스페이스를 스캔하여
//! [`Plugin`] 계약을 구현한 타입을 찾고, 인스턴스화하고, 등록한 뒤
//! 정해진 순서로 활성화/비활성화합니다. 잘못된 확장 하나가 나머지
//! 확장의 발견이나 활성화를 막지 않습니다.
//!
//! ## 아키텍처
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      PluginManager                          │
//! │                                                             │
//! │  PackageLocator ──► CandidateLoader ──► ContractFilter      │
//! │  (namespace →        (ModuleLoader,      (Export::Plugin    │
//! │   module ids)         LoadOutcome)        → instance)       │
//! │                                               │             │
//! │                                               ▼             │
//! │  LifecycleController ◄────────────── PluginRegistry         │
//! │  (activate: 등록 순서,                (name → PluginRecord, │
//! │   deactivate: 역순)                    insertion order)     │
//! │                                                             │
//! │  EventBus ◄── 모든 단계의 성공/실패 이벤트                   │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## 예시
//!
//! ```ignore
//! let locator = StaticLocator::new().with_namespace("ext", ["logging_ext"]);
//! let catalog = ModuleCatalog::new()
//!     .with_static(Module::new("logging_ext").with_plugin::<LoggingPlugin>("LoggingPlugin"));
//!
//! let mut manager = PluginManager::new(Arc::new(locator), Arc::new(catalog));
//! let discovered = manager.discover("ext").await;
//! let activated = manager.activate_all().await?;
//! // ...
//! let deactivated = manager.deactivate_all().await?;
//! ```

mod batch;
mod error;
mod events;
mod filter;
mod lifecycle;
mod loader;
mod locator;
mod manager;
mod manifest;
mod module;
mod registry;
mod traits;

pub use batch::{BatchFailure, BatchResult};
pub use error::PluginError;
pub use events::{EventBus, EventKind, PluginEvent, PluginEventHandler};
pub use filter::{Candidate, ContractFilter};
pub use lifecycle::LifecycleController;
pub use loader::{CandidateLoader, LoadOutcome, ModuleCatalog, ModuleInit, ModuleLoader};
pub use locator::{DirectoryLocator, PackageLocator, StaticLocator};
pub use manager::{PluginManager, PluginManagerConfig, PluginSummary};
pub use manifest::{ExportEntry, ExportKind, ManifestLoader, ModuleManifest, PluginTypeTable};
pub use module::{Export, Module, ModuleId, NamespaceId};
pub use registry::{PluginRecord, PluginRegistry};
pub use traits::{default_factory, is_valid_name, LifecycleState, Plugin, PluginFactory};
