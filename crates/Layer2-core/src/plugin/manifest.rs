//! Module Manifest - 디스크 모듈 정의
//!
//! 디렉토리 기반 네임스페이스에서 모듈 하나는 JSON(주석 허용) 매니페스트 파일입니다.
//!
//! ```json
//! {
//!   // 이 모듈이 로드되기 위해 필요한 플러그인 타입
//!   "requires": ["logging"],
//!   "exports": [
//!     { "symbol": "Plugin", "kind": "contract" },
//!     { "symbol": "LoggingPlugin", "kind": "plugin", "type": "logging" },
//!     { "symbol": "format_line", "kind": "item" }
//!   ]
//! }
//! ```
//!
//! `plugin` export의 `type`은 [`PluginTypeTable`]에 컴파일된 팩토리 이름입니다.

use super::error::PluginError;
use super::loader::ModuleLoader;
use super::locator::DirectoryLocator;
use super::module::{Export, Module};
use super::traits::{default_factory, Plugin, PluginFactory};
use async_trait::async_trait;
use plughost_foundation::strip_json_comments;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::fs;
use tracing::debug;

// ============================================================================
// ModuleManifest - 매니페스트 파일 구조
// ============================================================================

/// export 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportKind {
    Plugin,
    Abstract,
    Contract,
    Item,
}

/// 매니페스트의 export 항목
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportEntry {
    /// 심볼 이름
    pub symbol: String,

    /// 종류
    pub kind: ExportKind,

    /// 플러그인 타입 이름 (없으면 심볼 이름 사용)
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
}

/// 모듈 매니페스트
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleManifest {
    /// 설명
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// 필요한 플러그인 타입
    #[serde(default)]
    pub requires: Vec<String>,

    /// export 목록 (선언 순서 유지)
    #[serde(default)]
    pub exports: Vec<ExportEntry>,
}

impl ModuleManifest {
    /// JSON 파싱 (`//`, `/* */` 주석 허용)
    pub fn parse(content: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(&strip_json_comments(content))
    }

    /// 타입 테이블로 export를 해석해 모듈 생성
    ///
    /// 충족되지 않은 `requires`나 알 수 없는 플러그인 타입은 정의 오류입니다.
    pub fn into_module(self, id: &str, types: &PluginTypeTable) -> Result<Module, String> {
        if let Some(missing) = self.requires.iter().find(|r| !types.contains(r)) {
            return Err(format!("missing dependency: {}", missing));
        }

        let mut module = Module::new(id);

        for entry in self.exports {
            let export = match entry.kind {
                ExportKind::Plugin => {
                    let type_name = entry.type_name.as_deref().unwrap_or(&entry.symbol);
                    let factory = types
                        .get(type_name)
                        .ok_or_else(|| format!("unknown plugin type: {}", type_name))?;
                    Export::Plugin {
                        symbol: entry.symbol,
                        factory,
                    }
                }
                ExportKind::Abstract => Export::Abstract {
                    symbol: entry.symbol,
                },
                ExportKind::Contract => Export::Contract,
                ExportKind::Item => Export::Item {
                    symbol: entry.symbol,
                },
            };
            module.exports.push(export);
        }

        Ok(module)
    }
}

// ============================================================================
// PluginTypeTable - 컴파일된 플러그인 타입
// ============================================================================

/// 타입 이름 → 팩토리
#[derive(Clone, Default)]
pub struct PluginTypeTable {
    types: HashMap<String, PluginFactory>,
}

impl PluginTypeTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// `Default` 구현 타입 등록
    pub fn with_type<T>(mut self, name: impl Into<String>) -> Self
    where
        T: Plugin + Default + 'static,
    {
        self.types.insert(name.into(), default_factory::<T>());
        self
    }

    /// 팩토리 등록
    pub fn with_factory<F>(mut self, name: impl Into<String>, factory: F) -> Self
    where
        F: Fn() -> Result<Arc<dyn Plugin>, String> + Send + Sync + 'static,
    {
        self.types.insert(name.into(), Arc::new(factory));
        self
    }

    pub fn get(&self, name: &str) -> Option<PluginFactory> {
        self.types.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    /// 등록된 타입 이름 (정렬됨)
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.types.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl std::fmt::Debug for PluginTypeTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginTypeTable")
            .field("types", &self.names())
            .finish()
    }
}

// ============================================================================
// ManifestLoader - 파일 시스템 모듈 로더
// ============================================================================

/// 매니페스트 파일 로더
///
/// [`DirectoryLocator`]와 같은 경로 규칙(`<root>/<namespace>/<id>.<ext>`)을 사용합니다.
#[derive(Debug, Clone)]
pub struct ManifestLoader {
    layout: DirectoryLocator,
    types: PluginTypeTable,
}

impl ManifestLoader {
    pub fn new(root: impl Into<PathBuf>, extension: impl Into<String>, types: PluginTypeTable) -> Self {
        Self {
            layout: DirectoryLocator::new(root, extension),
            types,
        }
    }

    /// 로케이터와 경로 규칙 공유
    pub fn for_locator(locator: &DirectoryLocator, types: PluginTypeTable) -> Self {
        Self {
            layout: locator.clone(),
            types,
        }
    }

    pub fn types(&self) -> &PluginTypeTable {
        &self.types
    }
}

#[async_trait]
impl ModuleLoader for ManifestLoader {
    async fn load(&self, namespace: &str, module_id: &str) -> Result<Module, PluginError> {
        let path = self.layout.module_path(namespace, module_id);

        let content = fs::read_to_string(&path)
            .await
            .map_err(|e| PluginError::load(module_id, format!("{}: {}", path.display(), e)))?;

        let manifest = ModuleManifest::parse(&content)
            .map_err(|e| PluginError::load(module_id, format!("invalid manifest: {}", e)))?;

        debug!(
            "Parsed manifest {:?}: {} exports, requires {:?}",
            path,
            manifest.exports.len(),
            manifest.requires
        );

        manifest
            .into_module(module_id, &self.types)
            .map_err(|message| PluginError::load(module_id, message))
    }
}
