//! Package Locator - 네임스페이스 → 모듈 ID 목록
//!
//! 호스트가 제공하는 외부 협력자. 코어는 네임스페이스가 디렉토리인지,
//! 컴파일된 테이블인지 알지 못합니다.

use super::error::PluginError;
use super::module::ModuleId;
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// 네임스페이스를 멤버 모듈 ID 목록으로 해석
#[async_trait]
pub trait PackageLocator: Send + Sync {
    /// 멤버 모듈 ID 열거 (반환 순서가 곧 활성화 순서)
    async fn enumerate(&self, namespace: &str) -> Result<Vec<ModuleId>, PluginError>;
}

// ============================================================================
// StaticLocator - 메모리 내 테이블
// ============================================================================

/// 메모리 내 네임스페이스 테이블
#[derive(Debug, Clone, Default)]
pub struct StaticLocator {
    namespaces: HashMap<String, Vec<ModuleId>>,
}

impl StaticLocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// 네임스페이스 등록 (기존 값 교체)
    pub fn with_namespace<I, S>(mut self, namespace: impl Into<String>, modules: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<ModuleId>,
    {
        self.namespaces
            .insert(namespace.into(), modules.into_iter().map(Into::into).collect());
        self
    }
}

#[async_trait]
impl PackageLocator for StaticLocator {
    async fn enumerate(&self, namespace: &str) -> Result<Vec<ModuleId>, PluginError> {
        self.namespaces
            .get(namespace)
            .cloned()
            .ok_or_else(|| PluginError::locator(namespace, "unknown namespace"))
    }
}

// ============================================================================
// DirectoryLocator - 파일 시스템
// ============================================================================

/// 디렉토리 기반 로케이터
///
/// `<root>/<namespace>/` 안의 `*.<extension>` 파일이 멤버 모듈입니다.
/// `__`나 `.`으로 시작하는 파일과 하위 디렉토리(패키지)는 제외됩니다.
#[derive(Debug, Clone)]
pub struct DirectoryLocator {
    /// 루트 디렉토리
    root: PathBuf,

    /// 모듈 파일 확장자 (점 제외)
    extension: String,
}

impl DirectoryLocator {
    pub fn new(root: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            extension: extension.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// 네임스페이스 디렉토리 경로
    pub fn namespace_dir(&self, namespace: &str) -> PathBuf {
        self.root.join(namespace)
    }

    /// 모듈 파일 경로
    pub fn module_path(&self, namespace: &str, module_id: &str) -> PathBuf {
        self.namespace_dir(namespace)
            .join(format!("{}.{}", module_id, self.extension))
    }

    fn member_id(&self, path: &Path) -> Option<ModuleId> {
        if path.extension().and_then(|e| e.to_str()) != Some(self.extension.as_str()) {
            return None;
        }

        let stem = path.file_stem()?.to_str()?;
        if stem.is_empty() || stem.starts_with("__") || stem.starts_with('.') {
            return None;
        }

        Some(stem.to_string())
    }
}

#[async_trait]
impl PackageLocator for DirectoryLocator {
    async fn enumerate(&self, namespace: &str) -> Result<Vec<ModuleId>, PluginError> {
        let dir = self.namespace_dir(namespace);

        let mut entries = fs::read_dir(&dir)
            .await
            .map_err(|e| PluginError::locator(namespace, format!("{}: {}", dir.display(), e)))?;

        let mut members = Vec::new();

        loop {
            let entry = match entries.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(e) => return Err(PluginError::locator(namespace, e.to_string())),
            };

            let path = entry.path();

            let Some(id) = self.member_id(&path) else {
                debug!("Skipping non-module entry {:?}", path);
                continue;
            };

            // 심볼릭 링크는 대상 기준으로 판단, 하위 디렉토리는 패키지 - 멤버 아님
            let metadata = fs::metadata(&path).await.map_err(|e| {
                PluginError::locator(namespace, format!("{}: {}", path.display(), e))
            })?;
            if metadata.is_dir() {
                debug!("Skipping package {:?}", path);
                continue;
            }

            members.push(id);
        }

        // read_dir 순서는 플랫폼마다 다르므로 정렬
        members.sort();

        debug!("Namespace {} has {} modules", namespace, members.len());
        Ok(members)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_static_locator_preserves_order() {
        let locator = StaticLocator::new().with_namespace("ext", ["zeta", "alpha", "mid"]);

        let members = locator.enumerate("ext").await.unwrap();
        assert_eq!(members, vec!["zeta", "alpha", "mid"]);
    }

    #[tokio::test]
    async fn test_static_locator_unknown_namespace() {
        let locator = StaticLocator::new();
        let err = locator.enumerate("nope").await.unwrap_err();
        assert!(matches!(err, PluginError::Locator { .. }));
    }

    #[tokio::test]
    async fn test_directory_locator_filters_members() {
        let temp = TempDir::new().unwrap();
        let ns = temp.path().join("ext");
        fs::create_dir_all(ns.join("subpackage")).await.unwrap();

        for name in ["security_ext.json", "logging_ext.json", "__init__.json", ".hidden.json", "notes.txt"] {
            fs::write(ns.join(name), "{}").await.unwrap();
        }

        let locator = DirectoryLocator::new(temp.path(), "json");
        let members = locator.enumerate("ext").await.unwrap();

        assert_eq!(members, vec!["logging_ext", "security_ext"]);
        assert_eq!(
            locator.module_path("ext", "logging_ext"),
            ns.join("logging_ext.json")
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_directory_locator_follows_symlinks() {
        let temp = TempDir::new().unwrap();
        let store = temp.path().join("store");
        let ns = temp.path().join("ext");
        fs::create_dir_all(&store).await.unwrap();
        fs::create_dir_all(&ns).await.unwrap();

        fs::write(store.join("logging_ext.json"), "{}").await.unwrap();
        fs::write(ns.join("security_ext.json"), "{}").await.unwrap();
        fs::symlink(store.join("logging_ext.json"), ns.join("logging_ext.json"))
            .await
            .unwrap();
        // 디렉토리를 가리키는 링크는 패키지로 취급
        fs::symlink(&store, ns.join("linked_pkg.json")).await.unwrap();

        let locator = DirectoryLocator::new(temp.path(), "json");
        let members = locator.enumerate("ext").await.unwrap();

        assert_eq!(members, vec!["logging_ext", "security_ext"]);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_directory_locator_dangling_symlink_is_error() {
        let temp = TempDir::new().unwrap();
        let ns = temp.path().join("ext");
        fs::create_dir_all(&ns).await.unwrap();
        fs::symlink(temp.path().join("gone.json"), ns.join("gone.json"))
            .await
            .unwrap();
        // 모듈 확장자가 아닌 끊어진 링크는 무시
        fs::symlink(temp.path().join("gone.txt"), ns.join("notes.txt"))
            .await
            .unwrap();

        let locator = DirectoryLocator::new(temp.path(), "json");
        let err = locator.enumerate("ext").await.unwrap_err();
        assert!(matches!(err, PluginError::Locator { .. }));
    }

    #[tokio::test]
    async fn test_directory_locator_missing_namespace() {
        let temp = TempDir::new().unwrap();
        let locator = DirectoryLocator::new(temp.path(), "json");

        let err = locator.enumerate("missing").await.unwrap_err();
        assert_eq!(err.subject(), Some("missing"));
    }
}
