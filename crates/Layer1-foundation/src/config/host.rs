//! Host Config - 플러그인 호스트 설정
//!
//! `settings.json` 하나로 플러그인 디렉토리, 스캔할 네임스페이스,
//! 라이프사이클 옵션을 관리합니다.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// 설정 폴더 이름
pub const CONFIG_DIR_NAME: &str = ".plughost";

/// 설정 파일명
pub const SETTINGS_FILE: &str = "settings.json";

/// 로컬 (gitignored) 설정 파일명
pub const LOCAL_SETTINGS_FILE: &str = "settings.local.json";

/// 기본 네임스페이스
pub const DEFAULT_NAMESPACE: &str = "extensions";

// ============================================================================
// HostConfig
// ============================================================================

/// 플러그인 호스트 설정
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostConfig {
    /// 플러그인 루트 디렉토리 (네임스페이스 = 하위 디렉토리)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plugin_dir: Option<PathBuf>,

    /// 발견 대상 네임스페이스 (순서대로 스캔)
    #[serde(default = "default_namespaces")]
    pub namespaces: Vec<String>,

    /// 모듈 매니페스트 확장자
    #[serde(default = "default_module_extension")]
    pub module_extension: String,

    /// activate_all에서 건너뛸 플러그인 이름
    #[serde(default)]
    pub disabled_plugins: Vec<String>,

    /// activate/deactivate 호출당 제한 시간 (ms)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lifecycle_timeout_ms: Option<u64>,

    /// 로그 레벨 (RUST_LOG가 없을 때)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            plugin_dir: None,
            namespaces: default_namespaces(),
            module_extension: default_module_extension(),
            disabled_plugins: Vec::new(),
            lifecycle_timeout_ms: None,
            log_level: default_log_level(),
        }
    }
}

impl HostConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// 플러그인 디렉토리 지정
    pub fn with_plugin_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.plugin_dir = Some(dir.into());
        self
    }

    /// 네임스페이스 목록 교체
    pub fn with_namespaces<I, S>(mut self, namespaces: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.namespaces = namespaces.into_iter().map(Into::into).collect();
        self
    }

    /// 비활성 플러그인 추가
    pub fn with_disabled(mut self, name: impl Into<String>) -> Self {
        self.disabled_plugins.push(name.into());
        self
    }

    /// 라이프사이클 제한 시간 설정
    pub fn with_lifecycle_timeout_ms(mut self, ms: u64) -> Self {
        self.lifecycle_timeout_ms = Some(ms);
        self
    }

    /// 설정된 플러그인 디렉토리, 없으면 `~/.plughost/plugins`
    pub fn plugin_dir_or_default(&self) -> PathBuf {
        if let Some(dir) = &self.plugin_dir {
            return dir.clone();
        }

        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(CONFIG_DIR_NAME)
            .join("plugins")
    }

    /// 값 검증
    ///
    /// 확장자는 점 없이 적어야 하고 네임스페이스 이름은 비어 있거나 경로를 포함할 수 없습니다.
    pub fn validate(&self) -> Result<()> {
        if self.module_extension.is_empty() || self.module_extension.starts_with('.') {
            return Err(Error::Config(format!(
                "moduleExtension must be a bare extension like \"json\", got {:?}",
                self.module_extension
            )));
        }

        if let Some(ns) = self
            .namespaces
            .iter()
            .find(|ns| ns.trim().is_empty() || ns.contains(['/', '\\']) || ns.as_str() == "..")
        {
            return Err(Error::Config(format!("invalid namespace {:?}", ns)));
        }

        Ok(())
    }

    /// 이름이 비활성 목록에 있는지 확인
    pub fn is_disabled(&self, name: &str) -> bool {
        self.disabled_plugins.iter().any(|n| n == name)
    }
}

fn default_namespaces() -> Vec<String> {
    vec![DEFAULT_NAMESPACE.to_string()]
}

fn default_module_extension() -> String {
    "json".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}
