//! Configuration Loader
//!
//! plughost 설정 로더 (`.plughost` 폴더)
//!
//! ## 검색 우선순위
//!
//! 1. User-level: `~/.plughost/settings.json`
//! 2. Project-level: `.plughost/settings.json`
//! 3. Local (gitignored): `.plughost/settings.local.json`
//!
//! 각 레벨의 설정이 이전 레벨을 오버라이드합니다.

use super::host::{HostConfig, CONFIG_DIR_NAME, LOCAL_SETTINGS_FILE, SETTINGS_FILE};
use crate::Result;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

// ============================================================================
// ConfigLoader - 설정 로더
// ============================================================================

/// 설정 로더
pub struct ConfigLoader {
    /// 검색 경로
    search_paths: Vec<ConfigPath>,
}

/// 설정 파일 경로 정보
#[derive(Debug, Clone)]
struct ConfigPath {
    /// 경로
    path: PathBuf,
    /// 우선순위 (높을수록 우선)
    priority: usize,
    /// 설명
    description: &'static str,
}

impl ConfigLoader {
    /// 새 로더 생성 (기본 검색 경로)
    pub fn new(working_dir: &Path) -> Self {
        let mut paths = Vec::new();

        // 1. User-level (가장 낮은 우선순위)
        if let Some(home) = dirs::home_dir() {
            paths.push(ConfigPath {
                path: home.join(CONFIG_DIR_NAME).join(SETTINGS_FILE),
                priority: 10,
                description: "User settings",
            });
        }

        // 2. Project-level
        paths.push(ConfigPath {
            path: working_dir.join(CONFIG_DIR_NAME).join(SETTINGS_FILE),
            priority: 20,
            description: "Project settings",
        });

        // 3. Local (gitignored, 가장 높은 우선순위)
        paths.push(ConfigPath {
            path: working_dir.join(CONFIG_DIR_NAME).join(LOCAL_SETTINGS_FILE),
            priority: 30,
            description: "Local settings",
        });

        paths.sort_by_key(|p| p.priority);

        Self { search_paths: paths }
    }

    /// 커스텀 검색 경로로 생성 (뒤에 올수록 우선)
    pub fn with_paths(paths: Vec<PathBuf>) -> Self {
        let search_paths = paths
            .into_iter()
            .enumerate()
            .map(|(i, path)| ConfigPath {
                path,
                priority: i,
                description: "Custom",
            })
            .collect();

        Self { search_paths }
    }

    /// 모든 경로에서 설정 로드하여 병합
    ///
    /// 없는 파일은 건너뛰고, 잘못된 파일은 경고 후 건너뜁니다.
    pub fn load_all(&self) -> HostConfig {
        let mut merged = HostConfig::new();

        for config_path in &self.search_paths {
            if !config_path.path.exists() {
                continue;
            }

            match load_config_from_file(&config_path.path) {
                Ok(config) => {
                    info!(
                        "Loaded {} from: {}",
                        config_path.description,
                        config_path.path.display()
                    );
                    merged = merge_configs(merged, config);
                }
                Err(e) => {
                    warn!(
                        "Failed to load settings from {}: {}",
                        config_path.path.display(),
                        e
                    );
                }
            }
        }

        merged
    }

    /// 존재하는 설정 파일 목록
    pub fn existing_files(&self) -> Vec<PathBuf> {
        self.search_paths
            .iter()
            .filter(|p| p.path.exists())
            .map(|p| p.path.clone())
            .collect()
    }
}

// ============================================================================
// 유틸리티 함수
// ============================================================================

/// 파일에서 설정 로드
pub fn load_config_from_file(path: &Path) -> Result<HostConfig> {
    let content = std::fs::read_to_string(path)?;

    // JSONC 파일일 수 있음 (주석 제거)
    let content = strip_json_comments(&content);

    let config: HostConfig = serde_json::from_str(&content)?;
    config.validate()?;

    debug!(
        "Loaded config from {}: {} namespaces, plugin dir: {:?}",
        path.display(),
        config.namespaces.len(),
        config.plugin_dir
    );

    Ok(config)
}

/// 두 설정 병합 (later가 earlier를 오버라이드)
///
/// 파일 단위 병합이므로 later에서 기본값인 필드는 earlier 값을 유지합니다.
pub fn merge_configs(earlier: HostConfig, later: HostConfig) -> HostConfig {
    let defaults = HostConfig::default();

    HostConfig {
        plugin_dir: later.plugin_dir.or(earlier.plugin_dir),

        namespaces: if later.namespaces != defaults.namespaces {
            later.namespaces
        } else {
            earlier.namespaces
        },

        module_extension: if later.module_extension != defaults.module_extension {
            later.module_extension
        } else {
            earlier.module_extension
        },

        // 비활성 목록: 병합 (중복 제거)
        disabled_plugins: {
            let mut merged = earlier.disabled_plugins;
            for name in later.disabled_plugins {
                if !merged.contains(&name) {
                    merged.push(name);
                }
            }
            merged
        },

        lifecycle_timeout_ms: later.lifecycle_timeout_ms.or(earlier.lifecycle_timeout_ms),

        log_level: if later.log_level != defaults.log_level {
            later.log_level
        } else {
            earlier.log_level
        },
    }
}

/// JSON 주석 제거 (`//`, `/* */`)
pub fn strip_json_comments(input: &str) -> String {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    let mut in_string = false;
    let mut escape_next = false;

    while let Some(c) = chars.next() {
        if escape_next {
            output.push(c);
            escape_next = false;
            continue;
        }

        if c == '\\' && in_string {
            output.push(c);
            escape_next = true;
            continue;
        }

        if c == '"' {
            in_string = !in_string;
            output.push(c);
            continue;
        }

        if !in_string && c == '/' {
            match chars.peek() {
                Some('/') => {
                    // 라인 주석 스킵
                    chars.next();
                    for c in chars.by_ref() {
                        if c == '\n' {
                            output.push(c);
                            break;
                        }
                    }
                    continue;
                }
                Some('*') => {
                    // 블록 주석 스킵
                    chars.next();
                    while let Some(c) = chars.next() {
                        if c == '*' && chars.peek() == Some(&'/') {
                            chars.next();
                            break;
                        }
                    }
                    continue;
                }
                _ => {}
            }
        }

        output.push(c);
    }

    output
}

// ============================================================================
// 테스트
// ============================================================================
