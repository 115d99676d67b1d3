//! # plughost-foundation
//!
//! Foundation layer for plughost:
//! - Error: 호스트/플러그인 공용 에러 타입
//! - Config: 호스트 설정 (HostConfig, 계층별 settings.json 로더)

pub mod config;
pub mod error;

// ============================================================================
// Error
// ============================================================================
pub use error::{Error, Result};

// ============================================================================
// Config (설정)
// ============================================================================
pub use config::{
    load_config_from_file, merge_configs, strip_json_comments, ConfigLoader, HostConfig,
    CONFIG_DIR_NAME, DEFAULT_NAMESPACE, SETTINGS_FILE,
};
