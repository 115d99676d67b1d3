//! Config - 호스트 설정 관리
//!
//! - `host.rs` - HostConfig (플러그인 디렉토리, 네임스페이스, 라이프사이클 옵션)
//! - `loader.rs` - 계층별 settings.json 로드 및 병합

mod host;
mod loader;

pub use host::{
    HostConfig, CONFIG_DIR_NAME, DEFAULT_NAMESPACE, LOCAL_SETTINGS_FILE, SETTINGS_FILE,
};
pub use loader::{load_config_from_file, merge_configs, strip_json_comments, ConfigLoader};
