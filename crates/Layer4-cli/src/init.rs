//! plughost init command
//!
//! 현재 디렉토리에 `.plughost/settings.json`과 예제 플러그인 네임스페이스를 생성합니다.

use plughost_foundation::{CONFIG_DIR_NAME, DEFAULT_NAMESPACE, SETTINGS_FILE};
use std::fs;
use std::path::Path;

const SETTINGS_TEMPLATE: &str = r#"{
  // 플러그인 루트 (네임스페이스는 하위 디렉토리)
  "pluginDir": ".plughost/plugins",
  "namespaces": ["extensions"],
  "moduleExtension": "json",

  // activate_all 에서 건너뛸 플러그인 이름
  "disabledPlugins": [],

  // activate/deactivate 호출당 제한 시간 (ms)
  "lifecycleTimeoutMs": 5000,
  "logLevel": "info"
}
"#;

const LOGGING_MODULE: &str = r#"{
  "description": "Request logging",
  "exports": [
    { "symbol": "Plugin", "kind": "contract" },
    { "symbol": "LoggingPlugin", "kind": "plugin", "type": "logging" }
  ]
}
"#;

const SECURITY_MODULE: &str = r#"{
  "description": "Security checks",
  "requires": ["logging"],
  "exports": [
    { "symbol": "BasePolicy", "kind": "abstract" },
    { "symbol": "SecurityPlugin", "kind": "plugin", "type": "security" }
  ]
}
"#;

/// Initialize plughost configuration under `root`
pub fn init_project(root: &Path, force: bool) -> anyhow::Result<()> {
    let config_dir = root.join(CONFIG_DIR_NAME);

    // Check if already initialized
    if config_dir.join(SETTINGS_FILE).exists() && !force {
        println!("✓ plughost already initialized in this directory.");
        println!("  Use --force to reinitialize.");
        return Ok(());
    }

    println!("Initializing plughost...");

    let namespace_dir = config_dir.join("plugins").join(DEFAULT_NAMESPACE);
    fs::create_dir_all(&namespace_dir)?;

    fs::write(config_dir.join(SETTINGS_FILE), SETTINGS_TEMPLATE)?;
    println!("  Created {}/{}", CONFIG_DIR_NAME, SETTINGS_FILE);

    for (file, content) in [("logging_ext.json", LOGGING_MODULE), ("security_ext.json", SECURITY_MODULE)] {
        fs::write(namespace_dir.join(file), content)?;
        println!("  Created {}/plugins/{}/{}", CONFIG_DIR_NAME, DEFAULT_NAMESPACE, file);
    }

    println!("\n✓ Done. Try `plughost list` or `plughost run`.");
    Ok(())
}
