//! Builtin plugin types
//!
//! 매니페스트의 `"type"` 값으로 참조되는 컴파일된 플러그인 타입들

use async_trait::async_trait;
use plughost_core::{Plugin, PluginTypeTable};
use plughost_foundation::Result;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::info;

/// 타입 이름: 로깅 플러그인
pub const LOGGING_TYPE: &str = "logging";

/// 타입 이름: 보안 플러그인
pub const SECURITY_TYPE: &str = "security";

/// 빌트인 타입 테이블
pub fn plugin_types() -> PluginTypeTable {
    PluginTypeTable::new()
        .with_type::<LoggingPlugin>(LOGGING_TYPE)
        .with_type::<SecurityPlugin>(SECURITY_TYPE)
}

// ============================================================================
// LoggingPlugin
// ============================================================================

#[derive(Debug, Default)]
pub struct LoggingPlugin {
    active: AtomicBool,
}

impl LoggingPlugin {
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Plugin for LoggingPlugin {
    fn name(&self) -> &str {
        "LoggingPlugin"
    }

    async fn activate(&self) -> Result<()> {
        self.active.store(true, Ordering::SeqCst);
        info!("Logging plugin activated");
        Ok(())
    }

    async fn deactivate(&self) -> Result<()> {
        self.active.store(false, Ordering::SeqCst);
        info!("Logging plugin deactivated");
        Ok(())
    }
}

// ============================================================================
// SecurityPlugin
// ============================================================================

#[derive(Debug, Default)]
pub struct SecurityPlugin {
    active: AtomicBool,
}

impl SecurityPlugin {
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Plugin for SecurityPlugin {
    fn name(&self) -> &str {
        "SecurityPlugin"
    }

    async fn activate(&self) -> Result<()> {
        self.active.store(true, Ordering::SeqCst);
        info!("Security plugin activated");
        Ok(())
    }

    async fn deactivate(&self) -> Result<()> {
        self.active.store(false, Ordering::SeqCst);
        info!("Security plugin deactivated");
        Ok(())
    }
}
