//! Error types for the plugin system.

use super::traits::LifecycleState;
use thiserror::Error;

/// Errors produced while discovering, registering or driving plugins.
///
/// Per-item variants are collected into a `BatchResult`; only
/// [`PluginError::NotDiscovered`] is returned directly to the caller.
#[derive(Error, Debug)]
pub enum PluginError {
    #[error("Failed to resolve namespace {namespace}: {message}")]
    Locator { namespace: String, message: String },

    #[error("Failed to load module {module_id}: {message}")]
    Load { module_id: String, message: String },

    #[error("Failed to instantiate {symbol} from {module_id}: {message}")]
    Instantiation {
        module_id: String,
        symbol: String,
        message: String,
    },

    #[error("Plugin {0} is already registered")]
    DuplicateName(String),

    #[error("Invalid plugin name: {0:?}")]
    InvalidName(String),

    #[error("Plugin {name} failed to activate: {source}")]
    Activation {
        name: String,
        #[source]
        source: plughost_foundation::Error,
    },

    #[error("Plugin {name} failed to deactivate: {source}")]
    Deactivation {
        name: String,
        #[source]
        source: plughost_foundation::Error,
    },

    #[error("Plugin not found: {0}")]
    NotFound(String),

    #[error("Plugin {name} is {state}, cannot {action}")]
    InvalidState {
        name: String,
        state: LifecycleState,
        action: &'static str,
    },

    #[error("Lifecycle pass requested before any plugin was discovered or registered")]
    NotDiscovered,
}

impl PluginError {
    pub fn load(module_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Load {
            module_id: module_id.into(),
            message: message.into(),
        }
    }

    pub fn locator(namespace: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Locator {
            namespace: namespace.into(),
            message: message.into(),
        }
    }

    /// 에러 대상 (플러그인 이름, 모듈 ID 또는 네임스페이스)
    pub fn subject(&self) -> Option<&str> {
        match self {
            Self::Locator { namespace, .. } => Some(namespace.as_str()),
            Self::Load { module_id, .. } => Some(module_id.as_str()),
            Self::Instantiation { module_id, .. } => Some(module_id.as_str()),
            Self::DuplicateName(name)
            | Self::InvalidName(name)
            | Self::NotFound(name)
            | Self::Activation { name, .. }
            | Self::Deactivation { name, .. }
            | Self::InvalidState { name, .. } => Some(name.as_str()),
            Self::NotDiscovered => None,
        }
    }

    /// 호출 순서 오류 (호출자 버그)
    pub fn is_programmer_error(&self) -> bool {
        matches!(self, Self::NotDiscovered)
    }
}

/// panic payload를 메시지로 변환
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("panicked: {}", s)
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("panicked: {}", s)
    } else {
        "panicked".to_string()
    }
}

impl From<PluginError> for plughost_foundation::Error {
    fn from(err: PluginError) -> Self {
        plughost_foundation::Error::Plugin(err.to_string())
    }
}
