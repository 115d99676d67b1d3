//! Module - 로드된 모듈과 export 목록
//!
//! 런타임 리플렉션 대신, 모듈이 자신의 최상위 정의를 [`Export`]로 나열합니다.
//! ContractFilter는 이 목록만 보고 플러그인 후보를 고릅니다.

use super::traits::{default_factory, Plugin, PluginFactory};
use std::sync::Arc;

/// 모듈 식별자
pub type ModuleId = String;

/// 네임스페이스 식별자
pub type NamespaceId = String;

// ============================================================================
// Export - 모듈의 최상위 정의
// ============================================================================

/// 모듈이 export 하는 최상위 정의
#[derive(Clone)]
pub enum Export {
    /// Plugin을 구현한 구체 타입 (인자 없는 생성자 포함)
    Plugin {
        symbol: String,
        factory: PluginFactory,
    },

    /// 계약을 선언했지만 인스턴스화할 수 없는 타입
    Abstract { symbol: String },

    /// 계약 자체의 재export
    Contract,

    /// 그 외 정의 (헬퍼 함수, 상수 등)
    Item { symbol: String },
}

impl Export {
    /// export 심볼 이름
    pub fn symbol(&self) -> &str {
        match self {
            Self::Plugin { symbol, .. } | Self::Abstract { symbol } | Self::Item { symbol } => {
                symbol.as_str()
            }
            Self::Contract => "Plugin",
        }
    }

    /// 인스턴스화 대상인지
    pub fn is_plugin(&self) -> bool {
        matches!(self, Self::Plugin { .. })
    }
}

impl std::fmt::Debug for Export {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Plugin { symbol, .. } => f.debug_struct("Plugin").field("symbol", symbol).finish(),
            Self::Abstract { symbol } => f.debug_struct("Abstract").field("symbol", symbol).finish(),
            Self::Contract => f.write_str("Contract"),
            Self::Item { symbol } => f.debug_struct("Item").field("symbol", symbol).finish(),
        }
    }
}

// ============================================================================
// Module - 로드된 모듈
// ============================================================================

/// 로드된 모듈 핸들
#[derive(Debug, Clone)]
pub struct Module {
    /// 모듈 ID
    pub id: ModuleId,

    /// export 목록 (선언 순서)
    pub exports: Vec<Export>,
}

impl Module {
    /// 빈 모듈 생성
    pub fn new(id: impl Into<ModuleId>) -> Self {
        Self {
            id: id.into(),
            exports: Vec::new(),
        }
    }

    /// `Default`로 생성 가능한 플러그인 타입 export
    pub fn with_plugin<T>(self, symbol: impl Into<String>) -> Self
    where
        T: Plugin + Default + 'static,
    {
        self.with_export(Export::Plugin {
            symbol: symbol.into(),
            factory: default_factory::<T>(),
        })
    }

    /// 팩토리로 플러그인 타입 export
    pub fn with_factory<F>(self, symbol: impl Into<String>, factory: F) -> Self
    where
        F: Fn() -> Result<Arc<dyn Plugin>, String> + Send + Sync + 'static,
    {
        self.with_export(Export::Plugin {
            symbol: symbol.into(),
            factory: Arc::new(factory),
        })
    }

    /// 추상 타입 export
    pub fn with_abstract(self, symbol: impl Into<String>) -> Self {
        self.with_export(Export::Abstract {
            symbol: symbol.into(),
        })
    }

    /// 계약 재export
    pub fn with_contract(self) -> Self {
        self.with_export(Export::Contract)
    }

    /// 일반 정의 export
    pub fn with_item(self, symbol: impl Into<String>) -> Self {
        self.with_export(Export::Item {
            symbol: symbol.into(),
        })
    }

    /// export 추가
    pub fn with_export(mut self, export: Export) -> Self {
        self.exports.push(export);
        self
    }

    /// 플러그인 export 수
    pub fn plugin_export_count(&self) -> usize {
        self.exports.iter().filter(|e| e.is_plugin()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    #[derive(Default)]
    struct Noop;

    #[async_trait]
    impl Plugin for Noop {
        fn name(&self) -> &str {
            "Noop"
        }

        async fn activate(&self) -> plughost_foundation::Result<()> {
            Ok(())
        }

        async fn deactivate(&self) -> plughost_foundation::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_module_builder() {
        let module = Module::new("helpers")
            .with_contract()
            .with_abstract("BasePlugin")
            .with_plugin::<Noop>("Noop")
            .with_item("format_banner");

        assert_eq!(module.id, "helpers");
        assert_eq!(module.exports.len(), 4);
        assert_eq!(module.plugin_export_count(), 1);

        let symbols: Vec<_> = module.exports.iter().map(|e| e.symbol()).collect();
        assert_eq!(symbols, vec!["Plugin", "BasePlugin", "Noop", "format_banner"]);
    }

    #[test]
    fn test_export_debug_hides_factory() {
        let module = Module::new("m").with_factory("Broken", || Err("no".into()));
        let debug = format!("{:?}", module.exports[0]);
        assert_eq!(debug, "Plugin { symbol: \"Broken\" }");
    }
}
