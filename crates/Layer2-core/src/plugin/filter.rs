//! Contract Filter - 모듈 export 중 플러그인 타입만 인스턴스화

use super::error::{panic_message, PluginError};
use super::loader::LoadOutcome;
use super::module::{Export, ModuleId};
use super::traits::Plugin;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{debug, warn};

/// 인스턴스화 결과 하나
pub struct Candidate {
    /// 출처 모듈
    pub module_id: ModuleId,

    /// export 심볼
    pub symbol: String,

    /// 생성된 인스턴스 또는 InstantiationError
    pub result: Result<Arc<dyn Plugin>, PluginError>,
}

impl Candidate {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

impl std::fmt::Debug for Candidate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let result = match &self.result {
            Ok(plugin) => Ok(plugin.name()),
            Err(e) => Err(e.to_string()),
        };
        f.debug_struct("Candidate")
            .field("module_id", &self.module_id)
            .field("symbol", &self.symbol)
            .field("result", &result)
            .finish()
    }
}

/// 상태 없는 필터
#[derive(Debug, Clone, Copy, Default)]
pub struct ContractFilter;

impl ContractFilter {
    /// 로드 결과에서 플러그인 후보 추출
    ///
    /// 실패한 outcome이나 플러그인 export가 없는 모듈은 빈 목록입니다.
    /// 팩토리는 export당 정확히 한 번 호출됩니다.
    pub fn extract(outcome: &LoadOutcome) -> Vec<Candidate> {
        let Some(module) = outcome.module() else {
            return Vec::new();
        };

        let mut candidates = Vec::new();

        for export in &module.exports {
            let Export::Plugin { symbol, factory } = export else {
                debug!("Skipping non-plugin export {}::{}", module.id, export.symbol());
                continue;
            };

            let result = match catch_unwind(AssertUnwindSafe(|| factory())) {
                Ok(Ok(plugin)) => Ok(plugin),
                Ok(Err(message)) => Err(message),
                Err(payload) => Err(panic_message(payload.as_ref())),
            }
            .map_err(|message| {
                warn!("Failed to instantiate {}::{}: {}", module.id, symbol, message);
                PluginError::Instantiation {
                    module_id: module.id.clone(),
                    symbol: symbol.clone(),
                    message,
                }
            });

            candidates.push(Candidate {
                module_id: module.id.clone(),
                symbol: symbol.clone(),
                result,
            });
        }

        debug!("Module {} yielded {} candidates", module.id, candidates.len());
        candidates
    }
}
