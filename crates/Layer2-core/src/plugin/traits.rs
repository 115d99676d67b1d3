//! Plugin traits - 핵심 플러그인 인터페이스

use async_trait::async_trait;
use plughost_foundation::Result;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

// ============================================================================
// Plugin Trait - 모든 플러그인이 구현해야 하는 인터페이스
// ============================================================================

/// 플러그인 트레이트
///
/// 세 가지 기능(`name`, `activate`, `deactivate`)을 모두 구현한 타입만
/// 플러그인으로 export 될 수 있습니다. 상태가 필요하면 내부 가변성을 사용하세요.
#[async_trait]
pub trait Plugin: Send + Sync {
    /// 플러그인 이름 (레지스트리 키, 비어있지 않은 출력 가능 문자열)
    fn name(&self) -> &str;

    /// 플러그인 활성화
    async fn activate(&self) -> Result<()>;

    /// 플러그인 비활성화
    async fn deactivate(&self) -> Result<()>;
}

/// 인자 없는 생성자 - 실패할 수 있음
pub type PluginFactory =
    Arc<dyn Fn() -> std::result::Result<Arc<dyn Plugin>, String> + Send + Sync>;

/// `Default` 구현 타입용 팩토리 생성
pub fn default_factory<T>() -> PluginFactory
where
    T: Plugin + Default + 'static,
{
    Arc::new(|| Ok(Arc::new(T::default()) as Arc<dyn Plugin>))
}

/// 이름 유효성 검사 (비어있지 않고, 공백뿐이 아니며, 제어 문자 없음)
pub fn is_valid_name(name: &str) -> bool {
    !name.trim().is_empty() && !name.chars().any(char::is_control)
}

// ============================================================================
// LifecycleState - 라이프사이클 상태 머신
// ============================================================================

/// 플러그인 라이프사이클 상태
///
/// ```text
/// Discovered -> Activating -> Active -> Deactivating -> Deactivated
///                   ^   |                                   |
///                   |   +------ (activate 실패) ----------->|
///                   +---------------------------------------+
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LifecycleState {
    /// 등록됨 (초기 상태)
    Discovered,

    /// activate 호출 중
    Activating,

    /// 활성화됨
    Active,

    /// deactivate 호출 중
    Deactivating,

    /// 비활성화됨 (다시 활성화 가능)
    Deactivated,
}

impl LifecycleState {
    /// 현재 상태에서 이동 가능한 상태들
    pub fn valid_transitions(&self) -> &'static [LifecycleState] {
        match self {
            Self::Discovered => &[Self::Activating],
            Self::Activating => &[Self::Active, Self::Deactivated],
            Self::Active => &[Self::Deactivating],
            Self::Deactivating => &[Self::Deactivated],
            Self::Deactivated => &[Self::Activating],
        }
    }

    /// 전이 가능 여부
    pub fn can_transition_to(&self, target: LifecycleState) -> bool {
        self.valid_transitions().contains(&target)
    }

    /// 호출 진행 중인 임시 상태인지
    pub fn is_transitional(&self) -> bool {
        matches!(self, Self::Activating | Self::Deactivating)
    }

    /// activate 대상인지
    pub fn is_activatable(&self) -> bool {
        matches!(self, Self::Discovered | Self::Deactivated)
    }

    /// 레지스트리에서 제거 가능한지
    pub fn is_removable(&self) -> bool {
        matches!(self, Self::Discovered | Self::Deactivated)
    }
}

impl std::fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Discovered => write!(f, "discovered"),
            Self::Activating => write!(f, "activating"),
            Self::Active => write!(f, "active"),
            Self::Deactivating => write!(f, "deactivating"),
            Self::Deactivated => write!(f, "deactivated"),
        }
    }
}
