//! Plugin Events - 라이프사이클 이벤트 시스템
//!
//! 등록, 활성화, 실패 등 파이프라인의 각 단계를 구독자에게 알립니다.
//! 구독자는 관찰만 할 수 있고 파이프라인 진행에 영향을 주지 않습니다.

use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::debug;

// ============================================================================
// PluginEvent - 플러그인 이벤트 타입
// ============================================================================

/// 플러그인 이벤트
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginEvent {
    /// 이벤트 종류
    pub kind: EventKind,

    /// 대상 (플러그인 이름, 모듈 ID 또는 네임스페이스)
    pub subject: String,

    /// 부가 정보 (주로 에러 메시지)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,

    /// 타임스탬프
    pub timestamp: DateTime<Utc>,
}

impl PluginEvent {
    /// 새 이벤트 생성
    pub fn new(kind: EventKind, subject: impl Into<String>) -> Self {
        Self {
            kind,
            subject: subject.into(),
            detail: None,
            timestamp: Utc::now(),
        }
    }

    /// 부가 정보 추가
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// 실패 이벤트인지
    pub fn is_failure(&self) -> bool {
        self.kind.is_failure()
    }
}

/// 이벤트 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    // 발견 이벤트
    ModuleLoadFailed,
    InstantiationFailed,
    Registered,
    RegistrationRejected,

    // 라이프사이클 이벤트
    Activated,
    ActivationFailed,
    Deactivated,
    DeactivationFailed,

    // 레지스트리 이벤트
    Removed,
}

impl EventKind {
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            Self::ModuleLoadFailed
                | Self::InstantiationFailed
                | Self::RegistrationRejected
                | Self::ActivationFailed
                | Self::DeactivationFailed
        )
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ModuleLoadFailed => write!(f, "module_load_failed"),
            Self::InstantiationFailed => write!(f, "instantiation_failed"),
            Self::Registered => write!(f, "registered"),
            Self::RegistrationRejected => write!(f, "registration_rejected"),
            Self::Activated => write!(f, "activated"),
            Self::ActivationFailed => write!(f, "activation_failed"),
            Self::Deactivated => write!(f, "deactivated"),
            Self::DeactivationFailed => write!(f, "deactivation_failed"),
            Self::Removed => write!(f, "removed"),
        }
    }
}

// ============================================================================
// PluginEventHandler - 이벤트 핸들러 트레이트
// ============================================================================

/// 이벤트 핸들러 트레이트
pub trait PluginEventHandler: Send + Sync {
    /// 핸들러 이름
    fn name(&self) -> &str;

    /// 관심 있는 이벤트 종류 (비어있으면 전부)
    fn interested_events(&self) -> Vec<EventKind> {
        Vec::new()
    }

    /// 이벤트 처리
    fn handle(&self, event: &PluginEvent);
}

// ============================================================================
// EventBus - 이벤트 버스 (발행/구독)
// ============================================================================

/// 이벤트 버스 - 복제본은 채널, 핸들러, 히스토리를 공유
#[derive(Clone)]
pub struct EventBus {
    /// 브로드캐스트 채널 발신자
    sender: broadcast::Sender<PluginEvent>,

    /// 등록된 핸들러
    handlers: Arc<RwLock<HashMap<String, Arc<dyn PluginEventHandler>>>>,

    /// 이벤트 히스토리 (최근 N개)
    history: Arc<Mutex<VecDeque<PluginEvent>>>,

    /// 히스토리 최대 크기
    history_size: usize,
}

impl EventBus {
    /// 새 이벤트 버스 생성
    pub fn new() -> Self {
        Self::with_capacity(256, 100)
    }

    /// 용량 지정하여 생성
    pub fn with_capacity(channel_capacity: usize, history_size: usize) -> Self {
        let (sender, _) = broadcast::channel(channel_capacity.max(1));
        Self {
            sender,
            handlers: Arc::new(RwLock::new(HashMap::new())),
            history: Arc::new(Mutex::new(VecDeque::with_capacity(history_size))),
            history_size,
        }
    }

    /// 이벤트 핸들러 등록 (같은 이름은 교체)
    pub fn register_handler(&self, handler: Arc<dyn PluginEventHandler>) {
        let name = handler.name().to_string();
        self.handlers.write().insert(name, handler);
    }

    /// 이벤트 핸들러 제거
    pub fn unregister_handler(&self, name: &str) {
        self.handlers.write().remove(name);
    }

    /// 이벤트 발행
    pub fn publish(&self, event: PluginEvent) {
        debug!("Publishing event: {} ({})", event.kind, event.subject);

        // 히스토리에 추가
        if self.history_size > 0 {
            let mut history = self.history.lock();
            if history.len() >= self.history_size {
                history.pop_front();
            }
            history.push_back(event.clone());
        }

        // 핸들러 호출
        let handlers: Vec<_> = self.handlers.read().values().cloned().collect();
        for handler in handlers {
            let interested = handler.interested_events();
            if interested.is_empty() || interested.contains(&event.kind) {
                handler.handle(&event);
            }
        }

        // 브로드캐스트 (구독자가 없어도 OK)
        let _ = self.sender.send(event);
    }

    /// 이벤트 구독
    pub fn subscribe(&self) -> broadcast::Receiver<PluginEvent> {
        self.sender.subscribe()
    }

    /// 이벤트 히스토리 조회
    pub fn history(&self) -> Vec<PluginEvent> {
        self.history.lock().iter().cloned().collect()
    }

    /// 특정 종류의 이벤트 히스토리 조회
    pub fn history_by_kind(&self, kind: EventKind) -> Vec<PluginEvent> {
        self.history
            .lock()
            .iter()
            .filter(|e| e.kind == kind)
            .cloned()
            .collect()
    }

    /// 히스토리 클리어
    pub fn clear_history(&self) {
        self.history.lock().clear();
    }

    /// 등록된 핸들러 수
    pub fn handler_count(&self) -> usize {
        self.handlers.read().len()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("handlers", &self.handler_count())
            .field("history_size", &self.history_size)
            .finish()
    }
}
