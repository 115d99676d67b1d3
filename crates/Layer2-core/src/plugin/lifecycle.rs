//! Lifecycle Controller - 등록된 플러그인의 활성화/비활성화
//!
//! 활성화는 등록 순서, 비활성화는 역순(스택)으로 진행합니다.
//! 한 플러그인의 실패는 수집될 뿐 나머지 플러그인 처리를 막지 않으며,
//! 레코드는 절대 전이 중 상태(`Activating`/`Deactivating`)에 남지 않습니다.

use super::batch::BatchResult;
use super::error::{panic_message, PluginError};
use super::events::{EventBus, EventKind, PluginEvent};
use super::registry::PluginRegistry;
use super::traits::LifecycleState;
use futures::future::BoxFuture;
use futures::FutureExt;
use std::collections::HashSet;
use std::panic::AssertUnwindSafe;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// 라이프사이클 컨트롤러
#[derive(Debug, Default)]
pub struct LifecycleController {
    /// `activate_all`에서 건너뛸 플러그인
    disabled: HashSet<String>,

    /// activate/deactivate 호출당 제한 시간
    timeout: Option<Duration>,

    /// 이벤트 버스
    events: EventBus,
}

impl LifecycleController {
    pub fn new(events: EventBus) -> Self {
        Self {
            disabled: HashSet::new(),
            timeout: None,
            events,
        }
    }

    /// 비활성화 목록 설정
    pub fn with_disabled<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.disabled = names.into_iter().map(Into::into).collect();
        self
    }

    /// 호출당 제한 시간 설정
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn is_disabled(&self, name: &str) -> bool {
        self.disabled.contains(name)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    // ========================================================================
    // 배치 작업
    // ========================================================================

    /// `Discovered`/`Deactivated` 상태의 모든 플러그인을 등록 순서대로 활성화
    pub async fn activate_all(&self, registry: &mut PluginRegistry) -> BatchResult {
        let targets: Vec<String> = registry
            .all()
            .into_iter()
            .filter(|record| record.state().is_activatable())
            .map(|record| record.name().to_string())
            .collect();

        let mut result = BatchResult::new();

        for name in targets {
            if self.is_disabled(&name) {
                debug!("Skipping disabled plugin: {}", name);
                continue;
            }

            match self.activate(registry, &name).await {
                Ok(()) => result.push_success(name),
                Err(e) => result.push_failure(name, e),
            }
        }

        info!("Activation pass finished: {}", result);
        result
    }

    /// `Active` 상태의 모든 플러그인을 등록 역순으로 비활성화
    pub async fn deactivate_all(&self, registry: &mut PluginRegistry) -> BatchResult {
        let targets: Vec<String> = registry
            .all()
            .into_iter()
            .rev()
            .filter(|record| record.state() == LifecycleState::Active)
            .map(|record| record.name().to_string())
            .collect();

        let mut result = BatchResult::new();

        for name in targets {
            match self.deactivate(registry, &name).await {
                Ok(()) => result.push_success(name),
                Err(e) => result.push_failure(name, e),
            }
        }

        info!("Deactivation pass finished: {}", result);
        result
    }

    // ========================================================================
    // 개별 작업
    // ========================================================================

    /// 플러그인 하나 활성화
    ///
    /// 실패하면 레코드는 `Deactivated`로 돌아갑니다. 비활성화 목록은 적용되지 않습니다.
    pub async fn activate(&self, registry: &mut PluginRegistry, name: &str) -> Result<(), PluginError> {
        let record = registry
            .get(name)
            .ok_or_else(|| PluginError::NotFound(name.to_string()))?;

        if !record.state().is_activatable() {
            return Err(PluginError::InvalidState {
                name: name.to_string(),
                state: record.state(),
                action: "activate",
            });
        }

        let instance = record.instance().clone();
        registry.transition(name, LifecycleState::Activating)?;

        match self.invoke(name, instance.activate()).await {
            Ok(()) => {
                registry.transition(name, LifecycleState::Active)?;
                info!("Plugin {} activated", name);
                self.events.publish(PluginEvent::new(EventKind::Activated, name));
                Ok(())
            }
            Err(source) => {
                registry.transition(name, LifecycleState::Deactivated)?;
                error!("Plugin {} failed to activate: {}", name, source);
                self.events.publish(
                    PluginEvent::new(EventKind::ActivationFailed, name).with_detail(source.to_string()),
                );
                Err(PluginError::Activation {
                    name: name.to_string(),
                    source,
                })
            }
        }
    }

    /// 플러그인 하나 비활성화
    ///
    /// 호출 결과와 관계없이 레코드는 `Deactivated`로 끝납니다.
    pub async fn deactivate(&self, registry: &mut PluginRegistry, name: &str) -> Result<(), PluginError> {
        let record = registry
            .get(name)
            .ok_or_else(|| PluginError::NotFound(name.to_string()))?;

        if record.state() != LifecycleState::Active {
            return Err(PluginError::InvalidState {
                name: name.to_string(),
                state: record.state(),
                action: "deactivate",
            });
        }

        let instance = record.instance().clone();
        registry.transition(name, LifecycleState::Deactivating)?;

        let outcome = self.invoke(name, instance.deactivate()).await;
        registry.transition(name, LifecycleState::Deactivated)?;

        match outcome {
            Ok(()) => {
                info!("Plugin {} deactivated", name);
                self.events.publish(PluginEvent::new(EventKind::Deactivated, name));
                Ok(())
            }
            Err(source) => {
                warn!("Plugin {} failed to deactivate cleanly: {}", name, source);
                self.events.publish(
                    PluginEvent::new(EventKind::DeactivationFailed, name).with_detail(source.to_string()),
                );
                Err(PluginError::Deactivation {
                    name: name.to_string(),
                    source,
                })
            }
        }
    }

    /// 라이프사이클 호출 (panic과 시간 초과는 호출 실패로 변환)
    async fn invoke(
        &self,
        name: &str,
        call: BoxFuture<'_, plughost_foundation::Result<()>>,
    ) -> plughost_foundation::Result<()> {
        let guarded = AssertUnwindSafe(call).catch_unwind();

        let outcome = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, guarded).await {
                Ok(outcome) => outcome,
                Err(_) => {
                    return Err(plughost_foundation::Error::Timeout(format!(
                        "plugin {} did not return within {}ms",
                        name,
                        limit.as_millis()
                    )))
                }
            },
            None => guarded.await,
        };

        outcome.unwrap_or_else(|payload| {
            Err(plughost_foundation::Error::plugin(panic_message(payload.as_ref())))
        })
    }
}
