//! Batch Result - 여러 항목을 처리하는 작업의 집계 결과
//!
//! 한 항목의 실패가 배치를 중단시키지 않으므로 부분 성공이 정상 결과입니다.

use super::error::PluginError;

/// 실패한 항목 하나
#[derive(Debug)]
pub struct BatchFailure {
    /// 플러그인 이름, 모듈 ID 또는 네임스페이스
    pub subject: String,

    /// 원인
    pub error: PluginError,
}

impl BatchFailure {
    pub fn new(subject: impl Into<String>, error: PluginError) -> Self {
        Self {
            subject: subject.into(),
            error,
        }
    }
}

impl From<PluginError> for BatchFailure {
    fn from(error: PluginError) -> Self {
        let subject = error.subject().unwrap_or_default().to_string();
        Self { subject, error }
    }
}

/// 배치 작업 결과
#[derive(Debug, Default)]
pub struct BatchResult {
    /// 성공한 플러그인 이름 (처리 순서)
    pub succeeded: Vec<String>,

    /// 실패 목록 (처리 순서)
    pub failed: Vec<BatchFailure>,
}

impl BatchResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_success(&mut self, name: impl Into<String>) {
        self.succeeded.push(name.into());
    }

    pub fn push_failure(&mut self, subject: impl Into<String>, error: PluginError) {
        self.failed.push(BatchFailure::new(subject, error));
    }

    /// 실패가 하나도 없는지
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }

    /// 실패 대상 목록
    pub fn failed_subjects(&self) -> Vec<&str> {
        self.failed.iter().map(|f| f.subject.as_str()).collect()
    }

    /// 다른 결과를 뒤에 이어붙임
    pub fn merge(&mut self, other: BatchResult) {
        self.succeeded.extend(other.succeeded);
        self.failed.extend(other.failed);
    }

    /// 처리된 항목 수
    pub fn total(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }
}

impl std::fmt::Display for BatchResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} succeeded", self.succeeded.len())?;
        if !self.succeeded.is_empty() {
            write!(f, " [{}]", self.succeeded.join(", "))?;
        }

        write!(f, ", {} failed", self.failed.len())?;
        if self.has_failures() {
            write!(f, " [{}]", self.failed_subjects().join(", "))?;
        }

        Ok(())
    }
}
