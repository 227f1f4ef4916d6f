//! 영구 저장 포트.
//!
//! 환경설정과 북마크는 서로 다른 매체에 저장된다.
//! 구현: `soundnovel-storage` crate (JSON 파일, SQLite, 인메모리)

use std::time::Duration;

use crate::error::CoreError;

/// 환경설정 저장 매체: 문자열 키/값 (값은 JSON 문자열)
///
/// 첫 실행이나 외부 삭제로 값이 없을 수 있다.
pub trait PreferenceStorage: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, CoreError>;

    fn set(&self, key: &str, value: &str) -> Result<(), CoreError>;
}

/// 북마크 저장 매체: 단일 항목, 만료는 매체가 직접 처리
pub trait BookmarkStorage: Send + Sync {
    /// 항목 기록 (기존 항목 교체). `max_age` 이후에는 조회되지 않아야 한다.
    fn put(&self, value: &str, max_age: Duration) -> Result<(), CoreError>;

    /// 만료되지 않은 항목 조회
    fn get(&self) -> Result<Option<String>, CoreError>;

    fn remove(&self) -> Result<(), CoreError>;
}
