//! 인메모리 저장 매체.
//!
//! 데이터 디렉토리 없이 실행할 때(`--ephemeral`)와 테스트에서 사용한다.

use parking_lot::Mutex;
use soundnovel_core::error::CoreError;
use soundnovel_core::ports::storage::{BookmarkStorage, PreferenceStorage};
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// 인메모리 환경설정 매체
#[derive(Default)]
pub struct MemoryPreferences {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryPreferences {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStorage for MemoryPreferences {
    fn get(&self, key: &str) -> Result<Option<String>, CoreError> {
        Ok(self.entries.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), CoreError> {
        self.entries.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// 인메모리 북마크 매체 (프로세스 단조 시계 기준 만료)
#[derive(Default)]
pub struct MemoryBookmarkStorage {
    entry: Mutex<Option<(String, Instant)>>,
}

impl MemoryBookmarkStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BookmarkStorage for MemoryBookmarkStorage {
    fn put(&self, value: &str, max_age: Duration) -> Result<(), CoreError> {
        let expires_at = Instant::now() + max_age.min(BOOKMARK_HORIZON_CAP);
        *self.entry.lock() = Some((value.to_string(), expires_at));
        Ok(())
    }

    fn get(&self) -> Result<Option<String>, CoreError> {
        let mut entry = self.entry.lock();
        match entry.as_ref() {
            Some((_, expires_at)) if *expires_at <= Instant::now() => {
                *entry = None;
                Ok(None)
            }
            Some((value, _)) => Ok(Some(value.clone())),
            None => Ok(None),
        }
    }

    fn remove(&self) -> Result<(), CoreError> {
        *self.entry.lock() = None;
        Ok(())
    }
}

/// `Instant` 오버플로 시 상한 (100년)
const BOOKMARK_HORIZON_CAP: Duration = Duration::from_secs(100 * 365 * 86_400);
