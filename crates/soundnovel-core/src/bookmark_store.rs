//! 북마크 저장소.
//!
//! 북마크는 하나만 존재하며 마지막 기록이 이긴다.
//! 만료(30일)는 저장 매체가 직접 처리하므로 여기서는 다시 확인하지 않는다.

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::CoreError;
use crate::models::bookmark::{Bookmark, BOOKMARK_MAX_AGE};
use crate::ports::storage::BookmarkStorage;

/// 북마크 저장소
pub struct BookmarkStore {
    storage: Arc<dyn BookmarkStorage>,
    max_age: Duration,
}

impl BookmarkStore {
    /// 기본 유효 기간(30일)으로 생성
    pub fn new(storage: Arc<dyn BookmarkStorage>) -> Self {
        Self::with_max_age(storage, BOOKMARK_MAX_AGE)
    }

    pub fn with_max_age(storage: Arc<dyn BookmarkStorage>, max_age: Duration) -> Self {
        Self { storage, max_age }
    }

    /// 북마크 기록 (기존 항목 교체)
    pub fn save(&self, chapter_id: u32, title: &str) -> Result<Bookmark, CoreError> {
        let bookmark = Bookmark::new(chapter_id, title);
        self.storage.put(&bookmark.encode(), self.max_age)?;
        info!("북마크 저장: {}장 \"{}\"", chapter_id, bookmark.title);
        Ok(bookmark)
    }

    /// 유효한 북마크 조회. 없거나 읽을 수 없거나 손상되었으면 `None`.
    pub fn read(&self) -> Option<Bookmark> {
        let raw = match self.storage.get() {
            Ok(raw) => raw?,
            Err(e) => {
                warn!("북마크 읽기 실패: {e}");
                return None;
            }
        };
        let bookmark = Bookmark::decode(&raw);
        if bookmark.is_none() {
            debug!("손상된 북마크 무시: {raw}");
        }
        bookmark
    }

    /// 북마크 삭제
    pub fn clear(&self) -> Result<(), CoreError> {
        self.storage.remove()?;
        info!("북마크 삭제");
        Ok(())
    }
}
