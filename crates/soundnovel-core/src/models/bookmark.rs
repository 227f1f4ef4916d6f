//! 북마크 모델.
//!
//! 저장 형식: `chapterId|urlEncodedTitle` 단일 문자열.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// 북마크 유효 기간 (30일)
pub const BOOKMARK_MAX_AGE: Duration = Duration::from_secs(30 * 24 * 60 * 60);

/// 마지막으로 읽은 위치
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bookmark {
    pub chapter_id: u32,
    pub title: String,
}

impl Bookmark {
    pub fn new(chapter_id: u32, title: impl Into<String>) -> Self {
        Self {
            chapter_id,
            title: title.into(),
        }
    }

    /// 저장용 문자열로 인코딩
    pub fn encode(&self) -> String {
        format!("{}|{}", self.chapter_id, urlencoding::encode(&self.title))
    }

    /// 저장된 문자열 디코딩. 형식이 맞지 않으면 `None`.
    pub fn decode(raw: &str) -> Option<Self> {
        let (chapter, title) = raw.trim().split_once('|')?;
        let chapter_id = match chapter.parse::<u32>() {
            Ok(id) => id,
            Err(_) => {
                debug!("북마크 챕터 번호 파싱 실패: {chapter}");
                return None;
            }
        };
        let title = match urlencoding::decode(title) {
            Ok(title) => title.into_owned(),
            Err(e) => {
                debug!("북마크 제목 디코딩 실패: {e}");
                return None;
            }
        };
        Some(Self { chapter_id, title })
    }
}
