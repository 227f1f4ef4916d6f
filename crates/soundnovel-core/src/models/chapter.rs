//! 챕터 카탈로그 모델.
//!
//! 카탈로그는 세션당 한 번 가져오며 이후 읽기 전용으로 공유된다.
//! 챕터 존재 여부와 이전/다음 경계의 기준이 된다.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 챕터 하나 (제목 + 마크업 조각)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChapterData {
    pub title: String,
    pub content: String,
}

/// 챕터 카탈로그: 번호별 챕터와 예약된 `about` 항목
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChapterCatalog {
    chapters: BTreeMap<u32, ChapterData>,
    about: Option<ChapterData>,
}

impl ChapterCatalog {
    pub fn new(chapters: BTreeMap<u32, ChapterData>, about: Option<ChapterData>) -> Self {
        Self { chapters, about }
    }

    pub fn get(&self, chapter_id: u32) -> Option<&ChapterData> {
        self.chapters.get(&chapter_id)
    }

    pub fn contains(&self, chapter_id: u32) -> bool {
        self.chapters.contains_key(&chapter_id)
    }

    pub fn about(&self) -> Option<&ChapterData> {
        self.about.as_ref()
    }

    /// 바로 앞 챕터 번호 (첫 챕터면 `None`)
    pub fn previous(&self, chapter_id: u32) -> Option<u32> {
        self.chapters
            .range(..chapter_id)
            .next_back()
            .map(|(id, _)| *id)
    }

    /// 바로 다음 챕터 번호 (마지막 챕터면 `None`)
    pub fn next(&self, chapter_id: u32) -> Option<u32> {
        self.chapters
            .range(chapter_id.saturating_add(1)..)
            .next()
            .map(|(id, _)| *id)
            .filter(|id| *id != chapter_id)
    }

    pub fn first_id(&self) -> Option<u32> {
        self.chapters.keys().next().copied()
    }

    pub fn ids(&self) -> impl Iterator<Item = u32> + '_ {
        self.chapters.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.chapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chapters.is_empty()
    }

    /// 챕터 제목 (없으면 `Chapter N`)
    pub fn title_of(&self, chapter_id: u32) -> String {
        self.get(chapter_id)
            .map(|c| c.title.trim())
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("Chapter {chapter_id}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog(ids: &[u32]) -> ChapterCatalog {
        let chapters = ids
            .iter()
            .map(|id| {
                (
                    *id,
                    ChapterData {
                        title: format!("제{id}장"),
                        content: String::new(),
                    },
                )
            })
            .collect();
        ChapterCatalog::new(chapters, None)
    }

    #[test]
    fn neighbours_follow_catalog_order() {
        let catalog = catalog(&[1, 2, 3, 5]);
        assert_eq!(catalog.previous(1), None);
        assert_eq!(catalog.previous(3), Some(2));
        assert_eq!(catalog.next(3), Some(5));
        assert_eq!(catalog.next(5), None);
        assert_eq!(catalog.next(u32::MAX), None);
    }

    #[test]
    fn title_falls_back_to_chapter_number() {
        let mut chapters = BTreeMap::new();
        chapters.insert(
            7,
            ChapterData {
                title: "  ".to_string(),
                content: String::new(),
            },
        );
        let catalog = ChapterCatalog::new(chapters, None);
        assert_eq!(catalog.title_of(7), "Chapter 7");
        assert_eq!(catalog.title_of(8), "Chapter 8");
    }
}
