//! 챕터 카탈로그.
//!
//! 카탈로그 형식은 챕터 번호(문자열 키)와 예약 키 `about`을 가진 JSON 객체다.
//!
//! ```json
//! {
//!   "1": { "title": "The Gate", "content": "<div class=\"bg-change\" ...>" },
//!   "about": { "title": "About the Author", "content": "<p>...</p>" }
//! }
//! ```

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Map, Value};
use soundnovel_core::error::CoreError;
use soundnovel_core::models::chapter::{ChapterCatalog, ChapterData};
use soundnovel_core::ports::content::ContentSource;
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// 작가 소개 항목 키
pub const ABOUT_KEY: &str = "about";

#[derive(Deserialize)]
struct RawChapter {
    #[serde(default)]
    title: String,
    #[serde(default)]
    content: String,
}

/// 카탈로그 JSON 파싱
///
/// 최상위가 객체가 아니면 에러. 개별 항목이 잘못되었으면 그 항목만 버린다.
pub fn parse_catalog(json: &str) -> Result<ChapterCatalog, CoreError> {
    let root: Value = serde_json::from_str(json)
        .map_err(|e| CoreError::Content(format!("카탈로그 파싱 실패: {e}")))?;
    let Value::Object(entries) = root else {
        return Err(CoreError::Content(
            "카탈로그 최상위가 객체가 아닙니다".to_string(),
        ));
    };
    Ok(catalog_from_entries(entries))
}

fn catalog_from_entries(entries: Map<String, Value>) -> ChapterCatalog {
    let mut chapters = BTreeMap::new();
    let mut about = None;

    for (key, value) in entries {
        let data = match serde_json::from_value::<RawChapter>(value) {
            Ok(raw) => ChapterData {
                title: raw.title,
                content: raw.content,
            },
            Err(e) => {
                warn!("카탈로그 항목 무시: {key}: {e}");
                continue;
            }
        };

        if key == ABOUT_KEY {
            about = Some(data);
            continue;
        }
        match key.trim().parse::<u32>() {
            Ok(id) if id > 0 => {
                chapters.insert(id, data);
            }
            _ => debug!("챕터 번호가 아닌 카탈로그 키 무시: {key}"),
        }
    }

    ChapterCatalog::new(chapters, about)
}

/// 로컬 파일 카탈로그: `ContentSource` 포트 구현
pub struct FileContentSource {
    path: PathBuf,
}

impl FileContentSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl ContentSource for FileContentSource {
    async fn fetch_catalog(&self) -> Result<ChapterCatalog, CoreError> {
        let json = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            CoreError::Content(format!("카탈로그 읽기 실패: {}: {e}", self.path.display()))
        })?;
        let catalog = parse_catalog(&json)?;
        info!(
            "카탈로그 로드: {} ({}개 챕터)",
            self.path.display(),
            catalog.len()
        );
        Ok(catalog)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SAMPLE: &str = r#"{
        "1": {"title": "The Gate", "content": "<p>one</p>"},
        "2": {"title": "The Library", "content": "<p>two</p>"},
        "10": {"title": "Ten", "content": ""},
        "about": {"title": "About", "content": "<p>author</p>"},
        "draft": {"title": "x", "content": "y"},
        "3": "not an object",
        "0": {"title": "zero", "content": ""}
    }"#;

    #[test]
    fn parses_chapters_and_about() {
        let catalog = parse_catalog(SAMPLE).unwrap();
        assert_eq!(catalog.ids().collect::<Vec<_>>(), vec![1, 2, 10]);
        assert_eq!(catalog.get(2).unwrap().title, "The Library");
        assert_eq!(catalog.about().unwrap().content, "<p>author</p>");
        assert_eq!(catalog.next(2), Some(10));
    }

    #[test]
    fn missing_fields_default_to_empty() {
        let catalog = parse_catalog(r#"{"4": {"content": "<p/>"}}"#).unwrap();
        assert_eq!(catalog.get(4).unwrap().title, "");
        assert_eq!(catalog.title_of(4), "Chapter 4");
    }

    #[test]
    fn non_object_root_is_content_error() {
        assert!(matches!(parse_catalog("[1, 2]"), Err(CoreError::Content(_))));
        assert!(matches!(parse_catalog("{"), Err(CoreError::Content(_))));
    }

    #[tokio::test]
    async fn file_source_reads_catalog() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("chapters.json");
        std::fs::write(&path, SAMPLE).unwrap();

        let catalog = FileContentSource::new(&path).fetch_catalog().await.unwrap();
        assert_eq!(catalog.len(), 3);
    }

    #[tokio::test]
    async fn missing_file_is_content_error() {
        let temp_dir = TempDir::new().unwrap();
        let source = FileContentSource::new(temp_dir.path().join("absent.json"));
        assert!(matches!(
            source.fetch_catalog().await,
            Err(CoreError::Content(_))
        ));
    }
}
