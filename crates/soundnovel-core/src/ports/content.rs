//! 콘텐츠/에셋 포트.
//!
//! 구현: `soundnovel-content` crate (파일, HTTP)

use async_trait::async_trait;

use crate::error::CoreError;
use crate::models::chapter::ChapterCatalog;

/// 챕터 카탈로그 제공자: 세션당 한 번 호출된다
#[async_trait]
pub trait ContentSource: Send + Sync {
    async fn fetch_catalog(&self) -> Result<ChapterCatalog, CoreError>;
}

/// 다음 챕터 에셋 미리 읽기 (실패해도 리더 동작에 영향 없음)
#[async_trait]
pub trait AssetPreloader: Send + Sync {
    async fn preload(&self, uri: &str) -> Result<(), CoreError>;
}
