//! 로컬 에셋 미리 읽기.
//!
//! `file://` 주소의 에셋을 한 번 읽어 OS 페이지 캐시에 올려 둔다.
//! 다른 스킴은 `http` feature의 어댑터가 담당하므로 여기서는 건너뛴다.

use async_trait::async_trait;
use soundnovel_core::error::CoreError;
use soundnovel_core::models::asset::AssetBase;
use soundnovel_core::ports::content::AssetPreloader;
use tracing::{debug, trace};

/// 로컬 파일 미리 읽기: `AssetPreloader` 포트 구현
#[derive(Debug, Default)]
pub struct FilePreloader;

impl FilePreloader {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl AssetPreloader for FilePreloader {
    async fn preload(&self, uri: &str) -> Result<(), CoreError> {
        let Some(path) = AssetBase::local_path(uri) else {
            trace!("로컬 에셋이 아니므로 미리 읽기 생략: {uri}");
            return Ok(());
        };

        let bytes = tokio::fs::read(&path).await.map_err(|e| {
            CoreError::Content(format!("에셋 미리 읽기 실패: {}: {e}", path.display()))
        })?;
        debug!("에셋 미리 읽기 완료: {} ({} bytes)", path.display(), bytes.len());
        Ok(())
    }
}
