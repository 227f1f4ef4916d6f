//! 원격 카탈로그/에셋 어댑터 (`http` feature).
//!
//! 카탈로그 URL이 `http(s)://`일 때 사용한다. 에셋 미리 읽기는 본문만 받아 버린다.

use async_trait::async_trait;
use soundnovel_core::error::CoreError;
use soundnovel_core::models::chapter::ChapterCatalog;
use soundnovel_core::ports::content::{AssetPreloader, ContentSource};
use std::time::Duration;
use tracing::{debug, info, trace};

use crate::catalog::parse_catalog;

/// 원격 요청 제한 시간
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// HTTP 콘텐츠 클라이언트: `ContentSource` + `AssetPreloader` 포트 구현
pub struct HttpContentSource {
    client: reqwest::Client,
    catalog_url: String,
}

impl HttpContentSource {
    pub fn new(catalog_url: &str) -> Result<Self, CoreError> {
        Self::with_timeout(catalog_url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(catalog_url: &str, timeout: Duration) -> Result<Self, CoreError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CoreError::Content(format!("HTTP 클라이언트 빌드 실패: {e}")))?;

        Ok(Self {
            client,
            catalog_url: catalog_url.to_string(),
        })
    }

    async fn get(&self, url: &str) -> Result<reqwest::Response, CoreError> {
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| CoreError::Content(format!("요청 실패: {url}: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(CoreError::Content(format!("응답 에러 ({status}): {url}")));
        }
        Ok(resp)
    }
}

#[async_trait]
impl ContentSource for HttpContentSource {
    async fn fetch_catalog(&self) -> Result<ChapterCatalog, CoreError> {
        let body = self
            .get(&self.catalog_url)
            .await?
            .text()
            .await
            .map_err(|e| CoreError::Content(format!("카탈로그 본문 읽기 실패: {e}")))?;
        let catalog = parse_catalog(&body)?;
        info!("원격 카탈로그 로드: {} ({}개 챕터)", self.catalog_url, catalog.len());
        Ok(catalog)
    }
}

#[async_trait]
impl AssetPreloader for HttpContentSource {
    async fn preload(&self, uri: &str) -> Result<(), CoreError> {
        if !(uri.starts_with("http://") || uri.starts_with("https://")) {
            trace!("원격 에셋이 아니므로 미리 읽기 생략: {uri}");
            return Ok(());
        }
        let bytes = self
            .get(uri)
            .await?
            .bytes()
            .await
            .map_err(|e| CoreError::Content(format!("에셋 본문 읽기 실패: {uri}: {e}")))?;
        debug!("원격 에셋 미리 읽기 완료: {uri} ({} bytes)", bytes.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fetch_catalog_success() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/chapters.json")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"1": {"title": "One", "content": "<p/>"}}"#)
            .create_async()
            .await;

        let source = HttpContentSource::new(&format!("{}/chapters.json", server.url())).unwrap();
        let catalog = source.fetch_catalog().await.unwrap();
        assert_eq!(catalog.title_of(1), "One");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn fetch_catalog_server_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/chapters.json")
            .with_status(503)
            .create_async()
            .await;

        let source = HttpContentSource::new(&format!("{}/chapters.json", server.url())).unwrap();
        assert!(matches!(
            source.fetch_catalog().await,
            Err(CoreError::Content(_))
        ));
    }

    #[tokio::test]
    async fn preload_downloads_asset() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/assets/a.mp3")
            .with_status(200)
            .with_body("data")
            .create_async()
            .await;

        let source = HttpContentSource::new(&server.url()).unwrap();
        source
            .preload(&format!("{}/assets/a.mp3", server.url()))
            .await
            .unwrap();
        mock.assert_async().await;
    }
}
