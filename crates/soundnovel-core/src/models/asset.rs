//! 에셋 주소 해석.
//!
//! 마커의 `data-src`는 대부분 상대 경로다. 같은 음악인지 판단하거나
//! 미리 읽기 대상을 정할 때는 기준 URL로 해석한 절대 주소를 쓴다.

use url::Url;

use crate::error::CoreError;

/// 상대 에셋 경로 → 절대 주소 변환기
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetBase {
    base: Url,
}

impl AssetBase {
    /// 기준 URL 파싱. 디렉토리로 취급하도록 끝에 `/`를 보장한다.
    pub fn parse(base: &str) -> Result<Self, CoreError> {
        let mut raw = base.trim().to_string();
        if !raw.ends_with('/') {
            raw.push('/');
        }
        let base = Url::parse(&raw)
            .map_err(|e| CoreError::Config(format!("에셋 기준 URL 파싱 실패: {base}: {e}")))?;
        Ok(Self { base })
    }

    /// 로컬 디렉토리를 기준으로 생성
    pub fn from_dir(dir: &std::path::Path) -> Result<Self, CoreError> {
        let base = Url::from_directory_path(dir).map_err(|()| {
            CoreError::Config(format!("절대 경로가 아닙니다: {}", dir.display()))
        })?;
        Ok(Self { base })
    }

    pub fn as_url(&self) -> &Url {
        &self.base
    }

    /// 절대 주소로 해석. 해석할 수 없는 값은 그대로 반환한다.
    pub fn resolve(&self, src: &str) -> String {
        match self.base.join(src.trim()) {
            Ok(url) => url.to_string(),
            Err(_) => src.to_string(),
        }
    }

    /// `file://` 주소면 로컬 경로로 변환
    pub fn local_path(resolved: &str) -> Option<std::path::PathBuf> {
        Url::parse(resolved)
            .ok()
            .filter(|url| url.scheme() == "file")
            .and_then(|url| url.to_file_path().ok())
    }
}
