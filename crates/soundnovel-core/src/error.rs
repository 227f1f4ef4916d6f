//! SoundNovel 핵심 에러 타입.
//!
//! 모든 어댑터 crate는 자체 에러를 이 타입으로 변환해 반환한다.
//! 리더 경로(스캐너/컨트롤러/라우터)에서는 대부분 로그 후 기본값으로 강등된다.

use thiserror::Error;

/// 코어 레이어 에러.
#[derive(Debug, Error)]
pub enum CoreError {
    /// JSON 직렬화/역직렬화 실패
    #[error("직렬화 에러: {0}")]
    Serialization(#[from] serde_json::Error),

    /// 설정값 오류
    #[error("설정 에러: {0}")]
    Config(String),

    /// 필드 유효성 검증 실패
    #[error("유효성 검증 실패: {field}: {message}")]
    Validation {
        /// 검증 실패한 필드명
        field: String,
        /// 실패 사유
        message: String,
    },

    /// 리소스를 찾을 수 없음
    #[error("{resource_type} 미발견: {id}")]
    NotFound {
        /// 리소스 종류 (예: "Chapter")
        resource_type: String,
        /// 리소스 식별자
        id: String,
    },

    /// 영구 저장 매체 에러 (환경설정/북마크)
    #[error("저장소 에러: {0}")]
    Storage(String),

    /// 재생 거부 또는 실패 (오디오 출력 장치)
    #[error("재생 실패: {0}")]
    Playback(String),

    /// 콘텐츠 카탈로그 로드 실패
    #[error("콘텐츠 에러: {0}")]
    Content(String),

    /// I/O 에러
    #[error("I/O 에러: {0}")]
    Io(#[from] std::io::Error),

    /// 내부 에러 (예상치 못한 상황)
    #[error("내부 에러: {0}")]
    Internal(String),
}

impl CoreError {
    /// 유효성 검증 에러 생성 헬퍼
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }
}
