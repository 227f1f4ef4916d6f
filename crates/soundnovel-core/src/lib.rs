//! # soundnovel-core
//!
//! SoundNovel 도메인 모델, 포트(trait) 정의, 에러 타입.
//! 모든 크레이트가 공유하는 핵심 타입과 인터페이스를 제공한다.
//!
//! ## 구조
//!
//! - [`models`]: 도메인 데이터 구조체 (설정, 북마크, 챕터, 마커, 라우트)
//! - [`ports`]: Hexagonal Architecture 포트 인터페이스
//! - [`error`]: 핵심 에러 타입 (thiserror)
//! - [`config`]: 런타임 설정 구조체 (타이밍, 경로)
//! - [`config_manager`]: 설정 파일 관리 (로드/저장)
//! - [`settings_store`]: 사용자 환경설정 저장소
//! - [`bookmark_store`]: 북마크 저장소
//! - [`timer`]: 취소 가능한 예약 작업 슬롯

pub mod bookmark_store;
pub mod config;
pub mod config_manager;
pub mod error;
pub mod models;
pub mod ports;
pub mod settings_store;
pub mod timer;

#[cfg(test)]
mod tests {
    use crate::models::bookmark::Bookmark;
    use crate::models::settings::{MusicMode, Settings};

    #[test]
    fn settings_serde_roundtrip() {
        let mut settings = Settings::default();
        settings.music_mode = MusicMode::ChapterDisabled;
        settings.disabled_chapters.insert(3);
        settings.disabled_chapters.insert(1);

        let json = serde_json::to_value(&settings).unwrap();
        assert_eq!(json["musicMode"], "chapter-disabled");
        assert_eq!(json["disabledChapters"], serde_json::json!([1, 3]));

        let restored = Settings::merged(json.as_object().unwrap());
        assert_eq!(restored, settings);
    }

    #[test]
    fn bookmark_encoding_roundtrip() {
        let bookmark = Bookmark::new(2, "The Library | East Wing");
        let encoded = bookmark.encode();
        assert_eq!(encoded, "2|The%20Library%20%7C%20East%20Wing");
        assert_eq!(Bookmark::decode(&encoded), Some(bookmark));
    }

    #[test]
    fn config_defaults() {
        let config = crate::config::ReaderConfig::default_config();
        assert_eq!(config.audio.fade_interval_ms, 50);
        assert_eq!(config.timing.reveal_delay_ms, 300);
        assert_eq!(config.timing.auto_bookmark_delay_ms, 600);
        assert_eq!(config.storage.bookmark_max_age_days, 30);
    }
}
