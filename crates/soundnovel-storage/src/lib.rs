//! # soundnovel-storage
//!
//! 로컬 저장소 어댑터.
//! 북마크는 만료 시각을 직접 관리하는 SQLite 매체에,
//! 환경설정은 JSON 파일에 저장한다.
//!
//! ## 모듈
//! - `sqlite`: 북마크 저장 매체 (BookmarkStorage 구현)
//! - `preferences`: 환경설정 파일 (PreferenceStorage 구현)
//! - `memory`: 인메모리 매체 (테스트/임시 실행용)
//! - `migration`: 스키마 마이그레이션

pub mod memory;
pub mod migration;
pub mod preferences;
pub mod sqlite;
