//! # soundnovel-content
//!
//! 콘텐츠 어댑터.
//! 챕터 카탈로그(`chapters.json`)를 읽어 `ChapterCatalog`로 만들고,
//! 챕터 마크업에서 멀티미디어 마커를 추출한다.
//!
//! ## 모듈
//! - `catalog`: 카탈로그 파싱 + 파일 카탈로그 (ContentSource 구현)
//! - `markers`: 마크업 → 마커 목록
//! - `preload`: 로컬 에셋 미리 읽기 (AssetPreloader 구현)
//! - `http`: 원격 카탈로그/에셋 (`http` feature)

pub mod catalog;
pub mod markers;
pub mod preload;

#[cfg(feature = "http")]
pub mod http;
