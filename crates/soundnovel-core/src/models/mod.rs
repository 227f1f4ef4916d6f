//! SoundNovel 도메인 모델.
//!
//! 환경설정, 북마크, 챕터 카탈로그, 마커, 내비게이션 라우트, 에셋 주소를 정의한다.

pub mod asset;
pub mod bookmark;
pub mod chapter;
pub mod marker;
pub mod navigation;
pub mod settings;
