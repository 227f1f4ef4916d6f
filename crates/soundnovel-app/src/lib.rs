//! # soundnovel-app
//!
//! SoundNovel 리더 앱 계층.
//! 어댑터 생성(DI), 셸(히스토리/페이지 로드), 터미널 화면, 세션 라이프사이클.
//!
//! ## 모듈
//! - `lifecycle`: `ReaderSession` (와이어링 + 이벤트 루프), 시그널 대기
//! - `event_bus`: 내부 이벤트 버스
//! - `shell`: 단일/다중 페이지 셸 (`Navigator` 구현)
//! - `console`: 터미널 화면 (`ViewSurface` 구현), 명령 파싱
//! - `audio`: rodio 출력 채널 (`rodio` feature)

#[cfg(feature = "rodio")]
pub mod audio;
pub mod console;
pub mod event_bus;
pub mod lifecycle;
pub mod shell;
