//! # soundnovel-reader
//!
//! 리더 세션 계층.
//! 라우터가 위치 표시자로 화면을 정하고, 컨트롤러가 챕터를 불러와
//! 배경 → 본문 공개/음악 → 내비게이션/미리 읽기 순서로 진행하며,
//! 스캐너가 화면에 들어온 마커를 한 번씩만 발동시킨다.
//!
//! ## 모듈
//! - `scanner`: 마커 가시성 → 1회 발동
//! - `controller`: 현재 챕터 상태와 진입 시퀀스
//! - `router`: 위치 표시자 → 화면

pub mod controller;
pub mod router;
pub mod scanner;

#[cfg(test)]
pub(crate) mod testing;

pub use controller::{ChapterSessionController, ControllerDeps, SessionTiming};
pub use router::NavigationRouter;
pub use scanner::TriggerScanner;
