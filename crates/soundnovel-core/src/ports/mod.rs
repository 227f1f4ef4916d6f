//! 포트 인터페이스 (trait).
//!
//! Hexagonal Architecture의 포트 레이어.
//! 외부 협력자(오디오 장치, 화면, 저장 매체, 콘텐츠, 내비게이션)를 trait으로 추상화하며,
//! `soundnovel-app`에서 `Arc<dyn T>`로 와이어링한다.
//!
//! 비동기 I/O가 필요한 포트만 `async_trait`을 사용한다.

pub mod audio;
pub mod content;
pub mod navigator;
pub mod storage;
pub mod view;
