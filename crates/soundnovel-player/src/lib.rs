//! # soundnovel-player
//!
//! 오디오 전환 엔진.
//! 배경 음악 채널과 효과음 채널을 하나씩 소유하며, 채널별 상태 머신으로
//! 크로스페이드/정지 페이드/효과음 토글을 수행한다.
//!
//! ## 모듈
//! - `engine`: `AudioEngine` (음악 채널 상태 머신 + 효과음 위임)
//! - `effects`: 효과음 채널 (1회 재생, 토글, 종료 시 표시 복원)
//! - `fade`: 페이드 단계/간격 계산
//! - `null`: 로그 전용 오디오 채널 (출력 장치 없이 실행/테스트)

pub mod effects;
pub mod engine;
pub mod fade;
pub mod null;

pub use engine::{AudioEngine, MusicPhase, MusicSnapshot};

#[cfg(test)]
pub(crate) mod testing;
