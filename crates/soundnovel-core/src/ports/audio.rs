//! 오디오 출력 포트.
//!
//! 논리 채널 두 개(배경 음악, 효과음)가 각각 하나의 `AudioChannel`을 가진다.
//! 구현: `soundnovel-player::null` (로그 전용), `soundnovel-app` (rodio, `rodio` feature)

use crate::error::CoreError;

/// 재생 종료 핸들러 (1회성)
pub type EndedHandler = Box<dyn FnOnce() + Send + 'static>;

/// 단일 오디오 채널 인터페이스
///
/// 상태 판단은 모두 엔진이 하며 채널은 명령만 수행한다.
pub trait AudioChannel: Send + Sync {
    /// 재생 소스 교체 (`None`이면 소스 해제)
    fn set_source(&self, src: Option<&str>);

    /// 재생 시작. 호스트 환경이 거부하면 `CoreError::Playback`.
    fn play(&self) -> Result<(), CoreError>;

    /// 일시 정지 (재생 위치 유지)
    fn pause(&self);

    /// 재생 위치를 처음으로
    fn seek_start(&self);

    /// 볼륨 설정 (0.0~1.0)
    fn set_volume(&self, volume: f32);

    /// 반복 재생 설정
    fn set_loop(&self, looping: bool);

    /// 자연 종료 시 한 번 호출될 핸들러 등록. 이전 핸들러는 교체된다.
    fn on_ended(&self, handler: Option<EndedHandler>);
}
