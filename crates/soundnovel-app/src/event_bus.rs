//! 내부 이벤트 버스.
//!
//! `tokio::broadcast` 기반. 셸(위치 변경)과 콘솔 입력(사용자 동작)이 발행하고,
//! 세션 루프가 구독해 라우터/컨트롤러로 전달한다.

use serde_json::Value;
use soundnovel_core::models::marker::MarkerId;
use soundnovel_core::models::navigation::Direction;
use soundnovel_core::models::settings::{MusicMode, SettingKey};
use tokio::sync::broadcast;
use tracing::debug;

/// 히스토리 이동 방향
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryStep {
    Back,
    Forward,
}

/// 내부 앱 이벤트
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// 위치 표시자 변경 (최초 로드, 링크, 히스토리 이동)
    LocationChanged(String),
    /// 사용자가 입력한 위치로 이동 요청 (히스토리에 기록된다)
    Open(String),
    /// 이전/다음 버튼
    Navigate(Direction),
    /// 브라우저 히스토리 앞/뒤
    History(HistoryStep),
    /// 마커 가시 비율 변화
    Visibility { marker: MarkerId, ratio: f32 },
    /// 토글 마커 활성화
    Activate(MarkerId),
    /// 환경설정 변경
    ChangeSetting { key: SettingKey, value: Value },
    /// 음악 모드 선택
    SetMusicMode(MusicMode),
    BookmarkNow,
    ClearBookmark,
    /// 채널 자연 종료 흉내 (로그 전용 채널에서만 의미 있음)
    FinishTrack(Channel),
    Quit,
}

/// 오디오 논리 채널
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Music,
    Effects,
}

/// 내부 이벤트 버스
pub struct EventBus {
    tx: broadcast::Sender<AppEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// 이벤트 발행. 구독자가 없으면 버려진다.
    pub fn publish(&self, event: AppEvent) {
        debug!("이벤트 발행: {event:?}");
        let _ = self.tx.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AppEvent> {
        self.tx.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(128)
    }
}
