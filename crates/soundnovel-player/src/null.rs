//! 로그 전용 오디오 채널.
//!
//! 출력 장치 없이 엔진을 구동할 때 쓰는 `AudioChannel` 구현.
//! 명령을 기록만 하고, 자연 종료는 `finish()`로 흉내 낸다.

use parking_lot::Mutex;
use serde::Serialize;
use soundnovel_core::error::CoreError;
use soundnovel_core::ports::audio::{AudioChannel, EndedHandler};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tracing::debug;

/// 채널 상태 스냅샷
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChannelSnapshot {
    pub source: Option<String>,
    pub volume: f32,
    pub looping: bool,
    pub playing: bool,
    /// 재생 시작 횟수 (누적)
    pub plays: u64,
}

/// 로그 전용 채널
pub struct NullChannel {
    name: &'static str,
    state: Mutex<ChannelSnapshot>,
    ended: Mutex<Option<EndedHandler>>,
    volume_writes: AtomicU64,
    deny_playback: AtomicBool,
}

impl NullChannel {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            state: Mutex::new(ChannelSnapshot {
                volume: 1.0,
                ..Default::default()
            }),
            ended: Mutex::new(None),
            volume_writes: AtomicU64::new(0),
            deny_playback: AtomicBool::new(false),
        }
    }

    pub fn snapshot(&self) -> ChannelSnapshot {
        self.state.lock().clone()
    }

    /// 지금까지 `set_volume` 호출 횟수
    pub fn volume_writes(&self) -> u64 {
        self.volume_writes.load(Ordering::SeqCst)
    }

    /// 이후 `play()`를 거부하도록 설정 (사용자 상호작용 전 자동재생 차단 흉내)
    pub fn deny_playback(&self, deny: bool) {
        self.deny_playback.store(deny, Ordering::SeqCst);
    }

    /// 자연 종료 흉내. 반복 재생 중이면 아무 일도 없다.
    ///
    /// 핸들러가 등록되어 있었으면 true.
    pub fn finish(&self) -> bool {
        {
            let mut state = self.state.lock();
            if !state.playing || state.looping {
                return false;
            }
            state.playing = false;
        }
        debug!("[{}] 재생 종료", self.name);
        // 핸들러 실행 중 채널 잠금을 잡지 않도록 먼저 꺼낸다
        let handler = self.ended.lock().take();
        match handler {
            Some(handler) => {
                handler();
                true
            }
            None => false,
        }
    }
}

impl AudioChannel for NullChannel {
    fn set_source(&self, src: Option<&str>) {
        let mut state = self.state.lock();
        state.source = src.map(str::to_string);
        state.playing = false;
        debug!("[{}] 소스: {:?}", self.name, src);
    }

    fn play(&self) -> Result<(), CoreError> {
        if self.deny_playback.load(Ordering::SeqCst) {
            return Err(CoreError::Playback(format!("[{}] 재생 거부됨", self.name)));
        }
        let mut state = self.state.lock();
        if state.source.is_none() {
            return Err(CoreError::Playback(format!("[{}] 소스 없음", self.name)));
        }
        state.playing = true;
        state.plays += 1;
        debug!("[{}] 재생: {:?}", self.name, state.source);
        Ok(())
    }

    fn pause(&self) {
        self.state.lock().playing = false;
        debug!("[{}] 일시 정지", self.name);
    }

    fn seek_start(&self) {
        debug!("[{}] 처음으로", self.name);
    }

    fn set_volume(&self, volume: f32) {
        self.state.lock().volume = volume.clamp(0.0, 1.0);
        self.volume_writes.fetch_add(1, Ordering::SeqCst);
    }

    fn set_loop(&self, looping: bool) {
        self.state.lock().looping = looping;
    }

    fn on_ended(&self, handler: Option<EndedHandler>) {
        *self.ended.lock() = handler;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn play_requires_source() {
        let channel = NullChannel::new("test");
        assert!(matches!(channel.play(), Err(CoreError::Playback(_))));

        channel.set_source(Some("a.mp3"));
        channel.play().unwrap();
        assert!(channel.snapshot().playing);
        assert_eq!(channel.snapshot().plays, 1);
    }

    #[test]
    fn finish_fires_handler_once() {
        let channel = NullChannel::new("test");
        let hits = Arc::new(AtomicU64::new(0));
        let counter = hits.clone();
        channel.on_ended(Some(Box::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        })));

        channel.set_source(Some("a.mp3"));
        channel.play().unwrap();
        assert!(channel.finish());
        assert!(!channel.finish());
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn looping_channel_never_finishes() {
        let channel = NullChannel::new("test");
        channel.set_source(Some("a.mp3"));
        channel.set_loop(true);
        channel.play().unwrap();
        assert!(!channel.finish());
        assert!(channel.snapshot().playing);
    }

    #[test]
    fn denied_playback() {
        let channel = NullChannel::new("test");
        channel.set_source(Some("a.mp3"));
        channel.deny_playback(true);
        assert!(channel.play().is_err());
        assert!(!channel.snapshot().playing);
    }
}
