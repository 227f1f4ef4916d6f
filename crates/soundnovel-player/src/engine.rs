//! 오디오 전환 엔진.
//!
//! 배경 음악 채널 상태 머신:
//!
//! ```text
//! Idle ──change──▶ Playing ──change──▶ FadingOut ──▶ FadingIn ──▶ Playing
//!                     │  ▲                 │
//!                     │  └──loop on────────┼─────── Ended (소스 유지)
//!                     └──stop──▶ FadingOut ┴──▶ Idle
//! ```
//!
//! 페이드 작업은 채널당 하나(`TimerSlot`)이며 새 요청이 진행 중인 작업을 대체한다.
//! 늦게 깨어난 작업은 세대(generation) 번호가 달라 아무것도 하지 않는다.

use parking_lot::Mutex;
use serde::Serialize;
use soundnovel_core::models::asset::AssetBase;
use soundnovel_core::models::marker::{MarkerId, MarkerKind};
use soundnovel_core::ports::audio::AudioChannel;
use soundnovel_core::ports::view::ViewSurface;
use soundnovel_core::settings_store::SettingsStore;
use soundnovel_core::timer::TimerSlot;
use std::sync::{Arc, Weak};
use tracing::{debug, info, warn};

use crate::effects::{EffectDeck, EffectPhase, ToggleOutcome};
use crate::fade::FadeCadence;

/// 음악 채널 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MusicPhase {
    Idle,
    Playing,
    /// 현재 곡을 줄이는 중 (다음 곡으로 교체하거나 정지)
    FadingOut,
    /// 새 곡을 목표 볼륨까지 올리는 중
    FadingIn,
    /// 반복 없이 끝까지 재생됨. 소스는 유지된다.
    Ended,
}

/// 음악 채널 상태 스냅샷
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MusicSnapshot {
    pub phase: MusicPhase,
    /// 채널에 걸린 소스 (절대 주소)
    pub source: Option<String>,
    /// 페이드 아웃 후 재생할 소스
    pub pending: Option<String>,
    pub volume: f32,
    /// 페이드 작업 진행 여부
    pub fading: bool,
}

#[derive(Debug)]
struct MusicState {
    phase: MusicPhase,
    current: Option<String>,
    pending: Option<String>,
    volume: f32,
    generation: u64,
}

impl MusicState {
    /// 이미 해당 소스로 가고 있는지 (현재 곡이거나 교체 대기 곡)
    fn is_heading_to(&self, resolved: &str) -> bool {
        match self.phase {
            MusicPhase::Idle => false,
            MusicPhase::FadingOut => self.pending.as_deref() == Some(resolved),
            _ => self.current.as_deref() == Some(resolved),
        }
    }
}

struct MusicDeck {
    channel: Arc<dyn AudioChannel>,
    settings: Arc<SettingsStore>,
    cadence: FadeCadence,
    state: Mutex<MusicState>,
    fade: TimerSlot,
}

/// 오디오 전환 엔진: 음악/효과음 채널의 유일한 소유자
pub struct AudioEngine {
    music: Arc<MusicDeck>,
    effects: Arc<EffectDeck>,
    settings: Arc<SettingsStore>,
    assets: AssetBase,
}

impl AudioEngine {
    pub fn new(
        music: Arc<dyn AudioChannel>,
        effects: Arc<dyn AudioChannel>,
        view: Arc<dyn ViewSurface>,
        settings: Arc<SettingsStore>,
        assets: AssetBase,
        cadence: FadeCadence,
    ) -> Self {
        let music = Arc::new(MusicDeck {
            channel: music,
            settings: settings.clone(),
            cadence,
            state: Mutex::new(MusicState {
                phase: MusicPhase::Idle,
                current: None,
                pending: None,
                volume: 0.0,
                generation: 0,
            }),
            fade: TimerSlot::new("음악 페이드"),
        });
        let effects = EffectDeck::new(effects, view, settings.clone(), assets.clone());
        Self {
            music,
            effects,
            settings,
            assets,
        }
    }

    // ============================================================
    // 배경 음악
    // ============================================================

    /// 배경 음악 교체
    ///
    /// 같은 곡(또는 이미 교체 대기 중인 곡)이면 아무것도 하지 않는다.
    /// 재생 중이 아니면 즉시 재생, 재생 중이면 크로스페이드.
    pub fn change_music(&self, src: &str) {
        let resolved = self.assets.resolve(src);
        MusicDeck::change(&self.music, resolved);
    }

    /// 현재 곡을 버리고 처음부터 다시 재생 (음악 모드 재활성화용)
    pub fn restart_music(&self, src: &str) {
        let resolved = self.assets.resolve(src);
        self.music.reset();
        MusicDeck::change(&self.music, resolved);
    }

    /// 페이드 아웃 후 정지, 소스 해제. 이미 정지 상태면 아무것도 하지 않는다.
    pub fn stop_music(&self) {
        MusicDeck::stop(&self.music);
    }

    /// 해당 챕터에서 음악 재생이 허용되는지
    ///
    /// 전역 모드가 꺼져 있으면 항상 false, 아니면 챕터 음소거 여부로 결정한다.
    pub fn is_music_enabled(&self, chapter: Option<u32>) -> bool {
        self.settings.get().music_permitted(chapter)
    }

    pub fn music_snapshot(&self) -> MusicSnapshot {
        let state = self.music.state.lock();
        MusicSnapshot {
            phase: state.phase,
            source: state.current.clone(),
            pending: state.pending.clone(),
            volume: state.volume,
            fading: self.music.fade.is_pending(),
        }
    }

    // ============================================================
    // 효과음
    // ============================================================

    /// 1회 효과음 재생 (재생 중인 효과음은 중단)
    pub fn play_effect(&self, src: &str) -> bool {
        self.effects.play(src)
    }

    /// 토글 컨트롤 활성화
    pub fn toggle_effect(&self, marker: MarkerId, kind: MarkerKind, src: &str) -> ToggleOutcome {
        self.effects.toggle(marker, kind, src)
    }

    pub fn stop_effect(&self) {
        self.effects.stop();
    }

    pub fn effect_phase(&self) -> EffectPhase {
        self.effects.phase()
    }

    pub fn effect_source(&self) -> Option<String> {
        self.effects.source()
    }

    pub fn active_control(&self) -> Option<MarkerId> {
        self.effects.active_control()
    }

    // ============================================================
    // 설정 반영
    // ============================================================

    /// 볼륨/반복 설정을 재생 중인 채널에 즉시 반영 (재생 위치 유지)
    ///
    /// 끝난 곡이 있고 반복이 켜졌으며 재생이 허용되면 처음부터 다시 재생한다.
    pub fn apply_settings(&self, chapter: Option<u32>) {
        MusicDeck::apply_settings(&self.music, chapter);
        self.effects.apply_volume();
    }

    /// 예약된 페이드 중단 + 모든 채널 정지 (세션 종료용)
    pub fn shutdown(&self) {
        self.music.reset();
        self.effects.stop();
    }
}

impl MusicDeck {
    fn change(deck: &Arc<Self>, resolved: String) {
        let mut state = deck.state.lock();
        if state.is_heading_to(&resolved) {
            debug!("같은 음악 요청, 무시: {resolved}");
            return;
        }

        state.generation += 1;
        match state.phase {
            MusicPhase::Idle | MusicPhase::Ended => {
                deck.fade.cancel();
                let gain = deck.settings.get().music_gain();
                if deck.start(&mut state, resolved, gain) {
                    state.phase = MusicPhase::Playing;
                }
            }
            MusicPhase::Playing | MusicPhase::FadingIn | MusicPhase::FadingOut => {
                let generation = state.generation;
                if state.current.as_deref() == Some(resolved.as_str()) {
                    // 다른 곡으로 줄이던 중 원래 곡이 다시 요청됨
                    state.phase = MusicPhase::FadingIn;
                    state.pending = None;
                    deck.register_ended(generation);
                    debug!("페이드 방향 전환: {resolved}");
                    let task_deck = deck.clone();
                    deck.fade
                        .spawn(async move { task_deck.fade_in(generation).await });
                } else {
                    info!("음악 크로스페이드: {:?} → {resolved}", state.current);
                    state.phase = MusicPhase::FadingOut;
                    state.pending = Some(resolved);
                    let task_deck = deck.clone();
                    deck.fade
                        .spawn(async move { task_deck.fade_out(generation).await });
                }
            }
        }
    }

    fn stop(deck: &Arc<Self>) {
        let mut state = deck.state.lock();
        match state.phase {
            MusicPhase::Idle => {}
            MusicPhase::FadingOut if state.pending.is_none() => {
                debug!("이미 정지 중");
            }
            MusicPhase::Ended => {
                drop(state);
                deck.reset();
            }
            MusicPhase::Playing | MusicPhase::FadingIn | MusicPhase::FadingOut => {
                state.generation += 1;
                state.phase = MusicPhase::FadingOut;
                state.pending = None;
                let generation = state.generation;
                info!("음악 정지 (페이드 아웃)");
                let task_deck = deck.clone();
                deck.fade
                    .spawn(async move { task_deck.fade_out(generation).await });
            }
        }
    }

    fn apply_settings(deck: &Arc<Self>, chapter: Option<u32>) {
        let settings = deck.settings.get();
        let mut state = deck.state.lock();
        if state.current.is_none() {
            return;
        }

        deck.channel.set_loop(settings.music_loop);
        match state.phase {
            MusicPhase::Playing => {
                state.volume = settings.music_gain();
                deck.channel.set_volume(state.volume);
            }
            MusicPhase::Ended if settings.music_loop && settings.music_permitted(chapter) => {
                state.generation += 1;
                deck.channel.seek_start();
                deck.channel.set_volume(settings.music_gain());
                match deck.channel.play() {
                    Ok(()) => {
                        state.phase = MusicPhase::Playing;
                        state.volume = settings.music_gain();
                        deck.register_ended(state.generation);
                        info!("반복 재생 활성화, 끝난 곡 다시 재생");
                    }
                    Err(e) => {
                        warn!("반복 재생 시작 실패, 무시: {e}");
                        deck.clear(&mut state);
                    }
                }
            }
            // 페이드 중에는 매 단계 설정을 다시 읽는다
            _ => {}
        }
    }

    /// 소스 교체 후 재생 시작. 실패하면 채널을 비우고 Idle로 둔다.
    fn start(self: &Arc<Self>, state: &mut MusicState, resolved: String, volume: f32) -> bool {
        let looping = self.settings.get().music_loop;
        self.channel.set_source(Some(&resolved));
        self.channel.set_loop(looping);
        self.channel.set_volume(volume);

        match self.channel.play() {
            Ok(()) => {
                info!("음악 재생: {resolved}");
                state.current = Some(resolved);
                state.pending = None;
                state.volume = volume;
                self.register_ended(state.generation);
                true
            }
            Err(e) => {
                warn!("음악 재생 실패, 무시: {resolved}: {e}");
                self.clear(state);
                false
            }
        }
    }

    async fn fade_out(self: Arc<Self>, generation: u64) {
        loop {
            {
                let state = self.state.lock();
                if state.generation != generation {
                    return;
                }
                if state.volume <= 0.0 {
                    break;
                }
            }
            tokio::time::sleep(self.cadence.interval).await;

            let mut state = self.state.lock();
            if state.generation != generation {
                return;
            }
            state.volume = self.cadence.step_down(state.volume);
            self.channel.set_volume(state.volume);
        }

        {
            let mut state = self.state.lock();
            if state.generation != generation {
                return;
            }
            self.channel.pause();
            self.channel.seek_start();
            match state.pending.take() {
                None => {
                    self.clear(&mut state);
                    info!("음악 정지 완료");
                    return;
                }
                Some(next) => {
                    if !self.start(&mut state, next, 0.0) {
                        return;
                    }
                    state.phase = MusicPhase::FadingIn;
                }
            }
        }
        self.fade_in(generation).await;
    }

    async fn fade_in(self: Arc<Self>, generation: u64) {
        loop {
            tokio::time::sleep(self.cadence.interval).await;

            let target = self.settings.get().music_gain();
            let mut state = self.state.lock();
            if state.generation != generation || state.phase != MusicPhase::FadingIn {
                return;
            }
            state.volume = self.cadence.step_up(state.volume, target);
            self.channel.set_volume(state.volume);
            if state.volume >= target {
                state.phase = MusicPhase::Playing;
                debug!("페이드 인 완료: 볼륨 {:.2}", state.volume);
                return;
            }
        }
    }

    /// 페이드 중단 + 채널 비우기 (페이드 없이 즉시)
    fn reset(&self) {
        self.fade.cancel();
        let mut state = self.state.lock();
        state.generation += 1;
        if state.phase != MusicPhase::Idle {
            self.channel.pause();
            self.channel.seek_start();
        }
        self.clear(&mut state);
    }

    fn clear(&self, state: &mut MusicState) {
        self.channel.set_source(None);
        self.channel.on_ended(None);
        state.phase = MusicPhase::Idle;
        state.current = None;
        state.pending = None;
    }

    fn register_ended(self: &Arc<Self>, generation: u64) {
        let deck: Weak<Self> = Arc::downgrade(self);
        self.channel.on_ended(Some(Box::new(move || {
            if let Some(deck) = deck.upgrade() {
                deck.on_ended(generation);
            }
        })));
    }

    fn on_ended(&self, generation: u64) {
        let mut state = self.state.lock();
        if state.generation != generation
            || !matches!(state.phase, MusicPhase::Playing | MusicPhase::FadingIn)
        {
            return;
        }
        state.phase = MusicPhase::Ended;
        info!("음악 재생 종료: {:?}", state.current);
    }
}
