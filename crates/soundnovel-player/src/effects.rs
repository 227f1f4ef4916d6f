//! 효과음 채널.
//!
//! 채널 하나를 자동 효과음과 토글 컨트롤(효과음 버튼, 강조 문구)이 공유한다.
//! 새 재생은 항상 이전 재생을 끊고, 끊긴 컨트롤의 활성 표시는 즉시 복원된다.

use parking_lot::Mutex;
use serde::Serialize;
use soundnovel_core::models::asset::AssetBase;
use soundnovel_core::models::marker::{MarkerId, MarkerKind};
use soundnovel_core::ports::audio::AudioChannel;
use soundnovel_core::ports::view::ViewSurface;
use soundnovel_core::settings_store::SettingsStore;
use std::sync::{Arc, Weak};
use tracing::{debug, warn};

/// 효과음 채널 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EffectPhase {
    Idle,
    Playing,
}

/// 토글 결과
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    Started,
    Stopped,
    /// 재생 시작 실패 (채널은 Idle)
    Failed,
}

#[derive(Debug)]
struct EffectState {
    phase: EffectPhase,
    source: Option<String>,
    /// 재생 중인 토글 컨트롤
    control: Option<(MarkerId, MarkerKind)>,
    generation: u64,
}

/// 효과음 채널 소유자
pub struct EffectDeck {
    channel: Arc<dyn AudioChannel>,
    view: Arc<dyn ViewSurface>,
    settings: Arc<SettingsStore>,
    assets: AssetBase,
    state: Mutex<EffectState>,
}

impl EffectDeck {
    pub fn new(
        channel: Arc<dyn AudioChannel>,
        view: Arc<dyn ViewSurface>,
        settings: Arc<SettingsStore>,
        assets: AssetBase,
    ) -> Arc<Self> {
        Arc::new(Self {
            channel,
            view,
            settings,
            assets,
            state: Mutex::new(EffectState {
                phase: EffectPhase::Idle,
                source: None,
                control: None,
                generation: 0,
            }),
        })
    }

    /// 1회 재생. 재생 중인 효과음은 중단된다.
    pub fn play(self: &Arc<Self>, src: &str) -> bool {
        let resolved = self.assets.resolve(src);
        let mut state = self.state.lock();
        self.interrupt(&mut state);
        self.start(&mut state, resolved, None)
    }

    /// 토글 컨트롤 활성화
    ///
    /// 같은 컨트롤이 재생 중이면 정지하고 처음으로 되돌린다.
    /// 아니면 현재 효과음을 끊고 이 컨트롤의 소스를 재생한다.
    pub fn toggle(self: &Arc<Self>, marker: MarkerId, kind: MarkerKind, src: &str) -> ToggleOutcome {
        let mut state = self.state.lock();

        let same_control = state.control.map(|(id, _)| id) == Some(marker);
        if same_control && state.phase == EffectPhase::Playing {
            self.halt(&mut state);
            debug!("효과음 토글 정지: {marker}");
            return ToggleOutcome::Stopped;
        }

        self.interrupt(&mut state);
        let resolved = self.assets.resolve(src);
        if self.start(&mut state, resolved, Some((marker, kind))) {
            ToggleOutcome::Started
        } else {
            ToggleOutcome::Failed
        }
    }

    /// 재생 중이면 즉시 정지
    pub fn stop(&self) {
        let mut state = self.state.lock();
        if state.phase == EffectPhase::Playing {
            self.halt(&mut state);
        }
    }

    /// 볼륨 변경 반영 (재생 위치 유지)
    pub fn apply_volume(&self) {
        let state = self.state.lock();
        if state.phase == EffectPhase::Playing {
            self.channel.set_volume(self.settings.get().effects_gain());
        }
    }

    pub fn phase(&self) -> EffectPhase {
        self.state.lock().phase
    }

    pub fn source(&self) -> Option<String> {
        self.state.lock().source.clone()
    }

    /// 현재 활성 표시 중인 토글 컨트롤
    pub fn active_control(&self) -> Option<MarkerId> {
        let state = self.state.lock();
        match state.phase {
            EffectPhase::Playing => state.control.map(|(id, _)| id),
            EffectPhase::Idle => None,
        }
    }

    fn start(
        self: &Arc<Self>,
        state: &mut EffectState,
        resolved: String,
        control: Option<(MarkerId, MarkerKind)>,
    ) -> bool {
        state.generation += 1;
        self.channel.set_source(Some(&resolved));
        self.channel.set_loop(false);
        self.channel.set_volume(self.settings.get().effects_gain());

        if let Err(e) = self.channel.play() {
            warn!("효과음 재생 실패, 무시: {resolved}: {e}");
            self.channel.set_source(None);
            state.phase = EffectPhase::Idle;
            state.source = None;
            state.control = None;
            return false;
        }

        state.phase = EffectPhase::Playing;
        state.source = Some(resolved);
        state.control = control;
        if let Some((id, kind)) = control {
            self.view.set_control_active(id, kind, true);
        }
        self.register_ended(state.generation);
        true
    }

    /// 재생 중단 + 토글 컨트롤 표시 복원 (새 재생 직전)
    fn interrupt(&self, state: &mut EffectState) {
        if state.phase == EffectPhase::Playing {
            self.channel.pause();
            self.channel.seek_start();
        }
        self.release_control(state);
    }

    fn halt(&self, state: &mut EffectState) {
        state.generation += 1;
        self.channel.pause();
        self.channel.seek_start();
        self.channel.on_ended(None);
        state.phase = EffectPhase::Idle;
        self.release_control(state);
    }

    fn release_control(&self, state: &mut EffectState) {
        if let Some((id, kind)) = state.control.take() {
            self.view.set_control_active(id, kind, false);
        }
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
        if state.generation != generation || state.phase != EffectPhase::Playing {
            return;
        }
        state.phase = EffectPhase::Idle;
        if let Some((id, kind)) = state.control.take() {
            self.view.set_control_active(id, kind, false);
        }
        debug!("효과음 재생 종료");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::harness;
    use serde_json::json;
    use soundnovel_core::models::settings::SettingKey;

    const BELL: &str = "assets/audio/effects/bell.mp3";
    const CREAK: &str = "assets/audio/effects/creak.mp3";

    #[tokio::test]
    async fn toggle_twice_stops_and_restores_affordance() {
        let h = harness();
        let bell = MarkerId::new(2, 4);

        assert_eq!(
            h.engine.toggle_effect(bell, MarkerKind::SoundEffect, BELL),
            ToggleOutcome::Started
        );
        assert_eq!(h.engine.active_control(), Some(bell));
        assert!(h.effects.snapshot().playing);

        assert_eq!(
            h.engine.toggle_effect(bell, MarkerKind::SoundEffect, BELL),
            ToggleOutcome::Stopped
        );
        assert_eq!(h.view.events(), vec![(bell, true), (bell, false)]);
        assert_eq!(h.engine.effect_phase(), EffectPhase::Idle);
        assert!(!h.effects.snapshot().playing);

        // 정지 후 늦게 도착한 종료 이벤트는 표시를 다시 바꾸지 않는다
        assert!(!h.effects.finish());
        assert_eq!(h.view.events().len(), 2);
    }

    #[tokio::test]
    async fn natural_completion_restores_affordance_once() {
        let h = harness();
        let span = MarkerId::new(1, 2);
        h.engine
            .toggle_effect(span, MarkerKind::ClickableSound, CREAK);

        assert!(h.effects.finish());
        assert!(!h.effects.finish());
        assert_eq!(h.view.events(), vec![(span, true), (span, false)]);
        assert_eq!(h.engine.active_control(), None);

        // 다시 활성화하면 처음부터 재생
        assert_eq!(
            h.engine.toggle_effect(span, MarkerKind::ClickableSound, CREAK),
            ToggleOutcome::Started
        );
    }

    #[tokio::test]
    async fn another_control_interrupts_current_one() {
        let h = harness();
        let bell = MarkerId::new(2, 1);
        let span = MarkerId::new(2, 5);

        h.engine.toggle_effect(bell, MarkerKind::SoundEffect, BELL);
        h.engine.toggle_effect(span, MarkerKind::ClickableSound, CREAK);
        assert_eq!(
            h.view.events(),
            vec![(bell, true), (bell, false), (span, true)]
        );
        assert_eq!(h.engine.effect_source(), Some(h.assets.resolve(CREAK)));

        h.effects.finish();
        assert_eq!(h.view.events().last(), Some(&(span, false)));
        assert_eq!(h.view.events().len(), 4);
    }

    #[tokio::test]
    async fn one_shot_effect_interrupts_toggle() {
        let h = harness();
        let bell = MarkerId::new(3, 0);
        h.engine.toggle_effect(bell, MarkerKind::SoundEffect, BELL);

        assert!(h.engine.play_effect("assets/audio/effects/thunder.mp3"));
        assert_eq!(h.view.events(), vec![(bell, true), (bell, false)]);
        assert_eq!(h.engine.active_control(), None);
        assert_eq!(h.effects.snapshot().plays, 2);
        assert_eq!(h.effects.snapshot().volume, 0.7);
    }

    #[tokio::test]
    async fn denied_effect_playback_is_swallowed() {
        let h = harness();
        h.effects.deny_playback(true);
        let bell = MarkerId::new(1, 0);

        assert_eq!(
            h.engine.toggle_effect(bell, MarkerKind::SoundEffect, BELL),
            ToggleOutcome::Failed
        );
        assert!(!h.engine.play_effect(BELL));
        assert!(h.view.events().is_empty());
        assert_eq!(h.engine.effect_phase(), EffectPhase::Idle);
    }

    #[tokio::test]
    async fn effects_volume_propagates_while_playing() {
        let h = harness();
        h.engine.play_effect(BELL);
        h.settings.set(SettingKey::EffectsVolume, json!(30)).unwrap();
        h.engine.apply_settings(None);
        assert_eq!(h.effects.snapshot().volume, 0.3);
        assert!(h.effects.snapshot().playing);
    }
}
