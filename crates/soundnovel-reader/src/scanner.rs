//! 트리거 스캐너.
//!
//! 챕터 하나의 가시성 구동 마커(배경, 음악 변경, 음악 정지, 자동 효과음)를 관찰한다.
//! 마커는 처음으로 50% 이상 보이는 순간 발동하고, 그 세션 동안 다시 발동하지 않는다.
//! 토글 마커는 여기서 다루지 않는다 (직접 활성화).

use parking_lot::Mutex;
use soundnovel_core::models::marker::{Marker, MarkerId, MarkerKind};
use soundnovel_core::ports::view::ViewSurface;
use soundnovel_core::settings_store::SettingsStore;
use soundnovel_player::AudioEngine;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tracing::{debug, trace};

/// 발동 기준 가시 비율
pub const ARM_THRESHOLD: f32 = 0.5;

/// 발동 시 실제로 수행된 동작
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TriggerAction {
    Background(String),
    ChangeMusic(String),
    StopMusic,
    Effect(String),
    /// 발동했지만 설정으로 차단됨 (음악 비허용, 효과음 꺼짐)
    Suppressed(MarkerKind),
}

/// 발동 대상 협력자
#[derive(Clone)]
pub struct TriggerTargets {
    pub engine: Arc<AudioEngine>,
    pub view: Arc<dyn ViewSurface>,
    pub settings: Arc<SettingsStore>,
}

/// 챕터별 마커 관찰자
pub struct TriggerScanner {
    chapter_id: u32,
    armed: BTreeMap<usize, Marker>,
    fired: Mutex<BTreeSet<usize>>,
    targets: TriggerTargets,
}

impl TriggerScanner {
    /// 가시성 구동 마커에 관찰자 연결
    pub fn wire(chapter_id: u32, markers: &[Marker], targets: TriggerTargets) -> Self {
        let armed: BTreeMap<usize, Marker> = markers
            .iter()
            .filter(|m| m.id.chapter == chapter_id && m.kind.is_visibility_driven())
            .map(|m| (m.id.index, m.clone()))
            .collect();
        debug!("{chapter_id}장 스캐너 연결: 마커 {}개", armed.len());

        Self {
            chapter_id,
            armed,
            fired: Mutex::new(BTreeSet::new()),
            targets,
        }
    }

    pub fn chapter_id(&self) -> u32 {
        self.chapter_id
    }

    /// 가시성 변화 알림
    ///
    /// 이번 알림으로 발동했으면 수행한 동작을 반환한다.
    /// 다른 챕터/알 수 없는 마커, 기준 미달, 이미 발동한 마커는 `None`.
    pub fn observe(&self, marker: MarkerId, visible_ratio: f32) -> Option<TriggerAction> {
        if marker.chapter != self.chapter_id {
            trace!("다른 챕터 마커 무시: {marker}");
            return None;
        }
        let target = self.armed.get(&marker.index)?;
        if visible_ratio < ARM_THRESHOLD {
            return None;
        }
        if !self.fired.lock().insert(marker.index) {
            return None;
        }

        let action = self.fire(target);
        debug!("마커 발동: {marker} {} → {action:?}", target.kind);
        Some(action)
    }

    pub fn is_fired(&self, marker: MarkerId) -> bool {
        marker.chapter == self.chapter_id && self.fired.lock().contains(&marker.index)
    }

    pub fn fired_count(&self) -> usize {
        self.fired.lock().len()
    }

    /// 관찰 중인 마커 수
    pub fn wired_count(&self) -> usize {
        self.armed.len()
    }

    fn fire(&self, marker: &Marker) -> TriggerAction {
        let TriggerTargets {
            engine,
            view,
            settings,
        } = &self.targets;
        let src = marker.source().unwrap_or_default();

        match marker.kind {
            MarkerKind::Background => {
                view.set_background(src);
                TriggerAction::Background(src.to_string())
            }
            MarkerKind::MusicChange => {
                if engine.is_music_enabled(Some(self.chapter_id)) {
                    engine.change_music(src);
                    TriggerAction::ChangeMusic(src.to_string())
                } else {
                    TriggerAction::Suppressed(marker.kind)
                }
            }
            MarkerKind::MusicStop => {
                engine.stop_music();
                TriggerAction::StopMusic
            }
            MarkerKind::AutoSound => {
                if settings.get().effects_enabled {
                    engine.play_effect(src);
                    TriggerAction::Effect(src.to_string())
                } else {
                    TriggerAction::Suppressed(marker.kind)
                }
            }
            MarkerKind::SoundEffect | MarkerKind::ClickableSound => {
                TriggerAction::Suppressed(marker.kind)
            }
        }
    }
}
