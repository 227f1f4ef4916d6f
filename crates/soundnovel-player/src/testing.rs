//! 테스트용 포트 구현.

use parking_lot::Mutex;
use soundnovel_core::error::CoreError;
use soundnovel_core::models::asset::AssetBase;
use soundnovel_core::models::bookmark::Bookmark;
use soundnovel_core::models::chapter::ChapterData;
use soundnovel_core::models::marker::{MarkerId, MarkerKind};
use soundnovel_core::models::navigation::NavTarget;
use soundnovel_core::models::settings::Typography;
use soundnovel_core::ports::storage::PreferenceStorage;
use soundnovel_core::ports::view::ViewSurface;
use soundnovel_core::settings_store::SettingsStore;
use std::collections::HashMap;
use std::sync::Arc;

use crate::engine::AudioEngine;
use crate::fade::FadeCadence;
use crate::null::NullChannel;

pub const BASE_URL: &str = "file:///novel/";

#[derive(Default)]
pub struct MemoryPrefs {
    entries: Mutex<HashMap<String, String>>,
}

impl PreferenceStorage for MemoryPrefs {
    fn get(&self, key: &str) -> Result<Option<String>, CoreError> {
        Ok(self.entries.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), CoreError> {
        self.entries.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// 토글 표시 변경만 기록하는 화면
#[derive(Default)]
pub struct ControlView {
    pub controls: Mutex<Vec<(MarkerId, bool)>>,
}

impl ControlView {
    pub fn events(&self) -> Vec<(MarkerId, bool)> {
        self.controls.lock().clone()
    }
}

impl ViewSurface for ControlView {
    fn set_background(&self, _src: &str) {}
    fn set_content(&self, _chapter_id: u32, _title: &str, _markup: &str) {}
    fn reveal_content(&self) {}
    fn set_nav_targets(&self, _back: NavTarget, _next: NavTarget) {}
    fn set_control_active(&self, marker: MarkerId, _kind: MarkerKind, active: bool) {
        self.controls.lock().push((marker, active));
    }
    fn apply_typography(&self, _typography: &Typography) {}
    fn show_front_page(&self, _background: &str, _bookmark: Option<&Bookmark>) {}
    fn show_about(&self, _about: Option<&ChapterData>) {}
    fn show_degraded(&self, _reason: &str) {}
    fn notify(&self, _message: &str) {}
}

pub struct Harness {
    pub engine: AudioEngine,
    pub music: Arc<NullChannel>,
    pub effects: Arc<NullChannel>,
    pub view: Arc<ControlView>,
    pub settings: Arc<SettingsStore>,
    pub assets: AssetBase,
}

pub fn harness() -> Harness {
    let music = Arc::new(NullChannel::new("music"));
    let effects = Arc::new(NullChannel::new("effects"));
    let view = Arc::new(ControlView::default());
    let settings = Arc::new(SettingsStore::load(Arc::new(MemoryPrefs::default())));
    let assets = AssetBase::parse(BASE_URL).unwrap();
    let engine = AudioEngine::new(
        music.clone(),
        effects.clone(),
        view.clone(),
        settings.clone(),
        assets.clone(),
        FadeCadence::default(),
    );
    Harness {
        engine,
        music,
        effects,
        view,
        settings,
        assets,
    }
}
