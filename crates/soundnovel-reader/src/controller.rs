//! 챕터 세션 컨트롤러.
//!
//! "현재 챕터"의 유일한 소유자. 챕터 진입 시퀀스:
//!
//! 1. 본문 교체(숨김) + 첫 배경 즉시 적용 + 스캐너 연결
//! 2. `reveal_delay` 후 본문 공개, 허용되면 첫 음악 재생
//! 3. 공개 직후 이전/다음 버튼 갱신, 다음 챕터 에셋 미리 읽기
//!
//! 새 화면으로 넘어가면 공개 예약은 취소된다. 자동 북마크 예약은 더 새로운
//! 자동 북마크 예약만 대체하므로, 진입 직후 떠나도 늦은 기록이 남을 수 있다.

use parking_lot::Mutex;
use serde_json::Value;
use soundnovel_content::markers::extract_markers;
use soundnovel_core::bookmark_store::BookmarkStore;
use soundnovel_core::config::ReaderConfig;
use soundnovel_core::error::CoreError;
use soundnovel_core::models::asset::AssetBase;
use soundnovel_core::models::bookmark::Bookmark;
use soundnovel_core::models::chapter::ChapterCatalog;
use soundnovel_core::models::marker::{first_source, Marker, MarkerId, MarkerKind};
use soundnovel_core::models::navigation::{Direction, NavTarget, Route};
use soundnovel_core::models::settings::{MusicMode, SettingKey, Settings};
use soundnovel_core::ports::content::AssetPreloader;
use soundnovel_core::ports::navigator::Navigator;
use soundnovel_core::ports::view::ViewSurface;
use soundnovel_core::settings_store::SettingsStore;
use soundnovel_core::timer::TimerSlot;
use soundnovel_player::effects::ToggleOutcome;
use soundnovel_player::AudioEngine;
use std::collections::BTreeSet;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::scanner::{TriggerAction, TriggerScanner, TriggerTargets};

/// 북마크 저장 확인 메시지
const BOOKMARK_NOTICE: &str = "Bookmarked!";

/// 화면 전환 지연
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionTiming {
    pub reveal_delay: Duration,
    pub auto_bookmark_delay: Duration,
    pub about_reveal_delay: Duration,
}

impl SessionTiming {
    pub fn from_config(config: &ReaderConfig) -> Self {
        Self {
            reveal_delay: config.reveal_delay(),
            auto_bookmark_delay: config.auto_bookmark_delay(),
            about_reveal_delay: config.about_reveal_delay(),
        }
    }
}

impl Default for SessionTiming {
    fn default() -> Self {
        Self::from_config(&ReaderConfig::default_config())
    }
}

/// 컨트롤러 협력자
pub struct ControllerDeps {
    pub catalog: Arc<ChapterCatalog>,
    pub engine: Arc<AudioEngine>,
    pub settings: Arc<SettingsStore>,
    pub bookmarks: Arc<BookmarkStore>,
    pub view: Arc<dyn ViewSurface>,
    pub navigator: Arc<dyn Navigator>,
    pub preloader: Arc<dyn AssetPreloader>,
    pub assets: AssetBase,
}

/// 현재 챕터 세션
#[derive(Default)]
struct ChapterSession {
    current: Option<u32>,
    markers: Vec<Marker>,
    scanner: Option<Arc<TriggerScanner>>,
    /// 화면이 바뀔 때마다 증가 (늦게 깨어난 공개 작업 판별)
    view_generation: u64,
    /// 미리 읽기를 요청한 에셋 (세션 동안 증가만 한다)
    preloaded: BTreeSet<String>,
}

/// 챕터 세션 컨트롤러
pub struct ChapterSessionController {
    catalog: Arc<ChapterCatalog>,
    engine: Arc<AudioEngine>,
    settings: Arc<SettingsStore>,
    bookmarks: Arc<BookmarkStore>,
    view: Arc<dyn ViewSurface>,
    navigator: Arc<dyn Navigator>,
    preloader: Arc<dyn AssetPreloader>,
    assets: AssetBase,
    timing: SessionTiming,
    front_page_background: String,
    session: Mutex<ChapterSession>,
    reveal: TimerSlot,
    auto_bookmark: TimerSlot,
    weak_self: Weak<Self>,
}

impl ChapterSessionController {
    pub fn new(
        deps: ControllerDeps,
        timing: SessionTiming,
        front_page_background: impl Into<String>,
    ) -> Arc<Self> {
        let ControllerDeps {
            catalog,
            engine,
            settings,
            bookmarks,
            view,
            navigator,
            preloader,
            assets,
        } = deps;

        Arc::new_cyclic(|weak_self| Self {
            catalog,
            engine,
            settings,
            bookmarks,
            view,
            navigator,
            preloader,
            assets,
            timing,
            front_page_background: front_page_background.into(),
            session: Mutex::new(ChapterSession::default()),
            reveal: TimerSlot::new("본문 공개"),
            auto_bookmark: TimerSlot::new("자동 북마크"),
            weak_self: weak_self.clone(),
        })
    }

    pub fn catalog(&self) -> &ChapterCatalog {
        &self.catalog
    }

    pub fn engine(&self) -> &Arc<AudioEngine> {
        &self.engine
    }

    pub fn current_chapter(&self) -> Option<u32> {
        self.session.lock().current
    }

    pub fn scanner(&self) -> Option<Arc<TriggerScanner>> {
        self.session.lock().scanner.clone()
    }

    /// 현재 챕터의 마커 목록
    pub fn markers(&self) -> Vec<Marker> {
        self.session.lock().markers.clone()
    }

    /// 미리 읽기를 요청한 에셋 목록
    pub fn preloaded(&self) -> Vec<String> {
        self.session.lock().preloaded.iter().cloned().collect()
    }

    // ============================================================
    // 화면 진입
    // ============================================================

    /// 챕터 진입. 카탈로그에 없는 번호면 아무것도 하지 않고 false.
    pub fn enter(&self, chapter_id: u32) -> bool {
        let Some(chapter) = self.catalog.get(chapter_id) else {
            debug!("없는 챕터, 진입 무시: {chapter_id}");
            return false;
        };

        let settings = self.settings.get();
        let markers = extract_markers(chapter_id, &chapter.content);
        let scanner = Arc::new(TriggerScanner::wire(
            chapter_id,
            &markers,
            self.trigger_targets(),
        ));

        let generation = {
            let mut session = self.session.lock();
            session.current = Some(chapter_id);
            session.markers = markers;
            session.scanner = Some(scanner);
            session.view_generation += 1;
            session.view_generation
        };
        info!("{chapter_id}장 진입: {}", self.catalog.title_of(chapter_id));

        self.view
            .set_content(chapter_id, &chapter.title, &chapter.content);
        self.view.apply_typography(&settings.typography());

        let first_background = {
            let session = self.session.lock();
            first_source(&session.markers, MarkerKind::Background).map(str::to_string)
        };
        if let Some(background) = first_background {
            self.view.set_background(&background);
        }

        if !settings.music_permitted(Some(chapter_id)) {
            self.engine.stop_music();
        }

        let weak = self.weak_self.clone();
        self.reveal.schedule(self.timing.reveal_delay, async move {
            if let Some(controller) = weak.upgrade() {
                controller.reveal_chapter(chapter_id, generation);
            }
        });

        if settings.auto_bookmark {
            self.schedule_auto_bookmark(chapter_id);
        }
        true
    }

    /// 표지 화면. 기본 배경을 다시 적용하고 북마크를 다시 읽는다.
    pub fn show_front_page(&self) {
        self.leave_chapter();
        if !self.settings.get().music_permitted(None) {
            self.engine.stop_music();
        }
        let bookmark = self.bookmarks.read();
        self.view
            .show_front_page(&self.front_page_background, bookmark.as_ref());
        debug!("표지 화면 (북마크: {bookmark:?})");
    }

    /// 작가 소개 화면
    pub fn show_about(&self) {
        let generation = self.leave_chapter();
        if !self.settings.get().music_permitted(None) {
            self.engine.stop_music();
        }
        self.view.show_about(self.catalog.about());

        let weak = self.weak_self.clone();
        self.reveal
            .schedule(self.timing.about_reveal_delay, async move {
                if let Some(controller) = weak.upgrade() {
                    if controller.session.lock().view_generation == generation {
                        controller.view.reveal_content();
                    }
                }
            });
        debug!("작가 소개 화면");
    }

    // ============================================================
    // 사용자 동작
    // ============================================================

    /// 마커 가시성 변화 (현재 챕터 스캐너로 전달)
    pub fn on_visibility(&self, marker: MarkerId, visible_ratio: f32) -> Option<TriggerAction> {
        let scanner = self.scanner()?;
        scanner.observe(marker, visible_ratio)
    }

    /// 토글 마커(효과음 버튼, 강조 문구) 활성화
    ///
    /// 효과음이 꺼져 있거나 토글 마커가 아니면 `None`.
    pub fn activate_control(&self, marker: MarkerId) -> Option<ToggleOutcome> {
        let target = {
            let session = self.session.lock();
            if session.current != Some(marker.chapter) {
                return None;
            }
            session
                .markers
                .iter()
                .find(|m| m.id == marker && m.kind.is_toggle())
                .cloned()?
        };

        if !self.settings.get().effects_enabled {
            debug!("효과음 꺼짐, 컨트롤 무시: {marker}");
            return None;
        }
        let src = target.source()?;
        Some(self.engine.toggle_effect(target.id, target.kind, src))
    }

    /// 이전/다음 버튼
    pub fn navigate(&self, direction: Direction) -> Option<Route> {
        let current = self.current_chapter()?;
        let (back, next) = self.nav_targets(current);
        let target = match direction {
            Direction::Back => back,
            Direction::Next => next,
        };
        let route = Route::from(target);
        info!("{direction:?} 이동: {route}");
        self.navigator.go(route);
        Some(route)
    }

    /// 현재 챕터 북마크 저장
    pub fn bookmark_now(&self) -> Result<Option<Bookmark>, CoreError> {
        let Some(chapter_id) = self.current_chapter() else {
            return Ok(None);
        };
        let bookmark = self
            .bookmarks
            .save(chapter_id, &self.catalog.title_of(chapter_id))?;
        self.view.notify(BOOKMARK_NOTICE);
        Ok(Some(bookmark))
    }

    /// 북마크 삭제 후 표지 화면 갱신
    pub fn clear_bookmark(&self) -> Result<(), CoreError> {
        self.bookmarks.clear()?;
        if self.current_chapter().is_none() {
            self.view
                .show_front_page(&self.front_page_background, None);
        }
        Ok(())
    }

    /// 음악 모드 변경
    ///
    /// - `Enabled`: 전역 켜기 + 현재 챕터 음소거 해제
    /// - `Disabled`: 전역 끄기
    /// - `ChapterDisabled`: 현재 챕터만 음소거
    ///
    /// 이후 재생이 허용되지 않으면 정지하고, 허용되면 현재 챕터 첫 음악을 처음부터 다시 재생한다.
    pub fn set_music_mode(&self, mode: MusicMode) -> Result<Settings, CoreError> {
        let current = self.current_chapter();
        let result = self.settings.update_with(|s| {
            s.music_mode = mode;
            if let Some(id) = current {
                match mode {
                    MusicMode::Enabled => {
                        s.disabled_chapters.remove(&id);
                    }
                    MusicMode::ChapterDisabled => {
                        s.disabled_chapters.insert(id);
                    }
                    MusicMode::Disabled => {}
                }
            }
        });
        info!("음악 모드 변경: {mode}");
        self.refresh_music_gate();
        result
    }

    /// 자동 북마크 설정. 켜는 순간 현재 챕터를 바로 기록한다.
    pub fn set_auto_bookmark(&self, enabled: bool) -> Result<Settings, CoreError> {
        let settings = self.settings.set(SettingKey::AutoBookmark, Value::Bool(enabled))?;
        if enabled {
            self.bookmark_now()?;
        }
        Ok(settings)
    }

    /// 설정 변경 + 즉시 반영
    ///
    /// 저장 실패 시에도 메모리 값은 바뀌므로 반영은 수행하고 에러를 돌려준다.
    pub fn update_setting(&self, key: SettingKey, value: Value) -> Result<Settings, CoreError> {
        match key {
            SettingKey::MusicMode => {
                let mode = value
                    .as_str()
                    .and_then(|s| s.parse::<MusicMode>().ok())
                    .ok_or_else(|| CoreError::validation(key.as_str(), format!("허용되지 않는 값: {value}")))?;
                return self.set_music_mode(mode);
            }
            SettingKey::AutoBookmark => {
                if let Some(enabled) = value.as_bool() {
                    return self.set_auto_bookmark(enabled);
                }
            }
            _ => {}
        }

        let result = self.settings.set(key, value);
        if matches!(result, Err(CoreError::Validation { .. })) {
            return result;
        }
        self.propagate(key);
        result
    }

    // ============================================================
    // 내부
    // ============================================================

    fn propagate(&self, key: SettingKey) {
        let settings = self.settings.get();
        let current = self.current_chapter();

        if key.affects_playback() {
            self.engine.apply_settings(current);
        }
        if key.affects_typography() {
            self.view.apply_typography(&settings.typography());
        }
        match key {
            // 현재 챕터가 음소거된 경우에만 정지. 재생 중인 곡은 건드리지 않는다.
            SettingKey::DisabledChapters if !settings.music_permitted(current) => {
                self.engine.stop_music()
            }
            SettingKey::EffectsEnabled if !settings.effects_enabled => self.engine.stop_effect(),
            _ => {}
        }
    }

    /// 음악 모드 변경 후: 허용되지 않으면 정지, 허용되면 첫 음악부터 다시 재생
    fn refresh_music_gate(&self) {
        let current = self.current_chapter();
        if !self.engine.is_music_enabled(current) {
            self.engine.stop_music();
            return;
        }
        let first_music = {
            let session = self.session.lock();
            first_source(&session.markers, MarkerKind::MusicChange).map(str::to_string)
        };
        if let Some(src) = first_music {
            self.engine.restart_music(&src);
        }
    }

    /// 공개 단계. 그 사이 다른 화면으로 넘어갔으면 아무것도 하지 않는다.
    fn reveal_chapter(&self, chapter_id: u32, generation: u64) {
        let first_music = {
            let session = self.session.lock();
            if session.view_generation != generation || session.current != Some(chapter_id) {
                debug!("지난 공개 예약 무시: {chapter_id}장");
                return;
            }
            first_source(&session.markers, MarkerKind::MusicChange).map(str::to_string)
        };

        self.view.reveal_content();
        if let Some(src) = first_music {
            if self.engine.is_music_enabled(Some(chapter_id)) {
                self.engine.change_music(&src);
            }
        }

        let (back, next) = self.nav_targets(chapter_id);
        self.view.set_nav_targets(back, next);
        self.preload_next(chapter_id);
    }

    /// 이전 = 앞 챕터 또는 표지, 다음 = 다음 챕터 또는 표지
    fn nav_targets(&self, chapter_id: u32) -> (NavTarget, NavTarget) {
        let back = self
            .catalog
            .previous(chapter_id)
            .map_or(NavTarget::FrontPage, NavTarget::Chapter);
        let next = self
            .catalog
            .next(chapter_id)
            .map_or(NavTarget::FrontPage, NavTarget::Chapter);
        (back, next)
    }

    /// 다음 챕터의 첫 배경/첫 음악 미리 읽기 (완료를 기다리지 않는다)
    fn preload_next(&self, chapter_id: u32) {
        let Some(next_id) = self.catalog.next(chapter_id) else {
            return;
        };
        let Some(next) = self.catalog.get(next_id) else {
            return;
        };

        let markers = extract_markers(next_id, &next.content);
        let targets: Vec<String> = [MarkerKind::Background, MarkerKind::MusicChange]
            .into_iter()
            .filter_map(|kind| first_source(&markers, kind))
            .map(|src| self.assets.resolve(src))
            .collect();

        for uri in targets {
            if !self.session.lock().preloaded.insert(uri.clone()) {
                continue;
            }
            let preloader = self.preloader.clone();
            tokio::spawn(async move {
                if let Err(e) = preloader.preload(&uri).await {
                    warn!("미리 읽기 실패 (무시): {e}");
                }
            });
        }
    }

    fn schedule_auto_bookmark(&self, chapter_id: u32) {
        let weak = self.weak_self.clone();
        self.auto_bookmark
            .schedule(self.timing.auto_bookmark_delay, async move {
                let Some(controller) = weak.upgrade() else {
                    return;
                };
                let title = controller.catalog.title_of(chapter_id);
                match controller.bookmarks.save(chapter_id, &title) {
                    Ok(_) => controller.view.notify(BOOKMARK_NOTICE),
                    Err(e) => warn!("자동 북마크 저장 실패: {e}"),
                }
            });
    }

    /// 챕터 화면 떠나기 (표지/소개로). 새 화면 세대 번호 반환.
    fn leave_chapter(&self) -> u64 {
        self.reveal.cancel();
        let mut session = self.session.lock();
        session.current = None;
        session.markers.clear();
        session.scanner = None;
        session.view_generation += 1;
        session.view_generation
    }

    fn trigger_targets(&self) -> TriggerTargets {
        TriggerTargets {
            engine: self.engine.clone(),
            view: self.view.clone(),
            settings: self.settings.clone(),
        }
    }
}
