//! 테스트용 포트 구현과 조립 헬퍼.

use async_trait::async_trait;
use parking_lot::Mutex;
use soundnovel_core::bookmark_store::BookmarkStore;
use soundnovel_core::error::CoreError;
use soundnovel_core::models::asset::AssetBase;
use soundnovel_core::models::bookmark::Bookmark;
use soundnovel_core::models::chapter::{ChapterCatalog, ChapterData};
use soundnovel_core::models::marker::{MarkerId, MarkerKind};
use soundnovel_core::models::navigation::{NavTarget, Route};
use soundnovel_core::models::settings::Typography;
use soundnovel_core::ports::content::AssetPreloader;
use soundnovel_core::ports::navigator::Navigator;
use soundnovel_core::ports::view::ViewSurface;
use soundnovel_core::settings_store::SettingsStore;
use soundnovel_player::fade::FadeCadence;
use soundnovel_player::null::NullChannel;
use soundnovel_player::AudioEngine;
use soundnovel_storage::memory::{MemoryBookmarkStorage, MemoryPreferences};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::controller::{ChapterSessionController, ControllerDeps, SessionTiming};

pub const BASE_URL: &str = "file:///novel/";
pub const FRONT_BACKGROUND: &str = "assets/images/backgrounds/cover.jpg";

/// 화면 요청 기록
#[derive(Debug, Clone, PartialEq)]
pub enum ViewEvent {
    Background(String),
    Content(u32),
    Reveal,
    Nav(NavTarget, NavTarget),
    Control(MarkerId, bool),
    Typography(Typography),
    FrontPage(Option<Bookmark>),
    About(bool),
    Degraded(String),
    Notify(String),
}

#[derive(Default)]
pub struct RecordingView {
    events: Mutex<Vec<ViewEvent>>,
}

impl RecordingView {
    pub fn events(&self) -> Vec<ViewEvent> {
        self.events.lock().clone()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }

    pub fn backgrounds(&self) -> Vec<String> {
        self.events
            .lock()
            .iter()
            .filter_map(|e| match e {
                ViewEvent::Background(src) => Some(src.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn reveals(&self) -> usize {
        self.count(|e| matches!(e, ViewEvent::Reveal))
    }

    pub fn notifications(&self) -> usize {
        self.count(|e| matches!(e, ViewEvent::Notify(_)))
    }

    pub fn last_nav(&self) -> Option<(NavTarget, NavTarget)> {
        self.events.lock().iter().rev().find_map(|e| match e {
            ViewEvent::Nav(back, next) => Some((*back, *next)),
            _ => None,
        })
    }

    pub fn last_front_page(&self) -> Option<Option<Bookmark>> {
        self.events.lock().iter().rev().find_map(|e| match e {
            ViewEvent::FrontPage(bookmark) => Some(bookmark.clone()),
            _ => None,
        })
    }

    fn count(&self, pred: impl Fn(&ViewEvent) -> bool) -> usize {
        self.events.lock().iter().filter(|e| pred(e)).count()
    }

    fn push(&self, event: ViewEvent) {
        self.events.lock().push(event);
    }
}

impl ViewSurface for RecordingView {
    fn set_background(&self, src: &str) {
        self.push(ViewEvent::Background(src.to_string()));
    }

    fn set_content(&self, chapter_id: u32, _title: &str, _markup: &str) {
        self.push(ViewEvent::Content(chapter_id));
    }

    fn reveal_content(&self) {
        self.push(ViewEvent::Reveal);
    }

    fn set_nav_targets(&self, back: NavTarget, next: NavTarget) {
        self.push(ViewEvent::Nav(back, next));
    }

    fn set_control_active(&self, marker: MarkerId, _kind: MarkerKind, active: bool) {
        self.push(ViewEvent::Control(marker, active));
    }

    fn apply_typography(&self, typography: &Typography) {
        self.push(ViewEvent::Typography(typography.clone()));
    }

    fn show_front_page(&self, _background: &str, bookmark: Option<&Bookmark>) {
        self.push(ViewEvent::FrontPage(bookmark.cloned()));
    }

    fn show_about(&self, about: Option<&ChapterData>) {
        self.push(ViewEvent::About(about.is_some()));
    }

    fn show_degraded(&self, reason: &str) {
        self.push(ViewEvent::Degraded(reason.to_string()));
    }

    fn notify(&self, message: &str) {
        self.push(ViewEvent::Notify(message.to_string()));
    }
}

/// 이동 요청만 기록
#[derive(Default)]
pub struct RecordingNavigator {
    routes: Mutex<Vec<Route>>,
}

impl RecordingNavigator {
    pub fn routes(&self) -> Vec<Route> {
        self.routes.lock().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn go(&self, route: Route) {
        self.routes.lock().push(route);
    }
}

#[derive(Default)]
pub struct RecordingPreloader {
    uris: Mutex<Vec<String>>,
}

impl RecordingPreloader {
    pub fn uris(&self) -> Vec<String> {
        self.uris.lock().clone()
    }
}

#[async_trait]
impl AssetPreloader for RecordingPreloader {
    async fn preload(&self, uri: &str) -> Result<(), CoreError> {
        self.uris.lock().push(uri.to_string());
        Ok(())
    }
}

/// 챕터 마크업: 배경(0), 음악(1), 효과음 버튼(2), 늦은 배경(3)
pub fn chapter_markup(id: u32) -> String {
    format!(
        r#"<div class="bg-change" data-src="bg/ch{id}.jpg"></div>
<div class="music-change" data-src="music/ch{id}.mp3"></div>
<p>Once upon a time.</p>
<button class="sound-effect" data-src="fx/bell{id}.mp3">bell</button>
<div class="bg-change" data-src="bg/ch{id}-late.jpg"></div>"#
    )
}

pub fn catalog(ids: &[u32]) -> ChapterCatalog {
    let chapters: BTreeMap<u32, ChapterData> = ids
        .iter()
        .map(|&id| {
            let title = if id == 2 {
                "The Library".to_string()
            } else {
                format!("Chapter Title {id}")
            };
            (
                id,
                ChapterData {
                    title,
                    content: chapter_markup(id),
                },
            )
        })
        .collect();
    let about = ChapterData {
        title: "About the Author".to_string(),
        content: "<p>Written at night.</p>".to_string(),
    };
    ChapterCatalog::new(chapters, Some(about))
}

pub struct Fixture {
    pub controller: Arc<ChapterSessionController>,
    pub engine: Arc<AudioEngine>,
    pub music: Arc<NullChannel>,
    pub effects: Arc<NullChannel>,
    pub view: Arc<RecordingView>,
    pub navigator: Arc<RecordingNavigator>,
    pub preloader: Arc<RecordingPreloader>,
    pub settings: Arc<SettingsStore>,
    pub bookmarks: Arc<BookmarkStore>,
}

pub fn fixture(ids: &[u32]) -> Fixture {
    let music = Arc::new(NullChannel::new("music"));
    let effects = Arc::new(NullChannel::new("effects"));
    let view = Arc::new(RecordingView::default());
    let navigator = Arc::new(RecordingNavigator::default());
    let preloader = Arc::new(RecordingPreloader::default());
    let settings = Arc::new(SettingsStore::load(Arc::new(MemoryPreferences::new())));
    let bookmarks = Arc::new(BookmarkStore::new(Arc::new(MemoryBookmarkStorage::new())));
    let catalog = Arc::new(catalog(ids));
    let assets = AssetBase::parse(BASE_URL).unwrap();

    let engine = Arc::new(AudioEngine::new(
        music.clone(),
        effects.clone(),
        view.clone(),
        settings.clone(),
        assets.clone(),
        FadeCadence::default(),
    ));
    let controller = ChapterSessionController::new(
        ControllerDeps {
            catalog,
            engine: engine.clone(),
            settings: settings.clone(),
            bookmarks: bookmarks.clone(),
            view: view.clone(),
            navigator: navigator.clone(),
            preloader: preloader.clone(),
            assets,
        },
        SessionTiming::default(),
        FRONT_BACKGROUND,
    );

    Fixture {
        controller,
        engine,
        music,
        effects,
        view,
        navigator,
        preloader,
        settings,
        bookmarks,
    }
}
