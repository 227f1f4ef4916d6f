//! 통합 테스트 공용 헬퍼.

#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use soundnovel_app::event_bus::Channel;
use soundnovel_app::lifecycle::{FinishHook, ReaderSession, SessionPorts};
use soundnovel_app::shell::ShellMode;
use soundnovel_content::catalog::parse_catalog;
use soundnovel_core::config::ReaderConfig;
use soundnovel_core::error::CoreError;
use soundnovel_core::models::bookmark::Bookmark;
use soundnovel_core::models::chapter::{ChapterCatalog, ChapterData};
use soundnovel_core::models::marker::{MarkerId, MarkerKind};
use soundnovel_core::models::navigation::NavTarget;
use soundnovel_core::models::settings::Typography;
use soundnovel_core::ports::content::{AssetPreloader, ContentSource};
use soundnovel_core::ports::storage::{BookmarkStorage, PreferenceStorage};
use soundnovel_core::ports::view::ViewSurface;
use soundnovel_player::null::NullChannel;
use soundnovel_storage::memory::{MemoryBookmarkStorage, MemoryPreferences};
use std::sync::Arc;

pub const BASE_URL: &str = "file:///novel/";

pub const CATALOG_JSON: &str = r#"{
    "1": {
        "title": "The Gate",
        "content": "<div class=\"bg-change\" data-src=\"bg/gate.jpg\"></div><div class=\"music-change\" data-src=\"music/rain.mp3\"></div><p>Rain.</p><button class=\"sound-effect\" data-src=\"fx/bell.mp3\">bell</button><div class=\"bg-change\" data-src=\"bg/hall.jpg\"></div>"
    },
    "2": {
        "title": "The Library",
        "content": "<div class=\"bg-change\" data-src=\"bg/library.jpg\"></div><div class=\"music-change\" data-src=\"music/quiet.mp3\"></div><p>Dust.</p>"
    },
    "3": {
        "title": "The Tower",
        "content": "<div class=\"bg-change\" data-src=\"bg/tower.jpg\"></div><div class=\"music-stop\"></div><p>Silence.</p>"
    },
    "about": {"title": "About the Author", "content": "<p>Written at night.</p>"}
}"#;

pub fn sample_catalog() -> ChapterCatalog {
    parse_catalog(CATALOG_JSON).unwrap()
}

/// 고정 카탈로그 (또는 고정 실패)
pub struct StaticContent(pub Result<ChapterCatalog, String>);

#[async_trait]
impl ContentSource for StaticContent {
    async fn fetch_catalog(&self) -> Result<ChapterCatalog, CoreError> {
        self.0.clone().map_err(CoreError::Content)
    }
}

pub struct NoPreload;

#[async_trait]
impl AssetPreloader for NoPreload {
    async fn preload(&self, _uri: &str) -> Result<(), CoreError> {
        Ok(())
    }
}

/// 화면 요청을 짧은 문자열로 기록
#[derive(Default)]
pub struct RecordingView {
    lines: Mutex<Vec<String>>,
}

impl RecordingView {
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().clone()
    }

    pub fn last(&self, prefix: &str) -> Option<String> {
        self.lines
            .lock()
            .iter()
            .rev()
            .find(|line| line.starts_with(prefix))
            .cloned()
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.lines
            .lock()
            .iter()
            .filter(|line| line.starts_with(prefix))
            .count()
    }

    fn push(&self, line: String) {
        self.lines.lock().push(line);
    }
}

impl ViewSurface for RecordingView {
    fn set_background(&self, src: &str) {
        self.push(format!("bg:{src}"));
    }
    fn set_content(&self, chapter_id: u32, _title: &str, _markup: &str) {
        self.push(format!("content:{chapter_id}"));
    }
    fn reveal_content(&self) {
        self.push("reveal".to_string());
    }
    fn set_nav_targets(&self, back: NavTarget, next: NavTarget) {
        self.push(format!("nav:{back:?}|{next:?}"));
    }
    fn set_control_active(&self, marker: MarkerId, _kind: MarkerKind, active: bool) {
        self.push(format!("control:{marker}:{active}"));
    }
    fn apply_typography(&self, typography: &Typography) {
        self.push(format!("font:{}", typography.font_size));
    }
    fn show_front_page(&self, _background: &str, bookmark: Option<&Bookmark>) {
        self.push(format!("front:{:?}", bookmark.map(|b| b.chapter_id)));
    }
    fn show_about(&self, about: Option<&ChapterData>) {
        self.push(format!("about:{}", about.is_some()));
    }
    fn show_degraded(&self, reason: &str) {
        self.push(format!("degraded:{reason}"));
    }
    fn notify(&self, message: &str) {
        self.push(format!("notify:{message}"));
    }
}

pub fn test_config() -> ReaderConfig {
    let mut config = ReaderConfig::default_config();
    config.assets.base_url = BASE_URL.to_string();
    config
}

pub struct Rig {
    pub session: Arc<ReaderSession>,
    pub view: Arc<RecordingView>,
    pub music: Arc<NullChannel>,
    pub effects: Arc<NullChannel>,
}

pub struct RigOptions {
    pub mode: ShellMode,
    pub initial: &'static str,
    pub content: Arc<dyn ContentSource>,
    pub preferences: Arc<dyn PreferenceStorage>,
    pub bookmarks: Arc<dyn BookmarkStorage>,
}

impl Default for RigOptions {
    fn default() -> Self {
        Self {
            mode: ShellMode::Spa,
            initial: "",
            content: Arc::new(StaticContent(Ok(sample_catalog()))),
            preferences: Arc::new(MemoryPreferences::new()),
            bookmarks: Arc::new(MemoryBookmarkStorage::new()),
        }
    }
}

pub async fn rig(options: RigOptions) -> Rig {
    let view = Arc::new(RecordingView::default());
    let music = Arc::new(NullChannel::new("music"));
    let effects = Arc::new(NullChannel::new("effects"));

    let ports = SessionPorts {
        view: view.clone(),
        music: music.clone(),
        effects: effects.clone(),
        content: options.content,
        preloader: Arc::new(NoPreload),
        preferences: options.preferences,
        bookmarks: options.bookmarks,
    };
    let (m, e) = (music.clone(), effects.clone());
    let hook: FinishHook = Arc::new(move |channel| match channel {
        Channel::Music => m.finish(),
        Channel::Effects => e.finish(),
    });
    let session = ReaderSession::start(&test_config(), ports, options.mode, options.initial)
        .await
        .unwrap()
        .with_finish_hook(hook);

    Rig {
        session: Arc::new(session),
        view,
        music,
        effects,
    }
}
