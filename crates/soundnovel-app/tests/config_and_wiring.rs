//! 설정 및 DI 와이어링 통합 테스트.
//!
//! ReaderConfig → 파일 기반 어댑터 → 세션 생성 검증.

mod common;

use common::{RecordingView, CATALOG_JSON};
use soundnovel_app::event_bus::AppEvent;
use soundnovel_app::lifecycle::{ReaderSession, SessionPorts};
use soundnovel_app::shell::ShellMode;
use soundnovel_content::catalog::FileContentSource;
use soundnovel_content::preload::FilePreloader;
use soundnovel_core::config::ReaderConfig;
use soundnovel_core::config_manager::ConfigManager;
use soundnovel_core::models::asset::AssetBase;
use soundnovel_player::null::NullChannel;
use soundnovel_storage::preferences::JsonPreferenceFile;
use soundnovel_storage::sqlite::SqliteBookmarkStorage;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

#[test]
fn config_defaults_are_valid() {
    let config = ReaderConfig::default_config();

    // 오디오
    assert!(config.audio.fade_step > 0.0 && config.audio.fade_step <= 1.0);
    assert!(config.audio.fade_interval_ms > 0);

    // 타이밍: 자동 북마크는 본문 공개 뒤에 기록된다
    assert_eq!(config.reveal_delay(), Duration::from_millis(300));
    assert!(config.auto_bookmark_delay() > config.reveal_delay());

    // 에셋/저장소
    assert!(AssetBase::parse(&config.assets.base_url).is_ok());
    assert!(!config.assets.front_page_background.is_empty());
    assert!(config.storage.data_dir.is_none());
    assert_eq!(config.bookmark_max_age(), Duration::from_secs(30 * 86_400));
}

#[test]
fn partial_config_fills_defaults() {
    let config: ReaderConfig = serde_json::from_str(
        r#"{"timing": {"reveal_delay_ms": 50}, "assets": {"catalog": "novel/chapters.json"}}"#,
    )
    .unwrap();

    assert_eq!(config.timing.reveal_delay_ms, 50);
    assert_eq!(config.timing.auto_bookmark_delay_ms, 600);
    assert_eq!(config.assets.catalog, "novel/chapters.json");
    assert_eq!(config.storage.preferences_file, "preferences.json");
}

#[test]
fn config_roundtrip_through_manager() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("nested").join("config.json");

    let manager = ConfigManager::with_path(path.clone()).unwrap();
    assert!(path.exists());
    manager
        .update_with(|c| {
            c.timing.reveal_delay_ms = 10;
            c.storage.data_dir = Some(temp_dir.path().to_path_buf());
        })
        .unwrap();

    let reopened = ConfigManager::with_path(path).unwrap().get();
    assert_eq!(reopened.timing.reveal_delay_ms, 10);
    assert_eq!(reopened.storage.data_dir.as_deref(), Some(temp_dir.path()));
}

#[tokio::test]
async fn session_wires_file_adapters() {
    let temp_dir = TempDir::new().unwrap();
    let catalog_path = temp_dir.path().join("chapters.json");
    std::fs::write(&catalog_path, CATALOG_JSON).unwrap();

    let mut config = ReaderConfig::default_config();
    config.timing.reveal_delay_ms = 10;
    config.timing.auto_bookmark_delay_ms = 20;
    config.audio.fade_interval_ms = 1;
    config.assets.base_url = AssetBase::from_dir(temp_dir.path())
        .unwrap()
        .as_url()
        .to_string();

    let view = Arc::new(RecordingView::default());
    let music = Arc::new(NullChannel::new("music"));
    let ports = SessionPorts {
        view: view.clone(),
        music: music.clone(),
        effects: Arc::new(NullChannel::new("effects")),
        content: Arc::new(FileContentSource::new(&catalog_path)),
        preloader: Arc::new(FilePreloader::new()),
        preferences: Arc::new(JsonPreferenceFile::open(
            temp_dir.path().join(&config.storage.preferences_file),
        )),
        bookmarks: Arc::new(
            SqliteBookmarkStorage::open(&temp_dir.path().join(&config.storage.bookmark_db))
                .unwrap(),
        ),
    };
    let session = ReaderSession::start(&config, ports, ShellMode::Spa, "#chapter-2")
        .await
        .unwrap();
    assert!(!session.router().is_degraded());
    let controller = session.controller().unwrap();
    assert_eq!(controller.catalog().len(), 3);

    session.dispatch(AppEvent::LocationChanged("#chapter-2".to_string()));
    tokio::time::sleep(Duration::from_millis(300)).await;

    assert_eq!(controller.current_chapter(), Some(2));
    let expected = format!(
        "{}music/quiet.mp3",
        AssetBase::from_dir(temp_dir.path()).unwrap().as_url()
    );
    assert_eq!(music.snapshot().source.as_deref(), Some(expected.as_str()));
    assert_eq!(view.count("reveal"), 1);

    session.shutdown();
    assert!(*session.subscribe_shutdown().borrow());
}
