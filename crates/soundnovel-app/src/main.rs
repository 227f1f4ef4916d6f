//! # soundnovel
//!
//! SoundNovel 리더 바이너리 진입점.
//! 설정 로드, 어댑터 생성(DI), 세션 루프와 입력 루프 실행.

use anyhow::{Context, Result};
use clap::Parser;
use soundnovel_app::console::{parse_command, ConsoleView, HELP};
use soundnovel_app::event_bus::{AppEvent, Channel, EventBus};
use soundnovel_app::lifecycle::{wait_for_signal, FinishHook, ReaderSession, SessionPorts};
use soundnovel_app::shell::ShellMode;
use soundnovel_content::catalog::FileContentSource;
use soundnovel_content::preload::FilePreloader;
use soundnovel_core::config::ReaderConfig;
use soundnovel_core::config_manager::ConfigManager;
use soundnovel_core::ports::audio::AudioChannel;
use soundnovel_core::ports::content::{AssetPreloader, ContentSource};
use soundnovel_core::ports::storage::{BookmarkStorage, PreferenceStorage};
use soundnovel_player::null::NullChannel;
use soundnovel_storage::memory::{MemoryBookmarkStorage, MemoryPreferences};
use soundnovel_storage::preferences::JsonPreferenceFile;
use soundnovel_storage::sqlite::SqliteBookmarkStorage;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// SoundNovel 리더
///
/// 배경 음악과 효과음이 흐르는 챕터형 소설 리더
#[derive(Parser, Debug)]
#[command(name = "soundnovel")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// 챕터 카탈로그 위치 (파일 경로 또는 http(s) URL)
    #[arg(long, short = 'c')]
    catalog: Option<String>,

    /// 상대 에셋 경로의 기준 URL (예: file:///srv/novel/)
    #[arg(long)]
    base_url: Option<String>,

    /// 데이터 저장 경로 (환경설정, 북마크)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// 실행 설정 파일 경로 (기본: 플랫폼 설정 디렉토리)
    #[arg(long)]
    config: Option<PathBuf>,

    /// 로그 레벨 (trace, debug, info, warn, error)
    #[arg(long, short = 'l', default_value = "info")]
    log_level: String,

    /// 셸 종류
    #[arg(long, value_enum, default_value_t = ShellMode::Spa)]
    shell: ShellMode,

    /// 시작 위치 (예: #chapter-1, about)
    #[arg(long, default_value = "")]
    start: String,

    /// 환경설정/북마크를 메모리에만 보관
    #[arg(long)]
    ephemeral: bool,

    /// 오디오 장치를 쓰지 않고 로그만 남김
    #[arg(long)]
    mute: bool,
}

fn print_banner() {
    println!();
    println!("╔══════════════════════════════════════════╗");
    println!("║        SoundNovel · 소리로 읽는 소설        ║");
    println!("╚══════════════════════════════════════════╝");
    println!();
}

/// 설정 로드 후 CLI 인자로 덮어쓰기
fn load_config(args: &Args) -> ReaderConfig {
    let manager = match &args.config {
        Some(path) => ConfigManager::with_path(path.clone()),
        None => ConfigManager::new(),
    };
    let mut config = match manager {
        Ok(manager) => {
            info!("설정 파일: {}", manager.config_path().display());
            manager.get()
        }
        Err(e) => {
            warn!("설정 로드 실패, 기본 설정 사용: {e}");
            ReaderConfig::default_config()
        }
    };

    if let Some(catalog) = &args.catalog {
        config.assets.catalog = catalog.clone();
    }
    if let Some(base_url) = &args.base_url {
        config.assets.base_url = base_url.clone();
    }
    if let Some(data_dir) = &args.data_dir {
        config.storage.data_dir = Some(data_dir.clone());
    }
    config
}

/// 데이터 디렉토리 결정 (CLI/설정 → 플랫폼 기본 경로 → 현재 디렉토리)
///
/// - macOS: `~/Library/Application Support/com.soundnovel.reader`
/// - Windows: `%APPDATA%\soundnovel\reader`
/// - Linux: `~/.local/share/soundnovel-reader`
fn resolve_data_dir(config: &ReaderConfig) -> PathBuf {
    config
        .storage
        .data_dir
        .clone()
        .or_else(|| ConfigManager::data_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."))
}

fn build_storage(
    config: &ReaderConfig,
    ephemeral: bool,
) -> Result<(Arc<dyn PreferenceStorage>, Arc<dyn BookmarkStorage>)> {
    if ephemeral {
        info!("임시 저장소 사용 (메모리)");
        let preferences: Arc<dyn PreferenceStorage> = Arc::new(MemoryPreferences::new());
        let bookmarks: Arc<dyn BookmarkStorage> = Arc::new(MemoryBookmarkStorage::new());
        return Ok((preferences, bookmarks));
    }

    let data_dir = resolve_data_dir(config);
    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("데이터 디렉토리 생성 실패: {}", data_dir.display()))?;

    let preferences = JsonPreferenceFile::open(data_dir.join(&config.storage.preferences_file));
    let db_path = data_dir.join(&config.storage.bookmark_db);
    let bookmarks = SqliteBookmarkStorage::open(&db_path)?;
    match bookmarks.purge_expired() {
        Ok(0) => {}
        Ok(purged) => info!("만료된 북마크 {purged}개 정리"),
        Err(e) => warn!("만료 북마크 정리 실패: {e}"),
    }
    info!("북마크 저장소: {}", db_path.display());
    let preferences: Arc<dyn PreferenceStorage> = Arc::new(preferences);
    let bookmarks: Arc<dyn BookmarkStorage> = Arc::new(bookmarks);
    Ok((preferences, bookmarks))
}

fn build_content(
    config: &ReaderConfig,
) -> Result<(Arc<dyn ContentSource>, Arc<dyn AssetPreloader>)> {
    let location = config.assets.catalog.as_str();
    if location.starts_with("http://") || location.starts_with("https://") {
        #[cfg(feature = "http")]
        {
            let remote = Arc::new(soundnovel_content::http::HttpContentSource::new(location)?);
            let source: Arc<dyn ContentSource> = remote.clone();
            let preloader: Arc<dyn AssetPreloader> = remote;
            return Ok((source, preloader));
        }
        #[cfg(not(feature = "http"))]
        anyhow::bail!("원격 카탈로그는 `http` feature가 필요합니다: {location}");
    }
    let source: Arc<dyn ContentSource> = Arc::new(FileContentSource::new(location));
    let preloader: Arc<dyn AssetPreloader> = Arc::new(FilePreloader::new());
    Ok((source, preloader))
}

/// 로그 전용 채널 두 개와 종료 흉내 훅
fn null_channels() -> (Arc<dyn AudioChannel>, Arc<dyn AudioChannel>, FinishHook) {
    let music = Arc::new(NullChannel::new("music"));
    let effects = Arc::new(NullChannel::new("effects"));
    let (m, e) = (music.clone(), effects.clone());
    let hook: FinishHook = Arc::new(move |channel| match channel {
        Channel::Music => m.finish(),
        Channel::Effects => e.finish(),
    });
    let music: Arc<dyn AudioChannel> = music;
    let effects: Arc<dyn AudioChannel> = effects;
    (music, effects, hook)
}

#[cfg(feature = "rodio")]
fn build_channels(
    mute: bool,
) -> (Arc<dyn AudioChannel>, Arc<dyn AudioChannel>, Option<FinishHook>) {
    use soundnovel_app::audio::{open_output, RodioChannel};

    if !mute {
        match open_output() {
            Ok(handle) => {
                info!("오디오 출력 장치 사용");
                let music: Arc<dyn AudioChannel> =
                    Arc::new(RodioChannel::new("music", handle.clone()));
                let effects: Arc<dyn AudioChannel> = Arc::new(RodioChannel::new("effects", handle));
                return (music, effects, None);
            }
            Err(e) => warn!("오디오 장치 없음, 로그 전용 채널 사용: {e}"),
        }
    }
    let (music, effects, hook) = null_channels();
    (music, effects, Some(hook))
}

#[cfg(not(feature = "rodio"))]
fn build_channels(
    _mute: bool,
) -> (Arc<dyn AudioChannel>, Arc<dyn AudioChannel>, Option<FinishHook>) {
    let (music, effects, hook) = null_channels();
    (music, effects, Some(hook))
}

/// 표준 입력 → 버스. 입력이 끝나면 `Quit`.
async fn read_commands(bus: Arc<EventBus>) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) if line.trim().is_empty() => {}
            Ok(Some(line)) => match parse_command(&line) {
                Some(event) => bus.publish(event),
                None => println!("{HELP}"),
            },
            Ok(None) => break,
            Err(e) => {
                warn!("입력 읽기 실패: {e}");
                break;
            }
        }
    }
    bus.publish(AppEvent::Quit);
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();

    let log_filter = format!(
        "soundnovel={lvl},soundnovel_app={lvl},soundnovel_core={lvl},soundnovel_storage={lvl},soundnovel_content={lvl},soundnovel_player={lvl},soundnovel_reader={lvl}",
        lvl = args.log_level
    );
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    print_banner();
    info!("SoundNovel 리더 시작");

    let config = load_config(&args);
    let (preferences, bookmarks) = build_storage(&config, args.ephemeral)?;
    let (content, preloader) = build_content(&config)?;
    let (music, effects, finish_hook) = build_channels(args.mute);

    let ports = SessionPorts {
        view: Arc::new(ConsoleView::stdout()),
        music,
        effects,
        content,
        preloader,
        preferences,
        bookmarks,
    };
    let mut session = ReaderSession::start(&config, ports, args.shell, &args.start).await?;
    if let Some(hook) = finish_hook {
        session = session.with_finish_hook(hook);
    }
    let session = Arc::new(session);

    tokio::spawn(read_commands(session.bus().clone()));
    println!("{HELP}");

    let runner = tokio::spawn(session.clone().run());
    tokio::select! {
        _ = runner => {}
        _ = wait_for_signal() => session.shutdown(),
    }

    info!("SoundNovel 리더 종료");
    Ok(())
}
