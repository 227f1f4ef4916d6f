//! 리더 세션 라이프사이클.
//!
//! `ReaderSession`이 모든 협력자를 한 번 생성해 주입하고(DI),
//! 버스 이벤트를 라우터/컨트롤러로 전달한다. 종료 신호는 `watch` 채널로 퍼진다.

use soundnovel_core::bookmark_store::BookmarkStore;
use soundnovel_core::config::ReaderConfig;
use soundnovel_core::models::asset::AssetBase;
use soundnovel_core::ports::audio::AudioChannel;
use soundnovel_core::ports::content::{AssetPreloader, ContentSource};
use soundnovel_core::ports::navigator::Navigator;
use soundnovel_core::ports::storage::{BookmarkStorage, PreferenceStorage};
use soundnovel_core::ports::view::ViewSurface;
use soundnovel_core::settings_store::SettingsStore;
use soundnovel_player::fade::FadeCadence;
use soundnovel_player::AudioEngine;
use soundnovel_reader::{
    ChapterSessionController, ControllerDeps, NavigationRouter, SessionTiming,
};
use std::sync::Arc;
use tokio::sync::{broadcast, watch};
use tracing::{debug, error, info, warn};

use crate::event_bus::{AppEvent, Channel, EventBus};
use crate::shell::{ReaderShell, ShellMode};

/// 세션이 사용하는 외부 어댑터 묶음
pub struct SessionPorts {
    pub view: Arc<dyn ViewSurface>,
    pub music: Arc<dyn AudioChannel>,
    pub effects: Arc<dyn AudioChannel>,
    pub content: Arc<dyn ContentSource>,
    pub preloader: Arc<dyn AssetPreloader>,
    pub preferences: Arc<dyn PreferenceStorage>,
    pub bookmarks: Arc<dyn BookmarkStorage>,
}

/// 로그 전용 채널의 종료 흉내 훅
pub type FinishHook = Arc<dyn Fn(Channel) -> bool + Send + Sync>;

/// 프로세스당 하나인 리더 세션
pub struct ReaderSession {
    bus: Arc<EventBus>,
    shell: Arc<ReaderShell>,
    router: NavigationRouter,
    controller: Option<Arc<ChapterSessionController>>,
    engine: Arc<AudioEngine>,
    settings: Arc<SettingsStore>,
    bookmarks: Arc<BookmarkStore>,
    finish_hook: Option<FinishHook>,
    shutdown_tx: watch::Sender<bool>,
}

impl std::fmt::Debug for ReaderSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReaderSession").finish_non_exhaustive()
    }
}

impl ReaderSession {
    /// 협력자 생성 + 카탈로그 로드
    ///
    /// 카탈로그를 가져오지 못해도 실패하지 않는다. 라우터가 강등 상태로 시작한다.
    pub async fn start(
        config: &ReaderConfig,
        ports: SessionPorts,
        shell_mode: ShellMode,
        initial_location: &str,
    ) -> Result<Self, soundnovel_core::error::CoreError> {
        let SessionPorts {
            view,
            music,
            effects,
            content,
            preloader,
            preferences,
            bookmarks,
        } = ports;

        let assets = AssetBase::parse(&config.assets.base_url)?;
        let settings = Arc::new(SettingsStore::load(preferences));
        let bookmarks = Arc::new(BookmarkStore::with_max_age(
            bookmarks,
            config.bookmark_max_age(),
        ));
        let engine = Arc::new(AudioEngine::new(
            music,
            effects,
            view.clone(),
            settings.clone(),
            assets.clone(),
            FadeCadence::from_config(config),
        ));

        let bus = Arc::new(EventBus::default());
        let shell = Arc::new(ReaderShell::new(shell_mode, bus.clone(), initial_location));

        let (router, controller) = match content.fetch_catalog().await {
            Ok(catalog) => {
                info!("카탈로그 로드: 챕터 {}개", catalog.len());
                let navigator: Arc<dyn Navigator> = shell.clone();
                let controller = ChapterSessionController::new(
                    ControllerDeps {
                        catalog: Arc::new(catalog),
                        engine: engine.clone(),
                        settings: settings.clone(),
                        bookmarks: bookmarks.clone(),
                        view: view.clone(),
                        navigator,
                        preloader,
                        assets,
                    },
                    SessionTiming::from_config(config),
                    config.assets.front_page_background.clone(),
                );
                (
                    NavigationRouter::new(controller.clone(), view),
                    Some(controller),
                )
            }
            Err(e) => {
                error!("카탈로그 로드 실패: {e}");
                (NavigationRouter::degraded(view, &e.to_string()), None)
            }
        };

        let (shutdown_tx, _) = watch::channel(false);
        Ok(Self {
            bus,
            shell,
            router,
            controller,
            engine,
            settings,
            bookmarks,
            finish_hook: None,
            shutdown_tx,
        })
    }

    /// 로그 전용 채널 사용 시 `end` 명령 연결
    pub fn with_finish_hook(mut self, hook: FinishHook) -> Self {
        self.finish_hook = Some(hook);
        self
    }

    pub fn bus(&self) -> &Arc<EventBus> {
        &self.bus
    }

    pub fn shell(&self) -> &Arc<ReaderShell> {
        &self.shell
    }

    pub fn router(&self) -> &NavigationRouter {
        &self.router
    }

    pub fn controller(&self) -> Option<&Arc<ChapterSessionController>> {
        self.controller.as_ref()
    }

    pub fn engine(&self) -> &Arc<AudioEngine> {
        &self.engine
    }

    pub fn settings(&self) -> &Arc<SettingsStore> {
        &self.settings
    }

    pub fn bookmarks(&self) -> &Arc<BookmarkStore> {
        &self.bookmarks
    }

    /// 종료 수신기
    pub fn subscribe_shutdown(&self) -> watch::Receiver<bool> {
        self.shutdown_tx.subscribe()
    }

    /// 종료 신호 발송 + 오디오 정리
    pub fn shutdown(&self) {
        info!("종료 신호 발송");
        self.engine.shutdown();
        // 수신기가 없어도 값은 남긴다
        self.shutdown_tx.send_replace(true);
    }

    /// 이벤트 하나 처리. `Quit`이면 false.
    pub fn dispatch(&self, event: AppEvent) -> bool {
        debug!("이벤트 처리: {event:?}");
        match event {
            AppEvent::LocationChanged(location) => {
                self.router.on_location_changed(&location);
            }
            AppEvent::Open(location) => {
                let route = self.router.resolve(&location);
                self.shell.go(route);
            }
            AppEvent::History(step) => {
                self.shell.step(step);
            }
            AppEvent::Quit => return false,
            AppEvent::FinishTrack(channel) => match &self.finish_hook {
                Some(hook) => {
                    if !hook(channel) {
                        debug!("종료할 재생 없음: {channel:?}");
                    }
                }
                None => warn!("실제 출력 채널에서는 종료를 흉내 낼 수 없습니다"),
            },
            other => self.dispatch_to_controller(other),
        }
        true
    }

    fn dispatch_to_controller(&self, event: AppEvent) {
        let Some(controller) = &self.controller else {
            debug!("강등 상태, 이벤트 무시: {event:?}");
            return;
        };

        let result = match event {
            AppEvent::Navigate(direction) => {
                controller.navigate(direction);
                Ok(())
            }
            AppEvent::Visibility { marker, ratio } => {
                controller.on_visibility(marker, ratio);
                Ok(())
            }
            AppEvent::Activate(marker) => {
                controller.activate_control(marker);
                Ok(())
            }
            AppEvent::ChangeSetting { key, value } => controller.update_setting(key, value).map(drop),
            AppEvent::SetMusicMode(mode) => controller.set_music_mode(mode).map(drop),
            AppEvent::BookmarkNow => controller.bookmark_now().map(drop),
            AppEvent::ClearBookmark => controller.clear_bookmark(),
            _ => Ok(()),
        };
        if let Err(e) = result {
            warn!("요청 처리 실패: {e}");
        }
    }

    /// 버스 구독 루프. 종료 신호나 `Quit`까지 실행한다.
    pub async fn run(self: Arc<Self>) {
        let mut events = self.bus.subscribe();
        let mut shutdown_rx = self.subscribe_shutdown();
        self.shell.load();

        loop {
            tokio::select! {
                received = events.recv() => match received {
                    Ok(event) => {
                        if !self.dispatch(event) {
                            self.shutdown();
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!("이벤트 {skipped}개 유실");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                },
                changed = shutdown_rx.changed() => {
                    if changed.is_err() || *shutdown_rx.borrow() {
                        break;
                    }
                }
            }
        }
        info!("리더 세션 종료");
    }
}

/// OS 시그널 대기 (SIGINT, SIGTERM). 등록 실패 시 Ctrl+C만 기다린다.
pub async fn wait_for_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        match (
            signal(SignalKind::interrupt()),
            signal(SignalKind::terminate()),
        ) {
            (Ok(mut sigint), Ok(mut sigterm)) => {
                tokio::select! {
                    _ = sigint.recv() => info!("SIGINT 수신"),
                    _ = sigterm.recv() => info!("SIGTERM 수신"),
                }
                return;
            }
            _ => warn!("시그널 핸들러 등록 실패, Ctrl+C만 대기"),
        }
    }

    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Ctrl+C 대기 실패: {e}");
    }
    info!("Ctrl+C 수신");
}
