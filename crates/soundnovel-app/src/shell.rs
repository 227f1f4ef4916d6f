//! 리더 셸.
//!
//! 단일 페이지 셸은 해시(`#chapter-3`)를, 다중 페이지 셸은 페이지 경로
//! (`chapter-3.html`)를 위치 표시자로 쓴다. 두 셸 모두 히스토리 스택을 갖고,
//! 이동할 때마다 버스에 위치 변경을 발행한다. 컨트롤러는 셸 종류를 모른다.

use clap::ValueEnum;
use parking_lot::Mutex;
use soundnovel_core::models::navigation::Route;
use soundnovel_core::ports::navigator::Navigator;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::debug;

use crate::event_bus::{AppEvent, EventBus, HistoryStep};

/// 셸 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ShellMode {
    /// 단일 페이지 (해시 라우팅)
    #[default]
    Spa,
    /// 다중 페이지 (페이지 재로드)
    Mpa,
}

impl ShellMode {
    pub fn indicator_of(&self, route: Route) -> String {
        match self {
            Self::Spa => route.indicator(),
            Self::Mpa => route.page_path(),
        }
    }
}

#[derive(Debug)]
struct History {
    entries: Vec<String>,
    cursor: usize,
}

/// 히스토리 스택을 가진 셸
pub struct ReaderShell {
    mode: ShellMode,
    bus: Arc<EventBus>,
    history: Mutex<History>,
    /// 다중 페이지 셸의 페이지 로드 횟수
    page_loads: AtomicU64,
}

impl ReaderShell {
    pub fn new(mode: ShellMode, bus: Arc<EventBus>, initial: &str) -> Self {
        Self {
            mode,
            bus,
            history: Mutex::new(History {
                entries: vec![initial.to_string()],
                cursor: 0,
            }),
            page_loads: AtomicU64::new(0),
        }
    }

    pub fn mode(&self) -> ShellMode {
        self.mode
    }

    /// 현재 위치 표시자
    pub fn location(&self) -> String {
        let history = self.history.lock();
        history.entries[history.cursor].clone()
    }

    /// 현재 위치로 최초 로드
    pub fn load(&self) {
        let location = self.location();
        self.announce(location);
    }

    /// 히스토리 앞/뒤 이동. 더 갈 곳이 없으면 false.
    pub fn step(&self, step: HistoryStep) -> bool {
        let location = {
            let mut history = self.history.lock();
            let target = match step {
                HistoryStep::Back => history.cursor.checked_sub(1),
                HistoryStep::Forward => {
                    Some(history.cursor + 1).filter(|&i| i < history.entries.len())
                }
            };
            let Some(target) = target else {
                debug!("히스토리 끝, 이동 없음: {step:?}");
                return false;
            };
            history.cursor = target;
            history.entries[target].clone()
        };
        self.announce(location);
        true
    }

    pub fn page_loads(&self) -> u64 {
        self.page_loads.load(Ordering::SeqCst)
    }

    fn announce(&self, location: String) {
        if self.mode == ShellMode::Mpa {
            self.page_loads.fetch_add(1, Ordering::SeqCst);
        }
        self.bus.publish(AppEvent::LocationChanged(location));
    }
}

impl Navigator for ReaderShell {
    fn go(&self, route: Route) {
        let location = self.mode.indicator_of(route);
        {
            let mut history = self.history.lock();
            let keep = history.cursor + 1;
            history.entries.truncate(keep);
            history.entries.push(location.clone());
            history.cursor = keep;
        }
        self.announce(location);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(rx: &mut tokio::sync::broadcast::Receiver<AppEvent>) -> Vec<String> {
        let mut out = Vec::new();
        while let Ok(AppEvent::LocationChanged(location)) = rx.try_recv() {
            out.push(location);
        }
        out
    }

    #[test]
    fn single_page_shell_uses_hash_indicators() {
        let bus = Arc::new(EventBus::new(16));
        let mut rx = bus.subscribe();
        let shell = ReaderShell::new(ShellMode::Spa, bus, "");

        shell.go(Route::Chapter(1));
        shell.go(Route::About);
        assert_eq!(drain(&mut rx), vec!["#chapter-1", "#about"]);
        assert_eq!(shell.page_loads(), 0);
    }

    #[test]
    fn history_back_and_forward_reannounce() {
        let bus = Arc::new(EventBus::new(16));
        let mut rx = bus.subscribe();
        let shell = ReaderShell::new(ShellMode::Spa, bus, "");
        shell.go(Route::Chapter(1));
        shell.go(Route::Chapter(2));
        drain(&mut rx);

        assert!(shell.step(HistoryStep::Back));
        assert!(shell.step(HistoryStep::Back));
        assert!(!shell.step(HistoryStep::Back));
        assert!(shell.step(HistoryStep::Forward));
        assert_eq!(drain(&mut rx), vec!["#chapter-1", "", "#chapter-1"]);

        // 뒤로 간 상태에서 새로 이동하면 앞쪽 기록은 버려진다
        shell.go(Route::About);
        assert!(!shell.step(HistoryStep::Forward));
        assert_eq!(shell.location(), "#about");
    }

    #[test]
    fn multi_page_shell_counts_page_loads() {
        let bus = Arc::new(EventBus::new(16));
        let mut rx = bus.subscribe();
        let shell = ReaderShell::new(ShellMode::Mpa, bus, "index.html");

        shell.load();
        shell.go(Route::Chapter(3));
        shell.step(HistoryStep::Back);
        assert_eq!(
            drain(&mut rx),
            vec!["index.html", "chapter-3.html", "index.html"]
        );
        assert_eq!(shell.page_loads(), 3);
    }
}
