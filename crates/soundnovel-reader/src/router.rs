//! 내비게이션 라우터.
//!
//! 위치 표시자(해시 또는 페이지 경로)를 화면으로 바꾼다.
//! 히스토리 앞/뒤 이동도 프로그램 이동과 같은 경로로 들어온다.

use parking_lot::Mutex;
use soundnovel_core::models::navigation::Route;
use soundnovel_core::ports::view::ViewSurface;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::controller::ChapterSessionController;

/// 표시자 해석 결과 (카탈로그 확인 전)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Indicator {
    Chapter(u32),
    About,
    Other,
}

/// 위치 표시자 파싱
///
/// 허용 형식: `chapter-N`, `chapter/N`, `chapter-N.html`, 앞의 `#` 또는 `/` 생략 가능.
/// 작가 소개: `about`, `about-author`, `about-author.html`.
pub fn parse_indicator(raw: &str) -> Indicator {
    let trimmed = raw.trim().trim_start_matches('#').trim_start_matches('/');
    let name = trimmed.strip_suffix(".html").unwrap_or(trimmed);

    if matches!(name, "about" | "about-author") {
        return Indicator::About;
    }

    let number = name
        .strip_prefix("chapter-")
        .or_else(|| name.strip_prefix("chapter/"));
    match number {
        Some(digits) if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) => {
            digits.parse().map_or(Indicator::Other, Indicator::Chapter)
        }
        _ => Indicator::Other,
    }
}

enum RouterMode {
    Ready(Arc<ChapterSessionController>),
    /// 카탈로그 로드 실패. 모든 표시자는 표지로 간다.
    Degraded,
}

/// 위치 표시자 → 화면
pub struct NavigationRouter {
    mode: RouterMode,
    view: Arc<dyn ViewSurface>,
    current: Mutex<Option<Route>>,
}

impl NavigationRouter {
    pub fn new(controller: Arc<ChapterSessionController>, view: Arc<dyn ViewSurface>) -> Self {
        Self {
            mode: RouterMode::Ready(controller),
            view,
            current: Mutex::new(None),
        }
    }

    /// 강등 상태 라우터. 강등 화면을 한 번 표시한다.
    pub fn degraded(view: Arc<dyn ViewSurface>, reason: &str) -> Self {
        warn!("카탈로그 없이 시작 (강등): {reason}");
        view.show_degraded(reason);
        Self {
            mode: RouterMode::Degraded,
            view,
            current: Mutex::new(Some(Route::FrontPage)),
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self.mode, RouterMode::Degraded)
    }

    pub fn current_route(&self) -> Option<Route> {
        *self.current.lock()
    }

    /// 표시자가 가리키는 화면. 카탈로그에 없는 챕터는 표지.
    pub fn resolve(&self, indicator: &str) -> Route {
        let RouterMode::Ready(controller) = &self.mode else {
            return Route::FrontPage;
        };
        match parse_indicator(indicator) {
            Indicator::Chapter(id) if controller.catalog().contains(id) => Route::Chapter(id),
            Indicator::Chapter(id) => {
                debug!("카탈로그에 없는 챕터 {id}, 표지로");
                Route::FrontPage
            }
            Indicator::About => Route::About,
            Indicator::Other => Route::FrontPage,
        }
    }

    /// 위치 변경 알림 (최초 로드, 링크 이동, 히스토리 이동 모두)
    pub fn on_location_changed(&self, indicator: &str) -> Route {
        let route = self.resolve(indicator);
        *self.current.lock() = Some(route);

        let RouterMode::Ready(controller) = &self.mode else {
            debug!("강등 상태, 위치 변경 무시: {indicator:?}");
            return route;
        };

        info!("위치 변경: {indicator:?} → {route}");
        match route {
            Route::Chapter(id) => {
                controller.enter(id);
            }
            Route::About => controller.show_about(),
            Route::FrontPage => controller.show_front_page(),
        }
        route
    }

    pub fn view(&self) -> &Arc<dyn ViewSurface> {
        &self.view
    }
}
