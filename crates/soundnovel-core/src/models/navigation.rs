//! 내비게이션 모델.
//!
//! 위치 표시자(location indicator)는 두 셸 모두에서 문자열로 다룬다.
//! - 단일 페이지: `#chapter-3`, `#about`, `#`
//! - 다중 페이지: `chapter-3.html`, `about-author.html`, `index.html`

use serde::{Deserialize, Serialize};
use std::fmt;

/// 라우터가 결정하는 최종 화면
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Route {
    FrontPage,
    Chapter(u32),
    About,
}

impl Route {
    /// 단일 페이지 셸 기준 위치 표시자
    pub fn indicator(&self) -> String {
        match self {
            Self::FrontPage => String::new(),
            Self::Chapter(id) => format!("#chapter-{id}"),
            Self::About => "#about".to_string(),
        }
    }

    /// 다중 페이지 셸 기준 페이지 경로
    pub fn page_path(&self) -> String {
        match self {
            Self::FrontPage => "index.html".to_string(),
            Self::Chapter(id) => format!("chapter-{id}.html"),
            Self::About => "about-author.html".to_string(),
        }
    }

    pub fn chapter_id(&self) -> Option<u32> {
        match self {
            Self::Chapter(id) => Some(*id),
            _ => None,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FrontPage => f.write_str("front-page"),
            Self::Chapter(id) => write!(f, "chapter {id}"),
            Self::About => f.write_str("about"),
        }
    }
}

/// 이전/다음 버튼의 이동 대상
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NavTarget {
    FrontPage,
    Chapter(u32),
}

impl From<NavTarget> for Route {
    fn from(target: NavTarget) -> Self {
        match target {
            NavTarget::FrontPage => Route::FrontPage,
            NavTarget::Chapter(id) => Route::Chapter(id),
        }
    }
}

/// 챕터 화면의 이동 방향
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Back,
    Next,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indicators_per_shell() {
        assert_eq!(Route::Chapter(3).indicator(), "#chapter-3");
        assert_eq!(Route::Chapter(3).page_path(), "chapter-3.html");
        assert_eq!(Route::About.page_path(), "about-author.html");
        assert_eq!(Route::FrontPage.indicator(), "");
    }

    #[test]
    fn nav_target_converts_to_route() {
        assert_eq!(Route::from(NavTarget::Chapter(2)), Route::Chapter(2));
        assert_eq!(Route::from(NavTarget::FrontPage), Route::FrontPage);
    }
}
