//! 터미널 화면과 명령 입력.
//!
//! 렌더링 엔진이 없으므로 화면 요청을 한 줄씩 출력하고,
//! 표준 입력의 명령을 `AppEvent`로 바꾼다.

use parking_lot::Mutex;
use serde_json::Value;
use soundnovel_core::models::bookmark::Bookmark;
use soundnovel_core::models::chapter::ChapterData;
use soundnovel_core::models::marker::{MarkerId, MarkerKind};
use soundnovel_core::models::navigation::{Direction, NavTarget};
use soundnovel_core::models::settings::{MusicMode, SettingKey, Typography};
use soundnovel_core::ports::view::ViewSurface;
use std::io::Write;
use tracing::{debug, warn};

use crate::event_bus::{AppEvent, Channel, HistoryStep};

pub const HELP: &str = "\
명령:
  go <위치>              위치 이동 (예: #chapter-2, about, index.html)
  next | back            다음/이전 버튼
  hb | hf                히스토리 뒤로/앞으로
  see <장>:<번호> [비율]  마커 가시 비율 알림 (기본 1.0)
  tap <장>:<번호>         효과음 버튼/강조 문구 활성화
  set <키> <값>          환경설정 변경 (예: set musicVolume 40)
  music <모드>           enabled | disabled | chapter-disabled
  bookmark | unbookmark  북마크 저장/삭제
  end music|effects      재생 종료 흉내
  quit";

/// 한 줄 명령 해석. 알 수 없는 명령이면 `None`.
pub fn parse_command(line: &str) -> Option<AppEvent> {
    let mut words = line.split_whitespace();
    let command = words.next()?;
    let rest: Vec<&str> = words.collect();

    let event = match (command, rest.as_slice()) {
        ("go", [location]) => AppEvent::Open((*location).to_string()),
        ("go", []) => AppEvent::Open(String::new()),
        ("next", []) => AppEvent::Navigate(Direction::Next),
        ("back", []) => AppEvent::Navigate(Direction::Back),
        ("hb", []) => AppEvent::History(HistoryStep::Back),
        ("hf", []) => AppEvent::History(HistoryStep::Forward),
        ("see", [marker]) => AppEvent::Visibility {
            marker: parse_marker(marker)?,
            ratio: 1.0,
        },
        ("see", [marker, ratio]) => AppEvent::Visibility {
            marker: parse_marker(marker)?,
            ratio: ratio.parse().ok()?,
        },
        ("tap", [marker]) => AppEvent::Activate(parse_marker(marker)?),
        ("set", [key, value @ ..]) if !value.is_empty() => {
            let key: SettingKey = key.parse().ok()?;
            let raw = value.join(" ");
            let value = serde_json::from_str(&raw).unwrap_or(Value::String(raw));
            AppEvent::ChangeSetting { key, value }
        }
        ("music", [mode]) => AppEvent::SetMusicMode(mode.parse::<MusicMode>().ok()?),
        ("bookmark", []) => AppEvent::BookmarkNow,
        ("unbookmark", []) => AppEvent::ClearBookmark,
        ("end", ["music"]) => AppEvent::FinishTrack(Channel::Music),
        ("end", ["effects"]) => AppEvent::FinishTrack(Channel::Effects),
        ("quit" | "exit", []) => AppEvent::Quit,
        _ => return None,
    };
    Some(event)
}

/// `<장>:<번호>` 형식
fn parse_marker(raw: &str) -> Option<MarkerId> {
    let (chapter, index) = raw.split_once(':')?;
    Some(MarkerId::new(chapter.parse().ok()?, index.parse().ok()?))
}

/// 마크업에서 태그를 걷어낸 본문
fn plain_text(markup: &str) -> String {
    let mut text = String::with_capacity(markup.len());
    let mut in_tag = false;
    for c in markup.chars() {
        match c {
            '<' => in_tag = true,
            '>' => {
                in_tag = false;
                text.push(' ');
            }
            _ if !in_tag => text.push(c),
            _ => {}
        }
    }
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn describe_target(target: NavTarget) -> String {
    match target {
        NavTarget::FrontPage => "표지".to_string(),
        NavTarget::Chapter(id) => format!("{id}장"),
    }
}

/// 화면 요청을 한 줄씩 출력하는 화면
pub struct ConsoleView {
    out: Mutex<Box<dyn Write + Send>>,
}

impl ConsoleView {
    pub fn stdout() -> Self {
        Self::with_writer(Box::new(std::io::stdout()))
    }

    pub fn with_writer(out: Box<dyn Write + Send>) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    fn line(&self, text: &str) {
        let mut out = self.out.lock();
        if let Err(e) = writeln!(out, "{text}").and_then(|()| out.flush()) {
            warn!("화면 출력 실패: {e}");
        }
    }
}

impl ViewSurface for ConsoleView {
    fn set_background(&self, src: &str) {
        self.line(&format!("[배경] {src}"));
    }

    fn set_content(&self, chapter_id: u32, title: &str, markup: &str) {
        debug!("{chapter_id}장 본문 교체 ({}바이트)", markup.len());
        self.line(&format!("── {chapter_id}장: {title} ──"));
        self.line(&plain_text(markup));
    }

    fn reveal_content(&self) {
        self.line("[본문 표시]");
    }

    fn set_nav_targets(&self, back: NavTarget, next: NavTarget) {
        self.line(&format!(
            "[이동] ← {} | {} →",
            describe_target(back),
            describe_target(next)
        ));
    }

    fn set_control_active(&self, marker: MarkerId, kind: MarkerKind, active: bool) {
        let state = if active { "재생 중" } else { "대기" };
        self.line(&format!("[{kind} {marker}] {state}"));
    }

    fn apply_typography(&self, typography: &Typography) {
        self.line(&format!(
            "[글꼴] {}px {} {} (배경 불투명도 {}%)",
            typography.font_size,
            typography.font_family.as_str(),
            typography.text_color.as_str(),
            typography.bg_opacity
        ));
    }

    fn show_front_page(&self, background: &str, bookmark: Option<&Bookmark>) {
        self.line(&format!("══ 표지 ══ [배경] {background}"));
        if let Some(bookmark) = bookmark {
            self.line(&format!(
                "이어 읽기: {}장 \"{}\" (go #chapter-{})",
                bookmark.chapter_id, bookmark.title, bookmark.chapter_id
            ));
        }
    }

    fn show_about(&self, about: Option<&ChapterData>) {
        match about {
            Some(about) => {
                self.line(&format!("══ {} ══", about.title));
                self.line(&plain_text(&about.content));
            }
            None => self.line("══ 작가 소개 없음 ══"),
        }
    }

    fn show_degraded(&self, reason: &str) {
        self.line(&format!("!! 챕터를 불러오지 못했습니다: {reason}"));
    }

    fn notify(&self, message: &str) {
        self.line(&format!("* {message}"));
    }
}
