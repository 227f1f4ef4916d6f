//! 챕터 본문 마커 모델.
//!
//! 마커는 본문 마크업에 인라인으로 들어간 멀티미디어 트리거 지점이다.
//! 클래스 이름으로 종류를 구분하고 `data-src` 속성으로 에셋을 가리킨다.

use serde::{Deserialize, Serialize};
use std::fmt;

/// 마커 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MarkerKind {
    /// 배경 이미지 변경 (`bg-change`)
    Background,
    /// 배경 음악 변경 (`music-change`)
    MusicChange,
    /// 배경 음악 정지 (`music-stop`)
    MusicStop,
    /// 화면 진입 시 자동 효과음 (`auto-sound`)
    AutoSound,
    /// 수동 효과음 버튼 (`sound-effect`)
    SoundEffect,
    /// 클릭 가능한 강조 문구 (`clickable-sound`)
    ClickableSound,
}

impl MarkerKind {
    /// 마크업 클래스 이름 → 마커 종류
    pub fn from_class(class: &str) -> Option<Self> {
        match class {
            "bg-change" => Some(Self::Background),
            "music-change" => Some(Self::MusicChange),
            "music-stop" => Some(Self::MusicStop),
            "auto-sound" => Some(Self::AutoSound),
            "sound-effect" => Some(Self::SoundEffect),
            "clickable-sound" => Some(Self::ClickableSound),
            _ => None,
        }
    }

    pub fn class_name(&self) -> &'static str {
        match self {
            Self::Background => "bg-change",
            Self::MusicChange => "music-change",
            Self::MusicStop => "music-stop",
            Self::AutoSound => "auto-sound",
            Self::SoundEffect => "sound-effect",
            Self::ClickableSound => "clickable-sound",
        }
    }

    /// 뷰포트 가시성으로 발동되는 마커인지 (토글 마커는 직접 활성화)
    pub fn is_visibility_driven(&self) -> bool {
        !self.is_toggle()
    }

    /// 사용자 활성화로 재생/정지가 토글되는 마커인지
    pub fn is_toggle(&self) -> bool {
        matches!(self, Self::SoundEffect | Self::ClickableSound)
    }

    /// 에셋 소스가 필요한 종류인지
    pub fn requires_source(&self) -> bool {
        !matches!(self, Self::MusicStop)
    }
}

impl fmt::Display for MarkerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.class_name())
    }
}

/// 마커 식별자: 챕터 번호 + 문서 내 순번
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MarkerId {
    pub chapter: u32,
    pub index: usize,
}

impl MarkerId {
    pub fn new(chapter: u32, index: usize) -> Self {
        Self { chapter, index }
    }
}

impl fmt::Display for MarkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.chapter, self.index)
    }
}

/// 본문에서 추출된 마커
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Marker {
    pub id: MarkerId,
    pub kind: MarkerKind,
    /// 에셋 경로 (`music-stop`은 없음)
    pub src: Option<String>,
}

impl Marker {
    pub fn source(&self) -> Option<&str> {
        self.src.as_deref()
    }
}

/// 마커 목록에서 특정 종류의 첫 마커 소스
pub fn first_source(markers: &[Marker], kind: MarkerKind) -> Option<&str> {
    markers
        .iter()
        .filter(|m| m.kind == kind)
        .find_map(Marker::source)
}
