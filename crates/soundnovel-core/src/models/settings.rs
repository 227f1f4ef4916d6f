//! 사용자 환경설정 모델.
//!
//! 인식되는 키 집합은 [`SettingKey`]로 고정되어 있다.
//! 영구 저장 형식은 camelCase 키의 JSON 객체이며, 로드 시에는
//! 키 단위로 검증해 잘못된 값만 버리고 기본값을 유지한다.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

use crate::error::CoreError;

/// 환경설정이 저장되는 키 (PreferenceStorage 기준)
pub const SETTINGS_STORAGE_KEY: &str = "soundNovelSettings";

/// 구버전 셸이 기록하던 음악 on/off 키
const LEGACY_MUSIC_ENABLED_KEY: &str = "musicEnabled";

/// 글꼴 크기 허용 범위 (px)
const FONT_SIZE_RANGE: std::ops::RangeInclusive<u64> = 8..=72;

/// 배경 음악 모드
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MusicMode {
    /// 음악 재생 (음소거된 챕터 제외)
    #[default]
    Enabled,
    /// 전역 음악 끄기
    Disabled,
    /// 현재 챕터만 음소거
    #[serde(alias = "disabled-chapter")]
    ChapterDisabled,
}

impl MusicMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Enabled => "enabled",
            Self::Disabled => "disabled",
            Self::ChapterDisabled => "chapter-disabled",
        }
    }
}

impl FromStr for MusicMode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "enabled" => Ok(Self::Enabled),
            "disabled" => Ok(Self::Disabled),
            "chapter-disabled" | "disabled-chapter" => Ok(Self::ChapterDisabled),
            other => Err(CoreError::validation(
                "musicMode",
                format!("알 수 없는 모드: {other}"),
            )),
        }
    }
}

impl fmt::Display for MusicMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 본문 글꼴 계열
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FontFamily {
    #[default]
    Serif,
    SansSerif,
    Monospace,
}

impl FontFamily {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Serif => "serif",
            Self::SansSerif => "sans-serif",
            Self::Monospace => "monospace",
        }
    }
}

impl FromStr for FontFamily {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "serif" => Ok(Self::Serif),
            "sans-serif" => Ok(Self::SansSerif),
            "monospace" => Ok(Self::Monospace),
            other => Err(CoreError::validation(
                "fontFamily",
                format!("지원하지 않는 글꼴: {other}"),
            )),
        }
    }
}

/// 본문 색상 (`#rgb` 또는 `#rrggbb`, 소문자로 정규화)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct TextColor(String);

impl TextColor {
    /// 색상 문자열 검증
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        let hex = raw.strip_prefix('#')?;
        if !matches!(hex.len(), 3 | 6) || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        Some(Self(format!("#{}", hex.to_ascii_lowercase())))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for TextColor {
    fn default() -> Self {
        Self("#ffffff".to_string())
    }
}

/// 인식되는 환경설정 키
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettingKey {
    MusicMode,
    EffectsEnabled,
    MusicLoop,
    MusicVolume,
    EffectsVolume,
    AutoBookmark,
    FontSize,
    FontFamily,
    TextColor,
    BgOpacity,
    DisabledChapters,
}

impl SettingKey {
    /// 전체 키 목록
    pub const ALL: [SettingKey; 11] = [
        Self::MusicMode,
        Self::EffectsEnabled,
        Self::MusicLoop,
        Self::MusicVolume,
        Self::EffectsVolume,
        Self::AutoBookmark,
        Self::FontSize,
        Self::FontFamily,
        Self::TextColor,
        Self::BgOpacity,
        Self::DisabledChapters,
    ];

    /// 영구 저장 키 이름
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MusicMode => "musicMode",
            Self::EffectsEnabled => "effectsEnabled",
            Self::MusicLoop => "musicLoop",
            Self::MusicVolume => "musicVolume",
            Self::EffectsVolume => "effectsVolume",
            Self::AutoBookmark => "autoBookmark",
            Self::FontSize => "fontSize",
            Self::FontFamily => "fontFamily",
            Self::TextColor => "textColor",
            Self::BgOpacity => "bgOpacity",
            Self::DisabledChapters => "disabledChapters",
        }
    }

    /// 오디오 엔진에 즉시 전파해야 하는 키인지
    pub fn affects_playback(&self) -> bool {
        matches!(
            self,
            Self::MusicVolume | Self::EffectsVolume | Self::MusicLoop
        )
    }

    /// 본문 표시에 영향을 주는 키인지
    pub fn affects_typography(&self) -> bool {
        matches!(
            self,
            Self::FontSize | Self::FontFamily | Self::TextColor | Self::BgOpacity
        )
    }
}

impl FromStr for SettingKey {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| CoreError::validation(s, "인식되지 않는 설정 키"))
    }
}

impl fmt::Display for SettingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 본문 표시 설정 (ViewSurface 전달용)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Typography {
    pub font_size: u16,
    pub font_family: FontFamily,
    pub text_color: TextColor,
    /// 본문 배경 불투명도 (0~100)
    pub bg_opacity: u8,
}

/// 사용자 환경설정 스냅샷
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub music_mode: MusicMode,
    pub effects_enabled: bool,
    pub music_loop: bool,
    /// 배경 음악 볼륨 (0~100)
    pub music_volume: u8,
    /// 효과음 볼륨 (0~100)
    pub effects_volume: u8,
    pub auto_bookmark: bool,
    /// 본문 글꼴 크기 (px)
    pub font_size: u16,
    pub font_family: FontFamily,
    pub text_color: TextColor,
    /// 본문 배경 불투명도 (0~100)
    pub bg_opacity: u8,
    /// 음악이 강제 음소거되는 챕터 (저장 시 오름차순 배열)
    pub disabled_chapters: BTreeSet<u32>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            music_mode: MusicMode::Enabled,
            effects_enabled: true,
            music_loop: false,
            music_volume: 50,
            effects_volume: 70,
            auto_bookmark: false,
            font_size: 16,
            font_family: FontFamily::Serif,
            text_color: TextColor::default(),
            bg_opacity: 80,
            disabled_chapters: BTreeSet::new(),
        }
    }
}

impl Settings {
    /// 기본값 위에 영구 저장값을 병합
    pub fn merged(persisted: &Map<String, Value>) -> Self {
        Self::merge(Self::default(), persisted)
    }

    /// `base` 위에 `overlay`를 키 단위로 병합한다.
    ///
    /// 인식되지 않는 키와 잘못된 값은 버리고 `base` 값을 유지한다.
    pub fn merge(mut base: Settings, overlay: &Map<String, Value>) -> Self {
        if !overlay.contains_key(SettingKey::MusicMode.as_str())
            && overlay.get(LEGACY_MUSIC_ENABLED_KEY).and_then(decode_bool) == Some(false)
        {
            base.music_mode = MusicMode::Disabled;
        }

        for (name, value) in overlay {
            if name == LEGACY_MUSIC_ENABLED_KEY {
                continue;
            }
            match name.parse::<SettingKey>() {
                Ok(key) => {
                    if let Err(e) = base.apply(key, value) {
                        debug!("잘못된 설정값 무시: {e}");
                    }
                }
                Err(_) => debug!("알 수 없는 설정 키 무시: {name}"),
            }
        }
        base
    }

    /// 단일 키에 값 적용 (검증 실패 시 상태 변경 없음)
    pub fn apply(&mut self, key: SettingKey, value: &Value) -> Result<(), CoreError> {
        let invalid = || {
            CoreError::validation(key.as_str(), format!("허용되지 않는 값: {value}"))
        };

        match key {
            SettingKey::MusicMode => {
                self.music_mode = value
                    .as_str()
                    .and_then(|s| s.parse().ok())
                    .ok_or_else(invalid)?;
            }
            SettingKey::EffectsEnabled => {
                self.effects_enabled = decode_bool(value).ok_or_else(invalid)?;
            }
            SettingKey::MusicLoop => {
                self.music_loop = decode_bool(value).ok_or_else(invalid)?;
            }
            SettingKey::MusicVolume => {
                self.music_volume = decode_percent(value).ok_or_else(invalid)?;
            }
            SettingKey::EffectsVolume => {
                self.effects_volume = decode_percent(value).ok_or_else(invalid)?;
            }
            SettingKey::AutoBookmark => {
                self.auto_bookmark = decode_bool(value).ok_or_else(invalid)?;
            }
            SettingKey::FontSize => {
                let size = decode_integer(value)
                    .filter(|size| FONT_SIZE_RANGE.contains(size))
                    .ok_or_else(invalid)?;
                self.font_size = size as u16;
            }
            SettingKey::FontFamily => {
                self.font_family = value
                    .as_str()
                    .and_then(|s| s.parse().ok())
                    .ok_or_else(invalid)?;
            }
            SettingKey::TextColor => {
                self.text_color = value
                    .as_str()
                    .and_then(TextColor::parse)
                    .ok_or_else(invalid)?;
            }
            SettingKey::BgOpacity => {
                self.bg_opacity = decode_percent(value).ok_or_else(invalid)?;
            }
            SettingKey::DisabledChapters => {
                self.disabled_chapters = decode_chapters(value).ok_or_else(invalid)?;
            }
        }
        Ok(())
    }

    /// 키의 현재 값 (직렬화 형태)
    pub fn value_of(&self, key: SettingKey) -> Value {
        serde_json::to_value(self)
            .ok()
            .and_then(|mut v| v.get_mut(key.as_str()).map(Value::take))
            .unwrap_or(Value::Null)
    }

    /// 해당 챕터에서 음악 재생이 허용되는지
    ///
    /// 전역 모드가 `Disabled`면 항상 false, 그 외에는 음소거 챕터 여부로 결정한다.
    /// `chapter`가 `None`(표지/소개 페이지)이면 전역 모드만 본다.
    pub fn music_permitted(&self, chapter: Option<u32>) -> bool {
        if self.music_mode == MusicMode::Disabled {
            return false;
        }
        chapter.map_or(true, |id| !self.disabled_chapters.contains(&id))
    }

    /// 챕터 기준 표시용 음악 모드
    pub fn music_mode_for(&self, chapter: Option<u32>) -> MusicMode {
        match (self.music_mode, chapter) {
            (MusicMode::Disabled, _) => MusicMode::Disabled,
            (_, Some(id)) if self.disabled_chapters.contains(&id) => MusicMode::ChapterDisabled,
            _ => MusicMode::Enabled,
        }
    }

    /// 음악 볼륨 (0.0~1.0)
    pub fn music_gain(&self) -> f32 {
        f32::from(self.music_volume) / 100.0
    }

    /// 효과음 볼륨 (0.0~1.0)
    pub fn effects_gain(&self) -> f32 {
        f32::from(self.effects_volume) / 100.0
    }

    pub fn typography(&self) -> Typography {
        Typography {
            font_size: self.font_size,
            font_family: self.font_family,
            text_color: self.text_color.clone(),
            bg_opacity: self.bg_opacity,
        }
    }
}

/// 불리언 (입력 요소가 문자열로 기록한 값 포함)
fn decode_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// 음이 아닌 정수 (숫자 또는 숫자 문자열)
fn decode_integer(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn decode_percent(value: &Value) -> Option<u8> {
    decode_integer(value)
        .filter(|v| *v <= 100)
        .map(|v| v as u8)
}

/// 챕터 목록: 배열이 아니면 무효, 숫자가 아닌 원소는 건너뛴다
fn decode_chapters(value: &Value) -> Option<BTreeSet<u32>> {
    let items = value.as_array()?;
    Some(
        items
            .iter()
            .filter_map(decode_integer)
            .filter_map(|id| u32::try_from(id).ok())
            .collect(),
    )
}
