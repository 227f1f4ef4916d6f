//! 런타임 설정 구조체.
//!
//! 페이드 주기, 화면 공개/자동 북마크 지연, 에셋 경로, 저장 경로 등
//! 사용자 환경설정과 별개인 실행 설정을 정의한다. `ConfigManager`로 JSON 파일에서 로드.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::models::bookmark::BOOKMARK_MAX_AGE;

/// 최상위 실행 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReaderConfig {
    /// 오디오 전환 설정
    #[serde(default)]
    pub audio: AudioConfig,
    /// 화면 전환 타이밍
    #[serde(default)]
    pub timing: TimingConfig,
    /// 에셋 위치
    #[serde(default)]
    pub assets: AssetConfig,
    /// 로컬 저장소 설정
    #[serde(default)]
    pub storage: StorageConfig,
}

// ============================================================
// 오디오 설정
// ============================================================

/// 페이드 단계 설정: 한 단계마다 `fade_step`만큼 볼륨 변경
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioConfig {
    /// 단계당 볼륨 변화량 (0.0~1.0)
    #[serde(default = "default_fade_step")]
    pub fade_step: f32,
    /// 단계 간격 (밀리초)
    #[serde(default = "default_fade_interval_ms")]
    pub fade_interval_ms: u64,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            fade_step: default_fade_step(),
            fade_interval_ms: default_fade_interval_ms(),
        }
    }
}

fn default_fade_step() -> f32 {
    0.05
}

fn default_fade_interval_ms() -> u64 {
    50
}

// ============================================================
// 타이밍 설정
// ============================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimingConfig {
    /// 챕터 진입 후 본문 공개 + 첫 음악 시작까지 지연
    #[serde(default = "default_reveal_delay_ms")]
    pub reveal_delay_ms: u64,
    /// 챕터 진입 후 자동 북마크 기록까지 지연
    #[serde(default = "default_auto_bookmark_delay_ms")]
    pub auto_bookmark_delay_ms: u64,
    /// 작가 소개 화면 공개 지연
    #[serde(default = "default_about_reveal_delay_ms")]
    pub about_reveal_delay_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            reveal_delay_ms: default_reveal_delay_ms(),
            auto_bookmark_delay_ms: default_auto_bookmark_delay_ms(),
            about_reveal_delay_ms: default_about_reveal_delay_ms(),
        }
    }
}

fn default_reveal_delay_ms() -> u64 {
    300
}

fn default_auto_bookmark_delay_ms() -> u64 {
    600
}

fn default_about_reveal_delay_ms() -> u64 {
    100
}

// ============================================================
// 에셋 설정
// ============================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetConfig {
    /// 상대 에셋 경로를 해석할 기준 URL
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// 카탈로그 위치 (파일 경로 또는 http(s) URL)
    #[serde(default = "default_catalog")]
    pub catalog: String,
    /// 표지 화면 기본 배경
    #[serde(default = "default_front_page_background")]
    pub front_page_background: String,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            catalog: default_catalog(),
            front_page_background: default_front_page_background(),
        }
    }
}

fn default_base_url() -> String {
    "file:///srv/soundnovel/".to_string()
}

fn default_catalog() -> String {
    "chapters.json".to_string()
}

fn default_front_page_background() -> String {
    "assets/images/backgrounds/book-cover.jpg".to_string()
}

// ============================================================
// 저장소 설정
// ============================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// 데이터 디렉토리 (None이면 플랫폼 기본 경로)
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
    /// 환경설정 파일 이름
    #[serde(default = "default_preferences_file")]
    pub preferences_file: String,
    /// 북마크 DB 파일 이름
    #[serde(default = "default_bookmark_db")]
    pub bookmark_db: String,
    /// 북마크 유효 기간 (일)
    #[serde(default = "default_bookmark_max_age_days")]
    pub bookmark_max_age_days: u32,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            preferences_file: default_preferences_file(),
            bookmark_db: default_bookmark_db(),
            bookmark_max_age_days: default_bookmark_max_age_days(),
        }
    }
}

fn default_preferences_file() -> String {
    "preferences.json".to_string()
}

fn default_bookmark_db() -> String {
    "bookmarks.db".to_string()
}

fn default_bookmark_max_age_days() -> u32 {
    (BOOKMARK_MAX_AGE.as_secs() / 86_400) as u32
}

impl ReaderConfig {
    /// 기본 설정값 반환
    pub fn default_config() -> Self {
        Self {
            audio: AudioConfig::default(),
            timing: TimingConfig::default(),
            assets: AssetConfig::default(),
            storage: StorageConfig::default(),
        }
    }

    /// 페이드 단계 간격
    pub fn fade_interval(&self) -> Duration {
        Duration::from_millis(self.audio.fade_interval_ms.max(1))
    }

    pub fn reveal_delay(&self) -> Duration {
        Duration::from_millis(self.timing.reveal_delay_ms)
    }

    pub fn auto_bookmark_delay(&self) -> Duration {
        Duration::from_millis(self.timing.auto_bookmark_delay_ms)
    }

    pub fn about_reveal_delay(&self) -> Duration {
        Duration::from_millis(self.timing.about_reveal_delay_ms)
    }

    pub fn bookmark_max_age(&self) -> Duration {
        Duration::from_secs(u64::from(self.storage.bookmark_max_age_days) * 86_400)
    }
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self::default_config()
    }
}
