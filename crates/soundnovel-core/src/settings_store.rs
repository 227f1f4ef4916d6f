//! 사용자 환경설정 저장소.
//!
//! 시작 시 한 번 로드하고, 변경 때마다 메모리 갱신 후 즉시 저장한다.
//! 로드는 절대 실패하지 않는다. 매체가 비었거나 손상되었으면 기본값을 쓴다.

use parking_lot::RwLock;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::error::CoreError;
use crate::models::settings::{SettingKey, Settings, SETTINGS_STORAGE_KEY};
use crate::ports::storage::PreferenceStorage;

/// 환경설정 저장소
pub struct SettingsStore {
    /// 현재 설정
    settings: RwLock<Settings>,
    /// 영구 저장 매체
    storage: Arc<dyn PreferenceStorage>,
}

impl SettingsStore {
    /// 저장 매체에서 설정 로드 (기본값 ⊕ 저장값)
    pub fn load(storage: Arc<dyn PreferenceStorage>) -> Self {
        let settings = Self::read_persisted(storage.as_ref());
        Self {
            settings: RwLock::new(settings),
            storage,
        }
    }

    /// 현재 설정 반환 (복제본)
    pub fn get(&self) -> Settings {
        self.settings.read().clone()
    }

    /// 단일 키 변경 및 저장
    ///
    /// 값이 유효하지 않으면 상태를 바꾸지 않고 `Validation` 에러를 반환한다.
    pub fn set(&self, key: SettingKey, value: Value) -> Result<Settings, CoreError> {
        let updated = {
            let mut settings = self.settings.write();
            let mut candidate = settings.clone();
            candidate.apply(key, &value)?;
            *settings = candidate.clone();
            candidate
        };
        debug!("설정 변경: {key} = {value}");
        self.persist(&updated)?;
        Ok(updated)
    }

    /// 키 이름으로 변경 (셸 입력용)
    pub fn set_named(&self, key: &str, value: Value) -> Result<Settings, CoreError> {
        self.set(key.parse()?, value)
    }

    /// 여러 필드를 한 번에 변경 및 저장
    pub fn update_with<F>(&self, updater: F) -> Result<Settings, CoreError>
    where
        F: FnOnce(&mut Settings),
    {
        let updated = {
            let mut settings = self.settings.write();
            updater(&mut settings);
            settings.clone()
        };
        self.persist(&updated)?;
        Ok(updated)
    }

    /// 저장 매체에서 다시 로드
    pub fn reload(&self) {
        let settings = Self::read_persisted(self.storage.as_ref());
        *self.settings.write() = settings;
        info!("환경설정 다시 로드 완료");
    }

    fn read_persisted(storage: &dyn PreferenceStorage) -> Settings {
        let raw = match storage.get(SETTINGS_STORAGE_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!("저장된 환경설정 없음, 기본값 사용");
                return Settings::default();
            }
            Err(e) => {
                warn!("환경설정 읽기 실패, 기본값 사용: {e}");
                return Settings::default();
            }
        };

        match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Object(map)) => Settings::merged(&map),
            Ok(other) => {
                warn!("환경설정 형식 오류 (객체 아님), 기본값 사용: {other}");
                Settings::default()
            }
            Err(e) => {
                warn!("환경설정 파싱 실패, 기본값 사용: {e}");
                Settings::default()
            }
        }
    }

    fn persist(&self, settings: &Settings) -> Result<(), CoreError> {
        let content = serde_json::to_string(settings)?;
        self.storage
            .set(SETTINGS_STORAGE_KEY, &content)
            .inspect_err(|e| warn!("환경설정 저장 실패: {e}"))
    }
}
