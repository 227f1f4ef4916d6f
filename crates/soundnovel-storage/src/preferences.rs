//! JSON 환경설정 파일.
//!
//! 문자열 키 → 문자열 값 맵을 파일 하나에 저장한다.
//! 파일이 없거나 손상되었으면 빈 저장소로 취급하고, 기록은 매번 동기적으로 파일에 반영한다.
//! 기록은 같은 디렉토리의 임시 파일에 쓴 뒤 이름을 바꿔 교체하므로 중간에 끊겨도 이전 파일이 남는다.

use parking_lot::Mutex;
use soundnovel_core::error::CoreError;
use soundnovel_core::ports::storage::PreferenceStorage;
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

/// 환경설정 파일: `PreferenceStorage` 포트 구현
pub struct JsonPreferenceFile {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl JsonPreferenceFile {
    /// 파일 열기. 읽기/파싱 실패는 경고 후 빈 상태로 시작한다.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = Self::read_entries(&path);
        Self {
            path,
            entries: Mutex::new(entries),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(path: &Path) -> BTreeMap<String, String> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("환경설정 파일 없음: {}", path.display());
                return BTreeMap::new();
            }
            Err(e) => {
                warn!("환경설정 파일 읽기 실패: {}: {e}", path.display());
                return BTreeMap::new();
            }
        };

        serde_json::from_str(&content).unwrap_or_else(|e| {
            warn!("환경설정 파일 손상, 무시: {}: {e}", path.display());
            BTreeMap::new()
        })
    }

    fn write_entries(&self, entries: &BTreeMap<String, String>) -> Result<(), CoreError> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        if !dir.exists() {
            fs::create_dir_all(dir)?;
        }
        let content = serde_json::to_string_pretty(entries)?;
        let storage_error = |e: std::io::Error| {
            CoreError::Storage(format!(
                "환경설정 파일 저장 실패: {}: {e}",
                self.path.display()
            ))
        };

        let mut temp = NamedTempFile::new_in(dir).map_err(storage_error)?;
        temp.write_all(content.as_bytes()).map_err(storage_error)?;
        temp.as_file().sync_all().map_err(storage_error)?;
        temp.persist(&self.path).map_err(|e| storage_error(e.error))?;
        Ok(())
    }
}

impl PreferenceStorage for JsonPreferenceFile {
    fn get(&self, key: &str) -> Result<Option<String>, CoreError> {
        Ok(self.entries.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), CoreError> {
        let mut entries = self.entries.lock();
        let previous = entries.insert(key.to_string(), value.to_string());
        if let Err(e) = self.write_entries(&entries) {
            match previous {
                Some(old) => entries.insert(key.to_string(), old),
                None => entries.remove(key),
            };
            return Err(e);
        }
        debug!("환경설정 기록: {key}");
        Ok(())
    }
}
