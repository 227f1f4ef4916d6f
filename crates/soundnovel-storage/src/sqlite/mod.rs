//! SQLite 북마크 저장 매체.
//!
//! `BookmarkStorage` 포트 구현. 항목마다 만료 시각을 저장하고
//! 조회 시 만료된 항목은 없는 것으로 취급한다 (쿠키의 max-age와 동일한 계약).

use chrono::Utc;
use rusqlite::{Connection, OptionalExtension};
use soundnovel_core::error::CoreError;
use soundnovel_core::ports::storage::BookmarkStorage;
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;
use tracing::{debug, info};

use crate::migration;

/// 북마크 항목 이름
const BOOKMARK_ENTRY: &str = "bookmark";

/// SQLite 북마크 저장소: `BookmarkStorage` 포트 구현
pub struct SqliteBookmarkStorage {
    conn: Mutex<Connection>,
}

impl SqliteBookmarkStorage {
    /// 파일 기반 SQLite 저장소 생성
    pub fn open(path: &Path) -> Result<Self, CoreError> {
        let conn = Connection::open(path)
            .map_err(|e| CoreError::Storage(format!("SQLite 열기 실패: {e}")))?;

        conn.execute_batch(
            "
            PRAGMA journal_mode=WAL;
            PRAGMA synchronous=NORMAL;
            ",
        )
        .map_err(|e| CoreError::Storage(format!("PRAGMA 설정 실패: {e}")))?;

        migration::run_migrations(&conn)
            .map_err(|e| CoreError::Storage(format!("마이그레이션 실패: {e}")))?;

        info!("북마크 저장소 초기화: {}", path.display());

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// 인메모리 SQLite 저장소 생성 (테스트용)
    pub fn open_in_memory() -> Result<Self, CoreError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| CoreError::Storage(format!("인메모리 SQLite 생성 실패: {e}")))?;

        migration::run_migrations(&conn)
            .map_err(|e| CoreError::Storage(format!("마이그레이션 실패: {e}")))?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// 만료된 항목 삭제, 삭제 건수 반환
    pub fn purge_expired(&self) -> Result<usize, CoreError> {
        let conn = self.lock()?;
        let deleted = conn
            .execute(
                "DELETE FROM bookmark_entries WHERE expires_at <= ?1",
                rusqlite::params![now_millis()],
            )
            .map_err(|e| CoreError::Storage(format!("만료 항목 삭제 실패: {e}")))?;
        if deleted > 0 {
            debug!("만료 북마크 항목 삭제: {deleted}건");
        }
        Ok(deleted)
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>, CoreError> {
        self.conn
            .lock()
            .map_err(|e| CoreError::Internal(format!("잠금 획득 실패: {e}")))
    }
}

impl BookmarkStorage for SqliteBookmarkStorage {
    fn put(&self, value: &str, max_age: Duration) -> Result<(), CoreError> {
        let max_age_ms = i64::try_from(max_age.as_millis()).unwrap_or(i64::MAX);
        let expires_at = now_millis().saturating_add(max_age_ms);

        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO bookmark_entries (name, value, expires_at, updated_at)
             VALUES (?1, ?2, ?3, datetime('now'))
             ON CONFLICT(name) DO UPDATE SET
                value = excluded.value,
                expires_at = excluded.expires_at,
                updated_at = excluded.updated_at",
            rusqlite::params![BOOKMARK_ENTRY, value, expires_at],
        )
        .map_err(|e| CoreError::Storage(format!("북마크 기록 실패: {e}")))?;

        debug!("북마크 항목 기록: expires_at={expires_at}");
        Ok(())
    }

    fn get(&self) -> Result<Option<String>, CoreError> {
        let conn = self.lock()?;
        conn.query_row(
            "SELECT value FROM bookmark_entries WHERE name = ?1 AND expires_at > ?2",
            rusqlite::params![BOOKMARK_ENTRY, now_millis()],
            |row| row.get(0),
        )
        .optional()
        .map_err(|e| CoreError::Storage(format!("북마크 조회 실패: {e}")))
    }

    fn remove(&self) -> Result<(), CoreError> {
        let conn = self.lock()?;
        conn.execute(
            "DELETE FROM bookmark_entries WHERE name = ?1",
            rusqlite::params![BOOKMARK_ENTRY],
        )
        .map_err(|e| CoreError::Storage(format!("북마크 삭제 실패: {e}")))?;
        Ok(())
    }
}

fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}
