//! 취소 가능한 예약 작업 슬롯.
//!
//! 같은 종류의 작업(페이드, 화면 공개, 자동 북마크)은 슬롯 하나를 공유한다.
//! 새 작업을 넣으면 진행 중이던 이전 작업은 즉시 중단된다.

use parking_lot::Mutex;
use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::trace;

/// 단일 예약 작업 슬롯
pub struct TimerSlot {
    label: &'static str,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl TimerSlot {
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            handle: Mutex::new(None),
        }
    }

    /// 작업 실행. 이전 작업은 중단된다.
    pub fn spawn<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let handle = tokio::spawn(task);
        if let Some(previous) = self.handle.lock().replace(handle) {
            if !previous.is_finished() {
                trace!("{} 작업 교체", self.label);
            }
            previous.abort();
        }
    }

    /// `delay` 후 작업 실행. 이전 작업은 중단된다.
    pub fn schedule<F>(&self, delay: Duration, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.spawn(async move {
            tokio::time::sleep(delay).await;
            task.await;
        });
    }

    /// 진행 중인 작업 중단. 실제로 중단했으면 true.
    pub fn cancel(&self) -> bool {
        match self.handle.lock().take() {
            Some(handle) if !handle.is_finished() => {
                handle.abort();
                trace!("{} 작업 취소", self.label);
                true
            }
            _ => false,
        }
    }

    /// 작업이 아직 끝나지 않았는지
    pub fn is_pending(&self) -> bool {
        self.handle
            .lock()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }
}

impl Drop for TimerSlot {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.get_mut().take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn scheduled_task_runs_after_delay() {
        let slot = TimerSlot::new("test");
        let hits = Arc::new(AtomicU32::new(0));

        let counter = hits.clone();
        slot.schedule(Duration::from_millis(100), async move {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(hits.load(Ordering::SeqCst), 0);
        assert!(slot.is_pending());

        tokio::time::sleep(Duration::from_millis(60)).await;
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert!(!slot.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn new_schedule_supersedes_previous() {
        let slot = TimerSlot::new("test");
        let hits = Arc::new(AtomicU32::new(0));

        for value in [1, 10] {
            let counter = hits.clone();
            slot.schedule(Duration::from_millis(100), async move {
                counter.fetch_add(value, Ordering::SeqCst);
            });
        }

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(hits.load(Ordering::SeqCst), 10);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_prevents_execution() {
        let slot = TimerSlot::new("test");
        let hits = Arc::new(AtomicU32::new(0));

        let counter = hits.clone();
        slot.schedule(Duration::from_millis(100), async move {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        assert!(slot.cancel());
        assert!(!slot.cancel());

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }
}
