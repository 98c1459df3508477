// ==========================================
// 学院日程同步系统 - 批次进度
// ==========================================
// 用途: 界面轮询进度 + 协作式取消
// 批次内计数器只增不减;每个批次开始时清零
// 取消请求由下一次检查到它的批次消费,批次结束时复位
// ==========================================

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

#[derive(Debug, Default)]
pub struct BatchProgress {
    total: AtomicUsize,
    processed: AtomicUsize,
    succeeded: AtomicUsize,
    failed: AtomicUsize,
    cancel_requested: AtomicBool,
}

/// 进度快照
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    pub total: usize,
    pub processed: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub cancel_requested: bool,
}

impl BatchProgress {
    pub fn new() -> Self {
        Self::default()
    }

    /// 开始新批次: 计数器清零（保留尚未消费的取消请求）
    pub(crate) fn start(&self, total: usize) {
        self.total.store(total, Ordering::SeqCst);
        self.processed.store(0, Ordering::SeqCst);
        self.succeeded.store(0, Ordering::SeqCst);
        self.failed.store(0, Ordering::SeqCst);
    }

    /// 批次结束: 复位取消请求,计数保留供轮询
    pub(crate) fn finish(&self) {
        self.cancel_requested.store(false, Ordering::SeqCst);
    }

    pub(crate) fn add_success(&self) {
        self.succeeded.fetch_add(1, Ordering::SeqCst);
        self.processed.fetch_add(1, Ordering::SeqCst);
    }

    pub(crate) fn add_failure(&self) {
        self.failed.fetch_add(1, Ordering::SeqCst);
        self.processed.fetch_add(1, Ordering::SeqCst);
    }

    /// 请求取消当前批次（当前调用完成后生效;无批次运行时作用于下一个批次）
    pub fn cancel(&self) {
        self.cancel_requested.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel_requested.load(Ordering::SeqCst)
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            total: self.total.load(Ordering::SeqCst),
            processed: self.processed.load(Ordering::SeqCst),
            succeeded: self.succeeded.load(Ordering::SeqCst),
            failed: self.failed.load(Ordering::SeqCst),
            cancel_requested: self.is_cancelled(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_tracks_counters() {
        let progress = BatchProgress::new();
        progress.start(3);
        progress.add_success();
        progress.add_failure();

        let snap = progress.snapshot();
        assert_eq!(snap.total, 3);
        assert_eq!(snap.processed, 2);
        assert_eq!(snap.succeeded + snap.failed, snap.processed);
        assert!(!snap.cancel_requested);

        progress.cancel();
        assert!(progress.snapshot().cancel_requested);
    }

    #[test]
    fn test_start_resets_counters_but_keeps_pending_cancel() {
        let progress = BatchProgress::new();
        progress.start(2);
        progress.add_success();
        progress.add_success();
        progress.cancel();

        progress.start(5);
        let snap = progress.snapshot();
        assert_eq!(snap.total, 5);
        assert_eq!(snap.processed, 0);
        assert_eq!(snap.succeeded, 0);
        assert_eq!(snap.failed, 0);
        assert!(snap.cancel_requested);

        progress.finish();
        assert!(!progress.is_cancelled());
    }
}
