// ==========================================
// 学院日程同步系统 - 同步批次领域模型
// ==========================================
// 职责: 上传/删除批次的汇总结果
// 红线: succeeded + failed == attempted（每次批次都成立）
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

/// 单条失败明细（日期无法解析 / 外部调用失败）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemFailure {
    pub index: usize,
    pub label: String,
    pub reason: String,
}

/// 批次汇总结果（不落库）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchResult {
    pub run_id: String,
    pub attempted: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub failures: Vec<ItemFailure>,
    pub cancelled: bool,
}

impl BatchResult {
    pub fn new(run_id: impl Into<String>) -> Self {
        Self {
            run_id: run_id.into(),
            ..Self::default()
        }
    }

    pub fn record_success(&mut self) {
        self.attempted += 1;
        self.succeeded += 1;
    }

    pub fn record_failure(&mut self, index: usize, label: impl Into<String>, reason: impl Into<String>) {
        self.attempted += 1;
        self.failed += 1;
        self.failures.push(ItemFailure {
            index,
            label: label.into(),
            reason: reason.into(),
        });
    }

    pub fn is_consistent(&self) -> bool {
        self.succeeded + self.failed == self.attempted
    }
}

impl fmt::Display for BatchResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} succeeded, {} skipped", self.succeeded, self.failed)?;
        if self.cancelled {
            write!(f, " (cancelled)")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_stay_consistent() {
        let mut result = BatchResult::new("run-1");
        result.record_success();
        result.record_failure(1, "[교무처] 회의", "HTTP 500");
        result.record_success();

        assert_eq!(result.attempted, 3);
        assert_eq!(result.succeeded, 2);
        assert_eq!(result.failed, 1);
        assert!(result.is_consistent());
        assert_eq!(result.failures[0].index, 1);
    }

    #[test]
    fn test_display_tally() {
        let mut result = BatchResult::new("run-1");
        result.record_success();
        result.record_failure(0, "x", "y");
        assert_eq!(result.to_string(), "1 succeeded, 1 skipped");

        result.cancelled = true;
        assert_eq!(result.to_string(), "1 succeeded, 1 skipped (cancelled)");
    }
}
