// ==========================================
// 学院日程同步系统 - 批量删除器
// ==========================================
// 流程: 列出日期范围内的事件 → 按 "[部门]" 标记过滤 → 逐条删除
// 红线: 与上传相同的顺序执行 + 固定等待 + 单条隔离
// 列表失败视为整体失败（此时尚未删除任何事件）
// ==========================================

use crate::calendar::calendar_id::resolve_calendar_id;
use crate::calendar::client::{CalendarClient, RemoteEvent};
use crate::calendar::error::{SyncError, SyncResult};
use crate::calendar::progress::BatchProgress;
use crate::domain::BatchResult;
use chrono::{DateTime, Duration as ChronoDuration, FixedOffset, NaiveDate, TimeZone};
use chrono_tz::Tz;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// 部门过滤标记: "[部门]"
pub fn unit_marker(unit: &str) -> String {
    format!("[{}]", unit.trim())
}

/// 仅保留标题含部门标记的事件（过滤为空时保留全部）
pub fn filter_by_unit(events: Vec<RemoteEvent>, unit_filter: Option<&str>) -> Vec<RemoteEvent> {
    match unit_filter.map(str::trim).filter(|u| !u.is_empty()) {
        Some(unit) => {
            let marker = unit_marker(unit);
            events
                .into_iter()
                .filter(|e| e.summary.contains(&marker))
                .collect()
        }
        None => events,
    }
}

pub struct BulkDeleter {
    client: Arc<dyn CalendarClient>,
    timezone: Tz,
    delay: Duration,
    progress: Arc<BatchProgress>,
}

impl BulkDeleter {
    pub fn new(client: Arc<dyn CalendarClient>, timezone: Tz, delay: Duration) -> Self {
        Self {
            client,
            timezone,
            delay,
            progress: Arc::new(BatchProgress::new()),
        }
    }

    pub fn with_progress(mut self, progress: Arc<BatchProgress>) -> Self {
        self.progress = progress;
        self
    }

    pub fn progress(&self) -> Arc<BatchProgress> {
        Arc::clone(&self.progress)
    }

    /// 日期范围 [from, to]（含两端）转为 [from 00:00, to+1 00:00)
    fn range_bounds(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> SyncResult<(DateTime<FixedOffset>, DateTime<FixedOffset>)> {
        let midnight = |date: NaiveDate| {
            date.and_hms_opt(0, 0, 0)
                .and_then(|naive| self.timezone.from_local_datetime(&naive).earliest())
                .map(|dt| dt.fixed_offset())
                .ok_or_else(|| SyncError::Configuration(format!("无法确定 {} 的零点", date)))
        };
        Ok((midnight(from)?, midnight(to + ChronoDuration::days(1))?))
    }

    /// 删除日期范围内的事件
    ///
    /// # 参数
    /// - calendar_ref: 日历 id 或共享链接
    /// - from, to: 日期范围（含两端）
    /// - unit_filter: 只删除标题含 "[部门]" 的事件
    ///
    /// # 返回
    /// - Ok(BatchResult): 删除计数
    /// - Err: 日历引用/日期范围无效,或列表调用失败
    pub async fn delete_range(
        &self,
        calendar_ref: &str,
        from: NaiveDate,
        to: NaiveDate,
        unit_filter: Option<&str>,
    ) -> SyncResult<BatchResult> {
        let calendar_id = resolve_calendar_id(calendar_ref)?;
        if from > to {
            return Err(SyncError::Configuration(format!(
                "日期范围无效: {} > {}",
                from, to
            )));
        }
        let (time_min, time_max) = self.range_bounds(from, to)?;
        let run_id = Uuid::new_v4().to_string();

        let listed = self.client.list(&calendar_id, time_min, time_max).await?;
        tokio::time::sleep(self.delay).await;

        let listed_count = listed.len();
        let targets = filter_by_unit(listed, unit_filter);
        info!(
            run_id = %run_id,
            calendar_id = %calendar_id,
            listed = listed_count,
            targets = targets.len(),
            unit_filter = unit_filter.unwrap_or(""),
            "开始删除日程"
        );

        let mut result = BatchResult::new(run_id.clone());
        self.progress.start(targets.len());

        for (index, target) in targets.iter().enumerate() {
            if self.progress.is_cancelled() {
                warn!(run_id = %run_id, processed = index, "删除已取消");
                result.cancelled = true;
                break;
            }

            match self.client.delete(&calendar_id, &target.id).await {
                Ok(()) => {
                    debug!(index = index, event_id = %target.id, "事件已删除");
                    result.record_success();
                    self.progress.add_success();
                }
                Err(e) => {
                    warn!(index = index, summary = %target.summary, error = %e, "事件删除失败");
                    result.record_failure(index, target.summary.clone(), e.to_string());
                    self.progress.add_failure();
                }
            }

            tokio::time::sleep(self.delay).await;
        }

        info!(run_id = %run_id, "删除完成: {}", result);
        self.progress.finish();
        Ok(result)
    }
}
