// ==========================================
// 学院日程同步系统 - 批量上传器
// ==========================================
// 职责: 合并后的事件逐条创建到外部日历
// 红线:
// - 严格顺序执行,同一时刻只有一个外部调用
// - 每次调用后固定等待（限流）
// - 单条失败只计数/记录,批次继续
// - 不做重试去重: 重复上传会产生重复事件
// ==========================================

use crate::calendar::calendar_id::resolve_calendar_id;
use crate::calendar::client::CalendarClient;
use crate::calendar::error::SyncResult;
use crate::calendar::event_body::EventBodyBuilder;
use crate::calendar::progress::BatchProgress;
use crate::domain::{BatchResult, ImportOutcome, ScheduleEvent, SkippedRecord};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

pub struct BatchUploader {
    client: Arc<dyn CalendarClient>,
    body_builder: EventBodyBuilder,
    delay: Duration,
    progress: Arc<BatchProgress>,
}

impl BatchUploader {
    /// # 参数
    /// - client: 外部日历客户端
    /// - body_builder: 请求体构造器（时区/默认时间/时长）
    /// - delay: 每次调用后的等待时间
    pub fn new(client: Arc<dyn CalendarClient>, body_builder: EventBodyBuilder, delay: Duration) -> Self {
        Self {
            client,
            body_builder,
            delay,
            progress: Arc::new(BatchProgress::new()),
        }
    }

    /// 共享进度对象（界面轮询 / 取消）
    pub fn with_progress(mut self, progress: Arc<BatchProgress>) -> Self {
        self.progress = progress;
        self
    }

    pub fn progress(&self) -> Arc<BatchProgress> {
        Arc::clone(&self.progress)
    }

    /// 上传事件列表
    ///
    /// # 返回
    /// - Ok(BatchResult): 成功/失败计数（单条失败不会变成 Err）
    /// - Err(SyncError::Configuration): 日历引用无效,批次未开始
    pub async fn upload_events(
        &self,
        calendar_ref: &str,
        events: &[ScheduleEvent],
    ) -> SyncResult<BatchResult> {
        self.run(calendar_ref, events, &[]).await
    }

    /// 上传导入结果（日期无法解析而跳过的记录计为失败）
    pub async fn upload_outcome(
        &self,
        calendar_ref: &str,
        outcome: &ImportOutcome,
    ) -> SyncResult<BatchResult> {
        self.run(calendar_ref, &outcome.events, &outcome.skipped).await
    }

    #[instrument(skip_all, fields(run_id))]
    async fn run(
        &self,
        calendar_ref: &str,
        events: &[ScheduleEvent],
        skipped: &[SkippedRecord],
    ) -> SyncResult<BatchResult> {
        let calendar_id = resolve_calendar_id(calendar_ref)?;
        let run_id = Uuid::new_v4().to_string();
        tracing::Span::current().record("run_id", run_id.as_str());

        let mut result = BatchResult::new(run_id.clone());
        self.progress.start(events.len() + skipped.len());
        info!(
            run_id = %run_id,
            calendar_id = %calendar_id,
            events = events.len(),
            skipped = skipped.len(),
            "开始上传日程"
        );

        // 无法解析日期的记录不发请求,直接计为失败
        for (offset, record) in skipped.iter().enumerate() {
            result.record_failure(
                events.len() + offset,
                format!("행 {}: {}", record.row_number, record.title),
                record.reason.clone(),
            );
            self.progress.add_failure();
        }

        for (index, event) in events.iter().enumerate() {
            if self.progress.is_cancelled() {
                warn!(run_id = %run_id, processed = index, "上传已取消");
                result.cancelled = true;
                break;
            }

            let label = event.summary();
            let body = match self.body_builder.build(event) {
                Ok(body) => body,
                Err(e) => {
                    warn!(index = index, label = %label, error = %e, "请求体构造失败");
                    result.record_failure(index, label, e.to_string());
                    self.progress.add_failure();
                    continue;
                }
            };

            match self.client.create(&calendar_id, &body).await {
                Ok(remote_id) => {
                    debug!(index = index, remote_id = %remote_id, "事件已创建");
                    result.record_success();
                    self.progress.add_success();
                }
                Err(e) => {
                    warn!(index = index, label = %label, error = %e, "事件创建失败");
                    result.record_failure(index, label, e.to_string());
                    self.progress.add_failure();
                }
            }

            tokio::time::sleep(self.delay).await;
        }

        info!(
            run_id = %run_id,
            succeeded = result.succeeded,
            failed = result.failed,
            cancelled = result.cancelled,
            "上传完成: {}",
            result
        );
        self.progress.finish();
        Ok(result)
    }
}
