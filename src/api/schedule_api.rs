// ==========================================
// 日程同步API
// ==========================================
// 职责: 为界面/命令行封装 预览 / 导出 / 上传 / 删除
// 预览为同步计算;上传/删除为顺序批次,进度可轮询、可取消
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::calendar::{
    BatchProgress, BatchUploader, BulkDeleter, CalendarClient, EventBodyBuilder,
    GoogleCalendarClient, ProgressSnapshot,
};
use crate::config::ScheduleConfig;
use crate::domain::{BatchResult, ImportOutcome, ItemFailure, ScheduleEvent};
use crate::importer::{ScheduleExporter, ScheduleImporter, ScheduleImporterImpl};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tracing::warn;

/// 预览响应
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreviewResponse {
    /// 合并后的事件与跳过的记录（可直接用于上传）
    pub outcome: ImportOutcome,
    /// 合并后的事件数
    pub event_count: usize,
    /// 日期无法解析而跳过的行数
    pub skipped_count: usize,
    /// 导入耗时（毫秒）
    pub elapsed_ms: i64,
}

/// 上传/删除批次响应
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncApiResponse {
    pub run_id: String,
    pub attempted: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub cancelled: bool,
    /// "N succeeded, M skipped"
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<ItemFailure>,
}

impl From<BatchResult> for SyncApiResponse {
    fn from(result: BatchResult) -> Self {
        Self {
            message: result.to_string(),
            run_id: result.run_id,
            attempted: result.attempted,
            succeeded: result.succeeded,
            failed: result.failed,
            cancelled: result.cancelled,
            failures: result.failures,
        }
    }
}

/// 日程同步API
pub struct ScheduleApi {
    config: ScheduleConfig,
    importer: Box<dyn ScheduleImporter>,
    client: Option<Arc<dyn CalendarClient>>,
    // 所有批次共用同一进度对象: 批次开始前发出的取消请求不会丢失
    progress: Arc<BatchProgress>,
}

impl ScheduleApi {
    /// 使用指定日历客户端创建
    pub fn new(config: ScheduleConfig, client: Arc<dyn CalendarClient>) -> Self {
        Self::build(config, Some(client))
    }

    /// 按配置创建（未配置 access token 时仅可预览/导出）
    pub fn from_config(config: ScheduleConfig) -> Self {
        let client: Option<Arc<dyn CalendarClient>> =
            match GoogleCalendarClient::from_settings(&config.sync) {
                Ok(client) => Some(Arc::new(client)),
                Err(e) => {
                    warn!(error = %e, "外部日历客户端未就绪，仅支持预览/导出");
                    None
                }
            };
        Self::build(config, client)
    }

    fn build(config: ScheduleConfig, client: Option<Arc<dyn CalendarClient>>) -> Self {
        let importer = Box::new(ScheduleImporterImpl::from_config(&config));
        Self {
            config,
            importer,
            client,
            progress: Arc::new(BatchProgress::new()),
        }
    }

    /// 替换导入器（固定参考年份等场景）
    pub fn with_importer(mut self, importer: Box<dyn ScheduleImporter>) -> Self {
        self.importer = importer;
        self
    }

    pub fn config(&self) -> &ScheduleConfig {
        &self.config
    }

    // ==========================================
    // 预览 / 导出
    // ==========================================

    /// 预览上传的文件内容
    ///
    /// # 参数
    /// - bytes: 文件字节
    /// - file_name: 原始文件名（决定解析格式）
    ///
    /// # 返回
    /// - Ok(PreviewResponse): 合并后的事件列表
    /// - Err(ApiError::ParseError): 文件结构错误
    pub fn preview_bytes(&self, bytes: &[u8], file_name: Option<&str>) -> ApiResult<PreviewResponse> {
        let outcome = self.importer.import_bytes(bytes, file_name)?;
        Ok(Self::preview_response(outcome))
    }

    /// 预览本地文件
    pub async fn preview_file(&self, file_path: &Path) -> ApiResult<PreviewResponse> {
        let outcome = self.importer.import_file(file_path).await?;
        Ok(Self::preview_response(outcome))
    }

    fn preview_response(outcome: ImportOutcome) -> PreviewResponse {
        PreviewResponse {
            event_count: outcome.events.len(),
            skipped_count: outcome.skipped.len(),
            elapsed_ms: outcome.elapsed.as_millis() as i64,
            outcome,
        }
    }

    /// 导出合并后的事件为 CSV（UTF-8 BOM）
    pub fn export_csv(&self, events: &[ScheduleEvent]) -> ApiResult<Vec<u8>> {
        Ok(ScheduleExporter::new().export_csv(events)?)
    }

    // ==========================================
    // 上传 / 删除
    // ==========================================

    /// 上传预览结果
    ///
    /// # 参数
    /// - calendar_ref: 日历 id 或共享链接（None 时取配置）
    /// - outcome: 预览结果（跳过的记录计为失败）
    ///
    /// # 返回
    /// - Ok(SyncApiResponse): 批次计数
    /// - Err(ApiError::ConfigurationError): 日历/令牌/时区配置无效,批次未开始
    pub async fn upload(
        &self,
        calendar_ref: Option<&str>,
        outcome: &ImportOutcome,
    ) -> ApiResult<SyncApiResponse> {
        let calendar_ref = self.calendar_ref(calendar_ref)?;
        let client = self.client()?;
        let body_builder = EventBodyBuilder::from_settings(&self.config.sync)?;

        let uploader = BatchUploader::new(client, body_builder, self.config.sync.request_delay())
            .with_progress(Arc::clone(&self.progress));
        let result = uploader.upload_outcome(&calendar_ref, outcome).await?;
        Ok(result.into())
    }

    /// 删除日期范围内的事件
    ///
    /// # 参数
    /// - calendar_ref: 日历 id 或共享链接（None 时取配置）
    /// - from, to: 日期范围（含两端）
    /// - unit: 只删除标题含 "[部门]" 的事件
    pub async fn delete_range(
        &self,
        calendar_ref: Option<&str>,
        from: NaiveDate,
        to: NaiveDate,
        unit: Option<&str>,
    ) -> ApiResult<SyncApiResponse> {
        let calendar_ref = self.calendar_ref(calendar_ref)?;
        let client = self.client()?;
        let timezone = self.config.sync.timezone()?;

        let deleter = BulkDeleter::new(client, timezone, self.config.sync.request_delay())
            .with_progress(Arc::clone(&self.progress));
        let result = deleter.delete_range(&calendar_ref, from, to, unit).await?;
        Ok(result.into())
    }

    /// 当前（或最近一次）批次进度
    pub fn progress(&self) -> ProgressSnapshot {
        self.progress.snapshot()
    }

    /// 请求取消当前批次（当前调用完成后生效;无批次运行时作用于下一个批次）
    pub fn cancel(&self) {
        self.progress.cancel();
    }

    fn calendar_ref(&self, explicit: Option<&str>) -> ApiResult<String> {
        explicit
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .or_else(|| self.config.sync.calendar.clone())
            .ok_or_else(|| ApiError::ConfigurationError("未提供日历 id 或共享链接".to_string()))
    }

    fn client(&self) -> ApiResult<Arc<dyn CalendarClient>> {
        self.client
            .clone()
            .ok_or_else(|| ApiError::ConfigurationError("未配置 access token".to_string()))
    }
}
