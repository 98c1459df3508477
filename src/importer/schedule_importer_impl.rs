// ==========================================
// 学院日程同步系统 - 日程导入器实现
// ==========================================
// 职责: 整合导入流程,从字节到合并后的事件列表
// 流程: 解析 → 映射 → 日期解析 → 分类 → 排序 → 合并
// 红线: 除最终上传外全部为纯计算,不触达外部系统
// ==========================================

use crate::config::ScheduleConfig;
use crate::domain::{ImportOutcome, ScheduleEvent, SkippedRecord};
use crate::importer::date_resolver::{resolve_time, DateResolver};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::event_merger::{sort_by_date, EventMerger as EventMergerImpl};
use crate::importer::field_mapper::FieldMapper as FieldMapperImpl;
use crate::importer::file_parser::UniversalFileParser;
use crate::importer::schedule_importer_trait::{
    EventMerger, FieldMapper, FileParser, ScheduleImporter, UnitClassifier,
};
use crate::importer::unit_classifier::UnitClassifier as UnitClassifierImpl;
use async_trait::async_trait;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

// ==========================================
// ScheduleImporterImpl - 日程导入器实现
// ==========================================
pub struct ScheduleImporterImpl {
    // 导入组件
    file_parser: Box<dyn FileParser>,
    field_mapper: Box<dyn FieldMapper>,
    date_resolver: DateResolver,
    unit_classifier: Box<dyn UnitClassifier>,
    event_merger: Box<dyn EventMerger>,
}

impl ScheduleImporterImpl {
    /// 创建新的 ScheduleImporter 实例
    ///
    /// # 参数
    /// - file_parser: 文件解析器
    /// - field_mapper: 字段映射器
    /// - date_resolver: 日期解析引擎
    /// - unit_classifier: 部门分类器
    /// - event_merger: 事件合并器
    pub fn new(
        file_parser: Box<dyn FileParser>,
        field_mapper: Box<dyn FieldMapper>,
        date_resolver: DateResolver,
        unit_classifier: Box<dyn UnitClassifier>,
        event_merger: Box<dyn EventMerger>,
    ) -> Self {
        Self {
            file_parser,
            field_mapper,
            date_resolver,
            unit_classifier,
            event_merger,
        }
    }

    /// 按配置装配默认组件（参考年份取当年）
    pub fn from_config(config: &ScheduleConfig) -> Self {
        Self::new(
            Box::new(UniversalFileParser::new(config.header_tokens.clone())),
            Box::new(FieldMapperImpl::new(config.field_aliases.clone())),
            DateResolver::current(),
            Box::new(UnitClassifierImpl::from_config(config)),
            Box::new(EventMergerImpl),
        )
    }

    /// 替换日期解析器（固定参考年份,测试用）
    pub fn with_date_resolver(mut self, date_resolver: DateResolver) -> Self {
        self.date_resolver = date_resolver;
        self
    }

    /// 步骤 2-4: 映射 + 日期解析 + 分类
    fn build_events(
        &self,
        raw_records: &[crate::domain::RawRecord],
    ) -> (Vec<ScheduleEvent>, Vec<SkippedRecord>) {
        let mut events = Vec::with_capacity(raw_records.len());
        let mut skipped = Vec::new();

        for raw in raw_records {
            let record = self.field_mapper.map_record(raw);

            let Some(date) = self.date_resolver.resolve(&record.date_text) else {
                let reason = ImportError::DateUnresolvable {
                    row: record.row_number,
                    value: record.date_text.clone(),
                };
                warn!(row_number = record.row_number, date_text = %record.date_text, "日期无法解析，跳过该行");
                skipped.push(SkippedRecord {
                    row_number: record.row_number,
                    title: record.title,
                    reason: reason.to_string(),
                });
                continue;
            };

            let color_id = self.unit_classifier.classify(&record.unit);
            events.push(ScheduleEvent {
                date,
                end_date: None,
                time: resolve_time(&record.time_text),
                unit: record.unit,
                title: record.title,
                doc_ref: Some(record.doc_ref).filter(|d| !d.is_empty()),
                attachments: record.attachments,
                color_id,
                source_row: record.row_number,
            });
        }

        (events, skipped)
    }
}

#[async_trait]
impl ScheduleImporter for ScheduleImporterImpl {
    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    fn import_bytes(&self, bytes: &[u8], file_name: Option<&str>) -> ImportResult<ImportOutcome> {
        let start_time = Instant::now();
        let run_id = Uuid::new_v4().to_string();
        info!(run_id = %run_id, file_name = file_name.unwrap_or("<memory>"), "开始导入日程");

        // === 步骤 1: 解析文件 ===
        debug!("步骤 1: 解析文件");
        let raw_records = self.file_parser.parse_named(bytes, file_name).map_err(|e| {
            error!(run_id = %run_id, error = %e, "文件解析失败");
            e
        })?;
        let total_rows = raw_records.len();
        info!(total_rows = total_rows, "文件解析完成");

        // === 步骤 2-4: 映射 / 日期 / 分类 ===
        let (mut events, skipped) = self.build_events(&raw_records);
        debug!(resolved = events.len(), skipped = skipped.len(), "日期解析完成");

        // === 步骤 5: 排序 + 合并 ===
        sort_by_date(&mut events);
        let events = self.event_merger.merge(events);

        let elapsed = start_time.elapsed();
        info!(
            run_id = %run_id,
            total_rows = total_rows,
            events = events.len(),
            skipped = skipped.len(),
            elapsed_ms = elapsed.as_millis() as u64,
            "日程导入完成"
        );

        Ok(ImportOutcome {
            run_id,
            file_name: file_name.map(str::to_string),
            total_rows,
            events,
            skipped,
            elapsed,
        })
    }

    async fn import_file(&self, file_path: &Path) -> ImportResult<ImportOutcome> {
        if !file_path.exists() {
            return Err(ImportError::FileNotFound(file_path.display().to_string()));
        }

        let bytes = tokio::fs::read(file_path).await?;
        let file_name = file_path.file_name().and_then(|n| n.to_str());
        self.import_bytes(&bytes, file_name)
    }
}
