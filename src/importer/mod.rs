// ==========================================
// 学院日程同步系统 - 导入层
// ==========================================
// 职责: 外部表格文件 → 合并后的日程事件
// 支持: CSV（UTF-8 / EUC-KR）, Excel
// ==========================================

// 模块声明
pub mod date_resolver;
pub mod error;
pub mod event_merger;
pub mod exporter;
pub mod field_mapper;
pub mod file_parser;
pub mod schedule_importer_impl;
pub mod schedule_importer_trait;
pub mod unit_classifier;

// 重导出核心类型
pub use date_resolver::{resolve_date, resolve_time, DatePattern, DateResolver};
pub use error::{ImportError, ImportResult};
pub use event_merger::{sort_by_date, EventMerger as EventMergerImpl};
pub use exporter::ScheduleExporter;
pub use field_mapper::FieldMapper as FieldMapperImpl;
pub use file_parser::{decode_with_fallback, CsvParser, ExcelParser, UniversalFileParser};
pub use schedule_importer_impl::ScheduleImporterImpl;
pub use unit_classifier::UnitClassifier as UnitClassifierImpl;

// 重导出 Trait 接口
pub use schedule_importer_trait::{
    EventMerger, FieldMapper, FileParser, ScheduleImporter, UnitClassifier,
};
