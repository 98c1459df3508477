// ==========================================
// 学院日程同步系统 - 核心库
// ==========================================
// 技术栈: Rust + tokio + reqwest
// 系统定位: 将行政部门导出的日程表批量登记到共享日历
// 流程: 文件 → 原始行 → 规范记录 → 带日期事件 → 分类 + 合并 → 外部日历
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 数据结构
pub mod domain;

// 导入层 - 解析/映射/日期/分类/合并/导出
pub mod importer;

// 同步层 - 外部日历
pub mod calendar;

// 配置层 - 系统配置
pub mod config;

// 日志系统
pub mod logging;

// API 层 - 业务接口
pub mod api;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域实体
pub use domain::{
    BatchResult, ImportOutcome, ItemFailure, NormalizedRecord, RawRecord, ScheduleEvent,
    SkippedRecord,
};

// 导入
pub use importer::{resolve_date, DateResolver, ScheduleImporter, ScheduleImporterImpl};

// 同步
pub use calendar::{BatchUploader, BulkDeleter, CalendarClient, GoogleCalendarClient};

// API
pub use api::{ApiError, ScheduleApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "学院日程同步系统";
