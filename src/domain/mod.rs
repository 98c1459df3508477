// ==========================================
// 学院日程同步系统 - 领域模型层
// ==========================================
// 职责: 定义导入管道与同步批次的数据结构
// 红线: 不含解析逻辑,不含外部调用
// ==========================================

pub mod schedule;
pub mod sync;

// 重导出核心类型
pub use schedule::{ImportOutcome, NormalizedRecord, RawRecord, ScheduleEvent, SkippedRecord};
pub use sync::{BatchResult, ItemFailure};
