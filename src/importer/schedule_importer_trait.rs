// ==========================================
// 学院日程同步系统 - 日程导入 Trait
// ==========================================
// 职责: 定义导入管道各阶段接口（不包含实现）
// 流程: 字节 → 原始行 → 规范记录 → 带日期事件 → 分类 + 合并
// ==========================================

use crate::domain::{ImportOutcome, NormalizedRecord, RawRecord, ScheduleEvent};
use crate::importer::error::ImportResult;
use async_trait::async_trait;
use std::path::Path;

// ==========================================
// ScheduleImporter Trait
// ==========================================
// 用途: 日程导入主接口
// 实现者: ScheduleImporterImpl
#[async_trait]
pub trait ScheduleImporter: Send + Sync {
    /// 从内存字节导入（上传文件场景）
    ///
    /// # 参数
    /// - bytes: 文件原始字节
    /// - file_name: 原始文件名（用于选择解析器与日志,可为空）
    ///
    /// # 返回
    /// - Ok(ImportOutcome): 合并后的事件 + 跳过的记录
    /// - Err: 解析类致命错误（不返回部分结果）
    fn import_bytes(&self, bytes: &[u8], file_name: Option<&str>) -> ImportResult<ImportOutcome>;

    /// 从文件路径导入
    ///
    /// # 参数
    /// - file_path: .csv / .xlsx / .xls 文件
    async fn import_file(&self, file_path: &Path) -> ImportResult<ImportOutcome>;
}

// ==========================================
// FileParser Trait
// ==========================================
// 用途: 字节解析为原始行（阶段 1）
// 实现者: CsvParser, ExcelParser
pub trait FileParser: Send + Sync {
    /// 解析字节为原始行记录（保持源文件顺序,跳过空行）
    ///
    /// # 返回
    /// - Ok(Vec<RawRecord>): 行记录列表
    /// - Err: 结构性错误,整体失败
    fn parse_bytes(&self, bytes: &[u8]) -> ImportResult<Vec<RawRecord>>;

    /// 带文件名解析（可按扩展名选择格式,默认忽略文件名）
    fn parse_named(&self, bytes: &[u8], file_name: Option<&str>) -> ImportResult<Vec<RawRecord>> {
        let _ = file_name;
        self.parse_bytes(bytes)
    }
}

// ==========================================
// FieldMapper Trait
// ==========================================
// 用途: 别名解析为规范字段（阶段 2）
// 实现者: FieldMapperImpl
pub trait FieldMapper: Send + Sync {
    /// 映射单行（不会失败: 缺失字段为空字符串）
    fn map_record(&self, raw: &RawRecord) -> NormalizedRecord;
}

// ==========================================
// UnitClassifier Trait
// ==========================================
// 用途: 部门标签 → 颜色 id（阶段 4）
// 实现者: UnitClassifierImpl
pub trait UnitClassifier: Send + Sync {
    /// 分类部门标签
    ///
    /// # 返回
    /// - 颜色 id（从不为空,未匹配时为回退 id）
    fn classify(&self, unit_label: &str) -> String;
}

// ==========================================
// EventMerger Trait
// ==========================================
// 用途: 相邻日期合并（阶段 5）
// 实现者: EventMergerImpl
pub trait EventMerger: Send + Sync {
    /// 合并按日期升序排列的单日事件
    ///
    /// # 规则
    /// - 部门与标题相同,且间隔恰为 1 天 → 延长 end_date
    /// - 其余情况 → 新起一组
    fn merge(&self, events: Vec<ScheduleEvent>) -> Vec<ScheduleEvent>;
}
