// ==========================================
// 学院日程同步系统 - 日程领域模型
// ==========================================
// 职责: 导入管道各阶段的数据结构
// 流向: RawRecord → NormalizedRecord → ScheduleEvent → 合并后的 ScheduleEvent
// ==========================================

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

// ==========================================
// RawRecord - 原始行记录
// ==========================================
// 用途: 文件解析产物（列名, 单元格值）,保持源文件列顺序
// 生命周期: 字段映射后即丢弃
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRecord {
    pub cells: Vec<(String, String)>,
    pub row_number: usize, // 源文件行号（表头为第 1 行）
}

impl RawRecord {
    pub fn new(row_number: usize) -> Self {
        Self {
            cells: Vec::new(),
            row_number,
        }
    }

    /// 追加一列（同名列全部保留）
    pub fn insert(&mut self, header: impl Into<String>, value: impl Into<String>) {
        self.cells.push((header.into(), value.into()));
    }

    /// 按列名取最左侧一列的值
    pub fn get(&self, header: &str) -> Option<&str> {
        self.cells
            .iter()
            .find(|(h, _)| h == header)
            .map(|(_, v)| v.as_str())
    }

    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(|(_, v)| v.trim().is_empty())
    }
}

// ==========================================
// NormalizedRecord - 字段映射结果
// ==========================================
// 红线: 缺失字段一律为空字符串,不使用 Option
// 日期/时间仍为原始文本,由日期解析引擎处理
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedRecord {
    pub date_text: String,
    pub time_text: String,
    pub unit: String,
    pub title: String,
    pub doc_ref: String,
    pub attachments: Vec<String>,
    pub row_number: usize,
}

// ==========================================
// ScheduleEvent - 日程事件
// ==========================================
// 不变量:
// - end_date 存在时 end_date >= date
// - color_id 永不为空（未分类时取回退色）
// 合并器只会延长 end_date
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEvent {
    pub date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
    pub unit: String,
    pub title: String,
    pub doc_ref: Option<String>,
    pub attachments: Vec<String>,
    pub color_id: String,
    pub source_row: usize,
}

impl ScheduleEvent {
    /// 事件最后一天（单日事件即 date）
    pub fn last_date(&self) -> NaiveDate {
        self.end_date.unwrap_or(self.date)
    }

    /// 外部日历标题: "[部门] 标题"
    pub fn summary(&self) -> String {
        format!("[{}] {}", self.unit, self.title)
    }

    /// 外部日历描述: 文档编号 + 附件清单
    pub fn description(&self) -> String {
        let mut lines = Vec::new();
        if let Some(doc_ref) = self.doc_ref.as_deref().filter(|d| !d.is_empty()) {
            lines.push(format!("문서번호: {}", doc_ref));
        }
        if !self.attachments.is_empty() {
            lines.push("첨부파일:".to_string());
            for attachment in &self.attachments {
                lines.push(format!("- {}", attachment));
            }
        }
        lines.join("\n")
    }
}

impl fmt::Display for ScheduleEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.end_date {
            Some(end) => write!(f, "{}..{} {}", self.date, end, self.summary()),
            None => write!(f, "{} {}", self.date, self.summary()),
        }
    }
}

// ==========================================
// SkippedRecord - 日期无法解析而跳过的记录
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedRecord {
    pub row_number: usize,
    pub title: String,
    pub reason: String,
}

// ==========================================
// ImportOutcome - 导入预览结果
// ==========================================
// 用途: 同步返回给界面做预览,也作为上传批次的输入
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportOutcome {
    pub run_id: String,
    pub file_name: Option<String>,
    pub total_rows: usize,
    pub events: Vec<ScheduleEvent>,
    pub skipped: Vec<SkippedRecord>,
    pub elapsed: Duration,
}

impl ImportOutcome {
    /// 合并前成功解析日期的记录数
    pub fn resolved_rows(&self) -> usize {
        self.total_rows - self.skipped.len()
    }
}
