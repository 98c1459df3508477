// ==========================================
// 学院日程同步系统 - 日程导出器
// ==========================================
// 职责: 将合并后的事件重新生成为 CSV（供表格软件核对）
// 格式: UTF-8 + BOM,所有字段加引号,每个（合并后）事件一行
// ==========================================

use crate::domain::ScheduleEvent;
use crate::importer::error::{ImportError, ImportResult};
use csv::{QuoteStyle, WriterBuilder};
use std::io::Write;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// 导出列
pub const EXPORT_HEADERS: [&str; 8] = [
    "시작일", "종료일", "시간", "부서", "제목", "문서번호", "첨부파일", "색상",
];

pub struct ScheduleExporter {
    attachment_separator: String,
}

impl ScheduleExporter {
    pub fn new() -> Self {
        Self {
            attachment_separator: ", ".to_string(),
        }
    }

    /// 导出为 CSV 字节
    ///
    /// # 返回
    /// - 以 BOM 开头的 UTF-8 字节（Excel 打开时韩文不乱码）
    pub fn export_csv(&self, events: &[ScheduleEvent]) -> ImportResult<Vec<u8>> {
        self.export_to(events, UTF8_BOM.to_vec())
    }

    /// 导出到任意写入目标,返回写入完成的目标
    pub fn export_to<W: Write>(&self, events: &[ScheduleEvent], target: W) -> ImportResult<W> {
        let export_error = |e: &dyn std::fmt::Display| ImportError::ExportError(e.to_string());
        let mut writer = WriterBuilder::new()
            .quote_style(QuoteStyle::Always)
            .from_writer(target);

        writer
            .write_record(EXPORT_HEADERS)
            .map_err(|e| export_error(&e))?;
        for event in events {
            writer
                .write_record(self.to_row(event))
                .map_err(|e| export_error(&e))?;
        }

        writer.into_inner().map_err(|e| export_error(&e))
    }

    fn to_row(&self, event: &ScheduleEvent) -> [String; 8] {
        [
            event.date.format("%Y-%m-%d").to_string(),
            event.last_date().format("%Y-%m-%d").to_string(),
            event
                .time
                .map(|t| t.format("%H:%M").to_string())
                .unwrap_or_default(),
            event.unit.clone(),
            event.title.clone(),
            event.doc_ref.clone().unwrap_or_default(),
            event.attachments.join(&self.attachment_separator),
            event.color_id.clone(),
        ]
    }
}

impl Default for ScheduleExporter {
    fn default() -> Self {
        Self::new()
    }
}
