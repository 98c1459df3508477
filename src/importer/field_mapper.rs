// ==========================================
// 学院日程同步系统 - 字段映射器实现
// ==========================================
// 阶段 2: 表头别名 → 规范字段
// 规则: 表头比较忽略大小写/空白/下划线,按别名顺序取首个非空值
// 附件: 合并列按分隔符拆分 + 编号附件列追加（精确去重,保持首现顺序）
// ==========================================

use crate::config::FieldAliases;
use crate::domain::{NormalizedRecord, RawRecord};
use crate::importer::schedule_importer_trait::FieldMapper as FieldMapperTrait;
use std::collections::HashMap;

/// 附件列分隔符: 逗号 / 分号 / 句点 / 中点类 / 空白类
const ATTACHMENT_DELIMITERS: &[char] = &[
    ',', ';', '.', '·', 'ㆍ', '•', '・', '\u{00A0}', '\u{3000}', ' ', '\t', '\n', '\r',
];

/// 表头规范化: 小写 + 去空白 + 去下划线
pub fn normalize_header(header: &str) -> String {
    header
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}

/// 拆分合并附件列
pub fn split_attachments(value: &str) -> Vec<String> {
    value
        .split(|c: char| ATTACHMENT_DELIMITERS.contains(&c))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

pub struct FieldMapper {
    aliases: FieldAliases,
}

impl FieldMapper {
    pub fn new(aliases: FieldAliases) -> Self {
        Self { aliases }
    }

    /// 按别名顺序取首个非空值（缺失时为空字符串）
    fn resolve(&self, cells: &HashMap<String, &str>, aliases: &[String]) -> String {
        aliases
            .iter()
            .filter_map(|alias| cells.get(&normalize_header(alias)))
            .map(|v| v.trim())
            .find(|v| !v.is_empty())
            .unwrap_or_default()
            .to_string()
    }

    /// 编号附件列（按编号升序,同编号按列顺序）
    fn numbered_attachments(&self, raw: &RawRecord) -> Vec<String> {
        let prefixes: Vec<String> = self
            .aliases
            .numbered_attachment_prefixes
            .iter()
            .map(|p| normalize_header(p))
            .collect();

        let mut numbered: Vec<(u32, String)> = raw
            .cells
            .iter()
            .filter_map(|(header, value)| {
                let header = normalize_header(header);
                let number = prefixes.iter().find_map(|prefix| {
                    header
                        .strip_prefix(prefix.as_str())
                        .filter(|rest| !rest.is_empty() && rest.chars().all(|c| c.is_ascii_digit()))
                        .and_then(|rest| rest.parse::<u32>().ok())
                })?;
                let value = value.trim();
                (!value.is_empty()).then(|| (number, value.to_string()))
            })
            .collect();

        numbered.sort_by_key(|(number, _)| *number);
        numbered.into_iter().map(|(_, v)| v).collect()
    }
}

impl FieldMapperTrait for FieldMapper {
    fn map_record(&self, raw: &RawRecord) -> NormalizedRecord {
        // 规范化表头后建立查找表（同名列按列顺序取首个非空值）
        let mut cells: HashMap<String, &str> = HashMap::new();
        for (header, value) in &raw.cells {
            let entry = cells.entry(normalize_header(header)).or_insert(value.as_str());
            if entry.trim().is_empty() {
                *entry = value.as_str();
            }
        }

        let mut attachments = split_attachments(&self.resolve(&cells, &self.aliases.attachments));
        for extra in self.numbered_attachments(raw) {
            if !attachments.contains(&extra) {
                attachments.push(extra);
            }
        }
        let mut deduped: Vec<String> = Vec::with_capacity(attachments.len());
        for item in attachments {
            if !deduped.contains(&item) {
                deduped.push(item);
            }
        }

        NormalizedRecord {
            date_text: self.resolve(&cells, &self.aliases.date),
            time_text: self.resolve(&cells, &self.aliases.time),
            unit: self.resolve(&cells, &self.aliases.unit),
            title: self.resolve(&cells, &self.aliases.title),
            doc_ref: self.resolve(&cells, &self.aliases.doc_ref),
            attachments: deduped,
            row_number: raw.row_number,
        }
    }
}
