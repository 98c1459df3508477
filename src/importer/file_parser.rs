// ==========================================
// 学院日程同步系统 - 文件解析器实现
// ==========================================
// 阶段 1: 编码探测 + 表格解析
// 支持: CSV（UTF-8 / EUC-KR 自动识别）, Excel (.xlsx/.xls)
// 红线: 结构性错误整体失败,不返回部分行
// ==========================================

use crate::domain::RawRecord;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::schedule_importer_trait::FileParser;
use calamine::{open_workbook_auto_from_rs, Reader};
use csv::{ReaderBuilder, Trim};
use encoding_rs::EUC_KR;
use std::io::Cursor;
use std::path::Path;
use tracing::{debug, warn};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";
const CSV_DELIMITER: u8 = b',';

// ==========================================
// 编码探测
// ==========================================

/// 解码结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedText {
    pub text: String,
    pub encoding: &'static str,
}

/// 先按 UTF-8 解码并检查表头关键字,未命中则按 EUC-KR 重新解码
///
/// # 参数
/// - bytes: 原始字节
/// - header_tokens: 表头关键字（任一出现在首个非空行即视为正确）
pub fn decode_with_fallback(bytes: &[u8], header_tokens: &[String]) -> DecodedText {
    let body = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);

    if let Ok(text) = std::str::from_utf8(body) {
        if contains_header_token(text, header_tokens) {
            return DecodedText {
                text: text.to_string(),
                encoding: "UTF-8",
            };
        }
        debug!("UTF-8 解码未命中表头关键字，尝试 EUC-KR");
    } else {
        debug!("非 UTF-8 字节序列，尝试 EUC-KR");
    }

    let (text, had_errors) = EUC_KR.decode_without_bom_handling(body);
    if had_errors {
        warn!("EUC-KR 解码存在无法识别的字节，已替换");
    }
    DecodedText {
        text: text.into_owned(),
        encoding: "EUC-KR",
    }
}

fn contains_header_token(text: &str, header_tokens: &[String]) -> bool {
    let Some(header_line) = text.lines().find(|l| !l.trim().is_empty()) else {
        return false;
    };
    let header_line = header_line.to_lowercase();
    header_tokens
        .iter()
        .any(|token| !token.is_empty() && header_line.contains(&token.to_lowercase()))
}

/// 查找未闭合引号所在行（1 起始）
///
/// csv 读取器遇到未闭合引号会一直读到文件末尾而不报错,此处预先检查
fn find_unterminated_quote(text: &str, delimiter: char) -> Option<usize> {
    let mut in_quotes = false;
    let mut at_field_start = true;
    let mut quote_line = 0;
    let mut line = 1;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                }
                '"' => in_quotes = false,
                '\n' => line += 1,
                _ => {}
            }
            continue;
        }

        match c {
            '"' if at_field_start => {
                in_quotes = true;
                quote_line = line;
                at_field_start = false;
            }
            '\n' => {
                line += 1;
                at_field_start = true;
            }
            '\r' => at_field_start = true,
            c if c == delimiter => at_field_start = true,
            ' ' | '\t' if at_field_start => {}
            _ => at_field_start = false,
        }
    }

    in_quotes.then_some(quote_line)
}

// ==========================================
// CSV Parser 实现
// ==========================================
pub struct CsvParser {
    header_tokens: Vec<String>,
}

impl CsvParser {
    pub fn new(header_tokens: Vec<String>) -> Self {
        Self { header_tokens }
    }

    /// 解析已解码文本
    pub fn parse_text(&self, content: &str) -> ImportResult<Vec<RawRecord>> {
        if let Some(line) = find_unterminated_quote(content, CSV_DELIMITER as char) {
            return Err(ImportError::CsvParseError(format!(
                "第 {} 行引号未闭合",
                line
            )));
        }

        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .delimiter(CSV_DELIMITER)
            .trim(Trim::All)
            .flexible(true) // 允许行长度不一致
            .from_reader(content.as_bytes());

        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();
        if headers.iter().all(|h| h.is_empty()) {
            return Err(ImportError::MissingHeader);
        }

        let mut records = Vec::new();
        for (idx, result) in reader.records().enumerate() {
            let record = result?;
            let row_number = record
                .position()
                .map(|p| p.line() as usize)
                .unwrap_or(idx + 2);

            let mut raw = RawRecord::new(row_number);
            for (col_idx, value) in record.iter().enumerate() {
                if let Some(header) = headers.get(col_idx).filter(|h| !h.is_empty()) {
                    raw.insert(header.clone(), value.trim());
                }
            }

            // 跳过完全空白的行
            if raw.is_blank() {
                continue;
            }
            records.push(raw);
        }

        Ok(records)
    }
}

impl FileParser for CsvParser {
    fn parse_bytes(&self, bytes: &[u8]) -> ImportResult<Vec<RawRecord>> {
        let decoded = decode_with_fallback(bytes, &self.header_tokens);
        debug!(encoding = decoded.encoding, "CSV 解码完成");
        self.parse_text(&decoded.text)
    }
}

// ==========================================
// Excel Parser 实现
// ==========================================
pub struct ExcelParser;

impl FileParser for ExcelParser {
    fn parse_bytes(&self, bytes: &[u8]) -> ImportResult<Vec<RawRecord>> {
        let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))?;

        // 读取第一个 sheet
        let sheet_name = workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| ImportError::ExcelParseError("Excel 文件无工作表".to_string()))?;
        let range = workbook
            .worksheet_range(&sheet_name)
            .map_err(|e| ImportError::ExcelParseError(e.to_string()))?;

        // 区域从首个非空单元格开始,行号需加上其起始行
        let first_row = range.start().map_or(0, |(row, _)| row as usize);
        let mut rows = range.rows();
        let header_row = rows.next().ok_or(ImportError::MissingHeader)?;
        let headers: Vec<String> = header_row
            .iter()
            .map(|cell| cell.to_string().trim().to_string())
            .collect();
        if headers.iter().all(|h| h.is_empty()) {
            return Err(ImportError::MissingHeader);
        }

        let mut records = Vec::new();
        for (idx, data_row) in rows.enumerate() {
            let mut raw = RawRecord::new(first_row + idx + 2);
            for (col_idx, cell) in data_row.iter().enumerate() {
                if let Some(header) = headers.get(col_idx).filter(|h| !h.is_empty()) {
                    raw.insert(header.clone(), cell.to_string().trim());
                }
            }

            if raw.is_blank() {
                continue;
            }
            records.push(raw);
        }

        Ok(records)
    }
}

// ==========================================
// 通用文件解析器（根据扩展名自动选择）
// ==========================================
pub struct UniversalFileParser {
    csv: CsvParser,
    excel: ExcelParser,
}

impl UniversalFileParser {
    pub fn new(header_tokens: Vec<String>) -> Self {
        Self {
            csv: CsvParser::new(header_tokens),
            excel: ExcelParser,
        }
    }
}

impl FileParser for UniversalFileParser {
    fn parse_bytes(&self, bytes: &[u8]) -> ImportResult<Vec<RawRecord>> {
        self.parse_named(bytes, None)
    }

    /// 按文件名扩展名选择解析器（无扩展名时按 CSV 处理）
    fn parse_named(&self, bytes: &[u8], file_name: Option<&str>) -> ImportResult<Vec<RawRecord>> {
        let ext = file_name
            .and_then(|n| Path::new(n).extension())
            .and_then(|e| e.to_str())
            .unwrap_or("csv")
            .to_lowercase();

        match ext.as_str() {
            "csv" | "txt" => self.csv.parse_bytes(bytes),
            "xlsx" | "xls" | "xlsm" => self.excel.parse_bytes(bytes),
            _ => Err(ImportError::UnsupportedFormat(ext)),
        }
    }
}
