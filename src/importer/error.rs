// ==========================================
// 学院日程同步系统 - 导入模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// 分级: 解析类错误为致命（整体失败）,日期无法解析为单行跳过
// ==========================================

use thiserror::Error;

/// 导入模块错误类型
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 文件相关错误（致命）=====
    #[error("文件不存在: {0}")]
    FileNotFound(String),

    #[error("文件格式不支持: {0}（仅支持 .csv/.xlsx/.xls）")]
    UnsupportedFormat(String),

    #[error("文件读取失败: {0}")]
    FileReadError(String),

    #[error("CSV 解析失败: {0}")]
    CsvParseError(String),

    #[error("Excel 解析失败: {0}")]
    ExcelParseError(String),

    #[error("缺少表头行")]
    MissingHeader,

    // ===== 导出错误 =====
    #[error("CSV 导出失败: {0}")]
    ExportError(String),

    // ===== 单行错误（非致命,记录后跳过）=====
    #[error("日期无法解析 (行 {row}): {value:?}")]
    DateUnresolvable { row: usize, value: String },
}

impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        ImportError::FileReadError(err.to_string())
    }
}

impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        ImportError::CsvParseError(err.to_string())
    }
}

impl From<calamine::Error> for ImportError {
    fn from(err: calamine::Error) -> Self {
        ImportError::ExcelParseError(err.to_string())
    }
}

/// Result 类型别名
pub type ImportResult<T> = Result<T, ImportError>;
