// ==========================================
// 学院日程同步系统 - 日历 id 解析
// ==========================================
// 输入: 裸 id（xxx@group.calendar.google.com）或完整共享链接
// 链接: 依次取查询参数 src, cid
// ==========================================

use crate::calendar::error::{SyncError, SyncResult};
use url::Url;

const ID_QUERY_KEYS: &[&str] = &["src", "cid"];

/// 解析日历引用为日历 id
///
/// # 返回
/// - Err(SyncError::Configuration): 为空、链接中无 id、或裸 id 含空白
pub fn resolve_calendar_id(input: &str) -> SyncResult<String> {
    let input = input.trim();
    if input.is_empty() {
        return Err(SyncError::Configuration("未提供日历 id".to_string()));
    }

    if input.starts_with("http://") || input.starts_with("https://") {
        let url = Url::parse(input)
            .map_err(|e| SyncError::Configuration(format!("日历链接无效: {}", e)))?;

        return ID_QUERY_KEYS
            .iter()
            .find_map(|key| {
                url.query_pairs()
                    .find(|(k, v)| k == *key && !v.trim().is_empty())
                    .map(|(_, v)| v.trim().to_string())
            })
            .ok_or_else(|| {
                SyncError::Configuration(format!("日历链接中未找到 src/cid 参数: {}", input))
            });
    }

    if input.chars().any(char::is_whitespace) {
        return Err(SyncError::Configuration(format!("日历 id 含空白字符: {}", input)));
    }
    Ok(input.to_string())
}
