// ==========================================
// 学院日程同步系统 - 外部日历客户端接口
// ==========================================
// 职责: create / list / delete 三个操作（不包含实现）
// 实现者: GoogleCalendarClient, 测试中的内存记录客户端
// ==========================================

use crate::calendar::error::SyncResult;
use crate::calendar::event_body::EventBody;
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// 列表接口返回的远端事件（只保留删除需要的字段）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteEvent {
    pub id: String,
    #[serde(default)]
    pub summary: String,
}

#[async_trait]
pub trait CalendarClient: Send + Sync {
    /// 创建事件
    ///
    /// # 返回
    /// - Ok(String): 远端事件 id
    async fn create(&self, calendar_id: &str, body: &EventBody) -> SyncResult<String>;

    /// 列出与 [time_min, time_max) 相交的事件（内部处理分页）
    async fn list(
        &self,
        calendar_id: &str,
        time_min: DateTime<FixedOffset>,
        time_max: DateTime<FixedOffset>,
    ) -> SyncResult<Vec<RemoteEvent>>;

    /// 删除事件
    async fn delete(&self, calendar_id: &str, event_id: &str) -> SyncResult<()>;
}
