// ==========================================
// 学院日程同步系统 - 事件请求体
// ==========================================
// 规则:
// - 合并区间 → 全天事件 [date, end_date + 1)（结束日期不含）
// - 单日事件 → 定时事件,开始 = date + 时间（缺省取默认时间）,固定时长
// 时区: 配置中的 IANA 时区（默认 Asia/Seoul）
// ==========================================

use crate::calendar::error::{SyncError, SyncResult};
use crate::config::SyncSettings;
use crate::domain::ScheduleEvent;
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// 开始/结束时间（date 与 dateTime 二选一）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventTime {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
}

impl EventTime {
    pub fn all_day(date: NaiveDate) -> Self {
        Self {
            date: Some(date.format("%Y-%m-%d").to_string()),
            date_time: None,
            time_zone: None,
        }
    }

    pub fn timed(at: NaiveDateTime, tz: Tz) -> SyncResult<Self> {
        let local = tz.from_local_datetime(&at).earliest().ok_or_else(|| {
            SyncError::Configuration(format!("时间在时区 {} 中不存在: {}", tz.name(), at))
        })?;
        Ok(Self {
            date: None,
            date_time: Some(local.to_rfc3339()),
            time_zone: Some(tz.name().to_string()),
        })
    }
}

/// 外部日历创建请求体
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventBody {
    pub summary: String,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub description: String,
    pub start: EventTime,
    pub end: EventTime,
    pub color_id: String,
}

// ==========================================
// EventBodyBuilder - 事件 → 请求体
// ==========================================
#[derive(Debug, Clone)]
pub struct EventBodyBuilder {
    timezone: Tz,
    default_start: NaiveTime,
    duration: Duration,
}

impl EventBodyBuilder {
    pub fn new(timezone: Tz, default_start: NaiveTime, duration: Duration) -> Self {
        Self {
            timezone,
            default_start,
            duration,
        }
    }

    /// 从同步配置构造（时区/默认时间非法时为配置错误）
    pub fn from_settings(settings: &SyncSettings) -> SyncResult<Self> {
        let timezone = settings
            .timezone()
            .map_err(|e| SyncError::Configuration(e.to_string()))?;
        let default_start = settings
            .default_start_time()
            .map_err(|e| SyncError::Configuration(e.to_string()))?;
        Ok(Self::new(timezone, default_start, settings.event_duration()))
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    pub fn build(&self, event: &ScheduleEvent) -> SyncResult<EventBody> {
        let (start, end) = match event.end_date {
            Some(end_date) => (
                EventTime::all_day(event.date),
                EventTime::all_day(end_date + Duration::days(1)),
            ),
            None => {
                let start_at = event.date.and_time(event.time.unwrap_or(self.default_start));
                (
                    EventTime::timed(start_at, self.timezone)?,
                    EventTime::timed(start_at + self.duration, self.timezone)?,
                )
            }
        };

        Ok(EventBody {
            summary: event.summary(),
            description: event.description(),
            start,
            end,
            color_id: event.color_id.clone(),
        })
    }
}
