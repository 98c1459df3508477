// ==========================================
// 学院日程同步系统 - 内存日历客户端
// ==========================================
// 用途: 试运行（--dry-run）与测试
// 记录每次调用及其时刻,可按标题关键字模拟失败
// ==========================================

use crate::calendar::client::{CalendarClient, RemoteEvent};
use crate::calendar::error::{SyncError, SyncResult};
use crate::calendar::event_body::{EventBody, EventTime};
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, NaiveDate};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;

/// 调用记录
#[derive(Debug, Clone)]
pub enum RecordedCall {
    Create { calendar_id: String, summary: String },
    List { calendar_id: String },
    Delete { calendar_id: String, event_id: String },
}

#[derive(Debug, Clone)]
struct StoredEvent {
    calendar_id: String,
    id: String,
    body: EventBody,
}

#[derive(Debug, Default)]
struct MemoryState {
    events: Vec<StoredEvent>,
    calls: Vec<(Instant, RecordedCall)>,
    fail_markers: Vec<String>,
    next_id: usize,
}

/// 克隆共享同一份状态
#[derive(Debug, Clone, Default)]
pub struct InMemoryCalendarClient {
    state: Arc<Mutex<MemoryState>>,
}

impl InMemoryCalendarClient {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        // 锁中毒时沿用内部数据（测试断言失败不应连带其他调用）
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// 标题含该关键字的 create/delete 调用返回失败
    pub fn fail_when_summary_contains(&self, marker: impl Into<String>) {
        self.lock().fail_markers.push(marker.into());
    }

    /// 预置一个全天事件,返回其 id
    pub fn seed_all_day(&self, calendar_id: &str, summary: &str, date: NaiveDate) -> String {
        let mut state = self.lock();
        state.next_id += 1;
        let id = format!("evt-{}", state.next_id);
        state.events.push(StoredEvent {
            calendar_id: calendar_id.to_string(),
            id: id.clone(),
            body: EventBody {
                summary: summary.to_string(),
                description: String::new(),
                start: EventTime::all_day(date),
                end: EventTime::all_day(date + chrono::Duration::days(1)),
                color_id: String::new(),
            },
        });
        id
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.lock().calls.iter().map(|(_, c)| c.clone()).collect()
    }

    pub fn call_instants(&self) -> Vec<Instant> {
        self.lock().calls.iter().map(|(at, _)| *at).collect()
    }

    pub fn create_count(&self) -> usize {
        self.lock()
            .calls
            .iter()
            .filter(|(_, c)| matches!(c, RecordedCall::Create { .. }))
            .count()
    }

    /// 当前保存的事件请求体
    pub fn stored(&self, calendar_id: &str) -> Vec<EventBody> {
        self.lock()
            .events
            .iter()
            .filter(|e| e.calendar_id == calendar_id)
            .map(|e| e.body.clone())
            .collect()
    }
}

/// 事件开始时间（全天事件取当日零点,与查询下界同一偏移）
fn event_start(time: &EventTime, offset: FixedOffset) -> Option<DateTime<FixedOffset>> {
    if let Some(dt) = &time.date_time {
        return DateTime::parse_from_rfc3339(dt).ok();
    }
    let date = NaiveDate::parse_from_str(time.date.as_deref()?, "%Y-%m-%d").ok()?;
    date.and_hms_opt(0, 0, 0)?
        .and_local_timezone(offset)
        .single()
}

fn should_fail(state: &MemoryState, summary: &str) -> bool {
    state.fail_markers.iter().any(|m| summary.contains(m.as_str()))
}

#[async_trait]
impl CalendarClient for InMemoryCalendarClient {
    async fn create(&self, calendar_id: &str, body: &EventBody) -> SyncResult<String> {
        let mut state = self.lock();
        state.calls.push((
            Instant::now(),
            RecordedCall::Create {
                calendar_id: calendar_id.to_string(),
                summary: body.summary.clone(),
            },
        ));
        if should_fail(&state, &body.summary) {
            return Err(SyncError::external("create", "simulated failure"));
        }

        state.next_id += 1;
        let id = format!("evt-{}", state.next_id);
        state.events.push(StoredEvent {
            calendar_id: calendar_id.to_string(),
            id: id.clone(),
            body: body.clone(),
        });
        Ok(id)
    }

    async fn list(
        &self,
        calendar_id: &str,
        time_min: DateTime<FixedOffset>,
        time_max: DateTime<FixedOffset>,
    ) -> SyncResult<Vec<RemoteEvent>> {
        let mut state = self.lock();
        state.calls.push((
            Instant::now(),
            RecordedCall::List {
                calendar_id: calendar_id.to_string(),
            },
        ));

        let offset = *time_min.offset();
        Ok(state
            .events
            .iter()
            .filter(|e| e.calendar_id == calendar_id)
            .filter(|e| {
                match (event_start(&e.body.start, offset), event_start(&e.body.end, offset)) {
                    (Some(start), Some(end)) => start < time_max && end > time_min,
                    _ => false,
                }
            })
            .map(|e| RemoteEvent {
                id: e.id.clone(),
                summary: e.body.summary.clone(),
            })
            .collect())
    }

    async fn delete(&self, calendar_id: &str, event_id: &str) -> SyncResult<()> {
        let mut state = self.lock();
        state.calls.push((
            Instant::now(),
            RecordedCall::Delete {
                calendar_id: calendar_id.to_string(),
                event_id: event_id.to_string(),
            },
        ));

        let position = state
            .events
            .iter()
            .position(|e| e.calendar_id == calendar_id && e.id == event_id)
            .ok_or_else(|| SyncError::external("delete", format!("event not found: {}", event_id)))?;
        if should_fail(&state, &state.events[position].body.summary) {
            return Err(SyncError::external("delete", "simulated failure"));
        }
        state.events.remove(position);
        Ok(())
    }
}
