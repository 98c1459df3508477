// ==========================================
// 学院日程同步系统 - Google Calendar v3 客户端
// ==========================================
// 接口:
// - create → POST   {base}/calendars/{id}/events
// - list   → GET    {base}/calendars/{id}/events?timeMin&timeMax&singleEvents=true
// - delete → DELETE {base}/calendars/{id}/events/{eventId}
// 认证: Bearer access token（获取方式不在本系统范围内）
// ==========================================

use crate::calendar::client::{CalendarClient, RemoteEvent};
use crate::calendar::error::{SyncError, SyncResult};
use crate::calendar::event_body::EventBody;
use crate::config::SyncSettings;
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, SecondsFormat};
use serde::Deserialize;
use tracing::debug;
use url::Url;

const PAGE_SIZE: &str = "2500";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventListPage {
    #[serde(default)]
    items: Vec<RemoteEvent>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CreatedEvent {
    id: String,
}

pub struct GoogleCalendarClient {
    client: reqwest::Client,
    base_url: String,
    access_token: String,
}

impl GoogleCalendarClient {
    pub fn new(base_url: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            access_token: access_token.into(),
        }
    }

    /// 从同步配置构造（缺少 access token 时为配置错误）
    pub fn from_settings(settings: &SyncSettings) -> SyncResult<Self> {
        let token = settings
            .access_token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| SyncError::Configuration("未配置 access token".to_string()))?;
        Ok(Self::new(settings.api_base_url.clone(), token))
    }

    /// 拼接 {base}/calendars/{id}/events[/{eventId}]（各段自动转义）
    fn events_url(&self, calendar_id: &str, event_id: Option<&str>) -> SyncResult<Url> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| SyncError::Configuration(format!("API 地址无效: {}", e)))?;
        {
            let mut segments = url.path_segments_mut().map_err(|_| {
                SyncError::Configuration(format!("API 地址不能作为基础路径: {}", self.base_url))
            })?;
            segments.pop_if_empty().extend(["calendars", calendar_id, "events"]);
            if let Some(event_id) = event_id {
                segments.push(event_id);
            }
        }
        Ok(url)
    }

    /// 非 2xx 响应转为外部调用错误
    async fn check_status(
        operation: &str,
        response: reqwest::Response,
    ) -> SyncResult<reqwest::Response> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        Err(SyncError::external(
            operation,
            format!("API error ({}): {}", status, text),
        ))
    }
}

#[async_trait]
impl CalendarClient for GoogleCalendarClient {
    async fn create(&self, calendar_id: &str, body: &EventBody) -> SyncResult<String> {
        let url = self.events_url(calendar_id, None)?;

        let response = self
            .client
            .post(url)
            .bearer_auth(&self.access_token)
            .json(body)
            .send()
            .await?;
        let response = Self::check_status("create", response).await?;

        let created: CreatedEvent = response
            .json()
            .await
            .map_err(|e| SyncError::Decode(format!("Failed to parse JSON: {}", e)))?;
        Ok(created.id)
    }

    async fn list(
        &self,
        calendar_id: &str,
        time_min: DateTime<FixedOffset>,
        time_max: DateTime<FixedOffset>,
    ) -> SyncResult<Vec<RemoteEvent>> {
        let url = self.events_url(calendar_id, None)?;
        let time_min = time_min.to_rfc3339_opts(SecondsFormat::Secs, true);
        let time_max = time_max.to_rfc3339_opts(SecondsFormat::Secs, true);

        let mut events = Vec::new();
        let mut page_token: Option<String> = None;
        loop {
            let mut request = self
                .client
                .get(url.clone())
                .bearer_auth(&self.access_token)
                .query(&[
                    ("timeMin", time_min.as_str()),
                    ("timeMax", time_max.as_str()),
                    ("singleEvents", "true"),
                    ("maxResults", PAGE_SIZE),
                ]);
            if let Some(token) = &page_token {
                request = request.query(&[("pageToken", token.as_str())]);
            }

            let response = Self::check_status("list", request.send().await?).await?;
            let page: EventListPage = response
                .json()
                .await
                .map_err(|e| SyncError::Decode(format!("Failed to parse JSON: {}", e)))?;

            debug!(count = page.items.len(), "已获取事件列表分页");
            events.extend(page.items);
            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        Ok(events)
    }

    async fn delete(&self, calendar_id: &str, event_id: &str) -> SyncResult<()> {
        let url = self.events_url(calendar_id, Some(event_id))?;

        let response = self
            .client
            .delete(url)
            .bearer_auth(&self.access_token)
            .send()
            .await?;
        Self::check_status("delete", response).await?;
        Ok(())
    }
}
