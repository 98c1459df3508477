// ==========================================
// 学院日程同步系统 - 外部日历同步层
// ==========================================
// 职责: 日历 id 解析 / 请求体构造 / 批量上传 / 批量删除
// 红线: 唯一触达外部系统的层;批次内单条失败不向外传播
// ==========================================

pub mod calendar_id;
pub mod client;
pub mod deleter;
pub mod error;
pub mod event_body;
pub mod google_client;
pub mod memory_client;
pub mod progress;
pub mod uploader;

pub use calendar_id::resolve_calendar_id;
pub use client::{CalendarClient, RemoteEvent};
pub use deleter::{filter_by_unit, BulkDeleter};
pub use error::{SyncError, SyncResult};
pub use event_body::{EventBody, EventBodyBuilder, EventTime};
pub use google_client::GoogleCalendarClient;
pub use memory_client::{InMemoryCalendarClient, RecordedCall};
pub use progress::{BatchProgress, ProgressSnapshot};
pub use uploader::BatchUploader;
