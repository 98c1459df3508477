// ==========================================
// 批量上传 / 批量删除 集成测试
// ==========================================
// 测试目标:
// - succeeded + failed == attempted（含单条失败与跳过记录）
// - 配置错误在任何外部调用之前返回
// - 删除按 "[部门]" 过滤,单条失败不影响后续
// - 取消后报告部分计数
// ==========================================


use chrono::NaiveDate;
use college_schedule_sync::calendar::{
    BatchProgress, InMemoryCalendarClient, RecordedCall, SyncError,
};
use college_schedule_sync::domain::{ImportOutcome, ScheduleEvent, SkippedRecord};
use std::sync::Arc;
use std::time::Duration;
use test_helpers::{deleter, uploader, CALENDAR_ID};

fn d(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, day).unwrap()
}

fn event(day: u32, unit: &str, title: &str) -> ScheduleEvent {
    ScheduleEvent {
        date: d(day),
        end_date: None,
        time: None,
        unit: unit.to_string(),
        title: title.to_string(),
        doc_ref: None,
        attachments: vec![],
        color_id: "8".to_string(),
        source_row: day as usize,
    }
}

#[tokio::test]
async fn test_failed_creates_are_counted_and_batch_continues() {
    let client = InMemoryCalendarClient::new();
    client.fail_when_summary_contains("[학생처]");

    let events = vec![
        event(10, "교무처", "학사회의"),
        event(11, "학생처", "장학위원회"),
        event(12, "기획처", "예산회의"),
    ];
    let result = uploader(&client, Duration::ZERO)
        .upload_events(CALENDAR_ID, &events)
        .await
        .unwrap();

    assert_eq!(result.attempted, 3);
    assert_eq!(result.succeeded, 2);
    assert_eq!(result.failed, 1);
    assert!(result.is_consistent());
    assert_eq!(result.failures[0].index, 1);
    assert_eq!(result.failures[0].label, "[학생처] 장학위원회");
    assert_eq!(client.create_count(), 3);
    assert_eq!(client.stored(CALENDAR_ID).len(), 2);
}

#[tokio::test]
async fn test_skipped_records_count_as_failures_without_calls() {
    let client = InMemoryCalendarClient::new();
    let outcome = ImportOutcome {
        run_id: "import-1".to_string(),
        file_name: None,
        total_rows: 3,
        events: vec![event(10, "교무처", "학사회의")],
        skipped: vec![
            SkippedRecord {
                row_number: 3,
                title: "미정 행사".to_string(),
                reason: "日期无法解析".to_string(),
            },
            SkippedRecord {
                row_number: 4,
                title: "추후 공지".to_string(),
                reason: "日期无法解析".to_string(),
            },
        ],
        elapsed: Duration::ZERO,
    };

    let uploader = uploader(&client, Duration::ZERO);
    let progress = uploader.progress();
    let result = uploader.upload_outcome(CALENDAR_ID, &outcome).await.unwrap();

    assert_eq!(result.attempted, 3);
    assert_eq!(result.succeeded, 1);
    assert_eq!(result.failed, 2);
    assert_eq!(result.to_string(), "1 succeeded, 2 skipped");
    assert_eq!(client.create_count(), 1);

    let snapshot = progress.snapshot();
    assert_eq!(snapshot.total, 3);
    assert_eq!(snapshot.processed, 3);
    assert_eq!(snapshot.succeeded, 1);
}

#[tokio::test]
async fn test_invalid_calendar_fails_before_any_call() {
    let client = InMemoryCalendarClient::new();
    let events = vec![event(10, "교무처", "학사회의")];

    for calendar_ref in ["", "https://calendar.google.com/calendar/r"] {
        let err = uploader(&client, Duration::ZERO)
            .upload_events(calendar_ref, &events)
            .await
            .unwrap_err();
        assert!(matches!(err, SyncError::Configuration(_)));
    }
    assert!(client.calls().is_empty());
}

#[tokio::test]
async fn test_sharing_url_is_accepted() {
    let client = InMemoryCalendarClient::new();
    let url = "https://calendar.google.com/calendar/embed?src=team%40group.calendar.google.com";

    uploader(&client, Duration::ZERO)
        .upload_events(url, &[event(10, "교무처", "학사회의")])
        .await
        .unwrap();
    assert_eq!(client.stored(CALENDAR_ID).len(), 1);
}

#[tokio::test]
async fn test_cancelled_upload_reports_partial_counts() {
    let client = InMemoryCalendarClient::new();
    let progress = Arc::new(BatchProgress::new());
    progress.cancel();

    let events = vec![event(10, "교무처", "a"), event(11, "교무처", "b")];
    let result = uploader(&client, Duration::ZERO)
        .with_progress(Arc::clone(&progress))
        .upload_events(CALENDAR_ID, &events)
        .await
        .unwrap();

    assert!(result.cancelled);
    assert_eq!(result.attempted, 0);
    assert!(result.is_consistent());
    assert_eq!(client.create_count(), 0);
    assert_eq!(result.to_string(), "0 succeeded, 0 skipped (cancelled)");
}

#[tokio::test]
async fn test_delete_filters_by_bracketed_unit() {
    let client = InMemoryCalendarClient::new();
    client.seed_all_day(CALENDAR_ID, "[학생처] 장학위원회", d(10));
    let target_a = client.seed_all_day(CALENDAR_ID, "[교무처] 학사회의", d(10));
    let target_b = client.seed_all_day(CALENDAR_ID, "[교무처] 교원회의", d(12));
    client.seed_all_day(CALENDAR_ID, "[교무처] 졸업식", d(25));

    let result = deleter(&client, Duration::ZERO)
        .delete_range(CALENDAR_ID, d(10), d(12), Some("교무처"))
        .await
        .unwrap();

    assert_eq!(result.attempted, 2);
    assert_eq!(result.succeeded, 2);
    assert!(result.is_consistent());

    let deleted: Vec<String> = client
        .calls()
        .into_iter()
        .filter_map(|c| match c {
            RecordedCall::Delete { event_id, .. } => Some(event_id),
            _ => None,
        })
        .collect();
    assert_eq!(deleted, vec![target_a, target_b]);

    let remaining: Vec<String> = client
        .stored(CALENDAR_ID)
        .into_iter()
        .map(|b| b.summary)
        .collect();
    assert_eq!(remaining, vec!["[학생처] 장학위원회", "[교무처] 졸업식"]);
}

#[tokio::test]
async fn test_delete_failure_is_isolated() {
    let client = InMemoryCalendarClient::new();
    client.seed_all_day(CALENDAR_ID, "[교무처] 잠김", d(10));
    client.seed_all_day(CALENDAR_ID, "[교무처] 회의", d(11));
    client.fail_when_summary_contains("잠김");

    let result = deleter(&client, Duration::ZERO)
        .delete_range(CALENDAR_ID, d(1), d(31), None)
        .await
        .unwrap();

    assert_eq!(result.attempted, 2);
    assert_eq!(result.succeeded, 1);
    assert_eq!(result.failed, 1);
    assert_eq!(result.failures[0].label, "[교무처] 잠김");
    assert_eq!(client.stored(CALENDAR_ID).len(), 1);
}

#[tokio::test]
async fn test_delete_rejects_reversed_range() {
    let client = InMemoryCalendarClient::new();
    let err = deleter(&client, Duration::ZERO)
        .delete_range(CALENDAR_ID, d(12), d(10), None)
        .await
        .unwrap_err();
    assert!(matches!(err, SyncError::Configuration(_)));
    assert!(client.calls().is_empty());
}

#[tokio::test]
async fn test_second_batch_on_same_uploader_starts_from_zero() {
    let client = InMemoryCalendarClient::new();
    let uploader = uploader(&client, Duration::ZERO);
    let progress = uploader.progress();
    let events = vec![event(10, "교무처", "a"), event(11, "교무처", "b")];

    uploader.upload_events(CALENDAR_ID, &events).await.unwrap();
    uploader.upload_events(CALENDAR_ID, &events).await.unwrap();

    let snapshot = progress.snapshot();
    assert_eq!(snapshot.total, 2);
    assert_eq!(snapshot.processed, 2);
    assert_eq!(snapshot.succeeded, 2);
    assert_eq!(snapshot.failed, 0);
    assert_eq!(client.create_count(), 4);
}

#[tokio::test]
async fn test_cancel_is_consumed_by_one_batch() {
    let client = InMemoryCalendarClient::new();
    let uploader = uploader(&client, Duration::ZERO);
    let events = vec![event(10, "교무처", "a"), event(11, "교무처", "b")];

    uploader.progress().cancel();
    let first = uploader.upload_events(CALENDAR_ID, &events).await.unwrap();
    assert!(first.cancelled);
    assert_eq!(first.attempted, 0);

    let second = uploader.upload_events(CALENDAR_ID, &events).await.unwrap();
    assert!(!second.cancelled);
    assert_eq!(second.succeeded, 2);
    assert!(!uploader.progress().is_cancelled());
}

#[tokio::test]
async fn test_deleter_reuse_resets_progress() {
    let client = InMemoryCalendarClient::new();
    client.seed_all_day(CALENDAR_ID, "[교무처] 회의", d(10));
    client.seed_all_day(CALENDAR_ID, "[교무처] 회의", d(20));
    let deleter = deleter(&client, Duration::ZERO);

    deleter
        .delete_range(CALENDAR_ID, d(10), d(10), None)
        .await
        .unwrap();
    deleter
        .delete_range(CALENDAR_ID, d(20), d(20), None)
        .await
        .unwrap();

    let snapshot = deleter.progress().snapshot();
    assert_eq!(snapshot.total, 1);
    assert_eq!(snapshot.processed, 1);
    assert_eq!(snapshot.succeeded, 1);
}
