// ==========================================
// 日程导入 → 上传 端到端测试
// ==========================================
// 测试目标: 文件 → 合并事件 → 顺序创建调用（含调用间隔）
// ==========================================


use chrono::NaiveDate;
use college_schedule_sync::calendar::{InMemoryCalendarClient, RecordedCall};
use college_schedule_sync::importer::ScheduleImporter;
use college_schedule_sync::logging;
use std::time::Duration;
use test_helpers::{importer_2025, uploader, write_temp_file, CALENDAR_ID};

const FIVE_ROWS: &str = "\
Date,Dept,Title,Doc_No,Attachments
2025-03-10,A,Meeting,DOC-1,agenda
2025-03-11,A,Meeting,,minutes
2025-03-12,A,Meeting,,
2025-03-15,A,Meeting,,
2025-03-20,B,Review,,
";

fn d(m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, m, day).unwrap()
}

#[tokio::test]
async fn test_five_rows_yield_three_groups_and_three_creates() {
    logging::init_test();

    let file = write_temp_file(".csv", FIVE_ROWS.as_bytes());
    let outcome = importer_2025().import_file(file.path()).await.unwrap();

    // 合并结果: [03-10..03-12 A Meeting], [03-15 A Meeting], [03-20 B Review]
    assert_eq!(outcome.total_rows, 5);
    assert_eq!(outcome.events.len(), 3);

    let groups: Vec<(NaiveDate, Option<NaiveDate>, &str, &str)> = outcome
        .events
        .iter()
        .map(|e| (e.date, e.end_date, e.unit.as_str(), e.title.as_str()))
        .collect();
    assert_eq!(
        groups,
        vec![
            (d(3, 10), Some(d(3, 12)), "A", "Meeting"),
            (d(3, 15), None, "A", "Meeting"),
            (d(3, 20), None, "B", "Review"),
        ]
    );
    assert_eq!(outcome.events[0].attachments, vec!["agenda", "minutes"]);
    assert_eq!(outcome.events[0].doc_ref.as_deref(), Some("DOC-1"));

    // 上传: 恰好 3 次创建调用,且调用之间有间隔
    let delay = Duration::from_millis(30);
    let client = InMemoryCalendarClient::new();
    let result = uploader(&client, delay)
        .upload_outcome(CALENDAR_ID, &outcome)
        .await
        .unwrap();

    assert_eq!(result.attempted, 3);
    assert_eq!(result.succeeded, 3);
    assert_eq!(result.failed, 0);
    assert_eq!(result.to_string(), "3 succeeded, 0 skipped");
    assert_eq!(client.create_count(), 3);

    let instants = client.call_instants();
    for pair in instants.windows(2) {
        assert!(
            pair[1].duration_since(pair[0]) >= delay,
            "calls must be spaced by the configured delay"
        );
    }

    let summaries: Vec<String> = client
        .calls()
        .into_iter()
        .filter_map(|c| match c {
            RecordedCall::Create { summary, .. } => Some(summary),
            _ => None,
        })
        .collect();
    assert_eq!(summaries, vec!["[A] Meeting", "[A] Meeting", "[B] Review"]);
}

#[tokio::test]
async fn test_uploaded_bodies_follow_all_day_and_timed_rules() {
    let file = write_temp_file(".csv", FIVE_ROWS.as_bytes());
    let outcome = importer_2025().import_file(file.path()).await.unwrap();

    let client = InMemoryCalendarClient::new();
    uploader(&client, Duration::ZERO)
        .upload_events(CALENDAR_ID, &outcome.events)
        .await
        .unwrap();

    let bodies = client.stored(CALENDAR_ID);
    assert_eq!(bodies.len(), 3);

    // 合并区间: 全天,结束日期不含
    assert_eq!(bodies[0].start.date.as_deref(), Some("2025-03-10"));
    assert_eq!(bodies[0].end.date.as_deref(), Some("2025-03-13"));
    assert_eq!(bodies[0].description, "문서번호: DOC-1\n첨부파일:\n- agenda\n- minutes");

    // 单日: 09:00 起 1 小时
    assert_eq!(
        bodies[1].start.date_time.as_deref(),
        Some("2025-03-15T09:00:00+09:00")
    );
    assert_eq!(
        bodies[1].end.date_time.as_deref(),
        Some("2025-03-15T10:00:00+09:00")
    );
}

#[tokio::test]
async fn test_euc_kr_file_is_decoded() {
    let content = "날짜,부서,제목\n2025.03.10,교무처,학사회의\n3월 11일,교무처,학사회의\n";
    let (encoded, _, _) = encoding_rs::EUC_KR.encode(content);
    let file = write_temp_file(".csv", &encoded);

    let outcome = importer_2025().import_file(file.path()).await.unwrap();
    assert_eq!(outcome.events.len(), 1);
    assert_eq!(outcome.events[0].unit, "교무처");
    assert_eq!(outcome.events[0].end_date, Some(d(3, 11)));
    assert_eq!(outcome.events[0].color_id, "9");
}

#[tokio::test]
async fn test_weekly_meetings_stay_separate() {
    let csv = "날짜,부서,제목\n2025-03-03,기획처,주간회의\n2025-03-10,기획처,주간회의\n2025-03-12,기획처,주간회의\n";
    let file = write_temp_file(".csv", csv.as_bytes());

    let outcome = importer_2025().import_file(file.path()).await.unwrap();
    assert_eq!(outcome.events.len(), 3);
    assert!(outcome.events.iter().all(|e| e.end_date.is_none()));
}

/// FIVE_ROWS 的 .xlsx 版本（空单元格不写入）
fn five_rows_xlsx() -> Vec<u8> {
    use rust_xlsxwriter::Workbook;

    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    for (r, line) in FIVE_ROWS.lines().enumerate() {
        for (c, value) in line.split(',').enumerate() {
            if !value.is_empty() {
                sheet.write_string(r as u32, c as u16, value).unwrap();
            }
        }
    }
    workbook.save_to_buffer().unwrap()
}

#[tokio::test]
async fn test_xlsx_file_matches_csv_file() {
    let csv_file = write_temp_file(".csv", FIVE_ROWS.as_bytes());
    let xlsx_file = write_temp_file(".xlsx", &five_rows_xlsx());

    let from_csv = importer_2025().import_file(csv_file.path()).await.unwrap();
    let from_xlsx = importer_2025().import_file(xlsx_file.path()).await.unwrap();

    assert_eq!(from_xlsx.total_rows, 5);
    assert_eq!(from_xlsx.events.len(), 3);
    assert_eq!(from_xlsx.events, from_csv.events);
    assert_eq!(from_xlsx.events[0].end_date, Some(d(3, 12)));
}

#[tokio::test]
async fn test_unsupported_extension_is_rejected() {
    let file = write_temp_file(".pdf", b"%PDF-1.4");
    let result = importer_2025().import_file(file.path()).await;
    assert!(result.is_err());
}
