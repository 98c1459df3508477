// ==========================================
// 学院日程同步系统 - 事件合并器实现
// ==========================================
// 阶段 5: 区间合并
// 输入: 仅含 date 的单日事件,已按日期升序（稳定排序,保持源顺序）
// 规则: 部门相同 且 标题相同 且 间隔恰为 1 天 → 延长当前组 end_date
// 红线: 间隔 ≥ 2 天不桥接（每周同名例会不得被合并）
// ==========================================

use crate::domain::ScheduleEvent;
use crate::importer::schedule_importer_trait::EventMerger as EventMergerTrait;
use tracing::debug;

pub struct EventMerger;

impl EventMerger {
    fn can_extend(group: &ScheduleEvent, candidate: &ScheduleEvent) -> bool {
        let gap = (candidate.date - group.last_date()).num_days();
        gap == 1 && group.unit == candidate.unit && group.title == candidate.title
    }

    fn extend(group: &mut ScheduleEvent, candidate: ScheduleEvent) {
        group.end_date = Some(candidate.date);
        for attachment in candidate.attachments {
            if !group.attachments.contains(&attachment) {
                group.attachments.push(attachment);
            }
        }
        if group.doc_ref.is_none() {
            group.doc_ref = candidate.doc_ref;
        }
    }
}

impl EventMergerTrait for EventMerger {
    fn merge(&self, events: Vec<ScheduleEvent>) -> Vec<ScheduleEvent> {
        let input_len = events.len();
        let mut merged = Vec::with_capacity(input_len);
        let mut iter = events.into_iter();

        let Some(mut current) = iter.next() else {
            return merged;
        };

        for candidate in iter {
            if Self::can_extend(&current, &candidate) {
                Self::extend(&mut current, candidate);
            } else {
                merged.push(std::mem::replace(&mut current, candidate));
            }
        }
        merged.push(current);

        debug!(input = input_len, output = merged.len(), "事件合并完成");
        merged
    }
}

/// 按日期稳定排序（同日期保持源顺序）
pub fn sort_by_date(events: &mut [ScheduleEvent]) {
    events.sort_by_key(|e| e.date);
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn event(day: u32, unit: &str, title: &str) -> ScheduleEvent {
        ScheduleEvent {
            date: NaiveDate::from_ymd_opt(2025, 3, day).unwrap(),
            end_date: None,
            time: None,
            unit: unit.to_string(),
            title: title.to_string(),
            doc_ref: None,
            attachments: vec![],
            color_id: "9".to_string(),
            source_row: day as usize,
        }
    }

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, day).unwrap()
    }

    #[test]
    fn test_three_day_run_then_different_title() {
        let events = vec![
            event(10, "A", "Meeting"),
            event(11, "A", "Meeting"),
            event(12, "A", "Meeting"),
            event(13, "A", "Review"),
        ];
        let merged = EventMerger.merge(events);

        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].date, d(10));
        assert_eq!(merged[0].end_date, Some(d(12)));
        assert_eq!(merged[0].title, "Meeting");
        assert_eq!(merged[1].date, d(13));
        assert_eq!(merged[1].end_date, None);
        assert_eq!(merged[1].title, "Review");
    }

    #[test]
    fn test_two_day_gap_is_not_bridged() {
        let merged = EventMerger.merge(vec![event(10, "A", "Meeting"), event(12, "A", "Meeting")]);
        assert_eq!(merged.len(), 2);
        assert!(merged.iter().all(|e| e.end_date.is_none()));
    }

    #[test]
    fn test_weekly_meetings_stay_separate() {
        let merged = EventMerger.merge(vec![
            event(3, "A", "주간회의"),
            event(10, "A", "주간회의"),
            event(17, "A", "주간회의"),
        ]);
        assert_eq!(merged.len(), 3);
    }

    #[test]
    fn test_different_unit_breaks_run() {
        let merged = EventMerger.merge(vec![
            event(10, "A", "Meeting"),
            event(11, "B", "Meeting"),
            event(12, "B", "Meeting"),
        ]);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[1].unit, "B");
        assert_eq!(merged[1].end_date, Some(d(12)));
    }

    #[test]
    fn test_same_day_duplicate_starts_new_group() {
        let merged = EventMerger.merge(vec![event(10, "A", "Meeting"), event(10, "A", "Meeting")]);
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn test_extension_unions_attachments() {
        let mut first = event(10, "A", "Meeting");
        first.attachments = vec!["안건".to_string()];
        let mut second = event(11, "A", "Meeting");
        second.attachments = vec!["안건".to_string(), "명단".to_string()];
        second.doc_ref = Some("교무-7".to_string());

        let merged = EventMerger.merge(vec![first, second]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].attachments, vec!["안건", "명단"]);
        assert_eq!(merged[0].doc_ref.as_deref(), Some("교무-7"));
        assert_eq!(merged[0].source_row, 10);
    }

    #[test]
    fn test_empty_input() {
        assert!(EventMerger.merge(vec![]).is_empty());
    }

    #[test]
    fn test_sort_is_stable() {
        let mut events = vec![event(12, "A", "x"), event(10, "B", "first"), event(10, "C", "second")];
        sort_by_date(&mut events);
        assert_eq!(events[0].unit, "B");
        assert_eq!(events[1].unit, "C");
        assert_eq!(events[2].date, d(12));
    }

    #[test]
    fn test_output_is_maximal() {
        let merged = EventMerger.merge(vec![
            event(1, "A", "x"),
            event(2, "A", "x"),
            event(3, "A", "x"),
            event(5, "A", "x"),
            event(6, "A", "x"),
        ]);
        for pair in merged.windows(2) {
            assert!(!EventMerger::can_extend(&pair[0], &pair[1]));
        }
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[1].end_date, Some(d(6)));
    }
}
