// ==========================================
// 学院日程同步系统 - 日程配置数据
// ==========================================
// 职责: 字段别名表 / 部门颜色表 / 同步参数
// 红线: 启动时加载一次,之后只读注入各组件（不使用全局可变表）
// ==========================================

use crate::config::config_manager::ConfigError;
use chrono::NaiveTime;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::time::Duration;

// ==========================================
// ScheduleConfig - 顶层配置
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    /// 编码探测用表头关键字（任一出现即视为解码正确）
    pub header_tokens: Vec<String>,
    pub field_aliases: FieldAliases,
    /// 有序: 先匹配者优先
    pub unit_colors: Vec<UnitColor>,
    /// 未分类部门使用的颜色
    pub fallback_color_id: String,
    pub sync: SyncSettings,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            header_tokens: strings(&[
                "날짜", "일자", "부서", "제목", "문서번호", "첨부", "date", "dept", "title",
                "subject",
            ]),
            field_aliases: FieldAliases::default(),
            unit_colors: vec![
                UnitColor::new("교무처", "9"),
                UnitColor::new("학생처", "10"),
                UnitColor::new("기획처", "5"),
                UnitColor::new("입학처", "4"),
                UnitColor::new("총무처", "6"),
                UnitColor::new("산학협력단", "3"),
                UnitColor::new("취업지원센터", "2"),
                UnitColor::new("국제교류원", "1"),
                UnitColor::new("도서관", "7"),
                UnitColor::new("전산정보원", "11"),
            ],
            fallback_color_id: "8".to_string(),
            sync: SyncSettings::default(),
        }
    }
}

impl ScheduleConfig {
    /// 校验配置值（加载后调用一次）
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.fallback_color_id.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "fallback_color_id".to_string(),
                value: self.fallback_color_id.clone(),
                message: "回退颜色不能为空".to_string(),
            });
        }
        if let Some(entry) = self.unit_colors.iter().find(|e| e.key.trim().is_empty()) {
            return Err(ConfigError::InvalidValue {
                key: "unit_colors".to_string(),
                value: entry.color_id.clone(),
                message: "部门关键字不能为空".to_string(),
            });
        }
        self.sync.timezone()?;
        self.sync.default_start_time()?;
        if self.sync.event_duration_minutes <= 0 {
            return Err(ConfigError::InvalidValue {
                key: "sync.event_duration_minutes".to_string(),
                value: self.sync.event_duration_minutes.to_string(),
                message: "事件时长必须大于 0".to_string(),
            });
        }
        Ok(())
    }
}

// ==========================================
// FieldAliases - 规范字段 → 表头别名（有序）
// ==========================================
// 比较时忽略大小写/空白/下划线
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldAliases {
    pub date: Vec<String>,
    pub time: Vec<String>,
    pub unit: Vec<String>,
    pub title: Vec<String>,
    pub doc_ref: Vec<String>,
    pub attachments: Vec<String>,
    /// 编号附件列前缀（如 "첨부1", "attachment2"）
    pub numbered_attachment_prefixes: Vec<String>,
}

impl Default for FieldAliases {
    fn default() -> Self {
        Self {
            date: strings(&[
                "날짜", "일자", "일시", "접수일", "접수일자", "시행일", "시행일자", "기한",
                "마감일", "제출기한", "date", "receipt_date", "due_date", "deadline",
            ]),
            time: strings(&["시간", "시각", "시작시간", "time", "start_time"]),
            unit: strings(&[
                "부서", "담당부서", "부서명", "소속", "기관", "dept", "department", "unit",
                "office",
            ]),
            title: strings(&[
                "제목", "회의명", "행사명", "건명", "내용", "title", "subject", "summary", "name",
            ]),
            doc_ref: strings(&[
                "문서번호", "공문번호", "doc_no", "document_no", "doc_ref", "reference",
            ]),
            attachments: strings(&["첨부", "첨부파일", "첨부문서", "attachments", "attachment", "files"]),
            numbered_attachment_prefixes: strings(&["첨부파일", "첨부", "attachment", "file"]),
        }
    }
}

// ==========================================
// UnitColor - 部门关键字 → 颜色 id
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitColor {
    pub key: String,
    pub color_id: String,
}

impl UnitColor {
    pub fn new(key: impl Into<String>, color_id: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            color_id: color_id.into(),
        }
    }
}

// ==========================================
// SyncSettings - 外部日历同步参数
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncSettings {
    pub api_base_url: String,
    pub access_token: Option<String>,
    /// 日历 id 或共享链接
    pub calendar: Option<String>,
    /// IANA 时区名
    pub timezone: String,
    /// 未提供时间时的默认开始时间（HH:MM）
    pub default_start_time: String,
    pub event_duration_minutes: i64,
    /// 每次外部调用后的固定等待
    pub request_delay_ms: u64,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            api_base_url: "https://www.googleapis.com/calendar/v3".to_string(),
            access_token: None,
            calendar: None,
            timezone: "Asia/Seoul".to_string(),
            default_start_time: "09:00".to_string(),
            event_duration_minutes: 60,
            request_delay_ms: 500,
        }
    }
}

impl SyncSettings {
    pub fn timezone(&self) -> Result<Tz, ConfigError> {
        self.timezone
            .parse::<Tz>()
            .map_err(|e| ConfigError::InvalidValue {
                key: "sync.timezone".to_string(),
                value: self.timezone.clone(),
                message: e.to_string(),
            })
    }

    pub fn default_start_time(&self) -> Result<NaiveTime, ConfigError> {
        NaiveTime::parse_from_str(self.default_start_time.trim(), "%H:%M").map_err(|e| {
            ConfigError::InvalidValue {
                key: "sync.default_start_time".to_string(),
                value: self.default_start_time.clone(),
                message: e.to_string(),
            }
        })
    }

    pub fn event_duration(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.event_duration_minutes)
    }

    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
