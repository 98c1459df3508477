// ==========================================
// 学院日程同步系统 - 日期解析引擎
// ==========================================
// 阶段 3: 自由文本日期 → 日历日期
// 红线: 全函数,任何输入只返回日期或 None,绝不 panic
// ==========================================
// 级联顺序（首个命中即返回）:
// 0. 去噪: 括号备注 / "까지·부터·제출·마감" 等词 / 年月日标记、点、斜杠
// 1. ExactIso          YYYY <分隔> M <分隔> D
// 2. CompactDigits     YYYYMMDD
// 3. TwoDigitYear      YY <分隔> M <分隔> D  → 2000 + YY
// 4. YearlessMonthDay  M <分隔> D            → 参考年份（当年）
// 已知缺陷（保留原样）: 2000–2099 以外的两位年份;跨年附近的无年份日期
// ==========================================

use chrono::{Datelike, Local, NaiveDate, NaiveTime};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

/// 括号备注（含全角括号;未闭合时丢弃其后全部内容）
static PARENTHETICAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[(（][^)）]*(?:[)）]|$)").expect("valid parenthetical regex"));

/// 韩文噪声词（直接黏附在数字后,按子串移除）
static KOREAN_NOISE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"까지|부터|제출|마감|기한|접수").expect("valid korean noise regex"));

/// 英文噪声词（整词移除）
static ENGLISH_NOISE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:by|from|until|till|to|due|deadline|submission|submit)\b")
        .expect("valid english noise regex")
});

/// 年/月/日标记与点、斜杠
static SEPARATORS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[년월일./．／]").expect("valid separator regex"));

/// 连续 ASCII 数字串（模式只从数字串起点开始匹配）
static DIGIT_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[0-9]+").expect("valid digit regex"));

// 每个模式锚定在数字串起点,并要求末尾数字串完整结束
static EXACT_ISO: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([0-9]{4})[^0-9]+([0-9]{1,2})[^0-9]+([0-9]{1,2})(?:[^0-9]|$)")
        .expect("valid iso date regex")
});
static COMPACT_DIGITS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([0-9]{4})([0-9]{2})([0-9]{2})(?:[^0-9]|$)").expect("valid compact date regex")
});
static TWO_DIGIT_YEAR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([0-9]{2})[^0-9]+([0-9]{1,2})[^0-9]+([0-9]{1,2})(?:[^0-9]|$)")
        .expect("valid two-digit-year regex")
});
static YEARLESS_MONTH_DAY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([0-9]{1,2})[^0-9]+([0-9]{1,2})(?:[^0-9]|$)").expect("valid month-day regex")
});

/// 时间: [오전|오후] H[:|시][MM[분]][am|pm]
static TIME_OF_DAY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^(오전|오후)?\s*([0-9]{1,2})\s*(:|시)?\s*(?:([0-9]{1,2})\s*분?)?\s*([ap]\.?m\.?)?$",
    )
    .expect("valid time regex")
});

// ==========================================
// DatePattern - 级联中的单个模式
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DatePattern {
    ExactIso,
    CompactDigits,
    TwoDigitYear,
    YearlessMonthDay,
}

impl DatePattern {
    /// 级联顺序（特异性递减）
    pub const CASCADE: [DatePattern; 4] = [
        DatePattern::ExactIso,
        DatePattern::CompactDigits,
        DatePattern::TwoDigitYear,
        DatePattern::YearlessMonthDay,
    ];

    fn regex(self) -> &'static Regex {
        match self {
            DatePattern::ExactIso => &*EXACT_ISO,
            DatePattern::CompactDigits => &*COMPACT_DIGITS,
            DatePattern::TwoDigitYear => &*TWO_DIGIT_YEAR,
            DatePattern::YearlessMonthDay => &*YEARLESS_MONTH_DAY,
        }
    }

    /// 在去噪后的文本上尝试匹配
    ///
    /// 依次从每个数字串起点尝试;数字不能构成合法日期的位置不算命中
    pub fn try_parse(self, cleaned: &str, reference_year: i32) -> Option<NaiveDate> {
        DIGIT_RUN.find_iter(cleaned).find_map(|run| {
            let caps = self.regex().captures(&cleaned[run.start()..])?;
            self.build(&caps, reference_year)
        })
    }

    fn build(self, caps: &Captures<'_>, reference_year: i32) -> Option<NaiveDate> {
        let number = |i: usize| caps.get(i)?.as_str().parse::<u32>().ok();
        let (year, month, day) = match self {
            DatePattern::ExactIso | DatePattern::CompactDigits => {
                (i32::try_from(number(1)?).ok()?, number(2)?, number(3)?)
            }
            DatePattern::TwoDigitYear => {
                (2000 + i32::try_from(number(1)?).ok()?, number(2)?, number(3)?)
            }
            DatePattern::YearlessMonthDay => (reference_year, number(1)?, number(2)?),
        };
        NaiveDate::from_ymd_opt(year, month, day)
    }
}

/// 去噪: 括号备注 / 噪声词 / 分隔字符,并压缩空白
pub fn strip_noise(text: &str) -> String {
    let cleaned = PARENTHETICAL.replace_all(text, " ").to_lowercase();
    let cleaned = KOREAN_NOISE.replace_all(&cleaned, " ");
    let cleaned = SEPARATORS.replace_all(&cleaned, " ");
    let cleaned = ENGLISH_NOISE.replace_all(&cleaned, " ");
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

// ==========================================
// DateResolver - 级联日期解析器
// ==========================================
#[derive(Debug, Clone)]
pub struct DateResolver {
    reference_year: i32,
    patterns: Vec<DatePattern>,
}

impl DateResolver {
    /// 指定无年份日期使用的参考年份
    pub fn new(reference_year: i32) -> Self {
        Self {
            reference_year,
            patterns: DatePattern::CASCADE.to_vec(),
        }
    }

    /// 以本地当前年份为参考
    pub fn current() -> Self {
        Self::new(Local::now().year())
    }

    pub fn reference_year(&self) -> i32 {
        self.reference_year
    }

    /// 解析日期,无法解析时返回 None
    pub fn resolve(&self, text: &str) -> Option<NaiveDate> {
        self.resolve_tagged(text).map(|(_, date)| date)
    }

    /// 解析日期并返回命中的模式
    pub fn resolve_tagged(&self, text: &str) -> Option<(DatePattern, NaiveDate)> {
        let cleaned = strip_noise(text);
        if cleaned.is_empty() {
            return None;
        }
        self.patterns.iter().find_map(|pattern| {
            pattern
                .try_parse(&cleaned, self.reference_year)
                .map(|date| (*pattern, date))
        })
    }
}

impl Default for DateResolver {
    fn default() -> Self {
        Self::current()
    }
}

/// 以当前年份解析日期（便捷函数）
pub fn resolve_date(text: &str) -> Option<NaiveDate> {
    DateResolver::current().resolve(text)
}

// ==========================================
// 时间解析（可选时间列）
// ==========================================

/// 解析时间: "14:30" / "14시 30분" / "오후 3시" / "3pm" / "오전 10:30"
///
/// 不含 ':'、'시' 或上下午标记的文本不视为时间
pub fn resolve_time(text: &str) -> Option<NaiveTime> {
    let lower = text.trim().to_lowercase();
    let caps = TIME_OF_DAY.captures(&lower)?;

    let korean = caps.get(1).map(|m| m.as_str());
    let english = caps.get(5).map(|m| m.as_str());
    // 无 ':'、'시' 或上下午标记的纯数字不视为时间
    if caps.get(3).is_none() && korean.is_none() && english.is_none() {
        return None;
    }

    let hour = caps.get(2)?.as_str().parse::<u32>().ok()?;
    let minute = caps.get(4).map_or(Some(0), |m| m.as_str().parse::<u32>().ok())?;

    let is_pm = korean == Some("오후") || english.is_some_and(|m| m.starts_with('p'));
    let is_am = korean == Some("오전") || english.is_some_and(|m| m.starts_with('a'));
    let hour = match (is_pm, is_am) {
        (true, false) if hour < 12 => hour + 12,
        (false, true) if hour == 12 => 0,
        _ => hour,
    };
    NaiveTime::from_hms_opt(hour, minute, 0)
}
