// ==========================================
// 学院日程同步系统 - 部门分类器实现
// ==========================================
// 阶段 4: 部门标签 → 颜色 id
// 规则: 按表顺序取首个"关键字为标签子串"的条目;均不匹配 → 回退色
// 说明: 实际标签常带分部/科室后缀,因此用子串而非精确匹配
// ==========================================

use crate::config::{ScheduleConfig, UnitColor};
use crate::importer::schedule_importer_trait::UnitClassifier as UnitClassifierTrait;

pub struct UnitClassifier {
    table: Vec<UnitColor>,
    fallback_color_id: String,
}

impl UnitClassifier {
    pub fn new(table: Vec<UnitColor>, fallback_color_id: impl Into<String>) -> Self {
        Self {
            table,
            fallback_color_id: fallback_color_id.into(),
        }
    }

    pub fn from_config(config: &ScheduleConfig) -> Self {
        Self::new(config.unit_colors.clone(), config.fallback_color_id.clone())
    }

    pub fn fallback_color_id(&self) -> &str {
        &self.fallback_color_id
    }
}

impl UnitClassifierTrait for UnitClassifier {
    fn classify(&self, unit_label: &str) -> String {
        self.table
            .iter()
            .find(|entry| !entry.key.is_empty() && unit_label.contains(entry.key.as_str()))
            .map(|entry| entry.color_id.clone())
            .unwrap_or_else(|| self.fallback_color_id.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> UnitClassifier {
        UnitClassifier::from_config(&ScheduleConfig::default())
    }

    #[test]
    fn test_exact_label() {
        assert_eq!(classifier().classify("교무처"), "9");
    }

    #[test]
    fn test_suffix_label_matches_by_substring() {
        assert_eq!(classifier().classify("교무처 학사관리팀(본관 201호)"), "9");
        assert_eq!(classifier().classify("제2캠퍼스 학생처"), "10");
    }

    #[test]
    fn test_unknown_label_falls_back() {
        assert_eq!(classifier().classify("시설관리팀"), "8");
        assert_eq!(classifier().classify(""), "8");
    }

    #[test]
    fn test_first_entry_wins() {
        let classifier = UnitClassifier::new(
            vec![UnitColor::new("학생", "1"), UnitColor::new("학생처", "2")],
            "8",
        );
        assert_eq!(classifier.classify("학생처"), "1");
    }

    #[test]
    fn test_classification_is_deterministic() {
        let classifier = classifier();
        let label = "산학협력단 연구지원팀";
        assert_eq!(classifier.classify(label), classifier.classify(label));
        assert_eq!(classifier.classify(label), "3");
    }
}
