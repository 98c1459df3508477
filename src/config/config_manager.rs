// ==========================================
// 学院日程同步系统 - 配置管理器
// ==========================================
// 职责: 配置加载（文件 → 默认值）+ 环境变量覆写
// 存储: JSON 文件（默认位于用户配置目录）
// ==========================================

use crate::config::schedule_config::ScheduleConfig;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

// ==========================================
// 配置错误类型
// ==========================================
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("配置文件读取失败 ({path}): {message}")]
    ReadError { path: String, message: String },

    #[error("配置文件格式错误 ({path}): {message}")]
    ParseError { path: String, message: String },

    #[error("配置值格式错误 (key: {key}, value: {value}): {message}")]
    InvalidValue {
        key: String,
        value: String,
        message: String,
    },

    #[error("配置文件写入失败 ({path}): {message}")]
    WriteError { path: String, message: String },
}

// ==========================================
// 配置键（环境变量）
// ==========================================
pub mod config_keys {
    pub const ENV_CONFIG_PATH: &str = "SCHEDULE_SYNC_CONFIG";
    pub const ENV_ACCESS_TOKEN: &str = "SCHEDULE_SYNC_ACCESS_TOKEN";
    pub const ENV_CALENDAR: &str = "SCHEDULE_SYNC_CALENDAR";
    pub const ENV_DELAY_MS: &str = "SCHEDULE_SYNC_DELAY_MS";
    pub const ENV_TIMEZONE: &str = "SCHEDULE_SYNC_TIMEZONE";
}

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config: ScheduleConfig,
    source: Option<PathBuf>,
}

impl ConfigManager {
    /// 加载配置
    ///
    /// # 参数
    /// - path: 显式配置文件路径（None 时依次尝试环境变量、用户配置目录）
    ///
    /// # 返回
    /// - Ok(ConfigManager): 文件不存在时使用默认配置
    /// - Err: 文件存在但无法读取/解析,或配置值非法
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let candidate = path
            .map(Path::to_path_buf)
            .or_else(|| std::env::var(config_keys::ENV_CONFIG_PATH).ok().map(PathBuf::from))
            .or_else(Self::default_config_path);

        let (mut config, source) = match candidate {
            Some(p) if p.exists() => {
                let config = Self::read_file(&p)?;
                info!(path = %p.display(), "已加载配置文件");
                (config, Some(p))
            }
            Some(p) => {
                debug!(path = %p.display(), "配置文件不存在，使用默认配置");
                (ScheduleConfig::default(), None)
            }
            None => (ScheduleConfig::default(), None),
        };

        apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;
        config.validate()?;

        Ok(Self { config, source })
    }

    /// 直接使用给定配置（测试/嵌入场景）
    pub fn from_config(config: ScheduleConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            source: None,
        })
    }

    /// 默认配置文件路径: <config_dir>/college-schedule-sync/config.json
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("college-schedule-sync").join("config.json"))
    }

    pub fn config(&self) -> &ScheduleConfig {
        &self.config
    }

    pub fn into_config(self) -> ScheduleConfig {
        self.config
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// 将当前配置写出为 JSON（用于生成配置模板）
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let write_err = |message: String| ConfigError::WriteError {
            path: path.display().to_string(),
            message,
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| write_err(e.to_string()))?;
        }
        let content =
            serde_json::to_string_pretty(&self.config).map_err(|e| write_err(e.to_string()))?;
        fs::write(path, content).map_err(|e| write_err(e.to_string()))
    }

    fn read_file(path: &Path) -> Result<ScheduleConfig, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        serde_json::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }
}

/// 环境变量覆写（lookup 可注入,便于测试）
pub fn apply_env_overrides<F>(config: &mut ScheduleConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let non_empty = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

    if let Some(token) = non_empty(config_keys::ENV_ACCESS_TOKEN) {
        config.sync.access_token = Some(token);
    }
    if let Some(calendar) = non_empty(config_keys::ENV_CALENDAR) {
        config.sync.calendar = Some(calendar);
    }
    if let Some(tz) = non_empty(config_keys::ENV_TIMEZONE) {
        config.sync.timezone = tz;
    }
    if let Some(delay) = non_empty(config_keys::ENV_DELAY_MS) {
        config.sync.request_delay_ms =
            delay.parse::<u64>().map_err(|e| ConfigError::InvalidValue {
                key: config_keys::ENV_DELAY_MS.to_string(),
                value: delay.clone(),
                message: e.to_string(),
            })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let dir = tempdir().unwrap();
        let manager = ConfigManager::load(Some(&dir.path().join("missing.json"))).unwrap();
        assert!(manager.source().is_none());
        assert_eq!(manager.config().fallback_color_id, "8");
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let mut config = ScheduleConfig::default();
        config.sync.request_delay_ms = 120;
        config.fallback_color_id = "11".to_string();
        ConfigManager::from_config(config).unwrap().save_to(&path).unwrap();

        let loaded = ConfigManager::load(Some(&path)).unwrap();
        assert_eq!(loaded.source(), Some(path.as_path()));
        assert_eq!(loaded.config().fallback_color_id, "11");
    }

    #[test]
    fn test_load_malformed_file_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();

        assert!(matches!(
            ConfigManager::load(Some(&path)),
            Err(ConfigError::ParseError { .. })
        ));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            (config_keys::ENV_ACCESS_TOKEN, "token-abc"),
            (config_keys::ENV_CALENDAR, "team@group.calendar.google.com"),
            (config_keys::ENV_DELAY_MS, "25"),
        ]
        .into_iter()
        .collect();

        let mut config = ScheduleConfig::default();
        apply_env_overrides(&mut config, |k| env.get(k).map(|v| v.to_string())).unwrap();

        assert_eq!(config.sync.access_token.as_deref(), Some("token-abc"));
        assert_eq!(
            config.sync.calendar.as_deref(),
            Some("team@group.calendar.google.com")
        );
        assert_eq!(config.sync.request_delay_ms, 25);
    }

    #[test]
    fn test_env_override_bad_delay() {
        let mut config = ScheduleConfig::default();
        let result = apply_env_overrides(&mut config, |k| {
            (k == config_keys::ENV_DELAY_MS).then(|| "soon".to_string())
        });
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }
}
