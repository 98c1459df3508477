// ==========================================
// 学院日程同步系统 - 配置层
// ==========================================
// 职责: 启动时加载不可变配置,注入导入/同步组件
// 存储: JSON 文件 + 环境变量覆写
// ==========================================

pub mod config_manager;
pub mod schedule_config;

// 重导出核心配置类型
pub use config_manager::{apply_env_overrides, config_keys, ConfigError, ConfigManager};
pub use schedule_config::{FieldAliases, ScheduleConfig, SyncSettings, UnitColor};
