// ==========================================
// 降水收益决策支持系统 - 配置层
// ==========================================
// 职责: 模型常量、WMS 参数、输出目录、作业环境变量
// ==========================================

pub mod config_manager;
pub mod error;
pub mod job_env;

// 重导出核心配置管理器
pub use config_manager::{config_keys, ConfigManager, OutputDirs, Settings, ENV_PREFIX};
pub use error::{ConfigError, ConfigResult};
pub use job_env::{stac_settings_from_env, stac_settings_from_lookup};
