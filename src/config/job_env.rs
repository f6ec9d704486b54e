// ==========================================
// 降水收益决策支持系统 - 作业环境变量
// ==========================================
// JOB_INFORMATION : JSON，必须包含 BUCKET
// WORKFLOW_ID     : 可选，默认空
// COLLECTION_ID   : 可选，未设置时编目阶段生成 UUID
// ==========================================

use crate::config::error::{ConfigError, ConfigResult};
use crate::report::stac::StacSettings;

pub const JOB_INFORMATION: &str = "JOB_INFORMATION";
pub const WORKFLOW_ID: &str = "WORKFLOW_ID";
pub const COLLECTION_ID: &str = "COLLECTION_ID";

/// 从进程环境变量读取编目参数
pub fn stac_settings_from_env() -> ConfigResult<StacSettings> {
    stac_settings_from_lookup(|name| std::env::var(name).ok())
}

/// 从任意查找函数读取编目参数（便于测试注入）
pub fn stac_settings_from_lookup<F>(lookup: F) -> ConfigResult<StacSettings>
where
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(JOB_INFORMATION)
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| ConfigError::MissingEnv(JOB_INFORMATION.to_string()))?;

    let job: serde_json::Value =
        serde_json::from_str(&raw).map_err(|e| ConfigError::EnvValueError {
            name: JOB_INFORMATION.to_string(),
            message: e.to_string(),
        })?;

    let bucket = job
        .get("BUCKET")
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|b| !b.is_empty())
        .ok_or_else(|| ConfigError::EnvValueError {
            name: JOB_INFORMATION.to_string(),
            message: "缺少字符串字段 BUCKET".to_string(),
        })?
        .to_string();

    Ok(StacSettings {
        bucket,
        workflow_id: lookup(WORKFLOW_ID).unwrap_or_default(),
        collection_id: lookup(COLLECTION_ID).filter(|v| !v.trim().is_empty()),
    })
}
