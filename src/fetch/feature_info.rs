// ==========================================
// 降水收益决策支持系统 - GetFeatureInfo 响应解析
// ==========================================
// 响应格式 (INFO_FORMAT=text/plain):
//   Results for FeatureType 'REPS.DIAG.3_PRMM.ERGE5':
//   --------------------------------------------
//   value_0 = '42.857143'
// ==========================================

use crate::fetch::error::{FetchError, FetchResult};
use once_cell::sync::Lazy;
use regex::Regex;

static VALUE_0_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"value_0\s*=\s*['"]?\s*(-?\d+(?:\.\d+)?(?:[eE][-+]?\d+)?)"#)
        .expect("value_0 正则表达式非法")
});

/// 提取 value_0 数值
///
/// # 参数
/// - text: 响应正文
/// - time_label: 查询时刻（仅用于错误信息）
pub fn parse_feature_info(text: &str, time_label: &str) -> FetchResult<f64> {
    let captured = VALUE_0_RE
        .captures(text)
        .and_then(|c| c.get(1))
        .ok_or_else(|| FetchError::FeatureValueMissing {
            time: time_label.to_string(),
            excerpt: text.chars().take(120).collect(),
        })?;

    captured
        .as_str()
        .parse::<f64>()
        .map_err(|e| FetchError::FeatureValueMissing {
            time: time_label.to_string(),
            excerpt: format!("{} ({})", captured.as_str(), e),
        })
}
