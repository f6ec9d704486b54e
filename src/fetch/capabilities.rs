// ==========================================
// 降水收益决策支持系统 - GetCapabilities 解析
// ==========================================
// 职责: 从能力文档中取出指定图层的 time 维度，并解析为
//       (起始时刻, 结束时刻, 间隔小时数)
// 格式: "2024-05-13T12:00:00Z/2024-05-16T12:00:00Z/PT3H"
// ==========================================

use crate::fetch::error::{FetchError, FetchResult};
use chrono::NaiveDateTime;
use regex::Regex;

/// time 维度中的时间戳格式（UTC）
pub const ISO_UTC_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// 图层的预报时间维度
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeDimension {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub interval_hours: u32,
}

/// 从 GetCapabilities XML 中取出图层的 time 维度原始值
///
/// 只在图层自身的 `<Name>` 与下一个 `<Layer>`/`</Layer>` 之间查找，
/// 避免取到相邻图层的维度。多个取值以逗号分隔时取第一个。
///
/// 这是文本扫描而非 XML 解析: 不处理 CDATA、注释和命名空间前缀，
/// 同名的 `<Style><Name>` 出现在图层名之前时会错误定位。
/// `<Dimension>` 的属性顺序不影响匹配。
pub fn extract_layer_time_dimension(capabilities_xml: &str, layer: &str) -> FetchResult<String> {
    let name_re = Regex::new(&format!(r"<Name>\s*{}\s*</Name>", regex::escape(layer)))?;
    let name_match = name_re
        .find(capabilities_xml)
        .ok_or_else(|| FetchError::LayerNotFound(layer.to_string()))?;

    let rest = &capabilities_xml[name_match.end()..];
    let scope_end = [rest.find("<Layer"), rest.find("</Layer>")]
        .into_iter()
        .flatten()
        .min()
        .unwrap_or(rest.len());
    let scope = &rest[..scope_end];

    let dimension_re = Regex::new(r#"(?s)<Dimension[^>]*name\s*=\s*"time"[^>]*>(.*?)</Dimension>"#)?;
    let raw = dimension_re
        .captures(scope)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| FetchError::TimeDimensionMissing(layer.to_string()))?;

    Ok(raw.split(',').next().unwrap_or(raw).trim().to_string())
}

/// 解析 "start/end/period" 形式的 time 维度
///
/// 间隔取 period 中的全部数字（"PT3H" -> 3）
pub fn parse_time_dimension(value: &str) -> FetchResult<TimeDimension> {
    let format_error = |message: String| FetchError::TimeDimensionFormat {
        value: value.to_string(),
        message,
    };

    let parts: Vec<&str> = value.trim().split('/').collect();
    let [start, end, period] = parts.as_slice() else {
        return Err(format_error(format!(
            "期望 3 段 (start/end/period)，实际 {} 段",
            parts.len()
        )));
    };

    let start = NaiveDateTime::parse_from_str(start, ISO_UTC_FORMAT)
        .map_err(|e| format_error(format!("起始时刻解析失败: {}", e)))?;
    let end = NaiveDateTime::parse_from_str(end, ISO_UTC_FORMAT)
        .map_err(|e| format_error(format!("结束时刻解析失败: {}", e)))?;

    let digits: String = period.chars().filter(|c| c.is_ascii_digit()).collect();
    let interval_hours: u32 = digits
        .parse()
        .map_err(|_| format_error(format!("间隔中没有有效数字: {}", period)))?;
    if interval_hours == 0 {
        return Err(format_error("间隔不能为 0".to_string()));
    }

    Ok(TimeDimension {
        start,
        end,
        interval_hours,
    })
}
