// ==========================================
// 降水收益决策支持系统 - 预报与收益数据载荷
// ==========================================
// 职责: 各阶段之间的 JSON 交接格式
// 红线: 时间戳固定为 "%Y-%m-%d %H:%M:%S"（无时区），双向一致
// ==========================================

use crate::domain::types::BoundingBox;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// 交接载荷中的时间戳格式
pub const LOCAL_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// 按固定格式格式化时间戳
pub fn format_local_time(timestamp: &NaiveDateTime) -> String {
    timestamp.format(LOCAL_TIME_FORMAT).to_string()
}

/// 按固定格式解析时间戳
pub fn parse_local_time(value: &str) -> Result<NaiveDateTime, chrono::ParseError> {
    NaiveDateTime::parse_from_str(value, LOCAL_TIME_FORMAT)
}

// ==========================================
// serde 辅助: 单个时间戳
// ==========================================
pub mod local_time_format {
    use super::{format_local_time, parse_local_time};
    use chrono::NaiveDateTime;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(timestamp: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format_local_time(timestamp))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse_local_time(&raw)
            .map_err(|e| de::Error::custom(format!("时间戳格式错误 '{}': {}", raw, e)))
    }

    // ===== 时间戳列表 =====
    pub mod vec {
        use super::super::{format_local_time, parse_local_time};
        use chrono::NaiveDateTime;
        use serde::ser::SerializeSeq;
        use serde::{de, Deserialize, Deserializer, Serializer};

        pub fn serialize<S>(timestamps: &[NaiveDateTime], serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            let mut seq = serializer.serialize_seq(Some(timestamps.len()))?;
            for timestamp in timestamps {
                seq.serialize_element(&format_local_time(timestamp))?;
            }
            seq.end()
        }

        pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<NaiveDateTime>, D::Error>
        where
            D: Deserializer<'de>,
        {
            let raw = Vec::<String>::deserialize(deserializer)?;
            raw.iter()
                .enumerate()
                .map(|(index, value)| {
                    parse_local_time(value).map_err(|e| {
                        de::Error::custom(format!(
                            "时间戳格式错误 (索引 {}): '{}': {}",
                            index, value, e
                        ))
                    })
                })
                .collect()
        }
    }
}

// ==========================================
// ForecastSample - 单个预报时刻
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForecastSample {
    pub local_time: NaiveDateTime,
    /// 降水概率（%，0~100）
    pub probability: f64,
}

impl ForecastSample {
    pub fn new(local_time: NaiveDateTime, probability: f64) -> Self {
        Self {
            local_time,
            probability,
        }
    }
}

// ==========================================
// ForecastPayload - 抓取阶段输出 / 收益阶段输入
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPayload {
    #[serde(with = "local_time_format::vec")]
    pub local_time: Vec<NaiveDateTime>,
    pub pixel_value: Vec<f64>,
    /// 相邻预报之间的小时数
    pub interval: i64,
    pub layer: String,
    pub bbox: BoundingBox,
    #[serde(with = "local_time_format")]
    pub start_time: NaiveDateTime,
    #[serde(with = "local_time_format")]
    pub end_time: NaiveDateTime,
}

// ==========================================
// ProfitPayload - 收益阶段输出 / 制表与编目阶段输入
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfitPayload {
    #[serde(with = "local_time_format::vec")]
    pub local_time: Vec<NaiveDateTime>,
    pub pixel_value: Vec<f64>,
    pub cumulative_profit: Vec<f64>,
    #[serde(with = "local_time_format::vec")]
    pub open_hours: Vec<NaiveDateTime>,
    pub layer: String,
    pub bbox: BoundingBox,
    #[serde(with = "local_time_format")]
    pub start_time: NaiveDateTime,
    #[serde(with = "local_time_format")]
    pub end_time: NaiveDateTime,
}
