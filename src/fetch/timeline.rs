// ==========================================
// 降水收益决策支持系统 - 预报时间序列
// ==========================================
// 规则: 从 start 开始按 interval 递增，直到末项 >= end
//       （末项可能越过 end，与服务端维度步长一致）
// 本地时刻 = UTC 时刻 + 时区偏移（小时）
// ==========================================

use crate::fetch::capabilities::TimeDimension;
use crate::fetch::error::{FetchError, FetchResult};
use chrono::{Duration, NaiveDateTime};

/// 预报时刻序列（UTC 与本地时刻一一对应）
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ForecastTimeline {
    pub utc: Vec<NaiveDateTime>,
    pub local: Vec<NaiveDateTime>,
}

impl ForecastTimeline {
    pub fn len(&self) -> usize {
        self.utc.len()
    }

    pub fn is_empty(&self) -> bool {
        self.utc.is_empty()
    }
}

/// 生成预报时刻序列
pub fn build_timeline(
    dimension: &TimeDimension,
    time_zone_offset_hours: i64,
) -> FetchResult<ForecastTimeline> {
    if dimension.interval_hours == 0 {
        return Err(FetchError::InvalidTimeline("间隔不能为 0".to_string()));
    }
    if dimension.end < dimension.start {
        return Err(FetchError::InvalidTimeline(format!(
            "结束时刻 {} 早于起始时刻 {}",
            dimension.end, dimension.start
        )));
    }

    let step = Duration::hours(i64::from(dimension.interval_hours));
    let offset = Duration::hours(time_zone_offset_hours);

    let mut utc = vec![dimension.start];
    let mut current = dimension.start;
    while current < dimension.end {
        current += step;
        utc.push(current);
    }

    let local = utc.iter().map(|t| *t + offset).collect();
    Ok(ForecastTimeline { utc, local })
}
