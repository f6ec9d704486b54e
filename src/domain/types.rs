// ==========================================
// 降水收益决策支持系统 - 领域类型定义
// ==========================================
// 职责: 营业时段窗口、空间范围等基础值类型
// 红线: 时刻比较只用 NaiveTime（与日期无关），不使用浮点时间
// ==========================================

use chrono::{Duration, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 营业时段 (Open-Hours Window)
// ==========================================
// 每日循环的开区间 (opening, closing)，两端均不包含
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenHoursWindow {
    pub opening: NaiveTime,
    pub closing: NaiveTime,
}

impl OpenHoursWindow {
    pub fn new(opening: NaiveTime, closing: NaiveTime) -> Self {
        Self { opening, closing }
    }

    /// 时刻是否严格落在营业时段内（只看时分秒，忽略日期）
    pub fn contains_time(&self, time: NaiveTime) -> bool {
        time > self.opening && time < self.closing
    }

    /// 时间戳是否落在营业时段内
    pub fn contains(&self, timestamp: &NaiveDateTime) -> bool {
        self.contains_time(timestamp.time())
    }

    /// 开门时刻 + 间隔小时数
    ///
    /// 超过 24:00 时按时刻回绕（例如 09:00 + 18h = 03:00），日期部分被丢弃
    pub fn opening_plus_hours(&self, hours: u32) -> NaiveTime {
        let (time, _wrapped_secs) = self
            .opening
            .overflowing_add_signed(Duration::hours(i64::from(hours)));
        time
    }
}

impl Default for OpenHoursWindow {
    /// 09:00 - 21:00
    fn default() -> Self {
        let midnight = NaiveTime::default();
        Self {
            opening: midnight + Duration::hours(9),
            closing: midnight + Duration::hours(21),
        }
    }
}

impl fmt::Display for OpenHoursWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}:{:02}:{:02} - {:02}:{:02}:{:02}",
            self.opening.hour(),
            self.opening.minute(),
            self.opening.second(),
            self.closing.hour(),
            self.closing.minute(),
            self.closing.second()
        )
    }
}

// ==========================================
// 空间范围 (Bounding Box)
// ==========================================
// 序列化格式: [min_x, min_y, max_x, max_y]（EPSG:4326，x 为经度）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BoundingBox(pub [f64; 4]);

impl BoundingBox {
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self([min_x, min_y, max_x, max_y])
    }

    /// 以点 (x, y) 为中心、半边长为 half 的正方形范围
    pub fn around(x: f64, y: f64, half: f64) -> Self {
        Self::new(x - half, y - half, x + half, y + half)
    }

    pub fn min_x(&self) -> f64 {
        self.0[0]
    }

    pub fn min_y(&self) -> f64 {
        self.0[1]
    }

    pub fn max_x(&self) -> f64 {
        self.0[2]
    }

    pub fn max_y(&self) -> f64 {
        self.0[3]
    }

    /// 几何中心 [x, y]
    pub fn centroid(&self) -> [f64; 2] {
        [
            (self.min_x() + self.max_x()) / 2.0,
            (self.min_y() + self.max_y()) / 2.0,
        ]
    }

    pub fn as_array(&self) -> [f64; 4] {
        self.0
    }
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}, {}, {}, {}",
            self.min_x(),
            self.min_y(),
            self.max_x(),
            self.max_y()
        )
    }
}
