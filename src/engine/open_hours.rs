// ==========================================
// 降水收益决策支持系统 - 营业时段过滤 & 换日判定
// ==========================================
// 规则: 营业时段为开区间，边界时刻 (== opening / == closing) 不计入
// 规则: 换日判定只比较时刻，不比较日期
// ==========================================

use crate::domain::forecast::ForecastSample;
use crate::domain::types::OpenHoursWindow;
use chrono::{NaiveDateTime, NaiveTime};

// ==========================================
// OpenHoursFilter - 营业时段过滤器
// ==========================================
#[derive(Debug, Clone, Copy)]
pub struct OpenHoursFilter {
    window: OpenHoursWindow,
}

impl OpenHoursFilter {
    pub fn new(window: OpenHoursWindow) -> Self {
        Self { window }
    }

    pub fn window(&self) -> &OpenHoursWindow {
        &self.window
    }

    pub fn is_open(&self, timestamp: &NaiveDateTime) -> bool {
        self.window.contains(timestamp)
    }

    /// 保留营业时段内的样本（保持原顺序）
    pub fn filter(&self, samples: &[ForecastSample]) -> Vec<ForecastSample> {
        samples
            .iter()
            .filter(|s| self.is_open(&s.local_time))
            .copied()
            .collect()
    }

    /// 保留营业时段内的时间戳（保持原顺序）
    pub fn filter_timestamps(&self, timestamps: &[NaiveDateTime]) -> Vec<NaiveDateTime> {
        timestamps
            .iter()
            .filter(|t| self.is_open(t))
            .copied()
            .collect()
    }
}

// ==========================================
// DayBoundaryDetector - 换日判定
// ==========================================
// opening_interval = 开门时刻 + 间隔；时刻早于它即视为当日首个预报。
// 间隔过大时 opening_interval 回绕过午夜，比较仍只看时刻。
#[derive(Debug, Clone, Copy)]
pub struct DayBoundaryDetector {
    opening_interval: NaiveTime,
}

impl DayBoundaryDetector {
    pub fn new(window: &OpenHoursWindow, interval_hours: u32) -> Self {
        Self {
            opening_interval: window.opening_plus_hours(interval_hours),
        }
    }

    pub fn opening_interval(&self) -> NaiveTime {
        self.opening_interval
    }

    pub fn is_new_day(&self, time_of_day: NaiveTime) -> bool {
        time_of_day < self.opening_interval
    }
}
