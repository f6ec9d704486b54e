// ==========================================
// 降水收益决策支持系统 - 收益表导出
// ==========================================
// 职责: 只保留营业时段内的行，导出 CSV
// 格式: 分号分隔、UTF-8 BOM、无索引列
// ==========================================

use crate::domain::forecast::{format_local_time, local_time_format, ProfitPayload};
use crate::report::error::{ReportError, ReportResult};
use chrono::NaiveDateTime;
use csv::WriterBuilder;
use serde::Serialize;
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

/// 导出文件名
pub const PROFIT_CSV_FILE: &str = "profit.csv";

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// 收益表中的一行
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfitRow {
    #[serde(rename = "Local date and time", with = "local_time_format")]
    pub local_time: NaiveDateTime,
    #[serde(rename = "Probability (%)")]
    pub probability: f64,
    #[serde(rename = "Anticipated cumulative profits ($)")]
    pub cumulative_profit: f64,
}

/// 按营业时段筛选收益表行（保持预报顺序）
pub fn build_profit_table(payload: &ProfitPayload) -> ReportResult<Vec<ProfitRow>> {
    let expected = payload.local_time.len();
    if payload.pixel_value.len() != expected {
        return Err(ReportError::LengthMismatch {
            field: "pixel_value",
            expected,
            actual: payload.pixel_value.len(),
        });
    }
    if payload.cumulative_profit.len() != expected {
        return Err(ReportError::LengthMismatch {
            field: "cumulative_profit",
            expected,
            actual: payload.cumulative_profit.len(),
        });
    }

    let known: HashSet<&NaiveDateTime> = payload.local_time.iter().collect();
    for (index, open_hour) in payload.open_hours.iter().enumerate() {
        if !known.contains(open_hour) {
            return Err(ReportError::UnknownOpenHour {
                index,
                timestamp: format_local_time(open_hour),
            });
        }
    }

    let open: HashSet<&NaiveDateTime> = payload.open_hours.iter().collect();
    let rows = payload
        .local_time
        .iter()
        .enumerate()
        .filter(|(_, t)| open.contains(t))
        .map(|(index, t)| ProfitRow {
            local_time: *t,
            probability: payload.pixel_value[index],
            cumulative_profit: payload.cumulative_profit[index],
        })
        .collect();

    Ok(rows)
}

/// 写出 CSV（带 BOM）
pub fn write_profit_csv<W: Write>(rows: &[ProfitRow], mut writer: W) -> ReportResult<()> {
    writer.write_all(UTF8_BOM)?;

    let mut csv_writer = WriterBuilder::new().delimiter(b';').from_writer(writer);
    if rows.is_empty() {
        // 空表仍保留表头
        csv_writer.write_record([
            "Local date and time",
            "Probability (%)",
            "Anticipated cumulative profits ($)",
        ])?;
    }
    for row in rows {
        csv_writer.serialize(row)?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// 导出收益表到 `<dir>/profit.csv`
pub fn export_profit_csv(payload: &ProfitPayload, dir: &Path) -> ReportResult<PathBuf> {
    let rows = build_profit_table(payload)?;

    std::fs::create_dir_all(dir)?;
    let path = dir.join(PROFIT_CSV_FILE);
    let file = File::create(&path)?;
    write_profit_csv(&rows, BufWriter::new(file))?;

    info!(path = %path.display(), rows = rows.len(), "收益表已导出");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::BoundingBox;
    use chrono::NaiveDate;

    fn at(h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 13)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    fn payload() -> ProfitPayload {
        ProfitPayload {
            local_time: vec![at(9), at(12), at(15), at(21)],
            pixel_value: vec![20.0, 40.0, 80.0, 10.0],
            cumulative_profit: vec![0.0, 390.0, 1110.0, 1110.0],
            open_hours: vec![at(12), at(15)],
            layer: "REPS.DIAG.3_PRMM.ERGE5".to_string(),
            bbox: BoundingBox::around(-123.116, 49.288, 0.25),
            start_time: at(16),
            end_time: at(16),
        }
    }

    #[test]
    fn test_table_keeps_only_open_hours() {
        let rows = build_profit_table(&payload()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].local_time, at(12));
        assert_eq!(rows[0].probability, 40.0);
        assert_eq!(rows[1].cumulative_profit, 1110.0);
    }

    #[test]
    fn test_csv_format() {
        let rows = build_profit_table(&payload()).unwrap();
        let mut buffer = Vec::new();
        write_profit_csv(&rows, &mut buffer).unwrap();

        assert!(buffer.starts_with(UTF8_BOM));
        let text = String::from_utf8(buffer[UTF8_BOM.len()..].to_vec()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines[0],
            "Local date and time;Probability (%);Anticipated cumulative profits ($)"
        );
        assert_eq!(lines[1], "2024-05-13 12:00:00;40.0;390.0");
        assert_eq!(lines[2], "2024-05-13 15:00:00;80.0;1110.0");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_empty_table_keeps_header() {
        let mut buffer = Vec::new();
        write_profit_csv(&[], &mut buffer).unwrap();
        let text = String::from_utf8(buffer[UTF8_BOM.len()..].to_vec()).unwrap();
        assert_eq!(text.lines().count(), 1);
    }

    #[test]
    fn test_unknown_open_hour_rejected() {
        let mut p = payload();
        p.open_hours.push(at(18));
        let err = build_profit_table(&p).unwrap_err();
        assert!(matches!(err, ReportError::UnknownOpenHour { index: 2, .. }));
    }

    #[test]
    fn test_profit_length_mismatch_rejected() {
        let mut p = payload();
        p.cumulative_profit.pop();
        let err = build_profit_table(&p).unwrap_err();
        assert!(matches!(
            err,
            ReportError::LengthMismatch {
                field: "cumulative_profit",
                ..
            }
        ));
    }
}
