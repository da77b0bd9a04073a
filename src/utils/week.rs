use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Utc};

/// ISO 年 * 100 + ISO 周，作为周维度的统计键。
/// 直接用 `date.year()` 会在跨年周（如 12-29 落在次年第 1 周）产生错误分组。
pub fn iso_year_week(date: NaiveDate) -> i32 {
    let iso = date.iso_week();
    iso.year() * 100 + iso.week() as i32
}

/// 当天 UTC 结束时刻（次日 00:00），用作每日任务的过期时间
pub fn end_of_day_utc(date: NaiveDate) -> DateTime<Utc> {
    let next = date.succ_opt().unwrap_or(date);
    Utc.from_utc_datetime(&next.and_hms_opt(0, 0, 0).expect("valid midnight"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_iso_year_week_plain_week() {
        let d = NaiveDate::from_ymd_opt(2026, 8, 25).unwrap();
        assert_eq!(iso_year_week(d), 202635);
    }

    #[test]
    fn test_iso_year_week_year_boundary() {
        // 2025-12-29 (周一) 属于 2026 年第 1 周
        let d = NaiveDate::from_ymd_opt(2025, 12, 29).unwrap();
        assert_eq!(iso_year_week(d), 202601);
        // 同一 ISO 周的两端归入同一个键
        let d2 = NaiveDate::from_ymd_opt(2026, 1, 4).unwrap();
        assert_eq!(iso_year_week(d), iso_year_week(d2));
    }

    #[test]
    fn test_end_of_day_utc() {
        let d = NaiveDate::from_ymd_opt(2026, 8, 25).unwrap();
        let end = end_of_day_utc(d);
        assert_eq!(end.date_naive(), NaiveDate::from_ymd_opt(2026, 8, 26).unwrap());
    }
}
