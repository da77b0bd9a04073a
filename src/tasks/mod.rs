//! Background scheduled tasks for the application.
//!
//! This module centralizes the recurring background jobs (daily mission
//! generation and referral validation). Call `spawn_all` once during startup
//! to launch them.

use crate::services::{MissionService, NotificationService, ReferralService};
use chrono::{Duration, NaiveDateTime};

/// 推荐结算的每日运行时刻（UTC 整点）
const REFERRAL_VALIDATION_HOUR_UTC: u32 = 3;

/// 距下一次 UTC `hour:00:00` 的秒数。
/// 当前时刻已过今天的运行点则排到明天，保证每个自然日恰好触发一次。
fn secs_until_daily_run(now: NaiveDateTime, hour: u32) -> u64 {
    let today_run = now.date().and_hms_opt(hour, 0, 0).unwrap_or(now);
    let next = if now < today_run {
        today_run
    } else {
        today_run + Duration::days(1)
    };
    (next - now).num_seconds().max(1) as u64
}

/// Spawn all background tasks.
///
/// Notes
/// - Each task is idempotent as implemented in its service and runs on its own schedule.
/// - This function detaches tasks via `tokio::spawn`; it does not block.
pub fn spawn_all(
    mission_service: MissionService,
    referral_service: ReferralService,
    notification_service: NotificationService,
) {
    // 每日任务生成（每小时检查一次；generate_daily 幂等，日界后首次检查即生成）
    {
        let svc = mission_service.clone();
        tokio::spawn(async move {
            use chrono::Utc;
            loop {
                let today = Utc::now().date_naive();
                match svc.generate_daily(today).await {
                    Ok(missions) => {
                        log::debug!("Daily missions ready for {today}: {}", missions.len())
                    }
                    Err(e) => log::error!("Failed to generate daily missions: {e:?}"),
                }
                tokio::time::sleep(std::time::Duration::from_secs(3600)).await;
            }
        });
    }

    // 推荐结算（每天 UTC 03:00 按时钟对齐触发，不随进程启动时刻漂移）
    {
        let svc = referral_service.clone();
        let notifier = notification_service.clone();
        tokio::spawn(async move {
            use chrono::Utc;
            loop {
                let wait =
                    secs_until_daily_run(Utc::now().naive_utc(), REFERRAL_VALIDATION_HOUR_UTC);
                log::debug!("Next referral validation in {wait}s");
                tokio::time::sleep(std::time::Duration::from_secs(wait)).await;
                match svc.run_validation().await {
                    Ok((summary, notifications)) => {
                        if summary.completed > 0 || summary.cancelled > 0 {
                            log::info!(
                                "Referral batch: {} completed, {} cancelled",
                                summary.completed,
                                summary.cancelled
                            );
                        }
                        notifier.dispatch_all(notifications).await;
                    }
                    Err(e) => log::error!("Failed to validate referrals: {e:?}"),
                }
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 8, 25)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    #[test]
    fn test_secs_until_daily_run_same_day() {
        // 01:00 → 03:00 还差两小时
        assert_eq!(secs_until_daily_run(at(1, 0, 0), 3), 2 * 3600);
    }

    #[test]
    fn test_secs_until_daily_run_rolls_to_next_day() {
        // 当天运行点已过：排到明天
        assert_eq!(secs_until_daily_run(at(3, 0, 0), 3), 24 * 3600);
        assert_eq!(secs_until_daily_run(at(15, 30, 0), 3), 11 * 3600 + 30 * 60);
    }

    #[test]
    fn test_secs_until_daily_run_never_zero() {
        assert!(secs_until_daily_run(at(2, 59, 59), 3) >= 1);
    }
}
