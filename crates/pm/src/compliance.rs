//! Compliance calculator: read-only aggregates for reporting.

use chrono::{Days, NaiveDate};
use serde::Serialize;
use upkeep_core::compliance::{month_window, months_back};
use upkeep_core::error::CoreError;
use upkeep_db::Store;

use crate::{PmError, PmResult};

/// Maximum number of periods one compliance request may cover.
pub const MAX_PERIODS: i32 = 24;

/// Compliance figures for one calendar month.
#[derive(Debug, Serialize)]
pub struct PeriodCompliance {
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub scheduled_count: i64,
    pub completed_count: i64,
    pub overdue_count: i64,
    pub cancelled_count: i64,
    /// `round(100 * completed / (completed + overdue))`, 100 when nothing
    /// was evaluated.
    pub compliance_rate: i64,
}

/// Headline counters for the dashboard.
#[derive(Debug, Serialize)]
pub struct DashboardStats {
    /// Open work across all time: scheduled + in_progress.
    pub total_scheduled: i64,
    /// Scheduled or in_progress occurrences dated within the next 7 days.
    pub upcoming_week: i64,
    /// Overdue occurrences across all time.
    pub overdue_count: i64,
    /// Occurrences completed in the current month.
    pub completed_this_month: i64,
    /// Current month's compliance rate.
    pub compliance_rate_this_month: i64,
}

/// Compute the dashboard counters as of `today`.
pub async fn dashboard_stats(store: &Store, today: NaiveDate) -> PmResult<DashboardStats> {
    let all_time = store.schedules.status_counts(None, None).await?;

    let week_end = today.checked_add_days(Days::new(6)).unwrap_or(today);
    let upcoming = store
        .schedules
        .status_counts(Some(today), Some(week_end))
        .await?;

    let (month_start, month_end) = month_window(today);
    let this_month = store
        .schedules
        .status_counts(Some(month_start), Some(month_end))
        .await?;

    Ok(DashboardStats {
        total_scheduled: all_time.scheduled + all_time.in_progress,
        upcoming_week: upcoming.scheduled + upcoming.in_progress,
        overdue_count: all_time.overdue,
        completed_this_month: this_month.completed,
        compliance_rate_this_month: this_month.compliance_rate(),
    })
}

/// Compliance per calendar month for the current month and the
/// `period_count - 1` preceding ones, newest first.
pub async fn compliance_stats(
    store: &Store,
    period_count: i32,
    today: NaiveDate,
) -> PmResult<Vec<PeriodCompliance>> {
    if period_count < 1 || period_count > MAX_PERIODS {
        return Err(PmError::Core(CoreError::Validation(format!(
            "period_count must be between 1 and {MAX_PERIODS}, got {period_count}"
        ))));
    }

    let mut periods = Vec::with_capacity(period_count as usize);
    for back in 0..period_count as u32 {
        let anchor = months_back(today, back);
        let (start, end) = month_window(anchor);
        let counts = store
            .schedules
            .status_counts(Some(start), Some(end))
            .await?;
        periods.push(PeriodCompliance {
            period_start: start,
            period_end: end,
            scheduled_count: counts.total(),
            completed_count: counts.completed,
            overdue_count: counts.overdue,
            cancelled_count: counts.cancelled,
            compliance_rate: counts.compliance_rate(),
        });
    }
    Ok(periods)
}
