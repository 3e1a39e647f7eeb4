//! Compliance arithmetic and period windows.

use chrono::{Datelike, Days, Months, NaiveDate};

use crate::status::ScheduleStatus;

/// Per-status schedule counts for one reporting window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounts {
    pub scheduled: i64,
    pub in_progress: i64,
    pub completed: i64,
    pub overdue: i64,
    pub cancelled: i64,
}

impl StatusCounts {
    /// Tally one schedule.
    pub fn add(&mut self, status: ScheduleStatus) {
        match status {
            ScheduleStatus::Scheduled => self.scheduled += 1,
            ScheduleStatus::InProgress => self.in_progress += 1,
            ScheduleStatus::Completed => self.completed += 1,
            ScheduleStatus::Overdue => self.overdue += 1,
            ScheduleStatus::Cancelled => self.cancelled += 1,
        }
    }

    /// Total number of tallied schedules.
    pub fn total(&self) -> i64 {
        self.scheduled + self.in_progress + self.completed + self.overdue + self.cancelled
    }

    /// Compliance rate over this window's evaluated schedules.
    pub fn compliance_rate(&self) -> i64 {
        compliance_rate(self.completed, self.overdue)
    }
}

/// `round(100 * completed / (completed + overdue))`.
///
/// Only completed and overdue schedules are evaluated; with nothing to
/// judge the rate is optimistically 100.
pub fn compliance_rate(completed: i64, overdue: i64) -> i64 {
    let evaluated = completed + overdue;
    if evaluated == 0 {
        return 100;
    }
    ((completed as f64 / evaluated as f64) * 100.0).round() as i64
}

/// The calendar month containing `anchor`: `[first day, last day]` inclusive.
pub fn month_window(anchor: NaiveDate) -> (NaiveDate, NaiveDate) {
    // with_day(1) cannot fail; day 1 exists in every month.
    let start = anchor.with_day(1).unwrap_or(anchor);
    let end = start
        .checked_add_months(Months::new(1))
        .and_then(|next| next.checked_sub_days(Days::new(1)))
        .unwrap_or(anchor);
    (start, end)
}

/// First day of the month `n` months before `anchor`'s month.
pub fn months_back(anchor: NaiveDate, n: u32) -> NaiveDate {
    let start = anchor.with_day(1).unwrap_or(anchor);
    start.checked_sub_months(Months::new(n)).unwrap_or(start)
}
