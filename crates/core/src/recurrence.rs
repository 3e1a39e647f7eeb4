//! Recurrence date arithmetic.
//!
//! All schedule generation steps through [`advance`], the single place where
//! interval math lives. Month-based intervals use calendar arithmetic with
//! end-of-month clamping (Jan 31 + 1 month = Feb 29/28), never a 30-day
//! approximation.

use chrono::{Days, Months, NaiveDate};

use crate::error::CoreError;
use crate::status::IntervalType;

/// Advance `date` by one recurrence step.
///
/// `interval_value` must be >= 1. Fails on a non-positive value or on
/// calendar overflow (dates beyond chrono's representable range).
pub fn advance(
    date: NaiveDate,
    interval_type: IntervalType,
    interval_value: i32,
) -> Result<NaiveDate, CoreError> {
    if interval_value < 1 {
        return Err(CoreError::Validation(format!(
            "interval_value must be >= 1, got {interval_value}"
        )));
    }
    let v = interval_value as u32;

    let next = match interval_type {
        IntervalType::Daily => date.checked_add_days(Days::new(u64::from(v))),
        IntervalType::Weekly => date.checked_add_days(Days::new(u64::from(v) * 7)),
        IntervalType::Monthly => date.checked_add_months(Months::new(v)),
        IntervalType::Quarterly => date.checked_add_months(Months::new(v * 3)),
        IntervalType::Yearly => date.checked_add_months(Months::new(v * 12)),
    };

    next.ok_or_else(|| {
        CoreError::Validation(format!(
            "Date arithmetic overflow advancing {date} by {interval_value} {interval_type}"
        ))
    })
}

/// End of the generation window: `start + months_ahead` calendar months.
pub fn horizon_end(start: NaiveDate, months_ahead: i32) -> Result<NaiveDate, CoreError> {
    if months_ahead < 1 {
        return Err(CoreError::Validation(format!(
            "months_ahead must be >= 1, got {months_ahead}"
        )));
    }
    start
        .checked_add_months(Months::new(months_ahead as u32))
        .ok_or_else(|| {
            CoreError::Validation(format!(
                "Date arithmetic overflow computing horizon from {start}"
            ))
        })
}
