//! Advance-notification thresholds for upcoming schedules.
//!
//! Each threshold maps to one monotonic sent-flag on the schedule record.
//! The flag flips false -> true exactly once; it is never reset, which is
//! what guarantees at-most-once emission per threshold across repeated
//! sweeps.

use chrono::{Days, NaiveDate};

/// A day-offset reminder threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationThreshold {
    /// Three days before the scheduled date.
    ThreeDay,
    /// One day before the scheduled date.
    OneDay,
    /// On the scheduled date itself.
    SameDay,
}

/// All thresholds, in scan order.
pub const ALL_THRESHOLDS: [NotificationThreshold; 3] = [
    NotificationThreshold::ThreeDay,
    NotificationThreshold::OneDay,
    NotificationThreshold::SameDay,
];

impl NotificationThreshold {
    /// Days between "today" and the scheduled date for this threshold.
    pub fn offset_days(&self) -> u64 {
        match self {
            Self::ThreeDay => 3,
            Self::OneDay => 1,
            Self::SameDay => 0,
        }
    }

    /// The scheduled date that matches this threshold on `today`.
    pub fn target_date(&self, today: NaiveDate) -> NaiveDate {
        // Offsets are tiny; the add cannot overflow for any realistic date.
        today
            .checked_add_days(Days::new(self.offset_days()))
            .unwrap_or(today)
    }

    /// Event type emitted on the bus when this threshold fires.
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::ThreeDay => "pm.reminder.three_day",
            Self::OneDay => "pm.reminder.one_day",
            Self::SameDay => "pm.reminder.same_day",
        }
    }
}
