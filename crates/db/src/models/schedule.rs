//! PM schedule entity model and DTOs.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use upkeep_core::error::CoreError;
use upkeep_core::status::ScheduleStatus;
use upkeep_core::types::{DbId, Timestamp};

/// A row from the `pm_schedules` table.
///
/// At most one row may exist per `(equipment_id, template_id,
/// scheduled_date)` — enforced by `uq_pm_schedules_occurrence`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PmSchedule {
    pub id: DbId,
    pub template_id: DbId,
    pub equipment_id: DbId,
    pub scheduled_date: NaiveDate,
    pub technician_id: Option<DbId>,
    /// Raw status; parse via [`PmSchedule::status`].
    pub status: String,
    pub priority: String,
    pub sent_3days: bool,
    pub sent_1day: bool,
    pub sent_today: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl PmSchedule {
    /// Typed view of the raw status column.
    pub fn status(&self) -> Result<ScheduleStatus, CoreError> {
        ScheduleStatus::parse(&self.status)
    }
}

/// DTO for inserting a schedule (used by the generator).
#[derive(Debug, Clone)]
pub struct CreatePmSchedule {
    pub template_id: DbId,
    pub equipment_id: DbId,
    pub scheduled_date: NaiveDate,
    pub technician_id: Option<DbId>,
    pub priority: String,
}

/// Conjunctive filters for listing schedules. All fields optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScheduleFilter {
    pub equipment_id: Option<DbId>,
    pub equipment_type_id: Option<DbId>,
    pub technician_id: Option<DbId>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    /// Maximum number of results. Defaults to 100, capped at 500.
    pub limit: Option<i64>,
    /// Number of results to skip. Defaults to 0.
    pub offset: Option<i64>,
}

/// Default page size for schedule listing.
pub const DEFAULT_LIMIT: i64 = 100;

/// Maximum page size for schedule listing.
pub const MAX_LIMIT: i64 = 500;

impl ScheduleFilter {
    /// Effective limit after defaulting and capping.
    pub fn effective_limit(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
    }

    /// Effective offset after defaulting.
    pub fn effective_offset(&self) -> i64 {
        self.offset.unwrap_or(0).max(0)
    }
}
