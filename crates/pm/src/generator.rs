//! Schedule generator: expands a template's recurrence rule into concrete
//! dated schedule instances for a set of equipment.
//!
//! Generation is idempotent: candidates whose occurrence key already exists
//! are skipped, so re-running with the same arguments never duplicates.
//! Unknown equipment ids are skipped and reported instead of aborting the
//! batch.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use upkeep_core::error::CoreError;
use upkeep_core::recurrence::{advance, horizon_end};
use upkeep_core::status::{IntervalType, Priority};
use upkeep_core::types::DbId;
use upkeep_db::models::schedule::{CreatePmSchedule, PmSchedule};
use upkeep_db::{Store, StoreError};

use crate::{PmError, PmResult};

/// Upper bound on the generation window.
pub const MAX_MONTHS_AHEAD: i32 = 36;

/// Parameters for one generation run.
#[derive(Debug, Clone, Deserialize)]
pub struct GenerateRequest {
    pub template_id: DbId,
    pub equipment_ids: Vec<DbId>,
    pub start_date: NaiveDate,
    pub months_ahead: i32,
    /// Priority for the new schedules; defaults to medium.
    pub priority: Option<String>,
    /// Optional technician pre-assigned to every generated schedule.
    pub technician_id: Option<DbId>,
}

/// Outcome of a generation run.
#[derive(Debug, Serialize)]
pub struct GenerationReport {
    /// Schedules created by this run, in (equipment, date) order.
    pub created: Vec<PmSchedule>,
    /// Candidates skipped because the occurrence key already existed.
    pub skipped_existing: usize,
    /// Equipment ids that could not be resolved and were skipped.
    pub invalid_equipment: Vec<DbId>,
}

/// Materialize schedules for `request.equipment_ids` from `start_date`
/// until `start_date + months_ahead` months (exclusive).
pub async fn generate(store: &Store, request: &GenerateRequest) -> PmResult<GenerationReport> {
    if request.months_ahead < 1 || request.months_ahead > MAX_MONTHS_AHEAD {
        return Err(PmError::Core(CoreError::Validation(format!(
            "months_ahead must be between 1 and {MAX_MONTHS_AHEAD}, got {}",
            request.months_ahead
        ))));
    }

    let template = store
        .templates
        .find_by_id(request.template_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "template",
            id: request.template_id,
        })?;
    if !template.is_active {
        return Err(PmError::Core(CoreError::Validation(format!(
            "Template {} is inactive",
            template.id
        ))));
    }

    let interval_type = IntervalType::parse(&template.interval_type)?;
    let priority = match &request.priority {
        Some(raw) => Priority::parse(raw)?,
        None => Priority::default(),
    };

    if let Some(technician_id) = request.technician_id {
        store
            .technicians
            .find_by_id(technician_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "technician",
                id: technician_id,
            })?;
    }

    let end = horizon_end(request.start_date, request.months_ahead)?;

    let mut report = GenerationReport {
        created: Vec::new(),
        skipped_existing: 0,
        invalid_equipment: Vec::new(),
    };

    for &equipment_id in &request.equipment_ids {
        if store.equipment.find_by_id(equipment_id).await?.is_none() {
            report.invalid_equipment.push(equipment_id);
            continue;
        }

        let mut date = request.start_date;
        while date < end {
            let exists = store
                .schedules
                .occurrence_exists(equipment_id, template.id, date)
                .await?;
            if exists {
                report.skipped_existing += 1;
            } else {
                let create = CreatePmSchedule {
                    template_id: template.id,
                    equipment_id,
                    scheduled_date: date,
                    technician_id: request.technician_id,
                    priority: priority.as_str().to_string(),
                };
                match store.schedules.create(&create).await {
                    Ok(schedule) => report.created.push(schedule),
                    // Lost an insert race on the occurrence key; same outcome
                    // as the exists-check catching it.
                    Err(StoreError::Conflict(_)) => report.skipped_existing += 1,
                    Err(err) => return Err(err.into()),
                }
            }
            date = advance(date, interval_type, template.interval_value)?;
        }
    }

    tracing::info!(
        template_id = template.id,
        created = report.created.len(),
        skipped = report.skipped_existing,
        invalid = report.invalid_equipment.len(),
        "PM schedule generation finished"
    );
    Ok(report)
}
