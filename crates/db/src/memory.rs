//! In-memory backend.
//!
//! One mutex guards all tables, so every operation — including the compound
//! start/complete operations — is a single critical section and therefore
//! linearizable, matching the conditional-update semantics of the Postgres
//! backend. Intended for local development and tests; state is lost on
//! shutdown.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use sqlx::types::Json;
use upkeep_core::checklist::ChecklistResult;
use upkeep_core::compliance::StatusCounts;
use upkeep_core::notifications::NotificationThreshold;
use upkeep_core::status::{state_machine, ExecutionStatus, ScheduleStatus};
use upkeep_core::types::{DbId, Timestamp};

use crate::models::equipment::{CreateEquipment, Equipment};
use crate::models::execution::{ExecutionFinal, PmExecution, UpdatePmExecution};
use crate::models::schedule::{CreatePmSchedule, PmSchedule, ScheduleFilter};
use crate::models::technician::{CreateTechnician, Technician};
use crate::models::template::{CreatePmTemplate, PmTemplate, UpdatePmTemplate};
use crate::store::{
    EquipmentRepository, ExecutionsRepository, SchedulesRepository, StoreError, StoreResult,
    TechniciansRepository, TemplatesRepository,
};

#[derive(Default)]
struct Inner {
    templates: BTreeMap<DbId, PmTemplate>,
    schedules: BTreeMap<DbId, PmSchedule>,
    executions: BTreeMap<DbId, PmExecution>,
    equipment: BTreeMap<DbId, Equipment>,
    technicians: BTreeMap<DbId, Technician>,
    next_id: DbId,
}

impl Inner {
    fn next_id(&mut self) -> DbId {
        self.next_id += 1;
        self.next_id
    }
}

/// The in-memory mock store.
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // A poisoned lock means a panic mid-mutation; nothing sensible to
        // recover here.
        self.inner.lock().expect("memory store mutex poisoned")
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn status_in(raw: &str, allowed: &[ScheduleStatus]) -> bool {
    allowed.iter().any(|s| s.as_str() == raw)
}

// ---------------------------------------------------------------------------
// TemplatesRepository
// ---------------------------------------------------------------------------

#[async_trait]
impl TemplatesRepository for MemoryStore {
    async fn create(&self, input: &CreatePmTemplate) -> StoreResult<PmTemplate> {
        let mut inner = self.lock();
        let now = Utc::now();
        let template = PmTemplate {
            id: inner.next_id(),
            name: input.name.clone(),
            description: input.description.clone(),
            interval_type: input.interval_type.clone(),
            interval_value: input.interval_value,
            checklist_items: Json(input.checklist_items.clone()),
            required_parts: Json(input.required_parts.clone()),
            estimated_duration_minutes: input.estimated_duration_minutes,
            is_active: input.is_active,
            created_at: now,
            updated_at: now,
        };
        inner.templates.insert(template.id, template.clone());
        Ok(template)
    }

    async fn update(
        &self,
        id: DbId,
        input: &UpdatePmTemplate,
    ) -> StoreResult<Option<PmTemplate>> {
        let mut inner = self.lock();
        let Some(template) = inner.templates.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(name) = &input.name {
            template.name = name.clone();
        }
        if let Some(description) = &input.description {
            template.description = Some(description.clone());
        }
        if let Some(interval_type) = &input.interval_type {
            template.interval_type = interval_type.clone();
        }
        if let Some(interval_value) = input.interval_value {
            template.interval_value = interval_value;
        }
        if let Some(items) = &input.checklist_items {
            template.checklist_items = Json(items.clone());
        }
        if let Some(parts) = &input.required_parts {
            template.required_parts = Json(parts.clone());
        }
        if let Some(minutes) = input.estimated_duration_minutes {
            template.estimated_duration_minutes = Some(minutes);
        }
        if let Some(is_active) = input.is_active {
            template.is_active = is_active;
        }
        template.updated_at = Utc::now();
        Ok(Some(template.clone()))
    }

    async fn delete(&self, id: DbId) -> StoreResult<bool> {
        Ok(self.lock().templates.remove(&id).is_some())
    }

    async fn find_by_id(&self, id: DbId) -> StoreResult<Option<PmTemplate>> {
        Ok(self.lock().templates.get(&id).cloned())
    }

    async fn list(&self, active_only: bool) -> StoreResult<Vec<PmTemplate>> {
        Ok(self
            .lock()
            .templates
            .values()
            .filter(|t| !active_only || t.is_active)
            .cloned()
            .collect())
    }
}

// ---------------------------------------------------------------------------
// SchedulesRepository
// ---------------------------------------------------------------------------

#[async_trait]
impl SchedulesRepository for MemoryStore {
    async fn create(&self, input: &CreatePmSchedule) -> StoreResult<PmSchedule> {
        let mut inner = self.lock();
        let duplicate = inner.schedules.values().any(|s| {
            s.equipment_id == input.equipment_id
                && s.template_id == input.template_id
                && s.scheduled_date == input.scheduled_date
        });
        if duplicate {
            return Err(StoreError::Conflict(format!(
                "Duplicate value violates unique constraint: uq_pm_schedules_occurrence \
                 (equipment {}, template {}, date {})",
                input.equipment_id, input.template_id, input.scheduled_date
            )));
        }
        let now = Utc::now();
        let schedule = PmSchedule {
            id: inner.next_id(),
            template_id: input.template_id,
            equipment_id: input.equipment_id,
            scheduled_date: input.scheduled_date,
            technician_id: input.technician_id,
            status: ScheduleStatus::Scheduled.as_str().to_string(),
            priority: input.priority.clone(),
            sent_3days: false,
            sent_1day: false,
            sent_today: false,
            created_at: now,
            updated_at: now,
        };
        inner.schedules.insert(schedule.id, schedule.clone());
        Ok(schedule)
    }

    async fn find_by_id(&self, id: DbId) -> StoreResult<Option<PmSchedule>> {
        Ok(self.lock().schedules.get(&id).cloned())
    }

    async fn list(&self, filter: &ScheduleFilter) -> StoreResult<Vec<PmSchedule>> {
        let inner = self.lock();
        let mut rows: Vec<PmSchedule> = inner
            .schedules
            .values()
            .filter(|s| filter.equipment_id.is_none_or(|id| s.equipment_id == id))
            .filter(|s| {
                filter.equipment_type_id.is_none_or(|type_id| {
                    inner
                        .equipment
                        .get(&s.equipment_id)
                        .is_some_and(|e| e.equipment_type_id == Some(type_id))
                })
            })
            .filter(|s| {
                filter
                    .technician_id
                    .is_none_or(|id| s.technician_id == Some(id))
            })
            .filter(|s| {
                filter
                    .status
                    .as_deref()
                    .is_none_or(|status| s.status == status)
            })
            .filter(|s| {
                filter
                    .priority
                    .as_deref()
                    .is_none_or(|priority| s.priority == priority)
            })
            .filter(|s| filter.date_from.is_none_or(|from| s.scheduled_date >= from))
            .filter(|s| filter.date_to.is_none_or(|to| s.scheduled_date <= to))
            .cloned()
            .collect();
        rows.sort_by(|a, b| {
            a.scheduled_date
                .cmp(&b.scheduled_date)
                .then(a.id.cmp(&b.id))
        });
        let offset = filter.effective_offset() as usize;
        let limit = filter.effective_limit() as usize;
        Ok(rows.into_iter().skip(offset).take(limit).collect())
    }

    async fn occurrence_exists(
        &self,
        equipment_id: DbId,
        template_id: DbId,
        scheduled_date: NaiveDate,
    ) -> StoreResult<bool> {
        Ok(self.lock().schedules.values().any(|s| {
            s.equipment_id == equipment_id
                && s.template_id == template_id
                && s.scheduled_date == scheduled_date
        }))
    }

    async fn count_for_template(&self, template_id: DbId) -> StoreResult<i64> {
        Ok(self
            .lock()
            .schedules
            .values()
            .filter(|s| s.template_id == template_id)
            .count() as i64)
    }

    async fn transition_if(
        &self,
        id: DbId,
        allowed_from: &[ScheduleStatus],
        to: ScheduleStatus,
    ) -> StoreResult<Option<PmSchedule>> {
        let mut inner = self.lock();
        let Some(schedule) = inner.schedules.get_mut(&id) else {
            return Ok(None);
        };
        if !status_in(&schedule.status, allowed_from) {
            return Ok(None);
        }
        schedule.status = to.as_str().to_string();
        schedule.updated_at = Utc::now();
        Ok(Some(schedule.clone()))
    }

    async fn delete_if(&self, id: DbId, allowed_from: &[ScheduleStatus]) -> StoreResult<bool> {
        let mut inner = self.lock();
        let deletable = inner
            .schedules
            .get(&id)
            .is_some_and(|s| status_in(&s.status, allowed_from));
        if deletable {
            inner.schedules.remove(&id);
        }
        Ok(deletable)
    }

    async fn mark_overdue_before(&self, today: NaiveDate) -> StoreResult<u64> {
        let mut inner = self.lock();
        let now = Utc::now();
        let mut promoted = 0;
        for schedule in inner.schedules.values_mut() {
            if schedule.status == ScheduleStatus::Scheduled.as_str()
                && schedule.scheduled_date < today
            {
                schedule.status = ScheduleStatus::Overdue.as_str().to_string();
                schedule.updated_at = now;
                promoted += 1;
            }
        }
        Ok(promoted)
    }

    async fn mark_notified(
        &self,
        id: DbId,
        threshold: NotificationThreshold,
    ) -> StoreResult<bool> {
        let mut inner = self.lock();
        let Some(schedule) = inner.schedules.get_mut(&id) else {
            return Ok(false);
        };
        if schedule.status != ScheduleStatus::Scheduled.as_str() {
            return Ok(false);
        }
        let flag = match threshold {
            NotificationThreshold::ThreeDay => &mut schedule.sent_3days,
            NotificationThreshold::OneDay => &mut schedule.sent_1day,
            NotificationThreshold::SameDay => &mut schedule.sent_today,
        };
        if *flag {
            return Ok(false);
        }
        *flag = true;
        schedule.updated_at = Utc::now();
        Ok(true)
    }

    async fn list_scheduled_on(&self, date: NaiveDate) -> StoreResult<Vec<PmSchedule>> {
        let mut rows: Vec<PmSchedule> = self
            .lock()
            .schedules
            .values()
            .filter(|s| {
                s.status == ScheduleStatus::Scheduled.as_str() && s.scheduled_date == date
            })
            .cloned()
            .collect();
        rows.sort_by_key(|s| s.id);
        Ok(rows)
    }

    async fn status_counts(
        &self,
        date_from: Option<NaiveDate>,
        date_to: Option<NaiveDate>,
    ) -> StoreResult<StatusCounts> {
        let inner = self.lock();
        let mut counts = StatusCounts::default();
        for schedule in inner.schedules.values() {
            if date_from.is_some_and(|from| schedule.scheduled_date < from) {
                continue;
            }
            if date_to.is_some_and(|to| schedule.scheduled_date > to) {
                continue;
            }
            if let Ok(status) = ScheduleStatus::parse(&schedule.status) {
                counts.add(status);
            }
        }
        Ok(counts)
    }
}

// ---------------------------------------------------------------------------
// ExecutionsRepository
// ---------------------------------------------------------------------------

#[async_trait]
impl ExecutionsRepository for MemoryStore {
    async fn start(
        &self,
        schedule_id: DbId,
        technician_id: DbId,
        started_at: Timestamp,
        seeded_results: Vec<ChecklistResult>,
    ) -> StoreResult<Option<(PmSchedule, PmExecution)>> {
        let mut inner = self.lock();

        if inner
            .executions
            .values()
            .any(|e| e.schedule_id == schedule_id)
        {
            return Err(StoreError::Conflict(format!(
                "Duplicate value violates unique constraint: uq_pm_executions_schedule \
                 (schedule {schedule_id})"
            )));
        }

        let startable = state_machine::transition_sources(ScheduleStatus::InProgress);
        let Some(schedule) = inner.schedules.get_mut(&schedule_id) else {
            return Ok(None);
        };
        if !status_in(&schedule.status, &startable) {
            return Ok(None);
        }

        // Sticky assignment: a pre-assigned technician wins.
        let assignee = schedule.technician_id.unwrap_or(technician_id);
        schedule.technician_id = Some(assignee);
        schedule.status = ScheduleStatus::InProgress.as_str().to_string();
        schedule.updated_at = started_at;
        let schedule = schedule.clone();

        let execution = PmExecution {
            id: inner.next_id(),
            schedule_id,
            technician_id: assignee,
            status: ExecutionStatus::InProgress.as_str().to_string(),
            started_at,
            completed_at: None,
            checklist_results: Json(seeded_results),
            used_parts: Json(vec![]),
            findings: None,
            findings_severity: "none".to_string(),
            rating: None,
            notes: None,
            created_at: started_at,
            updated_at: started_at,
        };
        inner.executions.insert(execution.id, execution.clone());
        Ok(Some((schedule, execution)))
    }

    async fn find_by_id(&self, id: DbId) -> StoreResult<Option<PmExecution>> {
        Ok(self.lock().executions.get(&id).cloned())
    }

    async fn find_by_schedule(&self, schedule_id: DbId) -> StoreResult<Option<PmExecution>> {
        Ok(self
            .lock()
            .executions
            .values()
            .find(|e| e.schedule_id == schedule_id)
            .cloned())
    }

    async fn update_in_progress(
        &self,
        id: DbId,
        input: &UpdatePmExecution,
    ) -> StoreResult<Option<PmExecution>> {
        let mut inner = self.lock();
        let Some(execution) = inner.executions.get_mut(&id) else {
            return Ok(None);
        };
        if execution.status != ExecutionStatus::InProgress.as_str() {
            return Ok(None);
        }
        if let Some(results) = &input.checklist_results {
            execution.checklist_results = Json(results.clone());
        }
        if let Some(parts) = &input.used_parts {
            execution.used_parts = Json(parts.clone());
        }
        if let Some(findings) = &input.findings {
            execution.findings = Some(findings.clone());
        }
        if let Some(severity) = &input.findings_severity {
            execution.findings_severity = severity.clone();
        }
        if let Some(notes) = &input.notes {
            execution.notes = Some(notes.clone());
        }
        execution.updated_at = Utc::now();
        Ok(Some(execution.clone()))
    }

    async fn complete(
        &self,
        id: DbId,
        fin: &ExecutionFinal,
    ) -> StoreResult<Option<(PmExecution, PmSchedule)>> {
        let mut inner = self.lock();
        let Some(execution) = inner.executions.get_mut(&id) else {
            return Ok(None);
        };
        if execution.status != ExecutionStatus::InProgress.as_str() {
            return Ok(None);
        }
        execution.status = ExecutionStatus::Completed.as_str().to_string();
        execution.checklist_results = Json(fin.checklist_results.clone());
        execution.used_parts = Json(fin.used_parts.clone());
        execution.findings = fin.findings.clone();
        execution.findings_severity = fin.findings_severity.clone();
        execution.rating = fin.rating;
        execution.notes = fin.notes.clone();
        execution.completed_at = Some(fin.completed_at);
        execution.updated_at = fin.completed_at;
        let schedule_id = execution.schedule_id;
        let execution = execution.clone();

        let Some(schedule) = inner.schedules.get_mut(&schedule_id) else {
            return Ok(None);
        };
        schedule.status = ScheduleStatus::Completed.as_str().to_string();
        schedule.updated_at = fin.completed_at;
        Ok(Some((execution, schedule.clone())))
    }
}

// ---------------------------------------------------------------------------
// EquipmentRepository / TechniciansRepository
// ---------------------------------------------------------------------------

#[async_trait]
impl EquipmentRepository for MemoryStore {
    async fn create(&self, input: &CreateEquipment) -> StoreResult<Equipment> {
        let mut inner = self.lock();
        let now = Utc::now();
        let equipment = Equipment {
            id: inner.next_id(),
            name: input.name.clone(),
            equipment_type_id: input.equipment_type_id,
            location: input.location.clone(),
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        inner.equipment.insert(equipment.id, equipment.clone());
        Ok(equipment)
    }

    async fn find_by_id(&self, id: DbId) -> StoreResult<Option<Equipment>> {
        Ok(self.lock().equipment.get(&id).cloned())
    }

    async fn list(&self) -> StoreResult<Vec<Equipment>> {
        Ok(self.lock().equipment.values().cloned().collect())
    }
}

#[async_trait]
impl TechniciansRepository for MemoryStore {
    async fn create(&self, input: &CreateTechnician) -> StoreResult<Technician> {
        let mut inner = self.lock();
        let now = Utc::now();
        let technician = Technician {
            id: inner.next_id(),
            name: input.name.clone(),
            email: input.email.clone(),
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        inner.technicians.insert(technician.id, technician.clone());
        Ok(technician)
    }

    async fn find_by_id(&self, id: DbId) -> StoreResult<Option<Technician>> {
        Ok(self.lock().technicians.get(&id).cloned())
    }

    async fn list(&self) -> StoreResult<Vec<Technician>> {
        Ok(self.lock().technicians.values().cloned().collect())
    }
}
