//! Template registry: CRUD over PM templates with validation and the
//! referential delete guard.

use upkeep_core::checklist::validate_checklist;
use upkeep_core::error::CoreError;
use upkeep_core::status::IntervalType;
use upkeep_core::types::DbId;
use upkeep_db::models::template::{CreatePmTemplate, PmTemplate, UpdatePmTemplate};
use upkeep_db::Store;

use crate::{PmError, PmResult};

/// Create a template after validating recurrence and checklist.
pub async fn create_template(store: &Store, input: &CreatePmTemplate) -> PmResult<PmTemplate> {
    validate_fields(
        Some(&input.name),
        Some(&input.interval_type),
        Some(input.interval_value),
        Some(&input.checklist_items),
    )?;
    let template = store.templates.create(input).await?;
    tracing::info!(template_id = template.id, name = %template.name, "PM template created");
    Ok(template)
}

/// Update a template; `None` fields are left unchanged.
pub async fn update_template(
    store: &Store,
    id: DbId,
    input: &UpdatePmTemplate,
) -> PmResult<PmTemplate> {
    validate_fields(
        input.name.as_deref(),
        input.interval_type.as_deref(),
        input.interval_value,
        input.checklist_items.as_deref(),
    )?;
    store
        .templates
        .update(id, input)
        .await?
        .ok_or(PmError::Core(CoreError::NotFound {
            entity: "template",
            id,
        }))
}

/// Delete a template, refused while any schedule references it.
pub async fn delete_template(store: &Store, id: DbId) -> PmResult<()> {
    let schedule_count = store.schedules.count_for_template(id).await?;
    if schedule_count > 0 {
        return Err(PmError::Core(CoreError::TemplateInUse {
            id,
            schedule_count,
        }));
    }
    if !store.templates.delete(id).await? {
        return Err(PmError::Core(CoreError::NotFound {
            entity: "template",
            id,
        }));
    }
    tracing::info!(template_id = id, "PM template deleted");
    Ok(())
}

/// Fetch one template.
pub async fn get_template(store: &Store, id: DbId) -> PmResult<PmTemplate> {
    store
        .templates
        .find_by_id(id)
        .await?
        .ok_or(PmError::Core(CoreError::NotFound {
            entity: "template",
            id,
        }))
}

/// List templates, optionally only active ones.
pub async fn list_templates(store: &Store, active_only: bool) -> PmResult<Vec<PmTemplate>> {
    Ok(store.templates.list(active_only).await?)
}

fn validate_fields(
    name: Option<&str>,
    interval_type: Option<&str>,
    interval_value: Option<i32>,
    checklist: Option<&[upkeep_core::checklist::ChecklistItem]>,
) -> Result<(), CoreError> {
    if let Some(name) = name {
        if name.trim().is_empty() {
            return Err(CoreError::Validation(
                "Template name must not be empty".to_string(),
            ));
        }
    }
    if let Some(interval_type) = interval_type {
        IntervalType::parse(interval_type)?;
    }
    if let Some(value) = interval_value {
        if value < 1 {
            return Err(CoreError::Validation(format!(
                "interval_value must be >= 1, got {value}"
            )));
        }
    }
    if let Some(items) = checklist {
        validate_checklist(items)?;
    }
    Ok(())
}
