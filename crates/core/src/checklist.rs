//! Checklist and parts types shared by templates and executions, plus the
//! completion gate.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::DbId;

/// Rating bounds for a completed execution.
pub const MIN_RATING: i16 = 1;
pub const MAX_RATING: i16 = 10;

/// One checklist entry on a PM template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistItem {
    pub id: DbId,
    pub order: i32,
    pub description: String,
    pub is_required: bool,
}

/// A technician's result for one checklist item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistResult {
    pub item_id: DbId,
    pub is_checked: bool,
    pub has_issue: bool,
}

/// A part a template calls for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequiredPart {
    pub code: String,
    pub name: String,
    pub quantity: i32,
}

/// A part actually consumed during an execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsedPart {
    pub code: String,
    pub name: String,
    pub quantity: i32,
}

/// Seed one unchecked result per template checklist item, in template order.
pub fn seed_results(items: &[ChecklistItem]) -> Vec<ChecklistResult> {
    items
        .iter()
        .map(|item| ChecklistResult {
            item_id: item.id,
            is_checked: false,
            has_issue: false,
        })
        .collect()
}

/// The completion gate: ids of required items not checked in `results`.
///
/// A required item with no submitted result at all also counts as missing.
/// An empty return means completion may proceed.
pub fn missing_required_items(
    items: &[ChecklistItem],
    results: &[ChecklistResult],
) -> Vec<DbId> {
    items
        .iter()
        .filter(|item| item.is_required)
        .filter(|item| {
            !results
                .iter()
                .any(|r| r.item_id == item.id && r.is_checked)
        })
        .map(|item| item.id)
        .collect()
}

/// Validate a template's checklist: ids unique, descriptions non-empty.
pub fn validate_checklist(items: &[ChecklistItem]) -> Result<(), CoreError> {
    for item in items {
        if item.description.trim().is_empty() {
            return Err(CoreError::Validation(format!(
                "Checklist item {} has an empty description",
                item.id
            )));
        }
    }
    let mut ids: Vec<DbId> = items.iter().map(|i| i.id).collect();
    ids.sort_unstable();
    ids.dedup();
    if ids.len() != items.len() {
        return Err(CoreError::Validation(
            "Checklist item ids must be unique".to_string(),
        ));
    }
    Ok(())
}

/// Validate an execution rating is within 1..=10.
pub fn validate_rating(rating: i16) -> Result<(), CoreError> {
    if !(MIN_RATING..=MAX_RATING).contains(&rating) {
        return Err(CoreError::Validation(format!(
            "Rating must be between {MIN_RATING} and {MAX_RATING}, got {rating}"
        )));
    }
    Ok(())
}
