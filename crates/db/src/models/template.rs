//! PM template entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use upkeep_core::checklist::{ChecklistItem, RequiredPart};
use upkeep_core::types::{DbId, Timestamp};

/// A row from the `pm_templates` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PmTemplate {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    /// Raw interval type (`daily` … `yearly`); parse via
    /// `upkeep_core::status::IntervalType`.
    pub interval_type: String,
    pub interval_value: i32,
    pub checklist_items: Json<Vec<ChecklistItem>>,
    pub required_parts: Json<Vec<RequiredPart>>,
    pub estimated_duration_minutes: Option<i32>,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a template.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePmTemplate {
    pub name: String,
    pub description: Option<String>,
    pub interval_type: String,
    pub interval_value: i32,
    #[serde(default)]
    pub checklist_items: Vec<ChecklistItem>,
    #[serde(default)]
    pub required_parts: Vec<RequiredPart>,
    pub estimated_duration_minutes: Option<i32>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

/// DTO for updating a template. `None` fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdatePmTemplate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub interval_type: Option<String>,
    pub interval_value: Option<i32>,
    pub checklist_items: Option<Vec<ChecklistItem>>,
    pub required_parts: Option<Vec<RequiredPart>>,
    pub estimated_duration_minutes: Option<i32>,
    pub is_active: Option<bool>,
}
