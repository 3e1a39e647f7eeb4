//! Equipment entity model.
//!
//! Equipment is owned by the wider dashboard; this crate carries the row and
//! a lookup repository so referential checks work against both backends.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use upkeep_core::types::{DbId, Timestamp};

/// A row from the `equipment` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Equipment {
    pub id: DbId,
    pub name: String,
    pub equipment_type_id: Option<DbId>,
    pub location: Option<String>,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for registering a piece of equipment.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateEquipment {
    pub name: String,
    pub equipment_type_id: Option<DbId>,
    pub location: Option<String>,
}
