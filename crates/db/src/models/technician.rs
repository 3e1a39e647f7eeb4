//! Technician entity model.
//!
//! Technicians (users) are owned by the wider dashboard; carried here for
//! lookups and sticky assignment.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use upkeep_core::types::{DbId, Timestamp};

/// A row from the `technicians` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Technician {
    pub id: DbId,
    pub name: String,
    pub email: Option<String>,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for registering a technician.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTechnician {
    pub name: String,
    pub email: Option<String>,
}
