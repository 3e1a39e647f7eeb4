//! Equipment and technician lookups.

use async_trait::async_trait;
use upkeep_core::types::DbId;

use crate::models::equipment::{CreateEquipment, Equipment};
use crate::models::technician::{CreateTechnician, Technician};
use crate::store::{EquipmentRepository, StoreResult, TechniciansRepository};

use super::PgStore;

/// Column list for `equipment` queries.
const EQUIPMENT_COLUMNS: &str =
    "id, name, equipment_type_id, location, is_active, created_at, updated_at";

/// Column list for `technicians` queries.
const TECHNICIAN_COLUMNS: &str = "id, name, email, is_active, created_at, updated_at";

#[async_trait]
impl EquipmentRepository for PgStore {
    async fn create(&self, input: &CreateEquipment) -> StoreResult<Equipment> {
        let query = format!(
            "INSERT INTO equipment (name, equipment_type_id, location) \
             VALUES ($1, $2, $3) \
             RETURNING {EQUIPMENT_COLUMNS}"
        );
        let equipment = sqlx::query_as::<_, Equipment>(&query)
            .bind(&input.name)
            .bind(input.equipment_type_id)
            .bind(&input.location)
            .fetch_one(self.pool())
            .await?;
        Ok(equipment)
    }

    async fn find_by_id(&self, id: DbId) -> StoreResult<Option<Equipment>> {
        let query = format!("SELECT {EQUIPMENT_COLUMNS} FROM equipment WHERE id = $1");
        let equipment = sqlx::query_as::<_, Equipment>(&query)
            .bind(id)
            .fetch_optional(self.pool())
            .await?;
        Ok(equipment)
    }

    async fn list(&self) -> StoreResult<Vec<Equipment>> {
        let query = format!("SELECT {EQUIPMENT_COLUMNS} FROM equipment ORDER BY id");
        let equipment = sqlx::query_as::<_, Equipment>(&query)
            .fetch_all(self.pool())
            .await?;
        Ok(equipment)
    }
}

#[async_trait]
impl TechniciansRepository for PgStore {
    async fn create(&self, input: &CreateTechnician) -> StoreResult<Technician> {
        let query = format!(
            "INSERT INTO technicians (name, email) \
             VALUES ($1, $2) \
             RETURNING {TECHNICIAN_COLUMNS}"
        );
        let technician = sqlx::query_as::<_, Technician>(&query)
            .bind(&input.name)
            .bind(&input.email)
            .fetch_one(self.pool())
            .await?;
        Ok(technician)
    }

    async fn find_by_id(&self, id: DbId) -> StoreResult<Option<Technician>> {
        let query = format!("SELECT {TECHNICIAN_COLUMNS} FROM technicians WHERE id = $1");
        let technician = sqlx::query_as::<_, Technician>(&query)
            .bind(id)
            .fetch_optional(self.pool())
            .await?;
        Ok(technician)
    }

    async fn list(&self) -> StoreResult<Vec<Technician>> {
        let query = format!("SELECT {TECHNICIAN_COLUMNS} FROM technicians ORDER BY id");
        let technicians = sqlx::query_as::<_, Technician>(&query)
            .fetch_all(self.pool())
            .await?;
        Ok(technicians)
    }
}
