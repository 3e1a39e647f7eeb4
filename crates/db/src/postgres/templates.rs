//! Template queries against the `pm_templates` table.

use async_trait::async_trait;
use sqlx::types::Json;
use upkeep_core::types::DbId;

use crate::models::template::{CreatePmTemplate, PmTemplate, UpdatePmTemplate};
use crate::store::{StoreResult, TemplatesRepository};

use super::PgStore;

/// Column list for `pm_templates` queries.
const COLUMNS: &str = "\
    id, name, description, interval_type, interval_value, \
    checklist_items, required_parts, estimated_duration_minutes, \
    is_active, created_at, updated_at";

#[async_trait]
impl TemplatesRepository for PgStore {
    async fn create(&self, input: &CreatePmTemplate) -> StoreResult<PmTemplate> {
        let query = format!(
            "INSERT INTO pm_templates \
                 (name, description, interval_type, interval_value, \
                  checklist_items, required_parts, estimated_duration_minutes, is_active) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {COLUMNS}"
        );
        let template = sqlx::query_as::<_, PmTemplate>(&query)
            .bind(&input.name)
            .bind(&input.description)
            .bind(&input.interval_type)
            .bind(input.interval_value)
            .bind(Json(&input.checklist_items))
            .bind(Json(&input.required_parts))
            .bind(input.estimated_duration_minutes)
            .bind(input.is_active)
            .fetch_one(self.pool())
            .await?;
        Ok(template)
    }

    async fn update(
        &self,
        id: DbId,
        input: &UpdatePmTemplate,
    ) -> StoreResult<Option<PmTemplate>> {
        let query = format!(
            "UPDATE pm_templates SET \
                 name = COALESCE($2, name), \
                 description = COALESCE($3, description), \
                 interval_type = COALESCE($4, interval_type), \
                 interval_value = COALESCE($5, interval_value), \
                 checklist_items = COALESCE($6, checklist_items), \
                 required_parts = COALESCE($7, required_parts), \
                 estimated_duration_minutes = COALESCE($8, estimated_duration_minutes), \
                 is_active = COALESCE($9, is_active), \
                 updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        let template = sqlx::query_as::<_, PmTemplate>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(&input.interval_type)
            .bind(input.interval_value)
            .bind(input.checklist_items.as_ref().map(Json))
            .bind(input.required_parts.as_ref().map(Json))
            .bind(input.estimated_duration_minutes)
            .bind(input.is_active)
            .fetch_optional(self.pool())
            .await?;
        Ok(template)
    }

    async fn delete(&self, id: DbId) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM pm_templates WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn find_by_id(&self, id: DbId) -> StoreResult<Option<PmTemplate>> {
        let query = format!("SELECT {COLUMNS} FROM pm_templates WHERE id = $1");
        let template = sqlx::query_as::<_, PmTemplate>(&query)
            .bind(id)
            .fetch_optional(self.pool())
            .await?;
        Ok(template)
    }

    async fn list(&self, active_only: bool) -> StoreResult<Vec<PmTemplate>> {
        let query = format!(
            "SELECT {COLUMNS} FROM pm_templates \
             WHERE ($1 = FALSE OR is_active = TRUE) \
             ORDER BY id"
        );
        let templates = sqlx::query_as::<_, PmTemplate>(&query)
            .bind(active_only)
            .fetch_all(self.pool())
            .await?;
        Ok(templates)
    }
}
