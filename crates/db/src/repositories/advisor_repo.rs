//! Repository for the `cultural_advisors` table.

use sqlx::PgPool;
use yarning_core::advisor::CreateAdvisor;
use yarning_core::types::DbId;

use crate::models::advisor::AdvisorRow;

const COLUMNS: &str = "id, name, community, specialties, is_active, created_at, updated_at";

pub struct AdvisorRepo;

impl AdvisorRepo {
    pub async fn create(pool: &PgPool, input: &CreateAdvisor) -> Result<AdvisorRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO cultural_advisors (name, community, specialties)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AdvisorRow>(&query)
            .bind(&input.name)
            .bind(&input.community)
            .bind(&input.specialties)
            .fetch_one(pool)
            .await
    }

    /// Active advisors in registration order.
    pub async fn list_active(pool: &PgPool) -> Result<Vec<AdvisorRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM cultural_advisors WHERE is_active ORDER BY id ASC"
        );
        sqlx::query_as::<_, AdvisorRow>(&query).fetch_all(pool).await
    }

    pub async fn list_all(pool: &PgPool) -> Result<Vec<AdvisorRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM cultural_advisors ORDER BY id ASC");
        sqlx::query_as::<_, AdvisorRow>(&query).fetch_all(pool).await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<AdvisorRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM cultural_advisors WHERE id = $1");
        sqlx::query_as::<_, AdvisorRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
