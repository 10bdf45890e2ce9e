//! Cultural advisor rows.

use serde::Serialize;
use sqlx::FromRow;
use yarning_core::advisor::Advisor;
use yarning_core::types::{DbId, Timestamp};

/// A row from the `cultural_advisors` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AdvisorRow {
    pub id: DbId,
    pub name: String,
    pub community: Option<String>,
    pub specialties: Vec<String>,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<AdvisorRow> for Advisor {
    fn from(row: AdvisorRow) -> Self {
        Advisor {
            id: row.id,
            name: row.name,
            community: row.community,
            specialties: row.specialties,
            is_active: row.is_active,
        }
    }
}
