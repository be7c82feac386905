use crate::domain::listing::{Page, PersonFilter};
use crate::domain::person::{Person, PersonRecord};
use crate::domain::person_id::PersonId;
use crate::nice_display::NiceDisplay;
use async_trait::async_trait;

#[derive(Debug)]
pub enum StorageError {
    Query(sqlx::Error),
    ReadingRow(sqlx::Error),
}

impl NiceDisplay for StorageError {
    fn message(&self) -> String {
        match self {
            StorageError::Query(err) => format!("Error running persons query\n{}", err),
            StorageError::ReadingRow(err) => format!("Error reading person row\n{}", err),
        }
    }
}

/// Persistence for the `persons` table.
#[async_trait]
pub trait PersonCapability {
    async fn save(&self, record: PersonRecord) -> Result<Person, StorageError>;
    async fn get_by_id(&self, id: PersonId) -> Result<Option<Person>, StorageError>;
    /// Overwrites every column. `None` when no row has this id.
    async fn update(
        &self,
        id: PersonId,
        record: PersonRecord,
    ) -> Result<Option<Person>, StorageError>;
    /// `false` when no row has this id.
    async fn delete_by_id(&self, id: PersonId) -> Result<bool, StorageError>;
    async fn list(&self, page: Page, filter: &PersonFilter) -> Result<Vec<Person>, StorageError>;
}
