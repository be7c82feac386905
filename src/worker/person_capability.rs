use crate::capability::person::{PersonCapability, StorageError};
use crate::domain::listing::{Page, PersonFilter};
use crate::domain::person::{Person, PersonRecord};
use crate::domain::person_id::PersonId;
use crate::worker::Worker;
use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{Postgres, QueryBuilder, Row};
use tracing::error;

const PERSON_COLUMNS: &str = "id, name, surname, patronymic, age, gender, nationality";

#[async_trait]
impl PersonCapability for Worker {
    async fn save(&self, record: PersonRecord) -> Result<Person, StorageError> {
        let row = sqlx::query(
            r#"
                INSERT INTO persons (name, surname, patronymic, age, gender, nationality)
                VALUES ($1, $2, $3, $4, $5, $6)
                RETURNING id;
            "#,
        )
        .bind(&record.name)
        .bind(&record.surname)
        .bind(&record.patronymic)
        .bind(record.age)
        .bind(&record.gender)
        .bind(&record.nationality)
        .fetch_one(&self.sqlx)
        .await
        .map_err(|err| {
            error!(error = %err, "error inserting person");
            StorageError::Query(err)
        })?;

        let id: i32 = row.try_get("id").map_err(StorageError::ReadingRow)?;

        Ok(record.with_id(PersonId::from_i32(id)))
    }

    async fn get_by_id(&self, id: PersonId) -> Result<Option<Person>, StorageError> {
        let maybe_row = sqlx::query(&format!(
            "SELECT {} FROM persons WHERE id = $1;",
            PERSON_COLUMNS
        ))
        .bind(id.to_i32())
        .fetch_optional(&self.sqlx)
        .await
        .map_err(StorageError::Query)?;

        maybe_row.as_ref().map(person_from_row).transpose()
    }

    async fn update(
        &self,
        id: PersonId,
        record: PersonRecord,
    ) -> Result<Option<Person>, StorageError> {
        let maybe_row = sqlx::query(&format!(
            r#"
                UPDATE persons
                SET name = $1, surname = $2, patronymic = $3, age = $4, gender = $5, nationality = $6
                WHERE id = $7
                RETURNING {};
            "#,
            PERSON_COLUMNS
        ))
        .bind(&record.name)
        .bind(&record.surname)
        .bind(&record.patronymic)
        .bind(record.age)
        .bind(&record.gender)
        .bind(&record.nationality)
        .bind(id.to_i32())
        .fetch_optional(&self.sqlx)
        .await
        .map_err(|err| {
            error!(error = %err, id = id.to_i32(), "error updating person");
            StorageError::Query(err)
        })?;

        maybe_row.as_ref().map(person_from_row).transpose()
    }

    async fn delete_by_id(&self, id: PersonId) -> Result<bool, StorageError> {
        let result = sqlx::query("DELETE FROM persons WHERE id = $1;")
            .bind(id.to_i32())
            .execute(&self.sqlx)
            .await
            .map_err(|err| {
                error!(error = %err, id = id.to_i32(), "error deleting person");
                StorageError::Query(err)
            })?;

        Ok(result.rows_affected() > 0)
    }

    async fn list(&self, page: Page, filter: &PersonFilter) -> Result<Vec<Person>, StorageError> {
        let rows = list_query(page, filter)
            .build()
            .fetch_all(&self.sqlx)
            .await
            .map_err(|err| {
                error!(error = %err, "error listing persons");
                StorageError::Query(err)
            })?;

        // A single bad row fails the whole page
        rows.iter()
            .map(person_from_row)
            .collect::<Result<Vec<Person>, StorageError>>()
            .map_err(|err| {
                error!("error reading listed person row");
                err
            })
    }
}

/// Every filter value and the paging window are bound, never spliced into the SQL.
fn list_query<'a>(page: Page, filter: &'a PersonFilter) -> QueryBuilder<'a, Postgres> {
    let mut query = QueryBuilder::new(format!(
        "SELECT {} FROM persons WHERE 1=1",
        PERSON_COLUMNS
    ));

    if let Some(name) = &filter.name {
        query
            .push(" AND name ILIKE '%' || ")
            .push_bind(escape_like(name))
            .push(" || '%'");
    }
    if let Some(gender) = &filter.gender {
        query.push(" AND gender = ").push_bind(gender.as_str());
    }
    if let Some(nationality) = &filter.nationality {
        query.push(" AND nationality = ").push_bind(nationality.as_str());
    }

    query
        .push(" ORDER BY id LIMIT ")
        .push_bind(page.limit())
        .push(" OFFSET ")
        .push_bind(page.offset());

    query
}

/// ILIKE treats `%`, `_` and the escape character itself as metacharacters.
fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn person_from_row(row: &PgRow) -> Result<Person, StorageError> {
    Ok(Person {
        id: PersonId::from_i32(row.try_get::<i32, _>("id").map_err(StorageError::ReadingRow)?),
        name: row.try_get("name").map_err(StorageError::ReadingRow)?,
        surname: row.try_get("surname").map_err(StorageError::ReadingRow)?,
        patronymic: row
            .try_get::<Option<String>, _>("patronymic")
            .map_err(StorageError::ReadingRow)?
            .unwrap_or_default(),
        age: row.try_get("age").map_err(StorageError::ReadingRow)?,
        gender: row.try_get("gender").map_err(StorageError::ReadingRow)?,
        nationality: row.try_get("nationality").map_err(StorageError::ReadingRow)?,
    })
}
