use crate::capability::enrichment::{EnrichmentCapability, EnrichmentError, PredictionError};
use crate::capability::person::{PersonCapability, StorageError};
use crate::domain::listing::{Page, PersonFilter};
use crate::domain::person::{Person, PersonRecord};
use crate::domain::person_id::PersonId;
use crate::domain::prediction::Lookup;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub fn person_record(name: &str, gender: &str, nationality: &str) -> PersonRecord {
    PersonRecord {
        name: name.to_string(),
        surname: "Tester".to_string(),
        patronymic: String::new(),
        age: 40,
        gender: gender.to_string(),
        nationality: nationality.to_string(),
    }
}

/// `persons` held in memory, ordered by id like the Postgres listing.
#[derive(Default)]
pub struct InMemoryPersons {
    rows: Mutex<Vec<Person>>,
    next_id: AtomicUsize,
    failing: bool,
}

impl InMemoryPersons {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every operation fails as if the database were unreachable.
    pub fn failing(mut self) -> Self {
        self.failing = true;
        self
    }

    pub fn len(&self) -> usize {
        self.rows.lock().unwrap().len()
    }

    fn check(&self) -> Result<(), StorageError> {
        if self.failing {
            Err(StorageError::Query(sqlx::Error::PoolTimedOut))
        } else {
            Ok(())
        }
    }
}

fn matches_filter(person: &Person, filter: &PersonFilter) -> bool {
    let name_ok = filter.name.as_ref().map_or(true, |name| {
        person.name.to_lowercase().contains(&name.to_lowercase())
    });
    let gender_ok = filter.gender.as_ref().map_or(true, |g| &person.gender == g);
    let nationality_ok = filter
        .nationality
        .as_ref()
        .map_or(true, |n| &person.nationality == n);

    name_ok && gender_ok && nationality_ok
}

#[async_trait]
impl PersonCapability for InMemoryPersons {
    async fn save(&self, record: PersonRecord) -> Result<Person, StorageError> {
        self.check()?;
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) as i32 + 1;
        let person = record.with_id(PersonId::from_i32(id));
        self.rows.lock().unwrap().push(person.clone());
        Ok(person)
    }

    async fn get_by_id(&self, id: PersonId) -> Result<Option<Person>, StorageError> {
        self.check()?;
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id == id)
            .cloned())
    }

    async fn update(
        &self,
        id: PersonId,
        record: PersonRecord,
    ) -> Result<Option<Person>, StorageError> {
        self.check()?;
        let mut rows = self.rows.lock().unwrap();
        Ok(rows.iter_mut().find(|p| p.id == id).map(|row| {
            *row = record.with_id(id);
            row.clone()
        }))
    }

    async fn delete_by_id(&self, id: PersonId) -> Result<bool, StorageError> {
        self.check()?;
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|p| p.id != id);
        Ok(rows.len() < before)
    }

    async fn list(&self, page: Page, filter: &PersonFilter) -> Result<Vec<Person>, StorageError> {
        self.check()?;
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|p| matches_filter(p, filter))
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .cloned()
            .collect())
    }
}

/// Scripted predictions. Clones share the call counter.
#[derive(Clone)]
pub struct StubEnrichment {
    age: i32,
    gender: String,
    nationality: String,
    failing: Option<Lookup>,
    delay: Option<Duration>,
    calls: Arc<AtomicUsize>,
}

impl StubEnrichment {
    pub fn predicting(age: i32, gender: &str, nationality: &str) -> Self {
        Self {
            age,
            gender: gender.to_string(),
            nationality: nationality.to_string(),
            failing: None,
            delay: None,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn failing(mut self, lookup: Lookup) -> Self {
        self.failing = Some(lookup);
        self
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    async fn answer<T>(&self, lookup: Lookup, value: T) -> Result<T, EnrichmentError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing == Some(lookup) {
            Err(EnrichmentError::new(
                lookup,
                PredictionError::Request("connection refused".to_string()),
            ))
        } else {
            Ok(value)
        }
    }
}

#[async_trait]
impl EnrichmentCapability for StubEnrichment {
    async fn predict_age(&self, _name: &str) -> Result<i32, EnrichmentError> {
        self.answer(Lookup::Age, self.age).await
    }

    async fn predict_gender(&self, _name: &str) -> Result<String, EnrichmentError> {
        self.answer(Lookup::Gender, self.gender.clone()).await
    }

    async fn predict_nationality(&self, _name: &str) -> Result<String, EnrichmentError> {
        self.answer(Lookup::Nationality, self.nationality.clone()).await
    }
}
