use crate::capability::enrichment::{EnrichmentCapability, EnrichmentError, PredictionError};
use crate::capability::person::{PersonCapability, StorageError};
use crate::domain::listing::{Page, PersonFilter};
use crate::domain::person::{Enrichment, NewPerson, Person, PersonRecord};
use crate::domain::person_id::PersonId;
use crate::domain::prediction::Lookup;
use crate::nice_display::NiceDisplay;
use std::future::Future;
use std::time::Duration;
use tracing::{error, info, warn};

#[derive(Debug)]
pub enum Error {
    CreateFailed(CreateFailure),
    NotFound(PersonId),
    Storage(StorageError),
}

#[derive(Debug)]
pub enum CreateFailure {
    Enrichment(EnrichmentError),
    Storage(StorageError),
}

impl NiceDisplay for Error {
    fn message(&self) -> String {
        match self {
            Error::CreateFailed(CreateFailure::Enrichment(err)) => {
                format!("Failed to create person\n{}", err.message())
            }
            Error::CreateFailed(CreateFailure::Storage(err)) => {
                format!("Failed to create person\n{}", err.message())
            }
            Error::NotFound(id) => format!("No person with id {}", id),
            Error::Storage(err) => err.message(),
        }
    }
}

pub struct PersonService<S, E> {
    store: S,
    enricher: E,
    enrichment_timeout: Duration,
}

impl<S, E> PersonService<S, E>
where
    S: PersonCapability,
    E: EnrichmentCapability,
{
    pub fn new(store: S, enricher: E, enrichment_timeout: Duration) -> Self {
        Self {
            store,
            enricher,
            enrichment_timeout,
        }
    }

    /// Enriches the person from their given name, then inserts it. Nothing is
    /// written unless all three predictions succeed.
    pub async fn create_person(&self, new_person: NewPerson) -> Result<Person, Error> {
        info!(name = new_person.name.as_str(), "enriching new person");

        let enrichment = self
            .enrich(&new_person.name)
            .await
            .map_err(|err| Error::CreateFailed(CreateFailure::Enrichment(err)))?;

        let person = self
            .store
            .save(new_person.enrich(enrichment))
            .await
            .map_err(|err| {
                error!(error = %err.message(), "failed to save person");
                Error::CreateFailed(CreateFailure::Storage(err))
            })?;

        info!(id = person.id.to_i32(), "person created");
        Ok(person)
    }

    async fn enrich(&self, name: &str) -> Result<Enrichment, EnrichmentError> {
        let (age, gender, nationality) = tokio::try_join!(
            self.within_deadline(Lookup::Age, self.enricher.predict_age(name)),
            self.within_deadline(Lookup::Gender, self.enricher.predict_gender(name)),
            self.within_deadline(Lookup::Nationality, self.enricher.predict_nationality(name)),
        )?;

        Ok(Enrichment {
            age,
            gender,
            nationality,
        })
    }

    /// The lookups run together, so one deadline per lookup also bounds the whole enrichment.
    async fn within_deadline<T>(
        &self,
        lookup: Lookup,
        prediction: impl Future<Output = Result<T, EnrichmentError>>,
    ) -> Result<T, EnrichmentError> {
        tokio::time::timeout(self.enrichment_timeout, prediction)
            .await
            .unwrap_or_else(|_| {
                warn!(
                    lookup = lookup.to_name(),
                    timeout_ms = self.enrichment_timeout.as_millis() as u64,
                    "prediction lookup timed out"
                );
                Err(EnrichmentError::new(lookup, PredictionError::TimedOut))
            })
    }

    pub async fn list_persons(
        &self,
        page: Option<i64>,
        limit: Option<i64>,
        filter: PersonFilter,
    ) -> Result<Vec<Person>, Error> {
        let page = Page::normalize(page, limit);

        info!(
            page = page.page(),
            limit = page.limit(),
            name = ?filter.name,
            gender = ?filter.gender,
            nationality = ?filter.nationality,
            "listing persons"
        );

        self.store.list(page, &filter).await.map_err(Error::Storage)
    }

    pub async fn get_person(&self, id: PersonId) -> Result<Person, Error> {
        self.store
            .get_by_id(id)
            .await
            .map_err(Error::Storage)?
            .ok_or(Error::NotFound(id))
    }

    /// Overwrites the whole row, derived fields included. No re-enrichment.
    pub async fn update_person(&self, id: PersonId, record: PersonRecord) -> Result<Person, Error> {
        self.store
            .update(id, record)
            .await
            .map_err(Error::Storage)?
            .ok_or(Error::NotFound(id))
    }

    pub async fn delete_person(&self, id: PersonId) -> Result<(), Error> {
        if self.store.delete_by_id(id).await.map_err(Error::Storage)? {
            info!(id = id.to_i32(), "person deleted");
            Ok(())
        } else {
            Err(Error::NotFound(id))
        }
    }
}
