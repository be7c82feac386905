use super::person_id::PersonId;
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct Person {
    #[schema(value_type = i32)]
    pub id: PersonId,
    pub name: String,
    pub surname: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub patronymic: String,
    pub age: i32,
    pub gender: String,
    pub nationality: String,
}

/// The columns of a person row other than `id`. Used both for inserting a
/// freshly enriched person and for overwriting an existing one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonRecord {
    pub name: String,
    pub surname: String,
    pub patronymic: String,
    pub age: i32,
    pub gender: String,
    pub nationality: String,
}

impl PersonRecord {
    pub fn with_id(self, id: PersonId) -> Person {
        Person {
            id,
            name: self.name,
            surname: self.surname,
            patronymic: self.patronymic,
            age: self.age,
            gender: self.gender,
            nationality: self.nationality,
        }
    }
}

/// The parts of a person a client is allowed to choose at creation time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPerson {
    pub name: String,
    pub surname: String,
    pub patronymic: String,
}

/// The enriched attributes derived from a person's given name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Enrichment {
    pub age: i32,
    pub gender: String,
    pub nationality: String,
}

impl NewPerson {
    pub fn enrich(self, enrichment: Enrichment) -> PersonRecord {
        PersonRecord {
            name: self.name,
            surname: self.surname,
            patronymic: self.patronymic,
            age: enrichment.age,
            gender: enrichment.gender,
            nationality: enrichment.nationality,
        }
    }
}
