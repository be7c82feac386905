pub mod listing;
pub mod person;
pub mod person_id;
pub mod prediction;
