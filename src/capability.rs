pub mod enrichment;
pub mod person;
