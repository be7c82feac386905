use crate::domain::prediction::Lookup;
use crate::nice_display::NiceDisplay;
use async_trait::async_trait;

#[derive(Debug, Clone)]
pub enum PredictionError {
    Request(String),
    Status(u16),
    Decode(String),
    TimedOut,
}

impl NiceDisplay for PredictionError {
    fn message(&self) -> String {
        match self {
            PredictionError::Request(err) => {
                format!("I had trouble making a request to the prediction service\n{}", err)
            }
            PredictionError::Status(status) => {
                format!("The prediction service answered with status {}", status)
            }
            PredictionError::Decode(err) => {
                format!("I had trouble decoding the prediction response\n{}", err)
            }
            PredictionError::TimedOut => "The prediction service took too long".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct EnrichmentError {
    pub lookup: Lookup,
    pub reason: PredictionError,
}

impl EnrichmentError {
    pub fn new(lookup: Lookup, reason: PredictionError) -> Self {
        Self { lookup, reason }
    }
}

impl NiceDisplay for EnrichmentError {
    fn message(&self) -> String {
        format!(
            "Could not predict {}\n{}",
            self.lookup.to_name(),
            self.reason.message()
        )
    }
}

/// Name based predictions. Each call is independent of the others.
#[async_trait]
pub trait EnrichmentCapability {
    async fn predict_age(&self, name: &str) -> Result<i32, EnrichmentError>;
    async fn predict_gender(&self, name: &str) -> Result<String, EnrichmentError>;
    /// Empty string when the service has no country for the name.
    async fn predict_nationality(&self, name: &str) -> Result<String, EnrichmentError>;
}
