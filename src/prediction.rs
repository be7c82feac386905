use crate::capability::enrichment::PredictionError;
use serde::de::DeserializeOwned;

pub struct PredictionRequest<'a> {
    base_url: &'a str,
    name: &'a str,
}

impl<'a> PredictionRequest<'a> {
    pub fn new(base_url: &'a str, name: &'a str) -> Self {
        Self { base_url, name }
    }

    /// `GET {base_url}/?name={name}` decoded as `T`. Non-2xx answers are errors
    /// since the providers reply 429 with an error object when rate limited.
    pub async fn fetch<T: DeserializeOwned>(
        &self,
        client: &reqwest::Client,
    ) -> Result<T, PredictionError> {
        let url = format!("{}/", self.base_url.trim_end_matches('/'));

        let res = client
            .get(url)
            .query(&[("name", self.name)])
            .send()
            .await
            .map_err(|err| {
                if err.is_timeout() {
                    PredictionError::TimedOut
                } else {
                    PredictionError::Request(err.to_string())
                }
            })?;

        let status = res.status();
        if !status.is_success() {
            return Err(PredictionError::Status(status.as_u16()));
        }

        let body = res
            .text()
            .await
            .map_err(|err| PredictionError::Request(err.to_string()))?;

        serde_json::from_str(&body).map_err(|err| PredictionError::Decode(err.to_string()))
    }
}
