use crate::capability::enrichment::{EnrichmentCapability, EnrichmentError};
use crate::domain::prediction::{
    AgePrediction, GenderPrediction, Lookup, NationalizePrediction,
};
use crate::nice_display::NiceDisplay;
use crate::prediction::PredictionRequest;
use crate::worker::Worker;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::{error, info};

impl Worker {
    fn base_url(&self, lookup: Lookup) -> &str {
        match lookup {
            Lookup::Age => &self.enrichment.age_url,
            Lookup::Gender => &self.enrichment.gender_url,
            Lookup::Nationality => &self.enrichment.nationality_url,
        }
    }

    async fn fetch_prediction<T: DeserializeOwned>(
        &self,
        lookup: Lookup,
        name: &str,
    ) -> Result<T, EnrichmentError> {
        PredictionRequest::new(self.base_url(lookup), name)
            .fetch(&self.reqwest_client)
            .await
            .map_err(|reason| {
                error!(
                    lookup = lookup.to_name(),
                    name,
                    error = %reason.message(),
                    "prediction lookup failed"
                );
                EnrichmentError::new(lookup, reason)
            })
    }
}

#[async_trait]
impl EnrichmentCapability for Worker {
    async fn predict_age(&self, name: &str) -> Result<i32, EnrichmentError> {
        let prediction = self
            .fetch_prediction::<AgePrediction>(Lookup::Age, name)
            .await?;
        let age = prediction.age();

        info!(name, matched = prediction.name.as_str(), age, "predicted age");
        Ok(age)
    }

    async fn predict_gender(&self, name: &str) -> Result<String, EnrichmentError> {
        let prediction = self
            .fetch_prediction::<GenderPrediction>(Lookup::Gender, name)
            .await?;
        let gender = prediction.gender();

        info!(
            name,
            matched = prediction.name.as_str(),
            gender = gender.as_str(),
            "predicted gender"
        );
        Ok(gender)
    }

    async fn predict_nationality(&self, name: &str) -> Result<String, EnrichmentError> {
        let prediction = self
            .fetch_prediction::<NationalizePrediction>(Lookup::Nationality, name)
            .await?;

        match prediction.country.first() {
            Some(top) => info!(
                name,
                matched = prediction.name.as_str(),
                nationality = top.country_id.as_str(),
                probability = top.probability,
                "predicted nationality"
            ),
            None => info!(
                name,
                matched = prediction.name.as_str(),
                "no nationality prediction for name"
            ),
        }

        Ok(prediction.top_country())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::enrichment::PredictionError;
    use crate::config::EnrichmentConfig;
    use actix_web::{web, App, HttpResponse, HttpServer};
    use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
    use std::collections::HashMap;
    use std::time::Duration;

    async fn agify(query: web::Query<HashMap<String, String>>) -> HttpResponse {
        HttpResponse::Ok().json(serde_json::json!({ "name": query.get("name"), "age": 30 }))
    }

    async fn genderize(query: web::Query<HashMap<String, String>>) -> HttpResponse {
        HttpResponse::Ok().json(serde_json::json!({
            "name": query.get("name"),
            "gender": "female",
            "probability": 0.98
        }))
    }

    async fn nationalize(query: web::Query<HashMap<String, String>>) -> HttpResponse {
        let country = match query.get("name").map(String::as_str) {
            Some("Xqzt") => serde_json::json!([]),
            _ => serde_json::json!([
                { "country_id": "FI", "probability": 0.2 },
                { "country_id": "SE", "probability": 0.1 }
            ]),
        };
        HttpResponse::Ok().json(serde_json::json!({ "name": query.get("name"), "country": country }))
    }

    fn worker_against(base: &str) -> Worker {
        let options = PgConnectOptions::new().host("127.0.0.1").port(1);

        Worker {
            reqwest_client: reqwest::Client::new(),
            sqlx: PgPoolOptions::new().connect_lazy_with(options),
            enrichment: EnrichmentConfig {
                age_url: format!("{}/agify", base),
                gender_url: format!("{}/genderize", base),
                nationality_url: format!("{}/nationalize", base),
                timeout: Duration::from_secs(5),
            },
        }
    }

    fn spawn_providers() -> String {
        let server = HttpServer::new(|| {
            App::new()
                .route("/agify/", web::get().to(agify))
                .route("/genderize/", web::get().to(genderize))
                .route("/nationalize/", web::get().to(nationalize))
        })
        .workers(1)
        .bind(("127.0.0.1", 0))
        .unwrap();

        let addr = server.addrs()[0];
        actix_web::rt::spawn(server.run());

        format!("http://{}", addr)
    }

    #[actix_web::test]
    async fn predicts_from_each_service() {
        let worker = worker_against(&spawn_providers());

        assert_eq!(worker.predict_age("Anna").await.unwrap(), 30);
        assert_eq!(worker.predict_gender("Anna").await.unwrap(), "female");
        assert_eq!(worker.predict_nationality("Anna").await.unwrap(), "FI");
    }

    #[actix_web::test]
    async fn providers_echo_the_requested_name() {
        let worker = worker_against(&spawn_providers());

        let age: AgePrediction = worker.fetch_prediction(Lookup::Age, "Anna").await.unwrap();
        let gender: GenderPrediction = worker
            .fetch_prediction(Lookup::Gender, "Anna")
            .await
            .unwrap();
        let nationality: NationalizePrediction = worker
            .fetch_prediction(Lookup::Nationality, "Anna")
            .await
            .unwrap();

        assert_eq!(age.name, "Anna");
        assert_eq!(gender.name, "Anna");
        assert_eq!(nationality.name, "Anna");
    }

    #[actix_web::test]
    async fn unknown_nationality_is_not_an_error() {
        let worker = worker_against(&spawn_providers());

        assert_eq!(worker.predict_nationality("Xqzt").await.unwrap(), "");
    }

    #[actix_web::test]
    async fn failures_name_the_lookup() {
        let worker = worker_against("http://127.0.0.1:1");

        let err = worker.predict_gender("Anna").await.unwrap_err();

        assert_eq!(err.lookup, Lookup::Gender);
        assert!(matches!(err.reason, PredictionError::Request(_)));
    }
}
