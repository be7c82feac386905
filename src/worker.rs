mod enrichment_capability;
mod person_capability;

use crate::config::{Config, EnrichmentConfig};
use crate::nice_display::NiceDisplay;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::Postgres;
use std::time::Duration;

#[derive(Clone, Debug)]
pub struct Worker {
    pub reqwest_client: reqwest::Client,
    pub sqlx: sqlx::Pool<Postgres>,
    pub enrichment: EnrichmentConfig,
}

#[derive(Debug)]
pub enum InitError {
    HttpClient(reqwest::Error),
    PoolConnection(sqlx::Error),
    PoolAcquire(sqlx::Error),
}

impl NiceDisplay for InitError {
    fn message(&self) -> String {
        match self {
            InitError::HttpClient(err) => format!("Error building the http client\n{}", err),
            InitError::PoolConnection(err) => {
                format!("Error connecting to the database pool\n{}", err)
            }
            InitError::PoolAcquire(err) => {
                format!(
                    "Error acquiring a database connection from the pool\n{}",
                    err
                )
            }
        }
    }
}

impl Worker {
    pub async fn new(config: &Config) -> Result<Self, InitError> {
        let sqlx_pool = {
            let options = PgConnectOptions::new()
                .host(&config.db.host)
                .port(config.db.port)
                .username(&config.db.user)
                .password(&config.db.password)
                .database(&config.db.name)
                .ssl_mode(config.db.ssl_mode);

            PgPoolOptions::new()
                .min_connections(1)
                .idle_timeout(Duration::from_secs(600))
                .max_connections(config.db.max_connections)
                .test_before_acquire(true)
                .connect_with(options)
                .await
                .map_err(InitError::PoolConnection)?
        };

        let worker = Worker {
            reqwest_client: reqwest::Client::builder()
                .timeout(config.enrichment.timeout)
                .build()
                .map_err(InitError::HttpClient)?,
            sqlx: sqlx_pool,
            enrichment: config.enrichment.clone(),
        };

        worker
            .warm_up_db_connection()
            .await
            .map_err(InitError::PoolAcquire)?;

        Ok(worker)
    }

    pub async fn warm_up_db_connection(&self) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT 1").execute(&self.sqlx).await?;
        Ok(())
    }
}
