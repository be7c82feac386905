mod capability;
mod config;
mod domain;
mod http;
mod logging;
mod nice_display;
mod person_service;
mod prediction;
#[cfg(test)]
mod test_support;
mod worker;

use crate::config::Config;
use crate::nice_display::NiceDisplay;
use crate::person_service::PersonService;
use crate::worker::Worker;
use actix_web::{middleware, web, App, HttpServer};
use clap::Parser;
use tracing::info;

#[derive(Debug, Parser, Clone)]
#[clap(
    version = "0.1",
    about = "Person records enriched with age, gender and nationality predictions"
)]
enum Cmd {
    /// Serve the persons HTTP api
    Run,
    /// Check that the database is reachable with the current configuration
    CheckDb,
}

enum Error {
    EnvVars(dotenv::Error),
    Config(config::ConfigError),
    Logging(logging::Error),
    WorkerInit(worker::InitError),
    WebServer(WebServerError),
}

impl NiceDisplay for Error {
    fn message(&self) -> String {
        match self {
            Error::EnvVars(err) => {
                format!("Error loading environment variables: {}", err)
            }
            Error::Config(err) => format!("Invalid configuration\n{}", err.message()),
            Error::Logging(err) => err.message(),
            Error::WorkerInit(err) => {
                format!("Worker initialization error\n{}", err.message())
            }
            Error::WebServer(err) => err.message(),
        }
    }
}

#[actix_web::main]
async fn main() -> Result<(), String> {
    nice_main()
        .await
        .map_err(|err| err.to_nice_error().to_string())
}

async fn nice_main() -> Result<(), Error> {
    match dotenv::dotenv() {
        Ok(_) => {}
        Err(err) if err.not_found() => {}
        Err(err) => return Err(Error::EnvVars(err)),
    }

    let cmd = Cmd::parse();

    let config = Config::load().map_err(Error::Config)?;

    match cmd {
        Cmd::Run => {
            let _log_guard = logging::init(&config.log).map_err(Error::Logging)?;
            info!(environment = config.environment.to_name(), "starting persons");

            let worker = Worker::new(&config).await.map_err(Error::WorkerInit)?;

            run_server(&config, worker).await.map_err(Error::WebServer)
        }
        Cmd::CheckDb => {
            Worker::new(&config).await.map_err(Error::WorkerInit)?;
            println!(
                "Connected to {}:{}/{}",
                config.db.host, config.db.port, config.db.name
            );
            Ok(())
        }
    }
}

enum WebServerError {
    Bind(std::io::Error),
    Run(std::io::Error),
}

impl NiceDisplay for WebServerError {
    fn message(&self) -> String {
        match self {
            WebServerError::Run(err) => format!("Error running server: {}", err),
            WebServerError::Bind(err) => {
                format!("Error binding server: {}", err)
            }
        }
    }
}

async fn run_server(config: &Config, worker: Worker) -> Result<(), WebServerError> {
    let service = web::Data::new(PersonService::new(
        worker.clone(),
        worker,
        config.enrichment.timeout,
    ));

    info!(
        host = config.server.host.as_str(),
        port = config.server.port,
        "listening"
    );

    HttpServer::new(move || {
        App::new()
            .wrap(middleware::Logger::default())
            .app_data(service.clone())
            .configure(http::configure::<Worker, Worker>)
    })
    .bind((config.server.host.as_str(), config.server.port))
    .map_err(WebServerError::Bind)?
    .run()
    .await
    .map_err(WebServerError::Run)
}
