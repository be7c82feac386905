use crate::capability::enrichment::EnrichmentCapability;
use crate::capability::person::PersonCapability;
use crate::domain::listing::PersonFilter;
use crate::domain::person::{NewPerson, Person, PersonRecord};
use crate::domain::person_id::PersonId;
use crate::nice_display::NiceDisplay;
use crate::person_service::{self, CreateFailure, PersonService};
use actix_web::error::InternalError;
use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse, ResponseError};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{error, warn};
use utoipa::{OpenApi, ToSchema};

#[derive(Serialize, ToSchema)]
struct Detail {
    detail: String,
}

#[derive(Serialize, ToSchema)]
struct Message {
    message: String,
}

impl Message {
    fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}

#[derive(Debug)]
pub enum ApiError {
    Validation(String),
    Service(person_service::Error),
}

impl NiceDisplay for ApiError {
    fn message(&self) -> String {
        match self {
            ApiError::Validation(msg) => msg.clone(),
            ApiError::Service(err) => err.message(),
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl ApiError {
    /// What the client sees. Upstream and database detail stays in the logs.
    fn client_detail(&self) -> String {
        match self {
            ApiError::Validation(msg) => msg.clone(),
            ApiError::Service(person_service::Error::NotFound(id)) => {
                format!("Person {} not found", id)
            }
            ApiError::Service(person_service::Error::CreateFailed(
                CreateFailure::Enrichment(err),
            )) => format!("Could not enrich person: {} lookup failed", err.lookup.to_name()),
            ApiError::Service(person_service::Error::CreateFailed(CreateFailure::Storage(_))) => {
                "Could not add person".to_string()
            }
            ApiError::Service(person_service::Error::Storage(_)) => {
                "Could not access persons".to_string()
            }
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Service(person_service::Error::NotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Service(person_service::Error::CreateFailed(
                CreateFailure::Enrichment(_),
            )) => StatusCode::BAD_GATEWAY,
            ApiError::Service(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            error!(status = status.as_u16(), error = %self.message(), "request failed");
        } else {
            warn!(status = status.as_u16(), error = %self.message(), "request rejected");
        }

        HttpResponse::build(status).json(Detail {
            detail: self.client_detail(),
        })
    }
}

impl From<person_service::Error> for ApiError {
    fn from(err: person_service::Error) -> Self {
        ApiError::Service(err)
    }
}

/// Query string of `GET /persons/`. Paging values that are not integers are ignored.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub name: Option<String>,
    pub gender: Option<String>,
    pub nationality: Option<String>,
}

impl ListQuery {
    fn int(value: &Option<String>) -> Option<i64> {
        value.as_ref().and_then(|v| v.trim().parse().ok())
    }
}

/// Body of `POST /persons/`. Derived fields a client sends are ignored.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateBody {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub surname: String,
    #[serde(default)]
    pub patronymic: Option<String>,
}

/// Body of `PUT /persons/{id}/`. The whole row is replaced by these values.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateBody {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub surname: String,
    #[serde(default)]
    pub patronymic: Option<String>,
    #[serde(default)]
    pub age: i32,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub nationality: Option<String>,
}

fn require(field: &str, value: String) -> Result<String, ApiError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(ApiError::Validation(format!("{} is required", field)))
    } else {
        Ok(trimmed.to_string())
    }
}

impl CreateBody {
    fn into_new_person(self) -> Result<NewPerson, ApiError> {
        Ok(NewPerson {
            name: require("name", self.name)?,
            surname: require("surname", self.surname)?,
            patronymic: self.patronymic.unwrap_or_default().trim().to_string(),
        })
    }
}

impl UpdateBody {
    fn into_record(self) -> Result<PersonRecord, ApiError> {
        if self.age < 0 {
            return Err(ApiError::Validation("age cannot be negative".to_string()));
        }

        Ok(PersonRecord {
            name: require("name", self.name)?,
            surname: require("surname", self.surname)?,
            patronymic: self.patronymic.unwrap_or_default().trim().to_string(),
            age: self.age,
            gender: self.gender.unwrap_or_default(),
            nationality: self.nationality.unwrap_or_default(),
        })
    }
}

fn parse_id(raw: &str) -> Result<PersonId, ApiError> {
    PersonId::from_str(raw).map_err(|_| ApiError::Validation(format!("Invalid id '{}'", raw)))
}

#[utoipa::path(
    get,
    path = "/persons/",
    tag = "persons",
    params(
        ("page" = Option<i64>, Query, description = "Page number, defaults to 1"),
        ("limit" = Option<i64>, Query, description = "Rows per page, defaults to 10"),
        ("name" = Option<String>, Query, description = "Case-insensitive substring of the name"),
        ("gender" = Option<String>, Query, description = "Exact gender"),
        ("nationality" = Option<String>, Query, description = "Exact country code"),
    ),
    responses(
        (status = 200, description = "Matching page of persons", body = [Person]),
        (status = 500, description = "Storage failure", body = Detail),
    )
)]
async fn list_persons<S, E>(
    service: web::Data<PersonService<S, E>>,
    query: web::Query<ListQuery>,
) -> Result<HttpResponse, ApiError>
where
    S: PersonCapability + 'static,
    E: EnrichmentCapability + 'static,
{
    let query = query.into_inner();
    let page = ListQuery::int(&query.page);
    let limit = ListQuery::int(&query.limit);
    let filter = PersonFilter::new(query.name, query.gender, query.nationality);

    let persons = service.list_persons(page, limit, filter).await?;

    Ok(HttpResponse::Ok().json(persons))
}

/// Enriches the person with age, gender and nationality predictions before saving.
#[utoipa::path(
    post,
    path = "/persons/",
    tag = "persons",
    request_body = CreateBody,
    responses(
        (status = 201, description = "Person added", body = Message),
        (status = 400, description = "Malformed body", body = Detail),
        (status = 502, description = "A prediction lookup failed", body = Detail),
        (status = 500, description = "Storage failure", body = Detail),
    )
)]
async fn create_person<S, E>(
    service: web::Data<PersonService<S, E>>,
    body: web::Json<CreateBody>,
) -> Result<HttpResponse, ApiError>
where
    S: PersonCapability + 'static,
    E: EnrichmentCapability + 'static,
{
    let new_person = body.into_inner().into_new_person()?;

    service.create_person(new_person).await?;

    Ok(HttpResponse::Created().json(Message::new("Person added")))
}

#[utoipa::path(
    get,
    path = "/persons/{id}/",
    tag = "persons",
    params(("id" = i32, Path, description = "Person id")),
    responses(
        (status = 200, description = "The person", body = Person),
        (status = 400, description = "Invalid id", body = Detail),
        (status = 404, description = "No such person", body = Detail),
    )
)]
async fn get_person<S, E>(
    service: web::Data<PersonService<S, E>>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError>
where
    S: PersonCapability + 'static,
    E: EnrichmentCapability + 'static,
{
    let id = parse_id(&path)?;

    let person = service.get_person(id).await?;

    Ok(HttpResponse::Ok().json(person))
}

#[utoipa::path(
    put,
    path = "/persons/{id}/",
    tag = "persons",
    params(("id" = i32, Path, description = "Person id")),
    request_body = UpdateBody,
    responses(
        (status = 200, description = "Person updated", body = Message),
        (status = 400, description = "Invalid id or body", body = Detail),
        (status = 404, description = "No such person", body = Detail),
        (status = 500, description = "Storage failure", body = Detail),
    )
)]
async fn update_person<S, E>(
    service: web::Data<PersonService<S, E>>,
    path: web::Path<String>,
    body: web::Json<UpdateBody>,
) -> Result<HttpResponse, ApiError>
where
    S: PersonCapability + 'static,
    E: EnrichmentCapability + 'static,
{
    let id = parse_id(&path)?;
    let record = body.into_inner().into_record()?;

    service.update_person(id, record).await?;

    Ok(HttpResponse::Ok().json(Message::new("Person updated")))
}

#[utoipa::path(
    delete,
    path = "/persons/{id}/",
    tag = "persons",
    params(("id" = i32, Path, description = "Person id")),
    responses(
        (status = 200, description = "Person deleted", body = Message),
        (status = 400, description = "Invalid id", body = Detail),
        (status = 404, description = "No such person", body = Detail),
        (status = 500, description = "Storage failure", body = Detail),
    )
)]
async fn delete_person<S, E>(
    service: web::Data<PersonService<S, E>>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError>
where
    S: PersonCapability + 'static,
    E: EnrichmentCapability + 'static,
{
    let id = parse_id(&path)?;

    service.delete_person(id).await?;

    Ok(HttpResponse::Ok().json(Message::new("Person deleted")))
}

async fn health() -> HttpResponse {
    HttpResponse::Ok().json(Message::new("ok"))
}

#[derive(OpenApi)]
#[openapi(
    info(title = "persons", description = "Person records enriched from name predictions"),
    paths(list_persons, create_person, get_person, update_person, delete_person),
    components(schemas(Person, CreateBody, UpdateBody, Detail, Message))
)]
struct ApiDoc;

async fn openapi_json() -> HttpResponse {
    HttpResponse::Ok().json(ApiDoc::openapi())
}

/// Mounts the routes. The `PersonService<S, E>` itself is registered as app data by the caller.
pub fn configure<S, E>(cfg: &mut web::ServiceConfig)
where
    S: PersonCapability + 'static,
    E: EnrichmentCapability + 'static,
{
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
        InternalError::from_response(
            err.to_string(),
            ApiError::Validation(format!("Invalid request body: {}", err)).error_response(),
        )
        .into()
    }))
    .app_data(web::QueryConfig::default().error_handler(|err, _req| {
        InternalError::from_response(
            err.to_string(),
            ApiError::Validation(format!("Invalid query string: {}", err)).error_response(),
        )
        .into()
    }))
    .route("/health", web::get().to(health))
    .route("/swagger/openapi.json", web::get().to(openapi_json))
    .service(
        web::resource("/persons/")
            .route(web::get().to(list_persons::<S, E>))
            .route(web::post().to(create_person::<S, E>)),
    )
    .service(
        web::resource("/persons/{id}/")
            .route(web::get().to(get_person::<S, E>))
            .route(web::put().to(update_person::<S, E>))
            .route(web::delete().to(delete_person::<S, E>)),
    );
}
