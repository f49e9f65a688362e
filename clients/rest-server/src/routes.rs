use actix_web::{
    delete, error, get,
    http::header::ContentType,
    post, put,
    web::{self, Data},
    HttpRequest, HttpResponse, Responder,
};
use database::{
    database::table::row::UpdatePersonData,
    model::person::{Fields, PersonData},
    store::{ErrorBody, PeopleStore, StoreError},
};
use serde::Serialize;

/// Body of every 400 answered by a route that accepts a request body or an id
#[derive(Serialize)]
struct ErrorEnvelope<E: Serialize> {
    error: E,
}

fn bad_request<E: Serialize>(error: E) -> HttpResponse {
    HttpResponse::BadRequest().json(ErrorEnvelope { error })
}

/// Liveness check
#[get("/")]
async fn hello_world() -> impl Responder {
    HttpResponse::Ok()
        .content_type(ContentType::plaintext())
        .body("hello world")
}

/// INDEX - every person, the error is sent as is (not wrapped) when the store fails
#[get("/people")]
async fn index(store: Data<dyn PeopleStore>) -> HttpResponse {
    match store.find_all().await {
        Ok(people) => HttpResponse::Ok().json(people),
        Err(error) => HttpResponse::BadRequest().json(error),
    }
}

/// CREATE - a person from the JSON body
#[post("/people")]
async fn create(store: Data<dyn PeopleStore>, body: web::Json<Fields>) -> HttpResponse {
    let created = match PersonData::from_fields(body.into_inner()) {
        Ok(person_data) => store.insert(person_data).await,
        Err(error) => Err(StoreError::from(error)),
    };

    match created {
        Ok(person) => HttpResponse::Ok().json(person),
        Err(error) => bad_request(error),
    }
}

/// UPDATE - replaces the given fields, answers `null` when the id matches nobody
#[put("/people/{id}")]
async fn update(
    store: Data<dyn PeopleStore>,
    id: web::Path<String>,
    body: web::Json<Fields>,
) -> HttpResponse {
    let updated = match UpdatePersonData::from_fields(body.into_inner()) {
        Ok(update) => store.find_by_id_and_update(&id, update).await,
        Err(error) => Err(StoreError::from(error)),
    };

    match updated {
        Ok(person) => HttpResponse::Ok().json(person),
        Err(error) => bad_request(error),
    }
}

/// DESTROY - answers with the removed person, `null` when the id matches nobody
#[delete("/people/{id}")]
async fn destroy(store: Data<dyn PeopleStore>, id: web::Path<String>) -> HttpResponse {
    match store.find_by_id_and_delete(&id).await {
        Ok(person) => HttpResponse::Ok().json(person),
        Err(error) => bad_request(error),
    }
}

/// Bodies that are not a JSON object never reach a handler, they get the same 400 shape
fn json_error_handler(err: error::JsonPayloadError, _req: &HttpRequest) -> error::Error {
    let body = ErrorBody {
        name: "SyntaxError",
        message: err.to_string(),
        kind: None,
        path: None,
        value: None,
    };

    error::InternalError::from_response(err, bad_request(body)).into()
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .service(hello_world)
        .service(index)
        .service(create)
        .service(update)
        .service(destroy);
}
