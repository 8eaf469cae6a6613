mod config;
mod error;
mod model;
mod schema;
mod store;

use actix_cors::Cors;
use actix_web::middleware::Logger;
use actix_web::error::EitherExtractError;
use actix_web::{get, post, Either, HttpMessage, HttpRequest, HttpResponse, Responder};
use actix_web::{web, App, HttpServer};
use dotenv::dotenv;
use env_logger;
use sqlx::sqlite::SqlitePool;

use crate::config::Config;
use crate::error::AppError;
use crate::model::*;
use crate::store::Upserted;

#[get("/")]
async fn index() -> impl Responder {
    "Electricity log is running"
}

#[get("/electricity")]
async fn get_records(data: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let records = store::list(&data.db).await?;

    let json_response = serde_json::json!({
        "rows": records.len(),
        "records": records
    });
    Ok(HttpResponse::Ok().json(json_response))
}

#[get("/electricity/{id}")]
async fn get_record_by_id(
    data: web::Data<AppState>,
    path: web::Path<(i64,)>,
) -> Result<HttpResponse, AppError> {
    let record_id = path.into_inner().0;

    match store::find_by_id(&data.db, record_id).await? {
        Some(record) => Ok(HttpResponse::Ok().json(record)),
        None => Err(AppError::NotFound(record_id)),
    }
}

type Submission = Either<web::Json<PostElectricity>, web::Form<PostElectricity>>;

/// Accepts the reading form either as JSON or urlencoded.
#[post("/electricity")]
async fn post_record(
    data: web::Data<AppState>,
    req: HttpRequest,
    request: Result<Submission, EitherExtractError<actix_web::Error, actix_web::Error>>,
) -> Result<HttpResponse, AppError> {
    let request = match request {
        Ok(Either::Left(json)) => json.into_inner(),
        Ok(Either::Right(form)) => form.into_inner(),
        Err(err) => return Err(rejected_submission(&req, err)),
    };
    let input = ElectricityInput::try_from(request)?;

    let response = match store::upsert(&data.db, &input).await? {
        Upserted::Created(id) => HttpResponse::Created().json(SubmitResponse {
            success: true,
            message: "Record created".to_string(),
            id: Some(id),
        }),
        Upserted::Updated(id) => HttpResponse::Ok().json(SubmitResponse {
            success: true,
            message: "Record updated".to_string(),
            id: Some(id),
        }),
    };
    Ok(response)
}

/// Reports the extractor error that matches the request's content type.
fn rejected_submission(
    req: &HttpRequest,
    err: EitherExtractError<actix_web::Error, actix_web::Error>,
) -> AppError {
    let err = match err {
        EitherExtractError::Bytes(err) => err,
        EitherExtractError::Extract(_, form_err)
            if req
                .content_type()
                .eq_ignore_ascii_case("application/x-www-form-urlencoded") =>
        {
            form_err
        }
        EitherExtractError::Extract(json_err, _) => json_err,
    };
    AppError::Validation(err.to_string())
}

pub struct AppState {
    db: SqlitePool,
}

fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(index)
        .service(get_records)
        .service(get_record_by_id)
        .service(post_record);
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            log::error!("🔥 Invalid configuration: {}", err);
            std::process::exit(1);
        }
    };

    let pool = match schema::connect(&config).await {
        Ok(pool) => {
            log::info!("✅ Connection to the database is successful!");
            pool
        }
        Err(err) => {
            log::error!("🔥 Failed to connect to the database: {:?}", err);
            std::process::exit(1);
        }
    };

    if let Err(err) = schema::init(&pool).await {
        log::error!("🔥 Failed to create the electricity table: {:?}", err);
        std::process::exit(1);
    }

    log::info!("🚀 Server started on {}:{}", config.host, config.port);

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(AppState { db: pool.clone() }))
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_header()
                    .allow_any_method()
                    .supports_credentials(),
            )
            .wrap(Logger::default())
            .configure(routes)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
