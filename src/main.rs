use std::time::Duration;

use actix_web::error::JsonPayloadError;
use actix_web::{middleware::Logger, web, App, HttpServer};
use anyhow::{Context, Result};
use dotenv::dotenv;
use sqlx::{Pool, Sqlite};

use crate::config::app_config::AppConfig;
use crate::errors::AppError;
use crate::logger::init_logger;
use crate::services::csid_service::CsidService;
use crate::services::operation_service::OperationService;
use crate::services::store_service::{spawn_purge_task, WorkbookStore};

mod app;
mod config;
mod errors;
mod handlers;
mod logger;
mod models;
mod services;
#[cfg(test)]
mod tests;

/// Cada cuánto se revisan las sesiones vencidas
const PURGE_INTERVAL: Duration = Duration::from_secs(60);

async fn setup_database(config: &AppConfig) -> Result<Pool<Sqlite>> {
    // Crear carpeta de datos (./data por defecto)
    std::fs::create_dir_all(&config.data_dir)
        .with_context(|| format!("No se pudo crear directorio {:?}", config.data_dir))?;

    let db_url = config.database_url();
    log::info!("Conectando a SQLite en {}", db_url);

    let db_pool = Pool::<Sqlite>::connect(&db_url)
        .await
        .context("No se pudo conectar a la base de datos SQLite.")?;

    Ok(db_pool)
}

/// Body JSON con el mismo límite que los uploads; errores con el formato de siempre: {"error": "..."}
pub fn json_config(limit: usize) -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(limit)
        .error_handler(|err, _req| {
            let app_err = match err {
                JsonPayloadError::Overflow { limit }
                | JsonPayloadError::OverflowKnownLength { limit, .. } => {
                    AppError::PayloadTooLarge(limit)
                }
                other => AppError::bad_request(format!("Invalid JSON: {}", other)),
            };
            app_err.into()
        })
}

#[actix_web::main]
async fn main() -> Result<()> {
    dotenv().ok(); // Cargar .env al inicio
    init_logger();

    let config = AppConfig::from_env()?;
    log::debug!("Configuración: {:?}", config);

    let db_pool = setup_database(&config).await?;

    // OperationService
    let operation_service = OperationService::new(db_pool.clone());
    operation_service
        .run_migrations()
        .await
        .context("Fallo en migraciones de 'operations'")?;

    // Workbooks en memoria, por sesión
    let store = WorkbookStore::new();
    spawn_purge_task(store.clone(), config.session_ttl(), PURGE_INTERVAL);

    let csid_service = CsidService::new(store.clone());

    let bind = (config.host.clone(), config.port);
    let workers = config.workers.max(1);

    log::info!("Levantando servidor en {}:{}", bind.0, bind.1);
    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(json_config(config.max_upload_bytes))
            .app_data(web::Data::new(config.clone()))
            .app_data(web::Data::new(store.clone()))
            .app_data(web::Data::new(csid_service.clone()))
            .app_data(web::Data::new(operation_service.clone()))
            .configure(app::init_app)
    })
    .workers(workers)
    .bind(bind)?
    .run()
    .await?;

    Ok(())
}
