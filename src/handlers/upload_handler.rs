//! handlers/upload_handler.rs
//! POST /upload: carga el Excel de la sesión (Tracking CO).

use actix_multipart::Multipart;
use actix_web::{web, HttpResponse};
use anyhow::anyhow;
use chrono::{Local, Utc};
use serde_json::json;

use crate::config::app_config::AppConfig;
use crate::errors::AppError;
use crate::handlers::multipart_form::{read_form, UploadedFile};
use crate::handlers::session::Session;
use crate::models::csid_model::UploadResponse;
use crate::models::operation_model::{NewOperation, OperationType};
use crate::models::workbook_model::{LoadedWorkbook, SheetColumn};
use crate::services::operation_service::OperationService;
use crate::services::store_service::WorkbookStore;
use crate::services::workbook_service::{is_excel_filename, load_csid_columns, secure_filename};

pub async fn upload_endpoint(
    session: Session,
    config: web::Data<AppConfig>,
    store: web::Data<WorkbookStore>,
    op_service: web::Data<OperationService>,
    payload: Multipart,
) -> Result<HttpResponse, AppError> {
    let op = NewOperation::done(OperationType::Upload, &session.id);

    match load_upload(payload, config.max_upload_bytes).await {
        Ok(workbook) => {
            let sheets = workbook.sheet_names();
            log::info!(
                "Workbook '{}' cargado para sesión {} ({} hojas)",
                workbook.filename,
                session.id,
                sheets.len()
            );
            op_service
                .record(op.with_metadata(json!({
                    "filename": workbook.filename,
                    "sheets": sheets,
                })))
                .await;
            store.put(&session.id, workbook).await;

            Ok(session.attach(&mut HttpResponse::Ok()).json(UploadResponse {
                success: true,
                message: format!("Loaded data from {} sheets", sheets.len()),
                sheets,
            }))
        }
        Err(e) => Err(op_service.record_failure(op, e).await),
    }
}

async fn load_upload(payload: Multipart, max_bytes: usize) -> Result<LoadedWorkbook, AppError> {
    let mut form = read_form(payload, max_bytes).await?;
    let file = form.require_file()?;

    if file.filename.is_empty() {
        return Err(AppError::bad_request("No file selected"));
    }
    if !is_excel_filename(&file.filename) {
        return Err(AppError::bad_request(
            "Please upload an Excel file (.xlsx or .xls)",
        ));
    }

    let filename = secure_filename(&file.filename);
    let sheets = parse_in_background(file).await?;

    Ok(LoadedWorkbook {
        filename,
        upload_time: Local::now()
            .naive_local()
            .format("%Y-%m-%dT%H:%M:%S%.6f")
            .to_string(),
        loaded_at: Utc::now(),
        sheets,
    })
}

async fn parse_in_background(file: UploadedFile) -> Result<Vec<SheetColumn>, AppError> {
    log::debug!("Parseando '{}' ({} bytes)", file.filename, file.size);

    tokio::task::spawn_blocking(move || load_csid_columns(file.temp.path()))
        .await
        .map_err(|e| AppError::Internal(anyhow!("parse task failed: {}", e)))?
        .map_err(|e| AppError::WorkbookLoad(format!("{:#}", e)))
}
