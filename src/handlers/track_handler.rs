//! handlers/track_handler.rs
//! Tracking ODP / Tracking IP: cada request trae su propio Excel.

use actix_multipart::Multipart;
use actix_web::{web, HttpResponse};
use anyhow::anyhow;
use serde_json::json;

use crate::config::app_config::AppConfig;
use crate::errors::AppError;
use crate::handlers::multipart_form::{read_form, UploadedFile};
use crate::handlers::session::Session;
use crate::models::operation_model::{NewOperation, OperationType};
use crate::models::track_model::{IpMatch, OdpMatch};
use crate::services::operation_service::OperationService;
use crate::services::track_service::{parse_ip_csids, search_ip, search_odp};
use crate::services::workbook_service::{read_workbook, Sheet};

/// Corre `search` sobre las hojas del archivo en un hilo bloqueante.
async fn with_sheets<T, F>(file: UploadedFile, search: F) -> Result<T, AppError>
where
    T: Send + 'static,
    F: FnOnce(&[Sheet]) -> T + Send + 'static,
{
    tokio::task::spawn_blocking(move || {
        read_workbook(file.temp.path()).map(|sheets| search(&sheets))
    })
    .await
    .map_err(|e| AppError::Internal(anyhow!("search task failed: {}", e)))?
    .map_err(|e| AppError::WorkbookLoad(format!("{:#}", e)))
}

/// POST /search-odp (multipart: odp_id, file)
pub async fn search_odp_endpoint(
    session: Session,
    config: web::Data<AppConfig>,
    op_service: web::Data<OperationService>,
    payload: Multipart,
) -> Result<HttpResponse, AppError> {
    let op = NewOperation::done(OperationType::SearchOdp, &session.id);

    match run_odp_search(payload, &config).await {
        Ok((odp_id, results)) => {
            op_service
                .record(op.with_metadata(json!({ "odp_id": odp_id, "matches": results.len() })))
                .await;
            Ok(session.attach(&mut HttpResponse::Ok()).json(results))
        }
        Err(e) => Err(op_service.record_failure(op, e).await),
    }
}

async fn run_odp_search(
    payload: Multipart,
    config: &AppConfig,
) -> Result<(String, Vec<OdpMatch>), AppError> {
    let mut form = read_form(payload, config.max_upload_bytes).await?;
    let odp_id = form
        .field("odp_id")
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .ok_or_else(|| AppError::bad_request("Please provide an ODP ID"))?;
    let file = form.require_file()?;

    let excluded = config.excluded_sheet.clone();
    let wanted = odp_id.clone();
    let results = with_sheets(file, move |sheets| search_odp(sheets, &wanted, &excluded)).await?;
    Ok((odp_id, results))
}

/// POST /search-ip (multipart: csid, file)
pub async fn search_ip_endpoint(
    session: Session,
    config: web::Data<AppConfig>,
    op_service: web::Data<OperationService>,
    payload: Multipart,
) -> Result<HttpResponse, AppError> {
    let op = NewOperation::done(OperationType::SearchIp, &session.id);

    match run_ip_search(payload, &config).await {
        Ok((requested, results)) => {
            let not_found = results.iter().filter(|r| r.is_not_found()).count();
            op_service
                .record(op.with_metadata(json!({
                    "requested": requested,
                    "not_found": not_found,
                })))
                .await;
            Ok(session.attach(&mut HttpResponse::Ok()).json(results))
        }
        Err(e) => Err(op_service.record_failure(op, e).await),
    }
}

async fn run_ip_search(
    payload: Multipart,
    config: &AppConfig,
) -> Result<(usize, Vec<IpMatch>), AppError> {
    let mut form = read_form(payload, config.max_upload_bytes).await?;
    let csids = parse_ip_csids(form.field("csid").unwrap_or_default());
    if csids.is_empty() {
        return Err(AppError::bad_request("Please provide at least one CSID"));
    }
    let file = form.require_file()?;

    let excluded = config.excluded_sheet.clone();
    let requested = csids.len();
    let results = with_sheets(file, move |sheets| search_ip(sheets, &csids, &excluded)).await?;
    Ok((requested, results))
}
