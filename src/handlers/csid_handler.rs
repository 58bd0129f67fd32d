//! handlers/csid_handler.rs
//! Endpoints de Tracking CO sobre el workbook de la sesión.

use actix_web::{web, HttpResponse};
use serde_json::json;

use crate::errors::AppError;
use crate::handlers::session::Session;
use crate::models::csid_model::{
    AddBulkCsidsRequest, AddCsidRequest, AddCsidResponse, BulkCsidsResponse, RefreshCsidsRequest,
    RefreshCsidsResponse, SimpleResponse,
};
use crate::models::operation_model::{NewOperation, OperationType};
use crate::services::csid_service::{parse_bulk_csids, value_text, CsidService};
use crate::services::operation_service::OperationService;
use crate::services::store_service::WorkbookStore;

/// POST /add_csid
pub async fn add_csid_endpoint(
    session: Session,
    csid_service: web::Data<CsidService>,
    op_service: web::Data<OperationService>,
    body: web::Json<AddCsidRequest>,
) -> Result<HttpResponse, AppError> {
    let op = NewOperation::done(OperationType::AddCsid, &session.id);
    let csid = body.csid.trim().to_string();
    if csid.is_empty() {
        let err = AppError::bad_request("CSID cannot be empty");
        return Err(op_service.record_failure(op, err).await);
    }

    let lookup = csid_service.lookup(&session.id, &csid).await;
    op_service
        .record(op.with_metadata(
            json!({ "csid": lookup.csid, "found_sheets": lookup.found_sheets }),
        ))
        .await;

    Ok(session.attach(&mut HttpResponse::Ok()).json(AddCsidResponse {
        success: true,
        csid: lookup.csid,
        found_sheets: lookup.found_sheets,
    }))
}

/// POST /add_bulk_csids
pub async fn add_bulk_csids_endpoint(
    session: Session,
    csid_service: web::Data<CsidService>,
    op_service: web::Data<OperationService>,
    body: web::Json<AddBulkCsidsRequest>,
) -> Result<HttpResponse, AppError> {
    let op = NewOperation::done(OperationType::BulkCsids, &session.id);
    let text = body.csids.trim();
    if text.is_empty() {
        let err = AppError::bad_request("No CSIDs provided");
        return Err(op_service.record_failure(op, err).await);
    }

    let csids = parse_bulk_csids(text);
    if csids.is_empty() {
        let err = AppError::bad_request("No valid CSIDs found");
        return Err(op_service.record_failure(op, err).await);
    }

    let results = csid_service.lookup_many(&session.id, &csids).await;
    op_service
        .record(op.with_metadata(json!({ "count": results.len() })))
        .await;

    Ok(session.attach(&mut HttpResponse::Ok()).json(BulkCsidsResponse {
        success: true,
        count: results.len(),
        results,
    }))
}

/// POST /refresh_csids
pub async fn refresh_csids_endpoint(
    session: Session,
    csid_service: web::Data<CsidService>,
    op_service: web::Data<OperationService>,
    body: web::Json<RefreshCsidsRequest>,
) -> Result<HttpResponse, AppError> {
    let op = NewOperation::done(OperationType::RefreshCsids, &session.id);
    if body.csids.is_empty() {
        let err = AppError::bad_request("No CSIDs to refresh");
        return Err(op_service.record_failure(op, err).await);
    }

    // el frontend puede mandar números; se buscan como texto
    let csids: Vec<String> = body.csids.iter().map(value_text).collect();
    let results = csid_service.lookup_many(&session.id, &csids).await;
    op_service
        .record(op.with_metadata(json!({ "count": results.len() })))
        .await;

    Ok(session
        .attach(&mut HttpResponse::Ok())
        .json(RefreshCsidsResponse {
            success: true,
            results,
        }))
}

/// GET /status
pub async fn status_endpoint(session: Session, store: web::Data<WorkbookStore>) -> HttpResponse {
    let status = store.status(&session.id).await;
    session.attach(&mut HttpResponse::Ok()).json(status)
}

/// POST /reset_file
pub async fn reset_file_endpoint(
    session: Session,
    store: web::Data<WorkbookStore>,
    op_service: web::Data<OperationService>,
) -> HttpResponse {
    let removed = store.remove(&session.id).await;
    op_service
        .record(
            NewOperation::done(OperationType::Reset, &session.id)
                .with_metadata(json!({ "removed": removed })),
        )
        .await;

    session.attach(&mut HttpResponse::Ok()).json(SimpleResponse {
        success: true,
        message: "File data reset successfully".to_string(),
    })
}
