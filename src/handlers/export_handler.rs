//! handlers/export_handler.rs
//! POST /export: devuelve la tabla de resultados como .xlsx

use actix_web::{web, HttpResponse};
use anyhow::anyhow;
use serde_json::json;

use crate::errors::AppError;
use crate::handlers::session::Session;
use crate::models::csid_model::ExportRequest;
use crate::models::operation_model::{NewOperation, OperationType};
use crate::services::export_service::{build_workbook, export_filename, to_rows, XLSX_CONTENT_TYPE};
use crate::services::operation_service::OperationService;

pub async fn export_endpoint(
    session: Session,
    op_service: web::Data<OperationService>,
    body: web::Json<ExportRequest>,
) -> Result<HttpResponse, AppError> {
    let data = body.into_inner().data;
    if data.is_empty() {
        return Err(AppError::bad_request("No data to export"));
    }

    let rows = to_rows(data).map_err(|e| AppError::bad_request(e.to_string()))?;
    let row_count = rows.len();

    let built = tokio::task::spawn_blocking(move || build_workbook(&rows))
        .await
        .map_err(|e| AppError::Internal(anyhow!("export task failed: {}", e)))?;

    let op = NewOperation::done(OperationType::Export, &session.id)
        .with_metadata(json!({ "rows": row_count }));

    let xlsx = match built {
        Ok(bytes) => bytes,
        Err(e) => {
            let err = AppError::Export(format!("{:#}", e));
            op_service.record(op.failed(&err)).await;
            return Err(err);
        }
    };
    op_service.record(op).await;

    let filename = export_filename();
    log::info!("Export {} ({} filas, {} bytes)", filename, row_count, xlsx.len());

    Ok(session
        .attach(&mut HttpResponse::Ok())
        .append_header(("Content-Type", XLSX_CONTENT_TYPE))
        .append_header((
            "Content-Disposition",
            format!("attachment; filename=\"{}\"", filename),
        ))
        .body(xlsx))
}
