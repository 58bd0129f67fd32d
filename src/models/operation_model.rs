use serde::{Deserialize, Serialize};

/// Registro de actividad (upload, búsqueda, export...)
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct OperationRecord {
    pub id: String,
    pub operation_type: String,
    pub status: String, // "done", "failed"
    pub error_message: Option<String>,
    pub session_id: Option<String>,
    pub metadata: Option<String>, // JSON adicional
    pub created_at: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationType {
    Upload,
    AddCsid,
    BulkCsids,
    RefreshCsids,
    Export,
    SearchOdp,
    SearchIp,
    Reset,
}

impl OperationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationType::Upload => "upload",
            OperationType::AddCsid => "add_csid",
            OperationType::BulkCsids => "add_bulk_csids",
            OperationType::RefreshCsids => "refresh_csids",
            OperationType::Export => "export",
            OperationType::SearchOdp => "search_odp",
            OperationType::SearchIp => "search_ip",
            OperationType::Reset => "reset_file",
        }
    }
}

/// Lo que un handler quiere dejar registrado
#[derive(Debug, Clone)]
pub struct NewOperation {
    pub operation_type: OperationType,
    pub session_id: Option<String>,
    pub error_message: Option<String>,
    pub metadata: Option<serde_json::Value>,
}

impl NewOperation {
    pub fn done(operation_type: OperationType, session_id: &str) -> Self {
        Self {
            operation_type,
            session_id: Some(session_id.to_string()),
            error_message: None,
            metadata: None,
        }
    }

    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn failed(mut self, error: impl ToString) -> Self {
        self.error_message = Some(error.to_string());
        self
    }

    pub fn status(&self) -> &'static str {
        if self.error_message.is_some() {
            "failed"
        } else {
            "done"
        }
    }
}

/// Para listar operaciones con paginación
#[derive(Debug, Clone, Serialize)]
pub struct ListOperationsResponse {
    pub total: u64,
    pub page: u64,
    pub page_size: u64,
    pub items: Vec<OperationRecord>,
}
