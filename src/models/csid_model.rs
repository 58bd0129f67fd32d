//! models/csid_model.rs
//! Requests/responses de Tracking CO.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AddCsidRequest {
    #[serde(default)]
    pub csid: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AddBulkCsidsRequest {
    /// Texto libre: CSIDs separados por espacios, comas, ';' o saltos de línea
    #[serde(default)]
    pub csids: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RefreshCsidsRequest {
    /// Strings o números, tal como quedaron en la tabla
    #[serde(default)]
    pub csids: Vec<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExportRequest {
    #[serde(default)]
    pub data: Vec<Value>,
}

/// Una fila de la tabla de resultados que arma el frontend
pub type ExportRow = Map<String, Value>;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CsidLookup {
    pub csid: String,
    pub found_sheets: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AddCsidResponse {
    pub success: bool,
    pub csid: String,
    pub found_sheets: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct BulkCsidsResponse {
    pub success: bool,
    pub results: Vec<CsidLookup>,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct RefreshCsidsResponse {
    pub success: bool,
    pub results: Vec<CsidLookup>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UploadResponse {
    pub success: bool,
    pub message: String,
    pub sheets: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SimpleResponse {
    pub success: bool,
    pub message: String,
}
