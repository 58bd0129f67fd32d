//! models/workbook_model.rs
//! Workbook cargado por sesión (columna D de cada hoja).

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Valores de la columna D de una hoja, sin la fila de encabezado.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetColumn {
    pub name: String,
    pub values: Vec<String>,
}

impl SheetColumn {
    pub fn contains(&self, value: &str) -> bool {
        self.values.iter().any(|v| v == value)
    }
}

#[derive(Debug, Clone)]
pub struct LoadedWorkbook {
    pub filename: String,
    /// ISO-8601 en hora local, tal como se muestra en /status
    pub upload_time: String,
    pub loaded_at: DateTime<Utc>,
    pub sheets: Vec<SheetColumn>,
}

impl LoadedWorkbook {
    pub fn sheet_names(&self) -> Vec<String> {
        self.sheets.iter().map(|s| s.name.clone()).collect()
    }
}

/// Respuesta de GET /status
#[derive(Debug, Clone, Serialize)]
pub struct WorkbookStatus {
    pub loaded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sheets: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upload_time: Option<String>,
}

impl WorkbookStatus {
    pub fn not_loaded() -> Self {
        Self {
            loaded: false,
            filename: None,
            sheets: None,
            upload_time: None,
        }
    }
}

impl From<&LoadedWorkbook> for WorkbookStatus {
    fn from(wb: &LoadedWorkbook) -> Self {
        Self {
            loaded: true,
            filename: Some(wb.filename.clone()),
            sheets: Some(wb.sheet_names()),
            upload_time: Some(wb.upload_time.clone()),
        }
    }
}
