//! services/csid_service.rs
//! Lógica de Tracking CO: parseo de listas de CSIDs y búsquedas sobre el workbook de la sesión.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::models::csid_model::CsidLookup;
use crate::services::store_service::WorkbookStore;

static BULK_SEPARATOR: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\s,;]+").unwrap());

/// Separa por espacios, comas, ';' o saltos de línea. Mantiene orden y duplicados.
pub fn parse_bulk_csids(text: &str) -> Vec<String> {
    BULK_SEPARATOR
        .split(text)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Texto de un CSID recibido en JSON: strings tal cual, el resto en su forma JSON.
pub fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[derive(Clone)]
pub struct CsidService {
    store: WorkbookStore,
}

impl CsidService {
    pub fn new(store: WorkbookStore) -> Self {
        CsidService { store }
    }

    pub async fn lookup(&self, session_id: &str, csid: &str) -> CsidLookup {
        CsidLookup {
            csid: csid.to_string(),
            found_sheets: self.store.find_in_all_sheets(session_id, csid).await,
        }
    }

    pub async fn lookup_many(&self, session_id: &str, csids: &[String]) -> Vec<CsidLookup> {
        self.store
            .find_many(session_id, csids)
            .await
            .into_iter()
            .map(|(csid, found_sheets)| CsidLookup { csid, found_sheets })
            .collect()
    }
}
