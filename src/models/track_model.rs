//! models/track_model.rs
//! Resultados de Tracking ODP / Tracking IP.

use serde::Serialize;
use serde_json::Value;

/// Fila encontrada por ODP: IP (columna C) y CSID (columna D) tal cual vienen en la celda.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OdpMatch {
    pub ip: Value,
    pub csid: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IpMatch {
    pub csid: String,
    pub ip: Value,
    pub sheet: String,
}

pub const NOT_FOUND_IP: &str = "Not Found";

impl IpMatch {
    pub fn not_found(csid: &str) -> Self {
        Self {
            csid: csid.to_string(),
            ip: Value::String(NOT_FOUND_IP.to_string()),
            sheet: "N/A".to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.ip.as_str() == Some(NOT_FOUND_IP)
    }
}
