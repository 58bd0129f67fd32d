//! services/track_service.rs
//! Búsquedas de una sola pasada (Tracking ODP / Tracking IP) sobre un workbook subido.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::models::track_model::{IpMatch, OdpMatch};
use crate::services::workbook_service::{
    cell_json, cell_text, is_truthy, Sheet, CSID_COLUMN, IP_COLUMN, ODP_COLUMN,
};

static IP_CSID_SEPARATOR: Lazy<Regex> = Lazy::new(|| Regex::new(r"[,;\n\r]+").unwrap());

/// CSIDs del formulario de Tracking IP: uno por línea, o separados por ',' / ';'.
pub fn parse_ip_csids(text: &str) -> Vec<String> {
    IP_CSID_SEPARATOR
        .split(text.trim())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn searchable<'a>(sheets: &'a [Sheet], excluded_sheet: &'a str) -> impl Iterator<Item = &'a Sheet> {
    sheets.iter().filter(move |s| s.name != excluded_sheet)
}

fn json_at(sheet: &Sheet, row: u32, col: u32) -> Value {
    sheet.cell(row, col).map_or(Value::Null, cell_json)
}

/// Filas cuya columna B coincide con el ODP buscado.
pub fn search_odp(sheets: &[Sheet], odp_id: &str, excluded_sheet: &str) -> Vec<OdpMatch> {
    let wanted = odp_id.trim();
    let mut results = Vec::new();

    for sheet in searchable(sheets, excluded_sheet) {
        for row in sheet.data_rows() {
            let Some(odp) = sheet.cell(row, ODP_COLUMN).filter(|c| is_truthy(c)) else {
                continue;
            };
            if cell_text(odp).as_deref().unwrap_or("") == wanted {
                results.push(OdpMatch {
                    ip: json_at(sheet, row, IP_COLUMN),
                    csid: json_at(sheet, row, CSID_COLUMN),
                });
            }
        }
    }

    results
}

/// IP y hoja de cada CSID pedido. Los no encontrados van al final con "Not Found".
pub fn search_ip(sheets: &[Sheet], csids: &[String], excluded_sheet: &str) -> Vec<IpMatch> {
    let mut results = Vec::new();
    let mut found: HashSet<&str> = HashSet::new();

    for sheet in searchable(sheets, excluded_sheet) {
        for row in sheet.data_rows() {
            let Some(cell) = sheet.cell(row, CSID_COLUMN).filter(|c| is_truthy(c)) else {
                continue;
            };
            let row_csid = cell_text(cell).unwrap_or_default();
            let Some(wanted) = csids.iter().find(|c| **c == row_csid) else {
                continue;
            };

            let ip = match sheet.cell(row, IP_COLUMN) {
                Some(ip) if is_truthy(ip) => cell_json(ip),
                _ => Value::String("N/A".to_string()),
            };
            results.push(IpMatch {
                csid: row_csid,
                ip,
                sheet: sheet.name.clone(),
            });
            found.insert(wanted.as_str());
        }
    }

    let mut missing: HashSet<&str> = HashSet::new();
    for csid in csids {
        if !found.contains(csid.as_str()) && missing.insert(csid.as_str()) {
            results.push(IpMatch::not_found(csid));
        }
    }

    results.sort_by(|a, b| {
        (a.is_not_found(), &a.csid).cmp(&(b.is_not_found(), &b.csid))
    });
    results
}
