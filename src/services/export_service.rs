//! services/export_service.rs
//! Genera el .xlsx de resultados (hoja "CSID_Results") en memoria.

use anyhow::{anyhow, Context, Result};
use chrono::Local;
use rust_xlsxwriter::{Format, Workbook, Worksheet};
use serde_json::Value;

use crate::models::csid_model::ExportRow;

pub const EXPORT_SHEET_NAME: &str = "CSID_Results";
pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Valida que cada elemento sea un objeto JSON.
pub fn to_rows(data: Vec<Value>) -> Result<Vec<ExportRow>> {
    data.into_iter()
        .enumerate()
        .map(|(i, value)| match value {
            Value::Object(map) => Ok(map),
            other => Err(anyhow!("row {} is not an object: {}", i, other)),
        })
        .collect()
}

/// Columnas: todas las claves, en el orden en que aparecen por primera vez.
pub fn collect_columns(rows: &[ExportRow]) -> Vec<String> {
    let mut columns: Vec<String> = Vec::new();
    for row in rows {
        for key in row.keys() {
            if !columns.iter().any(|c| c == key) {
                columns.push(key.clone());
            }
        }
    }
    columns
}

pub fn export_filename() -> String {
    format!("csid_results_{}.xlsx", Local::now().format("%Y%m%d_%H%M%S"))
}

pub fn build_workbook(rows: &[ExportRow]) -> Result<Vec<u8>> {
    let columns = collect_columns(rows);
    let header_format = Format::new().set_bold();

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(EXPORT_SHEET_NAME)?;

    for (col, name) in columns.iter().enumerate() {
        worksheet.write_string_with_format(0, col_index(col)?, name, &header_format)?;
    }

    for (i, row) in rows.iter().enumerate() {
        let row_num = u32::try_from(i + 1).context("too many rows")?;
        for (col, name) in columns.iter().enumerate() {
            if let Some(value) = row.get(name) {
                write_value(worksheet, row_num, col_index(col)?, value)?;
            }
        }
    }

    workbook
        .save_to_buffer()
        .context("No se pudo serializar el workbook")
}

fn col_index(col: usize) -> Result<u16> {
    u16::try_from(col).context("too many columns")
}

fn write_value(ws: &mut Worksheet, row: u32, col: u16, value: &Value) -> Result<()> {
    match value {
        Value::Null => {}
        Value::Bool(b) => {
            ws.write_boolean(row, col, *b)?;
        }
        Value::Number(n) => match n.as_f64() {
            Some(f) => {
                ws.write_number(row, col, f)?;
            }
            None => {
                ws.write_string(row, col, n.to_string())?;
            }
        },
        Value::String(s) => {
            ws.write_string(row, col, s)?;
        }
        nested => {
            ws.write_string(row, col, nested.to_string())?;
        }
    }
    Ok(())
}
