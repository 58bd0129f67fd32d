//! services/workbook_service.rs
//! Lectura de archivos Excel con calamine.
//!
//! Las hojas se leen por posición: columna B = ODP, C = IP, D = CSID.
//! La fila 1 siempre es encabezado.

use std::path::Path;

use anyhow::{Context, Result};
use calamine::{open_workbook_auto, Data, Range, Reader};
use serde_json::{Number, Value};

use crate::models::workbook_model::SheetColumn;

pub const ODP_COLUMN: u32 = 1;
pub const IP_COLUMN: u32 = 2;
pub const CSID_COLUMN: u32 = 3;

/// Una hoja del workbook con su rango completo
pub struct Sheet {
    pub name: String,
    range: Range<Data>,
}

impl Sheet {
    pub fn new(name: String, range: Range<Data>) -> Self {
        Self { name, range }
    }

    /// Celda por posición absoluta (fila y columna desde 0)
    pub fn cell(&self, row: u32, col: u32) -> Option<&Data> {
        self.range.get_value((row, col))
    }

    /// Índices absolutos de las filas de datos (sin encabezado)
    pub fn data_rows(&self) -> std::ops::Range<u32> {
        match (self.range.start(), self.range.end()) {
            (Some((first, _)), Some((last, _))) => first.max(1)..last + 1,
            _ => 0..0,
        }
    }

    pub fn reaches_column(&self, col: u32) -> bool {
        self.range.end().map_or(false, |(_, last_col)| last_col >= col)
    }

    /// Texto de la columna D de cada fila de datos; las celdas vacías se omiten.
    pub fn csid_column(&self) -> SheetColumn {
        let values = if self.reaches_column(CSID_COLUMN) {
            self.data_rows()
                .filter_map(|row| self.cell(row, CSID_COLUMN).and_then(cell_text))
                .collect()
        } else {
            Vec::new()
        };

        SheetColumn {
            name: self.name.clone(),
            values,
        }
    }
}

/// Abre un .xlsx/.xls (calamine detecta el formato por la extensión).
pub fn read_workbook(path: &Path) -> Result<Vec<Sheet>> {
    let mut workbook = open_workbook_auto(path)
        .with_context(|| format!("Failed to open Excel file: {}", path.display()))?;

    let names = workbook.sheet_names().to_owned();
    let mut sheets = Vec::with_capacity(names.len());
    for name in names {
        let range = workbook
            .worksheet_range(&name)
            .with_context(|| format!("Failed to read sheet: {}", name))?;
        sheets.push(Sheet::new(name, range));
    }

    Ok(sheets)
}

/// Columna D de todas las hojas, en el orden del workbook.
pub fn load_csid_columns(path: &Path) -> Result<Vec<SheetColumn>> {
    Ok(read_workbook(path)?.iter().map(Sheet::csid_column).collect())
}

/// Texto de una celda, recortado. `None` si la celda queda vacía.
pub fn cell_text(cell: &Data) -> Option<String> {
    let text = match cell {
        Data::Empty => return None,
        Data::String(s) => s.trim().to_string(),
        Data::Float(f) => float_text(*f),
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => (if *b { "TRUE" } else { "FALSE" }).to_string(),
        Data::DateTime(dt) => format!("{}", dt),
        Data::DateTimeIso(s) => s.clone(),
        Data::DurationIso(s) => s.clone(),
        Data::Error(e) => format!("#{:?}", e),
    };

    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Valor "verdadero" en el sentido de la planilla: ni vacío, ni cero, ni FALSE.
pub fn is_truthy(cell: &Data) -> bool {
    match cell {
        Data::Empty => false,
        Data::String(s) => !s.is_empty(),
        Data::Float(f) => *f != 0.0,
        Data::Int(i) => *i != 0,
        Data::Bool(b) => *b,
        _ => true,
    }
}

/// Valor de la celda tal como se devuelve en JSON
pub fn cell_json(cell: &Data) -> Value {
    match cell {
        Data::Empty => Value::Null,
        Data::String(s) => Value::String(s.clone()),
        Data::Float(f) => {
            if let Some(i) = integral(*f) {
                Value::Number(i.into())
            } else {
                Number::from_f64(*f).map_or(Value::Null, Value::Number)
            }
        }
        Data::Int(i) => Value::Number((*i).into()),
        Data::Bool(b) => Value::Bool(*b),
        other => cell_text(other).map_or(Value::Null, Value::String),
    }
}

fn float_text(f: f64) -> String {
    match integral(f) {
        Some(i) => i.to_string(),
        None => f.to_string(),
    }
}

fn integral(f: f64) -> Option<i64> {
    if f.is_finite() && f.fract() == 0.0 && f >= i64::MIN as f64 && f <= i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}

pub fn is_excel_filename(name: &str) -> bool {
    let lower = name.to_lowercase();
    lower.ends_with(".xlsx") || lower.ends_with(".xls")
}

/// Nombre de archivo seguro para mostrar/guardar (mismo criterio que werkzeug).
pub fn secure_filename(name: &str) -> String {
    let ascii: String = name.chars().filter(|c| c.is_ascii()).collect();
    let spaced = ascii.replace(['/', '\\'], " ");
    let joined = spaced.split_whitespace().collect::<Vec<_>>().join("_");
    let cleaned: String = joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        .collect();

    cleaned.trim_matches(|c| c == '.' || c == '_').to_string()
}
