//! handlers/multipart_form.rs
//! Lee un formulario multipart: el archivo va a un temporal, el resto a texto.

use std::collections::HashMap;
use std::io::Write;

use actix_multipart::Multipart;
use futures_util::TryStreamExt;
use tempfile::NamedTempFile;

use crate::errors::AppError;

/// Campo que trae el Excel
pub const FILE_FIELD: &str = "file";

/// Límite para campos de texto (listas de CSIDs, ODP)
const MAX_TEXT_FIELD_BYTES: usize = 1024 * 1024;

pub struct UploadedFile {
    /// Nombre original que mandó el navegador (puede venir vacío)
    pub filename: String,
    pub size: usize,
    pub temp: NamedTempFile,
}

#[derive(Default)]
pub struct MultipartForm {
    pub file: Option<UploadedFile>,
    pub fields: HashMap<String, String>,
}

impl MultipartForm {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// Exige el archivo; si no vino, 400 "No file uploaded".
    pub fn require_file(&mut self) -> Result<UploadedFile, AppError> {
        self.file
            .take()
            .ok_or_else(|| AppError::bad_request("No file uploaded"))
    }
}

/// La extensión del temporal le dice a calamine qué formato abrir.
fn temp_suffix(filename: &str) -> String {
    match filename.rsplit_once('.') {
        Some((_, ext)) if !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()) => {
            format!(".{}", ext.to_lowercase())
        }
        _ => ".xlsx".to_string(),
    }
}

pub async fn read_form(mut payload: Multipart, max_file_bytes: usize) -> Result<MultipartForm, AppError> {
    let mut form = MultipartForm::default();

    while let Some(mut field) = payload.try_next().await? {
        let name = field.name().unwrap_or_default().to_string();
        let filename = field
            .content_disposition()
            .and_then(|cd| cd.get_filename())
            .map(str::to_string);

        if name == FILE_FIELD {
            let filename = filename.unwrap_or_default();
            let mut temp = tempfile::Builder::new()
                .prefix("track_upload_")
                .suffix(&temp_suffix(&filename))
                .tempfile()
                .map_err(|e| AppError::Internal(e.into()))?;

            let mut size = 0usize;
            while let Some(chunk) = field.try_next().await? {
                size += chunk.len();
                if size > max_file_bytes {
                    return Err(AppError::PayloadTooLarge(max_file_bytes));
                }
                temp.write_all(&chunk)
                    .map_err(|e| AppError::Internal(e.into()))?;
            }
            temp.flush().map_err(|e| AppError::Internal(e.into()))?;

            form.file = Some(UploadedFile {
                filename,
                size,
                temp,
            });
        } else {
            let mut buf: Vec<u8> = Vec::new();
            while let Some(chunk) = field.try_next().await? {
                if buf.len() + chunk.len() > MAX_TEXT_FIELD_BYTES {
                    return Err(AppError::PayloadTooLarge(MAX_TEXT_FIELD_BYTES));
                }
                buf.extend_from_slice(&chunk);
            }
            form.fields
                .insert(name, String::from_utf8_lossy(&buf).into_owned());
        }
    }

    Ok(form)
}
