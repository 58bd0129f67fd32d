//! config/app_config.rs
//! Configuración global del servicio (host, puerto, límites de upload, etc.)
//! Se lee desde variables de entorno (o un .env), con valores por defecto.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub workers: usize,
    /// Tamaño máximo de un archivo subido (bytes)
    pub max_upload_bytes: usize,
    /// Carpeta con home.html y las páginas de tracking
    pub static_dir: PathBuf,
    /// Carpeta donde vive la base SQLite
    pub data_dir: PathBuf,
    pub session_ttl_secs: u64,
    /// Hoja resumen que se ignora en las búsquedas ODP / IP
    pub excluded_sheet: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            host: "0.0.0.0".to_string(),
            port: 5050,
            workers: 2,
            max_upload_bytes: 50 * 1024 * 1024,
            static_dir: PathBuf::from("static"),
            data_dir: PathBuf::from("data"),
            session_ttl_secs: 24 * 60 * 60,
            excluded_sheet: "TRACK ODP".to_string(),
        }
    }
}

impl AppConfig {
    /// Lee TRACK_* del entorno; lo que no esté definido queda con su default.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = AppConfig::default();

        Ok(AppConfig {
            host: lookup("TRACK_HOST").unwrap_or(defaults.host),
            port: parse_var(&lookup, "TRACK_PORT", defaults.port)?,
            workers: parse_var(&lookup, "TRACK_WORKERS", defaults.workers)?,
            max_upload_bytes: parse_var(
                &lookup,
                "TRACK_MAX_UPLOAD_BYTES",
                defaults.max_upload_bytes,
            )?,
            static_dir: lookup("TRACK_STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.static_dir),
            data_dir: lookup("TRACK_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
            session_ttl_secs: parse_var(
                &lookup,
                "TRACK_SESSION_TTL_SECS",
                defaults.session_ttl_secs,
            )?,
            excluded_sheet: lookup("TRACK_EXCLUDED_SHEET").unwrap_or(defaults.excluded_sheet),
        })
    }

    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_secs)
    }

    /// URL de SQLite: ./<data_dir>/operations.db (se crea si no existe)
    pub fn database_url(&self) -> String {
        format!(
            "sqlite:{}?mode=rwc",
            self.data_dir.join("operations.db").to_string_lossy()
        )
    }
}

fn parse_var<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Valor inválido para {}: {:?}", key, raw)),
        None => Ok(default),
    }
}
