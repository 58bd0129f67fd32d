//! services/store_service.rs
//! Workbooks cargados en memoria, uno por sesión.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::RwLock;

use crate::models::workbook_model::{LoadedWorkbook, WorkbookStatus};

pub const NO_DATA_LOADED: &str = "No data loaded";
pub const NOT_FOUND: &str = "Not Found";

#[derive(Clone, Default)]
pub struct WorkbookStore {
    inner: Arc<RwLock<HashMap<String, LoadedWorkbook>>>,
}

impl WorkbookStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reemplaza lo que hubiera para la sesión
    pub async fn put(&self, session_id: &str, workbook: LoadedWorkbook) {
        self.inner
            .write()
            .await
            .insert(session_id.to_string(), workbook);
    }

    pub async fn status(&self, session_id: &str) -> WorkbookStatus {
        self.inner
            .read()
            .await
            .get(session_id)
            .map_or_else(WorkbookStatus::not_loaded, WorkbookStatus::from)
    }

    pub async fn remove(&self, session_id: &str) -> bool {
        self.inner.write().await.remove(session_id).is_some()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    /// Busca `value` en la columna D de todas las hojas.
    /// Devuelve los nombres de hoja separados por ", ", "Not Found" o "No data loaded".
    pub async fn find_in_all_sheets(&self, session_id: &str, value: &str) -> String {
        let guard = self.inner.read().await;
        match guard.get(session_id) {
            Some(workbook) => find_in_workbook(workbook, value),
            None => NO_DATA_LOADED.to_string(),
        }
    }

    /// Igual que `find_in_all_sheets` pero para varios valores bajo un solo lock
    pub async fn find_many<'a, I>(&self, session_id: &str, values: I) -> Vec<(String, String)>
    where
        I: IntoIterator<Item = &'a String>,
    {
        let guard = self.inner.read().await;
        let workbook = guard.get(session_id);
        values
            .into_iter()
            .map(|value| {
                let found = match workbook {
                    Some(wb) => find_in_workbook(wb, value),
                    None => NO_DATA_LOADED.to_string(),
                };
                (value.clone(), found)
            })
            .collect()
    }

    /// Elimina los workbooks subidos hace más de `ttl`. Devuelve cuántos se borraron.
    pub async fn purge_expired(&self, ttl: Duration) -> usize {
        let ttl = match chrono::Duration::from_std(ttl) {
            Ok(d) => d,
            Err(_) => return 0,
        };
        let cutoff = Utc::now() - ttl;

        let mut guard = self.inner.write().await;
        let before = guard.len();
        guard.retain(|_, wb| wb.loaded_at > cutoff);
        before - guard.len()
    }
}

pub fn find_in_workbook(workbook: &LoadedWorkbook, value: &str) -> String {
    let found: Vec<&str> = workbook
        .sheets
        .iter()
        .filter(|sheet| sheet.contains(value))
        .map(|sheet| sheet.name.as_str())
        .collect();

    if found.is_empty() {
        NOT_FOUND.to_string()
    } else {
        found.join(", ")
    }
}

/// Tarea de fondo: purga periódica de sesiones vencidas.
pub fn spawn_purge_task(store: WorkbookStore, ttl: Duration, every: Duration) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        loop {
            ticker.tick().await;
            let purged = store.purge_expired(ttl).await;
            if purged > 0 {
                log::info!(
                    "Purgados {} workbooks vencidos ({} activos)",
                    purged,
                    store.len().await
                );
            }
        }
    });
}
