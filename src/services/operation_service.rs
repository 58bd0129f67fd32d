use anyhow::{Context, Result};
use chrono::{SecondsFormat, Utc};
use sqlx::{Pool, Sqlite};
use uuid::Uuid;

use crate::models::operation_model::{ListOperationsResponse, NewOperation, OperationRecord};

#[derive(Clone, Debug)]
pub struct OperationService {
    db_pool: Pool<Sqlite>,
}

impl OperationService {
    pub fn new(db_pool: Pool<Sqlite>) -> Self {
        OperationService { db_pool }
    }

    /// Corre migraciones con sqlx
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(&self.db_pool).await?;
        Ok(())
    }

    /// Inserta la operación y devuelve su id
    pub async fn create_operation(&self, op: NewOperation) -> Result<String> {
        let op_id = Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true);
        let metadata = op.metadata.as_ref().map(|m| m.to_string());

        sqlx::query(
            r#"
            INSERT INTO operations (
                id, operation_type, status, error_message,
                session_id, metadata, created_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&op_id)
        .bind(op.operation_type.as_str())
        .bind(op.status())
        .bind(op.error_message.clone())
        .bind(op.session_id.clone())
        .bind(metadata)
        .bind(now)
        .execute(&self.db_pool)
        .await
        .context("Fallo al insertar operation")?;

        Ok(op_id)
    }

    /// Igual que `create_operation`, pero un fallo solo se loguea.
    pub async fn record(&self, op: NewOperation) {
        let op_type = op.operation_type.as_str();
        if let Err(e) = self.create_operation(op).await {
            log::warn!("No se pudo registrar operación {}: {:?}", op_type, e);
        }
    }

    /// Registra `op` como fallida y devuelve el error para seguir propagándolo.
    pub async fn record_failure<E: std::fmt::Display>(&self, op: NewOperation, err: E) -> E {
        self.record(op.failed(&err)).await;
        err
    }

    /// Obtiene la info de una operación
    pub async fn get_operation(&self, op_id: &str) -> Result<Option<OperationRecord>> {
        let row = sqlx::query_as::<_, OperationRecord>(
            r#"
            SELECT
                id, operation_type, status, error_message,
                session_id, metadata, created_at
            FROM operations
            WHERE id = ?1
            "#,
        )
        .bind(op_id)
        .fetch_optional(&self.db_pool)
        .await
        .context("Fallo al consultar operación")?;

        Ok(row)
    }

    /// Lista operaciones con paginación (más nuevas primero)
    pub async fn list_operations(
        &self,
        page: u64,
        page_size: u64,
    ) -> Result<ListOperationsResponse> {
        let page = page.max(1);
        let page_size = page_size.clamp(1, 500);
        let offset = (page - 1) * page_size;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM operations")
            .fetch_one(&self.db_pool)
            .await?;

        let items = sqlx::query_as::<_, OperationRecord>(
            r#"
            SELECT
                id, operation_type, status, error_message,
                session_id, metadata, created_at
            FROM operations
            ORDER BY created_at DESC, rowid DESC
            LIMIT ?1 OFFSET ?2
            "#,
        )
        .bind(page_size as i64)
        .bind(offset as i64)
        .fetch_all(&self.db_pool)
        .await?;

        Ok(ListOperationsResponse {
            total: total as u64,
            page,
            page_size,
            items,
        })
    }
}
