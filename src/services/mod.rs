//! services/mod.rs
//! Módulo que agrupa distintos "servicios" o "capas de negocio" de la app.

pub mod csid_service;
pub mod export_service;
pub mod operation_service;
pub mod store_service;
pub mod track_service;
pub mod workbook_service;
