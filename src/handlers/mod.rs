//! handlers/mod.rs
//! Módulo que agrupa los distintos handlers (páginas, Tracking CO/ODP/IP, operaciones).
pub mod csid_handler;
pub mod export_handler;
pub mod multipart_form;
pub mod operation_handler;
pub mod page_handler;
pub mod session;
pub mod track_handler;
pub mod upload_handler;
