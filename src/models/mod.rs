//! models/mod.rs
//! Módulo raíz para modelos/estructuras compartidas.

pub mod csid_model;
pub mod operation_model;
pub mod track_model;
pub mod workbook_model;
