//! tests/mod.rs
//! Pruebas unitarias y de endpoints.

mod api_tests;
mod export_tests;
