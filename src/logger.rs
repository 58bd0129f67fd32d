//! logger.rs
//! Logging con env_logger: `info` por defecto, RUST_LOG puede pisarlo.

use log::LevelFilter;

/// sqlx loguea cada query en `info`; con el log de operaciones eso tapa todo lo demás.
const QUIET_MODULES: &[(&str, LevelFilter)] = &[("sqlx::query", LevelFilter::Warn)];

pub fn build_logger() -> env_logger::Builder {
    let mut builder = env_logger::Builder::new();
    builder.filter_level(LevelFilter::Info);
    for (module, level) in QUIET_MODULES {
        builder.filter_module(module, *level);
    }
    // RUST_LOG se aplica después, así que gana sobre lo anterior
    builder.parse_env(env_logger::Env::default());
    builder.format_timestamp_secs();
    builder
}

/// Instala el logger global. Una segunda llamada no hace nada.
pub fn init_logger() {
    if build_logger().try_init().is_err() {
        log::debug!("Logger ya inicializado");
    }
}
