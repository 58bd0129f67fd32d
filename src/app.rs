//! app.rs
use crate::handlers::{
    csid_handler, export_handler, operation_handler, page_handler, track_handler, upload_handler,
};
use actix_web::web;

pub fn init_app(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(page_handler::index_page))
        .route("/tracking-co.html", web::get().to(page_handler::tracking_page))
        .route("/tracking-odp.html", web::get().to(page_handler::tracking_page))
        .route("/tracking-ip.html", web::get().to(page_handler::tracking_page))
        // Tracking CO (workbook por sesión)
        .route("/upload", web::post().to(upload_handler::upload_endpoint))
        .route("/add_csid", web::post().to(csid_handler::add_csid_endpoint))
        .route(
            "/add_bulk_csids",
            web::post().to(csid_handler::add_bulk_csids_endpoint),
        )
        .route(
            "/refresh_csids",
            web::post().to(csid_handler::refresh_csids_endpoint),
        )
        .route("/export", web::post().to(export_handler::export_endpoint))
        .route("/status", web::get().to(csid_handler::status_endpoint))
        .route("/reset_file", web::post().to(csid_handler::reset_file_endpoint))
        // Tracking ODP / IP
        .route("/search-odp", web::post().to(track_handler::search_odp_endpoint))
        .route("/search-ip", web::post().to(track_handler::search_ip_endpoint))
        .service(
            web::scope("/api").service(
                web::scope("/operations")
                    .route(
                        "",
                        web::get().to(operation_handler::list_operations_endpoint),
                    )
                    .route(
                        "/{id}",
                        web::get().to(operation_handler::get_operation_endpoint),
                    ),
            ),
        );
}
