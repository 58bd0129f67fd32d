//! handlers/page_handler.rs
//! Páginas HTML del frontend (home y las tres herramientas de tracking).

use actix_files::NamedFile;
use actix_web::{web, HttpRequest, HttpResponse};

use crate::config::app_config::AppConfig;
use crate::handlers::session::Session;

pub const HOME_PAGE: &str = "home.html";
pub const TRACKING_PAGES: [&str; 3] = ["tracking-co.html", "tracking-odp.html", "tracking-ip.html"];

/// Sirve `page` desde la carpeta estática y, si hace falta, abre la sesión.
async fn serve_page(
    req: &HttpRequest,
    session: &Session,
    config: &AppConfig,
    page: &str,
) -> actix_web::Result<HttpResponse> {
    let file = NamedFile::open_async(config.static_dir.join(page)).await?;
    let mut resp = file.into_response(req);
    if session.is_new() {
        resp.add_cookie(&session.cookie())?;
    }
    Ok(resp)
}

/// GET /
pub async fn index_page(
    req: HttpRequest,
    session: Session,
    config: web::Data<AppConfig>,
) -> actix_web::Result<HttpResponse> {
    serve_page(&req, &session, &config, HOME_PAGE).await
}

/// GET /tracking-co.html, /tracking-odp.html, /tracking-ip.html
pub async fn tracking_page(
    req: HttpRequest,
    session: Session,
    config: web::Data<AppConfig>,
) -> actix_web::Result<HttpResponse> {
    let page = req.path().trim_start_matches('/').to_string();
    if !TRACKING_PAGES.contains(&page.as_str()) {
        return Ok(HttpResponse::NotFound().finish());
    }
    serve_page(&req, &session, &config, &page).await
}
