//! tests/api_tests.rs
//! Endpoints completos con actix_web::test (rutas reales de app::init_app).

#[cfg(test)]
mod tests {
    use actix_web::body::MessageBody;
    use actix_web::cookie::Cookie;
    use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
    use actix_web::http::{header, StatusCode};
    use actix_web::{test, web, App};
    use serde_json::{json, Value};
    use tempfile::TempDir;

    use crate::app::init_app;
    use crate::config::app_config::AppConfig;
    use crate::handlers::session::SESSION_COOKIE;
    use crate::services::csid_service::CsidService;
    use crate::services::operation_service::OperationService;
    use crate::services::store_service::WorkbookStore;
    use crate::tests::fixtures::{inventory, memory_service, workbook_bytes};

    const BOUNDARY: &str = "----trackboundary7MA4YWxk";
    const SESSION: &str = "test-session";

    struct TestState {
        config: AppConfig,
        store: WorkbookStore,
        ops: OperationService,
        _static_dir: TempDir,
    }

    async fn test_state(max_upload_bytes: usize) -> TestState {
        let static_dir = tempfile::tempdir().unwrap();
        std::fs::write(static_dir.path().join("home.html"), "<h1>Web Track CSID</h1>").unwrap();
        std::fs::write(static_dir.path().join("tracking-ip.html"), "<h1>Tracking IP</h1>").unwrap();

        let config = AppConfig {
            static_dir: static_dir.path().to_path_buf(),
            max_upload_bytes,
            ..AppConfig::default()
        };

        TestState {
            config,
            store: WorkbookStore::new(),
            ops: memory_service().await,
            _static_dir: static_dir,
        }
    }

    fn test_app(
        state: &TestState,
    ) -> App<
        impl ServiceFactory<
            ServiceRequest,
            Config = (),
            Response = ServiceResponse<impl MessageBody>,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        App::new()
            .app_data(crate::json_config(state.config.max_upload_bytes))
            .app_data(web::Data::new(state.config.clone()))
            .app_data(web::Data::new(state.store.clone()))
            .app_data(web::Data::new(CsidService::new(state.store.clone())))
            .app_data(web::Data::new(state.ops.clone()))
            .configure(init_app)
    }

    /// Cuerpo multipart/form-data con campos de texto y, opcionalmente, un archivo.
    fn multipart_body(fields: &[(&str, &str)], file: Option<(&str, &[u8])>) -> Vec<u8> {
        let mut body = Vec::new();
        for (name, value) in fields {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
                )
                .as_bytes(),
            );
        }
        if let Some((filename, bytes)) = file {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
                )
                .as_bytes(),
            );
            body.extend_from_slice(bytes);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    fn multipart_request(
        uri: &str,
        fields: &[(&str, &str)],
        file: Option<(&str, &[u8])>,
    ) -> test::TestRequest {
        test::TestRequest::post()
            .uri(uri)
            .cookie(Cookie::new(SESSION_COOKIE, SESSION))
            .insert_header((
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            ))
            .set_payload(multipart_body(fields, file))
    }

    fn json_request(uri: &str, body: Value) -> test::TestRequest {
        test::TestRequest::post()
            .uri(uri)
            .cookie(Cookie::new(SESSION_COOKIE, SESSION))
            .set_json(body)
    }

    #[actix_rt::test]
    async fn home_page_opens_a_session() {
        let state = test_state(1024 * 1024).await;
        let app = test::init_service(test_app(&state)).await;

        let resp = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let set_cookie = resp
            .headers()
            .get(header::SET_COOKIE)
            .expect("session cookie")
            .to_str()
            .unwrap()
            .to_string();
        assert!(set_cookie.starts_with("session_id="));

        let body = test::read_body(resp).await;
        assert_eq!(body, "<h1>Web Track CSID</h1>");

        // con cookie no se vuelve a emitir
        let req = test::TestRequest::get()
            .uri("/tracking-ip.html")
            .cookie(Cookie::new(SESSION_COOKIE, SESSION))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(resp.headers().get(header::SET_COOKIE).is_none());
    }

    #[actix_rt::test]
    async fn missing_page_is_404() {
        let state = test_state(1024 * 1024).await;
        let app = test::init_service(test_app(&state)).await;

        let req = test::TestRequest::get().uri("/tracking-odp.html").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_rt::test]
    async fn full_tracking_co_flow() {
        let state = test_state(1024 * 1024).await;
        let app = test::init_service(test_app(&state)).await;

        let req = test::TestRequest::get()
            .uri("/status")
            .cookie(Cookie::new(SESSION_COOKIE, SESSION))
            .to_request();
        let status: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(status, json!({"loaded": false}));

        let req = json_request("/add_csid", json!({"csid": "CS1001"})).to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["found_sheets"], "No data loaded");

        let xlsx = workbook_bytes(&inventory());
        let req = multipart_request("/upload", &[], Some(("My Inventory.xlsx", xlsx.as_slice()))).to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(
            body,
            json!({
                "success": true,
                "message": "Loaded data from 4 sheets",
                "sheets": ["JKT-01", "BDG-02", "TRACK ODP", "Notes"],
            })
        );

        let req = json_request("/add_csid", json!({"csid": "  CS1001 "})).to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(
            body,
            json!({"success": true, "csid": "CS1001", "found_sheets": "JKT-01, BDG-02"})
        );

        let req = json_request("/add_bulk_csids", json!({"csids": "2002, CS404\nCS9999"})).to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["count"], 3);
        assert_eq!(
            body["results"],
            json!([
                {"csid": "2002", "found_sheets": "JKT-01"},
                {"csid": "CS404", "found_sheets": "Not Found"},
                {"csid": "CS9999", "found_sheets": "TRACK ODP"},
            ])
        );

        let req = json_request("/refresh_csids", json!({"csids": ["CS1003"]})).to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(
            body,
            json!({"success": true, "results": [{"csid": "CS1003", "found_sheets": "JKT-01"}]})
        );

        let req = test::TestRequest::get()
            .uri("/status")
            .cookie(Cookie::new(SESSION_COOKIE, SESSION))
            .to_request();
        let status: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(status["loaded"], true);
        assert_eq!(status["filename"], "My_Inventory.xlsx");
        assert!(status["upload_time"].as_str().unwrap().contains('T'));

        let req = test::TestRequest::post()
            .uri("/reset_file")
            .cookie(Cookie::new(SESSION_COOKIE, SESSION))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["message"], "File data reset successfully");
        assert!(!state.store.status(SESSION).await.loaded);

        let ops = state.ops.list_operations(1, 50).await.unwrap();
        assert_eq!(ops.total, 6);
    }

    async fn expect_error(resp: ServiceResponse<impl MessageBody>, status: StatusCode) -> String {
        assert_eq!(resp.status(), status);
        let body: Value = test::read_body_json(resp).await;
        body["error"].as_str().unwrap_or_default().to_string()
    }

    #[actix_rt::test]
    async fn upload_validation_errors() {
        let state = test_state(1024 * 1024).await;
        let app = test::init_service(test_app(&state)).await;

        let resp = test::call_service(&app, multipart_request("/upload", &[("x", "1")], None).to_request()).await;
        assert_eq!(expect_error(resp, StatusCode::BAD_REQUEST).await, "No file uploaded");

        let resp = test::call_service(&app, multipart_request("/upload", &[], Some(("", &b"abc"[..]))).to_request()).await;
        assert_eq!(expect_error(resp, StatusCode::BAD_REQUEST).await, "No file selected");

        let resp = test::call_service(&app, multipart_request("/upload", &[], Some(("data.csv", &b"a,b"[..]))).to_request()).await;
        assert_eq!(
            expect_error(resp, StatusCode::BAD_REQUEST).await,
            "Please upload an Excel file (.xlsx or .xls)"
        );

        let resp = test::call_service(&app, multipart_request("/upload", &[], Some(("bad.xlsx", &b"not a workbook"[..]))).to_request()).await;
        let msg = expect_error(resp, StatusCode::INTERNAL_SERVER_ERROR).await;
        assert!(msg.starts_with("Failed to load Excel file:"), "{msg}");
        assert!(!state.store.status(SESSION).await.loaded);
    }

    #[actix_rt::test]
    async fn upload_over_limit_is_rejected() {
        let state = test_state(64).await;
        let app = test::init_service(test_app(&state)).await;

        let xlsx = workbook_bytes(&inventory());
        let resp = test::call_service(&app, multipart_request("/upload", &[], Some(("inv.xlsx", xlsx.as_slice()))).to_request()).await;
        assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[actix_rt::test]
    async fn csid_input_errors() {
        let state = test_state(1024 * 1024).await;
        let app = test::init_service(test_app(&state)).await;

        let resp = test::call_service(&app, json_request("/add_csid", json!({"csid": "   "})).to_request()).await;
        assert_eq!(expect_error(resp, StatusCode::BAD_REQUEST).await, "CSID cannot be empty");

        let resp = test::call_service(&app, json_request("/add_csid", json!({})).to_request()).await;
        assert_eq!(expect_error(resp, StatusCode::BAD_REQUEST).await, "CSID cannot be empty");

        let resp = test::call_service(&app, json_request("/add_bulk_csids", json!({"csids": " "})).to_request()).await;
        assert_eq!(expect_error(resp, StatusCode::BAD_REQUEST).await, "No CSIDs provided");

        let resp = test::call_service(&app, json_request("/add_bulk_csids", json!({"csids": ",;,"})).to_request()).await;
        assert_eq!(expect_error(resp, StatusCode::BAD_REQUEST).await, "No valid CSIDs found");

        let resp = test::call_service(&app, json_request("/refresh_csids", json!({"csids": []})).to_request()).await;
        assert_eq!(expect_error(resp, StatusCode::BAD_REQUEST).await, "No CSIDs to refresh");

        let req = test::TestRequest::post()
            .uri("/add_csid")
            .insert_header((header::CONTENT_TYPE, "application/json"))
            .set_payload("{not json")
            .to_request();
        let msg = expect_error(test::call_service(&app, req).await, StatusCode::BAD_REQUEST).await;
        assert!(msg.starts_with("Invalid JSON"));
    }

    #[actix_rt::test]
    async fn export_returns_xlsx_attachment() {
        let state = test_state(1024 * 1024).await;
        let app = test::init_service(test_app(&state)).await;

        let resp = test::call_service(&app, json_request("/export", json!({"data": []})).to_request()).await;
        assert_eq!(expect_error(resp, StatusCode::BAD_REQUEST).await, "No data to export");

        let req = json_request(
            "/export",
            json!({"data": [{"csid": "CS1001", "found_sheets": "JKT-01, BDG-02"}]}),
        )
        .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
        );
        let disposition = resp
            .headers()
            .get(header::CONTENT_DISPOSITION)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        assert!(disposition.starts_with("attachment; filename=\"csid_results_"));

        let body = test::read_body(resp).await;
        // un .xlsx es un zip
        assert_eq!(&body[..2], b"PK");
    }

    #[actix_rt::test]
    async fn large_export_uses_upload_limit() {
        // por encima de los 2 MiB que actix acepta por defecto en un body JSON
        let state = test_state(8 * 1024 * 1024).await;
        let app = test::init_service(test_app(&state)).await;

        let rows: Vec<Value> = (0..40_000)
            .map(|i| json!({"csid": format!("CS{i:06}"), "found_sheets": "JKT-01, BDG-02, SBY-03, MDN-04"}))
            .collect();
        let body = json!({ "data": rows });
        assert!(body.to_string().len() > 2 * 1024 * 1024);

        let resp = test::call_service(&app, json_request("/export", body).to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[actix_rt::test]
    async fn json_over_limit_is_413() {
        let state = test_state(1024).await;
        let app = test::init_service(test_app(&state)).await;

        let csids = vec!["CS123456"; 300].join(", ");
        let req = json_request("/add_bulk_csids", json!({ "csids": csids })).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(
            expect_error(resp, StatusCode::PAYLOAD_TOO_LARGE).await,
            "Request too large (max 1024 bytes)"
        );
    }

    #[actix_rt::test]
    async fn refresh_accepts_numeric_csids() {
        let state = test_state(1024 * 1024).await;
        let app = test::init_service(test_app(&state)).await;

        let xlsx = workbook_bytes(&inventory());
        let req = multipart_request("/upload", &[], Some(("inv.xlsx", xlsx.as_slice()))).to_request();
        let _: Value = test::call_and_read_body_json(&app, req).await;

        let req = json_request("/refresh_csids", json!({"csids": [2002, "CS1003"]})).to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(
            body["results"],
            json!([
                {"csid": "2002", "found_sheets": "JKT-01"},
                {"csid": "CS1003", "found_sheets": "JKT-01"},
            ])
        );
    }

    #[actix_rt::test]
    async fn failed_requests_are_logged() {
        let state = test_state(1024 * 1024).await;
        let app = test::init_service(test_app(&state)).await;

        let req = multipart_request("/search-ip", &[("csid", "CS1001")], Some(("bad.xlsx", &b"not a workbook"[..])))
            .to_request();
        let resp = test::call_service(&app, req).await;
        expect_error(resp, StatusCode::INTERNAL_SERVER_ERROR).await;

        let ops = state.ops.list_operations(1, 10).await.unwrap();
        assert_eq!(ops.total, 1);
        let op = &ops.items[0];
        assert_eq!(op.operation_type, "search_ip");
        assert_eq!(op.status, "failed");
        let msg = op.error_message.clone().unwrap_or_default();
        assert!(msg.starts_with("Failed to load Excel file"), "{msg}");

        let req = multipart_request("/search-odp", &[], None).to_request();
        let resp = test::call_service(&app, req).await;
        expect_error(resp, StatusCode::BAD_REQUEST).await;

        let resp = test::call_service(&app, json_request("/add_csid", json!({"csid": " "})).to_request()).await;
        expect_error(resp, StatusCode::BAD_REQUEST).await;

        let ops = state.ops.list_operations(1, 10).await.unwrap();
        assert_eq!(ops.total, 3);
        assert!(ops.items.iter().all(|op| op.status == "failed"));
        let odp = ops
            .items
            .iter()
            .find(|op| op.operation_type == "search_odp")
            .expect("search_odp row");
        assert_eq!(odp.error_message.as_deref(), Some("Please provide an ODP ID"));
        assert!(ops.items.iter().any(|op| op.operation_type == "add_csid"
            && op.error_message.as_deref() == Some("CSID cannot be empty")));
    }

    #[actix_rt::test]
    async fn search_odp_endpoint() {
        let state = test_state(1024 * 1024).await;
        let app = test::init_service(test_app(&state)).await;
        let xlsx = workbook_bytes(&inventory());

        let req = multipart_request("/search-odp", &[("odp_id", "ODP-JKT-002")], Some(("inv.xlsx", xlsx.as_slice())))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body, json!([{"ip": null, "csid": "CS1003"}]));

        let req = multipart_request("/search-odp", &[], Some(("inv.xlsx", xlsx.as_slice()))).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(expect_error(resp, StatusCode::BAD_REQUEST).await, "Please provide an ODP ID");

        let req = multipart_request("/search-odp", &[("odp_id", "ODP-JKT-002")], None).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(expect_error(resp, StatusCode::BAD_REQUEST).await, "No file uploaded");
    }

    #[actix_rt::test]
    async fn search_ip_endpoint() {
        let state = test_state(1024 * 1024).await;
        let app = test::init_service(test_app(&state)).await;
        let xlsx = workbook_bytes(&inventory());

        let req = multipart_request("/search-ip", &[("csid", "CS404\nCS1003")], Some(("inv.xlsx", xlsx.as_slice())))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(
            body,
            json!([
                {"csid": "CS1003", "ip": "N/A", "sheet": "JKT-01"},
                {"csid": "CS404", "ip": "Not Found", "sheet": "N/A"},
            ])
        );

        let req = multipart_request("/search-ip", &[("csid", " ;\n")], Some(("inv.xlsx", xlsx.as_slice()))).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(
            expect_error(resp, StatusCode::BAD_REQUEST).await,
            "Please provide at least one CSID"
        );
    }

    #[actix_rt::test]
    async fn operations_api() {
        let state = test_state(1024 * 1024).await;
        let app = test::init_service(test_app(&state)).await;

        let req = json_request("/add_csid", json!({"csid": "CS1"})).to_request();
        let _: Value = test::call_and_read_body_json(&app, req).await;

        let req = test::TestRequest::get().uri("/api/operations?page_size=5").to_request();
        let list: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(list["total"], 1);
        assert_eq!(list["page_size"], 5);
        let id = list["items"][0]["id"].as_str().unwrap().to_string();
        assert_eq!(list["items"][0]["operation_type"], "add_csid");

        let req = test::TestRequest::get().uri(&format!("/api/operations/{id}")).to_request();
        let op: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(op["session_id"], SESSION);

        let req = test::TestRequest::get().uri("/api/operations/nope").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(expect_error(resp, StatusCode::NOT_FOUND).await, "Operation not found");
    }
}
