//! Router behaviour: the passcode gate, dashboard, JSON API and downloads.

mod common;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use tower::ServiceExt;

use patent_portal::config::Settings;
use patent_portal::server::{create_router, AppState};

const PASSCODE: &str = "correct horse";

async fn setup_app() -> (Router, tempfile::TempDir) {
    let (path, dir) = common::write_dataset();
    let settings = Settings {
        data_file: path,
        logo_file: dir.path().join("logo.png"),
        passcode: Some(PASSCODE.to_string()),
        ..Default::default()
    };
    let state = AppState::new(&settings)
        .await
        .expect("Failed to build state");
    (create_router(state), dir)
}

async fn body_text(response: axum::response::Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8_lossy(&bytes).into_owned()
}

fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

fn post_form(uri: &str, body: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

/// Log in and return the `name=value` cookie pair.
async fn login(app: &Router) -> String {
    let response = app
        .clone()
        .oneshot(post_form("/login", "passcode=correct+horse", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("login should set a cookie")
        .to_str()
        .unwrap();
    set_cookie.split(';').next().unwrap().to_string()
}

#[tokio::test]
async fn state_requires_a_passcode() {
    let settings = Settings::default();
    assert!(AppState::new(&settings).await.is_err());
}

#[tokio::test]
async fn dashboard_redirects_to_login_without_session() {
    let (app, _dir) = setup_app().await;

    let response = app.clone().oneshot(get("/", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/login");

    let response = app
        .clone()
        .oneshot(get("/api/records", Some("portal_session=forged")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_text(response).await, "Access denied");
}

#[tokio::test]
async fn wrong_passcode_is_denied_generically() {
    let (app, _dir) = setup_app().await;
    let response = app
        .clone()
        .oneshot(post_form("/login", "passcode=correct+hors", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(response.headers().get(header::SET_COOKIE).is_none());
    assert!(body_text(response).await.contains("Access denied"));
}

#[tokio::test]
async fn dashboard_lists_filtered_records() {
    let (app, _dir) = setup_app().await;
    let cookie = login(&app).await;

    let response = app
        .clone()
        .oneshot(get("/?title=DGET", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("Matches Found: 2"));
    assert!(html.contains("US456 | Gadget"));
    assert!(html.contains("WO1001 | Gadget holder"));
    assert!(!html.contains("US123"));
    // No logo file in the fixture dir, so the text title stands in.
    assert!(html.contains(r#"<span class="logo">Patent Discovery Portal</span>"#));
}

#[tokio::test]
async fn unknown_filter_column_is_rejected() {
    let (app, _dir) = setup_app().await;
    let cookie = login(&app).await;

    let response = app
        .clone()
        .oneshot(get("/api/records?inventor=smith", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_text(response).await.contains("inventor"));

    let response = app
        .clone()
        .oneshot(get("/?inventor=smith", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn same_column_twice_is_rejected() {
    let (app, _dir) = setup_app().await;
    let cookie = login(&app).await;

    let response = app
        .clone()
        .oneshot(get("/api/records?title=gadget&Title=widget", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_text(response).await.contains("more than once"));
}

#[tokio::test]
async fn whitespace_in_a_query_is_significant() {
    let (app, _dir) = setup_app().await;
    let cookie = login(&app).await;

    let response = app
        .clone()
        .oneshot(get("/api/records?title=gadget%20", Some(&cookie)))
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(json["matched"], 1);
    assert_eq!(json["records"][0]["Title"], "Gadget holder");
}

#[tokio::test]
async fn signing_in_again_keeps_the_session() {
    let (app, _dir) = setup_app().await;
    let cookie = login(&app).await;

    let response = app
        .clone()
        .oneshot(post_form("/login", "passcode=correct+horse", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let set_cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
    assert_eq!(set_cookie.split(';').next().unwrap(), cookie);
}

#[tokio::test]
async fn api_returns_all_matches() {
    let (app, _dir) = setup_app().await;
    let cookie = login(&app).await;

    let response = app
        .clone()
        .oneshot(get("/api/records?application_number=123", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(json["total"], 4);
    assert_eq!(json["matched"], 1);
    assert_eq!(json["records"][0]["Application Number"], "US123");
    assert_eq!(json["records"][0]["Title"], "Widget");
}

#[tokio::test]
async fn csv_download_has_attachment_headers() {
    let (app, _dir) = setup_app().await;
    let cookie = login(&app).await;

    let response = app
        .clone()
        .oneshot(get("/export.csv?q=gadget", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"patents_export.csv\""
    );
    let text = body_text(response).await;
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], common::HEADER);
    assert_eq!(lines.len(), 3);
}

#[tokio::test]
async fn xlsx_download_is_a_workbook() {
    let (app, _dir) = setup_app().await;
    let cookie = login(&app).await;

    let response = app
        .clone()
        .oneshot(get("/export.xlsx", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
    );
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..2], b"PK");
}

#[tokio::test]
async fn logout_revokes_the_session() {
    let (app, _dir) = setup_app().await;
    let cookie = login(&app).await;

    let response = app
        .clone()
        .oneshot(post_form("/logout", "", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let response = app.clone().oneshot(get("/", Some(&cookie))).await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn missing_dataset_shows_warning() {
    let dir = tempfile::tempdir().unwrap();
    let settings = Settings {
        data_file: dir.path().join("master_patents.csv"),
        logo_file: dir.path().join("logo.png"),
        passcode: Some(PASSCODE.to_string()),
        ..Default::default()
    };
    let app = create_router(AppState::new(&settings).await.unwrap());
    let cookie = login(&app).await;

    let response = app.clone().oneshot(get("/", Some(&cookie))).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("No dataset found"));

    let response = app
        .clone()
        .oneshot(get("/export.xlsx", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn malformed_dataset_shows_error_banner() {
    let dir = tempfile::tempdir().unwrap();
    let data_file = dir.path().join("master_patents.csv");
    std::fs::write(&data_file, "Application Number,Title\nUS1,Widget\n").unwrap();
    let settings = Settings {
        data_file,
        logo_file: dir.path().join("logo.png"),
        passcode: Some(PASSCODE.to_string()),
        ..Default::default()
    };
    let app = create_router(AppState::new(&settings).await.unwrap());
    let cookie = login(&app).await;

    let response = app.clone().oneshot(get("/", Some(&cookie))).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains(r#"<p class="banner error">Could not read the dataset: "#));
    assert!(html.contains("missing column: Abstract"));
    assert!(!html.contains("Matches Found"));

    let response = app
        .clone()
        .oneshot(get("/api/records", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn reload_picks_up_a_new_file() {
    let dir = tempfile::tempdir().unwrap();
    let data_file = dir.path().join("master_patents.csv");
    let settings = Settings {
        data_file: data_file.clone(),
        logo_file: dir.path().join("logo.png"),
        passcode: Some(PASSCODE.to_string()),
        ..Default::default()
    };
    let app = create_router(AppState::new(&settings).await.unwrap());
    let cookie = login(&app).await;

    std::fs::write(
        &data_file,
        format!("{}\n{}\n", common::HEADER, common::ROWS[0]),
    )
    .unwrap();

    let response = app
        .clone()
        .oneshot(post_form("/reload", "", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let response = app.clone().oneshot(get("/", Some(&cookie))).await.unwrap();
    assert!(body_text(response).await.contains("Matches Found: 1"));
}
