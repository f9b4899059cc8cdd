//! Request handlers.

use std::collections::HashMap;

use axum::{
    extract::{Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    Form, Json,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::error::AppError;
use super::templates;
use super::AppState;
use crate::auth::{self, session_from_cookie_header};
use crate::export::ExportFormat;
use crate::models::PatentRecord;
use crate::repository::DatasetState;
use crate::search::{self, Filter};

/// Session token from the request cookies.
pub(super) fn session_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find_map(session_from_cookie_header)
}

#[derive(Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    passcode: String,
}

pub async fn login_page(State(state): State<AppState>) -> Html<String> {
    Html(templates::base_template(
        "Sign in",
        &templates::login_form(None),
        state.has_logo(),
        false,
    ))
}

pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<LoginForm>,
) -> Response {
    match state.gate.login(&form.passcode, session_token(&headers)).await {
        Some(token) => (
            [(header::SET_COOKIE, auth::session_cookie(&token))],
            Redirect::to("/"),
        )
            .into_response(),
        None => (
            StatusCode::UNAUTHORIZED,
            Html(templates::base_template(
                "Sign in",
                &templates::login_form(Some("Access denied")),
                state.has_logo(),
                false,
            )),
        )
            .into_response(),
    }
}

pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Some(token) = session_token(&headers) {
        state.gate.logout(token).await;
    }
    (
        [(header::SET_COOKIE, auth::expired_session_cookie())],
        Redirect::to("/login"),
    )
        .into_response()
}

pub async fn dashboard(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let snapshot = state.store.snapshot().await;
    let source = state.store.path().display().to_string();

    let (status, body) = match (Filter::from_params(&params), &snapshot) {
        (Err(e), _) => (
            StatusCode::BAD_REQUEST,
            format!(
                "{}{}",
                templates::search_form(&Filter::new()),
                templates::error_banner(&e.to_string())
            ),
        ),
        (Ok(filter), DatasetState::Loaded(dataset)) => {
            let matched = search::apply(&dataset.records, &filter);
            (
                StatusCode::OK,
                format!(
                    "{}{}{}",
                    templates::dataset_status(
                        &source,
                        Some(dataset.len()),
                        Some(dataset.loaded_at),
                        state.scrape_enabled(),
                    ),
                    templates::search_form(&filter),
                    templates::results(&matched, &filter, state.settings.display_limit)
                ),
            )
        }
        (Ok(_), DatasetState::Missing(path)) => (
            StatusCode::OK,
            format!(
                "{}{}",
                templates::dataset_status(&source, None, None, state.scrape_enabled()),
                templates::warning_banner(&format!(
                    "No dataset found. Place '{}' on the server and reload.",
                    path.display()
                ))
            ),
        ),
        (Ok(_), DatasetState::Failed(message)) => (
            StatusCode::OK,
            format!(
                "{}{}",
                templates::dataset_status(&source, None, None, state.scrape_enabled()),
                templates::error_banner(&format!("Could not read the dataset: {}", message))
            ),
        ),
    };

    (
        status,
        Html(templates::base_template(
            "Patent Database Query",
            &body,
            state.has_logo(),
            true,
        )),
    )
        .into_response()
}

#[derive(Serialize)]
pub struct RecordsResponse {
    pub total: usize,
    pub matched: usize,
    pub records: Vec<PatentRecord>,
}

pub async fn api_records(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<RecordsResponse>, AppError> {
    let filter = Filter::from_params(&params)?;
    let dataset = state.store.dataset().await?;
    let matched = search::apply(&dataset.records, &filter);

    Ok(Json(RecordsResponse {
        total: dataset.len(),
        matched: matched.len(),
        records: matched.into_iter().cloned().collect(),
    }))
}

pub async fn export_xlsx(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Response, AppError> {
    export(state, params, ExportFormat::Xlsx).await
}

pub async fn export_csv(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Response, AppError> {
    export(state, params, ExportFormat::Csv).await
}

async fn export(
    state: AppState,
    params: HashMap<String, String>,
    format: ExportFormat,
) -> Result<Response, AppError> {
    let filter = Filter::from_params(&params)?;
    let dataset = state.store.dataset().await?;
    let matched = search::apply(&dataset.records, &filter);
    let bytes = format.render(&matched)?;

    info!(rows = matched.len(), format = ?format, "Exported patent records");

    Ok((
        [
            (header::CONTENT_TYPE, format.content_type().to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", format.file_name()),
            ),
        ],
        bytes,
    )
        .into_response())
}

pub async fn reload(State(state): State<AppState>) -> Redirect {
    // The dashboard reports the resulting state.
    if let Err(e) = state.store.reload().await {
        warn!(error = %e, "Reload requested but dataset is unavailable");
    }
    Redirect::to("/")
}

#[cfg(feature = "browser")]
pub async fn scrape(State(state): State<AppState>) -> Response {
    let config = &state.settings.scraper;
    let (status, body) = match crate::scrapers::probe_versions(config).await {
        Ok(versions) => (
            StatusCode::OK,
            templates::scrape_result(Ok(&versions), &config.version_fields),
        ),
        Err(e) => {
            let message = e.to_string();
            (
                AppError::from(e).status(),
                templates::scrape_result(Err(&message), &config.version_fields),
            )
        }
    };

    (
        status,
        Html(templates::base_template(
            "Portal Version",
            &body,
            state.has_logo(),
            true,
        )),
    )
        .into_response()
}

pub async fn stylesheet() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/css")], templates::CSS)
}

pub async fn logo(State(state): State<AppState>) -> Response {
    let path = &state.settings.logo_file;
    match tokio::fs::read(path).await {
        Ok(bytes) => {
            let mime = mime_guess::from_path(path).first_or_octet_stream();
            ([(header::CONTENT_TYPE, mime.to_string())], bytes).into_response()
        }
        Err(_) => StatusCode::NOT_FOUND.into_response(),
    }
}
