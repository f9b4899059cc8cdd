//! Router assembly and the session guard.

use axum::{
    extract::{Request, State},
    middleware::{self, Next},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use super::error::AppError;
use super::handlers::{self, session_token};
use super::AppState;

/// Build the application router.
pub fn create_router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/", get(handlers::dashboard))
        .route("/api/records", get(handlers::api_records))
        .route("/export.xlsx", get(handlers::export_xlsx))
        .route("/export.csv", get(handlers::export_csv))
        .route("/reload", post(handlers::reload))
        .route("/logout", post(handlers::logout));

    #[cfg(feature = "browser")]
    let protected = protected.route("/scrape", post(handlers::scrape));

    let protected =
        protected.route_layer(middleware::from_fn_with_state(state.clone(), require_session));

    Router::new()
        .merge(protected)
        .route("/login", get(handlers::login_page).post(handlers::login))
        .route("/static/style.css", get(handlers::stylesheet))
        .route("/logo", get(handlers::logo))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Let through requests carrying a known session; send pages to the login
/// form and reject everything else.
async fn require_session(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let token = session_token(request.headers()).map(str::to_owned);
    let authenticated = match token {
        Some(token) => state.gate.is_authenticated(&token).await,
        None => false,
    };
    if authenticated {
        return next.run(request).await;
    }

    if request.uri().path() == "/" {
        Redirect::to("/login").into_response()
    } else {
        AppError::Unauthorized.into_response()
    }
}
