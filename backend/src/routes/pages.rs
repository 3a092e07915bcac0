//! Dashboard page routes
//!
//! The admin screens are a prebuilt static bundle. Everything under
//! `/dashboard` sits behind the session-cookie gate; the sign-in page does
//! not.

use crate::auth::require_session;
use crate::state::AppState;
use axum::{
    middleware,
    response::Redirect,
    routing::{get, get_service},
    Router,
};
use tower_http::services::{ServeDir, ServeFile};

/// Page routes, rooted at the configured pages directory
pub fn page_routes(state: &AppState) -> Router<AppState> {
    let config = state.config();
    let root = &config.pages.root;

    let protected = Router::new()
        .nest_service("/dashboard", ServeDir::new(root.join("dashboard")))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_session));

    Router::new()
        .route("/", get(|| async { Redirect::temporary("/dashboard") }))
        .route(
            &config.auth.sign_in_path,
            get_service(ServeFile::new(root.join("sign-in.html"))),
        )
        .merge(protected)
}
