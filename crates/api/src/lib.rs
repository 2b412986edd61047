mod env;
mod global_state;
mod middleware;
mod response;
mod routes;
mod utils;

use std::time::Duration;

use axum::extract::DefaultBodyLimit;
use axum::{routing::get, Router};
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};

use referral_runtime::ReferralStore;

pub use env::ApiServerEnv;
pub use global_state::GlobalState;
pub use middleware::{
    authenticate, issue_auth_token, verify_auth_token, AuthConfig, AuthenticatedRequest,
    AuthenticatedUser, MISSING_TOKEN, TOKEN_ORIGIN,
};
pub use response::{AppError, AppSuccess, Message, STALE_REFERRALS_HEADER};
pub use routes::{misc_routes, referral_routes, route_not_found};
pub use utils::{extract_auth_token, setup_tracing, AUTH_TOKEN_HEADER, INVALID_TOKEN};

pub const BODY_LIMIT_BYTES: usize = 10 * 1024 * 1024;

/// The full HTTP surface: every route under `/api`, `/health` at the root,
/// and a JSON 404 for anything else.
pub fn build_router<S: ReferralStore>(state: GlobalState<S>, request_timeout: Duration) -> Router {
    let api = Router::new()
        .merge(misc_routes())
        .merge(referral_routes(state.auth.clone()));

    Router::new()
        .route("/health", get(|| async { "OK" }))
        .nest("/api", api)
        .fallback(route_not_found)
        .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES))
        .layer(TimeoutLayer::new(request_timeout))
        .layer(CorsLayer::very_permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
