use axum::extract::rejection::JsonRejection;
use axum::extract::{Extension, Path, State};
use axum::{
    middleware,
    routing::{delete, get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use referral_runtime::view::{split_stale, ReceivedReferral, ReferralDetail, ReferralView, SentReferral};
use referral_runtime::{CleanupReport, ReferralStore, REJECTED_RETENTION_HOURS};

use crate::global_state::GlobalState;
use crate::middleware::{authenticate, AuthConfig, AuthenticatedUser};
use crate::response::{AppError, AppSuccess, Message};

/// Static paths are matched ahead of `{id}`, so `/referrals/sent` never
/// reaches the single-referral handlers.
pub fn referral_routes<S: ReferralStore>(auth: AuthConfig) -> Router<GlobalState<S>> {
    let auth_layer = || middleware::from_fn_with_state(auth.clone(), authenticate);

    Router::new()
        .route("/referrals/sent",
            get(list_sent::<S>)
            .route_layer(auth_layer())
        )
        .route("/referrals/received",
            get(list_received::<S>)
            .route_layer(auth_layer())
        )

        // called by external schedulers
        .route("/referrals/cleanup-rejected",
            get(cleanup_rejected::<S>)
        )

        .route("/referrals/clear-all",
            delete(clear_all::<S>)
            .route_layer(auth_layer())
        )
        .route("/referrals/cleanup",
            delete(sweep_orphaned::<S>)
            .route_layer(auth_layer())
        )

        .route("/referrals/{id}",
            get(get_referral::<S>)
            .put(update_status::<S>)
            .delete(delete_referral::<S>)
            .route_layer(auth_layer())
        )
        .route("/referrals",
            post(create_referral::<S>)
            .route_layer(auth_layer())
        )
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct CreateReferralRequest {
    #[serde(default)]
    pub job: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct UpdateStatusRequest {
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanupResponse {
    pub msg: String,
    #[serde(flatten)]
    pub report: CleanupReport,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClearAllResponse {
    pub msg: String,
    pub deleted_count: u64,
    pub user_name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SweepResponse {
    pub msg: String,
    pub deleted_count: u64,
}

async fn list_sent<S: ReferralStore>(
    State(state): State<GlobalState<S>>,
    Extension(auth): Extension<AuthenticatedUser>,
) -> Result<AppSuccess<Vec<SentReferral>>, AppError> {
    let actor = state.manager.resolve_actor(&auth.user_id).await?;
    let (referrals, stale) = split_stale(state.manager.list_sent(&actor).await?);
    Ok(AppSuccess::ok(referrals).with_stale_entries(stale))
}

async fn list_received<S: ReferralStore>(
    State(state): State<GlobalState<S>>,
    Extension(auth): Extension<AuthenticatedUser>,
) -> Result<AppSuccess<Vec<ReceivedReferral>>, AppError> {
    let actor = state.manager.resolve_actor(&auth.user_id).await?;
    let (referrals, stale) = split_stale(state.manager.list_received(&actor).await?);
    Ok(AppSuccess::ok(referrals).with_stale_entries(stale))
}

async fn cleanup_rejected<S: ReferralStore>(
    State(state): State<GlobalState<S>>,
) -> Result<AppSuccess<CleanupResponse>, AppError> {
    let now: DateTime<Utc> = Utc::now();
    let report = state.manager.cleanup_rejected(now).await?;

    Ok(AppSuccess::ok(CleanupResponse {
        msg: format!(
            "Auto-deleted {} rejected referrals older than {} hours",
            report.deleted_count, REJECTED_RETENTION_HOURS
        ),
        report,
    }))
}

async fn clear_all<S: ReferralStore>(
    State(state): State<GlobalState<S>>,
    Extension(auth): Extension<AuthenticatedUser>,
) -> Result<AppSuccess<ClearAllResponse>, AppError> {
    let actor = state.manager.resolve_actor(&auth.user_id).await?;
    let report = state.manager.clear_all(&actor).await?;

    Ok(AppSuccess::ok(ClearAllResponse {
        msg: format!("Successfully cleared {} referrals", report.deleted_count),
        deleted_count: report.deleted_count,
        user_name: report.user_name,
    }))
}

async fn sweep_orphaned<S: ReferralStore>(
    State(state): State<GlobalState<S>>,
    Extension(auth): Extension<AuthenticatedUser>,
) -> Result<AppSuccess<SweepResponse>, AppError> {
    state.manager.resolve_actor(&auth.user_id).await?;
    let report = state.manager.sweep_orphaned().await?;

    Ok(AppSuccess::ok(SweepResponse {
        msg: format!(
            "Cleanup completed. Removed {} referrals with deleted jobs.",
            report.deleted_count
        ),
        deleted_count: report.deleted_count,
    }))
}

async fn get_referral<S: ReferralStore>(
    State(state): State<GlobalState<S>>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> Result<AppSuccess<ReferralDetail>, AppError> {
    let actor = state.manager.resolve_actor(&auth.user_id).await?;
    let referral = state.manager.get(&actor, &id).await?;
    Ok(AppSuccess::ok(referral))
}

async fn create_referral<S: ReferralStore>(
    State(state): State<GlobalState<S>>,
    Extension(auth): Extension<AuthenticatedUser>,
    payload: Result<Json<CreateReferralRequest>, JsonRejection>,
) -> Result<AppSuccess<ReferralView>, AppError> {
    let actor = state.manager.resolve_actor(&auth.user_id).await?;
    let Json(payload) = payload?;

    let referral = state.manager.create(&actor, payload.job.as_deref()).await?;
    Ok(AppSuccess::ok(ReferralView::from(&referral)))
}

async fn update_status<S: ReferralStore>(
    State(state): State<GlobalState<S>>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateStatusRequest>, JsonRejection>,
) -> Result<AppSuccess<ReferralView>, AppError> {
    let actor = state.manager.resolve_actor(&auth.user_id).await?;
    let Json(payload) = payload?;

    let referral = state.manager.update_status(&actor, &id, payload.status.as_deref()).await?;
    Ok(AppSuccess::ok(ReferralView::from(&referral)))
}

async fn delete_referral<S: ReferralStore>(
    State(state): State<GlobalState<S>>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> Result<AppSuccess<Message>, AppError> {
    let actor = state.manager.resolve_actor(&auth.user_id).await?;
    state.manager.delete(&actor, &id).await?;
    Ok(AppSuccess::ok(Message::new("Referral removed successfully")))
}
