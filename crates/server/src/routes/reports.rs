use crate::error::{ServerError, ServerResult};
use crate::identity::CallerId;
use crate::state::ServerState;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{Extension, Json};
use matcher::{
    Category, FoundReport, FoundStatus, LostReport, LostStatus, MatchableReport, ReportKind,
};
use serde::Deserialize;
use std::sync::Arc;
use store::{ReportFilter, Stored, UpdateOutcome};

/// List filters for lost reports
#[derive(Debug, Default, Deserialize)]
pub struct LostListQuery {
    pub category: Option<Category>,
    pub status: Option<LostStatus>,
    /// Only the caller's own reports
    #[serde(default)]
    pub mine: bool,
}

/// List filters for found reports
#[derive(Debug, Default, Deserialize)]
pub struct FoundListQuery {
    pub category: Option<Category>,
    pub status: Option<FoundStatus>,
    #[serde(default)]
    pub mine: bool,
}

fn base_filter(caller: &CallerId, category: Option<Category>, mine: bool) -> ReportFilter {
    let mut filter = ReportFilter::new();
    if mine {
        filter = filter.owned_by(caller.as_str());
    }
    if let Some(category) = category {
        filter = filter.with_category(category);
    }
    filter
}

fn require_title<R: MatchableReport>(report: &R) -> ServerResult<()> {
    if report.title().trim().is_empty() {
        return Err(ServerError::BadRequest("title must not be empty".to_string()));
    }
    Ok(())
}

fn require_owner<R>(doc: &Stored<R>, caller: &CallerId, action: &str) -> ServerResult<()> {
    if doc.owner_id != caller.as_str() {
        return Err(ServerError::Forbidden(format!(
            "Only the reporter can {action} this item"
        )));
    }
    Ok(())
}

async fn load_lost(state: &ServerState, id: &str) -> ServerResult<Stored<LostReport>> {
    state
        .store
        .get_lost(id)
        .await?
        .ok_or(ServerError::ReportNotFound(ReportKind::Lost))
}

async fn load_found(state: &ServerState, id: &str) -> ServerResult<Stored<FoundReport>> {
    state
        .store
        .get_found(id)
        .await?
        .ok_or(ServerError::ReportNotFound(ReportKind::Found))
}

/// Create a lost report owned by the caller
///
/// New reports always start open, whatever status the body carries.
pub async fn create_lost(
    State(state): State<Arc<ServerState>>,
    Extension(caller): Extension<CallerId>,
    payload: Result<Json<LostReport>, JsonRejection>,
) -> ServerResult<impl IntoResponse> {
    let Json(mut report) = payload.map_err(|e| ServerError::BadRequest(e.body_text()))?;
    require_title(&report)?;
    report.status = LostStatus::Open;

    let doc = state.store.insert_lost(caller.as_str(), report).await?;
    tracing::info!(id = %doc.id, caller = %caller, category = %doc.report.category, "lost report created");

    Ok((StatusCode::CREATED, Json(doc)))
}

/// Create a found report owned by the caller
pub async fn create_found(
    State(state): State<Arc<ServerState>>,
    Extension(caller): Extension<CallerId>,
    payload: Result<Json<FoundReport>, JsonRejection>,
) -> ServerResult<impl IntoResponse> {
    let Json(mut report) = payload.map_err(|e| ServerError::BadRequest(e.body_text()))?;
    require_title(&report)?;
    report.status = FoundStatus::Available;
    report.returned = false;

    let doc = state.store.insert_found(caller.as_str(), report).await?;
    tracing::info!(id = %doc.id, caller = %caller, category = %doc.report.category, "found report created");

    Ok((StatusCode::CREATED, Json(doc)))
}

/// List lost reports
pub async fn list_lost(
    State(state): State<Arc<ServerState>>,
    Extension(caller): Extension<CallerId>,
    query: Result<Query<LostListQuery>, QueryRejection>,
) -> ServerResult<impl IntoResponse> {
    let Query(query) = query.map_err(|e| ServerError::BadRequest(e.body_text()))?;
    let mut filter = base_filter(&caller, query.category, query.mine);
    if let Some(status) = query.status {
        filter = filter.with_lost_status(status);
    }
    let docs = state.store.find_lost(&filter).await?;
    Ok(Json(docs))
}

/// List found reports
pub async fn list_found(
    State(state): State<Arc<ServerState>>,
    Extension(caller): Extension<CallerId>,
    query: Result<Query<FoundListQuery>, QueryRejection>,
) -> ServerResult<impl IntoResponse> {
    let Query(query) = query.map_err(|e| ServerError::BadRequest(e.body_text()))?;
    let mut filter = base_filter(&caller, query.category, query.mine);
    if let Some(status) = query.status {
        filter = filter.with_found_status(status);
    }
    let docs = state.store.find_found(&filter).await?;
    Ok(Json(docs))
}

/// Fetch one lost report
pub async fn get_lost(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<String>,
) -> ServerResult<impl IntoResponse> {
    Ok(Json(load_lost(&state, &id).await?))
}

/// Fetch one found report
pub async fn get_found(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<String>,
) -> ServerResult<impl IntoResponse> {
    Ok(Json(load_found(&state, &id).await?))
}

/// Owner marks a lost report resolved
pub async fn resolve_lost(
    State(state): State<Arc<ServerState>>,
    Extension(caller): Extension<CallerId>,
    Path(id): Path<String>,
) -> ServerResult<impl IntoResponse> {
    let resolve = |doc: &Stored<LostReport>| {
        (doc.owner_id == caller.as_str() && doc.report.status != LostStatus::Resolved).then(|| {
            LostReport {
                status: LostStatus::Resolved,
                ..doc.report.clone()
            }
        })
    };

    let updated = match state.store.update_lost_if(&id, &resolve).await? {
        UpdateOutcome::Updated(doc) => doc,
        UpdateOutcome::Rejected(doc) => {
            require_owner(&doc, &caller, "resolve")?;
            return Err(ServerError::InvalidState(ReportKind::Lost));
        }
        UpdateOutcome::Missing => return Err(ServerError::ReportNotFound(ReportKind::Lost)),
    };

    tracing::info!(id = %id, caller = %caller, "lost report resolved");
    Ok(Json(updated))
}

/// A non-owner claims an available found report
///
/// The availability check and the status change happen under one store
/// write, so two concurrent claims cannot both succeed.
pub async fn claim_found(
    State(state): State<Arc<ServerState>>,
    Extension(caller): Extension<CallerId>,
    Path(id): Path<String>,
) -> ServerResult<impl IntoResponse> {
    let claim = |doc: &Stored<FoundReport>| {
        (doc.owner_id != caller.as_str() && doc.report.is_active()).then(|| FoundReport {
            status: FoundStatus::Claimed,
            ..doc.report.clone()
        })
    };

    let updated = match state.store.update_found_if(&id, &claim).await? {
        UpdateOutcome::Updated(doc) => doc,
        UpdateOutcome::Rejected(doc) if doc.owner_id == caller.as_str() => {
            return Err(ServerError::Forbidden(
                "You cannot claim an item you reported".to_string(),
            ));
        }
        UpdateOutcome::Rejected(_) => return Err(ServerError::InvalidState(ReportKind::Found)),
        UpdateOutcome::Missing => return Err(ServerError::ReportNotFound(ReportKind::Found)),
    };

    tracing::info!(id = %id, caller = %caller, "found report claimed");
    Ok(Json(updated))
}

/// Owner marks a found report returned to its owner
pub async fn return_found(
    State(state): State<Arc<ServerState>>,
    Extension(caller): Extension<CallerId>,
    Path(id): Path<String>,
) -> ServerResult<impl IntoResponse> {
    let hand_back = |doc: &Stored<FoundReport>| {
        (doc.owner_id == caller.as_str() && !doc.report.returned).then(|| FoundReport {
            returned: true,
            ..doc.report.clone()
        })
    };

    let updated = match state.store.update_found_if(&id, &hand_back).await? {
        UpdateOutcome::Updated(doc) => doc,
        UpdateOutcome::Rejected(doc) => {
            require_owner(&doc, &caller, "return")?;
            return Err(ServerError::InvalidState(ReportKind::Found));
        }
        UpdateOutcome::Missing => return Err(ServerError::ReportNotFound(ReportKind::Found)),
    };

    tracing::info!(id = %id, caller = %caller, "found report returned");
    Ok(Json(updated))
}

/// Owner deletes a lost report
pub async fn delete_lost(
    State(state): State<Arc<ServerState>>,
    Extension(caller): Extension<CallerId>,
    Path(id): Path<String>,
) -> ServerResult<impl IntoResponse> {
    let doc = load_lost(&state, &id).await?;
    require_owner(&doc, &caller, "delete")?;
    if !state.store.delete_lost(&id).await? {
        return Err(ServerError::ReportNotFound(ReportKind::Lost));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// Owner deletes a found report
pub async fn delete_found(
    State(state): State<Arc<ServerState>>,
    Extension(caller): Extension<CallerId>,
    Path(id): Path<String>,
) -> ServerResult<impl IntoResponse> {
    let doc = load_found(&state, &id).await?;
    require_owner(&doc, &caller, "delete")?;
    if !state.store.delete_found(&id).await? {
        return Err(ServerError::ReportNotFound(ReportKind::Found));
    }
    Ok(StatusCode::NO_CONTENT)
}
