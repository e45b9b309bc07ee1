use crate::error::{ServerError, ServerResult};
use crate::identity::CallerId;
use crate::state::ServerState;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use matcher::{Breakdown, FoundReport, LostReport, MatchResult, MatchableReport, ReportKind};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use store::{ReportFilter, Stored};

const DEFAULT_LIMIT: usize = 50;

/// Match query parameters
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchQuery {
    /// Inclusive score threshold; defaults to the matcher's configured minimum
    pub min_score: Option<u8>,

    /// Maximum pairs returned by the global listing
    pub limit: Option<usize>,
}

impl MatchQuery {
    fn min_score(&self, state: &ServerState) -> ServerResult<u8> {
        match self.min_score {
            Some(score) if score > 100 => Err(ServerError::BadRequest(format!(
                "minScore must be between 0 and 100, got {score}"
            ))),
            Some(score) => Ok(score),
            None => Ok(state.matcher.min_score()),
        }
    }
}

/// A found report matched against a lost subject
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FoundItemMatch<'a> {
    pub found_item: &'a Stored<FoundReport>,
    pub score: u8,
    pub breakdown: Breakdown,
}

/// A lost report matched against a found subject
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LostItemMatch<'a> {
    pub lost_item: &'a Stored<LostReport>,
    pub score: u8,
    pub breakdown: Breakdown,
}

impl<'a> From<MatchResult<'a, Stored<FoundReport>>> for FoundItemMatch<'a> {
    fn from(result: MatchResult<'a, Stored<FoundReport>>) -> Self {
        Self {
            found_item: result.counterpart,
            score: result.score,
            breakdown: result.breakdown,
        }
    }
}

impl<'a> From<MatchResult<'a, Stored<LostReport>>> for LostItemMatch<'a> {
    fn from(result: MatchResult<'a, Stored<LostReport>>) -> Self {
        Self {
            lost_item: result.counterpart,
            score: result.score,
            breakdown: result.breakdown,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LostMatchesResponse<'a> {
    pub lost_item: &'a Stored<LostReport>,
    pub matches: Vec<FoundItemMatch<'a>>,
    pub total_matches: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FoundMatchesResponse<'a> {
    pub found_item: &'a Stored<FoundReport>,
    pub matches: Vec<LostItemMatch<'a>>,
    pub total_matches: usize,
}

/// One lost/found pair in the global listing
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PairEntry<'a> {
    pub lost_item: &'a Stored<LostReport>,
    pub found_item: &'a Stored<FoundReport>,
    pub score: u8,
    pub breakdown: Breakdown,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AllMatchesResponse<'a> {
    pub matches: Vec<PairEntry<'a>>,
    /// Pairs at or above the threshold, counted before `limit` truncation
    pub total_matches: usize,
    pub total_lost_items: usize,
    pub total_found_items: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupedResponse<G> {
    pub matches: Vec<G>,
    pub total_matches: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LostGroup<'a> {
    pub lost_item: &'a Stored<LostReport>,
    pub matches: Vec<FoundItemMatch<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FoundGroup<'a> {
    pub found_item: &'a Stored<FoundReport>,
    pub matches: Vec<LostItemMatch<'a>>,
}

/// Matches for one lost report against all active found reports
pub async fn lost_matches(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<String>,
    query: Result<Query<MatchQuery>, QueryRejection>,
) -> ServerResult<Response> {
    let Query(query) = query.map_err(|e| ServerError::BadRequest(e.body_text()))?;
    let min_score = query.min_score(&state)?;
    let lost = state
        .store
        .get_lost(&id)
        .await?
        .ok_or(ServerError::ReportNotFound(ReportKind::Lost))?;
    if !lost.is_active() {
        return Err(ServerError::InvalidState(ReportKind::Lost));
    }

    let pool = state.store.find_found(&ReportFilter::active()).await?;
    let matches: Vec<FoundItemMatch<'_>> = state
        .matcher
        .match_against_pool(&lost, &pool, min_score)
        .into_iter()
        .map(Into::into)
        .collect();

    tracing::info!(id = %id, pool = pool.len(), hits = matches.len(), "lost report matched");

    let total_matches = matches.len();
    Ok(Json(LostMatchesResponse {
        lost_item: &lost,
        matches,
        total_matches,
    })
    .into_response())
}

/// Matches for one found report against all open lost reports
pub async fn found_matches(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<String>,
    query: Result<Query<MatchQuery>, QueryRejection>,
) -> ServerResult<Response> {
    let Query(query) = query.map_err(|e| ServerError::BadRequest(e.body_text()))?;
    let min_score = query.min_score(&state)?;
    let found = state
        .store
        .get_found(&id)
        .await?
        .ok_or(ServerError::ReportNotFound(ReportKind::Found))?;
    if !found.is_active() {
        return Err(ServerError::InvalidState(ReportKind::Found));
    }

    let pool = state.store.find_lost(&ReportFilter::active()).await?;
    let matches: Vec<LostItemMatch<'_>> = state
        .matcher
        .match_against_pool(&found, &pool, min_score)
        .into_iter()
        .map(Into::into)
        .collect();

    tracing::info!(id = %id, pool = pool.len(), hits = matches.len(), "found report matched");

    let total_matches = matches.len();
    Ok(Json(FoundMatchesResponse {
        found_item: &found,
        matches,
        total_matches,
    })
    .into_response())
}

/// Global listing: every active lost report against every active found report
pub async fn all_matches(
    State(state): State<Arc<ServerState>>,
    query: Result<Query<MatchQuery>, QueryRejection>,
) -> ServerResult<Response> {
    let Query(query) = query.map_err(|e| ServerError::BadRequest(e.body_text()))?;
    let min_score = query.min_score(&state)?;
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT);

    let lost_pool = state.store.find_lost(&ReportFilter::active()).await?;
    let found_pool = state.store.find_found(&ReportFilter::active()).await?;

    let pairs = state
        .matcher
        .match_all_pairs(&lost_pool, &found_pool, min_score);
    let total_matches = pairs.len();

    let matches: Vec<PairEntry<'_>> = pairs
        .into_iter()
        .take(limit)
        .map(|pair| PairEntry {
            lost_item: pair.lost,
            found_item: pair.found,
            score: pair.score,
            breakdown: pair.breakdown,
        })
        .collect();

    tracing::info!(
        lost = lost_pool.len(),
        found = found_pool.len(),
        total_matches,
        returned = matches.len(),
        "global match listing"
    );

    Ok(Json(AllMatchesResponse {
        matches,
        total_matches,
        total_lost_items: lost_pool.len(),
        total_found_items: found_pool.len(),
    })
    .into_response())
}

/// Matches for each of the caller's open lost reports
pub async fn my_lost_matches(
    State(state): State<Arc<ServerState>>,
    Extension(caller): Extension<CallerId>,
    query: Result<Query<MatchQuery>, QueryRejection>,
) -> ServerResult<Response> {
    let Query(query) = query.map_err(|e| ServerError::BadRequest(e.body_text()))?;
    let min_score = query.min_score(&state)?;
    let mine = state
        .store
        .find_lost(&ReportFilter::active().owned_by(caller.as_str()))
        .await?;
    let pool = state.store.find_found(&ReportFilter::active()).await?;

    let groups: Vec<LostGroup<'_>> = mine
        .iter()
        .filter_map(|lost| {
            let matches: Vec<FoundItemMatch<'_>> = state
                .matcher
                .match_against_pool(lost, &pool, min_score)
                .into_iter()
                .map(Into::into)
                .collect();
            (!matches.is_empty()).then_some(LostGroup {
                lost_item: lost,
                matches,
            })
        })
        .collect();
    let total_matches: usize = groups.iter().map(|g| g.matches.len()).sum();

    tracing::info!(caller = %caller, reports = mine.len(), total_matches, "caller lost matches");

    Ok(Json(GroupedResponse {
        matches: groups,
        total_matches,
    })
    .into_response())
}

/// Matches for each of the caller's available found reports
pub async fn my_found_matches(
    State(state): State<Arc<ServerState>>,
    Extension(caller): Extension<CallerId>,
    query: Result<Query<MatchQuery>, QueryRejection>,
) -> ServerResult<Response> {
    let Query(query) = query.map_err(|e| ServerError::BadRequest(e.body_text()))?;
    let min_score = query.min_score(&state)?;
    let mine = state
        .store
        .find_found(&ReportFilter::active().owned_by(caller.as_str()))
        .await?;
    let pool = state.store.find_lost(&ReportFilter::active()).await?;

    let groups: Vec<FoundGroup<'_>> = mine
        .iter()
        .filter_map(|found| {
            let matches: Vec<LostItemMatch<'_>> = state
                .matcher
                .match_against_pool(found, &pool, min_score)
                .into_iter()
                .map(Into::into)
                .collect();
            (!matches.is_empty()).then_some(FoundGroup {
                found_item: found,
                matches,
            })
        })
        .collect();
    let total_matches: usize = groups.iter().map(|g| g.matches.len()).sum();

    tracing::info!(caller = %caller, reports = mine.len(), total_matches, "caller found matches");

    Ok(Json(GroupedResponse {
        matches: groups,
        total_matches,
    })
    .into_response())
}
