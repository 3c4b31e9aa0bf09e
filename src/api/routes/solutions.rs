//! Solution routes, nested under `/problems/{public_id}/solutions`.
//!
//! Submission, listing, editing, deletion, upvoting and promotion of
//! solution records. Every write requires an authenticated caller; the
//! ownership rules themselves live in the problem service.

use axum::{
    Router,
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{get, post, put},
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::app_state::AppState;
use super::auth_context::AuthContext;
use super::error::ApiError;
use crate::models::SolutionRecord;
use crate::services::graph_validator::GraphPayload;
use crate::services::problem_service::SolutionPayload;

/// Request body for submitting or editing a solution.
#[derive(Debug, Deserialize, Default, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SolutionRequest {
    /// Diagram payload: a graph object, or the same serialized as a string.
    #[serde(default)]
    #[schema(value_type = Object)]
    pub solution_workspace: Option<GraphPayload>,
    #[serde(default)]
    pub written_solution: Option<String>,
}

impl From<SolutionRequest> for SolutionPayload {
    fn from(req: SolutionRequest) -> Self {
        Self {
            solution_workspace: req.solution_workspace,
            written_solution: req.written_solution,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitSolutionResponse {
    pub solution_id: Uuid,
    pub total_solutions: usize,
    pub user_solutions_count: usize,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SolutionsResponse {
    #[schema(value_type = Object)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub best_solution: Option<SolutionRecord>,
    #[schema(value_type = Vec<Object>)]
    pub user_solutions: Vec<SolutionRecord>,
    pub total_solutions: usize,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeleteSolutionResponse {
    pub remaining_solutions: usize,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UpvoteResponse {
    pub votes: i64,
}

/// Create the solutions router (nested under a problem path)
pub fn solutions_router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_solutions).post(submit_solution))
        .route("/mine", get(list_my_solutions))
        .route("/{solution_id}", put(update_solution).delete(delete_solution))
        .route("/{solution_id}/upvote", post(upvote_solution))
        .route("/{solution_id}/promote", post(promote_solution))
}

/// GET /problems/{public_id}/solutions - Best solution plus all user
/// solutions, sorted by votes descending
#[utoipa::path(
    get,
    path = "/problems/{public_id}/solutions",
    tag = "Solutions",
    params(("public_id" = String, Path, description = "Public problem id")),
    responses(
        (status = 200, description = "Solutions for the problem", body = SolutionsResponse),
        (status = 404, description = "Unknown problem id")
    )
)]
pub async fn get_solutions(
    State(state): State<AppState>,
    Path(public_id): Path<String>,
) -> Result<Json<SolutionsResponse>, ApiError> {
    let (best_solution, user_solutions) =
        state.problems.get_problem_solutions(&public_id).await?;
    let total_solutions = user_solutions.len();
    Ok(Json(SolutionsResponse {
        best_solution,
        user_solutions,
        total_solutions,
    }))
}

/// POST /problems/{public_id}/solutions - Submit a new solution
#[utoipa::path(
    post,
    path = "/problems/{public_id}/solutions",
    tag = "Solutions",
    params(("public_id" = String, Path, description = "Public problem id")),
    request_body = SolutionRequest,
    responses(
        (status = 201, description = "Solution recorded", body = SubmitSolutionResponse),
        (status = 400, description = "Neither a workspace design nor written text"),
        (status = 404, description = "Unknown problem id")
    )
)]
pub async fn submit_solution(
    State(state): State<AppState>,
    Path(public_id): Path<String>,
    auth: AuthContext,
    Json(req): Json<SolutionRequest>,
) -> Result<(StatusCode, Json<SubmitSolutionResponse>), ApiError> {
    let outcome = state
        .problems
        .submit_user_solution(&public_id, auth.user_id, req.into())
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(SubmitSolutionResponse {
            solution_id: outcome.solution_id,
            total_solutions: outcome.counts.total,
            user_solutions_count: outcome.counts.by_user,
        }),
    ))
}

/// GET /problems/{public_id}/solutions/mine - The caller's own solutions,
/// most recent first
#[utoipa::path(
    get,
    path = "/problems/{public_id}/solutions/mine",
    tag = "Solutions",
    params(("public_id" = String, Path, description = "Public problem id")),
    responses(
        (status = 200, description = "The caller's solutions", body = Vec<Object>),
        (status = 404, description = "Unknown problem id")
    )
)]
pub async fn list_my_solutions(
    State(state): State<AppState>,
    Path(public_id): Path<String>,
    auth: AuthContext,
) -> Result<Json<Vec<SolutionRecord>>, ApiError> {
    let solutions = state
        .problems
        .list_user_solutions(&public_id, auth.user_id)
        .await?;
    Ok(Json(solutions))
}

/// PUT /problems/{public_id}/solutions/{solution_id} - Edit a solution
#[utoipa::path(
    put,
    path = "/problems/{public_id}/solutions/{solution_id}",
    tag = "Solutions",
    params(
        ("public_id" = String, Path, description = "Public problem id"),
        ("solution_id" = Uuid, Path, description = "Solution record id")
    ),
    request_body = SolutionRequest,
    responses(
        (status = 200, description = "Updated record", body = Object),
        (status = 400, description = "Edit would leave the record without any solution"),
        (status = 403, description = "Caller is not the submitter"),
        (status = 404, description = "Unknown problem or solution id")
    )
)]
pub async fn update_solution(
    State(state): State<AppState>,
    Path((public_id, solution_id)): Path<(String, Uuid)>,
    auth: AuthContext,
    Json(req): Json<SolutionRequest>,
) -> Result<Json<SolutionRecord>, ApiError> {
    let record = state
        .problems
        .update_user_solution(&public_id, solution_id, auth.user_id, req.into())
        .await?;
    Ok(Json(record))
}

/// DELETE /problems/{public_id}/solutions/{solution_id} - Remove a solution
#[utoipa::path(
    delete,
    path = "/problems/{public_id}/solutions/{solution_id}",
    tag = "Solutions",
    params(
        ("public_id" = String, Path, description = "Public problem id"),
        ("solution_id" = Uuid, Path, description = "Solution record id")
    ),
    responses(
        (status = 200, description = "Record removed", body = DeleteSolutionResponse),
        (status = 403, description = "Caller is not the submitter"),
        (status = 404, description = "Unknown problem or solution id")
    )
)]
pub async fn delete_solution(
    State(state): State<AppState>,
    Path((public_id, solution_id)): Path<(String, Uuid)>,
    auth: AuthContext,
) -> Result<Json<DeleteSolutionResponse>, ApiError> {
    let remaining_solutions = state
        .problems
        .delete_user_solution(&public_id, solution_id, auth.user_id)
        .await?;
    Ok(Json(DeleteSolutionResponse {
        remaining_solutions,
    }))
}

/// POST /problems/{public_id}/solutions/{solution_id}/upvote - Upvote
///
/// Any authenticated user may upvote, any number of times; the increment is
/// atomic at the storage layer.
#[utoipa::path(
    post,
    path = "/problems/{public_id}/solutions/{solution_id}/upvote",
    tag = "Solutions",
    params(
        ("public_id" = String, Path, description = "Public problem id"),
        ("solution_id" = Uuid, Path, description = "Solution record id")
    ),
    responses(
        (status = 200, description = "New vote total", body = UpvoteResponse),
        (status = 404, description = "Unknown problem or solution id")
    )
)]
pub async fn upvote_solution(
    State(state): State<AppState>,
    Path((public_id, solution_id)): Path<(String, Uuid)>,
    _auth: AuthContext,
) -> Result<Json<UpvoteResponse>, ApiError> {
    let votes = state
        .problems
        .upvote_solution(&public_id, solution_id)
        .await?;
    Ok(Json(UpvoteResponse { votes }))
}

/// POST /problems/{public_id}/solutions/{solution_id}/promote - Copy a user
/// solution into the best-solution slot (problem creator only)
#[utoipa::path(
    post,
    path = "/problems/{public_id}/solutions/{solution_id}/promote",
    tag = "Solutions",
    params(
        ("public_id" = String, Path, description = "Public problem id"),
        ("solution_id" = Uuid, Path, description = "Solution record id")
    ),
    responses(
        (status = 200, description = "The promoted record, now the best solution", body = Object),
        (status = 403, description = "Caller is not the problem creator"),
        (status = 404, description = "Unknown problem or solution id")
    )
)]
pub async fn promote_solution(
    State(state): State<AppState>,
    Path((public_id, solution_id)): Path<(String, Uuid)>,
    auth: AuthContext,
) -> Result<Json<SolutionRecord>, ApiError> {
    let record = state
        .problems
        .set_best_solution(&public_id, solution_id, auth.user_id)
        .await?;
    Ok(Json(record))
}
