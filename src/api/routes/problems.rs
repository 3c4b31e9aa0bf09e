//! Problem routes: create, list and fetch problems.

use axum::{
    Router,
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::get,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;
use uuid::Uuid;

use super::app_state::AppState;
use super::auth_context::AuthContext;
use super::error::ApiError;
use super::solutions;
use crate::models::{ImageDescriptor, Problem, ProblemInput};
use crate::services::graph_validator::GraphPayload;
use crate::services::problem_service::SolutionPayload;

/// Request body for creating a problem together with its creator solution.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProblemRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    #[schema(value_type = Object)]
    pub description: Value,
    #[serde(default)]
    pub difficulty: String,
    #[serde(default)]
    pub hints: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    #[schema(value_type = Vec<Object>)]
    pub images: Vec<ImageDescriptor>,
    /// Diagram payload: a graph object, or the same serialized as a string.
    #[serde(default)]
    #[schema(value_type = Object)]
    pub solution_workspace: Option<GraphPayload>,
    #[serde(default)]
    pub written_solution: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProblemResponse {
    pub id: Uuid,
    pub public_id: String,
    pub title: String,
    pub difficulty: String,
    pub has_best_solution: bool,
    pub total_solutions_count: usize,
}

/// One row of the problem index.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProblemSummary {
    pub public_id: String,
    pub title: String,
    pub difficulty: String,
    pub tags: Vec<String>,
    pub status: String,
    pub views: i64,
    pub likes: i64,
    pub has_best_solution: bool,
    pub total_solutions_count: usize,
    pub created_at: DateTime<Utc>,
}

impl From<&Problem> for ProblemSummary {
    fn from(problem: &Problem) -> Self {
        Self {
            public_id: problem.public_id.clone(),
            title: problem.title.clone(),
            difficulty: problem.difficulty.to_string(),
            tags: problem.tags.clone(),
            status: problem.status.to_string(),
            views: problem.views,
            likes: problem.likes,
            has_best_solution: problem.best_solution.is_some(),
            total_solutions_count: problem.total_solutions(),
            created_at: problem.created_at,
        }
    }
}

/// Create the problems router
pub fn problems_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_problems).post(create_problem))
        .route("/{public_id}", get(get_problem))
        .nest("/{public_id}/solutions", solutions::solutions_router())
}

/// POST /problems - Create a problem with the creator's solution
#[utoipa::path(
    post,
    path = "/problems",
    tag = "Problems",
    request_body = CreateProblemRequest,
    responses(
        (status = 201, description = "Problem created", body = CreateProblemResponse),
        (status = 400, description = "Validation failure or incomplete creator solution")
    )
)]
pub async fn create_problem(
    State(state): State<AppState>,
    auth: AuthContext,
    Json(req): Json<CreateProblemRequest>,
) -> Result<(StatusCode, Json<CreateProblemResponse>), ApiError> {
    let input = ProblemInput {
        title: req.title,
        description: req.description,
        difficulty: req.difficulty,
        hints: req.hints,
        tags: req.tags,
        images: req.images,
    };
    let payload = SolutionPayload {
        solution_workspace: req.solution_workspace,
        written_solution: req.written_solution,
    };

    let problem = state
        .problems
        .create_problem(input, payload, auth.user_id)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateProblemResponse {
            id: problem.id,
            public_id: problem.public_id.clone(),
            title: problem.title.clone(),
            difficulty: problem.difficulty.to_string(),
            has_best_solution: problem.best_solution.is_some(),
            total_solutions_count: problem.total_solutions(),
        }),
    ))
}

/// GET /problems - List all problems
#[utoipa::path(
    get,
    path = "/problems",
    tag = "Problems",
    responses(
        (status = 200, description = "Problem index", body = Vec<ProblemSummary>)
    )
)]
pub async fn list_problems(
    State(state): State<AppState>,
) -> Result<Json<Vec<ProblemSummary>>, ApiError> {
    let problems = state.problems.list_problems().await?;
    let summaries = problems.iter().map(ProblemSummary::from).collect();
    Ok(Json(summaries))
}

/// GET /problems/{public_id} - Fetch one problem, counting the view
#[utoipa::path(
    get,
    path = "/problems/{public_id}",
    tag = "Problems",
    params(("public_id" = String, Path, description = "Public problem id")),
    responses(
        (status = 200, description = "The problem with its solutions", body = Object),
        (status = 404, description = "Unknown problem id")
    )
)]
pub async fn get_problem(
    State(state): State<AppState>,
    Path(public_id): Path<String>,
) -> Result<Json<Problem>, ApiError> {
    let problem = state.problems.get_problem(&public_id).await?;
    Ok(Json(problem))
}
