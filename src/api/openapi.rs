//! OpenAPI specification definition.
//!
//! Aggregates all route handlers and schemas for OpenAPI documentation generation.

use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        // Authentication
        crate::routes::auth::register,
        crate::routes::auth::signin,
        crate::routes::auth::refresh,
        // Images
        crate::routes::images::upload_images,
        // Problems
        crate::routes::problems::create_problem,
        crate::routes::problems::list_problems,
        crate::routes::problems::get_problem,
        // Solutions
        crate::routes::solutions::get_solutions,
        crate::routes::solutions::submit_solution,
        crate::routes::solutions::list_my_solutions,
        crate::routes::solutions::update_solution,
        crate::routes::solutions::delete_solution,
        crate::routes::solutions::upvote_solution,
        crate::routes::solutions::promote_solution,
    ),
    components(schemas(
        crate::routes::auth::RegisterRequest,
        crate::routes::auth::RegisterResponse,
        crate::routes::auth::SigninRequest,
        crate::routes::auth::SigninResponse,
        crate::routes::auth::RefreshRequest,
        crate::routes::images::UploadImagesResponse,
        crate::routes::problems::CreateProblemRequest,
        crate::routes::problems::CreateProblemResponse,
        crate::routes::problems::ProblemSummary,
        crate::routes::solutions::SolutionRequest,
        crate::routes::solutions::SubmitSolutionResponse,
        crate::routes::solutions::SolutionsResponse,
        crate::routes::solutions::DeleteSolutionResponse,
        crate::routes::solutions::UpvoteResponse,
    )),
    tags(
        (name = "Auth", description = "Registration and sign-in"),
        (name = "Images", description = "Statement image uploads"),
        (name = "Problems", description = "System design problems"),
        (name = "Solutions", description = "Solution submission and voting")
    ),
    info(
        title = "System Design API",
        description = "Practice platform for system design problems: author problems, \
                       submit diagram or written solutions, vote and promote the best one.",
        version = "1.0.0"
    )
)]
pub struct ApiDoc;
