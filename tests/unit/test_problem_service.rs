//! Solution lifecycle tests against the in-memory store: creation,
//! submission, ownership checks, voting, promotion and read paths.

use std::sync::Arc;

use serde_json::json;
use uuid::Uuid;

use system_design_api::models::ProblemInput;
use system_design_api::services::graph_validator::GraphPayload;
use system_design_api::services::image_service::MemoryImageStore;
use system_design_api::services::problem_service::{ProblemService, SolutionPayload};
use system_design_api::storage::{MemoryStore, ProblemError};

fn service() -> ProblemService {
    ProblemService::new(Arc::new(MemoryStore::new()), Arc::new(MemoryImageStore::new()))
}

fn problem_input(title: &str) -> ProblemInput {
    ProblemInput {
        title: title.to_string(),
        description: json!({"blocks": [{"type": "paragraph", "data": {"text": "desc"}}]}),
        difficulty: "Medium".to_string(),
        hints: Vec::new(),
        tags: vec!["scalability".to_string()],
        images: Vec::new(),
    }
}

fn written(text: &str) -> SolutionPayload {
    SolutionPayload {
        solution_workspace: None,
        written_solution: Some(text.to_string()),
    }
}

fn diagram(node_ids: &[&str]) -> SolutionPayload {
    let nodes: Vec<_> = node_ids.iter().map(|id| json!({"id": id})).collect();
    SolutionPayload {
        solution_workspace: Some(GraphPayload::Structured(
            json!({"nodes": nodes, "edges": [], "notes": ""}),
        )),
        written_solution: None,
    }
}

async fn create_problem(service: &ProblemService, creator: Uuid) -> String {
    service
        .create_problem(
            problem_input("Design a URL Shortener"),
            written("Use base62 encoding of a sequence number"),
            creator,
        )
        .await
        .unwrap()
        .public_id
}

#[tokio::test]
async fn test_create_problem_stores_approved_best_solution() {
    let service = service();
    let creator = Uuid::new_v4();

    let problem = service
        .create_problem(problem_input("Design a Rate Limiter"), diagram(&["lb", "api"]), creator)
        .await
        .unwrap();

    assert_eq!(problem.difficulty.to_string(), "medium");
    let best = problem.best_solution.expect("creator solution stored as best");
    assert!(best.is_approved);
    assert_eq!(best.votes, 0);
    assert_eq!(best.submitted_by, creator);
    assert_eq!(best.solution_workspace.unwrap().nodes.len(), 2);
    assert!(problem.user_solutions.is_empty());
}

#[tokio::test]
async fn test_create_problem_without_any_solution_fails() {
    let service = service();
    let result = service
        .create_problem(
            problem_input("Design something"),
            SolutionPayload::default(),
            Uuid::new_v4(),
        )
        .await;
    assert!(matches!(result, Err(ProblemError::IncompleteSolution)));
}

#[tokio::test]
async fn test_create_problem_with_four_hints_fails() {
    let service = service();
    let mut input = problem_input("Design a Feed");
    input.hints = (1..=4).map(|i| format!("hint {i}")).collect();

    let result = service
        .create_problem(input, written("answer"), Uuid::new_v4())
        .await;
    match result {
        Err(ProblemError::Validation { fields }) => {
            assert_eq!(fields[0].field, "hints");
        }
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_same_user_may_submit_repeatedly() {
    let service = service();
    let public_id = create_problem(&service, Uuid::new_v4()).await;
    let solver = Uuid::new_v4();

    let first = service
        .submit_user_solution(&public_id, solver, written("attempt one"))
        .await
        .unwrap();
    assert_eq!(first.counts.by_user, 1);
    assert_eq!(first.counts.total, 1);

    let second = service
        .submit_user_solution(&public_id, solver, written("attempt two"))
        .await
        .unwrap();
    assert_eq!(second.counts.by_user, 2);
    assert_eq!(second.counts.total, 2);
    assert_ne!(first.solution_id, second.solution_id);
}

#[tokio::test]
async fn test_submit_to_unknown_problem_fails_not_found() {
    let service = service();
    let result = service
        .submit_user_solution("nope", Uuid::new_v4(), written("x"))
        .await;
    assert!(matches!(result, Err(ProblemError::NotFound { .. })));
}

#[tokio::test]
async fn test_incomplete_submission_is_rejected() {
    let service = service();
    let public_id = create_problem(&service, Uuid::new_v4()).await;

    let result = service
        .submit_user_solution(&public_id, Uuid::new_v4(), written("   "))
        .await;
    assert!(matches!(result, Err(ProblemError::IncompleteSolution)));
}

#[tokio::test]
async fn test_list_user_solutions_returns_own_newest_first() {
    let service = service();
    let public_id = create_problem(&service, Uuid::new_v4()).await;
    let solver = Uuid::new_v4();
    let rival = Uuid::new_v4();

    let first = service
        .submit_user_solution(&public_id, solver, written("first"))
        .await
        .unwrap();
    service
        .submit_user_solution(&public_id, rival, written("rival's"))
        .await
        .unwrap();
    let second = service
        .submit_user_solution(&public_id, solver, written("second"))
        .await
        .unwrap();

    let mine = service.list_user_solutions(&public_id, solver).await.unwrap();
    assert_eq!(mine.len(), 2);
    assert_eq!(mine[0].id, second.solution_id);
    assert_eq!(mine[1].id, first.solution_id);
}

#[tokio::test]
async fn test_delete_requires_ownership() {
    let service = service();
    let public_id = create_problem(&service, Uuid::new_v4()).await;
    let solver = Uuid::new_v4();

    let submitted = service
        .submit_user_solution(&public_id, solver, written("mine"))
        .await
        .unwrap();

    let result = service
        .delete_user_solution(&public_id, submitted.solution_id, Uuid::new_v4())
        .await;
    assert!(matches!(result, Err(ProblemError::Forbidden { .. })));

    // The record is untouched.
    let (_, solutions) = service.get_problem_solutions(&public_id).await.unwrap();
    assert_eq!(solutions.len(), 1);

    let remaining = service
        .delete_user_solution(&public_id, submitted.solution_id, solver)
        .await
        .unwrap();
    assert_eq!(remaining, 0);
}

#[tokio::test]
async fn test_update_requires_ownership_and_revalidates() {
    let service = service();
    let public_id = create_problem(&service, Uuid::new_v4()).await;
    let solver = Uuid::new_v4();

    let submitted = service
        .submit_user_solution(&public_id, solver, written("original text"))
        .await
        .unwrap();

    let forbidden = service
        .update_user_solution(
            &public_id,
            submitted.solution_id,
            Uuid::new_v4(),
            written("hijack"),
        )
        .await;
    assert!(matches!(forbidden, Err(ProblemError::Forbidden { .. })));

    // An edit emptying both fields is rejected and leaves the record alone.
    let emptied = service
        .update_user_solution(&public_id, submitted.solution_id, solver, written("  "))
        .await;
    assert!(matches!(emptied, Err(ProblemError::IncompleteSolution)));
    let record = service
        .list_user_solutions(&public_id, solver)
        .await
        .unwrap()
        .remove(0);
    assert_eq!(record.written_solution.as_deref(), Some("original text"));

    // A real edit replaces the text (trimmed).
    let updated = service
        .update_user_solution(
            &public_id,
            submitted.solution_id,
            solver,
            written("  revised text  "),
        )
        .await
        .unwrap();
    assert_eq!(updated.written_solution.as_deref(), Some("revised text"));

    // Adding a diagram keeps the text.
    let updated = service
        .update_user_solution(&public_id, submitted.solution_id, solver, diagram(&["db"]))
        .await
        .unwrap();
    assert_eq!(updated.written_solution.as_deref(), Some("revised text"));
    assert!(updated.solution_workspace.is_some());
}

#[tokio::test]
async fn test_promotion_is_creator_only_and_copies() {
    let service = service();
    let creator = Uuid::new_v4();
    let public_id = create_problem(&service, creator).await;
    let solver = Uuid::new_v4();

    let submitted = service
        .submit_user_solution(&public_id, solver, written("winning answer"))
        .await
        .unwrap();

    let forbidden = service
        .set_best_solution(&public_id, submitted.solution_id, solver)
        .await;
    assert!(matches!(forbidden, Err(ProblemError::Forbidden { .. })));

    let missing = service
        .set_best_solution(&public_id, Uuid::new_v4(), creator)
        .await;
    assert!(matches!(missing, Err(ProblemError::NotFound { .. })));

    let promoted = service
        .set_best_solution(&public_id, submitted.solution_id, creator)
        .await
        .unwrap();
    assert!(promoted.is_approved);

    // Promotion is a copy: the best slot holds it, the original remains.
    let (best, solutions) = service.get_problem_solutions(&public_id).await.unwrap();
    let best = best.unwrap();
    assert_eq!(best.id, submitted.solution_id);
    assert_eq!(best.written_solution.as_deref(), Some("winning answer"));
    assert!(solutions.iter().any(|s| s.id == submitted.solution_id));
    // The copy in userSolutions keeps its unapproved state.
    assert!(!solutions[0].is_approved);
}

#[tokio::test]
async fn test_upvotes_accumulate_and_sort_solutions() {
    let service = service();
    let public_id = create_problem(&service, Uuid::new_v4()).await;

    let a = service
        .submit_user_solution(&public_id, Uuid::new_v4(), written("solution a"))
        .await
        .unwrap();
    let b = service
        .submit_user_solution(&public_id, Uuid::new_v4(), written("solution b"))
        .await
        .unwrap();
    let c = service
        .submit_user_solution(&public_id, Uuid::new_v4(), written("solution c"))
        .await
        .unwrap();

    for _ in 0..2 {
        service.upvote_solution(&public_id, b.solution_id).await.unwrap();
    }
    let votes = service.upvote_solution(&public_id, c.solution_id).await.unwrap();
    assert_eq!(votes, 1);

    let (_, solutions) = service.get_problem_solutions(&public_id).await.unwrap();
    let order: Vec<Uuid> = solutions.iter().map(|s| s.id).collect();
    // b: 2 votes, c: 1, a: 0.
    assert_eq!(order, vec![b.solution_id, c.solution_id, a.solution_id]);
}

#[tokio::test]
async fn test_vote_ties_preserve_insertion_order() {
    let service = service();
    let public_id = create_problem(&service, Uuid::new_v4()).await;

    let mut ids = Vec::new();
    for i in 0..4 {
        let outcome = service
            .submit_user_solution(&public_id, Uuid::new_v4(), written(&format!("s{i}")))
            .await
            .unwrap();
        ids.push(outcome.solution_id);
    }

    let (_, solutions) = service.get_problem_solutions(&public_id).await.unwrap();
    let order: Vec<Uuid> = solutions.iter().map(|s| s.id).collect();
    assert_eq!(order, ids);
}

#[tokio::test]
async fn test_upvote_unknown_ids_fail_not_found() {
    let service = service();
    let public_id = create_problem(&service, Uuid::new_v4()).await;

    let missing_solution = service.upvote_solution(&public_id, Uuid::new_v4()).await;
    match missing_solution {
        Err(ProblemError::NotFound { entity, .. }) => assert_eq!(entity, "solution"),
        other => panic!("expected solution not-found, got {other:?}"),
    }

    let missing_problem = service.upvote_solution("nope", Uuid::new_v4()).await;
    match missing_problem {
        Err(ProblemError::NotFound { entity, .. }) => assert_eq!(entity, "problem"),
        other => panic!("expected problem not-found, got {other:?}"),
    }
}

#[tokio::test]
async fn test_get_problem_counts_views() {
    let service = service();
    let public_id = create_problem(&service, Uuid::new_v4()).await;

    let first = service.get_problem(&public_id).await.unwrap();
    assert_eq!(first.views, 1);
    let second = service.get_problem(&public_id).await.unwrap();
    assert_eq!(second.views, 2);

    // Listing does not count views.
    let listed = service.list_problems().await.unwrap();
    assert_eq!(listed[0].views, 2);
}

#[tokio::test]
async fn test_url_shortener_scenario() {
    let service = service();
    let creator = Uuid::new_v4();

    let problem = service
        .create_problem(
            problem_input("Design a URL Shortener"),
            diagram(&["client", "api", "db"]),
            creator,
        )
        .await
        .unwrap();
    assert_eq!(problem.difficulty.to_string(), "medium");
    let public_id = problem.public_id;

    let solver = Uuid::new_v4();
    let submitted = service
        .submit_user_solution(&public_id, solver, written("Use base62 encoding"))
        .await
        .unwrap();

    let record = service
        .list_user_solutions(&public_id, solver)
        .await
        .unwrap()
        .remove(0);
    assert!(record.solution_workspace.is_none());

    for _ in 0..3 {
        service
            .upvote_solution(&public_id, submitted.solution_id)
            .await
            .unwrap();
    }

    service
        .set_best_solution(&public_id, submitted.solution_id, creator)
        .await
        .unwrap();

    let (best, solutions) = service.get_problem_solutions(&public_id).await.unwrap();
    let best = best.unwrap();
    assert_eq!(best.written_solution.as_deref(), Some("Use base62 encoding"));
    assert_eq!(best.votes, 3);
    assert!(solutions.iter().any(|s| s.id == submitted.solution_id));
}
