//! Concurrency tests: parallel upvotes and submissions against the same
//! problem must not lose updates.

use std::sync::Arc;

use serde_json::json;
use uuid::Uuid;

use system_design_api::models::ProblemInput;
use system_design_api::services::image_service::MemoryImageStore;
use system_design_api::services::problem_service::{ProblemService, SolutionPayload};
use system_design_api::storage::MemoryStore;

fn service() -> ProblemService {
    ProblemService::new(Arc::new(MemoryStore::new()), Arc::new(MemoryImageStore::new()))
}

fn written(text: &str) -> SolutionPayload {
    SolutionPayload {
        solution_workspace: None,
        written_solution: Some(text.to_string()),
    }
}

async fn create_problem(service: &ProblemService) -> String {
    let input = ProblemInput {
        title: "Design a Vote Counter".to_string(),
        description: json!({"blocks": []}),
        difficulty: "easy".to_string(),
        hints: Vec::new(),
        tags: Vec::new(),
        images: Vec::new(),
    };
    service
        .create_problem(input, written("count atomically"), Uuid::new_v4())
        .await
        .unwrap()
        .public_id
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_concurrent_upvotes_lose_no_updates() {
    const VOTERS: usize = 50;

    let service = Arc::new(service());
    let public_id = create_problem(&service).await;
    let submitted = service
        .submit_user_solution(&public_id, Uuid::new_v4(), written("popular answer"))
        .await
        .unwrap();

    let mut handles = Vec::with_capacity(VOTERS);
    for _ in 0..VOTERS {
        let service = service.clone();
        let public_id = public_id.clone();
        let solution_id = submitted.solution_id;
        handles.push(tokio::spawn(async move {
            service.upvote_solution(&public_id, solution_id).await.unwrap()
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let (_, solutions) = service.get_problem_solutions(&public_id).await.unwrap();
    assert_eq!(solutions[0].votes, VOTERS as i64);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_concurrent_submissions_all_survive() {
    const SUBMITTERS: usize = 20;

    let service = Arc::new(service());
    let public_id = create_problem(&service).await;

    let mut handles = Vec::with_capacity(SUBMITTERS);
    for i in 0..SUBMITTERS {
        let service = service.clone();
        let public_id = public_id.clone();
        handles.push(tokio::spawn(async move {
            service
                .submit_user_solution(&public_id, Uuid::new_v4(), written(&format!("answer {i}")))
                .await
                .unwrap()
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let (_, solutions) = service.get_problem_solutions(&public_id).await.unwrap();
    assert_eq!(solutions.len(), SUBMITTERS);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_upvote_racing_delete_never_resurrects() {
    let service = Arc::new(service());
    let public_id = create_problem(&service).await;
    let owner = Uuid::new_v4();
    let submitted = service
        .submit_user_solution(&public_id, owner, written("short-lived"))
        .await
        .unwrap();

    let voter = {
        let service = service.clone();
        let public_id = public_id.clone();
        let solution_id = submitted.solution_id;
        tokio::spawn(async move {
            // Errors are fine once the record is gone; votes must never land
            // on a deleted record.
            let _ = service.upvote_solution(&public_id, solution_id).await;
        })
    };
    let deleter = {
        let service = service.clone();
        let public_id = public_id.clone();
        let solution_id = submitted.solution_id;
        tokio::spawn(async move {
            service
                .delete_user_solution(&public_id, solution_id, owner)
                .await
                .unwrap()
        })
    };

    voter.await.unwrap();
    deleter.await.unwrap();

    let (_, solutions) = service.get_problem_solutions(&public_id).await.unwrap();
    assert!(solutions.is_empty());
}
