//! In-memory storage backend.
//!
//! Default backend when no `DATABASE_URL` is configured, and the backend the
//! test suite runs against. Every mutation takes the single write lock and
//! mutates the aggregate in place, which gives the same no-lost-updates
//! guarantee the postgres backend gets from in-database increments.

use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::error::ProblemError;
use super::traits::{ProblemStore, SolutionCounts};
use crate::models::{Problem, SolutionRecord, User, WorkspaceGraph};

#[derive(Default)]
struct MemoryState {
    users: Vec<User>,
    problems: Vec<Problem>,
}

/// Process-local [`ProblemStore`] implementation.
#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl ProblemStore for MemoryStore {
    async fn insert_user(&self, user: User) -> Result<User, ProblemError> {
        let mut state = self.state.write().await;
        if state.users.iter().any(|u| u.email == user.email) {
            return Err(ProblemError::invalid("email", "already registered"));
        }
        state.users.push(user.clone());
        Ok(user)
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, ProblemError> {
        let needle = email.trim().to_lowercase();
        let state = self.state.read().await;
        Ok(state.users.iter().find(|u| u.email == needle).cloned())
    }

    async fn get_user(&self, id: Uuid) -> Result<Option<User>, ProblemError> {
        let state = self.state.read().await;
        Ok(state.users.iter().find(|u| u.id == id).cloned())
    }

    async fn insert_problem(&self, problem: &Problem) -> Result<(), ProblemError> {
        let mut state = self.state.write().await;
        state.problems.push(problem.clone());
        Ok(())
    }

    async fn fetch_problem(&self, public_id: &str) -> Result<Option<Problem>, ProblemError> {
        let state = self.state.read().await;
        Ok(state
            .problems
            .iter()
            .find(|p| p.public_id == public_id)
            .cloned())
    }

    async fn fetch_problem_counting_view(
        &self,
        public_id: &str,
    ) -> Result<Option<Problem>, ProblemError> {
        let mut state = self.state.write().await;
        let Some(problem) = state.problems.iter_mut().find(|p| p.public_id == public_id)
        else {
            return Ok(None);
        };
        problem.views += 1;
        Ok(Some(problem.clone()))
    }

    async fn list_problems(&self) -> Result<Vec<Problem>, ProblemError> {
        let state = self.state.read().await;
        Ok(state.problems.clone())
    }

    async fn append_solution(
        &self,
        public_id: &str,
        record: &SolutionRecord,
    ) -> Result<SolutionCounts, ProblemError> {
        let mut state = self.state.write().await;
        let Some(problem) = state.problems.iter_mut().find(|p| p.public_id == public_id)
        else {
            return Err(ProblemError::not_found("problem", public_id));
        };
        problem.user_solutions.push(record.clone());
        problem.updated_at = Utc::now();
        Ok(SolutionCounts {
            total: problem.total_solutions(),
            by_user: problem.solutions_by(record.submitted_by),
        })
    }

    async fn get_solution(
        &self,
        public_id: &str,
        solution_id: Uuid,
    ) -> Result<Option<SolutionRecord>, ProblemError> {
        let state = self.state.read().await;
        Ok(state
            .problems
            .iter()
            .find(|p| p.public_id == public_id)
            .and_then(|p| p.user_solutions.iter().find(|s| s.id == solution_id))
            .cloned())
    }

    async fn update_solution_content(
        &self,
        public_id: &str,
        solution_id: Uuid,
        workspace: Option<&WorkspaceGraph>,
        written: Option<&str>,
    ) -> Result<bool, ProblemError> {
        let mut state = self.state.write().await;
        let Some(problem) = state.problems.iter_mut().find(|p| p.public_id == public_id)
        else {
            return Ok(false);
        };
        let Some(solution) = problem
            .user_solutions
            .iter_mut()
            .find(|s| s.id == solution_id)
        else {
            return Ok(false);
        };
        if let Some(graph) = workspace {
            solution.solution_workspace = Some(graph.clone());
        }
        if let Some(text) = written {
            solution.written_solution = Some(text.to_string());
        }
        problem.updated_at = Utc::now();
        Ok(true)
    }

    async fn remove_solution(
        &self,
        public_id: &str,
        solution_id: Uuid,
    ) -> Result<Option<usize>, ProblemError> {
        let mut state = self.state.write().await;
        let Some(problem) = state.problems.iter_mut().find(|p| p.public_id == public_id)
        else {
            return Ok(None);
        };
        let before = problem.user_solutions.len();
        problem.user_solutions.retain(|s| s.id != solution_id);
        if problem.user_solutions.len() == before {
            return Ok(None);
        }
        problem.updated_at = Utc::now();
        Ok(Some(problem.user_solutions.len()))
    }

    async fn increment_votes(
        &self,
        public_id: &str,
        solution_id: Uuid,
    ) -> Result<Option<i64>, ProblemError> {
        let mut state = self.state.write().await;
        let Some(solution) = state
            .problems
            .iter_mut()
            .find(|p| p.public_id == public_id)
            .and_then(|p| p.user_solutions.iter_mut().find(|s| s.id == solution_id))
        else {
            return Ok(None);
        };
        solution.votes += 1;
        Ok(Some(solution.votes))
    }

    async fn set_best_solution(
        &self,
        public_id: &str,
        record: &SolutionRecord,
    ) -> Result<(), ProblemError> {
        let mut state = self.state.write().await;
        let Some(problem) = state.problems.iter_mut().find(|p| p.public_id == public_id)
        else {
            return Err(ProblemError::not_found("problem", public_id));
        };
        problem.best_solution = Some(record.clone());
        problem.updated_at = Utc::now();
        Ok(())
    }
}
