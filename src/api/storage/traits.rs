//! Storage trait for the problem/solution aggregate and user accounts.
//!
//! Mutations on solution collections and counters are expressed as atomic,
//! id-keyed operations — never "fetch aggregate, mutate in memory, write it
//! back" — so concurrent submissions and upvotes against the same problem
//! cannot clobber each other.

use uuid::Uuid;

use super::error::ProblemError;
use crate::models::{Problem, SolutionRecord, User, WorkspaceGraph};

/// Solution totals returned from an append, for the submission response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SolutionCounts {
    /// All user solutions on the problem after the append.
    pub total: usize,
    /// The submitting user's own count after the append.
    pub by_user: usize,
}

/// Storage backend for problems, solutions and users.
#[async_trait::async_trait]
pub trait ProblemStore: Send + Sync {
    // Users

    /// Insert a new user. Fails with a validation error on duplicate email.
    async fn insert_user(&self, user: User) -> Result<User, ProblemError>;

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, ProblemError>;

    async fn get_user(&self, id: Uuid) -> Result<Option<User>, ProblemError>;

    // Problems

    /// Persist a freshly created problem aggregate.
    async fn insert_problem(&self, problem: &Problem) -> Result<(), ProblemError>;

    /// Fetch a problem (with its solutions) by public id. No side effects.
    async fn fetch_problem(&self, public_id: &str) -> Result<Option<Problem>, ProblemError>;

    /// Fetch a problem and atomically bump its view counter.
    async fn fetch_problem_counting_view(
        &self,
        public_id: &str,
    ) -> Result<Option<Problem>, ProblemError>;

    /// All problems in creation order. Solutions are included.
    async fn list_problems(&self) -> Result<Vec<Problem>, ProblemError>;

    // Solutions

    /// Append a solution record to a problem's user solutions and report the
    /// resulting counts. Fails `NotFound` when the problem is absent.
    async fn append_solution(
        &self,
        public_id: &str,
        record: &SolutionRecord,
    ) -> Result<SolutionCounts, ProblemError>;

    /// Look up a single solution record by id.
    async fn get_solution(
        &self,
        public_id: &str,
        solution_id: Uuid,
    ) -> Result<Option<SolutionRecord>, ProblemError>;

    /// Overwrite the content fields of a solution record, keyed by id.
    /// `None` leaves a field unchanged. Returns false when the record is
    /// absent. Votes and approval state are untouched.
    async fn update_solution_content(
        &self,
        public_id: &str,
        solution_id: Uuid,
        workspace: Option<&WorkspaceGraph>,
        written: Option<&str>,
    ) -> Result<bool, ProblemError>;

    /// Remove a solution record by id. Returns the remaining solution count,
    /// or `None` when the record was absent.
    async fn remove_solution(
        &self,
        public_id: &str,
        solution_id: Uuid,
    ) -> Result<Option<usize>, ProblemError>;

    /// Atomically increment a solution's vote counter by one, returning the
    /// new count, or `None` when the record is absent.
    async fn increment_votes(
        &self,
        public_id: &str,
        solution_id: Uuid,
    ) -> Result<Option<i64>, ProblemError>;

    /// Replace a problem's best solution with the given record (a copy of a
    /// user solution). Fails `NotFound` when the problem is absent.
    async fn set_best_solution(
        &self,
        public_id: &str,
        record: &SolutionRecord,
    ) -> Result<(), ProblemError>;
}
