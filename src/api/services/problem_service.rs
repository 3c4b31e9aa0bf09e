//! Solution lifecycle service.
//!
//! The operations behind the problem/solution workflow: create a problem with
//! its creator solution, submit independent user solutions, edit/delete them,
//! upvote, and promote one to best. Collaborators (storage, image store) are
//! injected at construction; there is no ambient state.

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use super::graph_validator::{GraphPayload, validate_optional_graph};
use super::image_service::{ImageStore, cleanup_images};
use crate::models::{
    MAX_WRITTEN_SOLUTION_CHARS, Problem, ProblemInput, SolutionRecord, has_workspace_solution,
    has_written_solution,
};
use crate::storage::error::ProblemError;
use crate::storage::traits::{ProblemStore, SolutionCounts};

/// A solution payload as it arrives from a client: an optional diagram (raw
/// or structured) and optional written text.
#[derive(Debug, Clone, Default)]
pub struct SolutionPayload {
    pub solution_workspace: Option<GraphPayload>,
    pub written_solution: Option<String>,
}

/// Outcome of a user solution submission.
#[derive(Debug, Clone)]
pub struct SubmissionOutcome {
    pub solution_id: Uuid,
    pub counts: SolutionCounts,
}

/// Service object owning the problem/solution operations.
#[derive(Clone)]
pub struct ProblemService {
    store: Arc<dyn ProblemStore>,
    images: Arc<dyn ImageStore>,
}

impl ProblemService {
    pub fn new(store: Arc<dyn ProblemStore>, images: Arc<dyn ImageStore>) -> Self {
        Self { store, images }
    }

    /// Create a problem together with the creator's own solution, which is
    /// stored approved as the problem's best solution.
    ///
    /// Validation runs in order: metadata fields (all violations collected),
    /// then graph normalization, then solution completeness. If the final
    /// persist fails, any pre-uploaded statement images are cleaned up.
    pub async fn create_problem(
        &self,
        input: ProblemInput,
        payload: SolutionPayload,
        creator: Uuid,
    ) -> Result<Problem, ProblemError> {
        let validated = input.validate()?;
        let workspace = validate_optional_graph(payload.solution_workspace)?;
        let best =
            SolutionRecord::new_approved(creator, workspace, payload.written_solution)?;

        let problem = validated.into_problem(creator, best);
        if let Err(e) = self.store.insert_problem(&problem).await {
            cleanup_images(self.images.as_ref(), &problem.images).await;
            return Err(e);
        }

        info!(
            "created problem {} ('{}') by {}",
            problem.public_id, problem.title, creator
        );
        Ok(problem)
    }

    /// Submit an independent solution to an existing problem. A user may
    /// submit any number of solutions to the same problem.
    pub async fn submit_user_solution(
        &self,
        public_id: &str,
        user_id: Uuid,
        payload: SolutionPayload,
    ) -> Result<SubmissionOutcome, ProblemError> {
        if self.store.fetch_problem(public_id).await?.is_none() {
            return Err(ProblemError::not_found("problem", public_id));
        }

        let workspace = validate_optional_graph(payload.solution_workspace)?;
        let record = SolutionRecord::new(user_id, workspace, payload.written_solution)?;

        let counts = self.store.append_solution(public_id, &record).await?;
        info!(
            "user {} submitted solution {} to {} ({} total)",
            user_id, record.id, public_id, counts.total
        );
        Ok(SubmissionOutcome {
            solution_id: record.id,
            counts,
        })
    }

    /// All of one user's solutions on a problem, most recent first.
    pub async fn list_user_solutions(
        &self,
        public_id: &str,
        user_id: Uuid,
    ) -> Result<Vec<SolutionRecord>, ProblemError> {
        let problem = self.require_problem(public_id).await?;
        let mut mine: Vec<SolutionRecord> = problem
            .user_solutions
            .into_iter()
            .filter(|s| s.submitted_by == user_id)
            .collect();
        mine.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at));
        Ok(mine)
    }

    /// Delete a solution record. Only its submitter may do this. Returns the
    /// remaining solution count.
    pub async fn delete_user_solution(
        &self,
        public_id: &str,
        solution_id: Uuid,
        requester: Uuid,
    ) -> Result<usize, ProblemError> {
        let record = self.require_solution(public_id, solution_id).await?;
        if record.submitted_by != requester {
            return Err(ProblemError::forbidden(
                "only the submitter can delete a solution",
            ));
        }

        match self.store.remove_solution(public_id, solution_id).await? {
            Some(remaining) => {
                info!("deleted solution {} from {}", solution_id, public_id);
                Ok(remaining)
            }
            None => Err(ProblemError::not_found("solution", solution_id)),
        }
    }

    /// Edit a solution record's content. Only its submitter may do this.
    /// A supplied graph replaces the old one (re-validated); supplied text
    /// replaces the old text (trimmed). The merged record must still contain
    /// some form of solution.
    pub async fn update_user_solution(
        &self,
        public_id: &str,
        solution_id: Uuid,
        requester: Uuid,
        payload: SolutionPayload,
    ) -> Result<SolutionRecord, ProblemError> {
        let mut record = self.require_solution(public_id, solution_id).await?;
        if record.submitted_by != requester {
            return Err(ProblemError::forbidden(
                "only the submitter can edit a solution",
            ));
        }

        let new_workspace = validate_optional_graph(payload.solution_workspace)?;
        // Supplied text is trimmed but kept even when blank, so the stored
        // record and the returned one agree; the completeness check below
        // still treats blank text as no solution.
        let written_update = match payload.written_solution {
            Some(raw) => {
                let trimmed = raw.trim().to_string();
                if trimmed.chars().count() > MAX_WRITTEN_SOLUTION_CHARS {
                    return Err(ProblemError::invalid(
                        "writtenSolution",
                        format!("must be at most {MAX_WRITTEN_SOLUTION_CHARS} characters"),
                    ));
                }
                Some(trimmed)
            }
            None => None,
        };

        if let Some(graph) = &new_workspace {
            record.solution_workspace = Some(graph.clone());
        }
        if let Some(text) = &written_update {
            record.written_solution = Some(text.clone());
        }

        if !has_workspace_solution(record.solution_workspace.as_ref())
            && !has_written_solution(record.written_solution.as_deref())
        {
            return Err(ProblemError::IncompleteSolution);
        }

        let updated = self
            .store
            .update_solution_content(
                public_id,
                solution_id,
                new_workspace.as_ref(),
                written_update.as_deref(),
            )
            .await?;
        if !updated {
            return Err(ProblemError::not_found("solution", solution_id));
        }

        info!("updated solution {} on {}", solution_id, public_id);
        Ok(record)
    }

    /// Copy a user solution into the problem's best-solution slot. Only the
    /// problem's creator may promote, and the original record stays in place.
    pub async fn set_best_solution(
        &self,
        public_id: &str,
        solution_id: Uuid,
        requester: Uuid,
    ) -> Result<SolutionRecord, ProblemError> {
        let problem = self.require_problem(public_id).await?;
        if problem.created_by != requester {
            return Err(ProblemError::forbidden(
                "only the problem creator can promote a solution",
            ));
        }

        let record = problem
            .user_solutions
            .iter()
            .find(|s| s.id == solution_id)
            .cloned()
            .ok_or_else(|| ProblemError::not_found("solution", solution_id))?;

        let mut promoted = record;
        promoted.is_approved = true;
        self.store.set_best_solution(public_id, &promoted).await?;

        info!("promoted solution {} to best on {}", solution_id, public_id);
        Ok(promoted)
    }

    /// Atomically bump a solution's vote count, returning the new total.
    pub async fn upvote_solution(
        &self,
        public_id: &str,
        solution_id: Uuid,
    ) -> Result<i64, ProblemError> {
        match self.store.increment_votes(public_id, solution_id).await? {
            Some(votes) => Ok(votes),
            None => {
                // Distinguish a missing problem from a missing solution.
                if self.store.fetch_problem(public_id).await?.is_none() {
                    Err(ProblemError::not_found("problem", public_id))
                } else {
                    Err(ProblemError::not_found("solution", solution_id))
                }
            }
        }
    }

    /// The best solution plus all user solutions, sorted by votes descending.
    /// Ties keep their submission order.
    pub async fn get_problem_solutions(
        &self,
        public_id: &str,
    ) -> Result<(Option<SolutionRecord>, Vec<SolutionRecord>), ProblemError> {
        let problem = self.require_problem(public_id).await?;
        let mut solutions = problem.user_solutions;
        solutions.sort_by(|a, b| b.votes.cmp(&a.votes));
        Ok((problem.best_solution, solutions))
    }

    /// Fetch a problem for display. Counts the view, and returns the user
    /// solutions sorted by votes descending.
    pub async fn get_problem(&self, public_id: &str) -> Result<Problem, ProblemError> {
        let mut problem = self
            .store
            .fetch_problem_counting_view(public_id)
            .await?
            .ok_or_else(|| ProblemError::not_found("problem", public_id))?;
        problem.user_solutions.sort_by(|a, b| b.votes.cmp(&a.votes));
        Ok(problem)
    }

    /// All problems in creation order. No view counting.
    pub async fn list_problems(&self) -> Result<Vec<Problem>, ProblemError> {
        self.store.list_problems().await
    }

    async fn require_problem(&self, public_id: &str) -> Result<Problem, ProblemError> {
        self.store
            .fetch_problem(public_id)
            .await?
            .ok_or_else(|| ProblemError::not_found("problem", public_id))
    }

    async fn require_solution(
        &self,
        public_id: &str,
        solution_id: Uuid,
    ) -> Result<SolutionRecord, ProblemError> {
        let problem = self.require_problem(public_id).await?;
        problem
            .user_solutions
            .into_iter()
            .find(|s| s.id == solution_id)
            .ok_or_else(|| ProblemError::not_found("solution", solution_id))
    }
}
