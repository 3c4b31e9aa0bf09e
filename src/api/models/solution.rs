//! Solution records: one person's attempt at solving a problem.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::graph::WorkspaceGraph;
use crate::storage::error::ProblemError;

/// Upper bound on the written solution, in characters (after trimming).
pub const MAX_WRITTEN_SOLUTION_CHARS: usize = 10_000;

/// A single solution attempt: a workspace diagram and/or written text,
/// plus voting and approval state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolutionRecord {
    pub id: Uuid,
    pub submitted_by: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub solution_workspace: Option<WorkspaceGraph>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub written_solution: Option<String>,
    pub votes: i64,
    pub is_approved: bool,
    pub submitted_at: DateTime<Utc>,
}

/// Whether a graph counts as a workspace solution: present with ≥1 node.
pub fn has_workspace_solution(graph: Option<&WorkspaceGraph>) -> bool {
    graph.is_some_and(WorkspaceGraph::has_nodes)
}

/// Whether text counts as a written solution: present with non-empty trim.
pub fn has_written_solution(text: Option<&str>) -> bool {
    text.is_some_and(|t| !t.trim().is_empty())
}

impl SolutionRecord {
    /// Build a record from a validated graph and/or raw text.
    ///
    /// Text is trimmed; an empty trim is treated as absent. Fails with
    /// `IncompleteSolution` when neither form of solution is present, and
    /// with a validation error when the text exceeds the character cap.
    pub fn new(
        submitted_by: Uuid,
        solution_workspace: Option<WorkspaceGraph>,
        written_solution: Option<String>,
    ) -> Result<Self, ProblemError> {
        let written = normalize_written(written_solution)?;

        if !has_workspace_solution(solution_workspace.as_ref())
            && !has_written_solution(written.as_deref())
        {
            return Err(ProblemError::IncompleteSolution);
        }

        Ok(Self {
            id: Uuid::new_v4(),
            submitted_by,
            solution_workspace,
            written_solution: written,
            votes: 0,
            is_approved: false,
            submitted_at: Utc::now(),
        })
    }

    /// Same as [`SolutionRecord::new`] but marks the record approved, for the
    /// creator's own solution stored as a problem's best solution.
    pub fn new_approved(
        submitted_by: Uuid,
        solution_workspace: Option<WorkspaceGraph>,
        written_solution: Option<String>,
    ) -> Result<Self, ProblemError> {
        let mut record = Self::new(submitted_by, solution_workspace, written_solution)?;
        record.is_approved = true;
        Ok(record)
    }
}

/// Trim, drop empty, and enforce the character cap on written text.
pub fn normalize_written(text: Option<String>) -> Result<Option<String>, ProblemError> {
    match text {
        None => Ok(None),
        Some(raw) => {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                return Ok(None);
            }
            if trimmed.chars().count() > MAX_WRITTEN_SOLUTION_CHARS {
                return Err(ProblemError::invalid(
                    "writtenSolution",
                    format!("must be at most {MAX_WRITTEN_SOLUTION_CHARS} characters"),
                ));
            }
            Ok(Some(trimmed.to_string()))
        }
    }
}
