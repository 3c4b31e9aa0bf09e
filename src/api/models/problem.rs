//! The Problem aggregate: metadata, one best solution, many user solutions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::solution::SolutionRecord;
use crate::storage::error::{FieldViolation, ProblemError};

pub const MAX_TITLE_CHARS: usize = 200;
pub const MAX_HINTS: usize = 3;
pub const MAX_HINT_CHARS: usize = 500;
pub const MAX_TAGS: usize = 5;
pub const MAX_TAG_CHARS: usize = 50;
pub const MAX_IMAGES: usize = 5;

/// Problem difficulty, case-normalized to lowercase on input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    /// Parse a difficulty regardless of input casing.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "easy" => Some(Self::Easy),
            "medium" => Some(Self::Medium),
            "hard" => Some(Self::Hard),
            _ => None,
        }
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Easy => write!(f, "easy"),
            Self::Medium => write!(f, "medium"),
            Self::Hard => write!(f, "hard"),
        }
    }
}

/// Publication state of a problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProblemStatus {
    Draft,
    Published,
    Archived,
}

impl Default for ProblemStatus {
    fn default() -> Self {
        Self::Published
    }
}

impl ProblemStatus {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "draft" => Some(Self::Draft),
            "published" => Some(Self::Published),
            "archived" => Some(Self::Archived),
            _ => None,
        }
    }
}

impl std::fmt::Display for ProblemStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Draft => write!(f, "draft"),
            Self::Published => write!(f, "published"),
            Self::Archived => write!(f, "archived"),
        }
    }
}

/// A pre-uploaded image attached to a problem statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageDescriptor {
    pub url: String,
    pub storage_key: String,
    pub original_name: String,
    pub size: i64,
    pub format: String,
}

/// The aggregate root. Owns its metadata, the single best solution and the
/// open-ended collection of user-submitted solutions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Problem {
    /// Internal storage key.
    pub id: Uuid,
    /// Stable short identifier used in shareable URLs.
    pub public_id: String,
    pub title: String,
    /// Opaque rich-text document (block list) produced by the editor.
    pub description: Value,
    pub difficulty: Difficulty,
    pub hints: Vec<String>,
    pub tags: Vec<String>,
    pub images: Vec<ImageDescriptor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub best_solution: Option<SolutionRecord>,
    pub user_solutions: Vec<SolutionRecord>,
    pub created_by: Uuid,
    pub status: ProblemStatus,
    pub views: i64,
    pub likes: i64,
    pub reviewed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Raw client input for problem creation, before normalization.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProblemInput {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: Value,
    #[serde(default)]
    pub difficulty: String,
    #[serde(default)]
    pub hints: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub images: Vec<ImageDescriptor>,
}

/// Problem metadata that survived validation, ready to become an aggregate.
#[derive(Debug, Clone)]
pub struct ValidatedProblem {
    pub title: String,
    pub description: Value,
    pub difficulty: Difficulty,
    pub hints: Vec<String>,
    pub tags: Vec<String>,
    pub images: Vec<ImageDescriptor>,
}

impl ProblemInput {
    /// Validate and normalize the metadata fields.
    ///
    /// Checks run in order: required-field presence, then array length
    /// limits. All violations are collected so the client sees every broken
    /// field at once. Solution completeness is checked separately by the
    /// caller, after this passes.
    pub fn validate(self) -> Result<ValidatedProblem, ProblemError> {
        let mut violations: Vec<FieldViolation> = Vec::new();

        let title = self.title.trim().to_string();
        if title.is_empty() {
            violations.push(FieldViolation::new("title", "is required"));
        } else if title.chars().count() > MAX_TITLE_CHARS {
            violations.push(FieldViolation::new(
                "title",
                format!("must be at most {MAX_TITLE_CHARS} characters"),
            ));
        }

        if description_is_missing(&self.description) {
            violations.push(FieldViolation::new("description", "is required"));
        }

        let difficulty = match Difficulty::parse(&self.difficulty) {
            Some(d) => d,
            None => {
                if self.difficulty.trim().is_empty() {
                    violations.push(FieldViolation::new("difficulty", "is required"));
                } else {
                    violations.push(FieldViolation::new(
                        "difficulty",
                        "must be one of easy, medium, hard",
                    ));
                }
                Difficulty::Medium
            }
        };

        let hints: Vec<String> = self
            .hints
            .iter()
            .map(|h| h.trim().to_string())
            .filter(|h| !h.is_empty())
            .collect();
        if hints.len() > MAX_HINTS {
            violations.push(FieldViolation::new(
                "hints",
                format!("at most {MAX_HINTS} hints are allowed"),
            ));
        }
        for (i, hint) in hints.iter().enumerate() {
            if hint.chars().count() > MAX_HINT_CHARS {
                violations.push(FieldViolation::new(
                    format!("hints[{i}]"),
                    format!("must be at most {MAX_HINT_CHARS} characters"),
                ));
            }
        }

        let tags: Vec<String> = self
            .tags
            .iter()
            .map(|t| t.trim().to_lowercase())
            .filter(|t| !t.is_empty())
            .collect();
        if tags.len() > MAX_TAGS {
            violations.push(FieldViolation::new(
                "tags",
                format!("at most {MAX_TAGS} tags are allowed"),
            ));
        }
        for (i, tag) in tags.iter().enumerate() {
            if tag.chars().count() > MAX_TAG_CHARS {
                violations.push(FieldViolation::new(
                    format!("tags[{i}]"),
                    format!("must be at most {MAX_TAG_CHARS} characters"),
                ));
            }
        }

        if self.images.len() > MAX_IMAGES {
            violations.push(FieldViolation::new(
                "images",
                format!("at most {MAX_IMAGES} images are allowed"),
            ));
        }

        if !violations.is_empty() {
            return Err(ProblemError::Validation { fields: violations });
        }

        Ok(ValidatedProblem {
            title,
            description: self.description,
            difficulty,
            hints,
            tags,
            images: self.images,
        })
    }
}

/// The rich-text description is an opaque document; it only has to be present.
fn description_is_missing(description: &Value) -> bool {
    match description {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

impl ValidatedProblem {
    /// Assemble the aggregate with the creator's approved best solution.
    pub fn into_problem(self, created_by: Uuid, best_solution: SolutionRecord) -> Problem {
        let now = Utc::now();
        Problem {
            id: Uuid::new_v4(),
            public_id: generate_public_id(),
            title: self.title,
            description: self.description,
            difficulty: self.difficulty,
            hints: self.hints,
            tags: self.tags,
            images: self.images,
            best_solution: Some(best_solution),
            user_solutions: Vec::new(),
            created_by,
            status: ProblemStatus::default(),
            views: 0,
            likes: 0,
            reviewed: false,
            created_at: now,
            updated_at: now,
        }
    }
}

impl Problem {
    pub fn total_solutions(&self) -> usize {
        self.user_solutions.len()
    }

    /// How many solutions a given user has submitted to this problem.
    /// Multiple submissions per user are allowed.
    pub fn solutions_by(&self, user_id: Uuid) -> usize {
        self.user_solutions
            .iter()
            .filter(|s| s.submitted_by == user_id)
            .count()
    }
}

/// Short shareable identifier, distinct from the internal uuid.
pub fn generate_public_id() -> String {
    Uuid::new_v4().simple().to_string()[..10].to_string()
}
