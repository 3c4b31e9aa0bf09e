//! Domain models for problems, solutions and workspace graphs.

pub mod graph;
pub mod problem;
pub mod solution;
pub mod user;

pub use graph::{DEFAULT_POSITION, Edge, Node, NodeData, Position, WorkspaceGraph};
pub use problem::{
    Difficulty, ImageDescriptor, Problem, ProblemInput, ProblemStatus, ValidatedProblem,
    generate_public_id,
};
pub use solution::{
    MAX_WRITTEN_SOLUTION_CHARS, SolutionRecord, has_workspace_solution, has_written_solution,
    normalize_written,
};
pub use user::{User, UserProfile};
