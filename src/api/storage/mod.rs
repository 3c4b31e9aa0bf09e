//! Storage module: the `ProblemStore` trait and its backends.

pub mod error;
pub mod traits;

// Storage backend implementations
pub mod memory;
pub mod postgres;

pub use error::{FieldViolation, ProblemError};
pub use memory::MemoryStore;
pub use postgres::PostgresStore;
pub use traits::{ProblemStore, SolutionCounts};
