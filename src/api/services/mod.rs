//! Services: graph validation, the solution lifecycle, and collaborators.

pub mod graph_validator;
pub mod image_service;
pub mod jwt_service;
pub mod password;
pub mod problem_service;

pub use graph_validator::{GraphPayload, validate_graph, validate_optional_graph};
pub use image_service::{
    CloudinaryStore, ImageStore, MemoryImageStore, StoredImage, UploadFile, cleanup_images,
    upload_all,
};
pub use jwt_service::{Claims, JwtService, SharedJwtService, TokenPair, TokenType};
pub use problem_service::{ProblemService, SolutionPayload, SubmissionOutcome};
