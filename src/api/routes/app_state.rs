//! Application state management.
//!
//! Holds the shared service objects: the problem service with its storage and
//! image collaborators, plus the JWT service. Everything is injected here at
//! startup; handlers never reach for globals.

use std::sync::Arc;

use tracing::{info, warn};

use crate::services::image_service::{CloudinaryStore, ImageStore, MemoryImageStore};
use crate::services::jwt_service::{JwtService, SharedJwtService};
use crate::services::problem_service::ProblemService;
use crate::storage::{MemoryStore, PostgresStore, ProblemError, ProblemStore};

/// Application state shared across all route handlers.
#[derive(Clone)]
pub struct AppState {
    /// The problem/solution lifecycle service
    pub problems: ProblemService,
    /// Storage backend (also used directly by the account routes)
    pub store: Arc<dyn ProblemStore>,
    /// Image storage collaborator
    pub images: Arc<dyn ImageStore>,
    /// Token issuing/validation
    pub jwt: SharedJwtService,
}

impl AppState {
    /// Assemble state from explicit backends.
    pub fn with_backends(
        store: Arc<dyn ProblemStore>,
        images: Arc<dyn ImageStore>,
        jwt: JwtService,
    ) -> Self {
        Self {
            problems: ProblemService::new(store.clone(), images.clone()),
            store,
            images,
            jwt: Arc::new(jwt),
        }
    }

    /// In-memory state with a fixed JWT secret. This is what the test suite
    /// uses, and the fallback when no database is configured.
    pub fn in_memory(jwt_secret: &str) -> Self {
        Self::with_backends(
            Arc::new(MemoryStore::new()),
            Arc::new(MemoryImageStore::new()),
            JwtService::new(jwt_secret),
        )
    }

    /// Build state from environment configuration.
    ///
    /// Connects to PostgreSQL (running migrations) when `DATABASE_URL` is
    /// set, otherwise falls back to the in-memory store. Likewise uses
    /// Cloudinary when `CLOUD_NAME` is configured.
    pub async fn from_env() -> Result<Self, ProblemError> {
        let store: Arc<dyn ProblemStore> = match std::env::var("DATABASE_URL") {
            Ok(url) => {
                info!("connecting to PostgreSQL storage");
                Arc::new(PostgresStore::connect(&url).await?)
            }
            Err(_) => {
                warn!("DATABASE_URL not set; using in-memory storage (data is not persisted)");
                Arc::new(MemoryStore::new())
            }
        };

        let images: Arc<dyn ImageStore> = match CloudinaryStore::from_env() {
            Some(cloudinary) => {
                info!("using Cloudinary image storage");
                Arc::new(cloudinary)
            }
            None => {
                warn!("CLOUD_NAME not set; using in-memory image storage");
                Arc::new(MemoryImageStore::new())
            }
        };

        Ok(Self::with_backends(store, images, JwtService::from_env()))
    }
}
