//! crates/kalakriti_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the marketplace core.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of the storage backend and of the hosted AI providers.

use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::domain::{ArtisanRecord, CatalogEntry, NewProduct, ProductId, ProductRecord, ProfileUpdate};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for the outbound provider ports.
/// This abstracts away the specific errors from external services (e.g., HTTP, JSON).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
    #[error("Unauthorized")]
    Unauthorized,
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

/// Failures surfaced by the record store. These always reach the user;
/// there is no silent fallback for account operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StoreError {
    #[error("This username is already taken")]
    UsernameTaken,
    #[error("Invalid username or password")]
    InvalidCredentials,
    #[error("Both a username and a password are required")]
    MissingCredentials,
    #[error("No artisan named {0}")]
    UnknownArtisan(String),
    #[error("Invalid product: {0}")]
    InvalidProduct(String),
    #[error("Storage I/O error: {0}")]
    Io(String),
    #[error("Password hashing failed: {0}")]
    Hashing(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// Whole-document store of artisans keyed by username.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Reads the whole document. A missing or unreadable document is an empty store.
    async fn load(&self) -> BTreeMap<String, ArtisanRecord>;

    /// Replaces the whole document.
    async fn save(&self, artisans: &BTreeMap<String, ArtisanRecord>) -> StoreResult<()>;

    // --- Accounts ---
    async fn register(&self, username: &str, password: &str) -> StoreResult<()>;

    async fn authenticate(&self, username: &str, password: &str) -> StoreResult<ArtisanRecord>;

    async fn get_artisan(&self, username: &str) -> StoreResult<ArtisanRecord>;

    async fn update_profile(&self, username: &str, update: ProfileUpdate) -> StoreResult<ArtisanRecord>;

    // --- Products ---
    async fn add_product(&self, username: &str, product: NewProduct) -> StoreResult<ProductId>;

    async fn list_products(&self, username: &str) -> StoreResult<Vec<(ProductId, ProductRecord)>>;

    /// Every product of every artisan, optionally filtered by a search string.
    async fn catalog(&self, search: Option<&str>) -> Vec<CatalogEntry>;
}

#[async_trait]
pub trait TextGenerationService: Send + Sync {
    /// Sends one prompt to the language model and returns its raw reply text.
    async fn generate_text(&self, prompt: &str) -> PortResult<String>;
}

#[async_trait]
pub trait TranslationService: Send + Sync {
    /// Translates `text` into the language identified by `target_language`.
    async fn translate(&self, text: &str, target_language: &str) -> PortResult<String>;
}

#[async_trait]
pub trait ImageGenerationService: Send + Sync {
    /// Generates one image and returns the URL where it can be fetched.
    async fn generate_image(&self, prompt: &str) -> PortResult<String>;
}
