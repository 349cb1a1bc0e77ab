use async_trait::async_trait;

use megui_core::{CrudError, Record};
use megui_schema::{EntitySchema, Reference, UniqueCheck};

/// CRUD operations on one backend resource.
///
/// The form and page engines only see this trait, so tests can swap the
/// HTTP client for an in-memory fake. Every call is at-most-once: no
/// retries, no caching.
#[async_trait]
pub trait ResourceApi: Send + Sync {
    fn schema(&self) -> &EntitySchema;

    /// Full collection, keys already coerced to integers.
    async fn list(&self) -> Result<Vec<Record>, CrudError>;

    async fn get(&self, id: i64) -> Result<Record, CrudError>;

    /// POST a normalized payload. Returns the server's record.
    async fn create(&self, payload: &Record) -> Result<Record, CrudError>;

    /// PUT a normalized payload. Returns the server's record.
    async fn update(&self, id: i64, payload: &Record) -> Result<Record, CrudError>;

    async fn delete(&self, id: i64) -> Result<(), CrudError>;

    /// Entity-specific filtered list under `{path}/{sub_path}`.
    async fn query(&self, sub_path: &str, params: &[(String, String)]) -> Result<Vec<Record>, CrudError>;

    /// Ask the backend whether `params` collide with an existing record.
    /// `Ok(true)` means a conflict was reported.
    async fn check_unique(&self, check: &UniqueCheck, params: &[(String, String)]) -> Result<bool, CrudError>;
}

/// Loads the reference collections a page needs to label foreign keys.
#[async_trait]
pub trait ReferenceApi: Send + Sync {
    async fn list_reference(&self, reference: &Reference) -> Result<Vec<Record>, CrudError>;
}
