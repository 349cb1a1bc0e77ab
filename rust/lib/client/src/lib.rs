//! Megui HTTP resource client.
//!
//! Translates logical CRUD operations into REST calls for one entity
//! schema. Authentication is read from an injected
//! [`SessionSource`](megui_core::SessionSource); a session without a
//! token sends no Authorization header.
//!
//! # Usage
//!
//! ```ignore
//! use megui_client::{Backend, ResourceApi};
//!
//! let backend = Backend::new(ApiConfig::from_env()?, Arc::new(session));
//! let cargos = backend.resource(Arc::new(cargo_schema));
//! let rows = cargos.list().await?;
//! ```

pub mod api;
pub mod http;

pub use api::{ReferenceApi, ResourceApi};
pub use http::{Backend, ResourceClient};
