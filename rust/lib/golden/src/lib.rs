//! Golden tests for the CRUD engine.
//!
//! Each test starts a real HTTP backend (axum, in-memory collections) on a
//! random port and drives the resource client, the entity form and the
//! list page against it exactly as the CLI does.

#[cfg(test)]
mod server;
