//! Generic CRUD engine: entity forms, debounced uniqueness checks, list
//! tables and the list page that ties them together.
//!
//! Nothing here knows about a particular entity. Everything is driven by
//! an [`EntitySchema`](megui_schema::EntitySchema) and talks to the
//! backend through [`ResourceApi`](megui_client::ResourceApi).

pub mod form;
pub mod page;
pub mod table;
pub mod unique;

#[cfg(test)]
mod testing;

pub use form::{EntityForm, FormMode};
pub use page::{Confirm, FormDialog, ListPage, RefreshPolicy};
pub use table::{CategoryState, PAGE_SIZES, ReferenceData, SortDir, TableState, TableView, cell_text};
pub use unique::{UNIQUE_DEBOUNCE, UniqueState, UniquenessWatcher};
