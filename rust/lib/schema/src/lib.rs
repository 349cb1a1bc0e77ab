//! Declarative entity schemas for the Megui admin engine.
//!
//! One [`EntitySchema`] per backend resource replaces a hand-written
//! client/form/page triad: it lists the fields with their kinds and rules,
//! the REST path, the reference collections used to label foreign keys,
//! backend uniqueness checks and display-only derived values.
//!
//! # Example
//!
//! ```
//! use megui_schema::{EntitySchema, FieldDef, Reference};
//!
//! let cargos = EntitySchema::new("cargo", "Cargos", "cargos")
//!     .field(FieldDef::text("nombre", "Nombre").required().searchable())
//!     .field(FieldDef::foreign_key("empresaId", "Empresa", "empresas").required())
//!     .reference(Reference::new("empresas", "empresas", "razonSocial"));
//!
//! assert!(megui_schema::validate_schema(&cargos).is_empty());
//! ```

pub mod derive;
pub mod entity;
pub mod field;
pub mod normalize;
pub mod validate;
pub mod value;

pub use derive::{DerivedDef, DerivedKind, DerivedValue, ExpiryStatus, compute};
pub use entity::{CategoryFilter, EntitySchema, Reference, UniqueCheck};
pub use field::{FieldDef, FieldKind, TextCase};
pub use normalize::{normalize_collection, normalize_inbound, values_from_record};
pub use validate::{SchemaError, check_field, validate_schema, validate_values};
pub use value::{FieldValue, parse_date, parse_datetime, round_to};
