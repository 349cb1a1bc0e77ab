//! Entity schema: everything the generic engine needs to know about one
//! backend resource.

use serde::{Deserialize, Serialize};

use crate::derive::DerivedDef;
use crate::field::{FieldDef, FieldKind};

/// Backend-side uniqueness check run while the user types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UniqueCheck {
    /// Field being checked (e.g. `numeroEquipo`).
    pub field: String,
    /// Fields the uniqueness is scoped to (e.g. `tipoEquipoId`). Sent
    /// along as query parameters.
    #[serde(default)]
    pub scope: Vec<String>,
    /// Sub-path under the resource path (e.g. `validar-numero`).
    pub query_path: String,
    /// Message shown on the field when a conflict is reported.
    pub message: String,
}

/// A collection loaded alongside the main one to label foreign keys and
/// fill dropdowns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reference {
    /// Name foreign keys point at (`FieldKind::ForeignKey::references`).
    pub name: String,
    /// REST path of the collection.
    pub path: String,
    /// Field shown instead of the numeric id.
    pub display: String,
}

impl Reference {
    pub fn new(name: &str, path: &str, display: &str) -> Self {
        Self {
            name: name.to_string(),
            path: path.to_string(),
            display: display.to_string(),
        }
    }
}

/// Two-category structural filter cycled by the list page
/// (all -> first -> second -> all).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryFilter {
    pub field: String,
    pub first: String,
    pub second: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntitySchema {
    /// Singular machine name (e.g. `cargo`).
    pub name: String,
    /// Display label (e.g. `Cargos`).
    pub label: String,
    /// REST path segment relative to the base URL (e.g. `cargos`).
    pub path: String,
    /// Extra names the CLI accepts.
    #[serde(default)]
    pub aliases: Vec<String>,
    pub fields: Vec<FieldDef>,
    #[serde(default)]
    pub derived: Vec<DerivedDef>,
    #[serde(default)]
    pub unique_checks: Vec<UniqueCheck>,
    #[serde(default)]
    pub references: Vec<Reference>,
    #[serde(default)]
    pub category: Option<CategoryFilter>,
    /// Row click opens the edit form.
    pub row_edit: bool,
    /// The page offers a delete action at all.
    pub deletable: bool,
    /// Field used when this entity is shown as a reference.
    pub display_field: String,
}

impl EntitySchema {
    /// Start a schema with just the `id` field.
    pub fn new(name: &str, label: &str, path: &str) -> Self {
        Self {
            name: name.to_string(),
            label: label.to_string(),
            path: path.to_string(),
            aliases: Vec::new(),
            fields: vec![FieldDef::id()],
            derived: Vec::new(),
            unique_checks: Vec::new(),
            references: Vec::new(),
            category: None,
            row_edit: true,
            deletable: true,
            display_field: "nombre".to_string(),
        }
    }

    pub fn alias(mut self, alias: &str) -> Self {
        self.aliases.push(alias.to_string());
        self
    }

    pub fn field(mut self, field: FieldDef) -> Self {
        self.fields.push(field);
        self
    }

    /// Append `creadoEn` / `actualizadoEn` / `creadoPor` / `actualizadoPor`.
    pub fn audited(self) -> Self {
        self.field(FieldDef::audit("creadoEn", "Creado en"))
            .field(FieldDef::audit("actualizadoEn", "Actualizado en"))
            .field(FieldDef::audit("creadoPor", "Creado por"))
            .field(FieldDef::audit("actualizadoPor", "Actualizado por"))
    }

    pub fn derived(mut self, def: DerivedDef) -> Self {
        self.derived.push(def);
        self
    }

    pub fn unique(mut self, field: &str, scope: &[&str], query_path: &str, message: &str) -> Self {
        self.unique_checks.push(UniqueCheck {
            field: field.to_string(),
            scope: scope.iter().map(|s| s.to_string()).collect(),
            query_path: query_path.to_string(),
            message: message.to_string(),
        });
        self
    }

    pub fn reference(mut self, reference: Reference) -> Self {
        self.references.push(reference);
        self
    }

    pub fn category(mut self, field: &str, first: &str, second: &str) -> Self {
        self.category = Some(CategoryFilter {
            field: field.to_string(),
            first: first.to_string(),
            second: second.to_string(),
        });
        self
    }

    /// Editing only through an explicit action, never on row click.
    pub fn no_row_edit(mut self) -> Self {
        self.row_edit = false;
        self
    }

    pub fn not_deletable(mut self) -> Self {
        self.deletable = false;
        self
    }

    pub fn display_field(mut self, field: &str) -> Self {
        self.display_field = field.to_string();
        self
    }

    // ── Lookups ──

    pub fn field_def(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn derived_def(&self, name: &str) -> Option<&DerivedDef> {
        self.derived.iter().find(|d| d.name == name)
    }

    pub fn reference_def(&self, name: &str) -> Option<&Reference> {
        self.references.iter().find(|r| r.name == name)
    }

    pub fn unique_check_for(&self, field: &str) -> Option<&UniqueCheck> {
        self.unique_checks.iter().find(|c| c.field == field)
    }

    /// Fields matched by the global text filter.
    pub fn search_fields(&self) -> impl Iterator<Item = &FieldDef> {
        self.fields.iter().filter(|f| f.searchable)
    }

    /// Id and foreign-key fields.
    pub fn key_fields(&self) -> impl Iterator<Item = &FieldDef> {
        self.fields.iter().filter(|f| f.kind.is_key())
    }

    /// Reference collection a foreign-key field points at.
    pub fn reference_for_field(&self, field: &str) -> Option<&Reference> {
        match &self.field_def(field)?.kind {
            FieldKind::ForeignKey { references } => self.reference_def(references),
            _ => None,
        }
    }

    /// Whether `name` designates this entity (singular, path or alias).
    pub fn answers_to(&self, name: &str) -> bool {
        let name = name.to_lowercase();
        self.name == name || self.path == name || self.aliases.iter().any(|a| *a == name)
    }

    /// Collection endpoint path.
    pub fn collection_path(&self) -> String {
        self.path.trim_matches('/').to_string()
    }

    /// Single-record endpoint path.
    pub fn item_path(&self, id: i64) -> String {
        format!("{}/{}", self.collection_path(), id)
    }
}
