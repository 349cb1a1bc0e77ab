//! Field declarations.
//!
//! A field's kind drives everything downstream: how the form boxes the
//! value, how the payload serializes it, which validation rules apply and
//! how the table sorts it.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Case applied to text on submit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextCase {
    #[default]
    Preserve,
    Upper,
    Lower,
}

impl TextCase {
    pub fn apply(&self, s: &str) -> String {
        match self {
            TextCase::Preserve => s.to_string(),
            TextCase::Upper => s.to_uppercase(),
            TextCase::Lower => s.to_lowercase(),
        }
    }
}

/// Semantic type of a field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldKind {
    /// Numeric primary key.
    Id,
    /// Nullable numeric reference to another entity. `references` names a
    /// reference collection declared on the schema.
    ForeignKey { references: String },
    Text {
        case: TextCase,
        max_len: Option<usize>,
    },
    Integer {
        min: Option<i64>,
        max: Option<i64>,
    },
    /// Fixed-scale number (2 for currency).
    Decimal {
        scale: u32,
        min: Option<f64>,
        max: Option<f64>,
    },
    /// Calendar date, `YYYY-MM-DD` on the wire.
    Date,
    /// Instant, RFC 3339 on the wire.
    DateTime,
    Bool,
    Enum { options: Vec<String> },
    /// Server-maintained metadata (`creadoEn`, `actualizadoPor`, ...).
    Audit,
}

impl FieldKind {
    /// Id and foreign-key fields: always integers after normalization.
    pub fn is_key(&self) -> bool {
        matches!(self, FieldKind::Id | FieldKind::ForeignKey { .. })
    }

    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            FieldKind::Id
                | FieldKind::ForeignKey { .. }
                | FieldKind::Integer { .. }
                | FieldKind::Decimal { .. }
        )
    }
}

/// One field of an entity schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDef {
    /// Wire name, exactly as the backend spells it (e.g. `empresaId`).
    pub name: String,
    pub label: String,
    pub kind: FieldKind,
    #[serde(default)]
    pub required: bool,
    /// Included in the list page's global text filter.
    #[serde(default)]
    pub searchable: bool,
    /// Dates only: seeded with "now" in create mode when absent.
    #[serde(default)]
    pub default_now: bool,
    /// Displayed but never sent.
    #[serde(default)]
    pub read_only: bool,
    /// Seed value in create mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

impl FieldDef {
    fn with_kind(name: &str, label: &str, kind: FieldKind) -> Self {
        Self {
            name: name.to_string(),
            label: label.to_string(),
            kind,
            required: false,
            searchable: false,
            default_now: false,
            read_only: false,
            default: None,
        }
    }

    /// The `id` primary key.
    pub fn id() -> Self {
        let mut f = Self::with_kind("id", "ID", FieldKind::Id);
        f.read_only = true;
        f
    }

    pub fn text(name: &str, label: &str) -> Self {
        Self::with_kind(
            name,
            label,
            FieldKind::Text {
                case: TextCase::Preserve,
                max_len: None,
            },
        )
    }

    /// Text that is upper-cased on submit (account codes, plates, ...).
    pub fn upper(name: &str, label: &str) -> Self {
        Self::with_kind(
            name,
            label,
            FieldKind::Text {
                case: TextCase::Upper,
                max_len: None,
            },
        )
    }

    pub fn foreign_key(name: &str, label: &str, references: &str) -> Self {
        Self::with_kind(
            name,
            label,
            FieldKind::ForeignKey {
                references: references.to_string(),
            },
        )
    }

    pub fn integer(name: &str, label: &str) -> Self {
        Self::with_kind(name, label, FieldKind::Integer { min: None, max: None })
    }

    pub fn decimal(name: &str, label: &str, scale: u32) -> Self {
        Self::with_kind(
            name,
            label,
            FieldKind::Decimal {
                scale,
                min: None,
                max: None,
            },
        )
    }

    /// Two-decimal non-negative amount.
    pub fn money(name: &str, label: &str) -> Self {
        Self::decimal(name, label, 2).range(0.0, f64::MAX)
    }

    /// Two-decimal value in `[0, 100]`.
    pub fn percent(name: &str, label: &str) -> Self {
        Self::decimal(name, label, 2).range(0.0, 100.0)
    }

    pub fn date(name: &str, label: &str) -> Self {
        Self::with_kind(name, label, FieldKind::Date)
    }

    pub fn datetime(name: &str, label: &str) -> Self {
        Self::with_kind(name, label, FieldKind::DateTime)
    }

    pub fn boolean(name: &str, label: &str) -> Self {
        Self::with_kind(name, label, FieldKind::Bool)
    }

    pub fn enumeration(name: &str, label: &str, options: &[&str]) -> Self {
        Self::with_kind(
            name,
            label,
            FieldKind::Enum {
                options: options.iter().map(|o| o.to_string()).collect(),
            },
        )
    }

    pub fn audit(name: &str, label: &str) -> Self {
        let mut f = Self::with_kind(name, label, FieldKind::Audit);
        f.read_only = true;
        f
    }

    // ── Builder modifiers ──

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn searchable(mut self) -> Self {
        self.searchable = true;
        self
    }

    pub fn default_now(mut self) -> Self {
        self.default_now = true;
        self
    }

    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    pub fn default_value(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }

    pub fn max_len(mut self, len: usize) -> Self {
        if let FieldKind::Text { max_len, .. } = &mut self.kind {
            *max_len = Some(len);
        }
        self
    }

    /// Inclusive numeric range. Ignored for non-numeric kinds.
    pub fn range(mut self, lo: f64, hi: f64) -> Self {
        match &mut self.kind {
            FieldKind::Integer { min, max } => {
                *min = Some(lo as i64);
                *max = if hi >= i64::MAX as f64 { None } else { Some(hi as i64) };
            }
            FieldKind::Decimal { min, max, .. } => {
                *min = Some(lo);
                *max = if hi == f64::MAX { None } else { Some(hi) };
            }
            _ => {}
        }
        self
    }

    /// Whether the form may send this field.
    pub fn is_writable(&self) -> bool {
        !self.read_only && !matches!(self.kind, FieldKind::Id | FieldKind::Audit)
    }
}
