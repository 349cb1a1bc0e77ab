//! List table state: global filter, category filter, sort and pagination.
//!
//! Everything here is computed on the client from the loaded collection.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde_json::Value;

use megui_core::{Record, coerce_id, record_id};
use megui_schema::{EntitySchema, FieldKind, FieldValue};

pub const PAGE_SIZES: [usize; 3] = [10, 25, 50];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDir {
    Asc,
    Desc,
}

/// Three-way structural filter: all, first category, second category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CategoryState {
    #[default]
    All,
    First,
    Second,
}

impl CategoryState {
    pub fn next(self) -> Self {
        match self {
            CategoryState::All => CategoryState::First,
            CategoryState::First => CategoryState::Second,
            CategoryState::Second => CategoryState::All,
        }
    }
}

// ── Reference data ──

/// Loaded reference collections, keyed by reference name.
#[derive(Debug, Clone, Default)]
pub struct ReferenceData {
    collections: BTreeMap<String, Vec<Record>>,
}

impl ReferenceData {
    pub fn insert(&mut self, name: &str, rows: Vec<Record>) {
        self.collections.insert(name.to_string(), rows);
    }

    pub fn rows(&self, name: &str) -> &[Record] {
        self.collections.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Display text of a foreign key, if the referenced row is loaded.
    pub fn label(&self, schema: &EntitySchema, field: &str, id: i64) -> Option<String> {
        let reference = schema.reference_for_field(field)?;
        let row = self.rows(&reference.name).iter().find(|r| record_id(r) == Some(id))?;
        match row.get(&reference.display)? {
            Value::String(s) => Some(s.clone()),
            Value::Null => None,
            other => Some(other.to_string()),
        }
    }

    /// `(id, label)` pairs for a dropdown, in load order.
    pub fn options(&self, schema: &EntitySchema, field: &str) -> Vec<(i64, String)> {
        let Some(reference) = schema.reference_for_field(field) else {
            return Vec::new();
        };
        self.rows(&reference.name)
            .iter()
            .filter_map(|r| {
                let id = record_id(r)?;
                let label = match r.get(&reference.display) {
                    Some(Value::String(s)) => s.clone(),
                    Some(Value::Null) | None => id.to_string(),
                    Some(other) => other.to_string(),
                };
                Some((id, label))
            })
            .collect()
    }
}

/// Text shown in a cell. Foreign keys show their reference label.
pub fn cell_text(schema: &EntitySchema, refs: &ReferenceData, field: &str, record: &Record) -> String {
    let Some(def) = schema.field_def(field) else {
        return String::new();
    };
    let raw = record.get(field).unwrap_or(&Value::Null);
    if matches!(def.kind, FieldKind::ForeignKey { .. }) {
        if let Some(id) = coerce_id(raw) {
            return refs.label(schema, field, id).unwrap_or_else(|| id.to_string());
        }
    }
    FieldValue::from_json(&def.kind, raw)
        .map(|v| v.display())
        .unwrap_or_default()
}

// ── Table state ──

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableState {
    pub filter: String,
    pub sort: Option<(String, SortDir)>,
    pub category: CategoryState,
    /// Zero-based.
    pub page: usize,
    pub page_size: usize,
}

impl Default for TableState {
    fn default() -> Self {
        Self {
            filter: String::new(),
            sort: None,
            category: CategoryState::All,
            page: 0,
            page_size: PAGE_SIZES[0],
        }
    }
}

/// One rendered page.
#[derive(Debug, Clone, PartialEq)]
pub struct TableView {
    pub rows: Vec<Record>,
    /// Rows matching the filters, across all pages.
    pub total: usize,
    pub page: usize,
    pub pages: usize,
}

impl TableState {
    pub fn set_filter(&mut self, text: &str) {
        self.filter = text.to_string();
        self.page = 0;
    }

    /// Ascending on first click, then toggles.
    pub fn toggle_sort(&mut self, field: &str) {
        self.sort = match self.sort.take() {
            Some((f, SortDir::Asc)) if f == field => Some((f, SortDir::Desc)),
            _ => Some((field.to_string(), SortDir::Asc)),
        };
    }

    pub fn cycle_category(&mut self) {
        self.category = self.category.next();
        self.page = 0;
    }

    /// Sizes outside [`PAGE_SIZES`] are ignored.
    pub fn set_page_size(&mut self, size: usize) {
        if PAGE_SIZES.contains(&size) {
            self.page_size = size;
            self.page = 0;
        }
    }

    pub fn set_page(&mut self, page: usize) {
        self.page = page;
    }

    /// Filter, sort and slice `rows`.
    pub fn view(&self, schema: &EntitySchema, refs: &ReferenceData, rows: &[Record]) -> TableView {
        let needle = self.filter.trim().to_lowercase();
        let mut matched: Vec<&Record> = rows
            .iter()
            .filter(|r| self.category_matches(schema, r))
            .filter(|r| needle.is_empty() || text_matches(schema, refs, r, &needle))
            .collect();

        if let Some((field, dir)) = &self.sort {
            matched.sort_by(|a, b| compare(schema, refs, field, a, b, *dir));
        }

        let total = matched.len();
        let size = self.page_size.max(1);
        let pages = total.div_ceil(size).max(1);
        let page = self.page.min(pages - 1);
        let rows = matched
            .into_iter()
            .skip(page * size)
            .take(size)
            .cloned()
            .collect();

        TableView {
            rows,
            total,
            page,
            pages,
        }
    }

    fn category_matches(&self, schema: &EntitySchema, record: &Record) -> bool {
        let Some(cat) = &schema.category else {
            return true;
        };
        let wanted = match self.category {
            CategoryState::All => return true,
            CategoryState::First => &cat.first,
            CategoryState::Second => &cat.second,
        };
        match record.get(&cat.field) {
            Some(Value::String(s)) => s.trim().eq_ignore_ascii_case(wanted),
            Some(Value::Bool(b)) => b.to_string() == *wanted,
            Some(Value::Null) | None => false,
            Some(other) => other.to_string() == *wanted,
        }
    }
}

/// Case-insensitive substring match over the searchable fields (all
/// non-audit fields when none is marked).
fn text_matches(schema: &EntitySchema, refs: &ReferenceData, record: &Record, needle: &str) -> bool {
    let searchable: Vec<&str> = schema.search_fields().map(|f| f.name.as_str()).collect();
    let fields: Vec<&str> = if searchable.is_empty() {
        schema
            .fields
            .iter()
            .filter(|f| f.kind != FieldKind::Audit)
            .map(|f| f.name.as_str())
            .collect()
    } else {
        searchable
    };
    fields
        .iter()
        .any(|f| cell_text(schema, refs, f, record).to_lowercase().contains(needle))
}

/// Empty values sort last in both directions.
fn compare(
    schema: &EntitySchema,
    refs: &ReferenceData,
    field: &str,
    a: &Record,
    b: &Record,
    dir: SortDir,
) -> Ordering {
    let key = |r: &Record| sort_key(schema, refs, field, r);
    match (key(a), key(b)) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(x), Some(y)) => {
            let ord = x.cmp_to(&y);
            match dir {
                SortDir::Asc => ord,
                SortDir::Desc => ord.reverse(),
            }
        }
    }
}

enum SortKey {
    Number(f64),
    Text(String),
}

impl SortKey {
    fn cmp_to(&self, other: &SortKey) -> Ordering {
        match (self, other) {
            (SortKey::Number(a), SortKey::Number(b)) => a.partial_cmp(b).unwrap_or(Ordering::Equal),
            (SortKey::Number(_), SortKey::Text(_)) => Ordering::Less,
            (SortKey::Text(_), SortKey::Number(_)) => Ordering::Greater,
            (SortKey::Text(a), SortKey::Text(b)) => a.cmp(b),
        }
    }
}

fn sort_key(schema: &EntitySchema, refs: &ReferenceData, field: &str, record: &Record) -> Option<SortKey> {
    let def = schema.field_def(field)?;
    let raw = record.get(field)?;
    if matches!(def.kind, FieldKind::ForeignKey { .. }) {
        let text = cell_text(schema, refs, field, record);
        return (!text.is_empty()).then(|| SortKey::Text(text.to_lowercase()));
    }
    match FieldValue::from_json(&def.kind, raw).ok()? {
        FieldValue::Null => None,
        FieldValue::Integer(i) => Some(SortKey::Number(i as f64)),
        FieldValue::Decimal(d) => Some(SortKey::Number(d)),
        FieldValue::Date(d) => Some(SortKey::Text(d.format("%Y-%m-%d").to_string())),
        FieldValue::DateTime(dt) => Some(SortKey::Number(dt.timestamp_millis() as f64)),
        FieldValue::Bool(b) => Some(SortKey::Number(if b { 1.0 } else { 0.0 })),
        FieldValue::Text(s) if s.trim().is_empty() => None,
        FieldValue::Text(s) => Some(SortKey::Text(s.to_lowercase())),
    }
}
