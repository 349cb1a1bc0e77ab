//! Entity form engine.
//!
//! Holds the boxed values of one record being created or edited, flags
//! invalid fields and produces the normalized payload. Opening a form on
//! a different record always rebuilds every field from scratch.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use serde_json::Value;
use tracing::debug;

use megui_client::ResourceApi;
use megui_core::{CrudError, FieldError, Notification, Notifier, Record, record_id};
use megui_schema::{
    DerivedValue, EntitySchema, FieldKind, FieldValue, UniqueCheck, compute, validate_values,
    values_from_record,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit(i64),
}

pub struct EntityForm {
    schema: Arc<EntitySchema>,
    mode: FormMode,
    values: BTreeMap<String, FieldValue>,
    /// Explicit values typed over derived fields.
    overrides: BTreeMap<String, FieldValue>,
    /// Input that could not be parsed for its field kind.
    input_errors: BTreeMap<String, String>,
    /// Conflicts reported by backend uniqueness checks.
    conflicts: BTreeMap<String, String>,
    /// Result of the last `validate`.
    errors: BTreeMap<String, String>,
}

impl EntityForm {
    /// Open a form. A record with a truthy `id` opens in edit mode.
    pub fn open(schema: Arc<EntitySchema>, entity: Option<&Record>, now: DateTime<Utc>) -> Self {
        let mut form = Self {
            schema,
            mode: FormMode::Create,
            values: BTreeMap::new(),
            overrides: BTreeMap::new(),
            input_errors: BTreeMap::new(),
            conflicts: BTreeMap::new(),
            errors: BTreeMap::new(),
        };
        form.reset(entity, now);
        form
    }

    /// Replace the supplied entity. Nothing from the previous state
    /// survives.
    pub fn reset(&mut self, entity: Option<&Record>, now: DateTime<Utc>) {
        let empty = Record::new();
        let record = entity.unwrap_or(&empty);

        self.mode = match record_id(record) {
            Some(id) => FormMode::Edit(id),
            None => FormMode::Create,
        };
        self.values = values_from_record(&self.schema, record);
        self.overrides.clear();
        self.input_errors.clear();
        self.conflicts.clear();
        self.errors.clear();

        if self.mode == FormMode::Create {
            for field in &self.schema.fields {
                let Some(slot) = self.values.get_mut(&field.name) else {
                    continue;
                };
                if !slot.is_empty() {
                    continue;
                }
                if field.default_now {
                    *slot = match field.kind {
                        FieldKind::Date => FieldValue::Date(now.date_naive()),
                        _ => FieldValue::DateTime(now),
                    };
                } else if let Some(default) = &field.default {
                    *slot = FieldValue::from_json(&field.kind, default).unwrap_or(FieldValue::Null);
                }
            }
        }

        for derived in self.schema.derived.iter().filter(|d| d.persist_override) {
            if let Some(v) = record.get(&derived.name).and_then(Value::as_f64) {
                self.overrides.insert(derived.name.clone(), FieldValue::Decimal(v));
            }
        }
    }

    pub fn schema(&self) -> &EntitySchema {
        &self.schema
    }

    pub fn mode(&self) -> FormMode {
        self.mode
    }

    pub fn value(&self, field: &str) -> Option<&FieldValue> {
        self.values.get(field)
    }

    pub fn values(&self) -> &BTreeMap<String, FieldValue> {
        &self.values
    }

    /// Set a field from raw user input.
    ///
    /// Unparseable input leaves the field empty and flagged. Returns the
    /// uniqueness checks that watch this field (as checked field or as
    /// scope), so the caller can restart their timers.
    pub fn set(&mut self, field: &str, raw: &str) -> Result<Vec<UniqueCheck>, CrudError> {
        let kind = self.kind_of(field)?;
        match FieldValue::parse_input(&kind, raw) {
            Ok(v) => self.store(field, v),
            Err(msg) => {
                self.store(field, FieldValue::Null)?;
                self.input_errors.insert(field.to_string(), msg);
                Ok(self.watchers_of(field))
            }
        }
    }

    /// Set a field from a JSON value (dropdown selections, file import).
    pub fn set_json(&mut self, field: &str, value: &Value) -> Result<Vec<UniqueCheck>, CrudError> {
        let kind = self.kind_of(field)?;
        match FieldValue::from_json(&kind, value) {
            Ok(v) => self.store(field, v),
            Err(msg) => {
                self.store(field, FieldValue::Null)?;
                self.input_errors.insert(field.to_string(), msg);
                Ok(self.watchers_of(field))
            }
        }
    }

    /// Set an already boxed value.
    pub fn store(&mut self, field: &str, value: FieldValue) -> Result<Vec<UniqueCheck>, CrudError> {
        if self.schema.derived_def(field).is_some_and(|d| d.persist_override) {
            if value.is_empty() {
                self.overrides.remove(field);
            } else {
                self.overrides.insert(field.to_string(), value);
            }
            return Ok(Vec::new());
        }
        let def = self.schema.field_def(field).ok_or_else(|| unknown(field))?;
        if !def.is_writable() {
            return Err(CrudError::Validation(vec![FieldError::new(field, "es de solo lectura")]));
        }
        self.values.insert(field.to_string(), value);
        self.input_errors.remove(field);
        self.errors.remove(field);
        let watchers = self.watchers_of(field);
        for check in &watchers {
            self.conflicts.remove(&check.field);
        }
        Ok(watchers)
    }

    fn kind_of(&self, field: &str) -> Result<FieldKind, CrudError> {
        if let Some(d) = self.schema.derived_def(field).filter(|d| d.persist_override) {
            debug!(field = %d.name, "override of derived value");
            return Ok(FieldKind::Decimal {
                scale: 2,
                min: None,
                max: None,
            });
        }
        self.schema
            .field_def(field)
            .map(|f| f.kind.clone())
            .ok_or_else(|| unknown(field))
    }

    fn watchers_of(&self, field: &str) -> Vec<UniqueCheck> {
        self.schema
            .unique_checks
            .iter()
            .filter(|c| c.field == field || c.scope.iter().any(|s| s == field))
            .cloned()
            .collect()
    }

    // ── Uniqueness ──

    /// Query parameters for a uniqueness check against the current
    /// values. In edit mode the record's own id is excluded.
    pub fn unique_params(&self, check: &UniqueCheck) -> Vec<(String, String)> {
        let mut params = Vec::new();
        for name in std::iter::once(&check.field).chain(check.scope.iter()) {
            if let (Some(def), Some(v)) = (self.schema.field_def(name), self.values.get(name)) {
                if let Some(s) = param_text(&v.to_json(&def.kind)) {
                    params.push((name.clone(), s));
                }
            }
        }
        if let FormMode::Edit(id) = self.mode {
            params.push(("excludeId".to_string(), id.to_string()));
        }
        params
    }

    /// Whether a check has something to check (its field is filled).
    pub fn unique_ready(&self, check: &UniqueCheck) -> bool {
        self.values.get(&check.field).is_some_and(|v| !v.is_empty())
    }

    pub fn mark_conflict(&mut self, check: &UniqueCheck) {
        self.conflicts.insert(check.field.clone(), check.message.clone());
    }

    pub fn clear_conflict(&mut self, field: &str) {
        self.conflicts.remove(field);
    }

    /// Run every uniqueness check right now, without debounce.
    pub async fn verify_unique(&mut self, api: &dyn ResourceApi) -> Result<(), CrudError> {
        let checks = self.schema.unique_checks.clone();
        for check in &checks {
            if !self.unique_ready(check) {
                continue;
            }
            let params = self.unique_params(check);
            if api.check_unique(check, &params).await? {
                self.mark_conflict(check);
            } else {
                self.clear_conflict(&check.field);
            }
        }
        Ok(())
    }

    // ── Validation & payload ──

    /// Run every rule and flag offending fields.
    pub fn validate(&mut self) -> Result<(), Vec<FieldError>> {
        let mut found: BTreeMap<String, String> = BTreeMap::new();
        for e in validate_values(&self.schema, &self.values) {
            found.entry(e.field).or_insert(e.message);
        }
        for (field, msg) in self.input_errors.iter().chain(self.conflicts.iter()) {
            found.insert(field.clone(), msg.clone());
        }
        self.errors = found;
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self.field_errors())
        }
    }

    /// Fields flagged by the last `validate`, in schema order.
    pub fn field_errors(&self) -> Vec<FieldError> {
        let mut out: Vec<FieldError> = self
            .schema
            .fields
            .iter()
            .filter_map(|f| self.errors.get(&f.name).map(|m| FieldError::new(&f.name, m)))
            .collect();
        for (field, msg) in &self.errors {
            if self.schema.field_def(field).is_none() {
                out.push(FieldError::new(field, msg));
            }
        }
        out
    }

    pub fn is_flagged(&self, field: &str) -> bool {
        self.errors.contains_key(field)
    }

    /// Normalized body for create/update. Id, audit, read-only and
    /// derived fields are left out; an explicitly overridden derived
    /// value is sent.
    pub fn payload(&self) -> Record {
        let mut body = Record::new();
        for field in self.schema.fields.iter().filter(|f| f.is_writable()) {
            let value = self.values.get(&field.name).unwrap_or(&FieldValue::Null);
            body.insert(field.name.clone(), value.to_json(&field.kind));
        }
        for (name, value) in &self.overrides {
            let kind = FieldKind::Decimal {
                scale: 2,
                min: None,
                max: None,
            };
            body.insert(name.clone(), value.to_json(&kind));
        }
        body
    }

    /// Derived values for display. Overrides replace computed values.
    pub fn derived(&self, today: NaiveDate) -> Vec<(String, DerivedValue)> {
        self.schema
            .derived
            .iter()
            .map(|d| {
                let value = match self.overrides.get(&d.name).and_then(FieldValue::as_f64) {
                    Some(v) => DerivedValue::Number(v),
                    None => compute(d, &self.values, today),
                };
                (d.name.clone(), value)
            })
            .collect()
    }

    // ── Submit ──

    /// Validate, then create or update according to the mode.
    ///
    /// On any failure the form keeps its state so the user can fix and
    /// retry; the error is reported through `notifier` and returned.
    pub async fn submit(&mut self, api: &dyn ResourceApi, notifier: &dyn Notifier) -> Result<Record, CrudError> {
        if let Err(errors) = self.validate() {
            let err = CrudError::Validation(errors);
            notifier.notify(Notification::warning("Validación", err.user_message()));
            return Err(err);
        }

        let payload = self.payload();
        let label = self.schema.label.clone();
        let result = match self.mode {
            FormMode::Create => api.create(&payload).await,
            FormMode::Edit(id) => api.update(id, &payload).await,
        };

        match result {
            Ok(saved) => {
                let summary = match self.mode {
                    FormMode::Create => "Registro creado",
                    FormMode::Edit(_) => "Registro actualizado",
                };
                let detail = match record_id(&saved) {
                    Some(id) => format!("{} #{}", label, id),
                    None => label,
                };
                notifier.notify(Notification::success(summary, detail));
                Ok(saved)
            }
            Err(e) => {
                notifier.notify(Notification::error("Error al guardar", e.user_message()));
                Err(e)
            }
        }
    }
}

fn unknown(field: &str) -> CrudError {
    CrudError::Validation(vec![FieldError::new(field, "campo desconocido")])
}

fn param_text(v: &Value) -> Option<String> {
    match v {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
