//! Validation.
//!
//! Two passes, both returning every error found rather than stopping at
//! the first:
//! - `validate_values`: field rules on a form's boxed values
//! - `validate_schema`: consistency of a schema declaration itself

use std::collections::{BTreeMap, HashSet};

use megui_core::FieldError;

use crate::entity::EntitySchema;
use crate::field::{FieldDef, FieldKind};
use crate::value::FieldValue;

/// Apply required, length, range and option rules to writable fields.
pub fn validate_values(
    schema: &EntitySchema,
    values: &BTreeMap<String, FieldValue>,
) -> Vec<FieldError> {
    let mut errors = Vec::new();
    for field in schema.fields.iter().filter(|f| f.is_writable()) {
        let value = values.get(&field.name).unwrap_or(&FieldValue::Null);
        if let Some(message) = check_field(field, value) {
            errors.push(FieldError::new(&field.name, message));
        }
    }
    errors
}

/// First rule a single value breaks, if any.
pub fn check_field(field: &FieldDef, value: &FieldValue) -> Option<String> {
    if value.is_empty() {
        return field.required.then(|| "es obligatorio".to_string());
    }
    match (&field.kind, value) {
        (FieldKind::Text { max_len: Some(max), .. }, FieldValue::Text(s)) => {
            let len = s.trim().chars().count();
            (len > *max).then(|| format!("admite como máximo {} caracteres", max))
        }
        (FieldKind::Integer { min, max }, FieldValue::Integer(i)) => {
            if min.is_some_and(|m| *i < m) {
                Some(format!("debe ser mayor o igual a {}", min.unwrap_or_default()))
            } else if max.is_some_and(|m| *i > m) {
                Some(format!("debe ser menor o igual a {}", max.unwrap_or_default()))
            } else {
                None
            }
        }
        (FieldKind::Decimal { min, max, .. }, v) => {
            let n = v.as_f64()?;
            if min.is_some_and(|m| n < m) {
                Some(format!("debe ser mayor o igual a {}", min.unwrap_or_default()))
            } else if max.is_some_and(|m| n > m) {
                Some(format!("debe ser menor o igual a {}", max.unwrap_or_default()))
            } else {
                None
            }
        }
        (FieldKind::ForeignKey { .. }, FieldValue::Integer(id)) => {
            (*id <= 0).then(|| "debe seleccionar un registro válido".to_string())
        }
        (FieldKind::Enum { options }, FieldValue::Text(s)) => {
            let s = s.trim();
            (!options.iter().any(|o| o == s))
                .then(|| format!("debe ser uno de: {}", options.join(", ")))
        }
        _ => None,
    }
}

/// A schema declaration error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaError {
    pub message: String,
    /// Which entity the error is about.
    pub context: String,
}

impl std::fmt::Display for SchemaError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.context, self.message)
    }
}

/// Check that every name a schema mentions resolves.
pub fn validate_schema(schema: &EntitySchema) -> Vec<SchemaError> {
    let mut errors = Vec::new();
    let mut push = |message: String| {
        errors.push(SchemaError {
            message,
            context: schema.name.clone(),
        })
    };

    // 1. Path.
    let path = schema.collection_path();
    if path.is_empty()
        || !path
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '/')
    {
        push(format!(
            "path '{}' must be non-empty lowercase segments with dashes",
            schema.path
        ));
    }

    // 2. Field names: unique, exactly one primary key named `id`.
    let mut seen = HashSet::new();
    for f in &schema.fields {
        if !seen.insert(f.name.as_str()) {
            push(format!("field '{}' declared twice", f.name));
        }
    }
    let ids: Vec<&FieldDef> = schema
        .fields
        .iter()
        .filter(|f| f.kind == FieldKind::Id)
        .collect();
    if ids.len() != 1 || ids[0].name != "id" {
        push("schema must declare exactly one primary key named 'id'".to_string());
    }

    // 3. Per-kind declarations.
    for f in &schema.fields {
        match &f.kind {
            FieldKind::ForeignKey { references } if schema.reference_def(references).is_none() => {
                push(format!(
                    "field '{}' references '{}' which is not declared",
                    f.name, references
                ));
            }
            FieldKind::Enum { options } if options.is_empty() => {
                push(format!("enum field '{}' has no options", f.name));
            }
            _ => {}
        }
        if f.default_now && !matches!(f.kind, FieldKind::Date | FieldKind::DateTime) {
            push(format!("field '{}' is default_now but not a date", f.name));
        }
    }

    // 4. Names used by filters, checks and derived values.
    let exists = |name: &str| schema.field_def(name).is_some();
    if !exists(&schema.display_field) {
        push(format!("display field '{}' not found", schema.display_field));
    }
    for check in &schema.unique_checks {
        if !exists(&check.field) {
            push(format!("unique check field '{}' not found", check.field));
        }
        for s in &check.scope {
            if !exists(s) {
                push(format!("unique check scope '{}' not found", s));
            }
        }
    }
    for d in &schema.derived {
        for input in d.inputs() {
            if !exists(input) {
                push(format!("derived '{}' input '{}' not found", d.name, input));
            }
        }
        if exists(&d.name) {
            push(format!("derived '{}' shadows a declared field", d.name));
        }
    }
    if let Some(cat) = &schema.category {
        match schema.field_def(&cat.field).map(|f| &f.kind) {
            Some(FieldKind::Enum { options }) => {
                for c in [&cat.first, &cat.second] {
                    if !options.contains(c) {
                        push(format!("category '{}' is not an option of '{}'", c, cat.field));
                    }
                }
            }
            Some(FieldKind::Bool) => {}
            _ => push(format!(
                "category field '{}' must be an enum or bool field",
                cat.field
            )),
        }
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::derive::DerivedDef;
    use crate::entity::Reference;

    fn cargos() -> EntitySchema {
        EntitySchema::new("cargo", "Cargos", "cargos")
            .field(FieldDef::text("nombre", "Nombre").required().max_len(10))
            .field(FieldDef::foreign_key("empresaId", "Empresa", "empresas"))
            .field(FieldDef::integer("nivel", "Nivel").range(1.0, 5.0))
            .field(FieldDef::percent("comision", "Comisión"))
            .field(FieldDef::enumeration("tipo", "Tipo", &["MAR", "TIERRA"]))
            .reference(Reference::new("empresas", "empresas", "razonSocial"))
    }

    fn values(pairs: &[(&str, FieldValue)]) -> BTreeMap<String, FieldValue> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    #[test]
    fn valid_values_no_errors() {
        let v = values(&[
            ("nombre", FieldValue::Text("Capitán".into())),
            ("nivel", FieldValue::Integer(3)),
            ("comision", FieldValue::Decimal(12.5)),
            ("tipo", FieldValue::Text("MAR".into())),
        ]);
        let errors = validate_values(&cargos(), &v);
        assert!(errors.is_empty(), "expected no errors, got: {:?}", errors);
    }

    #[test]
    fn missing_required_field() {
        let errors = validate_values(&cargos(), &values(&[("nombre", FieldValue::Text("   ".into()))]));
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "nombre");
        assert!(errors[0].message.contains("obligatorio"));
    }

    #[test]
    fn collects_all_errors() {
        let v = values(&[
            ("nombre", FieldValue::Text("Contramaestre".into())),
            ("empresaId", FieldValue::Integer(0)),
            ("nivel", FieldValue::Integer(9)),
            ("comision", FieldValue::Decimal(-1.0)),
            ("tipo", FieldValue::Text("AIRE".into())),
        ]);
        let errors = validate_values(&cargos(), &v);
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["nombre", "empresaId", "nivel", "comision", "tipo"]);
    }

    #[test]
    fn valid_schema_no_errors() {
        let errors = validate_schema(&cargos());
        assert!(errors.is_empty(), "expected no errors, got: {:?}", errors);
    }

    #[test]
    fn undeclared_reference() {
        let s = cargos().field(FieldDef::foreign_key("monedaId", "Moneda", "monedas"));
        let errors = validate_schema(&s);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("monedas"));
    }

    #[test]
    fn unknown_names_in_checks_and_derived() {
        let s = cargos()
            .unique("codigo", &["empresaId"], "validar", "dup")
            .derived(DerivedDef::ratio("pct", "%", "nivel", "ghost"))
            .category("tipo", "MAR", "RIO");
        let errors = validate_schema(&s);
        assert_eq!(errors.len(), 3, "{:?}", errors);
        assert!(errors.iter().any(|e| e.message.contains("codigo")));
        assert!(errors.iter().any(|e| e.message.contains("ghost")));
        assert!(errors.iter().any(|e| e.message.contains("RIO")));
    }

    #[test]
    fn bad_path_and_duplicate_field() {
        let s = EntitySchema::new("x", "X", "Bad Path")
            .field(FieldDef::text("nombre", "N"))
            .field(FieldDef::text("nombre", "N"));
        let errors = validate_schema(&s);
        assert_eq!(errors.len(), 2, "{:?}", errors);
        assert_eq!(errors[1].to_string(), "[x] field 'nombre' declared twice");
    }
}
