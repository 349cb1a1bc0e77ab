//! Boundary normalization between the backend and the engine.

use std::collections::BTreeMap;

use serde_json::Value;
use tracing::warn;

use megui_core::{Record, coerce_id};

use crate::entity::EntitySchema;
use crate::field::FieldKind;
use crate::value::FieldValue;

/// Coerce numeric fields of a record returned by the API.
///
/// Id and foreign-key fields always end up as JSON integers or `null`,
/// whatever representation the backend used. Integer and decimal fields
/// sent as numeric strings become numbers. Fields the schema does not
/// declare are left untouched.
pub fn normalize_inbound(schema: &EntitySchema, record: &mut Record) {
    for field in &schema.fields {
        let Some(raw) = record.get(&field.name) else {
            continue;
        };
        let coerced = match &field.kind {
            FieldKind::Id | FieldKind::ForeignKey { .. } => match raw {
                Value::Null => continue,
                Value::String(s) if s.trim().is_empty() => Value::Null,
                _ => match coerce_id(raw) {
                    Some(id) => Value::Number(id.into()),
                    None => {
                        warn!(
                            entity = %schema.name,
                            field = %field.name,
                            value = %raw,
                            "non-numeric key from backend, treating as null"
                        );
                        Value::Null
                    }
                },
            },
            FieldKind::Integer { .. } | FieldKind::Decimal { .. } => match raw {
                Value::String(_) => match FieldValue::from_json(&field.kind, raw) {
                    Ok(v) => v.to_json(&field.kind),
                    Err(_) => continue,
                },
                _ => continue,
            },
            _ => continue,
        };
        record.insert(field.name.clone(), coerced);
    }
}

/// Normalize every record of a collection in place.
pub fn normalize_collection(schema: &EntitySchema, records: &mut [Record]) {
    for record in records.iter_mut() {
        normalize_inbound(schema, record);
    }
}

/// Box every declared field of a record. Unparseable values become
/// `Null` (the form shows them empty rather than failing to open).
pub fn values_from_record(schema: &EntitySchema, record: &Record) -> BTreeMap<String, FieldValue> {
    schema
        .fields
        .iter()
        .map(|field| {
            let raw = record.get(&field.name).unwrap_or(&Value::Null);
            let value = FieldValue::from_json(&field.kind, raw).unwrap_or_else(|e| {
                warn!(entity = %schema.name, field = %field.name, "{}", e);
                FieldValue::Null
            });
            (field.name.clone(), value)
        })
        .collect()
}
