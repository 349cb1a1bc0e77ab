use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One entity instance as exchanged with the backend.
pub type Record = Map<String, Value>;

/// Envelope some collection endpoints wrap their rows in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListEnvelope {
    pub items: Vec<Value>,
    #[serde(default)]
    pub total: Option<usize>,
}

/// Coerce an identifier from string-or-number to `i64`.
///
/// `5`, `5.0`, `"5"` and `" 5 "` all yield `Some(5)`. Strings must be
/// integer literals: `"5.0"` and `"1e3"` are rejected. Fractions, floats
/// outside the `i64` range, empty strings, booleans and anything
/// non-numeric yield `None`.
pub fn coerce_id(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && *f >= i64::MIN as f64 && *f < i64::MAX as f64)
                .map(|f| f as i64)
        }),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

/// Primary key of a record, if present and truthy (non-zero).
pub fn record_id(record: &Record) -> Option<i64> {
    record.get("id").and_then(coerce_id).filter(|id| *id != 0)
}

/// Turn a collection response (bare array or `{items}` envelope) into
/// records. Non-object rows are rejected.
pub fn parse_collection(body: Value) -> Result<Vec<Record>, String> {
    let rows = match body {
        Value::Array(rows) => rows,
        Value::Object(_) => {
            let env: ListEnvelope =
                serde_json::from_value(body).map_err(|e| format!("list envelope: {}", e))?;
            env.items
        }
        other => return Err(format!("expected array or object, got {}", type_name(&other))),
    };
    rows.into_iter()
        .enumerate()
        .map(|(i, row)| match row {
            Value::Object(map) => Ok(map),
            other => Err(format!("row {} is {}, expected object", i, type_name(&other))),
        })
        .collect()
}

/// Turn a single-record response into a record.
pub fn parse_record(body: Value) -> Result<Record, String> {
    match body {
        Value::Object(map) => Ok(map),
        other => Err(format!("expected object, got {}", type_name(&other))),
    }
}

fn type_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
