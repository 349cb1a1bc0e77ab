//! Boxed form values.
//!
//! Raw JSON (from the API) and raw text (from an input) are both turned
//! into a [`FieldValue`] according to the field kind. `to_json` is the
//! only way a value leaves the form, so every payload is normalized.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use serde_json::{Number, Value};

use megui_core::coerce_id;

use crate::field::FieldKind;

#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Null,
    Text(String),
    Integer(i64),
    Decimal(f64),
    Date(NaiveDate),
    DateTime(DateTime<Utc>),
    Bool(bool),
}

impl FieldValue {
    /// Box a JSON value for the given kind.
    ///
    /// Numbers may arrive as strings and dates as either `YYYY-MM-DD` or a
    /// full timestamp. `null`, missing and blank strings become `Null`
    /// (except for text, which keeps the blank string).
    pub fn from_json(kind: &FieldKind, value: &Value) -> Result<FieldValue, String> {
        if value.is_null() {
            return Ok(FieldValue::Null);
        }
        if let Value::String(s) = value {
            if s.trim().is_empty() && !matches!(kind, FieldKind::Text { .. }) {
                return Ok(FieldValue::Null);
            }
        }

        match kind {
            FieldKind::Id | FieldKind::ForeignKey { .. } => coerce_id(value)
                .map(FieldValue::Integer)
                .ok_or_else(|| format!("'{}' no es un identificador válido", plain(value))),
            FieldKind::Integer { .. } => coerce_id(value)
                .map(FieldValue::Integer)
                .ok_or_else(|| format!("'{}' no es un número entero", plain(value))),
            FieldKind::Decimal { .. } => parse_f64(value)
                .map(FieldValue::Decimal)
                .ok_or_else(|| format!("'{}' no es un número", plain(value))),
            FieldKind::Text { .. } | FieldKind::Enum { .. } => Ok(FieldValue::Text(plain(value))),
            FieldKind::Date => match value {
                Value::String(s) => parse_date(s)
                    .map(FieldValue::Date)
                    .ok_or_else(|| format!("'{}' no es una fecha válida", s)),
                other => Err(format!("'{}' no es una fecha válida", other)),
            },
            FieldKind::DateTime => match value {
                Value::String(s) => parse_datetime(s)
                    .map(FieldValue::DateTime)
                    .ok_or_else(|| format!("'{}' no es una fecha y hora válida", s)),
                other => Err(format!("'{}' no es una fecha y hora válida", other)),
            },
            FieldKind::Bool => match value {
                Value::Bool(b) => Ok(FieldValue::Bool(*b)),
                Value::Number(n) if n.as_i64() == Some(0) => Ok(FieldValue::Bool(false)),
                Value::Number(n) if n.as_i64() == Some(1) => Ok(FieldValue::Bool(true)),
                Value::String(s) => match s.trim().to_lowercase().as_str() {
                    "true" | "1" | "si" | "sí" => Ok(FieldValue::Bool(true)),
                    "false" | "0" | "no" => Ok(FieldValue::Bool(false)),
                    other => Err(format!("'{}' no es un valor booleano", other)),
                },
                other => Err(format!("'{}' no es un valor booleano", other)),
            },
            FieldKind::Audit => Ok(match value {
                Value::Number(n) => n
                    .as_i64()
                    .map(FieldValue::Integer)
                    .unwrap_or_else(|| FieldValue::Text(n.to_string())),
                other => FieldValue::Text(plain(other)),
            }),
        }
    }

    /// Box text typed by the user.
    pub fn parse_input(kind: &FieldKind, raw: &str) -> Result<FieldValue, String> {
        Self::from_json(kind, &Value::String(raw.to_string()))
    }

    /// Normalized wire representation: text trimmed and cased, decimals
    /// rounded to their scale, dates as ISO strings, blanks as `null`.
    pub fn to_json(&self, kind: &FieldKind) -> Value {
        match (self, kind) {
            (FieldValue::Null, _) => Value::Null,
            (FieldValue::Text(s), FieldKind::Text { case, .. }) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    Value::Null
                } else {
                    Value::String(case.apply(trimmed))
                }
            }
            (FieldValue::Text(s), _) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    Value::Null
                } else {
                    Value::String(trimmed.to_string())
                }
            }
            (FieldValue::Integer(i), FieldKind::Decimal { .. }) => number(*i as f64),
            (FieldValue::Integer(i), _) => Value::Number((*i).into()),
            (FieldValue::Decimal(d), FieldKind::Decimal { scale, .. }) => {
                number(round_to(*d, *scale))
            }
            (FieldValue::Decimal(d), _) => number(*d),
            (FieldValue::Date(d), _) => Value::String(d.format("%Y-%m-%d").to_string()),
            (FieldValue::DateTime(dt), _) => {
                Value::String(dt.to_rfc3339_opts(SecondsFormat::Millis, true))
            }
            (FieldValue::Bool(b), _) => Value::Bool(*b),
        }
    }

    /// Missing for the purpose of a "required" rule.
    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Null => true,
            FieldValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Integer(i) => Some(*i as f64),
            FieldValue::Decimal(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            FieldValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            FieldValue::Date(d) => Some(*d),
            FieldValue::DateTime(dt) => Some(dt.date_naive()),
            _ => None,
        }
    }

    /// Cell text for tables and terminals.
    pub fn display(&self) -> String {
        match self {
            FieldValue::Null => String::new(),
            FieldValue::Text(s) => s.clone(),
            FieldValue::Integer(i) => i.to_string(),
            FieldValue::Decimal(d) => format!("{}", d),
            FieldValue::Date(d) => d.format("%d/%m/%Y").to_string(),
            FieldValue::DateTime(dt) => dt.format("%d/%m/%Y %H:%M").to_string(),
            FieldValue::Bool(true) => "Sí".to_string(),
            FieldValue::Bool(false) => "No".to_string(),
        }
    }
}

/// Round half away from zero to `scale` decimals.
pub fn round_to(value: f64, scale: u32) -> f64 {
    let factor = 10f64.powi(scale as i32);
    (value * factor).round() / factor
}

fn number(f: f64) -> Value {
    Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null)
}

fn plain(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn parse_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().replace(',', ".").parse::<f64>().ok(),
        _ => None,
    }
    .filter(|f| f.is_finite())
}

/// Accepts `YYYY-MM-DD`, `DD/MM/YYYY` or any timestamp whose first ten
/// characters are a date.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(s, "%d/%m/%Y"))
        .ok()
        .or_else(|| {
            parse_datetime(s)
                .map(|dt| dt.date_naive())
                .or_else(|| s.get(..10).and_then(|p| NaiveDate::parse_from_str(p, "%Y-%m-%d").ok()))
        })
}

/// Accepts RFC 3339, a naive `YYYY-MM-DDTHH:MM[:SS]` (taken as UTC) or a
/// bare date (midnight UTC).
pub fn parse_datetime(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{FieldDef, TextCase};
    use serde_json::json;

    fn kind(f: FieldDef) -> FieldKind {
        f.kind
    }

    #[test]
    fn keys_accept_numeric_strings() {
        let fk = kind(FieldDef::foreign_key("empresaId", "Empresa", "empresas"));
        assert_eq!(FieldValue::from_json(&fk, &json!("5")).unwrap(), FieldValue::Integer(5));
        assert_eq!(FieldValue::from_json(&fk, &json!(5)).unwrap(), FieldValue::Integer(5));
        assert_eq!(FieldValue::from_json(&fk, &json!("")).unwrap(), FieldValue::Null);
        assert!(FieldValue::from_json(&fk, &json!("x")).is_err());
    }

    #[test]
    fn text_is_trimmed_and_cased_on_output() {
        let upper = FieldKind::Text {
            case: TextCase::Upper,
            max_len: None,
        };
        let v = FieldValue::parse_input(&upper, "  101102ab  ").unwrap();
        assert_eq!(v, FieldValue::Text("  101102ab  ".into()));
        assert_eq!(v.to_json(&upper), json!("101102AB"));

        let blank = FieldValue::parse_input(&upper, "   ").unwrap();
        assert!(blank.is_empty());
        assert_eq!(blank.to_json(&upper), Value::Null);
    }

    #[test]
    fn decimals_round_to_scale() {
        let money = kind(FieldDef::money("precio", "Precio"));
        let v = FieldValue::parse_input(&money, "12,346").unwrap();
        assert_eq!(v.to_json(&money), json!(12.35));
        let v = FieldValue::from_json(&money, &json!("7")).unwrap();
        assert_eq!(v.to_json(&money), json!(7.0));
        assert_eq!(round_to(2.0049, 3), 2.005);
    }

    #[test]
    fn dates_box_and_serialize() {
        let v = FieldValue::from_json(&FieldKind::Date, &json!("2024-03-09T05:00:00.000Z")).unwrap();
        assert_eq!(v, FieldValue::Date(NaiveDate::from_ymd_opt(2024, 3, 9).unwrap()));
        assert_eq!(v.to_json(&FieldKind::Date), json!("2024-03-09"));

        let v = FieldValue::parse_input(&FieldKind::Date, "09/03/2024").unwrap();
        assert_eq!(v.to_json(&FieldKind::Date), json!("2024-03-09"));

        let v = FieldValue::from_json(&FieldKind::DateTime, &json!("2024-03-09T10:30:00")).unwrap();
        assert_eq!(v.to_json(&FieldKind::DateTime), json!("2024-03-09T10:30:00.000Z"));

        assert!(FieldValue::parse_input(&FieldKind::Date, "ayer").is_err());
    }

    #[test]
    fn booleans_from_many_shapes() {
        let k = FieldKind::Bool;
        assert_eq!(FieldValue::from_json(&k, &json!(1)).unwrap(), FieldValue::Bool(true));
        assert_eq!(FieldValue::parse_input(&k, "no").unwrap(), FieldValue::Bool(false));
        assert_eq!(FieldValue::parse_input(&k, "Sí").unwrap(), FieldValue::Bool(true));
        assert!(FieldValue::parse_input(&k, "maybe").is_err());
    }

    #[test]
    fn display_formats() {
        assert_eq!(FieldValue::Bool(true).display(), "Sí");
        assert_eq!(
            FieldValue::Date(NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()).display(),
            "02/01/2024"
        );
        assert_eq!(FieldValue::Null.display(), "");
    }
}
