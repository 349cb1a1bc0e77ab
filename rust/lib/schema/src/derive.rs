//! Display-only values computed from other fields.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::value::{FieldValue, round_to};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DerivedKind {
    /// `numerator / denominator * 100`, two decimals. Covers both share
    /// percentages and production yields.
    Ratio {
        numerator: String,
        denominator: String,
    },
    /// Document expiry relative to today.
    Expiry { date_field: String, warn_days: i64 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedDef {
    /// Wire name the value would be stored under if persisted.
    pub name: String,
    pub label: String,
    pub kind: DerivedKind,
    /// The user may type a value that replaces the computed one and is
    /// then sent with the payload.
    #[serde(default)]
    pub persist_override: bool,
}

impl DerivedDef {
    pub fn ratio(name: &str, label: &str, numerator: &str, denominator: &str) -> Self {
        Self {
            name: name.to_string(),
            label: label.to_string(),
            kind: DerivedKind::Ratio {
                numerator: numerator.to_string(),
                denominator: denominator.to_string(),
            },
            persist_override: false,
        }
    }

    pub fn expiry(name: &str, label: &str, date_field: &str, warn_days: i64) -> Self {
        Self {
            name: name.to_string(),
            label: label.to_string(),
            kind: DerivedKind::Expiry {
                date_field: date_field.to_string(),
                warn_days,
            },
            persist_override: false,
        }
    }

    pub fn overridable(mut self) -> Self {
        self.persist_override = true;
        self
    }

    /// Source fields this value is computed from.
    pub fn inputs(&self) -> Vec<&str> {
        match &self.kind {
            DerivedKind::Ratio {
                numerator,
                denominator,
            } => vec![numerator, denominator],
            DerivedKind::Expiry { date_field, .. } => vec![date_field],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpiryStatus {
    Valid,
    ExpiringSoon,
    Expired,
}

impl std::fmt::Display for ExpiryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExpiryStatus::Valid => write!(f, "Vigente"),
            ExpiryStatus::ExpiringSoon => write!(f, "Por vencer"),
            ExpiryStatus::Expired => write!(f, "Vencido"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DerivedValue {
    Number(f64),
    Expiry(ExpiryStatus),
    /// An input is missing or the denominator is zero.
    Unavailable,
}

impl DerivedValue {
    pub fn display(&self) -> String {
        match self {
            DerivedValue::Number(n) => format!("{:.2}", n),
            DerivedValue::Expiry(s) => s.to_string(),
            DerivedValue::Unavailable => String::new(),
        }
    }
}

/// Compute a derived value. A date equal to `today` counts as expired.
pub fn compute(def: &DerivedDef, values: &BTreeMap<String, FieldValue>, today: NaiveDate) -> DerivedValue {
    match &def.kind {
        DerivedKind::Ratio {
            numerator,
            denominator,
        } => {
            let num = values.get(numerator).and_then(FieldValue::as_f64);
            let den = values.get(denominator).and_then(FieldValue::as_f64);
            match (num, den) {
                (Some(n), Some(d)) if d != 0.0 => DerivedValue::Number(round_to(n / d * 100.0, 2)),
                _ => DerivedValue::Unavailable,
            }
        }
        DerivedKind::Expiry {
            date_field,
            warn_days,
        } => match values.get(date_field).and_then(FieldValue::as_date) {
            Some(date) if date <= today => DerivedValue::Expiry(ExpiryStatus::Expired),
            Some(date) if (date - today).num_days() <= *warn_days => {
                DerivedValue::Expiry(ExpiryStatus::ExpiringSoon)
            }
            Some(_) => DerivedValue::Expiry(ExpiryStatus::Valid),
            None => DerivedValue::Unavailable,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn ratio_is_rounded_percentage() {
        let def = DerivedDef::ratio("rendimiento", "Rendimiento %", "pesoProducto", "pesoMateriaPrima");
        let mut values = BTreeMap::new();
        values.insert("pesoProducto".to_string(), FieldValue::Decimal(245.0));
        values.insert("pesoMateriaPrima".to_string(), FieldValue::Integer(1000));
        assert_eq!(compute(&def, &values, day(2024, 1, 1)), DerivedValue::Number(24.5));

        values.insert("pesoMateriaPrima".to_string(), FieldValue::Integer(3));
        values.insert("pesoProducto".to_string(), FieldValue::Integer(1));
        assert_eq!(compute(&def, &values, day(2024, 1, 1)), DerivedValue::Number(33.33));
    }

    #[test]
    fn ratio_with_zero_or_missing_is_unavailable() {
        let def = DerivedDef::ratio("r", "R", "a", "b");
        let mut values = BTreeMap::new();
        values.insert("a".to_string(), FieldValue::Integer(5));
        values.insert("b".to_string(), FieldValue::Integer(0));
        assert_eq!(compute(&def, &values, day(2024, 1, 1)), DerivedValue::Unavailable);
        values.remove("b");
        assert_eq!(compute(&def, &values, day(2024, 1, 1)), DerivedValue::Unavailable);
    }

    #[test]
    fn expiry_flags() {
        let def = DerivedDef::expiry("estado", "Estado", "fechaVencimiento", 30);
        let today = day(2024, 6, 15);
        let mut values = BTreeMap::new();

        values.insert("fechaVencimiento".to_string(), FieldValue::Date(day(2024, 6, 15)));
        assert_eq!(compute(&def, &values, today), DerivedValue::Expiry(ExpiryStatus::Expired));

        values.insert("fechaVencimiento".to_string(), FieldValue::Date(day(2024, 7, 15)));
        assert_eq!(compute(&def, &values, today), DerivedValue::Expiry(ExpiryStatus::ExpiringSoon));

        values.insert("fechaVencimiento".to_string(), FieldValue::Date(day(2024, 7, 16)));
        assert_eq!(compute(&def, &values, today), DerivedValue::Expiry(ExpiryStatus::Valid));

        values.insert("fechaVencimiento".to_string(), FieldValue::Null);
        assert_eq!(compute(&def, &values, today), DerivedValue::Unavailable);
    }

    #[test]
    fn display() {
        assert_eq!(DerivedValue::Number(24.5).display(), "24.50");
        assert_eq!(DerivedValue::Expiry(ExpiryStatus::Expired).display(), "Vencido");
        assert_eq!(DerivedValue::Unavailable.display(), "");
    }
}
