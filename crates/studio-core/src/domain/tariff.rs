//! Tariff (service package) payloads

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tariff {
    pub id: i64,
    pub name: String,
    pub description: String,
    #[serde(deserialize_with = "decimal_string")]
    pub price: Option<String>,
    pub features: Vec<String>,
    pub is_active: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Decimal amounts arrive as strings (`"49999.00"`) or, depending on the
/// backend's settings, as plain JSON numbers.
pub(crate) fn decimal_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(serde::de::Error::custom(format!(
            "expected a decimal amount, got {}",
            other
        ))),
    }
}
