//! Order payloads

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::tariff::Tariff;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    #[default]
    New,
    InProgress,
    Completed,
    Cancelled,
    #[serde(other)]
    Unknown,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::New => "NEW",
            OrderStatus::InProgress => "IN_PROGRESS",
            OrderStatus::Completed => "COMPLETED",
            OrderStatus::Cancelled => "CANCELLED",
            OrderStatus::Unknown => "UNKNOWN",
        }
    }
}

/// Order as returned by the orders endpoints.
///
/// The backend body is kept exactly as received and serializes back to the
/// same JSON. The accessors are a read-only typed view over it; a field with
/// an unexpected shape reads as absent instead of failing the whole order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Order {
    raw: Value,
}

impl Order {
    pub fn from_value(raw: Value) -> Self {
        Self { raw }
    }

    pub fn as_value(&self) -> &Value {
        &self.raw
    }

    pub fn into_value(self) -> Value {
        self.raw
    }

    /// Any top-level field, modelled or not.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.raw.get(key)
    }

    pub fn id(&self) -> Option<i64> {
        self.get("id").and_then(Value::as_i64)
    }

    pub fn user(&self) -> Option<i64> {
        self.get("user").and_then(Value::as_i64)
    }

    pub fn tariff(&self) -> Option<i64> {
        self.get("tariff").and_then(Value::as_i64)
    }

    pub fn tariff_details(&self) -> Option<Tariff> {
        self.get("tariff_details")
            .filter(|v| v.is_object())
            .and_then(|v| Tariff::deserialize(v).ok())
    }

    pub fn status(&self) -> OrderStatus {
        self.get("status")
            .and_then(|v| OrderStatus::deserialize(v).ok())
            .unwrap_or(OrderStatus::Unknown)
    }

    pub fn project_name(&self) -> Option<&str> {
        self.str_field("project_name")
    }

    pub fn project_description(&self) -> Option<&str> {
        self.str_field("project_description")
    }

    pub fn requirements(&self) -> Option<&str> {
        self.str_field("requirements")
    }

    pub fn comments(&self) -> Option<&str> {
        self.str_field("comments")
    }

    pub fn reference_links(&self) -> &[Value] {
        self.array_field("reference_links")
    }

    pub fn attachments(&self) -> &[Value] {
        self.array_field("attachments")
    }

    pub fn deadline(&self) -> Option<NaiveDate> {
        self.str_field("deadline").and_then(|s| s.parse().ok())
    }

    /// Decimal amount as sent, whether the backend used a string or a number.
    pub fn total_price(&self) -> Option<String> {
        match self.get("total_price")? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    /// Keeps the backend's UTC offset.
    pub fn created_at(&self) -> Option<DateTime<FixedOffset>> {
        self.timestamp("created_at")
    }

    pub fn updated_at(&self) -> Option<DateTime<FixedOffset>> {
        self.timestamp("updated_at")
    }

    fn str_field(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    fn array_field(&self, key: &str) -> &[Value] {
        self.get(key)
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    fn timestamp(&self, key: &str) -> Option<DateTime<FixedOffset>> {
        self.str_field(key)
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
    }
}

/// Order creation payload. Passed through to the backend unvalidated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewOrder {
    pub tariff: i64,
    pub project_name: String,
    pub project_description: String,
    pub requirements: String,
    pub reference_links: Vec<Value>,
    pub attachments: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadline: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comments: Option<String>,
}

impl NewOrder {
    /// An order with no reference links and no attachments.
    pub fn new(
        tariff: i64,
        project_name: impl Into<String>,
        project_description: impl Into<String>,
        requirements: impl Into<String>,
    ) -> Self {
        Self {
            tariff,
            project_name: project_name.into(),
            project_description: project_description.into(),
            requirements: requirements.into(),
            reference_links: Vec::new(),
            attachments: Vec::new(),
            deadline: None,
            comments: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_order_payload() {
        let order = NewOrder::new(2, "Acme", "Bakery", "Phone: +1");
        assert_eq!(
            serde_json::to_value(&order).unwrap(),
            json!({
                "tariff": 2,
                "project_name": "Acme",
                "project_description": "Bakery",
                "requirements": "Phone: +1",
                "reference_links": [],
                "attachments": []
            })
        );
    }

    #[test]
    fn test_order_typed_view() {
        let order: Order = serde_json::from_value(json!({
            "id": 9,
            "status": "IN_PROGRESS",
            "total_price": 1200.5,
            "deadline": "2025-03-01",
            "reference_links": [{ "url": "https://a.test" }, "https://b.test"],
            "created_at": "2025-01-10T15:00:00.123456+03:00",
            "tariff_details": { "id": 1, "name": "Basic", "price": "49999.00" }
        }))
        .unwrap();

        assert_eq!(order.id(), Some(9));
        assert_eq!(order.status(), OrderStatus::InProgress);
        assert_eq!(order.total_price().as_deref(), Some("1200.5"));
        assert_eq!(order.deadline(), NaiveDate::from_ymd_opt(2025, 3, 1));
        assert_eq!(order.reference_links().len(), 2);
        assert!(order.attachments().is_empty());
        assert_eq!(order.created_at().unwrap().offset().local_minus_utc(), 3 * 3600);
        assert_eq!(order.tariff_details().unwrap().name, "Basic");
    }

    #[test]
    fn test_order_keeps_body_verbatim() {
        let body = json!({
            "id": 1,
            "status": "ON_HOLD",
            "deadline": "soon",
            "total_price": 99999,
            "created_at": "2025-01-10T15:00:00.123456+03:00",
            "attachments": [{ "name": "brief.pdf", "size": 1024 }],
            "manager_note": null
        });
        let order: Order = serde_json::from_value(body.clone()).unwrap();

        assert_eq!(order.status(), OrderStatus::Unknown);
        assert_eq!(order.deadline(), None);
        assert_eq!(order.get("manager_note"), Some(&Value::Null));
        assert_eq!(serde_json::to_value(&order).unwrap(), body);
        assert_eq!(order.into_value(), body);
    }

    #[test]
    fn test_new_order_accepts_structured_links() {
        let mut order = NewOrder::new(1, "P", "D", "R");
        order.reference_links.push(json!({ "url": "https://a.test", "note": "colors" }));
        let payload = serde_json::to_value(&order).unwrap();
        assert_eq!(payload["reference_links"][0]["note"], "colors");
    }
}
