//! Backend data types
//!
//! Wire types for the transactions API. Field names are camelCase on the wire.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Deserialize an amount that might be encoded as a number or a numeric string.
fn deserialize_flexible_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de;

    struct FlexibleF64Visitor;

    impl<'de> de::Visitor<'de> for FlexibleF64Visitor {
        type Value = f64;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a number or a string containing a number")
        }

        fn visit_f64<E: de::Error>(self, value: f64) -> Result<f64, E> {
            Ok(value)
        }

        fn visit_u64<E: de::Error>(self, value: u64) -> Result<f64, E> {
            Ok(value as f64)
        }

        fn visit_i64<E: de::Error>(self, value: i64) -> Result<f64, E> {
            Ok(value as f64)
        }

        fn visit_str<E: de::Error>(self, value: &str) -> Result<f64, E> {
            value.trim().parse::<f64>().map_err(de::Error::custom)
        }
    }

    deserializer.deserialize_any(FlexibleF64Visitor)
}

/// An employee from the directory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
}

impl Employee {
    /// "First Last", as shown in the employee picker
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// A single transaction
///
/// Only `approved` ever changes after a transaction is fetched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    #[serde(deserialize_with = "deserialize_flexible_f64")]
    pub amount: f64,
    pub employee: Employee,
    pub merchant: String,
    pub date: String,
    pub approved: bool,
}

/// Opaque continuation token for the paginated endpoint
///
/// Kept as raw JSON and echoed back unchanged, so the backend may use numbers
/// or strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageCursor(pub serde_json::Value);

impl fmt::Display for PageCursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            serde_json::Value::String(s) => f.write_str(s),
            other => write!(f, "{}", other),
        }
    }
}

impl From<&str> for PageCursor {
    fn from(s: &str) -> Self {
        PageCursor(serde_json::Value::String(s.to_string()))
    }
}

impl From<u64> for PageCursor {
    fn from(n: u64) -> Self {
        PageCursor(serde_json::Value::from(n))
    }
}

/// One page of results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub data: Vec<T>,
    /// Cursor for the following page; `None` means this was the last page
    #[serde(default)]
    pub next_page: Option<PageCursor>,
}

/// Parameters for `paginatedTransactions`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginatedRequestParams {
    /// Cursor to fetch; omitted for the first page
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<PageCursor>,
}

/// Parameters for `transactionsByEmployee`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestByEmployeeParams {
    pub employee_id: String,
}

/// Parameters for `setTransactionApproval`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetTransactionApprovalParams {
    pub transaction_id: String,
    pub value: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn transaction_json(amount: serde_json::Value) -> serde_json::Value {
        json!({
            "id": "t1",
            "amount": amount,
            "employee": { "id": "e1", "firstName": "Ada", "lastName": "Lovelace" },
            "merchant": "Acme",
            "date": "2022-01-04",
            "approved": false
        })
    }

    #[test]
    fn test_transaction_amount_formats() {
        let t: Transaction = serde_json::from_value(transaction_json(json!(12.5))).unwrap();
        assert_eq!(t.amount, 12.5);
        assert_eq!(t.employee.full_name(), "Ada Lovelace");

        let t: Transaction = serde_json::from_value(transaction_json(json!("99.10"))).unwrap();
        assert_eq!(t.amount, 99.10);

        let t: Transaction = serde_json::from_value(transaction_json(json!(7))).unwrap();
        assert_eq!(t.amount, 7.0);

        assert!(serde_json::from_value::<Transaction>(transaction_json(json!("abc"))).is_err());
    }

    #[test]
    fn test_page_next_cursor() {
        let page: Page<u32> = serde_json::from_value(json!({ "data": [1, 2], "nextPage": 1 })).unwrap();
        assert_eq!(page.next_page, Some(PageCursor::from(1)));

        let page: Page<u32> = serde_json::from_value(json!({ "data": [], "nextPage": null })).unwrap();
        assert_eq!(page.next_page, None);

        // A missing cursor is treated as the last page
        let page: Page<u32> = serde_json::from_value(json!({ "data": [3] })).unwrap();
        assert_eq!(page.next_page, None);

        let page: Page<u32> = serde_json::from_value(json!({ "data": [], "nextPage": "p2" })).unwrap();
        assert_eq!(page.next_page.unwrap().to_string(), "p2");
    }

    #[test]
    fn test_params_serialization() {
        let first = serde_json::to_value(PaginatedRequestParams { page: None }).unwrap();
        assert_eq!(first, json!({}));

        let approval = serde_json::to_value(SetTransactionApprovalParams {
            transaction_id: "t1".into(),
            value: true,
        })
        .unwrap();
        assert_eq!(approval, json!({ "transactionId": "t1", "value": true }));
    }
}
