// system-tests/tests/helpers/assertions.rs
// ============================================================================
// Module: Response Assertions
// Description: Status and body-shape checks for billing API responses.
// Purpose: Produce failure messages that name the action and the payload.
// Dependencies: serde_json
// ============================================================================

use serde_json::Value;

use super::billing_client::ApiResponse;

/// Fails unless the response carries `expected` status.
pub fn expect_status(response: &ApiResponse, expected: u16, action: &str) -> Result<(), String> {
    if response.status == expected {
        return Ok(());
    }
    Err(format!(
        "{action}: expected status {expected}, got {} with body {}",
        response.status, response.body
    ))
}

/// Renders an identifier field (number or non-empty string) as a string.
pub fn id_of(value: &Value) -> Option<String> {
    match value {
        Value::Number(number) => Some(number.to_string()),
        Value::String(text) if !text.trim().is_empty() => Some(text.clone()),
        _ => None,
    }
}

/// Converts a stored identifier back to JSON, keeping numeric ids numeric.
pub fn id_value(raw: &str) -> Value {
    raw.parse::<u64>().map_or_else(|_| Value::String(raw.to_string()), Value::from)
}

/// Returns the `id` field of an entity body.
pub fn expect_id(body: &Value, action: &str) -> Result<String, String> {
    body.get("id").and_then(id_of).ok_or_else(|| format!("{action}: response has no id: {body}"))
}

/// Fails unless `field` of `body` refers to identifier `expected`.
pub fn expect_id_field(body: &Value, field: &str, expected: &str, action: &str) -> Result<(), String> {
    match body.get(field).and_then(id_of) {
        Some(actual) if actual == expected => Ok(()),
        other => Err(format!("{action}: expected {field} {expected}, got {other:?}")),
    }
}

/// Returns a string field of `body`.
pub fn expect_str<'a>(body: &'a Value, field: &str, action: &str) -> Result<&'a str, String> {
    body.get(field)
        .and_then(Value::as_str)
        .ok_or_else(|| format!("{action}: missing string field `{field}` in {body}"))
}

/// Fails unless string `field` of `body` equals `expected`.
pub fn expect_str_eq(body: &Value, field: &str, expected: &str, action: &str) -> Result<(), String> {
    let actual = expect_str(body, field, action)?;
    if actual == expected {
        return Ok(());
    }
    Err(format!("{action}: expected {field} {expected:?}, got {actual:?}"))
}

/// Returns the `items` of a list body after checking `total` covers them.
pub fn expect_items<'a>(body: &'a Value, action: &str) -> Result<&'a [Value], String> {
    let items = body
        .get("items")
        .and_then(Value::as_array)
        .ok_or_else(|| format!("{action}: list body has no items array: {body}"))?;
    let total = body
        .get("total")
        .and_then(Value::as_u64)
        .ok_or_else(|| format!("{action}: list body has no numeric total: {body}"))?;
    let listed = u64::try_from(items.len()).unwrap_or(u64::MAX);
    if total < listed {
        return Err(format!("{action}: total {total} is smaller than {listed} listed items"));
    }
    Ok(items)
}

/// Returns whether any listed item has identifier `id`.
pub fn contains_id(items: &[Value], id: &str) -> bool {
    items.iter().any(|item| item.get("id").and_then(id_of).as_deref() == Some(id))
}
