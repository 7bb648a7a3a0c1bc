//! Shared validation helpers for inbound HTTP adapters.

use serde_json::json;
use uuid::Uuid;

use crate::domain::Error;

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    InvalidUuid,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            ErrorCode::InvalidUuid => "invalid_uuid",
        }
    }
}

/// Newtype wrapper for HTTP field names to provide type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(&self) -> &str {
        self.0
    }
}

pub(crate) fn invalid_uuid_error(field: FieldName, value: &str) -> Error {
    let field = field.as_str();
    Error::invalid_request(format!("{field} must be a valid UUID")).with_details(json!({
        "field": field,
        "value": value,
        "code": ErrorCode::InvalidUuid.as_str(),
    }))
}

pub(crate) fn parse_uuid(value: &str, field: FieldName) -> Result<Uuid, Error> {
    Uuid::parse_str(value).map_err(|_| invalid_uuid_error(field, value))
}

#[cfg(test)]
mod tests {
    use serde_json::Value;

    use super::*;

    #[test]
    fn invalid_uuid_carries_field_details() {
        let error = parse_uuid("not-a-uuid", FieldName::new("itemId"))
            .expect_err("invalid uuid must fail");
        let raw = serde_json::to_value(&error).expect("serialise error");
        let details = raw.get("details").expect("details present");
        assert_eq!(details.get("field"), Some(&Value::from("itemId")));
        assert_eq!(details.get("code"), Some(&Value::from("invalid_uuid")));
    }

    #[test]
    fn valid_uuid_parses() {
        parse_uuid("3fa85f64-5717-4562-b3fc-2c963f66afa6", FieldName::new("itemId"))
            .expect("valid uuid parses");
    }
}
