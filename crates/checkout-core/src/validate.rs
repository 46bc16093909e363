//! Configuration Validation
//!
//! One pure function for both integrations. Presence follows script
//! truthiness: `null`, `false`, `0` and `""` count as missing.

use serde_json::Value;

use crate::config::{ConfigInput, HandlerSlot, IntegrationKind};

/// Field-level validation messages for a configuration; empty when valid
pub fn validate(input: &ConfigInput) -> Vec<String> {
    let mut errors = Vec::new();

    match input.kind {
        IntegrationKind::Direct => validate_direct(&input.fields, &mut errors),
        IntegrationKind::AccessCode => validate_access_code(&input.fields, &mut errors),
    }

    let callback_url = input.fields.get("callback_url");
    if is_present(callback_url) && !is_string(callback_url) {
        errors.push("callback_url must be a string".into());
    }
    if matches!(input.on_complete, HandlerSlot::NotCallable) {
        errors.push("onComplete must be a function".into());
    }
    if matches!(input.on_cancel, HandlerSlot::NotCallable) {
        errors.push("onCancel must be a function".into());
    }
    if input.kind == IntegrationKind::Direct {
        let custom_fields = input.fields.get("custom_fields");
        if is_present(custom_fields) && !matches!(custom_fields, Some(Value::Object(_) | Value::Array(_))) {
            errors.push("custom_fields must be an object".into());
        }
    }

    errors
}

fn validate_direct(fields: &Value, errors: &mut Vec<String>) {
    if !is_present(fields.get("api_key")) {
        errors.push("api_key is required".into());
    }

    let amount = fields.get("amount");
    if !is_present(amount) || !matches!(amount, Some(Value::Number(_))) {
        errors.push("amount is required and must be a number".into());
    }

    let currency = fields.get("currency");
    if !is_present(currency) || !is_string(currency) {
        errors.push("currency is required and must be a string".into());
    }

    let reference = fields.get("reference");
    if is_present(reference) && !is_string(reference) {
        errors.push("reference must be a string".into());
    }

    let customer = fields.get("customer");
    if !is_present(customer) {
        errors.push("customer is required".into());
        return;
    }

    let customer_field = |name: &str| customer.and_then(|c| c.get(name));
    let email = customer_field("email");
    if !is_present(email) || !is_string(email) {
        errors.push("customer.email is required and must be a string".into());
    }
    for name in ["first_name", "last_name", "phone"] {
        let value = customer_field(name);
        if is_present(value) && !is_string(value) {
            errors.push(format!("customer.{name} must be a string"));
        }
    }
}

fn validate_access_code(fields: &Value, errors: &mut Vec<String>) {
    let access_code = fields.get("access_code");
    if !is_present(access_code) || !is_string(access_code) {
        errors.push("access_code is required and must be a string".into());
    }
}

/// Script truthiness of an optional JSON value
pub fn is_present(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_) | Value::Object(_)) => true,
    }
}

fn is_string(value: Option<&Value>) -> bool {
    matches!(value, Some(Value::String(_)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn direct(fields: Value) -> Vec<String> {
        validate(&ConfigInput::new(IntegrationKind::Direct, fields))
    }

    fn valid_direct() -> Value {
        json!({
            "api_key": "pk_test_123",
            "amount": 1000,
            "currency": "NGN",
            "customer": { "email": "ada@example.com" }
        })
    }

    #[test]
    fn test_valid_direct_config() {
        assert!(direct(valid_direct()).is_empty());
    }

    #[test]
    fn test_missing_email_is_reported() {
        let mut fields = valid_direct();
        fields["customer"] = json!({ "first_name": "Ada" });
        let errors = direct(fields);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("customer.email"));
    }

    #[test]
    fn test_empty_object_reports_every_required_field() {
        assert_eq!(
            direct(json!({})),
            [
                "api_key is required",
                "amount is required and must be a number",
                "currency is required and must be a string",
                "customer is required",
            ]
        );
    }

    #[test]
    fn test_type_mismatches() {
        let fields = json!({
            "api_key": "pk",
            "amount": "1000",
            "currency": 566,
            "reference": 42,
            "customer": { "email": "ada@example.com", "phone": 2348000000000_u64 },
            "callback_url": true,
            "custom_fields": "plan=gold"
        });
        assert_eq!(
            direct(fields),
            [
                "amount is required and must be a number",
                "currency is required and must be a string",
                "reference must be a string",
                "customer.phone must be a string",
                "callback_url must be a string",
                "custom_fields must be an object",
            ]
        );
    }

    #[test]
    fn test_zero_amount_counts_as_missing() {
        let mut fields = valid_direct();
        fields["amount"] = json!(0);
        assert_eq!(direct(fields), ["amount is required and must be a number"]);
    }

    #[test]
    fn test_falsy_optional_fields_are_ignored() {
        let mut fields = valid_direct();
        fields["reference"] = json!("");
        fields["callback_url"] = Value::Null;
        fields["customer"]["last_name"] = json!(false);
        assert!(direct(fields).is_empty());
    }

    #[test]
    fn test_non_object_customer_has_no_email() {
        let mut fields = valid_direct();
        fields["customer"] = json!("ada@example.com");
        assert_eq!(direct(fields), ["customer.email is required and must be a string"]);
    }

    #[test]
    fn test_access_code_rules() {
        let input = ConfigInput::new(IntegrationKind::AccessCode, json!({ "access_code": 7 }))
            .with_on_complete(HandlerSlot::NotCallable)
            .with_on_cancel(HandlerSlot::NotCallable);
        assert_eq!(
            validate(&input),
            [
                "access_code is required and must be a string",
                "onComplete must be a function",
                "onCancel must be a function",
            ]
        );
    }

    #[test]
    fn test_custom_fields_ignored_for_access_code() {
        let input = ConfigInput::new(
            IntegrationKind::AccessCode,
            json!({ "access_code": "AC_1", "custom_fields": "x" }),
        );
        assert!(validate(&input).is_empty());
    }
}
