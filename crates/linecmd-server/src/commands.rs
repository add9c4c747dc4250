//! Built-in commands.

use crate::registry::{CommandError, CommandRegistry, CommandResult};
use serde_json::Value;

/// `SUM2`: add the numeric `arg1` and `arg2` payload fields.
///
/// Integer addition when both arguments are integers, float addition when
/// either is a float. Missing or non-numeric arguments fail with a message
/// naming the offending field.
pub async fn sum2(_command: String, data: Value) -> CommandResult {
    let arg1 = data
        .get("arg1")
        .ok_or_else(|| CommandError::new("Not found argument arg1"))?;
    let arg2 = data
        .get("arg2")
        .ok_or_else(|| CommandError::new("Not found argument arg2"))?;

    if !arg1.is_number() {
        return Err(CommandError::new("arg1 is not number"));
    }
    if !arg2.is_number() {
        return Err(CommandError::new("arg2 is not number"));
    }

    if let (Some(a), Some(b)) = (arg1.as_i64(), arg2.as_i64()) {
        if let Some(sum) = a.checked_add(b) {
            return Ok(Value::from(sum));
        }
    }

    let a = arg1
        .as_f64()
        .ok_or_else(|| CommandError::new("arg1 is not number"))?;
    let b = arg2
        .as_f64()
        .ok_or_else(|| CommandError::new("arg2 is not number"))?;
    Ok(Value::from(a + b))
}

/// Register the built-in commands on a registry.
pub async fn register_builtins(registry: &CommandRegistry) {
    registry.register("SUM2", sum2).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_sum2_integers() {
        let result = sum2("SUM2".into(), json!({"arg1": 2, "arg2": 3}))
            .await
            .unwrap();
        assert_eq!(result, json!(5));
    }

    #[tokio::test]
    async fn test_sum2_mixed_types_yield_float() {
        let result = sum2("SUM2".into(), json!({"arg1": 2, "arg2": 3.5}))
            .await
            .unwrap();
        assert_eq!(result, json!(5.5));
    }

    #[tokio::test]
    async fn test_sum2_floats() {
        let result = sum2("SUM2".into(), json!({"arg1": 0.25, "arg2": 0.5}))
            .await
            .unwrap();
        assert_eq!(result, json!(0.75));
    }

    #[tokio::test]
    async fn test_sum2_negative_integers() {
        let result = sum2("SUM2".into(), json!({"arg1": -7, "arg2": 3}))
            .await
            .unwrap();
        assert_eq!(result, json!(-4));
    }

    #[tokio::test]
    async fn test_sum2_missing_arguments() {
        let error = sum2("SUM2".into(), json!({"arg2": 3})).await.unwrap_err();
        assert_eq!(error.to_string(), "Not found argument arg1");

        let error = sum2("SUM2".into(), json!({"arg1": 3})).await.unwrap_err();
        assert_eq!(error.to_string(), "Not found argument arg2");
    }

    #[tokio::test]
    async fn test_sum2_non_numeric_arguments() {
        let error = sum2("SUM2".into(), json!({"arg1": "x", "arg2": 2}))
            .await
            .unwrap_err();
        assert_eq!(error.to_string(), "arg1 is not number");

        let error = sum2("SUM2".into(), json!({"arg1": 2, "arg2": true}))
            .await
            .unwrap_err();
        assert_eq!(error.to_string(), "arg2 is not number");
    }

    #[tokio::test]
    async fn test_sum2_non_object_data() {
        // A scalar payload passes the shallow envelope check; the handler
        // reports the first missing field.
        let error = sum2("SUM2".into(), json!(5)).await.unwrap_err();
        assert_eq!(error.to_string(), "Not found argument arg1");
    }

    #[tokio::test]
    async fn test_sum2_integer_overflow_promotes_to_float() {
        let result = sum2("SUM2".into(), json!({"arg1": i64::MAX, "arg2": 1}))
            .await
            .unwrap();
        assert!(result.is_f64());
    }

    #[tokio::test]
    async fn test_register_builtins() {
        let registry = CommandRegistry::new();
        register_builtins(&registry).await;
        assert!(registry.contains("SUM2").await);
    }
}
