//! Rule evaluation for setting values.
//!
//! Built-in rules run in a fixed order (type, range, length, pattern,
//! allowed values) and the first failure wins. Per-key custom validators are
//! registered through [`SettingsValidatorBuilder`] at startup and run last.

use crate::models::{SettingValue, ValidationResult, ValidationRule, ValidationRules, ValueKind};
use regex::Regex;
use std::collections::HashMap;
use std::sync::Arc;

/// A per-key validation hook. `Err` carries the user-facing message.
pub type CustomValidator = Arc<dyn Fn(&SettingValue) -> Result<(), String> + Send + Sync>;

/// Collects custom validators before freezing them into a [`SettingsValidator`].
#[derive(Default)]
pub struct SettingsValidatorBuilder {
    custom: HashMap<String, CustomValidator>,
}

impl SettingsValidatorBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a validator for `key`, replacing any earlier one.
    pub fn register<F>(mut self, key: impl Into<String>, validator: F) -> Self
    where
        F: Fn(&SettingValue) -> Result<(), String> + Send + Sync + 'static,
    {
        self.custom.insert(key.into(), Arc::new(validator));
        self
    }

    pub fn build(self) -> SettingsValidator {
        SettingsValidator {
            custom: self.custom,
        }
    }
}

/// Stateless evaluator over [`ValidationRules`].
#[derive(Clone, Default)]
pub struct SettingsValidator {
    custom: HashMap<String, CustomValidator>,
}

impl std::fmt::Debug for SettingsValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SettingsValidator")
            .field("custom_keys", &self.custom.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl SettingsValidator {
    /// A validator with no custom hooks.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> SettingsValidatorBuilder {
        SettingsValidatorBuilder::new()
    }

    pub fn has_custom(&self, key: &str) -> bool {
        self.custom.contains_key(key)
    }

    /// Validate `value` for `key`. Missing rules accept any value.
    pub fn validate_value(
        &self,
        value: &SettingValue,
        rules: Option<&ValidationRules>,
        key: &str,
    ) -> ValidationResult {
        if let Some(rules) = rules {
            for rule in rules.ordered() {
                if let Err(message) = check_rule(&rule, value) {
                    return ValidationResult::invalid(message);
                }
            }
        }

        if let Some(custom) = self.custom.get(key) {
            if let Err(message) = custom(value) {
                return ValidationResult::invalid(message);
            }
        }

        ValidationResult::valid()
    }
}

fn check_rule(rule: &ValidationRule, value: &SettingValue) -> Result<(), String> {
    match rule {
        ValidationRule::Type(expected) => check_type(*expected, value),
        ValidationRule::Range { min, max } => match value.as_f64() {
            Some(n) => check_range(value, n, *min, *max),
            None => Ok(()),
        },
        ValidationRule::Length { min, max } => match value.as_str() {
            Some(s) => check_length(value, s.chars().count(), *min, *max),
            None => Ok(()),
        },
        ValidationRule::Pattern(pattern) => match value.as_str() {
            Some(s) => check_pattern(value, s, pattern),
            None => Ok(()),
        },
        ValidationRule::AllowedValues(allowed) => check_allowed(value, allowed),
    }
}

fn check_type(expected: ValueKind, value: &SettingValue) -> Result<(), String> {
    // Any JSON value satisfies a json-typed rule.
    if expected == ValueKind::Json || value.kind() == expected {
        Ok(())
    } else {
        Err(format!(
            "Value {} must be of type {}, got {}",
            value,
            expected,
            value.kind()
        ))
    }
}

fn check_range(
    value: &SettingValue,
    n: f64,
    min: Option<f64>,
    max: Option<f64>,
) -> Result<(), String> {
    if let Some(min) = min {
        if n < min {
            return Err(format!("Value {} is below minimum {}", value, min));
        }
    }
    if let Some(max) = max {
        if n > max {
            return Err(format!("Value {} is above maximum {}", value, max));
        }
    }
    Ok(())
}

fn check_length(
    value: &SettingValue,
    len: usize,
    min: Option<usize>,
    max: Option<usize>,
) -> Result<(), String> {
    if let Some(min) = min {
        if len < min {
            return Err(format!(
                "Value {} is shorter than minimum length {} (length {})",
                value, min, len
            ));
        }
    }
    if let Some(max) = max {
        if len > max {
            return Err(format!(
                "Value {} is longer than maximum length {} (length {})",
                value, max, len
            ));
        }
    }
    Ok(())
}

fn check_pattern(value: &SettingValue, s: &str, pattern: &str) -> Result<(), String> {
    let re = Regex::new(pattern)
        .map_err(|e| format!("Invalid validation pattern '{}': {}", pattern, e))?;
    if re.is_match(s) {
        Ok(())
    } else {
        Err(format!("Value {} does not match pattern '{}'", value, pattern))
    }
}

fn check_allowed(value: &SettingValue, allowed: &[serde_json::Value]) -> Result<(), String> {
    let json = value.to_json();
    if allowed.iter().any(|candidate| json_equal(candidate, &json)) {
        return Ok(());
    }
    let listed = allowed
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(", ");
    Err(format!(
        "Value {} is not one of the allowed values: [{}]",
        value, listed
    ))
}

/// JSON equality that treats `24` and `24.0` as the same number.
pub(crate) fn json_equal(a: &serde_json::Value, b: &serde_json::Value) -> bool {
    match (a, b) {
        (serde_json::Value::Number(x), serde_json::Value::Number(y)) => {
            x == y || matches!((x.as_f64(), y.as_f64()), (Some(x), Some(y)) if x == y)
        }
        _ => a == b,
    }
}
