//! Setting domain models for marketplace configuration management.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

/// Discriminant of a [`SettingValue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    String,
    Number,
    Boolean,
    Json,
}

impl std::fmt::Display for ValueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValueKind::String => write!(f, "string"),
            ValueKind::Number => write!(f, "number"),
            ValueKind::Boolean => write!(f, "boolean"),
            ValueKind::Json => write!(f, "json"),
        }
    }
}

/// A dynamically typed setting value.
///
/// Serialized untagged so that the wire and storage format is plain JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SettingValue {
    Boolean(bool),
    Number(serde_json::Number),
    String(String),
    Json(serde_json::Value),
}

impl SettingValue {
    /// Classify a raw JSON value.
    pub fn from_json(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Bool(b) => SettingValue::Boolean(b),
            serde_json::Value::Number(n) => SettingValue::Number(n),
            serde_json::Value::String(s) => SettingValue::String(s),
            other => SettingValue::Json(other),
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            SettingValue::Boolean(b) => serde_json::Value::Bool(*b),
            SettingValue::Number(n) => serde_json::Value::Number(n.clone()),
            SettingValue::String(s) => serde_json::Value::String(s.clone()),
            SettingValue::Json(v) => v.clone(),
        }
    }

    pub fn kind(&self) -> ValueKind {
        match self {
            SettingValue::Boolean(_) => ValueKind::Boolean,
            SettingValue::Number(_) => ValueKind::Number,
            SettingValue::String(_) => ValueKind::String,
            SettingValue::Json(_) => ValueKind::Json,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            SettingValue::Number(n) => n.as_f64(),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            SettingValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            SettingValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }
}

impl From<serde_json::Value> for SettingValue {
    fn from(value: serde_json::Value) -> Self {
        SettingValue::from_json(value)
    }
}

impl std::fmt::Display for SettingValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SettingValue::Boolean(b) => write!(f, "{}", b),
            SettingValue::Number(n) => write!(f, "{}", n),
            SettingValue::String(s) => write!(f, "'{}'", s),
            SettingValue::Json(v) => write!(f, "{}", v),
        }
    }
}

/// A single constraint, in evaluation order.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationRule {
    Type(ValueKind),
    Range { min: Option<f64>, max: Option<f64> },
    Length { min: Option<usize>, max: Option<usize> },
    Pattern(String),
    AllowedValues(Vec<serde_json::Value>),
}

/// Validation metadata stored alongside a setting.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationRules {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub value_type: Option<ValueKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_values: Option<Vec<serde_json::Value>>,
}

impl ValidationRules {
    pub fn number_range(min: f64, max: f64) -> Self {
        Self {
            value_type: Some(ValueKind::Number),
            min: Some(min),
            max: Some(max),
            ..Default::default()
        }
    }

    /// The configured rules as an ordered list: type, range, length, pattern, allowed values.
    pub fn ordered(&self) -> Vec<ValidationRule> {
        let mut rules = Vec::new();
        if let Some(kind) = self.value_type {
            rules.push(ValidationRule::Type(kind));
        }
        if self.min.is_some() || self.max.is_some() {
            rules.push(ValidationRule::Range {
                min: self.min,
                max: self.max,
            });
        }
        if self.min_length.is_some() || self.max_length.is_some() {
            rules.push(ValidationRule::Length {
                min: self.min_length,
                max: self.max_length,
            });
        }
        if let Some(pattern) = &self.pattern {
            rules.push(ValidationRule::Pattern(pattern.clone()));
        }
        if let Some(allowed) = &self.allowed_values {
            rules.push(ValidationRule::AllowedValues(allowed.clone()));
        }
        rules
    }
}

/// Category for grouping settings in the admin UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SettingCategory {
    #[default]
    General,
    Store,
    Catalog,
    Checkout,
    Shipping,
    Payments,
    Notifications,
    Appearance,
    Security,
}

impl std::fmt::Display for SettingCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SettingCategory::General => "general",
            SettingCategory::Store => "store",
            SettingCategory::Catalog => "catalog",
            SettingCategory::Checkout => "checkout",
            SettingCategory::Shipping => "shipping",
            SettingCategory::Payments => "payments",
            SettingCategory::Notifications => "notifications",
            SettingCategory::Appearance => "appearance",
            SettingCategory::Security => "security",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for SettingCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "general" => Ok(SettingCategory::General),
            "store" => Ok(SettingCategory::Store),
            "catalog" => Ok(SettingCategory::Catalog),
            "checkout" => Ok(SettingCategory::Checkout),
            "shipping" => Ok(SettingCategory::Shipping),
            "payments" => Ok(SettingCategory::Payments),
            "notifications" => Ok(SettingCategory::Notifications),
            "appearance" => Ok(SettingCategory::Appearance),
            "security" => Ok(SettingCategory::Security),
            _ => Err(format!("Unknown setting category: {}", s)),
        }
    }
}

/// A single named configuration value with validation metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Setting {
    pub id: Uuid,
    pub key: String,
    pub value: SettingValue,
    pub category: SettingCategory,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation_rules: Option<ValidationRules>,
    pub is_sensitive: bool,
    pub requires_restart: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_by: Option<Uuid>,
}

/// Placeholder shown instead of sensitive values.
pub const REDACTED_VALUE: &str = "********";

impl Setting {
    /// Copy of this setting with the value masked if it is sensitive.
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        if copy.is_sensitive {
            copy.value = SettingValue::String(REDACTED_VALUE.to_string());
        }
        copy
    }
}

/// Input for creating a setting.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewSetting {
    #[validate(length(min = 1, max = 128, message = "Key must be 1-128 characters"))]
    pub key: String,
    pub value: serde_json::Value,
    #[serde(default)]
    pub category: SettingCategory,
    #[validate(length(max = 500, message = "Description must be at most 500 characters"))]
    pub description: Option<String>,
    pub validation_rules: Option<ValidationRules>,
    #[serde(default)]
    pub is_sensitive: bool,
    #[serde(default)]
    pub requires_restart: bool,
}

impl NewSetting {
    pub fn new(key: impl Into<String>, value: serde_json::Value) -> Self {
        Self {
            key: key.into(),
            value,
            category: SettingCategory::General,
            description: None,
            validation_rules: None,
            is_sensitive: false,
            requires_restart: false,
        }
    }

    pub fn with_rules(mut self, rules: ValidationRules) -> Self {
        self.validation_rules = Some(rules);
        self
    }

    pub fn with_category(mut self, category: SettingCategory) -> Self {
        self.category = category;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn sensitive(mut self) -> Self {
        self.is_sensitive = true;
        self
    }
}

/// Result of evaluating a value against validation rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub is_valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl ValidationResult {
    pub fn valid() -> Self {
        Self {
            is_valid: true,
            error_message: None,
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self {
            is_valid: false,
            error_message: Some(message.into()),
        }
    }
}

/// Request to update a single setting.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateSettingRequest {
    pub value: serde_json::Value,
}

/// Request to update several settings at once.
#[derive(Debug, Clone, Deserialize)]
pub struct BulkUpdateSettingsRequest {
    pub settings: HashMap<String, serde_json::Value>,
}

/// Outcome of a bulk update; each key is applied independently.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkUpdateOutcome {
    pub updated: Vec<String>,
    pub unchanged: Vec<String>,
    pub invalid: HashMap<String, String>,
    pub not_found: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_value_from_json_kinds() {
        assert_eq!(SettingValue::from_json(json!(true)).kind(), ValueKind::Boolean);
        assert_eq!(SettingValue::from_json(json!(24)).kind(), ValueKind::Number);
        assert_eq!(SettingValue::from_json(json!(2.5)).kind(), ValueKind::Number);
        assert_eq!(SettingValue::from_json(json!("usd")).kind(), ValueKind::String);
        assert_eq!(SettingValue::from_json(json!([1, 2])).kind(), ValueKind::Json);
        assert_eq!(SettingValue::from_json(json!(null)).kind(), ValueKind::Json);
    }

    #[test]
    fn test_value_serializes_untagged() {
        let value = SettingValue::from_json(json!(24));
        assert_eq!(serde_json::to_string(&value).unwrap(), "24");
        let value: SettingValue = serde_json::from_str("\"EUR\"").unwrap();
        assert_eq!(value, SettingValue::String("EUR".to_string()));
    }

    #[test]
    fn test_value_display_keeps_integers() {
        assert_eq!(SettingValue::from_json(json!(500)).to_string(), "500");
        assert_eq!(SettingValue::from_json(json!("x")).to_string(), "'x'");
    }

    #[test]
    fn test_rules_ordered() {
        let rules = ValidationRules {
            value_type: Some(ValueKind::String),
            max_length: Some(3),
            pattern: Some("^[A-Z]+$".to_string()),
            allowed_values: Some(vec![json!("USD")]),
            ..Default::default()
        };
        let ordered = rules.ordered();
        assert_eq!(ordered.len(), 4);
        assert_eq!(ordered[0], ValidationRule::Type(ValueKind::String));
        assert!(matches!(ordered[1], ValidationRule::Length { max: Some(3), .. }));
        assert!(matches!(ordered[2], ValidationRule::Pattern(_)));
        assert!(matches!(ordered[3], ValidationRule::AllowedValues(_)));
    }

    #[test]
    fn test_rules_deserialize_type_field() {
        let rules: ValidationRules =
            serde_json::from_value(json!({"type": "number", "min": 1, "max": 100})).unwrap();
        assert_eq!(rules, ValidationRules::number_range(1.0, 100.0));
    }

    #[test]
    fn test_category_roundtrip() {
        assert_eq!("Catalog".parse::<SettingCategory>().unwrap(), SettingCategory::Catalog);
        assert_eq!(SettingCategory::Payments.to_string(), "payments");
        assert!("unknown".parse::<SettingCategory>().is_err());
    }

    #[test]
    fn test_redacted() {
        let now = Utc::now();
        let setting = Setting {
            id: Uuid::new_v4(),
            key: "payment_api_key".to_string(),
            value: SettingValue::String("secret".to_string()),
            category: SettingCategory::Payments,
            description: None,
            validation_rules: None,
            is_sensitive: true,
            requires_restart: false,
            created_at: now,
            updated_at: now,
            updated_by: None,
        };
        assert_eq!(setting.redacted().value.as_str(), Some(REDACTED_VALUE));
    }
}
