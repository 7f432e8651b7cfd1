//! Key and value well-formedness checks, run before any mutation.

use serde_json::Value as JsonValue;
use technotes_core::PreferencesConfig;

use crate::error::ValidationError;
use crate::value::PreferenceValue;

pub const DEFAULT_MAX_KEY_LENGTH: usize = 255;
pub const DEFAULT_MAX_STRING_LENGTH: usize = 10_000;

pub trait Validator: Send + Sync {
    fn validate_key(&self, key: &str) -> Result<(), ValidationError>;

    fn validate_value(&self, key: &str, value: &PreferenceValue) -> Result<(), ValidationError>;
}

/// Lengths are counted in characters, not bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DefaultValidator {
    pub max_key_length: usize,
    pub max_string_length: usize,
}

impl Default for DefaultValidator {
    fn default() -> Self {
        Self {
            max_key_length: DEFAULT_MAX_KEY_LENGTH,
            max_string_length: DEFAULT_MAX_STRING_LENGTH,
        }
    }
}

impl DefaultValidator {
    pub fn from_config(config: &PreferencesConfig) -> Self {
        Self {
            max_key_length: config.max_key_length,
            max_string_length: config.max_string_length,
        }
    }
}

impl Validator for DefaultValidator {
    fn validate_key(&self, key: &str) -> Result<(), ValidationError> {
        if key.trim().is_empty() {
            return Err(ValidationError::BlankKey);
        }
        let length = key.chars().count();
        if length > self.max_key_length {
            return Err(ValidationError::KeyTooLong {
                length,
                max: self.max_key_length,
            });
        }
        if key.contains('\0') {
            return Err(ValidationError::KeyContainsNul {
                key: key.replace('\0', "\\0"),
            });
        }
        Ok(())
    }

    fn validate_value(&self, key: &str, value: &PreferenceValue) -> Result<(), ValidationError> {
        match value {
            PreferenceValue::Json(JsonValue::Null) => Err(ValidationError::NullValue { key: key.to_string() }),
            PreferenceValue::String(s) => {
                let length = s.chars().count();
                if length > self.max_string_length {
                    Err(ValidationError::StringTooLong {
                        key: key.to_string(),
                        length,
                        max: self.max_string_length,
                    })
                } else {
                    Ok(())
                }
            }
            PreferenceValue::Float(v) if !v.is_finite() => Err(ValidationError::NonFiniteNumber { key: key.to_string() }),
            PreferenceValue::Double(v) if !v.is_finite() => Err(ValidationError::NonFiniteNumber { key: key.to_string() }),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[case("\t\n")]
    fn test_blank_keys_rejected(#[case] key: &str) {
        assert_eq!(DefaultValidator::default().validate_key(key), Err(ValidationError::BlankKey));
    }

    #[rstest]
    #[case("theme", true)]
    #[case("user.profile.display_name", true)]
    #[case("bad\0key", false)]
    fn test_nul_keys(#[case] key: &str, #[case] valid: bool) {
        assert_eq!(DefaultValidator::default().validate_key(key).is_ok(), valid);
    }

    #[test]
    fn test_key_length_boundary() {
        let validator = DefaultValidator::default();
        assert!(validator.validate_key(&"k".repeat(255)).is_ok());
        assert_eq!(
            validator.validate_key(&"k".repeat(256)),
            Err(ValidationError::KeyTooLong { length: 256, max: 255 })
        );
        // Multi-byte characters count once.
        assert!(validator.validate_key(&"é".repeat(255)).is_ok());
    }

    #[test]
    fn test_string_value_length() {
        let validator = DefaultValidator::default();
        let at_limit = PreferenceValue::String("x".repeat(10_000));
        let over_limit = PreferenceValue::String("x".repeat(10_001));

        assert!(validator.validate_value("note", &at_limit).is_ok());
        assert!(matches!(
            validator.validate_value("note", &over_limit),
            Err(ValidationError::StringTooLong { length: 10_001, .. })
        ));
    }

    #[rstest]
    #[case(PreferenceValue::Double(f64::NAN))]
    #[case(PreferenceValue::Double(f64::INFINITY))]
    #[case(PreferenceValue::Float(f32::NEG_INFINITY))]
    #[case(PreferenceValue::Float(f32::NAN))]
    fn test_non_finite_numbers_rejected(#[case] value: PreferenceValue) {
        assert_eq!(
            DefaultValidator::default().validate_value("ratio", &value),
            Err(ValidationError::NonFiniteNumber { key: "ratio".to_string() })
        );
    }

    #[test]
    fn test_finite_extremes_accepted() {
        let validator = DefaultValidator::default();
        assert!(validator.validate_value("ratio", &PreferenceValue::Double(f64::MAX)).is_ok());
        assert!(validator.validate_value("ratio", &PreferenceValue::Float(f32::MIN_POSITIVE)).is_ok());
    }

    #[test]
    fn test_null_json_rejected() {
        let validator = DefaultValidator::default();
        assert_eq!(
            validator.validate_value("profile", &PreferenceValue::Json(JsonValue::Null)),
            Err(ValidationError::NullValue { key: "profile".to_string() })
        );
        assert!(validator.validate_value("profile", &PreferenceValue::Json(json!({"name": null}))).is_ok());
        assert!(validator.validate_value("count", &PreferenceValue::Int(-1)).is_ok());
    }

    #[test]
    fn test_from_config() {
        let config = PreferencesConfig {
            max_key_length: 8,
            max_string_length: 4,
            ..PreferencesConfig::default()
        };
        let validator = DefaultValidator::from_config(&config);
        assert!(validator.validate_key("123456789").is_err());
        assert!(validator.validate_value("k", &PreferenceValue::String("12345".to_string())).is_err());
    }
}
