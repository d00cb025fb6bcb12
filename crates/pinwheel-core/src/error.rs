//! Error types for pinwheel

use thiserror::Error;

/// The main error type for pinwheel operations
#[derive(Debug, Error)]
pub enum PinwheelError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Image error: {0}")]
    ImageError(String),

    #[error("TOML parse error: {0}")]
    TomlParseError(String),

    #[error("Invalid field type: expected {expected}, got {got}")]
    InvalidFieldType { expected: String, got: String },

    #[error("Missing required field: {0}")]
    MissingRequiredField(String),

    #[error("Value out of range: {field} must be between {min} and {max}, got {value}")]
    ValueOutOfRange {
        field: String,
        min: f64,
        max: f64,
        value: f64,
    },

    #[error("Invalid enum value: {value} is not one of {allowed:?}")]
    InvalidEnumValue {
        value: String,
        allowed: Vec<String>,
    },

    #[error("Config error: {0}")]
    ConfigError(String),
}

/// Result type alias for pinwheel operations
pub type Result<T> = std::result::Result<T, PinwheelError>;

impl From<toml::de::Error> for PinwheelError {
    fn from(err: toml::de::Error) -> Self {
        PinwheelError::TomlParseError(err.to_string())
    }
}

impl From<image::ImageError> for PinwheelError {
    fn from(err: image::ImageError) -> Self {
        PinwheelError::ImageError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toml_errors_convert() {
        let err: PinwheelError = toml::from_str::<toml::value::Table>("a = ")
            .unwrap_err()
            .into();
        assert!(matches!(err, PinwheelError::TomlParseError(_)));
        assert!(err.to_string().starts_with("TOML parse error"));
    }

    #[test]
    fn out_of_range_message() {
        let err = PinwheelError::ValueOutOfRange {
            field: "max_particles".into(),
            min: 0.0,
            max: 10000.0,
            value: -1.0,
        };
        assert_eq!(
            err.to_string(),
            "Value out of range: max_particles must be between 0 and 10000, got -1"
        );
    }
}
