use thiserror::Error;

/// Errors raised while assembling the pipeline settings.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SettingsError {
    /// A required variable was not set or was empty.
    #[error("Missing required setting: {0}")]
    Missing(&'static str),

    /// A variable could not be parsed into the expected type.
    #[error("Invalid value '{value}' for {key}: {reason}")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },

    /// A value parsed but is outside the accepted range.
    #[error("{key} must be greater than zero")]
    Zero { key: &'static str },
}
