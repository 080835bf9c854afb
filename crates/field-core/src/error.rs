//! Error types for the particle fields.

use thiserror::Error;

/// Errors produced while configuring or mounting a field.
///
/// Nothing in a per-frame step can fail; every variant here is raised before
/// the animation loop starts.
#[derive(Debug, Error)]
pub enum FieldError {
    /// A configuration value was out of its accepted range.
    #[error("invalid config value for '{field}': {reason}")]
    InvalidConfig { field: &'static str, reason: String },

    /// The drawing surface had no usable area when the field was created.
    #[error("empty viewport: {width}x{height}")]
    EmptyViewport { width: f32, height: f32 },

    /// The drawing surface or its rendering context was unavailable.
    #[error("missing rendering context: {0}")]
    MissingContext(String),

    /// A JSON configuration string could not be parsed.
    #[error("config parse error: {0}")]
    Config(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_config_names_the_field() {
        let err = FieldError::InvalidConfig {
            field: "returnSpeed",
            reason: "must be in (0, 1)".into(),
        };
        let msg = format!("{err}");
        assert!(msg.contains("returnSpeed"), "missing field name in: {msg}");
        assert!(msg.contains("(0, 1)"), "missing reason in: {msg}");
    }

    #[test]
    fn empty_viewport_includes_dimensions() {
        let err = FieldError::EmptyViewport {
            width: 0.0,
            height: 480.0,
        };
        let msg = format!("{err}");
        assert!(msg.contains("0x480"), "missing dimensions in: {msg}");
    }

    #[test]
    fn config_parse_errors_convert() {
        let parse = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: FieldError = parse.into();
        assert!(matches!(err, FieldError::Config(_)));
    }

    #[test]
    fn field_error_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<FieldError>();
    }
}
