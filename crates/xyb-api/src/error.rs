//! Error taxonomy for talking to the attendance platform.

use thiserror::Error;
use xyb_core::ValidationError;

/// Client errors.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Missing credentials or a rejected login.
    #[error("authentication failed: {reason}")]
    Authentication { reason: String },
    /// The account has no default plan: the internship ended or has not started.
    #[error("no active internship plan")]
    NoActivePlan,
    /// Neither the account nor the plan supplies a coordinate.
    #[error("no usable location: configure lat/lng or set a post location in the plan")]
    MissingLocation,
    /// Clock status outside `{1, 2}`.
    #[error("invalid clock status: {value}")]
    InvalidStatus { value: i64 },
    /// The platform answered with a non-success code or a non-JSON body.
    #[error("{operation} failed (code {}): {body}", code.as_deref().unwrap_or("none"))]
    Protocol {
        operation: &'static str,
        code: Option<String>,
        body: String,
    },
    /// A success response missing a field the client relies on.
    #[error("{operation} returned no {field}")]
    UnexpectedPayload {
        operation: &'static str,
        field: &'static str,
    },
    /// Network failure or timeout.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    /// Failed to build HTTP client.
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),
    /// A configured value the client cannot act on.
    #[error("invalid configuration: {0}")]
    Config(#[source] ValidationError),
}

impl ClientError {
    /// Taxonomy name used in logs and batch records.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Authentication { .. } => "AuthenticationError",
            Self::NoActivePlan => "NoActivePlanError",
            Self::MissingLocation => "MissingLocationError",
            Self::InvalidStatus { .. } => "InvalidStatusError",
            Self::Protocol { .. } | Self::UnexpectedPayload { .. } => "ProtocolError",
            Self::Transport(_) | Self::ClientBuild(_) => "TransportError",
            Self::Config(_) => "ConfigurationError",
        }
    }

    /// Expected end-of-internship state rather than a fault.
    #[must_use]
    pub const fn is_expected(&self) -> bool {
        matches!(self, Self::NoActivePlan)
    }
}

impl From<ValidationError> for ClientError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::InvalidClockStatus { value } => Self::InvalidStatus { value },
            ValidationError::MissingCredentials => Self::Authentication {
                reason: err.to_string(),
            },
            ValidationError::Empty { field } => Self::UnexpectedPayload {
                operation: "response",
                field,
            },
            ValidationError::InvalidAction { .. } => Self::Config(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_status_maps_from_validation() {
        let err = ClientError::from(ValidationError::InvalidClockStatus { value: 3 });
        assert!(matches!(err, ClientError::InvalidStatus { value: 3 }));
        assert_eq!(err.kind(), "InvalidStatusError");
    }

    #[test]
    fn missing_credentials_is_authentication() {
        let err = ClientError::from(ValidationError::MissingCredentials);
        assert_eq!(err.kind(), "AuthenticationError");
    }

    #[test]
    fn protocol_error_display_includes_code() {
        let err = ClientError::Protocol {
            operation: "login",
            code: Some("500".to_string()),
            body: "{}".to_string(),
        };
        assert_eq!(err.to_string(), "login failed (code 500): {}");
        let err = ClientError::Protocol {
            operation: "login",
            code: None,
            body: "<html>".to_string(),
        };
        assert_eq!(err.to_string(), "login failed (code none): <html>");
    }

    #[test]
    fn only_no_active_plan_is_expected() {
        assert!(ClientError::NoActivePlan.is_expected());
        assert!(!ClientError::MissingLocation.is_expected());
    }
}
