//! Core type definitions with validation.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Validation errors for core types.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    /// The provided value was empty.
    #[error("{field} cannot be empty")]
    Empty { field: &'static str },

    /// Neither a username/password pair nor an openid/unionid pair was configured.
    #[error("account has no usable credentials (need username/password or openid/unionid)")]
    MissingCredentials,

    /// Clock status outside the closed `{1, 2}` set.
    #[error("invalid clock status: {value}")]
    InvalidClockStatus { value: i64 },

    /// Unknown action name.
    #[error("invalid action: {value}")]
    InvalidAction { value: String },
}

/// Generates a validated string ID newtype with common trait implementations.
macro_rules! define_string_id {
    (
        $(#[$meta:meta])*
        $name:ident, $field_name:literal
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Creates a new ID after validation.
            pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
                let id = id.into();
                if id.is_empty() {
                    return Err(ValidationError::Empty { field: $field_name });
                }
                Ok(Self(id))
            }

            /// Returns the ID as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = ValidationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_string_id!(
    /// The platform's identifier for a logged-in user.
    LoginerId, "loginer ID"
);

define_string_id!(
    /// Identifier of the trainee record inside the active plan.
    ///
    /// Every clock submission is scoped to one trainee ID.
    TraineeId, "trainee ID"
);

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    #[must_use]
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// True when both components are non-zero.
    ///
    /// A zero component means "not configured" in account files and plan details.
    #[must_use]
    pub fn is_set(&self) -> bool {
        self.lat != 0.0 && self.lng != 0.0
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.lat, self.lng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trainee_id_rejects_empty() {
        assert!(TraineeId::new("").is_err());
        assert!(TraineeId::new("88231").is_ok());
    }

    #[test]
    fn loginer_id_serde_roundtrip() {
        let id = LoginerId::new("1024").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"1024\"");
        let parsed: LoginerId = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn loginer_id_serde_rejects_empty() {
        let result: Result<LoginerId, _> = serde_json::from_str("\"\"");
        assert!(result.is_err());
    }

    #[test]
    fn coordinate_requires_both_components() {
        assert!(Coordinate::new(31.23, 121.47).is_set());
        assert!(!Coordinate::new(0.0, 121.47).is_set());
        assert!(!Coordinate::new(31.23, 0.0).is_set());
        assert!(!Coordinate::default().is_set());
    }
}
