//! Account configuration as read from the accounts file.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use crate::types::{Coordinate, ValidationError};

/// One configured account.
///
/// Either `username`/`password` or `openid`/`unionid` must be present. When
/// both pairs are configured the password login wins.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct AccountConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub openid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unionid: Option<String>,
    #[serde(default)]
    pub location: Location,
    /// Time windows for the sign-in task.
    #[serde(default, alias = "signIn", skip_serializing_if = "Option::is_none")]
    pub sign_in: Option<TaskConfig>,
    /// Time windows for the sign-out task.
    #[serde(default, alias = "signOut", skip_serializing_if = "Option::is_none")]
    pub sign_out: Option<TaskConfig>,
}

impl fmt::Debug for AccountConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccountConfig")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .field("openid", &self.openid)
            .field("unionid", &self.unionid.as_ref().map(|_| "[REDACTED]"))
            .field("location", &self.location)
            .field("sign_in", &self.sign_in)
            .field("sign_out", &self.sign_out)
            .finish()
    }
}

/// The login method resolved from an account configuration.
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    /// Phone number and plain-text password.
    Password { username: String, password: String },
    /// WeChat mini-program identity tokens.
    WeChat { open_id: String, union_id: String },
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Password { username, .. } => f
                .debug_struct("Password")
                .field("username", username)
                .finish_non_exhaustive(),
            Self::WeChat { open_id, .. } => f
                .debug_struct("WeChat")
                .field("open_id", open_id)
                .finish_non_exhaustive(),
        }
    }
}

impl Credentials {
    /// Short name of the login method, for logs.
    #[must_use]
    pub const fn method(&self) -> &'static str {
        match self {
            Self::Password { .. } => "password",
            Self::WeChat { .. } => "wechat",
        }
    }
}

fn non_empty(value: Option<&String>) -> Option<&str> {
    value.map(String::as_str).filter(|v| !v.trim().is_empty())
}

impl AccountConfig {
    /// Resolves which login flow to use.
    pub fn credentials(&self) -> Result<Credentials, ValidationError> {
        if let (Some(username), Some(password)) = (
            non_empty(self.username.as_ref()),
            non_empty(self.password.as_ref()),
        ) {
            return Ok(Credentials::Password {
                username: username.to_string(),
                password: password.to_string(),
            });
        }
        if let (Some(open_id), Some(union_id)) = (
            non_empty(self.openid.as_ref()),
            non_empty(self.unionid.as_ref()),
        ) {
            return Ok(Credentials::WeChat {
                open_id: open_id.to_string(),
                union_id: union_id.to_string(),
            });
        }
        Err(ValidationError::MissingCredentials)
    }

    /// A human-readable label that never exposes secrets.
    #[must_use]
    pub fn label(&self) -> String {
        if let Some(username) = non_empty(self.username.as_ref()) {
            return mask(username);
        }
        if let Some(open_id) = non_empty(self.openid.as_ref()) {
            return mask(open_id);
        }
        "<unnamed>".to_string()
    }

    /// The configured coordinate override, if any.
    #[must_use]
    pub fn coordinate_override(&self) -> Option<Coordinate> {
        let coordinate = Coordinate::new(self.location.lat, self.location.lng);
        coordinate.is_set().then_some(coordinate)
    }
}

/// Keeps the first three and last two characters.
fn mask(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    if chars.len() <= 5 {
        return value.to_string();
    }
    let head: String = chars[..3].iter().collect();
    let tail: String = chars[chars.len() - 2..].iter().collect();
    format!("{head}***{tail}")
}

/// Manual geolocation and address information for an account.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Location {
    #[serde(default, deserialize_with = "f64_or_string")]
    pub lat: f64,
    #[serde(default, deserialize_with = "f64_or_string")]
    pub lng: f64,
    #[serde(default, deserialize_with = "string_or_number")]
    pub adcode: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub province: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub city: String,
}

/// Schedule for one task (sign-in or sign-out) of an account.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskConfig {
    /// Time-window strings; a single string is accepted too.
    #[serde(default, deserialize_with = "one_or_many")]
    pub time: Vec<String>,
    /// Replace an existing record instead of skipping.
    #[serde(default)]
    pub overwrite: bool,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(serde_json::Number),
    String(String),
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match NumberOrString::deserialize(deserializer)? {
        NumberOrString::Number(n) => n.to_string(),
        NumberOrString::String(s) => s,
    })
}

fn f64_or_string<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    match NumberOrString::deserialize(deserializer)? {
        NumberOrString::Number(n) => n
            .as_f64()
            .ok_or_else(|| serde::de::Error::custom(format!("invalid coordinate: {n}"))),
        NumberOrString::String(s) if s.trim().is_empty() => Ok(0.0),
        NumberOrString::String(s) => s
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("invalid coordinate: {s}"))),
    }
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(s) => vec![s],
        OneOrMany::Many(v) => v,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(json: &str) -> AccountConfig {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn password_login_takes_priority() {
        let acc = account(
            r#"{"username":"13800000000","password":"pw","openid":"o1","unionid":"u1"}"#,
        );
        assert_eq!(
            acc.credentials().unwrap(),
            Credentials::Password {
                username: "13800000000".to_string(),
                password: "pw".to_string(),
            }
        );
    }

    #[test]
    fn wechat_login_used_without_password() {
        let acc = account(r#"{"openid":"o1","unionid":"u1"}"#);
        assert_eq!(acc.credentials().unwrap().method(), "wechat");
    }

    #[test]
    fn blank_credentials_are_missing() {
        let acc = account(r#"{"username":"  ","password":"pw","openid":"o1"}"#);
        assert_eq!(
            acc.credentials().unwrap_err(),
            ValidationError::MissingCredentials
        );
    }

    #[test]
    fn location_accepts_numbers_and_strings() {
        let acc = account(
            r#"{"openid":"o","unionid":"u","location":{"lat":"39.9","lng":116.4,"adcode":110105,"address":"Chaoyang"}}"#,
        );
        assert!((acc.location.lat - 39.9).abs() < f64::EPSILON);
        assert!((acc.location.lng - 116.4).abs() < f64::EPSILON);
        assert_eq!(acc.location.adcode, "110105");
        assert_eq!(acc.coordinate_override(), Some(Coordinate::new(39.9, 116.4)));
    }

    #[test]
    fn zero_location_is_not_an_override() {
        let acc = account(r#"{"openid":"o","unionid":"u","location":{"lat":0,"lng":0}}"#);
        assert_eq!(acc.coordinate_override(), None);
    }

    #[test]
    fn task_time_accepts_single_string() {
        let acc = account(
            r#"{"openid":"o","unionid":"u","signIn":{"time":"1-5 1-12 1-31 8 0-10"}}"#,
        );
        let task = acc.sign_in.unwrap();
        assert_eq!(task.time, vec!["1-5 1-12 1-31 8 0-10".to_string()]);
        assert!(!task.overwrite);
    }

    #[test]
    fn debug_redacts_secrets() {
        let acc = account(r#"{"username":"13800000000","password":"hunter2"}"#);
        let debug = format!("{acc:?}");
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn label_masks_identity() {
        let acc = account(r#"{"username":"13812345678","password":"pw"}"#);
        assert_eq!(acc.label(), "138***78");
    }
}
