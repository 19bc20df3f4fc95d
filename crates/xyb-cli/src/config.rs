//! Configuration loading and management.

use std::fmt;
use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized, Toml};
use serde::{Deserialize, Serialize};
use xyb_api::ApiConfig;
use xyb_core::AccountConfig;
use xyb_notify::NotifyConfig;

/// Application configuration.
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Accounts, processed in this order.
    pub accounts: Vec<AccountConfig>,
    pub api: ApiConfig,
    pub notify: NotifyConfig,
    /// Receives one JSON POST per account record.
    pub webhook_url: Option<String>,
    /// Where to save the captured run log.
    pub log_dir: Option<PathBuf>,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let accounts: Vec<String> = self.accounts.iter().map(AccountConfig::label).collect();
        f.debug_struct("Config")
            .field("accounts", &accounts)
            .field("api", &self.api)
            .field("notify", &self.notify)
            .field("webhook_url", &self.webhook_url.as_ref().map(|_| "[REDACTED]"))
            .field("log_dir", &self.log_dir)
            .finish()
    }
}

impl Config {
    /// Loads configuration, optionally from a specific file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Load from default config location
        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        // Load from specified config file
        if let Some(path) = config_path {
            figment = if is_json(path) {
                figment.merge(Json::file(path))
            } else {
                figment.merge(Toml::file(path))
            };
        }

        // Load from environment variables (XYB_*, nested keys split on "__")
        figment = figment.merge(Env::prefixed("XYB_").split("__"));

        figment.extract()
    }
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

/// Returns the platform-specific config directory for xyb.
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("xyb"))
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Write;

    fn write(dir: &tempfile::TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_dirs_config_path_ends_with_xyb() {
        let path = dirs_config_path().unwrap();
        assert_eq!(path.file_name().unwrap(), "xyb");
    }

    #[test]
    fn test_defaults_without_file() {
        let config = Config::default();
        assert!(config.accounts.is_empty());
        assert_eq!(config.api.timeout_secs, 15);
        assert!(!config.api.report_behavior);
        assert!(config.notify.pushplus.is_none());
    }

    #[test]
    fn test_loads_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            &dir,
            "xyb.toml",
            r#"
webhook_url = "http://hooks.local/xyb"

[api]
timeout_secs = 5

[notify.qmsg]
key = "0123456789abcdef0123456789abcdef"
qq = "10001"

[notify.email]
host = "smtp.example.com"
sender = "bot@example.com"
receivers = ["me@example.com"]

[[accounts]]
username = "13812345678"
password = "pw"

[accounts.location]
lat = 39.9
lng = 116.4
adcode = 110101

[accounts.sign_in]
time = ["1-5 1-12 1-31 8 0-10"]
"#,
        );

        let config = Config::load_from(Some(&path)).unwrap();
        assert_eq!(config.api.timeout_secs, 5);
        assert_eq!(config.api.base_url, xyb_api::api::DEFAULT_BASE_URL);
        assert_eq!(config.webhook_url.as_deref(), Some("http://hooks.local/xyb"));
        assert_eq!(config.notify.qmsg.unwrap().qq.as_deref(), Some("10001"));
        let email = config.notify.email.unwrap();
        assert_eq!(email.host.as_deref(), Some("smtp.example.com"));
        assert_eq!(email.receivers, vec!["me@example.com".to_string()]);

        let account = &config.accounts[0];
        assert_eq!(account.location.adcode, "110101");
        assert_eq!(account.sign_in.as_ref().unwrap().time.len(), 1);
        assert!(account.sign_out.is_none());
    }

    #[test]
    fn test_loads_json_accounts_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            &dir,
            "accounts.json",
            r#"{
  "accounts": [
    {
      "openid": "oWx-openid-0001",
      "unionid": "oUn-unionid-0001",
      "location": {"lat": "31.23", "lng": "121.47", "adcode": "310101", "address": "Huangpu"},
      "signOut": {"time": "1-5 1-12 1-31 18 0-10", "overwrite": true}
    }
  ]
}"#,
        );

        let config = Config::load_from(Some(&path)).unwrap();
        let account = &config.accounts[0];
        assert!((account.location.lat - 31.23).abs() < f64::EPSILON);
        let sign_out = account.sign_out.as_ref().unwrap();
        assert!(sign_out.overwrite);
        assert_eq!(sign_out.time, vec!["1-5 1-12 1-31 18 0-10".to_string()]);
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            &dir,
            "xyb.toml",
            r#"
webhook_url = "http://hooks.local/secret-path"

[[accounts]]
username = "13812345678"
password = "hunter2"
"#,
        );
        let config = Config::load_from(Some(&path)).unwrap();
        let debug = format!("{config:?}");
        assert!(debug.contains("138***78"));
        assert!(!debug.contains("hunter2"));
        assert!(!debug.contains("secret-path"));
    }
}
