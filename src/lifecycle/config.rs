use serde::{Deserialize, Serialize};
use std::env;

/// Credentials and login settings for a client.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ClientConfig {
    pub username: String,
    pub password: String,
    /// Shown in the server's logs next to each call of the session.
    pub originator: String,
    /// Login protocol version, `"1.0"` for every current server.
    pub login_version: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            username: "root".to_string(),
            password: "xenroot".to_string(),
            originator: env!("CARGO_PKG_NAME").to_string(),
            login_version: "1.0".to_string(),
        }
    }
}

impl ClientConfig {
    /// The defaults, overridden by `XENAPI_USERNAME`, `XENAPI_PASSWORD`,
    /// `XENAPI_ORIGINATOR` and `XENAPI_LOGIN_VERSION` where set.
    pub fn from_env() -> Self {
        Self::default().with_overrides(|key| env::var(key).ok())
    }

    fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let fields = [
            ("XENAPI_USERNAME", &mut self.username),
            ("XENAPI_PASSWORD", &mut self.password),
            ("XENAPI_ORIGINATOR", &mut self.originator),
            ("XENAPI_LOGIN_VERSION", &mut self.login_version),
        ];
        for (key, field) in fields {
            if let Some(value) = lookup(key).filter(|v| !v.is_empty()) {
                *field = value;
            }
        }
        self
    }
}
