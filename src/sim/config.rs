use serde::{Deserialize, Serialize};

/// What the simulated pool looks like at startup.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SimConfig {
    /// The only account that can log in.
    pub username: String,
    pub password: String,
    /// API version reported by the simulated host.
    pub api_version_major: i64,
    pub api_version_minor: i64,
    pub pool_name: String,
    pub host_name: String,
    /// Memory of the simulated host in bytes.
    pub host_memory: i64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            username: "root".to_string(),
            password: "xenroot".to_string(),
            api_version_major: 2,
            api_version_minor: 21,
            pool_name: "sim-pool".to_string(),
            host_name: "sim-host-01".to_string(),
            host_memory: 16 << 30,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_keys_take_defaults() {
        let config: SimConfig =
            serde_json::from_str(r#"{ "password": "secret", "api_version_major": 3 }"#).unwrap();
        assert_eq!(config.username, "root");
        assert_eq!(config.password, "secret");
        assert_eq!(config.api_version_major, 3);
        assert_eq!(config.api_version_minor, 21);
    }
}
