use serde::{Deserialize, Serialize};

pub const DEFAULT_MANAGEMENT_URL: &str = "https://management.azure.com";
pub const DEFAULT_API_VERSION: &str = "2021-06-01";

/// Operator-level settings for talking to Azure Resource Manager.
///
/// Not part of any resource file; supplied through CLI flags or the
/// environment at startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientSettings {
    /// Resource Manager endpoint, e.g. `https://management.azure.com`.
    pub management_url: String,
    /// `api-version` query parameter sent with every request.
    pub api_version: String,
    /// Pre-acquired bearer token.
    #[serde(skip_serializing)]
    pub access_token: String,
    /// Delays in seconds between polls of a long-running operation, cycled.
    pub poll_delays_secs: Vec<u64>,
    /// Upper bound on polls before a long-running operation is abandoned.
    pub max_polls: usize,
}

impl ClientSettings {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            management_url: DEFAULT_MANAGEMENT_URL.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            access_token: access_token.into(),
            poll_delays_secs: vec![1, 2, 4, 8, 16, 30],
            max_polls: 120,
        }
    }

    pub fn with_management_url(mut self, url: impl Into<String>) -> Self {
        self.management_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = version.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_public_cloud() {
        let s = ClientSettings::new("tok");
        assert_eq!(s.management_url, DEFAULT_MANAGEMENT_URL);
        assert_eq!(s.api_version, DEFAULT_API_VERSION);
        assert_eq!(s.max_polls, 120);
    }

    #[test]
    fn management_url_trailing_slash_trimmed() {
        let s = ClientSettings::new("tok").with_management_url("http://127.0.0.1:8080/");
        assert_eq!(s.management_url, "http://127.0.0.1:8080");
    }

    #[test]
    fn token_is_not_serialized() {
        let json = serde_json::to_value(ClientSettings::new("secret-token")).unwrap();
        assert!(json.get("access_token").is_none());
    }
}
