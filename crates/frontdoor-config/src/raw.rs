use serde::Deserialize;

/// Raw YAML representation of a resource file.
#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RawResource {
    Rule(RawRule),
    Secret(RawSecret),
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawRule {
    pub name: String,
    pub cdn_frontdoor_rule_set_id: String,
    #[serde(default)]
    pub order: u32,
    /// "Continue" (default) or "Stop".
    pub match_processing_behavior: Option<String>,
    #[serde(default)]
    pub actions: RawActions,
    #[serde(default)]
    pub conditions: RawConditions,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawActions {
    pub route_configuration_override_action: Option<RawRouteConfigurationOverride>,
    pub url_redirect_action: Option<RawUrlRedirect>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawRouteConfigurationOverride {
    pub cdn_frontdoor_origin_group_id: Option<String>,
    #[serde(default = "default_forwarding_protocol")]
    pub forwarding_protocol: String,
    #[serde(default = "default_query_string_caching_behavior")]
    pub query_string_caching_behavior: String,
    #[serde(default)]
    pub query_string_parameters: Vec<String>,
    #[serde(default)]
    pub compression_enabled: bool,
    #[serde(default = "default_cache_behavior")]
    pub cache_behavior: String,
    pub cache_duration: Option<String>,
}

fn default_forwarding_protocol() -> String {
    "MatchRequest".to_string()
}

fn default_query_string_caching_behavior() -> String {
    "IgnoreQueryString".to_string()
}

fn default_cache_behavior() -> String {
    "HonorOrigin".to_string()
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawUrlRedirect {
    pub redirect_type: String,
    #[serde(default = "default_redirect_protocol")]
    pub redirect_protocol: String,
    #[serde(default)]
    pub destination_path: String,
    #[serde(default)]
    pub destination_hostname: String,
    #[serde(default)]
    pub query_string: String,
    #[serde(default)]
    pub destination_fragment: String,
}

fn default_redirect_protocol() -> String {
    "MatchRequest".to_string()
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawConditions {
    pub host_name_condition: Option<RawCondition>,
    pub is_device_condition: Option<RawCondition>,
    pub post_args_condition: Option<RawCondition>,
    pub request_method_condition: Option<RawCondition>,
    pub url_filename_condition: Option<RawCondition>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawCondition {
    #[serde(default = "default_operator")]
    pub operator: String,
    #[serde(default)]
    pub negate_condition: bool,
    #[serde(default)]
    pub match_values: Vec<String>,
    #[serde(default)]
    pub transforms: Vec<String>,
    /// Only meaningful on `post_args_condition`.
    pub post_args_name: Option<String>,
}

fn default_operator() -> String {
    "Equal".to_string()
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawSecret {
    pub name: String,
    pub cdn_frontdoor_profile_id: String,
    pub parameters: Option<RawSecretParameters>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawSecretParameters {
    pub customer_certificate: Option<RawCustomerCertificate>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawCustomerCertificate {
    pub key_vault_certificate_id: String,
    #[serde(default = "default_true")]
    pub use_latest_version: bool,
    #[serde(default)]
    pub subject_alternative_names: Vec<String>,
}

fn default_true() -> bool {
    true
}
