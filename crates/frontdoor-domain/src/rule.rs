use std::fmt;

use serde::{Deserialize, Serialize};

use crate::duration::{validate_cache_duration, CACHE_DURATION_FIELD};
use crate::error::DomainError;
use crate::ids::{FrontdoorOriginGroupId, FrontdoorRuleSetId};

// ── Enums ─────────────────────────────────────────────────────────────────────

/// Implements `Display` and `parse` using the Azure wire name of each variant.
macro_rules! wire_enum {
    ($ty:ident { $($variant:ident),+ $(,)? }) => {
        impl $ty {
            pub const ALL: &'static [$ty] = &[$($ty::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($ty::$variant => stringify!($variant)),+
                }
            }

            pub fn parse(s: &str) -> Option<Self> {
                Self::ALL.iter().find(|v| v.as_str() == s).cloned()
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchProcessingBehavior {
    #[default]
    Continue,
    Stop,
}
wire_enum!(MatchProcessingBehavior { Continue, Stop });

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ForwardingProtocol {
    HttpOnly,
    HttpsOnly,
    MatchRequest,
}
wire_enum!(ForwardingProtocol { HttpOnly, HttpsOnly, MatchRequest });

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QueryStringCachingBehavior {
    IgnoreQueryString,
    UseQueryString,
    IgnoreSpecifiedQueryStrings,
    IncludeSpecifiedQueryStrings,
}
wire_enum!(QueryStringCachingBehavior {
    IgnoreQueryString,
    UseQueryString,
    IgnoreSpecifiedQueryStrings,
    IncludeSpecifiedQueryStrings,
});

impl QueryStringCachingBehavior {
    /// Whether this behaviour acts on an explicit parameter list.
    pub fn uses_parameters(&self) -> bool {
        matches!(
            self,
            QueryStringCachingBehavior::IgnoreSpecifiedQueryStrings
                | QueryStringCachingBehavior::IncludeSpecifiedQueryStrings
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CacheBehavior {
    HonorOrigin,
    OverrideAlways,
    OverrideIfOriginMissing,
    Disabled,
}
wire_enum!(CacheBehavior { HonorOrigin, OverrideAlways, OverrideIfOriginMissing, Disabled });

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RedirectType {
    Moved,
    Found,
    TemporaryRedirect,
    PermanentRedirect,
}
wire_enum!(RedirectType { Moved, Found, TemporaryRedirect, PermanentRedirect });

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RedirectProtocol {
    MatchRequest,
    Http,
    Https,
}
wire_enum!(RedirectProtocol { MatchRequest, Http, Https });

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Transform {
    Lowercase,
    Uppercase,
    Trim,
    UrlDecode,
    UrlEncode,
    RemoveNulls,
}
wire_enum!(Transform { Lowercase, Uppercase, Trim, UrlDecode, UrlEncode, RemoveNulls });

// ── Actions ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteConfigurationOverride {
    pub origin_group_id: Option<FrontdoorOriginGroupId>,
    pub forwarding_protocol: ForwardingProtocol,
    pub query_string_caching_behavior: QueryStringCachingBehavior,
    pub query_string_parameters: Vec<String>,
    pub compression_enabled: bool,
    pub cache_behavior: CacheBehavior,
    /// `D.HH:MM:SS` or `HH:MM:SS`; see [`validate_cache_duration`].
    pub cache_duration: Option<String>,
}

impl RouteConfigurationOverride {
    /// Reject durations the service would misread and field combinations it
    /// would silently drop.
    pub fn validate(&self) -> Result<(), DomainError> {
        if let Some(duration) = self.cache_duration.as_deref() {
            validate_cache_duration(duration, CACHE_DURATION_FIELD)?;
            if self.cache_behavior == CacheBehavior::Disabled {
                return Err(DomainError::InvalidConfig(format!(
                    "{:?} must not be set when cache_behavior is {:?}",
                    CACHE_DURATION_FIELD,
                    CacheBehavior::Disabled.as_str()
                )));
            }
        }

        // Forwarding protocol is only carried by the origin group override.
        if self.origin_group_id.is_none()
            && self.forwarding_protocol != ForwardingProtocol::MatchRequest
        {
            return Err(DomainError::InvalidConfig(format!(
                "forwarding_protocol {:?} requires cdn_frontdoor_origin_group_id to be set",
                self.forwarding_protocol.as_str()
            )));
        }
        if !self.query_string_caching_behavior.uses_parameters()
            && !self.query_string_parameters.is_empty()
        {
            return Err(DomainError::InvalidConfig(format!(
                "query_string_parameters must be empty when query_string_caching_behavior is {:?}",
                self.query_string_caching_behavior.as_str()
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlRedirect {
    pub redirect_type: RedirectType,
    pub redirect_protocol: RedirectProtocol,
    pub destination_path: String,
    pub destination_hostname: String,
    pub query_string: String,
    pub destination_fragment: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleAction {
    RouteConfigurationOverride(RouteConfigurationOverride),
    UrlRedirect(UrlRedirect),
}

impl RuleAction {
    /// Block name used in the resource configuration.
    pub fn block_name(&self) -> &'static str {
        match self {
            RuleAction::RouteConfigurationOverride(_) => "route_configuration_override_action",
            RuleAction::UrlRedirect(_) => "url_redirect_action",
        }
    }
}

// ── Conditions ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionKind {
    HostName,
    IsDevice,
    PostArgs { post_args_name: String },
    RequestMethod,
    UrlFilename,
}

impl ConditionKind {
    pub fn block_name(&self) -> &'static str {
        match self {
            ConditionKind::HostName => "host_name_condition",
            ConditionKind::IsDevice => "is_device_condition",
            ConditionKind::PostArgs { .. } => "post_args_condition",
            ConditionKind::RequestMethod => "request_method_condition",
            ConditionKind::UrlFilename => "url_filename_condition",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleCondition {
    pub kind: ConditionKind,
    pub operator: String,
    pub negate_condition: bool,
    pub match_values: Vec<String>,
    pub transforms: Vec<Transform>,
}

// ── Rule ──────────────────────────────────────────────────────────────────────

/// A Front Door delivery rule living inside a rule set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    pub name: String,
    pub rule_set_id: FrontdoorRuleSetId,
    pub order: u32,
    pub match_processing_behavior: MatchProcessingBehavior,
    pub actions: Vec<RuleAction>,
    pub conditions: Vec<RuleCondition>,
}

impl Rule {
    /// Check the rule before anything is sent to the service.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.name.is_empty() {
            return Err(DomainError::InvalidConfig("rule name must not be empty".into()));
        }
        if self.actions.is_empty() {
            return Err(DomainError::InvalidConfig(format!(
                "rule '{}' must declare at least one action",
                self.name
            )));
        }

        for action in &self.actions {
            if let RuleAction::RouteConfigurationOverride(rco) = action {
                rco.validate()?;
            }
        }
        Ok(())
    }
}
