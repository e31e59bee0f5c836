use std::path::{Path, PathBuf};

use frontdoor_domain::{
    CacheBehavior, ConditionKind, DomainError, ForwardingProtocol, FrontdoorOriginGroupId,
    FrontdoorProfileId, FrontdoorRuleSetId, MatchProcessingBehavior, QueryStringCachingBehavior,
    RedirectProtocol, RedirectType, RouteConfigurationOverride, Rule, RuleAction, RuleCondition,
    Secret, SecretParameters, Transform, UrlRedirect,
};
use tracing::debug;

use crate::error::ConfigError;
use crate::raw::{
    RawCondition, RawResource, RawRouteConfigurationOverride, RawRule, RawSecret, RawUrlRedirect,
};

/// A validated resource declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceConfig {
    Rule(Rule),
    Secret(Secret),
}

impl ResourceConfig {
    pub fn name(&self) -> &str {
        match self {
            ResourceConfig::Rule(r) => &r.name,
            ResourceConfig::Secret(s) => &s.name,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ResourceConfig::Rule(_) => "rule",
            ResourceConfig::Secret(_) => "secret",
        }
    }

    /// The ARM id the resource will be created under.
    pub fn resource_id(&self) -> String {
        match self {
            ResourceConfig::Rule(r) => r.rule_set_id.rule(&r.name).to_string(),
            ResourceConfig::Secret(s) => s.profile_id.secret(&s.name).to_string(),
        }
    }
}

/// Walk `dir` recursively and load every `*.yml` / `*.yaml` resource file,
/// sorted by path.
pub fn load_resources(dir: &Path) -> Result<Vec<ResourceConfig>, ConfigError> {
    let mut files = Vec::new();
    collect_files(dir, &mut files)?;
    files.sort();

    let mut resources = Vec::with_capacity(files.len());
    for file in files {
        resources.push(load_resource_file(&file)?);
    }
    Ok(resources)
}

fn collect_files(dir: &Path, out: &mut Vec<PathBuf>) -> Result<(), ConfigError> {
    let entries = std::fs::read_dir(dir).map_err(|e| ConfigError::Io {
        path: dir.display().to_string(),
        source: e,
    })?;

    for entry in entries {
        let entry = entry.map_err(|e| ConfigError::Io {
            path: dir.display().to_string(),
            source: e,
        })?;
        let path = entry.path();
        if path.is_dir() {
            collect_files(&path, out)?;
        } else if matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("yml") | Some("yaml")
        ) {
            out.push(path);
        }
    }
    Ok(())
}

/// Load and validate a single resource file.
pub fn load_resource_file(path: &Path) -> Result<ResourceConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    debug!("Loading resource from {}", path.display());
    parse_resource(&content, &path.display().to_string())
}

/// Parse, convert and validate a resource document. `origin` names the
/// document in error messages.
pub fn parse_resource(content: &str, origin: &str) -> Result<ResourceConfig, ConfigError> {
    let raw: RawResource = serde_yaml::from_str(content).map_err(|e| ConfigError::YamlParse {
        path: origin.to_string(),
        source: e,
    })?;

    let resource = match raw {
        RawResource::Rule(r) => ResourceConfig::Rule(convert_rule(r, origin)?),
        RawResource::Secret(s) => ResourceConfig::Secret(convert_secret(s, origin)?),
    };

    let validated = match &resource {
        ResourceConfig::Rule(r) => r.validate(),
        ResourceConfig::Secret(s) => s.validate(),
    };
    validated.map_err(|source| ConfigError::Validation {
        path: origin.to_string(),
        source,
    })?;

    Ok(resource)
}

fn convert_rule(raw: RawRule, path: &str) -> Result<Rule, ConfigError> {
    let rule_set_id =
        FrontdoorRuleSetId::parse(&raw.cdn_frontdoor_rule_set_id).map_err(|e| domain(e, path))?;
    let match_processing_behavior = match raw.match_processing_behavior.as_deref() {
        Some(s) => parse_enum(s, "match_processing_behavior", MatchProcessingBehavior::parse, path)?,
        None => MatchProcessingBehavior::default(),
    };

    let mut actions = Vec::new();
    if let Some(rco) = raw.actions.route_configuration_override_action {
        actions.push(convert_route_override(rco, path)?);
    }
    if let Some(redirect) = raw.actions.url_redirect_action {
        actions.push(convert_url_redirect(redirect, path)?);
    }

    let c = raw.conditions;
    let mut conditions = Vec::new();
    let blocks = [
        (c.host_name_condition, "host_name_condition"),
        (c.is_device_condition, "is_device_condition"),
        (c.post_args_condition, "post_args_condition"),
        (c.request_method_condition, "request_method_condition"),
        (c.url_filename_condition, "url_filename_condition"),
    ];
    for (block, name) in blocks {
        if let Some(block) = block {
            conditions.push(convert_condition(block, name, path)?);
        }
    }

    Ok(Rule {
        name: raw.name,
        rule_set_id,
        order: raw.order,
        match_processing_behavior,
        actions,
        conditions,
    })
}

fn convert_route_override(
    raw: RawRouteConfigurationOverride,
    path: &str,
) -> Result<RuleAction, ConfigError> {
    let origin_group_id = raw
        .cdn_frontdoor_origin_group_id
        .as_deref()
        .map(FrontdoorOriginGroupId::parse)
        .transpose()
        .map_err(|e| domain(e, path))?;

    Ok(RuleAction::RouteConfigurationOverride(RouteConfigurationOverride {
        origin_group_id,
        forwarding_protocol: parse_enum(
            &raw.forwarding_protocol,
            "forwarding_protocol",
            ForwardingProtocol::parse,
            path,
        )?,
        query_string_caching_behavior: parse_enum(
            &raw.query_string_caching_behavior,
            "query_string_caching_behavior",
            QueryStringCachingBehavior::parse,
            path,
        )?,
        query_string_parameters: raw.query_string_parameters,
        compression_enabled: raw.compression_enabled,
        cache_behavior: parse_enum(&raw.cache_behavior, "cache_behavior", CacheBehavior::parse, path)?,
        cache_duration: raw.cache_duration,
    }))
}

fn convert_url_redirect(raw: RawUrlRedirect, path: &str) -> Result<RuleAction, ConfigError> {
    Ok(RuleAction::UrlRedirect(UrlRedirect {
        redirect_type: parse_enum(&raw.redirect_type, "redirect_type", RedirectType::parse, path)?,
        redirect_protocol: parse_enum(
            &raw.redirect_protocol,
            "redirect_protocol",
            RedirectProtocol::parse,
            path,
        )?,
        destination_path: raw.destination_path,
        destination_hostname: raw.destination_hostname,
        query_string: raw.query_string,
        destination_fragment: raw.destination_fragment,
    }))
}

fn convert_condition(raw: RawCondition, block: &str, path: &str) -> Result<RuleCondition, ConfigError> {
    let kind = match block {
        "host_name_condition" => ConditionKind::HostName,
        "is_device_condition" => ConditionKind::IsDevice,
        "request_method_condition" => ConditionKind::RequestMethod,
        "url_filename_condition" => ConditionKind::UrlFilename,
        "post_args_condition" => ConditionKind::PostArgs {
            post_args_name: raw.post_args_name.clone().ok_or_else(|| ConfigError::Conversion {
                path: path.to_string(),
                message: "post_args_condition requires post_args_name".into(),
            })?,
        },
        other => {
            return Err(ConfigError::Conversion {
                path: path.to_string(),
                message: format!("unknown condition block '{}'", other),
            })
        }
    };
    if raw.post_args_name.is_some() && !matches!(kind, ConditionKind::PostArgs { .. }) {
        return Err(ConfigError::Conversion {
            path: path.to_string(),
            message: format!("post_args_name is not valid on {}", block),
        });
    }

    let transforms = raw
        .transforms
        .iter()
        .map(|t| parse_enum(t, "transforms", Transform::parse, path))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(RuleCondition {
        kind,
        operator: raw.operator,
        negate_condition: raw.negate_condition,
        match_values: raw.match_values,
        transforms,
    })
}

fn convert_secret(raw: RawSecret, path: &str) -> Result<Secret, ConfigError> {
    let profile_id =
        FrontdoorProfileId::parse(&raw.cdn_frontdoor_profile_id).map_err(|e| domain(e, path))?;
    let parameters = raw
        .parameters
        .and_then(|p| p.customer_certificate)
        .map(|c| SecretParameters::CustomerCertificate {
            key_vault_certificate_id: c.key_vault_certificate_id,
            use_latest_version: c.use_latest_version,
            subject_alternative_names: c.subject_alternative_names,
        });

    Ok(Secret { name: raw.name, profile_id, parameters })
}

fn parse_enum<T>(
    s: &str,
    field: &str,
    parse: fn(&str) -> Option<T>,
    path: &str,
) -> Result<T, ConfigError> {
    parse(s).ok_or_else(|| ConfigError::Conversion {
        path: path.to_string(),
        message: format!("unknown {} '{}'", field, s),
    })
}

fn domain(e: DomainError, path: &str) -> ConfigError {
    ConfigError::Conversion {
        path: path.to_string(),
        message: e.to_string(),
    }
}
