//! `azurerm_cdn_frontdoor_rule` configurations.

use frontdoor_domain::{
    CacheBehavior, ConditionKind, ForwardingProtocol, FrontdoorProfileId, FrontdoorRuleId,
    FrontdoorRuleSetId, MatchProcessingBehavior, QueryStringCachingBehavior, RedirectProtocol,
    RedirectType, RouteConfigurationOverride, Rule, RuleAction, RuleCondition, Transform,
    UrlRedirect,
};

use crate::data::TestData;
use crate::fixtures::Fixture;
use crate::hcl::{rule_block, Block, References};

pub const RESOURCE_TYPE: &str = "azurerm_cdn_frontdoor_rule";

pub type RuleFixture = Fixture<FrontdoorRuleId, Rule>;

fn profile(data: &TestData) -> FrontdoorProfileId {
    FrontdoorProfileId::new(
        &data.subscription_id,
        format!("acctestRG-cdn-afdx-{}", data.random_integer),
        format!("accTestProfile-{}", data.random_integer),
    )
}

fn rule_set(data: &TestData) -> FrontdoorRuleSetId {
    profile(data).rule_set(format!("accTestRuleSet{}", data.random_integer))
}

fn refs() -> References {
    References {
        name: None,
        parent_id: "azurerm_cdn_frontdoor_rule_set.test.id".into(),
        origin_group_id: Some("azurerm_cdn_frontdoor_origin_group.test.id".into()),
        depends_on: vec![
            "azurerm_cdn_frontdoor_origin_group.test".into(),
            "azurerm_cdn_frontdoor_origin.test".into(),
        ],
    }
}

/// Resource group, profile, origin group, origin and rule set shared by every
/// rule configuration.
pub fn template(data: &TestData) -> String {
    let n = data.random_integer;
    let blocks = [
        Block::new("provider \"azurerm\"").block(Block::new("features")),
        Block::resource("azurerm_resource_group", "test")
            .string("name", &format!("acctestRG-cdn-afdx-{}", n))
            .string("location", &data.location),
        Block::resource("azurerm_cdn_frontdoor_profile", "test")
            .string("name", &format!("accTestProfile-{}", n))
            .expr("resource_group_name", "azurerm_resource_group.test.name"),
        Block::resource("azurerm_cdn_frontdoor_origin_group", "test")
            .string("name", &format!("accTestOriginGroup-{}", n))
            .expr("cdn_frontdoor_profile_id", "azurerm_cdn_frontdoor_profile.test.id")
            .blank()
            .block(
                Block::new("load_balancing")
                    .expr("additional_latency_in_milliseconds", "0")
                    .expr("sample_size", "16")
                    .expr("successful_samples_required", "3"),
            ),
        Block::resource("azurerm_cdn_frontdoor_origin", "test")
            .string("name", &format!("accTestOrigin-{}", n))
            .expr("cdn_frontdoor_origin_group_id", "azurerm_cdn_frontdoor_origin_group.test.id")
            .blank()
            .expr("health_probes_enabled", "true")
            .expr("enforce_certificate_name_check", "false")
            .string("host_name", "contoso.com")
            .expr("http_port", "80")
            .expr("https_port", "443")
            .string("origin_host_header", "www.contoso.com")
            .expr("priority", "1")
            .expr("weight", "1"),
        Block::resource("azurerm_cdn_frontdoor_rule_set", "test")
            .string("name", &format!("accTestRuleSet{}", n))
            .expr("cdn_frontdoor_profile_id", "azurerm_cdn_frontdoor_profile.test.id"),
    ];
    blocks.iter().map(Block::render).collect::<Vec<_>>().join("\n")
}

fn route_override(
    data: &TestData,
    caching: QueryStringCachingBehavior,
    parameters: &[&str],
    compression_enabled: bool,
    cache_duration: &str,
) -> RuleAction {
    RuleAction::RouteConfigurationOverride(RouteConfigurationOverride {
        origin_group_id: Some(profile(data).origin_group(format!("accTestOriginGroup-{}", data.random_integer))),
        forwarding_protocol: ForwardingProtocol::HttpsOnly,
        query_string_caching_behavior: caching,
        query_string_parameters: parameters.iter().map(|p| p.to_string()).collect(),
        compression_enabled,
        cache_behavior: CacheBehavior::OverrideIfOriginMissing,
        cache_duration: Some(cache_duration.to_string()),
    })
}

fn redirect() -> RuleAction {
    RuleAction::UrlRedirect(UrlRedirect {
        redirect_type: RedirectType::PermanentRedirect,
        redirect_protocol: RedirectProtocol::MatchRequest,
        destination_path: "/exampleredirection".into(),
        destination_hostname: "contoso.com".into(),
        query_string: "clientIp={client_ip}".into(),
        destination_fragment: "UrlRedirect".into(),
    })
}

fn condition(kind: ConditionKind, operator: &str, negate: bool, values: &[&str], transforms: &[Transform]) -> RuleCondition {
    RuleCondition {
        kind,
        operator: operator.into(),
        negate_condition: negate,
        match_values: values.iter().map(|v| v.to_string()).collect(),
        transforms: transforms.to_vec(),
    }
}

fn conditions(negate_host: bool, negate_device: bool, filename_transforms: &[Transform]) -> Vec<RuleCondition> {
    vec![
        condition(
            ConditionKind::HostName,
            "Equal",
            negate_host,
            &["www.contoso.com", "images.contoso.com", "video.contoso.com"],
            &[Transform::Lowercase, Transform::Trim],
        ),
        condition(ConditionKind::IsDevice, "Equal", negate_device, &["Mobile"], &[]),
        condition(
            ConditionKind::PostArgs { post_args_name: "customerName".into() },
            "BeginsWith",
            false,
            &["J", "K"],
            &[Transform::Uppercase],
        ),
        condition(ConditionKind::RequestMethod, "Equal", false, &["DELETE"], &[]),
        condition(ConditionKind::UrlFilename, "Equal", false, &["media.mp4"], filename_transforms),
    ]
}

fn build(data: &TestData, label: &str, rule: Rule, refs: References) -> RuleFixture {
    let config = format!("{}\n{}", template(data), rule_block(label, &rule, &refs).render());
    Fixture { config, id: rule.rule_set_id.rule(&rule.name), model: rule }
}

fn rule(data: &TestData, order: u32, mpb: MatchProcessingBehavior, actions: Vec<RuleAction>, conditions: Vec<RuleCondition>) -> Rule {
    Rule {
        name: format!("accTestRule{}", data.random_integer),
        rule_set_id: rule_set(data),
        order,
        match_processing_behavior: mpb,
        actions,
        conditions,
    }
}

pub fn basic(data: &TestData) -> RuleFixture {
    let action = route_override(
        data,
        QueryStringCachingBehavior::IncludeSpecifiedQueryStrings,
        &["foo", "clientIp={client_ip}"],
        true,
        "365.23:59:59",
    );
    build(data, "test", rule(data, 0, MatchProcessingBehavior::Continue, vec![action], vec![]), refs())
}

/// Same resource as [`basic`], declared a second time under another label.
pub fn requires_import(data: &TestData) -> RuleFixture {
    let first = basic(data);
    let refs = References { name: Some(format!("{}.test.name", RESOURCE_TYPE)), ..refs() };
    let block = rule_block("import", &first.model, &refs).render();
    Fixture { config: format!("{}\n{}", first.config, block), ..first }
}

pub fn complete(data: &TestData) -> RuleFixture {
    let actions = vec![
        route_override(
            data,
            QueryStringCachingBehavior::IncludeSpecifiedQueryStrings,
            &["foo", "clientIp={client_ip}"],
            true,
            "365.23:59:59",
        ),
        redirect(),
    ];
    let conditions = conditions(
        false,
        false,
        &[Transform::Lowercase, Transform::RemoveNulls, Transform::Trim],
    );
    build(data, "test", rule(data, 1, MatchProcessingBehavior::Continue, actions, conditions), refs())
}

pub fn update(data: &TestData) -> RuleFixture {
    let action = route_override(
        data,
        QueryStringCachingBehavior::IgnoreSpecifiedQueryStrings,
        &["clientIp={client_ip}"],
        false,
        "23:59:59",
    );
    let conditions = conditions(true, true, &[Transform::Lowercase]);
    build(data, "test", rule(data, 2, MatchProcessingBehavior::Stop, vec![action], conditions), refs())
}

pub fn action_only(data: &TestData) -> RuleFixture {
    let action = route_override(
        data,
        QueryStringCachingBehavior::IgnoreSpecifiedQueryStrings,
        &["clientIp={client_ip}"],
        false,
        "23:59:59",
    );
    build(data, "test", rule(data, 1, MatchProcessingBehavior::Continue, vec![action], vec![]), refs())
}

/// A sub-day cache duration written with a `0.` days component.
pub fn invalid_cache_duration(data: &TestData) -> RuleFixture {
    let action = route_override(
        data,
        QueryStringCachingBehavior::IgnoreSpecifiedQueryStrings,
        &["clientIp={client_ip}"],
        false,
        "0.23:59:59",
    );
    build(data, "test", rule(data, 1, MatchProcessingBehavior::Continue, vec![action], vec![]), refs())
}

/// Fixture by name, as used by the `render` command.
pub fn by_name(name: &str, data: &TestData) -> Option<RuleFixture> {
    let f: fn(&TestData) -> RuleFixture = match name {
        "basic" => basic,
        "requires_import" => requires_import,
        "complete" => complete,
        "update" => update,
        "action_only" => action_only,
        "invalid_cache_duration" => invalid_cache_duration,
        _ => return None,
    };
    Some(f(data))
}

pub const NAMES: &[&str] = &[
    "basic",
    "requires_import",
    "complete",
    "update",
    "action_only",
    "invalid_cache_duration",
];
