use std::sync::Arc;

use async_trait::async_trait;
use frontdoor_domain::{
    CacheBehavior, ConditionKind, ForwardingProtocol, FrontdoorOriginGroupId, FrontdoorRuleId,
    MatchProcessingBehavior, QueryStringCachingBehavior, RedirectProtocol, RedirectType,
    RouteConfigurationOverride, Rule, RuleAction, RuleCondition, Transform, UrlRedirect,
};
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::arm::ArmClient;
use crate::driver::ResourceLifecycle;
use crate::error::DriverError;

/// Front Door rules backed by Azure Resource Manager.
pub struct FrontdoorRulesClient {
    arm: Arc<ArmClient>,
}

impl FrontdoorRulesClient {
    pub fn new(arm: Arc<ArmClient>) -> Self {
        Self { arm }
    }

    async fn put(&self, id: &FrontdoorRuleId, rule: &Rule) -> Result<Rule, DriverError> {
        rule.validate()?;
        let resource_id = id.to_string();
        let body = rule_to_arm(rule);
        let resp = self.arm.put_and_wait(&resource_id, &body).await?;
        rule_from_arm(id, &resp)
    }
}

#[async_trait]
impl ResourceLifecycle for FrontdoorRulesClient {
    type Id = FrontdoorRuleId;
    type Model = Rule;

    fn name(&self) -> &'static str {
        "cdn_frontdoor_rule"
    }

    fn validate(&self, rule: &Rule) -> Result<(), DriverError> {
        Ok(rule.validate()?)
    }

    async fn create(&self, id: &FrontdoorRuleId, rule: &Rule) -> Result<Rule, DriverError> {
        self.validate(rule)?;
        if self.exists(id).await? {
            return Err(DriverError::AlreadyExists { id: id.to_string() });
        }
        info!(rule = %id, "creating Front Door rule");
        self.put(id, rule).await
    }

    async fn update(&self, id: &FrontdoorRuleId, rule: &Rule) -> Result<Rule, DriverError> {
        info!(rule = %id, "updating Front Door rule");
        self.put(id, rule).await
    }

    async fn delete(&self, id: &FrontdoorRuleId) -> Result<(), DriverError> {
        info!(rule = %id, "deleting Front Door rule");
        self.arm.delete(&id.to_string()).await
    }

    async fn read(&self, id: &FrontdoorRuleId) -> Result<Option<Rule>, DriverError> {
        match self.arm.get(&id.to_string()).await? {
            Some(body) => rule_from_arm(id, &body).map(Some),
            None => {
                debug!(rule = %id, "Front Door rule not found");
                Ok(None)
            }
        }
    }

    async fn exists(&self, id: &FrontdoorRuleId) -> Result<bool, DriverError> {
        Ok(self.arm.get(&id.to_string()).await?.is_some())
    }
}

// ── Domain → ARM ──────────────────────────────────────────────────────────────

pub(crate) fn rule_to_arm(rule: &Rule) -> Value {
    let actions: Vec<Value> = rule.actions.iter().map(action_to_arm).collect();
    let conditions: Vec<Value> = rule.conditions.iter().map(condition_to_arm).collect();
    json!({
        "properties": {
            "order": rule.order,
            "matchProcessingBehavior": rule.match_processing_behavior.as_str(),
            "actions": actions,
            "conditions": conditions,
        }
    })
}

fn action_to_arm(action: &RuleAction) -> Value {
    match action {
        RuleAction::RouteConfigurationOverride(rco) => {
            let origin_group_override = rco.origin_group_id.as_ref().map(|og| {
                json!({
                    "originGroup": { "id": og.to_string() },
                    "forwardingProtocol": rco.forwarding_protocol.as_str(),
                })
            });
            let mut cache = json!({
                "queryStringCachingBehavior": rco.query_string_caching_behavior.as_str(),
                "isCompressionEnabled": if rco.compression_enabled { "Enabled" } else { "Disabled" },
                "cacheBehavior": rco.cache_behavior.as_str(),
            });
            if rco.query_string_caching_behavior.uses_parameters() {
                cache["queryParameters"] = json!(rco.query_string_parameters.join(","));
            }
            if let Some(d) = &rco.cache_duration {
                cache["cacheDuration"] = json!(d);
            }
            let mut parameters = json!({
                "typeName": "DeliveryRuleRouteConfigurationOverrideActionParameters",
                "cacheConfiguration": cache,
            });
            if let Some(og) = origin_group_override {
                parameters["originGroupOverride"] = og;
            }
            json!({ "name": "RouteConfigurationOverride", "parameters": parameters })
        }
        RuleAction::UrlRedirect(r) => json!({
            "name": "UrlRedirect",
            "parameters": {
                "typeName": "DeliveryRuleUrlRedirectActionParameters",
                "redirectType": r.redirect_type.as_str(),
                "destinationProtocol": r.redirect_protocol.as_str(),
                "customPath": r.destination_path,
                "customHostname": r.destination_hostname,
                "customQueryString": r.query_string,
                "customFragment": r.destination_fragment,
            }
        }),
    }
}

fn condition_wire_name(kind: &ConditionKind) -> &'static str {
    match kind {
        ConditionKind::HostName => "HostName",
        ConditionKind::IsDevice => "IsDevice",
        ConditionKind::PostArgs { .. } => "PostArgs",
        ConditionKind::RequestMethod => "RequestMethod",
        ConditionKind::UrlFilename => "UrlFileName",
    }
}

fn condition_to_arm(cond: &RuleCondition) -> Value {
    let name = condition_wire_name(&cond.kind);
    let transforms: Vec<&str> = cond.transforms.iter().map(Transform::as_str).collect();
    let mut parameters = json!({
        "typeName": format!("DeliveryRule{}ConditionParameters", name),
        "operator": cond.operator,
        "negateCondition": cond.negate_condition,
        "matchValues": cond.match_values,
        "transforms": transforms,
    });
    if let ConditionKind::PostArgs { post_args_name } = &cond.kind {
        parameters["selector"] = json!(post_args_name);
    }
    json!({ "name": name, "parameters": parameters })
}

// ── ARM → Domain ──────────────────────────────────────────────────────────────

pub(crate) fn rule_from_arm(id: &FrontdoorRuleId, body: &Value) -> Result<Rule, DriverError> {
    let decode = |message: String| DriverError::Decode { id: id.to_string(), message };
    let props = &body["properties"];

    let match_processing_behavior = match props["matchProcessingBehavior"].as_str() {
        Some(s) => MatchProcessingBehavior::parse(s)
            .ok_or_else(|| decode(format!("unknown matchProcessingBehavior '{}'", s)))?,
        None => MatchProcessingBehavior::default(),
    };

    let order = match props["order"].as_u64() {
        Some(n) => u32::try_from(n).map_err(|_| decode(format!("order {} out of range", n)))?,
        None => 0,
    };

    let actions = props["actions"]
        .as_array()
        .map(Vec::as_slice)
        .unwrap_or_default()
        .iter()
        .map(|a| action_from_arm(a).map_err(decode))
        .collect::<Result<Vec<_>, _>>()?;

    let conditions = props["conditions"]
        .as_array()
        .map(Vec::as_slice)
        .unwrap_or_default()
        .iter()
        .map(|c| condition_from_arm(c).map_err(decode))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Rule {
        name: id.rule_name.clone(),
        rule_set_id: id.rule_set.clone(),
        order,
        match_processing_behavior,
        actions,
        conditions,
    })
}

fn wire<T>(value: &Value, field: &str, parse: fn(&str) -> Option<T>) -> Result<T, String> {
    let s = value[field]
        .as_str()
        .ok_or_else(|| format!("missing '{}'", field))?;
    parse(s).ok_or_else(|| format!("unknown {} '{}'", field, s))
}

fn string_field(value: &Value, field: &str) -> String {
    value[field].as_str().unwrap_or_default().to_string()
}

fn action_from_arm(action: &Value) -> Result<RuleAction, String> {
    let p = &action["parameters"];
    match action["name"].as_str() {
        Some("RouteConfigurationOverride") => {
            let cache = &p["cacheConfiguration"];
            let og = &p["originGroupOverride"];
            let origin_group_id = og["originGroup"]["id"]
                .as_str()
                .map(FrontdoorOriginGroupId::parse)
                .transpose()
                .map_err(|e| e.to_string())?;
            let forwarding_protocol = if og.is_null() {
                ForwardingProtocol::MatchRequest
            } else {
                wire(og, "forwardingProtocol", ForwardingProtocol::parse)?
            };
            let query_string_parameters = cache["queryParameters"]
                .as_str()
                .filter(|s| !s.is_empty())
                .map(|s| s.split(',').map(str::to_string).collect())
                .unwrap_or_default();

            Ok(RuleAction::RouteConfigurationOverride(RouteConfigurationOverride {
                origin_group_id,
                forwarding_protocol,
                query_string_caching_behavior: wire(
                    cache,
                    "queryStringCachingBehavior",
                    QueryStringCachingBehavior::parse,
                )?,
                query_string_parameters,
                compression_enabled: cache["isCompressionEnabled"].as_str() == Some("Enabled"),
                cache_behavior: wire(cache, "cacheBehavior", CacheBehavior::parse)?,
                cache_duration: cache["cacheDuration"].as_str().map(str::to_string),
            }))
        }
        Some("UrlRedirect") => Ok(RuleAction::UrlRedirect(UrlRedirect {
            redirect_type: wire(p, "redirectType", RedirectType::parse)?,
            redirect_protocol: wire(p, "destinationProtocol", RedirectProtocol::parse)?,
            destination_path: string_field(p, "customPath"),
            destination_hostname: string_field(p, "customHostname"),
            query_string: string_field(p, "customQueryString"),
            destination_fragment: string_field(p, "customFragment"),
        })),
        other => Err(format!("unsupported action {:?}", other)),
    }
}

fn condition_from_arm(cond: &Value) -> Result<RuleCondition, String> {
    let p = &cond["parameters"];
    let kind = match cond["name"].as_str() {
        Some("HostName") => ConditionKind::HostName,
        Some("IsDevice") => ConditionKind::IsDevice,
        Some("PostArgs") => ConditionKind::PostArgs { post_args_name: string_field(p, "selector") },
        Some("RequestMethod") => ConditionKind::RequestMethod,
        Some("UrlFileName") => ConditionKind::UrlFilename,
        other => return Err(format!("unsupported condition {:?}", other)),
    };

    let strings = |field: &str| -> Vec<String> {
        p[field]
            .as_array()
            .map(|a| a.iter().filter_map(|v| v.as_str().map(str::to_string)).collect())
            .unwrap_or_default()
    };
    let transforms = strings("transforms")
        .iter()
        .map(|t| Transform::parse(t).ok_or_else(|| format!("unknown transform '{}'", t)))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(RuleCondition {
        kind,
        operator: string_field(p, "operator"),
        negate_condition: p["negateCondition"].as_bool().unwrap_or(false),
        match_values: strings("matchValues"),
        transforms,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arm::tests::client;
    use frontdoor_domain::FrontdoorRuleSetId;
    use wiremock::{
        matchers::{body_partial_json, method, path},
        Mock, MockServer, ResponseTemplate,
    };

    const RULE_SET: &str = "/subscriptions/sub/resourceGroups/rg/providers/Microsoft.Cdn/profiles/prof/ruleSets/rs";

    fn rule_id() -> FrontdoorRuleId {
        FrontdoorRuleSetId::parse(RULE_SET).unwrap().rule("rule1")
    }

    fn rule(cache_duration: &str) -> Rule {
        let rule_set_id = FrontdoorRuleSetId::parse(RULE_SET).unwrap();
        Rule {
            name: "rule1".into(),
            order: 1,
            match_processing_behavior: MatchProcessingBehavior::Stop,
            actions: vec![
                RuleAction::RouteConfigurationOverride(RouteConfigurationOverride {
                    origin_group_id: Some(rule_set_id.profile.origin_group("og")),
                    forwarding_protocol: ForwardingProtocol::HttpsOnly,
                    query_string_caching_behavior:
                        QueryStringCachingBehavior::IncludeSpecifiedQueryStrings,
                    query_string_parameters: vec!["foo".into(), "clientIp={client_ip}".into()],
                    compression_enabled: true,
                    cache_behavior: CacheBehavior::OverrideIfOriginMissing,
                    cache_duration: Some(cache_duration.into()),
                }),
                RuleAction::UrlRedirect(UrlRedirect {
                    redirect_type: RedirectType::PermanentRedirect,
                    redirect_protocol: RedirectProtocol::MatchRequest,
                    destination_path: "/exampleredirection".into(),
                    destination_hostname: "contoso.com".into(),
                    query_string: "clientIp={client_ip}".into(),
                    destination_fragment: "UrlRedirect".into(),
                }),
            ],
            conditions: vec![RuleCondition {
                kind: ConditionKind::PostArgs { post_args_name: "customerName".into() },
                operator: "BeginsWith".into(),
                negate_condition: false,
                match_values: vec!["J".into(), "K".into()],
                transforms: vec![Transform::Uppercase],
            }],
            rule_set_id,
        }
    }

    fn rule_path() -> String {
        format!("{}/rules/rule1", RULE_SET)
    }

    #[test]
    fn arm_body_uses_wire_names() {
        let body = rule_to_arm(&rule("365.23:59:59"));
        let props = &body["properties"];
        assert_eq!(props["matchProcessingBehavior"], "Stop");
        let cache = &props["actions"][0]["parameters"]["cacheConfiguration"];
        assert_eq!(cache["cacheDuration"], "365.23:59:59");
        assert_eq!(cache["queryParameters"], "foo,clientIp={client_ip}");
        assert_eq!(cache["isCompressionEnabled"], "Enabled");
        assert_eq!(props["conditions"][0]["parameters"]["selector"], "customerName");
        assert_eq!(
            props["conditions"][0]["parameters"]["typeName"],
            "DeliveryRulePostArgsConditionParameters"
        );
    }

    #[test]
    fn arm_body_reads_back_to_same_rule() {
        let original = rule("23:59:59");
        let decoded = rule_from_arm(&rule_id(), &rule_to_arm(&original)).unwrap();
        assert_eq!(decoded, original);
    }

    #[test]
    fn accepted_rule_without_origin_group_reads_back_unchanged() {
        let mut r = rule("23:59:59");
        let RuleAction::RouteConfigurationOverride(rco) = &mut r.actions[0] else {
            unreachable!()
        };
        rco.origin_group_id = None;
        rco.forwarding_protocol = ForwardingProtocol::HttpsOnly;
        rco.query_string_caching_behavior = QueryStringCachingBehavior::UseQueryString;
        // Neither field survives the ARM body, so validation must refuse them.
        assert!(r.validate().is_err());

        let RuleAction::RouteConfigurationOverride(rco) = &mut r.actions[0] else {
            unreachable!()
        };
        rco.forwarding_protocol = ForwardingProtocol::MatchRequest;
        rco.query_string_parameters.clear();
        r.validate().unwrap();
        assert_eq!(rule_from_arm(&rule_id(), &rule_to_arm(&r)).unwrap(), r);
    }

    #[test]
    fn out_of_range_order_is_decode_error() {
        let body = json!({ "properties": { "order": u64::from(u32::MAX) + 1, "actions": [] } });
        let err = rule_from_arm(&rule_id(), &body).unwrap_err();
        assert!(matches!(err, DriverError::Decode { .. }), "got: {}", err);
        assert!(err.to_string().contains("out of range"), "got: {}", err);
    }

    #[test]
    fn unknown_action_is_decode_error() {
        let body = json!({ "properties": { "actions": [{ "name": "Teleport", "parameters": {} }] } });
        let err = rule_from_arm(&rule_id(), &body).unwrap_err();
        assert!(matches!(err, DriverError::Decode { .. }));
    }

    #[tokio::test]
    async fn exists_true_on_200() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(rule_path()))
            .respond_with(ResponseTemplate::new(200).set_body_json(rule_to_arm(&rule("23:59:59"))))
            .mount(&server)
            .await;

        let rules = FrontdoorRulesClient::new(Arc::new(client(&server)));
        assert!(rules.exists(&rule_id()).await.unwrap());
    }

    #[tokio::test]
    async fn exists_false_on_404() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(rule_path()))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let rules = FrontdoorRulesClient::new(Arc::new(client(&server)));
        assert!(!rules.exists(&rule_id()).await.unwrap());
        assert!(rules.read(&rule_id()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn create_rejects_zero_days_without_any_request() {
        let server = MockServer::start().await;
        let rules = FrontdoorRulesClient::new(Arc::new(client(&server)));

        let err = rules.create(&rule_id(), &rule("0.23:59:59")).await.unwrap_err();
        assert!(err.is_validation(), "got: {}", err);
        assert!(err.to_string().contains("got \"0.23:59:59\""), "got: {}", err);

        let received = server.received_requests().await.unwrap_or_default();
        assert!(received.is_empty(), "expected no API calls for an invalid rule");
    }

    #[tokio::test]
    async fn create_existing_requires_import() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(rule_path()))
            .respond_with(ResponseTemplate::new(200).set_body_json(rule_to_arm(&rule("23:59:59"))))
            .mount(&server)
            .await;

        let rules = FrontdoorRulesClient::new(Arc::new(client(&server)));
        let err = rules.create(&rule_id(), &rule("23:59:59")).await.unwrap_err();
        assert!(matches!(err, DriverError::AlreadyExists { .. }), "got: {}", err);
    }

    #[tokio::test]
    async fn create_puts_rule_body() {
        let server = MockServer::start().await;
        let wanted = rule("365.23:59:59");
        Mock::given(method("GET"))
            .and(path(rule_path()))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path(rule_path()))
            .and(body_partial_json(json!({ "properties": { "order": 1 } })))
            .respond_with(ResponseTemplate::new(200).set_body_json(rule_to_arm(&wanted)))
            .expect(1)
            .mount(&server)
            .await;

        let rules = FrontdoorRulesClient::new(Arc::new(client(&server)));
        let created = rules.create(&rule_id(), &wanted).await.unwrap();
        assert_eq!(created, wanted);
    }
}
