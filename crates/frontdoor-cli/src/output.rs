use frontdoor_config::ResourceConfig;
use serde_json::{json, Value};

/// One line per resource, in load order.
pub fn render_resources(resources: &[ResourceConfig]) -> String {
    if resources.is_empty() {
        return "No resources.\n".to_string();
    }
    let mut out = String::new();
    for res in resources {
        out.push_str(&format!("ok {} {}\n", res.kind(), res.resource_id()));
    }
    out
}

pub fn resources_json(resources: &[ResourceConfig]) -> Value {
    let items: Vec<Value> = resources
        .iter()
        .map(|res| match res {
            ResourceConfig::Rule(r) => json!({
                "kind": "rule",
                "id": res.resource_id(),
                "order": r.order,
                "actions": r.actions.len(),
                "conditions": r.conditions.len(),
            }),
            ResourceConfig::Secret(s) => json!({
                "kind": "secret",
                "id": res.resource_id(),
                "parameters": s.parameters.as_ref().map(|p| p.type_name()),
            }),
        })
        .collect();
    json!({ "valid": true, "resources": items })
}

pub fn applied_line(res: &ResourceConfig) -> String {
    format!("+ {} {}", res.kind(), res.resource_id())
}

#[cfg(test)]
mod tests {
    use super::*;
    use frontdoor_domain::{FrontdoorProfileId, Secret};

    fn secret() -> ResourceConfig {
        ResourceConfig::Secret(Secret {
            name: "s1".into(),
            profile_id: FrontdoorProfileId::new("sub", "rg", "p"),
            parameters: None,
        })
    }

    #[test]
    fn empty_list() {
        assert_eq!(render_resources(&[]), "No resources.\n");
    }

    #[test]
    fn text_line_has_id() {
        assert_eq!(
            render_resources(&[secret()]),
            "ok secret /subscriptions/sub/resourceGroups/rg/providers/Microsoft.Cdn/profiles/p/secrets/s1\n"
        );
    }

    #[test]
    fn json_lists_resources() {
        let v = resources_json(&[secret()]);
        assert_eq!(v["resources"][0]["kind"], "secret");
        assert!(v["resources"][0]["parameters"].is_null());
    }
}
