//! Minimal HCL writer for acceptance-test configurations.

use frontdoor_domain::{RuleAction, RuleCondition, Rule, Secret, SecretParameters};

#[derive(Debug, Clone)]
enum Item {
    Attr(String, String),
    Block(Block),
    Blank,
}

/// A `header { ... }` block. Consecutive attributes are aligned on `=`.
#[derive(Debug, Clone)]
pub struct Block {
    header: String,
    items:  Vec<Item>,
}

impl Block {
    pub fn new(header: impl Into<String>) -> Self {
        Self { header: header.into(), items: Vec::new() }
    }

    /// `resource "<type>" "<label>" { ... }`
    pub fn resource(resource_type: &str, label: &str) -> Self {
        Self::new(format!("resource {} {}", quote(resource_type), quote(label)))
    }

    /// Attribute whose value is a raw expression (reference, number, bool, list).
    pub fn expr(mut self, key: &str, expr: impl Into<String>) -> Self {
        self.items.push(Item::Attr(key.to_string(), expr.into()));
        self
    }

    pub fn string(self, key: &str, value: &str) -> Self {
        self.expr(key, quote(value))
    }

    pub fn strings(self, key: &str, values: &[String]) -> Self {
        self.expr(key, list(values))
    }

    pub fn block(mut self, block: Block) -> Self {
        self.items.push(Item::Block(block));
        self
    }

    pub fn blank(mut self) -> Self {
        self.items.push(Item::Blank);
        self
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        self.write(&mut out, 0);
        out
    }

    fn write(&self, out: &mut String, depth: usize) {
        let pad = "  ".repeat(depth);
        out.push_str(&format!("{}{} {{\n", pad, self.header));

        let mut i = 0;
        while i < self.items.len() {
            match &self.items[i] {
                Item::Attr(..) => {
                    let run_end = self.items[i..]
                        .iter()
                        .position(|it| !matches!(it, Item::Attr(..)))
                        .map_or(self.items.len(), |p| i + p);
                    let width = self.items[i..run_end]
                        .iter()
                        .filter_map(|it| match it {
                            Item::Attr(k, _) => Some(k.len()),
                            _ => None,
                        })
                        .max()
                        .unwrap_or(0);
                    for it in &self.items[i..run_end] {
                        if let Item::Attr(k, v) = it {
                            out.push_str(&format!("{}  {:<width$} = {}\n", pad, k, v, width = width));
                        }
                    }
                    i = run_end;
                    continue;
                }
                Item::Block(b) => b.write(out, depth + 1),
                Item::Blank => out.push('\n'),
            }
            i += 1;
        }

        out.push_str(&format!("{}}}\n", pad));
    }
}

/// HCL string literal. Template sequences are escaped so values are taken
/// literally.
pub fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '$' | '%' if chars.peek() == Some(&'{') => {
                out.push(c);
                out.push(c);
            }
            c if c.is_control() => out.push_str(&format!("\\u{:04X}", u32::from(c))),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

pub fn list(values: &[String]) -> String {
    let items: Vec<String> = values.iter().map(|v| quote(v)).collect();
    format!("[{}]", items.join(", "))
}

// ── Resource rendering ────────────────────────────────────────────────────────

/// HCL expressions standing in for ids the configuration gets from other
/// resources rather than literals.
#[derive(Debug, Clone, Default)]
pub struct References {
    /// Expression for the resource `name`; the literal name when `None`.
    pub name: Option<String>,
    /// Expression for the parent id (rule set or profile).
    pub parent_id: String,
    /// Expression for `cdn_frontdoor_origin_group_id`.
    pub origin_group_id: Option<String>,
    pub depends_on: Vec<String>,
}

pub fn rule_block(label: &str, rule: &Rule, refs: &References) -> Block {
    let mut b = Block::resource("azurerm_cdn_frontdoor_rule", label);
    if !refs.depends_on.is_empty() {
        b = b.expr("depends_on", format!("[{}]", refs.depends_on.join(", "))).blank();
    }
    b = match &refs.name {
        Some(expr) => b.expr("name", expr.clone()),
        None => b.string("name", &rule.name),
    };
    b = b.expr("cdn_frontdoor_rule_set_id", refs.parent_id.clone());
    b = b
        .string("match_processing_behavior", rule.match_processing_behavior.as_str())
        .expr("order", rule.order.to_string())
        .blank();

    let mut actions = Block::new("actions");
    for action in &rule.actions {
        actions = actions.block(action_block(action, refs));
    }
    b = b.block(actions);

    if !rule.conditions.is_empty() {
        let mut conditions = Block::new("conditions");
        for cond in &rule.conditions {
            conditions = conditions.block(condition_block(cond));
        }
        b = b.blank().block(conditions);
    }
    b
}

fn action_block(action: &RuleAction, refs: &References) -> Block {
    let mut b = Block::new(action.block_name());
    match action {
        RuleAction::RouteConfigurationOverride(rco) => {
            if rco.origin_group_id.is_some() {
                let expr = match &refs.origin_group_id {
                    Some(e) => e.clone(),
                    None => quote(&rco.origin_group_id.as_ref().map(|o| o.to_string()).unwrap_or_default()),
                };
                b = b.expr("cdn_frontdoor_origin_group_id", expr);
            }
            b = b
                .string("forwarding_protocol", rco.forwarding_protocol.as_str())
                .string("query_string_caching_behavior", rco.query_string_caching_behavior.as_str());
            if !rco.query_string_parameters.is_empty() {
                b = b.strings("query_string_parameters", &rco.query_string_parameters);
            }
            b = b
                .expr("compression_enabled", rco.compression_enabled.to_string())
                .string("cache_behavior", rco.cache_behavior.as_str());
            if let Some(d) = &rco.cache_duration {
                b = b.string("cache_duration", d);
            }
        }
        RuleAction::UrlRedirect(r) => {
            b = b
                .string("redirect_type", r.redirect_type.as_str())
                .string("redirect_protocol", r.redirect_protocol.as_str())
                .string("query_string", &r.query_string)
                .string("destination_path", &r.destination_path)
                .string("destination_hostname", &r.destination_hostname)
                .string("destination_fragment", &r.destination_fragment);
        }
    }
    b
}

fn condition_block(cond: &RuleCondition) -> Block {
    let mut b = Block::new(cond.kind.block_name());
    if let frontdoor_domain::ConditionKind::PostArgs { post_args_name } = &cond.kind {
        b = b.string("post_args_name", post_args_name);
    }
    b = b
        .string("operator", &cond.operator)
        .expr("negate_condition", cond.negate_condition.to_string())
        .strings("match_values", &cond.match_values);
    if !cond.transforms.is_empty() {
        let transforms: Vec<String> = cond.transforms.iter().map(|t| t.to_string()).collect();
        b = b.strings("transforms", &transforms);
    }
    b
}

pub fn secret_block(label: &str, secret: &Secret, refs: &References) -> Block {
    let mut b = Block::resource("azurerm_cdn_frontdoor_secret", label);
    b = match &refs.name {
        Some(expr) => b.expr("name", expr.clone()),
        None => b.string("name", &secret.name),
    };
    b = b.expr("cdn_frontdoor_profile_id", refs.parent_id.clone());

    if let Some(SecretParameters::CustomerCertificate {
        key_vault_certificate_id,
        use_latest_version,
        subject_alternative_names,
    }) = &secret.parameters
    {
        let mut cert = Block::new("customer_certificate")
            .string("key_vault_certificate_id", key_vault_certificate_id)
            .expr("use_latest_version", use_latest_version.to_string());
        if !subject_alternative_names.is_empty() {
            cert = cert.strings("subject_alternative_names", subject_alternative_names);
        }
        b = b.blank().block(Block::new("secret").block(cert));
    }
    b
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quote_escapes_for_hcl() {
        assert_eq!(quote("plain"), "\"plain\"");
        assert_eq!(quote("say \"hi\"\\"), r#""say \"hi\"\\""#);
        assert_eq!(quote("a\nb\tc"), r#""a\nb\tc""#);
        assert_eq!(quote("${var.name} %{if x}"), r#""$${var.name} %%{if x}""#);
        assert_eq!(quote("cost $5 {x}"), r#""cost $5 {x}""#);
        assert_eq!(quote("bell\u{7}"), r#""bell\u0007""#);
        assert_eq!(quote("clientIp={client_ip}"), r#""clientIp={client_ip}""#);
    }

    #[test]
    fn attributes_aligned_within_run() {
        let hcl = Block::new("load_balancing")
            .expr("sample_size", "16")
            .expr("successful_samples_required", "3")
            .render();
        assert_eq!(
            hcl,
            "load_balancing {\n  sample_size                 = 16\n  successful_samples_required = 3\n}\n"
        );
    }

    #[test]
    fn nested_blocks_indent() {
        let hcl = Block::resource("azurerm_resource_group", "test")
            .string("name", "rg")
            .blank()
            .block(Block::new("tags").string("env", "test"))
            .render();
        assert_eq!(
            hcl,
            "resource \"azurerm_resource_group\" \"test\" {\n  name = \"rg\"\n\n  tags {\n    env = \"test\"\n  }\n}\n"
        );
    }

    #[test]
    fn list_quotes_each_value() {
        assert_eq!(list(&["foo".into(), "clientIp={client_ip}".into()]), "[\"foo\", \"clientIp={client_ip}\"]");
    }
}
