use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use frontdoor_acctest::{rule, secret, TestData};
use frontdoor_config::{load_resources, ClientSettings, ResourceConfig};
use frontdoor_domain::{FrontdoorRuleId, FrontdoorSecretId};
use frontdoor_driver::{ArmClient, FrontdoorRulesClient, FrontdoorSecretsClient, ResourceLifecycle};
use tracing::info;

use crate::cli::{AzureArgs, OutputFormat, ResourceKind};
use crate::output;

struct Clients {
    rules:   FrontdoorRulesClient,
    secrets: FrontdoorSecretsClient,
}

fn clients(azure: AzureArgs) -> Clients {
    let settings = ClientSettings::new(azure.access_token)
        .with_management_url(azure.management_url)
        .with_api_version(azure.api_version);
    let arm = Arc::new(ArmClient::new(&settings));
    Clients {
        rules:   FrontdoorRulesClient::new(arm.clone()),
        secrets: FrontdoorSecretsClient::new(arm),
    }
}

// ── Validate ──────────────────────────────────────────────────────────────────

pub fn validate(dir: PathBuf, format: OutputFormat) -> Result<()> {
    let resources = load_resources(&dir)
        .with_context(|| format!("Failed to validate resources in {}", dir.display()))?;
    match format {
        OutputFormat::Text => print!("{}", output::render_resources(&resources)),
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&output::resources_json(&resources))?)
        }
    }
    Ok(())
}

// ── Render ────────────────────────────────────────────────────────────────────

pub fn render(
    kind: ResourceKind,
    fixture: &str,
    random_integer: Option<u64>,
    location: String,
) -> Result<()> {
    let resource_type = match kind {
        ResourceKind::Rule => rule::RESOURCE_TYPE,
        ResourceKind::Secret => secret::RESOURCE_TYPE,
    };
    let data = match random_integer {
        Some(n) => TestData::with_seed(resource_type, "test", n),
        None => TestData::build(resource_type, "test"),
    }
    .with_location(location);

    let config = match kind {
        ResourceKind::Rule => rule::by_name(fixture, &data).map(|f| f.config),
        ResourceKind::Secret => secret::by_name(fixture, &data).map(|f| f.config),
    };
    let Some(config) = config else {
        let known = match kind {
            ResourceKind::Rule => rule::NAMES,
            ResourceKind::Secret => secret::NAMES,
        };
        anyhow::bail!("unknown fixture '{}'; expected one of: {}", fixture, known.join(", "));
    };
    print!("{}", config);
    Ok(())
}

// ── Apply / Destroy ───────────────────────────────────────────────────────────

pub async fn apply(dir: PathBuf, azure: AzureArgs) -> Result<()> {
    let resources = load_resources(&dir)
        .with_context(|| format!("Failed to load resources from {}", dir.display()))?;
    let clients = clients(azure);

    for res in &resources {
        match res {
            ResourceConfig::Rule(r) => {
                let id = r.rule_set_id.rule(&r.name);
                upsert(&clients.rules, &id, r).await?;
            }
            ResourceConfig::Secret(s) => {
                let id = s.profile_id.secret(&s.name);
                upsert(&clients.secrets, &id, s).await?;
            }
        }
        println!("{}", output::applied_line(res));
    }
    Ok(())
}

async fn upsert<L: ResourceLifecycle>(lifecycle: &L, id: &L::Id, model: &L::Model) -> Result<()>
where
    L::Id: std::fmt::Display,
{
    if lifecycle.exists(id).await? {
        info!(id = %id, "updating");
        lifecycle.update(id, model).await?;
    } else {
        info!(id = %id, "creating");
        lifecycle.create(id, model).await?;
    }
    Ok(())
}

pub async fn destroy(dir: PathBuf, azure: AzureArgs) -> Result<()> {
    let resources = load_resources(&dir)
        .with_context(|| format!("Failed to load resources from {}", dir.display()))?;
    let clients = clients(azure);

    // Rules before secrets, reverse of creation order.
    for res in resources.iter().rev() {
        match res {
            ResourceConfig::Rule(r) => clients.rules.delete(&r.rule_set_id.rule(&r.name)).await?,
            ResourceConfig::Secret(s) => {
                clients.secrets.delete(&s.profile_id.secret(&s.name)).await?
            }
        }
        println!("- {} {}", res.kind(), res.resource_id());
    }
    Ok(())
}

// ── Exists ────────────────────────────────────────────────────────────────────

pub async fn exists(kind: ResourceKind, id: &str, azure: AzureArgs) -> Result<()> {
    let clients = clients(azure);
    let found = match kind {
        ResourceKind::Rule => {
            let id = FrontdoorRuleId::parse(id)?;
            clients.rules.exists(&id).await?
        }
        ResourceKind::Secret => {
            let id = FrontdoorSecretId::parse(id)?;
            clients.secrets.exists(&id).await?
        }
    };
    println!("{}", found);
    Ok(())
}
