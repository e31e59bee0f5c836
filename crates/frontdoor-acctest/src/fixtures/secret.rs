//! `azurerm_cdn_frontdoor_secret` configurations.

use frontdoor_domain::{FrontdoorProfileId, FrontdoorSecretId, Secret, SecretParameters};

use crate::data::TestData;
use crate::fixtures::Fixture;
use crate::hcl::{secret_block, Block, References};

pub const RESOURCE_TYPE: &str = "azurerm_cdn_frontdoor_secret";

pub type SecretFixture = Fixture<FrontdoorSecretId, Secret>;

fn profile(data: &TestData) -> FrontdoorProfileId {
    FrontdoorProfileId::new(
        &data.subscription_id,
        format!("acctestRG-cdn-afdx-{}", data.random_integer),
        format!("acctest-c-{}", data.random_integer),
    )
}

fn refs() -> References {
    References {
        parent_id: "azurerm_cdn_frontdoor_profile.test.id".into(),
        ..Default::default()
    }
}

pub fn template(data: &TestData) -> String {
    let n = data.random_integer;
    let blocks = [
        Block::new("provider \"azurerm\"").block(Block::new("features")),
        Block::resource("azurerm_resource_group", "test")
            .string("name", &format!("acctestRG-cdn-afdx-{}", n))
            .string("location", &data.location),
        Block::resource("azurerm_cdn_frontdoor_profile", "test")
            .string("name", &format!("acctest-c-{}", n))
            .expr("resource_group_name", "azurerm_resource_group.test.name"),
    ];
    blocks.iter().map(Block::render).collect::<Vec<_>>().join("\n")
}

fn certificate(data: &TestData, sans: &[&str]) -> SecretParameters {
    SecretParameters::CustomerCertificate {
        key_vault_certificate_id: format!(
            "https://acctest-kv-{}.vault.azure.net/secrets/acctest-cert-{}",
            data.random_integer, data.random_integer
        ),
        use_latest_version: true,
        subject_alternative_names: sans.iter().map(|s| s.to_string()).collect(),
    }
}

fn build(data: &TestData, label: &str, parameters: Option<SecretParameters>, refs: References) -> SecretFixture {
    let secret = Secret {
        name: format!("acctest-c-{}", data.random_integer),
        profile_id: profile(data),
        parameters,
    };
    let config = format!("{}\n{}", template(data), secret_block(label, &secret, &refs).render());
    Fixture { config, id: secret.profile_id.secret(&secret.name), model: secret }
}

pub fn basic(data: &TestData) -> SecretFixture {
    build(data, "test", Some(certificate(data, &[])), refs())
}

/// Same resource as [`basic`], declared a second time under another label.
pub fn requires_import(data: &TestData) -> SecretFixture {
    let first = basic(data);
    let refs = References { name: Some(format!("{}.test.name", RESOURCE_TYPE)), ..refs() };
    let block = secret_block("import", &first.model, &refs).render();
    Fixture { config: format!("{}\n{}", first.config, block), ..first }
}

pub fn complete(data: &TestData) -> SecretFixture {
    build(data, "test", Some(certificate(data, &["contoso.com", "www.contoso.com"])), refs())
}

/// Drops the certificate parameters.
pub fn update(data: &TestData) -> SecretFixture {
    build(data, "test", None, refs())
}

pub fn by_name(name: &str, data: &TestData) -> Option<SecretFixture> {
    let f: fn(&TestData) -> SecretFixture = match name {
        "basic" => basic,
        "requires_import" => requires_import,
        "complete" => complete,
        "update" => update,
        _ => return None,
    };
    Some(f(data))
}

pub const NAMES: &[&str] = &["basic", "requires_import", "complete", "update"];
