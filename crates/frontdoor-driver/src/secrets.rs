use std::sync::Arc;

use async_trait::async_trait;
use frontdoor_domain::{FrontdoorSecretId, Secret, SecretParameters};
use serde_json::{json, Value};
use tracing::info;

use crate::arm::ArmClient;
use crate::driver::ResourceLifecycle;
use crate::error::DriverError;

/// Front Door secrets backed by Azure Resource Manager.
pub struct FrontdoorSecretsClient {
    arm: Arc<ArmClient>,
}

impl FrontdoorSecretsClient {
    pub fn new(arm: Arc<ArmClient>) -> Self {
        Self { arm }
    }

    async fn put(&self, id: &FrontdoorSecretId, secret: &Secret) -> Result<Secret, DriverError> {
        secret.validate()?;
        let resp = self.arm.put_and_wait(&id.to_string(), &secret_to_arm(secret)).await?;
        secret_from_arm(id, &resp)
    }
}

#[async_trait]
impl ResourceLifecycle for FrontdoorSecretsClient {
    type Id = FrontdoorSecretId;
    type Model = Secret;

    fn name(&self) -> &'static str {
        "cdn_frontdoor_secret"
    }

    fn validate(&self, secret: &Secret) -> Result<(), DriverError> {
        Ok(secret.validate()?)
    }

    async fn create(&self, id: &FrontdoorSecretId, secret: &Secret) -> Result<Secret, DriverError> {
        self.validate(secret)?;
        if self.exists(id).await? {
            return Err(DriverError::AlreadyExists { id: id.to_string() });
        }
        info!(secret = %id, "creating Front Door secret");
        self.put(id, secret).await
    }

    async fn update(&self, id: &FrontdoorSecretId, secret: &Secret) -> Result<Secret, DriverError> {
        info!(secret = %id, "updating Front Door secret");
        self.put(id, secret).await
    }

    async fn delete(&self, id: &FrontdoorSecretId) -> Result<(), DriverError> {
        info!(secret = %id, "deleting Front Door secret");
        self.arm.delete(&id.to_string()).await
    }

    async fn read(&self, id: &FrontdoorSecretId) -> Result<Option<Secret>, DriverError> {
        self.arm
            .get(&id.to_string())
            .await?
            .map(|body| secret_from_arm(id, &body))
            .transpose()
    }

    async fn exists(&self, id: &FrontdoorSecretId) -> Result<bool, DriverError> {
        Ok(self.arm.get(&id.to_string()).await?.is_some())
    }
}

pub(crate) fn secret_to_arm(secret: &Secret) -> Value {
    let parameters = match &secret.parameters {
        Some(SecretParameters::CustomerCertificate {
            key_vault_certificate_id,
            use_latest_version,
            subject_alternative_names,
        }) => json!({
            "type": "CustomerCertificate",
            "secretSource": { "id": key_vault_certificate_id },
            "useLatestVersion": use_latest_version,
            "subjectAlternativeNames": subject_alternative_names,
        }),
        None => Value::Null,
    };
    json!({ "properties": { "parameters": parameters } })
}

pub(crate) fn secret_from_arm(id: &FrontdoorSecretId, body: &Value) -> Result<Secret, DriverError> {
    let p = &body["properties"]["parameters"];
    let parameters = match p["type"].as_str() {
        None => None,
        Some("CustomerCertificate") => Some(SecretParameters::CustomerCertificate {
            key_vault_certificate_id: p["secretSource"]["id"].as_str().unwrap_or_default().to_string(),
            use_latest_version: p["useLatestVersion"].as_bool().unwrap_or(false),
            subject_alternative_names: p["subjectAlternativeNames"]
                .as_array()
                .map(|a| a.iter().filter_map(|v| v.as_str().map(str::to_string)).collect())
                .unwrap_or_default(),
        }),
        Some(other) => {
            return Err(DriverError::Decode {
                id: id.to_string(),
                message: format!("unsupported secret type '{}'", other),
            })
        }
    };
    Ok(Secret {
        name: id.secret_name.clone(),
        profile_id: id.profile.clone(),
        parameters,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arm::tests::client;
    use frontdoor_domain::FrontdoorProfileId;
    use wiremock::{
        matchers::{method, path},
        Mock, MockServer, ResponseTemplate,
    };

    const PROFILE: &str = "/subscriptions/sub/resourceGroups/rg/providers/Microsoft.Cdn/profiles/prof";

    fn secret_id() -> FrontdoorSecretId {
        FrontdoorProfileId::parse(PROFILE).unwrap().secret("acctest-c-1")
    }

    fn secret() -> Secret {
        Secret {
            name: "acctest-c-1".into(),
            profile_id: FrontdoorProfileId::parse(PROFILE).unwrap(),
            parameters: Some(SecretParameters::CustomerCertificate {
                key_vault_certificate_id: "https://kv.vault.azure.net/secrets/cert".into(),
                use_latest_version: true,
                subject_alternative_names: vec!["contoso.com".into()],
            }),
        }
    }

    #[test]
    fn arm_body_reads_back_to_same_secret() {
        let body = secret_to_arm(&secret());
        assert_eq!(body["properties"]["parameters"]["type"], "CustomerCertificate");
        assert_eq!(secret_from_arm(&secret_id(), &body).unwrap(), secret());
    }

    #[test]
    fn secret_without_parameters() {
        let mut s = secret();
        s.parameters = None;
        let body = secret_to_arm(&s);
        assert!(body["properties"]["parameters"].is_null());
        assert_eq!(secret_from_arm(&secret_id(), &body).unwrap().parameters, None);
    }

    #[tokio::test]
    async fn exists_follows_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("{}/secrets/acctest-c-1", PROFILE)))
            .respond_with(ResponseTemplate::new(200).set_body_json(secret_to_arm(&secret())))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(format!("{}/secrets/other", PROFILE)))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let secrets = FrontdoorSecretsClient::new(Arc::new(client(&server)));
        assert!(secrets.exists(&secret_id()).await.unwrap());
        let other = FrontdoorProfileId::parse(PROFILE).unwrap().secret("other");
        assert!(!secrets.exists(&other).await.unwrap());
    }

    #[tokio::test]
    async fn delete_waits_for_async_operation() {
        let server = MockServer::start().await;
        let op_url = format!("{}/operations/del", server.uri());
        Mock::given(method("DELETE"))
            .and(path(format!("{}/secrets/acctest-c-1", PROFILE)))
            .respond_with(ResponseTemplate::new(202).insert_header("Location", op_url.as_str()))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/operations/del"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let secrets = FrontdoorSecretsClient::new(Arc::new(client(&server)));
        secrets.delete(&secret_id()).await.unwrap();
    }
}
