use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::ids::FrontdoorProfileId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SecretParameters {
    /// A certificate stored in Key Vault and referenced by its secret id.
    CustomerCertificate {
        key_vault_certificate_id: String,
        use_latest_version: bool,
        subject_alternative_names: Vec<String>,
    },
}

impl SecretParameters {
    /// Azure wire name of the parameters type.
    pub fn type_name(&self) -> &'static str {
        match self {
            SecretParameters::CustomerCertificate { .. } => "CustomerCertificate",
        }
    }
}

/// A secret registered on a Front Door profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Secret {
    pub name: String,
    pub profile_id: FrontdoorProfileId,
    pub parameters: Option<SecretParameters>,
}

impl Secret {
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.name.is_empty() {
            return Err(DomainError::InvalidConfig("secret name must not be empty".into()));
        }
        match &self.parameters {
            Some(SecretParameters::CustomerCertificate { key_vault_certificate_id, .. })
                if key_vault_certificate_id.is_empty() =>
            {
                Err(DomainError::InvalidConfig(format!(
                    "secret '{}': key_vault_certificate_id must not be empty",
                    self.name
                )))
            }
            _ => Ok(()),
        }
    }
}
