use std::collections::HashMap;
use std::hash::Hash;

use async_trait::async_trait;
use frontdoor_domain::{FrontdoorRuleId, FrontdoorSecretId, Rule, Secret};
use tokio::sync::RwLock;
use tracing::debug;

use crate::driver::ResourceLifecycle;
use crate::error::DriverError;

/// In-process stand-in for the remote API.
///
/// - Validates models and enforces already-exists exactly like the ARM clients.
/// - Stores whatever was written and returns it unchanged on read.
/// - Performs no I/O.
#[derive(Debug)]
pub struct InMemory<Id, Model> {
    name:      &'static str,
    resources: RwLock<HashMap<Id, Model>>,
}

pub type InMemoryRules = InMemory<FrontdoorRuleId, Rule>;
pub type InMemorySecrets = InMemory<FrontdoorSecretId, Secret>;

impl InMemoryRules {
    pub fn new() -> Self {
        InMemory { name: "cdn_frontdoor_rule", resources: RwLock::new(HashMap::new()) }
    }
}

impl Default for InMemoryRules {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemorySecrets {
    pub fn new() -> Self {
        InMemory { name: "cdn_frontdoor_secret", resources: RwLock::new(HashMap::new()) }
    }
}

impl Default for InMemorySecrets {
    fn default() -> Self {
        Self::new()
    }
}

impl<Id, Model> InMemory<Id, Model> {
    pub async fn len(&self) -> usize {
        self.resources.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.resources.read().await.is_empty()
    }
}

/// Validation hook shared by the stored model types.
pub trait Validate {
    fn validate_model(&self) -> Result<(), DriverError>;
}

impl Validate for Rule {
    fn validate_model(&self) -> Result<(), DriverError> {
        Ok(self.validate()?)
    }
}

impl Validate for Secret {
    fn validate_model(&self) -> Result<(), DriverError> {
        Ok(self.validate()?)
    }
}

#[async_trait]
impl<Id, Model> ResourceLifecycle for InMemory<Id, Model>
where
    Id: Eq + Hash + Clone + std::fmt::Display + Send + Sync + 'static,
    Model: Validate + Clone + Send + Sync + 'static,
{
    type Id = Id;
    type Model = Model;

    fn name(&self) -> &'static str {
        self.name
    }

    fn validate(&self, model: &Model) -> Result<(), DriverError> {
        model.validate_model()
    }

    async fn create(&self, id: &Id, model: &Model) -> Result<Model, DriverError> {
        self.validate(model)?;
        let mut guard = self.resources.write().await;
        if guard.contains_key(id) {
            return Err(DriverError::AlreadyExists { id: id.to_string() });
        }
        debug!(resource = self.name, id = %id, "InMemory: create");
        guard.insert(id.clone(), model.clone());
        Ok(model.clone())
    }

    async fn update(&self, id: &Id, model: &Model) -> Result<Model, DriverError> {
        self.validate(model)?;
        debug!(resource = self.name, id = %id, "InMemory: update");
        self.resources.write().await.insert(id.clone(), model.clone());
        Ok(model.clone())
    }

    async fn delete(&self, id: &Id) -> Result<(), DriverError> {
        debug!(resource = self.name, id = %id, "InMemory: delete");
        self.resources.write().await.remove(id);
        Ok(())
    }

    async fn read(&self, id: &Id) -> Result<Option<Model>, DriverError> {
        Ok(self.resources.read().await.get(id).cloned())
    }

    async fn exists(&self, id: &Id) -> Result<bool, DriverError> {
        Ok(self.resources.read().await.contains_key(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use frontdoor_domain::*;

    fn rule_set() -> FrontdoorRuleSetId {
        FrontdoorProfileId::new("sub", "rg", "prof").rule_set("rs")
    }

    fn rule(cache_duration: &str) -> Rule {
        Rule {
            name: "r1".into(),
            rule_set_id: rule_set(),
            order: 0,
            match_processing_behavior: MatchProcessingBehavior::Continue,
            actions: vec![RuleAction::RouteConfigurationOverride(RouteConfigurationOverride {
                origin_group_id: None,
                forwarding_protocol: ForwardingProtocol::MatchRequest,
                query_string_caching_behavior: QueryStringCachingBehavior::IgnoreQueryString,
                query_string_parameters: vec![],
                compression_enabled: false,
                cache_behavior: CacheBehavior::OverrideAlways,
                cache_duration: Some(cache_duration.into()),
            })],
            conditions: vec![],
        }
    }

    #[tokio::test]
    async fn create_read_delete() {
        let rules = InMemoryRules::new();
        let id = rule_set().rule("r1");
        rules.create(&id, &rule("23:59:59")).await.unwrap();
        assert!(rules.exists(&id).await.unwrap());
        assert_eq!(rules.read(&id).await.unwrap(), Some(rule("23:59:59")));

        rules.delete(&id).await.unwrap();
        assert!(!rules.exists(&id).await.unwrap());
        assert!(rules.is_empty().await);
    }

    #[tokio::test]
    async fn second_create_requires_import() {
        let rules = InMemoryRules::new();
        let id = rule_set().rule("r1");
        rules.create(&id, &rule("23:59:59")).await.unwrap();
        let err = rules.create(&id, &rule("1.00:00:00")).await.unwrap_err();
        assert!(matches!(err, DriverError::AlreadyExists { .. }));
    }

    #[tokio::test]
    async fn invalid_duration_never_stored() {
        let rules = InMemoryRules::new();
        let id = rule_set().rule("r1");
        assert!(rules.create(&id, &rule("0.23:59:59")).await.unwrap_err().is_validation());
        assert!(rules.update(&id, &rule("0.00:00:01")).await.unwrap_err().is_validation());
        assert_eq!(rules.len().await, 0);
    }
}
