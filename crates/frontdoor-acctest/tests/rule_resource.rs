use async_trait::async_trait;
use frontdoor_acctest::{rule, AccTestError, ResourceTest, TestData, TestStep};
use frontdoor_domain::{FrontdoorRuleId, Rule};
use frontdoor_driver::{DriverError, InMemoryRules, ResourceLifecycle};

fn data() -> TestData {
    TestData::build(rule::RESOURCE_TYPE, "test")
}

#[tokio::test]
async fn basic() {
    let data = data();
    let rules = InMemoryRules::new();
    ResourceTest::new(&rules, data.clone())
        .run(vec![TestStep::apply(rule::basic(&data)), TestStep::Import])
        .await
        .unwrap();
    assert!(rules.is_empty().await, "resource should be destroyed after the test");
}

#[tokio::test]
async fn action_only() {
    let data = data();
    let rules = InMemoryRules::new();
    ResourceTest::new(&rules, data.clone())
        .run(vec![TestStep::apply(rule::action_only(&data)), TestStep::Import])
        .await
        .unwrap();
}

#[tokio::test]
async fn requires_import() {
    let data = data();
    let rules = InMemoryRules::new();
    ResourceTest::new(&rules, data.clone())
        .run(vec![
            TestStep::apply(rule::basic(&data)),
            TestStep::RequiresImportError { fixture: rule::requires_import(&data) },
        ])
        .await
        .unwrap();
}

#[tokio::test]
async fn complete() {
    let data = data();
    let rules = InMemoryRules::new();
    ResourceTest::new(&rules, data.clone())
        .run(vec![TestStep::apply(rule::complete(&data)), TestStep::Import])
        .await
        .unwrap();
}

#[tokio::test]
async fn update() {
    let data = data();
    let rules = InMemoryRules::new();
    ResourceTest::new(&rules, data.clone())
        .run(vec![
            TestStep::apply(rule::complete(&data)),
            TestStep::Import,
            TestStep::apply(rule::update(&data)),
            TestStep::Import,
        ])
        .await
        .unwrap();
}

#[tokio::test]
async fn invalid_cache_duration() {
    let data = data();
    let rules = InMemoryRules::new();
    let expected = format!(
        "{:?} must not start with {:?} if the duration is less than 1 day. If the {:?} is less than 1 day it should be in the HH:MM:SS format, got {:?}",
        "actions.0.route_configuration_override_action.cache_duration",
        "0.",
        "actions.0.route_configuration_override_action.cache_duration",
        "0.23:59:59",
    );
    ResourceTest::new(&rules, data.clone())
        .run(vec![TestStep::expect_error(rule::invalid_cache_duration(&data), expected)])
        .await
        .unwrap();
    assert!(rules.is_empty().await, "nothing should have been created");
}

/// Reads back a different order than was written.
struct Drifting(InMemoryRules);

#[async_trait]
impl ResourceLifecycle for Drifting {
    type Id = FrontdoorRuleId;
    type Model = Rule;

    fn name(&self) -> &'static str {
        "drifting"
    }

    fn validate(&self, rule: &Rule) -> Result<(), DriverError> {
        self.0.validate(rule)
    }

    async fn create(&self, id: &FrontdoorRuleId, rule: &Rule) -> Result<Rule, DriverError> {
        self.0.create(id, rule).await
    }

    async fn update(&self, id: &FrontdoorRuleId, rule: &Rule) -> Result<Rule, DriverError> {
        self.0.update(id, rule).await
    }

    async fn delete(&self, id: &FrontdoorRuleId) -> Result<(), DriverError> {
        self.0.delete(id).await
    }

    async fn read(&self, id: &FrontdoorRuleId) -> Result<Option<Rule>, DriverError> {
        let mut rule = self.0.read(id).await?;
        if let Some(r) = rule.as_mut() {
            r.order += 1;
        }
        Ok(rule)
    }

    async fn exists(&self, id: &FrontdoorRuleId) -> Result<bool, DriverError> {
        self.0.exists(id).await
    }
}

#[tokio::test]
async fn import_detects_drift() {
    let data = data();
    let rules = Drifting(InMemoryRules::new());
    let err = ResourceTest::new(&rules, data.clone())
        .run(vec![TestStep::apply(rule::basic(&data)), TestStep::Import])
        .await
        .unwrap_err();
    assert!(matches!(err, AccTestError::ImportMismatch { step: 2, .. }), "got: {}", err);
    assert!(rules.0.is_empty().await, "resource should be destroyed after a failed step");
}

#[tokio::test]
async fn import_without_apply_fails() {
    let data = data();
    let rules = InMemoryRules::new();
    let err = ResourceTest::new(&rules, data.clone())
        .run(vec![TestStep::Import])
        .await
        .unwrap_err();
    assert!(matches!(err, AccTestError::NothingToImport { step: 1 }), "got: {}", err);
}

#[tokio::test]
async fn expected_error_that_never_happens_fails() {
    let data = data();
    let rules = InMemoryRules::new();
    let err = ResourceTest::new(&rules, data.clone())
        .run(vec![TestStep::expect_error(rule::basic(&data), "must not start with")])
        .await
        .unwrap_err();
    assert!(matches!(err, AccTestError::UnexpectedSuccess { step: 1, .. }), "got: {}", err);
    assert!(rules.is_empty().await, "the unexpected resource should still be destroyed");
}
