use chrono::Utc;

const DEFAULT_LOCATION: &str = "westeurope";
const DEFAULT_SUBSCRIPTION: &str = "00000000-0000-0000-0000-000000000000";

/// Per-test naming inputs: every name in a fixture is derived from the
/// random integer so parallel runs never collide.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestData {
    /// e.g. `azurerm_cdn_frontdoor_rule`
    pub resource_type: String,
    /// e.g. `test`
    pub resource_label: String,
    /// `<resource_type>.<resource_label>`
    pub resource_name: String,
    pub random_integer: u64,
    pub location: String,
    pub subscription_id: String,
}

impl TestData {
    /// Build test data with a time-derived random integer. Location and
    /// subscription come from `ARM_TEST_LOCATION` / `ARM_SUBSCRIPTION_ID`.
    pub fn build(resource_type: &str, resource_label: &str) -> Self {
        let now = Utc::now();
        let stamp: u64 = now
            .format("%y%m%d%H%M%S")
            .to_string()
            .parse()
            .unwrap_or_default();
        let random = stamp * 100 + u64::from(now.timestamp_subsec_millis() % 100);

        let mut data = Self::with_seed(resource_type, resource_label, random);
        if let Ok(location) = std::env::var("ARM_TEST_LOCATION") {
            data.location = location;
        }
        if let Ok(subscription) = std::env::var("ARM_SUBSCRIPTION_ID") {
            data.subscription_id = subscription;
        }
        data
    }

    /// Deterministic test data, for rendering fixtures and unit tests.
    pub fn with_seed(resource_type: &str, resource_label: &str, random_integer: u64) -> Self {
        Self {
            resource_type: resource_type.to_string(),
            resource_label: resource_label.to_string(),
            resource_name: format!("{}.{}", resource_type, resource_label),
            random_integer,
            location: DEFAULT_LOCATION.to_string(),
            subscription_id: DEFAULT_SUBSCRIPTION.to_string(),
        }
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }
}
