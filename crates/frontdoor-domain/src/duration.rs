use crate::error::DomainError;

/// Days component that must be omitted rather than written as zero.
pub const ZERO_DAYS_PREFIX: &str = "0.";

/// Field path of `cache_duration` inside the rule's single `actions` block.
pub const CACHE_DURATION_FIELD: &str = "actions.0.route_configuration_override_action.cache_duration";

/// Reject a cache duration that spells out a zero days component.
///
/// Durations of one day or more are written `D.HH:MM:SS`, shorter ones
/// `HH:MM:SS`. Only the `0.` prefix is checked; the remainder is passed
/// through untouched and any range checking is left to the service.
pub fn validate_cache_duration(value: &str, field: &str) -> Result<(), DomainError> {
    if value.starts_with(ZERO_DAYS_PREFIX) {
        return Err(DomainError::MalformedDuration {
            field: field.to_string(),
            prefix: ZERO_DAYS_PREFIX,
            value: value.to_string(),
        });
    }
    Ok(())
}
