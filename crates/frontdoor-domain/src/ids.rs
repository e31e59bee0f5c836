use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

const PROVIDER_NAMESPACE: &str = "Microsoft.Cdn";

// ── Segment parsing ───────────────────────────────────────────────────────────

/// Split an ARM resource id into the values of its `key/value` segments.
///
/// `keys` lists the segment keys after the `providers/Microsoft.Cdn` pair, e.g.
/// `["profiles", "ruleSets", "rules"]`. Returns the subscription, resource group
/// and one value per key, in order.
fn parse_segments(kind: &'static str, id: &str, keys: &[&str]) -> Result<Vec<String>, DomainError> {
    let fail = |reason: String| DomainError::InvalidResourceId {
        kind,
        id: id.to_string(),
        reason,
    };

    let trimmed = id.trim().trim_end_matches('/');
    let Some(rest) = trimmed.strip_prefix('/') else {
        return Err(fail("expected a leading '/'".into()));
    };
    let segments: Vec<&str> = rest.split('/').collect();

    let expected = 6 + keys.len() * 2;
    if segments.len() != expected {
        return Err(fail(format!(
            "expected {} segments, got {}",
            expected,
            segments.len()
        )));
    }

    let mut values = Vec::with_capacity(2 + keys.len());
    let fixed = [("subscriptions", 0usize), ("resourceGroups", 2)];
    for (key, at) in fixed {
        values.push(expect_pair(&segments, at, key).map_err(fail)?);
    }

    if segments[4] != "providers" {
        return Err(fail(format!("expected segment 'providers', got '{}'", segments[4])));
    }
    if !segments[5].eq_ignore_ascii_case(PROVIDER_NAMESPACE) {
        return Err(fail(format!(
            "expected provider '{}', got '{}'",
            PROVIDER_NAMESPACE, segments[5]
        )));
    }

    for (i, key) in keys.iter().enumerate() {
        values.push(expect_pair(&segments, 6 + i * 2, key).map_err(fail)?);
    }
    Ok(values)
}

fn expect_pair(segments: &[&str], at: usize, key: &str) -> Result<String, String> {
    if segments[at] != key {
        return Err(format!("expected segment '{}', got '{}'", key, segments[at]));
    }
    let value = segments[at + 1];
    if value.is_empty() {
        return Err(format!("value for segment '{}' is empty", key));
    }
    Ok(value.to_string())
}

// ── Identifiers ───────────────────────────────────────────────────────────────

macro_rules! id_serde {
    ($ty:ident) => {
        impl FromStr for $ty {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                $ty::parse(s)
            }
        }

        impl Serialize for $ty {
            fn serialize<S: serde::Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
                s.collect_str(self)
            }
        }

        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D: serde::Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
                let raw = String::deserialize(d)?;
                $ty::parse(&raw).map_err(serde::de::Error::custom)
            }
        }
    };
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FrontdoorProfileId {
    pub subscription_id: String,
    pub resource_group: String,
    pub profile_name: String,
}

impl FrontdoorProfileId {
    pub fn new(
        subscription_id: impl Into<String>,
        resource_group: impl Into<String>,
        profile_name: impl Into<String>,
    ) -> Self {
        Self {
            subscription_id: subscription_id.into(),
            resource_group: resource_group.into(),
            profile_name: profile_name.into(),
        }
    }

    pub fn parse(id: &str) -> Result<Self, DomainError> {
        let mut v = parse_segments("Front Door Profile", id, &["profiles"])?.into_iter();
        Ok(Self {
            subscription_id: next(&mut v),
            resource_group: next(&mut v),
            profile_name: next(&mut v),
        })
    }

    pub fn rule_set(&self, name: impl Into<String>) -> FrontdoorRuleSetId {
        FrontdoorRuleSetId { profile: self.clone(), rule_set_name: name.into() }
    }

    pub fn secret(&self, name: impl Into<String>) -> FrontdoorSecretId {
        FrontdoorSecretId { profile: self.clone(), secret_name: name.into() }
    }

    pub fn origin_group(&self, name: impl Into<String>) -> FrontdoorOriginGroupId {
        FrontdoorOriginGroupId { profile: self.clone(), origin_group_name: name.into() }
    }
}

impl fmt::Display for FrontdoorProfileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "/subscriptions/{}/resourceGroups/{}/providers/{}/profiles/{}",
            self.subscription_id, self.resource_group, PROVIDER_NAMESPACE, self.profile_name
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FrontdoorRuleSetId {
    pub profile: FrontdoorProfileId,
    pub rule_set_name: String,
}

impl FrontdoorRuleSetId {
    pub fn parse(id: &str) -> Result<Self, DomainError> {
        let mut v = parse_segments("Front Door Rule Set", id, &["profiles", "ruleSets"])?.into_iter();
        Ok(Self {
            profile: FrontdoorProfileId {
                subscription_id: next(&mut v),
                resource_group: next(&mut v),
                profile_name: next(&mut v),
            },
            rule_set_name: next(&mut v),
        })
    }

    pub fn rule(&self, name: impl Into<String>) -> FrontdoorRuleId {
        FrontdoorRuleId { rule_set: self.clone(), rule_name: name.into() }
    }
}

impl fmt::Display for FrontdoorRuleSetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/ruleSets/{}", self.profile, self.rule_set_name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FrontdoorRuleId {
    pub rule_set: FrontdoorRuleSetId,
    pub rule_name: String,
}

impl FrontdoorRuleId {
    pub fn parse(id: &str) -> Result<Self, DomainError> {
        let mut v =
            parse_segments("Front Door Rule", id, &["profiles", "ruleSets", "rules"])?.into_iter();
        Ok(Self {
            rule_set: FrontdoorRuleSetId {
                profile: FrontdoorProfileId {
                    subscription_id: next(&mut v),
                    resource_group: next(&mut v),
                    profile_name: next(&mut v),
                },
                rule_set_name: next(&mut v),
            },
            rule_name: next(&mut v),
        })
    }
}

impl fmt::Display for FrontdoorRuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/rules/{}", self.rule_set, self.rule_name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FrontdoorSecretId {
    pub profile: FrontdoorProfileId,
    pub secret_name: String,
}

impl FrontdoorSecretId {
    pub fn parse(id: &str) -> Result<Self, DomainError> {
        let mut v = parse_segments("Front Door Secret", id, &["profiles", "secrets"])?.into_iter();
        Ok(Self {
            profile: FrontdoorProfileId {
                subscription_id: next(&mut v),
                resource_group: next(&mut v),
                profile_name: next(&mut v),
            },
            secret_name: next(&mut v),
        })
    }
}

impl fmt::Display for FrontdoorSecretId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/secrets/{}", self.profile, self.secret_name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FrontdoorOriginGroupId {
    pub profile: FrontdoorProfileId,
    pub origin_group_name: String,
}

impl FrontdoorOriginGroupId {
    pub fn parse(id: &str) -> Result<Self, DomainError> {
        let mut v =
            parse_segments("Front Door Origin Group", id, &["profiles", "originGroups"])?.into_iter();
        Ok(Self {
            profile: FrontdoorProfileId {
                subscription_id: next(&mut v),
                resource_group: next(&mut v),
                profile_name: next(&mut v),
            },
            origin_group_name: next(&mut v),
        })
    }
}

impl fmt::Display for FrontdoorOriginGroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/originGroups/{}", self.profile, self.origin_group_name)
    }
}

id_serde!(FrontdoorProfileId);
id_serde!(FrontdoorRuleSetId);
id_serde!(FrontdoorRuleId);
id_serde!(FrontdoorSecretId);
id_serde!(FrontdoorOriginGroupId);

/// `parse_segments` guarantees the value count, so this never yields a default.
fn next(values: &mut std::vec::IntoIter<String>) -> String {
    values.next().unwrap_or_default()
}
