use tripcover_domain::AccessDecision;

/// Where a resolved decision came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecisionSource {
    /// The key is not in the permission catalog.
    UnknownPermission,
    /// A direct per-user override decided.
    UserOverride,
    /// At least one role binding explicitly denies.
    RoleDeny,
    /// At least one role binding allows and none deny.
    RoleAllow,
    /// No override and no role binding exist.
    NoGrant,
}

impl DecisionSource {
    /// Returns a stable transport value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UnknownPermission => "unknown_permission",
            Self::UserOverride => "user_override",
            Self::RoleDeny => "role_deny",
            Self::RoleAllow => "role_allow",
            Self::NoGrant => "no_grant",
        }
    }
}

/// Decision together with its origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessResolution {
    /// Allow or deny.
    pub decision: AccessDecision,
    /// Origin of the decision.
    pub source: DecisionSource,
}

impl AccessResolution {
    pub(super) fn deny(source: DecisionSource) -> Self {
        Self {
            decision: AccessDecision::Deny,
            source,
        }
    }
}

/// Combines a direct override and role bindings for one cataloged key.
pub(super) fn decide(user_override: Option<bool>, role_decisions: &[bool]) -> AccessResolution {
    if let Some(allow) = user_override {
        return AccessResolution {
            decision: AccessDecision::from_allow(allow),
            source: DecisionSource::UserOverride,
        };
    }

    if role_decisions.iter().any(|allow| !allow) {
        return AccessResolution {
            decision: AccessDecision::Deny,
            source: DecisionSource::RoleDeny,
        };
    }

    if role_decisions.iter().any(|allow| *allow) {
        return AccessResolution {
            decision: AccessDecision::Allow,
            source: DecisionSource::RoleAllow,
        };
    }

    AccessResolution {
        decision: AccessDecision::Deny,
        source: DecisionSource::NoGrant,
    }
}
