use serde::{Deserialize, Serialize};

/// Outcome of an access check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessDecision {
    /// Access is granted.
    Allow,
    /// Access is refused.
    Deny,
}

impl AccessDecision {
    /// Maps an `allow` flag to a decision.
    #[must_use]
    pub fn from_allow(allow: bool) -> Self {
        if allow { Self::Allow } else { Self::Deny }
    }

    /// Returns whether access is granted.
    #[must_use]
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow)
    }

    /// Returns a stable transport value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Allow => "allow",
            Self::Deny => "deny",
        }
    }
}

/// Stable audit actions emitted by security administration use-cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    /// Emitted when a permission description changes.
    SecurityPermissionUpdated,
    /// Emitted when a custom role is created.
    SecurityRoleCreated,
    /// Emitted when a role description changes.
    SecurityRoleUpdated,
    /// Emitted when a custom role is deleted.
    SecurityRoleDeleted,
    /// Emitted when a role binding is written.
    SecurityRolePermissionSet,
    /// Emitted when a role binding is removed.
    SecurityRolePermissionRemoved,
    /// Emitted when a role is assigned to a user.
    SecurityRoleAssigned,
    /// Emitted when a role is removed from a user.
    SecurityRoleUnassigned,
    /// Emitted when a direct user override is written.
    SecurityUserPermissionSet,
    /// Emitted when a direct user override is removed.
    SecurityUserPermissionRemoved,
}

impl AuditAction {
    /// Returns a stable storage value for this action.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SecurityPermissionUpdated => "security.permission.updated",
            Self::SecurityRoleCreated => "security.role.created",
            Self::SecurityRoleUpdated => "security.role.updated",
            Self::SecurityRoleDeleted => "security.role.deleted",
            Self::SecurityRolePermissionSet => "security.role_permission.set",
            Self::SecurityRolePermissionRemoved => "security.role_permission.removed",
            Self::SecurityRoleAssigned => "security.role.assigned",
            Self::SecurityRoleUnassigned => "security.role.unassigned",
            Self::SecurityUserPermissionSet => "security.user_permission.set",
            Self::SecurityUserPermissionRemoved => "security.user_permission.removed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::AccessDecision;

    #[test]
    fn decision_maps_allow_flag() {
        assert_eq!(AccessDecision::from_allow(true), AccessDecision::Allow);
        assert_eq!(AccessDecision::from_allow(false), AccessDecision::Deny);
        assert!(!AccessDecision::Deny.is_allowed());
    }
}
