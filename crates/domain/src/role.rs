use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tripcover_core::AppError;

use crate::permission::{Action, PermissionKey};

const MANAGER_PROTECTED_RESOURCES: &[&str] = &["users", "roles", "permissions"];

/// Built-in roles bootstrapped by the seeding routine.
///
/// System roles are upserted on every seed run and can never be deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SystemRole {
    /// Full access to every cataloged permission.
    Admin,
    /// Everything except deleting users, roles and permissions.
    Manager,
    /// Storefront customer: browse plans, request quotes, place orders.
    Customer,
}

impl SystemRole {
    /// Returns the unique role name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Admin => "Admin",
            Self::Manager => "Manager",
            Self::Customer => "Customer",
        }
    }

    /// Returns the human-readable role description.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::Admin => "Full administrative access",
            Self::Manager => "Back-office management without destructive access control changes",
            Self::Customer => "Customer access to plans, quotes and orders",
        }
    }

    /// Returns all system roles.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[SystemRole] = &[SystemRole::Admin, SystemRole::Manager, SystemRole::Customer];

        ALL
    }

    /// Returns whether the role's default binding set allows the permission.
    #[must_use]
    pub fn grants(&self, key: &PermissionKey) -> bool {
        match self {
            Self::Admin => true,
            Self::Manager => !key.matches(MANAGER_PROTECTED_RESOURCES, Action::Delete),
            Self::Customer => {
                key.matches(&["plans"], Action::Read)
                    || key.matches(&["quotes", "orders"], Action::Create)
                    || key.matches(&["quotes", "orders"], Action::Read)
            }
        }
    }
}

impl FromStr for SystemRole {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|role| role.name() == value)
            .ok_or_else(|| AppError::NotFound(format!("system role '{value}' does not exist")))
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use crate::permission::{PermissionKey, catalog_keys};

    use super::SystemRole;

    fn key(value: &str) -> PermissionKey {
        PermissionKey::from_str(value).unwrap_or_else(|error| panic!("invalid key {value}: {error}"))
    }

    #[test]
    fn admin_grants_whole_catalog() {
        let keys = catalog_keys().unwrap_or_default();
        assert!(!keys.is_empty());
        assert!(keys.iter().all(|key| SystemRole::Admin.grants(key)));
    }

    #[test]
    fn manager_cannot_delete_access_control_resources() {
        for denied in ["users:DELETE", "roles:DELETE", "permissions:DELETE"] {
            assert!(!SystemRole::Manager.grants(&key(denied)), "{denied}");
        }

        let allowed = catalog_keys()
            .unwrap_or_default()
            .into_iter()
            .filter(|key| SystemRole::Manager.grants(key))
            .count();
        assert_eq!(allowed, catalog_keys().unwrap_or_default().len() - 3);
    }

    #[test]
    fn customer_grants_only_the_storefront_allowlist() {
        let granted: Vec<String> = catalog_keys()
            .unwrap_or_default()
            .into_iter()
            .filter(|key| SystemRole::Customer.grants(key))
            .map(|key| key.to_string())
            .collect();

        assert_eq!(
            granted,
            vec![
                "plans:READ",
                "quotes:CREATE",
                "quotes:READ",
                "orders:CREATE",
                "orders:READ",
            ]
        );
    }

    #[test]
    fn customer_does_not_update_or_delete_orders() {
        assert!(!SystemRole::Customer.grants(&key("orders:UPDATE")));
        assert!(!SystemRole::Customer.grants(&key("orders:DELETE")));
        assert!(!SystemRole::Customer.grants(&key("plans:CREATE")));
    }

    #[test]
    fn system_role_parses_by_name() {
        assert!(matches!(
            SystemRole::from_str("Manager"),
            Ok(SystemRole::Manager)
        ));
        assert!(SystemRole::from_str("Editor").is_err());
    }
}
