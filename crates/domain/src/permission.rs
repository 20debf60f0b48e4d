use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tripcover_core::{AppError, AppResult};

/// Maximum accepted length of a resource name.
pub const RESOURCE_NAME_MAX_LENGTH: usize = 64;

/// Resources protected by the permission catalog.
pub const CATALOG_RESOURCES: &[&str] = &[
    "users",
    "roles",
    "permissions",
    "plans",
    "quotes",
    "orders",
    "coupons",
    "posts",
    "tags",
    "categories",
    "pages",
    "settings",
    "logs",
];

/// CRUD action component of a permission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Action {
    /// Creating new records.
    Create,
    /// Reading records.
    Read,
    /// Updating existing records.
    Update,
    /// Deleting records.
    Delete,
}

impl Action {
    /// Returns a stable storage value for this action.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "CREATE",
            Self::Read => "READ",
            Self::Update => "UPDATE",
            Self::Delete => "DELETE",
        }
    }

    /// Returns all actions in CRUD order.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[Action] = &[Action::Create, Action::Read, Action::Update, Action::Delete];

        ALL
    }

    fn gerund(&self) -> &'static str {
        match self {
            Self::Create => "creating",
            Self::Read => "reading",
            Self::Update => "updating",
            Self::Delete => "deleting",
        }
    }
}

impl Display for Action {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().as_str() {
            "CREATE" => Ok(Self::Create),
            "READ" => Ok(Self::Read),
            "UPDATE" => Ok(Self::Update),
            "DELETE" => Ok(Self::Delete),
            _ => Err(AppError::Validation(format!(
                "unknown action value '{value}'"
            ))),
        }
    }
}

/// Validated name of a protectable resource, e.g. `orders`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ResourceName(String);

impl ResourceName {
    /// Creates a validated resource name.
    ///
    /// Names are trimmed and must consist of lower-case ASCII letters, digits,
    /// `_` or `-`.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        let trimmed = value.trim();

        if trimmed.is_empty() {
            return Err(AppError::Validation(
                "resource name must not be empty".to_owned(),
            ));
        }

        if trimmed.len() > RESOURCE_NAME_MAX_LENGTH {
            return Err(AppError::Validation(format!(
                "resource name must be at most {RESOURCE_NAME_MAX_LENGTH} characters"
            )));
        }

        let valid = trimmed.chars().all(|character| {
            character.is_ascii_lowercase()
                || character.is_ascii_digit()
                || character == '_'
                || character == '-'
        });
        if !valid {
            return Err(AppError::Validation(format!(
                "resource name '{trimmed}' must contain only lower-case letters, digits, '_' or '-'"
            )));
        }

        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the underlying string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for ResourceName {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.0.as_str())
    }
}

impl TryFrom<String> for ResourceName {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ResourceName> for String {
    fn from(value: ResourceName) -> Self {
        value.0
    }
}

/// Natural key of a permission: one action on one resource.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PermissionKey {
    resource: ResourceName,
    action: Action,
}

impl PermissionKey {
    /// Creates a permission key.
    #[must_use]
    pub fn new(resource: ResourceName, action: Action) -> Self {
        Self { resource, action }
    }

    /// Parses raw resource and action values into a key.
    pub fn parse(resource: &str, action: &str) -> AppResult<Self> {
        Ok(Self::new(ResourceName::new(resource)?, Action::from_str(action)?))
    }

    /// Returns the resource component.
    #[must_use]
    pub fn resource(&self) -> &ResourceName {
        &self.resource
    }

    /// Returns the action component.
    #[must_use]
    pub fn action(&self) -> Action {
        self.action
    }

    /// Returns whether the key targets one of the given resources with the given action.
    #[must_use]
    pub fn matches(&self, resources: &[&str], action: Action) -> bool {
        self.action == action && resources.contains(&self.resource.as_str())
    }

    /// Returns the catalog description used when seeding this permission.
    #[must_use]
    pub fn default_description(&self) -> String {
        format!("Allows {} {}", self.action.gerund(), self.resource)
    }
}

impl Display for PermissionKey {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}:{}", self.resource, self.action)
    }
}

impl FromStr for PermissionKey {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let Some((resource, action)) = value.split_once(':') else {
            return Err(AppError::Validation(format!(
                "permission '{value}' must use the 'resource:ACTION' form"
            )));
        };

        Self::parse(resource, action)
    }
}

/// Returns every (resource, action) pair of the permission catalog.
pub fn catalog_keys() -> AppResult<Vec<PermissionKey>> {
    let mut keys = Vec::with_capacity(CATALOG_RESOURCES.len() * Action::all().len());

    for resource in CATALOG_RESOURCES {
        let resource = ResourceName::new(*resource)?;
        for action in Action::all() {
            keys.push(PermissionKey::new(resource.clone(), *action));
        }
    }

    Ok(keys)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::str::FromStr;

    use proptest::prelude::*;

    use super::{Action, CATALOG_RESOURCES, PermissionKey, ResourceName, catalog_keys};

    #[test]
    fn action_parses_case_insensitively() {
        assert!(matches!(Action::from_str("read"), Ok(Action::Read)));
        assert!(matches!(Action::from_str(" DELETE "), Ok(Action::Delete)));
        assert!(Action::from_str("publish").is_err());
    }

    #[test]
    fn resource_name_rejects_upper_case_and_spaces() {
        assert!(ResourceName::new("Orders").is_err());
        assert!(ResourceName::new("travel plans").is_err());
        assert!(ResourceName::new("").is_err());
    }

    #[test]
    fn permission_key_uses_resource_action_transport_form() {
        let key = PermissionKey::parse("orders", "read");
        assert!(key.is_ok());

        let key = key.unwrap_or_else(|_| unreachable!());
        assert_eq!(key.to_string(), "orders:READ");
        assert_eq!(key.default_description(), "Allows reading orders");
    }

    #[test]
    fn permission_key_without_separator_is_rejected() {
        assert!(PermissionKey::from_str("orders").is_err());
    }

    #[test]
    fn catalog_contains_one_key_per_resource_and_action() {
        let keys = catalog_keys().unwrap_or_default();
        let unique: HashSet<_> = keys.iter().cloned().collect();

        assert_eq!(keys.len(), CATALOG_RESOURCES.len() * Action::all().len());
        assert_eq!(unique.len(), keys.len());
    }

    proptest! {
        #[test]
        fn valid_resource_names_survive_transport_form(
            resource in "[a-z][a-z0-9_-]{0,30}",
            action_index in 0usize..4,
        ) {
            let action = Action::all()[action_index];
            let key = PermissionKey::parse(resource.as_str(), action.as_str());
            prop_assert!(key.is_ok());

            let key = key.unwrap_or_else(|_| unreachable!());
            let reparsed = PermissionKey::from_str(key.to_string().as_str());
            prop_assert!(matches!(reparsed, Ok(ref value) if value == &key));
        }
    }
}
