use serde::{Deserialize, Serialize};
use tripcover_application::{AccessResolution, EffectivePermission};
use tripcover_domain::PermissionKey;
use ts_rs::TS;

use super::UserIdentityResponse;

/// Query string of a single access check.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/access-check-query.ts"
)]
pub struct AccessCheckQuery {
    pub resource: String,
    pub action: String,
}

/// Decision for one (resource, action) pair.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/access-check-response.ts"
)]
pub struct AccessCheckResponse {
    pub permission: String,
    pub allowed: bool,
    pub decision: String,
    pub source: String,
}

impl AccessCheckResponse {
    pub fn new(key: &PermissionKey, resolution: AccessResolution) -> Self {
        Self {
            permission: key.to_string(),
            allowed: resolution.decision.is_allowed(),
            decision: resolution.decision.as_str().to_owned(),
            source: resolution.source.as_str().to_owned(),
        }
    }
}

/// One resolved catalog entry.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/effective-permission-response.ts"
)]
pub struct EffectivePermissionResponse {
    pub permission: String,
    pub resource: String,
    pub action: String,
    pub allowed: bool,
    pub source: String,
}

impl From<EffectivePermission> for EffectivePermissionResponse {
    fn from(value: EffectivePermission) -> Self {
        Self {
            permission: value.key.to_string(),
            resource: value.key.resource().as_str().to_owned(),
            action: value.key.action().as_str().to_owned(),
            allowed: value.resolution.decision.is_allowed(),
            source: value.resolution.source.as_str().to_owned(),
        }
    }
}

/// Caller identity with every resolved catalog entry.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/current-access-response.ts"
)]
pub struct CurrentAccessResponse {
    pub user: UserIdentityResponse,
    pub permissions: Vec<EffectivePermissionResponse>,
}
