use std::sync::Arc;

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tripcover_application::{
    AuthorizationService, CreateRoleInput, DecisionSource, PermissionCatalogRepository,
    RoleGrantInput, RoleRepository, SeedService, UpsertOutcome, UserAccessRepository,
};
use tripcover_core::{AppError, UserId};
use tripcover_domain::{PermissionKey, SystemRole};

use super::PostgresAccessControlRepository;
use crate::MIGRATOR;

async fn test_pool() -> Option<PgPool> {
    let Ok(database_url) = std::env::var("DATABASE_URL") else {
        return None;
    };

    let pool = match PgPoolOptions::new()
        .max_connections(4)
        .connect(database_url.as_str())
        .await
    {
        Ok(pool) => pool,
        Err(error) => panic!("failed to connect to DATABASE_URL in test: {error}"),
    };

    if let Err(error) = MIGRATOR.run(&pool).await {
        panic!("failed to run migrations for postgres access control tests: {error}");
    }

    Some(pool)
}

fn key(value: &str) -> PermissionKey {
    value
        .parse()
        .unwrap_or_else(|error| panic!("invalid test key {value}: {error}"))
}

async fn seeded_repository(pool: PgPool) -> Arc<PostgresAccessControlRepository> {
    let repository = Arc::new(PostgresAccessControlRepository::new(pool));
    let seed = SeedService::new(repository.clone(), repository.clone(), repository.clone());
    if let Err(error) = seed.run(None).await {
        panic!("seed failed: {error}");
    }
    repository
}

async fn user_with_role(
    repository: &PostgresAccessControlRepository,
    role: SystemRole,
) -> UserId {
    let email = format!("{}@tripcover.test", uuid::Uuid::new_v4());
    let user = match repository.upsert_user(email.as_str(), "Test User").await {
        Ok(user) => user.record,
        Err(error) => panic!("failed to create user: {error}"),
    };

    let role = match repository.find_role_by_name(role.name()).await {
        Ok(Some(role)) => role,
        other => panic!("system role missing: {other:?}"),
    };

    let assigned = repository
        .assign_role_to_user(user.user_id, role.role.role_id.as_str())
        .await;
    assert!(assigned.is_ok());
    user.user_id
}

#[tokio::test]
async fn seeding_twice_leaves_row_counts_unchanged() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let repository = seeded_repository(pool).await;
    let permissions_before = repository.count_permissions().await.unwrap_or_default();

    // Custom roles created by concurrent tests change role counts, so the
    // second run is checked through its own report.
    let seed = SeedService::new(repository.clone(), repository.clone(), repository.clone());
    let report = seed.run(None).await;
    assert!(matches!(&report, Ok(report) if report.catalog.created == 0));
    assert!(matches!(&report, Ok(report) if report.roles.roles_created == 0));
    assert!(matches!(&report, Ok(report) if report.roles.roles_updated == SystemRole::all().len()));
    assert!(matches!(&report, Ok(report) if report.roles.bindings_created == 0));

    assert_eq!(
        repository.count_permissions().await.unwrap_or_default(),
        permissions_before
    );

    for role in SystemRole::all() {
        let stored = repository.find_role_by_name(role.name()).await;
        assert!(matches!(stored, Ok(Some(stored)) if stored.role.is_system));
    }
}

#[tokio::test]
async fn resolver_reads_roles_and_overrides_from_postgres() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let repository = seeded_repository(pool).await;
    let resolver = AuthorizationService::new(repository.clone(), repository.clone());

    let customer = user_with_role(&repository, SystemRole::Customer).await;
    let manager = user_with_role(&repository, SystemRole::Manager).await;

    assert!(resolver.has_permission(customer, &key("orders:READ")).await.unwrap_or(false));
    assert!(!resolver.has_permission(customer, &key("orders:DELETE")).await.unwrap_or(true));
    assert!(!resolver.has_permission(manager, &key("users:DELETE")).await.unwrap_or(true));
    assert!(resolver.has_permission(manager, &key("orders:DELETE")).await.unwrap_or(false));

    let permission = match repository.find_permission(&key("orders:READ")).await {
        Ok(Some(permission)) => permission,
        other => panic!("catalog entry missing: {other:?}"),
    };
    let first = repository
        .upsert_user_permission(customer, permission.permission_id.as_str(), false)
        .await;
    assert!(matches!(first, Ok(UpsertOutcome::Created)));
    let second = repository
        .upsert_user_permission(customer, permission.permission_id.as_str(), false)
        .await;
    assert!(matches!(second, Ok(UpsertOutcome::Updated)));

    let resolution = resolver.resolve(customer, &key("orders:READ")).await;
    assert!(matches!(
        resolution,
        Ok(resolution) if resolution.source == DecisionSource::UserOverride && !resolution.decision.is_allowed()
    ));

    let unknown = resolver.resolve(manager, &key("claims:READ")).await;
    assert!(matches!(
        unknown,
        Ok(resolution) if resolution.source == DecisionSource::UnknownPermission
    ));
}

#[tokio::test]
async fn custom_roles_round_trip_and_system_roles_are_protected() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let repository = seeded_repository(pool).await;
    let name = format!("Claims {}", uuid::Uuid::new_v4());

    let created = repository
        .create_role(CreateRoleInput {
            name: name.clone(),
            description: "Handles claims".to_owned(),
            grants: vec![
                RoleGrantInput {
                    key: key("orders:READ"),
                    allow: true,
                },
                RoleGrantInput {
                    key: key("orders:DELETE"),
                    allow: false,
                },
            ],
        })
        .await;
    assert!(matches!(&created, Ok(role) if role.grants.len() == 2 && !role.role.is_system));

    let duplicate = repository
        .create_role(CreateRoleInput {
            name: name.clone(),
            description: String::new(),
            grants: Vec::new(),
        })
        .await;
    assert!(matches!(duplicate, Err(AppError::Conflict(_))));

    let uncataloged = repository
        .create_role(CreateRoleInput {
            name: format!("{name} extra"),
            description: String::new(),
            grants: vec![RoleGrantInput {
                key: key("claims:READ"),
                allow: true,
            }],
        })
        .await;
    assert!(matches!(uncataloged, Err(AppError::NotFound(_))));
    assert!(matches!(
        repository.find_role_by_name(format!("{name} extra").as_str()).await,
        Ok(None)
    ));

    assert!(repository.delete_role(name.as_str()).await.is_ok());
    assert!(matches!(
        repository.delete_role(SystemRole::Admin.name()).await,
        Err(AppError::Conflict(_))
    ));
    assert!(matches!(
        repository.delete_role(name.as_str()).await,
        Err(AppError::NotFound(_))
    ));
}
