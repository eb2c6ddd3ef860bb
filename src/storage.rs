use crate::entities;
use crate::errors::GatekeeperError;
use crate::password;
use crate::settings::Database as DbCfg;
use base64ct::Encoding;
use chrono::Utc;
use rand::RngCore;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, Database, DatabaseConnection, EntityTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use sea_orm_migration::MigratorTrait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Principal {
    pub identifier: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub active: bool,
    pub is_admin: bool,
    pub created_at: i64,
}

#[derive(Debug, Clone)]
pub struct NewPrincipal {
    pub identifier: String,
    pub password: String,
    pub is_admin: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Client {
    pub identifier: String,
    #[serde(skip_serializing)]
    pub secret: String,
    pub grant_kind: String,
    pub active: bool,
    pub created_at: i64,
}

#[derive(Debug, Clone, Default)]
pub struct NewClient {
    /// Generated when absent.
    pub identifier: Option<String>,
    /// Generated when absent.
    pub secret: Option<String>,
    pub grant_kind: String,
}

/// Shared shape for roles and resource types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Named {
    pub identifier: String,
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
    pub identifier: String,
    pub name: String,
    pub description: String,
    pub resource_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub access_token: String,
    pub refresh_token: String,
    pub principal: String,
    pub client: String,
    pub expires_at: i64,
    pub created_at: i64,
}

pub async fn init(cfg: &DbCfg) -> Result<DatabaseConnection, GatekeeperError> {
    let db = Database::connect(&cfg.url).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

// Config entries

pub async fn get_config_value(
    db: &DatabaseConnection,
    key: &str,
) -> Result<Option<Value>, GatekeeperError> {
    use entities::config_entry::Entity;

    match Entity::find_by_id(key.to_string()).one(db).await? {
        Some(model) => Ok(Some(serde_json::from_str(&model.value)?)),
        None => Ok(None),
    }
}

pub async fn set_config_value(
    db: &DatabaseConnection,
    key: &str,
    value: &Value,
) -> Result<(), GatekeeperError> {
    use entities::config_entry::{Column, Entity};

    let entry = entities::config_entry::ActiveModel {
        key: Set(key.to_string()),
        value: Set(serde_json::to_string(value)?),
        updated_at: Set(Utc::now().timestamp()),
    };

    Entity::insert(entry)
        .on_conflict(
            OnConflict::column(Column::Key)
                .update_columns([Column::Value, Column::UpdatedAt])
                .to_owned(),
        )
        .exec(db)
        .await?;

    Ok(())
}

// Principals

pub async fn create_principal(
    db: &DatabaseConnection,
    input: NewPrincipal,
) -> Result<Principal, GatekeeperError> {
    if input.identifier.is_empty() {
        return Err(GatekeeperError::InvalidInput(
            "principal identifier must not be empty".into(),
        ));
    }
    let password_hash = password::hash(&input.password)?;
    let created_at = Utc::now().timestamp();

    let principal = entities::principal::ActiveModel {
        identifier: Set(input.identifier.clone()),
        password_hash: Set(password_hash.clone()),
        active: Set(1),
        is_admin: Set(input.is_admin as i64),
        created_at: Set(created_at),
    };
    principal.insert(db).await?;

    Ok(Principal {
        identifier: input.identifier,
        password_hash,
        active: true,
        is_admin: input.is_admin,
        created_at,
    })
}

pub async fn get_principal(
    db: &DatabaseConnection,
    identifier: &str,
) -> Result<Option<Principal>, GatekeeperError> {
    use entities::principal::Entity;

    Ok(Entity::find_by_id(identifier.to_string())
        .one(db)
        .await?
        .map(|m| Principal {
            identifier: m.identifier,
            password_hash: m.password_hash,
            active: m.active == 1,
            is_admin: m.is_admin == 1,
            created_at: m.created_at,
        }))
}

/// Returns false when no such principal exists.
pub async fn set_principal_active(
    db: &DatabaseConnection,
    identifier: &str,
    active: bool,
) -> Result<bool, GatekeeperError> {
    use entities::principal::{Column, Entity};

    let result = Entity::update_many()
        .col_expr(Column::Active, Expr::value(active as i64))
        .filter(Column::Identifier.eq(identifier))
        .exec(db)
        .await?;
    Ok(result.rows_affected > 0)
}

pub async fn set_principal_admin(
    db: &DatabaseConnection,
    identifier: &str,
    is_admin: bool,
) -> Result<bool, GatekeeperError> {
    use entities::principal::{Column, Entity};

    let result = Entity::update_many()
        .col_expr(Column::IsAdmin, Expr::value(is_admin as i64))
        .filter(Column::Identifier.eq(identifier))
        .exec(db)
        .await?;
    Ok(result.rows_affected > 0)
}

pub async fn set_principal_password(
    db: &DatabaseConnection,
    identifier: &str,
    new_password: &str,
) -> Result<bool, GatekeeperError> {
    use entities::principal::{Column, Entity};

    let password_hash = password::hash(new_password)?;
    let result = Entity::update_many()
        .col_expr(Column::PasswordHash, Expr::value(password_hash))
        .filter(Column::Identifier.eq(identifier))
        .exec(db)
        .await?;
    Ok(result.rows_affected > 0)
}

/// Removes the principal together with its role grants and stored tokens.
pub async fn delete_principal(
    db: &DatabaseConnection,
    identifier: &str,
) -> Result<bool, GatekeeperError> {
    let txn = db.begin().await?;

    entities::RoleGrant::delete_many()
        .filter(entities::role_grant::Column::Principal.eq(identifier))
        .exec(&txn)
        .await?;
    entities::Token::delete_many()
        .filter(entities::token::Column::Principal.eq(identifier))
        .exec(&txn)
        .await?;
    let removed = entities::Principal::delete_by_id(identifier.to_string())
        .exec(&txn)
        .await?
        .rows_affected;

    txn.commit().await?;
    Ok(removed > 0)
}

// Clients

pub async fn create_client(
    db: &DatabaseConnection,
    input: NewClient,
) -> Result<Client, GatekeeperError> {
    let identifier = input.identifier.unwrap_or_else(random_id);
    let secret = input.secret.unwrap_or_else(random_id);
    let created_at = Utc::now().timestamp();

    let client = entities::client::ActiveModel {
        identifier: Set(identifier.clone()),
        secret: Set(secret.clone()),
        grant_kind: Set(input.grant_kind.clone()),
        active: Set(1),
        created_at: Set(created_at),
    };
    client.insert(db).await?;

    Ok(Client {
        identifier,
        secret,
        grant_kind: input.grant_kind,
        active: true,
        created_at,
    })
}

pub async fn get_client(
    db: &DatabaseConnection,
    identifier: &str,
) -> Result<Option<Client>, GatekeeperError> {
    use entities::client::Entity;

    Ok(Entity::find_by_id(identifier.to_string())
        .one(db)
        .await?
        .map(|m| Client {
            identifier: m.identifier,
            secret: m.secret,
            grant_kind: m.grant_kind,
            active: m.active == 1,
            created_at: m.created_at,
        }))
}

pub async fn update_client(
    db: &DatabaseConnection,
    identifier: &str,
    secret: &str,
    grant_kind: &str,
    active: bool,
) -> Result<bool, GatekeeperError> {
    use entities::client::{Column, Entity};

    let result = Entity::update_many()
        .col_expr(Column::Secret, Expr::value(secret))
        .col_expr(Column::GrantKind, Expr::value(grant_kind))
        .col_expr(Column::Active, Expr::value(active as i64))
        .filter(Column::Identifier.eq(identifier))
        .exec(db)
        .await?;
    Ok(result.rows_affected > 0)
}

pub async fn delete_client(
    db: &DatabaseConnection,
    identifier: &str,
) -> Result<bool, GatekeeperError> {
    let txn = db.begin().await?;

    entities::Token::delete_many()
        .filter(entities::token::Column::Client.eq(identifier))
        .exec(&txn)
        .await?;
    let removed = entities::Client::delete_by_id(identifier.to_string())
        .exec(&txn)
        .await?
        .rows_affected;

    txn.commit().await?;
    Ok(removed > 0)
}

// Roles

pub async fn create_role(db: &DatabaseConnection, input: Named) -> Result<Named, GatekeeperError> {
    let role = entities::role::ActiveModel {
        identifier: Set(input.identifier.clone()),
        name: Set(input.name.clone()),
        description: Set(input.description.clone()),
        created_at: Set(Utc::now().timestamp()),
    };
    role.insert(db).await?;
    Ok(input)
}

pub async fn get_role(
    db: &DatabaseConnection,
    identifier: &str,
) -> Result<Option<Named>, GatekeeperError> {
    Ok(entities::Role::find_by_id(identifier.to_string())
        .one(db)
        .await?
        .map(|m| Named {
            identifier: m.identifier,
            name: m.name,
            description: m.description,
        }))
}

pub async fn update_role(db: &DatabaseConnection, input: &Named) -> Result<bool, GatekeeperError> {
    use entities::role::{Column, Entity};

    let result = Entity::update_many()
        .col_expr(Column::Name, Expr::value(input.name.clone()))
        .col_expr(Column::Description, Expr::value(input.description.clone()))
        .filter(Column::Identifier.eq(input.identifier.as_str()))
        .exec(db)
        .await?;
    Ok(result.rows_affected > 0)
}

/// Removes the role along with its permission attachments and grants.
pub async fn delete_role(db: &DatabaseConnection, identifier: &str) -> Result<bool, GatekeeperError> {
    let txn = db.begin().await?;

    entities::RolePermission::delete_many()
        .filter(entities::role_permission::Column::Role.eq(identifier))
        .exec(&txn)
        .await?;
    entities::RoleGrant::delete_many()
        .filter(entities::role_grant::Column::Role.eq(identifier))
        .exec(&txn)
        .await?;
    let removed = entities::Role::delete_by_id(identifier.to_string())
        .exec(&txn)
        .await?
        .rows_affected;

    txn.commit().await?;
    Ok(removed > 0)
}

// Resource types

pub async fn create_resource_type(
    db: &DatabaseConnection,
    input: Named,
) -> Result<Named, GatekeeperError> {
    let resource_type = entities::resource_type::ActiveModel {
        identifier: Set(input.identifier.clone()),
        name: Set(input.name.clone()),
        description: Set(input.description.clone()),
        created_at: Set(Utc::now().timestamp()),
    };
    resource_type.insert(db).await?;
    Ok(input)
}

pub async fn get_resource_type(
    db: &DatabaseConnection,
    identifier: &str,
) -> Result<Option<Named>, GatekeeperError> {
    Ok(entities::ResourceType::find_by_id(identifier.to_string())
        .one(db)
        .await?
        .map(|m| Named {
            identifier: m.identifier,
            name: m.name,
            description: m.description,
        }))
}

pub async fn update_resource_type(
    db: &DatabaseConnection,
    input: &Named,
) -> Result<bool, GatekeeperError> {
    use entities::resource_type::{Column, Entity};

    let result = Entity::update_many()
        .col_expr(Column::Name, Expr::value(input.name.clone()))
        .col_expr(Column::Description, Expr::value(input.description.clone()))
        .filter(Column::Identifier.eq(input.identifier.as_str()))
        .exec(db)
        .await?;
    Ok(result.rows_affected > 0)
}

/// Deleting a resource type leaves the permissions it scoped unscoped.
pub async fn delete_resource_type(
    db: &DatabaseConnection,
    identifier: &str,
) -> Result<bool, GatekeeperError> {
    use entities::permission::Column as PermissionColumn;

    let txn = db.begin().await?;

    entities::Permission::update_many()
        .col_expr(
            PermissionColumn::ResourceType,
            Expr::value(Option::<String>::None),
        )
        .filter(PermissionColumn::ResourceType.eq(identifier))
        .exec(&txn)
        .await?;
    let removed = entities::ResourceType::delete_by_id(identifier.to_string())
        .exec(&txn)
        .await?
        .rows_affected;

    txn.commit().await?;
    Ok(removed > 0)
}

// Resource identifiers

pub async fn get_resource(
    db: &DatabaseConnection,
    identifier: &str,
) -> Result<Option<String>, GatekeeperError> {
    Ok(entities::Resource::find_by_id(identifier.to_string())
        .one(db)
        .await?
        .map(|m| m.identifier))
}

async fn ensure_resource<C: ConnectionTrait>(db: &C, identifier: &str) -> Result<(), GatekeeperError> {
    use entities::resource::{Column, Entity};

    let resource = entities::resource::ActiveModel {
        identifier: Set(identifier.to_string()),
        created_at: Set(Utc::now().timestamp()),
    };
    Entity::insert(resource)
        .on_conflict(OnConflict::column(Column::Identifier).do_nothing().to_owned())
        .exec_without_returning(db)
        .await?;
    Ok(())
}

// Permissions

pub async fn create_permission(
    db: &DatabaseConnection,
    input: Permission,
) -> Result<Permission, GatekeeperError> {
    if let Some(rt) = &input.resource_type {
        require_resource_type(db, rt).await?;
    }
    let permission = entities::permission::ActiveModel {
        identifier: Set(input.identifier.clone()),
        name: Set(input.name.clone()),
        description: Set(input.description.clone()),
        resource_type: Set(input.resource_type.clone()),
        created_at: Set(Utc::now().timestamp()),
    };
    permission.insert(db).await?;
    Ok(input)
}

pub async fn get_permission(
    db: &DatabaseConnection,
    identifier: &str,
) -> Result<Option<Permission>, GatekeeperError> {
    Ok(entities::Permission::find_by_id(identifier.to_string())
        .one(db)
        .await?
        .map(permission_from_model))
}

pub async fn update_permission(
    db: &DatabaseConnection,
    identifier: &str,
    name: &str,
    description: &str,
) -> Result<bool, GatekeeperError> {
    use entities::permission::{Column, Entity};

    let result = Entity::update_many()
        .col_expr(Column::Name, Expr::value(name))
        .col_expr(Column::Description, Expr::value(description))
        .filter(Column::Identifier.eq(identifier))
        .exec(db)
        .await?;
    Ok(result.rows_affected > 0)
}

/// Bind (or with `None`, unbind) the single resource type scoping a permission.
pub async fn set_permission_resource_type(
    db: &DatabaseConnection,
    permission: &str,
    resource_type: Option<&str>,
) -> Result<bool, GatekeeperError> {
    use entities::permission::{Column, Entity};

    if let Some(rt) = resource_type {
        require_resource_type(db, rt).await?;
    }
    let result = Entity::update_many()
        .col_expr(
            Column::ResourceType,
            Expr::value(resource_type.map(str::to_string)),
        )
        .filter(Column::Identifier.eq(permission))
        .exec(db)
        .await?;
    Ok(result.rows_affected > 0)
}

/// Replace the full resource set of a permission.
///
/// Resource identifiers that are not yet known are created on the way.
pub async fn set_permission_resources(
    db: &DatabaseConnection,
    permission: &str,
    resources: &[String],
) -> Result<bool, GatekeeperError> {
    use entities::permission_resource::{Column, Entity};

    let txn = db.begin().await?;

    if entities::Permission::find_by_id(permission.to_string())
        .one(&txn)
        .await?
        .is_none()
    {
        txn.rollback().await?;
        return Ok(false);
    }

    Entity::delete_many()
        .filter(Column::Permission.eq(permission))
        .exec(&txn)
        .await?;

    let unique: BTreeSet<&str> = resources.iter().map(String::as_str).collect();
    for resource in unique {
        ensure_resource(&txn, resource).await?;
        entities::permission_resource::ActiveModel {
            permission: Set(permission.to_string()),
            resource: Set(resource.to_string()),
        }
        .insert(&txn)
        .await?;
    }

    txn.commit().await?;
    Ok(true)
}

pub async fn permission_resources(
    db: &DatabaseConnection,
    permission: &str,
) -> Result<Vec<String>, GatekeeperError> {
    use entities::permission_resource::{Column, Entity};

    Ok(Entity::find()
        .filter(Column::Permission.eq(permission))
        .order_by_asc(Column::Resource)
        .all(db)
        .await?
        .into_iter()
        .map(|m| m.resource)
        .collect())
}

pub async fn permission_has_resource(
    db: &DatabaseConnection,
    permission: &str,
    resource: &str,
) -> Result<bool, GatekeeperError> {
    Ok(entities::PermissionResource::find_by_id((
        permission.to_string(),
        resource.to_string(),
    ))
    .one(db)
    .await?
    .is_some())
}

pub async fn delete_permission(
    db: &DatabaseConnection,
    identifier: &str,
) -> Result<bool, GatekeeperError> {
    let txn = db.begin().await?;

    entities::RolePermission::delete_many()
        .filter(entities::role_permission::Column::Permission.eq(identifier))
        .exec(&txn)
        .await?;
    entities::PermissionResource::delete_many()
        .filter(entities::permission_resource::Column::Permission.eq(identifier))
        .exec(&txn)
        .await?;
    let removed = entities::Permission::delete_by_id(identifier.to_string())
        .exec(&txn)
        .await?
        .rows_affected;

    txn.commit().await?;
    Ok(removed > 0)
}

// Role <-> permission

pub async fn attach_permission_to_role(
    db: &DatabaseConnection,
    role: &str,
    permission: &str,
) -> Result<(), GatekeeperError> {
    use entities::role_permission::{Column, Entity};

    if get_role(db, role).await?.is_none() {
        return Err(GatekeeperError::InvalidInput(format!("unknown role '{role}'")));
    }
    if get_permission(db, permission).await?.is_none() {
        return Err(GatekeeperError::InvalidInput(format!(
            "unknown permission '{permission}'"
        )));
    }

    let link = entities::role_permission::ActiveModel {
        role: Set(role.to_string()),
        permission: Set(permission.to_string()),
    };
    Entity::insert(link)
        .on_conflict(
            OnConflict::columns([Column::Role, Column::Permission])
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(db)
        .await?;
    Ok(())
}

pub async fn detach_permission_from_role(
    db: &DatabaseConnection,
    role: &str,
    permission: &str,
) -> Result<bool, GatekeeperError> {
    let result = entities::RolePermission::delete_by_id((role.to_string(), permission.to_string()))
        .exec(db)
        .await?;
    Ok(result.rows_affected > 0)
}

pub async fn role_permissions(
    db: &DatabaseConnection,
    role: &str,
) -> Result<Vec<String>, GatekeeperError> {
    use entities::role_permission::{Column, Entity};

    Ok(Entity::find()
        .filter(Column::Role.eq(role))
        .order_by_asc(Column::Permission)
        .all(db)
        .await?
        .into_iter()
        .map(|m| m.permission)
        .collect())
}

pub async fn role_has_permission(
    db: &DatabaseConnection,
    role: &str,
    permission: &str,
) -> Result<bool, GatekeeperError> {
    Ok(
        entities::RolePermission::find_by_id((role.to_string(), permission.to_string()))
            .one(db)
            .await?
            .is_some(),
    )
}

/// Distinct permissions carried by any of `roles`, ordered by identifier.
pub async fn permissions_for_roles(
    db: &DatabaseConnection,
    roles: &[String],
) -> Result<Vec<Permission>, GatekeeperError> {
    use entities::permission::Column as PermissionColumn;
    use entities::role_permission::Column as LinkColumn;

    if roles.is_empty() {
        return Ok(Vec::new());
    }

    let ids: BTreeSet<String> = entities::RolePermission::find()
        .filter(LinkColumn::Role.is_in(roles.iter().cloned()))
        .all(db)
        .await?
        .into_iter()
        .map(|m| m.permission)
        .collect();
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    Ok(entities::Permission::find()
        .filter(PermissionColumn::Identifier.is_in(ids))
        .order_by_asc(PermissionColumn::Identifier)
        .all(db)
        .await?
        .into_iter()
        .map(permission_from_model)
        .collect())
}

// Role grants

/// Idempotent: granting an already held role is not an error.
pub async fn insert_role_grant(
    db: &DatabaseConnection,
    role: &str,
    principal: &str,
) -> Result<(), GatekeeperError> {
    use entities::role_grant::{Column, Entity};

    let grant = entities::role_grant::ActiveModel {
        role: Set(role.to_string()),
        principal: Set(principal.to_string()),
        granted_at: Set(Utc::now().timestamp()),
    };
    Entity::insert(grant)
        .on_conflict(
            OnConflict::columns([Column::Role, Column::Principal])
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(db)
        .await?;
    Ok(())
}

pub async fn delete_role_grant(
    db: &DatabaseConnection,
    role: &str,
    principal: &str,
) -> Result<bool, GatekeeperError> {
    let result = entities::RoleGrant::delete_by_id((role.to_string(), principal.to_string()))
        .exec(db)
        .await?;
    Ok(result.rows_affected > 0)
}

pub async fn roles_for_principal(
    db: &DatabaseConnection,
    principal: &str,
) -> Result<Vec<String>, GatekeeperError> {
    use entities::role_grant::{Column, Entity};

    Ok(Entity::find()
        .filter(Column::Principal.eq(principal))
        .order_by_asc(Column::Role)
        .all(db)
        .await?
        .into_iter()
        .map(|m| m.role)
        .collect())
}

// Tokens

pub async fn insert_token(db: &DatabaseConnection, token: &Token) -> Result<(), GatekeeperError> {
    token_active_model(token).insert(db).await?;
    Ok(())
}

pub async fn find_token_by_access(
    db: &DatabaseConnection,
    access_token: &str,
) -> Result<Option<Token>, GatekeeperError> {
    Ok(entities::Token::find_by_id(access_token.to_string())
        .one(db)
        .await?
        .map(token_from_model))
}

pub async fn find_token_by_refresh(
    db: &DatabaseConnection,
    refresh_token: &str,
) -> Result<Option<Token>, GatekeeperError> {
    use entities::token::{Column, Entity};

    Ok(Entity::find()
        .filter(Column::RefreshToken.eq(refresh_token))
        .one(db)
        .await?
        .map(token_from_model))
}

/// Returns the number of rows removed (0 or 1).
pub async fn delete_token_by_access(
    db: &DatabaseConnection,
    access_token: &str,
) -> Result<u64, GatekeeperError> {
    let result = entities::Token::delete_by_id(access_token.to_string())
        .exec(db)
        .await?;
    Ok(result.rows_affected)
}

/// Atomically consume `old_refresh` and store `replacement` in its place.
///
/// Returns false, leaving the store untouched, when `old_refresh` was not
/// present. Of two concurrent calls with the same value at most one sees true.
pub async fn rotate_token(
    db: &DatabaseConnection,
    old_refresh: &str,
    replacement: &Token,
) -> Result<bool, GatekeeperError> {
    use entities::token::{Column, Entity};

    let txn = db.begin().await?;

    let removed = Entity::delete_many()
        .filter(Column::RefreshToken.eq(old_refresh))
        .exec(&txn)
        .await?
        .rows_affected;
    if removed == 0 {
        txn.rollback().await?;
        return Ok(false);
    }

    token_active_model(replacement).insert(&txn).await?;
    txn.commit().await?;
    Ok(true)
}

// Helpers

pub fn random_id() -> String {
    random_token(24)
}

/// `len` random bytes, base64url without padding.
pub fn random_token(len: usize) -> String {
    let mut bytes = vec![0u8; len];
    rand::thread_rng().fill_bytes(&mut bytes);
    base64ct::Base64UrlUnpadded::encode_string(&bytes)
}

async fn require_resource_type(db: &DatabaseConnection, identifier: &str) -> Result<(), GatekeeperError> {
    if get_resource_type(db, identifier).await?.is_none() {
        return Err(GatekeeperError::InvalidInput(format!(
            "unknown resource type '{identifier}'"
        )));
    }
    Ok(())
}

fn permission_from_model(m: entities::permission::Model) -> Permission {
    Permission {
        identifier: m.identifier,
        name: m.name,
        description: m.description,
        resource_type: m.resource_type,
    }
}

fn token_from_model(m: entities::token::Model) -> Token {
    Token {
        access_token: m.access_token,
        refresh_token: m.refresh_token,
        principal: m.principal,
        client: m.client,
        expires_at: m.expires_at,
        created_at: m.created_at,
    }
}

fn token_active_model(token: &Token) -> entities::token::ActiveModel {
    entities::token::ActiveModel {
        access_token: Set(token.access_token.clone()),
        refresh_token: Set(token.refresh_token.clone()),
        principal: Set(token.principal.clone()),
        client: Set(token.client.clone()),
        expires_at: Set(token.expires_at),
        created_at: Set(token.created_at),
    }
}
