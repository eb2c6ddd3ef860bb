//! Directory bootstrap: the first-run administrator and idempotent sync of a
//! JSON directory file (`--seed` / `bootstrap.seed_file`).

use crate::password;
use crate::settings::Bootstrap;
use crate::storage::{self, Named, NewClient, NewPrincipal, Permission};
use chrono::Utc;
use miette::{IntoDiagnostic, Result};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

const FIRST_RUN_KEY: &str = "first_run";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrincipalDefinition {
    pub identifier: String,
    /// Plain text password (will be hashed)
    pub password: String,
    #[serde(default = "default_true")]
    pub active: bool,
    #[serde(default)]
    pub admin: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientDefinition {
    pub identifier: String,
    pub secret: String,
    #[serde(default = "default_grant_kind")]
    pub grant_kind: String,
    #[serde(default = "default_true")]
    pub active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceTypeDefinition {
    pub identifier: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PermissionDefinition {
    pub identifier: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub resource_type: Option<String>,
    /// Replaces the permission's resource set. Identifiers are created as needed.
    #[serde(default)]
    pub resources: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleDefinition {
    pub identifier: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub permissions: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrantDefinition {
    pub role: String,
    pub principal: String,
}

/// Root structure of the directory JSON file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DirectoryFile {
    #[serde(default)]
    pub principals: Vec<PrincipalDefinition>,
    #[serde(default)]
    pub clients: Vec<ClientDefinition>,
    #[serde(default)]
    pub resource_types: Vec<ResourceTypeDefinition>,
    #[serde(default)]
    pub permissions: Vec<PermissionDefinition>,
    #[serde(default)]
    pub roles: Vec<RoleDefinition>,
    #[serde(default)]
    pub grants: Vec<GrantDefinition>,
}

fn default_true() -> bool {
    true
}

fn default_grant_kind() -> String {
    "password".to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SyncResult {
    Created,
    Updated,
    Unchanged,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncSummary {
    pub created: usize,
    pub updated: usize,
    pub unchanged: usize,
}

impl SyncSummary {
    fn record(&mut self, result: SyncResult) {
        match result {
            SyncResult::Created => self.created += 1,
            SyncResult::Updated => self.updated += 1,
            SyncResult::Unchanged => self.unchanged += 1,
        }
    }
}

/// Sync a directory file into the database (idempotent)
pub async fn sync_directory_from_file(db: &DatabaseConnection, path: &Path) -> Result<SyncSummary> {
    tracing::info!(path = %path.display(), "Loading directory file");

    let content = fs::read_to_string(path).map_err(|e| {
        miette::miette!("Failed to read directory file at '{}': {}", path.display(), e)
    })?;
    let directory: DirectoryFile = serde_json::from_str(&content).map_err(|e| {
        miette::miette!(
            code = "gatekeeper::seed",
            help = "Expected an object with optional `principals`, `clients`, `resource_types`, `permissions`, `roles` and `grants` arrays",
            "Failed to parse directory file: {}",
            e
        )
    })?;

    sync_directory(db, &directory).await
}

/// Sync every section in dependency order: resource types before the
/// permissions that reference them, permissions before roles, and roles and
/// principals before grants.
pub async fn sync_directory(db: &DatabaseConnection, directory: &DirectoryFile) -> Result<SyncSummary> {
    let mut summary = SyncSummary::default();

    for def in &directory.principals {
        summary.record(sync_principal(db, def).await?);
    }
    for def in &directory.clients {
        summary.record(sync_client(db, def).await?);
    }
    for def in &directory.resource_types {
        summary.record(sync_resource_type(db, def).await?);
    }
    for def in &directory.permissions {
        summary.record(sync_permission(db, def).await?);
    }
    for def in &directory.roles {
        summary.record(sync_role(db, def).await?);
    }
    for def in &directory.grants {
        summary.record(sync_grant(db, def).await?);
    }

    tracing::info!(
        created = summary.created,
        updated = summary.updated,
        unchanged = summary.unchanged,
        "Directory sync complete"
    );
    Ok(summary)
}

async fn sync_principal(db: &DatabaseConnection, def: &PrincipalDefinition) -> Result<SyncResult> {
    let Some(existing) = storage::get_principal(db, &def.identifier)
        .await
        .into_diagnostic()?
    else {
        tracing::info!(principal = %def.identifier, "Creating principal");
        storage::create_principal(
            db,
            NewPrincipal {
                identifier: def.identifier.clone(),
                password: def.password.clone(),
                is_admin: def.admin,
            },
        )
        .await
        .into_diagnostic()?;
        if !def.active {
            storage::set_principal_active(db, &def.identifier, false)
                .await
                .into_diagnostic()?;
        }
        return Ok(SyncResult::Created);
    };

    let mut changed = false;
    if existing.active != def.active {
        storage::set_principal_active(db, &def.identifier, def.active)
            .await
            .into_diagnostic()?;
        changed = true;
    }
    if existing.is_admin != def.admin {
        storage::set_principal_admin(db, &def.identifier, def.admin)
            .await
            .into_diagnostic()?;
        changed = true;
    }
    if !password::verify(&def.password, &existing.password_hash).unwrap_or(false) {
        storage::set_principal_password(db, &def.identifier, &def.password)
            .await
            .into_diagnostic()?;
        changed = true;
    }

    if changed {
        tracing::info!(principal = %def.identifier, "Updated principal");
        Ok(SyncResult::Updated)
    } else {
        Ok(SyncResult::Unchanged)
    }
}

async fn sync_client(db: &DatabaseConnection, def: &ClientDefinition) -> Result<SyncResult> {
    match storage::get_client(db, &def.identifier)
        .await
        .into_diagnostic()?
    {
        None => {
            tracing::info!(client = %def.identifier, "Creating client");
            storage::create_client(
                db,
                NewClient {
                    identifier: Some(def.identifier.clone()),
                    secret: Some(def.secret.clone()),
                    grant_kind: def.grant_kind.clone(),
                },
            )
            .await
            .into_diagnostic()?;
            if !def.active {
                storage::update_client(db, &def.identifier, &def.secret, &def.grant_kind, false)
                    .await
                    .into_diagnostic()?;
            }
            Ok(SyncResult::Created)
        }
        Some(existing)
            if existing.secret != def.secret
                || existing.grant_kind != def.grant_kind
                || existing.active != def.active =>
        {
            tracing::info!(client = %def.identifier, "Updating client");
            storage::update_client(
                db,
                &def.identifier,
                &def.secret,
                &def.grant_kind,
                def.active,
            )
            .await
            .into_diagnostic()?;
            Ok(SyncResult::Updated)
        }
        Some(_) => Ok(SyncResult::Unchanged),
    }
}

async fn sync_resource_type(
    db: &DatabaseConnection,
    def: &ResourceTypeDefinition,
) -> Result<SyncResult> {
    let wanted = Named {
        identifier: def.identifier.clone(),
        name: def.name.clone().unwrap_or_else(|| def.identifier.clone()),
        description: def.description.clone(),
    };
    match storage::get_resource_type(db, &def.identifier)
        .await
        .into_diagnostic()?
    {
        None => {
            tracing::info!(resource_type = %def.identifier, "Creating resource type");
            storage::create_resource_type(db, wanted)
                .await
                .into_diagnostic()?;
            Ok(SyncResult::Created)
        }
        Some(existing) if existing != wanted => {
            storage::update_resource_type(db, &wanted)
                .await
                .into_diagnostic()?;
            Ok(SyncResult::Updated)
        }
        Some(_) => Ok(SyncResult::Unchanged),
    }
}

async fn sync_permission(db: &DatabaseConnection, def: &PermissionDefinition) -> Result<SyncResult> {
    let wanted = Permission {
        identifier: def.identifier.clone(),
        name: def.name.clone().unwrap_or_else(|| def.identifier.clone()),
        description: def.description.clone(),
        resource_type: def.resource_type.clone(),
    };

    let mut result = match storage::get_permission(db, &def.identifier)
        .await
        .into_diagnostic()?
    {
        None => {
            tracing::info!(permission = %def.identifier, "Creating permission");
            storage::create_permission(db, wanted)
                .await
                .into_diagnostic()?;
            SyncResult::Created
        }
        Some(existing) if existing != wanted => {
            storage::update_permission(db, &wanted.identifier, &wanted.name, &wanted.description)
                .await
                .into_diagnostic()?;
            if existing.resource_type != wanted.resource_type {
                storage::set_permission_resource_type(
                    db,
                    &wanted.identifier,
                    wanted.resource_type.as_deref(),
                )
                .await
                .into_diagnostic()?;
            }
            SyncResult::Updated
        }
        Some(_) => SyncResult::Unchanged,
    };

    let current: BTreeSet<String> = storage::permission_resources(db, &def.identifier)
        .await
        .into_diagnostic()?
        .into_iter()
        .collect();
    let desired: BTreeSet<String> = def.resources.iter().cloned().collect();
    if current != desired {
        storage::set_permission_resources(db, &def.identifier, &def.resources)
            .await
            .into_diagnostic()?;
        if result == SyncResult::Unchanged {
            result = SyncResult::Updated;
        }
    }

    Ok(result)
}

async fn sync_role(db: &DatabaseConnection, def: &RoleDefinition) -> Result<SyncResult> {
    let wanted = Named {
        identifier: def.identifier.clone(),
        name: def.name.clone().unwrap_or_else(|| def.identifier.clone()),
        description: def.description.clone(),
    };

    let mut result = match storage::get_role(db, &def.identifier)
        .await
        .into_diagnostic()?
    {
        None => {
            tracing::info!(role = %def.identifier, "Creating role");
            storage::create_role(db, wanted).await.into_diagnostic()?;
            SyncResult::Created
        }
        Some(existing) if existing != wanted => {
            storage::update_role(db, &wanted).await.into_diagnostic()?;
            SyncResult::Updated
        }
        Some(_) => SyncResult::Unchanged,
    };

    // The file is authoritative for a role's permission set.
    let current: BTreeSet<String> = storage::role_permissions(db, &def.identifier)
        .await
        .into_diagnostic()?
        .into_iter()
        .collect();
    let desired: BTreeSet<String> = def.permissions.iter().cloned().collect();

    for permission in desired.difference(&current) {
        storage::attach_permission_to_role(db, &def.identifier, permission)
            .await
            .into_diagnostic()?;
    }
    for permission in current.difference(&desired) {
        storage::detach_permission_from_role(db, &def.identifier, permission)
            .await
            .into_diagnostic()?;
    }
    if current != desired && result == SyncResult::Unchanged {
        result = SyncResult::Updated;
    }

    Ok(result)
}

async fn sync_grant(db: &DatabaseConnection, def: &GrantDefinition) -> Result<SyncResult> {
    let held = storage::roles_for_principal(db, &def.principal)
        .await
        .into_diagnostic()?;
    if held.iter().any(|r| r == &def.role) {
        return Ok(SyncResult::Unchanged);
    }
    crate::rbac::grants::grant(db, &def.role, &def.principal)
        .await
        .into_diagnostic()?;
    Ok(SyncResult::Created)
}

/// Create the configured administrator on first run.
///
/// Does nothing once `first_run` has been recorded, or when no administrator
/// is configured.
pub async fn ensure_superuser(db: &DatabaseConnection, cfg: &Bootstrap) -> Result<()> {
    if storage::get_config_value(db, FIRST_RUN_KEY)
        .await
        .into_diagnostic()?
        .is_some()
    {
        return Ok(());
    }

    let (Some(identifier), Some(password)) = (&cfg.admin_identifier, &cfg.admin_password) else {
        tracing::warn!(
            "No administrator configured; set bootstrap.admin_identifier and bootstrap.admin_password"
        );
        return Ok(());
    };
    validate_superuser(identifier, password)?;

    match storage::get_principal(db, identifier)
        .await
        .into_diagnostic()?
    {
        Some(existing) if existing.is_admin => {}
        Some(_) => {
            storage::set_principal_admin(db, identifier, true)
                .await
                .into_diagnostic()?;
            tracing::info!(principal = %identifier, "Promoted existing principal to administrator");
        }
        None => {
            storage::create_principal(
                db,
                NewPrincipal {
                    identifier: identifier.clone(),
                    password: password.clone(),
                    is_admin: true,
                },
            )
            .await
            .into_diagnostic()?;
            tracing::info!(principal = %identifier, "Created administrator");
        }
    }

    storage::set_config_value(db, FIRST_RUN_KEY, &Value::from(Utc::now().timestamp()))
        .await
        .into_diagnostic()?;
    Ok(())
}

fn validate_superuser(identifier: &str, password: &str) -> Result<()> {
    let id_len = identifier.chars().count();
    if !(3..=100).contains(&id_len) {
        return Err(miette::miette!(
            code = "gatekeeper::bootstrap",
            "administrator identifier must be 3 to 100 characters, got {}",
            id_len
        ));
    }
    let pw_len = password.chars().count();
    if !(8..=100).contains(&pw_len) {
        return Err(miette::miette!(
            code = "gatekeeper::bootstrap",
            "administrator password must be 8 to 100 characters"
        ));
    }
    Ok(())
}
