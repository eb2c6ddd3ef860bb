use gatekeeper::storage::{self, Client, Named, NewClient, NewPrincipal, Permission, Principal};
use sea_orm::DatabaseConnection;

/// Builder for creating test principals
pub struct PrincipalBuilder {
    identifier: String,
    password: String,
    active: bool,
    admin: bool,
}

impl PrincipalBuilder {
    pub fn new(identifier: &str) -> Self {
        Self {
            identifier: identifier.to_string(),
            password: "password123".to_string(),
            active: true,
            admin: false,
        }
    }

    pub fn with_password(mut self, password: &str) -> Self {
        self.password = password.to_string();
        self
    }

    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }

    pub fn admin(mut self) -> Self {
        self.admin = true;
        self
    }

    pub async fn create(self, db: &DatabaseConnection) -> Principal {
        let mut principal = storage::create_principal(
            db,
            NewPrincipal {
                identifier: self.identifier.clone(),
                password: self.password,
                is_admin: self.admin,
            },
        )
        .await
        .expect("Failed to create test principal");

        if !self.active {
            storage::set_principal_active(db, &self.identifier, false)
                .await
                .expect("Failed to deactivate principal");
            principal.active = false;
        }
        principal
    }
}

/// Builder for creating test clients
pub struct ClientBuilder {
    identifier: String,
    secret: String,
    grant_kind: String,
    active: bool,
}

impl ClientBuilder {
    pub fn new(identifier: &str) -> Self {
        Self {
            identifier: identifier.to_string(),
            secret: "client-secret".to_string(),
            grant_kind: "password".to_string(),
            active: true,
        }
    }

    pub fn with_secret(mut self, secret: &str) -> Self {
        self.secret = secret.to_string();
        self
    }

    pub fn with_grant_kind(mut self, grant_kind: &str) -> Self {
        self.grant_kind = grant_kind.to_string();
        self
    }

    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }

    pub async fn create(self, db: &DatabaseConnection) -> Client {
        let mut client = storage::create_client(
            db,
            NewClient {
                identifier: Some(self.identifier.clone()),
                secret: Some(self.secret.clone()),
                grant_kind: self.grant_kind.clone(),
            },
        )
        .await
        .expect("Failed to create test client");

        if !self.active {
            storage::update_client(db, &self.identifier, &self.secret, &self.grant_kind, false)
                .await
                .expect("Failed to deactivate client");
            client.active = false;
        }
        client
    }
}

/// Builder for creating test permissions, with their resource type and
/// resource identifiers
pub struct PermissionBuilder {
    identifier: String,
    resource_type: Option<String>,
    resources: Vec<String>,
}

impl PermissionBuilder {
    pub fn new(identifier: &str) -> Self {
        Self {
            identifier: identifier.to_string(),
            resource_type: None,
            resources: Vec::new(),
        }
    }

    /// Creates the resource type too when it does not exist yet.
    pub fn with_resource_type(mut self, resource_type: &str) -> Self {
        self.resource_type = Some(resource_type.to_string());
        self
    }

    pub fn with_resource(mut self, resource: &str) -> Self {
        self.resources.push(resource.to_string());
        self
    }

    pub async fn create(self, db: &DatabaseConnection) -> Permission {
        if let Some(rt) = &self.resource_type {
            ensure_resource_type(db, rt).await;
        }
        let permission = storage::create_permission(
            db,
            Permission {
                identifier: self.identifier.clone(),
                name: self.identifier.clone(),
                description: String::new(),
                resource_type: self.resource_type,
            },
        )
        .await
        .expect("Failed to create test permission");

        if !self.resources.is_empty() {
            storage::set_permission_resources(db, &self.identifier, &self.resources)
                .await
                .expect("Failed to bind resources");
        }
        permission
    }
}

/// Builder for creating test roles carrying a set of existing permissions
pub struct RoleBuilder {
    identifier: String,
    permissions: Vec<String>,
}

impl RoleBuilder {
    pub fn new(identifier: &str) -> Self {
        Self {
            identifier: identifier.to_string(),
            permissions: Vec::new(),
        }
    }

    pub fn with_permission(mut self, permission: &str) -> Self {
        self.permissions.push(permission.to_string());
        self
    }

    pub async fn create(self, db: &DatabaseConnection) -> Named {
        let role = storage::create_role(
            db,
            Named {
                identifier: self.identifier.clone(),
                name: self.identifier.clone(),
                description: String::new(),
            },
        )
        .await
        .expect("Failed to create test role");

        for permission in &self.permissions {
            storage::attach_permission_to_role(db, &self.identifier, permission)
                .await
                .expect("Failed to attach permission");
        }
        role
    }
}

pub async fn ensure_resource_type(db: &DatabaseConnection, identifier: &str) {
    if storage::get_resource_type(db, identifier)
        .await
        .expect("Failed to query resource type")
        .is_none()
    {
        storage::create_resource_type(
            db,
            Named {
                identifier: identifier.to_string(),
                name: identifier.to_string(),
                description: String::new(),
            },
        )
        .await
        .expect("Failed to create resource type");
    }
}
