pub mod client;
pub mod config_entry;
pub mod permission;
pub mod permission_resource;
pub mod principal;
pub mod resource;
pub mod resource_type;
pub mod role;
pub mod role_grant;
pub mod role_permission;
pub mod token;

pub use client::Entity as Client;
pub use config_entry::Entity as ConfigEntry;
pub use permission::Entity as Permission;
pub use permission_resource::Entity as PermissionResource;
pub use principal::Entity as Principal;
pub use resource::Entity as Resource;
pub use resource_type::Entity as ResourceType;
pub use role::Entity as Role;
pub use role_grant::Entity as RoleGrant;
pub use role_permission::Entity as RolePermission;
pub use token::Entity as Token;
