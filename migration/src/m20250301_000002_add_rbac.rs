use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Roles::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Roles::Identifier)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(string(Roles::Name))
                    .col(string(Roles::Description))
                    .col(big_integer(Roles::CreatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ResourceTypes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ResourceTypes::Identifier)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(string(ResourceTypes::Name))
                    .col(string(ResourceTypes::Description))
                    .col(big_integer(ResourceTypes::CreatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Permissions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Permissions::Identifier)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(string(Permissions::Name))
                    .col(string(Permissions::Description))
                    .col(string_null(Permissions::ResourceType))
                    .col(big_integer(Permissions::CreatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ResourceIdentifiers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ResourceIdentifiers::Identifier)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(big_integer(ResourceIdentifiers::CreatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(RolePermissions::Table)
                    .if_not_exists()
                    .col(string(RolePermissions::Role))
                    .col(string(RolePermissions::Permission))
                    .primary_key(
                        Index::create()
                            .col(RolePermissions::Role)
                            .col(RolePermissions::Permission),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(RoleGrants::Table)
                    .if_not_exists()
                    .col(string(RoleGrants::Role))
                    .col(string(RoleGrants::Principal))
                    .col(big_integer(RoleGrants::GrantedAt))
                    .primary_key(
                        Index::create()
                            .col(RoleGrants::Role)
                            .col(RoleGrants::Principal),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_role_grants_principal")
                    .table(RoleGrants::Table)
                    .col(RoleGrants::Principal)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(PermissionResources::Table)
                    .if_not_exists()
                    .col(string(PermissionResources::Permission))
                    .col(string(PermissionResources::Resource))
                    .primary_key(
                        Index::create()
                            .col(PermissionResources::Permission)
                            .col(PermissionResources::Resource),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PermissionResources::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(RoleGrants::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(RolePermissions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ResourceIdentifiers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Permissions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ResourceTypes::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Roles::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Roles {
    Table,
    Identifier,
    Name,
    Description,
    CreatedAt,
}

#[derive(DeriveIden)]
enum ResourceTypes {
    Table,
    Identifier,
    Name,
    Description,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Permissions {
    Table,
    Identifier,
    Name,
    Description,
    ResourceType,
    CreatedAt,
}

#[derive(DeriveIden)]
enum ResourceIdentifiers {
    Table,
    Identifier,
    CreatedAt,
}

#[derive(DeriveIden)]
enum RolePermissions {
    Table,
    Role,
    Permission,
}

#[derive(DeriveIden)]
enum RoleGrants {
    Table,
    Role,
    Principal,
    GrantedAt,
}

#[derive(DeriveIden)]
enum PermissionResources {
    Table,
    Permission,
    Resource,
}
