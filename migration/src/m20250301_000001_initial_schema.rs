use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Principals::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Principals::Identifier)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(string(Principals::PasswordHash))
                    .col(
                        ColumnDef::new(Principals::Active)
                            .big_integer()
                            .not_null()
                            .default(1),
                    )
                    .col(
                        ColumnDef::new(Principals::IsAdmin)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(big_integer(Principals::CreatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Clients::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Clients::Identifier)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(string(Clients::Secret))
                    .col(string(Clients::GrantKind))
                    .col(
                        ColumnDef::new(Clients::Active)
                            .big_integer()
                            .not_null()
                            .default(1),
                    )
                    .col(big_integer(Clients::CreatedAt))
                    .to_owned(),
            )
            .await?;

        // The unique refresh value is what makes rotation single-use.
        manager
            .create_table(
                Table::create()
                    .table(Tokens::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Tokens::AccessToken)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Tokens::RefreshToken)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(string(Tokens::Principal))
                    .col(string(Tokens::Client))
                    .col(big_integer(Tokens::ExpiresAt))
                    .col(big_integer(Tokens::CreatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_tokens_principal")
                    .table(Tokens::Table)
                    .col(Tokens::Principal)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ConfigEntries::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ConfigEntries::Key)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(string(ConfigEntries::Value))
                    .col(big_integer(ConfigEntries::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ConfigEntries::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Tokens::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Clients::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Principals::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Principals {
    Table,
    Identifier,
    PasswordHash,
    Active,
    IsAdmin,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Clients {
    Table,
    Identifier,
    Secret,
    GrantKind,
    Active,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Tokens {
    Table,
    AccessToken,
    RefreshToken,
    Principal,
    Client,
    ExpiresAt,
    CreatedAt,
}

#[derive(DeriveIden)]
enum ConfigEntries {
    Table,
    Key,
    Value,
    UpdatedAt,
}
