use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Movies::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Movies::ExternalId)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Movies::Title).string().not_null())
                    .col(ColumnDef::new(Movies::ReleaseYear).string().not_null())
                    .col(ColumnDef::new(Movies::Director).string())
                    .col(ColumnDef::new(Movies::Plot).text())
                    .col(ColumnDef::new(Movies::PosterUrl).string())
                    .col(ColumnDef::new(Movies::UpdatedAt).string().not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Movies::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Movies {
    Table,
    ExternalId,
    Title,
    ReleaseYear,
    Director,
    Plot,
    PosterUrl,
    UpdatedAt,
}
