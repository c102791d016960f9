use sea_orm_migration::{prelude::*, schema::*};

use super::m20250301_000002_create_catalog::{Play, TheatreHall};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Performance::Table)
                    .if_not_exists()
                    .col(pk_auto(Performance::Id))
                    .col(integer(Performance::PlayId).not_null())
                    .col(integer(Performance::TheatreHallId).not_null())
                    .col(timestamp_with_time_zone(Performance::ShowTime).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_performance_play")
                            .from(Performance::Table, Performance::PlayId)
                            .to(Play::Table, Play::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_performance_theatre_hall")
                            .from(Performance::Table, Performance::TheatreHallId)
                            .to(TheatreHall::Table, TheatreHall::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Performance::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Performance {
    Table,
    Id,
    PlayId,
    TheatreHallId,
    ShowTime,
}
