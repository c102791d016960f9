use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Genre::Table)
                    .if_not_exists()
                    .col(pk_auto(Genre::Id))
                    .col(string_len(Genre::Name, 100).not_null().unique_key())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Actor::Table)
                    .if_not_exists()
                    .col(pk_auto(Actor::Id))
                    .col(string_len(Actor::FirstName, 100).not_null())
                    .col(string_len(Actor::LastName, 100).not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Play::Table)
                    .if_not_exists()
                    .col(pk_auto(Play::Id))
                    .col(string_len(Play::Title, 255).not_null())
                    .col(text(Play::Description).not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(PlayGenre::Table)
                    .if_not_exists()
                    .col(integer(PlayGenre::PlayId).not_null())
                    .col(integer(PlayGenre::GenreId).not_null())
                    .primary_key(
                        Index::create()
                            .col(PlayGenre::PlayId)
                            .col(PlayGenre::GenreId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_play_genre_play")
                            .from(PlayGenre::Table, PlayGenre::PlayId)
                            .to(Play::Table, Play::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_play_genre_genre")
                            .from(PlayGenre::Table, PlayGenre::GenreId)
                            .to(Genre::Table, Genre::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(PlayActor::Table)
                    .if_not_exists()
                    .col(integer(PlayActor::PlayId).not_null())
                    .col(integer(PlayActor::ActorId).not_null())
                    .primary_key(
                        Index::create()
                            .col(PlayActor::PlayId)
                            .col(PlayActor::ActorId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_play_actor_play")
                            .from(PlayActor::Table, PlayActor::PlayId)
                            .to(Play::Table, Play::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_play_actor_actor")
                            .from(PlayActor::Table, PlayActor::ActorId)
                            .to(Actor::Table, Actor::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(TheatreHall::Table)
                    .if_not_exists()
                    .col(pk_auto(TheatreHall::Id))
                    .col(string_len(TheatreHall::Name, 100).not_null())
                    .col(
                        integer(TheatreHall::Rows)
                            .not_null()
                            .check(Expr::col(TheatreHall::Rows).gt(0)),
                    )
                    .col(
                        integer(TheatreHall::SeatsInRow)
                            .not_null()
                            .check(Expr::col(TheatreHall::SeatsInRow).gt(0)),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TheatreHall::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(PlayActor::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(PlayGenre::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Play::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Actor::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Genre::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Genre {
    Table,
    Id,
    Name,
}

#[derive(DeriveIden)]
pub enum Actor {
    Table,
    Id,
    FirstName,
    LastName,
}

#[derive(DeriveIden)]
pub enum Play {
    Table,
    Id,
    Title,
    Description,
}

#[derive(DeriveIden)]
pub enum PlayGenre {
    Table,
    PlayId,
    GenreId,
}

#[derive(DeriveIden)]
pub enum PlayActor {
    Table,
    PlayId,
    ActorId,
}

#[derive(DeriveIden)]
pub enum TheatreHall {
    Table,
    Id,
    Name,
    Rows,
    SeatsInRow,
}
