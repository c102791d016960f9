use sea_orm_migration::{prelude::*, schema::*};

use super::m20250301_000001_create_users::User;
use super::m20250301_000003_create_performances::Performance;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Reservation::Table)
                    .if_not_exists()
                    .col(pk_auto(Reservation::Id))
                    .col(uuid(Reservation::UserId).not_null())
                    .col(
                        timestamp_with_time_zone(Reservation::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_reservation_user")
                            .from(Reservation::Table, Reservation::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Ticket::Table)
                    .if_not_exists()
                    .col(pk_auto(Ticket::Id))
                    .col(integer(Ticket::Row).not_null())
                    .col(integer(Ticket::Seat).not_null())
                    .col(integer(Ticket::PerformanceId).not_null())
                    .col(integer(Ticket::ReservationId).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_ticket_performance")
                            .from(Ticket::Table, Ticket::PerformanceId)
                            .to(Performance::Table, Performance::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_ticket_reservation")
                            .from(Ticket::Table, Ticket::ReservationId)
                            .to(Reservation::Table, Reservation::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // The booking workflow's existence check is advisory; this index is
        // what actually guarantees one ticket per seat per performance.
        manager
            .create_index(
                Index::create()
                    .name("uq_ticket_performance_row_seat")
                    .table(Ticket::Table)
                    .col(Ticket::PerformanceId)
                    .col(Ticket::Row)
                    .col(Ticket::Seat)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("uq_ticket_performance_row_seat")
                    .table(Ticket::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().table(Ticket::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Reservation::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Reservation {
    Table,
    Id,
    UserId,
    CreatedAt,
}

#[derive(DeriveIden)]
pub enum Ticket {
    Table,
    Id,
    Row,
    Seat,
    PerformanceId,
    ReservationId,
}
