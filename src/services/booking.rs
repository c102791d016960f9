use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, Set, SqlErr, TransactionTrait,
};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::entities::{performance, reservation, theatre_hall, ticket};
use crate::error::AppError;

/// Errors the booking workflow can report to a caller. Both the API handler
/// and the form handler consume this one taxonomy, so the two paths cannot
/// drift apart in what they accept or reject.
#[derive(Debug, Error)]
pub enum BookingError {
    #[error("Performance not found")]
    PerformanceNotFound,
    #[error("This seat is already booked.")]
    SeatTaken,
    #[error("No such seat in this hall.")]
    SeatOutOfRange,
    #[error(transparent)]
    Db(#[from] DbErr),
}

impl From<BookingError> for AppError {
    fn from(err: BookingError) -> Self {
        match err {
            BookingError::PerformanceNotFound => AppError::NotFound(err.to_string()),
            // The ticket API contract is 400 with {"error": msg} for both
            // rejection cases, with distinguishable messages.
            BookingError::SeatTaken | BookingError::SeatOutOfRange => {
                AppError::BadRequest(err.to_string())
            }
            BookingError::Db(e) => AppError::Db(e),
        }
    }
}

/// Book a single seat: one fresh Reservation holding one Ticket.
pub async fn book_seat(
    db: &DatabaseConnection,
    user_id: Uuid,
    performance_id: i32,
    row: i32,
    seat: i32,
) -> Result<ticket::Model, BookingError> {
    let (_, mut tickets) = book_seats(db, user_id, performance_id, &[(row, seat)]).await?;
    Ok(tickets.remove(0))
}

/// Book one or more seats for a performance as a single checkout: one
/// Reservation owning all the Tickets, written atomically. Any invalid seat
/// fails the whole checkout with nothing persisted.
///
/// Per seat, the taken check runs before the bounds check so that a duplicate
/// booking of a nonsense coordinate still reports "already booked" first,
/// matching the user-facing message precedence of the form flow.
pub async fn book_seats(
    db: &DatabaseConnection,
    user_id: Uuid,
    performance_id: i32,
    seats: &[(i32, i32)],
) -> Result<(reservation::Model, Vec<ticket::Model>), BookingError> {
    let performance = performance::Entity::find_by_id(performance_id)
        .one(db)
        .await?
        .ok_or(BookingError::PerformanceNotFound)?;

    let hall = theatre_hall::Entity::find_by_id(performance.theatre_hall_id)
        .one(db)
        .await?
        .ok_or_else(|| {
            DbErr::RecordNotFound(format!(
                "theatre hall {} referenced by performance {}",
                performance.theatre_hall_id, performance.id
            ))
        })?;

    for &(row, seat) in seats {
        let taken = ticket::Entity::find()
            .filter(ticket::Column::PerformanceId.eq(performance.id))
            .filter(ticket::Column::Row.eq(row))
            .filter(ticket::Column::Seat.eq(seat))
            .one(db)
            .await?;

        if taken.is_some() {
            return Err(BookingError::SeatTaken);
        }

        if row < 1 || row > hall.rows || seat < 1 || seat > hall.seats_in_row {
            return Err(BookingError::SeatOutOfRange);
        }
    }

    // The reads above are advisory: two concurrent checkouts can both see a
    // seat as free. The unique index on (performance_id, row, seat) is the
    // actual arbiter; losing the race surfaces here as SeatTaken instead of
    // a double booking. Rolls back on drop if anything fails mid-way.
    let txn = db.begin().await?;

    let new_reservation = reservation::ActiveModel {
        user_id: Set(user_id),
        created_at: Set(Utc::now().into()),
        ..Default::default()
    };
    let reservation = new_reservation.insert(&txn).await?;

    let mut tickets = Vec::with_capacity(seats.len());
    for &(row, seat) in seats {
        let new_ticket = ticket::ActiveModel {
            row: Set(row),
            seat: Set(seat),
            performance_id: Set(performance.id),
            reservation_id: Set(reservation.id),
            ..Default::default()
        };

        match new_ticket.insert(&txn).await {
            Ok(t) => tickets.push(t),
            Err(e) => {
                return Err(match e.sql_err() {
                    Some(SqlErr::UniqueConstraintViolation(_)) => BookingError::SeatTaken,
                    _ => BookingError::Db(e),
                });
            }
        }
    }

    txn.commit().await?;

    tracing::info!(
        user_id = %user_id,
        performance_id,
        reservation_id = reservation.id,
        tickets = tickets.len(),
        "booking committed"
    );

    Ok((reservation, tickets))
}

#[derive(Debug, Serialize, PartialEq)]
pub struct FreeSeats {
    pub performance: i32,
    pub hall: String,
    pub total_seats: i64,
    pub taken_seats: i64,
    pub free_seats: i64,
}

/// Occupancy report for a performance. Read-only; the result may be stale
/// the moment it is returned.
pub async fn free_seats(
    db: &DatabaseConnection,
    performance_id: i32,
) -> Result<FreeSeats, BookingError> {
    let performance = performance::Entity::find_by_id(performance_id)
        .one(db)
        .await?
        .ok_or(BookingError::PerformanceNotFound)?;

    let hall = theatre_hall::Entity::find_by_id(performance.theatre_hall_id)
        .one(db)
        .await?
        .ok_or_else(|| {
            DbErr::RecordNotFound(format!(
                "theatre hall {} referenced by performance {}",
                performance.theatre_hall_id, performance.id
            ))
        })?;

    let total_seats = i64::from(hall.rows) * i64::from(hall.seats_in_row);
    let taken_seats = ticket::Entity::find()
        .filter(ticket::Column::PerformanceId.eq(performance.id))
        .count(db)
        .await? as i64;

    Ok(FreeSeats {
        performance: performance.id,
        hall: hall.name,
        total_seats,
        taken_seats,
        free_seats: total_seats - taken_seats,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{play, user};
    use sea_orm::{ConnectOptions, ConnectionTrait, Database, DbBackend, Schema};
    use sea_orm::sea_query::Index;

    async fn setup_db() -> DatabaseConnection {
        // A single pooled connection keeps every test statement on the same
        // in-memory database.
        let mut opt = ConnectOptions::new("sqlite::memory:");
        opt.max_connections(1);
        let db = Database::connect(opt).await.unwrap();

        let schema = Schema::new(DbBackend::Sqlite);
        let backend = db.get_database_backend();

        db.execute(backend.build(&schema.create_table_from_entity(user::Entity)))
            .await
            .unwrap();
        db.execute(backend.build(&schema.create_table_from_entity(play::Entity)))
            .await
            .unwrap();
        db.execute(backend.build(&schema.create_table_from_entity(theatre_hall::Entity)))
            .await
            .unwrap();
        db.execute(backend.build(&schema.create_table_from_entity(performance::Entity)))
            .await
            .unwrap();
        db.execute(backend.build(&schema.create_table_from_entity(reservation::Entity)))
            .await
            .unwrap();
        db.execute(backend.build(&schema.create_table_from_entity(ticket::Entity)))
            .await
            .unwrap();

        // Same unique index the postgres migration creates; it is what turns
        // a double-booking race into a detectable conflict.
        let idx = Index::create()
            .name("uq_ticket_performance_row_seat")
            .table(ticket::Entity)
            .col(ticket::Column::PerformanceId)
            .col(ticket::Column::Row)
            .col(ticket::Column::Seat)
            .unique()
            .to_owned();
        db.execute(backend.build(&idx)).await.unwrap();

        db
    }

    struct Fixture {
        user_id: Uuid,
        performance_id: i32,
    }

    /// Seed a user, a play, a 5x10 hall and one performance.
    async fn seed(db: &DatabaseConnection) -> Fixture {
        let user_id = Uuid::new_v4();
        user::ActiveModel {
            id: Set(user_id),
            email: Set("pavlo@example.com".to_string()),
            password_hash: Set("not-a-real-hash".to_string()),
            name: Set("Pavlo".to_string()),
            role: Set(user::UserRole::Customer),
            created_at: Set(Utc::now().into()),
        }
        .insert(db)
        .await
        .unwrap();

        let play = play::ActiveModel {
            title: Set("Hamlet".to_string()),
            description: Set("Shakespeare tragedy".to_string()),
            ..Default::default()
        }
        .insert(db)
        .await
        .unwrap();

        let hall = theatre_hall::ActiveModel {
            name: Set("Main Hall".to_string()),
            rows: Set(5),
            seats_in_row: Set(10),
            ..Default::default()
        }
        .insert(db)
        .await
        .unwrap();

        let performance = performance::ActiveModel {
            play_id: Set(play.id),
            theatre_hall_id: Set(hall.id),
            show_time: Set(Utc::now().into()),
            ..Default::default()
        }
        .insert(db)
        .await
        .unwrap();

        Fixture {
            user_id,
            performance_id: performance.id,
        }
    }

    async fn record_counts(db: &DatabaseConnection) -> (u64, u64) {
        let reservations = reservation::Entity::find().count(db).await.unwrap();
        let tickets = ticket::Entity::find().count(db).await.unwrap();
        (reservations, tickets)
    }

    #[tokio::test]
    async fn books_a_free_in_bounds_seat() {
        let db = setup_db().await;
        let fx = seed(&db).await;

        let ticket = book_seat(&db, fx.user_id, fx.performance_id, 1, 5)
            .await
            .unwrap();

        assert_eq!(ticket.row, 1);
        assert_eq!(ticket.seat, 5);
        assert_eq!(ticket.performance_id, fx.performance_id);
        assert_eq!(record_counts(&db).await, (1, 1));
    }

    #[tokio::test]
    async fn rebooking_the_same_seat_is_rejected() {
        let db = setup_db().await;
        let fx = seed(&db).await;

        book_seat(&db, fx.user_id, fx.performance_id, 1, 1)
            .await
            .unwrap();

        let err = book_seat(&db, fx.user_id, fx.performance_id, 1, 1)
            .await
            .unwrap_err();
        assert!(matches!(err, BookingError::SeatTaken));

        // The failure wrote nothing.
        assert_eq!(record_counts(&db).await, (1, 1));
    }

    #[tokio::test]
    async fn out_of_range_seats_are_rejected() {
        let db = setup_db().await;
        let fx = seed(&db).await;

        // Hall is 5 rows x 10 seats.
        for (row, seat) in [(6, 1), (1, 11), (0, 5), (1, 0), (-1, 3)] {
            let err = book_seat(&db, fx.user_id, fx.performance_id, row, seat)
                .await
                .unwrap_err();
            assert!(
                matches!(err, BookingError::SeatOutOfRange),
                "({row}, {seat}) should be out of range"
            );
        }

        assert_eq!(record_counts(&db).await, (0, 0));
    }

    #[tokio::test]
    async fn seat_taken_takes_precedence_over_bounds_for_other_seats() {
        let db = setup_db().await;
        let fx = seed(&db).await;

        book_seat(&db, fx.user_id, fx.performance_id, 2, 2)
            .await
            .unwrap();

        // Checkout with a taken seat listed before an out-of-range one
        // reports the taken seat, mirroring the single-seat precedence.
        let err = book_seats(&db, fx.user_id, fx.performance_id, &[(2, 2), (9, 9)])
            .await
            .unwrap_err();
        assert!(matches!(err, BookingError::SeatTaken));
    }

    #[tokio::test]
    async fn unknown_performance_is_not_found() {
        let db = setup_db().await;
        let fx = seed(&db).await;

        let err = book_seat(&db, fx.user_id, 999999, 1, 1).await.unwrap_err();
        assert!(matches!(err, BookingError::PerformanceNotFound));
        assert_eq!(record_counts(&db).await, (0, 0));

        let err = free_seats(&db, 999999).await.unwrap_err();
        assert!(matches!(err, BookingError::PerformanceNotFound));
    }

    #[tokio::test]
    async fn free_seats_tracks_bookings() {
        let db = setup_db().await;
        let fx = seed(&db).await;

        let report = free_seats(&db, fx.performance_id).await.unwrap();
        assert_eq!(report.hall, "Main Hall");
        assert_eq!(report.total_seats, 50);
        assert_eq!(report.taken_seats, 0);
        assert_eq!(report.free_seats, 50);

        for seat in 1..=3 {
            book_seat(&db, fx.user_id, fx.performance_id, 1, seat)
                .await
                .unwrap();
        }

        let report = free_seats(&db, fx.performance_id).await.unwrap();
        assert_eq!(report.taken_seats, 3);
        assert_eq!(report.free_seats, 47);
    }

    #[tokio::test]
    async fn booking_scenario_on_a_5_by_10_hall() {
        let db = setup_db().await;
        let fx = seed(&db).await;

        book_seat(&db, fx.user_id, fx.performance_id, 1, 1)
            .await
            .unwrap();
        assert_eq!(free_seats(&db, fx.performance_id).await.unwrap().free_seats, 49);

        let err = book_seat(&db, fx.user_id, fx.performance_id, 1, 1)
            .await
            .unwrap_err();
        assert!(matches!(err, BookingError::SeatTaken));
        assert_eq!(free_seats(&db, fx.performance_id).await.unwrap().free_seats, 49);

        let err = book_seat(&db, fx.user_id, fx.performance_id, 6, 1)
            .await
            .unwrap_err();
        assert!(matches!(err, BookingError::SeatOutOfRange));

        let err = book_seat(&db, fx.user_id, fx.performance_id, 1, 0)
            .await
            .unwrap_err();
        assert!(matches!(err, BookingError::SeatOutOfRange));
    }

    #[tokio::test]
    async fn checkout_books_several_seats_under_one_reservation() {
        let db = setup_db().await;
        let fx = seed(&db).await;

        let (reservation, tickets) = book_seats(
            &db,
            fx.user_id,
            fx.performance_id,
            &[(1, 1), (1, 2), (1, 3)],
        )
        .await
        .unwrap();

        assert_eq!(tickets.len(), 3);
        assert!(tickets.iter().all(|t| t.reservation_id == reservation.id));
        assert_eq!(record_counts(&db).await, (1, 3));
    }

    #[tokio::test]
    async fn checkout_with_one_bad_seat_writes_nothing() {
        let db = setup_db().await;
        let fx = seed(&db).await;

        let err = book_seats(&db, fx.user_id, fx.performance_id, &[(1, 1), (6, 1)])
            .await
            .unwrap_err();
        assert!(matches!(err, BookingError::SeatOutOfRange));
        assert_eq!(record_counts(&db).await, (0, 0));
    }

    #[tokio::test]
    async fn duplicate_seat_within_one_checkout_is_rejected() {
        let db = setup_db().await;
        let fx = seed(&db).await;

        // Both requests pass the advisory read; the unique index catches the
        // second insert inside the transaction.
        let err = book_seats(&db, fx.user_id, fx.performance_id, &[(3, 3), (3, 3)])
            .await
            .unwrap_err();
        assert!(matches!(err, BookingError::SeatTaken));
        assert_eq!(record_counts(&db).await, (0, 0));
    }

    /// The original system this replaces had a check-then-act race: two
    /// concurrent requests for the same seat could both pass the existence
    /// check and both write a ticket. This implementation deliberately
    /// diverges by backing the check with a unique index on
    /// (performance_id, row, seat), so at most one of the racing bookings
    /// can ever commit.
    #[tokio::test]
    async fn concurrent_bookings_of_the_same_seat_yield_one_ticket() {
        let db = setup_db().await;
        let fx = seed(&db).await;

        let (a, b) = tokio::join!(
            book_seat(&db, fx.user_id, fx.performance_id, 1, 1),
            book_seat(&db, fx.user_id, fx.performance_id, 1, 1),
        );

        assert!(
            !(a.is_ok() && b.is_ok()),
            "double booking must not be possible"
        );

        let winners = ticket::Entity::find()
            .filter(ticket::Column::PerformanceId.eq(fx.performance_id))
            .filter(ticket::Column::Row.eq(1))
            .filter(ticket::Column::Seat.eq(1))
            .count(&db)
            .await
            .unwrap();
        assert!(winners <= 1);
    }
}
