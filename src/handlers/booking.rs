use axum::{
    extract::State,
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::{performance, play, reservation, theatre_hall, ticket};
use crate::error::{AppError, AppResult};
use crate::services::booking::{book_seat, book_seats};
use crate::utils::jwt::Claims;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateTicketRequest {
    pub performance: i32,
    pub row: i32,
    pub seat: i32,
}

#[derive(Debug, Serialize)]
pub struct TicketResponse {
    pub id: i32,
    pub row: i32,
    pub seat: i32,
    pub performance: i32,
    pub reservation: i32,
    pub play_title: String,
    pub show_time: DateTime<Utc>,
    pub hall_name: String,
}

#[derive(Debug, Serialize)]
pub struct ReservationResponse {
    pub id: i32,
    pub user: Uuid,
    pub username: String,
    pub created_at: DateTime<Utc>,
    pub tickets: Vec<TicketResponse>,
}

/// Flatten a ticket with its performance context, the shape the clients of
/// the old system expect.
fn ticket_response(
    t: &ticket::Model,
    performances: &[performance::Model],
    plays: &[play::Model],
    halls: &[theatre_hall::Model],
) -> Option<TicketResponse> {
    let performance = performances.iter().find(|p| p.id == t.performance_id)?;
    let play = plays.iter().find(|p| p.id == performance.play_id)?;
    let hall = halls.iter().find(|h| h.id == performance.theatre_hall_id)?;

    Some(TicketResponse {
        id: t.id,
        row: t.row,
        seat: t.seat,
        performance: performance.id,
        reservation: t.reservation_id,
        play_title: play.title.clone(),
        show_time: performance.show_time.with_timezone(&Utc),
        hall_name: hall.name.clone(),
    })
}

async fn ticket_context(
    state: &AppState,
) -> AppResult<(Vec<performance::Model>, Vec<play::Model>, Vec<theatre_hall::Model>)> {
    let performances = performance::Entity::find().all(&state.db).await?;
    let plays = play::Entity::find().all(&state.db).await?;
    let halls = theatre_hall::Entity::find().all(&state.db).await?;
    Ok((performances, plays, halls))
}

/// Book one seat: a fresh reservation holding a single ticket
pub async fn create_ticket(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateTicketRequest>,
) -> AppResult<(StatusCode, Json<TicketResponse>)> {
    let ticket = book_seat(
        &state.db,
        claims.sub,
        payload.performance,
        payload.row,
        payload.seat,
    )
    .await?;

    let (performances, plays, halls) = ticket_context(&state).await?;
    let response = ticket_response(&ticket, &performances, &plays, &halls)
        .ok_or_else(|| AppError::Internal("Ticket references a missing performance".to_string()))?;

    Ok((StatusCode::CREATED, Json(response)))
}

/// List the caller's tickets
pub async fn my_tickets(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> AppResult<Json<Vec<TicketResponse>>> {
    let reservations = reservation::Entity::find()
        .filter(reservation::Column::UserId.eq(claims.sub))
        .all(&state.db)
        .await?;
    let reservation_ids: Vec<i32> = reservations.iter().map(|r| r.id).collect();

    let tickets = ticket::Entity::find()
        .filter(ticket::Column::ReservationId.is_in(reservation_ids))
        .all(&state.db)
        .await?;

    let (performances, plays, halls) = ticket_context(&state).await?;
    let responses: Vec<TicketResponse> = tickets
        .iter()
        .filter_map(|t| ticket_response(t, &performances, &plays, &halls))
        .collect();

    Ok(Json(responses))
}

#[derive(Debug, Deserialize)]
pub struct SeatRequest {
    pub row: i32,
    pub seat: i32,
}

#[derive(Debug, Deserialize)]
pub struct CreateReservationRequest {
    pub performance: i32,
    pub seats: Vec<SeatRequest>,
}

/// Book several seats for one performance as a single checkout
pub async fn create_reservation(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateReservationRequest>,
) -> AppResult<(StatusCode, Json<ReservationResponse>)> {
    if payload.seats.is_empty() {
        return Err(AppError::BadRequest(
            "A reservation needs at least one seat".to_string(),
        ));
    }

    let seats: Vec<(i32, i32)> = payload.seats.iter().map(|s| (s.row, s.seat)).collect();
    let (reservation, tickets) =
        book_seats(&state.db, claims.sub, payload.performance, &seats).await?;

    let (performances, plays, halls) = ticket_context(&state).await?;
    let ticket_responses: Vec<TicketResponse> = tickets
        .iter()
        .filter_map(|t| ticket_response(t, &performances, &plays, &halls))
        .collect();

    Ok((
        StatusCode::CREATED,
        Json(ReservationResponse {
            id: reservation.id,
            user: claims.sub,
            username: claims.name.clone(),
            created_at: reservation.created_at.with_timezone(&Utc),
            tickets: ticket_responses,
        }),
    ))
}

/// List the caller's reservations with their tickets
pub async fn my_reservations(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> AppResult<Json<Vec<ReservationResponse>>> {
    let reservations = reservation::Entity::find()
        .filter(reservation::Column::UserId.eq(claims.sub))
        .order_by_desc(reservation::Column::CreatedAt)
        .all(&state.db)
        .await?;

    let reservation_ids: Vec<i32> = reservations.iter().map(|r| r.id).collect();
    let tickets = ticket::Entity::find()
        .filter(ticket::Column::ReservationId.is_in(reservation_ids))
        .all(&state.db)
        .await?;

    let (performances, plays, halls) = ticket_context(&state).await?;

    let responses: Vec<ReservationResponse> = reservations
        .into_iter()
        .map(|r| ReservationResponse {
            id: r.id,
            user: r.user_id,
            username: claims.name.clone(),
            created_at: r.created_at.with_timezone(&Utc),
            tickets: tickets
                .iter()
                .filter(|t| t.reservation_id == r.id)
                .filter_map(|t| ticket_response(t, &performances, &plays, &halls))
                .collect(),
        })
        .collect();

    Ok(Json(responses))
}
