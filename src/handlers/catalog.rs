use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use sea_orm::{ColumnTrait, EntityTrait, ModelTrait, QueryFilter, QueryOrder};
use serde::{Deserialize, Serialize};

use crate::entities::{actor, genre, performance, play, theatre_hall};
use crate::error::{AppError, AppResult};
use crate::services::booking::{self, FreeSeats};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct PlayResponse {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub genres: Vec<String>,
    pub actors: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct PlayFilter {
    /// Case-insensitive substring match on the title
    pub title: Option<String>,
    /// Exact genre name
    pub genre: Option<String>,
}

async fn play_response(state: &AppState, play: play::Model) -> AppResult<PlayResponse> {
    let genres = play.find_related(genre::Entity).all(&state.db).await?;
    let actors = play.find_related(actor::Entity).all(&state.db).await?;

    Ok(PlayResponse {
        id: play.id,
        title: play.title,
        description: play.description,
        genres: genres.into_iter().map(|g| g.name).collect(),
        actors: actors
            .into_iter()
            .map(|a| format!("{} {}", a.first_name, a.last_name))
            .collect(),
    })
}

/// List plays, ordered by title
pub async fn list_plays(
    State(state): State<AppState>,
    Query(filter): Query<PlayFilter>,
) -> AppResult<Json<Vec<PlayResponse>>> {
    let mut query = play::Entity::find().order_by_asc(play::Column::Title);

    if let Some(title) = &filter.title {
        query = query.filter(play::Column::Title.contains(title));
    }

    let plays = query.all(&state.db).await?;

    let mut responses = Vec::new();
    for p in plays {
        let response = play_response(&state, p).await?;

        if let Some(genre) = &filter.genre {
            if !response.genres.iter().any(|g| g == genre) {
                continue;
            }
        }

        responses.push(response);
    }

    Ok(Json(responses))
}

/// Get play details
pub async fn get_play(
    State(state): State<AppState>,
    Path(play_id): Path<i32>,
) -> AppResult<Json<PlayResponse>> {
    let play = play::Entity::find_by_id(play_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Play not found".to_string()))?;

    Ok(Json(play_response(&state, play).await?))
}

#[derive(Debug, Serialize)]
pub struct PerformanceResponse {
    pub id: i32,
    pub play: i32,
    pub play_title: String,
    pub theatre_hall: i32,
    pub hall_name: String,
    pub show_time: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct PerformanceFilter {
    /// Substring match on the play title
    pub play_title: Option<String>,
    /// Substring match on the hall name
    pub hall: Option<String>,
}

fn performance_response(
    p: &performance::Model,
    plays: &[play::Model],
    halls: &[theatre_hall::Model],
) -> Option<PerformanceResponse> {
    let play = plays.iter().find(|pl| pl.id == p.play_id)?;
    let hall = halls.iter().find(|h| h.id == p.theatre_hall_id)?;

    Some(PerformanceResponse {
        id: p.id,
        play: play.id,
        play_title: play.title.clone(),
        theatre_hall: hall.id,
        hall_name: hall.name.clone(),
        show_time: p.show_time.with_timezone(&Utc),
    })
}

/// List performances, ordered by show time
pub async fn list_performances(
    State(state): State<AppState>,
    Query(filter): Query<PerformanceFilter>,
) -> AppResult<Json<Vec<PerformanceResponse>>> {
    let performances = performance::Entity::find()
        .order_by_asc(performance::Column::ShowTime)
        .all(&state.db)
        .await?;
    let plays = play::Entity::find().all(&state.db).await?;
    let halls = theatre_hall::Entity::find().all(&state.db).await?;

    let responses: Vec<PerformanceResponse> = performances
        .iter()
        .filter_map(|p| performance_response(p, &plays, &halls))
        .filter(|r| {
            filter
                .play_title
                .as_ref()
                .map_or(true, |t| r.play_title.to_lowercase().contains(&t.to_lowercase()))
        })
        .filter(|r| {
            filter
                .hall
                .as_ref()
                .map_or(true, |h| r.hall_name.to_lowercase().contains(&h.to_lowercase()))
        })
        .collect();

    Ok(Json(responses))
}

/// Get performance details
pub async fn get_performance(
    State(state): State<AppState>,
    Path(performance_id): Path<i32>,
) -> AppResult<Json<PerformanceResponse>> {
    let performance = performance::Entity::find_by_id(performance_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Performance not found".to_string()))?;

    let plays = play::Entity::find().all(&state.db).await?;
    let halls = theatre_hall::Entity::find().all(&state.db).await?;

    performance_response(&performance, &plays, &halls)
        .map(Json)
        .ok_or_else(|| AppError::Internal("Performance references a missing play or hall".to_string()))
}

/// Occupancy report for a performance
pub async fn free_seats_count(
    State(state): State<AppState>,
    Path(performance_id): Path<i32>,
) -> AppResult<Json<FreeSeats>> {
    let report = booking::free_seats(&state.db, performance_id).await?;
    Ok(Json(report))
}

/// List all genres
pub async fn list_genres(State(state): State<AppState>) -> AppResult<Json<Vec<genre::Model>>> {
    let genres = genre::Entity::find()
        .order_by_asc(genre::Column::Name)
        .all(&state.db)
        .await?;
    Ok(Json(genres))
}

/// List all actors
pub async fn list_actors(State(state): State<AppState>) -> AppResult<Json<Vec<actor::Model>>> {
    let actors = actor::Entity::find()
        .order_by_asc(actor::Column::LastName)
        .all(&state.db)
        .await?;
    Ok(Json(actors))
}
