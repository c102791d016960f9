use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use serde::Deserialize;

use crate::entities::{actor, genre, performance, play, play_actor, play_genre, theatre_hall};
use crate::error::{AppError, AppResult};
use crate::AppState;

// ============ Play Management ============

#[derive(Debug, Deserialize)]
pub struct CreatePlayRequest {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub genres: Vec<i32>,
    #[serde(default)]
    pub actors: Vec<i32>,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePlayRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub genres: Option<Vec<i32>>,
    pub actors: Option<Vec<i32>>,
}

async fn validate_genres(state: &AppState, ids: &[i32]) -> AppResult<()> {
    for id in ids {
        genre::Entity::find_by_id(*id)
            .one(&state.db)
            .await?
            .ok_or_else(|| AppError::BadRequest(format!("Invalid genre id {}", id)))?;
    }
    Ok(())
}

async fn validate_actors(state: &AppState, ids: &[i32]) -> AppResult<()> {
    for id in ids {
        actor::Entity::find_by_id(*id)
            .one(&state.db)
            .await?
            .ok_or_else(|| AppError::BadRequest(format!("Invalid actor id {}", id)))?;
    }
    Ok(())
}

async fn set_play_genres(state: &AppState, play_id: i32, ids: &[i32]) -> AppResult<()> {
    play_genre::Entity::delete_many()
        .filter(play_genre::Column::PlayId.eq(play_id))
        .exec(&state.db)
        .await?;

    for id in ids {
        play_genre::ActiveModel {
            play_id: Set(play_id),
            genre_id: Set(*id),
        }
        .insert(&state.db)
        .await?;
    }
    Ok(())
}

async fn set_play_actors(state: &AppState, play_id: i32, ids: &[i32]) -> AppResult<()> {
    play_actor::Entity::delete_many()
        .filter(play_actor::Column::PlayId.eq(play_id))
        .exec(&state.db)
        .await?;

    for id in ids {
        play_actor::ActiveModel {
            play_id: Set(play_id),
            actor_id: Set(*id),
        }
        .insert(&state.db)
        .await?;
    }
    Ok(())
}

/// Create a play (admin)
pub async fn create_play(
    State(state): State<AppState>,
    Json(payload): Json<CreatePlayRequest>,
) -> AppResult<(StatusCode, Json<play::Model>)> {
    validate_genres(&state, &payload.genres).await?;
    validate_actors(&state, &payload.actors).await?;

    let play = play::ActiveModel {
        title: Set(payload.title),
        description: Set(payload.description),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    set_play_genres(&state, play.id, &payload.genres).await?;
    set_play_actors(&state, play.id, &payload.actors).await?;

    Ok((StatusCode::CREATED, Json(play)))
}

/// Update a play (admin)
pub async fn update_play(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<UpdatePlayRequest>,
) -> AppResult<Json<play::Model>> {
    let play = play::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Play not found".to_string()))?;

    let mut active: play::ActiveModel = play.into();

    if let Some(title) = payload.title {
        active.title = Set(title);
    }
    if let Some(description) = payload.description {
        active.description = Set(description);
    }

    let play = active.update(&state.db).await?;

    if let Some(genres) = payload.genres {
        validate_genres(&state, &genres).await?;
        set_play_genres(&state, play.id, &genres).await?;
    }
    if let Some(actors) = payload.actors {
        validate_actors(&state, &actors).await?;
        set_play_actors(&state, play.id, &actors).await?;
    }

    Ok(Json(play))
}

/// Delete a play (admin)
pub async fn delete_play(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<serde_json::Value>> {
    let result = play::Entity::delete_by_id(id).exec(&state.db).await?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFound("Play not found".to_string()));
    }

    Ok(Json(serde_json::json!({ "message": "Play deleted" })))
}

// ============ Hall Management ============

#[derive(Debug, Deserialize)]
pub struct CreateHallRequest {
    pub name: String,
    pub rows: i32,
    pub seats_in_row: i32,
}

/// Create a theatre hall (admin)
pub async fn create_hall(
    State(state): State<AppState>,
    Json(payload): Json<CreateHallRequest>,
) -> AppResult<(StatusCode, Json<theatre_hall::Model>)> {
    if payload.rows < 1 || payload.seats_in_row < 1 {
        return Err(AppError::BadRequest(
            "Hall dimensions must be positive".to_string(),
        ));
    }

    let hall = theatre_hall::ActiveModel {
        name: Set(payload.name),
        rows: Set(payload.rows),
        seats_in_row: Set(payload.seats_in_row),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    Ok((StatusCode::CREATED, Json(hall)))
}

/// List theatre halls (admin)
pub async fn list_halls(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<theatre_hall::Model>>> {
    let halls = theatre_hall::Entity::find().all(&state.db).await?;
    Ok(Json(halls))
}

// ============ Performance Management ============

#[derive(Debug, Deserialize)]
pub struct CreatePerformanceRequest {
    pub play: i32,
    pub theatre_hall: i32,
    pub show_time: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePerformanceRequest {
    pub play: Option<i32>,
    pub theatre_hall: Option<i32>,
    pub show_time: Option<DateTime<Utc>>,
}

/// Schedule a performance (admin)
pub async fn create_performance(
    State(state): State<AppState>,
    Json(payload): Json<CreatePerformanceRequest>,
) -> AppResult<(StatusCode, Json<performance::Model>)> {
    play::Entity::find_by_id(payload.play)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::BadRequest("Invalid play".to_string()))?;

    theatre_hall::Entity::find_by_id(payload.theatre_hall)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::BadRequest("Invalid theatre hall".to_string()))?;

    let performance = performance::ActiveModel {
        play_id: Set(payload.play),
        theatre_hall_id: Set(payload.theatre_hall),
        show_time: Set(payload.show_time.into()),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    Ok((StatusCode::CREATED, Json(performance)))
}

/// Update a performance (admin)
pub async fn update_performance(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<UpdatePerformanceRequest>,
) -> AppResult<Json<performance::Model>> {
    let performance = performance::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Performance not found".to_string()))?;

    let mut active: performance::ActiveModel = performance.into();

    if let Some(play_id) = payload.play {
        play::Entity::find_by_id(play_id)
            .one(&state.db)
            .await?
            .ok_or_else(|| AppError::BadRequest("Invalid play".to_string()))?;
        active.play_id = Set(play_id);
    }

    if let Some(hall_id) = payload.theatre_hall {
        theatre_hall::Entity::find_by_id(hall_id)
            .one(&state.db)
            .await?
            .ok_or_else(|| AppError::BadRequest("Invalid theatre hall".to_string()))?;
        active.theatre_hall_id = Set(hall_id);
    }

    if let Some(time) = payload.show_time {
        active.show_time = Set(time.into());
    }

    let result = active.update(&state.db).await?;
    Ok(Json(result))
}

/// Delete a performance (admin)
pub async fn delete_performance(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<serde_json::Value>> {
    let result = performance::Entity::delete_by_id(id).exec(&state.db).await?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFound("Performance not found".to_string()));
    }

    Ok(Json(serde_json::json!({ "message": "Performance deleted" })))
}

// ============ Genres & Actors ============

#[derive(Debug, Deserialize)]
pub struct CreateGenreRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateActorRequest {
    pub first_name: String,
    pub last_name: String,
}

/// Create a genre (admin)
pub async fn create_genre(
    State(state): State<AppState>,
    Json(payload): Json<CreateGenreRequest>,
) -> AppResult<(StatusCode, Json<genre::Model>)> {
    let existing = genre::Entity::find()
        .filter(genre::Column::Name.eq(&payload.name))
        .one(&state.db)
        .await?;

    if existing.is_some() {
        return Err(AppError::Conflict("Genre already exists".to_string()));
    }

    let genre = genre::ActiveModel {
        name: Set(payload.name),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    Ok((StatusCode::CREATED, Json(genre)))
}

/// Create an actor (admin)
pub async fn create_actor(
    State(state): State<AppState>,
    Json(payload): Json<CreateActorRequest>,
) -> AppResult<(StatusCode, Json<actor::Model>)> {
    let actor = actor::ActiveModel {
        first_name: Set(payload.first_name),
        last_name: Set(payload.last_name),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    Ok((StatusCode::CREATED, Json(actor)))
}
