use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use chrono::Utc;
use http_body_util::BodyExt;
use sea_orm::sea_query::Index;
use sea_orm::{
    ActiveModelTrait, ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbBackend,
    Schema, Set,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use theatre_booking_backend::{
    entities::{
        actor, genre, performance, play, play_actor, play_genre, reservation, theatre_hall,
        ticket, user,
    },
    routes, AppState, Config,
};

async fn setup_db() -> DatabaseConnection {
    let mut opt = ConnectOptions::new("sqlite::memory:");
    opt.max_connections(1);
    let db = Database::connect(opt).await.unwrap();

    let schema = Schema::new(DbBackend::Sqlite);
    let backend = db.get_database_backend();

    for stmt in [
        schema.create_table_from_entity(user::Entity),
        schema.create_table_from_entity(genre::Entity),
        schema.create_table_from_entity(actor::Entity),
        schema.create_table_from_entity(play::Entity),
        schema.create_table_from_entity(play_genre::Entity),
        schema.create_table_from_entity(play_actor::Entity),
        schema.create_table_from_entity(theatre_hall::Entity),
        schema.create_table_from_entity(performance::Entity),
        schema.create_table_from_entity(reservation::Entity),
        schema.create_table_from_entity(ticket::Entity),
    ] {
        db.execute(backend.build(&stmt)).await.unwrap();
    }

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

fn test_config() -> Config {
    Config {
        database_url: "sqlite::memory:".to_string(),
        jwt_secret: "test-secret".to_string(),
        jwt_expiration_hours: 1,
        server_host: "127.0.0.1".to_string(),
        server_port: 0,
        admin_email: "admin@theatre.local".to_string(),
    }
}

struct TestApp {
    app: Router,
    performance_id: i32,
}

/// Router over an in-memory database with one play, a 5x10 hall and one
/// performance.
async fn spawn_app() -> TestApp {
    let db = setup_db().await;

    let play = play::ActiveModel {
        title: Set("Hamlet".to_string()),
        description: Set("Shakespeare tragedy".to_string()),
        ..Default::default()
    }
    .insert(&db)
    .await
    .unwrap();

    let hall = theatre_hall::ActiveModel {
        name: Set("Main Hall".to_string()),
        rows: Set(5),
        seats_in_row: Set(10),
        ..Default::default()
    }
    .insert(&db)
    .await
    .unwrap();

    let performance = performance::ActiveModel {
        play_id: Set(play.id),
        theatre_hall_id: Set(hall.id),
        show_time: Set(Utc::now().into()),
        ..Default::default()
    }
    .insert(&db)
    .await
    .unwrap();

    let state = AppState {
        db,
        config: test_config(),
    };

    TestApp {
        app: routes::create_router(state),
        performance_id: performance.id,
    }
}

async fn send_json(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Value,
) -> (StatusCode, Value) {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }

    let response = app
        .clone()
        .oneshot(builder.body(Body::from(body.to_string())).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };

    (status, value)
}

async fn register(app: &Router, email: &str) -> String {
    let (status, body) = send_json(
        app,
        "POST",
        "/api/auth/register",
        None,
        json!({ "email": email, "password": "test123", "name": "Pavlo" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    body["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn ticket_booking_happy_path() {
    let test = spawn_app().await;
    let token = register(&test.app, "pavlo@example.com").await;

    let (status, body) = send_json(
        &test.app,
        "POST",
        "/api/tickets",
        Some(&token),
        json!({ "performance": test.performance_id, "row": 1, "seat": 1 }),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["row"], 1);
    assert_eq!(body["seat"], 1);
    assert_eq!(body["performance"], test.performance_id);
    assert_eq!(body["play_title"], "Hamlet");
    assert_eq!(body["hall_name"], "Main Hall");
    assert!(body["reservation"].is_number());
}

#[tokio::test]
async fn taken_and_out_of_range_seats_return_400_with_distinct_messages() {
    let test = spawn_app().await;
    let token = register(&test.app, "pavlo@example.com").await;

    let (status, _) = send_json(
        &test.app,
        "POST",
        "/api/tickets",
        Some(&token),
        json!({ "performance": test.performance_id, "row": 1, "seat": 1 }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send_json(
        &test.app,
        "POST",
        "/api/tickets",
        Some(&token),
        json!({ "performance": test.performance_id, "row": 1, "seat": 1 }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "This seat is already booked.");

    let (status, body) = send_json(
        &test.app,
        "POST",
        "/api/tickets",
        Some(&token),
        json!({ "performance": test.performance_id, "row": 6, "seat": 1 }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No such seat in this hall.");
}

#[tokio::test]
async fn unknown_performance_returns_404() {
    let test = spawn_app().await;
    let token = register(&test.app, "pavlo@example.com").await;

    let (status, body) = send_json(
        &test.app,
        "POST",
        "/api/tickets",
        Some(&token),
        json!({ "performance": 999999, "row": 1, "seat": 1 }),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Performance not found");
}

#[tokio::test]
async fn booking_requires_a_valid_token() {
    let test = spawn_app().await;

    let (status, _) = send_json(
        &test.app,
        "POST",
        "/api/tickets",
        Some("not-a-token"),
        json!({ "performance": test.performance_id, "row": 1, "seat": 1 }),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn free_seats_count_reflects_bookings() {
    let test = spawn_app().await;
    let token = register(&test.app, "pavlo@example.com").await;

    let uri = format!(
        "/api/performances/{}/free_seats_count",
        test.performance_id
    );

    let (status, body) = send_json(&test.app, "GET", &uri, None, Value::Null).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_seats"], 50);
    assert_eq!(body["taken_seats"], 0);
    assert_eq!(body["free_seats"], 50);
    assert_eq!(body["hall"], "Main Hall");

    let (status, _) = send_json(
        &test.app,
        "POST",
        "/api/tickets",
        Some(&token),
        json!({ "performance": test.performance_id, "row": 1, "seat": 1 }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, body) = send_json(&test.app, "GET", &uri, None, Value::Null).await;
    assert_eq!(body["taken_seats"], 1);
    assert_eq!(body["free_seats"], 49);
}

#[tokio::test]
async fn reservation_checkout_books_several_seats() {
    let test = spawn_app().await;
    let token = register(&test.app, "pavlo@example.com").await;

    let (status, body) = send_json(
        &test.app,
        "POST",
        "/api/reservations",
        Some(&token),
        json!({
            "performance": test.performance_id,
            "seats": [ { "row": 1, "seat": 1 }, { "row": 1, "seat": 2 } ]
        }),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["tickets"].as_array().unwrap().len(), 2);

    let (status, body) = send_json(&test.app, "GET", "/api/reservations", Some(&token), Value::Null).await;
    assert_eq!(status, StatusCode::OK);
    let reservations = body.as_array().unwrap();
    assert_eq!(reservations.len(), 1);
    assert_eq!(reservations[0]["username"], "Pavlo");
    assert_eq!(reservations[0]["tickets"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn reservation_checkout_is_atomic() {
    let test = spawn_app().await;
    let token = register(&test.app, "pavlo@example.com").await;

    let (status, _) = send_json(
        &test.app,
        "POST",
        "/api/reservations",
        Some(&token),
        json!({
            "performance": test.performance_id,
            "seats": [ { "row": 1, "seat": 1 }, { "row": 6, "seat": 1 } ]
        }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, body) = send_json(&test.app, "GET", "/api/tickets", Some(&token), Value::Null).await;
    assert_eq!(body.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn admin_routes_reject_customers() {
    let test = spawn_app().await;
    let token = register(&test.app, "pavlo@example.com").await;

    let (status, _) = send_json(
        &test.app,
        "POST",
        "/api/admin/halls",
        Some(&token),
        json!({ "name": "Small Hall", "rows": 3, "seats_in_row": 4 }),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn booking_form_reports_outcome_as_a_message() {
    let test = spawn_app().await;
    let token = register(&test.app, "pavlo@example.com").await;

    let send_form = |body: String| {
        let request = Request::builder()
            .method("POST")
            .uri("/make-reservation")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::from(body))
            .unwrap();
        let app = test.app.clone();
        async move {
            let response = app.oneshot(request).await.unwrap();
            let status = response.status();
            let bytes = response.into_body().collect().await.unwrap().to_bytes();
            (status, String::from_utf8(bytes.to_vec()).unwrap())
        }
    };

    let (status, html) =
        send_form(format!("performance={}&row=1&seat=1", test.performance_id)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("Your ticket has been booked!"));

    // Same seat again: the form re-renders with the error message
    let (status, html) =
        send_form(format!("performance={}&row=1&seat=1", test.performance_id)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("This seat is already booked."));

    let (_, html) = send_form(format!("performance={}&row=6&seat=1", test.performance_id)).await;
    assert!(html.contains("No such seat in this hall."));

    // Malformed input is rejected before it reaches the workflow
    let (_, html) = send_form(format!("performance={}&row=abc&seat=1", test.performance_id)).await;
    assert!(html.contains("whole numbers"));
}

#[tokio::test]
async fn catalog_is_public() {
    let test = spawn_app().await;

    let (status, body) = send_json(&test.app, "GET", "/api/plays", None, Value::Null).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["title"], "Hamlet");

    let (status, body) = send_json(&test.app, "GET", "/api/performances", None, Value::Null).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["play_title"], "Hamlet");
    assert_eq!(body[0]["hall_name"], "Main Hall");
}
