use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};

use crate::handlers::{admin, auth, booking, catalog, pages};
use crate::middleware::auth::{auth_middleware, require_admin};
use crate::AppState;

/// Capability table:
/// - catalog reads: public
/// - booking and reservation operations: any authenticated user
/// - catalog create/update/delete: admin only
pub fn create_router(state: AppState) -> Router {
    // Public routes
    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login));

    let public_routes = Router::new()
        .route("/plays", get(catalog::list_plays))
        .route("/plays/{id}", get(catalog::get_play))
        .route("/performances", get(catalog::list_performances))
        .route("/performances/{id}", get(catalog::get_performance))
        .route(
            "/performances/{id}/free_seats_count",
            get(catalog::free_seats_count),
        )
        .route("/genres", get(catalog::list_genres))
        .route("/actors", get(catalog::list_actors));

    // Booking routes (requires auth)
    let booking_routes = Router::new()
        .route("/tickets", post(booking::create_ticket))
        .route("/tickets", get(booking::my_tickets))
        .route("/reservations", post(booking::create_reservation))
        .route("/reservations", get(booking::my_reservations))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    // Admin routes (requires auth + admin role)
    let admin_routes = Router::new()
        .route("/plays", post(admin::create_play))
        .route("/plays/{id}", put(admin::update_play))
        .route("/plays/{id}", delete(admin::delete_play))
        .route("/halls", get(admin::list_halls))
        .route("/halls", post(admin::create_hall))
        .route("/performances", post(admin::create_performance))
        .route("/performances/{id}", put(admin::update_performance))
        .route("/performances/{id}", delete(admin::delete_performance))
        .route("/genres", post(admin::create_genre))
        .route("/actors", post(admin::create_actor))
        .layer(middleware::from_fn(require_admin))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    // Server-rendered pages; the booking form goes through the same
    // workflow as the ticket API
    let page_routes = Router::new()
        .route("/", get(pages::home))
        .route("/reservation", get(pages::reservation_form))
        .route(
            "/make-reservation",
            post(pages::make_reservation)
                .layer(middleware::from_fn_with_state(state.clone(), auth_middleware)),
        );

    Router::new()
        .nest("/api/auth", auth_routes)
        .nest("/api", public_routes.merge(booking_routes))
        .nest("/api/admin", admin_routes)
        .merge(page_routes)
        .with_state(state)
}
