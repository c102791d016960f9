use axum::{
    extract::State,
    response::Html,
    Extension, Form,
};
use sea_orm::{EntityTrait, QueryOrder};
use serde::Deserialize;

use crate::entities::{performance, play, theatre_hall};
use crate::error::AppResult;
use crate::services::booking::{book_seat, BookingError};
use crate::utils::jwt::Claims;
use crate::AppState;

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Home page
pub async fn home() -> Html<&'static str> {
    Html(
        "<!DOCTYPE html><html><head><title>Theatre Box Office</title></head>\
         <body><h1>Theatre Box Office</h1>\
         <p><a href=\"/reservation\">Book a seat</a></p></body></html>",
    )
}

async fn render_form(state: &AppState, message: Option<(&str, &str)>) -> AppResult<Html<String>> {
    let performances = performance::Entity::find()
        .order_by_asc(performance::Column::ShowTime)
        .all(&state.db)
        .await?;
    let plays = play::Entity::find().all(&state.db).await?;
    let halls = theatre_hall::Entity::find().all(&state.db).await?;

    let mut options = String::new();
    for p in &performances {
        let title = plays
            .iter()
            .find(|pl| pl.id == p.play_id)
            .map(|pl| pl.title.as_str())
            .unwrap_or("?");
        let hall = halls
            .iter()
            .find(|h| h.id == p.theatre_hall_id)
            .map(|h| h.name.as_str())
            .unwrap_or("?");
        options.push_str(&format!(
            "<option value=\"{}\">{} — {} — {}</option>",
            p.id,
            escape(title),
            escape(hall),
            p.show_time.format("%Y-%m-%d %H:%M"),
        ));
    }

    let banner = match message {
        Some(("error", msg)) => format!("<p class=\"error\">{}</p>", escape(msg)),
        Some((_, msg)) => format!("<p class=\"success\">{}</p>", escape(msg)),
        None => String::new(),
    };

    Ok(Html(format!(
        "<!DOCTYPE html><html><head><title>Book a seat</title></head><body>\
         <h1>Book a seat</h1>{banner}\
         <form method=\"post\" action=\"/make-reservation\">\
         <label>Performance <select name=\"performance\">{options}</select></label>\
         <label>Row <input name=\"row\" type=\"number\"></label>\
         <label>Seat <input name=\"seat\" type=\"number\"></label>\
         <button type=\"submit\">Book</button></form></body></html>"
    )))
}

/// Booking form
pub async fn reservation_form(State(state): State<AppState>) -> AppResult<Html<String>> {
    render_form(&state, None).await
}

#[derive(Debug, Deserialize)]
pub struct ReservationForm {
    pub performance: String,
    pub row: String,
    pub seat: String,
}

/// Handle the booking form. Same workflow as the ticket API; the outcome is
/// re-rendered into the form as a message instead of structured JSON.
pub async fn make_reservation(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Form(form): Form<ReservationForm>,
) -> AppResult<Html<String>> {
    let parsed = (
        form.performance.trim().parse::<i32>(),
        form.row.trim().parse::<i32>(),
        form.seat.trim().parse::<i32>(),
    );

    let (performance_id, row, seat) = match parsed {
        (Ok(p), Ok(r), Ok(s)) => (p, r, s),
        _ => {
            return render_form(
                &state,
                Some(("error", "Performance, row and seat must be whole numbers.")),
            )
            .await;
        }
    };

    match book_seat(&state.db, claims.sub, performance_id, row, seat).await {
        Ok(_) => render_form(&state, Some(("success", "Your ticket has been booked!"))).await,
        Err(BookingError::Db(e)) => Err(e.into()),
        Err(e) => render_form(&state, Some(("error", &e.to_string()))).await,
    }
}
