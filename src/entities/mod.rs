pub mod actor;
pub mod genre;
pub mod performance;
pub mod play;
pub mod play_actor;
pub mod play_genre;
pub mod reservation;
pub mod theatre_hall;
pub mod ticket;
pub mod user;
