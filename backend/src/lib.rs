pub mod catchers;
pub mod chat;
pub mod config;
pub mod error;
pub mod registration;
pub mod routes;
pub mod store;
pub use shared::{models::*, error::*, validation::*};

use rocket::{Build, Rocket};
use routes::AppState;

/// Mounts the slash command endpoints and JSON catchers on `rocket`.
pub fn mount(rocket: Rocket<Build>, state: AppState) -> Rocket<Build> {
    rocket
        .manage(state)
        .mount(
            "/",
            rocket::routes![
                routes::create_poll,
                routes::vote,
                routes::poll_results,
                routes::close_poll,
                routes::delete_poll
            ],
        )
        .register(
            "/",
            rocket::catchers![
                catchers::bad_request,
                catchers::unauthorized,
                catchers::not_found,
                catchers::unprocessable,
                catchers::internal_error
            ],
        )
}
