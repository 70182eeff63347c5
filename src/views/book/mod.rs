use axum::{routing::get, Router};

mod details;

pub fn get_routes() -> axum::Router {
    Router::new().route("/:id", get(details::view_book_details))
}
