use axum::{
    Router,
    routing::{get, post},
};

use super::handler;
use crate::handler::AppState;

/// `/books/:key` is shared between the title lookup (GET) and the id delete
/// (DELETE), a path can only carry one parameter name.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", post(handler::create_book).get(handler::list_books))
        .route("/:key", get(handler::get_book_by_title).delete(handler::delete_book))
        .route("/author/:author", get(handler::get_books_by_author))
        .route("/genre/:genre", get(handler::get_books_by_genre))
        .route("/year/:year", get(handler::get_books_by_year))
        .route("/rating/:id", post(handler::update_rating))
        .route("/update/:title", post(handler::update_details))
}
