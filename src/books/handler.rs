//! HTTP handlers for the book catalog
//!
//! Each handler forwards to exactly one store operation. Create failures
//! answer 400, every other failure 500.

use axum::{
    Json,
    body::Bytes,
    extract::{Path, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::{Serialize, de::DeserializeOwned};

use crate::api::MessageResponse;
use crate::error::{ApiError, StoreError};
use crate::handler::AppState;
use crate::model::{Book, BookFields, DetailsUpdate, RatingUpdate};

fn success<T: Serialize>(data: T) -> Response {
    (StatusCode::OK, Json(data)).into_response()
}

fn created<T: Serialize>(data: T) -> Response {
    (StatusCode::CREATED, Json(data)).into_response()
}

fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(|mime| {
            let mime = mime.trim();
            mime.eq_ignore_ascii_case("application/json") || mime.ends_with("+json")
        })
        .unwrap_or(false)
}

/// Decodes a JSON request body. A missing body, or one that is not declared
/// as JSON, decodes as the empty document.
fn decode_body<T: DeserializeOwned + Default>(headers: &HeaderMap, body: &Bytes) -> Result<T, serde_json::Error> {
    if body.is_empty() || !is_json(headers) {
        return Ok(T::default());
    }
    serde_json::from_slice(body)
}

pub async fn create_book(State(state): State<AppState>, headers: HeaderMap, body: Bytes) -> Response {
    const FAILED: &str = "Error creating book";

    let fields: BookFields = match decode_body(&headers, &body) {
        Ok(fields) => fields,
        Err(e) => return ApiError::client(FAILED, &e).into_response(),
    };

    match state.db.insert_book(&fields).await {
        Ok(book) => {
            tracing::info!(id = %book.id, "created book");
            created(book)
        }
        Err(e) => ApiError::client(FAILED, &e).into_response(),
    }
}

pub async fn list_books(State(state): State<AppState>) -> Response {
    match state.db.find_all().await {
        Ok(books) => success(books),
        Err(e) => ApiError::server("Error fetching books", &e).into_response(),
    }
}

pub async fn get_book_by_title(State(state): State<AppState>, Path(title): Path<String>) -> Response {
    match state.db.find_one_by_title(&title).await {
        Ok(Some(book)) => success(book),
        Ok(None) => ApiError::NotFound("Book not found").into_response(),
        Err(e) => ApiError::server("Error fetching book", &e).into_response(),
    }
}

/// An author with no books answers 404 with the (empty) array as body.
pub async fn get_books_by_author(State(state): State<AppState>, Path(author): Path<String>) -> Response {
    match state.db.find_by_author(&author).await {
        Ok(books) if books.is_empty() => (StatusCode::NOT_FOUND, Json(books)).into_response(),
        Ok(books) => success(books),
        Err(e) => ApiError::server("Error fetching books by author", &e).into_response(),
    }
}

/// Unlike the author lookup, no match is still a 200 here.
pub async fn get_books_by_genre(State(state): State<AppState>, Path(genre): Path<String>) -> Response {
    match state.db.find_by_genre(&genre).await {
        Ok(books) => success(books),
        Err(e) => ApiError::server("Error fetching books by genre", &e).into_response(),
    }
}

pub async fn get_books_by_year(State(state): State<AppState>, Path(year): Path<String>) -> Response {
    match state.db.find_by_year(&year).await {
        Ok(books) => success(books),
        Err(e) => ApiError::server("Error fetching books by year", &e).into_response(),
    }
}

pub async fn update_rating(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    const FAILED: &str = "Error updating book rating";

    let update: RatingUpdate = match decode_body(&headers, &body) {
        Ok(update) => update,
        Err(e) => return ApiError::server(FAILED, &e).into_response(),
    };

    updated(state.db.update_by_id(&id, &update).await, FAILED)
}

pub async fn update_details(
    State(state): State<AppState>,
    Path(title): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    const FAILED: &str = "Error updating book details";

    let update: DetailsUpdate = match decode_body(&headers, &body) {
        Ok(update) => update,
        Err(e) => return ApiError::server(FAILED, &e).into_response(),
    };

    updated(state.db.update_one_by_title(&title, &update).await, FAILED)
}

fn updated(result: Result<Option<Book>, StoreError>, failed: &'static str) -> Response {
    match result {
        Ok(Some(book)) => {
            tracing::info!(id = %book.id, "updated book");
            success(book)
        }
        Ok(None) => ApiError::NotFound("Book does not exist").into_response(),
        Err(e) => ApiError::server(failed, &e).into_response(),
    }
}

pub async fn delete_book(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    match state.db.delete_by_id(&id).await {
        Ok(true) => {
            tracing::info!(id = %id, "deleted book");
            success(MessageResponse::new("Book deleted successfully"))
        }
        Ok(false) => ApiError::NotFound("Book not found").into_response(),
        Err(e) => ApiError::server("Error deleting book", &e).into_response(),
    }
}
