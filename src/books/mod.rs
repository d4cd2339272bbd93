//! Book catalog module
//!
//! Nine routes over a single `books` collection. Every handler maps one
//! request onto one store call and renders the outcome as JSON.
//!
//! # Usage
//!
//! ```rust,ignore
//! use bookshelf::books;
//!
//! let app = Router::new()
//!     .nest("/books", books::routes())
//!     .with_state(app_state);
//! ```

mod handler;
mod routes;

pub use routes::routes;
