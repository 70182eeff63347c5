use std::sync::Arc;

use askama::Template;
use axum::Extension;

use crate::{catalog::Book, services::library::BookService, AppError};

#[derive(Template)]
#[template(path = "books-list.html")]
pub struct BooksListTemplate {
    books: Vec<Book>,
}

#[axum::debug_handler]
pub async fn view_books_list(
    Extension(catalog): Extension<Arc<BookService>>,
) -> Result<BooksListTemplate, AppError> {
    let books = catalog.find_all_books().await?;
    Ok(BooksListTemplate { books })
}
