use std::sync::Arc;

use askama::Template;
use axum::{
    debug_handler,
    extract::Path,
    response::{IntoResponse, Redirect, Response},
    Extension,
};

use crate::{catalog::Book, services::library::BookService, AppError};

#[derive(Template)]
#[template(path = "book-details.html")]
pub struct BookDetailsTemplate {
    book: Book,
}

/// The two terminal outcomes of a details request: render the book, or send
/// the client to the error page when the id matches nothing.
pub enum DetailsPage {
    Details(BookDetailsTemplate),
    NotFound(Redirect),
}

impl IntoResponse for DetailsPage {
    fn into_response(self) -> Response {
        match self {
            DetailsPage::Details(template) => template.into_response(),
            DetailsPage::NotFound(redirect) => redirect.into_response(),
        }
    }
}

#[debug_handler]
pub async fn view_book_details(
    Extension(catalog): Extension<Arc<BookService>>,
    Path(id): Path<i64>,
) -> Result<DetailsPage, AppError> {
    match catalog.find_book_by_id(id).await? {
        Some(book) => Ok(DetailsPage::Details(BookDetailsTemplate { book })),
        None => Ok(DetailsPage::NotFound(Redirect::to("/error"))),
    }
}
