use std::{env, path::Path, sync::Arc};

use anyhow::Result;
use askama::Template;
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
    Extension, Router,
};
use log::info;
use tower_http::services::ServeDir;

mod catalog;
mod services;
mod views;

use catalog::SqliteStore;
use services::{importer::import_books, library::BookService};

// Make our own error that wraps `anyhow::Error`.
struct AppError(anyhow::Error);

#[derive(Template)]
#[template(path = "error.html")]
struct ErrorPageTemplate {
    message: String,
    status_code: StatusCode,
}

// Tell axum how to convert `AppError` into a response.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            ErrorPageTemplate {
                status_code: StatusCode::INTERNAL_SERVER_ERROR,
                message: self.0.to_string(),
            },
        )
            .into_response()
    }
}

// This enables using `?` on functions that return `Result<_, anyhow::Error>` to turn them into
// `Result<_, AppError>`. That way you don't need to do that manually.
impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

// Redirect target for lookups that matched nothing.
async fn error_page() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        ErrorPageTemplate {
            status_code: StatusCode::NOT_FOUND,
            message: "The book you were looking for is not in the catalog.".to_string(),
        },
    )
}

async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Html("<h1>404 Not found</h1><a href=\"/\">Back home</a>"),
    )
}

fn app(catalog: Arc<BookService>) -> Router {
    Router::new()
        .merge(views::books::get_routes())
        .nest("/book", views::book::get_routes())
        .route("/error", get(error_page))
        .nest_service("/static", ServeDir::new("static"))
        .fallback(not_found)
        .layer(Extension(catalog))
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    pretty_env_logger::init();

    let database_url =
        env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite:library.db?mode=rwc".to_string());
    let store = Arc::new(SqliteStore::connect(&database_url).await?);

    match env::var("LIBRARY_DIR") {
        Ok(dir) => {
            let imported = import_books(Path::new(&dir), &*store).await?;
            info!("imported {} new books from {}", imported, dir);
        }
        Err(_) => info!("LIBRARY_DIR not set, serving the existing catalog"),
    }

    let catalog = Arc::new(BookService::new(store));

    let addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app(catalog)).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request};
    use tower::ServiceExt;

    use crate::catalog::tests::{memory_store, sample_book};
    use crate::catalog::BookStore;

    async fn app_with(titles: &[&str]) -> (Router, Vec<i64>) {
        let store = memory_store().await;
        let mut ids = Vec::new();
        for title in titles {
            ids.push(store.insert(&sample_book(title, "Unknown")).await.unwrap());
        }
        (app(Arc::new(BookService::new(Arc::new(store)))), ids)
    }

    async fn get_response(app: &Router, uri: &str) -> Response {
        app.clone()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    async fn body_text(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn empty_catalog_renders_an_empty_listing() {
        let (app, _) = app_with(&[]).await;
        let response = get_response(&app, "/").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains("The catalog is empty"));
    }

    #[tokio::test]
    async fn listing_shows_every_book() {
        let (app, _) = app_with(&["Dune", "Hyperion"]).await;
        let response = get_response(&app, "/").await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_text(response).await;
        assert!(body.contains("Dune"));
        assert!(body.contains("Hyperion"));
    }

    #[tokio::test]
    async fn details_renders_a_present_book() {
        let (app, ids) = app_with(&["Dune"]).await;
        let response = get_response(&app, &format!("/book/{}", ids[0])).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains("Dune"));
    }

    #[tokio::test]
    async fn missing_book_redirects_to_the_error_page() {
        let (app, ids) = app_with(&["Dune"]).await;
        let response = get_response(&app, &format!("/book/{}", ids[0] + 1)).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/error");
    }

    #[tokio::test]
    async fn details_outcome_is_idempotent() {
        let (app, _) = app_with(&["Dune"]).await;
        for _ in 0..2 {
            let response = get_response(&app, "/book/999").await;
            assert_eq!(response.status(), StatusCode::SEE_OTHER);
            assert_eq!(response.headers()[header::LOCATION], "/error");
        }
    }

    #[tokio::test]
    async fn malformed_id_is_rejected_before_lookup() {
        let (app, _) = app_with(&["Dune"]).await;
        let response = get_response(&app, "/book/abc").await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn error_page_is_served_directly() {
        let (app, _) = app_with(&[]).await;
        let response = get_response(&app, "/error").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn unknown_routes_fall_back() {
        let (app, _) = app_with(&[]).await;
        let response = get_response(&app, "/exports").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
