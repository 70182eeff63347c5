use std::sync::Arc;

use anyhow::Result;

use crate::catalog::{Book, BookStore};

/// Read-only façade over the record store, shared by the request handlers.
pub struct BookService {
    store: Arc<dyn BookStore>,
}

impl BookService {
    pub fn new(store: Arc<dyn BookStore>) -> Self {
        BookService { store }
    }

    /// Every book in the catalog, in store order. An empty catalog is an
    /// empty vec, not an error.
    pub async fn find_all_books(&self) -> Result<Vec<Book>> {
        self.store.all().await
    }

    /// Absence is a normal outcome here, not a failure.
    pub async fn find_book_by_id(&self, id: i64) -> Result<Option<Book>> {
        self.store.by_id(id).await
    }
}
