use std::fmt;

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDateTime;
use serde::Serialize;
use sqlx::SqlitePool;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, sqlx::Type)]
#[sqlx(rename_all = "snake_case")]
pub enum BookFormat {
    Epub,
    Pdf,
    Txt,
}

impl BookFormat {
    pub fn from_extension(ext: &str) -> Option<BookFormat> {
        match ext.to_ascii_lowercase().as_str() {
            "epub" => Some(BookFormat::Epub),
            "pdf" => Some(BookFormat::Pdf),
            "txt" => Some(BookFormat::Txt),
            _ => None,
        }
    }
}

impl fmt::Display for BookFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BookFormat::Epub => write!(f, "EPUB"),
            BookFormat::Pdf => write!(f, "PDF"),
            BookFormat::Txt => write!(f, "Plain text"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, sqlx::Type)]
#[sqlx(rename_all = "snake_case")]
pub enum Category {
    Programming,
    SelfImprovement,
    Economics,
    Fiction,
    Other,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::Programming => write!(f, "IT / Programming"),
            Category::SelfImprovement => write!(f, "Self-improvement"),
            Category::Economics => write!(f, "Economics / Business"),
            Category::Fiction => write!(f, "Fiction / Literature"),
            Category::Other => write!(f, "Other"),
        }
    }
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Book {
    pub id: i64,
    pub title: String,
    pub author: String,
    pub format: BookFormat,
    pub category: Category,
    pub filepath: String,
    pub toc: Option<String>,
    pub preface: Option<String>,
    pub imported_at: NaiveDateTime,
}

/// A catalog record before the store has assigned it an id.
#[derive(Debug, Clone)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub format: BookFormat,
    pub category: Category,
    pub filepath: String,
    pub toc: Option<String>,
    pub preface: Option<String>,
}

/// Record store for the book catalog. Ids and timestamps are assigned
/// here and nowhere else; the web layer only ever reads.
#[async_trait]
pub trait BookStore: Send + Sync {
    async fn all(&self) -> Result<Vec<Book>>;
    async fn by_id(&self, id: i64) -> Result<Option<Book>>;
    async fn insert(&self, book: &NewBook) -> Result<i64>;
    async fn contains_path(&self, path: &str) -> Result<bool>;
}

pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        SqliteStore { pool }
    }

    pub async fn connect(url: &str) -> Result<Self> {
        let pool = SqlitePool::connect(url).await?;
        let store = SqliteStore::new(pool);
        store.ensure_schema().await?;
        Ok(store)
    }

    pub async fn ensure_schema(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS Books (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                author TEXT NOT NULL,
                format TEXT NOT NULL,
                category TEXT NOT NULL,
                filepath TEXT NOT NULL UNIQUE,
                toc TEXT,
                preface TEXT,
                imported_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl BookStore for SqliteStore {
    async fn all(&self) -> Result<Vec<Book>> {
        let books = sqlx::query_as::<_, Book>(
            r#"
            SELECT id, title, author, format, category, filepath, toc, preface, imported_at
            FROM Books
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(books)
    }

    async fn by_id(&self, id: i64) -> Result<Option<Book>> {
        let book = sqlx::query_as::<_, Book>(
            r#"
            SELECT id, title, author, format, category, filepath, toc, preface, imported_at
            FROM Books WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(book)
    }

    async fn insert(&self, book: &NewBook) -> Result<i64> {
        let now = chrono::Utc::now().naive_utc();
        let id = sqlx::query(
            r#"
            INSERT INTO Books ( title, author, format, category, filepath, toc, preface, imported_at )
            VALUES ( ?, ?, ?, ?, ?, ?, ?, ? )
            "#,
        )
        .bind(&book.title)
        .bind(&book.author)
        .bind(book.format)
        .bind(book.category)
        .bind(&book.filepath)
        .bind(&book.toc)
        .bind(&book.preface)
        .bind(now)
        .execute(&self.pool)
        .await?
        .last_insert_rowid();
        Ok(id)
    }

    async fn contains_path(&self, path: &str) -> Result<bool> {
        let row = sqlx::query("SELECT id FROM Books WHERE filepath = ?")
            .bind(path)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.is_some())
    }
}
