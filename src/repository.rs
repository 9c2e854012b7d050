use std::str::FromStr;

use serde::Deserialize;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    SqlitePool,
};

use crate::types::{Book, BookChanges, NewBook};

#[derive(Debug, thiserror::Error)]
pub enum BookRepositoryError {
    #[error("Book {0} not found")]
    NotFound(String),
    #[error("Book {0} already exists")]
    Conflict(String),
    #[error("Database failure: {0}")]
    Database(#[from] sqlx::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite connection URL, e.g. `sqlite://books.db` or `sqlite::memory:`.
    pub url: String,
    #[serde(default = "DatabaseConfig::default_max_connections")]
    pub max_connections: u32,
}

impl DatabaseConfig {
    fn default_max_connections() -> u32 {
        5
    }

    /// An isolated in-memory database.
    ///
    /// `sqlite::memory:` names a fresh shared-cache database per pool. It lives only as long as
    /// one of its connections is open, so the pool keeps a connection around for good.
    /// A single connection also avoids shared-cache table locks between writers.
    pub fn in_memory() -> Self {
        Self {
            url: String::from("sqlite::memory:"),
            max_connections: 1,
        }
    }

    pub fn is_in_memory(&self) -> bool {
        self.url.contains(":memory:") || self.url.contains("mode=memory")
    }

    fn pool_options(&self) -> SqlitePoolOptions {
        let options = SqlitePoolOptions::new().max_connections(self.max_connections);

        match self.is_in_memory() {
            true => options
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None),
            false => options,
        }
    }
}

const COLUMNS: &str = "isbn, amazon_url, author, language, pages, publisher, title, year";

/// CRUD access to the `books` table.
#[derive(Debug, Clone)]
pub struct BookRepository {
    pool: SqlitePool,
}

impl BookRepository {
    #[tracing::instrument(skip_all)]
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, BookRepositoryError> {
        let options = SqliteConnectOptions::from_str(&config.url)?.create_if_missing(true);

        let pool = config.pool_options().connect_with(options).await?;

        let repository = Self { pool };
        repository.create_table().await?;

        tracing::info!(url = %config.url, "Connected to database");

        Ok(repository)
    }

    async fn create_table(&self) -> Result<(), BookRepositoryError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS books (
                isbn TEXT PRIMARY KEY,
                amazon_url TEXT NOT NULL,
                author TEXT NOT NULL,
                language TEXT NOT NULL,
                pages INTEGER NOT NULL CHECK (pages > 0),
                publisher TEXT NOT NULL,
                title TEXT NOT NULL,
                year INTEGER NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Closes every pooled connection. Subsequent calls fail with [`BookRepositoryError::Database`].
    pub async fn close(&self) {
        self.pool.close().await;
    }

    #[tracing::instrument(skip_all, fields(isbn = %book.isbn))]
    pub async fn create(&self, book: NewBook) -> Result<Book, BookRepositoryError> {
        let created = sqlx::query_as::<_, Book>(&format!(
            "INSERT INTO books ({COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?, ?) RETURNING {COLUMNS}"
        ))
        .bind(&book.isbn)
        .bind(&book.amazon_url)
        .bind(&book.author)
        .bind(&book.language)
        .bind(book.pages)
        .bind(&book.publisher)
        .bind(&book.title)
        .bind(book.year)
        .fetch_one(&self.pool)
        .await
        .map_err(|err| match err {
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                BookRepositoryError::Conflict(book.isbn.clone())
            }
            err => BookRepositoryError::Database(err),
        })?;

        tracing::debug!("Created");

        Ok(created)
    }

    /// All books ordered by title.
    #[tracing::instrument(skip_all)]
    pub async fn list(&self) -> Result<Vec<Book>, BookRepositoryError> {
        let books = sqlx::query_as::<_, Book>(&format!(
            "SELECT {COLUMNS} FROM books ORDER BY title ASC"
        ))
        .fetch_all(&self.pool)
        .await?;

        tracing::debug!(count = books.len(), "Listed");

        Ok(books)
    }

    #[tracing::instrument(skip(self))]
    pub async fn get(&self, isbn: &str) -> Result<Book, BookRepositoryError> {
        sqlx::query_as::<_, Book>(&format!("SELECT {COLUMNS} FROM books WHERE isbn = ?"))
            .bind(isbn)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| BookRepositoryError::NotFound(isbn.to_string()))
    }

    #[tracing::instrument(skip(self, changes))]
    pub async fn update(
        &self,
        isbn: &str,
        changes: BookChanges,
    ) -> Result<Book, BookRepositoryError> {
        let updated = sqlx::query_as::<_, Book>(&format!(
            r#"
            UPDATE books
            SET amazon_url = ?, author = ?, language = ?, pages = ?, publisher = ?, title = ?, year = ?
            WHERE isbn = ?
            RETURNING {COLUMNS}
            "#
        ))
        .bind(&changes.amazon_url)
        .bind(&changes.author)
        .bind(&changes.language)
        .bind(changes.pages)
        .bind(&changes.publisher)
        .bind(&changes.title)
        .bind(changes.year)
        .bind(isbn)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| BookRepositoryError::NotFound(isbn.to_string()))?;

        tracing::debug!("Updated");

        Ok(updated)
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, isbn: &str) -> Result<(), BookRepositoryError> {
        let result = sqlx::query("DELETE FROM books WHERE isbn = ?")
            .bind(isbn)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(BookRepositoryError::NotFound(isbn.to_string()));
        }

        tracing::debug!("Deleted");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn repository() -> BookRepository {
        BookRepository::connect(&DatabaseConfig::in_memory())
            .await
            .expect("In-memory database is not available")
    }

    fn new_book(isbn: &str, title: &str) -> NewBook {
        NewBook {
            isbn: isbn.to_string(),
            amazon_url: String::from("https://www.amazon.com/test"),
            author: String::from("test jones"),
            language: String::from("english"),
            pages: 100,
            publisher: String::from("test people"),
            title: title.to_string(),
            year: 2024,
        }
    }

    #[test]
    fn detects_in_memory_urls() {
        let file = DatabaseConfig {
            url: String::from("sqlite://books.db"),
            max_connections: 5,
        };
        let named = DatabaseConfig {
            url: String::from("sqlite://file:books?mode=memory&cache=shared"),
            max_connections: 5,
        };

        assert!(DatabaseConfig::in_memory().is_in_memory());
        assert!(named.is_in_memory());
        assert!(!file.is_in_memory());
    }

    #[test]
    fn in_memory_pool_never_drops_its_last_connection() {
        let options = DatabaseConfig::in_memory().pool_options();

        assert_eq!(options.get_min_connections(), 1);
        assert_eq!(options.get_max_connections(), 1);
        assert_eq!(options.get_idle_timeout(), None);
        assert_eq!(options.get_max_lifetime(), None);
    }

    #[test]
    fn file_pool_keeps_default_reaping() {
        let options = DatabaseConfig {
            url: String::from("sqlite://books.db"),
            max_connections: 5,
        }
        .pool_options();

        assert_eq!(options.get_min_connections(), 0);
        assert_eq!(options.get_max_connections(), 5);
        assert!(options.get_idle_timeout().is_some());
    }

    #[tokio::test]
    async fn create_then_get_returns_same_record() {
        let repository = repository().await;

        let created = repository.create(new_book("123", "test book")).await.unwrap();
        let fetched = repository.get("123").await.unwrap();

        assert_eq!(created, fetched);
        assert_eq!(fetched.title, "test book");
    }

    #[tokio::test]
    async fn duplicate_isbn_is_a_conflict() {
        let repository = repository().await;

        repository.create(new_book("123", "first")).await.unwrap();
        let err = repository.create(new_book("123", "second")).await.unwrap_err();

        assert!(matches!(err, BookRepositoryError::Conflict(isbn) if isbn == "123"));
    }

    #[tokio::test]
    async fn list_is_ordered_by_title() {
        let repository = repository().await;

        assert!(repository.list().await.unwrap().is_empty());

        repository.create(new_book("1", "zebra")).await.unwrap();
        repository.create(new_book("2", "aardvark")).await.unwrap();

        let titles: Vec<String> = repository
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|book| book.title)
            .collect();

        assert_eq!(titles, vec!["aardvark", "zebra"]);
    }

    #[tokio::test]
    async fn missing_isbn_is_not_found() {
        let repository = repository().await;

        let changes = BookChanges {
            amazon_url: String::new(),
            author: String::new(),
            language: String::new(),
            pages: 1,
            publisher: String::new(),
            title: String::from("t"),
            year: 1,
        };

        assert!(matches!(
            repository.get("999").await,
            Err(BookRepositoryError::NotFound(_))
        ));
        assert!(matches!(
            repository.update("999", changes).await,
            Err(BookRepositoryError::NotFound(_))
        ));
        assert!(matches!(
            repository.delete("999").await,
            Err(BookRepositoryError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn delete_removes_row() {
        let repository = repository().await;

        repository.create(new_book("123", "test book")).await.unwrap();
        repository.delete("123").await.unwrap();

        assert!(matches!(
            repository.get("123").await,
            Err(BookRepositoryError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn closed_pool_is_a_database_error() {
        let repository = repository().await;

        repository.close().await;

        assert!(matches!(
            repository.list().await,
            Err(BookRepositoryError::Database(_))
        ));
    }
}
