use std::marker::PhantomData;
use std::ops::Deref;
use std::str::FromStr;
use std::time::Duration;

use rocket::{
    request::{self, FromRequest, Request},
    State,
};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions},
    Error as DbError, SqlitePool,
};

use super::schema::ensure_schema_exists;

/// How long a connection waits for another's write lock before giving up.
pub const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Handle on the shared connection pool. This is the only shared mutable state
/// in the server; it is placed in managed state and handed out per request.
#[derive(Debug, Clone)]
pub struct Db(SqlitePool);

impl Db {
    /// Connect to the database at the given URI, creating the file if needed,
    /// and make sure the schema exists.
    ///
    /// Writers wait up to [`BUSY_TIMEOUT`] for the write lock.
    pub async fn connect(uri: &str) -> Result<Self, DbError> {
        let options = SqliteConnectOptions::from_str(uri)?
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(BUSY_TIMEOUT);
        let pool = SqlitePoolOptions::new().connect_with(options).await?;
        ensure_schema_exists(&pool).await?;
        Ok(Self(pool))
    }

    /// A private in-memory database. Every connection to `:memory:` sees its own
    /// database, so the pool is pinned to a single connection that never expires.
    pub async fn in_memory() -> Result<Self, DbError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .min_connections(1)
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;
        ensure_schema_exists(&pool).await?;
        Ok(Self(pool))
    }
}

impl Deref for Db {
    type Target = SqlitePool;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// A type that is stored as rows of a single table.
pub trait SqlTable {
    /// The name of the table.
    const NAME: &'static str;
}

/// A repository over the table holding rows of the given type. Queries are
/// implemented per row type, next to the type itself.
pub struct Repo<T> {
    db: Db,
    phantom: PhantomData<T>,
}

impl<T> Repo<T>
where
    T: SqlTable,
{
    /// Get a repository handle for this table in the given database.
    pub fn from_db(db: &Db) -> Self {
        Self {
            db: db.clone(),
            phantom: PhantomData,
        }
    }

    /// The table name, for building queries.
    pub fn table(&self) -> &'static str {
        T::NAME
    }
}

// `Derive(Clone)` would only derive if `T: Clone`, but we don't need that bound.
impl<T> Clone for Repo<T> {
    fn clone(&self) -> Self {
        Self {
            db: self.db.clone(),
            phantom: PhantomData,
        }
    }
}

impl<T> Deref for Repo<T> {
    type Target = SqlitePool;

    fn deref(&self) -> &Self::Target {
        &self.db
    }
}

#[rocket::async_trait]
impl<'r, T> FromRequest<'r> for Repo<T>
where
    T: SqlTable,
{
    type Error = ();

    /// Get the database pool from the managed state and wrap it in a repository.
    ///
    /// Panics iff the [`Db`] is not managed by [`rocket::Rocket`].
    async fn from_request(req: &'r Request<'_>) -> request::Outcome<Self, Self::Error> {
        let db = req.guard::<&State<Db>>().await.unwrap();
        request::Outcome::Success(Repo::from_db(db))
    }
}
